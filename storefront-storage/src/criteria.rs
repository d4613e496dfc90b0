//! Search criteria evaluated against item snapshots.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;
use storefront_core::value::{self, ItemValues};

/// Comparison operator of a search condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    /// Equal to; an array value means "one of".
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    /// Starts with.
    #[serde(rename = "=~")]
    StartsWith,
    /// Contains substring.
    #[serde(rename = "~=")]
    Contains,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "==",
            Operator::Ne => "!=",
            Operator::Lt => "<",
            Operator::Le => "<=",
            Operator::Gt => ">",
            Operator::Ge => ">=",
            Operator::StartsWith => "=~",
            Operator::Contains => "~=",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Single `key op value` condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub key: String,
    pub op: Operator,
    pub value: Value,
}

impl Condition {
    pub fn new(key: impl Into<String>, op: Operator, value: Value) -> Self {
        Self {
            key: key.into(),
            op,
            value,
        }
    }

    /// Evaluate the condition against a snapshot; missing keys read as `null`.
    pub fn matches(&self, values: &ItemValues) -> bool {
        let actual = values.get(&self.key).unwrap_or(&Value::Null);

        match (self.op, &self.value) {
            (Operator::Eq, Value::Array(list)) => list.iter().any(|v| loose_eq(actual, v)),
            (Operator::Ne, Value::Array(list)) => !list.iter().any(|v| loose_eq(actual, v)),
            (Operator::Eq, expected) => loose_eq(actual, expected),
            (Operator::Ne, expected) => !loose_eq(actual, expected),
            (Operator::Lt, expected) => loose_cmp(actual, expected) == Some(Ordering::Less),
            (Operator::Le, expected) => matches!(
                loose_cmp(actual, expected),
                Some(Ordering::Less | Ordering::Equal)
            ),
            (Operator::Gt, expected) => loose_cmp(actual, expected) == Some(Ordering::Greater),
            (Operator::Ge, expected) => matches!(
                loose_cmp(actual, expected),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            (Operator::StartsWith, expected) => text_match(actual, expected, |a, e| a.starts_with(e)),
            (Operator::Contains, expected) => text_match(actual, expected, |a, e| a.contains(e)),
        }
    }
}

/// Conjunction of conditions with an optional result slice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Criteria {
    conditions: Vec<Condition>,
    slice: Option<(usize, usize)>,
}

impl Criteria {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a condition.
    pub fn compare(mut self, op: Operator, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.conditions.push(Condition::new(key, op, value.into()));
        self
    }

    /// Limit the result to `size` items starting at `start`.
    pub fn slice(mut self, start: usize, size: usize) -> Self {
        self.slice = Some((start, size));
        self
    }

    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn start(&self) -> usize {
        self.slice.map_or(0, |(start, _)| start)
    }

    pub fn size(&self) -> Option<usize> {
        self.slice.map(|(_, size)| size)
    }

    pub fn matches(&self, values: &ItemValues) -> bool {
        self.conditions.iter().all(|c| c.matches(values))
    }
}

fn loose_eq(actual: &Value, expected: &Value) -> bool {
    match (actual, expected) {
        (Value::Null, Value::Null) => true,
        (Value::Null, _) | (_, Value::Null) => false,
        _ => value::to_string_opt(actual) == value::to_string_opt(expected) || actual == expected,
    }
}

fn loose_cmp(actual: &Value, expected: &Value) -> Option<Ordering> {
    let a = value::to_string_opt(actual)?;
    let e = value::to_string_opt(expected)?;

    match (a.parse::<f64>(), e.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.partial_cmp(&y),
        _ => Some(a.cmp(&e)),
    }
}

fn text_match(actual: &Value, expected: &Value, test: impl Fn(&str, &str) -> bool) -> bool {
    match (value::to_string_opt(actual), value::to_string_opt(expected)) {
        (Some(a), Some(e)) => test(&a, &e),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_core::value::values;

    fn row() -> ItemValues {
        values([
            ("product.id", json!("15")),
            ("product.code", json!("CNC")),
            ("product.status", json!(1)),
            ("product.dateend", Value::Null),
        ])
    }

    #[test]
    fn test_eq_is_loose() {
        assert!(Condition::new("product.id", Operator::Eq, json!(15)).matches(&row()));
        assert!(Condition::new("product.status", Operator::Eq, json!("1")).matches(&row()));
        assert!(!Condition::new("product.code", Operator::Eq, json!("CNE")).matches(&row()));
    }

    #[test]
    fn test_eq_with_list_is_membership() {
        let cond = Condition::new("product.id", Operator::Eq, json!(["1", "15"]));
        assert!(cond.matches(&row()));
        let cond = Condition::new("product.id", Operator::Ne, json!(["1", "15"]));
        assert!(!cond.matches(&row()));
    }

    #[test]
    fn test_null_comparisons() {
        assert!(Condition::new("product.dateend", Operator::Eq, Value::Null).matches(&row()));
        assert!(Condition::new("product.missing", Operator::Eq, Value::Null).matches(&row()));
        assert!(Condition::new("product.code", Operator::Ne, Value::Null).matches(&row()));
    }

    #[test]
    fn test_ordering_is_numeric_when_possible() {
        assert!(Condition::new("product.id", Operator::Gt, json!(9)).matches(&row()));
        assert!(Condition::new("product.id", Operator::Le, json!("15")).matches(&row()));
        assert!(!Condition::new("product.dateend", Operator::Lt, json!("2020")).matches(&row()));
    }

    #[test]
    fn test_text_operators() {
        assert!(Condition::new("product.code", Operator::StartsWith, json!("CN")).matches(&row()));
        assert!(Condition::new("product.code", Operator::Contains, json!("NC")).matches(&row()));
        assert!(!Condition::new("product.code", Operator::StartsWith, json!("NC")).matches(&row()));
    }

    #[test]
    fn test_criteria_is_conjunction() {
        let criteria = Criteria::new()
            .compare(Operator::Eq, "product.code", "CNC")
            .compare(Operator::Eq, "product.status", 1);
        assert!(criteria.matches(&row()));

        let criteria = criteria.compare(Operator::Eq, "product.id", "1");
        assert!(!criteria.matches(&row()));
    }

    #[test]
    fn test_operator_serde_names() {
        let json = serde_json::to_string(&Operator::StartsWith).unwrap();
        assert_eq!(json, "\"=~\"");
        let op: Operator = serde_json::from_str("\">=\"").unwrap();
        assert_eq!(op, Operator::Ge);
    }
}
