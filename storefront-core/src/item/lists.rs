//! List items linking an owning item to a referenced item.

use super::{apply_values, impl_item_base, opt_int, opt_string, Item, ItemBase, RefItem};
use crate::identity::{parse_datetime, Timestamp};
use crate::value::{self, ItemValues};
use crate::{ItemId, StoreResult, ValidationError};
use serde_json::{Map, Value};

/// Typed link from an owning item (`parentid`) to an item of another domain.
///
/// The key prefix depends on the owner, e.g. `product.lists.` for links
/// owned by products. The resolved referenced item travels with the list
/// item but is never part of its snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct ListItem {
    base: ItemBase,
    ref_item: Option<Box<RefItem>>,
}

impl ListItem {
    /// New list item owned by an item of `parent_domain`.
    pub fn new(parent_domain: &str) -> Self {
        Self {
            base: ItemBase::new(format!("{}.lists.", parent_domain)),
            ref_item: None,
        }
    }

    pub fn from_values(parent_domain: &str, values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(format!("{}.lists.", parent_domain), values),
            ref_item: None,
        }
    }

    pub fn parent_id(&self) -> Option<ItemId> {
        self.base.string("parentid").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    pub fn set_parent_id(&mut self, parent_id: Option<ItemId>) -> &mut Self {
        self.base.set_string("parentid", parent_id.map(|id| id.to_string()));
        self
    }

    /// Domain of the referenced item, e.g. `media`.
    pub fn domain(&self) -> String {
        self.base.string("domain").unwrap_or_default()
    }

    pub fn set_domain(&mut self, domain: &str) -> &mut Self {
        self.base.set_string("domain", Some(domain.to_string()));
        self
    }

    /// List type, e.g. `default` or `suggestion`.
    pub fn list_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_list_type(&mut self, list_type: &str) -> &mut Self {
        self.base.set_string("type", Some(list_type.to_string()));
        self
    }

    pub fn ref_id(&self) -> Option<ItemId> {
        self.base.string("refid").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    pub fn set_ref_id(&mut self, ref_id: Option<ItemId>) -> &mut Self {
        self.base.set_string("refid", ref_id.map(|id| id.to_string()));
        self
    }

    pub fn date_start(&self) -> Option<String> {
        self.base.string("datestart")
    }

    pub fn set_date_start(&mut self, date: Option<&str>) -> StoreResult<&mut Self> {
        let date = value::check_datetime(&self.base.key("datestart"), date)?;
        self.base.set_string("datestart", date);
        Ok(self)
    }

    pub fn date_end(&self) -> Option<String> {
        self.base.string("dateend")
    }

    pub fn set_date_end(&mut self, date: Option<&str>) -> StoreResult<&mut Self> {
        let date = value::check_datetime(&self.base.key("dateend"), date)?;
        self.base.set_string("dateend", date);
        Ok(self)
    }

    /// Free-form configuration, an empty object when unset.
    pub fn config(&self) -> Value {
        self.base
            .get("config")
            .filter(|v| v.is_object())
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()))
    }

    pub fn set_config(&mut self, config: Value) -> &mut Self {
        let config = match config {
            Value::Null => Value::Object(Map::new()),
            other => other,
        };
        self.base.set_json("config", config);
        self
    }

    pub fn position(&self) -> i64 {
        self.base.int("position").unwrap_or(0)
    }

    pub fn set_position(&mut self, position: i64) -> StoreResult<&mut Self> {
        if position < 0 {
            return Err(ValidationError::OutOfRange {
                field: self.base.key("position"),
                value: position.to_string(),
                reason: "must not be negative".to_string(),
            }
            .into());
        }
        self.base.set_int("position", Some(position));
        Ok(self)
    }

    /// Status, `1` (enabled) when unset.
    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }

    /// Enabled and inside its validity window at `now`.
    pub fn is_available_at(&self, now: Timestamp) -> bool {
        let start_ok = self
            .date_start()
            .and_then(|d| parse_datetime(&d))
            .map_or(true, |start| start <= now);
        let end_ok = self
            .date_end()
            .and_then(|d| parse_datetime(&d))
            .map_or(true, |end| now <= end);

        self.status() > 0 && start_ok && end_ok
    }

    pub fn ref_item(&self) -> Option<&RefItem> {
        self.ref_item.as_deref()
    }

    pub fn ref_item_mut(&mut self) -> Option<&mut RefItem> {
        self.ref_item.as_deref_mut()
    }

    /// Attach (or detach) the resolved referenced item.
    pub fn set_ref_item(&mut self, item: Option<RefItem>) -> &mut Self {
        self.ref_item = item.map(Box::new);
        self
    }

    pub fn take_ref_item(&mut self) -> Option<RefItem> {
        self.ref_item.take().map(|item| *item)
    }
}

impl Item for ListItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "lists"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "parentid" => {
                    item.set_parent_id(value::to_string_opt(v).map(ItemId::from));
                }
                "domain" => {
                    item.set_domain(&value::to_string(v));
                }
                "type" => {
                    item.set_list_type(&value::to_string(v));
                }
                "refid" => {
                    item.set_ref_id(value::to_string_opt(v).map(ItemId::from));
                }
                "datestart" => {
                    item.set_date_start(value::to_string_opt(v).as_deref())?;
                }
                "dateend" => {
                    item.set_date_end(value::to_string_opt(v).as_deref())?;
                }
                "config" => {
                    let config = match v {
                        Value::String(s) if !s.trim().is_empty() => serde_json::from_str(s)
                            .map_err(|e| ValidationError::InvalidValue {
                                field: field.to_string(),
                                reason: e.to_string(),
                            })?,
                        Value::String(_) => Value::Null,
                        other => other.clone(),
                    };
                    item.set_config(config);
                }
                "position" => {
                    item.set_position(value::to_int(field, v)?)?;
                }
                "status" => {
                    item.set_status(value::to_i32(field, v)?);
                }
                _ => return Ok(false),
            }
            Ok(true)
        })
    }

    fn to_array(&self, private: bool) -> ItemValues {
        let mut list = ItemValues::new();
        self.base.common_to(&mut list, private);

        list.insert(self.base.key("domain"), Value::from(self.domain()));
        list.insert(self.base.key("type"), Value::from(self.list_type()));
        list.insert(self.base.key("refid"), opt_string(self.ref_id().map(|id| id.to_string())));
        list.insert(self.base.key("datestart"), opt_string(self.date_start()));
        list.insert(self.base.key("dateend"), opt_string(self.date_end()));
        list.insert(self.base.key("config"), self.config());
        list.insert(self.base.key("position"), opt_int(Some(self.position())));
        list.insert(self.base.key("status"), Value::from(self.status()));

        if private {
            list.insert(
                self.base.key("parentid"),
                opt_string(self.parent_id().map(|id| id.to_string())),
            );
        }
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::identity::parse_datetime;
    use serde_json::json;

    #[test]
    fn test_prefix_follows_parent_domain() {
        let item = ListItem::new("product");
        let list = item.to_array(false);
        assert!(list.contains_key("product.lists.refid"));
        assert!(!list.contains_key("product.lists.parentid"));
    }

    #[test]
    fn test_negative_position_fails_without_mutation() {
        let mut item = ListItem::new("product");
        assert!(item.set_position(-1).is_err());
        assert_eq!(item.position(), 0);
        assert!(!item.is_modified());
    }

    #[test]
    fn test_availability_window() {
        let mut item = ListItem::new("product");
        item.set_date_start(Some("2020-01-01 00:00:00")).unwrap();
        item.set_date_end(Some("2020-12-31 23:59:59")).unwrap();

        assert!(item.is_available_at(parse_datetime("2020-06-01").unwrap()));
        assert!(!item.is_available_at(parse_datetime("2019-06-01").unwrap()));
        assert!(!item.is_available_at(parse_datetime("2021-06-01").unwrap()));

        item.set_status(0);
        assert!(!item.is_available_at(parse_datetime("2020-06-01").unwrap()));
    }

    #[test]
    fn test_config_accepts_encoded_json() {
        let mut item = ListItem::new("product");
        let unknown = item
            .from_array(crate::value::values([(
                "product.lists.config",
                json!("{\"width\":100}"),
            )]))
            .unwrap();
        assert!(unknown.is_empty());
        assert_eq!(item.config(), json!({"width": 100}));
    }

    #[test]
    fn test_round_trip() {
        let mut item = ListItem::new("product");
        item.set_domain("media")
            .set_list_type("default")
            .set_ref_id(Some(ItemId::from("7")))
            .set_parent_id(Some(ItemId::from("3")));
        item.set_position(2).unwrap();

        let list = item.to_array(true);
        let mut copy = ListItem::new("product");
        assert!(copy.from_array(list.clone()).unwrap().is_empty());
        assert_eq!(copy.to_array(true), list);
    }
}
