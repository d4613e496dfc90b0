//! Price item.

use super::{apply_values, impl_item_base, opt_string, Item, ItemBase};
use crate::value::{self, ItemValues};
use crate::{StoreResult, ValidationError};
use serde_json::Value;

const PREFIX: &str = "price.";

/// Amounts are kept as decimal strings with two fraction digits.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceItem {
    base: ItemBase,
}

impl Default for PriceItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
        }
    }
}

impl PriceItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
        }
    }

    pub fn price_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_price_type(&mut self, price_type: &str) -> &mut Self {
        self.base.set_string("type", Some(price_type.to_string()));
        self
    }

    pub fn label(&self) -> String {
        self.base.string("label").unwrap_or_default()
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.base.set_string("label", Some(label.to_string()));
        self
    }

    /// Three letter ISO currency code.
    pub fn currency_id(&self) -> Option<String> {
        self.base.string("currencyid")
    }

    pub fn set_currency_id(&mut self, currency_id: Option<&str>) -> StoreResult<&mut Self> {
        let currency_id = currency_id.filter(|c| !c.is_empty());
        if let Some(code) = currency_id {
            if code.len() != 3 || !code.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(ValidationError::InvalidFormat {
                    field: self.base.key("currencyid"),
                    value: code.to_string(),
                    expected: "three letter ISO currency code".to_string(),
                }
                .into());
            }
        }
        self.base.set_string("currencyid", currency_id.map(str::to_string));
        Ok(self)
    }

    /// Minimum quantity the price applies to, `1` when unset.
    pub fn quantity(&self) -> i64 {
        self.base.int("quantity").unwrap_or(1)
    }

    pub fn set_quantity(&mut self, quantity: i64) -> &mut Self {
        self.base.set_int("quantity", Some(quantity));
        self
    }

    pub fn value(&self) -> String {
        self.amount("value")
    }

    pub fn set_value(&mut self, value: impl Into<Value>) -> StoreResult<&mut Self> {
        self.set_amount("value", value.into())
    }

    pub fn costs(&self) -> String {
        self.amount("costs")
    }

    pub fn set_costs(&mut self, costs: impl Into<Value>) -> StoreResult<&mut Self> {
        self.set_amount("costs", costs.into())
    }

    pub fn rebate(&self) -> String {
        self.amount("rebate")
    }

    pub fn set_rebate(&mut self, rebate: impl Into<Value>) -> StoreResult<&mut Self> {
        self.set_amount("rebate", rebate.into())
    }

    pub fn tax_rate(&self) -> String {
        self.amount("taxrate")
    }

    pub fn set_tax_rate(&mut self, tax_rate: impl Into<Value>) -> StoreResult<&mut Self> {
        self.set_amount("taxrate", tax_rate.into())
    }

    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }

    /// Same amounts, quantity and currency; type, label and status are ignored.
    pub fn compare(&self, other: &PriceItem) -> bool {
        self.value() == other.value()
            && self.costs() == other.costs()
            && self.rebate() == other.rebate()
            && self.tax_rate() == other.tax_rate()
            && self.quantity() == other.quantity()
            && self.currency_id() == other.currency_id()
    }

    fn amount(&self, field: &str) -> String {
        self.base
            .get(field)
            .and_then(|v| value::check_price(field, v).ok())
            .unwrap_or_else(|| "0.00".to_string())
    }

    fn set_amount(&mut self, field: &str, amount: Value) -> StoreResult<&mut Self> {
        let amount = value::check_price(&self.base.key(field), &amount)?;
        self.base.set_string(field, Some(amount));
        Ok(self)
    }
}

impl Item for PriceItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "price"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "type" => {
                    item.set_price_type(&value::to_string(v));
                }
                "label" => {
                    item.set_label(&value::to_string(v));
                }
                "currencyid" => {
                    item.set_currency_id(value::to_string_opt(v).as_deref())?;
                }
                "quantity" => {
                    item.set_quantity(value::to_int_opt(field, v)?.unwrap_or(1));
                }
                "value" | "costs" | "rebate" | "taxrate" => {
                    item.set_amount(field, v.clone())?;
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

        list.insert(self.base.key("type"), Value::from(self.price_type()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("currencyid"), opt_string(self.currency_id()));
        list.insert(self.base.key("quantity"), Value::from(self.quantity()));
        list.insert(self.base.key("value"), Value::from(self.value()));
        list.insert(self.base.key("costs"), Value::from(self.costs()));
        list.insert(self.base.key("rebate"), Value::from(self.rebate()));
        list.insert(self.base.key("taxrate"), Value::from(self.tax_rate()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amounts_are_normalised() {
        let mut item = PriceItem::new();
        item.set_value("12.5").unwrap().set_costs(1).unwrap();
        assert_eq!(item.value(), "12.50");
        assert_eq!(item.costs(), "1.00");
        assert_eq!(item.rebate(), "0.00");
    }

    #[test]
    fn test_equal_amount_keeps_clean() {
        let mut item = PriceItem::from_values(value::values([("price.value", Value::from("10.00"))]));
        item.set_value(10).unwrap();
        assert!(!item.is_modified());
    }

    #[test]
    fn test_invalid_currency_is_rejected() {
        let mut item = PriceItem::new();
        assert!(item.set_currency_id(Some("euro")).is_err());
        assert!(item.set_currency_id(Some("EUR")).is_ok());
        assert_eq!(item.currency_id().as_deref(), Some("EUR"));
    }

    #[test]
    fn test_round_trip() {
        let mut item = PriceItem::new();
        item.set_price_type("default").set_quantity(5);
        item.set_currency_id(Some("EUR")).unwrap();
        item.set_value("99.99").unwrap().set_tax_rate("19").unwrap();

        let list = item.to_array(true);
        let mut copy = PriceItem::new();
        assert!(copy.from_array(list.clone()).unwrap().is_empty());
        assert_eq!(copy.to_array(true), list);
    }
}
