//! Subscription item for recurring orders.

use super::{apply_values, impl_item_base, opt_string, Item, ItemBase};
use crate::value::{self, ItemValues};
use crate::{ItemId, StoreResult};
use serde_json::Value;

const PREFIX: &str = "subscription.";

/// Recurring order of one ordered product.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionItem {
    base: ItemBase,
}

impl Default for SubscriptionItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
        }
    }
}

impl SubscriptionItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
        }
    }

    /// ID of the ordered product the subscription renews.
    pub fn order_product_id(&self) -> Option<ItemId> {
        self.base.string("ordprodid").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    pub fn set_order_product_id(&mut self, id: Option<ItemId>) -> &mut Self {
        self.base.set_string("ordprodid", id.map(|id| id.to_string()));
        self
    }

    /// Date of the next renewal.
    pub fn date_next(&self) -> Option<String> {
        self.base.string("datenext")
    }

    pub fn set_date_next(&mut self, date: Option<&str>) -> StoreResult<&mut Self> {
        let date = value::check_datetime(&self.base.key("datenext"), date)?;
        self.base.set_string("datenext", date);
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

    /// Renewal interval as ISO-8601 period, e.g. `P1M`.
    pub fn interval(&self) -> String {
        self.base.string("interval").unwrap_or_default()
    }

    pub fn set_interval(&mut self, interval: &str) -> StoreResult<&mut Self> {
        let interval = value::check_interval(&self.base.key("interval"), interval)?;
        self.base.set_string("interval", Some(interval));
        Ok(self)
    }

    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }
}

impl Item for SubscriptionItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "subscription"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "ordprodid" => {
                    item.set_order_product_id(value::to_string_opt(v).map(ItemId::from));
                }
                "datenext" => {
                    item.set_date_next(value::to_string_opt(v).as_deref())?;
                }
                "dateend" => {
                    item.set_date_end(value::to_string_opt(v).as_deref())?;
                }
                "interval" => {
                    if let Some(interval) = value::to_string_opt(v).filter(|s| !s.is_empty()) {
                        item.set_interval(&interval)?;
                    }
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

        list.insert(
            self.base.key("ordprodid"),
            opt_string(self.order_product_id().map(|id| id.to_string())),
        );
        list.insert(self.base.key("datenext"), opt_string(self.date_next()));
        list.insert(self.base.key("dateend"), opt_string(self.date_end()));
        list.insert(self.base.key("interval"), opt_string(self.base.string("interval")));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_date_next_validation() {
        let mut item = SubscriptionItem::new();
        item.set_date_next(Some("2018-01-01")).unwrap();
        assert_eq!(item.date_next().as_deref(), Some("2018-01-01 00:00:00"));

        assert!(item.set_date_next(Some("2008-34-12")).is_err());
        assert_eq!(item.date_next().as_deref(), Some("2018-01-01 00:00:00"));
    }

    #[test]
    fn test_interval_validation() {
        let mut item = SubscriptionItem::new();
        item.set_interval("P0Y1M2W3D").unwrap();
        assert_eq!(item.interval(), "P0Y1M2W3D");
        assert!(item.is_modified());

        assert!(item.set_interval("P").is_err());
        assert!(item.set_interval("PT").is_err());
        assert!(item.set_interval("1 month").is_err());
        assert_eq!(item.interval(), "P0Y1M2W3D");
    }

    #[test]
    fn test_round_trip() {
        let mut item = SubscriptionItem::new();
        item.set_order_product_id(Some(ItemId::from("12")))
            .set_date_next(Some("2018-02-01 00:00:00"))
            .unwrap()
            .set_interval("P1M")
            .unwrap();

        let list = item.to_array(true);
        let mut copy = SubscriptionItem::new();
        assert!(copy.from_array(list.clone()).unwrap().is_empty());
        assert_eq!(copy.to_array(true), list);
    }
}
