//! Catalog product item.

use super::{apply_values, impl_item_base, opt_string, Item, ItemBase, ListRefItem, ListRefs};
use crate::identity::{parse_datetime, Timestamp};
use crate::value::{self, ItemValues};
use crate::StoreResult;
use serde_json::{Map, Value};

const PREFIX: &str = "product.";

/// Sellable product with its texts, media, prices and suppliers.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductItem {
    base: ItemBase,
    refs: ListRefs,
}

impl Default for ProductItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
            refs: ListRefs::new(),
        }
    }
}

impl ProductItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
            refs: ListRefs::new(),
        }
    }

    pub fn with_refs(mut self, refs: ListRefs) -> Self {
        self.refs = refs;
        self
    }

    /// Product type, e.g. `default`, `select` or `bundle`.
    pub fn product_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_product_type(&mut self, product_type: &str) -> &mut Self {
        self.base.set_string("type", Some(product_type.to_string()));
        self
    }

    /// Unique article code (SKU).
    pub fn code(&self) -> String {
        self.base.string("code").unwrap_or_default()
    }

    pub fn set_code(&mut self, code: &str) -> StoreResult<&mut Self> {
        let code = value::check_code(&self.base.key("code"), code)?;
        self.base.set_string("code", Some(code));
        Ok(self)
    }

    pub fn label(&self) -> String {
        self.base.string("label").unwrap_or_default()
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.base.set_string("label", Some(label.to_string()));
        self
    }

    /// Status, `1` (enabled) when unset.
    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }

    /// Start of the sale period.
    pub fn date_start(&self) -> Option<String> {
        self.base.string("datestart")
    }

    pub fn set_date_start(&mut self, date: Option<&str>) -> StoreResult<&mut Self> {
        let date = value::check_datetime(&self.base.key("datestart"), date)?;
        self.base.set_string("datestart", date);
        Ok(self)
    }

    /// End of the sale period.
    pub fn date_end(&self) -> Option<String> {
        self.base.string("dateend")
    }

    pub fn set_date_end(&mut self, date: Option<&str>) -> StoreResult<&mut Self> {
        let date = value::check_datetime(&self.base.key("dateend"), date)?;
        self.base.set_string("dateend", date);
        Ok(self)
    }

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

    /// URL target (e.g. a separate site) for the product page.
    pub fn target(&self) -> String {
        self.base.string("target").unwrap_or_default()
    }

    pub fn set_target(&mut self, target: &str) -> &mut Self {
        self.base.set_string("target", Some(target.to_string()));
        self
    }

    /// Enabled and inside its sale period at `now`.
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
}

impl Item for ProductItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "product"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "type" => {
                    item.set_product_type(&value::to_string(v));
                }
                "code" => {
                    item.set_code(&value::to_string(v))?;
                }
                "label" => {
                    item.set_label(&value::to_string(v));
                }
                "status" => {
                    item.set_status(value::to_i32(field, v)?);
                }
                "datestart" => {
                    item.set_date_start(value::to_string_opt(v).as_deref())?;
                }
                "dateend" => {
                    item.set_date_end(value::to_string_opt(v).as_deref())?;
                }
                "config" => {
                    item.set_config(v.clone());
                }
                "target" => {
                    item.set_target(&value::to_string(v));
                }
                _ => return Ok(false),
            }
            Ok(true)
        })
    }

    fn to_array(&self, private: bool) -> ItemValues {
        let mut list = ItemValues::new();
        self.base.common_to(&mut list, private);

        list.insert(self.base.key("type"), Value::from(self.product_type()));
        list.insert(self.base.key("code"), Value::from(self.code()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list.insert(self.base.key("datestart"), opt_string(self.date_start()));
        list.insert(self.base.key("dateend"), opt_string(self.date_end()));
        list.insert(self.base.key("target"), Value::from(self.target()));

        if private {
            list.insert(self.base.key("config"), self.config());
        }
        list
    }
}

impl ListRefItem for ProductItem {
    fn list_refs(&self) -> &ListRefs {
        &self.refs
    }

    fn list_refs_mut(&mut self) -> &mut ListRefs {
        &mut self.refs
    }

    fn label(&self) -> String {
        ProductItem::label(self)
    }
}
