//! Supplier item.

use super::{apply_values, impl_item_base, Item, ItemBase};
use crate::value::{self, ItemValues};
use crate::StoreResult;
use serde_json::Value;

const PREFIX: &str = "supplier.";

#[derive(Debug, Clone, PartialEq)]
pub struct SupplierItem {
    base: ItemBase,
}

impl Default for SupplierItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
        }
    }
}

impl SupplierItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
        }
    }

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

    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }
}

impl Item for SupplierItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "supplier"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "code" => {
                    item.set_code(&value::to_string(v))?;
                }
                "label" => {
                    item.set_label(&value::to_string(v));
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

        list.insert(self.base.key("code"), Value::from(self.code()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}
