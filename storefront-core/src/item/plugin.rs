//! Plugin configuration item.

use super::{apply_values, impl_item_base, Item, ItemBase};
use crate::value::{self, ItemValues};
use crate::{StoreResult, ValidationError};
use serde_json::{Map, Value};

const PREFIX: &str = "plugin.";

/// Configures one provider (e.g. `ProductGone`) for a plugin type.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginItem {
    base: ItemBase,
}

impl Default for PluginItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
        }
    }
}

impl PluginItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
        }
    }

    /// Plugin type, e.g. `order`.
    pub fn plugin_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_plugin_type(&mut self, plugin_type: &str) -> &mut Self {
        self.base.set_string("type", Some(plugin_type.to_string()));
        self
    }

    pub fn label(&self) -> String {
        self.base.string("label").unwrap_or_default()
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.base.set_string("label", Some(label.to_string()));
        self
    }

    /// Provider name, optionally followed by decorator names (`ProductGone,Log`).
    pub fn provider(&self) -> String {
        self.base.string("provider").unwrap_or_default()
    }

    pub fn set_provider(&mut self, provider: &str) -> &mut Self {
        self.base.set_string("provider", Some(provider.trim().to_string()));
        self
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

    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(1, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }
}

impl Item for PluginItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "plugin"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "type" => {
                    item.set_plugin_type(&value::to_string(v));
                }
                "label" => {
                    item.set_label(&value::to_string(v));
                }
                "provider" => {
                    item.set_provider(&value::to_string(v));
                }
                "config" => {
                    item.set_config(v.clone());
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

        list.insert(self.base.key("type"), Value::from(self.plugin_type()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("provider"), Value::from(self.provider()));
        list.insert(self.base.key("config"), self.config());
        list.insert(self.base.key("position"), Value::from(self.position()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_provider_is_trimmed() {
        let mut item = PluginItem::new();
        item.set_provider(" ProductGone ");
        assert_eq!(item.provider(), "ProductGone");
    }

    #[test]
    fn test_round_trip() {
        let mut item = PluginItem::new();
        item.set_plugin_type("order")
            .set_provider("ProductGone")
            .set_config(json!({"key": "value"}));
        item.set_position(3).unwrap();

        let list = item.to_array(true);
        let mut copy = PluginItem::new();
        assert!(copy.from_array(list.clone()).unwrap().is_empty());
        assert_eq!(copy.to_array(true), list);
    }
}
