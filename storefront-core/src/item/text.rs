//! Localized text item.

use super::{apply_values, impl_item_base, opt_string, Item, ItemBase};
use crate::value::{self, ItemValues};
use crate::StoreResult;
use serde_json::Value;

const PREFIX: &str = "text.";

/// Localized text (name, short/long description, basket name).
#[derive(Debug, Clone, PartialEq)]
pub struct TextItem {
    base: ItemBase,
}

impl Default for TextItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
        }
    }
}

impl TextItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
        }
    }

    pub fn text_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_text_type(&mut self, text_type: &str) -> &mut Self {
        self.base.set_string("type", Some(text_type.to_string()));
        self
    }

    /// Domain of the items the text belongs to, e.g. `product`.
    pub fn domain(&self) -> String {
        self.base.string("domain").unwrap_or_default()
    }

    pub fn set_domain(&mut self, domain: &str) -> &mut Self {
        self.base.set_string("domain", Some(domain.to_string()));
        self
    }

    pub fn language_id(&self) -> Option<String> {
        self.base.string("languageid")
    }

    pub fn set_language_id(&mut self, language_id: Option<&str>) -> &mut Self {
        self.base
            .set_string("languageid", language_id.filter(|l| !l.is_empty()).map(str::to_string));
        self
    }

    pub fn label(&self) -> String {
        self.base.string("label").unwrap_or_default()
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.base.set_string("label", Some(label.to_string()));
        self
    }

    pub fn content(&self) -> String {
        self.base.string("content").unwrap_or_default()
    }

    pub fn set_content(&mut self, content: &str) -> &mut Self {
        self.base.set_string("content", Some(content.to_string()));
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
}

impl Item for TextItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "text"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "type" => {
                    item.set_text_type(&value::to_string(v));
                }
                "domain" => {
                    item.set_domain(&value::to_string(v));
                }
                "languageid" => {
                    item.set_language_id(value::to_string_opt(v).as_deref());
                }
                "label" => {
                    item.set_label(&value::to_string(v));
                }
                "content" => {
                    item.set_content(&value::to_string(v));
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

        list.insert(self.base.key("type"), Value::from(self.text_type()));
        list.insert(self.base.key("domain"), Value::from(self.domain()));
        list.insert(self.base.key("languageid"), opt_string(self.language_id()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("content"), Value::from(self.content()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_content_marks_modified() {
        let mut item = TextItem::new();
        item.set_content("Demo article");
        assert_eq!(item.content(), "Demo article");
        assert!(item.is_modified());
    }

    #[test]
    fn test_round_trip() {
        let mut item = TextItem::new();
        item.set_text_type("name")
            .set_domain("product")
            .set_language_id(Some("de"))
            .set_content("Kaffee");

        let list = item.to_array(true);
        let mut copy = TextItem::new();
        let unknown = copy.from_array(list.clone()).unwrap();

        assert!(unknown.is_empty());
        assert_eq!(copy.to_array(true), list);
    }
}
