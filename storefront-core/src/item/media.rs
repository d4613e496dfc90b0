//! Media item (images, downloads).

use super::{apply_values, impl_item_base, opt_string, Item, ItemBase, ListRefItem, ListRefs};
use crate::value::{self, ItemValues};
use crate::StoreResult;
use serde_json::Value;

const PREFIX: &str = "media.";

/// Stored file with its preview, owning its own list references.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaItem {
    base: ItemBase,
    refs: ListRefs,
}

impl Default for MediaItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
            refs: ListRefs::new(),
        }
    }
}

impl MediaItem {
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

    pub fn media_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_media_type(&mut self, media_type: &str) -> &mut Self {
        self.base.set_string("type", Some(media_type.to_string()));
        self
    }

    pub fn domain(&self) -> String {
        self.base.string("domain").unwrap_or_default()
    }

    pub fn set_domain(&mut self, domain: &str) -> &mut Self {
        self.base.set_string("domain", Some(domain.to_string()));
        self
    }

    pub fn label(&self) -> String {
        self.base.string("label").unwrap_or_default()
    }

    pub fn set_label(&mut self, label: &str) -> &mut Self {
        self.base.set_string("label", Some(label.to_string()));
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

    pub fn mime_type(&self) -> String {
        self.base.string("mimetype").unwrap_or_default()
    }

    pub fn set_mime_type(&mut self, mime_type: &str) -> &mut Self {
        self.base.set_string("mimetype", Some(mime_type.to_string()));
        self
    }

    pub fn url(&self) -> String {
        self.base.string("url").unwrap_or_default()
    }

    pub fn set_url(&mut self, url: &str) -> &mut Self {
        self.base.set_string("url", Some(url.to_string()));
        self
    }

    pub fn preview(&self) -> String {
        self.base.string("preview").unwrap_or_default()
    }

    pub fn set_preview(&mut self, preview: &str) -> &mut Self {
        self.base.set_string("preview", Some(preview.to_string()));
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

impl Item for MediaItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "media"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "type" => {
                    item.set_media_type(&value::to_string(v));
                }
                "domain" => {
                    item.set_domain(&value::to_string(v));
                }
                "label" => {
                    item.set_label(&value::to_string(v));
                }
                "languageid" => {
                    item.set_language_id(value::to_string_opt(v).as_deref());
                }
                "mimetype" => {
                    item.set_mime_type(&value::to_string(v));
                }
                "url" => {
                    item.set_url(&value::to_string(v));
                }
                "preview" => {
                    item.set_preview(&value::to_string(v));
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

        list.insert(self.base.key("type"), Value::from(self.media_type()));
        list.insert(self.base.key("domain"), Value::from(self.domain()));
        list.insert(self.base.key("label"), Value::from(self.label()));
        list.insert(self.base.key("languageid"), opt_string(self.language_id()));
        list.insert(self.base.key("mimetype"), Value::from(self.mime_type()));
        list.insert(self.base.key("url"), Value::from(self.url()));
        list.insert(self.base.key("preview"), Value::from(self.preview()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

impl ListRefItem for MediaItem {
    fn list_refs(&self) -> &ListRefs {
        &self.refs
    }

    fn list_refs_mut(&mut self) -> &mut ListRefs {
        &mut self.refs
    }

    fn label(&self) -> String {
        MediaItem::label(self)
    }
}
