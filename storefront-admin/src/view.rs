//! Request/response state shared by the clients of one admin action.

use serde_json::Value;
use std::collections::BTreeMap;
use storefront_core::{value, ProductItem};

/// File uploaded with the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub name: String,
    pub mime_type: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            content,
        }
    }
}

/// Parameters, uploads, assigned data and errors of an admin request.
///
/// Parameters are a JSON object addressed by `/` separated paths, e.g.
/// `image/media.label/0`. Array elements are addressed by index.
#[derive(Debug, Clone, Default)]
pub struct View {
    item: ProductItem,
    params: Value,
    files: BTreeMap<String, Vec<UploadedFile>>,
    assigned: BTreeMap<String, Value>,
    errors: BTreeMap<String, String>,
}

impl View {
    /// View editing `item`.
    pub fn new(item: ProductItem) -> Self {
        Self {
            item,
            ..Self::default()
        }
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = params;
        self
    }

    /// Attach uploads under `path`, e.g. `image/files`.
    pub fn with_files(mut self, path: impl Into<String>, files: Vec<UploadedFile>) -> Self {
        self.files.insert(path.into(), files);
        self
    }

    pub fn item(&self) -> &ProductItem {
        &self.item
    }

    pub fn set_item(&mut self, item: ProductItem) -> &mut Self {
        self.item = item;
        self
    }

    /// Parameter at `path`, `None` if any segment is missing.
    pub fn param(&self, path: &str) -> Option<&Value> {
        path.split('/').try_fold(&self.params, |current, segment| match current {
            Value::Object(map) => map.get(segment),
            Value::Array(list) => segment.parse::<usize>().ok().and_then(|i| list.get(i)),
            _ => None,
        })
    }

    /// Scalar parameter at `path` as string.
    pub fn param_str(&self, path: &str) -> Option<String> {
        self.param(path).and_then(value::to_string_opt)
    }

    /// Parameter at `path` as list of strings; a scalar becomes a one
    /// element list.
    pub fn param_list(&self, path: &str) -> Vec<String> {
        match self.param(path) {
            Some(Value::Array(list)) => list.iter().map(value::to_string).collect(),
            Some(Value::Null) | None => Vec::new(),
            Some(other) => vec![value::to_string(other)],
        }
    }

    /// Uploads attached under `path`.
    pub fn files(&self, path: &str) -> &[UploadedFile] {
        self.files.get(path).map(Vec::as_slice).unwrap_or_default()
    }

    /// Assign a value for rendering.
    pub fn assign(&mut self, key: impl Into<String>, value: Value) -> &mut Self {
        self.assigned.insert(key.into(), value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.assigned.get(key)
    }

    /// Errors recorded so far, keyed by section.
    pub fn errors(&self) -> &BTreeMap<String, String> {
        &self.errors
    }

    /// Record an error for `section` unless one is already recorded.
    pub fn add_error(&mut self, section: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.errors.entry(section.into()).or_insert_with(|| message.into());
        self
    }

    /// Wrap `body` into the markup of `section`.
    pub fn render(&self, section: &str, body: &str) -> String {
        format!("<div class=\"{}\">{}</div>", section, body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn view() -> View {
        View::default().with_params(json!({
            "image": {
                "product.lists.id": ["12", ""],
                "media.label": ["front", "back"],
                "media.languageid": "de"
            }
        }))
    }

    #[test]
    fn test_param_paths() {
        let view = view();
        assert_eq!(view.param_str("image/media.label/1").as_deref(), Some("back"));
        assert_eq!(view.param_str("image/media.languageid").as_deref(), Some("de"));
        assert!(view.param("image/media.label/2").is_none());
        assert!(view.param("other/key").is_none());
    }

    #[test]
    fn test_param_list() {
        let view = view();
        assert_eq!(view.param_list("image/product.lists.id"), vec!["12", ""]);
        assert_eq!(view.param_list("image/media.languageid"), vec!["de"]);
        assert!(view.param_list("image/missing").is_empty());
    }

    #[test]
    fn test_first_error_wins() {
        let mut view = View::default();
        view.add_error("product-item-image", "first").add_error("product-item-image", "second");
        assert_eq!(view.errors()["product-item-image"], "first");
    }

    #[test]
    fn test_files_default_empty() {
        let view = View::default().with_files(
            "image/files",
            vec![UploadedFile::new("a.png", "image/png", vec![1, 2])],
        );
        assert_eq!(view.files("image/files").len(), 1);
        assert!(view.files("other").is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Submitted lists come back unchanged and in order.
        #[test]
        fn prop_param_list_keeps_order(ids in prop::collection::vec("[a-z0-9]{0,6}", 0..6)) {
            let view = View::default().with_params(json!({ "image": { "product.lists.id": ids.clone() } }));
            prop_assert_eq!(view.param_list("image/product.lists.id"), ids);
        }
    }
}
