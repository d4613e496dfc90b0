//! Value container shared by every item type.

use crate::value::{self, ItemValues};
use crate::{ItemId, StoreResult, ValidationError};
use serde_json::Value;
use std::borrow::Cow;

/// Namespaced value map plus the dirty flag of one item.
///
/// Typed setters on the concrete items funnel through the `set_*` methods
/// here, which compare the coerced new value with the current one and only
/// store it (and flag the item modified) when they differ.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemBase {
    prefix: Cow<'static, str>,
    values: ItemValues,
    modified: bool,
}

impl ItemBase {
    /// Empty container for a new item.
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self {
            prefix: prefix.into(),
            values: ItemValues::new(),
            modified: false,
        }
    }

    /// Container loaded from a persisted row; starts unmodified.
    pub fn with_values(prefix: impl Into<Cow<'static, str>>, values: ItemValues) -> Self {
        Self {
            prefix: prefix.into(),
            values,
            modified: false,
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Fully qualified key of a field.
    pub fn key(&self, field: &str) -> String {
        format!("{}{}", self.prefix, field)
    }

    /// Field name of a key in this namespace, `None` for foreign keys.
    pub fn field<'a>(&self, key: &'a str) -> Option<&'a str> {
        key.strip_prefix(self.prefix.as_ref())
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn set_modified(&mut self) {
        self.modified = true;
    }

    /// Raw value of a field; `null` counts as absent.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.values
            .get(&self.key(field))
            .filter(|v| !v.is_null())
    }

    pub fn string(&self, field: &str) -> Option<String> {
        self.get(field).and_then(value::to_string_opt)
    }

    /// Integer value; unparsable stored values read as absent.
    pub fn int(&self, field: &str) -> Option<i64> {
        self.get(field)
            .and_then(|v| value::to_int_opt(field, v).ok().flatten())
    }

    pub fn set_string(&mut self, field: &str, value: Option<String>) -> bool {
        if self.string(field) == value {
            return false;
        }
        let stored = value.map(Value::String).unwrap_or(Value::Null);
        self.store(field, stored)
    }

    pub fn set_int(&mut self, field: &str, value: Option<i64>) -> bool {
        if self.int(field) == value {
            return false;
        }
        let stored = value.map(Value::from).unwrap_or(Value::Null);
        self.store(field, stored)
    }

    pub fn set_json(&mut self, field: &str, value: Value) -> bool {
        if self.get(field).unwrap_or(&Value::Null) == &value {
            return false;
        }
        self.store(field, value)
    }

    fn store(&mut self, field: &str, value: Value) -> bool {
        let key = self.key(field);
        self.values.insert(key, value);
        self.modified = true;
        true
    }

    // === Common fields ===

    pub fn id(&self) -> Option<ItemId> {
        self.string("id").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    /// Set or clear the ID.
    ///
    /// An unset ID may be assigned and any ID may be cleared; replacing a
    /// stored ID with a different one fails.
    pub fn set_id(&mut self, id: Option<ItemId>) -> StoreResult<()> {
        let current = self.id();
        if let (Some(old), Some(new)) = (&current, &id) {
            if old != new {
                return Err(ValidationError::IdChange {
                    field: self.key("id"),
                    old: old.clone(),
                    new: new.clone(),
                }
                .into());
            }
        }
        self.set_string("id", id.map(|id| id.to_string()));
        Ok(())
    }

    pub fn site_id(&self) -> Option<String> {
        self.string("siteid")
    }

    pub fn set_site_id(&mut self, site_id: Option<String>) -> bool {
        self.set_string("siteid", site_id)
    }

    pub fn time_created(&self) -> Option<String> {
        self.string("ctime")
    }

    pub fn time_modified(&self) -> Option<String> {
        self.string("mtime")
    }

    pub fn editor(&self) -> String {
        self.string("editor").unwrap_or_default()
    }

    /// Acknowledge a save: stamp ID, times and editor and clear the dirty flag.
    ///
    /// Only storage implementations call this; it is the "load" half of the
    /// lifecycle, not a setter.
    pub fn persisted(&mut self, id: ItemId, now: &str, editor: &str) {
        if self.time_created().is_none() {
            self.store("ctime", Value::from(now));
        }
        self.store("id", Value::from(id.to_string()));
        self.store("mtime", Value::from(now));
        self.store("editor", Value::from(editor));
        self.modified = false;
    }

    /// Apply one of the common fields from a snapshot.
    ///
    /// Returns `false` when the field isn't a common one.
    pub fn apply_common(&mut self, field: &str, value: &Value) -> StoreResult<bool> {
        match field {
            "id" => {
                let id = value::to_string_opt(value)
                    .filter(|s| !s.is_empty())
                    .map(ItemId::from);
                self.set_id(id)?;
            }
            "siteid" => {
                self.set_site_id(value::to_string_opt(value));
            }
            "ctime" | "mtime" | "editor" => {
                self.set_string(field, value::to_string_opt(value));
            }
            _ => return Ok(false),
        }
        Ok(true)
    }

    /// Emit the common fields into a snapshot.
    pub fn common_to(&self, list: &mut ItemValues, private: bool) {
        list.insert(
            self.key("id"),
            self.id().map(|id| Value::from(id.to_string())).unwrap_or(Value::Null),
        );

        if private {
            list.insert(self.key("siteid"), opt_string(self.site_id()));
            list.insert(self.key("ctime"), opt_string(self.time_created()));
            list.insert(self.key("mtime"), opt_string(self.time_modified()));
            list.insert(self.key("editor"), Value::from(self.editor()));
        }
    }
}

/// `Some(s)` as a JSON string, `None` as `null`.
pub fn opt_string(value: Option<String>) -> Value {
    value.map(Value::String).unwrap_or(Value::Null)
}

/// `Some(i)` as a JSON number, `None` as `null`.
pub fn opt_int(value: Option<i64>) -> Value {
    value.map(Value::from).unwrap_or(Value::Null)
}
