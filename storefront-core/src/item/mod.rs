//! Domain items built on the shared value container.

mod base;
mod list_ref;
mod lists;
mod media;
mod plugin;
mod price;
mod product;
mod subscription;
mod supplier;
mod text;

pub use base::{opt_int, opt_string, ItemBase};
pub use list_ref::{DeletedItems, ListRefItem, ListRefs, RefItem, RefQuery};
pub use lists::ListItem;
pub use media::MediaItem;
pub use plugin::PluginItem;
pub use price::PriceItem;
pub use product::ProductItem;
pub use subscription::SubscriptionItem;
pub use supplier::SupplierItem;
pub use text::TextItem;

use crate::value::ItemValues;
use crate::{ItemId, StoreResult};
use serde_json::Value;
use std::fmt;

/// Common contract of all storefront items.
pub trait Item: Clone + fmt::Debug {
    /// Shared value container.
    fn base(&self) -> &ItemBase;

    fn base_mut(&mut self) -> &mut ItemBase;

    /// Resource name of the item, e.g. `product` or `order/base/product`.
    fn resource_type(&self) -> &'static str;

    /// Apply a flat snapshot and return the keys that weren't recognized.
    ///
    /// Either every recognized key is applied or, on the first invalid
    /// value, none is.
    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues>;

    /// Flat snapshot of the item; `private` adds the internal fields.
    fn to_array(&self, private: bool) -> ItemValues;

    fn id(&self) -> Option<ItemId> {
        self.base().id()
    }

    fn set_id(&mut self, id: Option<ItemId>) -> StoreResult<&mut Self> {
        self.base_mut().set_id(id)?;
        Ok(self)
    }

    fn site_id(&self) -> Option<String> {
        self.base().site_id()
    }

    fn time_created(&self) -> Option<String> {
        self.base().time_created()
    }

    fn time_modified(&self) -> Option<String> {
        self.base().time_modified()
    }

    fn editor(&self) -> String {
        self.base().editor()
    }

    fn is_modified(&self) -> bool {
        self.base().is_modified()
    }
}

/// Run `apply` for every key of `values` on a working copy of `item`.
///
/// `apply` returns `Ok(false)` for fields it doesn't know; those fall back
/// to the common fields and then into the returned unknown set.
pub(crate) fn apply_values<T, F>(item: &mut T, values: ItemValues, mut apply: F) -> StoreResult<ItemValues>
where
    T: Item,
    F: FnMut(&mut T, &str, &Value) -> StoreResult<bool>,
{
    let mut next = item.clone();
    let mut unknown = ItemValues::new();

    for (key, value) in values {
        let known = match next.base().field(&key) {
            Some(field) => {
                apply(&mut next, field, &value)? || next.base_mut().apply_common(field, &value)?
            }
            None => false,
        };

        if !known {
            unknown.insert(key, value);
        }
    }

    *item = next;
    Ok(unknown)
}

/// Implements the `base`/`base_mut` accessors for items with a `base` field.
macro_rules! impl_item_base {
    () => {
        fn base(&self) -> &$crate::item::ItemBase {
            &self.base
        }

        fn base_mut(&mut self) -> &mut $crate::item::ItemBase {
            &mut self.base
        }
    };
}

pub(crate) use impl_item_base;
