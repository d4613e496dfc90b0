//! Manager abstraction over item persistence.

use crate::Criteria;
use std::collections::BTreeMap;
use storefront_core::{Item, ItemId, StoreResult};

/// Persistence of one item type.
///
/// `begin`/`commit`/`rollback` nest; every `begin` must be matched by
/// exactly one `commit` or `rollback`.
pub trait Manager<T: Item>: Send + Sync {
    /// Domain the manager is responsible for, e.g. `media` or `product/lists`.
    fn domain(&self) -> &str;

    /// New, empty item of the managed type.
    fn create_item(&self) -> T;

    /// Item with the given ID plus its references of `domains`.
    fn find(&self, id: &ItemId, domains: &[&str]) -> StoreResult<T>;

    /// Items matching `criteria`, keyed by ID.
    fn search(&self, criteria: &Criteria, domains: &[&str]) -> StoreResult<BTreeMap<ItemId, T>>;

    /// Insert or update the item; assigns the ID of new items.
    fn save(&self, item: &mut T) -> StoreResult<()>;

    /// Remove the items with the given IDs; unknown IDs are ignored.
    fn delete(&self, ids: &[ItemId]) -> StoreResult<()>;

    fn begin(&self) -> StoreResult<()>;

    fn commit(&self) -> StoreResult<()>;

    fn rollback(&self) -> StoreResult<()>;
}
