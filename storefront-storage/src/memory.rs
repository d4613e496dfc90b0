//! In-memory manager with snapshot based transactions.

use crate::{Criteria, Manager};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use storefront_core::{
    new_item_id, now_string, Item, ItemId, StorageError, StoreResult,
};

type Factory<T> = Arc<dyn Fn() -> T + Send + Sync>;

struct State<T> {
    items: BTreeMap<ItemId, T>,
    snapshots: Vec<BTreeMap<ItemId, T>>,
}

impl<T> Default for State<T> {
    fn default() -> Self {
        Self {
            items: BTreeMap::new(),
            snapshots: Vec::new(),
        }
    }
}

/// Manager keeping items in a shared map.
///
/// Clones share the same storage. `begin` pushes a snapshot of the map,
/// `rollback` restores it and `commit` discards it.
pub struct MemoryManager<T> {
    domain: String,
    editor: String,
    factory: Factory<T>,
    state: Arc<RwLock<State<T>>>,
}

impl<T> Clone for MemoryManager<T> {
    fn clone(&self) -> Self {
        Self {
            domain: self.domain.clone(),
            editor: self.editor.clone(),
            factory: Arc::clone(&self.factory),
            state: Arc::clone(&self.state),
        }
    }
}

impl<T> fmt::Debug for MemoryManager<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryManager")
            .field("domain", &self.domain)
            .field("editor", &self.editor)
            .finish_non_exhaustive()
    }
}

impl<T: Item + Send + Sync> MemoryManager<T> {
    /// Create a manager for `domain` using `factory` for new items.
    pub fn new(domain: impl Into<String>, factory: impl Fn() -> T + Send + Sync + 'static) -> Self {
        Self {
            domain: domain.into(),
            editor: "storefront".to_string(),
            factory: Arc::new(factory),
            state: Arc::new(RwLock::new(State::default())),
        }
    }

    /// Editor tag stamped on saved items.
    pub fn with_editor(mut self, editor: impl Into<String>) -> Self {
        self.editor = editor.into();
        self
    }

    /// Number of stored items.
    pub fn len(&self) -> StoreResult<usize> {
        Ok(self.read()?.items.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    /// Depth of open transactions.
    pub fn transaction_depth(&self) -> StoreResult<usize> {
        Ok(self.read()?.snapshots.len())
    }

    /// Remove all items and open transactions.
    pub fn clear(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        state.items.clear();
        state.snapshots.clear();
        Ok(())
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, State<T>>> {
        self.state
            .read()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, State<T>>> {
        self.state
            .write()
            .map_err(|_| StorageError::LockPoisoned.into())
    }

    fn no_transaction(&self) -> StorageError {
        StorageError::NoTransaction {
            domain: self.domain.clone(),
        }
    }
}

impl<T: Item + Send + Sync> Manager<T> for MemoryManager<T> {
    fn domain(&self) -> &str {
        &self.domain
    }

    fn create_item(&self) -> T {
        (self.factory)()
    }

    fn find(&self, id: &ItemId, _domains: &[&str]) -> StoreResult<T> {
        self.read()?.items.get(id).cloned().ok_or_else(|| {
            StorageError::NotFound {
                domain: self.domain.clone(),
                id: id.clone(),
            }
            .into()
        })
    }

    fn search(&self, criteria: &Criteria, _domains: &[&str]) -> StoreResult<BTreeMap<ItemId, T>> {
        let state = self.read()?;
        let matches = state
            .items
            .iter()
            .filter(|(_, item)| criteria.matches(&item.to_array(true)))
            .skip(criteria.start())
            .take(criteria.size().unwrap_or(usize::MAX))
            .map(|(id, item)| (id.clone(), item.clone()))
            .collect();
        Ok(matches)
    }

    fn save(&self, item: &mut T) -> StoreResult<()> {
        let mut state = self.write()?;
        let id = item.id().unwrap_or_else(new_item_id);
        let created = !state.items.contains_key(&id);

        if !created && !item.is_modified() {
            return Ok(());
        }

        item.base_mut().persisted(id.clone(), &now_string(), &self.editor);
        state.items.insert(id.clone(), item.clone());

        tracing::debug!(domain = %self.domain, id = %id, created, "Saved item");
        Ok(())
    }

    fn delete(&self, ids: &[ItemId]) -> StoreResult<()> {
        let mut state = self.write()?;
        for id in ids {
            if state.items.remove(id).is_some() {
                tracing::debug!(domain = %self.domain, id = %id, "Deleted item");
            }
        }
        Ok(())
    }

    fn begin(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        let snapshot = state.items.clone();
        state.snapshots.push(snapshot);
        Ok(())
    }

    fn commit(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        state.snapshots.pop().ok_or_else(|| self.no_transaction())?;
        Ok(())
    }

    fn rollback(&self) -> StoreResult<()> {
        let mut state = self.write()?;
        let snapshot = state.snapshots.pop().ok_or_else(|| self.no_transaction())?;
        state.items = snapshot;
        tracing::debug!(domain = %self.domain, "Rolled back transaction");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Operator;
    use serde_json::json;
    use storefront_core::value::values;
    use storefront_core::{StoreError, TextItem};

    fn manager() -> MemoryManager<TextItem> {
        MemoryManager::new("text", TextItem::new)
    }

    fn text(content: &str) -> TextItem {
        let mut item = TextItem::new();
        item.set_text_type("name").set_content(content);
        item
    }

    #[test]
    fn test_save_assigns_id_and_clears_modified() {
        let manager = manager();
        let mut item = text("Kaffee");
        manager.save(&mut item).unwrap();

        let id = item.id().unwrap();
        assert!(!item.is_modified());
        assert!(item.time_created().is_some());
        assert_eq!(item.editor(), "storefront");
        assert_eq!(manager.find(&id, &[]).unwrap(), item);
    }

    #[test]
    fn test_save_stores_loaded_item() {
        let manager = manager();
        let mut item = TextItem::from_values(values([
            ("text.id", json!("5")),
            ("text.type", json!("name")),
            ("text.content", json!("Kaffee")),
        ]));
        assert!(!item.is_modified());

        manager.save(&mut item).unwrap();
        assert_eq!(manager.len().unwrap(), 1);

        let found = manager.find(&ItemId::from("5"), &[]).unwrap();
        assert_eq!(found.content(), "Kaffee");
    }

    #[test]
    fn test_update_keeps_ctime() {
        let manager = manager();
        let mut item = text("Kaffee");
        manager.save(&mut item).unwrap();
        let ctime = item.time_created();

        item.set_content("Tee");
        manager.save(&mut item).unwrap();
        assert_eq!(item.time_created(), ctime);
        assert_eq!(manager.len().unwrap(), 1);
    }

    #[test]
    fn test_find_missing_fails() {
        let err = manager().find(&ItemId::from("nope"), &[]).unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::NotFound { .. })));
    }

    #[test]
    fn test_search_and_slice() {
        let manager = manager();
        for content in ["a", "b", "c"] {
            manager.save(&mut text(content)).unwrap();
        }

        let all = manager.search(&Criteria::new(), &[]).unwrap();
        assert_eq!(all.len(), 3);

        let criteria = Criteria::new().compare(Operator::Eq, "text.content", "b");
        assert_eq!(manager.search(&criteria, &[]).unwrap().len(), 1);

        let sliced = manager.search(&Criteria::new().slice(1, 5), &[]).unwrap();
        assert_eq!(sliced.len(), 2);
    }

    #[test]
    fn test_rollback_restores_state() {
        let manager = manager();
        let mut kept = text("kept");
        manager.save(&mut kept).unwrap();

        manager.begin().unwrap();
        manager.save(&mut text("dropped")).unwrap();
        manager.delete(&[kept.id().unwrap()]).unwrap();
        manager.rollback().unwrap();

        assert_eq!(manager.len().unwrap(), 1);
        assert!(manager.find(&kept.id().unwrap(), &[]).is_ok());
        assert_eq!(manager.transaction_depth().unwrap(), 0);
    }

    #[test]
    fn test_commit_keeps_changes() {
        let manager = manager();
        manager.begin().unwrap();
        manager.save(&mut text("new")).unwrap();
        manager.commit().unwrap();
        assert_eq!(manager.len().unwrap(), 1);
    }

    #[test]
    fn test_commit_without_begin_fails() {
        let err = manager().commit().unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::NoTransaction { .. })));
        assert!(manager().rollback().is_err());
    }

    #[test]
    fn test_clones_share_storage() {
        let manager = manager();
        let other = manager.clone();
        manager.save(&mut text("shared")).unwrap();
        assert_eq!(other.len().unwrap(), 1);
    }
}
