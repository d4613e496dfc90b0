//! Product manager resolving list references across domain managers.

use crate::{Criteria, Manager, MemoryManager, Operator};
use std::collections::BTreeMap;
use std::sync::Arc;
use storefront_core::{
    Item, ItemId, ListItem, ListRefItem, ListRefs, MediaItem, PriceItem, ProductItem, RefItem,
    StoreError, StoreResult, StorageError, SupplierItem, TextItem,
};

/// Reference domains a product can link to.
pub const PRODUCT_REF_DOMAINS: [&str; 5] = ["media", "price", "product", "supplier", "text"];

/// Composite manager for products and their list references.
///
/// Products are stored without references. Loading resolves the list
/// items of the requested domains through the domain managers; saving
/// writes the list items and referenced items back and removes
/// the list items deleted from the product.
#[derive(Clone)]
pub struct ProductManager {
    products: Arc<dyn Manager<ProductItem>>,
    lists: Arc<dyn Manager<ListItem>>,
    media: Arc<dyn Manager<MediaItem>>,
    prices: Arc<dyn Manager<PriceItem>>,
    suppliers: Arc<dyn Manager<SupplierItem>>,
    texts: Arc<dyn Manager<TextItem>>,
}

impl ProductManager {
    pub fn new(
        products: Arc<dyn Manager<ProductItem>>,
        lists: Arc<dyn Manager<ListItem>>,
        media: Arc<dyn Manager<MediaItem>>,
        prices: Arc<dyn Manager<PriceItem>>,
        suppliers: Arc<dyn Manager<SupplierItem>>,
        texts: Arc<dyn Manager<TextItem>>,
    ) -> Self {
        Self {
            products,
            lists,
            media,
            prices,
            suppliers,
            texts,
        }
    }

    /// Product manager backed entirely by in-memory managers.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(MemoryManager::new("product", ProductItem::new)),
            Arc::new(MemoryManager::new("product/lists", || ListItem::new("product"))),
            Arc::new(MemoryManager::new("media", MediaItem::new)),
            Arc::new(MemoryManager::new("price", PriceItem::new)),
            Arc::new(MemoryManager::new("supplier", SupplierItem::new)),
            Arc::new(MemoryManager::new("text", TextItem::new)),
        )
    }

    pub fn lists(&self) -> Arc<dyn Manager<ListItem>> {
        Arc::clone(&self.lists)
    }

    pub fn media(&self) -> Arc<dyn Manager<MediaItem>> {
        Arc::clone(&self.media)
    }

    pub fn prices(&self) -> Arc<dyn Manager<PriceItem>> {
        Arc::clone(&self.prices)
    }

    pub fn suppliers(&self) -> Arc<dyn Manager<SupplierItem>> {
        Arc::clone(&self.suppliers)
    }

    pub fn texts(&self) -> Arc<dyn Manager<TextItem>> {
        Arc::clone(&self.texts)
    }

    /// List items of `parent_ids` in the requested domains, grouped by parent.
    fn load_refs(&self, parent_ids: &[ItemId], domains: &[&str]) -> StoreResult<BTreeMap<ItemId, ListRefs>> {
        let mut grouped: BTreeMap<ItemId, Vec<ListItem>> = BTreeMap::new();
        if parent_ids.is_empty() || domains.is_empty() {
            return Ok(BTreeMap::new());
        }

        let ids: Vec<_> = parent_ids.iter().map(|id| id.to_string()).collect();
        let criteria = Criteria::new()
            .compare(Operator::Eq, "product.lists.parentid", ids)
            .compare(Operator::Eq, "product.lists.domain", domains.to_vec());

        let mut list_items: Vec<ListItem> = self.lists.search(&criteria, &[])?.into_values().collect();
        list_items.sort_by_key(|item| item.position());

        for mut list_item in list_items {
            let Some(parent_id) = list_item.parent_id() else {
                continue;
            };
            if let Some(ref_id) = list_item.ref_id() {
                let ref_item = self.resolve(&list_item.domain(), &ref_id)?;
                list_item.set_ref_item(ref_item);
            }
            grouped.entry(parent_id).or_default().push(list_item);
        }

        Ok(grouped
            .into_iter()
            .map(|(id, items)| {
                let mut refs = ListRefs::from_items(items);
                refs.retain_domains(domains);
                (id, refs)
            })
            .collect())
    }

    /// Referenced item of `domain`, `None` if it doesn't exist (any more).
    fn resolve(&self, domain: &str, id: &ItemId) -> StoreResult<Option<RefItem>> {
        let found = match domain {
            "media" => self.media.find(id, &[]).map(RefItem::from),
            "price" => self.prices.find(id, &[]).map(RefItem::from),
            "product" => self.products.find(id, &[]).map(RefItem::from),
            "supplier" => self.suppliers.find(id, &[]).map(RefItem::from),
            "text" => self.texts.find(id, &[]).map(RefItem::from),
            _ => return Ok(None),
        };

        match found {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::Storage(StorageError::NotFound { .. })) => {
                tracing::debug!(domain, id = %id, "Referenced item not found");
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Save a referenced item through its domain manager.
    fn save_ref(&self, item: &mut RefItem) -> StoreResult<()> {
        match item {
            RefItem::Media(media) => self.media.save(media),
            RefItem::Price(price) => self.prices.save(price),
            RefItem::Supplier(supplier) => self.suppliers.save(supplier),
            RefItem::Text(text) => self.texts.save(text),
            RefItem::Product(product) => self.products.save(product),
        }
    }

    fn save_refs(&self, item: &mut ProductItem, parent_id: &ItemId) -> StoreResult<()> {
        let deleted: Vec<ItemId> = item
            .list_refs_mut()
            .take_deleted()
            .into_values()
            .flatten()
            .filter_map(|list_item| list_item.id())
            .collect();
        self.lists.delete(&deleted)?;

        for list_item in item.list_refs_mut().iter_mut() {
            if let Some(ref_item) = list_item.ref_item_mut() {
                self.save_ref(ref_item)?;
                let ref_id = ref_item.id();
                list_item.set_ref_id(ref_id);
            }
            list_item.set_parent_id(Some(parent_id.clone()));

            let mut stored = list_item.clone();
            stored.set_ref_item(None);
            self.lists.save(&mut stored)?;
            *list_item.base_mut() = stored.base().clone();
        }
        Ok(())
    }
}

impl Manager<ProductItem> for ProductManager {
    fn domain(&self) -> &str {
        "product"
    }

    fn create_item(&self) -> ProductItem {
        self.products.create_item()
    }

    fn find(&self, id: &ItemId, domains: &[&str]) -> StoreResult<ProductItem> {
        let product = self.products.find(id, &[])?;
        let refs = self
            .load_refs(std::slice::from_ref(id), domains)?
            .remove(id)
            .unwrap_or_default();
        Ok(product.with_refs(refs))
    }

    fn search(&self, criteria: &Criteria, domains: &[&str]) -> StoreResult<BTreeMap<ItemId, ProductItem>> {
        let products = self.products.search(criteria, &[])?;
        let ids: Vec<ItemId> = products.keys().cloned().collect();
        let mut refs = self.load_refs(&ids, domains)?;

        Ok(products
            .into_iter()
            .map(|(id, product)| {
                let item_refs = refs.remove(&id).unwrap_or_default();
                (id, product.with_refs(item_refs))
            })
            .collect())
    }

    fn save(&self, item: &mut ProductItem) -> StoreResult<()> {
        let mut stored = item.clone().with_refs(ListRefs::new());
        self.products.save(&mut stored)?;
        *item.base_mut() = stored.base().clone();

        let parent_id = stored.id().ok_or_else(|| StorageError::InsertFailed {
            domain: "product".to_string(),
            reason: "no ID assigned".to_string(),
        })?;
        self.save_refs(item, &parent_id)
    }

    fn delete(&self, ids: &[ItemId]) -> StoreResult<()> {
        let parent_ids: Vec<_> = ids.iter().map(|id| id.to_string()).collect();
        let criteria = Criteria::new().compare(Operator::Eq, "product.lists.parentid", parent_ids);
        let list_ids: Vec<ItemId> = self.lists.search(&criteria, &[])?.into_keys().collect();

        self.lists.delete(&list_ids)?;
        self.products.delete(ids)
    }

    fn begin(&self) -> StoreResult<()> {
        self.products.begin()?;
        if let Err(err) = self.lists.begin() {
            if let Err(rollback) = self.products.rollback() {
                tracing::error!(error = %rollback, "Product rollback failed");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Commit products, then lists.
    ///
    /// A failing list commit can't undo the product commit; the list
    /// transaction is rolled back and the error returned.
    fn commit(&self) -> StoreResult<()> {
        self.products.commit()?;
        if let Err(err) = self.lists.commit() {
            tracing::error!(error = %err, "List commit failed after products were committed");
            if let Err(rollback) = self.lists.rollback() {
                tracing::error!(error = %rollback, "List rollback failed");
            }
            return Err(err);
        }
        Ok(())
    }

    /// Roll back both managers, returning the first failure.
    fn rollback(&self) -> StoreResult<()> {
        let products = self.products.rollback();
        let lists = self.lists.rollback();
        products.and(lists)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use storefront_core::value::values;
    use storefront_core::RefQuery;

    /// List manager whose transactions can't be opened.
    struct LockedLists(MemoryManager<ListItem>);

    impl Manager<ListItem> for LockedLists {
        fn domain(&self) -> &str {
            self.0.domain()
        }

        fn create_item(&self) -> ListItem {
            self.0.create_item()
        }

        fn find(&self, id: &ItemId, domains: &[&str]) -> StoreResult<ListItem> {
            self.0.find(id, domains)
        }

        fn search(&self, criteria: &Criteria, domains: &[&str]) -> StoreResult<BTreeMap<ItemId, ListItem>> {
            self.0.search(criteria, domains)
        }

        fn save(&self, item: &mut ListItem) -> StoreResult<()> {
            self.0.save(item)
        }

        fn delete(&self, ids: &[ItemId]) -> StoreResult<()> {
            self.0.delete(ids)
        }

        fn begin(&self) -> StoreResult<()> {
            Err(StorageError::LockPoisoned.into())
        }

        fn commit(&self) -> StoreResult<()> {
            self.0.commit()
        }

        fn rollback(&self) -> StoreResult<()> {
            self.0.rollback()
        }
    }

    fn product_with_refs() -> ProductItem {
        let mut product = ProductItem::new();
        product.set_code("CNC").unwrap();
        product.set_label("Cafe Noire Cappuccino");

        let mut text = TextItem::new();
        text.set_text_type("name").set_content("Kaffee");
        let mut media = MediaItem::new();
        media.set_media_type("default").set_url("files/cnc.jpg");

        let mut list = ListItem::new("product");
        list.set_list_type("default");
        product.add_ref_item("text", list.clone(), Some(text.into()));
        product.add_ref_item("media", list, Some(media.into()));
        product
    }

    #[test]
    fn test_save_and_find_with_refs() {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).unwrap();

        let id = product.id().unwrap();
        let found = manager.find(&id, &["text", "media"]).unwrap();
        assert_eq!(found.code(), "CNC");
        assert_eq!(found.name("name"), "Kaffee");
        assert_eq!(found.list_items(&RefQuery::new()).len(), 2);

        let list_item = found.list_items(&RefQuery::new().domain("text"))[0];
        assert_eq!(list_item.parent_id(), Some(id));
        assert!(list_item.id().is_some());
    }

    #[test]
    fn test_find_honours_domains() {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).unwrap();

        let found = manager.find(&product.id().unwrap(), &["media"]).unwrap();
        assert_eq!(found.list_refs().domains().collect::<Vec<_>>(), vec!["media"]);

        let bare = manager.find(&product.id().unwrap(), &[]).unwrap();
        assert!(bare.list_refs().is_empty());
    }

    #[test]
    fn test_deleted_list_items_are_removed() {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).unwrap();

        let mut found = manager.find(&product.id().unwrap(), &["media", "text"]).unwrap();
        let media_list = found.list_items(&RefQuery::new().domain("media"))[0].clone();
        found.delete_ref_item("media", &media_list).unwrap();
        manager.save(&mut found).unwrap();

        assert!(found.deleted_items().is_empty());
        let reloaded = manager.find(&product.id().unwrap(), &["media", "text"]).unwrap();
        assert!(reloaded.list_items(&RefQuery::new().domain("media")).is_empty());
        assert_eq!(reloaded.list_items(&RefQuery::new().domain("text")).len(), 1);
    }

    #[test]
    fn test_save_stores_loaded_product() {
        let manager = ProductManager::in_memory();
        let mut product = ProductItem::from_values(values([
            ("product.id", json!("5")),
            ("product.code", json!("CNC")),
        ]));

        manager.save(&mut product).unwrap();

        let found = manager.find(&ItemId::from("5"), &[]).unwrap();
        assert_eq!(found.code(), "CNC");
    }

    #[test]
    fn test_failed_begin_closes_product_transaction() {
        let products = MemoryManager::new("product", ProductItem::new);
        let manager = ProductManager::new(
            Arc::new(products.clone()),
            Arc::new(LockedLists(MemoryManager::new("product/lists", || ListItem::new("product")))),
            Arc::new(MemoryManager::new("media", MediaItem::new)),
            Arc::new(MemoryManager::new("price", PriceItem::new)),
            Arc::new(MemoryManager::new("supplier", SupplierItem::new)),
            Arc::new(MemoryManager::new("text", TextItem::new)),
        );

        let err = manager.begin().unwrap_err();
        assert!(matches!(err, StoreError::Storage(StorageError::LockPoisoned)));
        assert_eq!(products.transaction_depth().unwrap(), 0);
    }

    #[test]
    fn test_rollback_reaches_lists_after_product_failure() {
        let manager = ProductManager::in_memory();
        manager.lists().begin().unwrap();

        assert!(manager.rollback().is_err());
        assert!(manager.lists().commit().is_err());
    }

    #[test]
    fn test_missing_ref_stays_unresolved() {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).unwrap();

        let text_id = product.ref_items(&RefQuery::new().domain("text"))[0].id().unwrap();
        manager.texts().delete(&[text_id]).unwrap();

        let found = manager.find(&product.id().unwrap(), &["text"]).unwrap();
        assert_eq!(found.list_items(&RefQuery::new().domain("text")).len(), 1);
        assert!(found.ref_items(&RefQuery::new().domain("text")).is_empty());
        assert_eq!(found.name("name"), "Cafe Noire Cappuccino");
    }

    #[test]
    fn test_search_by_id_list() {
        let manager = ProductManager::in_memory();
        let mut first = ProductItem::new();
        first.set_code("A").unwrap();
        let mut second = ProductItem::new();
        second.set_code("B").unwrap();
        manager.save(&mut first).unwrap();
        manager.save(&mut second).unwrap();

        let ids = vec![first.id().unwrap().to_string(), "unknown".to_string()];
        let criteria = Criteria::new().compare(Operator::Eq, "product.id", ids);
        let found = manager.search(&criteria, &[]).unwrap();

        assert_eq!(found.len(), 1);
        assert!(found.contains_key(&first.id().unwrap()));
    }

    #[test]
    fn test_delete_removes_list_items() {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).unwrap();

        manager.delete(&[product.id().unwrap()]).unwrap();
        assert!(manager.find(&product.id().unwrap(), &[]).is_err());
        assert!(manager.lists().search(&Criteria::new(), &[]).unwrap().is_empty());
    }
}
