use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use storefront_admin::{
    AdminError, Client, ClientConfig, ClientRegistry, MediaConfig, MemoryMediaStore, ProductImage,
    UploadedFile, View, SECTION,
};
use storefront_core::{
    Item, ItemId, ListItem, ListRefItem, MediaItem, PriceItem, ProductItem, RefQuery,
    StorageError, StoreResult, SupplierItem, TextItem,
};
use storefront_storage::{Criteria, Manager, MemoryManager, ProductManager};

struct Shop {
    lists: MemoryManager<ListItem>,
    media: MemoryManager<MediaItem>,
    products: ProductManager,
    files: MemoryMediaStore,
}

impl Shop {
    fn new() -> Self {
        let lists = MemoryManager::new("product/lists", || ListItem::new("product"));
        let media = MemoryManager::new("media", MediaItem::new);
        let products = ProductManager::new(
            Arc::new(MemoryManager::new("product", ProductItem::new)),
            Arc::new(lists.clone()),
            Arc::new(media.clone()),
            Arc::new(MemoryManager::new("price", PriceItem::new)),
            Arc::new(MemoryManager::new("supplier", SupplierItem::new)),
            Arc::new(MemoryManager::new("text", TextItem::new)),
        );

        Self {
            lists,
            media,
            products,
            files: MemoryMediaStore::new(MediaConfig::default()),
        }
    }

    fn client(&self) -> ProductImage {
        ProductImage::from_product_manager(&self.products, Arc::new(self.files.clone()))
    }

    fn product(&self) -> ProductItem {
        let mut product = ProductItem::new();
        product.set_code("CNC").unwrap();
        product.set_label("Cafe Noire Cappuccino");
        self.products.save(&mut product).unwrap();
        product
    }

    fn reload(&self, id: &ItemId) -> ProductItem {
        self.products.find(id, &["media"]).unwrap()
    }
}

fn upload(name: &str) -> UploadedFile {
    UploadedFile::new(name, "image/jpeg", name.as_bytes().to_vec())
}

fn images(product: &ProductItem) -> Vec<(ListItem, MediaItem)> {
    product
        .list_items(&RefQuery::new().domain("media").list_type("default"))
        .into_iter()
        .map(|list_item| {
            let media = list_item.ref_item().and_then(|r| r.as_media()).cloned().unwrap();
            (list_item.clone(), media)
        })
        .collect()
}

/// Store two uploads for `product` and return the reloaded product.
fn with_two_images(shop: &Shop, product: ProductItem) -> ProductItem {
    let id = product.id().unwrap();
    let mut view = View::new(product)
        .with_params(json!({
            "image": {
                "product.lists.id": ["", ""],
                "media.label": ["front", "back"],
                "media.languageid": ["en", ""]
            }
        }))
        .with_files("image/files", vec![upload("front.jpg"), upload("back.jpg")]);

    shop.client().save(&mut view).unwrap();
    assert!(view.errors().is_empty());
    shop.reload(&id)
}

#[test]
fn save_creates_list_and_media_items() {
    let shop = Shop::new();
    let product = with_two_images(&shop, shop.product());

    let stored = images(&product);
    assert_eq!(stored.len(), 2);

    let (first_list, first_media) = &stored[0];
    assert_eq!(first_list.position(), 0);
    assert_eq!(first_list.ref_id(), first_media.id());
    assert_eq!(first_list.parent_id(), product.id());
    assert_eq!(first_media.label(), "front");
    assert_eq!(first_media.language_id().as_deref(), Some("en"));
    assert_eq!(first_media.domain(), "product");

    let (second_list, second_media) = &stored[1];
    assert_eq!(second_list.position(), 1);
    assert_eq!(second_media.label(), "back");
    assert_eq!(second_media.language_id(), None);

    assert_eq!(shop.files.len().unwrap(), 2);
    assert_eq!(
        shop.files.read(&first_media.url()).unwrap(),
        Some(b"front.jpg".to_vec())
    );
}

#[test]
fn missing_upload_rolls_back_both_managers() {
    let shop = Shop::new();
    let product = shop.product();

    let mut view = View::new(product)
        .with_params(json!({ "image": { "product.lists.id": ["", ""] } }))
        .with_files("image/files", vec![upload("only.jpg")]);

    let err = shop.client().save(&mut view).unwrap_err();
    assert!(matches!(err, AdminError::Save { ref section } if section == SECTION));
    assert_eq!(view.errors()[SECTION], "No uploaded file for 1. new entry");

    assert!(shop.lists.is_empty().unwrap());
    assert!(shop.media.is_empty().unwrap());
    assert_eq!(shop.lists.transaction_depth().unwrap(), 0);
    assert_eq!(shop.media.transaction_depth().unwrap(), 0);
}

#[test]
fn rejected_upload_records_store_error() {
    let shop = Shop::new();
    let mut view = View::new(shop.product())
        .with_params(json!({ "image": { "product.lists.id": [""] } }))
        .with_files(
            "image/files",
            vec![UploadedFile::new("run.exe", "application/x-msdownload", vec![1])],
        );

    assert!(shop.client().save(&mut view).is_err());
    assert!(view.errors()[SECTION].contains("media.mimetype"));
    assert!(shop.media.is_empty().unwrap());
}

#[test]
fn unsubmitted_images_are_removed() {
    let shop = Shop::new();
    let product = with_two_images(&shop, shop.product());
    let id = product.id().unwrap();
    let stored = images(&product);
    let keep = stored[1].0.id().unwrap();
    let removed_url = stored[0].1.url();

    let mut view = View::new(product).with_params(json!({
        "image": {
            "product.lists.id": [keep.to_string()],
            "media.label": ["back side"]
        }
    }));
    shop.client().save(&mut view).unwrap();

    let remaining = images(&shop.reload(&id));
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].0.id(), Some(keep));
    assert_eq!(remaining[0].0.position(), 0);
    assert_eq!(remaining[0].1.label(), "back side");

    assert_eq!(shop.lists.len().unwrap(), 1);
    assert_eq!(shop.media.len().unwrap(), 1);
    assert_eq!(shop.files.read(&removed_url).unwrap(), None);
}

#[test]
fn get_lists_stored_images() {
    let shop = Shop::new();
    let product = with_two_images(&shop, shop.product());
    let expected: Vec<Value> = images(&product)
        .iter()
        .map(|(list_item, _)| json!(list_item.id().unwrap().to_string()))
        .collect();

    let mut view = View::new(product);
    let html = shop.client().get(&mut view).unwrap();

    assert_eq!(html, "<div class=\"product-item-image\"></div>");
    let data = view.get("imageData").unwrap();
    assert_eq!(data["product.lists.id"], Value::Array(expected));
    assert_eq!(data["media.label"], json!(["front", "back"]));
}

#[test]
fn new_product_gets_one_empty_block() {
    let shop = Shop::new();
    let mut view = View::new(ProductItem::new());
    shop.client().create(&mut view).unwrap();

    assert_eq!(view.get("imageData"), Some(&json!({ "product.lists.id": [""] })));
}

#[test]
fn submitted_params_take_precedence() {
    let shop = Shop::new();
    let product = with_two_images(&shop, shop.product());
    let params = json!({ "product.lists.id": ["x"], "media.label": ["typed"] });

    let mut view = View::new(product).with_params(json!({ "image": params.clone() }));
    shop.client().copy(&mut view).unwrap();
    assert_eq!(view.get("imageData"), Some(&params));
}

struct Fragment(&'static str);

impl Client for Fragment {
    fn create(&self, _: &mut View) -> storefront_admin::AdminResult<String> {
        Ok(self.0.to_string())
    }

    fn copy(&self, _: &mut View) -> storefront_admin::AdminResult<String> {
        Ok(self.0.to_string())
    }

    fn get(&self, _: &mut View) -> storefront_admin::AdminResult<String> {
        Ok(self.0.to_string())
    }

    fn save(&self, _: &mut View) -> storefront_admin::AdminResult<String> {
        Ok(String::new())
    }
}

#[test]
fn subclients_render_in_configured_order() {
    let shop = Shop::new();
    let mut registry = ClientRegistry::new();
    registry
        .register("meta", Arc::new(Fragment("<meta>")))
        .register("thumbs", Arc::new(Fragment("<thumbs>")));

    let config = ClientConfig {
        subparts: vec!["thumbs".to_string(), "meta".to_string()],
        decorators: vec!["log".to_string()],
    };
    let client = ProductImage::from_config(
        &shop.products,
        Arc::new(shop.files.clone()),
        &registry,
        &config,
    )
    .unwrap();

    let mut view = View::new(shop.product());
    let html = client.get(&mut view).unwrap();
    assert_eq!(html, "<div class=\"product-item-image\"><thumbs><meta></div>");
    assert_eq!(view.get("imageBody"), Some(&json!("<thumbs><meta>")));
}

#[test]
fn save_without_images_keeps_store_empty() {
    let shop = Shop::new();
    let mut view = View::new(shop.product());
    shop.client().save(&mut view).unwrap();

    let found = shop.lists.search(&Criteria::new(), &[]).unwrap();
    assert!(found.is_empty());
}

/// List manager refusing to commit.
struct CommitRefused(MemoryManager<ListItem>);

impl Manager<ListItem> for CommitRefused {
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
        self.0.begin()
    }

    fn commit(&self) -> StoreResult<()> {
        Err(StorageError::InsertFailed {
            domain: "product/lists".to_string(),
            reason: "commit refused".to_string(),
        }
        .into())
    }

    fn rollback(&self) -> StoreResult<()> {
        self.0.rollback()
    }
}

#[test]
fn failed_list_commit_leaves_committed_media_alone() {
    let shop = Shop::new();
    let product = shop.product();
    let client = ProductImage::new(
        Arc::new(shop.products.clone()),
        Arc::new(CommitRefused(shop.lists.clone())),
        Arc::new(shop.media.clone()),
        Arc::new(shop.files.clone()),
    );

    shop.media.begin().unwrap();
    let mut view = View::new(product)
        .with_params(json!({ "image": { "product.lists.id": [""] } }))
        .with_files("image/files", vec![upload("front.jpg")]);

    let err = client.save(&mut view).unwrap_err();
    assert!(matches!(err, AdminError::Save { .. }));
    assert!(view.errors()[SECTION].contains("commit refused"));

    assert!(shop.lists.is_empty().unwrap());
    assert_eq!(shop.lists.transaction_depth().unwrap(), 0);
    assert_eq!(shop.media.transaction_depth().unwrap(), 1);
    assert_eq!(shop.media.len().unwrap(), 1);
}
