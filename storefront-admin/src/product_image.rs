//! Image section of the product editor.

use crate::client::{render_all, Client, ClientAction, ClientRegistry};
use crate::config::ClientConfig;
use crate::{AdminError, AdminResult, ConfigError, MediaController, View};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use storefront_core::{
    Item, ItemId, ListItem, ListRefItem, MediaItem, ProductItem, RefItem, RefQuery, StoreError,
    ValidationError,
};
use storefront_storage::{Manager, ProductManager};

/// Section name used for markup and recorded errors.
pub const SECTION: &str = "product-item-image";

/// Edits the `media`/`default` images of a product.
///
/// Rendering concatenates the fragments of the configured sub-clients.
/// Saving updates list and media items within one transaction on both
/// managers.
pub struct ProductImage {
    products: Arc<dyn Manager<ProductItem>>,
    lists: Arc<dyn Manager<ListItem>>,
    media: Arc<dyn Manager<MediaItem>>,
    controller: Arc<dyn MediaController>,
    subclients: Vec<Arc<dyn Client>>,
}

impl ProductImage {
    pub fn new(
        products: Arc<dyn Manager<ProductItem>>,
        lists: Arc<dyn Manager<ListItem>>,
        media: Arc<dyn Manager<MediaItem>>,
        controller: Arc<dyn MediaController>,
    ) -> Self {
        Self {
            products,
            lists,
            media,
            controller,
            subclients: Vec::new(),
        }
    }

    /// Client working on the managers of `manager`.
    pub fn from_product_manager(manager: &ProductManager, controller: Arc<dyn MediaController>) -> Self {
        Self::new(
            Arc::new(manager.clone()),
            manager.lists(),
            manager.media(),
            controller,
        )
    }

    /// Client with the sub-clients configured in `config`.
    pub fn from_config(
        manager: &ProductManager,
        controller: Arc<dyn MediaController>,
        registry: &ClientRegistry,
        config: &ClientConfig,
    ) -> Result<Self, ConfigError> {
        let subclients = registry.resolve(config)?;
        Ok(Self::from_product_manager(manager, controller).with_subclients(subclients))
    }

    pub fn with_subclients(mut self, subclients: Vec<Arc<dyn Client>>) -> Self {
        self.subclients = subclients;
        self
    }

    fn render(&self, action: ClientAction, view: &mut View) -> AdminResult<String> {
        self.set_data(view);
        let body = render_all(&self.subclients, action, view)?;
        view.assign("imageBody", Value::String(body.clone()));
        Ok(view.render(SECTION, &body))
    }

    /// Assign `imageData`: submitted `image` parameters if present, else
    /// one column entry per `media`/`default` list item of a stored product.
    /// At least one (empty) entry is always assigned.
    fn set_data(&self, view: &mut View) {
        if let Some(Value::Object(params)) = view.param("image") {
            if !params.is_empty() {
                let data = Value::Object(params.clone());
                view.assign("imageData", data);
                return;
            }
        }

        let mut data: BTreeMap<String, Vec<Value>> = BTreeMap::new();
        if view.item().id().is_some() {
            let query = RefQuery::new().domain("media").list_type("default").include_inactive();
            for list_item in view.item().list_items(&query) {
                let id = list_item.id().map(|id| id.to_string()).unwrap_or_default();
                data.entry("product.lists.id".to_string())
                    .or_default()
                    .push(Value::String(id));

                if let Some(media) = list_item.ref_item() {
                    for (key, value) in media.to_array(false) {
                        data.entry(key).or_default().push(value);
                    }
                }
            }
        }

        data.entry("product.lists.id".to_string())
            .or_insert_with(|| vec![Value::String(String::new())]);

        let data: Map<String, Value> = data
            .into_iter()
            .map(|(key, values)| (key, Value::Array(values)))
            .collect();
        view.assign("imageData", Value::Object(data));
    }

    fn new_list_item(&self, parent_id: &ItemId) -> ListItem {
        let mut item = self.lists.create_item();
        item.set_parent_id(Some(parent_id.clone()))
            .set_domain("media")
            .set_list_type("default")
            .set_status(1);
        item
    }

    fn new_media(&self) -> MediaItem {
        let mut item = self.media.create_item();
        item.set_media_type("default").set_domain("product").set_status(1);
        item
    }

    /// Apply the submitted image list to the stored product.
    ///
    /// Submitted list IDs keep their list items; empty or unknown IDs are
    /// new entries consuming the uploaded files in order. `default` list
    /// items not submitted any more are removed along with their media and
    /// files.
    fn update_items(&self, view: &View) -> AdminResult<()> {
        let id = view.item().id().ok_or_else(|| {
            StoreError::from(ValidationError::InvalidValue {
                field: "product.id".to_string(),
                reason: "the product must be saved before its images".to_string(),
            })
        })?;

        let product = self.products.find(&id, &["media"])?;
        let existing: BTreeMap<String, ListItem> = product
            .list_items(&RefQuery::new().domain("media").list_type("default").include_inactive())
            .into_iter()
            .filter_map(|item| item.id().map(|id| (id.to_string(), item.clone())))
            .collect();

        let files = view.files("image/files");
        let mut kept = BTreeSet::new();
        let mut uploads = 0;

        for (idx, list_id) in view.param_list("image/product.lists.id").iter().enumerate() {
            let (mut list_item, mut media) = match existing.get(list_id) {
                Some(found) => {
                    kept.insert(list_id.clone());
                    let mut list_item = found.clone();
                    let media = list_item
                        .take_ref_item()
                        .and_then(|item| item.as_media().cloned())
                        .unwrap_or_else(|| self.new_media());
                    (list_item, media)
                }
                None => {
                    let file = files
                        .get(uploads)
                        .ok_or(AdminError::MissingUpload { index: uploads })?;
                    let mut media = self.new_media();
                    self.controller.add(&mut media, file)?;
                    uploads += 1;
                    (self.new_list_item(&id), media)
                }
            };

            if let Some(label) = view.param_str(&format!("image/media.label/{}", idx)) {
                media.set_label(&label);
            }
            if let Some(lang) = view.param_str(&format!("image/media.languageid/{}", idx)) {
                media.set_language_id(Some(lang.as_str()).filter(|l| !l.is_empty()));
            }
            self.media.save(&mut media)?;

            list_item.set_position(idx as i64)?;
            list_item.set_ref_id(media.id());
            self.lists.save(&mut list_item)?;
        }

        let mut removed_lists = Vec::new();
        let mut removed_media = Vec::new();
        for (list_id, list_item) in existing.iter().filter(|(id, _)| !kept.contains(*id)) {
            if let Some(media) = list_item.ref_item().and_then(RefItem::as_media) {
                self.controller.delete(media)?;
                removed_media.extend(media.id());
            }
            removed_lists.push(ItemId::from(list_id.as_str()));
        }

        self.lists.delete(&removed_lists)?;
        self.media.delete(&removed_media)?;

        tracing::debug!(
            product = %id,
            uploads,
            removed = removed_lists.len(),
            "Updated product images"
        );
        Ok(())
    }

    /// Commit media, then lists.
    ///
    /// Both transactions are closed afterwards. A failing list commit
    /// can't undo the media commit and only rolls back the lists.
    fn commit(&self) -> AdminResult<()> {
        if let Err(err) = self.media.commit() {
            self.rollback();
            return Err(err.into());
        }
        if let Err(err) = self.lists.commit() {
            tracing::error!(error = %err, "List commit failed after media was committed");
            if let Err(rollback) = self.lists.rollback() {
                tracing::error!(error = %rollback, "List rollback failed");
            }
            return Err(err.into());
        }
        Ok(())
    }

    fn rollback(&self) {
        if let Err(err) = self.media.rollback() {
            tracing::error!(error = %err, "Media rollback failed");
        }
        if let Err(err) = self.lists.rollback() {
            tracing::error!(error = %err, "List rollback failed");
        }
    }
}

impl Client for ProductImage {
    fn create(&self, view: &mut View) -> AdminResult<String> {
        self.render(ClientAction::Create, view)
    }

    fn copy(&self, view: &mut View) -> AdminResult<String> {
        self.render(ClientAction::Copy, view)
    }

    fn get(&self, view: &mut View) -> AdminResult<String> {
        self.render(ClientAction::Get, view)
    }

    /// Save the submitted images.
    ///
    /// Failures before the commit roll back both managers. The message is
    /// recorded under [`SECTION`] in the view's errors and the call returns
    /// [`AdminError::Save`].
    fn save(&self, view: &mut View) -> AdminResult<String> {
        self.lists.begin()?;
        if let Err(err) = self.media.begin() {
            if let Err(rollback) = self.lists.rollback() {
                tracing::error!(error = %rollback, "List rollback failed");
            }
            return Err(err.into());
        }

        let result = self.update_items(view).and_then(|()| {
            let body = render_all(&self.subclients, ClientAction::Save, view)?;
            view.assign("imageBody", Value::String(body.clone()));
            Ok(body)
        });

        let result = match result {
            Ok(body) => self.commit().map(|()| body),
            Err(err) => {
                self.rollback();
                Err(err)
            }
        };

        let err = match result {
            Ok(body) => return Ok(body),
            Err(err) => err,
        };

        let message = match &err {
            AdminError::Store(store) => {
                tracing::warn!(error = %store, "Saving product images failed");
                store.to_string()
            }
            other => {
                tracing::error!(error = %other, "Saving product images failed");
                other.to_string()
            }
        };
        view.add_error(SECTION, message);

        Err(AdminError::Save {
            section: SECTION.to_string(),
        })
    }
}
