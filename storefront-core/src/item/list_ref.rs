//! List-reference resolver shared by items owning list items.
//!
//! An owning item keeps its list items grouped by the domain of the
//! referenced items. Each list item may carry the resolved referenced item;
//! queries filter by domain, list type, referenced item type and activity.

use super::{Item, ItemBase, ListItem, MediaItem, PriceItem, ProductItem, SupplierItem, TextItem};
use crate::identity::{self, Timestamp};
use crate::value::ItemValues;
use crate::{ItemId, NotFoundError, StoreResult};
use std::collections::BTreeMap;

/// Removed list items, grouped by the domain they were removed from.
pub type DeletedItems = BTreeMap<String, Vec<ListItem>>;

// =============================================================================
// REFERENCED ITEMS
// =============================================================================

/// Closed set of items a list item can reference.
#[derive(Debug, Clone, PartialEq)]
pub enum RefItem {
    Product(Box<ProductItem>),
    Media(MediaItem),
    Text(TextItem),
    Supplier(SupplierItem),
    Price(PriceItem),
}

impl RefItem {
    /// Domain name the item belongs to.
    pub fn domain(&self) -> &'static str {
        match self {
            Self::Product(_) => "product",
            Self::Media(_) => "media",
            Self::Text(_) => "text",
            Self::Supplier(_) => "supplier",
            Self::Price(_) => "price",
        }
    }

    pub fn base(&self) -> &ItemBase {
        match self {
            Self::Product(item) => item.base(),
            Self::Media(item) => item.base(),
            Self::Text(item) => item.base(),
            Self::Supplier(item) => item.base(),
            Self::Price(item) => item.base(),
        }
    }

    pub fn id(&self) -> Option<ItemId> {
        self.base().id()
    }

    /// Item type; suppliers have none.
    pub fn item_type(&self) -> Option<String> {
        match self {
            Self::Product(item) => Some(item.product_type()),
            Self::Media(item) => Some(item.media_type()),
            Self::Text(item) => Some(item.text_type()),
            Self::Supplier(_) => None,
            Self::Price(item) => Some(item.price_type()),
        }
    }

    pub fn status(&self) -> i32 {
        match self {
            Self::Product(item) => item.status(),
            Self::Media(item) => item.status(),
            Self::Text(item) => item.status(),
            Self::Supplier(item) => item.status(),
            Self::Price(item) => item.status(),
        }
    }

    pub fn label(&self) -> String {
        match self {
            Self::Product(item) => item.label(),
            Self::Media(item) => item.label(),
            Self::Text(item) => item.label(),
            Self::Supplier(item) => item.label(),
            Self::Price(item) => item.label(),
        }
    }

    /// Usable at `now`: enabled and, for products, inside the date window.
    pub fn is_available_at(&self, now: Timestamp) -> bool {
        match self {
            Self::Product(item) => item.is_available_at(now),
            other => other.status() > 0,
        }
    }

    pub fn to_array(&self, private: bool) -> ItemValues {
        match self {
            Self::Product(item) => item.to_array(private),
            Self::Media(item) => item.to_array(private),
            Self::Text(item) => item.to_array(private),
            Self::Supplier(item) => item.to_array(private),
            Self::Price(item) => item.to_array(private),
        }
    }

    pub fn as_product(&self) -> Option<&ProductItem> {
        match self {
            Self::Product(item) => Some(&**item),
            _ => None,
        }
    }

    pub fn as_media(&self) -> Option<&MediaItem> {
        match self {
            Self::Media(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_media_mut(&mut self) -> Option<&mut MediaItem> {
        match self {
            Self::Media(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextItem> {
        match self {
            Self::Text(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_supplier(&self) -> Option<&SupplierItem> {
        match self {
            Self::Supplier(item) => Some(item),
            _ => None,
        }
    }

    pub fn as_price(&self) -> Option<&PriceItem> {
        match self {
            Self::Price(item) => Some(item),
            _ => None,
        }
    }
}

impl From<ProductItem> for RefItem {
    fn from(item: ProductItem) -> Self {
        Self::Product(Box::new(item))
    }
}

impl From<MediaItem> for RefItem {
    fn from(item: MediaItem) -> Self {
        Self::Media(item)
    }
}

impl From<TextItem> for RefItem {
    fn from(item: TextItem) -> Self {
        Self::Text(item)
    }
}

impl From<SupplierItem> for RefItem {
    fn from(item: SupplierItem) -> Self {
        Self::Supplier(item)
    }
}

impl From<PriceItem> for RefItem {
    fn from(item: PriceItem) -> Self {
        Self::Price(item)
    }
}

// =============================================================================
// QUERY
// =============================================================================

/// Filter for list and referenced item lookups.
///
/// Absent filters match everything. Only active entries are returned
/// unless [`RefQuery::include_inactive`] is set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RefQuery {
    domains: Option<Vec<String>>,
    list_types: Option<Vec<String>>,
    item_types: Option<Vec<String>>,
    include_inactive: bool,
    at: Option<Timestamp>,
}

impl RefQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn domain(mut self, domain: &str) -> Self {
        self.domains.get_or_insert_with(Vec::new).push(domain.to_string());
        self
    }

    pub fn domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains
            .get_or_insert_with(Vec::new)
            .extend(domains.into_iter().map(Into::into));
        self
    }

    pub fn list_type(mut self, list_type: &str) -> Self {
        self.list_types.get_or_insert_with(Vec::new).push(list_type.to_string());
        self
    }

    pub fn list_types<I, S>(mut self, list_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.list_types
            .get_or_insert_with(Vec::new)
            .extend(list_types.into_iter().map(Into::into));
        self
    }

    pub fn item_type(mut self, item_type: &str) -> Self {
        self.item_types.get_or_insert_with(Vec::new).push(item_type.to_string());
        self
    }

    pub fn item_types<I, S>(mut self, item_types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.item_types
            .get_or_insert_with(Vec::new)
            .extend(item_types.into_iter().map(Into::into));
        self
    }

    /// Also return disabled entries and entries outside their date window.
    pub fn include_inactive(mut self) -> Self {
        self.include_inactive = true;
        self
    }

    /// Evaluate activity at a fixed point in time instead of now.
    pub fn at(mut self, at: Timestamp) -> Self {
        self.at = Some(at);
        self
    }

    fn accepts_domain(&self, domain: &str) -> bool {
        self.domains
            .as_ref()
            .map_or(true, |list| list.iter().any(|d| d == domain))
    }

    fn matches(&self, item: &ListItem, now: Timestamp) -> bool {
        if let Some(list_types) = &self.list_types {
            let list_type = item.list_type();
            if !list_types.iter().any(|t| *t == list_type) {
                return false;
            }
        }

        if let Some(item_types) = &self.item_types {
            match item.ref_item() {
                Some(ref_item) => {
                    if let Some(item_type) = ref_item.item_type() {
                        if !item_types.iter().any(|t| *t == item_type) {
                            return false;
                        }
                    }
                }
                None => return false,
            }
        }

        self.include_inactive || item.is_available_at(now)
    }
}

// =============================================================================
// COLLECTION
// =============================================================================

/// List items of one owning item, grouped by referenced domain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListRefs {
    items: BTreeMap<String, Vec<ListItem>>,
    deleted: DeletedItems,
}

impl ListRefs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group loaded list items by their domain, keeping their order.
    pub fn from_items<I: IntoIterator<Item = ListItem>>(items: I) -> Self {
        let mut refs = Self::new();
        for item in items {
            refs.items.entry(item.domain()).or_default().push(item);
        }
        refs
    }

    pub fn is_empty(&self) -> bool {
        self.items.values().all(Vec::is_empty)
    }

    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.items.keys().map(String::as_str)
    }

    /// All list items regardless of filters.
    pub fn iter(&self) -> impl Iterator<Item = &ListItem> {
        self.items.values().flatten()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut ListItem> {
        self.items.values_mut().flatten()
    }

    /// List items matching `query`, in stored order.
    pub fn list_items(&self, query: &RefQuery) -> Vec<&ListItem> {
        let now = query.at.unwrap_or_else(identity::now);

        self.items
            .iter()
            .filter(|(domain, _)| query.accepts_domain(domain))
            .flat_map(|(_, list)| list.iter())
            .filter(|item| query.matches(item, now))
            .collect()
    }

    /// Resolved referenced items matching `query`, in stored order.
    ///
    /// List items whose reference isn't resolved are skipped.
    pub fn ref_items(&self, query: &RefQuery) -> Vec<&RefItem> {
        let now = query.at.unwrap_or_else(identity::now);

        self.list_items(query)
            .into_iter()
            .filter_map(ListItem::ref_item)
            .filter(|ref_item| query.include_inactive || ref_item.is_available_at(now))
            .collect()
    }

    /// First list item of `domain` and `list_type` pointing to `ref_id`.
    pub fn list_item(
        &self,
        domain: &str,
        list_type: &str,
        ref_id: &ItemId,
        active: bool,
    ) -> Option<&ListItem> {
        let now = identity::now();

        self.items.get(domain)?.iter().find(|item| {
            item.list_type() == list_type
                && item.ref_id().as_ref() == Some(ref_id)
                && (!active || item.is_available_at(now))
        })
    }

    /// Add a list item to `domain`, replacing the entry with the same ID.
    ///
    /// When `ref_item` is given it is attached and its ID becomes the
    /// reference ID of the list item.
    pub fn add(&mut self, domain: &str, mut list_item: ListItem, ref_item: Option<RefItem>) {
        list_item.set_domain(domain);

        if let Some(ref_item) = ref_item {
            if let Some(ref_id) = ref_item.id() {
                list_item.set_ref_id(Some(ref_id));
            }
            list_item.set_ref_item(Some(ref_item));
        }

        let list = self.items.entry(domain.to_string()).or_default();
        let existing = list_item
            .id()
            .and_then(|id| list.iter().position(|item| item.id().as_ref() == Some(&id)));

        match existing {
            Some(pos) => list[pos] = list_item,
            None => list.push(list_item),
        }
    }

    /// Remove a list item from `domain` and remember it as deleted.
    pub fn delete(&mut self, domain: &str, list_item: &ListItem) -> StoreResult<()> {
        let not_found = || NotFoundError::ListItem {
            domain: domain.to_string(),
        };

        let list = self.items.get_mut(domain).ok_or_else(not_found)?;
        let pos = list
            .iter()
            .position(|item| same_list_item(item, list_item))
            .ok_or_else(not_found)?;

        let removed = list.remove(pos);
        self.deleted.entry(domain.to_string()).or_default().push(removed);
        Ok(())
    }

    pub fn deleted_items(&self) -> &DeletedItems {
        &self.deleted
    }

    /// Hand the deleted items over to storage, clearing the bucket.
    pub fn take_deleted(&mut self) -> DeletedItems {
        std::mem::take(&mut self.deleted)
    }

    /// Drop every domain not listed in `domains`.
    pub fn retain_domains(&mut self, domains: &[&str]) {
        self.items.retain(|domain, _| domains.contains(&domain.as_str()));
    }
}

fn same_list_item(a: &ListItem, b: &ListItem) -> bool {
    match (a.id(), b.id()) {
        (Some(x), Some(y)) => x == y,
        _ => a == b,
    }
}

// =============================================================================
// OWNER TRAIT
// =============================================================================

/// Items owning list items of other domains.
pub trait ListRefItem: Item {
    fn list_refs(&self) -> &ListRefs;

    fn list_refs_mut(&mut self) -> &mut ListRefs;

    /// Label used when no text of the requested type exists.
    fn label(&self) -> String;

    fn list_items(&self, query: &RefQuery) -> Vec<&ListItem> {
        self.list_refs().list_items(query)
    }

    fn ref_items(&self, query: &RefQuery) -> Vec<&RefItem> {
        self.list_refs().ref_items(query)
    }

    fn list_item(&self, domain: &str, list_type: &str, ref_id: &ItemId, active: bool) -> Option<&ListItem> {
        self.list_refs().list_item(domain, list_type, ref_id, active)
    }

    fn add_ref_item(&mut self, domain: &str, list_item: ListItem, ref_item: Option<RefItem>) -> &mut Self {
        self.list_refs_mut().add(domain, list_item, ref_item);
        self
    }

    fn delete_ref_item(&mut self, domain: &str, list_item: &ListItem) -> StoreResult<&mut Self> {
        self.list_refs_mut().delete(domain, list_item)?;
        Ok(self)
    }

    fn deleted_items(&self) -> &DeletedItems {
        self.list_refs().deleted_items()
    }

    /// Content of the first active text of `text_type`, else the label.
    fn name(&self, text_type: &str) -> String {
        let query = RefQuery::new().domain("text").item_type(text_type);

        self.ref_items(&query)
            .into_iter()
            .find_map(RefItem::as_text)
            .map(TextItem::content)
            .unwrap_or_else(|| self.label())
    }
}

// =============================================================================
// TESTS
// =============================================================================
