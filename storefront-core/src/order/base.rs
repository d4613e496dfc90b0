//! Basket (order base) publishing lifecycle events to plugins.

use super::{OrderProductItem, ProductFlags};
use crate::item::{apply_values, impl_item_base, opt_string, Item, ItemBase};
use crate::observer::{Action, EventValue, Listeners, Observer, Parts, Publisher};
use crate::value::{self, ItemValues};
use crate::{NotFoundError, OrderError, StoreResult};
use serde_json::Value;
use std::sync::Arc;

const PREFIX: &str = "order.base.";

/// Basket with its product lines.
///
/// Changes to the product lines go through [`OrderBaseItem::add_product`]
/// and [`OrderBaseItem::delete_product`], which notify the registered
/// plugins before and after the change. Positions are 0-based indexes
/// into the product list.
#[derive(Debug, Clone)]
pub struct OrderBaseItem {
    base: ItemBase,
    products: Vec<OrderProductItem>,
    listeners: Listeners,
}

impl Default for OrderBaseItem {
    fn default() -> Self {
        Self {
            base: ItemBase::new(PREFIX),
            products: Vec::new(),
            listeners: Listeners::new(),
        }
    }
}

impl OrderBaseItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_values(values: ItemValues, products: Vec<OrderProductItem>) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
            products,
            listeners: Listeners::new(),
        }
    }

    pub fn customer_id(&self) -> String {
        self.base.string("customerid").unwrap_or_default()
    }

    /// Change the customer and notify `setCustomerId.after` on change.
    pub fn set_customer_id(&mut self, customer_id: &str) -> StoreResult<&mut Self> {
        if self.base.set_string("customerid", Some(customer_id.to_string())) {
            let value = EventValue::CustomerId(Some(customer_id.to_string()));
            self.notify(Action::SetCustomerIdAfter, &value)?;
        }
        Ok(self)
    }

    pub fn language_id(&self) -> Option<String> {
        self.base.string("languageid")
    }

    pub fn set_language_id(&mut self, language_id: Option<&str>) -> &mut Self {
        self.base
            .set_string("languageid", language_id.filter(|l| !l.is_empty()).map(str::to_string));
        self
    }

    pub fn currency_id(&self) -> Option<String> {
        self.base.string("currencyid")
    }

    pub fn set_currency_id(&mut self, currency_id: Option<&str>) -> &mut Self {
        self.base
            .set_string("currencyid", currency_id.filter(|c| !c.is_empty()).map(str::to_string));
        self
    }

    pub fn comment(&self) -> String {
        self.base.string("comment").unwrap_or_default()
    }

    pub fn set_comment(&mut self, comment: &str) -> &mut Self {
        self.base.set_string("comment", Some(comment.to_string()));
        self
    }

    pub fn status(&self) -> i32 {
        self.base.int("status").map_or(0, |s| s as i32)
    }

    pub fn set_status(&mut self, status: i32) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status)));
        self
    }

    pub fn products(&self) -> &[OrderProductItem] {
        &self.products
    }

    pub fn product(&self, position: usize) -> Option<&OrderProductItem> {
        self.products.get(position)
    }

    /// Add a product line and return its position.
    ///
    /// A line equal to an existing mutable one (see
    /// [`OrderProductItem::compare`]) only increases that line's quantity.
    /// Without `position` new lines are appended.
    pub fn add_product(&mut self, item: OrderProductItem, position: Option<usize>) -> StoreResult<usize> {
        self.notify(Action::AddProductBefore, &EventValue::Product(Box::new(item.clone())))?;

        let existing = self.products.iter().position(|line| {
            !line.flags().contains(ProductFlags::IMMUTABLE) && line.compare(&item)
        });

        let pos = match existing {
            Some(pos) => {
                let quantity = self.products[pos].quantity() + item.quantity();
                self.products[pos].set_quantity(quantity)?;
                pos
            }
            None => {
                let pos = position.unwrap_or(self.products.len()).min(self.products.len());
                self.products.insert(pos, item);
                pos
            }
        };
        self.base.set_modified();

        let added = EventValue::Product(Box::new(self.products[pos].clone()));
        self.notify(Action::AddProductAfter, &added)?;
        Ok(pos)
    }

    /// Remove the product line at `position` and return it.
    pub fn delete_product(&mut self, position: usize) -> StoreResult<OrderProductItem> {
        let line = self
            .products
            .get(position)
            .ok_or(NotFoundError::Position { position })?;

        if line.flags().contains(ProductFlags::IMMUTABLE) {
            return Err(OrderError::Immutable { position }.into());
        }

        self.notify(Action::DeleteProductBefore, &EventValue::Position(position))?;
        let removed = self.products.remove(position);
        self.base.set_modified();
        self.notify(Action::DeleteProductAfter, &EventValue::Product(Box::new(removed.clone())))?;

        Ok(removed)
    }

    /// Validate the requested basket parts.
    ///
    /// Plugins listening to `check.before`/`check.after` take part in the
    /// check; the basket itself only requires products when
    /// [`Parts::PRODUCT`] is requested.
    pub fn check(&self, parts: Parts) -> StoreResult<()> {
        let value = EventValue::Parts(parts);
        self.notify(Action::CheckBefore, &value)?;

        if parts.contains(Parts::PRODUCT) && self.products.is_empty() {
            return Err(OrderError::EmptyBasket.into());
        }

        self.notify(Action::CheckAfter, &value)
    }
}

impl Publisher for OrderBaseItem {
    fn add_listener(&mut self, observer: Arc<dyn Observer>, action: Action) {
        self.listeners.add(observer, action);
    }

    fn remove_listeners(&mut self) {
        self.listeners.clear();
    }

    fn notify(&self, action: Action, value: &EventValue) -> StoreResult<()> {
        self.listeners.notify(self, action, value)
    }

    fn as_order_base(&self) -> Option<&OrderBaseItem> {
        Some(self)
    }
}

impl Item for OrderBaseItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "order/base"
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "customerid" => {
                    item.base.set_string("customerid", value::to_string_opt(v));
                }
                "languageid" => {
                    item.set_language_id(value::to_string_opt(v).as_deref());
                }
                "currencyid" => {
                    item.set_currency_id(value::to_string_opt(v).as_deref());
                }
                "comment" => {
                    item.set_comment(&value::to_string(v));
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

        list.insert(self.base.key("customerid"), Value::from(self.customer_id()));
        list.insert(self.base.key("languageid"), opt_string(self.language_id()));
        list.insert(self.base.key("currencyid"), opt_string(self.currency_id()));
        list.insert(self.base.key("comment"), Value::from(self.comment()));
        list.insert(self.base.key("status"), Value::from(self.status()));
        list
    }
}

// =============================================================================
// TESTS
// =============================================================================
