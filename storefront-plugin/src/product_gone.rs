//! Availability check of the products in a basket.

use crate::Provider;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use storefront_core::{
    now, parse_datetime, Action, AvailabilityError, EventValue, Observer, Parts, PluginItem,
    ProductItem, Publisher, ReasonMap, StoreResult, Timestamp, TypeError,
};
use storefront_storage::{Criteria, Manager, Operator};

/// Reason code for products no longer in the catalog.
pub const GONE_NOTEXIST: &str = "gone.notexist";
/// Reason code for disabled products.
pub const GONE_STATUS: &str = "gone.status";
/// Reason code for products outside their sale period.
pub const GONE_TIMEFRAME: &str = "gone.timeframe";

/// Fails a basket check if ordered products vanished from the catalog.
///
/// Listens to `check.after` and only acts when the check covers
/// [`Parts::PRODUCT`]. All lines are checked and every failure is reported
/// in one [`AvailabilityError`] under the `product` domain, keyed by the
/// position of the line in the basket.
pub struct ProductGone {
    item: PluginItem,
    products: Arc<dyn Manager<ProductItem>>,
    clock: Option<Timestamp>,
}

impl ProductGone {
    /// Provider name used in plugin configurations.
    pub const NAME: &'static str = "ProductGone";

    pub fn new(item: PluginItem, products: Arc<dyn Manager<ProductItem>>) -> Self {
        Self {
            item,
            products,
            clock: None,
        }
    }

    /// Check against a fixed point in time instead of the current time.
    pub fn at(mut self, now: Timestamp) -> Self {
        self.clock = Some(now);
        self
    }

    fn reason(product: Option<&ProductItem>, now: Timestamp) -> Option<&'static str> {
        let Some(product) = product else {
            return Some(GONE_NOTEXIST);
        };

        if product.status() <= 0 {
            return Some(GONE_STATUS);
        }

        let start = product.date_start().and_then(|d| parse_datetime(&d));
        let end = product.date_end().and_then(|d| parse_datetime(&d));

        if start.is_some_and(|start| start >= now) || end.is_some_and(|end| now > end) {
            return Some(GONE_TIMEFRAME);
        }
        None
    }
}

impl fmt::Debug for ProductGone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProductGone")
            .field("label", &self.item.label())
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Observer for ProductGone {
    fn update(&self, publisher: &dyn Publisher, action: Action, value: &EventValue) -> StoreResult<()> {
        let order = publisher.as_order_base().ok_or_else(|| TypeError {
            expected: "OrderBaseItem".to_string(),
        })?;

        if !value.parts().contains(Parts::PRODUCT) {
            return Ok(());
        }

        let ids: Vec<String> = order.products().iter().map(|line| line.product_id()).collect();

        let criteria = Criteria::new().compare(Operator::Eq, "product.id", ids);
        let found: BTreeMap<String, ProductItem> = self
            .products
            .search(&criteria, &[])?
            .into_iter()
            .map(|(id, product)| (id.as_str().to_string(), product))
            .collect();

        let at = self.clock.unwrap_or_else(now);
        let gone: BTreeMap<usize, String> = order
            .products()
            .iter()
            .enumerate()
            .filter_map(|(pos, line)| {
                Self::reason(found.get(&line.product_id()), at).map(|code| (pos, code.to_string()))
            })
            .collect();

        tracing::debug!(
            action = %action,
            lines = order.products().len(),
            unavailable = gone.len(),
            "Checked basket products"
        );

        if gone.is_empty() {
            return Ok(());
        }

        tracing::warn!(positions = ?gone.keys().collect::<Vec<_>>(), "Products in basket not available");

        let mut codes = ReasonMap::new();
        codes.insert("product".to_string(), gone);
        Err(AvailabilityError::new("Products in basket not available", codes).into())
    }
}

impl Provider for ProductGone {
    fn item(&self) -> &PluginItem {
        &self.item
    }

    fn register(self: Arc<Self>, publisher: &mut dyn Publisher) {
        publisher.add_listener(self, Action::CheckAfter);
    }
}
