//! Basket and ordered products.

mod base;
mod product;

pub use base::OrderBaseItem;
pub use product::{DeliveryStatus, OrderProductItem, ProductFlags, MAX_QUANTITY};
