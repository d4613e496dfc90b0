//! Storefront Plugin - Basket Plugin Providers
//!
//! Plugins are configured as [`PluginItem`](storefront_core::PluginItem)s
//! naming a provider. The [`ProviderFactory`] turns them into observers and
//! the [`PluginRegistry`] subscribes the active ones to a basket.

mod error;
mod product_gone;
mod provider;
mod registry;

pub use error::{PluginError, PluginResult};
pub use product_gone::{ProductGone, GONE_NOTEXIST, GONE_STATUS, GONE_TIMEFRAME};
pub use provider::{Provider, ProviderConstructor, ProviderContext, ProviderFactory};
pub use registry::{PluginRegistry, ORDER_PLUGIN_TYPE};
