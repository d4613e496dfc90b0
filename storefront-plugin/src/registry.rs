//! Registration of configured plugins on baskets.

use crate::{PluginResult, Provider, ProviderFactory};
use std::fmt;
use std::sync::Arc;
use storefront_core::{PluginItem, Publisher};
use storefront_storage::{Criteria, Manager, Operator};

/// Plugin type of basket plugins.
pub const ORDER_PLUGIN_TYPE: &str = "order";

/// Loads the active plugins of a type and subscribes their providers.
pub struct PluginRegistry {
    plugins: Arc<dyn Manager<PluginItem>>,
    factory: ProviderFactory,
}

impl PluginRegistry {
    pub fn new(plugins: Arc<dyn Manager<PluginItem>>, factory: ProviderFactory) -> Self {
        Self { plugins, factory }
    }

    pub fn factory(&self) -> &ProviderFactory {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut ProviderFactory {
        &mut self.factory
    }

    /// Providers of the active plugins of `plugin_type`, ordered by position.
    ///
    /// # Errors
    /// Fails if a plugin names an unknown provider; no provider is
    /// returned in that case.
    pub fn providers(&self, plugin_type: &str) -> PluginResult<Vec<Arc<dyn Provider>>> {
        let criteria = Criteria::new()
            .compare(Operator::Eq, "plugin.type", plugin_type)
            .compare(Operator::Gt, "plugin.status", 0);

        let mut items: Vec<PluginItem> = self.plugins.search(&criteria, &[])?.into_values().collect();
        items.sort_by_key(PluginItem::position);

        items.iter().map(|item| self.factory.create(item)).collect()
    }

    /// Subscribe all active basket plugins to `publisher`.
    ///
    /// Returns the number of registered providers.
    pub fn register_all(&self, publisher: &mut dyn Publisher) -> PluginResult<usize> {
        let providers = self.providers(ORDER_PLUGIN_TYPE)?;
        let count = providers.len();

        for provider in providers {
            provider.register(publisher);
        }

        tracing::debug!(count, "Registered basket plugins");
        Ok(count)
    }
}

impl fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.domain())
            .field("factory", &self.factory)
            .finish()
    }
}
