//! Provider trait and the static provider factory.

use crate::{PluginError, PluginResult, ProductGone};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use storefront_core::{Observer, PluginItem, ProductItem, Publisher};
use storefront_storage::Manager;

// ============================================================================
// PROVIDER TRAIT
// ============================================================================

/// Basket plugin built from a [`PluginItem`].
///
/// Providers are observers that subscribe themselves to the actions they
/// care about. Registration consumes an `Arc` so the publisher can keep a
/// shared handle.
pub trait Provider: Observer {
    /// Plugin configuration the provider was created from.
    fn item(&self) -> &PluginItem;

    /// Subscribe the provider to `publisher`.
    fn register(self: Arc<Self>, publisher: &mut dyn Publisher);
}

// ============================================================================
// FACTORY
// ============================================================================

/// Collaborators handed to provider constructors.
#[derive(Clone)]
pub struct ProviderContext {
    products: Arc<dyn Manager<ProductItem>>,
}

impl ProviderContext {
    pub fn new(products: Arc<dyn Manager<ProductItem>>) -> Self {
        Self { products }
    }

    /// Product manager used for catalog lookups.
    pub fn products(&self) -> Arc<dyn Manager<ProductItem>> {
        Arc::clone(&self.products)
    }
}

impl fmt::Debug for ProviderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderContext")
            .field("products", &self.products.domain())
            .finish()
    }
}

/// Constructor of a named provider.
pub type ProviderConstructor = fn(PluginItem, &ProviderContext) -> Arc<dyn Provider>;

fn product_gone(item: PluginItem, context: &ProviderContext) -> Arc<dyn Provider> {
    Arc::new(ProductGone::new(item, context.products()))
}

/// Maps provider names of plugin items to constructors.
///
/// The built-in providers are available right away; further ones can be
/// added with [`ProviderFactory::register`].
pub struct ProviderFactory {
    context: ProviderContext,
    constructors: BTreeMap<String, ProviderConstructor>,
}

impl ProviderFactory {
    /// Create a factory knowing the built-in providers.
    pub fn new(context: ProviderContext) -> Self {
        let mut constructors = BTreeMap::new();
        constructors.insert(ProductGone::NAME.to_string(), product_gone as ProviderConstructor);

        Self {
            context,
            constructors,
        }
    }

    /// Add or replace the constructor for `name`.
    pub fn register(&mut self, name: impl Into<String>, constructor: ProviderConstructor) -> &mut Self {
        self.constructors.insert(name.into(), constructor);
        self
    }

    /// Names of all known providers.
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build the provider configured by `item`.
    ///
    /// # Errors
    /// `PluginError::UnknownProvider` if no constructor is registered for
    /// the item's provider name.
    pub fn create(&self, item: &PluginItem) -> PluginResult<Arc<dyn Provider>> {
        let name = item.provider();
        let constructor = self
            .constructors
            .get(&name)
            .ok_or_else(|| PluginError::UnknownProvider { name: name.clone() })?;

        tracing::debug!(provider = %name, label = %item.label(), "Created plugin provider");
        Ok(constructor(item.clone(), &self.context))
    }
}

impl fmt::Debug for ProviderFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderFactory")
            .field("context", &self.context)
            .field("providers", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use storefront_core::{Action, EventValue, StoreResult};
    use storefront_storage::MemoryManager;

    #[derive(Debug)]
    struct Noop(PluginItem);

    impl Observer for Noop {
        fn update(&self, _: &dyn Publisher, _: Action, _: &EventValue) -> StoreResult<()> {
            Ok(())
        }
    }

    impl Provider for Noop {
        fn item(&self) -> &PluginItem {
            &self.0
        }

        fn register(self: Arc<Self>, publisher: &mut dyn Publisher) {
            publisher.add_listener(self, Action::CheckBefore);
        }
    }

    fn noop(item: PluginItem, _: &ProviderContext) -> Arc<dyn Provider> {
        Arc::new(Noop(item))
    }

    fn factory() -> ProviderFactory {
        let products = MemoryManager::new("product", ProductItem::new);
        ProviderFactory::new(ProviderContext::new(Arc::new(products)))
    }

    fn plugin(provider: &str) -> PluginItem {
        let mut item = PluginItem::new();
        item.set_plugin_type("order").set_provider(provider);
        item
    }

    #[test]
    fn test_builtin_product_gone() {
        let provider = factory().create(&plugin("ProductGone")).unwrap();
        assert_eq!(provider.item().provider(), "ProductGone");
    }

    #[test]
    fn test_unknown_provider_fails() {
        let err = factory().create(&plugin("Nonexistent")).unwrap_err();
        assert_eq!(
            err,
            PluginError::UnknownProvider {
                name: "Nonexistent".to_string()
            }
        );
    }

    #[test]
    fn test_register_custom_provider() {
        let mut factory = factory();
        factory.register("Noop", noop);
        assert_eq!(factory.names(), vec!["Noop", "ProductGone"]);
        assert!(factory.create(&plugin("Noop")).is_ok());
    }
}
