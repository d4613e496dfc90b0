use proptest::prelude::*;
use std::sync::Arc;
use storefront_core::{Item, ItemId, Parts, PluginItem, ProductItem, StoreError};
use storefront_plugin::{
    PluginError, PluginRegistry, ProviderContext, ProviderFactory, GONE_NOTEXIST, GONE_STATUS,
};
use storefront_storage::{Manager, MemoryManager};
use storefront_test_utils::assertions::{assert_reason, assert_unavailable};
use storefront_test_utils::fixtures::basket;

struct Shop {
    products: MemoryManager<ProductItem>,
    plugins: MemoryManager<PluginItem>,
}

impl Shop {
    fn new() -> Self {
        Self {
            products: MemoryManager::new("product", ProductItem::new),
            plugins: MemoryManager::new("plugin", PluginItem::new),
        }
    }

    fn registry(&self) -> PluginRegistry {
        let context = ProviderContext::new(Arc::new(self.products.clone()));
        PluginRegistry::new(Arc::new(self.plugins.clone()), ProviderFactory::new(context))
    }

    fn product(&self, status: i32) -> ItemId {
        let mut product = ProductItem::new();
        product.set_product_type("default").set_label("Tea").set_status(status);
        self.products.save(&mut product).unwrap();
        product.id().unwrap()
    }

    fn plugin(&self, provider: &str, position: i64, status: i32) {
        let mut plugin = PluginItem::new();
        plugin
            .set_plugin_type("order")
            .set_provider(provider)
            .set_status(status)
            .set_position(position)
            .unwrap();
        self.plugins.save(&mut plugin).unwrap();
    }
}

#[test]
fn deleted_and_disabled_products_fail_the_check() {
    let shop = Shop::new();
    shop.plugin("ProductGone", 0, 1);

    let deleted = shop.product(1);
    shop.products.delete(&[deleted.clone()]).unwrap();
    let disabled = shop.product(0);

    let mut order = basket(&[deleted.as_str(), disabled.as_str()]);
    assert_eq!(shop.registry().register_all(&mut order).unwrap(), 1);

    let err = assert_unavailable(order.check(Parts::PRODUCT));
    assert_eq!(err.message, "Products in basket not available");
    assert_reason(&err, "product", 0, GONE_NOTEXIST);
    assert_reason(&err, "product", 1, GONE_STATUS);
    assert_eq!(err.codes["product"].len(), 2);
}

#[test]
fn inactive_plugins_are_not_registered() {
    let shop = Shop::new();
    shop.plugin("ProductGone", 0, 0);

    let mut order = basket(&["missing"]);
    assert_eq!(shop.registry().register_all(&mut order).unwrap(), 0);
    assert!(order.check(Parts::PRODUCT).is_ok());
}

#[test]
fn unknown_provider_aborts_registration() {
    let shop = Shop::new();
    shop.plugin("ProductGone", 0, 1);
    shop.plugin("Autofill", 1, 1);

    let mut order = basket(&["missing"]);
    let err = shop.registry().register_all(&mut order).unwrap_err();
    assert!(matches!(err, PluginError::UnknownProvider { ref name } if name == "Autofill"));
    assert!(order.check(Parts::PRODUCT).is_ok());
}

#[test]
fn providers_follow_plugin_position() {
    let shop = Shop::new();
    shop.plugin("ProductGone", 5, 1);
    shop.plugin("ProductGone", 2, 1);

    let providers = shop.registry().providers("order").unwrap();
    let positions: Vec<i64> = providers.iter().map(|p| p.item().position()).collect();
    assert_eq!(positions, vec![2, 5]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(50))]

    /// Exactly the lines pointing at disabled products are reported.
    #[test]
    fn prop_only_disabled_lines_reported(enabled in prop::collection::vec(any::<bool>(), 1..8)) {
        let shop = Shop::new();
        shop.plugin("ProductGone", 0, 1);

        let ids: Vec<ItemId> = enabled
            .iter()
            .map(|on| shop.product(if *on { 1 } else { 0 }))
            .collect();
        let refs: Vec<&str> = ids.iter().map(ItemId::as_str).collect();

        let mut order = basket(&refs);
        shop.registry().register_all(&mut order).unwrap();

        match order.check(Parts::ALL) {
            Ok(()) => prop_assert!(enabled.iter().all(|on| *on)),
            Err(StoreError::Availability(err)) => {
                for (pos, on) in enabled.iter().enumerate() {
                    let expected = if *on { None } else { Some(GONE_STATUS) };
                    prop_assert_eq!(err.code("product", pos), expected);
                }
            }
            Err(other) => prop_assert!(false, "unexpected error: {}", other),
        }
    }
}
