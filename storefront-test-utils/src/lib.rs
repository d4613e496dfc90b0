//! Storefront Test Utilities
//!
//! Shared test infrastructure for the storefront workspace:
//! - Proptest generators for codes, dates, amounts and items
//! - Fixtures for products with references and baskets
//! - Assertions for storefront error variants

pub use storefront_core::{
    AvailabilityError, DeliveryStatus, Item, ItemId, ListItem, ListRefItem, MediaItem,
    NotFoundError, OrderBaseItem, OrderProductItem, Parts, PriceItem, ProductItem, RefItem,
    StoreError, StoreResult, SupplierItem, TextItem, ValidationError, DATETIME_FORMAT,
    MAX_CODE_LENGTH, MAX_QUANTITY,
};
pub use storefront_storage::{Manager, MemoryManager, ProductManager};

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for storefront values and items.

    use super::*;
    use proptest::prelude::*;

    /// Generate a valid product, stock or supplier code.
    pub fn arb_code() -> impl Strategy<Value = String> {
        proptest::string::string_regex("[A-Za-z0-9_-]{1,64}").expect("code pattern is valid")
    }

    /// Generate a code longer than allowed.
    pub fn arb_long_code() -> impl Strategy<Value = String> {
        (MAX_CODE_LENGTH + 1..MAX_CODE_LENGTH + 32).prop_map(|len| "X".repeat(len))
    }

    /// Generate a stored date/time between 2020 and 2030.
    pub fn arb_datetime() -> impl Strategy<Value = String> {
        (1577836800i64..1893456000i64).prop_map(|secs| {
            chrono::DateTime::from_timestamp(secs, 0)
                .map(|dt| dt.naive_utc().format(DATETIME_FORMAT).to_string())
                .unwrap_or_else(|| "2020-01-01 00:00:00".to_string())
        })
    }

    /// Generate a valid basket quantity.
    pub fn arb_quantity() -> impl Strategy<Value = i64> {
        1..=MAX_QUANTITY
    }

    /// Generate a price amount in cents.
    pub fn arb_cents() -> impl Strategy<Value = i64> {
        0i64..10_000_000
    }

    /// Generate an ISO 4217 style currency code.
    pub fn arb_currency() -> impl Strategy<Value = String> {
        prop_oneof![Just("EUR"), Just("USD"), Just("GBP"), Just("CHF")].prop_map(String::from)
    }

    /// Generate an ISO 8601 duration accepted for subscriptions.
    pub fn arb_interval() -> impl Strategy<Value = String> {
        (0u32..5, 0u32..12, 0u32..4, 1u32..31).prop_map(|(y, m, w, d)| format!("P{}Y{}M{}W{}D", y, m, w, d))
    }

    /// Generate basket check parts.
    pub fn arb_parts() -> impl Strategy<Value = Parts> {
        (0u8..16).prop_map(Parts::from_bits_truncate)
    }

    /// Generate a delivery status.
    pub fn arb_delivery_status() -> impl Strategy<Value = DeliveryStatus> {
        (-1i32..8).prop_filter_map("known status code", DeliveryStatus::from_code)
    }

    /// Generate a price with a value and currency.
    pub fn arb_price() -> impl Strategy<Value = PriceItem> {
        (arb_cents(), arb_currency()).prop_map(|(cents, currency)| {
            fixtures::price(&format!("{}.{:02}", cents / 100, cents % 100), &currency)
        })
    }

    /// Generate an order product line with a random code and quantity.
    pub fn arb_order_product() -> impl Strategy<Value = OrderProductItem> {
        (arb_code(), 1i64..100, arb_price()).prop_map(|(code, quantity, price)| {
            let mut line = OrderProductItem::new(price);
            line.set_product_code(&code).expect("generated code is valid");
            line.set_quantity(quantity).expect("generated quantity is valid");
            line
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built items for common testing scenarios.

    use super::*;

    /// Unmodified price loaded from storage values.
    pub fn price(value: &str, currency: &str) -> PriceItem {
        PriceItem::from_values(storefront_core::value::values([
            ("price.type", serde_json::json!("default")),
            ("price.currencyid", serde_json::json!(currency)),
            ("price.quantity", serde_json::json!(1)),
            ("price.value", serde_json::json!(value)),
            ("price.costs", serde_json::json!("0.00")),
            ("price.rebate", serde_json::json!("0.00")),
            ("price.taxrate", serde_json::json!("0.00")),
            ("price.status", serde_json::json!(1)),
        ]))
    }

    /// Text of `text_type` with `content`.
    pub fn text(text_type: &str, content: &str) -> TextItem {
        let mut text = TextItem::new();
        text.set_text_type(text_type)
            .set_domain("product")
            .set_content(content)
            .set_status(1);
        text
    }

    /// Default image at `url`.
    pub fn media(url: &str) -> MediaItem {
        let mut media = MediaItem::new();
        media
            .set_media_type("default")
            .set_domain("product")
            .set_url(url)
            .set_preview(url)
            .set_mime_type("image/jpeg")
            .set_status(1);
        media
    }

    /// Supplier with `code`.
    pub fn supplier(code: &str) -> SupplierItem {
        let mut supplier = SupplierItem::new();
        supplier.set_code(code).expect("fixture code is valid");
        supplier.set_label(code).set_status(1);
        supplier
    }

    /// Active list item of `list_type` in the product domain.
    pub fn list_item(list_type: &str) -> ListItem {
        let mut item = ListItem::new("product");
        item.set_list_type(list_type).set_status(1);
        item
    }

    /// Enabled product `CNC` without references.
    pub fn product() -> ProductItem {
        let mut product = ProductItem::new();
        product.set_product_type("default").set_label("Cafe Noire Cappuccino").set_status(1);
        product.set_code("CNC").expect("fixture code is valid");
        product
    }

    /// Product `CNC` with a basket name, a default image, a supplier and a price.
    pub fn product_with_refs() -> ProductItem {
        let mut product = product();
        product
            .add_ref_item("text", list_item("default"), Some(text("basket", "Cappuccino").into()))
            .add_ref_item("media", list_item("default"), Some(media("files/cnc.jpg").into()))
            .add_ref_item("supplier", list_item("default"), Some(supplier("unitSupplier").into()))
            .add_ref_item("price", list_item("default"), Some(price("12.95", "EUR").into()));
        product
    }

    /// Order line for `product_id` with `code`.
    pub fn order_product(product_id: &str, code: &str) -> OrderProductItem {
        let mut line = OrderProductItem::new(price("12.95", "EUR"));
        line.set_product_id(product_id)
            .set_product_code(code)
            .expect("fixture code is valid");
        line
    }

    /// Basket with one line per product ID.
    pub fn basket(product_ids: &[&str]) -> OrderBaseItem {
        let mut order = OrderBaseItem::new();
        for (n, id) in product_ids.iter().enumerate() {
            order
                .add_product(order_product(id, &format!("CODE{}", n)), None)
                .expect("basket without listeners accepts lines");
        }
        order
    }

    /// In-memory product manager holding [`product_with_refs`].
    pub fn product_manager() -> (ProductManager, ItemId) {
        let manager = ProductManager::in_memory();
        let mut product = product_with_refs();
        manager.save(&mut product).expect("in-memory save succeeds");
        let id = product.id().expect("saved product has an ID");
        (manager, id)
    }
}

// ============================================================================
// ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for storefront error variants.

    use super::*;

    /// Assert that a StoreResult is a validation error.
    #[track_caller]
    pub fn assert_validation_error<T: std::fmt::Debug>(result: &StoreResult<T>) {
        match result {
            Err(StoreError::Validation(_)) => {}
            other => panic!("Expected Validation error, got: {:?}", other),
        }
    }

    /// Assert that a StoreResult is a not-found error.
    #[track_caller]
    pub fn assert_not_found<T: std::fmt::Debug>(result: &StoreResult<T>) {
        match result {
            Err(StoreError::NotFound(_)) => {}
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    /// Assert that a StoreResult is an availability error and return it.
    #[track_caller]
    pub fn assert_unavailable<T: std::fmt::Debug>(result: StoreResult<T>) -> AvailabilityError {
        match result {
            Err(StoreError::Availability(err)) => err,
            other => panic!("Expected Availability error, got: {:?}", other),
        }
    }

    /// Assert that the position of a domain carries `code`.
    #[track_caller]
    pub fn assert_reason(err: &AvailabilityError, domain: &str, position: usize, code: &str) {
        assert_eq!(
            err.code(domain, position),
            Some(code),
            "Wrong reason for {} position {}: {:?}",
            domain,
            position,
            err.codes
        );
    }

    /// Assert that an item has no unsaved changes.
    #[track_caller]
    pub fn assert_unmodified<T: Item>(item: &T) {
        assert!(!item.is_modified(), "Expected unmodified item: {:?}", item);
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use storefront_core::RefQuery;

    #[test]
    fn test_price_fixture_is_unmodified() {
        let price = fixtures::price("12.95", "EUR");
        assertions::assert_unmodified(&price);
        assert_eq!(price.value(), "12.95");
        assert_eq!(price.currency_id().as_deref(), Some("EUR"));
    }

    #[test]
    fn test_product_with_refs_fixture() {
        let product = fixtures::product_with_refs();
        assert_eq!(product.name("basket"), "Cappuccino");
        assert_eq!(product.ref_items(&RefQuery::new().domain("media")).len(), 1);
        assert_eq!(product.ref_items(&RefQuery::new()).len(), 4);
    }

    #[test]
    fn test_basket_fixture() {
        let order = fixtures::basket(&["1", "2"]);
        assert_eq!(order.products().len(), 2);
        assert_eq!(order.products()[1].product_id(), "2");
    }

    #[test]
    fn test_product_manager_fixture() {
        let (manager, id) = fixtures::product_manager();
        let product = manager.find(&id, &["text", "media"]).unwrap();
        assert_eq!(product.code(), "CNC");
        assert_eq!(product.name("basket"), "Cappuccino");
        assert!(product.ref_items(&RefQuery::new().domain("price")).is_empty());
    }

    #[test]
    fn test_assertions() {
        let mut line = OrderProductItem::default();
        assertions::assert_validation_error(&line.set_quantity(0).map(|_| ()));

        let order = fixtures::basket(&[]);
        assert!(order.product(0).is_none());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_generated_codes_are_accepted(code in generators::arb_code()) {
            let mut product = ProductItem::new();
            prop_assert!(product.set_code(&code).is_ok());
            prop_assert_eq!(product.code(), code);
        }

        #[test]
        fn prop_long_codes_are_rejected(code in generators::arb_long_code()) {
            let mut product = ProductItem::new();
            prop_assert!(product.set_code(&code).is_err());
        }

        #[test]
        fn prop_generated_intervals_are_accepted(interval in generators::arb_interval()) {
            let mut item = storefront_core::SubscriptionItem::new();
            prop_assert!(item.set_interval(&interval).is_ok());
        }

        #[test]
        fn prop_generated_lines_are_valid(line in generators::arb_order_product()) {
            prop_assert!(line.quantity() >= 1);
            prop_assert!(!line.product_code().is_empty());
        }

        #[test]
        fn prop_delivery_status_code_round_trip(status in generators::arb_delivery_status()) {
            prop_assert_eq!(DeliveryStatus::from_code(status.code()), Some(status));
        }
    }
}
