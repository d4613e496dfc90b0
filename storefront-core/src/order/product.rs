//! Ordered product lines of a basket.

use crate::item::{
    apply_values, impl_item_base, opt_int, opt_string, Item, ItemBase, ListRefItem, PriceItem,
    ProductItem, RefItem, RefQuery,
};
use crate::value::{self, ItemValues};
use crate::{ItemId, StoreResult, ValidationError};
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

const PREFIX: &str = "order.base.product.";

/// Largest accepted quantity of one line.
pub const MAX_QUANTITY: i64 = 2_147_483_647;

// =============================================================================
// FLAGS AND STATUS
// =============================================================================

bitflags! {
    /// Processing hints of an ordered product.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ProductFlags: u32 {
        /// Line can't be changed or removed by the customer.
        const IMMUTABLE = 0b0000_0001;
    }
}

impl Default for ProductFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// Delivery status of an ordered product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum DeliveryStatus {
    #[default]
    Unfinished,
    Deleted,
    Pending,
    Progress,
    Dispatched,
    Delivered,
    Lost,
    Refused,
    Returned,
}

impl DeliveryStatus {
    /// Numeric code as stored in the snapshot.
    pub fn code(&self) -> i32 {
        match self {
            DeliveryStatus::Unfinished => -1,
            DeliveryStatus::Deleted => 0,
            DeliveryStatus::Pending => 1,
            DeliveryStatus::Progress => 2,
            DeliveryStatus::Dispatched => 3,
            DeliveryStatus::Delivered => 4,
            DeliveryStatus::Lost => 5,
            DeliveryStatus::Refused => 6,
            DeliveryStatus::Returned => 7,
        }
    }

    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -1 => Some(DeliveryStatus::Unfinished),
            0 => Some(DeliveryStatus::Deleted),
            1 => Some(DeliveryStatus::Pending),
            2 => Some(DeliveryStatus::Progress),
            3 => Some(DeliveryStatus::Dispatched),
            4 => Some(DeliveryStatus::Delivered),
            5 => Some(DeliveryStatus::Lost),
            6 => Some(DeliveryStatus::Refused),
            7 => Some(DeliveryStatus::Returned),
            _ => None,
        }
    }
}

impl fmt::Display for DeliveryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// =============================================================================
// ORDER PRODUCT
// =============================================================================

/// Product line of a basket, a snapshot of the catalog product at order time.
///
/// The price is kept as a separate [`PriceItem`]; bundles and selections
/// carry their parts as sub-products.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderProductItem {
    base: ItemBase,
    price: PriceItem,
    products: Vec<OrderProductItem>,
}

impl Default for OrderProductItem {
    fn default() -> Self {
        Self::new(PriceItem::new())
    }
}

impl OrderProductItem {
    pub fn new(price: PriceItem) -> Self {
        Self {
            base: ItemBase::new(PREFIX),
            price,
            products: Vec::new(),
        }
    }

    pub fn from_values(price: PriceItem, values: ItemValues, products: Vec<OrderProductItem>) -> Self {
        Self {
            base: ItemBase::with_values(PREFIX, values),
            price,
            products,
        }
    }

    /// ID of the order base the line belongs to.
    pub fn base_id(&self) -> Option<ItemId> {
        self.base.string("baseid").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    pub fn set_base_id(&mut self, id: Option<ItemId>) -> &mut Self {
        self.base.set_string("baseid", id.map(|id| id.to_string()));
        self
    }

    /// ID of the parent line for sub-products.
    pub fn order_product_id(&self) -> Option<ItemId> {
        self.base.string("ordprodid").filter(|s| !s.is_empty()).map(ItemId::from)
    }

    pub fn set_order_product_id(&mut self, id: Option<ItemId>) -> &mut Self {
        self.base.set_string("ordprodid", id.map(|id| id.to_string()));
        self
    }

    pub fn set_site_id(&mut self, site_id: Option<String>) -> &mut Self {
        self.base.set_site_id(site_id);
        self
    }

    pub fn product_type(&self) -> String {
        self.base.string("type").unwrap_or_default()
    }

    pub fn set_product_type(&mut self, product_type: &str) -> &mut Self {
        self.base.set_string("type", Some(product_type.to_string()));
        self
    }

    pub fn stock_type(&self) -> String {
        self.base.string("stocktype").unwrap_or_default()
    }

    pub fn set_stock_type(&mut self, code: &str) -> StoreResult<&mut Self> {
        let code = value::check_code(&self.base.key("stocktype"), code)?;
        self.base.set_string("stocktype", Some(code));
        Ok(self)
    }

    pub fn supplier_code(&self) -> String {
        self.base.string("suppliercode").unwrap_or_default()
    }

    pub fn set_supplier_code(&mut self, code: &str) -> StoreResult<&mut Self> {
        let code = value::check_code(&self.base.key("suppliercode"), code)?;
        self.base.set_string("suppliercode", Some(code));
        Ok(self)
    }

    /// ID of the catalog product the line was created from.
    pub fn product_id(&self) -> String {
        self.base.string("productid").unwrap_or_default()
    }

    pub fn set_product_id(&mut self, id: &str) -> &mut Self {
        self.base.set_string("productid", Some(id.to_string()));
        self
    }

    pub fn product_code(&self) -> String {
        self.base.string("prodcode").unwrap_or_default()
    }

    pub fn set_product_code(&mut self, code: &str) -> StoreResult<&mut Self> {
        let code = value::check_code(&self.base.key("prodcode"), code)?;
        self.base.set_string("prodcode", Some(code));
        Ok(self)
    }

    pub fn name(&self) -> String {
        self.base.string("name").unwrap_or_default()
    }

    pub fn set_name(&mut self, name: &str) -> &mut Self {
        self.base.set_string("name", Some(name.to_string()));
        self
    }

    pub fn media_url(&self) -> String {
        self.base.string("mediaurl").unwrap_or_default()
    }

    pub fn set_media_url(&mut self, url: &str) -> &mut Self {
        self.base.set_string("mediaurl", Some(url.to_string()));
        self
    }

    pub fn target(&self) -> String {
        self.base.string("target").unwrap_or_default()
    }

    pub fn set_target(&mut self, target: &str) -> &mut Self {
        self.base.set_string("target", Some(target.to_string()));
        self
    }

    /// Ordered amount, `1` when unset.
    pub fn quantity(&self) -> i64 {
        self.base.int("quantity").unwrap_or(1)
    }

    pub fn set_quantity(&mut self, quantity: i64) -> StoreResult<&mut Self> {
        if !(1..=MAX_QUANTITY).contains(&quantity) {
            return Err(ValidationError::OutOfRange {
                field: self.base.key("quantity"),
                value: quantity.to_string(),
                reason: format!("must be a positive integer and must not exceed {}", MAX_QUANTITY),
            }
            .into());
        }
        self.base.set_int("quantity", Some(quantity));
        Ok(self)
    }

    pub fn flags(&self) -> ProductFlags {
        self.base
            .int("flags")
            .and_then(|bits| u32::try_from(bits).ok())
            .map(ProductFlags::from_bits_truncate)
            .unwrap_or_default()
    }

    pub fn set_flags(&mut self, flags: ProductFlags) -> &mut Self {
        self.base.set_int("flags", Some(i64::from(flags.bits())));
        self
    }

    /// Set flags from their raw bits, rejecting unknown bits.
    pub fn set_flag_bits(&mut self, bits: i64) -> StoreResult<&mut Self> {
        let flags = u32::try_from(bits)
            .ok()
            .and_then(ProductFlags::from_bits)
            .ok_or_else(|| ValidationError::OutOfRange {
                field: self.base.key("flags"),
                value: bits.to_string(),
                reason: "unknown flag bits".to_string(),
            })?;
        Ok(self.set_flags(flags))
    }

    /// Position of the line in the order, counted from 1.
    pub fn position(&self) -> Option<i64> {
        self.base.int("position")
    }

    pub fn set_position(&mut self, position: Option<i64>) -> StoreResult<&mut Self> {
        if let Some(pos) = position {
            if pos < 1 {
                return Err(ValidationError::OutOfRange {
                    field: self.base.key("position"),
                    value: pos.to_string(),
                    reason: "must be greater than 0".to_string(),
                }
                .into());
            }
        }
        self.base.set_int("position", position);
        Ok(self)
    }

    pub fn status(&self) -> DeliveryStatus {
        self.base
            .int("status")
            .and_then(|code| i32::try_from(code).ok())
            .and_then(DeliveryStatus::from_code)
            .unwrap_or_default()
    }

    pub fn set_status(&mut self, status: DeliveryStatus) -> &mut Self {
        self.base.set_int("status", Some(i64::from(status.code())));
        self
    }

    /// Set the delivery status from its numeric code.
    pub fn set_status_code(&mut self, code: i32) -> StoreResult<&mut Self> {
        let status = DeliveryStatus::from_code(code).ok_or_else(|| ValidationError::OutOfRange {
            field: self.base.key("status"),
            value: code.to_string(),
            reason: "unknown delivery status".to_string(),
        })?;
        Ok(self.set_status(status))
    }

    pub fn price(&self) -> &PriceItem {
        &self.price
    }

    pub fn price_mut(&mut self) -> &mut PriceItem {
        &mut self.price
    }

    pub fn set_price(&mut self, price: PriceItem) -> &mut Self {
        if !self.price.compare(&price) {
            self.price = price;
            self.base.set_modified();
        }
        self
    }

    /// Parts of a bundle or the chosen variant of a selection.
    pub fn products(&self) -> &[OrderProductItem] {
        &self.products
    }

    /// Replace all sub-products; always marks the line modified.
    pub fn set_products(&mut self, products: Vec<OrderProductItem>) -> &mut Self {
        self.products = products;
        self.base.set_modified();
        self
    }

    /// Same product in the same configuration, ignoring quantity.
    pub fn compare(&self, other: &OrderProductItem) -> bool {
        self.flags() == other.flags()
            && self.name() == other.name()
            && self.site_id() == other.site_id()
            && self.stock_type() == other.stock_type()
            && self.product_code() == other.product_code()
            && self.supplier_code() == other.supplier_code()
            && self.price.compare(&other.price)
    }

    /// Take over the data of a catalog product.
    ///
    /// The name comes from the first `basket` text if there is one, the
    /// supplier code from the first default supplier and the media URL from
    /// the preview of the first default image.
    pub fn copy_from(&mut self, product: &ProductItem) -> StoreResult<&mut Self> {
        let mut next = self.clone();

        next.set_site_id(product.site_id());
        next.set_product_code(&product.code())?;
        next.set_product_id(&product.id().map(|id| id.to_string()).unwrap_or_default());
        next.set_product_type(&product.product_type());
        next.set_name(&product.name("name"));
        next.set_target(&product.target());

        let default_refs = |domain: &str, item_type: &str| {
            RefQuery::new().domain(domain).list_type("default").item_type(item_type)
        };

        if let Some(text) = product
            .ref_items(&default_refs("text", "basket"))
            .into_iter()
            .find_map(RefItem::as_text)
        {
            next.set_name(&text.content());
        }

        if let Some(supplier) = product
            .ref_items(&RefQuery::new().domain("supplier").list_type("default"))
            .into_iter()
            .find_map(RefItem::as_supplier)
        {
            next.set_supplier_code(&supplier.code())?;
        }

        if let Some(media) = product
            .ref_items(&default_refs("media", "default"))
            .into_iter()
            .find_map(RefItem::as_media)
        {
            next.set_media_url(&media.preview());
        }

        next.base.set_modified();
        *self = next;
        Ok(self)
    }
}

impl Item for OrderProductItem {
    impl_item_base!();

    fn resource_type(&self) -> &'static str {
        "order/base/product"
    }

    fn is_modified(&self) -> bool {
        self.base.is_modified() || self.price.is_modified()
    }

    fn from_array(&mut self, values: ItemValues) -> StoreResult<ItemValues> {
        apply_values(self, values, |item, field, v| {
            match field {
                "baseid" => {
                    item.set_base_id(value::to_string_opt(v).map(ItemId::from));
                }
                "ordprodid" => {
                    item.set_order_product_id(value::to_string_opt(v).map(ItemId::from));
                }
                "type" => {
                    item.set_product_type(&value::to_string(v));
                }
                "stocktype" => {
                    item.set_stock_type(&value::to_string(v))?;
                }
                "suppliercode" => {
                    item.set_supplier_code(&value::to_string(v))?;
                }
                "productid" => {
                    item.set_product_id(&value::to_string(v));
                }
                "prodcode" => {
                    item.set_product_code(&value::to_string(v))?;
                }
                "name" => {
                    item.set_name(&value::to_string(v));
                }
                "mediaurl" => {
                    item.set_media_url(&value::to_string(v));
                }
                "target" => {
                    item.set_target(&value::to_string(v));
                }
                "position" => {
                    item.set_position(value::to_int_opt(field, v)?)?;
                }
                "quantity" => {
                    item.set_quantity(value::to_int(field, v)?)?;
                }
                "status" => {
                    item.set_status_code(value::to_i32(field, v)?)?;
                }
                "flags" => {
                    item.set_flag_bits(value::to_int(field, v)?)?;
                }
                "price" => {
                    item.price.set_value(v.clone())?;
                }
                "costs" => {
                    item.price.set_costs(v.clone())?;
                }
                "rebate" => {
                    item.price.set_rebate(v.clone())?;
                }
                "taxrate" => {
                    item.price.set_tax_rate(v.clone())?;
                }
                _ => return Ok(false),
            }
            Ok(true)
        })
    }

    fn to_array(&self, private: bool) -> ItemValues {
        let mut list = ItemValues::new();
        self.base.common_to(&mut list, private);

        list.insert(self.base.key("type"), Value::from(self.product_type()));
        list.insert(self.base.key("stocktype"), Value::from(self.stock_type()));
        list.insert(self.base.key("suppliercode"), Value::from(self.supplier_code()));
        list.insert(self.base.key("prodcode"), Value::from(self.product_code()));
        list.insert(self.base.key("productid"), Value::from(self.product_id()));
        list.insert(self.base.key("quantity"), Value::from(self.quantity()));
        list.insert(self.base.key("name"), Value::from(self.name()));
        list.insert(self.base.key("mediaurl"), Value::from(self.media_url()));
        list.insert(self.base.key("price"), Value::from(self.price.value()));
        list.insert(self.base.key("costs"), Value::from(self.price.costs()));
        list.insert(self.base.key("rebate"), Value::from(self.price.rebate()));
        list.insert(self.base.key("taxrate"), Value::from(self.price.tax_rate()));
        list.insert(self.base.key("status"), Value::from(self.status().code()));
        list.insert(self.base.key("position"), opt_int(self.position()));

        if private {
            list.insert(
                self.base.key("baseid"),
                opt_string(self.base_id().map(|id| id.to_string())),
            );
            list.insert(
                self.base.key("ordprodid"),
                opt_string(self.order_product_id().map(|id| id.to_string())),
            );
            list.insert(self.base.key("target"), Value::from(self.target()));
            list.insert(self.base.key("flags"), Value::from(self.flags().bits()));
        }
        list
    }
}

// =============================================================================
// TESTS
// =============================================================================
