//! Storefront Core - Domain Items
//!
//! Items of the storefront domain layer built on one value container with
//! dirty tracking, the list-reference resolver shared by items owning links
//! to other domains, and the basket with its publisher/observer contract.
//! Persistence lives in storefront-storage; plugins in storefront-plugin.

pub mod error;
pub mod identity;
pub mod item;
pub mod observer;
pub mod order;
pub mod value;

pub use error::{
    AvailabilityError, NotFoundError, OrderError, ReasonMap, StorageError, StoreError, StoreResult,
    TypeError, ValidationError,
};
pub use identity::{
    format_datetime, new_item_id, now, now_string, parse_datetime, ItemId, Timestamp,
    DATETIME_FORMAT, DATE_FORMAT,
};
pub use item::{
    DeletedItems, Item, ItemBase, ListItem, ListRefItem, ListRefs, MediaItem, PluginItem,
    PriceItem, ProductItem, RefItem, RefQuery, SubscriptionItem, SupplierItem, TextItem,
};
pub use observer::{Action, ActionParseError, EventValue, Listeners, Observer, Parts, Publisher};
pub use order::{DeliveryStatus, OrderBaseItem, OrderProductItem, ProductFlags, MAX_QUANTITY};
pub use value::{ItemValues, MAX_CODE_LENGTH};
