//! Storefront Storage - Manager Trait and In-Memory Managers
//!
//! Defines the persistence boundary for storefront items. Real database
//! backends implement [`Manager`]; the in-memory managers here back tests,
//! fixtures and the admin client.

pub mod criteria;
pub mod manager;
pub mod memory;
pub mod product;

pub use criteria::{Condition, Criteria, Operator};
pub use manager::Manager;
pub use memory::MemoryManager;
pub use product::{ProductManager, PRODUCT_REF_DOMAINS};
