//! Storefront Admin - Product Editor Clients
//!
//! Composable admin clients rendering and saving sections of the product
//! editor. The image client updates product list items and media within
//! one transaction; uploads go through a [`MediaController`].

pub mod client;
pub mod config;
mod error;
pub mod media;
pub mod product_image;
pub mod telemetry;
mod view;

pub use client::{Client, ClientAction, ClientRegistry, LogDecorator};
pub use config::{AdminConfig, ClientConfig, MediaConfig};
pub use error::{AdminError, AdminResult, ConfigError};
pub use media::{MediaController, MemoryMediaStore};
pub use product_image::{ProductImage, SECTION};
pub use telemetry::{init_tracing, LogConfig};
pub use view::{UploadedFile, View};
