//! OntoView Backend - boundary between the set cache and a serving layer
//!
//! This crate provides:
//! - The async [`Backend`] trait over the set cache operations
//! - [`LocalBackend`], which drives an in-process [`SetCacheManager`]
//! - [`BackendError`], whose messages never contain local filesystem paths
//! - Serializable DTOs for sets, versions, loaded sets and cache statistics
//!
//! ## Example
//!
//! ```ignore
//! use ontoview_backend::{Backend, LocalBackend};
//! use ontoview_config::ConfigLoader;
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().load_file(Path::new("ontoview.toml"))?;
//!     let backend = LocalBackend::new(&config)?;
//!     backend.preload().await?;
//!
//!     let details = backend.get_set("elixir", None).await?;
//!     println!("{} statements", details.statements);
//!     Ok(())
//! }
//! ```
//!
//! [`SetCacheManager`]: ontoview_core::SetCacheManager

mod error;
mod local;
mod sanitize;
mod traits;
mod types;

pub use error::{BackendError, BackendErrorKind};
pub use local::LocalBackend;
pub use sanitize::{contains_path, sanitize_identifier, sanitize_message, PATH_PLACEHOLDER};
pub use traits::Backend;
pub use types::*;

/// Result type for backend operations.
pub type Result<T> = std::result::Result<T, BackendError>;
