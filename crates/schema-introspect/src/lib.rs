//! # schema-introspect
//!
//! Dialect-neutral table metadata for MySQL/MariaDB and PostgreSQL, behind a
//! lazily built schema cache.
//!
//! This library provides:
//!
//! - **Column translation** from raw `DESCRIBE`-shaped catalog rows into
//!   canonical [`Column`] values
//! - **A schema cache** that rebuilds the whole schema on a miss and supports
//!   per-table invalidation
//! - **Rebuild policies** to either abort on the first failing table or skip it
//! - **Optional index discovery** through a pluggable [`IndexDiscoverer`]
//!
//! ## Example
//!
//! ```rust,no_run
//! use schema_introspect::{Config, SchemaCache};
//!
//! #[tokio::main]
//! async fn main() -> schema_introspect::Result<()> {
//!     let config = Config::load("introspect.yaml")?;
//!     let cache = SchemaCache::from_config(&config)?;
//!
//!     let orders = cache.lookup("orders").await?;
//!     for column in &orders.columns {
//!         println!("{} {}", column.name, column.declared_type);
//!     }
//!
//!     // After DDL on `orders`:
//!     cache.invalidate("orders").await;
//!     Ok(())
//! }
//! ```

pub mod cache;
pub mod config;
pub mod core;
pub mod drivers;
pub mod error;

// Re-exports for convenient access
pub use cache::{CacheOptions, RebuildReport, SchemaCache, SkippedTable};
pub use config::{Config, ConnectionConfig, IntrospectionConfig, RebuildPolicy};
pub use self::core::{
    translate, CatalogConnection, CatalogIndexDiscoverer, CatalogSource, Column, ColumnMarkers,
    Index, IndexDiscoverer, NoOpIndexDiscoverer, OptionValue, RawColumnRecord, RawValue, Table,
};
pub use drivers::DialectKind;
pub use error::{IntrospectError, Result};
