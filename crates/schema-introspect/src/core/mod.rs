//! Core abstractions for dialect-neutral schema introspection.
//!
//! - [`schema`]: Table, column and index types handed to migration tooling
//! - [`translate`]: raw catalog row to canonical column translation
//! - [`traits`]: catalog source/connection and index discovery seams
//! - [`identifier`]: identifier validation and quoting
//!
//! Drivers (`drivers/mysql`, `drivers/postgres`) implement the traits; the
//! schema cache only ever talks to them through `dyn` handles.

pub mod identifier;
pub mod schema;
pub mod traits;
pub mod translate;

pub use schema::{Column, ColumnOptions, Index, OptionValue, Table, OPTION_DEFAULT, OPTION_NULL};
pub use traits::{
    CatalogConnection, CatalogIndexDiscoverer, CatalogSource, IndexDiscoverer,
    NoOpIndexDiscoverer, RawIndexRecord,
};
pub use translate::{translate, ColumnMarkers, RawColumnRecord, RawValue};
