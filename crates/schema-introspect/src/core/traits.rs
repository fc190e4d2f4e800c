//! Capability traits at the seam between the schema cache and the drivers.
//!
//! - [`CatalogSource`]: opens one scoped connection per rebuild
//! - [`CatalogConnection`]: the two introspection queries (plus optional index listing)
//! - [`IndexDiscoverer`]: fills in [`Table::indexes`]; the default does nothing
//!
//! # Design Patterns
//!
//! - **Abstract Factory**: a source produces connections for its dialect
//! - **Strategy**: index discovery is swappable without touching the cache

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;

use super::schema::{Index, Table};
use super::translate::{ColumnMarkers, RawColumnRecord};

/// A database that can be introspected.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    /// Get the dialect identifier (e.g., "mysql", "postgres").
    fn dialect(&self) -> &str;

    /// Tokens used to translate this dialect's raw column rows.
    fn markers(&self) -> ColumnMarkers;

    /// Open a fresh connection.
    ///
    /// # Errors
    ///
    /// Returns `ConnectionFailed` when the target cannot be reached or
    /// rejects the credentials.
    async fn connect(&self) -> Result<Box<dyn CatalogConnection>>;
}

/// One open connection used for the duration of a single rebuild.
#[async_trait]
pub trait CatalogConnection: Send {
    /// List table names in `schema`, in catalog order.
    ///
    /// Errors are reported as `CatalogQueryFailed`.
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>>;

    /// Describe the columns of one table, in ordinal order.
    ///
    /// Errors are reported as `ColumnQueryFailed`.
    async fn describe_columns(&mut self, schema: &str, table: &str)
        -> Result<Vec<RawColumnRecord>>;

    /// List index key parts for one table, ordered by index then key position.
    ///
    /// Dialects without index support keep the default empty listing.
    async fn describe_indexes(&mut self, _schema: &str, _table: &str)
        -> Result<Vec<RawIndexRecord>> {
        Ok(Vec::new())
    }

    /// Release the connection.
    async fn close(self: Box<Self>);
}

/// One key part of an index, as reported by the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawIndexRecord {
    pub index_name: String,
    pub column_name: String,
    pub non_unique: bool,
}

/// Populate index metadata for a freshly described table.
#[async_trait]
pub trait IndexDiscoverer: Send + Sync {
    /// Fill `table.indexes` using the rebuild's open connection.
    async fn discover(
        &self,
        conn: &mut dyn CatalogConnection,
        schema: &str,
        table: &mut Table,
    ) -> Result<()>;

    /// Name for logging/debugging.
    fn name(&self) -> &'static str;
}

/// Index discoverer that performs no catalog calls and never fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpIndexDiscoverer;

#[async_trait]
impl IndexDiscoverer for NoOpIndexDiscoverer {
    async fn discover(
        &self,
        _conn: &mut dyn CatalogConnection,
        _schema: &str,
        _table: &mut Table,
    ) -> Result<()> {
        Ok(())
    }

    fn name(&self) -> &'static str {
        "noop"
    }
}

/// Index discoverer backed by [`CatalogConnection::describe_indexes`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CatalogIndexDiscoverer;

#[async_trait]
impl IndexDiscoverer for CatalogIndexDiscoverer {
    async fn discover(
        &self,
        conn: &mut dyn CatalogConnection,
        schema: &str,
        table: &mut Table,
    ) -> Result<()> {
        let parts = conn.describe_indexes(schema, &table.name).await?;
        table.indexes = group_index_parts(parts);

        debug!(
            "Loaded {} indexes for {}.{}",
            table.indexes.len(),
            schema,
            table.name
        );
        Ok(())
    }

    fn name(&self) -> &'static str {
        "catalog"
    }
}

/// Group key parts into indexes, keeping first-seen index order.
pub fn group_index_parts(parts: Vec<RawIndexRecord>) -> Vec<Index> {
    let mut indexes: Vec<Index> = Vec::new();

    for part in parts {
        match indexes.iter_mut().find(|i| i.name == part.index_name) {
            Some(idx) => idx.columns.push(part.column_name),
            None => indexes.push(Index {
                name: part.index_name,
                is_unique: !part.non_unique,
                columns: vec![part.column_name],
            }),
        }
    }

    indexes
}
