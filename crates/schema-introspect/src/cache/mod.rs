//! Lazily built, selectively invalidated cache of one schema's tables.
//!
//! [`SchemaCache`] maps table names to immutable [`Table`] snapshots. A miss
//! triggers a whole-schema rebuild through the configured
//! [`CatalogSource`]; successful rebuilds replace entries, never merge into
//! them, and never prune tables that disappeared from the catalog.
//!
//! # Concurrency
//!
//! Every operation on one cache takes the same async mutex, held for the
//! whole rebuild. Concurrent misses therefore wait for one rebuild instead of
//! each running their own.

mod rebuild;

#[cfg(test)]
mod mock;

pub use rebuild::{RebuildReport, SkippedTable};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::debug;

use crate::config::{Config, RebuildPolicy};
use crate::core::schema::Table;
use crate::core::traits::{CatalogIndexDiscoverer, CatalogSource, IndexDiscoverer, NoOpIndexDiscoverer};
use crate::drivers;
use crate::error::{IntrospectError, Result};

use rebuild::Rebuild;

/// Rebuild behavior for a cache.
#[derive(Debug, Clone, Default)]
pub struct CacheOptions {
    /// Per-table failure policy.
    pub policy: RebuildPolicy,
    /// Deadline for opening the rebuild connection.
    pub connect_timeout: Option<Duration>,
    /// Deadline for each catalog query.
    pub query_timeout: Option<Duration>,
}

/// Cache of table metadata for exactly one schema.
pub struct SchemaCache {
    source: Arc<dyn CatalogSource>,
    indexes: Arc<dyn IndexDiscoverer>,
    schema: String,
    options: CacheOptions,
    tables: Mutex<HashMap<String, Arc<Table>>>,
}

impl SchemaCache {
    /// Create an empty cache over `schema` with default options and no index discovery.
    pub fn new(source: Arc<dyn CatalogSource>, schema: impl Into<String>) -> Self {
        Self {
            source,
            indexes: Arc::new(NoOpIndexDiscoverer),
            schema: schema.into(),
            options: CacheOptions::default(),
            tables: Mutex::new(HashMap::new()),
        }
    }

    /// Create a cache from configuration. Does not connect.
    pub fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;

        let conn = &config.connection;
        let source = drivers::source_for(conn)?;
        let mut cache = Self::new(source, conn.schema.clone()).with_options(CacheOptions {
            policy: config.introspection.policy,
            connect_timeout: conn.connect_timeout(),
            query_timeout: conn.query_timeout(),
        });

        if config.introspection.discover_indexes {
            cache = cache.with_index_discoverer(Arc::new(CatalogIndexDiscoverer));
        }

        debug!(
            "Schema cache for '{}' via {} (policy: {}, indexes: {})",
            cache.schema,
            cache.source.dialect(),
            cache.options.policy,
            cache.indexes.name()
        );
        Ok(cache)
    }

    /// Replace the rebuild options.
    pub fn with_options(mut self, options: CacheOptions) -> Self {
        self.options = options;
        self
    }

    /// Set the per-table failure policy.
    pub fn with_policy(mut self, policy: RebuildPolicy) -> Self {
        self.options.policy = policy;
        self
    }

    /// Use a different index discoverer.
    pub fn with_index_discoverer(mut self, indexes: Arc<dyn IndexDiscoverer>) -> Self {
        self.indexes = indexes;
        self
    }

    /// The schema this cache is scoped to.
    pub fn schema(&self) -> &str {
        &self.schema
    }

    /// The dialect of the underlying catalog source.
    pub fn dialect(&self) -> &str {
        self.source.dialect()
    }

    /// Rebuild options in effect.
    pub fn options(&self) -> &CacheOptions {
        &self.options
    }

    /// Get a table's metadata, rebuilding the schema on a miss.
    ///
    /// # Errors
    ///
    /// - `SchemaBuildFailed` wrapping the cause if the rebuild failed; the
    ///   cache is left unchanged
    /// - `TableNotFound` if the rebuild succeeded but did not produce the table
    pub async fn lookup(&self, table: &str) -> Result<Arc<Table>> {
        let mut tables = self.tables.lock().await;

        if let Some(found) = tables.get(table) {
            debug!("Schema cache hit for '{}'", table);
            return Ok(Arc::clone(found));
        }

        debug!(
            "Schema cache miss for '{}'; rebuilding schema '{}'",
            table, self.schema
        );
        self.rebuild_into(&mut tables)
            .await
            .map_err(|e| IntrospectError::schema_build(table, &self.schema, e))?;

        tables
            .get(table)
            .cloned()
            .ok_or_else(|| IntrospectError::TableNotFound {
                table: table.to_string(),
                schema: self.schema.clone(),
            })
    }

    /// Drop a table from the cache. No-op if it is not cached.
    pub async fn invalidate(&self, table: &str) {
        if self.tables.lock().await.remove(table).is_some() {
            debug!("Invalidated '{}' in schema cache '{}'", table, self.schema);
        }
    }

    /// Rebuild the whole schema now, regardless of what is cached.
    pub async fn refresh(&self) -> Result<RebuildReport> {
        let mut tables = self.tables.lock().await;
        self.rebuild_into(&mut tables).await
    }

    /// Names of the cached tables, sorted.
    pub async fn cached_tables(&self) -> Vec<String> {
        let tables = self.tables.lock().await;
        let mut names: Vec<String> = tables.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of cached tables.
    pub async fn len(&self) -> usize {
        self.tables.lock().await.len()
    }

    /// Check if nothing is cached.
    pub async fn is_empty(&self) -> bool {
        self.tables.lock().await.is_empty()
    }

    async fn rebuild_into(&self, tables: &mut HashMap<String, Arc<Table>>) -> Result<RebuildReport> {
        let (built, report) = Rebuild {
            source: self.source.as_ref(),
            indexes: self.indexes.as_ref(),
            schema: &self.schema,
            options: &self.options,
        }
        .run()
        .await?;

        for table in built {
            tables.insert(table.name.clone(), Arc::new(table));
        }
        Ok(report)
    }
}
