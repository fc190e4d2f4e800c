//! The whole-schema rebuild pass.
//!
//! A rebuild opens one connection, lists the schema's tables, describes each
//! one and returns the assembled tables. It never touches the cache itself:
//! the caller commits the result only when the pass as a whole succeeded.

use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::RebuildPolicy;
use crate::core::schema::Table;
use crate::core::traits::{CatalogConnection, CatalogSource, IndexDiscoverer};
use crate::core::translate::{translate, ColumnMarkers};
use crate::drivers::common::with_deadline;
use crate::error::{IntrospectError, Result};

use super::CacheOptions;

/// Summary of one rebuild pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RebuildReport {
    /// Schema that was rebuilt.
    pub schema: String,
    /// Number of tables the catalog listed.
    pub tables_listed: usize,
    /// Tables described and committed, in catalog order.
    pub tables_loaded: Vec<String>,
    /// Tables left out under the best-effort policy.
    pub skipped: Vec<SkippedTable>,
    /// Tables loaded without index metadata under the best-effort policy.
    pub index_failures: Vec<SkippedTable>,
    /// Wall-clock duration in milliseconds.
    pub duration_ms: u64,
}

/// A table whose metadata could not be (fully) read.
#[derive(Debug, Clone, Serialize)]
pub struct SkippedTable {
    pub table: String,
    pub reason: String,
}

/// One rebuild pass over a schema.
pub(crate) struct Rebuild<'a> {
    pub source: &'a dyn CatalogSource,
    pub indexes: &'a dyn IndexDiscoverer,
    pub schema: &'a str,
    pub options: &'a CacheOptions,
}

impl Rebuild<'_> {
    /// Run the pass. The connection is closed on every return path; if the
    /// pass unwinds, dropping the boxed connection releases it.
    pub async fn run(&self) -> Result<(Vec<Table>, RebuildReport)> {
        let started = Instant::now();

        let mut conn = with_deadline(
            "connect",
            self.options.connect_timeout,
            self.source.connect(),
        )
        .await?;

        let result = self.load_schema(conn.as_mut()).await;

        let closed = with_deadline("close connection", self.options.query_timeout, async move {
            conn.close().await;
            Ok::<(), IntrospectError>(())
        })
        .await;
        if let Err(e) = closed {
            warn!("Catalog connection for schema '{}' not closed cleanly: {}", self.schema, e);
        }

        let (tables, mut report) = result?;
        report.duration_ms = started.elapsed().as_millis() as u64;

        info!(
            "Rebuilt schema '{}' ({}): {} of {} tables loaded in {}ms",
            self.schema,
            self.source.dialect(),
            report.tables_loaded.len(),
            report.tables_listed,
            report.duration_ms
        );
        Ok((tables, report))
    }

    async fn load_schema(
        &self,
        conn: &mut dyn CatalogConnection,
    ) -> Result<(Vec<Table>, RebuildReport)> {
        let names = with_deadline(
            "list tables",
            self.options.query_timeout,
            conn.list_tables(self.schema),
        )
        .await?;

        let markers = self.source.markers();
        let mut report = RebuildReport {
            schema: self.schema.to_string(),
            tables_listed: names.len(),
            ..Default::default()
        };
        let mut tables = Vec::with_capacity(names.len());

        for name in names {
            match self.load_table(conn, &name, &markers, &mut report).await {
                Ok(table) => {
                    report.tables_loaded.push(name);
                    tables.push(table);
                }
                Err(e) if e.is_deadline() || self.options.policy == RebuildPolicy::FailFast => {
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Skipping table '{}' in schema '{}': {}",
                        name, self.schema, e
                    );
                    report.skipped.push(SkippedTable {
                        table: name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Ok((tables, report))
    }

    async fn load_table(
        &self,
        conn: &mut dyn CatalogConnection,
        name: &str,
        markers: &ColumnMarkers,
        report: &mut RebuildReport,
    ) -> Result<Table> {
        let operation = format!("describe table '{}'", name);
        let rows = with_deadline(
            &operation,
            self.options.query_timeout,
            conn.describe_columns(self.schema, name),
        )
        .await?;

        let mut table = Table::new(name);
        table.columns = rows.into_iter().map(|raw| translate(raw, markers)).collect();

        let operation = format!("discover indexes of '{}'", name);
        let discovered = with_deadline(
            &operation,
            self.options.query_timeout,
            self.indexes.discover(&mut *conn, self.schema, &mut table),
        )
        .await;

        match discovered {
            Ok(()) => {}
            Err(e) if e.is_deadline() || self.options.policy == RebuildPolicy::FailFast => {
                return Err(e);
            }
            Err(e) => {
                warn!(
                    "Loaded table '{}' without indexes ({} discoverer): {}",
                    name,
                    self.indexes.name(),
                    e
                );
                table.indexes.clear();
                report.index_failures.push(SkippedTable {
                    table: name.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        debug!(
            "Described {}.{}: {} columns, {} indexes",
            self.schema,
            table.name,
            table.columns.len(),
            table.indexes.len()
        );
        Ok(table)
    }
}
