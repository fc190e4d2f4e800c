//! In-memory catalog used by the cache tests.
//!
//! Counts every connect, close, drop and query so tests can assert how much
//! I/O a cache operation caused.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::core::traits::{CatalogConnection, CatalogSource, RawIndexRecord};
use crate::core::translate::{ColumnMarkers, RawColumnRecord, RawValue};
use crate::error::{IntrospectError, Result};

#[derive(Default)]
struct MockState {
    tables: Mutex<Vec<(String, Vec<RawColumnRecord>)>>,
    indexes: Mutex<HashMap<String, Vec<RawIndexRecord>>>,
    failing_describe: Mutex<HashSet<String>>,
    failing_indexes: Mutex<HashSet<String>>,
    panic_on: Mutex<Option<String>>,
    fail_connect: Mutex<bool>,
    fail_list: Mutex<bool>,
    connect_delay: Mutex<Option<Duration>>,
    query_delay: Mutex<Option<Duration>>,
    connects: AtomicUsize,
    closes: AtomicUsize,
    drops: AtomicUsize,
    list_calls: AtomicUsize,
    describe_calls: AtomicUsize,
    index_calls: AtomicUsize,
}

/// Cloneable handle to a shared fake catalog.
#[derive(Clone, Default)]
pub(crate) struct MockCatalog {
    state: Arc<MockState>,
}

/// Build a `DESCRIBE`-style row.
pub(crate) fn raw_column(
    field: &str,
    col_type: &str,
    null: &str,
    key: &str,
    default: Option<&str>,
) -> RawColumnRecord {
    RawColumnRecord {
        field: field.to_string(),
        col_type: col_type.to_string(),
        null: null.to_string(),
        key: key.to_string(),
        default: default.map(RawValue::from),
        extra: String::new(),
    }
}

impl MockCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a table, keeping its catalog position.
    pub fn set_table(&self, name: &str, columns: Vec<RawColumnRecord>) -> &Self {
        let mut tables = self.state.tables.lock().unwrap();
        match tables.iter_mut().find(|(n, _)| n == name) {
            Some(entry) => entry.1 = columns,
            None => tables.push((name.to_string(), columns)),
        }
        self
    }

    pub fn drop_table(&self, name: &str) {
        self.state.tables.lock().unwrap().retain(|(n, _)| n != name);
    }

    pub fn set_indexes(&self, table: &str, parts: Vec<RawIndexRecord>) {
        self.state
            .indexes
            .lock()
            .unwrap()
            .insert(table.to_string(), parts);
    }

    pub fn fail_describe(&self, table: &str) {
        self.state
            .failing_describe
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn fail_indexes(&self, table: &str) {
        self.state
            .failing_indexes
            .lock()
            .unwrap()
            .insert(table.to_string());
    }

    pub fn panic_on_describe(&self, table: &str) {
        *self.state.panic_on.lock().unwrap() = Some(table.to_string());
    }

    pub fn fail_connect(&self, fail: bool) {
        *self.state.fail_connect.lock().unwrap() = fail;
    }

    pub fn fail_list(&self, fail: bool) {
        *self.state.fail_list.lock().unwrap() = fail;
    }

    pub fn delay_connect(&self, delay: Duration) {
        *self.state.connect_delay.lock().unwrap() = Some(delay);
    }

    pub fn delay_queries(&self, delay: Duration) {
        *self.state.query_delay.lock().unwrap() = Some(delay);
    }

    pub fn connects(&self) -> usize {
        self.state.connects.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.state.closes.load(Ordering::SeqCst)
    }

    pub fn drops(&self) -> usize {
        self.state.drops.load(Ordering::SeqCst)
    }

    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    pub fn describe_calls(&self) -> usize {
        self.state.describe_calls.load(Ordering::SeqCst)
    }

    pub fn index_calls(&self) -> usize {
        self.state.index_calls.load(Ordering::SeqCst)
    }

    /// Total catalog queries issued.
    pub fn queries(&self) -> usize {
        self.list_calls() + self.describe_calls() + self.index_calls()
    }
}

#[async_trait]
impl CatalogSource for MockCatalog {
    fn dialect(&self) -> &str {
        "mock"
    }

    fn markers(&self) -> ColumnMarkers {
        ColumnMarkers::MYSQL
    }

    async fn connect(&self) -> Result<Box<dyn CatalogConnection>> {
        let delay = *self.state.connect_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if *self.state.fail_connect.lock().unwrap() {
            return Err(IntrospectError::connection("mock://catalog", "connection refused"));
        }
        self.state.connects.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockConnection {
            state: Arc::clone(&self.state),
        }))
    }
}

struct MockConnection {
    state: Arc<MockState>,
}

impl MockConnection {
    async fn pause(&self) {
        let delay = *self.state.query_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.state.drops.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CatalogConnection for MockConnection {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        self.state.list_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;
        if *self.state.fail_list.lock().unwrap() {
            return Err(IntrospectError::catalog_query(schema, "permission denied"));
        }
        let tables = self.state.tables.lock().unwrap();
        Ok(tables.iter().map(|(name, _)| name.clone()).collect())
    }

    async fn describe_columns(
        &mut self,
        _schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumnRecord>> {
        self.state.describe_calls.fetch_add(1, Ordering::SeqCst);
        self.pause().await;

        let panic_on = self.state.panic_on.lock().unwrap().clone();
        if panic_on.as_deref() == Some(table) {
            panic!("driver blew up describing {}", table);
        }
        if self.state.failing_describe.lock().unwrap().contains(table) {
            return Err(IntrospectError::column_query(table, "table is corrupt"));
        }

        let tables = self.state.tables.lock().unwrap();
        tables
            .iter()
            .find(|(name, _)| name == table)
            .map(|(_, columns)| columns.clone())
            .ok_or_else(|| IntrospectError::column_query(table, "no such table"))
    }

    async fn describe_indexes(&mut self, _schema: &str, table: &str) -> Result<Vec<RawIndexRecord>> {
        self.state.index_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.failing_indexes.lock().unwrap().contains(table) {
            return Err(IntrospectError::index_query(table, "statistics unavailable"));
        }
        let indexes = self.state.indexes.lock().unwrap();
        Ok(indexes.get(table).cloned().unwrap_or_default())
    }

    async fn close(self: Box<Self>) {
        self.state.closes.fetch_add(1, Ordering::SeqCst);
    }
}
