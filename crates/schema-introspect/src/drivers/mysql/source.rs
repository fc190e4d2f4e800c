//! MySQL/MariaDB catalog source.
//!
//! Each rebuild opens one `MySqlConnection` (no pool): tables come from
//! `INFORMATION_SCHEMA.TABLES`, columns from `DESCRIBE`.

use std::str::FromStr;

use async_trait::async_trait;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection, MySqlRow};
use sqlx::{Connection, Executor, Row};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::core::identifier::qualify_mysql;
use crate::core::traits::{CatalogConnection, CatalogSource, RawIndexRecord};
use crate::core::translate::{ColumnMarkers, RawColumnRecord, RawValue};
use crate::error::{IntrospectError, Result};

// CAST to CHAR: information_schema may report VARBINARY under some collations.
const LIST_TABLES: &str = r#"
    SELECT CAST(TABLE_NAME AS CHAR(255)) AS TABLE_NAME
    FROM INFORMATION_SCHEMA.TABLES
    WHERE TABLE_SCHEMA = ?
    ORDER BY TABLE_NAME
"#;

const LIST_INDEX_PARTS: &str = r#"
    SELECT
        CAST(INDEX_NAME AS CHAR(255)) AS INDEX_NAME,
        CAST(COLUMN_NAME AS CHAR(255)) AS COLUMN_NAME,
        CAST(NON_UNIQUE AS SIGNED) AS NON_UNIQUE
    FROM INFORMATION_SCHEMA.STATISTICS
    WHERE TABLE_SCHEMA = ? AND TABLE_NAME = ?
      AND INDEX_NAME != 'PRIMARY'
      AND COLUMN_NAME IS NOT NULL
    ORDER BY INDEX_NAME, SEQ_IN_INDEX
"#;

/// MySQL/MariaDB catalog source.
pub struct MysqlSource {
    options: MySqlConnectOptions,
    target: String,
}

impl MysqlSource {
    /// Create a source from connection configuration. Does not connect.
    pub fn new(config: &ConnectionConfig) -> Result<Self> {
        let target = config.redacted_url();

        // sqlx only understands the mysql:// scheme
        let url = match config.url.split_once("://") {
            Some((scheme, rest)) if scheme.eq_ignore_ascii_case("mariadb") => {
                format!("mysql://{}", rest)
            }
            _ => config.url.clone(),
        };

        let options = MySqlConnectOptions::from_str(&url).map_err(|e| {
            IntrospectError::Config(format!("Invalid MySQL URL {}: {}", target, e))
        })?;

        Ok(Self { options, target })
    }
}

#[async_trait]
impl CatalogSource for MysqlSource {
    fn dialect(&self) -> &str {
        "mysql"
    }

    fn markers(&self) -> ColumnMarkers {
        ColumnMarkers::MYSQL
    }

    async fn connect(&self) -> Result<Box<dyn CatalogConnection>> {
        let conn = MySqlConnection::connect_with(&self.options)
            .await
            .map_err(|e| IntrospectError::connection(&self.target, e))?;

        info!("Connected to MySQL catalog: {}", self.target);
        Ok(Box::new(MysqlCatalogConnection { conn }))
    }
}

/// An open MySQL connection scoped to one rebuild.
struct MysqlCatalogConnection {
    conn: MySqlConnection,
}

#[async_trait]
impl CatalogConnection for MysqlCatalogConnection {
    async fn list_tables(&mut self, schema: &str) -> Result<Vec<String>> {
        let rows: Vec<MySqlRow> = sqlx::query(LIST_TABLES)
            .bind(schema)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| IntrospectError::catalog_query(schema, e))?;

        let mut tables = Vec::with_capacity(rows.len());
        for row in &rows {
            let name = text_cell(row, "TABLE_NAME")
                .map_err(|e| IntrospectError::catalog_query(schema, e))?
                .unwrap_or_default();
            tables.push(name);
        }

        debug!("Found {} tables in MySQL schema '{}'", tables.len(), schema);
        Ok(tables)
    }

    async fn describe_columns(
        &mut self,
        schema: &str,
        table: &str,
    ) -> Result<Vec<RawColumnRecord>> {
        let sql = describe_statement(schema, table)?;
        let rows = describe_rows(&mut self.conn, &sql)
            .await
            .map_err(|e| IntrospectError::column_query(table, e))?;

        rows.iter()
            .map(|row| describe_row(row).map_err(|e| IntrospectError::column_query(table, e)))
            .collect()
    }

    async fn describe_indexes(&mut self, schema: &str, table: &str) -> Result<Vec<RawIndexRecord>> {
        let rows: Vec<MySqlRow> = sqlx::query(LIST_INDEX_PARTS)
            .bind(schema)
            .bind(table)
            .fetch_all(&mut self.conn)
            .await
            .map_err(|e| IntrospectError::index_query(table, e))?;

        let mut parts = Vec::with_capacity(rows.len());
        for row in &rows {
            let index_name = text_cell(row, "INDEX_NAME")
                .map_err(|e| IntrospectError::index_query(table, e))?
                .unwrap_or_default();
            let column_name = text_cell(row, "COLUMN_NAME")
                .map_err(|e| IntrospectError::index_query(table, e))?
                .unwrap_or_default();
            let non_unique: i64 = row
                .try_get("NON_UNIQUE")
                .map_err(|e| IntrospectError::index_query(table, e))?;

            parts.push(RawIndexRecord {
                index_name,
                column_name,
                non_unique: non_unique != 0,
            });
        }

        Ok(parts)
    }

    async fn close(self: Box<Self>) {
        if let Err(e) = self.conn.close().await {
            debug!("Error closing MySQL catalog connection: {}", e);
        }
    }
}

/// Build the `DESCRIBE` statement for a schema-qualified table.
fn describe_statement(schema: &str, table: &str) -> Result<String> {
    let target = qualify_mysql(schema, table).map_err(|e| IntrospectError::column_query(table, e))?;
    Ok(format!("DESCRIBE {}", target))
}

/// Run `DESCRIBE` over the text protocol; it is not preparable everywhere.
///
/// A bare `&str` carries no arguments, so sqlx sends it unprepared.
async fn describe_rows(
    conn: &mut MySqlConnection,
    sql: &str,
) -> std::result::Result<Vec<MySqlRow>, sqlx::Error> {
    Executor::fetch_all(conn, sql).await
}

/// Decode one `DESCRIBE` row.
fn describe_row(row: &MySqlRow) -> std::result::Result<RawColumnRecord, sqlx::Error> {
    Ok(RawColumnRecord {
        field: text_cell(row, "Field")?.unwrap_or_default(),
        col_type: text_cell(row, "Type")?.unwrap_or_default(),
        null: text_cell(row, "Null")?.unwrap_or_default(),
        key: text_cell(row, "Key")?.unwrap_or_default(),
        default: default_cell(row, "Default")?,
        extra: text_cell(row, "Extra")?.unwrap_or_default(),
    })
}

/// Read a text cell, falling back to bytes for binary-collated metadata columns.
fn text_cell(row: &MySqlRow, column: &str) -> std::result::Result<Option<String>, sqlx::Error> {
    if let Ok(value) = row.try_get::<Option<String>, _>(column) {
        return Ok(value);
    }
    let bytes: Option<Vec<u8>> = row.try_get(column)?;
    Ok(bytes.map(|b| String::from_utf8_lossy(&b).into_owned()))
}

/// Read the `Default` cell. NULL stays `None`.
fn default_cell(row: &MySqlRow, column: &str) -> std::result::Result<Option<RawValue>, sqlx::Error> {
    if let Ok(value) = row.try_get::<Option<String>, _>(column) {
        return Ok(value.map(RawValue::Text));
    }
    let bytes: Option<Vec<u8>> = row.try_get(column)?;
    Ok(bytes.map(RawValue::Bytes))
}
