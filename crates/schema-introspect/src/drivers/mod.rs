//! Database driver implementations.
//!
//! - [`mysql`]: MySQL/MariaDB catalog source (sqlx)
//! - [`postgres`]: PostgreSQL catalog source (tokio-postgres)
//! - [`common`]: Shared utilities (TLS, deadlines)
//!
//! # Adding New Databases
//!
//! 1. Create a module under `drivers/` implementing `CatalogSource` and
//!    `CatalogConnection`
//! 2. Add a variant to [`DialectKind`] and its URL schemes
//! 3. Construct it in [`source_for`]

pub mod common;
pub mod mysql;
pub mod postgres;

pub use mysql::MysqlSource;
pub use postgres::PostgresSource;

use std::sync::Arc;

use crate::config::ConnectionConfig;
use crate::core::traits::CatalogSource;
use crate::error::{IntrospectError, Result};

/// Supported database dialects, selected by URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialectKind {
    Mysql,
    Postgres,
}

impl DialectKind {
    /// Pick a dialect from a connection URL.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL has no scheme or the scheme is not recognized.
    pub fn from_url(url: &str) -> Result<Self> {
        let scheme = url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_lowercase())
            .ok_or_else(|| {
                IntrospectError::Config(
                    "connection.url must start with a scheme such as mysql:// or postgres://"
                        .to_string(),
                )
            })?;

        match scheme.as_str() {
            "mysql" | "mariadb" => Ok(DialectKind::Mysql),
            "postgres" | "postgresql" => Ok(DialectKind::Postgres),
            other => Err(IntrospectError::Config(format!(
                "Unknown database type: '{}'. Supported types: mysql, postgres",
                other
            ))),
        }
    }

    /// Dialect identifier.
    pub fn name(&self) -> &'static str {
        match self {
            DialectKind::Mysql => "mysql",
            DialectKind::Postgres => "postgres",
        }
    }
}

/// Build the catalog source for a connection configuration.
pub fn source_for(config: &ConnectionConfig) -> Result<Arc<dyn CatalogSource>> {
    match DialectKind::from_url(&config.url)? {
        DialectKind::Mysql => Ok(Arc::new(MysqlSource::new(config)?)),
        DialectKind::Postgres => Ok(Arc::new(PostgresSource::new(config)?)),
    }
}
