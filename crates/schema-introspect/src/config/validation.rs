//! Configuration validation.

use super::Config;
use crate::drivers::common::SslMode;
use crate::drivers::DialectKind;
use crate::error::{IntrospectError, Result};

/// Validate the configuration.
pub fn validate(config: &Config) -> Result<()> {
    let conn = &config.connection;

    if conn.url.is_empty() {
        return Err(IntrospectError::Config("connection.url is required".into()));
    }
    if conn.schema.is_empty() {
        return Err(IntrospectError::Config(
            "connection.schema is required".into(),
        ));
    }

    DialectKind::from_url(&conn.url)?;
    SslMode::parse(&conn.ssl_mode)?;

    if let Some(0) = conn.connect_timeout_secs {
        return Err(IntrospectError::Config(
            "connection.connect_timeout_secs must be at least 1".into(),
        ));
    }
    if let Some(0) = conn.query_timeout_secs {
        return Err(IntrospectError::Config(
            "connection.query_timeout_secs must be at least 1".into(),
        ));
    }

    Ok(())
}
