//! Utilities shared across database drivers.
//!
//! - [`tls`]: TLS configuration for PostgreSQL connections
//! - [`with_deadline`]: optional time bound around connect and query futures

pub mod tls;

pub use tls::{SslMode, TlsBuilder};

use std::future::Future;
use std::time::Duration;

use crate::error::{IntrospectError, Result};

/// Run `fut` under an optional deadline.
///
/// A missed deadline becomes `DeadlineExceeded` naming `operation`; without
/// a deadline the future runs to completion.
pub async fn with_deadline<T, F>(operation: &str, limit: Option<Duration>, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match limit {
        None => fut.await,
        Some(timeout) => tokio::time::timeout(timeout, fut).await.map_err(|_| {
            IntrospectError::DeadlineExceeded {
                operation: operation.to_string(),
                timeout,
            }
        })?,
    }
}
