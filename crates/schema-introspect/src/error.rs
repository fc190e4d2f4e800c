//! Error types for the introspection library.

use std::time::Duration;

use thiserror::Error;

/// Main error type for introspection operations.
#[derive(Error, Debug)]
pub enum IntrospectError {
    /// Configuration error (invalid YAML, missing fields, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Could not open or authenticate a connection to the target
    #[error("Connection to {target} failed: {message}")]
    ConnectionFailed { target: String, message: String },

    /// The table-listing query failed
    #[error("Catalog query for schema '{schema}' failed: {message}")]
    CatalogQueryFailed { schema: String, message: String },

    /// The column-listing query for one table failed
    #[error("Column query for table '{table}' failed: {message}")]
    ColumnQueryFailed { table: String, message: String },

    /// The index-listing query for one table failed
    #[error("Index query for table '{table}' failed: {message}")]
    IndexQueryFailed { table: String, message: String },

    /// The catalog was reachable but the table is not in the schema
    #[error("Table '{table}' not found in schema '{schema}'")]
    TableNotFound { table: String, schema: String },

    /// A rebuild triggered by a lookup failed
    #[error("Could not build schema '{schema}' while looking up table '{table}'")]
    SchemaBuildFailed {
        table: String,
        schema: String,
        #[source]
        source: Box<IntrospectError>,
    },

    /// Connection acquire or a catalog query ran past its deadline
    #[error("{operation} exceeded deadline of {}s", timeout.as_secs_f64())]
    DeadlineExceeded { operation: String, timeout: Duration },

    /// IO error (file operations)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML serialization/deserialization error
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl IntrospectError {
    /// Create a ConnectionFailed error for a (redacted) target.
    pub fn connection(target: impl Into<String>, message: impl ToString) -> Self {
        IntrospectError::ConnectionFailed {
            target: target.into(),
            message: message.to_string(),
        }
    }

    /// Create a CatalogQueryFailed error.
    pub fn catalog_query(schema: impl Into<String>, message: impl ToString) -> Self {
        IntrospectError::CatalogQueryFailed {
            schema: schema.into(),
            message: message.to_string(),
        }
    }

    /// Create a ColumnQueryFailed error.
    pub fn column_query(table: impl Into<String>, message: impl ToString) -> Self {
        IntrospectError::ColumnQueryFailed {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Create an IndexQueryFailed error.
    pub fn index_query(table: impl Into<String>, message: impl ToString) -> Self {
        IntrospectError::IndexQueryFailed {
            table: table.into(),
            message: message.to_string(),
        }
    }

    /// Wrap a rebuild failure that surfaced from a lookup.
    pub fn schema_build(
        table: impl Into<String>,
        schema: impl Into<String>,
        source: IntrospectError,
    ) -> Self {
        IntrospectError::SchemaBuildFailed {
            table: table.into(),
            schema: schema.into(),
            source: Box::new(source),
        }
    }

    /// The innermost error, looking through `SchemaBuildFailed` wrappers.
    pub fn root_cause(&self) -> &IntrospectError {
        match self {
            IntrospectError::SchemaBuildFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Whether this error (or the error it wraps) is a missed deadline.
    pub fn is_deadline(&self) -> bool {
        matches!(self.root_cause(), IntrospectError::DeadlineExceeded { .. })
    }

    /// Process exit code for the CLI.
    pub fn exit_code(&self) -> u8 {
        match self.root_cause() {
            IntrospectError::Config(_)
            | IntrospectError::Yaml(_)
            | IntrospectError::Io(_) => 2,
            IntrospectError::ConnectionFailed { .. } => 3,
            IntrospectError::TableNotFound { .. } => 4,
            IntrospectError::DeadlineExceeded { .. } => 5,
            _ => 1,
        }
    }

    /// Format error with full details including error chain
    pub fn format_detailed(&self) -> String {
        let mut output = format!("Error: {}\n", self);

        let mut source = std::error::Error::source(self);
        let mut depth = 1;
        while let Some(err) = source {
            output.push_str(&format!("\nCaused by:\n  {}: {}", depth, err));
            source = err.source();
            depth += 1;
        }

        output
    }
}

/// Result type alias for introspection operations.
pub type Result<T> = std::result::Result<T, IntrospectError>;
