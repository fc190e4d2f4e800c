//! Canonical schema types for tables, columns and indexes.
//!
//! These are the dialect-neutral values handed to migration tooling. A
//! [`Table`] is assembled once during a rebuild and then shared read-only.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Option key set to `true` when a column accepts NULL.
pub const OPTION_NULL: &str = "null";

/// Option key holding the stringified column default.
pub const OPTION_DEFAULT: &str = "default";

/// Value stored under a column option key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for OptionValue {
    fn from(v: bool) -> Self {
        OptionValue::Bool(v)
    }
}

impl From<String> for OptionValue {
    fn from(v: String) -> Self {
        OptionValue::Text(v)
    }
}

impl From<&str> for OptionValue {
    fn from(v: &str) -> Self {
        OptionValue::Text(v.to_string())
    }
}

/// Open-ended column options. A missing key means "not applicable".
pub type ColumnOptions = BTreeMap<String, OptionValue>;

/// Column metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Column name.
    pub name: String,

    /// Type literal exactly as the catalog reported it (e.g. "varchar(255)").
    pub declared_type: String,

    /// Whether the column is part of the primary key.
    pub is_primary_key: bool,

    /// Recognized keys: [`OPTION_NULL`] and [`OPTION_DEFAULT`].
    #[serde(default)]
    pub options: ColumnOptions,
}

impl Column {
    /// Whether the `null` option is present and true.
    pub fn is_nullable(&self) -> bool {
        matches!(self.options.get(OPTION_NULL), Some(OptionValue::Bool(true)))
    }

    /// The default value, if the catalog reported one.
    pub fn default_value(&self) -> Option<&str> {
        match self.options.get(OPTION_DEFAULT) {
            Some(OptionValue::Text(v)) => Some(v.as_str()),
            _ => None,
        }
    }
}

/// Index metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Index {
    /// Index name.
    pub name: String,

    /// Whether the index is unique.
    pub is_unique: bool,

    /// Indexed column names, in key order.
    pub columns: Vec<String>,
}

/// Table metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    /// Table name.
    pub name: String,

    /// Columns in catalog ordinal order.
    pub columns: Vec<Column>,

    /// Secondary indexes. Empty unless an index discoverer filled them in.
    #[serde(default)]
    pub indexes: Vec<Index>,
}

impl Table {
    /// Create an empty table.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indexes: Vec::new(),
        }
    }

    /// Find a column by exact name.
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key column names in declaration order.
    pub fn primary_key(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|c| c.is_primary_key)
            .map(|c| c.name.as_str())
            .collect()
    }

    /// Check if the table has a primary key.
    pub fn has_pk(&self) -> bool {
        self.columns.iter().any(|c| c.is_primary_key)
    }
}
