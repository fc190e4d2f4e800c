//! Translation of raw catalog rows into canonical columns.
//!
//! Drivers report column metadata as loosely typed text: nullability as
//! `"YES"`/`"NO"`, key membership as a short marker and defaults as whatever
//! the driver decoded. [`translate`] turns one such row into a [`Column`]
//! without touching the database.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::schema::{Column, ColumnOptions, OptionValue, OPTION_DEFAULT, OPTION_NULL};

/// A default value as decoded by the driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RawValue {
    Text(String),
    Bytes(Vec<u8>),
    Int(i64),
    UInt(u64),
    Float(f64),
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawValue::Text(v) => f.write_str(v),
            RawValue::Bytes(v) => f.write_str(&String::from_utf8_lossy(v)),
            RawValue::Int(v) => write!(f, "{}", v),
            RawValue::UInt(v) => write!(f, "{}", v),
            RawValue::Float(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for RawValue {
    fn from(v: &str) -> Self {
        RawValue::Text(v.to_string())
    }
}

impl From<String> for RawValue {
    fn from(v: String) -> Self {
        RawValue::Text(v)
    }
}

/// One row of a `DESCRIBE`-shaped column listing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawColumnRecord {
    /// `Field`: column name.
    pub field: String,
    /// `Type`: declared type literal.
    pub col_type: String,
    /// `Null`: nullability indicator.
    pub null: String,
    /// `Key`: key membership marker.
    pub key: String,
    /// `Default`: None when the catalog reports NULL.
    pub default: Option<RawValue>,
    /// `Extra`: e.g. `auto_increment`. Carried but not translated.
    pub extra: String,
}

/// Dialect tokens used when interpreting a raw row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnMarkers {
    /// Exact, case-sensitive `Key` value that marks a primary key column.
    pub primary_key: &'static str,
    /// `Null` value (compared case-insensitively) that marks a nullable column.
    pub nullable: &'static str,
}

impl ColumnMarkers {
    /// Markers reported by MySQL/MariaDB `DESCRIBE`.
    pub const MYSQL: ColumnMarkers = ColumnMarkers {
        primary_key: "PRI",
        nullable: "yes",
    };
}

impl Default for ColumnMarkers {
    fn default() -> Self {
        Self::MYSQL
    }
}

/// Translate a raw catalog row into a canonical column.
///
/// Total: a missing default only omits the `default` option, and any
/// nullability token other than the affirmative one omits `null`.
pub fn translate(raw: RawColumnRecord, markers: &ColumnMarkers) -> Column {
    let mut options = ColumnOptions::new();

    if raw.null.eq_ignore_ascii_case(markers.nullable) {
        options.insert(OPTION_NULL.to_string(), OptionValue::Bool(true));
    }
    if let Some(default) = &raw.default {
        options.insert(OPTION_DEFAULT.to_string(), OptionValue::Text(default.to_string()));
    }

    Column {
        is_primary_key: raw.key == markers.primary_key,
        name: raw.field,
        declared_type: raw.col_type,
        options,
    }
}

impl RawColumnRecord {
    /// Shorthand for [`translate`].
    pub fn into_column(self, markers: &ColumnMarkers) -> Column {
        translate(self, markers)
    }
}
