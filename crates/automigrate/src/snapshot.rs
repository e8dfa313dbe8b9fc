//! Persisted schema snapshot types.
//!
//! The snapshot is the single source of truth for the last-known
//! schema across runs: a JSON mapping from table name to that table's
//! column definitions. The diff engine compares freshly extracted
//! model columns against it and the store writes it back after every
//! successfully generated table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One column's full description.
///
/// The type tag is an opaque uppercase token (`"INTEGER"`, `"STRING"`,
/// `"DATE"`, ...) that this system only compares and formats. All
/// constraint fields are optional; an absent field and a missing JSON
/// key normalize to the same unset state, so two definitions are equal
/// iff every field is deep-equal after that normalization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// Canonical type tag.
    #[serde(rename = "type")]
    pub column_type: String,
    /// Whether NULL is allowed; `None` means not explicitly constrained.
    #[serde(rename = "allowNull", skip_serializing_if = "Option::is_none")]
    pub allow_null: Option<bool>,
    /// Whether the column carries a UNIQUE constraint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unique: Option<bool>,
    /// Whether the column is part of the primary key.
    #[serde(rename = "primaryKey", skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    /// Whether the column auto-increments (implicit primary key only).
    #[serde(rename = "autoIncrement", skip_serializing_if = "Option::is_none")]
    pub auto_increment: Option<bool>,
    /// Default value, if any.
    #[serde(rename = "defaultValue", skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

impl ColumnDef {
    /// Creates a definition with the given type tag and no constraints.
    #[must_use]
    pub fn new(column_type: impl Into<String>) -> Self {
        Self {
            column_type: column_type.into(),
            allow_null: None,
            unique: None,
            primary_key: None,
            auto_increment: None,
            default_value: None,
        }
    }

    /// Marks the column as NOT NULL.
    #[must_use]
    pub fn not_null(mut self) -> Self {
        self.allow_null = Some(false);
        self
    }

    /// Marks the column as UNIQUE.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = Some(true);
        self
    }

    /// Marks the column as a primary key.
    #[must_use]
    pub fn primary_key(mut self) -> Self {
        self.primary_key = Some(true);
        self
    }

    /// Marks the column as auto-incrementing.
    #[must_use]
    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = Some(true);
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn default_value(mut self, value: serde_json::Value) -> Self {
        self.default_value = Some(value);
        self
    }
}

/// One table's believed schema: column name to definition.
///
/// A sorted map keeps snapshot output stable across runs and makes
/// equality independent of declaration order.
pub type TableColumns = BTreeMap<String, ColumnDef>;

/// The whole persisted snapshot: table name to [`TableColumns`].
///
/// Serializes transparently as the top-level JSON mapping, so a
/// first-run snapshot file is just `{}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Snapshot {
    /// Tables keyed by name, sorted for deterministic output.
    pub tables: BTreeMap<String, TableColumns>,
}

impl Snapshot {
    /// Creates an empty snapshot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Looks up a table's columns by name.
    #[must_use]
    pub fn table(&self, name: &str) -> Option<&TableColumns> {
        self.tables.get(name)
    }

    /// Replaces a table's columns wholesale.
    pub fn set_table(&mut self, name: impl Into<String>, columns: TableColumns) {
        self.tables.insert(name.into(), columns);
    }
}
