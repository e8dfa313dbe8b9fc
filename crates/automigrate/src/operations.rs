//! Schema-mutation operations and migration descriptors.
//!
//! A [`SchemaOp`] is one call against the schema-mutation interface
//! that generated migration files invoke at apply time. The diff
//! engine groups them into [`MigrationDescriptor`]s, each carrying an
//! up sequence and its exact inverse.

use crate::snapshot::ColumnDef;

/// A single schema-mutation call.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaOp {
    /// Create a table with all of its columns.
    CreateTable {
        /// Table name.
        table: String,
        /// Columns in declaration order.
        columns: Vec<(String, ColumnDef)>,
    },

    /// Drop a table.
    DropTable {
        /// Table name.
        table: String,
    },

    /// Add a column to a table.
    AddColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// Column definition.
        def: ColumnDef,
    },

    /// Remove a column from a table.
    RemoveColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
    },

    /// Change an existing column's definition.
    ChangeColumn {
        /// Table name.
        table: String,
        /// Column name.
        column: String,
        /// New definition.
        def: ColumnDef,
    },

    /// Rename a column, keeping its definition.
    RenameColumn {
        /// Table name.
        table: String,
        /// Current name.
        old_name: String,
        /// New name.
        new_name: String,
        /// Definition under the new name.
        def: ColumnDef,
    },
}

impl SchemaOp {
    /// Creates a `CreateTable` operation.
    #[must_use]
    pub fn create_table(table: impl Into<String>, columns: Vec<(String, ColumnDef)>) -> Self {
        Self::CreateTable {
            table: table.into(),
            columns,
        }
    }

    /// Creates a `DropTable` operation.
    #[must_use]
    pub fn drop_table(table: impl Into<String>) -> Self {
        Self::DropTable {
            table: table.into(),
        }
    }

    /// Creates an `AddColumn` operation.
    #[must_use]
    pub fn add_column(table: impl Into<String>, column: impl Into<String>, def: ColumnDef) -> Self {
        Self::AddColumn {
            table: table.into(),
            column: column.into(),
            def,
        }
    }

    /// Creates a `RemoveColumn` operation.
    #[must_use]
    pub fn remove_column(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::RemoveColumn {
            table: table.into(),
            column: column.into(),
        }
    }

    /// Creates a `ChangeColumn` operation.
    #[must_use]
    pub fn change_column(
        table: impl Into<String>,
        column: impl Into<String>,
        def: ColumnDef,
    ) -> Self {
        Self::ChangeColumn {
            table: table.into(),
            column: column.into(),
            def,
        }
    }

    /// Creates a `RenameColumn` operation.
    #[must_use]
    pub fn rename_column(
        table: impl Into<String>,
        old_name: impl Into<String>,
        new_name: impl Into<String>,
        def: ColumnDef,
    ) -> Self {
        Self::RenameColumn {
            table: table.into(),
            old_name: old_name.into(),
            new_name: new_name.into(),
            def,
        }
    }

    /// Returns the table this operation targets.
    #[must_use]
    pub fn table(&self) -> &str {
        match self {
            Self::CreateTable { table, .. }
            | Self::DropTable { table }
            | Self::AddColumn { table, .. }
            | Self::RemoveColumn { table, .. }
            | Self::ChangeColumn { table, .. }
            | Self::RenameColumn { table, .. } => table,
        }
    }

    /// Returns a human-readable description of this operation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::CreateTable { table, columns } => {
                format!("Create table '{}' ({} columns)", table, columns.len())
            }
            Self::DropTable { table } => format!("Drop table '{table}'"),
            Self::AddColumn { table, column, .. } => {
                format!("Add column '{column}' to table '{table}'")
            }
            Self::RemoveColumn { table, column } => {
                format!("Remove column '{column}' from table '{table}'")
            }
            Self::ChangeColumn { table, column, .. } => {
                format!("Change column '{column}' in table '{table}'")
            }
            Self::RenameColumn {
                table,
                old_name,
                new_name,
                ..
            } => format!("Rename column '{old_name}' to '{new_name}' in table '{table}'"),
        }
    }
}

/// One generated migration: a label plus matching up/down sequences.
///
/// Descriptors live only long enough to be rendered to a file; they
/// carry no state across runs.
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationDescriptor {
    /// Change-category label, used in the migration filename.
    pub label: String,
    /// Forward operations, in apply order.
    pub up: Vec<SchemaOp>,
    /// Inverse operations restoring the prior shape.
    pub down: Vec<SchemaOp>,
}
