//! Snapshot-based migration generation for declarative models.
//!
//! `automigrate` diffs a model's declared columns against a persisted
//! snapshot of the last-known schema and emits reversible migration
//! files, so tables declared in code never need hand-written
//! migrations. It detects every structural change since the last run
//! (new, changed, renamed, removed columns), resolves the
//! rename-vs-remove-and-add ambiguity through an explicit
//! previous-name hint, and updates the snapshot afterwards.
//!
//! # Architecture
//!
//! - **Extract** - Canonical current columns for a model's table,
//!   including the implicit primary key, timestamp, and soft-delete
//!   columns governed by table options
//! - **Autodetector** - Classifies columns against the snapshot and
//!   produces ordered migration descriptors with exact inverses
//! - **Writer** - Renders descriptors to migration source files with
//!   symbolic type references
//! - **Store** - Loads and persists the snapshot, per-table and
//!   idempotent
//! - **Generate** - Drives the per-model loop and isolates failures
//!
//! # Example
//!
//! ```rust
//! use automigrate::prelude::*;
//!
//! let model = ModelDecl {
//!     attributes: vec![
//!         Attribute::new("id", "INTEGER"),
//!         Attribute::new("name", "STRING"),
//!     ],
//!     options: ModelOptions::new("users"),
//! };
//!
//! let current = extract_columns(&model).unwrap();
//! let diff = diff_table("users", &current, None);
//! assert_eq!(diff.descriptors[0].label, "initial");
//! ```
//!
//! This tool only generates migration files; it never talks to a live
//! database and never executes what it generates.

pub mod autodetector;
pub mod error;
pub mod extract;
pub mod generate;
pub mod model;
pub mod operations;
pub mod snapshot;
pub mod store;
pub mod writer;

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::autodetector::{diff_table, TableDiff};
    pub use crate::error::{MigrateError, Result};
    pub use crate::extract::{extract_columns, ExtractedColumn};
    pub use crate::generate::{MigrationGenerator, ModelOutcome, RunReport};
    pub use crate::model::{load_models, Attribute, ModelDecl, ModelOptions, ModelSource};
    pub use crate::operations::{MigrationDescriptor, SchemaOp};
    pub use crate::snapshot::{ColumnDef, Snapshot, TableColumns};
    pub use crate::store::SnapshotStore;
    pub use crate::writer::{migration_filename, render_migration};
}

#[cfg(test)]
mod tests {
    use crate::prelude::*;

    fn users() -> ModelDecl {
        let mut email = Attribute::new("email", "STRING");
        email.allow_null = Some(false);
        let mut options = ModelOptions::new("users");
        options.timestamps = false;
        ModelDecl {
            attributes: vec![Attribute::new("id", "INTEGER"), email],
            options,
        }
    }

    #[test]
    fn extract_then_diff_then_render() {
        let current = extract_columns(&users()).unwrap();
        let diff = diff_table("users", &current, None);
        assert_eq!(diff.descriptors.len(), 1);

        let text = render_migration(&diff.descriptors[0]).unwrap();
        assert!(text.contains("schema.create_table("));
        assert!(text.contains("ColumnType::INTEGER"));
        assert!(text.contains("schema.drop_table(\"users\")"));

        // Re-diffing against the produced state is a fixpoint.
        let again = diff_table("users", &current, Some(&diff.state));
        assert!(again.is_no_change());
    }
}
