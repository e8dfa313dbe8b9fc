//! Diff engine for generating migrations from model changes.
//!
//! Compares a table's freshly extracted columns against its snapshot
//! entry, classifies every column into exactly one of new / changed /
//! renamed / removed (or unchanged), and produces the ordered
//! migration descriptors with their inverses.
//!
//! The function is pure: it returns the post-diff table state instead
//! of mutating the snapshot, and the caller applies that state to the
//! store atomically per table. The borrowed prior entry doubles as the
//! frozen pre-image that down operations are built from.

use std::collections::BTreeSet;

use crate::extract::ExtractedColumn;
use crate::operations::{MigrationDescriptor, SchemaOp};
use crate::snapshot::{ColumnDef, TableColumns};

/// Label of the descriptor emitted for a table with no snapshot entry.
pub const INITIAL_LABEL: &str = "initial";

/// Result of diffing one table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDiff {
    /// Migration descriptors, at most one per change category, in
    /// fixed order: new, change, rename, remove.
    pub descriptors: Vec<MigrationDescriptor>,
    /// The table state the snapshot should hold after this diff.
    pub state: TableColumns,
}

impl TableDiff {
    /// Returns `true` when the snapshot already matches the model.
    #[must_use]
    pub fn is_no_change(&self) -> bool {
        self.descriptors.is_empty()
    }
}

/// Compares extracted columns against the table's snapshot entry.
///
/// `prior` is `None` on the first run for a table, which yields a
/// single `initial` descriptor creating the whole table.
#[must_use]
pub fn diff_table(
    table: &str,
    current: &[ExtractedColumn],
    prior: Option<&TableColumns>,
) -> TableDiff {
    let state: TableColumns = current
        .iter()
        .map(|c| (c.name.clone(), c.def.clone()))
        .collect();

    let Some(prior) = prior else {
        return initial_diff(table, current, state);
    };

    if *prior == state {
        return TableDiff {
            descriptors: Vec::new(),
            state,
        };
    }

    // Forward pass in declaration order. `consumed` holds every prior
    // key claimed by a direct name match or a resolved rename; the
    // leftovers are the true removals.
    let mut added: Vec<&ExtractedColumn> = Vec::new();
    let mut changed: Vec<&ExtractedColumn> = Vec::new();
    let mut renamed: Vec<(&str, &ExtractedColumn)> = Vec::new();
    let mut consumed: BTreeSet<&str> = BTreeSet::new();

    for col in current {
        if let Some(old_def) = prior.get(&col.name) {
            consumed.insert(col.name.as_str());
            if *old_def != col.def {
                changed.push(col);
            }
        } else if let Some(prev) = resolvable_hint(col, prior, &consumed) {
            consumed.insert(prev);
            renamed.push((prev, col));
        } else {
            added.push(col);
        }
    }

    let removed: Vec<(&str, &ColumnDef)> = prior
        .iter()
        .filter(|(name, _)| !consumed.contains(name.as_str()))
        .map(|(name, def)| (name.as_str(), def))
        .collect();

    let mut descriptors = Vec::new();

    if !added.is_empty() {
        descriptors.push(MigrationDescriptor {
            label: pick_label(added.len(), "add-column-to", "add-columns-to"),
            up: added
                .iter()
                .map(|c| SchemaOp::add_column(table, &c.name, c.def.clone()))
                .collect(),
            down: added
                .iter()
                .map(|c| SchemaOp::remove_column(table, &c.name))
                .collect(),
        });
    }

    if !changed.is_empty() {
        descriptors.push(MigrationDescriptor {
            label: pick_label(changed.len(), "change-column-to", "change-columns-to"),
            up: changed
                .iter()
                .map(|c| SchemaOp::change_column(table, &c.name, c.def.clone()))
                .collect(),
            // Down restores the frozen prior definition, not whatever
            // the snapshot holds after this run.
            down: changed
                .iter()
                .map(|c| SchemaOp::change_column(table, &c.name, prior[&c.name].clone()))
                .collect(),
        });
    }

    if !renamed.is_empty() {
        descriptors.push(MigrationDescriptor {
            label: pick_label(renamed.len(), "rename-column-to", "rename-columns-to"),
            up: renamed
                .iter()
                .map(|(prev, c)| SchemaOp::rename_column(table, *prev, &c.name, c.def.clone()))
                .collect(),
            down: renamed
                .iter()
                .map(|(prev, c)| {
                    SchemaOp::rename_column(table, &c.name, *prev, prior[*prev].clone())
                })
                .collect(),
        });
    }

    if !removed.is_empty() {
        descriptors.push(MigrationDescriptor {
            label: pick_label(removed.len(), "remove-column-from", "remove-columns-from"),
            up: removed
                .iter()
                .map(|(name, _)| SchemaOp::remove_column(table, *name))
                .collect(),
            down: removed
                .iter()
                .map(|(name, def)| SchemaOp::add_column(table, *name, (*def).clone()))
                .collect(),
        });
    }

    TableDiff { descriptors, state }
}

/// First run for a table: one `initial` descriptor creating it.
fn initial_diff(table: &str, current: &[ExtractedColumn], state: TableColumns) -> TableDiff {
    let columns: Vec<(String, ColumnDef)> = current
        .iter()
        .map(|c| (c.name.clone(), c.def.clone()))
        .collect();
    TableDiff {
        descriptors: vec![MigrationDescriptor {
            label: INITIAL_LABEL.to_string(),
            up: vec![SchemaOp::create_table(table, columns)],
            down: vec![SchemaOp::drop_table(table)],
        }],
        state,
    }
}

/// Resolves a column's rename hint against the prior state.
///
/// A hint is ignored when it names the column itself, when no prior
/// entry exists under it, or when that entry was already claimed by an
/// earlier match; the column then falls through to `new`.
fn resolvable_hint<'a>(
    col: &'a ExtractedColumn,
    prior: &TableColumns,
    consumed: &BTreeSet<&str>,
) -> Option<&'a str> {
    col.renamed_from
        .as_deref()
        .filter(|prev| *prev != col.name && prior.contains_key(*prev) && !consumed.contains(prev))
}

fn pick_label(count: usize, singular: &str, plural: &str) -> String {
    if count > 1 {
        plural.to_string()
    } else {
        singular.to_string()
    }
}
