//! Column extraction from model declarations.
//!
//! Turns a model's attribute metadata and table options into the
//! canonical current column list for its table, including the implicit
//! columns governed by table-level flags. Output is plain owned data:
//! nothing here aliases the model's own metadata, so later snapshot
//! mutations can never corrupt it.

use crate::error::{MigrateError, Result};
use crate::model::ModelSource;
use crate::snapshot::ColumnDef;

/// Type tag for the implicit integer primary key.
pub const INTEGER: &str = "INTEGER";
/// Type tag for the implicit timestamp columns.
pub const DATE: &str = "DATE";
/// Marker tag for computed attributes that are never stored.
pub const VIRTUAL: &str = "VIRTUAL";

/// Attribute names whose definitions are fixed and option-driven.
const RESERVED: [&str; 4] = ["id", "createdAt", "updatedAt", "deletedAt"];

/// A column produced by extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedColumn {
    /// Physical column name.
    pub name: String,
    /// Semantic definition.
    pub def: ColumnDef,
    /// Rename hint: the snapshot may hold this column under this name.
    /// Transient diff input, never persisted.
    pub renamed_from: Option<String>,
}

impl ExtractedColumn {
    fn implicit(name: &str, def: ColumnDef) -> Self {
        Self {
            name: name.to_string(),
            def,
            renamed_from: None,
        }
    }
}

/// Extracts the current column list for a model's table, in
/// declaration order.
///
/// # Errors
///
/// Returns [`MigrateError::Extraction`] when an attribute has no
/// resolvable type tag or two attributes map to the same physical
/// column name.
pub fn extract_columns(model: &impl ModelSource) -> Result<Vec<ExtractedColumn>> {
    let options = model.options();
    let mut columns = Vec::new();

    if model.attributes().iter().any(|a| a.name == "id") {
        columns.push(ExtractedColumn::implicit(
            "id",
            ColumnDef::new(INTEGER)
                .not_null()
                .auto_increment()
                .primary_key(),
        ));
    }

    for attr in model.attributes() {
        if RESERVED.contains(&attr.name.as_str()) {
            continue;
        }

        let tag = attr.type_tag.as_deref().ok_or_else(|| MigrateError::Extraction {
            model: options.table_name.clone(),
            message: format!("attribute '{}' has no resolvable type", attr.name),
        })?;
        if tag == VIRTUAL {
            continue;
        }

        let name = attr
            .physical_name
            .clone()
            .unwrap_or_else(|| attr.name.clone());
        if columns.iter().any(|c| c.name == name) {
            return Err(MigrateError::Extraction {
                model: options.table_name.clone(),
                message: format!("duplicate physical column name '{name}'"),
            });
        }

        let mut def = ColumnDef::new(tag);
        // allowNull is recorded only when the attribute explicitly
        // forbids null; anything else stays unset.
        if attr.allow_null == Some(false) {
            def.allow_null = Some(false);
        }
        def.unique = attr.unique;
        def.primary_key = attr.primary_key;
        def.default_value = attr.default_value.clone();

        columns.push(ExtractedColumn {
            name,
            def,
            renamed_from: attr.prev_column_name.clone(),
        });
    }

    if options.timestamps {
        columns.push(ExtractedColumn::implicit(
            "createdAt",
            ColumnDef::new(DATE).not_null(),
        ));
        columns.push(ExtractedColumn::implicit(
            "updatedAt",
            ColumnDef::new(DATE).not_null(),
        ));
    }
    if options.paranoid {
        columns.push(ExtractedColumn::implicit("deletedAt", ColumnDef::new(DATE)));
    }

    Ok(columns)
}
