//! Model provider interface.
//!
//! The model-declaration system is an external collaborator: all this
//! crate needs from it is a per-model attribute list and table-level
//! options. [`ModelSource`] captures that contract, and [`ModelDecl`]
//! is a serde-backed implementation loaded from a JSON declarations
//! file by the CLI.

use std::path::Path;

use serde::Deserialize;

use crate::error::{MigrateError, Result};

/// One declared model attribute.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Attribute {
    /// Logical attribute name.
    pub name: String,
    /// Declared type tag; `None` means the type could not be resolved.
    #[serde(rename = "type")]
    pub type_tag: Option<String>,
    /// Physical column name, when it differs from the logical name.
    #[serde(rename = "field")]
    pub physical_name: Option<String>,
    /// Explicit nullability constraint.
    #[serde(rename = "allowNull")]
    pub allow_null: Option<bool>,
    /// UNIQUE constraint.
    pub unique: Option<bool>,
    /// Primary key flag.
    #[serde(rename = "primaryKey")]
    pub primary_key: Option<bool>,
    /// Rename hint: the column used to be named this.
    #[serde(rename = "prevColumnName")]
    pub prev_column_name: Option<String>,
    /// Default value.
    #[serde(rename = "defaultValue")]
    pub default_value: Option<serde_json::Value>,
}

impl Attribute {
    /// Creates an attribute with the given name and type tag.
    #[must_use]
    pub fn new(name: impl Into<String>, type_tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_tag: Some(type_tag.into()),
            ..Self::default()
        }
    }
}

/// Table-level options exposed by a model.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelOptions {
    /// Physical table name.
    #[serde(rename = "tableName")]
    pub table_name: String,
    /// Gate for automatic migration generation.
    #[serde(rename = "autoMigrations", default = "default_true")]
    pub auto_migrations: bool,
    /// Whether the table carries `createdAt`/`updatedAt` columns.
    #[serde(default = "default_true")]
    pub timestamps: bool,
    /// Whether the table carries a `deletedAt` soft-delete marker.
    #[serde(default)]
    pub paranoid: bool,
}

const fn default_true() -> bool {
    true
}

impl ModelOptions {
    /// Creates options for the given table with defaults
    /// (auto-migrations on, timestamps on, soft-delete off).
    #[must_use]
    pub fn new(table_name: impl Into<String>) -> Self {
        Self {
            table_name: table_name.into(),
            auto_migrations: true,
            timestamps: true,
            paranoid: false,
        }
    }
}

/// Supplies column metadata for one declared model.
pub trait ModelSource {
    /// Declared attributes, in declaration order.
    fn attributes(&self) -> &[Attribute];

    /// Table-level options.
    fn options(&self) -> &ModelOptions;
}

/// A model declaration parsed from the JSON declarations file.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelDecl {
    /// Declared attributes, in file order.
    #[serde(default)]
    pub attributes: Vec<Attribute>,
    /// Table-level options.
    pub options: ModelOptions,
}

impl ModelSource for ModelDecl {
    fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    fn options(&self) -> &ModelOptions {
        &self.options
    }
}

/// Loads model declarations from a JSON file (a top-level array).
///
/// # Errors
///
/// Returns [`MigrateError::Persistence`] when the file cannot be read
/// and [`MigrateError::Serialization`] when it is not valid JSON.
pub fn load_models(path: &Path) -> Result<Vec<ModelDecl>> {
    let text = std::fs::read_to_string(path).map_err(|source| MigrateError::Persistence {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_with_defaults() {
        let text = r#"[
            {
                "attributes": [
                    {"name": "id", "type": "INTEGER"},
                    {"name": "email", "type": "STRING", "allowNull": false, "unique": true}
                ],
                "options": {"tableName": "users"}
            }
        ]"#;
        let models: Vec<ModelDecl> = serde_json::from_str(text).unwrap();
        assert_eq!(models.len(), 1);

        let model = &models[0];
        assert_eq!(model.options.table_name, "users");
        assert!(model.options.auto_migrations);
        assert!(model.options.timestamps);
        assert!(!model.options.paranoid);

        let email = &model.attributes[1];
        assert_eq!(email.type_tag.as_deref(), Some("STRING"));
        assert_eq!(email.allow_null, Some(false));
        assert_eq!(email.unique, Some(true));
    }

    #[test]
    fn parses_rename_hint_and_field_override() {
        let text = r#"{
            "name": "mail",
            "type": "STRING",
            "field": "mail_address",
            "prevColumnName": "email"
        }"#;
        let attr: Attribute = serde_json::from_str(text).unwrap();
        assert_eq!(attr.physical_name.as_deref(), Some("mail_address"));
        assert_eq!(attr.prev_column_name.as_deref(), Some("email"));
    }

    #[test]
    fn missing_models_file_is_a_persistence_error() {
        let err = load_models(Path::new("/nonexistent/models.json")).unwrap_err();
        assert!(matches!(err, MigrateError::Persistence { .. }));
    }
}
