//! Migration file rendering.
//!
//! Turns a [`MigrationDescriptor`] into migration source text: an `up`
//! and a `down` function, each an ordered sequence of calls against
//! the apply-time schema-mutation interface. Column definitions are
//! embedded as JSON objects whose `type` field must end up as a
//! symbolic `ColumnType::<TAG>` reference rather than a string
//! literal, so a textual post-processing pass unquotes every distinct
//! type token after serialization.

use std::collections::BTreeSet;

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;

use crate::error::{MigrateError, Result};
use crate::operations::{MigrationDescriptor, SchemaOp};
use crate::snapshot::ColumnDef;

/// Prefix of the symbolic type reference in rendered definitions.
const TYPE_TOKEN_PREFIX: &str = "ColumnType::";

/// Matches a quoted type token, e.g. `"ColumnType::INTEGER"`.
const TYPE_TOKEN_PATTERN: &str = r#""ColumnType::[A-Za-z0-9_()]+""#;

/// Builds the deterministic migration filename:
/// `<timestamp with ':' and '.' replaced by '-'>-<label>-<table>.rs`.
#[must_use]
pub fn migration_filename(stamp: &DateTime<Utc>, label: &str, table: &str) -> String {
    let stamp = stamp
        .to_rfc3339_opts(SecondsFormat::Millis, true)
        .replace([':', '.'], "-");
    format!("{stamp}-{label}-{table}.rs")
}

/// Renders a descriptor into migration source text.
///
/// # Errors
///
/// Returns [`MigrateError::Render`] for a descriptor with no forward
/// operations, and [`MigrateError::Serialization`] when a column
/// definition cannot be serialized.
pub fn render_migration(descriptor: &MigrationDescriptor) -> Result<String> {
    let table = descriptor
        .up
        .first()
        .map(SchemaOp::table)
        .ok_or_else(|| MigrateError::Render("descriptor has no operations".to_string()))?;

    let up = render_body(&descriptor.up)?;
    let down = render_body(&descriptor.down)?;

    let text = format!(
        "//! Auto-generated migration: {label} '{table}'.\n\
         //!\n\
         //! The schema snapshot already reflects these changes; edit\n\
         //! with care.\n\
         \n\
         /// Forward operations, in apply order.\n\
         pub fn up(schema: &mut dyn SchemaEditor) {{\n\
         {up}\
         }}\n\
         \n\
         /// Inverse operations restoring the prior shape.\n\
         pub fn down(schema: &mut dyn SchemaEditor) {{\n\
         {down}\
         }}\n",
        label = descriptor.label,
    );

    unquote_type_tokens(&text)
}

/// Renders a function body: one schema-mutation call per line group.
fn render_body(ops: &[SchemaOp]) -> Result<String> {
    let mut out = String::new();
    for op in ops {
        out.push_str("    ");
        out.push_str(&indent_continuations(&render_op(op)?, "    "));
        out.push_str(";\n");
    }
    Ok(out)
}

/// Renders a single schema-mutation call.
fn render_op(op: &SchemaOp) -> Result<String> {
    Ok(match op {
        SchemaOp::CreateTable { table, columns } => {
            let mut body = String::new();
            for (i, (name, def)) in columns.iter().enumerate() {
                if i > 0 {
                    body.push_str(",\n");
                }
                body.push_str(&format!(
                    "        \"{name}\": {}",
                    indent_continuations(&render_def(def)?, "        ")
                ));
            }
            format!("schema.create_table(\n    \"{table}\",\n    {{\n{body}\n    }},\n)")
        }
        SchemaOp::DropTable { table } => format!("schema.drop_table(\"{table}\")"),
        SchemaOp::AddColumn { table, column, def } => format!(
            "schema.add_column(\n    \"{table}\",\n    \"{column}\",\n    {},\n)",
            indent_continuations(&render_def(def)?, "    ")
        ),
        SchemaOp::RemoveColumn { table, column } => {
            format!("schema.remove_column(\"{table}\", \"{column}\")")
        }
        SchemaOp::ChangeColumn { table, column, def } => format!(
            "schema.change_column(\n    \"{table}\",\n    \"{column}\",\n    {},\n)",
            indent_continuations(&render_def(def)?, "    ")
        ),
        SchemaOp::RenameColumn {
            table,
            old_name,
            new_name,
            def,
        } => format!(
            "schema.rename_column(\n    \"{table}\",\n    \"{old_name}\",\n    \"{new_name}\",\n    {},\n)",
            indent_continuations(&render_def(def)?, "    ")
        ),
    })
}

/// Serializes a column definition as pretty JSON with the type tag
/// replaced by its quoted placeholder token.
fn render_def(def: &ColumnDef) -> Result<String> {
    let mut value = serde_json::to_value(def)?;
    if let Some(object) = value.as_object_mut() {
        object.insert(
            "type".to_string(),
            serde_json::Value::String(format!("{TYPE_TOKEN_PREFIX}{}", def.column_type)),
        );
    }
    Ok(serde_json::to_string_pretty(&value)?)
}

/// Prefixes every line after the first with `pad`.
fn indent_continuations(text: &str, pad: &str) -> String {
    text.replace('\n', &format!("\n{pad}"))
}

/// Rewrites every quoted type token to its unquoted symbolic form.
///
/// Applied once per distinct token across the whole text rather than
/// per occurrence, which keeps the output stable no matter how many
/// columns share a type.
fn unquote_type_tokens(text: &str) -> Result<String> {
    let pattern =
        Regex::new(TYPE_TOKEN_PATTERN).map_err(|e| MigrateError::Render(e.to_string()))?;
    let tokens: BTreeSet<&str> = pattern.find_iter(text).map(|m| m.as_str()).collect();

    let mut out = text.to_string();
    for token in tokens {
        let bare = token.trim_matches('"');
        out = out.replace(token, bare);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn stamp() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap()
    }

    #[test]
    fn filename_replaces_colons_and_periods() {
        let name = migration_filename(&stamp(), "add-column-to", "users");
        assert_eq!(name, "2024-01-02T03-04-05-000Z-add-column-to-users.rs");
    }

    #[test]
    fn rendered_type_tokens_are_unquoted() {
        let descriptor = MigrationDescriptor {
            label: "add-column-to".to_string(),
            up: vec![SchemaOp::add_column(
                "users",
                "age",
                ColumnDef::new("INTEGER"),
            )],
            down: vec![SchemaOp::remove_column("users", "age")],
        };
        let text = render_migration(&descriptor).unwrap();

        assert!(text.contains("\"type\": ColumnType::INTEGER"));
        assert!(!text.contains("\"ColumnType::INTEGER\""));
    }

    #[test]
    fn shared_type_tags_are_unquoted_everywhere() {
        let descriptor = MigrationDescriptor {
            label: "add-columns-to".to_string(),
            up: vec![
                SchemaOp::add_column("users", "first", ColumnDef::new("STRING")),
                SchemaOp::add_column("users", "last", ColumnDef::new("STRING")),
            ],
            down: vec![
                SchemaOp::remove_column("users", "first"),
                SchemaOp::remove_column("users", "last"),
            ],
        };
        let text = render_migration(&descriptor).unwrap();
        assert_eq!(text.matches("ColumnType::STRING").count(), 2);
        assert!(!text.contains("\"ColumnType::STRING\""));
    }

    #[test]
    fn initial_migration_lists_columns_in_declaration_order() {
        let descriptor = MigrationDescriptor {
            label: "initial".to_string(),
            up: vec![SchemaOp::create_table(
                "users",
                vec![
                    ("id".to_string(), ColumnDef::new("INTEGER").primary_key()),
                    ("name".to_string(), ColumnDef::new("STRING")),
                ],
            )],
            down: vec![SchemaOp::drop_table("users")],
        };
        let text = render_migration(&descriptor).unwrap();

        assert!(text.contains("schema.create_table("));
        assert!(text.contains("schema.drop_table(\"users\")"));
        let id_at = text.find("\"id\":").unwrap();
        let name_at = text.find("\"name\":").unwrap();
        assert!(id_at < name_at);
    }

    #[test]
    fn rename_renders_both_names_and_definition() {
        let descriptor = MigrationDescriptor {
            label: "rename-column-to".to_string(),
            up: vec![SchemaOp::rename_column(
                "users",
                "email",
                "mail",
                ColumnDef::new("STRING"),
            )],
            down: vec![SchemaOp::rename_column(
                "users",
                "mail",
                "email",
                ColumnDef::new("STRING"),
            )],
        };
        let text = render_migration(&descriptor).unwrap();
        assert!(text.contains("schema.rename_column("));
        assert!(text.contains("\"email\""));
        assert!(text.contains("\"mail\""));
        assert!(text.contains("pub fn up("));
        assert!(text.contains("pub fn down("));
    }

    #[test]
    fn empty_descriptor_is_a_render_error() {
        let descriptor = MigrationDescriptor {
            label: "add-column-to".to_string(),
            up: vec![],
            down: vec![],
        };
        let err = render_migration(&descriptor).unwrap_err();
        assert!(matches!(err, MigrateError::Render(_)));
    }
}
