//! Error types for migration generation.

use std::path::PathBuf;

/// Errors that can occur while generating migrations.
///
/// "No structural change" is deliberately not represented here: a diff
/// with zero descriptors is a normal outcome, reported by the driver
/// as informational rather than as a failure.
#[derive(Debug, thiserror::Error)]
pub enum MigrateError {
    /// Malformed or unresolvable attribute metadata from the model provider.
    #[error("Failed to extract columns for model '{model}': {message}")]
    Extraction {
        /// Table name of the model being extracted.
        model: String,
        /// What was wrong with the metadata.
        message: String,
    },

    /// A snapshot or migration file could not be read or written.
    #[error("Failed to read or write '{path}': {source}")]
    Persistence {
        /// Path to the offending file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Generated migration text failed to render.
    #[error("Failed to render migration: {0}")]
    Render(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error without a known file context.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for migration generation.
pub type Result<T> = std::result::Result<T, MigrateError>;
