//! Migration generation driver.
//!
//! Iterates all models with auto-migration enabled and, for each one
//! independently: extracts columns, diffs against the snapshot,
//! renders and writes migration files, then persists the updated
//! snapshot. One model's failure never aborts the run; the snapshot is
//! flushed per table so a mid-run crash keeps committed progress.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;
use tracing::{debug, error, info};

use crate::autodetector::diff_table;
use crate::error::{MigrateError, Result};
use crate::extract::extract_columns;
use crate::model::ModelSource;
use crate::store::SnapshotStore;
use crate::writer::{migration_filename, render_migration};

/// Outcome of processing one model.
#[derive(Debug)]
pub enum ModelOutcome {
    /// Migration files were written and the snapshot updated.
    Created(Vec<PathBuf>),
    /// Dry run: these files would have been written.
    Planned(Vec<PathBuf>),
    /// The snapshot already matches the model; nothing to do.
    NoChange,
    /// Extraction, rendering, or persistence failed for this model.
    Failed(MigrateError),
}

/// Per-run summary, one entry per processed table.
#[derive(Debug, Default)]
pub struct RunReport {
    /// (table name, outcome) pairs in processing order.
    pub outcomes: Vec<(String, ModelOutcome)>,
}

impl RunReport {
    /// Number of models for which files were written.
    #[must_use]
    pub fn created(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, o)| matches!(o, ModelOutcome::Created(_)))
            .count()
    }

    /// Returns `true` if any model failed.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes
            .iter()
            .any(|(_, o)| matches!(o, ModelOutcome::Failed(_)))
    }
}

/// Drives extraction, diffing, rendering, and persistence.
#[derive(Debug)]
pub struct MigrationGenerator {
    migrations_dir: PathBuf,
    dry_run: bool,
}

impl MigrationGenerator {
    /// Creates a generator writing migration files into the given
    /// directory.
    #[must_use]
    pub fn new(migrations_dir: impl Into<PathBuf>) -> Self {
        Self {
            migrations_dir: migrations_dir.into(),
            dry_run: false,
        }
    }

    /// Renders migrations without writing files or the snapshot.
    #[must_use]
    pub fn dry_run(mut self) -> Self {
        self.dry_run = true;
        self
    }

    /// Returns the migrations directory.
    #[must_use]
    pub fn migrations_dir(&self) -> &Path {
        &self.migrations_dir
    }

    /// Processes every model with auto-migrations enabled, in order.
    ///
    /// Per-model failures are logged and recorded in the report; only
    /// the store-level setup done by the caller can abort a run.
    pub fn run<M: ModelSource>(&self, models: &[M], store: &mut SnapshotStore) -> RunReport {
        let mut report = RunReport::default();

        for model in models {
            let table = model.options().table_name.clone();
            if !model.options().auto_migrations {
                debug!("{table}: auto-migrations disabled, skipping");
                continue;
            }

            let outcome = match self.process_model(model, store) {
                Ok(outcome) => outcome,
                Err(err) => {
                    error!("{table}: {err}");
                    ModelOutcome::Failed(err)
                }
            };
            match &outcome {
                ModelOutcome::Created(files) => {
                    for file in files {
                        info!("{table}: created {}", file.display());
                    }
                }
                ModelOutcome::Planned(files) => {
                    for file in files {
                        info!("{table}: would create {}", file.display());
                    }
                }
                ModelOutcome::NoChange => info!("{table}: no structural changes"),
                ModelOutcome::Failed(_) => {}
            }
            report.outcomes.push((table, outcome));
        }

        report
    }

    /// Extract, diff, render, write, persist — for one model.
    fn process_model<M: ModelSource>(
        &self,
        model: &M,
        store: &mut SnapshotStore,
    ) -> Result<ModelOutcome> {
        let table = &model.options().table_name;
        let current = extract_columns(model)?;
        let diff = diff_table(table, &current, store.table(table));

        if diff.is_no_change() {
            return Ok(ModelOutcome::NoChange);
        }

        // Render everything up front: a render failure must not leave
        // a partially written set of files behind.
        let stamp = Utc::now();
        let mut rendered = Vec::with_capacity(diff.descriptors.len());
        for descriptor in &diff.descriptors {
            let name = migration_filename(&stamp, &descriptor.label, table);
            rendered.push((self.migrations_dir.join(name), render_migration(descriptor)?));
        }

        if self.dry_run {
            return Ok(ModelOutcome::Planned(
                rendered.into_iter().map(|(path, _)| path).collect(),
            ));
        }

        fs::create_dir_all(&self.migrations_dir).map_err(|source| MigrateError::Persistence {
            path: self.migrations_dir.clone(),
            source,
        })?;

        let mut files = Vec::with_capacity(rendered.len());
        for (path, text) in rendered {
            fs::write(&path, text).map_err(|source| MigrateError::Persistence {
                path: path.clone(),
                source,
            })?;
            files.push(path);
        }

        // The snapshot only moves once this table's files are all on
        // disk, so a failure above leaves it untouched for this table.
        store.apply(table.clone(), diff.state);
        store.flush()?;

        Ok(ModelOutcome::Created(files))
    }
}
