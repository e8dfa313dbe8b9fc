//! automigrate CLI
//!
//! Generates reversible migration files by diffing declared models
//! against the persisted schema snapshot.

use std::path::PathBuf;

use clap::Parser;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use automigrate::generate::MigrationGenerator;
use automigrate::model::load_models;
use automigrate::store::SnapshotStore;

/// Migration generation for declarative models.
#[derive(Parser)]
#[command(name = "automigrate")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Model declarations file (JSON array of models).
    #[arg(short, long, env = "AUTOMIGRATE_MODELS", default_value = "models.json")]
    models: PathBuf,

    /// Directory migration files are written to.
    #[arg(short = 'd', long, default_value = "migrations")]
    migrations_dir: PathBuf,

    /// Schema snapshot file.
    #[arg(short, long, default_value = "migrations/_snapshot.json")]
    snapshot: PathBuf,

    /// Render migrations without writing files or the snapshot.
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Failures before the per-model loop are the only fatal ones.
    let models = load_models(&cli.models)?;
    let mut store = SnapshotStore::open(&cli.snapshot)?;

    let mut generator = MigrationGenerator::new(&cli.migrations_dir);
    if cli.dry_run {
        generator = generator.dry_run();
    }

    let report = generator.run(&models, &mut store);

    info!(
        "Processed {} model(s): {} with new migrations",
        report.outcomes.len(),
        report.created()
    );
    if report.has_failures() {
        info!("Some models failed; see errors above.");
    }

    Ok(())
}
