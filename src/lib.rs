//! Shapefile to PostGIS Batch Import Library
//!
//! This library walks a directory of per-unit result folders, reads the vector
//! files found in each one, stamps every feature with its unit name and run
//! identifier, and persists the features into a single PostGIS table. The
//! table is created by the first successful write and appended to afterwards.

pub mod cli;
pub mod config;
pub mod models;
pub mod services;

pub use config::ImportConfig;
pub use models::{
    AttributeKind, AttributeValue, Feature, ImportReport, ProgressPhase, ProgressSnapshot, Unit, UnitFailure,
};
pub use services::run_token::RunToken;

use services::reader::FeatureReader;
use services::sink::SpatialDatabase;
use services::sink::table_state::TableStateSink;
use std::result;
use std::sync::Arc;

/// Custom error type for the library
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Invalid run identifier '{0}': expected YYMMDD, e.g. 170518")]
    InvalidRunToken(String),
    #[error("Cannot load config {path}: {message}")]
    Config { path: String, message: String },
    #[error("Missing config key: {0}")]
    MissingConfigKey(&'static str),
    #[error("Invalid value for config key {key}: '{value}'")]
    InvalidConfigValue { key: &'static str, value: String },
    #[error("Cannot read {path}: {message}")]
    Read { path: String, message: String },
    #[error("Database error: {0}")]
    Database(String),
    #[error("Partial failure: {completed} completed, {failed} failed")]
    PartialFailure { completed: usize, failed: usize },
    #[error("System error: {0}")]
    System(String),
}

impl Error {
    /// Process exit code reported by the CLI for this error.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Error::InvalidInput(_) | Error::InvalidRunToken(_) => 2,
            Error::PartialFailure { .. } => 3,
            _ => 4,
        }
    }
}

pub type Result<T> = result::Result<T, Error>;

/// Callback receiving progress snapshots while units are imported.
pub type ProgressNotifier = Arc<dyn Fn(&ProgressSnapshot) + Send + Sync>;

/// Default number of processed units between two progress snapshots.
pub const DEFAULT_PROGRESS_EVERY: u64 = 300;

/// Options for an import run
#[derive(Clone)]
pub struct ImportOptions {
    /// Number of units processed concurrently; 1 keeps enumeration order.
    pub jobs: usize,
    pub progress_every: u64,
    pub progress_notifier: Option<ProgressNotifier>,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            jobs: 1,
            progress_every: DEFAULT_PROGRESS_EVERY,
            progress_notifier: None,
        }
    }
}

impl std::fmt::Debug for ImportOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportOptions")
            .field("jobs", &self.jobs)
            .field("progress_every", &self.progress_every)
            .field("progress_notifier", &self.progress_notifier.is_some())
            .finish()
    }
}

/// Import every unit found under the configured shapes directory.
///
/// # Arguments
/// * `config` - Target descriptor (database coordinates and source root)
/// * `run` - Validated run identifier stamped on every feature
/// * `opts` - Concurrency and progress options
/// * `reader` - Vector file reader
/// * `db` - Spatial database receiving the features
///
/// # Returns
/// An [`ImportReport`] describing succeeded and failed units. Per-unit
/// failures do not turn into an `Err`; only an unreadable source root does.
pub fn run_import(
    config: &ImportConfig,
    run: &RunToken,
    opts: &ImportOptions,
    reader: &dyn FeatureReader,
    db: &dyn SpatialDatabase,
) -> Result<ImportReport> {
    let units = services::discover::list_unit_dirs(&config.shapes_dir)?;
    log::info!(
        "Importing {} units from {} (run {run})",
        units.len(),
        config.shapes_dir.display()
    );

    let sink = TableStateSink::from_config(config);
    services::import::import_units(&units, reader, &sink, db, run, opts)
}
