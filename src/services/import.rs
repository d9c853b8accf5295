//! Import driver: discovery → read → enrich → write, one unit at a time or on
//! a rayon pool, with per-unit failure isolation.

use super::discover::list_vector_files;
use super::enrich::enrich;
use super::progress::ProgressReporter;
use super::reader::FeatureReader;
use super::sink::table_state::{TableState, TableStateSink, WriteOutcome};
use super::sink::{SpatialDatabase, WritePath};
use crate::models::{ImportReport, Unit, UnitFailure};
use crate::{Error, ImportOptions, Result, RunToken};
use rayon::prelude::*;

/// Counters gathered while importing one unit.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UnitStats {
    pub files: u64,
    pub records: u64,
    pub batches_created: u64,
    pub batches_appended: u64,
}

/// Outcome of one unit: what was written, and the error that stopped it.
#[derive(Debug)]
pub struct UnitOutcome {
    pub unit: String,
    pub stats: UnitStats,
    pub error: Option<Error>,
}

/// Import every file of one unit.
///
/// Each file becomes one batch. The first read or write error stops the unit;
/// batches written before it stay counted in the returned stats.
pub fn import_unit(
    unit: &Unit,
    reader: &dyn FeatureReader,
    sink: &TableStateSink,
    db: &dyn SpatialDatabase,
    run: &RunToken,
) -> UnitOutcome {
    let mut stats = UnitStats::default();
    let error = import_unit_files(unit, reader, sink, db, run, &mut stats).err();

    UnitOutcome {
        unit: unit.name.clone(),
        stats,
        error,
    }
}

fn import_unit_files(
    unit: &Unit,
    reader: &dyn FeatureReader,
    sink: &TableStateSink,
    db: &dyn SpatialDatabase,
    run: &RunToken,
    stats: &mut UnitStats,
) -> Result<()> {
    let files = list_vector_files(&unit.path, reader.extension())?;
    if files.is_empty() {
        log::debug!("Unit {}: no .{} files", unit.name, reader.extension());
        return Ok(());
    }

    for file in &files {
        let mut features = reader.read_file(file)?;
        stats.files += 1;

        enrich(&mut features, &unit.name, run);

        match sink.write(db, &features)? {
            WriteOutcome::Written { path, rows } => {
                stats.records += rows;
                match path {
                    WritePath::Create => stats.batches_created += 1,
                    WritePath::Append => stats.batches_appended += 1,
                }
                log::trace!("{} -> {rows} rows ({path:?})", file.display());
            }
            WriteOutcome::Skipped => {
                log::debug!("{}: no features", file.display());
            }
        }
    }

    Ok(())
}

/// Import `units` and build the run report.
///
/// With `opts.jobs <= 1` units are processed sequentially in the given order.
pub fn import_units(
    units: &[Unit],
    reader: &dyn FeatureReader,
    sink: &TableStateSink,
    db: &dyn SpatialDatabase,
    run: &RunToken,
    opts: &ImportOptions,
) -> Result<ImportReport> {
    let initial_state = sink.state();
    let progress = ProgressReporter::new(
        units.len() as u64,
        opts.progress_every,
        opts.progress_notifier.clone(),
    );
    progress.start();

    let process = |unit: &Unit| {
        let outcome = import_unit(unit, reader, sink, db, run);
        if let Some(err) = &outcome.error {
            log::warn!("Skipping unit {}: {err}", outcome.unit);
        }
        progress.unit_done();
        outcome
    };

    let outcomes: Vec<UnitOutcome> = if opts.jobs <= 1 {
        units.iter().map(process).collect()
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(opts.jobs)
            .build()
            .map_err(|e| Error::System(e.to_string()))?;
        pool.install(|| units.par_iter().map(process).collect())
    };

    let finished = progress.finish();

    let mut report = ImportReport {
        units_total: units.len(),
        table_created: initial_state == TableState::Pending && sink.state() == TableState::Exists,
        elapsed_ms: finished.elapsed_ms,
        ..ImportReport::default()
    };

    for outcome in outcomes {
        report.units_processed += 1;
        report.files_read += outcome.stats.files;
        report.records_written += outcome.stats.records;
        report.batches_created += outcome.stats.batches_created;
        report.batches_appended += outcome.stats.batches_appended;

        match outcome.error {
            None => report.units_succeeded += 1,
            Some(err) => {
                report.units_failed += 1;
                report.failures.push(UnitFailure {
                    unit: outcome.unit,
                    message: err.to_string(),
                });
            }
        }
    }

    log::info!(
        "Imported {} records from {} files: {} units ok, {} failed",
        report.records_written,
        report.files_read,
        report.units_succeeded,
        report.units_failed
    );

    Ok(report)
}
