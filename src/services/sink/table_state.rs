//! Create-once, append-after sink.
//!
//! The table state starts `Pending` when the configuration asks for the table
//! to be created, and `Exists` otherwise. The first non-empty batch written
//! while `Pending` goes through the create path; when that write succeeds the
//! state becomes `Exists` and never goes back. A failed create leaves the
//! state `Pending`, so the next batch retries creation.
//!
//! The decision and the transition happen under one mutex: at most one
//! writer attempts the create path at a time, and writers waiting behind it
//! observe the new state. Appends release the lock before touching the
//! database and may run concurrently.

use super::{GeometryLayout, SpatialDatabase, TableRef, WritePath};
use crate::config::ImportConfig;
use crate::models::Feature;
use crate::Result;
use std::sync::{Mutex, PoisonError};

/// Whether the target table is known to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableState {
    Pending,
    Exists,
}

impl TableState {
    #[must_use]
    pub fn from_create_flag(create_table: bool) -> Self {
        if create_table {
            TableState::Pending
        } else {
            TableState::Exists
        }
    }
}

/// Result of handing one batch to the sink.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { path: WritePath, rows: u64 },
    /// Empty batch: nothing written, state untouched.
    Skipped,
}

pub struct TableStateSink {
    create_target: TableRef,
    append_target: TableRef,
    layout: GeometryLayout,
    state: Mutex<TableState>,
}

impl TableStateSink {
    #[must_use]
    pub fn new(
        create_target: TableRef,
        append_target: TableRef,
        layout: GeometryLayout,
        initial: TableState,
    ) -> Self {
        Self {
            create_target,
            append_target,
            layout,
            state: Mutex::new(initial),
        }
    }

    /// Derive targets and initial state from the import configuration.
    ///
    /// The create path addresses `schema.table`; the append path addresses
    /// `table` alone.
    #[must_use]
    pub fn from_config(config: &ImportConfig) -> Self {
        Self::new(
            TableRef::qualified(&config.schema, &config.table),
            TableRef::unqualified(&config.table),
            GeometryLayout {
                column: config.geometry_column.clone(),
                srid: config.srid,
            },
            TableState::from_create_flag(config.create_table),
        )
    }

    #[must_use]
    pub fn state(&self) -> TableState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Write one batch through the create or append path.
    pub fn write(&self, db: &dyn SpatialDatabase, batch: &[Feature]) -> Result<WriteOutcome> {
        if batch.is_empty() {
            return Ok(WriteOutcome::Skipped);
        }

        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == TableState::Pending {
            let rows = db.create_table_and_insert(&self.create_target, &self.layout, batch, false)?;
            *state = TableState::Exists;
            log::info!("Created table {} with {rows} rows", self.create_target);
            return Ok(WriteOutcome::Written {
                path: WritePath::Create,
                rows,
            });
        }
        drop(state);

        let rows = db.insert_into_existing_table(&self.append_target, &self.layout, batch)?;
        log::debug!("Appended {rows} rows to {}", self.append_target);
        Ok(WriteOutcome::Written {
            path: WritePath::Append,
            rows,
        })
    }
}
