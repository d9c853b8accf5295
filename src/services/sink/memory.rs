//! In-memory database recording every write, used for dry runs and tests.

use super::{GeometryLayout, SpatialDatabase, TableRef, WritePath};
use crate::models::Feature;
use crate::services::enrich::DIRECTORY_ATTRIBUTE;
use crate::{Error, Result};
use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};

/// One call received by the memory database.
#[derive(Debug, Clone)]
pub struct RecordedWrite {
    pub path: WritePath,
    pub table: TableRef,
    pub row_count: u64,
    /// Copy of the batch; empty when feature retention is disabled.
    pub features: Vec<Feature>,
}

#[derive(Default)]
struct MemoryState {
    writes: Vec<RecordedWrite>,
    failing_creates: usize,
    failing_units: HashSet<String>,
}

#[derive(Default)]
pub struct MemoryDatabase {
    state: Mutex<MemoryState>,
    retain_features: bool,
}

impl MemoryDatabase {
    /// Database keeping a copy of every batch it receives.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            retain_features: true,
        }
    }

    /// Database recording only paths and row counts.
    #[must_use]
    pub fn counting() -> Self {
        Self::default()
    }

    /// Fail the next `count` create-path calls.
    pub fn fail_next_creates(&self, count: usize) {
        self.lock().failing_creates = count;
    }

    /// Fail every write whose batch carries `directory = unit`.
    pub fn fail_unit(&self, unit: &str) {
        self.lock().failing_units.insert(unit.to_string());
    }

    #[must_use]
    pub fn writes(&self) -> Vec<RecordedWrite> {
        self.lock().writes.clone()
    }

    #[must_use]
    pub fn count(&self, path: WritePath) -> usize {
        self.lock().writes.iter().filter(|w| w.path == path).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn record(&self, path: WritePath, table: &TableRef, features: &[Feature]) -> Result<u64> {
        let mut state = self.lock();

        if let Some(unit) = features
            .iter()
            .filter_map(|f| f.attribute(DIRECTORY_ATTRIBUTE).and_then(|v| v.as_text()))
            .find(|unit| state.failing_units.contains(*unit))
        {
            return Err(Error::Database(format!(
                "rejected batch for unit {unit} on {table}"
            )));
        }

        if path == WritePath::Create && state.failing_creates > 0 {
            state.failing_creates -= 1;
            return Err(Error::Database(format!("cannot create table {table}")));
        }

        let row_count = features.len() as u64;
        state.writes.push(RecordedWrite {
            path,
            table: table.clone(),
            row_count,
            features: if self.retain_features {
                features.to_vec()
            } else {
                Vec::new()
            },
        });
        Ok(row_count)
    }
}

impl SpatialDatabase for MemoryDatabase {
    fn create_table_and_insert(
        &self,
        table: &TableRef,
        _layout: &GeometryLayout,
        features: &[Feature],
        _replace_existing: bool,
    ) -> Result<u64> {
        self.record(WritePath::Create, table, features)
    }

    fn insert_into_existing_table(
        &self,
        table: &TableRef,
        _layout: &GeometryLayout,
        features: &[Feature],
    ) -> Result<u64> {
        self.record(WritePath::Append, table, features)
    }
}
