//! Data models for features, units, progress snapshots and import reports

use chrono::NaiveDate;
use geo_types::Geometry;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Declared type of an attribute column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Text,
    Integer,
    Number,
    Boolean,
    Date,
}

/// Typed attribute value attached to a feature
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Integer(i64),
    Number(f64),
    Boolean(bool),
    Date(NaiveDate),
    /// Blank value in a column whose type is declared by the source.
    Missing(AttributeKind),
    Null,
}

impl AttributeValue {
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            AttributeValue::Text(s) => Some(s),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null | AttributeValue::Missing(_))
    }

    /// Type carried by the value, declared or observed; `None` for an untyped null.
    #[must_use]
    pub fn kind(&self) -> Option<AttributeKind> {
        match self {
            AttributeValue::Text(_) => Some(AttributeKind::Text),
            AttributeValue::Integer(_) => Some(AttributeKind::Integer),
            AttributeValue::Number(_) => Some(AttributeKind::Number),
            AttributeValue::Boolean(_) => Some(AttributeKind::Boolean),
            AttributeValue::Date(_) => Some(AttributeKind::Date),
            AttributeValue::Missing(kind) => Some(*kind),
            AttributeValue::Null => None,
        }
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Text(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Text(value)
    }
}

/// A geometry plus its named attributes
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub attributes: BTreeMap<String, AttributeValue>,
}

impl Feature {
    #[must_use]
    pub fn new(geometry: Geometry<f64>) -> Self {
        Self {
            geometry,
            attributes: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_attribute(mut self, name: &str, value: impl Into<AttributeValue>) -> Self {
        self.set_attribute(name, value);
        self
    }

    /// Set an attribute, replacing any previous value under the same name.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<AttributeValue>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes.get(name)
    }
}

/// One subdirectory of the shapes root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub name: String,
    pub path: PathBuf,
}

/// Stage of the import a progress snapshot belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressPhase {
    Started,
    Running,
    Finished,
}

/// Progress event emitted while units are processed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressSnapshot {
    pub phase: ProgressPhase,
    pub processed_units: u64,
    pub total_units: u64,
    pub elapsed_ms: u64,
}

impl ProgressSnapshot {
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn elapsed_minutes(&self) -> f64 {
        self.elapsed_ms as f64 / 60_000.0
    }
}

/// A unit that could not be imported completely
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitFailure {
    pub unit: String,
    pub message: String,
}

/// Outcome of a whole import run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImportReport {
    pub units_total: usize,
    pub units_processed: usize,
    pub units_succeeded: usize,
    pub units_failed: usize,
    pub files_read: u64,
    pub records_written: u64,
    pub batches_created: u64,
    pub batches_appended: u64,
    /// Whether this run went through the create path.
    pub table_created: bool,
    pub failures: Vec<UnitFailure>,
    pub elapsed_ms: u64,
}

impl ImportReport {
    /// Turn recorded unit failures into an error.
    pub fn ensure_complete(&self) -> crate::Result<()> {
        if self.units_failed == 0 {
            Ok(())
        } else {
            Err(crate::Error::PartialFailure {
                completed: self.units_succeeded,
                failed: self.units_failed,
            })
        }
    }
}
