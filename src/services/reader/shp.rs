//! ESRI shapefile reader (`.shp` geometry with its `.dbf` attribute table).

use super::FeatureReader;
use crate::models::{AttributeKind, AttributeValue, Feature};
use crate::{Error, Result};
use chrono::NaiveDate;
use geo_types::Geometry;
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Reader, Shape};
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct ShapefileReader;

impl ShapefileReader {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl FeatureReader for ShapefileReader {
    fn extension(&self) -> &str {
        "shp"
    }

    fn read_file(&self, path: &Path) -> Result<Vec<Feature>> {
        let read_error = |message: String| Error::Read {
            path: path.to_string_lossy().to_string(),
            message,
        };

        let mut reader = Reader::from_path(path).map_err(|e| read_error(e.to_string()))?;

        let mut features = Vec::new();
        let mut null_shapes = 0usize;
        for item in reader.iter_shapes_and_records() {
            let (shape, record) = item.map_err(|e| read_error(e.to_string()))?;
            match feature_from(shape, record).map_err(read_error)? {
                Some(feature) => features.push(feature),
                None => null_shapes += 1,
            }
        }

        if null_shapes > 0 {
            log::debug!("{}: skipped {null_shapes} null shapes", path.display());
        }
        log::trace!("{}: {} features", path.display(), features.len());

        Ok(features)
    }
}

/// Build a feature from one shape and its dBASE record; `None` for a null shape.
fn feature_from(shape: Shape, record: Record) -> std::result::Result<Option<Feature>, String> {
    if matches!(shape, Shape::NullShape) {
        return Ok(None);
    }

    let geometry = Geometry::<f64>::try_from(shape).map_err(|e| e.to_string())?;

    let fields: HashMap<String, FieldValue> = record.into();
    let mut feature = Feature::new(geometry);
    for (name, value) in fields {
        feature.set_attribute(&name, convert_field(value));
    }
    Ok(Some(feature))
}

/// Blank typed fields keep their declared type so column inference can use it.
fn convert_field(value: FieldValue) -> AttributeValue {
    match value {
        FieldValue::Character(Some(s)) => AttributeValue::Text(s.trim_end().to_string()),
        FieldValue::Memo(s) => AttributeValue::Text(s),
        FieldValue::Numeric(Some(n)) => AttributeValue::Number(n),
        FieldValue::Float(Some(n)) => AttributeValue::Number(f64::from(n)),
        FieldValue::Double(n) | FieldValue::Currency(n) => AttributeValue::Number(n),
        FieldValue::Integer(n) => AttributeValue::Integer(i64::from(n)),
        FieldValue::Logical(Some(b)) => AttributeValue::Boolean(b),
        FieldValue::Date(Some(d)) => i32::try_from(d.year())
            .ok()
            .and_then(|year| NaiveDate::from_ymd_opt(year, d.month(), d.day()))
            .map_or(AttributeValue::Missing(AttributeKind::Date), AttributeValue::Date),
        FieldValue::Character(None) => AttributeValue::Missing(AttributeKind::Text),
        FieldValue::Numeric(None) | FieldValue::Float(None) => {
            AttributeValue::Missing(AttributeKind::Number)
        }
        FieldValue::Logical(None) => AttributeValue::Missing(AttributeKind::Boolean),
        FieldValue::Date(None) => AttributeValue::Missing(AttributeKind::Date),
        other => AttributeValue::Text(format!("{other:?}")),
    }
}
