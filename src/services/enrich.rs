//! Provenance stamping for features read from a unit

use crate::RunToken;
use crate::models::{AttributeValue, Feature};

/// Attribute carrying the unit (directory) name.
pub const DIRECTORY_ATTRIBUTE: &str = "directory";
/// Attribute carrying the run identifier.
pub const RUN_ATTRIBUTE: &str = "run";

/// Set `directory` and `run` on every feature, overwriting previous values.
///
/// Geometry and other attributes are left untouched.
pub fn enrich(features: &mut [Feature], unit_id: &str, run: &RunToken) {
    for feature in features.iter_mut() {
        feature.set_attribute(DIRECTORY_ATTRIBUTE, AttributeValue::Text(unit_id.to_string()));
        feature.set_attribute(RUN_ATTRIBUTE, AttributeValue::Text(run.as_str().to_string()));
    }
}
