//! Vector file readers turning one file into a batch of features.

use crate::Result;
use crate::models::Feature;
use std::path::Path;

/// Trait implemented by readers that decode one vector file into features.
pub trait FeatureReader: Send + Sync {
    /// File extension (without the dot) this reader handles.
    fn extension(&self) -> &str;

    /// Read every feature stored in `path`.
    fn read_file(&self, path: &Path) -> Result<Vec<Feature>>;
}

pub mod shp;

pub use shp::ShapefileReader;
