//! Test fixtures for deterministic testing

#![allow(dead_code)]

use geo_types::{Geometry, Point};
use shp2pgis::services::reader::FeatureReader;
use shp2pgis::{AttributeValue, Error, Feature, ImportConfig, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Reader for plain-text stand-ins of vector files.
///
/// Each non-empty line `x y` becomes a point feature carrying a `line`
/// attribute. A line reading `FAIL` makes the whole file unreadable.
pub struct PointListReader;

impl FeatureReader for PointListReader {
    fn extension(&self) -> &str {
        "shp"
    }

    fn read_file(&self, path: &Path) -> Result<Vec<Feature>> {
        let content = fs::read_to_string(path)?;
        let mut features = Vec::new();

        for (idx, line) in content.lines().map(str::trim).filter(|l| !l.is_empty()).enumerate() {
            if line == "FAIL" {
                return Err(Error::Read {
                    path: path.display().to_string(),
                    message: "corrupt geometry".to_string(),
                });
            }

            let coords: Vec<f64> = line
                .split_whitespace()
                .map(|c| c.parse().expect("fixture coordinate"))
                .collect();
            let feature = Feature::new(Geometry::Point(Point::new(coords[0], coords[1])))
                .with_attribute("line", AttributeValue::Integer(idx as i64));
            features.push(feature);
        }

        Ok(features)
    }
}

/// Create a unit directory under `root` holding the given `(file, content)` pairs.
pub fn write_unit(root: &Path, name: &str, files: &[(&str, &str)]) -> PathBuf {
    let unit_dir = root.join(name);
    fs::create_dir_all(&unit_dir).unwrap();
    for (file, content) in files {
        fs::write(unit_dir.join(file), content).unwrap();
    }
    unit_dir
}

/// Units `A` (one file, two geometries) and `B` (no vector files).
pub fn create_ab_fixture(root: &Path) {
    write_unit(root, "A", &[("parcels.shp", "0 0\n1 1\n")]);
    write_unit(root, "B", &[("notes.txt", "nothing to import")]);
}

pub fn test_config(shapes_dir: &Path, create_table: bool) -> ImportConfig {
    ImportConfig {
        host: "localhost".to_string(),
        database: "simulations".to_string(),
        schema: "public".to_string(),
        port: 5432,
        user: "operator".to_string(),
        password: "secret".to_string(),
        table: "results".to_string(),
        shapes_dir: shapes_dir.to_path_buf(),
        create_table,
        srid: 0,
        geometry_column: "geom".to_string(),
    }
}

/// Write a credentials file pointing at `shapes_dir`.
pub fn write_config_file(dir: &Path, shapes_dir: &Path, create_table: bool) -> PathBuf {
    let path = dir.join("creds.conf");
    let content = format!(
        "# import target\nhost=localhost\nport=5432\ndb=simulations\nschema=public\nuser=operator\npassword=secret\ntable=results\nshapesDir={}\ncreateTable={create_table}\n",
        shapes_dir.display()
    );
    fs::write(&path, content).unwrap();
    path
}

pub fn text_attr<'a>(feature: &'a Feature, name: &str) -> Option<&'a str> {
    feature.attribute(name).and_then(AttributeValue::as_text)
}
