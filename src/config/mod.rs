//! Typed import configuration loaded from a Java-style properties file
//!
//! The file carries the database coordinates, the target table and the
//! directory holding the per-unit result folders:
//!
//! ```text
//! host=localhost
//! port=5432
//! db=simulations
//! schema=public
//! user=operator
//! password=secret
//! table=results
//! shapesDir=/data/results
//! createTable=true
//! ```
//!
//! Every key above is required. `srid` and `geometryColumn` are optional.
//! Values are taken literally: `$`, spaces and most backslashes need no
//! quoting. A backslash escapes the next character, as in `.properties` files.

use crate::{Error, Result};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

const DEFAULT_GEOMETRY_COLUMN: &str = "geom";

/// Target descriptor: where features go and whether the table pre-exists
#[derive(Clone, PartialEq, Eq)]
pub struct ImportConfig {
    pub host: String,
    pub database: String,
    pub schema: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub table: String,
    pub shapes_dir: PathBuf,
    /// When true the first write creates the table.
    pub create_table: bool,
    pub srid: i32,
    pub geometry_column: String,
}

impl std::fmt::Debug for ImportConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImportConfig")
            .field("host", &self.host)
            .field("database", &self.database)
            .field("schema", &self.schema)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"***")
            .field("table", &self.table)
            .field("shapes_dir", &self.shapes_dir)
            .field("create_table", &self.create_table)
            .field("srid", &self.srid)
            .field("geometry_column", &self.geometry_column)
            .finish()
    }
}

impl ImportConfig {
    /// Load the configuration file at `path`.
    ///
    /// The process environment is neither read nor modified.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let config_error = |message: String| Error::Config {
            path: path.display().to_string(),
            message,
        };

        let file = File::open(path).map_err(|e| config_error(e.to_string()))?;
        let values = java_properties::read(BufReader::new(file))
            .map_err(|e| config_error(e.to_string()))?;

        log::debug!("Loaded {} config keys from {}", values.len(), path.display());
        Self::from_values(&values)
    }

    /// Build the configuration from already-parsed key/value pairs.
    pub fn from_values(values: &HashMap<String, String>) -> Result<Self> {
        let required = |key: &'static str| -> Result<String> {
            values
                .get(key)
                .map(|v| v.trim().to_string())
                .ok_or(Error::MissingConfigKey(key))
        };
        let non_empty = |key: &'static str| -> Result<String> {
            let value = required(key)?;
            if value.is_empty() {
                return Err(Error::MissingConfigKey(key));
            }
            Ok(value)
        };

        let port_raw = non_empty("port")?;
        let port = port_raw
            .parse::<u16>()
            .map_err(|_| Error::InvalidConfigValue {
                key: "port",
                value: port_raw.clone(),
            })?;

        let srid = match values.get("srid").map(|v| v.trim()) {
            None | Some("") => 0,
            Some(raw) => raw.parse::<i32>().map_err(|_| Error::InvalidConfigValue {
                key: "srid",
                value: raw.to_string(),
            })?,
        };

        let geometry_column = values
            .get("geometryColumn")
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_GEOMETRY_COLUMN)
            .to_string();

        Ok(Self {
            host: non_empty("host")?,
            database: non_empty("db")?,
            schema: non_empty("schema")?,
            port,
            user: non_empty("user")?,
            // Password may legitimately be empty (trust/peer authentication).
            password: values
                .get("password")
                .cloned()
                .ok_or(Error::MissingConfigKey("password"))?,
            table: non_empty("table")?,
            shapes_dir: PathBuf::from(non_empty("shapesDir")?),
            create_table: required("createTable")? == "true",
            srid,
            geometry_column,
        })
    }
}
