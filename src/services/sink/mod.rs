//! Spatial database sinks receiving enriched feature batches.

use crate::Result;
use crate::models::Feature;

/// Reference to the target table, optionally schema-qualified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub table: String,
}

impl TableRef {
    #[must_use]
    pub fn qualified(schema: &str, table: &str) -> Self {
        Self {
            schema: Some(schema.to_string()),
            table: table.to_string(),
        }
    }

    /// Table name resolved through the connection's `search_path`.
    #[must_use]
    pub fn unqualified(table: &str) -> Self {
        Self {
            schema: None,
            table: table.to_string(),
        }
    }

    /// SQL form with every identifier quoted.
    #[must_use]
    pub fn to_sql(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.table)),
            None => quote_ident(&self.table),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{schema}.{}", self.table),
            None => f.write_str(&self.table),
        }
    }
}

/// Geometry column name and spatial reference of the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryLayout {
    pub column: String,
    pub srid: i32,
}

/// Quote an SQL identifier, doubling embedded quotes.
#[must_use]
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// The two mutually exclusive write operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WritePath {
    Create,
    Append,
}

/// Trait implemented by databases able to store feature batches.
pub trait SpatialDatabase: Send + Sync {
    /// Create `table` from the batch's attribute layout and insert the batch.
    ///
    /// Either the table exists with every row afterwards, or it does not
    /// exist at all.
    fn create_table_and_insert(
        &self,
        table: &TableRef,
        layout: &GeometryLayout,
        features: &[Feature],
        replace_existing: bool,
    ) -> Result<u64>;

    /// Append the batch to an existing table.
    fn insert_into_existing_table(
        &self,
        table: &TableRef,
        layout: &GeometryLayout,
        features: &[Feature],
    ) -> Result<u64>;
}

pub mod memory;
pub mod postgis;
pub mod table_state;
