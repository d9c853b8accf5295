//! PostGIS client writing feature batches through `sqlx`.
//!
//! The importer is synchronous; the client owns a small tokio runtime and
//! blocks on each operation. Every call runs in its own transaction, so a
//! failed create leaves no table behind and a failed append leaves no rows.

use super::{GeometryLayout, SpatialDatabase, TableRef, quote_ident};
use crate::config::ImportConfig;
use crate::models::{AttributeKind, AttributeValue, Feature};
use crate::{Error, Result};
use sqlx::postgres::{PgArguments, PgConnectOptions, PgPool, PgPoolOptions};
use sqlx::query::Query;
use sqlx::{Postgres, Transaction};
use std::collections::BTreeMap;
use tokio::runtime::Runtime;
use wkt::ToWkt;

const RUNTIME_WORKER_THREADS: usize = 2;

/// Column type inferred from attribute values.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Text,
    Integer,
    Number,
    Boolean,
    Date,
}

impl ColumnKind {
    fn of(value: &AttributeValue) -> Option<Self> {
        value.kind().map(|kind| match kind {
            AttributeKind::Text => ColumnKind::Text,
            AttributeKind::Integer => ColumnKind::Integer,
            AttributeKind::Number => ColumnKind::Number,
            AttributeKind::Boolean => ColumnKind::Boolean,
            AttributeKind::Date => ColumnKind::Date,
        })
    }

    /// Smallest kind able to hold values of both kinds.
    fn widen(self, other: Self) -> Self {
        match (self, other) {
            (a, b) if a == b => a,
            (ColumnKind::Integer, ColumnKind::Number) | (ColumnKind::Number, ColumnKind::Integer) => {
                ColumnKind::Number
            }
            _ => ColumnKind::Text,
        }
    }

    #[must_use]
    pub fn sql_type(self) -> &'static str {
        match self {
            ColumnKind::Text => "TEXT",
            ColumnKind::Integer => "BIGINT",
            ColumnKind::Number => "DOUBLE PRECISION",
            ColumnKind::Boolean => "BOOLEAN",
            ColumnKind::Date => "DATE",
        }
    }
}

/// Infer one column per attribute name found in the batch.
///
/// Blank values still vote with their declared type. Columns holding only
/// untyped nulls become `TEXT`.
#[must_use]
pub fn infer_columns(features: &[Feature]) -> BTreeMap<String, ColumnKind> {
    let mut kinds: BTreeMap<String, Option<ColumnKind>> = BTreeMap::new();

    for feature in features {
        for (name, value) in &feature.attributes {
            let slot = kinds.entry(name.clone()).or_insert(None);
            if let Some(kind) = ColumnKind::of(value) {
                *slot = Some(slot.map_or(kind, |current| current.widen(kind)));
            }
        }
    }

    kinds
        .into_iter()
        .map(|(name, kind)| (name, kind.unwrap_or(ColumnKind::Text)))
        .collect()
}

/// `CREATE TABLE` statement for the batch layout.
#[must_use]
pub fn create_table_sql(
    table: &TableRef,
    layout: &GeometryLayout,
    columns: &BTreeMap<String, ColumnKind>,
) -> String {
    let geometry_type = if layout.srid > 0 {
        format!("geometry(Geometry, {})", layout.srid)
    } else {
        "geometry".to_string()
    };

    let mut definitions = vec![
        "\"gid\" SERIAL PRIMARY KEY".to_string(),
        format!("{} {geometry_type}", quote_ident(&layout.column)),
    ];
    definitions.extend(
        columns
            .iter()
            .filter(|(name, _)| *name != "gid" && **name != layout.column)
            .map(|(name, kind)| format!("{} {}", quote_ident(name), kind.sql_type())),
    );

    format!("CREATE TABLE {} ({})", table.to_sql(), definitions.join(", "))
}

/// `INSERT` statement for one feature; null attributes become SQL `NULL`
/// literals so the column type decides their type.
#[must_use]
pub fn insert_sql(table: &TableRef, layout: &GeometryLayout, feature: &Feature) -> String {
    let mut columns = vec![quote_ident(&layout.column)];
    let mut values = vec![format!("ST_GeomFromText($1, {})", layout.srid)];
    let mut placeholder = 1;

    for (name, value) in insertable_attributes(layout, feature) {
        columns.push(quote_ident(name));
        if value.is_null() {
            values.push("NULL".to_string());
        } else {
            placeholder += 1;
            values.push(format!("${placeholder}"));
        }
    }

    format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.to_sql(),
        columns.join(", "),
        values.join(", ")
    )
}

fn insertable_attributes<'a>(
    layout: &'a GeometryLayout,
    feature: &'a Feature,
) -> impl Iterator<Item = (&'a String, &'a AttributeValue)> {
    feature
        .attributes
        .iter()
        .filter(move |(name, _)| *name != "gid" && **name != layout.column)
}

fn bind_value<'q>(
    query: Query<'q, Postgres, PgArguments>,
    value: &AttributeValue,
) -> Query<'q, Postgres, PgArguments> {
    match value {
        AttributeValue::Text(s) => query.bind(s.clone()),
        AttributeValue::Integer(n) => query.bind(*n),
        AttributeValue::Number(n) => query.bind(*n),
        AttributeValue::Boolean(b) => query.bind(*b),
        AttributeValue::Date(d) => query.bind(*d),
        AttributeValue::Missing(_) | AttributeValue::Null => query,
    }
}

fn db_error(err: sqlx::Error) -> Error {
    Error::Database(err.to_string())
}

pub struct PostgisClient {
    runtime: Runtime,
    pool: PgPool,
}

impl PostgisClient {
    /// Build a lazily connecting client for the configured database.
    ///
    /// No connection is opened until the first write, so connection problems
    /// surface as per-unit database errors.
    pub fn connect(config: &ImportConfig, max_connections: u32) -> Result<Self> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(RUNTIME_WORKER_THREADS)
            .enable_all()
            .build()?;

        let options = PgConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .database(&config.database)
            .username(&config.user)
            .password(&config.password);

        let pool = {
            let _guard = runtime.enter();
            PgPoolOptions::new()
                .max_connections(max_connections.max(1))
                .connect_lazy_with(options)
        };

        log::debug!(
            "PostGIS client for {}@{}:{}/{}",
            config.user,
            config.host,
            config.port,
            config.database
        );

        Ok(Self { runtime, pool })
    }

    async fn insert_rows(
        tx: &mut Transaction<'_, Postgres>,
        table: &TableRef,
        layout: &GeometryLayout,
        features: &[Feature],
    ) -> Result<u64> {
        let mut rows = 0u64;
        for feature in features {
            let sql = insert_sql(table, layout, feature);
            let mut query = sqlx::query(&sql).bind(feature.geometry.wkt_string());
            for (_, value) in insertable_attributes(layout, feature) {
                query = bind_value(query, value);
            }
            rows += query.execute(&mut **tx).await.map_err(db_error)?.rows_affected();
        }
        Ok(rows)
    }
}

impl SpatialDatabase for PostgisClient {
    fn create_table_and_insert(
        &self,
        table: &TableRef,
        layout: &GeometryLayout,
        features: &[Feature],
        replace_existing: bool,
    ) -> Result<u64> {
        let columns = infer_columns(features);
        let create_sql = create_table_sql(table, layout, &columns);
        log::debug!("{create_sql}");

        self.runtime.block_on(async {
            let mut tx = self.pool.begin().await.map_err(db_error)?;

            if replace_existing {
                let drop_sql = format!("DROP TABLE IF EXISTS {}", table.to_sql());
                sqlx::query(&drop_sql)
                    .execute(&mut *tx)
                    .await
                    .map_err(db_error)?;
            }

            sqlx::query(&create_sql)
                .execute(&mut *tx)
                .await
                .map_err(db_error)?;

            let rows = Self::insert_rows(&mut tx, table, layout, features).await?;
            tx.commit().await.map_err(db_error)?;
            Ok::<u64, Error>(rows)
        })
    }

    fn insert_into_existing_table(
        &self,
        table: &TableRef,
        layout: &GeometryLayout,
        features: &[Feature],
    ) -> Result<u64> {
        self.runtime.block_on(async {
            let mut tx = self.pool.begin().await.map_err(db_error)?;
            let rows = Self::insert_rows(&mut tx, table, layout, features).await?;
            tx.commit().await.map_err(db_error)?;
            Ok::<u64, Error>(rows)
        })
    }
}
