//! Warehouse schema introspection.
//!
//! Reads table/column/type facts from the warehouse's
//! `information_schema.columns` and groups them into a [`Catalog`] keyed
//! `"{schema}.{table}"`.
//!
//! # Example
//!
//! ```ignore
//! use tundra::config::WarehouseConfig;
//! use tundra::introspect::{SchemaIntrospector, WorkerConnector};
//!
//! let config = WarehouseConfig::from_env()?;
//! let introspector = SchemaIntrospector::new(WorkerConnector::new("./tundra-worker"), config);
//! let catalog = introspector.introspect_default().await?;
//! ```

mod warehouse;
mod worker_warehouse;

use std::time::Instant;

use tracing::{error, info, warn};

use crate::catalog::{Catalog, ColumnDescriptor, TableEntry};
use crate::config::WarehouseConfig;

pub use warehouse::{RowSet, WarehouseConnector, WarehouseSession};
pub use worker_warehouse::{WorkerConnector, WorkerSession};

/// Errors raised while introspecting the warehouse.
#[derive(Debug, thiserror::Error)]
pub enum IntrospectionError {
    /// Authentication or network setup failed.
    #[error("warehouse connection failed: {0}")]
    Connection(String),

    /// The catalog query failed or returned an unexpected shape.
    #[error("catalog query failed: {0}")]
    Query(String),
}

/// Result columns the catalog query selects, in order.
const CATALOG_COLUMNS: [&str; 4] = ["table_schema", "table_name", "column_name", "data_type"];

/// Builds the `information_schema.columns` query for one schema.
///
/// When `database` is non-empty the view is qualified with it. Plain
/// identifiers stay unquoted so the warehouse resolves them
/// case-insensitively; anything else is quoted verbatim.
pub fn catalog_query(database: &str, schema: &str) -> String {
    let source = if database.is_empty() {
        "information_schema.columns".to_string()
    } else if is_plain_identifier(database) {
        format!("{}.information_schema.columns", database)
    } else {
        format!(
            "\"{}\".information_schema.columns",
            database.replace('"', "\"\"")
        )
    };

    format!(
        "SELECT {} FROM {} WHERE table_schema = '{}' \
         ORDER BY table_schema, table_name, ordinal_position",
        CATALOG_COLUMNS.join(", "),
        source,
        schema.replace('\'', "''")
    )
}

/// Unquoted identifier: letter or `_` first, then letters, digits, `_` or `$`.
fn is_plain_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Reads a warehouse catalog through a [`WarehouseConnector`].
pub struct SchemaIntrospector<C> {
    connector: C,
    config: WarehouseConfig,
}

impl<C: WarehouseConnector> SchemaIntrospector<C> {
    pub fn new(connector: C, config: WarehouseConfig) -> Self {
        Self { connector, config }
    }

    pub fn config(&self) -> &WarehouseConfig {
        &self.config
    }

    /// Introspect the schema named in the connection config.
    pub async fn introspect_default(&self) -> Result<Catalog, IntrospectionError> {
        self.introspect(&self.config.schema).await
    }

    /// Introspect `schema`.
    ///
    /// A session is opened for this call only and closed before returning,
    /// whether or not the query succeeded.
    pub async fn introspect(&self, schema: &str) -> Result<Catalog, IntrospectionError> {
        info!(schema, database = %self.config.database, "fetching warehouse metadata");
        let started = Instant::now();

        let mut session = self.connector.connect(&self.config).await.map_err(|e| {
            error!(error = %e, "failed to connect to warehouse");
            e
        })?;

        let result = session
            .execute(&catalog_query(&self.config.database, schema))
            .await;

        if let Err(e) = session.close().await {
            warn!(error = %e, "failed to close warehouse session");
        }

        let rows = result.map_err(|e| {
            error!(error = %e, "failed to retrieve warehouse metadata");
            e
        })?;
        info!(rows = rows.len(), "retrieved schema metadata rows");

        let catalog = catalog_from_rows(&rows)?;
        info!(
            tables = catalog.len(),
            columns = catalog.column_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "warehouse metadata loaded"
        );
        Ok(catalog)
    }
}

/// Group catalog query rows into tables keyed `"{schema}.{table}"`.
///
/// Columns are appended in row order. Rows are not deduplicated; the catalog
/// view yields one row per column.
pub fn catalog_from_rows(rows: &RowSet) -> Result<Catalog, IntrospectionError> {
    let mut indices = [0usize; 4];
    for (slot, name) in indices.iter_mut().zip(CATALOG_COLUMNS) {
        *slot = rows.column_index(name).ok_or_else(|| {
            IntrospectionError::Query(format!("catalog result is missing column '{}'", name))
        })?;
    }
    let [schema_idx, table_idx, column_idx, type_idx] = indices;

    let mut catalog = Catalog::new();
    for (row_no, row) in rows.rows.iter().enumerate() {
        let field = |idx: usize| -> Result<String, IntrospectionError> {
            row.get(idx).map(value_to_string).ok_or_else(|| {
                IntrospectionError::Query(format!(
                    "catalog row {} has {} values, expected {}",
                    row_no,
                    row.len(),
                    rows.columns.len()
                ))
            })
        };

        let key = format!("{}.{}", field(schema_idx)?, field(table_idx)?);
        let column = ColumnDescriptor::new(field(column_idx)?, field(type_idx)?);

        match catalog.get_mut(&key) {
            Some(table) => table.columns.push(column),
            None => {
                let mut table = TableEntry::new(key);
                table.columns.push(column);
                catalog.insert(table);
            }
        }
    }

    Ok(catalog)
}

fn value_to_string(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => String::new(),
        other => other.to_string(),
    }
}
