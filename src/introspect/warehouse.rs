//! Warehouse connector traits.
//!
//! The warehouse is a black box that takes SQL and returns a [`RowSet`].
//! A [`WarehouseConnector`] opens a [`WarehouseSession`] for one unit of
//! work; the caller closes it when done.

use async_trait::async_trait;

use super::IntrospectionError;
use crate::config::WarehouseConfig;

/// Result of a query: column names plus JSON-valued rows.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<serde_json::Value>>,
}

impl RowSet {
    pub fn new(columns: Vec<String>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Position of a column, compared ASCII case-insensitively.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.eq_ignore_ascii_case(name))
    }
}

/// Opens warehouse sessions.
#[async_trait]
pub trait WarehouseConnector: Send + Sync {
    type Session: WarehouseSession;

    /// Open and authenticate a session.
    ///
    /// Failures here are reported as [`IntrospectionError::Connection`].
    async fn connect(&self, config: &WarehouseConfig) -> Result<Self::Session, IntrospectionError>;
}

/// An open warehouse session.
#[async_trait]
pub trait WarehouseSession: Send {
    /// Run one statement and collect its rows.
    async fn execute(&mut self, sql: &str) -> Result<RowSet, IntrospectionError>;

    /// Release the session. Called exactly once, on success and failure paths.
    async fn close(&mut self) -> Result<(), IntrospectionError>;
}
