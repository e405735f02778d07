//! Worker-backed warehouse connector.
//!
//! Each session owns its own worker process: `connect` spawns the worker and
//! probes the warehouse, `close` shuts the worker down. Nothing is pooled or
//! reused across sessions.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use super::warehouse::{RowSet, WarehouseConnector, WarehouseSession};
use super::IntrospectionError;
use crate::config::{WarehouseConfig, WorkerSettings};
use crate::worker::protocol::ConnectionParams;
use crate::worker::{WorkerClient, WorkerError, DEFAULT_TIMEOUT_SECS};

/// [`WarehouseConnector`] that talks to the warehouse through the database
/// worker.
#[derive(Debug, Clone)]
pub struct WorkerConnector {
    worker_path: PathBuf,
    timeout: Duration,
}

impl WorkerConnector {
    pub fn new(worker_path: impl Into<PathBuf>) -> Self {
        Self {
            worker_path: worker_path.into(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }

    /// Build from `[worker]` settings. Fails if no worker binary can be found.
    pub fn from_settings(settings: &WorkerSettings) -> Result<Self, WorkerError> {
        let path = settings.worker_path().ok_or(WorkerError::NotFound)?;
        Ok(Self::new(path).with_timeout(settings.timeout()))
    }

    /// Per-request timeout for the warehouse round trips.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn worker_path(&self) -> &PathBuf {
        &self.worker_path
    }
}

#[async_trait]
impl WarehouseConnector for WorkerConnector {
    type Session = WorkerSession;

    async fn connect(&self, config: &WarehouseConfig) -> Result<WorkerSession, IntrospectionError> {
        let client = WorkerClient::spawn_with_timeout(&self.worker_path, self.timeout)
            .await
            .map_err(|e| IntrospectionError::Connection(e.to_string()))?;

        let connection = ConnectionParams {
            driver: config.driver_name().to_string(),
            connection_string: config.to_connection_string(),
        };

        // Probe so authentication problems surface as connection errors.
        match client.get_database_info(connection.clone()).await {
            Ok(info) => {
                debug!(
                    product = %info.database.product_name,
                    version = %info.database.product_version,
                    database = %info.database.database_name,
                    "warehouse session opened"
                );
                Ok(WorkerSession {
                    client: Some(client),
                    connection,
                })
            }
            Err(e) => {
                if let Err(shutdown) = client.shutdown().await {
                    warn!(error = %shutdown, "failed to shut down worker after failed probe");
                }
                Err(IntrospectionError::Connection(e.to_string()))
            }
        }
    }
}

/// A warehouse session backed by one worker process.
pub struct WorkerSession {
    client: Option<WorkerClient>,
    connection: ConnectionParams,
}

#[async_trait]
impl WarehouseSession for WorkerSession {
    async fn execute(&mut self, sql: &str) -> Result<RowSet, IntrospectionError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| IntrospectionError::Query("session already closed".to_string()))?;

        let response = client
            .execute_query(self.connection.clone(), sql)
            .await
            .map_err(classify)?;

        Ok(RowSet {
            columns: response.columns.into_iter().map(|c| c.name).collect(),
            rows: response.rows,
        })
    }

    async fn close(&mut self) -> Result<(), IntrospectionError> {
        match self.client.take() {
            Some(client) => client
                .shutdown()
                .await
                .map_err(|e| IntrospectionError::Connection(e.to_string())),
            None => Ok(()),
        }
    }
}

fn classify(err: WorkerError) -> IntrospectionError {
    if err.is_connection_failure() {
        IntrospectionError::Connection(err.to_string())
    } else {
        IntrospectionError::Query(err.to_string())
    }
}
