//! Worker communication module.
//!
//! Warehouse access goes through an out-of-process database worker. The
//! worker owns the driver and credentials handshake; tundra only speaks the
//! line protocol.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      tundra (Rust + Tokio)                      │
//! │  ┌───────────────────────────────────────────────────────────┐  │
//! │  │                    WorkerClient (Async)                   │  │
//! │  │  - Spawns the worker as child process                     │  │
//! │  │  - NDJSON protocol over stdin/stdout                      │  │
//! │  │  - Request IDs for request/response correlation           │  │
//! │  └───────────────────────────────────────────────────────────┘  │
//! │               stdin (NDJSON) │ stdout (NDJSON)                  │
//! └──────────────────────────────┼──────────────────────────────────┘
//!                                ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 Worker (snowflake driver)                       │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use tundra::worker::{WorkerClient, protocol::ConnectionParams};
//!
//! let client = WorkerClient::spawn("./tundra-worker").await?;
//! let rows = client.execute_query(params, "SELECT CURRENT_VERSION()").await?;
//! client.shutdown().await?;
//! ```

mod client;
mod error;
pub mod protocol;

pub use client::{WorkerClient, DEFAULT_TIMEOUT_SECS};
pub use error::{WorkerError, WorkerResult};
