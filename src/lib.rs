//! # Tundra
//!
//! Natural-language to SQL over a Snowflake warehouse. This crate builds the
//! schema context the language model is prompted with.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────┐   ┌──────────────────────────────┐
//! │   SchemaIntrospector     │   │   SchemaAnnotationLoader     │
//! │ information_schema query │   │   YAML column descriptions   │
//! └────────────┬─────────────┘   └───────────────┬──────────────┘
//!              │                                 │
//!              ▼                                 ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 catalog::merge (warehouse wins)              │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼ [render]
//! ┌─────────────────────────────────────────────────────────────┐
//! │             schema context text → prompt::SqlAgent           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The catalog is built once per session by [`pipeline::CatalogBuilder`] and
//! is read-only afterwards.

pub mod annotations;
pub mod catalog;
pub mod config;
pub mod introspect;
pub mod logging;
pub mod pipeline;
pub mod prompt;
pub mod worker;

pub use annotations::{AnnotationError, SchemaAnnotationLoader};
pub use catalog::{merge, render_context, Catalog, ColumnDescriptor, ContextRenderer, TableEntry};
pub use config::{Settings, WarehouseConfig};
pub use introspect::{IntrospectionError, SchemaIntrospector, WorkerConnector};
pub use pipeline::{BuildError, CatalogBuilder, ErrorKind};
