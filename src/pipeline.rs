//! Catalog build sequence.
//!
//! Runs introspect → load → merge once per session. Any failure aborts the
//! build; there is no partial or default catalog.

use std::time::Instant;

use tracing::{error, info};

use crate::annotations::{AnnotationError, SchemaAnnotationLoader};
use crate::catalog::{merge_with, Catalog, MergeOptions};
use crate::introspect::{IntrospectionError, SchemaIntrospector, WarehouseConnector};

/// Error kinds the front-end distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Connection,
    Query,
    AnnotationsNotFound,
    AnnotationsParse,
}

/// A failed catalog build.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Introspection(#[from] IntrospectionError),

    #[error(transparent)]
    Annotations(#[from] AnnotationError),
}

impl BuildError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BuildError::Introspection(IntrospectionError::Connection(_)) => ErrorKind::Connection,
            BuildError::Introspection(IntrospectionError::Query(_)) => ErrorKind::Query,
            BuildError::Annotations(AnnotationError::NotFound(_)) => {
                ErrorKind::AnnotationsNotFound
            }
            BuildError::Annotations(AnnotationError::Read { .. })
            | BuildError::Annotations(AnnotationError::Parse { .. }) => {
                ErrorKind::AnnotationsParse
            }
        }
    }

    /// Short message for an "initialization failed" screen.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Connection => {
                "Initialization error: could not connect to the warehouse. Check credentials and logs."
            }
            ErrorKind::Query => {
                "Initialization error: could not read the warehouse schema. Check role privileges and logs."
            }
            ErrorKind::AnnotationsNotFound => {
                "Initialization error: schema annotation file is missing."
            }
            ErrorKind::AnnotationsParse => {
                "Initialization error: schema annotation file is malformed. Check logs."
            }
        }
    }
}

/// Builds the session catalog from the warehouse and the annotation document.
pub struct CatalogBuilder<C> {
    introspector: SchemaIntrospector<C>,
    annotations: SchemaAnnotationLoader,
    merge: MergeOptions,
}

impl<C: WarehouseConnector> CatalogBuilder<C> {
    pub fn new(introspector: SchemaIntrospector<C>, annotations: SchemaAnnotationLoader) -> Self {
        Self {
            introspector,
            annotations,
            merge: MergeOptions::default(),
        }
    }

    pub fn with_merge_options(mut self, options: MergeOptions) -> Self {
        self.merge = options;
        self
    }

    /// Run the build.
    pub async fn build(&self) -> Result<Catalog, BuildError> {
        let started = Instant::now();

        let result = self.run().await;
        match &result {
            Ok(catalog) => info!(
                tables = catalog.len(),
                columns = catalog.column_count(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "metadata loaded and merged"
            ),
            Err(e) => error!(error = %e, kind = ?e.kind(), "catalog build failed"),
        }
        result
    }

    async fn run(&self) -> Result<Catalog, BuildError> {
        let warehouse = self.introspector.introspect_default().await?;
        let custom = self.annotations.load()?;
        let (merged, _) = merge_with(&warehouse, &custom, &self.merge);
        Ok(merged)
    }
}
