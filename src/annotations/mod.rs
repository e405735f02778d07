//! Hand-authored schema annotations.
//!
//! The annotation document is YAML:
//!
//! ```yaml
//! tables:
//!   - name: orders
//!     columns:
//!       - name: id
//!         description: primary key
//!       - name: region
//!         description: sales region
//!   - name: returns          # not in the warehouse yet
//!     columns:
//!       - name: order_id
//! ```
//!
//! Tables are keyed by their bare name. A column without `description` gets
//! an empty annotation.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{error, info, warn};

use crate::catalog::{Catalog, ColumnDescriptor, TableEntry};

/// Errors raised while loading the annotation document.
#[derive(Debug, thiserror::Error)]
pub enum AnnotationError {
    #[error("annotation document not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read annotation document {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed annotation document {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Deserialize)]
struct AnnotationDocument {
    #[serde(default)]
    tables: Vec<TableAnnotation>,
}

#[derive(Debug, Deserialize)]
struct TableAnnotation {
    name: String,
    columns: Vec<ColumnAnnotation>,
}

#[derive(Debug, Deserialize)]
struct ColumnAnnotation {
    name: String,
    #[serde(default)]
    description: Option<String>,
}

/// Loads the annotation document into a [`Catalog`].
#[derive(Debug, Clone)]
pub struct SchemaAnnotationLoader {
    path: PathBuf,
}

impl SchemaAnnotationLoader {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the document at the configured path.
    pub fn load(&self) -> Result<Catalog, AnnotationError> {
        info!(path = %self.path.display(), "loading custom metadata");

        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                error!(path = %self.path.display(), "annotation document not found");
                return Err(AnnotationError::NotFound(self.path.clone()));
            }
            Err(source) => {
                return Err(AnnotationError::Read {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let catalog = Self::parse_document(&content).map_err(|source| {
            error!(path = %self.path.display(), error = %source, "failed to parse custom metadata");
            AnnotationError::Parse {
                path: self.path.clone(),
                source,
            }
        })?;

        info!(tables = catalog.len(), "loaded custom metadata");
        Ok(catalog)
    }

    /// Parse an in-memory document. Errors report `<inline>` as the path.
    pub fn parse_str(content: &str) -> Result<Catalog, AnnotationError> {
        Self::parse_document(content).map_err(|source| AnnotationError::Parse {
            path: PathBuf::from("<inline>"),
            source,
        })
    }

    fn parse_document(content: &str) -> Result<Catalog, serde_yaml::Error> {
        let document: AnnotationDocument = serde_yaml::from_str(content)?;

        let mut catalog = Catalog::new();
        for table in document.tables {
            let entry = TableEntry {
                qualified_name: table.name,
                columns: table
                    .columns
                    .into_iter()
                    .map(|c| ColumnDescriptor::new(c.name, c.description.unwrap_or_default()))
                    .collect(),
            };

            let name = entry.qualified_name.clone();
            if catalog.insert(entry).is_some() {
                warn!(table = %name, "table annotated more than once; last definition wins");
            }
        }

        Ok(catalog)
    }
}
