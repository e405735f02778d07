//! Table/column catalog.
//!
//! The [`Catalog`] is the in-memory schema ground truth handed to prompt
//! construction. It is built from two sources:
//!
//! ```text
//! ┌──────────────────────┐    ┌──────────────────────────┐
//! │  SchemaIntrospector  │    │  SchemaAnnotationLoader  │
//! │  "schema.table" keys │    │  bare table-name keys    │
//! └──────────┬───────────┘    └────────────┬─────────────┘
//!            │                             │
//!            ▼                             ▼
//! ┌─────────────────────────────────────────────────────────┐
//! │                    merge::merge()                        │
//! │  warehouse columns first, custom columns appended        │
//! └─────────────────────────────────────────────────────────┘
//!                           │
//!                           ▼ [render]
//! ┌─────────────────────────────────────────────────────────┐
//! │        "table: col, col, ..." schema context text        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Keys are unique and iteration follows insertion order.

mod merge;
mod render;

use std::collections::HashMap;

use serde::Serialize;

pub use merge::{merge, merge_with, KeyPolicy, MergeOptions, MergeSummary};
pub use render::{render_context, ContextRenderer};

/// A single column and its annotation.
///
/// The annotation is a data type for warehouse columns and a free-text
/// description for hand-authored ones.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    pub name: String,
    pub annotation: String,
}

impl ColumnDescriptor {
    pub fn new(name: impl Into<String>, annotation: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            annotation: annotation.into(),
        }
    }
}

/// A table and its ordered columns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableEntry {
    /// `schema.table` for warehouse entries, bare table name for custom ones.
    pub qualified_name: String,
    pub columns: Vec<ColumnDescriptor>,
}

impl TableEntry {
    pub fn new(qualified_name: impl Into<String>) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            columns: Vec::new(),
        }
    }

    /// Builder-style column append. Does not check for duplicates.
    pub fn with_column(mut self, name: impl Into<String>, annotation: impl Into<String>) -> Self {
        self.columns.push(ColumnDescriptor::new(name, annotation));
        self
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.iter().any(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// Ordered mapping from qualified table name to [`TableEntry`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Catalog {
    tables: Vec<TableEntry>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.index.contains_key(qualified_name)
    }

    pub fn get(&self, qualified_name: &str) -> Option<&TableEntry> {
        self.index.get(qualified_name).map(|&i| &self.tables[i])
    }

    pub(crate) fn get_mut(&mut self, qualified_name: &str) -> Option<&mut TableEntry> {
        match self.index.get(qualified_name) {
            Some(&i) => Some(&mut self.tables[i]),
            None => None,
        }
    }

    /// Insert a table.
    ///
    /// An existing entry with the same name is replaced in place (keeping its
    /// position) and returned; otherwise the entry is appended.
    pub fn insert(&mut self, entry: TableEntry) -> Option<TableEntry> {
        match self.index.get(&entry.qualified_name) {
            Some(&i) => Some(std::mem::replace(&mut self.tables[i], entry)),
            None => {
                self.index
                    .insert(entry.qualified_name.clone(), self.tables.len());
                self.tables.push(entry);
                None
            }
        }
    }

    /// Tables in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, TableEntry> {
        self.tables.iter()
    }

    pub fn tables(&self) -> &[TableEntry] {
        &self.tables
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.iter().map(|t| t.qualified_name.as_str())
    }

    /// Total number of columns across all tables.
    pub fn column_count(&self) -> usize {
        self.tables.iter().map(|t| t.columns.len()).sum()
    }
}

impl FromIterator<TableEntry> for Catalog {
    fn from_iter<I: IntoIterator<Item = TableEntry>>(iter: I) -> Self {
        let mut catalog = Catalog::new();
        for entry in iter {
            catalog.insert(entry);
        }
        catalog
    }
}

impl<'a> IntoIterator for &'a Catalog {
    type Item = &'a TableEntry;
    type IntoIter = std::slice::Iter<'a, TableEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.tables.iter()
    }
}
