//! Merging warehouse and hand-authored catalogs.
//!
//! The warehouse catalog is authoritative: its tables, columns and column
//! annotations are carried over untouched. The custom catalog only adds
//! columns a warehouse table is missing, and whole tables the warehouse does
//! not expose.

use std::collections::HashSet;

use tracing::{debug, info};

use super::{Catalog, ColumnDescriptor, TableEntry};

/// How custom table keys are matched against warehouse keys.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum KeyPolicy {
    /// Match keys exactly. A bare `orders` never matches `public.orders`.
    #[default]
    Literal,
    /// Prefix bare custom keys (no `.`) with `schema.` before matching.
    ///
    /// Table keys and column names are then compared ASCII
    /// case-insensitively.
    QualifyBareNames { schema: String },
}

impl KeyPolicy {
    fn resolve<'a>(&self, key: &'a str) -> std::borrow::Cow<'a, str> {
        match self {
            KeyPolicy::QualifyBareNames { schema } if !key.contains('.') => {
                std::borrow::Cow::Owned(format!("{}.{}", schema, key))
            }
            _ => std::borrow::Cow::Borrowed(key),
        }
    }

    fn ignores_case(&self) -> bool {
        matches!(self, KeyPolicy::QualifyBareNames { .. })
    }

    /// Key under which `catalog` already holds the table `key` refers to.
    fn find_existing(&self, catalog: &Catalog, key: &str) -> Option<String> {
        if catalog.contains(key) {
            return Some(key.to_string());
        }
        if !self.ignores_case() {
            return None;
        }
        catalog
            .table_names()
            .find(|name| name.eq_ignore_ascii_case(key))
            .map(str::to_string)
    }

    fn column_key(&self, name: &str) -> String {
        if self.ignores_case() {
            name.to_ascii_uppercase()
        } else {
            name.to_string()
        }
    }
}

/// Options for [`merge_with`].
#[derive(Debug, Clone, Default)]
pub struct MergeOptions {
    pub key_policy: KeyPolicy,
}

/// Counters describing what a merge added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    /// Tables present in the warehouse catalog.
    pub warehouse_tables: usize,
    /// Custom-only tables appended to the result.
    pub tables_added: usize,
    /// Custom columns appended to existing warehouse tables.
    pub columns_added: usize,
}

/// Merge with default options (literal key matching).
pub fn merge(warehouse: &Catalog, custom: &Catalog) -> Catalog {
    merge_with(warehouse, custom, &MergeOptions::default()).0
}

/// Merge `custom` into a copy of `warehouse`.
///
/// Neither input is modified. Warehouse columns always form a prefix of the
/// merged column list of their table; custom-only tables follow all
/// warehouse tables in custom order.
pub fn merge_with(
    warehouse: &Catalog,
    custom: &Catalog,
    options: &MergeOptions,
) -> (Catalog, MergeSummary) {
    info!(
        warehouse_tables = warehouse.len(),
        custom_tables = custom.len(),
        "merging warehouse and custom metadata"
    );

    let mut merged = warehouse.clone();
    let mut summary = MergeSummary {
        warehouse_tables: warehouse.len(),
        ..Default::default()
    };

    for custom_table in custom {
        let policy = &options.key_policy;
        let key = policy.resolve(&custom_table.qualified_name);
        let existing_key = policy.find_existing(&merged, &key);

        match existing_key.as_deref().and_then(|k| merged.get_mut(k)) {
            Some(existing) => {
                let mut present: HashSet<String> = existing
                    .columns
                    .iter()
                    .map(|c| policy.column_key(&c.name))
                    .collect();
                let before = existing.columns.len();

                for column in &custom_table.columns {
                    if present.insert(policy.column_key(&column.name)) {
                        existing.columns.push(column.clone());
                    }
                }

                let added = existing.columns.len() - before;
                summary.columns_added += added;
                debug!(
                    table = %existing.qualified_name,
                    columns = added,
                    "merged custom columns into existing table"
                );
            }
            None => {
                let entry = TableEntry {
                    qualified_name: key.into_owned(),
                    columns: dedup_columns(&custom_table.columns),
                };
                debug!(table = %entry.qualified_name, "added custom table");
                merged.insert(entry);
                summary.tables_added += 1;
            }
        }
    }

    info!(
        tables = merged.len(),
        tables_added = summary.tables_added,
        columns_added = summary.columns_added,
        "metadata merge complete"
    );

    (merged, summary)
}

/// Keep the first occurrence of each column name.
fn dedup_columns(columns: &[ColumnDescriptor]) -> Vec<ColumnDescriptor> {
    let mut seen = HashSet::new();
    columns
        .iter()
        .filter(|c| seen.insert(c.name.as_str()))
        .cloned()
        .collect()
}
