//! Rendering a catalog as prompt context text.

use tracing::warn;

use super::{Catalog, TableEntry};

/// Render one `"{table}: {col}, {col}"` line per table, newline-joined.
///
/// Only column names are emitted; annotations are left out.
pub fn render_context(catalog: &Catalog) -> String {
    ContextRenderer::default().render(catalog)
}

/// Configurable context renderer.
///
/// The default renders names only, with no size bound.
#[derive(Debug, Clone, Default)]
pub struct ContextRenderer {
    /// Render `name (annotation)` for columns with a non-empty annotation.
    pub include_annotations: bool,
    /// Upper bound on output length in characters. Whole table lines are
    /// dropped from the end once the bound would be exceeded.
    pub max_chars: Option<usize>,
}

impl ContextRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_annotations(mut self, include: bool) -> Self {
        self.include_annotations = include;
        self
    }

    pub fn with_max_chars(mut self, max_chars: usize) -> Self {
        self.max_chars = Some(max_chars);
        self
    }

    pub fn render(&self, catalog: &Catalog) -> String {
        let mut out = String::new();
        let mut used = 0;

        for (rendered, table) in catalog.iter().enumerate() {
            let line = self.render_table(table);
            let line_chars = line.chars().count();
            let needed = if out.is_empty() { line_chars } else { line_chars + 1 };

            if let Some(max) = self.max_chars {
                if used + needed > max {
                    warn!(
                        rendered,
                        omitted = catalog.len() - rendered,
                        max_chars = max,
                        "schema context truncated"
                    );
                    break;
                }
            }

            if !out.is_empty() {
                out.push('\n');
            }
            out.push_str(&line);
            used += needed;
        }

        out
    }

    fn render_table(&self, table: &TableEntry) -> String {
        let columns: Vec<String> = table
            .columns
            .iter()
            .map(|c| {
                if self.include_annotations && !c.annotation.is_empty() {
                    format!("{} ({})", c.name, c.annotation)
                } else {
                    c.name.clone()
                }
            })
            .collect();

        format!("{}: {}", table.qualified_name, columns.join(", "))
    }
}
