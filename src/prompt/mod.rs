//! Prompt construction and the language-model seam.
//!
//! The model itself is a black box behind [`LanguageModel`]; this module only
//! assembles the text it receives and hands back what it returns.
//!
//! No model client ships with the crate. [`SqlAgent`] is for library callers
//! that bring their own [`LanguageModel`]; the `tundra prompt` command only
//! prints the rendered [`PromptTemplate`].

use async_trait::async_trait;
use tracing::{debug, info};

/// Placeholder replaced with the rendered schema context.
pub const SCHEMA_PLACEHOLDER: &str = "{schema}";
/// Placeholder replaced with the user's question.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

const DEFAULT_TEMPLATE: &str = "\
You are a Snowflake SQL expert. Your job is to write correct and optimized SQL queries based on the user's request.

Here is the database schema (only include relevant tables and columns):

{schema}

Guidelines:
- Only use tables and columns from the schema.
- Ensure that the SQL query is efficient and performs well on large datasets.
- Use proper aliases for tables and avoid unnecessary subqueries.

User Question:
{question}

Provide only the SQL query.
";

/// Error returned by a [`LanguageModel`].
#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("language model request failed: {0}")]
    Request(String),

    #[error("language model returned an empty completion")]
    Empty,
}

/// Text-in/text-out completion call.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String, CompletionError>;
}

/// Prompt text with `{schema}` and `{question}` placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

impl PromptTemplate {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.template
    }

    /// Substitute the schema context and question.
    ///
    /// Placeholders occurring inside the substituted values are kept
    /// literally. Only the first `{question}` in the template is replaced.
    pub fn render(&self, schema_context: &str, question: &str) -> String {
        let (before, after) = match self.template.split_once(QUESTION_PLACEHOLDER) {
            Some((before, after)) => (before, Some(after)),
            None => (self.template.as_str(), None),
        };

        let mut out = before.replace(SCHEMA_PLACEHOLDER, schema_context);
        if let Some(after) = after {
            out.push_str(question);
            out.push_str(&after.replace(SCHEMA_PLACEHOLDER, schema_context));
        }
        out
    }
}

/// Turns questions into SQL using a fixed schema context.
pub struct SqlAgent<M> {
    model: M,
    schema_context: String,
    template: PromptTemplate,
}

impl<M: LanguageModel> SqlAgent<M> {
    pub fn new(model: M, schema_context: impl Into<String>) -> Self {
        let schema_context = schema_context.into();
        info!(context_bytes = schema_context.len(), "building SQL agent");
        debug!(schema_context = %schema_context, "schema description");
        Self {
            model,
            schema_context,
            template: PromptTemplate::default(),
        }
    }

    pub fn with_template(mut self, template: PromptTemplate) -> Self {
        self.template = template;
        self
    }

    pub fn schema_context(&self) -> &str {
        &self.schema_context
    }

    /// The full prompt sent for `question`.
    pub fn prompt_for(&self, question: &str) -> String {
        self.template.render(&self.schema_context, question)
    }

    /// Generate SQL for `question`.
    pub async fn ask(&self, question: &str) -> Result<String, CompletionError> {
        info!(question, "received question");

        let completion = self.model.complete(&self.prompt_for(question)).await?;
        let sql = completion.trim();
        if sql.is_empty() {
            return Err(CompletionError::Empty);
        }

        info!(sql, "generated SQL");
        Ok(sql.to_string())
    }
}
