#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tundra::catalog::{merge, render_context, Catalog, TableEntry};
    use tundra::prompt::{CompletionError, LanguageModel, PromptTemplate, SqlAgent};

    /// Replies with a fixed statement and keeps every prompt it was sent.
    struct CannedModel {
        reply: &'static str,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl LanguageModel for CannedModel {
        async fn complete(&self, prompt: &str) -> Result<String, CompletionError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok(self.reply.to_string())
        }
    }

    struct Unreachable;

    #[async_trait]
    impl LanguageModel for Unreachable {
        async fn complete(&self, _prompt: &str) -> Result<String, CompletionError> {
            Err(CompletionError::Request("connection refused".into()))
        }
    }

    fn context() -> String {
        let warehouse: Catalog = vec![TableEntry::new("PUBLIC.USER_EVENTS")
            .with_column("USER_ID", "NUMBER")
            .with_column("PRICE", "FLOAT")]
        .into_iter()
        .collect();
        let custom: Catalog = vec![TableEntry::new("CATEGORY_BUDGETS")
            .with_column("CATEGORY_CODE", "dotted category path")]
        .into_iter()
        .collect();
        render_context(&merge(&warehouse, &custom))
    }

    #[tokio::test]
    async fn test_agent_sends_catalog_context() {
        let model = CannedModel {
            reply: "\n  SELECT SUM(PRICE) FROM PUBLIC.USER_EVENTS;  \n",
            prompts: Mutex::new(Vec::new()),
        };
        let agent = SqlAgent::new(model, context());

        let sql = agent.ask("What is total revenue?").await.unwrap();

        assert_eq!(sql, "SELECT SUM(PRICE) FROM PUBLIC.USER_EVENTS;");
        let expected = PromptTemplate::default().render(&context(), "What is total revenue?");
        assert_eq!(agent.prompt_for("What is total revenue?"), expected);
    }

    #[tokio::test]
    async fn test_custom_template_reaches_model() {
        let model = CannedModel {
            reply: "SELECT 1",
            prompts: Mutex::new(Vec::new()),
        };
        let agent = SqlAgent::new(model, context())
            .with_template(PromptTemplate::new("Schema:\n{schema}\nQ: {question}"));

        let prompt = agent.prompt_for("count users");

        assert_eq!(
            prompt,
            "Schema:\nPUBLIC.USER_EVENTS: USER_ID, PRICE\nCATEGORY_BUDGETS: CATEGORY_CODE\nQ: count users"
        );
        agent.ask("count users").await.unwrap();
    }

    #[tokio::test]
    async fn test_model_failure_is_returned() {
        let agent = SqlAgent::new(Unreachable, context());

        let err = agent.ask("anything").await.unwrap_err();

        assert!(matches!(err, CompletionError::Request(msg) if msg.contains("refused")));
    }
}
