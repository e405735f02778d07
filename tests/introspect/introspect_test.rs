#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use serde_json::json;
    use tundra::catalog::ColumnDescriptor;
    use tundra::config::WarehouseConfig;
    use tundra::introspect::{
        IntrospectionError, RowSet, SchemaIntrospector, WarehouseConnector, WarehouseSession,
    };

    #[derive(Clone, Copy)]
    enum Behavior {
        Rows,
        RejectLogin,
        FailQuery,
    }

    #[derive(Default)]
    struct Counters {
        opened: AtomicUsize,
        closed: AtomicUsize,
        queries: Mutex<Vec<String>>,
    }

    struct FakeConnector {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    struct FakeSession {
        behavior: Behavior,
        counters: Arc<Counters>,
    }

    #[async_trait]
    impl WarehouseConnector for FakeConnector {
        type Session = FakeSession;

        async fn connect(&self, _config: &WarehouseConfig) -> Result<FakeSession, IntrospectionError> {
            if let Behavior::RejectLogin = self.behavior {
                return Err(IntrospectionError::Connection("incorrect username or password".into()));
            }
            self.counters.opened.fetch_add(1, Ordering::SeqCst);
            Ok(FakeSession {
                behavior: self.behavior,
                counters: self.counters.clone(),
            })
        }
    }

    #[async_trait]
    impl WarehouseSession for FakeSession {
        async fn execute(&mut self, sql: &str) -> Result<RowSet, IntrospectionError> {
            self.counters.queries.lock().unwrap().push(sql.to_string());
            match self.behavior {
                Behavior::FailQuery => Err(IntrospectionError::Query(
                    "Schema 'SALES.MISSING' does not exist or not authorized".into(),
                )),
                _ => Ok(RowSet {
                    columns: vec![
                        "TABLE_SCHEMA".into(),
                        "TABLE_NAME".into(),
                        "COLUMN_NAME".into(),
                        "DATA_TYPE".into(),
                    ],
                    rows: vec![
                        vec![json!("PUBLIC"), json!("ORDERS"), json!("ID"), json!("NUMBER")],
                        vec![json!("PUBLIC"), json!("ORDERS"), json!("TOTAL"), json!("FLOAT")],
                        vec![json!("PUBLIC"), json!("USER_EVENTS"), json!("USER_ID"), json!("NUMBER")],
                    ],
                }),
            }
        }

        async fn close(&mut self) -> Result<(), IntrospectionError> {
            self.counters.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config() -> WarehouseConfig {
        WarehouseConfig {
            account: "xy12345".to_string(),
            user: "analyst".to_string(),
            password: "pw".to_string(),
            warehouse: Some("COMPUTE_WH".to_string()),
            database: "SALES".to_string(),
            schema: "PUBLIC".to_string(),
            role: None,
        }
    }

    fn introspector(behavior: Behavior) -> (SchemaIntrospector<FakeConnector>, Arc<Counters>) {
        let counters = Arc::new(Counters::default());
        let connector = FakeConnector {
            behavior,
            counters: counters.clone(),
        };
        (SchemaIntrospector::new(connector, config()), counters)
    }

    #[tokio::test]
    async fn test_introspect_groups_tables() {
        let (introspector, counters) = introspector(Behavior::Rows);

        let catalog = introspector.introspect_default().await.unwrap();

        assert_eq!(
            catalog.table_names().collect::<Vec<_>>(),
            vec!["PUBLIC.ORDERS", "PUBLIC.USER_EVENTS"]
        );
        assert_eq!(
            catalog.get("PUBLIC.ORDERS").unwrap().columns,
            vec![
                ColumnDescriptor::new("ID", "NUMBER"),
                ColumnDescriptor::new("TOTAL", "FLOAT"),
            ]
        );

        let queries = counters.queries.lock().unwrap();
        assert_eq!(queries.len(), 1);
        assert!(queries[0].contains("FROM SALES.information_schema.columns"));
        assert!(queries[0].contains("table_schema = 'PUBLIC'"));
        assert!(queries[0].ends_with("ORDER BY table_schema, table_name, ordinal_position"));
    }

    #[tokio::test]
    async fn test_session_closed_after_success() {
        let (introspector, counters) = introspector(Behavior::Rows);

        introspector.introspect("PUBLIC").await.unwrap();
        introspector.introspect("PUBLIC").await.unwrap();

        assert_eq!(counters.opened.load(Ordering::SeqCst), 2);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_session_closed_after_query_failure() {
        let (introspector, counters) = introspector(Behavior::FailQuery);

        let err = introspector.introspect("MISSING").await.unwrap_err();

        assert!(matches!(err, IntrospectionError::Query(_)));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 1);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_connection_failure() {
        let (introspector, counters) = introspector(Behavior::RejectLogin);

        let err = introspector.introspect_default().await.unwrap_err();

        assert!(matches!(err, IntrospectionError::Connection(_)));
        assert_eq!(counters.opened.load(Ordering::SeqCst), 0);
        assert_eq!(counters.closed.load(Ordering::SeqCst), 0);
        assert!(counters.queries.lock().unwrap().is_empty());
    }
}
