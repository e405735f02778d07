#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use async_trait::async_trait;
    use serde_json::json;
    use tundra::catalog::{render_context, KeyPolicy, MergeOptions};
    use tundra::config::WarehouseConfig;
    use tundra::introspect::{
        IntrospectionError, RowSet, SchemaIntrospector, WarehouseConnector, WarehouseSession,
    };
    use tundra::pipeline::{CatalogBuilder, ErrorKind};
    use tundra::SchemaAnnotationLoader;

    struct StaticWarehouse {
        rows: Vec<[&'static str; 4]>,
        fail_login: bool,
        closed: Arc<AtomicUsize>,
    }

    struct StaticSession {
        rows: Vec<[&'static str; 4]>,
        closed: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WarehouseConnector for StaticWarehouse {
        type Session = StaticSession;

        async fn connect(&self, _config: &WarehouseConfig) -> Result<StaticSession, IntrospectionError> {
            if self.fail_login {
                return Err(IntrospectionError::Connection("network unreachable".into()));
            }
            Ok(StaticSession {
                rows: self.rows.clone(),
                closed: self.closed.clone(),
            })
        }
    }

    #[async_trait]
    impl WarehouseSession for StaticSession {
        async fn execute(&mut self, _sql: &str) -> Result<RowSet, IntrospectionError> {
            Ok(RowSet {
                columns: vec![
                    "table_schema".into(),
                    "table_name".into(),
                    "column_name".into(),
                    "data_type".into(),
                ],
                rows: self
                    .rows
                    .iter()
                    .map(|r| r.iter().map(|v| json!(v)).collect())
                    .collect(),
            })
        }

        async fn close(&mut self) -> Result<(), IntrospectionError> {
            self.closed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn config() -> WarehouseConfig {
        WarehouseConfig {
            account: "xy12345".to_string(),
            user: "analyst".to_string(),
            password: "pw".to_string(),
            warehouse: None,
            database: "ECOM".to_string(),
            schema: "public".to_string(),
            role: None,
        }
    }

    fn warehouse(fail_login: bool) -> (StaticWarehouse, Arc<AtomicUsize>) {
        let closed = Arc::new(AtomicUsize::new(0));
        (
            StaticWarehouse {
                rows: vec![
                    ["public", "orders", "id", "NUMBER"],
                    ["public", "orders", "total", "FLOAT"],
                ],
                fail_login,
                closed: closed.clone(),
            },
            closed,
        )
    }

    fn write_annotations(dir: &Path, content: &str) -> std::path::PathBuf {
        let path = dir.join("db_schema.yml");
        fs::write(&path, content).unwrap();
        path
    }

    const ANNOTATIONS: &str = r#"
tables:
  - name: orders
    columns:
      - name: id
        description: primary key
      - name: region
        description: sales region
  - name: returns
    columns:
      - name: order_id
"#;

    #[tokio::test]
    async fn test_build_merges_literal_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_annotations(dir.path(), ANNOTATIONS);
        let (connector, closed) = warehouse(false);

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config()),
            SchemaAnnotationLoader::new(&path),
        );
        let catalog = builder.build().await.unwrap();

        assert_eq!(
            render_context(&catalog),
            "public.orders: id, total\norders: id, region\nreturns: order_id"
        );
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_build_with_qualified_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_annotations(dir.path(), ANNOTATIONS);
        let (connector, _) = warehouse(false);

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config()),
            SchemaAnnotationLoader::new(&path),
        )
        .with_merge_options(MergeOptions {
            key_policy: KeyPolicy::QualifyBareNames {
                schema: "public".to_string(),
            },
        });
        let catalog = builder.build().await.unwrap();

        assert_eq!(
            render_context(&catalog),
            "public.orders: id, total, region\npublic.returns: order_id"
        );
        let orders = catalog.get("public.orders").unwrap();
        assert_eq!(orders.column("id").unwrap().annotation, "NUMBER");
    }

    #[tokio::test]
    async fn test_qualified_keys_match_upper_case_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_annotations(dir.path(), ANNOTATIONS);
        let connector = StaticWarehouse {
            rows: vec![
                ["PUBLIC", "ORDERS", "ID", "NUMBER"],
                ["PUBLIC", "ORDERS", "TOTAL", "FLOAT"],
            ],
            fail_login: false,
            closed: Arc::new(AtomicUsize::new(0)),
        };
        let mut config = config();
        config.schema = "PUBLIC".to_string();

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config),
            SchemaAnnotationLoader::new(&path),
        )
        .with_merge_options(MergeOptions {
            key_policy: KeyPolicy::QualifyBareNames {
                schema: "PUBLIC".to_string(),
            },
        });
        let catalog = builder.build().await.unwrap();

        assert_eq!(
            render_context(&catalog),
            "PUBLIC.ORDERS: ID, TOTAL, region\nPUBLIC.returns: order_id"
        );
    }

    #[tokio::test]
    async fn test_malformed_annotations_abort_build() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_annotations(
            dir.path(),
            "tables:\n  - name: orders\n    columns:\n      - description: unnamed\n",
        );
        let (connector, _) = warehouse(false);

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config()),
            SchemaAnnotationLoader::new(&path),
        );
        let err = builder.build().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AnnotationsParse);
    }

    #[tokio::test]
    async fn test_missing_annotations_abort_build() {
        let dir = tempfile::tempdir().unwrap();
        let (connector, _) = warehouse(false);

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config()),
            SchemaAnnotationLoader::new(dir.path().join("nope.yml")),
        );
        let err = builder.build().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::AnnotationsNotFound);
    }

    #[tokio::test]
    async fn test_connection_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_annotations(dir.path(), ANNOTATIONS);
        let (connector, closed) = warehouse(true);

        let builder = CatalogBuilder::new(
            SchemaIntrospector::new(connector, config()),
            SchemaAnnotationLoader::new(&path),
        );
        let err = builder.build().await.unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Connection);
        assert!(err.user_message().contains("could not connect"));
        assert_eq!(closed.load(Ordering::SeqCst), 0);
    }
}
