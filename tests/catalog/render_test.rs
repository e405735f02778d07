#[cfg(test)]
mod tests {
    use insta::assert_snapshot;
    use tundra::catalog::{merge, render_context, Catalog, ContextRenderer, TableEntry};

    fn merged() -> Catalog {
        let warehouse: Catalog = vec![
            TableEntry::new("PUBLIC.ORDERS")
                .with_column("ID", "NUMBER")
                .with_column("TOTAL", "FLOAT"),
            TableEntry::new("PUBLIC.USERS").with_column("ID", "NUMBER"),
        ]
        .into_iter()
        .collect();

        let custom: Catalog = vec![
            TableEntry::new("PUBLIC.ORDERS").with_column("REGION", "sales region"),
            TableEntry::new("returns")
                .with_column("order_id", "returned order")
                .with_column("reason", ""),
        ]
        .into_iter()
        .collect();

        merge(&warehouse, &custom)
    }

    #[test]
    fn test_names_only_by_default() {
        assert_snapshot!(render_context(&merged()), @r"
        PUBLIC.ORDERS: ID, TOTAL, REGION
        PUBLIC.USERS: ID
        returns: order_id, reason
        ");
    }

    #[test]
    fn test_with_annotations() {
        let text = ContextRenderer::new()
            .with_annotations(true)
            .render(&merged());
        assert_snapshot!(text, @r"
        PUBLIC.ORDERS: ID (NUMBER), TOTAL (FLOAT), REGION (sales region)
        PUBLIC.USERS: ID (NUMBER)
        returns: order_id (returned order), reason
        ");
    }

    #[test]
    fn test_render_is_deterministic() {
        let catalog = merged();
        let first = render_context(&catalog);
        for _ in 0..5 {
            assert_eq!(render_context(&catalog), first);
        }
    }

    #[test]
    fn test_no_trailing_newline() {
        let text = render_context(&merged());
        assert!(!text.ends_with('\n'));
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn test_bounded_context() {
        let catalog = merged();
        let full = render_context(&catalog);
        let first_line_len = full.lines().next().unwrap().len();

        let text = ContextRenderer::new()
            .with_max_chars(first_line_len + 3)
            .render(&catalog);
        assert_eq!(text, "PUBLIC.ORDERS: ID, TOTAL, REGION");

        let text = ContextRenderer::new().with_max_chars(full.len()).render(&catalog);
        assert_eq!(text, full);

        let text = ContextRenderer::new().with_max_chars(0).render(&catalog);
        assert_eq!(text, "");
    }
}
