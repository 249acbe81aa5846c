#[cfg(test)]
mod tests {
    use crate::{
        test_connection_config,
        utils::{
            assert_table_exists, execute, fetch_strings, get_columns, get_row_count, run_plan,
            try_run_plan, write_csv,
        },
    };
    use engine_core::{
        connection::{connect_with_retry, ensure_database},
        retry::{RetryError, RetryPolicy},
    };
    use engine_runtime::error::LoadError;
    use std::time::Duration;
    use tokio_postgres::config::SslMode;
    use tracing_test::traced_test;

    const SALES_CSV: &str = "\
Date, Warehouse ,Client Type,Product Line,Quantity,Total
2021-06-01,Central,Retail,Breaking system,9,63.82
2021-06-01,North,Wholesale,Suspension & traction,8,173.61
2021-06-02,West,Retail,Frame & body,,
";

    const SALES_PLAN: &str = r#"{
        "name": "motorcycle_parts",
        "tables": [
            {
                "file": "sales.csv",
                "table": "it_sales",
                "coerce": {"dates": ["date"]},
                "summary": {"distinct": ["warehouse"], "sums": ["total"]}
            }
        ]
    }"#;

    // Scenario: a bulk job on a fresh table.
    // Expected Outcome:
    // - The table is created with normalized column names and inferred types.
    // - Every CSV row is present and the report carries sample rows.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc01_bulk_load_creates_table() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "sales.csv", SALES_CSV);

        let report = run_plan(SALES_PLAN, dir.path()).await;

        assert_eq!(get_row_count("it_sales").await, 3);
        let columns = get_columns("it_sales").await;
        let expected = [
            ("date", "timestamp without time zone"),
            ("warehouse", "text"),
            ("client_type", "text"),
            ("product_line", "text"),
            ("quantity", "bigint"),
            ("total", "double precision"),
        ];
        assert_eq!(
            columns,
            expected
                .iter()
                .map(|(n, t)| (n.to_string(), t.to_string()))
                .collect::<Vec<_>>()
        );

        let table = &report.tables[0];
        assert_eq!(table.rows_read, 3);
        assert_eq!(table.rows_in_database, Some(3));
        assert_eq!(table.sample_rows.len(), 3);
        assert_eq!(table.date_columns, vec!["date"]);
    }

    // Scenario: the same plan runs twice.
    // Expected Outcome: the second run replaces the table instead of appending.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc02_bulk_load_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "sales.csv", SALES_CSV);
        let plan = SALES_PLAN.replace("it_sales", "it_sales_twice");

        run_plan(&plan, dir.path()).await;
        run_plan(&plan, dir.path()).await;

        assert_eq!(get_row_count("it_sales_twice").await, 3);
    }

    // Scenario: the target table exists with another shape.
    // Expected Outcome: it is dropped and recreated from the CSV.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc03_bulk_load_replaces_existing_table() {
        execute(
            "DROP TABLE IF EXISTS it_replaced CASCADE; \
             CREATE TABLE it_replaced (legacy INTEGER); \
             INSERT INTO it_replaced VALUES (1), (2), (3), (4), (5);",
        )
        .await;

        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "replaced.csv", "Name,Year Founded\nKongo Gumi,578\n");
        let plan = r#"{
            "name": "oldest_businesses",
            "tables": [{"file": "replaced.csv", "table": "it_replaced", "coerce": {"years": ["year_founded"]}}]
        }"#;

        run_plan(plan, dir.path()).await;

        assert_eq!(get_row_count("it_replaced").await, 1);
        let names = get_columns("it_replaced")
            .await
            .into_iter()
            .map(|(name, _)| name)
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["name", "year_founded"]);
    }

    const GROCERY_PLAN: &str = r#"{
        "name": "grocery",
        "tables": [
            {
                "file": "products.csv",
                "table": "it_products",
                "mode": "explicit",
                "coerce": {"years": ["year_added"]},
                "schema": {
                    "columns": [
                        {"name": "product_id", "type": "INTEGER", "nullable": false},
                        {"name": "product_type", "type": "VARCHAR(50)"},
                        {"name": "price", "type": "NUMERIC"},
                        {"name": "year_added", "type": "INTEGER"}
                    ],
                    "primary_key": ["product_id"]
                },
                "summary": {"null_counts": ["year_added", "price"]}
            }
        ]
    }"#;

    // Scenario: an explicit table with blank cells in nullable columns.
    // Expected Outcome: blanks arrive as NULL, with the declared column types.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc04_explicit_load_binds_nulls() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "products.csv",
            "product_id,product_type,price,year_added\n\
             1,Produce,4.99,2018\n\
             2,Meat,,\n\
             3,Dairy,2.50,unknown\n",
        );

        let report = run_plan(GROCERY_PLAN, dir.path()).await;

        assert_eq!(get_row_count("it_products").await, 3);
        let years = fetch_strings(
            "SELECT year_added::text FROM it_products ORDER BY product_id",
        )
        .await;
        assert_eq!(years, vec![Some("2018".to_string()), None, None]);

        let columns = get_columns("it_products").await;
        assert_eq!(columns[0], ("product_id".to_string(), "integer".to_string()));
        assert_eq!(
            columns[1],
            ("product_type".to_string(), "character varying".to_string())
        );
        assert_eq!(columns[2], ("price".to_string(), "numeric".to_string()));

        let nulls = &report.tables[0].null_counts;
        assert_eq!(nulls[0].count, 2);
        assert_eq!(nulls[1].count, 1);
    }

    const LENDING_PLAN: &str = r#"{
        "name": "lending",
        "tables": [
            {
                "file": "client.csv",
                "table": "it_client",
                "mode": "explicit",
                "schema": {
                    "columns": [
                        {"name": "client_id", "type": "INTEGER", "nullable": false},
                        {"name": "country", "type": "VARCHAR(20)"}
                    ],
                    "primary_key": ["client_id"]
                }
            },
            {
                "file": "loan.csv",
                "table": "it_loan",
                "mode": "explicit",
                "schema": {
                    "columns": [
                        {"name": "loan_id", "type": "INTEGER", "nullable": false},
                        {"name": "client_id", "type": "INTEGER", "nullable": false},
                        {"name": "principal_amount", "type": "NUMERIC"}
                    ],
                    "primary_key": ["loan_id"],
                    "foreign_keys": [
                        {"columns": ["client_id"], "references": "it_client", "referenced_columns": ["client_id"]}
                    ]
                }
            }
        ]
    }"#;

    // Scenario: a loan references a client that is not in the CSV, after a
    // previous successful load.
    // Expected Outcome:
    // - The run fails with the foreign key violation.
    // - The rollback leaves the previously loaded tables untouched.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc05_foreign_key_violation_rolls_back() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "client.csv", "client_id,country\n1,Kenya\n2,Peru\n");
        write_csv(
            dir.path(),
            "loan.csv",
            "loan_id,client_id,principal_amount\n10,1,1500.25\n11,2,800\n",
        );
        run_plan(LENDING_PLAN, dir.path()).await;
        assert_eq!(get_row_count("it_loan").await, 2);

        write_csv(dir.path(), "client.csv", "client_id,country\n1,Kenya\n");
        write_csv(
            dir.path(),
            "loan.csv",
            "loan_id,client_id,principal_amount\n12,1,10\n13,99,20\n",
        );
        let result = try_run_plan(LENDING_PLAN, dir.path()).await;

        assert!(matches!(result, Err(LoadError::Database(_))));
        assert_eq!(get_row_count("it_client").await, 2);
        assert_eq!(get_row_count("it_loan").await, 2);
    }

    // Scenario: a declared column is missing from the CSV.
    // Expected Outcome: the run fails before any table is created.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc06_missing_declared_column_writes_nothing() {
        execute("DROP TABLE IF EXISTS it_products_missing CASCADE;").await;

        let dir = tempfile::tempdir().unwrap();
        write_csv(dir.path(), "products.csv", "product_id,product_type\n1,Produce\n");
        let plan = GROCERY_PLAN.replace("\"it_products\"", "\"it_products_missing\"");

        let result = try_run_plan(&plan, dir.path()).await;

        assert!(matches!(
            result,
            Err(LoadError::MissingColumn { ref column, .. }) if column == "price"
        ));
        assert_table_exists("it_products_missing", false).await;
    }

    // Scenario: the target database is missing.
    // Expected Outcome: it is created once; a second call finds it.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc07_ensure_database_creates_once() {
        let config = test_connection_config().with_database("csvload_it_ensure");
        let admin = test_connection_config();
        execute("DROP DATABASE IF EXISTS csvload_it_ensure;").await;

        assert!(ensure_database(&config, &admin.database).await.unwrap());
        assert!(!ensure_database(&config, &admin.database).await.unwrap());

        execute("DROP DATABASE IF EXISTS csvload_it_ensure;").await;
    }

    // Scenario: nothing listens on the configured port.
    // Expected Outcome: every attempt is made, then the last error surfaces.
    #[traced_test]
    #[tokio::test]
    async fn tc08_connect_retry_gives_up() {
        let mut config = test_connection_config();
        config.host = "127.0.0.1".to_string();
        config.port = 1;
        config.ssl_mode = SslMode::Disable;

        let policy = RetryPolicy::new(2, Duration::from_millis(10));
        let result = connect_with_retry(&config, &policy).await;

        assert!(matches!(
            result,
            Err(RetryError::AttemptsExceeded { attempts: 2, .. })
        ));
    }

    // Scenario: a bulk job whose coerced columns end up entirely blank.
    // Expected Outcome: the year column is still BIGINT and the date column TIMESTAMP.
    #[traced_test]
    #[tokio::test]
    #[ignore = "requires a running Postgres (TEST_PG_URL)"]
    async fn tc09_blank_coerced_columns_keep_their_types() {
        let dir = tempfile::tempdir().unwrap();
        write_csv(
            dir.path(),
            "blank_years.csv",
            "Business,Year Founded,Opened
Kongo Gumi,,
Nishiyama Onsen,unknown,garbage
",
        );
        let plan = r#"{
            "name": "oldest_businesses",
            "tables": [{
                "file": "blank_years.csv",
                "table": "it_blank_years",
                "coerce": {"years": ["year_founded"], "dates": ["opened"]}
            }]
        }"#;

        run_plan(plan, dir.path()).await;

        assert_eq!(get_row_count("it_blank_years").await, 2);
        let columns = get_columns("it_blank_years").await;
        assert_eq!(
            columns[1],
            ("year_founded".to_string(), "bigint".to_string())
        );
        assert_eq!(
            columns[2],
            ("opened".to_string(), "timestamp without time zone".to_string())
        );
    }
}
