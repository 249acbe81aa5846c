#![allow(dead_code)]

use super::{pg_adapter, test_connection_config};
use connectors::sql::base::adapter::SqlAdapter;
use engine_runtime::{error::LoadError, execution::executor::run, report::summary::LoadReport};
use planner::plan::{LoadPlan, parse};
use std::path::{Path, PathBuf};

/// Writes a CSV fixture into `dir` and returns its path.
pub fn write_csv(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).expect("write csv fixture");
    path
}

/// Parses a plan and points it at `data_dir`.
pub fn plan_in(json: &str, data_dir: &Path) -> LoadPlan {
    let mut plan = parse(json).expect("parse plan");
    plan.data_dir = data_dir.to_path_buf();
    plan
}

pub async fn try_run_plan(json: &str, data_dir: &Path) -> Result<LoadReport, LoadError> {
    let plan = plan_in(json, data_dir);
    run(&plan, &test_connection_config()).await
}

/// Runs the plan, panicking on any error
pub async fn run_plan(json: &str, data_dir: &Path) -> LoadReport {
    try_run_plan(json, data_dir).await.expect("load ran")
}

pub async fn execute(sql: &str) {
    pg_adapter().await.exec(sql).await.expect("execute sql");
}

pub async fn get_row_count(table: &str) -> i64 {
    pg_adapter()
        .await
        .count_rows(table)
        .await
        .expect("count rows")
}

/// Assert that a table exists (or not) in the public schema
pub async fn assert_table_exists(table: &str, should: bool) {
    let adapter = pg_adapter().await;
    let client = adapter.lock_client().await;
    let row = client
        .query_one(
            "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
             WHERE table_schema = 'public' AND table_name = $1)",
            &[&table],
        )
        .await
        .expect("query information_schema");
    let exists: bool = row.get(0);
    assert_eq!(
        exists, should,
        "expected table '{table}' existence == {should}"
    );
}

/// Column names and Postgres types, in table order.
pub async fn get_columns(table: &str) -> Vec<(String, String)> {
    let adapter = pg_adapter().await;
    let client = adapter.lock_client().await;
    client
        .query(
            "SELECT column_name::text, data_type::text FROM information_schema.columns \
             WHERE table_schema = 'public' AND table_name = $1 ORDER BY ordinal_position",
            &[&table],
        )
        .await
        .expect("query columns")
        .iter()
        .map(|row| (row.get(0), row.get(1)))
        .collect()
}

/// First column of every row of `query`, read as text.
pub async fn fetch_strings(query: &str) -> Vec<Option<String>> {
    let adapter = pg_adapter().await;
    let client = adapter.lock_client().await;
    client
        .query(query, &[])
        .await
        .expect("fetch rows")
        .iter()
        .map(|row| row.get(0))
        .collect()
}
