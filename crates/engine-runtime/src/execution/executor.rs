use crate::{
    error::LoadError,
    execution::prepare::{PreparedTable, prepare_all},
    report::summary::{ColumnSummary, LoadReport, TableSummary},
    writer::{
        bulk::write_bulk,
        explicit::{ExplicitTable, write_explicit},
    },
};
use chrono::Utc;
use connectors::sql::{base::adapter::SqlAdapter, postgres::adapter::PgAdapter};
use engine_core::{
    connection::{ConnectionConfig, connect_with_retry, ensure_database},
    retry::RetryPolicy,
};
use planner::{
    error::PlanError,
    plan::{LoadPlan, WriteMode},
};
use tracing::info;

pub async fn run(plan: &LoadPlan, config: &ConnectionConfig) -> Result<LoadReport, LoadError> {
    LoadExecutor::new(plan, config).execute().await
}

struct LoadExecutor<'a> {
    plan: &'a LoadPlan,
    config: &'a ConnectionConfig,
}

impl<'a> LoadExecutor<'a> {
    fn new(plan: &'a LoadPlan, config: &'a ConnectionConfig) -> Self {
        Self { plan, config }
    }

    fn retry_policy(&self) -> RetryPolicy {
        self.plan
            .retry
            .map(|r| RetryPolicy::new(r.max_attempts as usize, r.delay()))
            .unwrap_or_else(RetryPolicy::once)
    }

    async fn execute(self) -> Result<LoadReport, LoadError> {
        let started_at = Utc::now();
        info!("Running load plan '{}'", self.plan.name);

        let prepared = prepare_all(self.plan)?;

        if self.plan.database.ensure_exists {
            ensure_database(self.config, &self.plan.database.admin_database)
                .await
                .map_err(LoadError::EnsureDatabase)?;
        }

        let adapter = connect_with_retry(self.config, &self.retry_policy()).await?;
        let summaries = self.write_all(&adapter, prepared).await?;

        let mut tables = Vec::with_capacity(summaries.len());
        for (mut summary, sample_rows) in summaries {
            self.read_back(&adapter, &mut summary, sample_rows).await?;
            tables.push(summary);
        }

        info!("Load plan '{}' completed", self.plan.name);
        Ok(LoadReport {
            plan: self.plan.name.clone(),
            database: self.config.to_string(),
            started_at,
            finished_at: Utc::now(),
            tables,
        })
    }

    /// Bulk tables are written one by one in plan order. The explicit tables
    /// form a single unit, written where the first of them appears. Explicit
    /// rows are converted before anything is written.
    async fn write_all(
        &self,
        adapter: &PgAdapter,
        prepared: Vec<PreparedTable>,
    ) -> Result<Vec<(TableSummary, usize)>, LoadError> {
        let mut group = Vec::new();
        for table in prepared.iter().filter(|t| t.job.mode == WriteMode::Explicit) {
            let schema = table.job.schema.as_ref().ok_or_else(|| PlanError::InvalidSchema {
                table: table.table.clone(),
                message: "explicit tables need a schema".to_string(),
            })?;
            group.push(ExplicitTable::convert(&table.table, schema, &table.dataset)?);
        }
        let mut group = Some(group).filter(|g| !g.is_empty());

        let total = prepared.len();
        let mut summaries = Vec::with_capacity(total);

        for (idx, mut table) in prepared.into_iter().enumerate() {
            info!("Processing table {}/{}: {}", idx + 1, total, table.table);
            let columns = match table.job.mode {
                WriteMode::Bulk => {
                    let inferred = write_bulk(
                        adapter,
                        &table.table,
                        &mut table.dataset,
                        &table.coercions,
                    )
                    .await?;
                    inferred
                        .into_iter()
                        .map(|c| ColumnSummary {
                            name: c.name,
                            data_type: c.data_type,
                        })
                        .collect()
                }
                WriteMode::Explicit => {
                    if let Some(group) = group.take() {
                        write_explicit(adapter, group).await?;
                    }
                    table
                        .job
                        .schema
                        .iter()
                        .flat_map(|s| &s.columns)
                        .map(|c| ColumnSummary {
                            name: c.name.clone(),
                            data_type: c.data_type,
                        })
                        .collect()
                }
            };
            summaries.push(self.summarize(&table, columns));
        }

        Ok(summaries)
    }

    /// The summary of a written table, paired with how many rows to sample.
    fn summarize(
        &self,
        table: &PreparedTable,
        columns: Vec<ColumnSummary>,
    ) -> (TableSummary, usize) {
        let mut summary = TableSummary::from_dataset(
            &table.table,
            &self.plan.csv_path(&table.job).display().to_string(),
            table.job.mode,
            &table.dataset,
            columns,
            &table.job.summary,
        );
        summary.date_columns = table.coercions.date_columns.clone();
        summary.year_columns = table.coercions.year_columns.clone();
        (summary, table.job.summary.sample_rows)
    }

    async fn read_back(
        &self,
        adapter: &PgAdapter,
        summary: &mut TableSummary,
        limit: usize,
    ) -> Result<(), LoadError> {
        let count = adapter.count_rows(&summary.table).await?;
        info!("Loaded {count} rows into {} table", summary.table);
        summary.rows_in_database = Some(count);

        if limit > 0 {
            summary.sample_rows = adapter.sample_rows(&summary.table, limit).await?;
        }
        Ok(())
    }
}
