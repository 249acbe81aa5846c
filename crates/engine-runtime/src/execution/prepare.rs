use crate::error::LoadError;
use connectors::file::csv::reader::CsvReader;
use model::{records::dataset::Dataset, transform::coercion::CoercionOutcome};
use planner::plan::{LoadPlan, TableJob};
use tracing::info;

/// A CSV read, renamed and coerced, ready to be written.
#[derive(Debug, Clone)]
pub struct PreparedTable {
    pub table: String,
    pub job: TableJob,
    pub dataset: Dataset,
    pub coercions: CoercionOutcome,
}

pub fn prepare_table(plan: &LoadPlan, job: &TableJob) -> Result<PreparedTable, LoadError> {
    let table = job.table_name()?;
    let path = plan.csv_path(job);
    info!("Loading {} -> {}", path.display(), table);

    let mut dataset = CsvReader::default()
        .read_path(&path, &table)
        .map_err(|source| LoadError::File {
            path: path.display().to_string(),
            source,
        })?;

    if job.normalize_columns {
        dataset.normalize_columns()?;
    } else {
        dataset.check_unique_columns()?;
    }
    let coercions = job.coerce.apply(&mut dataset);

    info!(
        "Read {} rows from {} ({} columns)",
        dataset.row_count(),
        path.display(),
        dataset.columns.len()
    );

    Ok(PreparedTable {
        table,
        job: job.clone(),
        dataset,
        coercions,
    })
}

/// Reads every CSV of the plan before anything is written.
pub fn prepare_all(plan: &LoadPlan) -> Result<Vec<PreparedTable>, LoadError> {
    plan.tables
        .iter()
        .map(|job| prepare_table(plan, job))
        .collect()
}
