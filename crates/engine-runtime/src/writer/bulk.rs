//! Replace a table with inferred column types: drop, create, COPY.

use crate::error::LoadError;
use connectors::sql::{base::transaction::Transaction, postgres::adapter::PgAdapter};
use model::{
    records::dataset::Dataset,
    transform::{
        coercion::CoercionOutcome,
        infer::{InferredColumn, infer_and_convert},
    },
};
use planner::query::generator::QueryGenerator;
use tracing::{error, info};

/// Writes `dataset` to `table` in one transaction and returns the column
/// types it was created with. The cells of `dataset` are converted in place.
pub async fn write_bulk(
    adapter: &PgAdapter,
    table: &str,
    dataset: &mut Dataset,
    coerced: &CoercionOutcome,
) -> Result<Vec<InferredColumn>, LoadError> {
    let columns = infer_and_convert(dataset, coerced);
    let generator = QueryGenerator::default();

    let mut client = adapter.lock_client().await;
    let tx = Transaction::begin(&mut client).await?;

    let result = async {
        adapter
            .exec_tx(&tx, &generator.drop_table_cascade(table))
            .await?;
        adapter
            .exec_tx(&tx, &generator.create_inferred_table(table, &columns))
            .await?;
        adapter
            .copy_rows(&tx, table, &dataset.columns, &dataset.rows)
            .await
    }
    .await;

    match result {
        Ok(copied) => {
            tx.commit().await?;
            info!("{copied} rows written to {table}");
            Ok(columns)
        }
        Err(err) => {
            error!("Writing {table} failed, rolling back: {err}");
            if let Err(rollback) = tx.rollback().await {
                error!("Rollback failed: {rollback}");
            }
            Err(err.into())
        }
    }
}
