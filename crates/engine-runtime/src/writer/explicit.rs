//! Replace a group of tables with declared schemas and keys, inserting row
//! by row, all inside one transaction.

use crate::error::LoadError;
use connectors::sql::{base::transaction::Transaction, postgres::adapter::PgAdapter};
use model::{
    core::{data_type::DataType, value::Value},
    records::dataset::Dataset,
    transform::convert::convert_for_column,
};
use planner::{plan::TableSchema, query::generator::QueryGenerator};
use tracing::{error, info};

/// One table of the group, with its rows already in declared column types.
#[derive(Debug, Clone)]
pub struct ExplicitTable {
    pub table: String,
    pub schema: TableSchema,
    pub rows: Vec<Vec<Value>>,
}

impl ExplicitTable {
    /// Picks the declared columns out of `dataset` and converts every cell.
    /// Extra CSV columns are ignored; a missing declared column is an error.
    pub fn convert(
        table: &str,
        schema: &TableSchema,
        dataset: &Dataset,
    ) -> Result<Self, LoadError> {
        let indices = schema
            .columns
            .iter()
            .map(|column| {
                dataset
                    .column_index(&column.name)
                    .ok_or_else(|| LoadError::MissingColumn {
                        table: table.to_string(),
                        column: column.name.clone(),
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let rows = dataset
            .rows
            .iter()
            .map(|row| {
                schema
                    .columns
                    .iter()
                    .zip(&indices)
                    .map(|(column, &idx)| convert_for_column(&row[idx], &column.name, column.data_type))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()
            .map_err(|source| LoadError::Conversion {
                table: table.to_string(),
                source,
            })?;

        Ok(ExplicitTable {
            table: table.to_string(),
            schema: schema.clone(),
            rows,
        })
    }

    fn types(&self) -> Vec<DataType> {
        self.schema.columns.iter().map(|c| c.data_type).collect()
    }
}

/// Drops every table in reverse order, recreates them in order and inserts
/// their rows. Any failure rolls back the whole group.
pub async fn write_explicit(
    adapter: &PgAdapter,
    tables: Vec<ExplicitTable>,
) -> Result<Vec<(String, u64)>, LoadError> {
    if tables.is_empty() {
        return Ok(Vec::new());
    }

    let generator = QueryGenerator::default();
    let mut client = adapter.lock_client().await;
    let tx = Transaction::begin(&mut client).await?;

    let result = async {
        for t in tables.iter().rev() {
            adapter
                .exec_tx(&tx, &generator.drop_table_cascade(&t.table))
                .await?;
        }

        for t in &tables {
            adapter
                .exec_tx(&tx, &generator.create_table(&t.table, &t.schema))
                .await?;
            info!("Created {} table", t.table);
        }

        let mut inserted = Vec::with_capacity(tables.len());
        for t in tables {
            let types = t.types();
            let count = adapter
                .insert_rows(&tx, &t.table, &t.schema.column_names(), &types, t.rows)
                .await?;
            inserted.push((t.table, count));
        }
        Ok::<_, LoadError>(inserted)
    }
    .await;

    match result {
        Ok(inserted) => {
            tx.commit().await?;
            for (table, count) in &inserted {
                info!("{count} rows inserted into {table}");
            }
            Ok(inserted)
        }
        Err(err) => {
            error!("Error loading data, rolling back: {err}");
            if let Err(rollback) = tx.rollback().await {
                error!("Rollback failed: {rollback}");
            }
            Err(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use planner::plan::ColumnSpec;

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    fn contract_schema() -> TableSchema {
        TableSchema {
            columns: vec![
                ColumnSpec {
                    name: "contract_id".into(),
                    data_type: DataType::Int,
                    max_length: None,
                    nullable: false,
                },
                ColumnSpec {
                    name: "contract_date".into(),
                    data_type: DataType::Date,
                    max_length: None,
                    nullable: true,
                },
            ],
            primary_key: vec!["contract_id".into()],
            foreign_keys: Vec::new(),
        }
    }

    fn contracts(rows: &[[&str; 3]]) -> Dataset {
        let mut ds = Dataset::new(
            "contract",
            vec!["contract_date".into(), "contract_id".into(), "notes".into()],
        );
        for row in rows {
            ds.push_row(
                row.iter()
                    .map(|c| if c.is_empty() { Value::Null } else { s(c) })
                    .collect(),
            );
        }
        ds
    }

    #[test]
    fn test_convert_reorders_and_types_cells() {
        let ds = contracts(&[["2022-01-15", "1", "first"], ["", "2", ""]]);
        let table = ExplicitTable::convert("contract", &contract_schema(), &ds).unwrap();

        let date = NaiveDate::from_ymd_opt(2022, 1, 15).unwrap();
        assert_eq!(table.rows[0], vec![Value::Int32(1), Value::Date(date)]);
        assert_eq!(table.rows[1], vec![Value::Int32(2), Value::Null]);
        assert_eq!(table.types(), vec![DataType::Int, DataType::Date]);
    }

    #[test]
    fn test_unconvertible_value_is_fatal() {
        let ds = contracts(&[["2022-01-15", "abc", ""]]);
        let err = ExplicitTable::convert("contract", &contract_schema(), &ds).unwrap_err();

        match err {
            LoadError::Conversion { table, source } => {
                assert_eq!(table, "contract");
                assert_eq!(source.column, "contract_id");
                assert_eq!(source.value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_declared_column() {
        let ds = Dataset::new("contract", vec!["contract_id".into()]);
        let err = ExplicitTable::convert("contract", &contract_schema(), &ds).unwrap_err();
        assert!(matches!(
            err,
            LoadError::MissingColumn { ref column, .. } if column == "contract_date"
        ));
    }
}
