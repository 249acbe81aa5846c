use chrono::{DateTime, Utc};
use model::{core::data_type::DataType, records::dataset::Dataset};
use planner::plan::{SummarySettings, WriteMode};
use serde::Serialize;

#[derive(Serialize, Debug, Clone)]
pub struct LoadReport {
    pub plan: String,
    pub database: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub tables: Vec<TableSummary>,
}

impl LoadReport {
    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows_read).sum()
    }
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct DistinctValues {
    pub column: String,
    pub values: Vec<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ColumnTotal {
    pub column: String,
    pub value: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct ValueCountResult {
    pub column: String,
    pub value: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct NullCount {
    pub column: String,
    pub count: usize,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TableSummary {
    pub table: String,
    pub file: String,
    pub mode: WriteMode,
    pub rows_read: usize,
    pub rows_in_database: Option<i64>,
    pub columns: Vec<ColumnSummary>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub year_columns: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub distinct: Vec<DistinctValues>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sums: Vec<ColumnTotal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub value_counts: Vec<ValueCountResult>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub null_counts: Vec<NullCount>,
    pub sample_rows: Vec<serde_json::Value>,
}

impl TableSummary {
    /// Computes everything that can be read off the loaded dataset. Columns
    /// named in `settings` but absent from the dataset are skipped.
    /// `rows_in_database` and `sample_rows` are filled in after the write.
    pub fn from_dataset(
        table: &str,
        file: &str,
        mode: WriteMode,
        dataset: &Dataset,
        columns: Vec<ColumnSummary>,
        settings: &SummarySettings,
    ) -> Self {
        let distinct = settings
            .distinct
            .iter()
            .filter_map(|column| {
                let values = dataset.distinct_values(column)?;
                Some(DistinctValues {
                    column: column.clone(),
                    values: values.iter().map(|v| v.to_string()).collect(),
                })
            })
            .collect();

        let sums = settings
            .sums
            .iter()
            .filter_map(|column| {
                Some(ColumnTotal {
                    column: column.clone(),
                    value: dataset.sum(column)?,
                })
            })
            .collect();

        let value_counts = settings
            .value_counts
            .iter()
            .filter_map(|vc| {
                Some(ValueCountResult {
                    column: vc.column.clone(),
                    value: vc.value.clone(),
                    count: dataset.count_equal(&vc.column, &vc.value)?,
                })
            })
            .collect();

        let null_counts = settings
            .null_counts
            .iter()
            .filter_map(|column| {
                Some(NullCount {
                    column: column.clone(),
                    count: dataset.null_count(column)?,
                })
            })
            .collect();

        TableSummary {
            table: table.to_string(),
            file: file.to_string(),
            mode,
            rows_read: dataset.row_count(),
            rows_in_database: None,
            columns,
            date_columns: Vec::new(),
            year_columns: Vec::new(),
            distinct,
            sums,
            value_counts,
            null_counts,
            sample_rows: Vec::new(),
        }
    }
}
