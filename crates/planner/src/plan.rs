//! The JSON load plan: which CSV files go to which tables, and how.

use crate::error::PlanError;
use model::{
    core::{data_type::DataType, identifiers::table_name_from_path},
    transform::coercion::Coercions,
};
use serde::{Deserialize, Serialize};
use std::{
    collections::HashSet,
    path::{Path, PathBuf},
    time::Duration,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoadPlan {
    pub name: String,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    #[serde(default)]
    pub database: DatabaseDefaults,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry: Option<RetrySettings>,
    pub tables: Vec<TableJob>,
}

/// Literal connection defaults used when the matching `DB_*` variable is unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseDefaults {
    pub name: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub user: Option<String>,
    pub password: Option<String>,
    /// Create the target database through `admin_database` when it is missing.
    pub ensure_exists: bool,
    pub admin_database: String,
}

impl Default for DatabaseDefaults {
    fn default() -> Self {
        DatabaseDefaults {
            name: None,
            host: None,
            port: None,
            user: None,
            password: None,
            ensure_exists: false,
            admin_database: "postgres".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        RetrySettings {
            max_attempts: 5,
            delay_ms: 2000,
        }
    }
}

impl RetrySettings {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Inferred column types, drop + create + COPY.
    #[default]
    Bulk,
    /// Declared schema, drop + create with keys + row-by-row INSERT.
    Explicit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableJob {
    /// CSV file, relative to the plan's data directory.
    pub file: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
    #[serde(default)]
    pub mode: WriteMode,
    #[serde(default = "default_true")]
    pub normalize_columns: bool,
    #[serde(default, skip_serializing_if = "Coercions::is_empty")]
    pub coerce: Coercions,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<TableSchema>,
    #[serde(default)]
    pub summary: SummarySettings,
}

impl TableJob {
    pub fn bulk(file: impl Into<PathBuf>) -> Self {
        TableJob {
            file: file.into(),
            table: None,
            mode: WriteMode::Bulk,
            normalize_columns: true,
            coerce: Coercions::default(),
            schema: None,
            summary: SummarySettings::default(),
        }
    }

    /// Destination table: the explicit `table`, else the normalized file stem.
    pub fn table_name(&self) -> Result<String, PlanError> {
        match &self.table {
            Some(name) if !name.trim().is_empty() => Ok(name.clone()),
            Some(_) => Err(PlanError::TableName(self.file.display().to_string())),
            None => table_name_from_path(&self.file)
                .ok_or_else(|| PlanError::TableName(self.file.display().to_string())),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TableSchema {
    pub columns: Vec<ColumnSpec>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKeySpec>,
}

impl TableSchema {
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }
}

/// A declared column. In JSON the type is written the way it would be in
/// SQL, e.g. `{"name": "loan_type", "type": "VARCHAR(20)"}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawColumnSpec", into = "RawColumnSpec")]
pub struct ColumnSpec {
    pub name: String,
    pub data_type: DataType,
    pub max_length: Option<usize>,
    pub nullable: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawColumnSpec {
    name: String,
    #[serde(rename = "type")]
    data_type: String,
    #[serde(default = "default_true")]
    nullable: bool,
}

impl TryFrom<RawColumnSpec> for ColumnSpec {
    type Error = String;

    fn try_from(raw: RawColumnSpec) -> Result<Self, Self::Error> {
        let (data_type, max_length) = DataType::parse_declared(&raw.data_type)
            .map_err(|e| format!("column '{}': {e}", raw.name))?;
        Ok(ColumnSpec {
            name: raw.name,
            data_type,
            max_length,
            nullable: raw.nullable,
        })
    }
}

impl From<ColumnSpec> for RawColumnSpec {
    fn from(spec: ColumnSpec) -> Self {
        let mut data_type = spec.data_type.postgres_name().into_owned();
        if let Some(len) = spec.max_length {
            data_type = format!("{data_type}({len})");
        }
        RawColumnSpec {
            name: spec.name,
            data_type,
            nullable: spec.nullable,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ForeignKeySpec {
    pub columns: Vec<String>,
    pub references: String,
    pub referenced_columns: Vec<String>,
}

/// What to report about a table once it is loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SummarySettings {
    pub distinct: Vec<String>,
    pub sums: Vec<String>,
    pub value_counts: Vec<ValueCount>,
    pub null_counts: Vec<String>,
    pub sample_rows: usize,
}

impl Default for SummarySettings {
    fn default() -> Self {
        SummarySettings {
            distinct: Vec::new(),
            sums: Vec::new(),
            value_counts: Vec::new(),
            null_counts: Vec::new(),
            sample_rows: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValueCount {
    pub column: String,
    pub value: String,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("data")
}

fn default_true() -> bool {
    true
}

pub fn parse(source: &str) -> Result<LoadPlan, PlanError> {
    let plan: LoadPlan = serde_json::from_str(source)?;
    plan.validate()?;
    Ok(plan)
}

impl LoadPlan {
    /// A plan that loads every given file with the bulk writer and the
    /// default year coercions.
    pub fn discover(
        name: &str,
        data_dir: &Path,
        files: &[PathBuf],
        database: DatabaseDefaults,
        retry: Option<RetrySettings>,
    ) -> Result<Self, PlanError> {
        let tables = files
            .iter()
            .map(|file| {
                let relative = file.strip_prefix(data_dir).unwrap_or(file.as_path());
                TableJob {
                    coerce: Coercions::discover_defaults(),
                    ..TableJob::bulk(relative)
                }
            })
            .collect();

        let plan = LoadPlan {
            name: name.to_string(),
            data_dir: data_dir.to_path_buf(),
            database,
            retry,
            tables,
        };
        plan.validate()?;
        Ok(plan)
    }

    pub fn csv_path(&self, job: &TableJob) -> PathBuf {
        self.data_dir.join(&job.file)
    }

    pub fn validate(&self) -> Result<(), PlanError> {
        if self.tables.is_empty() {
            return Err(PlanError::Empty(self.name.clone()));
        }

        if let Some(retry) = &self.retry
            && retry.max_attempts == 0
        {
            return Err(PlanError::InvalidRetry(
                "max_attempts must be at least 1".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        // Explicit tables already validated, for foreign key lookups.
        let mut explicit: Vec<(String, &TableSchema)> = Vec::new();

        for job in &self.tables {
            let table = job.table_name()?;
            if !seen.insert(table.clone()) {
                return Err(PlanError::DuplicateTable(table));
            }

            match (job.mode, &job.schema) {
                (WriteMode::Explicit, Some(schema)) => {
                    validate_schema(&table, schema, &explicit)?;
                    explicit.push((table, schema));
                }
                (WriteMode::Explicit, None) => {
                    return Err(invalid(&table, "explicit tables need a schema"));
                }
                (WriteMode::Bulk, Some(_)) => {
                    return Err(invalid(&table, "bulk tables infer their schema"));
                }
                (WriteMode::Bulk, None) => {}
            }
        }

        Ok(())
    }
}

fn invalid(table: &str, message: impl Into<String>) -> PlanError {
    PlanError::InvalidSchema {
        table: table.to_string(),
        message: message.into(),
    }
}

fn validate_schema(
    table: &str,
    schema: &TableSchema,
    earlier: &[(String, &TableSchema)],
) -> Result<(), PlanError> {
    if schema.columns.is_empty() {
        return Err(invalid(table, "no columns declared"));
    }

    let mut names = HashSet::new();
    for column in &schema.columns {
        if column.name.is_empty() {
            return Err(invalid(table, "empty column name"));
        }
        if !names.insert(column.name.as_str()) {
            return Err(invalid(table, format!("duplicate column '{}'", column.name)));
        }
    }

    for key in &schema.primary_key {
        if !names.contains(key.as_str()) {
            return Err(invalid(table, format!("primary key column '{key}' is not declared")));
        }
    }

    for fk in &schema.foreign_keys {
        if fk.columns.is_empty() || fk.columns.len() != fk.referenced_columns.len() {
            return Err(invalid(
                table,
                format!("foreign key to '{}' has mismatched column lists", fk.references),
            ));
        }
        if let Some(missing) = fk.columns.iter().find(|c| !names.contains(c.as_str())) {
            return Err(invalid(table, format!("foreign key column '{missing}' is not declared")));
        }

        let Some((_, target)) = earlier.iter().find(|(name, _)| *name == fk.references) else {
            return Err(invalid(
                table,
                format!(
                    "foreign key references '{}', which must be an explicit table listed earlier",
                    fk.references
                ),
            ));
        };
        if let Some(missing) = fk
            .referenced_columns
            .iter()
            .find(|c| target.column(c).is_none())
        {
            return Err(invalid(
                table,
                format!("'{}' has no column '{missing}'", fk.references),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const LENDING: &str = r#"{
        "name": "lending",
        "retry": {},
        "tables": [
            {
                "file": "client.csv",
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
                "mode": "explicit",
                "schema": {
                    "columns": [
                        {"name": "loan_id", "type": "integer", "nullable": false},
                        {"name": "client_id", "type": "INTEGER"},
                        {"name": "principal_amount", "type": "NUMERIC"}
                    ],
                    "primary_key": ["loan_id"],
                    "foreign_keys": [
                        {"columns": ["client_id"], "references": "client", "referenced_columns": ["client_id"]}
                    ]
                },
                "summary": {"sample_rows": 5}
            }
        ]
    }"#;

    #[test]
    fn test_parse_explicit_plan() {
        let plan = parse(LENDING).unwrap();

        assert_eq!(plan.data_dir, PathBuf::from("data"));
        assert_eq!(plan.retry, Some(RetrySettings::default()));
        assert_eq!(plan.retry.unwrap().delay(), Duration::from_secs(2));
        assert_eq!(plan.database.admin_database, "postgres");
        assert!(!plan.database.ensure_exists);

        let client = &plan.tables[0];
        assert_eq!(client.table_name().unwrap(), "client");
        assert!(client.normalize_columns);
        let schema = client.schema.as_ref().unwrap();
        assert_eq!(schema.columns[1].data_type, DataType::VarChar);
        assert_eq!(schema.columns[1].max_length, Some(20));
        assert!(schema.columns[1].nullable);
        assert!(!schema.columns[0].nullable);

        assert_eq!(plan.tables[1].summary.sample_rows, 5);
        assert_eq!(plan.tables[0].summary.sample_rows, 3);
    }

    #[test]
    fn test_foreign_key_must_reference_earlier_table() {
        let mut plan = parse(LENDING).unwrap();
        plan.tables.reverse();

        let err = plan.validate().unwrap_err();
        assert!(matches!(err, PlanError::InvalidSchema { ref table, .. } if table == "loan"));
    }

    #[test]
    fn test_rejects_bad_plans() {
        assert!(matches!(
            parse(r#"{"name": "x", "tables": []}"#),
            Err(PlanError::Empty(_))
        ));
        assert!(matches!(
            parse(r#"{"name": "x", "tables": [{"file": "a.csv"}, {"file": "A.csv"}]}"#),
            Err(PlanError::DuplicateTable(t)) if t == "a"
        ));
        assert!(matches!(
            parse(r#"{"name": "x", "tables": [{"file": "a.csv", "mode": "explicit"}]}"#),
            Err(PlanError::InvalidSchema { .. })
        ));
        assert!(matches!(
            parse(r#"{"name": "x", "retry": {"max_attempts": 0}, "tables": [{"file": "a.csv"}]}"#),
            Err(PlanError::InvalidRetry(_))
        ));
        assert!(matches!(
            parse(r#"{"name": "x", "tables": [{"file": "a.csv", "colour": "red"}]}"#),
            Err(PlanError::Parse(_))
        ));
        assert!(matches!(
            parse(
                r#"{"name": "x", "tables": [{"file": "a.csv", "mode": "explicit",
                    "schema": {"columns": [{"name": "n", "type": "NUMERIC(10,2)"}]}}]}"#
            ),
            Err(PlanError::Parse(_))
        ));
    }

    #[test]
    fn test_table_name_defaults_to_file_stem() {
        let job = TableJob::bulk("Oldest Businesses.csv");
        assert_eq!(job.table_name().unwrap(), "oldest_businesses");

        let named = TableJob {
            table: Some("journeys".into()),
            ..TableJob::bulk("TFL.JOURNEYS.csv")
        };
        assert_eq!(named.table_name().unwrap(), "journeys");
    }

    #[test]
    fn test_discover_builds_bulk_jobs() {
        let dir = Path::new("data");
        let files = vec![dir.join("businesses.csv"), dir.join("categories.csv")];
        let plan = LoadPlan::discover(
            "Oldest_Businesses_DB",
            dir,
            &files,
            DatabaseDefaults::default(),
            None,
        )
        .unwrap();

        assert_eq!(plan.tables.len(), 2);
        assert_eq!(plan.tables[0].file, PathBuf::from("businesses.csv"));
        assert_eq!(plan.tables[1].mode, WriteMode::Bulk);
        assert_eq!(plan.tables[1].coerce, Coercions::discover_defaults());
        assert_eq!(plan.csv_path(&plan.tables[0]), dir.join("businesses.csv"));
    }

    #[test]
    fn test_plan_serializes_back_to_parseable_json() {
        let plan = parse(LENDING).unwrap();
        let json = serde_json::to_string_pretty(&plan).unwrap();
        assert!(json.contains(r#""type": "VARCHAR(20)""#));
        assert_eq!(parse(&json).unwrap(), plan);
    }

    #[test]
    fn test_bundled_plans_are_valid() {
        let plans = [
            include_str!("../../../plans/motorcycle_parts.json"),
            include_str!("../../../plans/students_mental_health.json"),
            include_str!("../../../plans/unicorn_companies.json"),
            include_str!("../../../plans/superstore.json"),
            include_str!("../../../plans/grocery_store.json"),
            include_str!("../../../plans/loan_insights.json"),
            include_str!("../../../plans/manufacturing_process.json"),
            include_str!("../../../plans/london_travel.json"),
            include_str!("../../../plans/student_performance.json"),
            include_str!("../../../plans/goodthought_ngo.json"),
            include_str!("../../../plans/hotel_operations.json"),
        ];
        for source in plans {
            let plan = parse(source).unwrap();
            assert!(!plan.tables.is_empty(), "{}", plan.name);
        }

        let tfl = parse(plans[7]).unwrap();
        assert_eq!(tfl.tables[0].table_name().unwrap(), "journeys");
        assert_eq!(tfl.database.port, Some(5439));

        let lending = parse(plans[5]).unwrap();
        let loan = lending.tables[2].schema.as_ref().unwrap();
        assert_eq!(loan.foreign_keys.len(), 2);

        let performance = parse(plans[8]).unwrap();
        let schema = performance.tables[0].schema.as_ref().unwrap();
        assert_eq!(schema.column("attendance").unwrap().data_type, DataType::Double);
        assert_eq!(schema.column("gender").unwrap().max_length, Some(10));
    }
}
