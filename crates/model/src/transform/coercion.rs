use crate::{
    core::value::Value, records::dataset::Dataset, transform::date_parser::parse_datetime,
};
use serde::{Deserialize, Serialize};

/// Per-table value coercions applied after header normalization. Columns that
/// are not present in the dataset are skipped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Coercions {
    /// Columns parsed into timestamps; unparsable cells become null.
    pub dates: Vec<String>,
    /// Columns coerced into nullable integers.
    pub years: Vec<String>,
    /// Any column whose name ends with one of these is treated as a year column.
    pub year_suffixes: Vec<String>,
}

/// What `Coercions::apply` touched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoercionOutcome {
    pub date_columns: Vec<String>,
    pub year_columns: Vec<String>,
}

impl Coercions {
    /// The year handling used when loading a whole directory without a plan.
    pub fn discover_defaults() -> Self {
        Coercions {
            dates: Vec::new(),
            years: Vec::new(),
            year_suffixes: vec!["year".into(), "year_founded".into()],
        }
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.years.is_empty() && self.year_suffixes.is_empty()
    }

    pub fn apply(&self, dataset: &mut Dataset) -> CoercionOutcome {
        let mut outcome = CoercionOutcome::default();

        for column in &self.dates {
            if dataset.map_column(column, coerce_date) {
                outcome.date_columns.push(column.clone());
            }
        }

        let year_columns = dataset
            .columns
            .iter()
            .filter(|c| !self.dates.contains(c))
            .filter(|c| {
                self.years.contains(c) || self.year_suffixes.iter().any(|s| c.ends_with(s.as_str()))
            })
            .cloned()
            .collect::<Vec<_>>();

        for column in year_columns {
            dataset.map_column(&column, coerce_year);
            outcome.year_columns.push(column);
        }

        outcome
    }
}

pub fn coerce_date(value: Value) -> Value {
    match value {
        Value::String(s) => parse_datetime(&s).map_or(Value::Null, Value::TimestampNaive),
        Value::Date(d) => d.and_hms_opt(0, 0, 0).map_or(Value::Null, Value::TimestampNaive),
        ts @ Value::TimestampNaive(_) => ts,
        _ => Value::Null,
    }
}

pub fn coerce_year(value: Value) -> Value {
    match value {
        Value::String(s) => parse_whole_number(&s).map_or(Value::Null, Value::Int),
        Value::SmallInt(v) => Value::Int(v as i64),
        Value::Int32(v) => Value::Int(v as i64),
        v @ Value::Int(_) => v,
        Value::Float(f) => whole_f64(f).map_or(Value::Null, Value::Int),
        _ => Value::Null,
    }
}

/// Integer text, or float text with no fractional part (`"1999.0"`).
pub fn parse_whole_number(raw: &str) -> Option<i64> {
    let s = raw.trim();
    if let Ok(v) = s.parse::<i64>() {
        return Some(v);
    }
    if !s.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse::<f64>().ok().and_then(whole_f64)
}

fn whole_f64(f: f64) -> Option<i64> {
    if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Some(f as i64)
    } else {
        None
    }
}
