use crate::{
    core::{data_type::DataType, value::Value},
    records::dataset::Dataset,
    transform::coercion::CoercionOutcome,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InferredColumn {
    pub name: String,
    pub data_type: DataType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Empty,
    Long,
    Double,
    Boolean,
    Timestamp,
    Text,
}

impl Kind {
    fn of(value: &Value) -> Kind {
        match value {
            Value::Null => Kind::Empty,
            Value::SmallInt(_) | Value::Int32(_) | Value::Int(_) => Kind::Long,
            Value::Real(_) | Value::Float(_) | Value::Decimal(_) => Kind::Double,
            Value::Boolean(_) => Kind::Boolean,
            Value::Date(_) | Value::TimestampNaive(_) => Kind::Timestamp,
            Value::String(s) => Kind::of_text(s),
        }
    }

    fn of_text(raw: &str) -> Kind {
        let s = raw.trim();
        if s.parse::<i64>().is_ok() {
            Kind::Long
        } else if s.bytes().any(|b| b.is_ascii_digit()) && s.parse::<f64>().is_ok() {
            Kind::Double
        } else if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") {
            Kind::Boolean
        } else {
            Kind::Text
        }
    }

    fn merge(self, other: Kind) -> Kind {
        use Kind::*;
        match (self, other) {
            (Empty, k) | (k, Empty) => k,
            (a, b) if a == b => a,
            (Long, Double) | (Double, Long) => Double,
            _ => Text,
        }
    }

    fn data_type(self) -> DataType {
        match self {
            Kind::Long => DataType::Long,
            Kind::Double => DataType::Double,
            Kind::Boolean => DataType::Boolean,
            Kind::Timestamp => DataType::Timestamp,
            Kind::Empty | Kind::Text => DataType::String,
        }
    }
}

/// Picks the column type the bulk writer creates for a run of values.
pub fn infer_column_type<'a>(values: impl IntoIterator<Item = &'a Value>) -> DataType {
    let mut kind = Kind::Empty;
    for value in values {
        kind = kind.merge(Kind::of(value));
        if kind == Kind::Text {
            break;
        }
    }
    kind.data_type()
}

/// Coerced date columns are always `TIMESTAMP` and year columns `BIGINT`,
/// even when every cell ended up null.
pub fn infer_schema(dataset: &Dataset, coerced: &CoercionOutcome) -> Vec<InferredColumn> {
    dataset
        .columns
        .iter()
        .enumerate()
        .map(|(idx, name)| {
            let data_type = if coerced.date_columns.contains(name) {
                DataType::Timestamp
            } else if coerced.year_columns.contains(name) {
                DataType::Long
            } else {
                infer_column_type(dataset.rows.iter().map(|row| &row[idx]))
            };
            InferredColumn {
                name: name.clone(),
                data_type,
            }
        })
        .collect()
}

/// Infers every column type and rewrites the cells to match it.
pub fn infer_and_convert(dataset: &mut Dataset, coerced: &CoercionOutcome) -> Vec<InferredColumn> {
    let schema = infer_schema(dataset, coerced);
    for row in &mut dataset.rows {
        for (cell, column) in row.iter_mut().zip(&schema) {
            let value = std::mem::replace(cell, Value::Null);
            *cell = convert_inferred(value, column.data_type);
        }
    }
    schema
}

fn convert_inferred(value: Value, data_type: DataType) -> Value {
    match (value, data_type) {
        (Value::Null, _) => Value::Null,
        (Value::String(s), DataType::Long) => {
            s.trim().parse::<i64>().map_or(Value::Null, Value::Int)
        }
        (Value::String(s), DataType::Double) => {
            s.trim().parse::<f64>().map_or(Value::Null, Value::Float)
        }
        (Value::String(s), DataType::Boolean) => {
            Value::Boolean(s.trim().eq_ignore_ascii_case("true"))
        }
        (v, DataType::Long) => v.as_i64().map_or(Value::Null, Value::Int),
        (v, DataType::Double) => v.as_f64().map_or(Value::Null, Value::Float),
        (Value::Date(d), DataType::Timestamp) => {
            d.and_hms_opt(0, 0, 0).map_or(Value::Null, Value::TimestampNaive)
        }
        (v @ Value::String(_), _) => v,
        (v, DataType::String) => Value::String(v.to_string()),
        (v, _) => v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn s(v: &str) -> Value {
        Value::String(v.into())
    }

    #[test]
    fn test_numeric_columns() {
        assert_eq!(infer_column_type(&[s("1"), Value::Null, s(" 42")]), DataType::Long);
        assert_eq!(infer_column_type(&[s("1"), s("2.5")]), DataType::Double);
        assert_eq!(infer_column_type(&[s("1e3"), s("7")]), DataType::Double);
    }

    #[test]
    fn test_text_wins_on_mixed_values() {
        assert_eq!(infer_column_type(&[s("1"), s("abc")]), DataType::String);
        assert_eq!(infer_column_type(&[s("true"), s("1")]), DataType::String);
        assert_eq!(infer_column_type(&[s("nan")]), DataType::String);
        assert_eq!(infer_column_type(&[Value::Null, Value::Null]), DataType::String);
    }

    #[test]
    fn test_booleans_and_coerced_values() {
        assert_eq!(infer_column_type(&[s("True"), s("FALSE")]), DataType::Boolean);
        assert_eq!(infer_column_type(&[Value::Int(1999), Value::Null]), DataType::Long);
    }

    #[test]
    fn test_infer_and_convert_rewrites_cells() {
        let mut ds = Dataset::new("t", vec!["id".into(), "price".into(), "name".into()]);
        ds.push_row(vec![s("1"), s("9.99"), s("Widget")]);
        ds.push_row(vec![s("2"), Value::Null, s("42")]);

        let schema = infer_and_convert(&mut ds, &CoercionOutcome::default());
        let types = schema.iter().map(|c| c.data_type).collect::<Vec<_>>();
        assert_eq!(types, vec![DataType::Long, DataType::Double, DataType::String]);
        assert_eq!(ds.rows[0], vec![Value::Int(1), Value::Float(9.99), s("Widget")]);
        assert_eq!(ds.rows[1], vec![Value::Int(2), Value::Null, s("42")]);
    }

    #[test]
    fn test_coerced_columns_keep_their_type_when_all_null() {
        use crate::transform::coercion::Coercions;

        let mut ds = Dataset::new(
            "businesses",
            vec!["business".into(), "year_founded".into(), "opened".into()],
        );
        ds.push_row(vec![s("A"), Value::Null, s("garbage")]);
        ds.push_row(vec![s("B"), s("unknown"), Value::Null]);

        let coercions = Coercions {
            dates: vec!["opened".into()],
            ..Coercions::discover_defaults()
        };
        let outcome = coercions.apply(&mut ds);

        let schema = infer_and_convert(&mut ds, &outcome);
        let types = schema.iter().map(|c| c.data_type).collect::<Vec<_>>();
        assert_eq!(
            types,
            vec![DataType::String, DataType::Long, DataType::Timestamp]
        );
        assert_eq!(ds.rows[0][1], Value::Null);
        assert_eq!(ds.rows[1][2], Value::Null);
    }
}
