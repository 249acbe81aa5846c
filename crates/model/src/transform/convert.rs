use crate::{
    core::{data_type::DataType, value::Value},
    errors::ConversionError,
    transform::{coercion::parse_whole_number, date_parser::parse_datetime},
};
use rust_decimal::{Decimal, prelude::FromPrimitive};
use std::str::FromStr;

/// Converts a cell into the exact `Value` variant bound for a declared column
/// type. Nulls and blank cells become `Value::Null`.
pub fn convert_for_column(
    value: &Value,
    column: &str,
    data_type: DataType,
) -> Result<Value, ConversionError> {
    if value.is_null() {
        return Ok(Value::Null);
    }
    if let Value::String(s) = value
        && !data_type.is_text()
        && s.trim().is_empty()
    {
        return Ok(Value::Null);
    }

    let converted = match data_type {
        DataType::Short => whole(value).and_then(|v| i16::try_from(v).ok().map(Value::SmallInt)),
        DataType::Int => whole(value).and_then(|v| i32::try_from(v).ok().map(Value::Int32)),
        DataType::Long => whole(value).map(Value::Int),
        DataType::Float => value.as_f64().map(|v| Value::Real(v as f32)),
        DataType::Double => value.as_f64().map(Value::Float),
        DataType::Decimal => decimal(value).map(Value::Decimal),
        DataType::Boolean => boolean(value).map(Value::Boolean),
        DataType::Date => timestamp(value).map(|ts| Value::Date(ts.date())),
        DataType::Timestamp => timestamp(value).map(Value::TimestampNaive),
        DataType::VarChar | DataType::Char | DataType::String | DataType::Null => {
            value.as_string().map(Value::String)
        }
    };

    converted.ok_or_else(|| ConversionError {
        column: column.to_string(),
        value: value.to_string(),
        data_type,
    })
}

fn whole(value: &Value) -> Option<i64> {
    match value {
        Value::String(s) => parse_whole_number(s),
        Value::Real(f) => whole_float(*f as f64),
        Value::Float(f) => whole_float(*f),
        Value::Decimal(d) if !d.fract().is_zero() => None,
        other => other.as_i64(),
    }
}

fn whole_float(f: f64) -> Option<i64> {
    parse_whole_number(&f.to_string())
}

fn decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::Decimal(d) => Some(*d),
        Value::String(s) => {
            let s = s.trim();
            Decimal::from_str(s)
                .or_else(|_| Decimal::from_scientific(s))
                .ok()
        }
        Value::SmallInt(v) => Some(Decimal::from(*v)),
        Value::Int32(v) => Some(Decimal::from(*v)),
        Value::Int(v) => Some(Decimal::from(*v)),
        Value::Real(v) => Decimal::from_f32(*v),
        Value::Float(v) => Decimal::from_f64(*v),
        _ => None,
    }
}

fn boolean(value: &Value) -> Option<bool> {
    match value {
        Value::Boolean(b) => Some(*b),
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "t" | "yes" | "y" | "1" => Some(true),
            "false" | "f" | "no" | "n" | "0" => Some(false),
            _ => None,
        },
        other => other.as_i64().map(|v| v != 0),
    }
}

fn timestamp(value: &Value) -> Option<chrono::NaiveDateTime> {
    match value {
        Value::TimestampNaive(ts) => Some(*ts),
        Value::Date(d) => d.and_hms_opt(0, 0, 0),
        Value::String(s) => parse_datetime(s),
        _ => None,
    }
}
