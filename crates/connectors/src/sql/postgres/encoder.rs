use crate::sql::base::encoder::CopyValueEncoder;
use model::core::{
    utils::escape_csv_string,
    value::{TIMESTAMP_FORMAT, Value},
};

#[derive(Debug, Default)]
pub struct PgCopyValueEncoder;

impl PgCopyValueEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl CopyValueEncoder for PgCopyValueEncoder {
    fn encode_value(&self, value: &Value) -> String {
        match value {
            Value::Null => self.encode_null(),
            // Quoted, so a literal "\N" string is not read back as NULL.
            Value::String(s) => escape_csv_string(s),
            Value::Boolean(v) => v.to_string(),
            Value::SmallInt(v) => v.to_string(),
            Value::Int32(v) => v.to_string(),
            Value::Int(v) => v.to_string(),
            Value::Real(v) => ryu::Buffer::new().format(*v).to_string(),
            Value::Float(v) => ryu::Buffer::new().format(*v).to_string(),
            Value::Decimal(v) => v.to_string(),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::TimestampNaive(ts) => ts.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    fn encode_null(&self) -> String {
        "\\N".to_string()
    }
}
