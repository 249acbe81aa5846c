use model::core::{data_type::DataType, value::Value};
use tokio_postgres::types::ToSql;

pub struct PgParam(Box<dyn ToSql + Sync + Send>);

impl PgParam {
    pub fn from_value(value: Value) -> Self {
        match value {
            Value::SmallInt(v) => PgParam(Box::new(v)),
            Value::Int32(v) => PgParam(Box::new(v)),
            Value::Int(v) => PgParam(Box::new(v)),
            Value::Real(v) => PgParam(Box::new(v)),
            Value::Float(v) => PgParam(Box::new(v)),
            Value::Decimal(v) => PgParam(Box::new(v)),
            Value::String(v) => PgParam(Box::new(v)),
            Value::Boolean(v) => PgParam(Box::new(v)),
            Value::Date(v) => PgParam(Box::new(v)),
            Value::TimestampNaive(v) => PgParam(Box::new(v)),
            Value::Null => PgParam::null(DataType::String),
        }
    }

    /// A NULL whose Rust type matches the column, so the driver accepts it
    /// for non-text columns.
    pub fn null(data_type: DataType) -> Self {
        match data_type {
            DataType::Short => PgParam(Box::new(None::<i16>)),
            DataType::Int => PgParam(Box::new(None::<i32>)),
            DataType::Long => PgParam(Box::new(None::<i64>)),
            DataType::Float => PgParam(Box::new(None::<f32>)),
            DataType::Double => PgParam(Box::new(None::<f64>)),
            DataType::Decimal => PgParam(Box::new(None::<rust_decimal::Decimal>)),
            DataType::Boolean => PgParam(Box::new(None::<bool>)),
            DataType::Date => PgParam(Box::new(None::<chrono::NaiveDate>)),
            DataType::Timestamp => PgParam(Box::new(None::<chrono::NaiveDateTime>)),
            DataType::VarChar | DataType::Char | DataType::String | DataType::Null => {
                PgParam(Box::new(None::<String>))
            }
        }
    }
}

impl AsRef<dyn ToSql + Sync> for PgParam {
    fn as_ref(&self) -> &(dyn ToSql + Sync + 'static) {
        &*self.0
    }
}

pub struct PgParamStore {
    pub params: Vec<PgParam>,
}

impl PgParamStore {
    /// Binds a row against its column types; nulls take the column's type.
    pub fn typed(values: Vec<Value>, types: &[DataType]) -> Self {
        let params = values
            .into_iter()
            .zip(types)
            .map(|(value, data_type)| match value {
                Value::Null => PgParam::null(*data_type),
                other => PgParam::from_value(other),
            })
            .collect();
        Self { params }
    }

    pub fn as_refs(&self) -> Vec<&(dyn ToSql + Sync)> {
        self.params
            .iter()
            .map(|param| param.as_ref())
            .collect::<Vec<_>>()
    }
}
