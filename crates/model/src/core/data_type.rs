use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::{borrow::Cow, collections::HashMap, fmt};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum DataType {
    Short,
    Int,
    Long,
    Float,
    Double,
    Decimal,
    Boolean,
    Date,
    Timestamp,
    VarChar,
    Char,
    String,
    Null,
}

lazy_static! {
    static ref POSTGRES_TYPE_MAP: HashMap<&'static str, DataType> = build_postgres_type_map();
}

impl DataType {
    pub fn from_postgres_type(type_name: &str) -> Result<Self, String> {
        let normalized = Self::normalize_type_name(type_name);
        POSTGRES_TYPE_MAP
            .get(normalized.as_str())
            .copied()
            .ok_or_else(|| format!("Unknown Postgres column type: {type_name}"))
    }

    /// Parses a declared column type such as `VARCHAR(10)` into the type and
    /// its optional length modifier.
    pub fn parse_declared(decl: &str) -> Result<(Self, Option<usize>), String> {
        let decl = decl.trim();
        let Some(open) = decl.find('(') else {
            return Ok((Self::from_postgres_type(decl)?, None));
        };

        let close = decl
            .rfind(')')
            .filter(|close| *close == decl.len() - 1 && *close > open)
            .ok_or_else(|| format!("Malformed column type: {decl}"))?;

        let data_type = Self::from_postgres_type(&decl[..open])?;
        if !data_type.supports_length() {
            return Err(format!("Type modifier not supported for {decl}"));
        }

        let length = decl[open + 1..close]
            .trim()
            .parse::<usize>()
            .map_err(|_| format!("Invalid length in column type: {decl}"))?;
        Ok((data_type, Some(length)))
    }

    pub fn postgres_name(&self) -> Cow<'static, str> {
        match self {
            DataType::Short => Cow::Borrowed("SMALLINT"),
            DataType::Int => Cow::Borrowed("INTEGER"),
            DataType::Long => Cow::Borrowed("BIGINT"),
            DataType::Float => Cow::Borrowed("REAL"),
            DataType::Double => Cow::Borrowed("DOUBLE PRECISION"),
            DataType::Decimal => Cow::Borrowed("NUMERIC"),
            DataType::Boolean => Cow::Borrowed("BOOLEAN"),
            DataType::Date => Cow::Borrowed("DATE"),
            DataType::Timestamp => Cow::Borrowed("TIMESTAMP"),
            DataType::VarChar => Cow::Borrowed("VARCHAR"),
            DataType::Char => Cow::Borrowed("CHAR"),
            DataType::String => Cow::Borrowed("TEXT"),
            DataType::Null => Cow::Borrowed("TEXT"),
        }
    }

    pub fn supports_length(&self) -> bool {
        matches!(self, DataType::VarChar | DataType::Char)
    }

    pub fn is_text(&self) -> bool {
        matches!(
            self,
            DataType::String | DataType::VarChar | DataType::Char | DataType::Null
        )
    }

    fn normalize_type_name(type_name: &str) -> String {
        type_name
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_uppercase()
    }
}

impl TryFrom<&str> for DataType {
    type Error = String;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        DataType::from_postgres_type(s)
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.postgres_name())
    }
}

fn build_postgres_type_map() -> HashMap<&'static str, DataType> {
    use DataType::*;

    // FLOAT without a precision is double precision in Postgres.
    let entries = [
        ("BOOLEAN", Boolean),
        ("BOOL", Boolean),
        ("SMALLINT", Short),
        ("INT2", Short),
        ("INTEGER", Int),
        ("INT", Int),
        ("INT4", Int),
        ("SERIAL", Int),
        ("INT8", Long),
        ("BIGINT", Long),
        ("BIGSERIAL", Long),
        ("FLOAT4", Float),
        ("REAL", Float),
        ("FLOAT", Double),
        ("FLOAT8", Double),
        ("DOUBLE PRECISION", Double),
        ("NUMERIC", Decimal),
        ("DECIMAL", Decimal),
        ("TEXT", String),
        ("CHARACTER VARYING", VarChar),
        ("VARCHAR", VarChar),
        ("CHARACTER", Char),
        ("CHAR", Char),
        ("DATE", Date),
        ("TIMESTAMP", Timestamp),
        ("TIMESTAMP WITHOUT TIME ZONE", Timestamp),
    ];

    let mut map = HashMap::new();
    for (name, data_type) in entries {
        map.insert(name, data_type);
    }
    map
}
