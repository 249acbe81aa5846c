use crate::core::data_type::DataType;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DatasetError {
    #[error("duplicate column '{column}' in the headers of '{dataset}'")]
    DuplicateColumn { dataset: String, column: String },
}

/// A cell that cannot be represented in its declared column type.
#[derive(Debug, Error, PartialEq)]
#[error("cannot convert '{value}' in column '{column}' to {data_type}")]
pub struct ConversionError {
    pub column: String,
    pub value: String,
    pub data_type: DataType,
}
