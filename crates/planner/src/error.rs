use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlanError {
    #[error("Failed to parse load plan: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Load plan '{0}' has no tables")]
    Empty(String),

    #[error("Table '{0}' appears more than once in the load plan")]
    DuplicateTable(String),

    #[error("Cannot derive a table name from file '{0}'")]
    TableName(String),

    #[error("Invalid schema for table '{table}': {message}")]
    InvalidSchema { table: String, message: String },

    #[error("Invalid retry settings: {0}")]
    InvalidRetry(String),
}
