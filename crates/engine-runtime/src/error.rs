use connectors::{file::csv::error::FileError, sql::base::error::DbError};
use engine_core::{
    error::{ConfigError, ConnectError},
    retry::RetryError,
};
use model::errors::{ConversionError, DatasetError};
use planner::error::PlanError;
use thiserror::Error;

/// Top-level errors for a load run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Plan error: {0}")]
    Plan(#[from] PlanError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to read '{path}': {source}")]
    File {
        path: String,
        #[source]
        source: FileError,
    },

    #[error("Dataset error: {0}")]
    Dataset(#[from] DatasetError),

    #[error("Could not connect to the database: {0}")]
    Connect(#[from] RetryError<ConnectError>),

    #[error("Could not ensure the database exists: {0}")]
    EnsureDatabase(#[source] ConnectError),

    #[error("Database error: {0}")]
    Database(#[from] DbError),

    #[error("Table '{table}': {source}")]
    Conversion {
        table: String,
        #[source]
        source: ConversionError,
    },

    #[error("Table '{table}': CSV has no column '{column}' declared in the schema")]
    MissingColumn { table: String, column: String },
}
