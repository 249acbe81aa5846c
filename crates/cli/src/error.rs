use engine_core::{
    error::{ConfigError, ConnectError},
    retry::RetryError,
};
use engine_runtime::error::LoadError;
use planner::error::PlanError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Failed to read '{path}': {source}")]
    FileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid load plan: {0}")]
    Plan(#[from] PlanError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    Connection(#[from] ConfigError),

    #[error("Failed to run the load plan: {0}")]
    Load(#[from] LoadError),

    #[error("Could not connect to the database: {0}")]
    Connect(#[from] RetryError<ConnectError>),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to write '{path}': {source}")]
    FileWrite {
        path: String,
        #[source]
        source: std::io::Error,
    },
}
