use connectors::sql::base::error::{ConnectorError, DbError};
use thiserror::Error;

/// Problems resolving connection settings from the environment.
#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("DB_PORT must be a port number, got '{0}'")]
    InvalidPort(String),

    #[error("DB_SSLMODE must be one of disable, prefer, require; got '{0}'")]
    InvalidSslMode(String),
}

/// A failed attempt to reach the database.
#[derive(Error, Debug)]
pub enum ConnectError {
    #[error(transparent)]
    Connector(#[from] ConnectorError),

    #[error(transparent)]
    Db(#[from] DbError),
}
