use crate::error::CliError;
use async_trait::async_trait;
use engine_core::{
    connection::{ConnectionConfig, connect_with_retry},
    retry::RetryPolicy,
};
use tracing::info;

/// Trait for "pinging" a database
#[async_trait]
pub trait ConnectionPinger {
    /// Attempts to ping; returns Err if unreachable
    async fn ping(&self) -> Result<(), CliError>;
}

/// Postgres pinger
pub struct PostgresConnectionPinger {
    pub config: ConnectionConfig,
    pub policy: RetryPolicy,
}

#[async_trait]
impl ConnectionPinger for PostgresConnectionPinger {
    async fn ping(&self) -> Result<(), CliError> {
        info!("Pinging Postgres at '{}'", self.config);

        // Connecting runs `SELECT 1` before handing the adapter back.
        connect_with_retry(&self.config, &self.policy).await?;

        info!("Postgres ping to '{}' succeeded", self.config);
        Ok(())
    }
}
