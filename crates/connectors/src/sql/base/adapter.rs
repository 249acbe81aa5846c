use crate::sql::base::error::{ConnectorError, DbError};
use async_trait::async_trait;

/// Statements that run outside a transaction, one at a time.
#[async_trait]
pub trait SqlAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError>
    where
        Self: Sized;

    async fn exec(&self, query: &str) -> Result<(), DbError>;

    /// Runs a trivial query to prove the connection is alive.
    async fn ping(&self) -> Result<(), DbError>;

    // Catalog
    async fn database_exists(&self, name: &str) -> Result<bool, DbError>;
    async fn create_database(&self, name: &str) -> Result<(), DbError>;

    // Read back
    async fn count_rows(&self, table: &str) -> Result<i64, DbError>;
    async fn sample_rows(&self, table: &str, limit: usize)
    -> Result<Vec<serde_json::Value>, DbError>;
}
