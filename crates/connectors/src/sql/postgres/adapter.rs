use crate::sql::{
    base::{
        adapter::SqlAdapter,
        encoder::CopyValueEncoder,
        error::{ConnectorError, DbError},
        transaction::Transaction,
    },
    postgres::{
        encoder::PgCopyValueEncoder,
        params::PgParamStore,
        utils::{connect_client, parse_url},
    },
};
use async_trait::async_trait;
use bytes::Bytes;
use futures_util::{SinkExt, pin_mut};
use model::core::{data_type::DataType, value::Value};
use planner::query::{dialect, generator::QueryGenerator};
use std::sync::Arc;
use tokio::sync::{RwLock, RwLockWriteGuard};
use tokio_postgres::{Client, Config};
use tracing::debug;

#[derive(Clone)]
pub struct PgAdapter {
    client: Arc<RwLock<Client>>,
    dialect: dialect::Postgres,
}

const QUERY_DATABASE_EXISTS_SQL: &str = include_str!("sql/database_exists.sql");

impl PgAdapter {
    pub async fn connect_with(config: Config) -> Result<Self, ConnectorError> {
        let client = Arc::new(RwLock::new(connect_client(config).await?));
        Ok(PgAdapter {
            client,
            dialect: dialect::Postgres,
        })
    }

    /// Exclusive access to the client, needed to open a [`Transaction`].
    /// Other adapter calls wait until the guard is dropped.
    pub async fn lock_client(&self) -> RwLockWriteGuard<'_, Client> {
        self.client.write().await
    }

    fn generator(&self) -> QueryGenerator<'_> {
        QueryGenerator::new(&self.dialect)
    }

    pub async fn exec_tx(&self, tx: &Transaction<'_>, query: &str) -> Result<(), DbError> {
        debug!("{}", query);
        tx.pg().batch_execute(query).await?;
        Ok(())
    }

    /// Runs one prepared INSERT per row. Each row must already hold values
    /// of the matching column types.
    pub async fn insert_rows(
        &self,
        tx: &Transaction<'_>,
        table: &str,
        columns: &[String],
        types: &[DataType],
        rows: Vec<Vec<Value>>,
    ) -> Result<u64, DbError> {
        let sql = self.generator().insert_bind(table, columns);
        debug!("Prepared statement: {}", sql);

        let statement = tx.pg().prepare(&sql).await?;
        let mut inserted = 0;
        for row in rows {
            let bindings = PgParamStore::typed(row, types);
            inserted += tx.pg().execute(&statement, &bindings.as_refs()).await?;
        }
        Ok(inserted)
    }

    /// Streams rows through `COPY ... FROM STDIN`.
    pub async fn copy_rows(
        &self,
        tx: &Transaction<'_>,
        table: &str,
        columns: &[String],
        rows: &[Vec<Value>],
    ) -> Result<u64, DbError> {
        if rows.is_empty() {
            return Ok(0);
        }

        let statement = self.generator().copy_from_stdin(table, columns);
        let encoder = PgCopyValueEncoder::new();

        debug!("COPY statement: {}", statement);

        let sink = tx.pg().copy_in(&statement).await?;
        pin_mut!(sink);

        for row in rows {
            sink.as_mut().send(Bytes::from(encoder.encode_row(row))).await?;
        }

        let copied = sink.as_mut().finish().await?;
        Ok(copied)
    }
}

#[async_trait]
impl SqlAdapter for PgAdapter {
    async fn connect(url: &str) -> Result<Self, ConnectorError> {
        PgAdapter::connect_with(parse_url(url)?).await
    }

    async fn exec(&self, query: &str) -> Result<(), DbError> {
        debug!("{}", query);
        let client = self.client.read().await;
        client.batch_execute(query).await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), DbError> {
        let client = self.client.read().await;
        client.query_one("SELECT 1", &[]).await?;
        Ok(())
    }

    async fn database_exists(&self, name: &str) -> Result<bool, DbError> {
        let client = self.client.read().await;
        let rows = client.query(QUERY_DATABASE_EXISTS_SQL, &[&name]).await?;
        Ok(!rows.is_empty())
    }

    async fn create_database(&self, name: &str) -> Result<(), DbError> {
        let sql = self.generator().create_database(name);
        self.exec(&sql).await
    }

    async fn count_rows(&self, table: &str) -> Result<i64, DbError> {
        let sql = self.generator().count_rows(table);
        let client = self.client.read().await;
        let row = client.query_one(&sql, &[]).await?;
        Ok(row.try_get(0)?)
    }

    async fn sample_rows(
        &self,
        table: &str,
        limit: usize,
    ) -> Result<Vec<serde_json::Value>, DbError> {
        let sql = self.generator().sample_rows(table, limit);
        let client = self.client.read().await;
        let rows = client.query(&sql, &[]).await?;
        let samples = rows
            .iter()
            .map(|row| row.try_get::<_, serde_json::Value>(0))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(samples)
    }
}
