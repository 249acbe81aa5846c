use crate::sql::base::error::DbError;
use tokio_postgres::Client;

/// An open database transaction. Dropping it without calling
/// [`Transaction::commit`] rolls it back.
pub struct Transaction<'a> {
    inner: tokio_postgres::Transaction<'a>,
}

impl<'a> Transaction<'a> {
    pub async fn begin(client: &'a mut Client) -> Result<Self, DbError> {
        let inner = client.transaction().await?;
        Ok(Transaction { inner })
    }

    pub async fn commit(self) -> Result<(), DbError> {
        self.inner.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), DbError> {
        self.inner.rollback().await?;
        Ok(())
    }

    pub(crate) fn pg(&self) -> &tokio_postgres::Transaction<'a> {
        &self.inner
    }
}
