//! Read-only snapshot transaction over the system catalog

use sqlx::Postgres;

use crate::error::Error;

/// Transaction wrapper providing RAII semantics
///
/// Wraps a [`sqlx::Transaction`] opened as `REPEATABLE READ, READ ONLY`, so every catalog query
/// issued through it observes the same snapshot. Nothing is ever committed: the transaction is
/// rolled back explicitly or when dropped.
#[derive(Debug)]
pub struct Transaction(sqlx::Transaction<'static, Postgres>);

impl Transaction {
    /// Pins the snapshot of an already-open `sqlx` transaction.
    ///
    /// Must run before any other statement in the transaction, the isolation level cannot be
    /// changed once the first query has taken its snapshot.
    pub(crate) async fn begin_snapshot(
        mut tx: sqlx::Transaction<'static, Postgres>,
    ) -> Result<Self, Error> {
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(Error::DbError)?;
        Ok(Self(tx))
    }

    /// Rolls back the transaction.
    ///
    /// Equivalent to dropping the transaction but allows explicit error handling.
    pub async fn rollback(self) -> Result<(), Error> {
        self.0.rollback().await.map_err(Error::DbError)
    }
}

// Implement sqlx::Executor for &mut Transaction by delegating to the transaction's connection
impl<'c> sqlx::Executor<'c> for &'c mut Transaction {
    type Database = Postgres;

    fn fetch_many<'e, 'q: 'e, E>(
        self,
        query: E,
    ) -> futures::stream::BoxStream<
        'e,
        Result<
            sqlx::Either<
                <Postgres as sqlx::Database>::QueryResult,
                <Postgres as sqlx::Database>::Row,
            >,
            sqlx::Error,
        >,
    >
    where
        'c: 'e,
        E: 'q + sqlx::Execute<'q, Self::Database>,
    {
        (&mut *self.0).fetch_many(query)
    }

    fn fetch_optional<'e, 'q: 'e, E>(
        self,
        query: E,
    ) -> futures::future::BoxFuture<
        'e,
        Result<Option<<Postgres as sqlx::Database>::Row>, sqlx::Error>,
    >
    where
        'c: 'e,
        E: 'q + sqlx::Execute<'q, Self::Database>,
    {
        (&mut *self.0).fetch_optional(query)
    }

    fn prepare_with<'e, 'q: 'e>(
        self,
        sql: &'q str,
        parameters: &'e [<Postgres as sqlx::Database>::TypeInfo],
    ) -> futures::future::BoxFuture<
        'e,
        Result<<Postgres as sqlx::Database>::Statement<'q>, sqlx::Error>,
    >
    where
        'c: 'e,
    {
        (&mut *self.0).prepare_with(sql, parameters)
    }

    fn describe<'e, 'q: 'e>(
        self,
        sql: &'q str,
    ) -> futures::future::BoxFuture<'e, Result<sqlx::Describe<Self::Database>, sqlx::Error>>
    where
        'c: 'e,
    {
        (&mut *self.0).describe(sql)
    }
}

impl<'c> super::Executor<'c> for &'c mut Transaction {}

impl crate::_priv::Sealed for &mut Transaction {}
