//! Database connection and connection pool implementations

use sqlx::{Pool, Postgres, postgres::PgPoolOptions};

use crate::config::PoolConfig;

/// A dedicated connection to the catalog database, for test fixtures.
#[cfg(feature = "temp-db")]
#[derive(Debug)]
pub struct Connection(sqlx::PgConnection);

#[cfg(feature = "temp-db")]
impl Connection {
    /// Creates a connection with exponential backoff retry for temporary databases.
    ///
    /// Retries up to 20 times when receiving error code 57P03 (database starting up).
    /// Used in test environments with ephemeral PostgreSQL instances.
    #[tracing::instrument(skip_all, err)]
    pub async fn connect_with_retry(url: &str) -> Result<Self, ConnError> {
        use std::time::Duration;

        use backon::{ExponentialBuilder, Retryable};
        use sqlx::{Connection as _, PgConnection};

        let retry_policy = ExponentialBuilder::default()
            .with_min_delay(Duration::from_millis(10))
            .with_max_delay(Duration::from_millis(100))
            .with_max_times(20);

        fn is_db_starting_up(err: &sqlx::Error) -> bool {
            match err {
                sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code == "57P03"),
                _ => false,
            }
        }

        fn notify_retry(err: &sqlx::Error, dur: Duration) {
            tracing::warn!(
                error = %err,
                "Database still starting up during connection. Retrying in {:.1}s",
                dur.as_secs_f32()
            );
        }

        (|| PgConnection::connect(url))
            .retry(retry_policy)
            .when(is_db_starting_up)
            .notify(notify_retry)
            .await
            .map(Self)
            .map_err(ConnError::ConnectionError)
    }
}

#[cfg(feature = "temp-db")]
impl std::ops::Deref for Connection {
    type Target = sqlx::PgConnection;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

#[cfg(feature = "temp-db")]
impl std::ops::DerefMut for Connection {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// A connection pool to the catalog database.
#[derive(Debug, Clone)]
pub struct ConnPool(Pool<Postgres>);

impl ConnPool {
    /// Creates a connection pool sized and timed according to `config`.
    #[tracing::instrument(skip(url), err)]
    pub async fn connect(url: &str, config: &PoolConfig) -> Result<Self, ConnError> {
        PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .connect(url)
            .await
            .map(Self)
            .map_err(ConnError::ConnectionError)
    }
}

impl std::ops::Deref for ConnPool {
    type Target = Pool<Postgres>;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Errors that can occur when connecting to the catalog database.
#[derive(Debug, thiserror::Error)]
pub enum ConnError {
    /// Failed to establish database connection.
    #[error("Error connecting to catalog db: {0}")]
    ConnectionError(#[source] sqlx::Error),
}
