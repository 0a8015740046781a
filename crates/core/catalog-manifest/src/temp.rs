//! Throwaway Postgres instance for catalog tests

use std::sync::LazyLock;

use pgtemp::{PgTempDB, PgTempDBBuilder};

use crate::{CatalogDb, Connection, Error};

/// Whether to keep the temporary directory after the database is dropped
///
/// This is set to `false` by default, but can be overridden by the `KEEP_TEMP_DIRS` environment
/// variable.
pub static KEEP_TEMP_DIRS: LazyLock<bool> = LazyLock::new(|| {
    std::env::var("KEEP_TEMP_DIRS")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false)
});

/// Stand-in for Greenplum's `pg_appendonly` catalog.
///
/// Vanilla Postgres has no such catalog. Created in `public`, it is found through the search
/// path by the same unqualified name the resolver queries.
const APPENDONLY_STAND_IN: &str = indoc::indoc! {"
    CREATE TABLE IF NOT EXISTS public.pg_appendonly (
        relid oid PRIMARY KEY,
        segrelid oid NOT NULL,
        visimaprelid oid NOT NULL
    )
"};

/// Temporary catalog database
///
/// Owns a pgtemp instance with a `pg_appendonly` stand-in installed. On drop, the database is
/// deleted.
pub struct TempCatalogDb {
    /// Inner catalog DB handle
    inner: CatalogDb,

    /// Temporary database handle
    ///
    /// On drop, the database is deleted.
    _temp_db: PgTempDB,
}

impl TempCatalogDb {
    /// Start a new temporary database and connect to it
    pub async fn new(keep: bool) -> Result<Self, Error> {
        let builder = PgTempDBBuilder::new().persist_data(keep);
        let pg_temp = PgTempDB::from_builder(builder);

        tracing::info!(
            "initializing temp catalog db at: {}",
            pg_temp.data_dir().display()
        );
        let uri = pg_temp.connection_uri();

        let mut conn = Connection::connect_with_retry(&uri).await?;
        sqlx::query(APPENDONLY_STAND_IN).execute(&mut *conn).await?;

        let inner = CatalogDb::connect(&uri, crate::PoolConfig::default()).await?;

        Ok(Self {
            inner,
            _temp_db: pg_temp,
        })
    }

    /// Open a dedicated connection, for fixture setup
    pub async fn connect(&self) -> Result<Connection, Error> {
        Ok(Connection::connect_with_retry(self.url()).await?)
    }

    /// Get the URL of the temporary database
    pub fn url(&self) -> &str {
        self.inner.url.as_ref()
    }
}

impl std::ops::Deref for TempCatalogDb {
    type Target = CatalogDb;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}
