//! Storage manifests for partial-restore verification
//!
//! Given a set of table names, reads the system catalog of the current database and lists every
//! relation whose files back those tables: the table itself and, for append-optimized tables,
//! the segment table, the visibility map and the visibility map's index. The result is written
//! as a JSON manifest that the restore side turns back into a [`RelationFilter`].

use tracing::instrument;

pub mod catalog;
mod config;
mod db;
mod error;
pub mod filter;
pub mod manifest;
mod oid;
mod resolver;
mod table_name;
#[cfg(feature = "temp-db")]
pub mod temp;

use self::db::ConnPool;
#[cfg(feature = "temp-db")]
pub use self::{
    db::Connection,
    temp::{KEEP_TEMP_DIRS, TempCatalogDb},
};
pub use self::{
    catalog::{BaseTable, CatalogReader},
    config::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_POOL_MAX_CONNECTIONS, PoolConfig},
    db::{ConnError, Executor, Transaction},
    error::Error,
    filter::{FilterFormatError, FilterLoadError, RelationFilter},
    manifest::{DatabaseRecord, Manifest, TableManifestEntry},
    oid::{DEFAULT_TABLESPACE_OID, FIRST_NORMAL_OBJECT_ID, Oid},
    resolver::{AuxiliaryKind, resolve_manifest},
    table_name::{MAX_TABLE_NAME_LEN, TableName, TableNameError},
};

/// Connection pool to the database whose catalog is read. Clones will refer to the same
/// instance.
#[derive(Clone, Debug)]
pub struct CatalogDb {
    pool: ConnPool,
    #[cfg(feature = "temp-db")]
    pub(crate) url: std::sync::Arc<str>,
}

impl CatalogDb {
    /// Sets up a connection pool to the catalog database
    #[instrument(skip(url), err)]
    pub async fn connect(url: &str, config: PoolConfig) -> Result<Self, Error> {
        let pool = ConnPool::connect(url, &config).await?;
        Ok(Self {
            pool,
            #[cfg(feature = "temp-db")]
            url: url.into(),
        })
    }

    /// Begins a read-only snapshot transaction
    ///
    /// Every query issued through the returned `Transaction` sees the catalog as of its first
    /// statement. The transaction rolls back when dropped.
    #[instrument(skip(self), err)]
    pub async fn begin_snapshot(&self) -> Result<Transaction, Error> {
        let tx = self.pool.begin().await.map_err(Error::DbError)?;
        Transaction::begin_snapshot(tx).await
    }

    /// Resolves the storage manifest of `names` in a fresh snapshot
    ///
    /// Convenience wrapper around [`CatalogDb::begin_snapshot`] and [`resolve_manifest`].
    #[instrument(skip(self), err)]
    pub async fn manifest(&self, names: &[TableName]) -> Result<Manifest, Error> {
        let mut tx = self.begin_snapshot().await?;
        let manifest = resolve_manifest(&mut tx, names).await?;
        tx.rollback().await?;
        Ok(manifest)
    }
}

pub(crate) mod _priv {
    /// Sealed trait to prevent external implementations
    ///
    /// Implemented next to each `Executor` implementation in `db/`.
    pub trait Sealed {}
}
