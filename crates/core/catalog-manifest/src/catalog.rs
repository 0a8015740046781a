//! Catalog lookups the resolver is built on
//!
//! [`CatalogReader`] is the seam between the resolver and the database: four read-only lookups
//! against `pg_database`, `pg_class`, `pg_appendonly`, `pg_inherits` and `pg_index`. The Postgres
//! implementation runs the queries in [`sql`] over a snapshot [`Transaction`].
//!
//! ## Catalog tables
//!
//! - **pg_database**: database name and oid
//! - **pg_class** / **pg_namespace**: relation name, oid, kind and filenode
//! - **pg_appendonly**: links an append-optimized table to its segment and visimap relations
//! - **pg_inherits**: partition and inheritance children
//! - **pg_index**: links an index to the relation it is built on

use crate::{
    db::Transaction,
    error::Error,
    manifest::{DatabaseRecord, TableManifestEntry},
    oid::Oid,
    table_name::TableName,
};

pub(crate) mod sql;

/// A base table row together with its auxiliary storage links.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct BaseTable {
    #[sqlx(flatten)]
    pub entry: TableManifestEntry,
    /// pg_appendonly.segrelid, `None` for heap tables
    pub segrelid: Option<Oid>,
    /// pg_appendonly.visimaprelid, `None` for heap tables
    pub visimaprelid: Option<Oid>,
}

impl BaseTable {
    /// The segment table link, if the table has one.
    pub fn segment_relation(&self) -> Option<Oid> {
        self.segrelid.filter(|oid| oid.is_valid())
    }

    /// The visibility map link, if the table has one.
    pub fn visimap_relation(&self) -> Option<Oid> {
        self.visimaprelid.filter(|oid| oid.is_valid())
    }
}

/// Read-only catalog lookups needed to resolve a manifest.
///
/// All calls made for one manifest are expected to observe the same catalog snapshot.
#[async_trait::async_trait]
pub trait CatalogReader: Send {
    /// Returns the name and oid of the session's current database.
    async fn current_database(&mut self) -> Result<Option<DatabaseRecord>, Error>;

    /// Returns the user tables (ordinary or partitioned) whose name is in `names`.
    ///
    /// Rows come back grouped by the position of their name in `names`.
    async fn base_tables(&mut self, names: &[TableName]) -> Result<Vec<BaseTable>, Error>;

    /// Looks up a relation by oid.
    async fn relation(&mut self, oid: Oid) -> Result<Option<TableManifestEntry>, Error>;

    /// Returns the first index (lowest oid) built on the relation `indrelid`.
    async fn first_index_on(&mut self, indrelid: Oid)
    -> Result<Option<TableManifestEntry>, Error>;
}

#[async_trait::async_trait]
impl CatalogReader for Transaction {
    async fn current_database(&mut self) -> Result<Option<DatabaseRecord>, Error> {
        sql::current_database(self).await.map_err(Error::DbError)
    }

    async fn base_tables(&mut self, names: &[TableName]) -> Result<Vec<BaseTable>, Error> {
        let rows = sql::base_tables(&mut *self, names)
            .await
            .map_err(Error::DbError)?;
        Ok(order_by_requested_name(rows, names))
    }

    async fn relation(&mut self, oid: Oid) -> Result<Option<TableManifestEntry>, Error> {
        sql::relation_by_oid(self, oid).await.map_err(Error::DbError)
    }

    async fn first_index_on(
        &mut self,
        indrelid: Oid,
    ) -> Result<Option<TableManifestEntry>, Error> {
        sql::first_index_on(self, indrelid)
            .await
            .map_err(Error::DbError)
    }
}

/// Stable-sorts catalog rows by the position of their name in `names`.
///
/// Rows sharing a name keep the order the query returned them in (by oid). `array_position` does
/// not exist on 9.4-based servers, so the ordering is done here rather than in SQL.
pub(crate) fn order_by_requested_name(
    mut rows: Vec<BaseTable>,
    names: &[TableName],
) -> Vec<BaseTable> {
    rows.sort_by_key(|row| {
        names
            .iter()
            .position(|name| name.as_str() == row.entry.name)
            .unwrap_or(usize::MAX)
    });
    rows
}
