//! Internal SQL operations against the system catalog

use super::BaseTable;
use crate::{
    db::Executor,
    manifest::{DatabaseRecord, TableManifestEntry},
    oid::{FIRST_NORMAL_OBJECT_ID, Oid},
    table_name::TableName,
};

/// Get the name and oid of the session's current database
///
/// Returns `None` if `pg_database` has no row for `current_database()`.
#[tracing::instrument(skip(exe), err)]
pub(crate) async fn current_database<'c, E>(exe: E) -> Result<Option<DatabaseRecord>, sqlx::Error>
where
    E: Executor<'c>,
{
    let query = indoc::indoc! {"
        SELECT datname, oid
        FROM pg_database
        WHERE datname = current_database()
    "};

    let row: Option<(String, Oid)> = sqlx::query_as(query).fetch_optional(exe).await?;
    Ok(row.map(|(name, oid)| DatabaseRecord { name, oid }))
}

/// Get the user tables named in `names`, with their append-only storage links
///
/// Only ordinary (`r`) and partitioned (`p`) relations at or above the first normal object id
/// are returned. The `pg_inherits` join contributes no column, but a relation with several
/// parents comes back once per parent.
///
/// Rows are ordered by oid. The caller reorders them to match `names`.
#[tracing::instrument(skip(exe), err)]
pub(crate) async fn base_tables<'c, E>(
    exe: E,
    names: &[TableName],
) -> Result<Vec<BaseTable>, sqlx::Error>
where
    E: Executor<'c>,
{
    let query = indoc::indoc! {"
        SELECT c.relname, c.oid, c.relfilenode, ao.segrelid, ao.visimaprelid
        FROM pg_class c
        JOIN pg_namespace n ON n.oid = c.relnamespace
        LEFT JOIN pg_appendonly ao ON ao.relid = c.oid
        LEFT JOIN pg_inherits i ON i.inhrelid = c.oid
        WHERE c.relkind IN ('r', 'p')
          AND c.oid >= $1
          AND c.relname::text = ANY($2)
        ORDER BY c.oid
    "};

    let names: Vec<&str> = names.iter().map(TableName::as_str).collect();

    sqlx::query_as(query)
        .bind(FIRST_NORMAL_OBJECT_ID)
        .bind(names)
        .fetch_all(exe)
        .await
}

/// Get a relation's name, oid and filenode by oid
///
/// Returns `None` if no relation has that oid.
#[tracing::instrument(skip(exe), err)]
pub(crate) async fn relation_by_oid<'c, E>(
    exe: E,
    oid: Oid,
) -> Result<Option<TableManifestEntry>, sqlx::Error>
where
    E: Executor<'c>,
{
    let query = "SELECT relname, oid, relfilenode FROM pg_class WHERE oid = $1";

    sqlx::query_as(query).bind(oid).fetch_optional(exe).await
}

/// Get the lowest-oid index built on relation `indrelid`
///
/// Returns `None` if the relation has no index.
#[tracing::instrument(skip(exe), err)]
pub(crate) async fn first_index_on<'c, E>(
    exe: E,
    indrelid: Oid,
) -> Result<Option<TableManifestEntry>, sqlx::Error>
where
    E: Executor<'c>,
{
    let query = indoc::indoc! {"
        SELECT c.relname, c.oid, c.relfilenode
        FROM pg_index i
        JOIN pg_class c ON c.oid = i.indexrelid
        WHERE i.indrelid = $1
        ORDER BY c.oid
        LIMIT 1
    "};

    sqlx::query_as(query)
        .bind(indrelid)
        .fetch_optional(exe)
        .await
}
