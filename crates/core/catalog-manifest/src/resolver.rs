//! Manifest resolution
//!
//! Walks the catalog from a set of base table names to every relation whose files back them:
//!
//! 1. the current database's name and oid
//! 2. each matching base table
//! 3. its append-only segment table, if linked
//! 4. its visibility map, if linked, followed by the visibility map's index
//!
//! Entries are appended in that order per base table, and base tables follow the order of the
//! requested names. Lookups are never retried: a missing row means the catalog does not look
//! the way the caller's fixture says it should.

use crate::{
    catalog::CatalogReader,
    error::Error,
    manifest::{Manifest, TableManifestEntry},
    oid::Oid,
    table_name::TableName,
};

/// The auxiliary relations an append-optimized table links to through `pg_appendonly`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuxiliaryKind {
    /// Segment file metadata table (`pg_aoseg.*`)
    Segment,
    /// Visibility map table (`pg_aovisimap_*`)
    Visimap,
}

impl std::fmt::Display for AuxiliaryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuxiliaryKind::Segment => f.write_str("segment"),
            AuxiliaryKind::Visimap => f.write_str("visimap"),
        }
    }
}

/// Resolve the storage manifest of `names` in the catalog read by `catalog`.
///
/// Names that match no user table are skipped silently, so a request for unknown tables yields a
/// manifest with an empty `tables` list.
///
/// # Errors
///
/// - `Error::NoTableNames` if `names` is empty
/// - `Error::DatabaseNotFound` if the current database has no `pg_database` row
/// - `Error::AuxiliaryRelationNotFound` if a segment or visimap link points at no relation
/// - `Error::VisimapIndexNotFound` if a visimap relation has no index
/// - `Error::DbError` if a catalog query fails
#[tracing::instrument(skip(catalog), err)]
pub async fn resolve_manifest<C>(catalog: &mut C, names: &[TableName]) -> Result<Manifest, Error>
where
    C: CatalogReader + ?Sized,
{
    if names.is_empty() {
        return Err(Error::NoTableNames);
    }

    let database = catalog
        .current_database()
        .await?
        .ok_or(Error::DatabaseNotFound)?;
    tracing::debug!(database = %database.name, db_oid = %database.oid, "resolved current database");

    let mut manifest = Manifest::new(database);

    for base in catalog.base_tables(names).await? {
        let base_name = base.entry.name.clone();
        let segment = base.segment_relation();
        let visimap = base.visimap_relation();

        push_entry(&mut manifest, base.entry);

        if let Some(oid) = segment {
            let entry =
                resolve_auxiliary(catalog, &base_name, AuxiliaryKind::Segment, oid).await?;
            push_entry(&mut manifest, entry);
        }

        if let Some(oid) = visimap {
            let entry =
                resolve_auxiliary(catalog, &base_name, AuxiliaryKind::Visimap, oid).await?;
            push_entry(&mut manifest, entry);

            let index = catalog.first_index_on(oid).await?.ok_or_else(|| {
                Error::VisimapIndexNotFound {
                    base: base_name.clone(),
                    visimap: oid,
                }
            })?;
            push_entry(&mut manifest, index);
        }
    }

    tracing::info!(
        database = %manifest.database.name,
        requested = names.len(),
        relations = manifest.tables.len(),
        "resolved storage manifest"
    );

    Ok(manifest)
}

async fn resolve_auxiliary<C>(
    catalog: &mut C,
    base: &str,
    kind: AuxiliaryKind,
    oid: Oid,
) -> Result<TableManifestEntry, Error>
where
    C: CatalogReader + ?Sized,
{
    catalog
        .relation(oid)
        .await?
        .ok_or_else(|| Error::AuxiliaryRelationNotFound {
            base: base.to_string(),
            kind,
            oid,
        })
}

fn push_entry(manifest: &mut Manifest, entry: TableManifestEntry) {
    tracing::debug!(
        relation = %entry.name,
        oid = %entry.oid,
        relfilenode = %entry.relfilenode,
        "adding relation to manifest"
    );
    manifest.tables.push(entry);
}
