//! Restore filter built from a manifest document
//!
//! The restore side reads the same JSON document the resolver writes and asks, for every
//! relation file it encounters, whether the file belongs to the partial restore. Lookups are by
//! `(database oid, tablespace oid, relfilenode)`, the triple that names a relation file on disk.
//!
//! Parsing skips keys it does not use (`database`, `tablefqn`, `tableoid`) and requires the ones
//! it does:
//!
//! - every database object needs a non-zero `dbOid` and a `tables` array
//! - every table object needs a non-zero `relfilenode`
//! - `tablespace` is optional and defaults to `pg_default`

use std::path::Path;

use serde_json::{Map, Value};

use crate::{
    manifest::Manifest,
    oid::{DEFAULT_TABLESPACE_OID, Oid},
};

/// Relation files selected for a partial restore, grouped by database.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelationFilter {
    /// Sorted by database oid.
    databases: Vec<FilterDatabase>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FilterDatabase {
    oid: Oid,
    /// Sorted `(tablespace, relfilenode)` pairs.
    relations: Vec<(Oid, Oid)>,
}

impl RelationFilter {
    /// Parses a manifest document into a filter.
    ///
    /// # Errors
    ///
    /// Returns [`FilterFormatError`] if the document is not JSON, is not shaped as an array of
    /// database objects, or lacks a required field.
    ///
    /// A relfilenode of `0` counts as missing. Partitioned tables have no storage and are listed
    /// with relfilenode `0`, so a manifest that contains one is not loadable as a filter.
    pub fn from_json(json: &str) -> Result<Self, FilterFormatError> {
        let document: Value = serde_json::from_str(json).map_err(FilterFormatError::Json)?;
        let Value::Array(databases) = document else {
            return Err(FilterFormatError::NotAnArray("document"));
        };

        let mut filter = Self {
            databases: databases
                .iter()
                .map(parse_database)
                .collect::<Result<_, _>>()?,
        };
        filter.databases.sort_by_key(|db| db.oid);
        Ok(filter)
    }

    /// Reads and parses a filter file.
    ///
    /// # Errors
    ///
    /// - `FilterLoadError::RelativePath` if `path` is not absolute
    /// - `FilterLoadError::Read` if the file cannot be read
    /// - `FilterLoadError::Format` if the contents are not a valid manifest document
    #[tracing::instrument(err)]
    pub fn load(path: &Path) -> Result<Self, FilterLoadError> {
        if !path.is_absolute() {
            return Err(FilterLoadError::RelativePath(path.to_path_buf()));
        }
        let json = fs_err::read_to_string(path).map_err(FilterLoadError::Read)?;
        Self::from_json(&json).map_err(FilterLoadError::Format)
    }

    /// Returns `true` if the relation file `(db, tablespace, relfilenode)` must be restored.
    ///
    /// - System relations of system databases are always needed.
    /// - Nothing else in a database absent from the filter is needed.
    /// - In a listed database, system relations and listed relations are needed.
    pub fn is_relation_needed(&self, db: Oid, tablespace: Oid, relfilenode: Oid) -> bool {
        if db.is_system() && relfilenode.is_system() {
            return true;
        }

        let Ok(pos) = self.databases.binary_search_by_key(&db, |entry| entry.oid) else {
            return false;
        };

        relfilenode.is_system()
            || self.databases[pos]
                .relations
                .binary_search(&(tablespace, relfilenode))
                .is_ok()
    }

    /// Number of databases in the filter.
    pub fn database_count(&self) -> usize {
        self.databases.len()
    }

    /// Number of relations listed for `db`, or `None` if the database is not in the filter.
    pub fn relation_count(&self, db: Oid) -> Option<usize> {
        self.databases
            .binary_search_by_key(&db, |entry| entry.oid)
            .ok()
            .map(|pos| self.databases[pos].relations.len())
    }
}

impl From<&[Manifest]> for RelationFilter {
    /// Builds a filter from resolver output. All relations are placed in `pg_default`.
    fn from(manifests: &[Manifest]) -> Self {
        let mut databases: Vec<FilterDatabase> = manifests
            .iter()
            .map(|manifest| {
                let mut relations: Vec<(Oid, Oid)> = manifest
                    .tables
                    .iter()
                    .map(|entry| (DEFAULT_TABLESPACE_OID, entry.relfilenode))
                    .collect();
                relations.sort();
                FilterDatabase {
                    oid: manifest.database.oid,
                    relations,
                }
            })
            .collect();
        databases.sort_by_key(|db| db.oid);
        Self { databases }
    }
}

fn parse_database(value: &Value) -> Result<FilterDatabase, FilterFormatError> {
    let Value::Object(object) = value else {
        return Err(FilterFormatError::NotAnObject("database"));
    };

    let oid = read_oid(object, "dbOid")?
        .filter(|oid| oid.is_valid())
        .ok_or(FilterFormatError::MissingDbOid)?;

    let tables = match object.get("tables") {
        Some(Value::Array(tables)) => tables,
        Some(_) => return Err(FilterFormatError::NotAnArray("tables")),
        None => return Err(FilterFormatError::MissingTables),
    };

    let mut relations = tables
        .iter()
        .map(parse_table)
        .collect::<Result<Vec<_>, _>>()?;
    relations.sort();

    Ok(FilterDatabase { oid, relations })
}

fn parse_table(value: &Value) -> Result<(Oid, Oid), FilterFormatError> {
    let Value::Object(object) = value else {
        return Err(FilterFormatError::NotAnObject("table"));
    };

    let tablespace = read_oid(object, "tablespace")?.unwrap_or(DEFAULT_TABLESPACE_OID);
    let relfilenode = read_oid(object, "relfilenode")?
        .filter(|oid| oid.is_valid())
        .ok_or(FilterFormatError::MissingRelfilenode)?;

    Ok((tablespace, relfilenode))
}

fn read_oid(
    object: &Map<String, Value>,
    key: &'static str,
) -> Result<Option<Oid>, FilterFormatError> {
    match object.get(key) {
        None => Ok(None),
        Some(value) => value
            .as_u64()
            .and_then(|raw| u32::try_from(raw).ok())
            .map(|raw| Some(Oid::new(raw)))
            .ok_or(FilterFormatError::InvalidOid(key)),
    }
}

/// Errors that can occur when parsing a manifest document into a [`RelationFilter`].
#[derive(Debug, thiserror::Error)]
pub enum FilterFormatError {
    /// The document is not valid JSON.
    #[error("filter is not valid JSON")]
    Json(#[source] serde_json::Error),

    /// An element expected to be an array is something else.
    #[error("{0} must be a JSON array")]
    NotAnArray(&'static str),

    /// An element expected to be an object is something else.
    #[error("{0} entry must be a JSON object")]
    NotAnObject(&'static str),

    /// A database object has no usable `dbOid`.
    #[error("dbOid field of database is missing")]
    MissingDbOid,

    /// A database object has no `tables` array.
    #[error("tables field of database is missing")]
    MissingTables,

    /// A table object has no usable `relfilenode`.
    #[error("relfilenode field of table is missing")]
    MissingRelfilenode,

    /// A field expected to hold an oid holds something else.
    #[error("{0} field is not a valid oid")]
    InvalidOid(&'static str),
}

/// Errors that can occur when loading a [`RelationFilter`] from a file.
#[derive(Debug, thiserror::Error)]
pub enum FilterLoadError {
    /// The filter path is relative.
    #[error("the path to the filter file is not absolute: {}", .0.display())]
    RelativePath(std::path::PathBuf),

    /// The filter file could not be read.
    #[error("failed to read filter file")]
    Read(#[source] std::io::Error),

    /// The filter file contents are malformed.
    #[error("malformed filter file")]
    Format(#[source] FilterFormatError),
}
