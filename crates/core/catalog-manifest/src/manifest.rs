//! Storage manifest records and their JSON form
//!
//! A manifest document is a JSON array of per-database objects:
//!
//! ```json
//! [
//!   {
//!     "database": "postgres",
//!     "dbOid": 13299,
//!     "tables": [
//!       { "tablefqn": "t1", "tableoid": 16390, "relfilenode": 16390 }
//!     ]
//!   }
//! ]
//! ```
//!
//! The resolver always produces a document with exactly one element. Readers accept any number
//! of elements, which is what the restore filter consumes.

use crate::oid::Oid;

/// Identity of the database a manifest was resolved in.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct DatabaseRecord {
    /// pg_database.datname
    #[serde(rename = "database")]
    pub name: String,
    /// pg_database.oid
    #[serde(rename = "dbOid")]
    pub oid: Oid,
}

/// One relation whose storage must be present after a partial restore.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize, sqlx::FromRow)]
pub struct TableManifestEntry {
    /// pg_class.relname, not schema-qualified
    #[serde(rename = "tablefqn")]
    #[sqlx(rename = "relname")]
    pub name: String,
    /// pg_class.oid
    #[serde(rename = "tableoid")]
    #[sqlx(rename = "oid")]
    pub oid: Oid,
    /// pg_class.relfilenode, diverges from `oid` once the relation has been rewritten
    pub relfilenode: Oid,
}

/// The storage manifest of one database.
///
/// `tables` is in dependency order: each base table is followed by its segment table, its
/// visibility map and the visibility map's index, in that order and only where they exist.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Manifest {
    #[serde(flatten)]
    pub database: DatabaseRecord,
    pub tables: Vec<TableManifestEntry>,
}

impl Manifest {
    /// Creates a manifest with no tables.
    pub fn new(database: DatabaseRecord) -> Self {
        Self {
            database,
            tables: Vec::new(),
        }
    }

    /// Serializes the manifest as a single-element JSON document.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(std::slice::from_ref(self))
    }

    /// Serializes the manifest as a single-element, indented JSON document.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(std::slice::from_ref(self))
    }
}

/// Parses a manifest document.
pub fn from_json(json: &str) -> Result<Vec<Manifest>, serde_json::Error> {
    serde_json::from_str(json)
}
