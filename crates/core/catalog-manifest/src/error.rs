//! Error types for catalog manifest operations

use crate::{db::ConnError, oid::Oid, resolver::AuxiliaryKind};

/// Errors that can occur when resolving a manifest from the catalog
///
/// None of these are retried. A lookup failure means the catalog is not in the state the
/// fixture expects, and the whole invocation fails.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Error connecting to catalog db: {0}")]
    ConnectionError(sqlx::Error),

    #[error("Error executing catalog query: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("No table names given")]
    NoTableNames,

    #[error("Current database not found in pg_database")]
    DatabaseNotFound,

    #[error("{kind} relation {oid} of table '{base}' not found in pg_class")]
    AuxiliaryRelationNotFound {
        base: String,
        kind: AuxiliaryKind,
        oid: Oid,
    },

    #[error("No index found on visimap relation {visimap} of table '{base}'")]
    VisimapIndexNotFound { base: String, visimap: Oid },
}

impl From<ConnError> for Error {
    fn from(err: ConnError) -> Self {
        match err {
            ConnError::ConnectionError(err) => Error::ConnectionError(err),
        }
    }
}
