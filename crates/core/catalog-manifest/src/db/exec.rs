//! Custom executor trait for catalog queries
//!
//! This module defines a marker trait that extends [`sqlx::Executor`] and restricts
//! which types can be used to run catalog queries in the public API.

use sqlx::Postgres;

/// Database executor trait that extends [`sqlx::Executor`]
///
/// Implemented for `&mut Transaction` only, so every catalog read of one manifest goes through
/// a single snapshot.
pub trait Executor<'c>: sqlx::Executor<'c, Database = Postgres> + crate::_priv::Sealed {}
