//! Internal database connection abstractions
//!
//! Connection pool and snapshot transaction handles used to read the
//! system catalog. Only selected types are re-exported publicly through lib.rs.

mod conn;
mod exec;
mod txn;

#[cfg(feature = "temp-db")]
pub use conn::Connection;
pub use conn::{ConnError, ConnPool};
pub use exec::Executor;
pub use txn::Transaction;
