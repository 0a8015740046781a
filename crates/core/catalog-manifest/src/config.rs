//! Connection pool configuration for the catalog database.

use std::time::Duration;

/// Default maximum number of connections in the pool.
///
/// A manifest is resolved over a single snapshot transaction, so one connection is all a
/// resolver ever holds.
pub const DEFAULT_POOL_MAX_CONNECTIONS: u32 = 1;

/// Default acquire timeout when checking out a connection (5 seconds).
pub const DEFAULT_ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection pool configuration.
///
/// | Field              | Default                                  |
/// |--------------------|------------------------------------------|
/// | `max_connections`  | [`DEFAULT_POOL_MAX_CONNECTIONS`] (1)     |
/// | `min_connections`  | 0                                        |
/// | `acquire_timeout`  | [`DEFAULT_ACQUIRE_TIMEOUT`] (5 s)        |
#[derive(Debug, Clone)]
pub struct PoolConfig {
    /// Maximum number of connections in the pool.
    pub max_connections: u32,
    /// Minimum number of connections to keep alive in the pool.
    pub min_connections: u32,
    /// Maximum time to wait for a connection from the pool before failing.
    pub acquire_timeout: Duration,
}

impl PoolConfig {
    /// Creates a `PoolConfig` with the given pool size and default timeouts.
    pub fn with_size(size: u32) -> Self {
        Self {
            max_connections: size.max(1),
            ..Self::default()
        }
    }

    /// Overrides the acquire timeout.
    pub fn with_acquire_timeout(self, acquire_timeout: Duration) -> Self {
        Self {
            acquire_timeout,
            ..self
        }
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: DEFAULT_POOL_MAX_CONNECTIONS,
            min_connections: 0,
            acquire_timeout: DEFAULT_ACQUIRE_TIMEOUT,
        }
    }
}
