//! Configuration for the relmanifest tools
//!
//! Settings are read from an optional TOML file and from `RELMANIFEST_CONFIG_*` environment
//! variables, with nested keys separated by `__` (e.g. `RELMANIFEST_CONFIG_CATALOG_DB__URL`).

use std::{path::Path, time::Duration};

use catalog_manifest::{DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_POOL_MAX_CONNECTIONS, PoolConfig};
use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
};

mod redacted;

pub use self::redacted::Redacted;

/// Prefix of the environment variables read by [`load`].
pub const ENV_PREFIX: &str = "RELMANIFEST_CONFIG_";

/// Catalog database connection settings, the `[catalog_db]` section.
#[derive(Debug, Clone, serde::Deserialize)]
pub struct CatalogDbConfig {
    /// Database connection URL (required)
    pub url: Redacted<String>,
    /// Size of the connection pool (default: 1)
    #[serde(default = "default_pool_size")]
    pub pool_size: u32,
    /// Seconds to wait for a pooled connection (default: 5)
    #[serde(default = "default_acquire_timeout_secs")]
    pub acquire_timeout_secs: u64,
}

impl CatalogDbConfig {
    /// Pool settings for [`catalog_manifest::CatalogDb::connect`].
    pub fn pool_config(&self) -> PoolConfig {
        PoolConfig::with_size(self.pool_size)
            .with_acquire_timeout(Duration::from_secs(self.acquire_timeout_secs))
    }
}

/// Serde default for [`CatalogDbConfig::pool_size`].
fn default_pool_size() -> u32 {
    DEFAULT_POOL_MAX_CONNECTIONS
}

/// Serde default for [`CatalogDbConfig::acquire_timeout_secs`].
fn default_acquire_timeout_secs() -> u64 {
    DEFAULT_ACQUIRE_TIMEOUT.as_secs()
}

/// Load the catalog database configuration.
///
/// Priority, highest to lowest:
/// 1. `url_override` (the `--url` flag or `RELMANIFEST_DB_URL`)
/// 2. `RELMANIFEST_CONFIG_CATALOG_DB__*` env vars
/// 3. `[catalog_db]` section of the TOML file at `config_path`, if given
pub fn load(
    config_path: Option<&Path>,
    url_override: Option<&str>,
) -> Result<CatalogDbConfig, LoadConfigError> {
    let mut figment = Figment::new();

    if let Some(path) = config_path {
        if !path.is_file() {
            return Err(LoadConfigError::FileNotFound(path.display().to_string()));
        }
        figment = figment.merge(Toml::file(path));
    }

    figment = figment.merge(Env::prefixed(ENV_PREFIX).split("__"));

    if let Some(url) = url_override {
        figment = figment.merge(Serialized::default("catalog_db.url", url));
    }

    if !figment.contains("catalog_db.url") {
        return Err(LoadConfigError::MissingUrl);
    }

    let config = figment
        .extract_inner::<CatalogDbConfig>("catalog_db")
        .map_err(|err| LoadConfigError::Invalid(Box::new(err)))?;

    tracing::debug!(
        pool_size = config.pool_size,
        acquire_timeout_secs = config.acquire_timeout_secs,
        "loaded catalog db config"
    );

    Ok(config)
}

/// Errors that occur when loading the configuration
#[derive(Debug, thiserror::Error)]
pub enum LoadConfigError {
    /// The `--config` path does not point at a file
    #[error("config file not found: {0}")]
    FileNotFound(String),

    /// No source provided `catalog_db.url`
    #[error(
        "no catalog database URL: pass --url, set RELMANIFEST_DB_URL, \
         or set `url` in the [catalog_db] section"
    )]
    MissingUrl,

    /// The merged configuration does not deserialize
    #[error("invalid configuration")]
    Invalid(#[source] Box<figment::Error>),
}

#[cfg(test)]
mod tests {
    use std::io::Write as _;

    use super::*;

    fn config_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp config file");
        file.write_all(contents.as_bytes())
            .expect("Failed to write temp config file");
        file
    }

    #[test]
    fn load_reads_catalog_db_section() {
        //* Given
        let file = config_file(
            r#"
            [catalog_db]
            url = "postgres://gpadmin@mdw:5432/prod"
            pool_size = 3
            "#,
        );

        //* When
        let config = load(Some(file.path()), None).expect("Failed to load config");

        //* Then
        assert_eq!(config.url.as_str(), "postgres://gpadmin@mdw:5432/prod");
        assert_eq!(config.pool_size, 3);
        assert_eq!(
            config.acquire_timeout_secs,
            DEFAULT_ACQUIRE_TIMEOUT.as_secs()
        );
    }

    #[test]
    fn url_override_takes_precedence_over_file() {
        //* Given
        let file = config_file(
            r#"
            [catalog_db]
            url = "postgres://from-file/db"
            "#,
        );

        //* When
        let config = load(Some(file.path()), Some("postgres://from-flag/db"))
            .expect("Failed to load config");

        //* Then
        assert_eq!(config.url.as_str(), "postgres://from-flag/db");
        assert_eq!(config.pool_size, DEFAULT_POOL_MAX_CONNECTIONS);
    }

    #[test]
    fn url_override_alone_is_enough() {
        //* When
        let config = load(None, Some("postgres://localhost/db")).expect("Failed to load config");

        //* Then
        let pool = config.pool_config();
        assert_eq!(pool.max_connections, DEFAULT_POOL_MAX_CONNECTIONS);
        assert_eq!(pool.acquire_timeout, DEFAULT_ACQUIRE_TIMEOUT);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        //* When
        let result = load(Some(Path::new("/nonexistent/relmanifest.toml")), None);

        //* Then
        assert!(matches!(result, Err(LoadConfigError::FileNotFound(_))));
    }

    #[test]
    fn section_without_url_is_an_error() {
        //* Given
        let file = config_file(
            r#"
            [catalog_db]
            pool_size = 2
            "#,
        );

        //* When
        let result = load(Some(file.path()), None);

        //* Then
        assert!(matches!(result, Err(LoadConfigError::MissingUrl)));
    }

    #[test]
    fn malformed_pool_size_is_an_error() {
        //* Given
        let file = config_file(
            r#"
            [catalog_db]
            url = "postgres://localhost/db"
            pool_size = "many"
            "#,
        );

        //* When
        let result = load(Some(file.path()), None);

        //* Then
        assert!(matches!(result, Err(LoadConfigError::Invalid(_))));
    }
}
