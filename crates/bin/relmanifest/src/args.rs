//! Shared command-line arguments for commands that talk to the catalog database.

use std::path::PathBuf;

use catalog_manifest::CatalogDb;

/// Connection arguments for commands that read the catalog.
///
/// Commands include these options with `#[command(flatten)]`.
#[derive(Debug, clap::Args)]
pub struct GlobalArgs {
    /// TOML config file with a `[catalog_db]` section
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Catalog database URL, overriding the config file
    #[arg(long, env = "RELMANIFEST_DB_URL", hide_env_values = true)]
    pub url: Option<String>,
}

impl GlobalArgs {
    /// Load the catalog database config and connect to it.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be loaded or the database is unreachable.
    pub async fn connect(&self) -> Result<CatalogDb, ConnectError> {
        let config = config::load(self.config.as_deref(), self.url.as_deref())
            .map_err(ConnectError::Config)?;

        CatalogDb::connect(&config.url, config.pool_config())
            .await
            .map_err(ConnectError::Database)
    }
}

/// Errors that can occur when connecting from [`GlobalArgs`].
#[derive(Debug, thiserror::Error)]
pub enum ConnectError {
    /// The configuration could not be loaded
    #[error("failed to load configuration")]
    Config(#[source] config::LoadConfigError),

    /// The catalog database could not be reached
    #[error("failed to connect to the catalog database")]
    Database(#[source] catalog_manifest::Error),
}
