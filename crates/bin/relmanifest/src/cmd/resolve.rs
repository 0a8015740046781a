//! Manifest resolution command.
//!
//! Connects to the catalog database, resolves the named tables in a single read-only snapshot
//! and writes the manifest as JSON to stdout or to `--output`.
//!
//! # Configuration
//!
//! - Database URL: `--url` flag, `RELMANIFEST_DB_URL` env var, or `[catalog_db]` in `--config`
//! - Logging: `RELMANIFEST_LOG` env var (`error`, `warn`, `info`, `debug`, `trace`)

use std::path::{Path, PathBuf};

use catalog_manifest::{Manifest, TableName};

use crate::args::GlobalArgs;

/// Command-line arguments for the `resolve` command.
#[derive(Debug, clap::Args)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Tables to resolve, by relation name
    #[arg(value_name = "TABLE", required = true, value_parser = clap::value_parser!(TableName))]
    pub tables: Vec<TableName>,

    /// Write the manifest to this file instead of stdout
    #[arg(long, short, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Indent the JSON output
    #[arg(long)]
    pub pretty: bool,
}

/// Resolve the tables and write the manifest.
///
/// # Errors
///
/// Returns [`Error`] if the database is unreachable, the catalog is inconsistent, or the
/// output cannot be written.
#[tracing::instrument(skip_all, fields(tables = args.tables.len()))]
pub async fn run(args: Args) -> Result<(), Error> {
    let db = args.global.connect().await.map_err(Error::Connect)?;

    let manifest = db.manifest(&args.tables).await.map_err(Error::Resolve)?;

    let json = render(&manifest, args.pretty).map_err(Error::Serialize)?;

    match args.output.as_deref() {
        Some(path) => {
            write_manifest(path, &json)?;
            crate::success!(
                "Wrote {} relations of database {} to {}",
                manifest.tables.len(),
                manifest.database.name,
                path.display()
            );
        }
        None => println!("{json}"),
    }

    Ok(())
}

/// Serialize the manifest, compact or indented.
fn render(manifest: &Manifest, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        manifest.to_json_pretty()
    } else {
        manifest.to_json()
    }
}

fn write_manifest(path: &Path, json: &str) -> Result<(), Error> {
    fs_err::write(path, format!("{json}\n")).map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "Failed to write manifest");
        Error::Write(err)
    })
}

/// Errors for the `resolve` command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connecting to the catalog database failed
    #[error(transparent)]
    Connect(crate::args::ConnectError),

    /// The catalog could not be resolved into a manifest
    #[error("failed to resolve manifest")]
    Resolve(#[source] catalog_manifest::Error),

    /// The manifest could not be serialized
    #[error("failed to serialize manifest")]
    Serialize(#[source] serde_json::Error),

    /// The output file could not be written
    #[error("failed to write manifest")]
    Write(#[source] std::io::Error),
}
