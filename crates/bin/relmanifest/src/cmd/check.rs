//! Restore filter lookup command.
//!
//! Loads a manifest file as a restore filter and reports whether one relation file would be
//! restored. The filter path must be absolute.

use std::path::PathBuf;

use catalog_manifest::{DEFAULT_TABLESPACE_OID, FilterLoadError, Oid, RelationFilter};

/// Command-line arguments for the `check` command.
#[derive(Debug, clap::Args)]
pub struct Args {
    /// Absolute path of the manifest file to use as a filter
    #[arg(long, value_name = "FILE")]
    pub filter: PathBuf,

    /// Database oid of the relation file
    #[arg(long, value_name = "OID", value_parser = clap::value_parser!(Oid))]
    pub db: Oid,

    /// Relfilenode of the relation file
    #[arg(long, value_name = "RELFILENODE", value_parser = clap::value_parser!(Oid))]
    pub rel: Oid,

    /// Tablespace oid of the relation file
    #[arg(long, value_name = "OID", default_value_t = DEFAULT_TABLESPACE_OID, value_parser = clap::value_parser!(Oid))]
    pub tablespace: Oid,
}

/// Load the filter and print `needed` or `not needed`.
///
/// # Errors
///
/// Returns [`Error`] if the filter file cannot be read or is malformed.
#[tracing::instrument(skip_all, fields(filter = %args.filter.display(), db = %args.db, rel = %args.rel))]
pub fn run(args: Args) -> Result<(), Error> {
    let needed = check(&args)?;
    println!("{}", verdict(needed));
    Ok(())
}

fn check(args: &Args) -> Result<bool, Error> {
    let filter = RelationFilter::load(&args.filter).map_err(Error::LoadFilter)?;
    tracing::debug!(databases = filter.database_count(), "loaded restore filter");

    Ok(filter.is_relation_needed(args.db, args.tablespace, args.rel))
}

fn verdict(needed: bool) -> &'static str {
    if needed { "needed" } else { "not needed" }
}

/// Errors for the `check` command.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The filter file could not be loaded
    #[error("failed to load restore filter")]
    LoadFilter(#[source] FilterLoadError),
}
