use clap::Parser as _;
use relmanifest::cmd;

#[tokio::main]
async fn main() {
    monitoring::logging::init();

    if let Err(err) = run().await {
        relmanifest::error!(err);
        std::process::exit(1);
    }
}

/// Relation manifests for partial restore
#[derive(Debug, clap::Parser)]
#[command(name = "relmanifest")]
#[command(about = "relmanifest lists the storage files behind a set of tables")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, clap::Subcommand)]
enum Commands {
    /// Resolve tables into a JSON storage manifest
    ///
    /// Reads pg_class and the append-optimized catalogs of the current database in one
    /// read-only snapshot and prints every relation backing the named tables. Append-optimized
    /// tables contribute their segment table, visibility map and visibility map index.
    Resolve(cmd::resolve::Args),

    /// Ask whether a relation file is kept by a restore filter
    ///
    /// Loads a manifest file as a restore filter and prints `needed` or `not needed` for the
    /// given database, tablespace and relfilenode.
    Check(cmd::check::Args),
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve(args) => cmd::resolve::run(args).await?,
        Commands::Check(args) => cmd::check::run(args)?,
    }

    Ok(())
}
