//! Logging setup for the workspace binaries and tests, using tracing_subscriber.

use std::{io::IsTerminal, sync::Once};

use tracing_subscriber::{EnvFilter, filter::LevelFilter};

static RELMANIFEST_LOG_ENV_VAR: &str = "RELMANIFEST_LOG";

/// Level applied to the workspace crates when `RELMANIFEST_LOG` is not set.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Initializes a tracing subscriber that writes to stderr.
///
/// Stdout is left alone so that manifests can be piped.
pub fn init() {
    // Since we also use this function to enable logging in tests, wrap it in `Once` to prevent
    // multiple initializations.
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let (env_filter, log_level) = env_filter_and_log_level();

        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_ansi(std::io::stderr().is_terminal())
            .init();

        tracing::debug!("log level: {}", log_level);
    });
}

/// List of crates in the workspace.
const WORKSPACE_CRATES: &[&str] = &["catalog_manifest", "config", "monitoring", "relmanifest"];

fn env_filter_and_log_level() -> (EnvFilter, String) {
    // Parse directives from RUST_LOG, ignoring the variable entirely if it does not parse
    let builder = EnvFilter::builder().with_default_directive(LevelFilter::ERROR.into());
    let directive_string = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    let mut env_filter = builder
        .parse(&directive_string)
        .unwrap_or_else(|_| builder.parse_lossy(""));

    let log_level =
        std::env::var(RELMANIFEST_LOG_ENV_VAR).unwrap_or_else(|_| DEFAULT_LOG_LEVEL.to_string());

    for directive in crate_directives(&directive_string, &log_level) {
        env_filter = env_filter.add_directive(directive);
    }

    (env_filter, log_level)
}

/// Directives setting `log_level` for each workspace crate not already named in `rust_log`.
fn crate_directives(
    rust_log: &str,
    log_level: &str,
) -> Vec<tracing_subscriber::filter::Directive> {
    WORKSPACE_CRATES
        .iter()
        .filter(|crate_name| !rust_log.contains(&format!("{crate_name}=")))
        .filter_map(|crate_name| format!("{crate_name}={log_level}").parse().ok())
        .collect()
}

/// If this fails, just update the above `WORKSPACE_CRATES` to match reality.
#[test]
fn assert_workspace_crates() {
    use cargo_metadata::MetadataCommand;

    let cmd = MetadataCommand::new().exec().unwrap();
    let mut names: Vec<String> = cmd
        .workspace_packages()
        .into_iter()
        .map(|pkg| pkg.name.replace("-", "_").clone())
        .collect();
    names.sort();
    assert_eq!(names, WORKSPACE_CRATES);
}

#[test]
fn crate_directives_skip_crates_named_in_rust_log() {
    //* When
    let directives = crate_directives("catalog_manifest=trace,sqlx=warn", "debug");

    //* Then
    let rendered: Vec<String> = directives.iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        ["config=debug", "monitoring=debug", "relmanifest=debug"]
    );
}
