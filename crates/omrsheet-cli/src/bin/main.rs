//! omrsheet CLI binary entry point
//!
//! Installs logging, then calls the library's `run_cli()` function.

use anyhow::Result;
use omrsheet_cli::run_cli;

fn main() -> Result<()> {
    // Logs go to stderr so JSON reports on stdout stay clean
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run_cli()
}
