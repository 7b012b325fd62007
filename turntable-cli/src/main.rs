/// Turntable - batch turntable and orbit renders of normalized meshes
///
/// Commands:
///   - render <input> <output>: render every STL under a directory
///   - generate <output>: generate seeded shapes with manifests
///   - inspect <file>: print bounds and canonical framing
use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;
use turntable_cli::{app, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    app::execute(cli)
}
