//! `zodiac` command line entry point

use clap::Parser;
use tracing_subscriber::EnvFilter;
use zd_cli::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    zd_cli::run(cli)
}
