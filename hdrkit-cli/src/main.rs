//! hdrkit CLI entry point.

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use hdrkit_cli::{run, Cli};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| cli.log_level().into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let output = run(&cli.command).context("hdrkit command failed")?;
    println!("{}", output);
    Ok(())
}
