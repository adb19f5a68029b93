use anyhow::Result;
use clap::Parser;
use session_report::{cli, pipeline};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = cli::Cli::parse();
    match cli.command {
        cli::Commands::Analyze(args) => pipeline::analyze(&args),
        cli::Commands::Sweep(args) => pipeline::sweep(&args),
    }
}
