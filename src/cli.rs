use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "session-report",
    version,
    about = "Match tool-window open/close events into sessions and report on them"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full pipeline at one threshold: stage counts + duration stats.
    Analyze(AnalyzeArgs),
    /// Re-run the matcher across several thresholds and report discard rates.
    Sweep(SweepArgs),
}

#[derive(Args)]
pub struct AnalyzeArgs {
    /// Input event log CSV (timestamp,event,user_id,open_type).
    #[arg(long)]
    pub input: PathBuf,

    /// Directory the report artifacts are written into.
    #[arg(long, default_value = "generated")]
    pub out_dir: PathBuf,

    /// Maximum session length (hours) for an open/close pair to match.
    #[arg(long, default_value_t = 24)]
    pub max_duration_hours: u32,
}

#[derive(Args)]
pub struct SweepArgs {
    /// Input event log CSV (timestamp,event,user_id,open_type).
    #[arg(long)]
    pub input: PathBuf,

    /// Directory the report artifacts are written into.
    #[arg(long, default_value = "generated")]
    pub out_dir: PathBuf,

    /// Comma-separated time windows (hours) to sweep, in report order.
    #[arg(long, value_delimiter = ',', default_values_t = [1, 12, 24, 48, 72, 96])]
    pub windows: Vec<u32>,
}
