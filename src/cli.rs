use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub const DEFAULT_LOG_FILE: &str = "coralogix_eks_fargate_logs_1000.json";

#[derive(Parser)]
#[command(name = "fargate-logs")]
#[command(about = "Generate and analyze synthetic EKS Fargate logs in Coralogix export format")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a file of synthetic log records
    Generate(GenerateArgs),
    /// Print a statistics report for a log file
    Analyze(AnalyzeArgs),
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Number of records to generate
    #[arg(short = 'n', long, default_value_t = 1000)]
    pub count: usize,

    /// Output file
    #[arg(short, long, default_value = DEFAULT_LOG_FILE)]
    pub output: PathBuf,

    /// Start of the time window (RFC 3339)
    #[arg(long, default_value = "2025-07-01T07:00:00Z")]
    pub start: String,

    /// Length of the time window in minutes
    #[arg(long, default_value_t = 17)]
    pub span_minutes: i64,

    /// How severities are assigned
    #[arg(long, value_enum, default_value_t = SeverityStrategy::PerApp)]
    pub severity_strategy: SeverityStrategy,

    /// How timestamps are spread over the window
    #[arg(long, value_enum, default_value_t = TimingStrategy::Interpolated)]
    pub timing: TimingStrategy,

    /// Seed for reproducible output
    #[arg(long)]
    pub seed: Option<u64>,

    /// YAML file replacing the built-in application catalog
    #[arg(long)]
    pub catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Log file to analyze
    #[arg(default_value = DEFAULT_LOG_FILE)]
    pub path: PathBuf,

    /// Number of problem buckets to show
    #[arg(long, default_value_t = 5)]
    pub top: usize,

    /// Unique error samples to show per application
    #[arg(long, default_value_t = 3)]
    pub samples: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SeverityStrategy {
    /// WARN/ERROR with each application's error rate, split evenly
    PerApp,
    /// Fixed 70/20/10 INFO/WARN/ERROR weighting
    Weighted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingStrategy {
    /// Linear spread over the window with +/-30s jitter
    Interpolated,
    /// One second per record from the window start
    Sequential,
}
