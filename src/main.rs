mod analyzer;
mod catalog;
mod cli;
mod generator;
mod types;
mod utils;

use anyhow::Context;
use clap::Parser;
use std::io::{IsTerminal, Write};
use tracing::{error, info};

use analyzer::report::{ReportOptions, write_report};
use analyzer::{AnalyzeOptions, analyze, load_logs};
use cli::{AnalyzeArgs, Cli, Command, GenerateArgs};
use generator::{GeneratorConfig, generate_with_seed, write_logs, write_summary};

fn main() {
    let cli = Cli::parse();

    // Diagnostics go to stderr so stdout carries only the report
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let color = !cli.no_color && std::io::stdout().is_terminal();

    let result = match &cli.command {
        Command::Generate(args) => run_generate(args, color),
        Command::Analyze(args) => run_analyze(args, color),
    };

    if let Err(err) = result {
        error!("{:#}", err);
        std::process::exit(1);
    }
}

fn run_generate(args: &GenerateArgs, color: bool) -> anyhow::Result<()> {
    let config = GeneratorConfig::from_args(args)?;
    info!(
        "Generating {} log entries spanning {} minutes",
        config.count,
        config.span.num_minutes()
    );

    let records = generate_with_seed(&config, args.seed)?;
    let size = write_logs(&args.output, &records)?;

    let mut stdout = std::io::stdout().lock();
    write_summary(&mut stdout, &records, &args.output, size, color)
        .context("Failed to print summary")?;
    stdout.flush()?;
    Ok(())
}

fn run_analyze(args: &AnalyzeArgs, color: bool) -> anyhow::Result<()> {
    let records = load_logs(&args.path)?;
    let analysis = analyze(
        &records,
        &AnalyzeOptions {
            samples_per_app: args.samples,
        },
    );

    let mut stdout = std::io::stdout().lock();
    write_report(
        &mut stdout,
        &analysis,
        &ReportOptions {
            top: args.top,
            color,
        },
    )
    .context("Failed to print report")?;
    stdout.flush()?;
    Ok(())
}
