use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
use commands::analyze::AnalyzeArgs;
use commands::report::{CountsArgs, EnvArgs, StatsArgs};

#[derive(Parser)]
#[command(name = "capgraph")]
#[command(about = "Static capability analysis over whole-program call graphs")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List which capabilities the queried packages can reach, with
    /// witness call paths.
    Analyze(AnalyzeArgs),

    /// Aggregated per-capability statistics (counts, direct/transitive
    /// split, one example path each).
    Stats(StatsArgs),

    /// Per-capability totals only.
    Counts(CountsArgs),

    /// Environment variables read by each package in the closure.
    Env(EnvArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Analyze(args) => commands::analyze::execute(args),
        Commands::Stats(args) => commands::report::execute_stats(args),
        Commands::Counts(args) => commands::report::execute_counts(args),
        Commands::Env(args) => commands::report::execute_env(args),
    }
}
