//! Aggregated report commands: stats, counts, and environment reads.

use super::analyze::OutputFormat;
use super::load::LoadArgs;
use anyhow::Result;
use capgraph_analysis::{
    get_capability_counts, get_capability_stats, scan_env_reads, Config, StdClassifier,
};
use clap::Args;
use colored::Colorize;

#[derive(Args)]
pub struct StatsArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    #[arg(long)]
    pub omit_paths: bool,

    #[arg(long)]
    pub no_builtin: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct CountsArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    #[arg(long)]
    pub no_builtin: bool,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

#[derive(Args)]
pub struct EnvArgs {
    /// Program description produced by a loader front-end (JSON).
    #[arg(short, long)]
    pub input: std::path::PathBuf,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

pub fn execute_stats(args: StatsArgs) -> Result<()> {
    let (program, queried) = args.load.load()?;
    let config = Config {
        disable_builtin: args.no_builtin,
        omit_paths: args.omit_paths,
        ..Config::default()
    };
    let classifier = StdClassifier::new();
    let stats = get_capability_stats(&program, &queried, &classifier, &config);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&stats)?),
        OutputFormat::Summary => {
            if stats.capability_stats.is_empty() {
                println!("{}", "No capabilities reachable.".green());
                return Ok(());
            }
            for s in &stats.capability_stats {
                println!(
                    "{}: {} ({} direct, {} transitive)",
                    s.capability.to_string().red().bold(),
                    s.count,
                    s.direct_count,
                    s.transitive_count
                );
                if !s.example_callpath.is_empty() {
                    let example: Vec<&str> =
                        s.example_callpath.iter().map(|p| p.name.as_str()).collect();
                    println!("  e.g. {}", example.join(" -> ").dimmed());
                }
            }
        }
    }
    Ok(())
}

pub fn execute_counts(args: CountsArgs) -> Result<()> {
    let (program, queried) = args.load.load()?;
    let config = Config {
        disable_builtin: args.no_builtin,
        ..Config::default()
    };
    let classifier = StdClassifier::new();
    let counts = get_capability_counts(&program, &queried, &classifier, &config);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&counts)?),
        OutputFormat::Summary => {
            if counts.capability_counts.is_empty() {
                println!("{}", "No capabilities reachable.".green());
                return Ok(());
            }
            for (capability, count) in &counts.capability_counts {
                println!("{}: {}", capability.to_string().red().bold(), count);
            }
        }
    }
    Ok(())
}

pub fn execute_env(args: EnvArgs) -> Result<()> {
    let raw = std::fs::read_to_string(&args.input)?;
    let mut program: capgraph_ir::Program = serde_json::from_str(&raw)?;
    program.validate()?;
    let report = scan_env_reads(&program);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Summary => {
            if report.is_empty() {
                println!("{}", "No environment reads found.".green());
                return Ok(());
            }
            for (package, names) in &report.by_package {
                let joined: Vec<&str> = names.iter().map(String::as_str).collect();
                println!("{}: {}", package.yellow(), joined.join(", "));
            }
        }
    }
    Ok(())
}
