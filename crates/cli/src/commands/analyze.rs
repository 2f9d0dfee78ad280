//! The main listing command: which capabilities can the queried
//! packages reach, and through which call paths.

use super::load::LoadArgs;
use anyhow::{bail, Result};
use capgraph_analysis::{
    get_capability_info, Capability, CapabilityInfoList, CapabilitySet, Config, Granularity,
    StdClassifier,
};
use clap::{Args, ValueEnum};
use colored::Colorize;

#[derive(Args)]
pub struct AnalyzeArgs {
    #[command(flatten)]
    pub load: LoadArgs,

    #[arg(long, value_enum, default_value_t = GranularityArg::Function)]
    pub granularity: GranularityArg,

    /// Emit only the first function of each record instead of full
    /// witness paths.
    #[arg(long)]
    pub omit_paths: bool,

    /// Skip the derived-capability scanners (reflect escape,
    /// unsafe-pointer conversions, assembly); report only what the
    /// classifier catalog says.
    #[arg(long)]
    pub no_builtin: bool,

    /// Restrict intermediate output to these capabilities; repeatable.
    #[arg(long = "capability")]
    pub capabilities: Vec<String>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Summary)]
    pub format: OutputFormat,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum GranularityArg {
    Function,
    Package,
    Intermediate,
}

impl From<GranularityArg> for Granularity {
    fn from(value: GranularityArg) -> Self {
        match value {
            GranularityArg::Function => Granularity::Function,
            GranularityArg::Package => Granularity::Package,
            GranularityArg::Intermediate => Granularity::Intermediate,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
pub enum OutputFormat {
    Summary,
    Json,
}

pub fn parse_capability_set(names: &[String]) -> Result<Option<CapabilitySet>> {
    if names.is_empty() {
        return Ok(None);
    }
    let mut capabilities = Vec::new();
    for name in names {
        match Capability::parse(name) {
            Some(c) => capabilities.push(c),
            None => bail!("unknown capability {name:?}"),
        }
    }
    Ok(Some(CapabilitySet::new(capabilities)))
}

pub fn execute(args: AnalyzeArgs) -> Result<()> {
    let (program, queried) = args.load.load()?;
    let config = Config {
        granularity: args.granularity.into(),
        disable_builtin: args.no_builtin,
        capability_set: parse_capability_set(&args.capabilities)?,
        omit_paths: args.omit_paths,
        ..Config::default()
    };
    let classifier = StdClassifier::new();
    let list = get_capability_info(&program, &queried, &classifier, &config);

    match args.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&list)?),
        OutputFormat::Summary => print_summary(&list),
    }
    Ok(())
}

fn print_summary(list: &CapabilityInfoList) {
    if list.capability_info.is_empty() {
        println!("{}", "No capabilities reachable from the queried packages.".green());
        return;
    }
    let mut current: Option<Capability> = None;
    for record in &list.capability_info {
        if current != Some(record.capability) {
            current = Some(record.capability);
            println!("{}", record.capability.to_string().red().bold());
        }
        let head = record
            .path
            .first()
            .map(|p| p.name.as_str())
            .unwrap_or(record.package_path.as_str());
        match &record.dep_path {
            Some(dep_path) if record.path.len() > 1 => {
                println!("  {} {}", head.yellow(), format!("({dep_path})").dimmed());
            }
            _ => println!("  {}", head.yellow()),
        }
    }
    println!(
        "\n{} records across {} packages",
        list.capability_info.len(),
        list.package_info.len()
    );
}
