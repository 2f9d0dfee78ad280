//! Shared loading flags: every subcommand reads a serialized program
//! and resolves the queried package paths against it.

use anyhow::{bail, Context, Result};
use capgraph_ir::{PackageId, Program};
use clap::Args;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

#[derive(Args, Clone)]
pub struct LoadArgs {
    /// Program description produced by a loader front-end (JSON).
    #[arg(short, long)]
    pub input: PathBuf,

    /// Import path of a package to query; repeatable.
    #[arg(short, long = "package", required = true)]
    pub packages: Vec<String>,
}

impl LoadArgs {
    pub fn load(&self) -> Result<(Program, HashSet<PackageId>)> {
        let raw = fs::read_to_string(&self.input)
            .with_context(|| format!("reading program from {}", self.input.display()))?;
        let mut program: Program = serde_json::from_str(&raw)
            .with_context(|| format!("decoding program from {}", self.input.display()))?;
        program
            .validate()
            .context("program failed referential-integrity checks")?;
        debug!(
            packages = program.packages.len(),
            functions = program.functions.len(),
            edges = program.call_graph.edges.len(),
            "program loaded"
        );

        let mut queried = HashSet::new();
        for path in &self.packages {
            match program.package_by_path(path) {
                Some(id) => {
                    queried.insert(id);
                }
                None => bail!("queried package {path:?} is not in the program"),
            }
        }
        Ok((program, queried))
    }
}
