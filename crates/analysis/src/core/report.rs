//! Structured output records. Wire layout beyond serde is the consumer's
//! business; the engine only promises deterministic field contents and
//! ordering.

use crate::core::capability::Capability;
use capgraph_ir::Position;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Sentinel recorded when an environment-variable name cannot be
/// resolved to a string literal or constant statically.
pub const DYNAMIC_VALUE: &str = "=DYNAMIC=";

/// Whether a witness path stays within the head function's package plus
/// the standard library, or crosses into other modules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityType {
    Direct,
    Transitive,
}

/// One entry on a witness path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathFunction {
    /// Qualified symbol, e.g. `os.ReadFile` or `(*os.File).Read`.
    pub name: String,
    /// Position of the call site in the previous path entry, when known.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub site: Option<Position>,
}

/// One reachable capability for one function or package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfo {
    pub capability: Capability,
    pub package_path: String,
    pub package_name: String,
    /// Absent for intermediate-granularity records, where the path may
    /// start and end outside the reported package.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub capability_type: Option<CapabilityType>,
    /// Witness path from a query-package function to a
    /// capability-bearing function. Shortened or empty under
    /// `omit_paths`.
    pub path: Vec<PathFunction>,
    /// Space-joined path names, kept alongside the structured path for
    /// line-oriented consumers.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub dep_path: Option<String>,
}

/// A package in the analyzed closure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSummary {
    pub path: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityInfoList {
    pub capability_info: Vec<CapabilityInfo>,
    pub package_info: Vec<PackageSummary>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityCountList {
    pub capability_counts: BTreeMap<Capability, u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityStats {
    pub capability: Capability,
    pub count: u64,
    pub direct_count: u64,
    pub transitive_count: u64,
    pub example_callpath: Vec<PathFunction>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapabilityStatList {
    pub capability_stats: Vec<CapabilityStats>,
    pub package_info: Vec<PackageSummary>,
}

/// Environment-variable names read per package, plus an aggregate
/// occurrence count per name. Owned by the caller; two analyses never
/// share one implicitly.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvReadReport {
    pub by_package: BTreeMap<String, BTreeSet<String>>,
    pub totals: BTreeMap<String, u64>,
}

impl EnvReadReport {
    pub fn record(&mut self, package: impl Into<String>, var: impl Into<String>) {
        let var = var.into();
        self.by_package
            .entry(package.into())
            .or_default()
            .insert(var.clone());
        *self.totals.entry(var).or_insert(0) += 1;
    }

    pub fn is_empty(&self) -> bool {
        self.by_package.is_empty()
    }
}
