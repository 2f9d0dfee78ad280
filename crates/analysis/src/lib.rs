//! Capgraph Analysis - Capability Reachability Engine
//!
//! Given a [`capgraph_ir::Program`] (call graph, IR bodies, typed ASTs)
//! and a classifier oracle, this crate determines which capabilities —
//! file I/O, network access, system calls, reflection, unsafe memory,
//! arbitrary-execution assembly, environment reads — are reachable from
//! functions in a set of queried packages, and produces witness call
//! paths for each.
//!
//! The pipeline: classify every call-graph node against the oracle
//! (safe / explicit capability / no opinion), augment with derived
//! capabilities found by inspecting IR and syntax, then run a reverse
//! BFS per capability from the capability-bearing nodes to every caller
//! that can reach them. Aggregators shape the visited set into
//! per-function, per-package, or intermediate-package reports, counts,
//! and statistics. All traversal orders are explicitly sorted, so a
//! fixed input and classifier produce byte-identical output across runs.

pub mod core;
pub mod engine;
pub mod passes;
pub mod search;

pub use crate::core::capability::{Capability, CapabilitySet};
pub use crate::core::classifier::{Classifier, StdClassifier};
pub use crate::core::config::{CancelToken, Config, Granularity};
pub use crate::core::nodeset::{NodeSet, NodesPerCapability};
pub use crate::core::report::{
    CapabilityCountList, CapabilityInfo, CapabilityInfoList, CapabilityStatList, CapabilityStats,
    CapabilityType, EnvReadReport, PackageSummary, PathFunction, DYNAMIC_VALUE,
};
pub use engine::{
    capability_graph, get_capability_counts, get_capability_info, get_capability_stats, GraphSink,
};
pub use passes::env_reads::scan_env_reads;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
