//! Core vocabulary of the engine: the capability enum, the classifier
//! seam, engine configuration, output records, and the deterministic
//! node/edge orderings every traversal relies on.

pub mod capability;
pub mod classifier;
pub mod config;
pub mod nodeset;
pub mod report;

pub use capability::{Capability, CapabilitySet};
pub use classifier::{Classifier, StdClassifier};
pub use config::{CancelToken, Config, Granularity};
pub use nodeset::{NodeSet, NodesPerCapability};
pub use report::{
    CapabilityCountList, CapabilityInfo, CapabilityInfoList, CapabilityStatList, CapabilityStats,
    CapabilityType, EnvReadReport, PackageSummary, PathFunction, DYNAMIC_VALUE,
};
