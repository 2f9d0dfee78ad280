//! Oracle-driven node classification.

use crate::core::capability::Capability;
use crate::core::classifier::Classifier;
use crate::core::nodeset::{NodeSet, NodesPerCapability};
use capgraph_ir::Program;

/// The oracle's verdict over every call-graph node: the safe set and the
/// explicitly-classified nodes per capability.
#[derive(Debug, Default)]
pub struct NodeClassification {
    pub safe: NodeSet,
    pub by_capability: NodesPerCapability,
}

/// Classify every node that has a function behind it.
///
/// A generic instantiation often carries no package of its own; it is
/// classified through its origin — the uninstantiated generic — using
/// the same identifier form. Nodes with neither a package nor an origin
/// are skipped without error.
pub fn classify_nodes(program: &Program, classifier: &dyn Classifier) -> NodeClassification {
    let mut result = NodeClassification::default();
    for node_id in program.call_graph.node_ids() {
        let Some(func_id) = program.call_graph.node(node_id).func else {
            continue;
        };
        let func = program.func(func_id);
        let category = if func.package.is_some() {
            classifier.function_category(program.func_package_path(func_id), &func.name)
        } else {
            let Some(origin_id) = func.origin else {
                continue;
            };
            let origin = program.func(origin_id);
            if origin.package.is_none() {
                continue;
            }
            classifier.function_category(program.func_package_path(origin_id), &origin.name)
        };
        match category {
            Capability::Safe => {
                result.safe.insert(node_id);
            }
            Capability::Unspecified => {}
            c => result.by_capability.add(c, node_id),
        }
    }
    result
}
