//! Entry points of the capability engine.
//!
//! Every entry point follows the same pipeline: classify nodes against
//! the oracle, augment with the derived-capability scanners (unless
//! disabled), merge, then search. The list/count/stat shapes consume the
//! per-capability reverse search directly; the graph and intermediate
//! shapes compose it with a forward search from the queried packages.

use crate::core::capability::{Capability, CapabilitySet};
use crate::core::classifier::Classifier;
use crate::core::config::{Config, Granularity};
use crate::core::nodeset::{node_key, NodeSet, NodesPerCapability};
use crate::core::report::{
    CapabilityCountList, CapabilityInfo, CapabilityInfoList, CapabilityStatList, CapabilityStats,
    CapabilityType, PackageSummary, PathFunction,
};
use crate::passes::classify::classify_nodes;
use crate::passes::merge::merge_capabilities;
use crate::passes::run_derived_scanners;
use crate::search::backward::{for_each_path, search_backward};
use crate::search::bfs::BfsStateMap;
use crate::search::forward::search_forward;
pub use crate::search::forward::GraphSink;
use capgraph_ir::{EdgeId, NodeId, PackageId, Program};
use std::cell::Cell;
use std::collections::{BTreeMap, HashSet};
use tracing::debug;

struct CapabilitySets {
    safe: NodeSet,
    nodes_by_capability: NodesPerCapability,
    explicit_set: NodeSet,
}

fn collect_capability_sets(
    program: &Program,
    classifier: &dyn Classifier,
    config: &Config,
) -> CapabilitySets {
    let classification = classify_nodes(program, classifier);
    let derived = if config.disable_builtin {
        NodesPerCapability::new()
    } else {
        run_derived_scanners(program)
    };
    let (nodes_by_capability, explicit_set) =
        merge_capabilities(classification.by_capability, derived);
    debug!(
        safe = classification.safe.len(),
        explicit = explicit_set.len(),
        capabilities = nodes_by_capability.capabilities().count(),
        "node classification complete"
    );
    CapabilitySets {
        safe: classification.safe,
        nodes_by_capability,
        explicit_set,
    }
}

fn path_function(program: &Program, node: NodeId, incoming: Option<EdgeId>) -> PathFunction {
    let name = match program.call_graph.node(node).func {
        Some(f) => program.func(f).name.clone(),
        None => String::new(),
    };
    PathFunction {
        name,
        site: incoming.and_then(|e| program.call_graph.edge(e).site.clone()),
    }
}

struct WalkedPath {
    path: Vec<PathFunction>,
    capability_type: CapabilityType,
    package_path: String,
    package_name: String,
}

/// Walk the backward-BFS predecessor tree from `head` to the
/// capability-bearing tail, collecting path entries and the
/// direct/transitive verdict. Each entry's site is the call site in the
/// entry before it.
fn walk_path(
    program: &Program,
    classifier: &dyn Classifier,
    bfs: &BfsStateMap,
    head: NodeId,
    omit_paths: bool,
    keep_head_when_omitted: bool,
) -> WalkedPath {
    let graph = &program.call_graph;
    let mut walked = WalkedPath {
        path: Vec::new(),
        capability_type: CapabilityType::Direct,
        package_path: String::new(),
        package_name: String::new(),
    };
    let mut head_package = "";
    let mut incoming: Option<EdgeId> = None;
    let mut v = head;
    let mut i = 0;
    loop {
        let Some(func_id) = graph.node(v).func else {
            break;
        };
        if !omit_paths || (i == 0 && keep_head_when_omitted) {
            walked.path.push(path_function(program, v, incoming));
        }
        if i == 0 {
            head_package = program.func_package_path(func_id);
            if let Some(package_id) = program.func(func_id).package {
                let package = program.package(package_id);
                walked.package_path.clone_from(&package.path);
                walked.package_name.clone_from(&package.name);
            }
        }
        i += 1;
        let package_path = program.func_package_path(func_id);
        if package_path != head_package && !classifier.is_std_lib(package_path) {
            walked.capability_type = CapabilityType::Transitive;
        }
        match bfs.predecessor_edge(v) {
            Some(e) => {
                incoming = Some(e);
                v = graph.edge(e).callee;
            }
            None => break,
        }
    }
    walked
}

fn dep_path_of(path: &[PathFunction]) -> String {
    path.iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn package_summaries(program: &Program) -> Vec<PackageSummary> {
    let mut packages: Vec<PackageSummary> = program
        .packages
        .iter()
        .map(|p| PackageSummary {
            path: p.path.clone(),
            name: p.name.clone(),
        })
        .collect();
    packages.sort_by(|a, b| a.path.cmp(&b.path));
    packages
}

/// Functions in the queried packages that can reach a capability, one
/// record per (capability, function) — or per (capability, package)
/// under package granularity, or per (capability, intermediate package)
/// under intermediate granularity.
pub fn get_capability_info(
    program: &Program,
    queried: &HashSet<PackageId>,
    classifier: &dyn Classifier,
    config: &Config,
) -> CapabilityInfoList {
    if config.granularity == Granularity::Intermediate {
        return intermediate_packages(program, queried, classifier, config);
    }
    let sets = collect_capability_sets(program, classifier, config);
    let keep_head = config.granularity == Granularity::Function;

    let mut records: Vec<(CapabilityInfo, NodeId)> = Vec::new();
    for_each_path(
        program,
        queried,
        &sets.safe,
        &sets.nodes_by_capability,
        &sets.explicit_set,
        classifier,
        &config.cancel,
        |capability, bfs, head| {
            let walked = walk_path(program, classifier, bfs, head, config.omit_paths, keep_head);
            let dep_path = (!config.omit_paths).then(|| dep_path_of(&walked.path));
            records.push((
                CapabilityInfo {
                    capability,
                    package_path: walked.package_path,
                    package_name: walked.package_name,
                    capability_type: Some(walked.capability_type),
                    path: walked.path,
                    dep_path,
                },
                head,
            ));
        },
    );

    records.sort_by(|a, b| {
        a.0.capability
            .cmp(&b.0.capability)
            .then_with(|| node_key(program, a.1).cmp(&node_key(program, b.1)))
            .then(a.1.cmp(&b.1))
    });

    if config.granularity == Granularity::Package {
        // Keep the first sorted entry per (capability, package).
        let mut seen: HashSet<(Capability, Option<PackageId>)> = HashSet::new();
        records.retain(|(info, head)| {
            let package = program
                .call_graph
                .node(*head)
                .func
                .and_then(|f| program.func(f).package);
            seen.insert((info.capability, package))
        });
    }

    CapabilityInfoList {
        capability_info: records.into_iter().map(|(info, _)| info).collect(),
        package_info: package_summaries(program),
    }
}

/// Number of reporting query-package functions per capability.
pub fn get_capability_counts(
    program: &Program,
    queried: &HashSet<PackageId>,
    classifier: &dyn Classifier,
    config: &Config,
) -> CapabilityCountList {
    let sets = collect_capability_sets(program, classifier, config);
    let mut counts: BTreeMap<Capability, u64> = BTreeMap::new();
    for_each_path(
        program,
        queried,
        &sets.safe,
        &sets.nodes_by_capability,
        &sets.explicit_set,
        classifier,
        &config.cancel,
        |capability, _, _| *counts.entry(capability).or_insert(0) += 1,
    );
    CapabilityCountList {
        capability_counts: counts,
    }
}

#[derive(Default)]
struct StatCounter {
    count: u64,
    direct_count: u64,
    transitive_count: u64,
    example: Vec<PathFunction>,
}

/// Aggregated statistics per capability, with one example call path
/// each (the last one observed, which is deterministic because the
/// callback order is).
pub fn get_capability_stats(
    program: &Program,
    queried: &HashSet<PackageId>,
    classifier: &dyn Classifier,
    config: &Config,
) -> CapabilityStatList {
    let sets = collect_capability_sets(program, classifier, config);
    let mut counters: BTreeMap<Capability, StatCounter> = BTreeMap::new();
    for_each_path(
        program,
        queried,
        &sets.safe,
        &sets.nodes_by_capability,
        &sets.explicit_set,
        classifier,
        &config.cancel,
        |capability, bfs, head| {
            let walked = walk_path(program, classifier, bfs, head, config.omit_paths, true);
            let counter = counters.entry(capability).or_default();
            counter.count += 1;
            match walked.capability_type {
                CapabilityType::Direct => counter.direct_count += 1,
                CapabilityType::Transitive => counter.transitive_count += 1,
            }
            counter.example = walked.path;
        },
    );
    CapabilityStatList {
        capability_stats: counters
            .into_iter()
            .map(|(capability, counter)| CapabilityStats {
                capability,
                count: counter.count,
                direct_count: counter.direct_count,
                transitive_count: counter.transitive_count,
                example_callpath: counter.example,
            })
            .collect(),
        package_info: package_summaries(program),
    }
}

/// Stream the graph of all witness paths from queried-package functions
/// to capability-bearing functions into `sink`.
///
/// With `filter` present it is called once per capability in ascending
/// order; returning true generates that capability's graph before moving
/// on, and the cancellation token is consulted between capabilities.
/// Without a filter, one combined graph covers all capabilities.
pub fn capability_graph(
    program: &Program,
    queried: &HashSet<PackageId>,
    classifier: &dyn Classifier,
    config: &Config,
    sink: &mut dyn GraphSink,
    filter: Option<&mut dyn FnMut(Capability) -> bool>,
) {
    let sets = collect_capability_sets(program, classifier, config);
    match filter {
        Some(filter) => {
            for capability in sets.nodes_by_capability.capabilities().collect::<Vec<_>>() {
                if config.cancel.is_cancelled() {
                    debug!(%capability, "cancelled before capability graph");
                    break;
                }
                if filter(capability) {
                    let selection = sets.nodes_by_capability.restricted_to(capability);
                    run_graph_search(program, queried, &sets, &selection, classifier, sink);
                }
            }
        }
        None => {
            run_graph_search(
                program,
                queried,
                &sets,
                &sets.nodes_by_capability,
                classifier,
                sink,
            );
        }
    }
}

fn run_graph_search(
    program: &Program,
    queried: &HashSet<PackageId>,
    sets: &CapabilitySets,
    selection: &NodesPerCapability,
    classifier: &dyn Classifier,
    sink: &mut dyn GraphSink,
) {
    let backward = search_backward(
        program,
        selection,
        &sets.safe,
        &sets.explicit_set,
        classifier,
    );
    let mut start = NodeSet::new();
    for v in backward.nodes() {
        let Some(func_id) = program.call_graph.node(v).func else {
            continue;
        };
        if let Some(package) = program.func(func_id).package {
            if queried.contains(&package) {
                start.insert(v);
            }
        }
    }
    search_forward(
        program,
        &start,
        selection,
        &sets.explicit_set,
        &backward,
        classifier,
        sink,
    );
}

struct IntermediateSink<'a> {
    current: &'a Cell<Capability>,
    omit_paths: bool,
    seen: BTreeMap<(PackageId, Capability), CapabilityInfo>,
}

impl GraphSink for IntermediateSink<'_> {
    fn on_node(
        &mut self,
        program: &Program,
        from_query: &BfsStateMap,
        node: NodeId,
        to_capability: &BfsStateMap,
    ) {
        let graph = &program.call_graph;
        let Some(func_id) = graph.node(node).func else {
            // A wrapper with no function resolves to no package.
            return;
        };
        let Some(package_id) = program.func(func_id).package else {
            return;
        };
        let capability = self.current.get();
        let key = (package_id, capability);
        if self.seen.contains_key(&key) {
            return;
        }
        let package = program.package(package_id);
        let mut info = CapabilityInfo {
            capability,
            package_path: package.path.clone(),
            package_name: package.name.clone(),
            capability_type: None,
            path: Vec::new(),
            dep_path: None,
        };
        if !self.omit_paths {
            // Query side: walk back to the forward-search root, then
            // reverse so the path reads query-first.
            let mut v = node;
            loop {
                let e = from_query.predecessor_edge(v);
                info.path.push(path_function(program, v, e));
                match e {
                    Some(e) => v = graph.edge(e).caller,
                    None => break,
                }
            }
            info.path.reverse();
            // Capability side: follow the backward search toward the
            // capability-bearing tail.
            let mut v = node;
            while let Some(e) = to_capability.predecessor_edge(v) {
                v = graph.edge(e).callee;
                info.path.push(path_function(program, v, Some(e)));
            }
        }
        self.seen.insert(key, info);
    }
}

/// One record per (capability, package on a witness path), including
/// packages that neither start nor end the path.
fn intermediate_packages(
    program: &Program,
    queried: &HashSet<PackageId>,
    classifier: &dyn Classifier,
    config: &Config,
) -> CapabilityInfoList {
    let current = Cell::new(Capability::Unspecified);
    let mut sink = IntermediateSink {
        current: &current,
        omit_paths: config.omit_paths,
        seen: BTreeMap::new(),
    };
    let capability_set: Option<&CapabilitySet> = config.capability_set.as_ref();
    let mut filter = |c: Capability| {
        current.set(c);
        capability_set.map_or(true, |s| s.has(c))
    };
    capability_graph(program, queried, classifier, config, &mut sink, Some(&mut filter));

    let mut infos: Vec<CapabilityInfo> = sink.seen.into_values().collect();
    infos.sort_by(|a, b| {
        a.capability
            .cmp(&b.capability)
            .then_with(|| a.package_path.cmp(&b.package_path))
    });
    CapabilityInfoList {
        capability_info: infos,
        package_info: package_summaries(program),
    }
}
