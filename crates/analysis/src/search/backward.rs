//! Reverse breadth-first searches from capability-bearing nodes.
//!
//! Both searches walk incoming edges from the nodes that carry a
//! capability, so the visited set is exactly "everything that can reach
//! this capability". Safe nodes never enter the search. Nodes with an
//! explicit classification of their own can start a search but are never
//! traversed *through* — a path from a query function into `os.ReadFile`
//! is reported as file I/O, not additionally as the system calls made
//! beneath it.
//!
//! Queues and edge lists are sorted before expansion, so visit order —
//! and therefore every predecessor tree and every witness path — is a
//! pure function of the input.

use crate::core::capability::Capability;
use crate::core::classifier::Classifier;
use crate::core::config::CancelToken;
use crate::core::nodeset::{
    sort_edges_by_caller, sort_nodes, NodeSet, NodesPerCapability,
};
use crate::search::bfs::BfsStateMap;
use capgraph_ir::{EdgeId, NodeId, PackageId, Program};
use std::collections::{HashSet, VecDeque};
use tracing::debug;

/// Run one reverse BFS per capability, in ascending capability order,
/// and call `report` for every visited node whose function belongs to a
/// queried package.
///
/// `report` receives the capability, the BFS state accumulated so far
/// (sufficient to reconstruct the node's shortest path to the
/// capability), and the node itself. Roots that are themselves
/// query-package functions are reported before any expansion, so a
/// single-function path is never lost.
///
/// The cancellation token is consulted between capabilities; once
/// triggered, no further capability is searched.
pub fn for_each_path(
    program: &Program,
    queried: &HashSet<PackageId>,
    safe: &NodeSet,
    nodes_by_capability: &NodesPerCapability,
    explicit_set: &NodeSet,
    classifier: &dyn Classifier,
    cancel: &CancelToken,
    mut report: impl FnMut(Capability, &BfsStateMap, NodeId),
) {
    let graph = &program.call_graph;
    for capability in nodes_by_capability.capabilities().collect::<Vec<_>>() {
        if cancel.is_cancelled() {
            debug!(%capability, "cancelled before capability search");
            break;
        }
        let Some(roots) = nodes_by_capability.get(capability) else {
            continue;
        };

        let mut visited = BfsStateMap::new();
        let mut initial: Vec<NodeId> = roots
            .iter()
            .copied()
            .filter(|n| !safe.contains(n))
            .collect();
        sort_nodes(program, &mut initial);
        for &v in &initial {
            visited.insert_root(v);
        }
        debug!(%capability, roots = initial.len(), "reverse search");

        // Roots inside queried packages are themselves results; the BFS
        // below only reports their callers.
        for &v in &initial {
            if let Some(func_id) = graph.node(v).func {
                if let Some(package) = program.func(func_id).package {
                    if queried.contains(&package) {
                        report(capability, &visited, v);
                    }
                }
            }
        }

        let mut queue: VecDeque<NodeId> = initial.into();
        while let Some(v) = queue.pop_front() {
            let mut incoming: Vec<EdgeId> = graph
                .node(v)
                .ins
                .iter()
                .copied()
                .filter(|&e| classifier.include_call(program, graph.edge(e)))
                .collect();
            sort_edges_by_caller(program, &mut incoming);
            for e in incoming {
                let caller = graph.edge(e).caller;
                let Some(caller_func) = graph.node(caller).func else {
                    // Synthetic graph roots carry no function to report.
                    continue;
                };
                if safe.contains(&caller)
                    || visited.contains(caller)
                    || explicit_set.contains(&caller)
                {
                    continue;
                }
                visited.insert(caller, e);
                queue.push_back(caller);
                if let Some(package) = program.func(caller_func).package {
                    if queried.contains(&package) {
                        report(capability, &visited, caller);
                    }
                }
            }
        }
    }
}

/// The set of all nodes with a path to any capability in
/// `nodes_by_capability`, as one combined reverse BFS. Used by the graph
/// builder, which needs reachability but no per-node reporting.
pub fn search_backward(
    program: &Program,
    nodes_by_capability: &NodesPerCapability,
    safe: &NodeSet,
    explicit_set: &NodeSet,
    classifier: &dyn Classifier,
) -> BfsStateMap {
    let graph = &program.call_graph;
    let mut visited = BfsStateMap::new();
    let mut initial: Vec<NodeId> = Vec::new();
    for (_, roots) in nodes_by_capability.iter() {
        for &v in roots {
            if safe.contains(&v) || visited.contains(v) {
                continue;
            }
            visited.insert_root(v);
            initial.push(v);
        }
    }
    sort_nodes(program, &mut initial);

    let mut queue: VecDeque<NodeId> = initial.into();
    while let Some(v) = queue.pop_front() {
        let mut incoming: Vec<EdgeId> = graph
            .node(v)
            .ins
            .iter()
            .copied()
            .filter(|&e| {
                let edge = graph.edge(e);
                classifier.include_call(program, edge)
                    && !safe.contains(&edge.caller)
                    && !explicit_set.contains(&edge.caller)
            })
            .collect();
        sort_edges_by_caller(program, &mut incoming);
        for e in incoming {
            let caller = graph.edge(e).caller;
            if visited.contains(caller) {
                continue;
            }
            visited.insert(caller, e);
            queue.push_back(caller);
        }
    }
    visited
}
