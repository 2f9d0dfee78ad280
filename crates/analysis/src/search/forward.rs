//! Forward breadth-first search from query-package functions,
//! constrained to nodes that can reach a capability.

use crate::core::capability::Capability;
use crate::core::classifier::Classifier;
use crate::core::nodeset::{sort_edges_by_callee, sort_nodes, NodeSet, NodesPerCapability};
use crate::search::bfs::BfsStateMap;
use capgraph_ir::{EdgeId, NodeId, Program};
use std::collections::VecDeque;

/// Streaming consumer of the capability graph. All methods default to
/// no-ops so a consumer implements only what it renders.
pub trait GraphSink {
    /// Called once per reachable node, with the forward BFS state (from
    /// the queried packages) and the backward BFS state (to the
    /// capability), so a complete witness path through the node can be
    /// stitched from the two predecessor trees.
    fn on_node(
        &mut self,
        program: &Program,
        from_query: &BfsStateMap,
        node: NodeId,
        to_capability: &BfsStateMap,
    ) {
        let _ = (program, from_query, node, to_capability);
    }

    /// Called once per surviving edge between reported nodes.
    fn on_edge(&mut self, program: &Program, edge: EdgeId) {
        let _ = (program, edge);
    }

    /// Called for each capability carried by a reported node.
    fn on_capability(&mut self, program: &Program, node: NodeId, capability: Capability) {
        let _ = (program, node, capability);
    }
}

/// BFS forward from `start` (query-package nodes), visiting only nodes
/// present in `backward` — everything else cannot reach the capability
/// under consideration. Expansion stops at explicitly-classified nodes,
/// which are reported but not traversed through. Consecutive edges to
/// the same callee (after sorting) are collapsed to one.
pub fn search_forward(
    program: &Program,
    start: &NodeSet,
    nodes_by_capability: &NodesPerCapability,
    explicit_set: &NodeSet,
    backward: &BfsStateMap,
    classifier: &dyn Classifier,
    sink: &mut dyn GraphSink,
) {
    let graph = &program.call_graph;
    let mut forward = BfsStateMap::new();
    let mut initial: Vec<NodeId> = start
        .iter()
        .copied()
        .filter(|&n| backward.contains(n))
        .collect();
    sort_nodes(program, &mut initial);
    for &v in &initial {
        forward.insert_root(v);
    }

    let mut queue: VecDeque<NodeId> = initial.into();
    while let Some(v) = queue.pop_front() {
        sink.on_node(program, &forward, v, backward);
        for (capability, nodes) in nodes_by_capability.iter() {
            if nodes.contains(&v) {
                sink.on_capability(program, v, capability);
            }
        }
        if explicit_set.contains(&v) {
            continue;
        }
        let mut outgoing: Vec<EdgeId> = graph
            .node(v)
            .outs
            .iter()
            .copied()
            .filter(|&e| {
                let edge = graph.edge(e);
                classifier.include_call(program, edge) && backward.contains(edge.callee)
            })
            .collect();
        sort_edges_by_callee(program, &mut outgoing);
        let mut previous_callee: Option<NodeId> = None;
        for e in outgoing {
            let callee = graph.edge(e).callee;
            if previous_callee == Some(callee) {
                continue;
            }
            previous_callee = Some(callee);
            sink.on_edge(program, e);
            if forward.contains(callee) {
                continue;
            }
            forward.insert(callee, e);
            queue.push_back(callee);
        }
    }
}
