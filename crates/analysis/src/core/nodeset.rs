//! Node and edge collections with the deterministic orderings every
//! traversal sorts by.
//!
//! Hash sets give O(1) membership during the searches; whenever a
//! collection's iteration order can reach the output, it is first sorted
//! by the total orders below. Node order is `(package path, symbol,
//! position)`; edge order is caller key then callee key, with ids as the
//! final tie-break so parallel edges still order totally.

use crate::core::capability::Capability;
use capgraph_ir::{EdgeId, NodeId, Position, Program};
use std::collections::{BTreeMap, HashSet};

pub type NodeSet = HashSet<NodeId>;

/// Map from capability to the nodes bearing it, iterated in ascending
/// capability order.
#[derive(Debug, Clone, Default)]
pub struct NodesPerCapability {
    map: BTreeMap<Capability, NodeSet>,
}

impl NodesPerCapability {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, capability: Capability, node: NodeId) {
        self.map.entry(capability).or_default().insert(node);
    }

    pub fn get(&self, capability: Capability) -> Option<&NodeSet> {
        self.map.get(&capability)
    }

    pub fn capabilities(&self) -> impl Iterator<Item = Capability> + '_ {
        self.map.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, &NodeSet)> {
        self.map.iter().map(|(c, s)| (*c, s))
    }

    pub fn restricted_to(&self, capability: Capability) -> NodesPerCapability {
        let mut out = NodesPerCapability::new();
        if let Some(nodes) = self.map.get(&capability) {
            out.map.insert(capability, nodes.clone());
        }
        out
    }

    /// Union of every per-capability set.
    pub fn union_all(&self) -> NodeSet {
        let mut all = NodeSet::new();
        for nodes in self.map.values() {
            all.extend(nodes.iter().copied());
        }
        all
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

type NodeKey<'a> = Option<(&'a str, &'a str, Option<&'a Position>)>;

/// Sort key for a call-graph node. Nodes without a function sort first;
/// everything else orders by `(package path, symbol, position)`.
pub fn node_key(program: &Program, node: NodeId) -> NodeKey<'_> {
    program.call_graph.node(node).func.map(|f| {
        let func = program.func(f);
        (
            program.func_package_path(f),
            func.name.as_str(),
            func.position.as_ref(),
        )
    })
}

pub fn sort_nodes(program: &Program, nodes: &mut [NodeId]) {
    nodes.sort_by(|a, b| {
        node_key(program, *a)
            .cmp(&node_key(program, *b))
            .then(a.cmp(b))
    });
}

pub fn sort_edges_by_caller(program: &Program, edges: &mut [EdgeId]) {
    edges.sort_by(|a, b| {
        let ea = program.call_graph.edge(*a);
        let eb = program.call_graph.edge(*b);
        node_key(program, ea.caller)
            .cmp(&node_key(program, eb.caller))
            .then_with(|| node_key(program, ea.callee).cmp(&node_key(program, eb.callee)))
            .then(a.cmp(b))
    });
}

pub fn sort_edges_by_callee(program: &Program, edges: &mut [EdgeId]) {
    edges.sort_by(|a, b| {
        let ea = program.call_graph.edge(*a);
        let eb = program.call_graph.edge(*b);
        node_key(program, ea.callee)
            .cmp(&node_key(program, eb.callee))
            .then_with(|| node_key(program, ea.caller).cmp(&node_key(program, eb.caller)))
            .then(a.cmp(b))
    });
}
