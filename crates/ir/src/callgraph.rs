//! Whole-program call graph.
//!
//! Nodes and edges live in arenas and refer to each other by id; each node
//! keeps both incoming and outgoing edge lists so traversals can walk the
//! graph in either direction. Parallel edges between the same caller and
//! callee are legal — whether to collapse them is a policy decision for
//! the traversal, not the model.

use crate::position::Position;
use crate::ssa::FuncId;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EdgeId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Synthetic graph roots may carry no function.
    pub func: Option<FuncId>,
    pub ins: Vec<EdgeId>,
    pub outs: Vec<EdgeId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Edge {
    pub caller: NodeId,
    pub callee: NodeId,
    /// Call-site position, when the loader resolved one.
    pub site: Option<Position>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CallGraph {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    #[serde(skip)]
    by_func: HashMap<FuncId, NodeId>,
}

impl CallGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_node(&mut self, func: Option<FuncId>) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            func,
            ins: Vec::new(),
            outs: Vec::new(),
        });
        if let Some(f) = func {
            self.by_func.insert(f, id);
        }
        id
    }

    pub fn add_edge(&mut self, caller: NodeId, callee: NodeId, site: Option<Position>) -> EdgeId {
        let id = EdgeId(self.edges.len());
        self.edges.push(Edge {
            caller,
            callee,
            site,
        });
        self.nodes[caller.0].outs.push(id);
        self.nodes[callee.0].ins.push(id);
        id
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn edge(&self, id: EdgeId) -> &Edge {
        &self.edges[id.0]
    }

    /// The node representing `func`, if the loader created one.
    pub fn node_of(&self, func: FuncId) -> Option<NodeId> {
        self.by_func.get(&func).copied()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    /// Rebuild the function index. Deserialization skips it, so loaders
    /// that ship a graph over the wire call this once after decode.
    pub fn reindex(&mut self) {
        self.by_func.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            if let Some(f) = node.func {
                self.by_func.insert(f, NodeId(i));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_appear_in_both_adjacency_lists() {
        let mut g = CallGraph::new();
        let a = g.add_node(Some(FuncId(0)));
        let b = g.add_node(Some(FuncId(1)));
        let e = g.add_edge(a, b, None);

        assert_eq!(g.node(a).outs, vec![e]);
        assert_eq!(g.node(b).ins, vec![e]);
        assert!(g.node(a).ins.is_empty());
    }

    #[test]
    fn test_parallel_edges_are_kept() {
        let mut g = CallGraph::new();
        let a = g.add_node(Some(FuncId(0)));
        let b = g.add_node(Some(FuncId(1)));
        g.add_edge(a, b, None);
        g.add_edge(a, b, None);
        assert_eq!(g.node(a).outs.len(), 2);
        assert_eq!(g.node(b).ins.len(), 2);
    }

    #[test]
    fn test_reindex_restores_function_lookup() {
        let mut g = CallGraph::new();
        let a = g.add_node(Some(FuncId(7)));
        g.add_node(None);

        let json = serde_json::to_string(&g).unwrap();
        let mut decoded: CallGraph = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.node_of(FuncId(7)), None);

        decoded.reindex();
        assert_eq!(decoded.node_of(FuncId(7)), Some(a));
    }

    #[test]
    fn test_self_loop_is_representable() {
        let mut g = CallGraph::new();
        let a = g.add_node(Some(FuncId(0)));
        g.add_edge(a, a, None);
        assert_eq!(g.node(a).ins.len(), 1);
        assert_eq!(g.node(a).outs.len(), 1);
    }
}
