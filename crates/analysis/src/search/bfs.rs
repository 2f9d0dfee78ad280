//! Per-node breadth-first-search state.
//!
//! Each visited node records the single edge by which the search first
//! reached it (none for roots). The records form a predecessor tree, so
//! a shortest witness path falls out of walking edges until a root:
//! toward the capability for the backward search (follow `callee`),
//! toward the query for the forward search (follow `caller`).

use capgraph_ir::{EdgeId, NodeId};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BfsState {
    pub edge: Option<EdgeId>,
}

#[derive(Debug, Clone, Default)]
pub struct BfsStateMap {
    map: HashMap<NodeId, BfsState>,
}

impl BfsStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a search root: visited, with no incoming edge.
    pub fn insert_root(&mut self, node: NodeId) {
        self.map.insert(node, BfsState::default());
    }

    pub fn insert(&mut self, node: NodeId, edge: EdgeId) {
        self.map.insert(node, BfsState { edge: Some(edge) });
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.map.contains_key(&node)
    }

    /// The edge by which the search first reached `node`, if `node` was
    /// visited and is not a root.
    pub fn predecessor_edge(&self, node: NodeId) -> Option<EdgeId> {
        self.map.get(&node).and_then(|s| s.edge)
    }

    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.map.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roots_have_no_predecessor() {
        let mut map = BfsStateMap::new();
        map.insert_root(NodeId(0));
        map.insert(NodeId(1), EdgeId(5));

        assert!(map.contains(NodeId(0)));
        assert_eq!(map.predecessor_edge(NodeId(0)), None);
        assert_eq!(map.predecessor_edge(NodeId(1)), Some(EdgeId(5)));
        assert_eq!(map.predecessor_edge(NodeId(2)), None);
        assert_eq!(map.len(), 2);
    }
}
