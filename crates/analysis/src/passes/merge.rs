//! Fold derived capabilities into the explicit map.
//!
//! A function the oracle already categorized keeps exactly that
//! category: searches stop at it, so reporting that it *also* contains,
//! say, an unsafe-pointer conversion would double-count what its own
//! classification already covers.

use crate::core::nodeset::{NodeSet, NodesPerCapability};

/// Returns the augmented per-capability map and the set of nodes that
/// carried an explicit classification before merging. Traversals use the
/// latter to stop at explicitly-categorized nodes.
pub fn merge_capabilities(
    mut explicit: NodesPerCapability,
    derived: NodesPerCapability,
) -> (NodesPerCapability, NodeSet) {
    let explicit_set = explicit.union_all();
    for (capability, nodes) in derived.iter() {
        for &node in nodes {
            if explicit_set.contains(&node) {
                continue;
            }
            explicit.add(capability, node);
        }
    }
    (explicit, explicit_set)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::capability::Capability;
    use capgraph_ir::NodeId;

    #[test]
    fn test_derived_fills_gaps_but_never_overrides() {
        let mut explicit = NodesPerCapability::new();
        explicit.add(Capability::Runtime, NodeId(1));

        let mut derived = NodesPerCapability::new();
        derived.add(Capability::UnsafePointer, NodeId(1)); // already explicit
        derived.add(Capability::UnsafePointer, NodeId(2)); // new

        let (merged, explicit_set) = merge_capabilities(explicit, derived);

        assert!(explicit_set.contains(&NodeId(1)));
        assert!(!explicit_set.contains(&NodeId(2)));
        let unsafe_nodes = merged.get(Capability::UnsafePointer).unwrap();
        assert!(!unsafe_nodes.contains(&NodeId(1)));
        assert!(unsafe_nodes.contains(&NodeId(2)));
        assert!(merged.get(Capability::Runtime).unwrap().contains(&NodeId(1)));
    }

    #[test]
    fn test_merge_with_empty_derived_is_identity() {
        let mut explicit = NodesPerCapability::new();
        explicit.add(Capability::Files, NodeId(0));
        let (merged, explicit_set) =
            merge_capabilities(explicit, NodesPerCapability::new());
        assert_eq!(explicit_set.len(), 1);
        assert!(merged.get(Capability::Files).unwrap().contains(&NodeId(0)));
    }
}
