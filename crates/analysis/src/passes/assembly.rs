//! Arbitrary-execution attribution for functions with no analyzable
//! body: no IR blocks and no synthetic marker means genuinely external
//! code (hand-written assembly, object files) whose behavior the
//! analyzer cannot bound.

use crate::core::capability::Capability;
use crate::core::nodeset::NodesPerCapability;
use capgraph_ir::Program;

pub fn scan(program: &Program, out: &mut NodesPerCapability) {
    for node_id in program.call_graph.node_ids() {
        let Some(func_id) = program.call_graph.node(node_id).func else {
            continue;
        };
        if program.func(func_id).is_external_code() {
            out.add(Capability::ArbitraryExecution, node_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capgraph_ir::ProgramBuilder;

    #[test]
    fn test_external_code_is_flagged_synthetic_is_not() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let asm = b.add_function(Some(p), "app.fastSum");
        b.mark_external(asm);
        let wrapper = b.add_function(Some(p), "app.fastSum$thunk");
        b.mark_synthetic(wrapper, "thunk");
        let plain = b.add_function(Some(p), "app.Sum");
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        let flagged = out.get(Capability::ArbitraryExecution).unwrap();
        assert!(flagged.contains(&program.call_graph.node_of(asm).unwrap()));
        assert!(!flagged.contains(&program.call_graph.node_of(wrapper).unwrap()));
        assert!(!flagged.contains(&program.call_graph.node_of(plain).unwrap()));
    }
}
