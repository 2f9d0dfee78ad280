//! Reflect-escape detection.
//!
//! Holding a reflection value locally is unremarkable; copying one into
//! memory that outlives the function is the observable event worth
//! reporting, since another goroutine-equivalent can then see or race on
//! it. The pass computes, per function, the set of IR values that stay
//! local — stack allocations plus addresses derived from them — and
//! flags any store whose destination is outside that set and whose
//! pointee type transitively contains a reflection value.

use crate::core::capability::Capability;
use crate::core::nodeset::NodesPerCapability;
use capgraph_ir::{Instruction, Program, Type, ValueId};
use std::collections::HashSet;

pub fn scan(program: &Program, out: &mut NodesPerCapability) {
    for func_id in program.func_ids() {
        let func = program.func(func_id);
        let mut locals: HashSet<ValueId> = HashSet::new();
        let mut flagged = false;

        for instr in func.instructions() {
            match instr {
                Instruction::Alloc { result, heap } => {
                    if !heap {
                        locals.insert(*result);
                    }
                }
                // An address into a local aggregate is itself local.
                Instruction::FieldAddr { result, base }
                | Instruction::IndexAddr { result, base } => {
                    if locals.contains(base) {
                        locals.insert(*result);
                    }
                }
                Instruction::Store { addr } => {
                    if flagged || locals.contains(addr) {
                        continue;
                    }
                    let Some(Type::Pointer(pointee)) =
                        func.value_type(*addr).map(Type::unalias)
                    else {
                        continue;
                    };
                    if pointee.contains_reflect_value() {
                        if let Some(node) = program.call_graph.node_of(func_id) {
                            out.add(Capability::Reflect, node);
                            flagged = true;
                        }
                    }
                }
                Instruction::Call { .. } => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use capgraph_ir::ProgramBuilder;

    fn reflect_slot() -> Type {
        Type::pointer(Type::reflect_value())
    }

    #[test]
    fn test_store_to_shared_reflect_value_is_flagged() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let f = b.add_function(Some(p), "app.Publish");
        let shared = b.add_value(f, reflect_slot());
        b.push_instr(f, Instruction::Store { addr: shared });
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        let node = program.call_graph.node_of(f).unwrap();
        assert!(out.get(Capability::Reflect).unwrap().contains(&node));
    }

    #[test]
    fn test_store_to_local_reflect_value_is_not_flagged() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let f = b.add_function(Some(p), "app.Inspect");
        let local = b.add_value(f, reflect_slot());
        b.push_instr(
            f,
            Instruction::Alloc {
                result: local,
                heap: false,
            },
        );
        b.push_instr(f, Instruction::Store { addr: local });
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        assert!(out.get(Capability::Reflect).is_none());
    }

    #[test]
    fn test_address_into_local_aggregate_stays_local() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let f = b.add_function(Some(p), "app.Fill");
        let aggregate = b.add_value(
            f,
            Type::pointer(Type::Struct(vec![Type::reflect_value()])),
        );
        let field = b.add_value(f, reflect_slot());
        b.push_instr(
            f,
            Instruction::Alloc {
                result: aggregate,
                heap: false,
            },
        );
        b.push_instr(
            f,
            Instruction::FieldAddr {
                result: field,
                base: aggregate,
            },
        );
        b.push_instr(f, Instruction::Store { addr: field });
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        assert!(out.get(Capability::Reflect).is_none());
    }

    #[test]
    fn test_heap_allocation_does_not_count_as_local() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let f = b.add_function(Some(p), "app.Escape");
        let escaped = b.add_value(f, reflect_slot());
        b.push_instr(
            f,
            Instruction::Alloc {
                result: escaped,
                heap: true,
            },
        );
        b.push_instr(f, Instruction::Store { addr: escaped });
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        let node = program.call_graph.node_of(f).unwrap();
        assert!(out.get(Capability::Reflect).unwrap().contains(&node));
    }

    #[test]
    fn test_store_of_plain_type_is_ignored() {
        let mut b = ProgramBuilder::new();
        let p = b.add_package("example.com/app", "app");
        let f = b.add_function(Some(p), "app.Set");
        let shared = b.add_value(f, Type::pointer(Type::basic("int")));
        b.push_instr(f, Instruction::Store { addr: shared });
        let program = b.finish();

        let mut out = NodesPerCapability::new();
        scan(&program, &mut out);
        assert!(out.get(Capability::Reflect).is_none());
    }
}
