//! Unsafe-pointer conversion detection.
//!
//! A conversion *from* the unchecked-pointer type to anything else
//! launders an arbitrary address into typed memory; that is the event
//! reported. Conversions in function bodies attribute the enclosing
//! function via its syntax link. Conversions in package-level variable
//! initializers have no enclosing declared function, so the package's
//! synthesized init function is attributed instead.

use crate::core::capability::Capability;
use crate::core::nodeset::NodesPerCapability;
use capgraph_ir::{AstId, Decl, Expr, PackageId, Program};
use std::collections::HashSet;

fn is_unsafe_conversion(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Conversion {
            target, operand_ty, ..
        } if operand_ty.is_unsafe_pointer() && !target.is_unsafe_pointer()
    )
}

pub fn scan(program: &Program, out: &mut NodesPerCapability) {
    let mut flagged_decls: HashSet<AstId> = HashSet::new();
    let mut flagged_packages: HashSet<PackageId> = HashSet::new();

    for package_id in program.package_ids() {
        for file in &program.package(package_id).files {
            for decl in &file.decls {
                match decl {
                    Decl::Func(func_decl) => {
                        let mut found = false;
                        for stmt in &func_decl.body {
                            stmt.walk_exprs(&mut |e| found |= is_unsafe_conversion(e));
                        }
                        if found {
                            flagged_decls.insert(func_decl.id);
                        }
                    }
                    Decl::Var(var_decl) => {
                        if let Some(init) = &var_decl.init {
                            let mut found = false;
                            init.walk(&mut |e| found |= is_unsafe_conversion(e));
                            if found {
                                flagged_packages.insert(package_id);
                            }
                        }
                    }
                    Decl::Const(_) => {}
                }
            }
        }
    }

    if flagged_decls.is_empty() && flagged_packages.is_empty() {
        return;
    }

    for func_id in program.func_ids() {
        if let Some(syntax) = program.func(func_id).syntax {
            if flagged_decls.contains(&syntax) {
                if let Some(node) = program.call_graph.node_of(func_id) {
                    out.add(Capability::UnsafePointer, node);
                }
            }
        }
    }
    for package_id in flagged_packages {
        if let Some(init) = program.package(package_id).init {
            if let Some(node) = program.call_graph.node_of(init) {
                out.add(Capability::UnsafePointer, node);
            }
        }
    }
}
