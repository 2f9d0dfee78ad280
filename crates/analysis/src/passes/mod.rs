//! Node-labeling passes.
//!
//! `classify` consults the oracle; the remaining passes derive
//! capabilities from evidence in the program itself (IR stores, syntax
//! conversions, missing bodies). Derived findings never override an
//! explicit oracle classification — `merge` enforces that.

pub mod assembly;
pub mod classify;
pub mod env_reads;
pub mod merge;
pub mod reflect_escape;
pub mod unsafe_ptr;

use crate::core::nodeset::NodesPerCapability;
use capgraph_ir::Program;

/// Run every derived-capability scanner over the whole program closure.
pub fn run_derived_scanners(program: &Program) -> NodesPerCapability {
    let mut derived = NodesPerCapability::new();
    reflect_escape::scan(program, &mut derived);
    unsafe_ptr::scan(program, &mut derived);
    assembly::scan(program, &mut derived);
    derived
}
