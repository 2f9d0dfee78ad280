//! Single-assignment IR bodies.
//!
//! The loader lowers every analyzable function to blocks of instructions
//! over typed values. The instruction vocabulary is deliberately small: it
//! covers exactly what the capability passes inspect (allocations, address
//! derivation, stores, calls). A function with no blocks and no synthetic
//! marker is externally-supplied code (hand-written assembly or an object
//! file) with no source the analyzer can see.

use crate::ast::AstId;
use crate::package::PackageId;
use crate::position::Position;
use crate::types::Type;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FuncId(pub usize);

/// An SSA register local to one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ValueId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValueDef {
    pub ty: Type,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub instrs: Vec<Instruction>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Instruction {
    /// Reserve storage for a variable; `heap` is true when the allocation
    /// escapes to shared memory.
    Alloc { result: ValueId, heap: bool },
    /// Address of a field of the aggregate behind `base`.
    FieldAddr { result: ValueId, base: ValueId },
    /// Address of an element of the array behind `base`.
    IndexAddr { result: ValueId, base: ValueId },
    /// Copy a value into the location named by `addr`. The type of `addr`
    /// is a pointer to the copied value's type.
    Store { addr: ValueId },
    /// A static call site. Dynamic dispatch appears only in the call
    /// graph, which the loader builds with its own resolution.
    Call { callee: FuncId },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Function {
    /// Symbolic name: `package.Func`, `(receiver).Method`, or
    /// `(*receiver).Method`.
    pub name: String,
    /// Synthetic wrappers may not belong to any package.
    pub package: Option<PackageId>,
    /// For a generic instantiation, the uninstantiated generic function.
    pub origin: Option<FuncId>,
    pub position: Option<Position>,
    /// Set when the loader fabricated this function (wrappers, thunks,
    /// package initializers without source). The marker names the kind.
    pub synthetic: Option<String>,
    /// Link to the function's declaration in the typed AST.
    pub syntax: Option<AstId>,
    pub values: Vec<ValueDef>,
    pub blocks: Vec<Block>,
}

impl Function {
    pub fn new(name: impl Into<String>, package: Option<PackageId>) -> Self {
        Self {
            name: name.into(),
            package,
            origin: None,
            position: None,
            synthetic: None,
            syntax: None,
            values: Vec::new(),
            blocks: Vec::new(),
        }
    }

    pub fn value_type(&self, v: ValueId) -> Option<&Type> {
        self.values.get(v.0).map(|d| &d.ty)
    }

    /// Externally-supplied code: no IR body and not loader-fabricated.
    pub fn is_external_code(&self) -> bool {
        self.blocks.is_empty() && self.synthetic.is_none()
    }

    /// Iterate all instructions across all blocks in program order.
    pub fn instructions(&self) -> impl Iterator<Item = &Instruction> {
        self.blocks.iter().flat_map(|b| b.instrs.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_external_code_requires_no_blocks_and_no_marker() {
        let mut f = Function::new("runtime.memmove", None);
        assert!(f.is_external_code());

        f.synthetic = Some("wrapper".to_string());
        assert!(!f.is_external_code());

        f.synthetic = None;
        f.blocks.push(Block::default());
        assert!(!f.is_external_code());
    }

    #[test]
    fn test_instruction_iteration_spans_blocks() {
        let mut f = Function::new("p.F", None);
        f.values.push(ValueDef {
            ty: Type::pointer(Type::basic("int")),
        });
        f.blocks.push(Block {
            instrs: vec![Instruction::Alloc {
                result: ValueId(0),
                heap: false,
            }],
        });
        f.blocks.push(Block {
            instrs: vec![Instruction::Store { addr: ValueId(0) }],
        });
        assert_eq!(f.instructions().count(), 2);
    }
}
