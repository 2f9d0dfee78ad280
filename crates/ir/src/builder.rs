//! In-memory program construction.
//!
//! `ProgramBuilder` is the loader adapter used by the test suites and by
//! embedders that already have a front-end in process: it keeps the call
//! graph, IR bodies, and package tables consistent as the program grows.

use crate::ast::{AstId, SourceFile};
use crate::callgraph::NodeId;
use crate::package::{Package, PackageId, Program};
use crate::position::Position;
use crate::ssa::{Block, FuncId, Function, Instruction, ValueDef, ValueId};
use crate::types::Type;

#[derive(Debug, Default)]
pub struct ProgramBuilder {
    program: Program,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_package(&mut self, path: impl Into<String>, name: impl Into<String>) -> PackageId {
        let id = PackageId(self.program.packages.len());
        self.program.packages.push(Package {
            path: path.into(),
            name: name.into(),
            files: Vec::new(),
            init: None,
        });
        id
    }

    /// Add a function with one (empty) block, so it reads as analyzable
    /// code until marked otherwise, and register its call-graph node.
    pub fn add_function(&mut self, package: Option<PackageId>, name: impl Into<String>) -> FuncId {
        let id = FuncId(self.program.functions.len());
        let mut f = Function::new(name, package);
        f.blocks.push(Block::default());
        self.program.functions.push(f);
        self.program.call_graph.add_node(Some(id));
        id
    }

    /// A call-graph node with no function behind it (a synthetic root).
    pub fn add_bare_node(&mut self) -> NodeId {
        self.program.call_graph.add_node(None)
    }

    /// Mark `f` as externally-supplied code: no IR body, no synthetic
    /// marker.
    pub fn mark_external(&mut self, f: FuncId) {
        self.program.functions[f.0].blocks.clear();
    }

    /// Mark `f` as loader-fabricated with the given marker.
    pub fn mark_synthetic(&mut self, f: FuncId, marker: impl Into<String>) {
        let func = &mut self.program.functions[f.0];
        func.blocks.clear();
        func.synthetic = Some(marker.into());
    }

    pub fn set_position(&mut self, f: FuncId, pos: Position) {
        self.program.functions[f.0].position = Some(pos);
    }

    pub fn set_origin(&mut self, f: FuncId, origin: FuncId) {
        self.program.functions[f.0].origin = Some(origin);
    }

    pub fn link_syntax(&mut self, f: FuncId, ast: AstId) {
        self.program.functions[f.0].syntax = Some(ast);
    }

    pub fn set_init(&mut self, pkg: PackageId, f: FuncId) {
        self.program.packages[pkg.0].init = Some(f);
    }

    pub fn add_file(&mut self, pkg: PackageId, file: SourceFile) {
        self.program.packages[pkg.0].files.push(file);
    }

    pub fn add_value(&mut self, f: FuncId, ty: Type) -> ValueId {
        let func = &mut self.program.functions[f.0];
        let id = ValueId(func.values.len());
        func.values.push(ValueDef { ty });
        id
    }

    /// Append an instruction to the function's last block.
    pub fn push_instr(&mut self, f: FuncId, instr: Instruction) {
        let func = &mut self.program.functions[f.0];
        if func.blocks.is_empty() {
            func.blocks.push(Block::default());
        }
        func.blocks
            .last_mut()
            .expect("block pushed above")
            .instrs
            .push(instr);
    }

    pub fn add_block(&mut self, f: FuncId) {
        self.program.functions[f.0].blocks.push(Block::default());
    }

    /// Record a call: an edge in the graph and, when the caller has a
    /// body, a call instruction in it.
    pub fn add_call(&mut self, caller: FuncId, callee: FuncId) {
        self.add_call_at(caller, callee, None);
    }

    pub fn add_call_at(&mut self, caller: FuncId, callee: FuncId, site: Option<Position>) {
        let caller_node = self
            .program
            .call_graph
            .node_of(caller)
            .expect("caller added via add_function");
        let callee_node = self
            .program
            .call_graph
            .node_of(callee)
            .expect("callee added via add_function");
        self.program.call_graph.add_edge(caller_node, callee_node, site);
        if !self.program.functions[caller.0].blocks.is_empty() {
            self.push_instr(caller, Instruction::Call { callee });
        }
    }

    pub fn finish(self) -> Program {
        self.program
    }
}
