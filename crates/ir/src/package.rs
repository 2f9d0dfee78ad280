//! Packages and the whole-program container.

use crate::ast::SourceFile;
use crate::callgraph::CallGraph;
use crate::ssa::{FuncId, Function, Instruction, ValueId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PackageId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    /// Import path, e.g. `example.com/widget/internal/cache`.
    pub path: String,
    /// Short name, e.g. `cache`.
    pub name: String,
    pub files: Vec<SourceFile>,
    /// The package initializer the loader synthesizes (or compiles from
    /// source) for every package.
    pub init: Option<FuncId>,
}

/// Everything the loader hands the analyzer: the queried packages plus
/// transitive dependencies, all functions, and the call graph over them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Program {
    pub packages: Vec<Package>,
    pub functions: Vec<Function>,
    pub call_graph: CallGraph,
}

/// Referential-integrity failures in a loader-supplied program.
///
/// These indicate a loader bug; the analyzer refuses the program rather
/// than indexing out of bounds later.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProgramError {
    #[error("function {func} references missing package id {package}")]
    DanglingPackage { func: usize, package: usize },
    #[error("function {func} references missing origin function id {origin}")]
    DanglingOrigin { func: usize, origin: usize },
    #[error("call-graph node {node} references missing function id {func}")]
    DanglingNodeFunction { node: usize, func: usize },
    #[error("call-graph edge {edge} references missing node id {node}")]
    DanglingEdgeNode { edge: usize, node: usize },
    #[error("function {func} instruction references missing value id {value}")]
    DanglingValue { func: usize, value: usize },
    #[error("function {func} call references missing function id {callee}")]
    DanglingCallee { func: usize, callee: usize },
    #[error("package {package} init references missing function id {func}")]
    DanglingInit { package: usize, func: usize },
}

impl Program {
    pub fn func(&self, id: FuncId) -> &Function {
        &self.functions[id.0]
    }

    pub fn package(&self, id: PackageId) -> &Package {
        &self.packages[id.0]
    }

    /// Import path of the function's owning package, or `""` for
    /// synthetic functions without one.
    pub fn func_package_path(&self, id: FuncId) -> &str {
        match self.func(id).package {
            Some(p) => &self.package(p).path,
            None => "",
        }
    }

    pub fn package_by_path(&self, path: &str) -> Option<PackageId> {
        self.packages
            .iter()
            .position(|p| p.path == path)
            .map(PackageId)
    }

    pub fn func_ids(&self) -> impl Iterator<Item = FuncId> {
        (0..self.functions.len()).map(FuncId)
    }

    pub fn package_ids(&self) -> impl Iterator<Item = PackageId> {
        (0..self.packages.len()).map(PackageId)
    }

    /// Check referential integrity and rebuild derived indexes. Loaders
    /// that deserialize a program call this before analysis.
    pub fn validate(&mut self) -> Result<(), ProgramError> {
        let n_funcs = self.functions.len();
        let n_pkgs = self.packages.len();
        let n_nodes = self.call_graph.nodes.len();

        for (i, pkg) in self.packages.iter().enumerate() {
            if let Some(init) = pkg.init {
                if init.0 >= n_funcs {
                    return Err(ProgramError::DanglingInit {
                        package: i,
                        func: init.0,
                    });
                }
            }
        }

        for (i, f) in self.functions.iter().enumerate() {
            if let Some(p) = f.package {
                if p.0 >= n_pkgs {
                    return Err(ProgramError::DanglingPackage {
                        func: i,
                        package: p.0,
                    });
                }
            }
            if let Some(o) = f.origin {
                if o.0 >= n_funcs {
                    return Err(ProgramError::DanglingOrigin { func: i, origin: o.0 });
                }
            }
            let n_values = f.values.len();
            let check_value = |v: ValueId| {
                if v.0 >= n_values {
                    Err(ProgramError::DanglingValue { func: i, value: v.0 })
                } else {
                    Ok(())
                }
            };
            for instr in f.instructions() {
                match instr {
                    Instruction::Alloc { result, .. } => check_value(*result)?,
                    Instruction::FieldAddr { result, base }
                    | Instruction::IndexAddr { result, base } => {
                        check_value(*result)?;
                        check_value(*base)?;
                    }
                    Instruction::Store { addr } => check_value(*addr)?,
                    Instruction::Call { callee } => {
                        if callee.0 >= n_funcs {
                            return Err(ProgramError::DanglingCallee {
                                func: i,
                                callee: callee.0,
                            });
                        }
                    }
                }
            }
        }

        for (i, node) in self.call_graph.nodes.iter().enumerate() {
            if let Some(f) = node.func {
                if f.0 >= n_funcs {
                    return Err(ProgramError::DanglingNodeFunction { node: i, func: f.0 });
                }
            }
        }
        for (i, edge) in self.call_graph.edges.iter().enumerate() {
            for node in [edge.caller, edge.callee] {
                if node.0 >= n_nodes {
                    return Err(ProgramError::DanglingEdgeNode { edge: i, node: node.0 });
                }
            }
        }

        self.call_graph.reindex();
        Ok(())
    }
}
