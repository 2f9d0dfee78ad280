//! Capgraph IR - Program Model
//!
//! This crate defines the in-memory program representation that the
//! capability analyzer consumes. A loader front-end (for whatever language
//! is being analyzed) produces a [`Program`]: the queried packages plus
//! their transitive dependencies, each with typed AST files and an IR body
//! per function, and a prebuilt whole-program call graph keyed by function
//! identity.
//!
//! Everything here is `serde`-serializable so a loader running out of
//! process can hand a program to the analyzer as JSON. [`ProgramBuilder`]
//! constructs programs directly in memory, which is how the test suites
//! build fixtures.

pub mod ast;
pub mod builder;
pub mod callgraph;
pub mod package;
pub mod position;
pub mod ssa;
pub mod types;

pub use ast::{AstId, ConstDecl, Decl, Expr, FuncDecl, IdentTarget, SourceFile, Stmt, VarDecl};
pub use builder::ProgramBuilder;
pub use callgraph::{CallGraph, Edge, EdgeId, Node, NodeId};
pub use package::{Package, PackageId, Program, ProgramError};
pub use position::Position;
pub use ssa::{Block, FuncId, Function, Instruction, ValueDef, ValueId};
pub use types::Type;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
