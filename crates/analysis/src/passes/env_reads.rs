//! Environment-variable read scanner.
//!
//! An advisory pass, separate from capability propagation: the oracle
//! already classifies `os.Getenv` and friends as read-environment, so
//! reachability does not depend on this scanner. What it adds is the
//! *names* being read, when they can be resolved statically. Statements
//! that do not match the expected shape contribute nothing.

use crate::core::report::{EnvReadReport, DYNAMIC_VALUE};
use capgraph_ir::ast::unquote;
use capgraph_ir::{Decl, Expr, IdentTarget, Program, Stmt};

/// Import paths whose environment accessors the scanner recognizes.
const ENV_PACKAGES: &[&str] = &["os", "syscall"];
/// Accessor names. `Environ` takes no argument and always reads the
/// whole environment, so it always records the dynamic sentinel.
const ENV_READERS: &[&str] = &["Getenv", "LookupEnv", "Environ"];

pub fn scan_env_reads(program: &Program) -> EnvReadReport {
    let mut report = EnvReadReport::default();
    for package in &program.packages {
        for file in &package.files {
            for decl in &file.decls {
                let Decl::Func(func_decl) = decl else {
                    continue;
                };
                for stmt in &func_decl.body {
                    if let Some(var) = env_read_in_stmt(stmt) {
                        report.record(package.path.as_str(), var);
                    }
                }
            }
        }
    }
    report
}

fn env_read_in_stmt(stmt: &Stmt) -> Option<String> {
    let Stmt::Expr(expr) = stmt else {
        return None;
    };
    let Expr::Call { callee, args, .. } = expr else {
        return None;
    };
    let Expr::Selector { base, name } = callee.as_ref() else {
        return None;
    };
    let Expr::Ident {
        target: IdentTarget::Import { path },
        ..
    } = base.as_ref()
    else {
        return None;
    };
    if !ENV_PACKAGES.contains(&path.as_str()) || !ENV_READERS.contains(&name.as_str()) {
        return None;
    }
    if name == "Environ" {
        return Some(DYNAMIC_VALUE.to_string());
    }
    let var = match args.first() {
        Some(Expr::BasicLit { value }) => unquote(value).to_string(),
        Some(Expr::Ident {
            target: IdentTarget::Const { value },
            ..
        }) => unquote(value).to_string(),
        _ => DYNAMIC_VALUE.to_string(),
    };
    Some(var)
}
