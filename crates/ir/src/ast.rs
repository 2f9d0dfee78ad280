//! Typed syntax trees, one per source file.
//!
//! The loader has already resolved imports and constants, so identifiers
//! carry an [`IdentTarget`] and conversions carry the resolved type of
//! their operand. Passes that walk these trees pattern-match the variants
//! they understand and ignore everything else.

use crate::position::Position;
use crate::types::Type;
use serde::{Deserialize, Serialize};

/// Identity of a function declaration, used to link an IR function back to
/// its syntax.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AstId(pub usize);

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFile {
    pub name: String,
    pub decls: Vec<Decl>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, decls: Vec<Decl>) -> Self {
        Self {
            name: name.into(),
            decls,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Decl {
    Func(FuncDecl),
    /// A package-level variable, possibly with an initializer expression.
    Var(VarDecl),
    Const(ConstDecl),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FuncDecl {
    pub id: AstId,
    pub name: String,
    pub body: Vec<Stmt>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VarDecl {
    pub name: String,
    pub init: Option<Expr>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConstDecl {
    pub name: String,
    /// Raw literal text, quotes included for string constants.
    pub value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Stmt {
    /// An expression evaluated for effect.
    Expr(Expr),
    Assign { target: Expr, value: Expr },
    Return(Option<Expr>),
}

/// What an identifier resolved to, per the loader's type information.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum IdentTarget {
    /// A typed constant; `value` is the raw literal text of its definition.
    Const { value: String },
    /// A package imported under this name.
    Import { path: String },
    /// A variable, parameter, or anything else the passes treat as opaque.
    Other,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Expr {
    /// A literal; `value` is the raw source text (string literals keep
    /// their quotes).
    BasicLit { value: String },
    Ident {
        name: String,
        target: IdentTarget,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
        pos: Option<Position>,
    },
    Selector {
        base: Box<Expr>,
        name: String,
    },
    /// A type conversion `T(x)`. The loader records both the written
    /// target type and the resolved type of the operand.
    Conversion {
        target: Type,
        operand_ty: Type,
        operand: Box<Expr>,
    },
}

impl Expr {
    pub fn string_lit(raw: impl Into<String>) -> Self {
        Expr::BasicLit { value: raw.into() }
    }

    pub fn ident(name: impl Into<String>, target: IdentTarget) -> Self {
        Expr::Ident {
            name: name.into(),
            target,
        }
    }

    /// An identifier naming an imported package.
    pub fn import_ident(name: impl Into<String>, path: impl Into<String>) -> Self {
        Expr::Ident {
            name: name.into(),
            target: IdentTarget::Import { path: path.into() },
        }
    }

    pub fn call(callee: Expr, args: Vec<Expr>) -> Self {
        Expr::Call {
            callee: Box::new(callee),
            args,
            pos: None,
        }
    }

    pub fn selector(base: Expr, name: impl Into<String>) -> Self {
        Expr::Selector {
            base: Box::new(base),
            name: name.into(),
        }
    }

    pub fn conversion(target: Type, operand_ty: Type, operand: Expr) -> Self {
        Expr::Conversion {
            target,
            operand_ty,
            operand: Box::new(operand),
        }
    }

    /// Visit this expression and every sub-expression, outermost first.
    pub fn walk(&self, visit: &mut impl FnMut(&Expr)) {
        visit(self);
        match self {
            Expr::BasicLit { .. } | Expr::Ident { .. } => {}
            Expr::Call { callee, args, .. } => {
                callee.walk(visit);
                for arg in args {
                    arg.walk(visit);
                }
            }
            Expr::Selector { base, .. } => base.walk(visit),
            Expr::Conversion { operand, .. } => operand.walk(visit),
        }
    }
}

impl Stmt {
    /// Visit every expression in this statement.
    pub fn walk_exprs(&self, visit: &mut impl FnMut(&Expr)) {
        match self {
            Stmt::Expr(e) => e.walk(visit),
            Stmt::Assign { target, value } => {
                target.walk(visit);
                value.walk(visit);
            }
            Stmt::Return(Some(e)) => e.walk(visit),
            Stmt::Return(None) => {}
        }
    }
}

/// Strip one level of surrounding double quotes, if present.
///
/// Literal text arrives exactly as written in source; reports always use
/// the unquoted form.
pub fn unquote(raw: &str) -> &str {
    raw.strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unquote() {
        assert_eq!(unquote("\"HOME\""), "HOME");
        assert_eq!(unquote("HOME"), "HOME");
        assert_eq!(unquote("\"unterminated"), "\"unterminated");
        assert_eq!(unquote("\"\""), "");
    }

    #[test]
    fn test_walk_reaches_nested_expressions() {
        let expr = Expr::call(
            Expr::selector(Expr::import_ident("os", "os"), "Getenv"),
            vec![Expr::string_lit("\"HOME\"")],
        );
        let mut lits = Vec::new();
        expr.walk(&mut |e| {
            if let Expr::BasicLit { value } = e {
                lits.push(value.clone());
            }
        });
        assert_eq!(lits, vec!["\"HOME\"".to_string()]);
    }

    #[test]
    fn test_walk_exprs_covers_assign_sides() {
        let stmt = Stmt::Assign {
            target: Expr::ident("x", IdentTarget::Other),
            value: Expr::conversion(
                Type::pointer(Type::basic("int")),
                Type::unsafe_pointer(),
                Expr::ident("p", IdentTarget::Other),
            ),
        };
        let mut conversions = 0;
        stmt.walk_exprs(&mut |e| {
            if matches!(e, Expr::Conversion { .. }) {
                conversions += 1;
            }
        });
        assert_eq!(conversions, 1);
    }
}
