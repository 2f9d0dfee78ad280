//! Type representation attached to IR values and AST conversions.
//!
//! The loader resolves the target language's type system down to this
//! tree. The analyzer only asks two questions of a type: does it
//! (transitively) contain the reflection value type, and is it the
//! unsafe-pointer type. Both questions look through aliases and named
//! types; neither follows pointers, since a pointer to a value is not the
//! value itself.

use serde::{Deserialize, Serialize};

/// Import path of the reflection package in the target language's
/// standard library.
pub const REFLECT_PACKAGE: &str = "reflect";
/// Type name of the dynamic reflection value within [`REFLECT_PACKAGE`].
pub const REFLECT_VALUE: &str = "Value";
/// Import path of the unchecked-pointer package.
pub const UNSAFE_PACKAGE: &str = "unsafe";
/// Type name of the unchecked pointer within [`UNSAFE_PACKAGE`].
pub const UNSAFE_POINTER: &str = "Pointer";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Type {
    /// A predeclared scalar type ("string", "int", "bool", ...).
    Basic(String),
    Pointer(Box<Type>),
    Slice(Box<Type>),
    /// Field types only; field names are irrelevant to the analyzer.
    Struct(Vec<Type>),
    /// A defined type: the package it lives in, its name, and its
    /// underlying type.
    Named {
        package: String,
        name: String,
        underlying: Box<Type>,
    },
    /// A type alias, transparent to all queries.
    Alias(Box<Type>),
}

impl Type {
    pub fn basic(name: impl Into<String>) -> Self {
        Type::Basic(name.into())
    }

    pub fn pointer(elem: Type) -> Self {
        Type::Pointer(Box::new(elem))
    }

    pub fn slice(elem: Type) -> Self {
        Type::Slice(Box::new(elem))
    }

    pub fn named(package: impl Into<String>, name: impl Into<String>, underlying: Type) -> Self {
        Type::Named {
            package: package.into(),
            name: name.into(),
            underlying: Box::new(underlying),
        }
    }

    /// The reflection value type as the loader would emit it.
    pub fn reflect_value() -> Self {
        Type::named(
            REFLECT_PACKAGE,
            REFLECT_VALUE,
            Type::Struct(vec![Type::basic("uintptr")]),
        )
    }

    /// The unchecked-pointer type as the loader would emit it.
    pub fn unsafe_pointer() -> Self {
        Type::named(UNSAFE_PACKAGE, UNSAFE_POINTER, Type::basic("uintptr"))
    }

    /// Strip aliases, yielding the first non-alias type.
    pub fn unalias(&self) -> &Type {
        let mut t = self;
        while let Type::Alias(inner) = t {
            t = inner;
        }
        t
    }

    /// Whether this type is the unchecked-pointer type, looking through
    /// aliases.
    pub fn is_unsafe_pointer(&self) -> bool {
        matches!(
            self.unalias(),
            Type::Named { package, name, .. }
                if package == UNSAFE_PACKAGE && name == UNSAFE_POINTER
        )
    }

    /// Whether a value of this type contains a reflection value,
    /// transitively through aggregates, named types, and aliases.
    ///
    /// Pointers and slices are not followed: storing a pointer to a
    /// reflection value does not copy the value.
    pub fn contains_reflect_value(&self) -> bool {
        match self.unalias() {
            Type::Named {
                package,
                name,
                underlying,
            } => {
                (package == REFLECT_PACKAGE && name == REFLECT_VALUE)
                    || underlying.contains_reflect_value()
            }
            Type::Struct(fields) => fields.iter().any(Type::contains_reflect_value),
            _ => false,
        }
    }
}
