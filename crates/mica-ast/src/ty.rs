//! The Mica type model
//!
//! Types are structural for primitives and arrays and nominal for classes.
//! Class subtyping (the ancestor-chain walk) needs the class registry and
//! lives in the analysis crate; this module only knows what a type *is* and
//! how it renders as a Jasmin descriptor.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A Mica type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Type {
    /// 32-bit signed integer
    Int,
    /// `true` / `false`
    Boolean,
    /// Immutable string
    Str,
    /// Array with a fixed element type
    Array(Box<Type>),
    /// Reference to a declared class, by name
    Class(String),
}

impl Type {
    /// Shorthand for an array of `element`.
    pub fn array(element: Type) -> Self {
        Type::Array(Box::new(element))
    }

    /// Shorthand for a class reference.
    pub fn class(name: impl Into<String>) -> Self {
        Type::Class(name.into())
    }

    /// Whether values of this type live on the operand stack as plain
    /// integers. Value types use the `i`-family load/store instructions,
    /// everything else the `a`-family.
    pub fn is_value(&self) -> bool {
        matches!(self, Type::Int | Type::Boolean)
    }

    /// The Jasmin type descriptor for this type.
    pub fn descriptor(&self) -> String {
        match self {
            Type::Int => "I".to_string(),
            Type::Boolean => "Z".to_string(),
            Type::Str => "Ljava/lang/String;".to_string(),
            Type::Array(element) => format!("[{}", element.descriptor()),
            Type::Class(name) => format!("L{};", name),
        }
    }

    /// The internal name used by `new` / `anewarray` operands.
    pub fn internal_name(&self) -> String {
        match self {
            Type::Str => "java/lang/String".to_string(),
            Type::Class(name) => name.clone(),
            other => other.descriptor(),
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Int => write!(f, "int"),
            Type::Boolean => write!(f, "boolean"),
            Type::Str => write!(f, "string"),
            Type::Array(element) => write!(f, "{}[]", element),
            Type::Class(name) => write!(f, "{}", name),
        }
    }
}
