//! Semantic error taxonomy

use mica_ast::Span;
use serde::Serialize;
use thiserror::Error;

/// An error recorded during resolution.
///
/// Every variant carries the span of the offending node. The resolver never
/// stops at the first error; it collects all of them and reports the batch.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
pub enum SemaError {
    #[error("redefinition of class `{name}`")]
    DuplicateClass { name: String, span: Span },

    #[error("duplicate declaration of `{name}` in class `{class}`")]
    DuplicateMember {
        name: String,
        class: String,
        span: Span,
    },

    #[error("use of undeclared name `{name}`")]
    UnresolvedName { name: String, span: Span },

    #[error("class `{class}` has no member `{member}`")]
    UnresolvedMember {
        class: String,
        member: String,
        span: Span,
    },

    #[error("unknown class `{name}`")]
    UnknownClass { name: String, span: Span },

    #[error("class name `{name}` is reserved")]
    ReservedClassName { name: String, span: Span },

    #[error("method `{method}` declares {count} parameter and local slots")]
    TooManyLocals {
        method: String,
        count: usize,
        span: Span,
    },

    #[error("class `{name}` is its own ancestor")]
    CyclicInheritance { name: String, span: Span },

    #[error("type mismatch: expected `{expected}`, found `{found}`")]
    TypeMismatch {
        expected: String,
        found: String,
        span: Span,
    },
}

impl SemaError {
    /// The span of the offending node.
    pub fn span(&self) -> Span {
        match self {
            SemaError::DuplicateClass { span, .. }
            | SemaError::DuplicateMember { span, .. }
            | SemaError::UnresolvedName { span, .. }
            | SemaError::UnresolvedMember { span, .. }
            | SemaError::UnknownClass { span, .. }
            | SemaError::ReservedClassName { span, .. }
            | SemaError::TooManyLocals { span, .. }
            | SemaError::CyclicInheritance { span, .. }
            | SemaError::TypeMismatch { span, .. } => *span,
        }
    }

    /// The stable error code used in rendered diagnostics.
    pub fn code(&self) -> &'static str {
        match self {
            SemaError::DuplicateClass { .. } => "E1001",
            SemaError::DuplicateMember { .. } => "E1002",
            SemaError::UnresolvedName { .. } => "E1003",
            SemaError::UnresolvedMember { .. } => "E1004",
            SemaError::UnknownClass { .. } => "E1005",
            SemaError::CyclicInheritance { .. } => "E1006",
            SemaError::ReservedClassName { .. } => "E1007",
            SemaError::TooManyLocals { .. } => "E1008",
            SemaError::TypeMismatch { .. } => "E2001",
        }
    }
}
