//! Code generation errors

use mica_sema::SemaError;
use thiserror::Error;

pub type CompileResult<T> = Result<T, CompileError>;

#[derive(Debug, Error)]
pub enum CompileError {
    /// Resolution reported diagnostics; no artifact was produced.
    #[error("semantic analysis failed with {} error(s)", errors.len())]
    Resolution { errors: Vec<SemaError> },

    /// The AST reached code generation without the annotations the
    /// resolution pass was supposed to leave behind.
    #[error("precondition violated: {message}")]
    Precondition { message: String },

    #[error("unknown class `{name}`")]
    UnknownClass { name: String },

    #[error("class `{class}` has no member `{member}`")]
    UnresolvedMember { class: String, member: String },
}

impl CompileError {
    pub(crate) fn precondition(message: impl Into<String>) -> Self {
        CompileError::Precondition {
            message: message.into(),
        }
    }
}
