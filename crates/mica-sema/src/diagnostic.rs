//! Diagnostic rendering for semantic errors
//!
//! Turns [`SemaError`] values into `codespan-reporting` diagnostics with a
//! stable error code and a primary label at the offending span, and renders
//! a batch either to a color terminal stream or to plain strings (tests,
//! logs). A JSON dump is available for tooling.

use codespan_reporting::diagnostic::{Diagnostic as CsDiagnostic, Label, Severity};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use termcolor::{ColorChoice, StandardStream};

use crate::error::SemaError;

/// A rendered diagnostic.
pub struct Diagnostic {
    inner: CsDiagnostic<usize>,
}

impl Diagnostic {
    /// Build the diagnostic for a semantic error, labeled against `file_id`.
    pub fn from_sema_error(error: &SemaError, file_id: usize) -> Self {
        let span = error.span();
        let label = Label::primary(file_id, span.start as usize..span.end as usize)
            .with_message(label_message(error));
        let inner = CsDiagnostic::new(Severity::Error)
            .with_message(error.to_string())
            .with_code(error.code())
            .with_labels(vec![label]);
        Diagnostic { inner }
    }

    /// The underlying codespan diagnostic.
    pub fn inner(&self) -> &CsDiagnostic<usize> {
        &self.inner
    }
}

fn label_message(error: &SemaError) -> String {
    match error {
        SemaError::DuplicateClass { name, .. } => format!("`{}` declared again here", name),
        SemaError::DuplicateMember { name, .. } => format!("`{}` declared again here", name),
        SemaError::UnresolvedName { .. } => "not found in any enclosing scope".to_string(),
        SemaError::UnresolvedMember { class, .. } => {
            format!("not found in `{}` or its ancestors", class)
        }
        SemaError::UnknownClass { .. } => "no class with this name is declared".to_string(),
        SemaError::ReservedClassName { .. } => {
            "this name belongs to the generated entry wrapper".to_string()
        }
        SemaError::TooManyLocals { .. } => {
            "too many parameters and locals for one method".to_string()
        }
        SemaError::CyclicInheritance { .. } => "inheritance chain loops back here".to_string(),
        SemaError::TypeMismatch { expected, .. } => format!("expected `{}` here", expected),
    }
}

/// Report a batch of errors to stderr with color.
pub fn emit(errors: &[SemaError], file_name: &str, source: &str) {
    let mut files = SimpleFiles::new();
    let file_id = files.add(file_name, source);

    let writer = StandardStream::stderr(ColorChoice::Auto);
    let config = term::Config::default();
    for error in errors {
        let diagnostic = Diagnostic::from_sema_error(error, file_id);
        // A failed write to stderr leaves nothing better to do.
        let _ = term::emit(&mut writer.lock(), &config, &files, diagnostic.inner());
    }
}

/// Render a batch of errors as plain one-line messages.
pub fn render_plain(errors: &[SemaError]) -> Vec<String> {
    errors
        .iter()
        .map(|e| format!("{}: line {}: {}", e.code(), e.span().line, e))
        .collect()
}

/// Serialize a batch of errors to JSON for tooling.
pub fn to_json(errors: &[SemaError]) -> String {
    serde_json::to_string_pretty(errors).unwrap_or_else(|_| "[]".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mica_ast::Span;

    #[test]
    fn test_plain_rendering_carries_code_and_line() {
        let errors = vec![SemaError::DuplicateClass {
            name: "Point".to_string(),
            span: Span::new(10, 15, 3, 7),
        }];
        let rendered = render_plain(&errors);
        assert_eq!(rendered.len(), 1);
        assert!(rendered[0].starts_with("E1001: line 3:"));
        assert!(rendered[0].contains("Point"));
    }

    #[test]
    fn test_json_dump_is_valid() {
        let errors = vec![SemaError::UnresolvedName {
            name: "ghost".to_string(),
            span: Span::dummy(),
        }];
        let json = to_json(&errors);
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_array());
    }
}
