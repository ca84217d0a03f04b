//! Source spans attached to AST nodes

use serde::{Deserialize, Serialize};

/// A region of source text, carried by every AST node for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    /// Byte offset of the first character
    pub start: u32,
    /// Byte offset one past the last character
    pub end: u32,
    /// 1-based line of the first character
    pub line: u32,
    /// 1-based column of the first character
    pub column: u32,
}

impl Span {
    /// Create a new span
    pub fn new(start: u32, end: u32, line: u32, column: u32) -> Self {
        Span {
            start,
            end,
            line,
            column,
        }
    }

    /// A zero-width placeholder span (synthetic nodes, tests)
    pub fn dummy() -> Self {
        Span::new(0, 0, 1, 1)
    }
}

impl Default for Span {
    fn default() -> Self {
        Span::dummy()
    }
}
