//! Mica semantic analysis
//!
//! The analysis half of the compiler backend. Given a parsed [`Program`],
//! it builds the class registry and per-scope symbol tables, resolves every
//! identifier, member access, and method call across the single-inheritance
//! hierarchy, and records the resolved type of every expression in side
//! tables the code generator reads back.
//!
//! Errors are recovered locally so one run surfaces as many diagnostics as
//! possible; the pass succeeds only when no diagnostic was recorded.
//!
//! ```ignore
//! use mica_sema::resolve;
//!
//! match resolve(&program) {
//!     Ok(resolution) => { /* hand resolution.analysis to codegen */ }
//!     Err(errors) => { /* report all of them */ }
//! }
//! ```
//!
//! [`Program`]: mica_ast::Program

pub mod diagnostic;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod symbols;

pub use diagnostic::Diagnostic;
pub use error::SemaError;
pub use registry::ClassRegistry;
pub use resolver::{resolve, Analysis, Binding, Resolution};
pub use symbols::{ScopeKind, ScopeTable, SymbolEntry};
