//! Mica code generation
//!
//! The emission half of the compiler backend: walks a resolved, annotated
//! AST and produces one stack-machine assembly artifact per class plus the
//! synthetic entry wrapper. [`Compiler`] is the backend pipeline in one
//! call: resolve, then generate.
//!
//! ```ignore
//! use mica_codegen::{ArtifactSink, Compiler, MemorySink};
//!
//! let artifacts = Compiler::new().compile(&program)?;
//! let mut sink = MemorySink::new();
//! for artifact in &artifacts {
//!     sink.write(artifact)?;
//! }
//! ```

pub mod artifact;
pub mod codegen;
pub mod emit;
pub mod error;

pub use artifact::{Artifact, ArtifactSink, DirSink, MemorySink};
pub use codegen::{CodeGenerator, ENTRY_WRAPPER};
pub use emit::{ClassBuilder, MethodBuilder};
pub use error::{CompileError, CompileResult};

use mica_ast::Program;

/// The backend pipeline: resolution followed by code generation.
///
/// Code generation only runs when resolution fully succeeded; a failed
/// resolution aborts with every collected diagnostic and produces no
/// artifact.
#[derive(Debug, Default)]
pub struct Compiler;

impl Compiler {
    pub fn new() -> Self {
        Compiler
    }

    /// Compile a program into its assembly artifacts.
    pub fn compile(&self, program: &Program) -> CompileResult<Vec<Artifact>> {
        let resolution =
            mica_sema::resolve(program).map_err(|errors| CompileError::Resolution { errors })?;
        let generator = CodeGenerator::new(program, &resolution);
        generator.generate()
    }
}
