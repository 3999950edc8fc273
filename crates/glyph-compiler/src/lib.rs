//! Glyph Compiler
//!
//! Static analysis and bytecode generation for procedure bodies.
//!
//! ## Architecture
//!
//! Declarations are registered in a [`glyph_registry::TypeRegistry`] before
//! any body is compiled. Each body is then analyzed in a single pass that
//! type checks and emits bytecode at the same time.
//!
//! ## Modules
//!
//! - [`analyzer`]: Expression and statement analysis of one body
//! - [`bytecode`]: Bytecode types (OpCode, BytecodeChunk, StringPool)
//! - [`emit`]: Bytecode writer with the placeholder protocol
//! - [`options`]: Analyzer switches
//! - [`procedure_compiler`]: Per-procedure setup and records
//! - [`scope`]: Local, block and instance scopes
//! - [`session`]: Strings and warnings of one compilation run

pub mod analyzer;
pub mod bytecode;
pub mod emit;
pub mod options;
pub mod procedure_compiler;
pub mod scope;
pub mod session;

pub use analyzer::{AnalysisContext, AnalysisSummary, FunctionAnalyzer};
pub use bytecode::{BytecodeChunk, OpCode, StringPool};
pub use emit::{BytecodeWriter, CountPlaceholder, Placeholder};
pub use options::AnalyzerOptions;
pub use procedure_compiler::{ProcedureCompiler, ProcedureHeader, ProcedureRecord, instance_scope};
pub use scope::{Scope, ScopeTracker, SlotRef, Variable};
pub use session::CompilationSession;

// Re-export the error types from core for convenience
pub use glyph_core::{CompilationError, CompilationWarning};
