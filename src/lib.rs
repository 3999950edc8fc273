//! glyphc: static analysis and bytecode generation for glyph programs.
//!
//! The declaration parser fills a [`TypeRegistry`] with every class,
//! protocol and enum of a program. Procedure bodies are then handed to a
//! [`Unit`] as pre-lexed token streams and built into a
//! [`CompiledProgram`].
//!
//! # Example
//!
//! ```ignore
//! let mut unit = Unit::new(&registry);
//! unit.add_body(cat, ProcedureKind::Method, lives, tokens)?;
//! let program = unit.build()?;
//!
//! for procedure in &program.procedures {
//!     let record = &procedure.record;
//!     println!("{} {} words", record.header.symbol, record.code.len());
//! }
//! ```

mod unit;

pub use unit::{CompiledProcedure, CompiledProgram, Unit, UnitError};

pub use glyph_compiler::{
    AnalysisContext, AnalysisSummary, AnalyzerOptions, BytecodeChunk, BytecodeWriter,
    CompilationSession, FunctionAnalyzer, OpCode, ProcedureCompiler, ProcedureHeader,
    ProcedureRecord, Scope, ScopeTracker, StringPool, Variable, instance_scope,
};
pub use glyph_core::{
    Argument, ClassEntry, CompilationError, CompilationWarning, Construct, EnumEntry,
    ProcedureEntry, ProcedureFlags, ProcedureKind, ProtocolEntry, RegistrationError, Span, Symbol,
    Token, TokenKind, TokenStream, Type, TypeHash, TypeKind, Visibility, glyphs, standard,
};
pub use glyph_registry::{Dynamism, TypeRegistry};
