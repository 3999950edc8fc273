//! Compiles one procedure into a bytecode record.
//!
//! [`ProcedureCompiler`] owns the bytecode writer for a run and prepares
//! everything a [`FunctionAnalyzer`] needs for one body:
//!
//! - the instance scope of the declaring class, unless the procedure is a
//!   class method
//! - the analysis context (self type, namespace, staticness)
//! - the record header (symbol, vti, argument and variable counts)
//!
//! # Example
//!
//! ```ignore
//! let mut compiler = ProcedureCompiler::new(&registry, &mut session, AnalyzerOptions::default());
//! let record = compiler.compile(cat, method, &body)?;
//! assert_eq!(record.header.vti, method.vti);
//! ```

use glyph_core::{
    ClassEntry, CompilationError, ProcedureEntry, ProcedureKind, Result, Span, Symbol, Token,
    TokenStream,
};
use glyph_registry::TypeRegistry;
use tracing::debug;

use crate::analyzer::{AnalysisContext, FunctionAnalyzer};
use crate::bytecode::BytecodeChunk;
use crate::emit::BytecodeWriter;
use crate::options::AnalyzerOptions;
use crate::scope::{Scope, Variable};
use crate::session::CompilationSession;

/// Metadata emitted together with a procedure's bytecode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureHeader {
    pub symbol: Symbol,
    pub kind: ProcedureKind,
    /// Virtual table index.
    pub vti: u32,
    pub argument_count: usize,
    /// Implemented by the host; the record carries no code.
    pub native: bool,
    /// Slot ids the body uses, arguments included.
    pub variable_count: usize,
}

/// A compiled procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureRecord {
    pub header: ProcedureHeader,
    pub code: BytecodeChunk,
}

/// Build the instance scope of `class`.
///
/// Slot ids follow the fields inherited from superclasses. Inside an
/// initializer non-optional fields start uninitialized; everywhere else
/// every field is initialized.
pub fn instance_scope(
    registry: &TypeRegistry,
    class: &ClassEntry,
    initializer: bool,
) -> Result<Scope> {
    let inherited: usize = registry
        .superclass_chain(class.type_hash)
        .skip(1)
        .map(|ancestor| ancestor.instance_variables.len())
        .sum();

    let mut scope = Scope::new();
    for (offset, field) in class.instance_variables.iter().enumerate() {
        let span = Span::default();
        let id = u8::try_from(inherited + offset).map_err(|_| {
            CompilationError::TooManyVariables {
                limit: usize::from(u8::MAX) + 1,
                span,
            }
        })?;
        let mut variable = Variable::new(field.name.clone(), field.ty.clone(), id, span);
        if !initializer || field.ty.is_optional() {
            variable = variable.initialized();
        }
        scope.declare(variable)?;
    }
    Ok(scope)
}

/// Compiles the procedures of one run, one at a time.
pub struct ProcedureCompiler<'a> {
    registry: &'a TypeRegistry,
    session: &'a mut CompilationSession,
    writer: BytecodeWriter,
    options: AnalyzerOptions,
}

impl<'a> ProcedureCompiler<'a> {
    pub fn new(
        registry: &'a TypeRegistry,
        session: &'a mut CompilationSession,
        options: AnalyzerOptions,
    ) -> Self {
        Self {
            registry,
            session,
            writer: BytecodeWriter::new(),
            options,
        }
    }

    /// Compile `procedure` of `class` from its body tokens.
    ///
    /// `body` runs up to and including the closing `🍉`. Native procedures
    /// ignore it and get an empty record.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn compile(
        &mut self,
        class: &ClassEntry,
        procedure: &ProcedureEntry,
        body: &[Token],
    ) -> Result<ProcedureRecord> {
        let mut header = ProcedureHeader {
            symbol: procedure.symbol,
            kind: procedure.kind,
            vti: procedure.vti,
            argument_count: procedure.argument_count(),
            native: procedure.is_native(),
            variable_count: 0,
        };
        if header.native {
            return Ok(ProcedureRecord {
                header,
                code: BytecodeChunk::new(),
            });
        }

        debug!(
            symbol = %procedure.symbol,
            kind = procedure.kind.describe(),
            class = %class.name,
            tokens = body.len(),
            "compiling procedure"
        );

        // Leftovers of a procedure whose analysis failed.
        self.writer.reset_for_procedure();

        let is_static = procedure.kind == ProcedureKind::ClassMethod;
        let initializer = procedure.is_initializer();
        let mut instance = if is_static {
            None
        } else {
            Some(instance_scope(self.registry, class, initializer)?)
        };
        let context = AnalysisContext::new(class.self_type(), class.namespace, is_static);

        let mut tokens = TokenStream::new(body);
        let analyzer = FunctionAnalyzer::new(
            self.registry,
            &mut tokens,
            &mut self.writer,
            &mut *self.session,
            instance.as_mut(),
            context,
            self.options,
        );
        let summary = analyzer.analyze(
            &procedure.arguments,
            procedure.return_type.clone(),
            initializer.then_some(procedure),
        )?;

        if let Some(token) = tokens.peek() {
            return Err(CompilationError::UnexpectedToken {
                expected: "end of body".to_string(),
                found: token.describe(),
                span: token.span,
            });
        }

        header.variable_count = summary.variable_count;
        debug_assert_eq!(self.writer.open_placeholders(), 0, "unfilled placeholders");
        let code = self.writer.reset_for_procedure();
        debug!(
            symbol = %procedure.symbol,
            words = code.len(),
            variables = summary.variable_count,
            "compiled procedure"
        );
        Ok(ProcedureRecord { header, code })
    }
}
