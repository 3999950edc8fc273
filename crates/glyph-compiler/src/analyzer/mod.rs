//! Expression and statement analysis of procedure bodies.
//!
//! The [`FunctionAnalyzer`] walks the token stream of one procedure body in
//! a single recursive descent. Every token starts an expression; the
//! analyzer resolves its static type, checks it against the type expected by
//! the enclosing construct and writes the bytecode for it as it goes.
//! Words whose value depends on not yet analyzed tokens are reserved as
//! placeholders and filled once the subtree is written.
//!
//! One analyzer is created per procedure or closure and consumed by
//! [`FunctionAnalyzer::analyze`], so no state survives from one body to the
//! next.
//!
//! # Example
//!
//! ```ignore
//! let analyzer = FunctionAnalyzer::new(
//!     &registry,
//!     &mut tokens,
//!     &mut writer,
//!     &mut session,
//!     Some(&mut fields),
//!     context,
//!     AnalyzerOptions::default(),
//! );
//! let summary = analyzer.analyze(&method.arguments, method.return_type.clone(), None)?;
//! ```

mod calls;
mod casts;
mod closures;
mod collections;
mod control_flow;
mod literals;
mod objects;
mod primitive;
mod variables;

use std::ops::Range;

use glyph_core::{
    Argument, ClassEntry, CompilationError, CompilationWarning, Construct, Identifier,
    ProcedureEntry, Result, Span, Symbol, Token, TokenCategory, TokenKind, TokenStream, Type,
    Visibility,
};
use glyph_registry::{Dynamism, TypeRegistry};
use tracing::debug;

use crate::bytecode::OpCode;
use crate::emit::BytecodeWriter;
use crate::options::AnalyzerOptions;
use crate::scope::{Scope, ScopeTracker, Variable};
use crate::session::CompilationSession;

/// Where a body is analyzed.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisContext {
    /// The class the procedure belongs to, with its generic parameters open.
    pub self_type: Type,
    /// Namespace used for unqualified type names.
    pub namespace: Symbol,
    /// Whether the body runs without an instance (class methods).
    pub is_static: bool,
}

impl AnalysisContext {
    pub fn new(self_type: Type, namespace: Symbol, is_static: bool) -> Self {
        Self {
            self_type,
            namespace,
            is_static,
        }
    }
}

/// What the caller needs to know once a body was analyzed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
    /// Number of slot ids the body uses, arguments included.
    pub variable_count: usize,
    /// Whether the body refers to the instance.
    pub used_self: bool,
}

/// Analyzes one procedure or closure body.
pub struct FunctionAnalyzer<'a, 't> {
    /// Declarations of every type
    registry: &'a TypeRegistry,
    /// The body being analyzed
    tokens: &'a mut TokenStream<'t>,
    /// Output of the procedure being compiled
    writer: &'a mut BytecodeWriter,
    /// String pool and warnings of the run
    session: &'a mut CompilationSession,
    /// Local scopes plus the shared instance scope
    scopes: ScopeTracker<'a>,
    context: AnalysisContext,
    options: AnalyzerOptions,
    /// Type every return value must be compatible with
    return_type: Type,
    /// Set while analyzing an initializer
    initializer: Option<&'a ProcedureEntry>,
    /// Next free slot id
    variable_count: usize,
    /// Slot ids holding copies of an enclosing body's variables
    captured: Range<usize>,
    /// Number of conditional blocks around the current token
    flow_control_depth: u32,
    /// Whether the current statement did something besides computing a value
    effect: bool,
    /// Whether the body returned unconditionally
    returned: bool,
    used_self: bool,
    called_super: bool,
}

impl<'a, 't> FunctionAnalyzer<'a, 't> {
    /// Create an analyzer.
    ///
    /// # Arguments
    ///
    /// * `instance` - Fields of the object, `None` in static contexts
    /// * `context` - The class and namespace the body belongs to
    pub fn new(
        registry: &'a TypeRegistry,
        tokens: &'a mut TokenStream<'t>,
        writer: &'a mut BytecodeWriter,
        session: &'a mut CompilationSession,
        instance: Option<&'a mut Scope>,
        context: AnalysisContext,
        options: AnalyzerOptions,
    ) -> Self {
        Self {
            registry,
            tokens,
            writer,
            session,
            scopes: ScopeTracker::new(instance),
            context,
            options,
            return_type: Type::nothingness(),
            initializer: None,
            variable_count: 0,
            captured: 0..0,
            flow_control_depth: 0,
            effect: false,
            returned: false,
            used_self: false,
            called_super: false,
        }
    }

    /// Analyze a procedure body up to and including its closing `🍉`.
    ///
    /// Arguments occupy the first slot ids. `initializer` is the entry of
    /// the initializer being compiled, if any.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn analyze(
        self,
        arguments: &[Argument],
        return_type: Type,
        initializer: Option<&'a ProcedureEntry>,
    ) -> Result<AnalysisSummary> {
        self.run(arguments, return_type, initializer, &[], 0)
    }

    fn run(
        mut self,
        arguments: &[Argument],
        return_type: Type,
        initializer: Option<&'a ProcedureEntry>,
        captured: &[Variable],
        outer_variable_count: usize,
    ) -> Result<AnalysisSummary> {
        self.return_type = return_type;
        self.initializer = initializer;

        let span = self.tokens.end_span();
        for argument in arguments {
            let id = self.next_variable_id(span)?;
            let variable = Variable::new(argument.name.clone(), argument.ty.clone(), id, span);
            self.scopes.declare_local(variable.initialized().frozen())?;
        }

        if outer_variable_count > 0 {
            let first = self.variable_count;
            self.captured = first..first + outer_variable_count;
            for variable in captured {
                if self.scopes.declared_in_current(&variable.name) {
                    continue;
                }
                let id = self.slot_id(first + usize::from(variable.id), span)?;
                self.scopes.declare_local(Variable {
                    id,
                    ..variable.clone()
                })?;
            }
            self.variable_count = self.captured.end;
        }

        let end = self.statements()?;
        self.finish(end)
    }

    /// The statement loop of the body. Returns the span of the closing `🍉`.
    fn statements(&mut self) -> Result<Span> {
        let mut dead_code_reported = false;
        loop {
            let token = self.tokens.next_required()?;
            if token.is(Construct::BlockClose) {
                return Ok(token.span);
            }
            self.statement(token)?;

            if self.returned && !dead_code_reported {
                let Some(next) = self.tokens.peek() else {
                    continue;
                };
                if next.is(Construct::BlockClose) {
                    continue;
                }
                dead_code_reported = true;
                self.warn(CompilationWarning::DeadCode { span: next.span });
                if !self.options.compile_dead_code {
                    return self.skip_to_block_end();
                }
            }
        }
    }

    /// Consume tokens up to the `🍉` closing the current body.
    fn skip_to_block_end(&mut self) -> Result<Span> {
        let mut depth = 0usize;
        loop {
            let token = self.tokens.next_required()?;
            if token.is(Construct::BlockOpen) {
                depth += 1;
            } else if token.is(Construct::BlockClose) {
                if depth == 0 {
                    return Ok(token.span);
                }
                depth -= 1;
            }
        }
    }

    fn finish(mut self, end: Span) -> Result<AnalysisSummary> {
        if self.options.recommend_frozen {
            let scope = self.scopes.current();
            let recommendations: Vec<_> = scope
                .frozen_recommendations()
                .filter(|variable| !self.captured.contains(&usize::from(variable.id)))
                .map(|variable| CompilationWarning::FrozenRecommendation {
                    name: variable.name.clone(),
                    span: variable.span,
                })
                .collect();
            for warning in recommendations {
                self.warn(warning);
            }
        }

        if !self.return_type.is_nothingness() && !self.returned {
            return Err(CompilationError::MissingReturn { span: end });
        }

        if self.initializer.is_some() {
            self.scopes.check_all_initialized(end)?;
            let has_superclass = self
                .declaring_class()
                .is_some_and(|class| class.superclass.is_some());
            if has_superclass && !self.called_super {
                return Err(CompilationError::MissingSuperinitializer { span: end });
            }
        }

        debug!(
            variables = self.variable_count,
            words = self.writer.word_count(),
            used_self = self.used_self,
            "analyzed body"
        );
        Ok(AnalysisSummary {
            variable_count: self.variable_count,
            used_self: self.used_self,
        })
    }

    // ==========================================================================
    // Statements and Expressions
    // ==========================================================================

    /// Analyze one statement, warning if it has no effect.
    fn statement(&mut self, token: &'t Token) -> Result<()> {
        self.effect = false;
        self.expression(token, None)?;
        if !self.effect {
            self.warn(CompilationWarning::NoEffect { span: token.span });
        }
        Ok(())
    }

    /// Analyze the expression starting at `token` and return its type.
    ///
    /// `expected` is only a hint for literals without elements; callers
    /// that require a type use [`Self::expression_expecting`].
    fn expression(&mut self, token: &'t Token, expected: Option<&Type>) -> Result<Type> {
        self.writer.set_line(token.span.line);
        match &token.kind {
            TokenKind::String(value) => Ok(literals::string(self, value)),
            TokenKind::BooleanTrue => Ok(literals::boolean(self, true)),
            TokenKind::BooleanFalse => Ok(literals::boolean(self, false)),
            TokenKind::Integer(value) => Ok(literals::integer(self, *value)),
            TokenKind::Double(value) => Ok(literals::double(self, value.into_inner())),
            TokenKind::Symbol(symbol) => Ok(literals::symbol(self, *symbol)),
            TokenKind::Variable(name) => variables::read(self, name, token.span),
            TokenKind::Identifier(identifier) => self.identifier(token, *identifier, expected),
            TokenKind::DocumentationComment(_) => Err(CompilationError::invalid_operation(
                "misplaced documentation comment",
                token.span,
            )),
            TokenKind::ArgumentBracketOpen | TokenKind::ArgumentBracketClose => {
                Err(CompilationError::UnexpectedToken {
                    expected: "expression".to_string(),
                    found: token.describe(),
                    span: token.span,
                })
            }
        }
    }

    fn identifier(
        &mut self,
        token: &'t Token,
        identifier: Identifier,
        expected: Option<&Type>,
    ) -> Result<Type> {
        if identifier.construct != Construct::Return {
            self.effect = true;
        }

        match identifier.construct {
            Construct::Declare => variables::declare(self),
            Construct::Assign => variables::assign(self),
            Construct::FrozenDeclare => variables::declare_frozen(self),
            Construct::Increment => variables::step(self, token, true),
            Construct::Decrement => variables::step(self, token, false),
            Construct::Concatenate => collections::concatenate(self),
            Construct::ListLiteral => collections::list(self, token, expected),
            Construct::DictionaryLiteral => collections::dictionary(self, token, expected),
            Construct::If => control_flow::if_chain(self),
            Construct::RepeatWhile => control_flow::repeat_while(self),
            Construct::ForIn => control_flow::for_in(self, token),
            Construct::Return => control_flow::return_value(self, token),
            Construct::SelfReference => objects::self_reference(self, token),
            Construct::EnumAccess => objects::enum_value(self, token),
            Construct::Instantiate => objects::instantiate(self, token),
            Construct::NothingnessLiteral => Ok(literals::nothingness(self)),
            Construct::IsNothingness => objects::is_nothingness(self),
            Construct::IdentityCompare => objects::identity_compare(self),
            Construct::Superinitializer => objects::superinitializer(self, token),
            Construct::Cast => casts::cast(self, token),
            Construct::Unwrap => casts::unwrap(self, token),
            Construct::OptionalChainCall => calls::optional_chain(self, token),
            Construct::ClassMethodCall => calls::class_method(self),
            Construct::CaptureMethod => calls::capture_method(self),
            Construct::InvokeCallable => calls::invoke_callable(self),
            Construct::SuperMethodCall => calls::super_method(self, token),
            Construct::BlockOpen => closures::closure(self),
            Construct::Method(method) => calls::method_call(self, method, token),
            Construct::ElseIf
            | Construct::Else
            | Construct::BlockClose
            | Construct::CollectionEnd
            | Construct::DynamicClass => Err(CompilationError::UnexpectedToken {
                expected: "expression".to_string(),
                found: token.describe(),
                span: token.span,
            }),
        }
    }

    /// Analyze the expression at `token` and require its type to be
    /// compatible with `expected`.
    fn expression_expecting(&mut self, token: &'t Token, expected: &Type) -> Result<Type> {
        let ty = self.expression(token, Some(expected))?;
        if !self.registry.is_compatible(&ty, expected) {
            return Err(CompilationError::Castability {
                expected: self.type_name(expected),
                found: self.type_name(&ty),
                span: token.span,
            });
        }
        Ok(ty)
    }

    /// Analyze the next expression.
    fn next_expression(&mut self) -> Result<Type> {
        let token = self.tokens.next_required()?;
        self.expression(token, None)
    }

    /// Analyze the next expression against `expected`.
    fn next_expression_expecting(&mut self, expected: &Type) -> Result<Type> {
        let token = self.tokens.next_required()?;
        self.expression_expecting(token, expected)
    }

    // ==========================================================================
    // Helpers
    // ==========================================================================

    fn warn(&mut self, warning: CompilationWarning) {
        self.session.warn(warning);
    }

    fn type_name(&self, ty: &Type) -> String {
        self.registry.type_name(ty)
    }

    /// The class the body belongs to.
    fn declaring_class(&self) -> Option<&'a ClassEntry> {
        let registry = self.registry;
        self.context
            .self_type
            .class_hash()
            .and_then(|hash| registry.class(hash))
    }

    fn class_of(&self, ty: &Type) -> Option<&'a ClassEntry> {
        let registry = self.registry;
        ty.class_hash().and_then(|hash| registry.class(hash))
    }

    /// Dynamic classes may be named in class methods only.
    fn dynamism(&self) -> Dynamism {
        if self.context.is_static {
            Dynamism::AllowDynamicClass
        } else {
            Dynamism::NoDynamism
        }
    }

    /// Read a type annotation.
    fn annotation(&mut self, dynamism: Dynamism) -> Result<(Type, bool)> {
        self.registry.resolve_annotated_type(
            self.tokens,
            &self.context.self_type,
            self.context.namespace,
            dynamism,
        )
    }

    /// Consume a variable token.
    fn expect_variable(&mut self) -> Result<(&'t str, Span)> {
        let token = self.tokens.expect(TokenCategory::Variable)?;
        match token.as_variable() {
            Some(name) => Ok((name, token.span)),
            None => Err(CompilationError::UnexpectedToken {
                expected: TokenCategory::Variable.to_string(),
                found: token.describe(),
                span: token.span,
            }),
        }
    }

    /// Consume an identifier token naming a method, initializer or value.
    fn expect_name(&mut self) -> Result<(Symbol, Span)> {
        let token = self.tokens.expect(TokenCategory::Identifier)?;
        match token.as_identifier() {
            Some(identifier) => Ok((identifier.symbol, token.span)),
            None => Err(CompilationError::UnexpectedToken {
                expected: TokenCategory::Identifier.to_string(),
                found: token.describe(),
                span: token.span,
            }),
        }
    }

    /// Hand out the next slot id.
    fn next_variable_id(&mut self, span: Span) -> Result<u8> {
        let id = self.slot_id(self.variable_count, span)?;
        self.variable_count += 1;
        Ok(id)
    }

    fn slot_id(&self, slot: usize, span: Span) -> Result<u8> {
        let limit = self.options.max_variables;
        if slot >= limit {
            return Err(CompilationError::TooManyVariables { limit, span });
        }
        u8::try_from(slot).map_err(|_| CompilationError::TooManyVariables { limit, span })
    }

    /// Write the local or instance variant of a variable opcode.
    fn write_for_scopes_up(
        &mut self,
        scopes_up: u8,
        local: OpCode,
        instance: OpCode,
        span: Span,
    ) -> Result<()> {
        match scopes_up {
            0 => self.writer.write_op(local),
            1 => {
                self.writer.write_op(instance);
                self.used_self = true;
            }
            _ => {
                return Err(CompilationError::invalid_operation(
                    "variable cannot be resolved from this scope",
                    span,
                ));
            }
        }
        Ok(())
    }

    /// Fail unless every instance variable is initialized.
    fn check_instance_initialized(&self, span: Span) -> Result<()> {
        if self.initializer.is_some() {
            self.scopes.check_all_initialized(span)?;
        }
        Ok(())
    }

    /// Enforce the visibility of a procedure.
    fn check_access(&self, procedure: &ProcedureEntry, span: Span) -> Result<()> {
        let context = self.context.self_type.class_hash();
        let allowed = match procedure.visibility {
            Visibility::Public => true,
            Visibility::Private => context.is_some() && context == procedure.owner,
            Visibility::Protected => match (context, procedure.owner) {
                (Some(context), Some(owner)) => self.registry.inherits_from(context, owner),
                _ => false,
            },
        };
        if allowed {
            return Ok(());
        }
        Err(CompilationError::AccessDenied {
            kind: procedure.kind.describe(),
            name: procedure.symbol.to_string(),
            visibility: procedure.visibility.as_str(),
            span,
        })
    }

    /// Analyze the arguments of a call.
    ///
    /// Arguments may be wrapped in argument brackets. Each one is checked
    /// against its declared type resolved on `called_on`.
    fn check_arguments(&mut self, arguments: &[Argument], called_on: &Type) -> Result<()> {
        let expected: Vec<Type> = arguments
            .iter()
            .map(|argument| argument.ty.resolve_on(called_on))
            .collect();
        self.check_argument_types(&expected)
    }

    /// Analyze call arguments against already resolved types.
    fn check_argument_types(&mut self, expected: &[Type]) -> Result<()> {
        let bracketed = self
            .tokens
            .peek()
            .is_some_and(|token| token.kind == TokenKind::ArgumentBracketOpen);
        if bracketed {
            self.tokens.next();
        }
        for ty in expected {
            self.next_expression_expecting(ty)?;
        }
        if bracketed {
            self.tokens.expect(TokenCategory::ArgumentBracketClose)?;
        }
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod test_support;
