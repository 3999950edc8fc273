//! Error and diagnostic types.
//!
//! ## Error Hierarchy
//!
//! ```text
//! RegistrationError   - declaration-side failures while filling the registry
//! CompilationError    - fatal analysis errors, raised and propagated with `?`
//! CompilationWarning  - non-fatal diagnostics collected by the session
//! ```
//!
//! Every compilation error and warning carries the [`Span`] of the token
//! that caused it. Formatting beyond the `Display` template is left to the
//! driver.

use thiserror::Error;

use crate::Span;

/// Result alias used throughout analysis.
pub type Result<T> = std::result::Result<T, CompilationError>;

// ============================================================================
// Registration Errors
// ============================================================================

/// Errors raised while declarations are registered.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistrationError {
    /// A referenced type was not found.
    #[error("type not found: {0}")]
    TypeNotFound(String),

    /// A type with this name already exists.
    #[error("duplicate type: {0}")]
    DuplicateType(String),

    /// A member with this name already exists on the type.
    #[error("duplicate member: '{member}' already declared on '{type_name}'")]
    DuplicateMember {
        /// The type the member was added to.
        type_name: String,
        /// The duplicated member symbol.
        member: String,
    },

    /// The declaration is invalid.
    #[error("invalid declaration: {0}")]
    InvalidDeclaration(String),
}

// ============================================================================
// Compilation Errors
// ============================================================================

/// Fatal errors raised while analyzing a procedure body.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompilationError {
    /// A variable was declared twice in the same scope.
    #[error("at {span}: cannot redeclare variable '{name}'")]
    Redeclaration { name: String, span: Span },

    /// A variable could not be found in any reachable scope.
    #[error("at {span}: variable '{name}' not defined")]
    UnresolvedVariable { name: String, span: Span },

    /// A variable was read before it was initialized on every path.
    #[error("at {span}: variable '{name}' is possibly not initialized")]
    UninitializedVariable { name: String, span: Span },

    /// An instance variable is not initialized when it must be.
    #[error("at {span}: instance variable '{name}' must be initialized")]
    UninitializedField { name: String, span: Span },

    /// A private or protected member was used from outside its reach.
    #[error("at {span}: {kind} {name} is {visibility}")]
    AccessDenied {
        /// "method", "initializer" or "class method".
        kind: &'static str,
        /// The member symbol.
        name: String,
        /// "private" or "protected".
        visibility: &'static str,
        span: Span,
    },

    /// A construct was applied to a value of the wrong type.
    #[error("at {span}: {message}")]
    TypeMismatch { message: String, span: Span },

    /// An expression's type is not compatible with the expected type.
    #[error("at {span}: {found} is not compatible to {expected}")]
    Castability {
        expected: String,
        found: String,
        span: Span,
    },

    /// No opcode exists for this primitive receiver and operator.
    #[error("at {span}: unknown primitive method {operator} for {type_name}")]
    UnknownPrimitiveOperation {
        operator: String,
        type_name: String,
        span: Span,
    },

    /// The cast target is not a class, protocol or castable primitive.
    #[error("at {span}: you cannot cast to {type_name}")]
    InvalidCastTarget { type_name: String, span: Span },

    /// A method was called on an optional receiver.
    #[error("at {span}: you cannot call methods on optionals")]
    OptionalReceiver { span: Span },

    /// An initializer finished without calling its superinitializer.
    #[error("at {span}: missing call to superinitializer")]
    MissingSuperinitializer { span: Span },

    /// The superinitializer was called more than once.
    #[error("at {span}: superinitializer was already called")]
    DuplicateSuperinitializer { span: Span },

    /// A token of another category was required.
    #[error("at {span}: expected {expected} but found {found}")]
    UnexpectedToken {
        expected: String,
        found: String,
        span: Span,
    },

    /// The body ended in the middle of a construct.
    #[error("at {span}: unexpected end of body")]
    UnexpectedEndOfBody { span: Span },

    /// A procedure with a return type can finish without returning.
    #[error("at {span}: an explicit return is missing")]
    MissingReturn { span: Span },

    /// A return appeared where none is allowed.
    #[error("at {span}: {message}")]
    InvalidReturn { message: String, span: Span },

    /// A frozen variable was mutated.
    #[error("at {span}: cannot modify frozen variable '{name}'")]
    FrozenMutation { name: String, span: Span },

    /// A type annotation named no registered type.
    #[error("at {span}: could not find type {name}")]
    UnknownType { name: String, span: Span },

    /// A method could not be found on the receiver type.
    #[error("at {span}: {type_name} has no method {method}")]
    UnknownMethod {
        type_name: String,
        method: String,
        span: Span,
    },

    /// An initializer could not be found on the target type.
    #[error("at {span}: {type_name} has no initializer {initializer}")]
    UnknownInitializer {
        type_name: String,
        initializer: String,
        span: Span,
    },

    /// An enum value could not be found.
    #[error("at {span}: {type_name} does not have a member named {value}")]
    UnknownEnumValue {
        type_name: String,
        value: String,
        span: Span,
    },

    /// A construct was used where it is not allowed.
    #[error("at {span}: {message}")]
    InvalidOperation { message: String, span: Span },

    /// The procedure needs more variable slots than are available.
    #[error("at {span}: too many variables in one procedure (limit {limit})")]
    TooManyVariables { limit: usize, span: Span },
}

impl CompilationError {
    /// Get the span where this error occurred.
    pub fn span(&self) -> Span {
        match self {
            CompilationError::Redeclaration { span, .. } => *span,
            CompilationError::UnresolvedVariable { span, .. } => *span,
            CompilationError::UninitializedVariable { span, .. } => *span,
            CompilationError::UninitializedField { span, .. } => *span,
            CompilationError::AccessDenied { span, .. } => *span,
            CompilationError::TypeMismatch { span, .. } => *span,
            CompilationError::Castability { span, .. } => *span,
            CompilationError::UnknownPrimitiveOperation { span, .. } => *span,
            CompilationError::InvalidCastTarget { span, .. } => *span,
            CompilationError::OptionalReceiver { span } => *span,
            CompilationError::MissingSuperinitializer { span } => *span,
            CompilationError::DuplicateSuperinitializer { span } => *span,
            CompilationError::UnexpectedToken { span, .. } => *span,
            CompilationError::UnexpectedEndOfBody { span } => *span,
            CompilationError::MissingReturn { span } => *span,
            CompilationError::InvalidReturn { span, .. } => *span,
            CompilationError::FrozenMutation { span, .. } => *span,
            CompilationError::UnknownType { span, .. } => *span,
            CompilationError::UnknownMethod { span, .. } => *span,
            CompilationError::UnknownInitializer { span, .. } => *span,
            CompilationError::UnknownEnumValue { span, .. } => *span,
            CompilationError::InvalidOperation { span, .. } => *span,
            CompilationError::TooManyVariables { span, .. } => *span,
        }
    }

    /// Shorthand for [`CompilationError::TypeMismatch`].
    pub fn type_mismatch(message: impl Into<String>, span: Span) -> Self {
        CompilationError::TypeMismatch {
            message: message.into(),
            span,
        }
    }

    /// Shorthand for [`CompilationError::InvalidOperation`].
    pub fn invalid_operation(message: impl Into<String>, span: Span) -> Self {
        CompilationError::InvalidOperation {
            message: message.into(),
            span,
        }
    }
}

// ============================================================================
// Warnings
// ============================================================================

/// Non-fatal diagnostics. Analysis continues and bytecode is still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompilationWarning {
    /// A statement computed a value without any side effect.
    #[error("at {span}: statement has no effect")]
    NoEffect { span: Span },

    /// Statements follow an unconditional return.
    #[error("at {span}: dead code")]
    DeadCode { span: Span },

    /// A cast target is already compatible with the value.
    #[error("at {span}: superfluous cast")]
    RedundantCast { span: Span },

    /// An optional marker where optionality has no meaning.
    #[error("at {span}: please remove the superfluous optional marker")]
    RedundantOptionalMarker { span: Span },

    /// A variable is never mutated and could be frozen.
    #[error("at {span}: variable '{name}' was never mutated; consider making it frozen")]
    FrozenRecommendation { name: String, span: Span },

    /// A collection literal without elements and without an expected type.
    #[error("at {span}: type of empty collection literal defaults to something")]
    EmptyCollection { span: Span },
}

impl CompilationWarning {
    /// Get the span the warning refers to.
    pub fn span(&self) -> Span {
        match self {
            CompilationWarning::NoEffect { span } => *span,
            CompilationWarning::DeadCode { span } => *span,
            CompilationWarning::RedundantCast { span } => *span,
            CompilationWarning::RedundantOptionalMarker { span } => *span,
            CompilationWarning::FrozenRecommendation { span, .. } => *span,
            CompilationWarning::EmptyCollection { span } => *span,
        }
    }
}
