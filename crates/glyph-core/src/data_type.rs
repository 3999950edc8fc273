//! Type - the resolved static type of an expression.
//!
//! A [`Type`] is a [`TypeKind`] plus two modifiers: the optional bit and the
//! generic argument list. Optionality is deliberately a flag on the same
//! value rather than a wrapping variant; the only way from `T?` to `T` is the
//! explicit [`Type::unwrapped`].
//!
//! # Example
//!
//! ```
//! use glyph_core::{Type, TypeKind};
//!
//! let int = Type::integer();
//! let maybe = int.clone().optional();
//! assert!(maybe.is_optional());
//! assert_eq!(maybe.unwrapped(), int);
//! assert_eq!(*int.kind(), TypeKind::Integer);
//! ```

use crate::TypeHash;

/// The base of a type, without modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Boolean,
    Integer,
    Double,
    Symbol,
    /// A class, identified by its declaration.
    Class(TypeHash),
    /// A protocol, identified by its declaration.
    Protocol(TypeHash),
    /// An enum, identified by its declaration.
    Enum(TypeHash),
    /// A callable. Generic arguments are `[return, arguments...]`.
    Callable,
    /// The top type.
    Something,
    /// Any class instance.
    Someobject,
    /// The bottom type; also the return type of procedures returning nothing.
    Nothingness,
    /// Reference to the n-th generic parameter of the enclosing class.
    GenericParameter(u16),
}

/// A resolved static type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Type {
    kind: TypeKind,
    optional: bool,
    generic_arguments: Vec<Type>,
}

impl Type {
    /// Create a non-optional type with no generic arguments.
    pub fn new(kind: TypeKind) -> Self {
        Self {
            kind,
            optional: false,
            generic_arguments: Vec::new(),
        }
    }

    pub fn boolean() -> Self {
        Self::new(TypeKind::Boolean)
    }

    pub fn integer() -> Self {
        Self::new(TypeKind::Integer)
    }

    pub fn double() -> Self {
        Self::new(TypeKind::Double)
    }

    pub fn symbol() -> Self {
        Self::new(TypeKind::Symbol)
    }

    pub fn something() -> Self {
        Self::new(TypeKind::Something)
    }

    pub fn someobject() -> Self {
        Self::new(TypeKind::Someobject)
    }

    pub fn nothingness() -> Self {
        Self::new(TypeKind::Nothingness)
    }

    pub fn class(hash: TypeHash) -> Self {
        Self::new(TypeKind::Class(hash))
    }

    /// A class type with generic arguments.
    pub fn class_with(hash: TypeHash, generic_arguments: Vec<Type>) -> Self {
        Self {
            kind: TypeKind::Class(hash),
            optional: false,
            generic_arguments,
        }
    }

    pub fn protocol(hash: TypeHash) -> Self {
        Self::new(TypeKind::Protocol(hash))
    }

    pub fn enumeration(hash: TypeHash) -> Self {
        Self::new(TypeKind::Enum(hash))
    }

    pub fn generic_parameter(index: u16) -> Self {
        Self::new(TypeKind::GenericParameter(index))
    }

    /// A callable taking `arguments` and returning `return_type`.
    pub fn callable(return_type: Type, arguments: impl IntoIterator<Item = Type>) -> Self {
        let mut generic_arguments = vec![return_type];
        generic_arguments.extend(arguments);
        Self {
            kind: TypeKind::Callable,
            optional: false,
            generic_arguments,
        }
    }

    // ========================================================================
    // Modifiers
    // ========================================================================

    /// This type with the optional bit set.
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// This type with the optional bit cleared.
    #[must_use]
    pub fn unwrapped(mut self) -> Self {
        self.optional = false;
        self
    }

    /// This type with the optional bit set to `optional`.
    #[must_use]
    pub fn with_optional(mut self, optional: bool) -> Self {
        self.optional = optional;
        self
    }

    #[must_use]
    pub fn with_generic_arguments(mut self, generic_arguments: Vec<Type>) -> Self {
        self.generic_arguments = generic_arguments;
        self
    }

    // ========================================================================
    // Queries
    // ========================================================================

    pub fn kind(&self) -> &TypeKind {
        &self.kind
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn generic_arguments(&self) -> &[Type] {
        &self.generic_arguments
    }

    pub fn is_nothingness(&self) -> bool {
        self.kind == TypeKind::Nothingness
    }

    /// The class declaration, if this is a class type.
    pub fn class_hash(&self) -> Option<TypeHash> {
        match self.kind {
            TypeKind::Class(hash) => Some(hash),
            _ => None,
        }
    }

    /// The protocol declaration, if this is a protocol type.
    pub fn protocol_hash(&self) -> Option<TypeHash> {
        match self.kind {
            TypeKind::Protocol(hash) => Some(hash),
            _ => None,
        }
    }

    /// The return type of a callable.
    pub fn callable_return(&self) -> Option<&Type> {
        match self.kind {
            TypeKind::Callable => self.generic_arguments.first(),
            _ => None,
        }
    }

    /// The argument types of a callable (empty for anything else).
    pub fn callable_arguments(&self) -> &[Type] {
        match self.kind {
            TypeKind::Callable if !self.generic_arguments.is_empty() => &self.generic_arguments[1..],
            _ => &[],
        }
    }

    /// Replace generic parameter references with the matching arguments of
    /// `on`.
    ///
    /// A parameter that `on` has no argument for is left as is. The optional
    /// bit of the reference is kept.
    pub fn resolve_on(&self, on: &Type) -> Type {
        if let TypeKind::GenericParameter(index) = self.kind {
            if let Some(argument) = on.generic_arguments.get(usize::from(index)) {
                let optional = self.optional || argument.optional;
                return argument.clone().with_optional(optional);
            }
            return self.clone();
        }
        if self.generic_arguments.is_empty() {
            return self.clone();
        }
        Type {
            kind: self.kind,
            optional: self.optional,
            generic_arguments: self
                .generic_arguments
                .iter()
                .map(|argument| argument.resolve_on(on))
                .collect(),
        }
    }
}
