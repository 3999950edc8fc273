//! Procedure entry for the registry.
//!
//! A [`ProcedureEntry`] is the signature side of a method, class method or
//! initializer: everything the analyzer needs to type-check a call and to
//! emit its dispatch operands.

use bitflags::bitflags;

use crate::{Symbol, Type, TypeHash};

bitflags! {
    /// Procedure modifiers.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct ProcedureFlags: u8 {
        /// Implemented by the host; has no body.
        const NATIVE = 0b0000_0001;
        /// Initializer every subclass must provide; usable with dynamic classes.
        const REQUIRED = 0b0000_0010;
        /// Initializer that may produce nothingness instead of an instance.
        const CAN_RETURN_NOTHINGNESS = 0b0000_0100;
    }
}

/// Member visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

/// Kind of procedure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ProcedureKind {
    #[default]
    Method,
    ClassMethod,
    Initializer,
}

impl ProcedureKind {
    /// Noun used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            ProcedureKind::Method => "method",
            ProcedureKind::ClassMethod => "class method",
            ProcedureKind::Initializer => "initializer",
        }
    }
}

/// A declared argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Argument {
    /// Variable name the body refers to the argument by.
    pub name: String,
    pub ty: Type,
}

impl Argument {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// Registry entry for a procedure.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProcedureEntry {
    pub symbol: Symbol,
    pub kind: ProcedureKind,
    pub arguments: Vec<Argument>,
    /// Declared return type. Initializers return nothingness.
    pub return_type: Type,
    pub visibility: Visibility,
    pub flags: ProcedureFlags,
    /// Virtual table index, assigned on registration.
    pub vti: u32,
    /// Declaring class or protocol, set on registration.
    pub owner: Option<TypeHash>,
}

impl ProcedureEntry {
    fn new(symbol: Symbol, kind: ProcedureKind) -> Self {
        Self {
            symbol,
            kind,
            arguments: Vec::new(),
            return_type: Type::nothingness(),
            visibility: Visibility::Public,
            flags: ProcedureFlags::empty(),
            vti: 0,
            owner: None,
        }
    }

    /// Create an instance method returning nothingness.
    pub fn method(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol.into(), ProcedureKind::Method)
    }

    /// Create a class method returning nothingness.
    pub fn class_method(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol.into(), ProcedureKind::ClassMethod)
    }

    /// Create an initializer.
    pub fn initializer(symbol: impl Into<Symbol>) -> Self {
        Self::new(symbol.into(), ProcedureKind::Initializer)
    }

    // === Builder ===

    pub fn with_argument(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.arguments.push(Argument::new(name, ty));
        self
    }

    pub fn returning(mut self, ty: Type) -> Self {
        self.return_type = ty;
        self
    }

    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    pub fn with_flags(mut self, flags: ProcedureFlags) -> Self {
        self.flags |= flags;
        self
    }

    // === Queries ===

    pub fn is_native(&self) -> bool {
        self.flags.contains(ProcedureFlags::NATIVE)
    }

    pub fn is_required(&self) -> bool {
        self.flags.contains(ProcedureFlags::REQUIRED)
    }

    pub fn can_return_nothingness(&self) -> bool {
        self.flags.contains(ProcedureFlags::CAN_RETURN_NOTHINGNESS)
    }

    pub fn is_initializer(&self) -> bool {
        self.kind == ProcedureKind::Initializer
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_sets_signature() {
        let entry = ProcedureEntry::method('🐱')
            .with_argument("a", Type::integer())
            .returning(Type::boolean())
            .with_visibility(Visibility::Private);
        assert_eq!(entry.kind, ProcedureKind::Method);
        assert_eq!(entry.argument_count(), 1);
        assert_eq!(entry.return_type, Type::boolean());
        assert_eq!(entry.visibility, Visibility::Private);
        assert!(!entry.is_native());
    }

    #[test]
    fn flags_accumulate() {
        let entry = ProcedureEntry::initializer('🆕')
            .with_flags(ProcedureFlags::REQUIRED)
            .with_flags(ProcedureFlags::CAN_RETURN_NOTHINGNESS);
        assert!(entry.is_initializer());
        assert!(entry.is_required());
        assert!(entry.can_return_nothingness());
        assert!(entry.return_type.is_nothingness());
    }
}
