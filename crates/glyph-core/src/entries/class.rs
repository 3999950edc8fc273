//! Class type entry.
//!
//! This module provides `ClassEntry` for class types, including generic
//! classes such as the standard list.

use crate::{Symbol, Type, TypeHash};

use super::ProcedureEntry;

/// An instance variable declared by a class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstanceVariable {
    pub name: String,
    pub ty: Type,
}

/// Registry entry for a class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassEntry {
    /// Name symbol.
    pub name: Symbol,
    /// Namespace the class was declared in.
    pub namespace: Symbol,
    /// Type hash for identity.
    pub type_hash: TypeHash,
    /// Class table index, assigned on registration.
    pub index: u32,

    // === Inheritance ===
    /// Superclass (single inheritance).
    pub superclass: Option<TypeHash>,
    /// Protocols the class declares conformance to.
    pub protocols: Vec<TypeHash>,

    // === Generics ===
    /// One constraint per generic parameter.
    pub generic_constraints: Vec<Type>,

    // === Members ===
    pub instance_variables: Vec<InstanceVariable>,
    pub methods: Vec<ProcedureEntry>,
    pub class_methods: Vec<ProcedureEntry>,
    pub initializers: Vec<ProcedureEntry>,
}

impl ClassEntry {
    /// Create an empty class entry.
    pub fn new(namespace: Symbol, name: Symbol) -> Self {
        Self {
            name,
            namespace,
            type_hash: TypeHash::from_type(namespace, name),
            index: 0,
            superclass: None,
            protocols: Vec::new(),
            generic_constraints: Vec::new(),
            instance_variables: Vec::new(),
            methods: Vec::new(),
            class_methods: Vec::new(),
            initializers: Vec::new(),
        }
    }

    // === Builder ===

    pub fn with_superclass(mut self, superclass: TypeHash) -> Self {
        self.superclass = Some(superclass);
        self
    }

    pub fn with_protocol(mut self, protocol: TypeHash) -> Self {
        self.protocols.push(protocol);
        self
    }

    /// Add a generic parameter constrained to `constraint`.
    pub fn with_generic_parameter(mut self, constraint: Type) -> Self {
        self.generic_constraints.push(constraint);
        self
    }

    pub fn with_instance_variable(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.instance_variables.push(InstanceVariable {
            name: name.into(),
            ty,
        });
        self
    }

    pub fn with_method(mut self, method: ProcedureEntry) -> Self {
        self.methods.push(method);
        self
    }

    pub fn with_class_method(mut self, method: ProcedureEntry) -> Self {
        self.class_methods.push(method);
        self
    }

    pub fn with_initializer(mut self, initializer: ProcedureEntry) -> Self {
        self.initializers.push(initializer);
        self
    }

    // === Queries ===

    pub fn is_generic(&self) -> bool {
        !self.generic_constraints.is_empty()
    }

    /// The type of this class with its generic parameters left open.
    pub fn self_type(&self) -> Type {
        let arguments = (0..self.generic_constraints.len())
            .map(|index| Type::generic_parameter(index as u16))
            .collect();
        Type::class_with(self.type_hash, arguments)
    }

    /// Method declared directly on this class.
    pub fn own_method(&self, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.methods.iter().find(|method| method.symbol == symbol)
    }

    /// Class method declared directly on this class.
    pub fn own_class_method(&self, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.class_methods.iter().find(|method| method.symbol == symbol)
    }

    /// Initializer declared directly on this class.
    pub fn own_initializer(&self, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.initializers.iter().find(|init| init.symbol == symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs;

    #[test]
    fn self_type_of_generic_class() {
        let entry = ClassEntry::new(glyphs::DEFAULT_NAMESPACE, Symbol::from_char('📦'))
            .with_generic_parameter(Type::something())
            .with_generic_parameter(Type::someobject());
        let self_type = entry.self_type();
        assert_eq!(self_type.class_hash(), Some(entry.type_hash));
        assert_eq!(
            self_type.generic_arguments(),
            &[Type::generic_parameter(0), Type::generic_parameter(1)]
        );
    }

    #[test]
    fn own_member_lookup() {
        let entry = ClassEntry::new(glyphs::DEFAULT_NAMESPACE, Symbol::from_char('🐱'))
            .with_method(ProcedureEntry::method('🔊'))
            .with_initializer(ProcedureEntry::initializer('🆕'));
        assert!(entry.own_method(Symbol::from_char('🔊')).is_some());
        assert!(entry.own_method(Symbol::from_char('🆕')).is_none());
        assert!(entry.own_initializer(Symbol::from_char('🆕')).is_some());
    }
}
