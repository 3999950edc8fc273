//! TypeRegistry - storage and member lookup for declared types.
//!
//! The declaration parser fills a [`TypeRegistry`] with classes, protocols
//! and enums before any procedure body is analyzed. On registration the
//! registry assigns every class and protocol its table index (registration
//! order) and every method, class method and initializer its virtual table
//! index. An override reuses the index of the procedure it overrides.
//!
//! After registration the registry is read-only; the analyzer only queries
//! it.
//!
//! # Example
//!
//! ```
//! use glyph_core::{ClassEntry, ProcedureEntry, Symbol, Type, glyphs};
//! use glyph_registry::TypeRegistry;
//!
//! let mut registry = TypeRegistry::with_standard_types();
//! let cat = registry
//!     .register_class(
//!         ClassEntry::new(glyphs::DEFAULT_NAMESPACE, Symbol::from_char('🐱'))
//!             .with_method(ProcedureEntry::method('🔊')),
//!     )
//!     .unwrap();
//!
//! let method = registry.lookup_method(&Type::class(cat), Symbol::from_char('🔊'));
//! assert!(method.is_some());
//! ```

use rustc_hash::{FxHashMap, FxHashSet};

use glyph_core::{
    ClassEntry, EnumEntry, ProcedureEntry, ProtocolEntry, RegistrationError, Symbol, Type,
    TypeHash, TypeKind, glyphs, standard,
};

/// Sizes of a class's dispatch tables, inherited by subclasses.
#[derive(Debug, Clone, Copy, Default)]
struct DispatchTables {
    methods: u32,
    class_methods: u32,
    initializers: u32,
}

/// Central storage for declared types.
#[derive(Debug, Default)]
pub struct TypeRegistry {
    classes: FxHashMap<TypeHash, ClassEntry>,
    protocols: FxHashMap<TypeHash, ProtocolEntry>,
    enums: FxHashMap<TypeHash, EnumEntry>,

    /// Classes in registration order (index = class table index).
    class_order: Vec<TypeHash>,
    /// Protocols in registration order (index = protocol table index).
    protocol_order: Vec<TypeHash>,

    dispatch: FxHashMap<TypeHash, DispatchTables>,
}

impl TypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry with the standard string, list, dictionary and
    /// enumerable types registered.
    pub fn with_standard_types() -> Self {
        let mut registry = Self::new();
        registry.register_standard_types();
        registry
    }

    /// Register the standard types.
    ///
    /// The standard declarations are fixed and valid, so registration cannot
    /// clash on an empty registry. On a registry that already declares one of
    /// the standard names the clashing entry is kept and the standard one is
    /// skipped.
    pub fn register_standard_types(&mut self) {
        for entry in crate::standard::protocols() {
            if !self.contains(entry.type_hash) {
                let _ = self.register_protocol(entry);
            }
        }
        for entry in crate::standard::classes() {
            if !self.contains(entry.type_hash) {
                let _ = self.register_class(entry);
            }
        }
    }

    // ==========================================================================
    // Registration
    // ==========================================================================

    /// Register a class.
    ///
    /// The superclass and every conformed protocol must already be
    /// registered. Returns the class's type hash.
    pub fn register_class(&mut self, mut entry: ClassEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.contains(hash) {
            return Err(RegistrationError::DuplicateType(entry.name.to_string()));
        }

        let mut tables = match entry.superclass {
            Some(superclass) => *self.dispatch.get(&superclass).ok_or_else(|| {
                RegistrationError::TypeNotFound(format!("superclass of {}", entry.name))
            })?,
            None => DispatchTables::default(),
        };
        for protocol in &entry.protocols {
            if !self.protocols.contains_key(protocol) {
                return Err(RegistrationError::TypeNotFound(format!(
                    "protocol {protocol} conformed to by {}",
                    entry.name
                )));
            }
        }

        check_unique_members(&entry.name, &entry.methods)?;
        check_unique_members(&entry.name, &entry.class_methods)?;
        check_unique_members(&entry.name, &entry.initializers)?;

        let superclass = entry.superclass;
        for method in &mut entry.methods {
            method.owner = Some(hash);
            let overridden = superclass.and_then(|s| self.find_method(s, method.symbol));
            method.vti = next_slot(overridden, &mut tables.methods);
        }
        for method in &mut entry.class_methods {
            method.owner = Some(hash);
            let overridden = superclass.and_then(|s| self.find_class_method(s, method.symbol));
            method.vti = next_slot(overridden, &mut tables.class_methods);
        }
        for initializer in &mut entry.initializers {
            initializer.owner = Some(hash);
            let overridden = superclass.and_then(|s| self.find_initializer(s, initializer.symbol));
            initializer.vti = next_slot(overridden, &mut tables.initializers);
        }

        entry.index = self.class_order.len() as u32;
        self.class_order.push(hash);
        self.dispatch.insert(hash, tables);
        self.classes.insert(hash, entry);
        Ok(hash)
    }

    /// Register a protocol. Its methods are numbered in declaration order.
    pub fn register_protocol(
        &mut self,
        mut entry: ProtocolEntry,
    ) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.contains(hash) {
            return Err(RegistrationError::DuplicateType(entry.name.to_string()));
        }
        check_unique_members(&entry.name, &entry.methods)?;

        for (vti, method) in entry.methods.iter_mut().enumerate() {
            method.owner = Some(hash);
            method.vti = vti as u32;
        }

        entry.index = self.protocol_order.len() as u32;
        self.protocol_order.push(hash);
        self.protocols.insert(hash, entry);
        Ok(hash)
    }

    /// Register an enum.
    pub fn register_enum(&mut self, entry: EnumEntry) -> Result<TypeHash, RegistrationError> {
        let hash = entry.type_hash;
        if self.contains(hash) {
            return Err(RegistrationError::DuplicateType(entry.name.to_string()));
        }
        let mut seen = FxHashSet::default();
        for value in &entry.values {
            if !seen.insert(value.name) {
                return Err(RegistrationError::DuplicateMember {
                    type_name: entry.name.to_string(),
                    member: value.name.to_string(),
                });
            }
        }
        self.enums.insert(hash, entry);
        Ok(hash)
    }

    // ==========================================================================
    // Type Lookup
    // ==========================================================================

    /// Check if any type is registered under this hash.
    pub fn contains(&self, hash: TypeHash) -> bool {
        self.classes.contains_key(&hash)
            || self.protocols.contains_key(&hash)
            || self.enums.contains_key(&hash)
    }

    pub fn class(&self, hash: TypeHash) -> Option<&ClassEntry> {
        self.classes.get(&hash)
    }

    pub fn protocol(&self, hash: TypeHash) -> Option<&ProtocolEntry> {
        self.protocols.get(&hash)
    }

    pub fn enumeration(&self, hash: TypeHash) -> Option<&EnumEntry> {
        self.enums.get(&hash)
    }

    /// Classes in class table order.
    pub fn classes(&self) -> impl Iterator<Item = &ClassEntry> {
        self.class_order.iter().filter_map(|hash| self.classes.get(hash))
    }

    /// Protocols in protocol table order.
    pub fn protocols(&self) -> impl Iterator<Item = &ProtocolEntry> {
        self.protocol_order
            .iter()
            .filter_map(|hash| self.protocols.get(hash))
    }

    pub fn class_count(&self) -> usize {
        self.class_order.len()
    }

    /// Resolve a type name in a namespace.
    ///
    /// The result carries no generic arguments; the annotation reader fills
    /// them in.
    pub fn lookup_type(&self, namespace: Symbol, name: Symbol) -> Option<Type> {
        let hash = TypeHash::from_type(namespace, name);
        if self.classes.contains_key(&hash) {
            Some(Type::class(hash))
        } else if self.protocols.contains_key(&hash) {
            Some(Type::protocol(hash))
        } else if self.enums.contains_key(&hash) {
            Some(Type::enumeration(hash))
        } else {
            None
        }
    }

    // ==========================================================================
    // Inheritance
    // ==========================================================================

    /// The class and its superclasses, from the class itself to the root.
    pub fn superclass_chain(&self, hash: TypeHash) -> impl Iterator<Item = &ClassEntry> {
        std::iter::successors(self.classes.get(&hash), move |class| {
            class.superclass.and_then(|s| self.classes.get(&s))
        })
    }

    /// Whether `class` is `ancestor` or a descendant of it.
    pub fn inherits_from(&self, class: TypeHash, ancestor: TypeHash) -> bool {
        self.superclass_chain(class)
            .any(|entry| entry.type_hash == ancestor)
    }

    /// Whether `class` or one of its superclasses conforms to `protocol`.
    pub fn conforms_to(&self, class: TypeHash, protocol: TypeHash) -> bool {
        self.superclass_chain(class)
            .any(|entry| entry.protocols.contains(&protocol))
    }

    /// Whether the type conforms to the standard enumerable protocol.
    pub fn is_enumerable(&self, ty: &Type) -> bool {
        match ty.kind() {
            TypeKind::Class(hash) => self.conforms_to(*hash, standard::ENUMERABLE),
            TypeKind::Protocol(hash) => *hash == standard::ENUMERABLE,
            _ => false,
        }
    }

    // ==========================================================================
    // Member Lookup
    // ==========================================================================

    /// Look up a method on a class (walking the superclass chain) or protocol.
    pub fn lookup_method(&self, ty: &Type, symbol: Symbol) -> Option<&ProcedureEntry> {
        match ty.kind() {
            TypeKind::Class(hash) => self.find_method(*hash, symbol),
            TypeKind::Protocol(hash) => self.protocols.get(hash)?.method(symbol),
            _ => None,
        }
    }

    /// Look up a class method, walking the superclass chain.
    pub fn lookup_class_method(&self, ty: &Type, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.find_class_method(ty.class_hash()?, symbol)
    }

    /// Look up an initializer.
    ///
    /// Initializers declared on the class itself come first; from
    /// superclasses only required initializers are inherited.
    pub fn lookup_initializer(&self, ty: &Type, symbol: Symbol) -> Option<&ProcedureEntry> {
        let hash = ty.class_hash()?;
        let class = self.classes.get(&hash)?;
        class.own_initializer(symbol).or_else(|| {
            self.superclass_chain(hash)
                .skip(1)
                .filter_map(|entry| entry.own_initializer(symbol))
                .find(|init| init.is_required())
        })
    }

    /// Look up an enum value.
    pub fn lookup_enum_value(&self, ty: &Type, name: Symbol) -> Option<u64> {
        match ty.kind() {
            TypeKind::Enum(hash) => self.enums.get(hash)?.value(name),
            _ => None,
        }
    }

    fn find_method(&self, class: TypeHash, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.superclass_chain(class)
            .find_map(|entry| entry.own_method(symbol))
    }

    fn find_class_method(&self, class: TypeHash, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.superclass_chain(class)
            .find_map(|entry| entry.own_class_method(symbol))
    }

    fn find_initializer(&self, class: TypeHash, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.superclass_chain(class)
            .find_map(|entry| entry.own_initializer(symbol))
    }

    // ==========================================================================
    // Names
    // ==========================================================================

    /// Human-readable rendering of a type for diagnostics.
    pub fn type_name(&self, ty: &Type) -> String {
        let mut name = String::new();
        if ty.is_optional() {
            name.push_str(&glyphs::OPTIONAL_MARKER.to_string());
        }
        match ty.kind() {
            TypeKind::Boolean => name.push_str(&glyphs::BOOLEAN.to_string()),
            TypeKind::Integer => name.push_str(&glyphs::INTEGER.to_string()),
            TypeKind::Double => name.push_str(&glyphs::DOUBLE.to_string()),
            TypeKind::Symbol => name.push_str(&glyphs::SYMBOL.to_string()),
            TypeKind::Something => name.push_str(&glyphs::SOMETHING.to_string()),
            TypeKind::Someobject => name.push_str(&glyphs::SOMEOBJECT.to_string()),
            TypeKind::Nothingness => name.push_str(&glyphs::NOTHINGNESS.to_string()),
            TypeKind::GenericParameter(index) => name.push_str(&format!("T{index}")),
            TypeKind::Class(hash) => {
                match self.classes.get(hash) {
                    Some(class) => name.push_str(&qualified(class.namespace, class.name)),
                    None => name.push_str(&hash.to_string()),
                }
                for argument in ty.generic_arguments() {
                    name.push_str(&glyphs::GENERIC_MARKER.to_string());
                    name.push_str(&self.type_name(argument));
                }
            }
            TypeKind::Protocol(hash) => match self.protocols.get(hash) {
                Some(protocol) => name.push_str(&qualified(protocol.namespace, protocol.name)),
                None => name.push_str(&hash.to_string()),
            },
            TypeKind::Enum(hash) => match self.enums.get(hash) {
                Some(entry) => name.push_str(&qualified(entry.namespace, entry.name)),
                None => name.push_str(&hash.to_string()),
            },
            TypeKind::Callable => {
                name.push_str(&glyphs::BLOCK_OPEN.to_string());
                for argument in ty.callable_arguments() {
                    name.push_str(&self.type_name(argument));
                }
                if let Some(ret) = ty.callable_return().filter(|ret| !ret.is_nothingness()) {
                    name.push_str(&glyphs::RETURN_ARROW.to_string());
                    name.push_str(&self.type_name(ret));
                }
                name.push_str(&glyphs::BLOCK_CLOSE.to_string());
            }
        }
        name
    }
}

fn qualified(namespace: Symbol, name: Symbol) -> String {
    if namespace == glyphs::DEFAULT_NAMESPACE {
        name.to_string()
    } else {
        format!("{}{namespace}{name}", glyphs::NAMESPACE_MARKER)
    }
}

fn next_slot(overridden: Option<&ProcedureEntry>, next: &mut u32) -> u32 {
    match overridden {
        Some(procedure) => procedure.vti,
        None => {
            let slot = *next;
            *next += 1;
            slot
        }
    }
}

fn check_unique_members(
    type_name: &Symbol,
    procedures: &[ProcedureEntry],
) -> Result<(), RegistrationError> {
    let mut seen = FxHashSet::default();
    for procedure in procedures {
        if !seen.insert(procedure.symbol) {
            return Err(RegistrationError::DuplicateMember {
                type_name: type_name.to_string(),
                member: procedure.symbol.to_string(),
            });
        }
    }
    Ok(())
}
