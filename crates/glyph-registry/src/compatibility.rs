//! Compatibility (subtyping) and common-type queries.
//!
//! Compatibility is a partial order over [`Type`]s:
//!
//! - every type is compatible with something;
//! - nothingness is compatible with nothingness and with every optional;
//! - an optional is never compatible with a non-optional;
//! - a non-optional `T` is compatible with `T?`;
//! - a class is compatible with its ancestors (same generic arguments), with
//!   someobject and with the protocols it conforms to;
//! - callables are contravariant in their arguments and covariant in their
//!   return type.

use glyph_core::{Type, TypeKind};

use crate::TypeRegistry;

impl TypeRegistry {
    /// Whether a value of type `found` may be used where `expected` is
    /// required.
    pub fn is_compatible(&self, found: &Type, expected: &Type) -> bool {
        if *expected.kind() == TypeKind::Something {
            return true;
        }
        if found.is_nothingness() {
            return expected.is_nothingness() || expected.is_optional();
        }
        if found.is_optional() && !expected.is_optional() {
            return false;
        }

        match (found.kind(), expected.kind()) {
            (TypeKind::Class(from), TypeKind::Class(to)) => {
                self.inherits_from(*from, *to)
                    && (expected.generic_arguments().is_empty()
                        || found.generic_arguments() == expected.generic_arguments())
            }
            (TypeKind::Class(_), TypeKind::Someobject) => true,
            (TypeKind::Class(class), TypeKind::Protocol(protocol)) => {
                self.conforms_to(*class, *protocol)
            }
            (TypeKind::Callable, TypeKind::Callable) => self.is_callable_compatible(found, expected),
            (from, to) => from == to,
        }
    }

    fn is_callable_compatible(&self, found: &Type, expected: &Type) -> bool {
        let (Some(found_return), Some(expected_return)) =
            (found.callable_return(), expected.callable_return())
        else {
            return false;
        };
        let found_arguments = found.callable_arguments();
        let expected_arguments = expected.callable_arguments();

        found_arguments.len() == expected_arguments.len()
            && self.is_compatible(found_return, expected_return)
            && found_arguments
                .iter()
                .zip(expected_arguments)
                .all(|(found, expected)| self.is_compatible(expected, found))
    }

    /// The least upper bound of two types.
    ///
    /// If one type is compatible with the other, the wider one wins. Two
    /// classes meet at their closest common ancestor. Nothingness joined
    /// with `T` is `T?`. Anything else falls back to something.
    pub fn common_type(&self, a: &Type, b: &Type) -> Type {
        if self.is_compatible(b, a) {
            return a.clone();
        }
        if self.is_compatible(a, b) {
            return b.clone();
        }
        if a.is_nothingness() {
            return b.clone().optional();
        }
        if b.is_nothingness() {
            return a.clone().optional();
        }

        if let (Some(left), Some(right)) = (a.class_hash(), b.class_hash()) {
            let optional = a.is_optional() || b.is_optional();
            if let Some(ancestor) = self
                .superclass_chain(left)
                .find(|ancestor| self.inherits_from(right, ancestor.type_hash))
            {
                let mut common = Type::class(ancestor.type_hash).with_optional(optional);
                if ancestor.type_hash == left && a.generic_arguments() == b.generic_arguments() {
                    common = common.with_generic_arguments(a.generic_arguments().to_vec());
                }
                return common;
            }
            return Type::someobject().with_optional(optional);
        }

        Type::something()
    }
}

#[cfg(test)]
mod tests {
    use glyph_core::{ClassEntry, ProtocolEntry, Symbol, TypeHash, glyphs, standard};

    use crate::TypeRegistry;

    use super::*;

    struct Fixture {
        registry: TypeRegistry,
        animal: TypeHash,
        cat: TypeHash,
        dog: TypeHash,
        pet: TypeHash,
    }

    fn fixture_registry() -> Fixture {
        let mut registry = TypeRegistry::with_standard_types();
        let ns = glyphs::DEFAULT_NAMESPACE;
        let pet = registry
            .register_protocol(ProtocolEntry::new(ns, Symbol::from_char('🏠')))
            .unwrap();
        let animal = registry
            .register_class(ClassEntry::new(ns, Symbol::from_char('🐾')))
            .unwrap();
        let cat = registry
            .register_class(
                ClassEntry::new(ns, Symbol::from_char('🐱'))
                    .with_superclass(animal)
                    .with_protocol(pet),
            )
            .unwrap();
        let dog = registry
            .register_class(ClassEntry::new(ns, Symbol::from_char('🐶')).with_superclass(animal))
            .unwrap();
        Fixture {
            registry,
            animal,
            cat,
            dog,
            pet,
        }
    }

    #[test]
    fn everything_is_compatible_with_something() {
        let f = fixture_registry();
        for ty in [
            Type::integer(),
            Type::integer().optional(),
            Type::nothingness(),
            Type::class(f.cat),
        ] {
            assert!(f.registry.is_compatible(&ty, &Type::something()));
        }
    }

    #[test]
    fn optional_rules() {
        let f = fixture_registry();
        let int = Type::integer();
        let maybe_int = Type::integer().optional();
        assert!(f.registry.is_compatible(&int, &maybe_int));
        assert!(!f.registry.is_compatible(&maybe_int, &int));
        assert!(f.registry.is_compatible(&Type::nothingness(), &maybe_int));
        assert!(!f.registry.is_compatible(&Type::nothingness(), &int));
        assert!(!f.registry.is_compatible(&int, &Type::nothingness()));
    }

    #[test]
    fn class_rules() {
        let f = fixture_registry();
        let cat = Type::class(f.cat);
        assert!(f.registry.is_compatible(&cat, &Type::class(f.animal)));
        assert!(!f.registry.is_compatible(&Type::class(f.animal), &cat));
        assert!(f.registry.is_compatible(&cat, &Type::someobject()));
        assert!(f.registry.is_compatible(&cat, &Type::protocol(f.pet)));
        assert!(!f.registry.is_compatible(&Type::class(f.dog), &Type::protocol(f.pet)));
    }

    #[test]
    fn generic_arguments_must_match() {
        let f = fixture_registry();
        let ints = Type::class_with(standard::LIST, vec![Type::integer()]);
        let doubles = Type::class_with(standard::LIST, vec![Type::double()]);
        assert!(f.registry.is_compatible(&ints, &ints.clone()));
        assert!(!f.registry.is_compatible(&ints, &doubles));
        assert!(f.registry.is_compatible(&ints, &Type::class(standard::LIST)));
    }

    #[test]
    fn callable_variance() {
        let f = fixture_registry();
        let animal = Type::class(f.animal);
        let cat = Type::class(f.cat);
        let takes_animal_returns_cat = Type::callable(cat.clone(), [animal.clone()]);
        let takes_cat_returns_animal = Type::callable(animal, [cat]);
        assert!(
            f.registry
                .is_compatible(&takes_animal_returns_cat, &takes_cat_returns_animal)
        );
        assert!(
            !f.registry
                .is_compatible(&takes_cat_returns_animal, &takes_animal_returns_cat)
        );
    }

    #[test]
    fn common_type_of_siblings_is_ancestor() {
        let f = fixture_registry();
        let common = f
            .registry
            .common_type(&Type::class(f.cat), &Type::class(f.dog));
        assert_eq!(common, Type::class(f.animal));
    }

    #[test]
    fn common_type_of_integer_and_double_is_something() {
        let f = fixture_registry();
        let common = f.registry.common_type(&Type::integer(), &Type::double());
        assert_eq!(common, Type::something());
    }

    #[test]
    fn common_type_with_nothingness_is_optional() {
        let f = fixture_registry();
        let common = f
            .registry
            .common_type(&Type::integer(), &Type::nothingness());
        assert_eq!(common, Type::integer().optional());
    }

    #[test]
    fn common_type_widens() {
        let f = fixture_registry();
        let common = f
            .registry
            .common_type(&Type::integer(), &Type::integer().optional());
        assert_eq!(common, Type::integer().optional());
    }
}
