//! Deterministic hash-based type identity.
//!
//! [`TypeHash`] identifies a class, protocol or enum by its namespace and
//! name symbol. Hashes are computed from the symbols alone, so a type can be
//! referenced before the declaration parser registers it, and the same
//! declaration always maps to the same key.
//!
//! # Examples
//!
//! ```
//! use glyph_core::{Symbol, TypeHash, glyphs};
//!
//! let a = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol(0x1F98A));
//! let b = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol(0x1F98A));
//! assert_eq!(a, b);
//! ```

use std::fmt;

use xxhash_rust::const_xxh64::xxh64;

use crate::Symbol;

/// Domain-specific mixing constants for hash computation.
pub mod hash_constants {
    /// Domain marker for type hashes.
    pub const TYPE: u64 = 0x2fac10b63a6cc57c;
}

/// A deterministic 64-bit hash identifying a declared type.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct TypeHash(pub u64);

impl TypeHash {
    /// Empty/invalid hash constant.
    pub const EMPTY: TypeHash = TypeHash(0);

    /// Hash a type by the namespace it lives in and its name symbol.
    #[inline]
    pub const fn from_type(namespace: Symbol, name: Symbol) -> Self {
        let ns = namespace.0.to_le_bytes();
        let nm = name.0.to_le_bytes();
        let bytes = [ns[0], ns[1], ns[2], ns[3], nm[0], nm[1], nm[2], nm[3]];
        TypeHash(hash_constants::TYPE ^ xxh64(&bytes, 0))
    }

    /// Check if this is an empty/invalid hash.
    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Get the underlying u64 value.
    #[inline]
    pub const fn as_u64(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TypeHash({:#018x})", self.0)
    }
}

impl fmt::Display for TypeHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#018x}", self.0)
    }
}

/// Hashes of the types every program can rely on.
///
/// The registry registers them in `TypeRegistry::with_standard_types`; the
/// analyzer needs them for string literals, collection literals and
/// iteration.
pub mod standard {
    use super::TypeHash;
    use crate::glyphs;

    /// The string class 🔡.
    pub const STRING: TypeHash = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, glyphs::STRING_TYPE);
    /// The generic list class 🍨.
    pub const LIST: TypeHash = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, glyphs::LIST_TYPE);
    /// The generic dictionary class 🍯 (string keys).
    pub const DICTIONARY: TypeHash =
        TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, glyphs::DICTIONARY_TYPE);
    /// The enumerable protocol 🔂.
    pub const ENUMERABLE: TypeHash =
        TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, glyphs::ENUMERABLE_PROTOCOL);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs;

    #[test]
    fn hash_is_deterministic() {
        let a = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol(0x1F431));
        let b = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol(0x1F431));
        assert_eq!(a, b);
        assert!(!a.is_empty());
    }

    #[test]
    fn namespace_changes_hash() {
        let a = TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol(0x1F431));
        let b = TypeHash::from_type(Symbol(0x1F536), Symbol(0x1F431));
        assert_ne!(a, b);
    }

    #[test]
    fn standard_types_are_distinct() {
        let all = [
            standard::STRING,
            standard::LIST,
            standard::DICTIONARY,
            standard::ENUMERABLE,
        ];
        for (i, a) in all.iter().enumerate() {
            for b in &all[i + 1..] {
                assert_ne!(a, b);
            }
        }
    }
}
