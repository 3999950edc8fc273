//! Enum type entry.

use crate::{Symbol, TypeHash};

/// A named enum value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EnumValue {
    pub name: Symbol,
    pub value: u64,
}

/// Registry entry for an enumeration type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumEntry {
    pub name: Symbol,
    pub namespace: Symbol,
    pub type_hash: TypeHash,
    pub values: Vec<EnumValue>,
}

impl EnumEntry {
    pub fn new(namespace: Symbol, name: Symbol) -> Self {
        Self {
            name,
            namespace,
            type_hash: TypeHash::from_type(namespace, name),
            values: Vec::new(),
        }
    }

    /// Add a value numbered after the previous one.
    pub fn with_value(mut self, name: impl Into<Symbol>) -> Self {
        let value = self.values.last().map_or(0, |last| last.value + 1);
        self.values.push(EnumValue {
            name: name.into(),
            value,
        });
        self
    }

    /// Add a value with an explicit number.
    pub fn with_explicit_value(mut self, name: impl Into<Symbol>, value: u64) -> Self {
        self.values.push(EnumValue {
            name: name.into(),
            value,
        });
        self
    }

    pub fn value(&self, name: Symbol) -> Option<u64> {
        self.values
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.value)
    }
}
