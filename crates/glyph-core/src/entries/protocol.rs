//! Protocol entry.

use crate::{Symbol, TypeHash};

use super::ProcedureEntry;

/// Registry entry for a protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolEntry {
    pub name: Symbol,
    pub namespace: Symbol,
    pub type_hash: TypeHash,
    /// Protocol table index, assigned on registration.
    pub index: u32,
    pub methods: Vec<ProcedureEntry>,
}

impl ProtocolEntry {
    pub fn new(namespace: Symbol, name: Symbol) -> Self {
        Self {
            name,
            namespace,
            type_hash: TypeHash::from_type(namespace, name),
            index: 0,
            methods: Vec::new(),
        }
    }

    pub fn with_method(mut self, method: ProcedureEntry) -> Self {
        self.methods.push(method);
        self
    }

    pub fn method(&self, symbol: Symbol) -> Option<&ProcedureEntry> {
        self.methods.iter().find(|method| method.symbol == symbol)
    }
}
