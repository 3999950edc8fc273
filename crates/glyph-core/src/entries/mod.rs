//! Registry entry types.
//!
//! - [`ClassEntry`] - classes, including generic ones
//! - [`ProtocolEntry`] - protocols
//! - [`EnumEntry`] - enumerations
//! - [`ProcedureEntry`] - methods, class methods and initializers
//!
//! Entries are built by the declaration parser and handed to the registry,
//! which assigns indices and virtual table slots.

mod class;
mod enum_entry;
mod procedure;
mod protocol;

pub use class::{ClassEntry, InstanceVariable};
pub use enum_entry::{EnumEntry, EnumValue};
pub use procedure::{Argument, ProcedureEntry, ProcedureFlags, ProcedureKind, Visibility};
pub use protocol::ProtocolEntry;
