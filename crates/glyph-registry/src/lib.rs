//! Type registry for the glyph compiler.
//!
//! [`TypeRegistry`] stores the classes, protocols and enums produced by the
//! declaration parser and answers the questions the analyzer asks about
//! them: member lookup, compatibility, common types and type annotations.

mod annotation;
mod compatibility;
mod registry;
mod standard;

pub use annotation::Dynamism;
pub use registry::TypeRegistry;
