//! Core vocabulary shared by the glyph compiler crates.
//!
//! - [`Span`] and [`Token`]/[`TokenStream`] - the pre-lexed input
//! - [`Symbol`], [`glyphs`] and [`Construct`] - symbol codes and their meaning
//! - [`Type`]/[`TypeKind`] and [`TypeHash`] - resolved static types
//! - [`entries`] - declaration records stored by the registry
//! - [`CompilationError`], [`CompilationWarning`] - diagnostics

mod data_type;
pub mod entries;
mod error;
mod span;
mod symbol;
mod token;
mod type_hash;

pub use data_type::{Type, TypeKind};
pub use entries::{
    Argument, ClassEntry, EnumEntry, EnumValue, InstanceVariable, ProcedureEntry, ProcedureFlags,
    ProcedureKind, ProtocolEntry, Visibility,
};
pub use error::{CompilationError, CompilationWarning, RegistrationError, Result};
pub use span::Span;
pub use symbol::{Construct, Symbol, glyphs};
pub use token::{Identifier, Token, TokenCategory, TokenKind, TokenStream};
pub use type_hash::{TypeHash, hash_constants, standard};
