//! Bytecode types for the glyph compiler.
//!
//! This module contains the core bytecode types:
//!
//! - [`OpCode`] - The instruction set of the interpreter
//! - [`BytecodeChunk`] - Compiled bytecode for a procedure
//! - [`StringPool`] - Session-level string literal storage

mod chunk;
mod opcode;
mod string_pool;

pub use chunk::BytecodeChunk;
pub use opcode::OpCode;
pub use string_pool::StringPool;
