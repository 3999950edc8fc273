//! Literal expressions.
//!
//! Literals never fail: the token already carries a well-formed value.

use glyph_core::{Symbol, Type, standard};

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;

pub(super) fn string(analyzer: &mut FunctionAnalyzer<'_, '_>, value: &str) -> Type {
    let index = analyzer.session.intern(value);
    analyzer.writer.write_op(OpCode::StringLiteral);
    analyzer.writer.write_word(index);
    Type::class(standard::STRING)
}

pub(super) fn boolean(analyzer: &mut FunctionAnalyzer<'_, '_>, value: bool) -> Type {
    analyzer
        .writer
        .write_op(if value { OpCode::True } else { OpCode::False });
    Type::boolean()
}

/// Integers outside the 32-bit range use the two-word form.
pub(super) fn integer(analyzer: &mut FunctionAnalyzer<'_, '_>, value: i64) -> Type {
    if value.unsigned_abs() > i32::MAX as u64 {
        analyzer.writer.write_op(OpCode::WideInteger);
        analyzer.writer.write_wide(value as u64);
    } else {
        analyzer.writer.write_op(OpCode::Integer);
        analyzer.writer.write_word(value as i32 as u32);
    }
    Type::integer()
}

pub(super) fn double(analyzer: &mut FunctionAnalyzer<'_, '_>, value: f64) -> Type {
    analyzer.writer.write_op(OpCode::Double);
    analyzer.writer.write_double(value);
    Type::double()
}

pub(super) fn symbol(analyzer: &mut FunctionAnalyzer<'_, '_>, value: Symbol) -> Type {
    analyzer.writer.write_op(OpCode::SymbolLiteral);
    analyzer.writer.write_word(value.code());
    Type::symbol()
}

pub(super) fn nothingness(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Type {
    analyzer.writer.write_op(OpCode::Nothingness);
    Type::nothingness()
}
