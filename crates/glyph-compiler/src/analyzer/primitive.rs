//! Primitive operator resolution.
//!
//! Methods called on booleans, integers, doubles, symbols and enum values
//! have no dispatch table; every receiver kind and operator pair maps to
//! one fixed opcode. Equality works on every receiver that reaches this
//! table and compares against a value of the same type.

use glyph_core::{Symbol, Type, TypeKind, glyphs};

use crate::bytecode::OpCode;

/// A resolved primitive operator.
#[derive(Debug, Clone, PartialEq)]
pub(super) struct PrimitiveOperation {
    pub opcode: OpCode,
    /// Type of the second operand, `None` for unary operators.
    pub operand: Option<Type>,
    pub result: Type,
}

impl PrimitiveOperation {
    fn unary(opcode: OpCode, result: Type) -> Self {
        Self {
            opcode,
            operand: None,
            result,
        }
    }

    fn binary(opcode: OpCode, operand: Type, result: Type) -> Self {
        Self {
            opcode,
            operand: Some(operand),
            result,
        }
    }
}

/// Resolve `operator` on a non-optional primitive receiver.
///
/// Returns `None` if the receiver is no primitive or does not support the
/// operator.
pub(super) fn operation(receiver: &Type, operator: Symbol) -> Option<PrimitiveOperation> {
    match receiver.kind() {
        TypeKind::Boolean => boolean(operator),
        TypeKind::Integer => integer(operator),
        TypeKind::Double => double(operator),
        _ if operator == glyphs::EQUAL => Some(
            PrimitiveOperation::binary(OpCode::Equal, receiver.clone(), Type::boolean()),
        ),
        _ => None,
    }
}

fn boolean(operator: Symbol) -> Option<PrimitiveOperation> {
    let opcode = match operator {
        glyphs::NOT => return Some(PrimitiveOperation::unary(OpCode::Not, Type::boolean())),
        glyphs::OR => OpCode::Or,
        glyphs::AND => OpCode::And,
        glyphs::EQUAL => OpCode::Equal,
        _ => return None,
    };
    Some(PrimitiveOperation::binary(
        opcode,
        Type::boolean(),
        Type::boolean(),
    ))
}

fn integer(operator: Symbol) -> Option<PrimitiveOperation> {
    let (opcode, result) = match operator {
        glyphs::MINUS => (OpCode::SubtractInteger, Type::integer()),
        glyphs::PLUS => (OpCode::AddInteger, Type::integer()),
        glyphs::MULTIPLY => (OpCode::MultiplyInteger, Type::integer()),
        glyphs::DIVIDE => (OpCode::DivideInteger, Type::integer()),
        glyphs::REMAINDER => (OpCode::RemainderInteger, Type::integer()),
        glyphs::LESS => (OpCode::LessInteger, Type::boolean()),
        glyphs::GREATER => (OpCode::GreaterInteger, Type::boolean()),
        glyphs::LESS_OR_EQUAL => (OpCode::LessOrEqualInteger, Type::boolean()),
        glyphs::GREATER_OR_EQUAL => (OpCode::GreaterOrEqualInteger, Type::boolean()),
        glyphs::EQUAL => (OpCode::Equal, Type::boolean()),
        _ => return None,
    };
    Some(PrimitiveOperation::binary(opcode, Type::integer(), result))
}

fn double(operator: Symbol) -> Option<PrimitiveOperation> {
    let (opcode, result) = match operator {
        glyphs::EQUAL => (OpCode::EqualDouble, Type::boolean()),
        glyphs::MINUS => (OpCode::SubtractDouble, Type::double()),
        glyphs::PLUS => (OpCode::AddDouble, Type::double()),
        glyphs::MULTIPLY => (OpCode::MultiplyDouble, Type::double()),
        glyphs::DIVIDE => (OpCode::DivideDouble, Type::double()),
        glyphs::LESS => (OpCode::LessDouble, Type::boolean()),
        glyphs::GREATER => (OpCode::GreaterDouble, Type::boolean()),
        glyphs::LESS_OR_EQUAL => (OpCode::LessOrEqualDouble, Type::boolean()),
        glyphs::GREATER_OR_EQUAL => (OpCode::GreaterOrEqualDouble, Type::boolean()),
        _ => return None,
    };
    Some(PrimitiveOperation::binary(opcode, Type::double(), result))
}
