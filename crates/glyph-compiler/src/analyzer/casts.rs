//! Dynamic casts and optional unwrapping.

use glyph_core::{CompilationError, CompilationWarning, Result, Token, Type, TypeKind};
use glyph_registry::Dynamism;

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;

/// `🔲 value Type`
///
/// The result is always optional: nothingness when the value is not of the
/// target type at run time. Values that may already be nothingness use the
/// safe variants of the class and protocol casts.
pub(super) fn cast(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    let opcode = analyzer.writer.reserve_placeholder();
    let original = analyzer.next_expression_expecting(&Type::something())?;
    let (target, _) = analyzer.annotation(Dynamism::NoDynamism)?;

    if analyzer.registry.is_compatible(&original, &target) {
        analyzer.warn(CompilationWarning::RedundantCast { span: token.span });
    }

    let safe = *original.kind() == TypeKind::Something || original.is_optional();
    match *target.kind() {
        TypeKind::Class(_) => {
            let Some(class) = analyzer.class_of(&target) else {
                return Err(invalid_target(analyzer, &target, token));
            };
            let registry = analyzer.registry;
            let exact_arguments = target.generic_arguments().len() == class.generic_constraints.len()
                && target
                    .generic_arguments()
                    .iter()
                    .zip(&class.generic_constraints)
                    .all(|(argument, constraint)| {
                        registry.is_compatible(argument, constraint)
                            && registry.is_compatible(constraint, argument)
                    });
            if !exact_arguments {
                return Err(CompilationError::type_mismatch(
                    "dynamic casts involving generic type arguments are not possible yet",
                    token.span,
                ));
            }
            let op = if safe {
                OpCode::SafeCastToClass
            } else {
                OpCode::CastToClass
            };
            opcode.write_op(analyzer.writer, op);
            analyzer.writer.write_word(class.index);
        }
        TypeKind::Protocol(hash) => {
            let Some(protocol) = analyzer.registry.protocol(hash) else {
                return Err(invalid_target(analyzer, &target, token));
            };
            let op = if safe {
                OpCode::SafeCastToProtocol
            } else {
                OpCode::CastToProtocol
            };
            opcode.write_op(analyzer.writer, op);
            analyzer.writer.write_word(protocol.index);
        }
        TypeKind::Boolean => opcode.write_op(analyzer.writer, OpCode::CastToBoolean),
        TypeKind::Integer => opcode.write_op(analyzer.writer, OpCode::CastToInteger),
        TypeKind::Symbol => opcode.write_op(analyzer.writer, OpCode::CastToSymbol),
        TypeKind::Double => opcode.write_op(analyzer.writer, OpCode::CastToDouble),
        _ => return Err(invalid_target(analyzer, &target, token)),
    }

    Ok(target.optional())
}

fn invalid_target(analyzer: &FunctionAnalyzer<'_, '_>, target: &Type, token: &Token) -> CompilationError {
    CompilationError::InvalidCastTarget {
        type_name: analyzer.type_name(target),
        span: token.span,
    }
}

/// `🍺 value`
pub(super) fn unwrap(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    analyzer.writer.write_op(OpCode::Unwrap);
    let ty = analyzer.next_expression()?;
    if !ty.is_optional() {
        return Err(CompilationError::type_mismatch(
            format!("{} can only be used with optionals", analyzer.type_name(&ty)),
            token.span,
        ));
    }
    Ok(ty.unwrapped())
}
