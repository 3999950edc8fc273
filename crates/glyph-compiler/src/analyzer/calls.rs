//! Method calls in all their forms.
//!
//! A call names the method first and the receiver second:
//! `method receiver arguments`. The opcode depends on the receiver's type,
//! so it is reserved before the receiver is analyzed and filled afterwards.

use glyph_core::{
    CompilationError, CompilationWarning, ProcedureEntry, Result, Span, Symbol, Token, Type,
    TypeKind, glyphs,
};

use super::{FunctionAnalyzer, primitive};
use crate::bytecode::OpCode;

fn unknown_method(
    analyzer: &FunctionAnalyzer<'_, '_>,
    ty: &Type,
    method: Symbol,
    span: Span,
) -> CompilationError {
    CompilationError::UnknownMethod {
        type_name: analyzer.type_name(ty),
        method: method.to_string(),
        span,
    }
}

/// Generic parameters dispatch on their constraint.
fn dispatch_type(analyzer: &FunctionAnalyzer<'_, '_>, receiver: &Type) -> Type {
    let TypeKind::GenericParameter(index) = *receiver.kind() else {
        return receiver.clone();
    };
    analyzer
        .declaring_class()
        .and_then(|class| class.generic_constraints.get(usize::from(index)))
        .cloned()
        .unwrap_or_else(|| receiver.clone())
}

/// Check access and arguments, returning the call's type.
fn finish_call(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    procedure: &ProcedureEntry,
    receiver: &Type,
    span: Span,
) -> Result<Type> {
    analyzer.check_access(procedure, span)?;
    analyzer.check_arguments(&procedure.arguments, receiver)?;
    Ok(procedure.return_type.resolve_on(receiver))
}

/// `method receiver arguments`
///
/// Classes dispatch through their virtual table, protocols through the
/// protocol table; primitive receivers map to a fixed opcode.
pub(super) fn method_call(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    method: Symbol,
    token: &Token,
) -> Result<Type> {
    let opcode = analyzer.writer.reserve_placeholder();
    let receiver_token = analyzer.tokens.next_required()?;
    let receiver = analyzer.expression(receiver_token, None)?;
    if receiver.is_optional() {
        return Err(CompilationError::OptionalReceiver {
            span: receiver_token.span,
        });
    }

    let registry = analyzer.registry;
    let dispatch = dispatch_type(analyzer, &receiver);
    match *dispatch.kind() {
        TypeKind::Protocol(hash) => {
            let (Some(protocol), Some(procedure)) = (
                registry.protocol(hash),
                registry.lookup_method(&dispatch, method),
            ) else {
                return Err(unknown_method(analyzer, &receiver, method, token.span));
            };
            opcode.write_op(analyzer.writer, OpCode::ProtocolMethodCall);
            analyzer.writer.write_word(protocol.index);
            analyzer.writer.write_word(procedure.vti);
            finish_call(analyzer, procedure, &receiver, token.span)
        }
        TypeKind::Class(_) => {
            let Some(procedure) = registry.lookup_method(&dispatch, method) else {
                return Err(unknown_method(analyzer, &receiver, method, token.span));
            };
            opcode.write_op(analyzer.writer, OpCode::MethodCall);
            analyzer.writer.write_word(procedure.vti);
            finish_call(analyzer, procedure, &receiver, token.span)
        }
        _ => {
            let Some(operation) = primitive::operation(&dispatch, method) else {
                return Err(CompilationError::UnknownPrimitiveOperation {
                    operator: method.to_string(),
                    type_name: analyzer.type_name(&receiver),
                    span: token.span,
                });
            };
            opcode.write_op(analyzer.writer, operation.opcode);
            if let Some(operand) = &operation.operand {
                analyzer.next_expression_expecting(operand)?;
            }
            Ok(operation.result)
        }
    }
}

/// `🍻 method receiver arguments`
///
/// Calls the method if the receiver is not nothingness. The result is
/// optional whatever the method returns.
pub(super) fn optional_chain(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
) -> Result<Type> {
    analyzer.writer.write_op(OpCode::OptionalChainCall);
    let count = analyzer.writer.reserve_count_placeholder();
    let (method, span) = analyzer.expect_name()?;

    let receiver_token = analyzer.tokens.next_required()?;
    let receiver = analyzer.expression(receiver_token, None)?;
    if !receiver.is_optional() {
        return Err(CompilationError::type_mismatch(
            format!(
                "{} can only be used with optionals",
                glyphs::OPTIONAL_CHAIN_CALL
            ),
            token.span,
        ));
    }
    let receiver = receiver.unwrapped();

    let registry = analyzer.registry;
    let procedure = match receiver.kind() {
        TypeKind::Class(_) => registry.lookup_method(&receiver, method),
        _ => None,
    };
    let Some(procedure) = procedure else {
        return Err(unknown_method(analyzer, &receiver, method, span));
    };
    analyzer.writer.write_word(procedure.vti);
    count.write(analyzer.writer);

    Ok(finish_call(analyzer, procedure, &receiver, span)?.optional())
}

/// `🍩 method Type arguments`
pub(super) fn class_method(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::ClassMethodCall);
    let (method, span) = analyzer.expect_name()?;

    let (mut ty, dynamic) = analyzer.annotation(analyzer.dynamism())?;
    if ty.is_optional() {
        analyzer.warn(CompilationWarning::RedundantOptionalMarker { span });
        ty = ty.unwrapped();
    }
    let Some(class) = analyzer.class_of(&ty) else {
        return Err(CompilationError::type_mismatch(
            format!("{} has no class methods", analyzer.type_name(&ty)),
            span,
        ));
    };
    analyzer
        .writer
        .write_word(if dynamic { u32::MAX } else { class.index });

    let registry = analyzer.registry;
    let Some(procedure) = registry.lookup_class_method(&ty, method) else {
        return Err(unknown_method(analyzer, &ty, method, span));
    };
    analyzer.writer.write_word(procedure.vti);
    finish_call(analyzer, procedure, &ty, span)
}

/// `🌶 method receiver`
///
/// Binds the method to the receiver without calling it.
pub(super) fn capture_method(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let (method, span) = analyzer.expect_name()?;
    analyzer.writer.write_op(OpCode::CaptureMethod);

    let receiver_token = analyzer.tokens.next_required()?;
    let receiver = analyzer.expression(receiver_token, None)?;
    if receiver.is_optional() {
        return Err(CompilationError::OptionalReceiver {
            span: receiver_token.span,
        });
    }

    let registry = analyzer.registry;
    let procedure = match receiver.kind() {
        TypeKind::Class(_) => registry.lookup_method(&receiver, method),
        _ => None,
    };
    let Some(procedure) = procedure else {
        return Err(unknown_method(analyzer, &receiver, method, span));
    };
    analyzer.writer.write_word(procedure.vti);
    analyzer.check_access(procedure, span)?;

    Ok(Type::callable(
        procedure.return_type.resolve_on(&receiver),
        procedure
            .arguments
            .iter()
            .map(|argument| argument.ty.resolve_on(&receiver)),
    ))
}

/// `🍭 callable arguments`
pub(super) fn invoke_callable(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::InvokeCallable);

    let callable_token = analyzer.tokens.next_required()?;
    let ty = analyzer.expression(callable_token, None)?;
    if *ty.kind() != TypeKind::Callable || ty.is_optional() {
        return Err(CompilationError::type_mismatch(
            format!("{} is not callable", analyzer.type_name(&ty)),
            callable_token.span,
        ));
    }

    analyzer.check_argument_types(ty.callable_arguments())?;
    Ok(ty.callable_return().cloned().unwrap_or_else(Type::nothingness))
}

/// `🐿 method arguments`
///
/// Calls the superclass implementation on the instance.
pub(super) fn super_method(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
) -> Result<Type> {
    let (method, span) = analyzer.expect_name()?;
    if analyzer.context.is_static {
        return Err(CompilationError::invalid_operation(
            format!(
                "{} cannot be used in a class method",
                glyphs::SUPER_METHOD_CALL
            ),
            token.span,
        ));
    }

    let registry = analyzer.registry;
    let Some(superclass) = analyzer
        .declaring_class()
        .and_then(|class| class.superclass)
        .and_then(|hash| registry.class(hash))
    else {
        return Err(CompilationError::invalid_operation(
            "class has no superclass",
            token.span,
        ));
    };

    analyzer.writer.write_op(OpCode::SuperMethodCall);
    analyzer.writer.write_word(superclass.index);

    let super_type = superclass.self_type();
    let Some(procedure) = registry.lookup_method(&super_type, method) else {
        return Err(unknown_method(analyzer, &super_type, method, span));
    };
    analyzer.writer.write_word(procedure.vti);
    analyzer.used_self = true;

    let self_type = analyzer.context.self_type.clone();
    finish_call(analyzer, procedure, &self_type, span)
}
