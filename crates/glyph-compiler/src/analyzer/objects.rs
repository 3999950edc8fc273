//! Self, enum values, instantiation and the superinitializer.

use glyph_core::{CompilationError, Result, Token, Type, TypeKind, glyphs};

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;

/// `🐕`
///
/// Inside an initializer of a subclass, the superinitializer must have run
/// and every field must be initialized first.
pub(super) fn self_reference(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    if analyzer.context.is_static {
        return Err(CompilationError::invalid_operation(
            format!("illegal use of {}", glyphs::SELF_REFERENCE),
            token.span,
        ));
    }
    let has_superclass = analyzer
        .declaring_class()
        .is_some_and(|class| class.superclass.is_some());
    if analyzer.initializer.is_some() && has_superclass && !analyzer.called_super {
        return Err(CompilationError::invalid_operation(
            format!(
                "attempt to use {} before superinitializer call",
                glyphs::SELF_REFERENCE
            ),
            token.span,
        ));
    }
    analyzer.check_instance_initialized(token.span)?;

    analyzer.used_self = true;
    analyzer.writer.write_op(OpCode::SelfReference);
    Ok(analyzer.context.self_type.clone())
}

/// `🔺 Type value`
pub(super) fn enum_value(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    let opcode = analyzer.writer.reserve_placeholder();
    let (ty, _) = analyzer.annotation(analyzer.dynamism())?;

    if !matches!(ty.kind(), TypeKind::Enum(_)) {
        return Err(CompilationError::type_mismatch(
            format!("{} is not an enum", analyzer.type_name(&ty)),
            token.span,
        ));
    }
    if ty.is_optional() {
        return Err(CompilationError::type_mismatch(
            "optionals cannot be accessed",
            token.span,
        ));
    }

    let (name, span) = analyzer.expect_name()?;
    let Some(value) = analyzer.registry.lookup_enum_value(&ty, name) else {
        return Err(CompilationError::UnknownEnumValue {
            type_name: analyzer.type_name(&ty),
            value: name.to_string(),
            span,
        });
    };

    match u32::try_from(value) {
        Ok(word) => {
            opcode.write_op(analyzer.writer, OpCode::Integer);
            analyzer.writer.write_word(word);
        }
        Err(_) => {
            opcode.write_op(analyzer.writer, OpCode::WideInteger);
            analyzer.writer.write_wide(value);
        }
    }
    Ok(ty)
}

/// `🔷 Type initializer arguments`
///
/// With `🐀` the class is chosen at run time, so only required
/// initializers may be used.
pub(super) fn instantiate(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    analyzer.writer.write_op(OpCode::Instantiate);
    let (ty, dynamic) = analyzer.annotation(analyzer.dynamism())?;

    let Some(class) = analyzer.class_of(&ty) else {
        return Err(CompilationError::type_mismatch(
            format!("{} cannot be instantiated", analyzer.type_name(&ty)),
            token.span,
        ));
    };
    if ty.is_optional() {
        return Err(CompilationError::type_mismatch(
            "optionals cannot be instantiated",
            token.span,
        ));
    }
    analyzer
        .writer
        .write_word(if dynamic { u32::MAX } else { class.index });

    let (name, span) = analyzer.expect_name()?;
    let registry = analyzer.registry;
    let Some(initializer) = registry.lookup_initializer(&ty, name) else {
        return Err(CompilationError::UnknownInitializer {
            type_name: analyzer.type_name(&ty),
            initializer: name.to_string(),
            span,
        });
    };
    if dynamic && !initializer.is_required() {
        return Err(CompilationError::invalid_operation(
            format!(
                "only required initializers can be used with {}",
                glyphs::DYNAMIC_CLASS
            ),
            span,
        ));
    }

    analyzer.writer.write_word(initializer.vti);
    analyzer.check_access(initializer, span)?;
    analyzer.check_arguments(&initializer.arguments, &ty)?;

    Ok(ty.with_optional(initializer.can_return_nothingness()))
}

/// `☁ value`
pub(super) fn is_nothingness(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::IsNothingness);
    analyzer.next_expression()?;
    Ok(Type::boolean())
}

/// `😜 a b`
pub(super) fn identity_compare(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::IdentityCompare);
    analyzer.next_expression_expecting(&Type::someobject())?;
    analyzer.next_expression_expecting(&Type::someobject())?;
    Ok(Type::boolean())
}

/// `🐐 initializer arguments`
///
/// Allowed once per initializer of a subclass, outside of conditional
/// blocks, after every own field was initialized.
pub(super) fn superinitializer(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
) -> Result<Type> {
    if analyzer.initializer.is_none() {
        return Err(CompilationError::invalid_operation(
            format!(
                "{} can only be used inside initializers",
                glyphs::SUPERINITIALIZER
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
            format!(
                "{} can only be used if the class inherits from another",
                glyphs::SUPERINITIALIZER
            ),
            token.span,
        ));
    };
    if analyzer.called_super {
        return Err(CompilationError::DuplicateSuperinitializer { span: token.span });
    }
    if analyzer.flow_control_depth > 0 {
        return Err(CompilationError::invalid_operation(
            "superinitializer may not be called inside a flow control block",
            token.span,
        ));
    }
    analyzer.check_instance_initialized(token.span)?;

    analyzer.writer.write_op(OpCode::Superinitializer);
    analyzer.writer.write_word(superclass.index);

    let (name, span) = analyzer.expect_name()?;
    let super_type = superclass.self_type();
    let Some(initializer) = registry.lookup_initializer(&super_type, name) else {
        return Err(CompilationError::UnknownInitializer {
            type_name: analyzer.type_name(&super_type),
            initializer: name.to_string(),
            span,
        });
    };
    analyzer.writer.write_word(initializer.vti);
    analyzer.check_access(initializer, span)?;
    let self_type = analyzer.context.self_type.clone();
    analyzer.check_arguments(&initializer.arguments, &self_type)?;

    analyzer.called_super = true;
    Ok(Type::nothingness())
}
