//! Variable declarations, assignments and reads.

use glyph_core::{CompilationError, Result, Span, Token, Type};

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;
use crate::scope::Variable;

/// `name` - load a variable.
pub(super) fn read(analyzer: &mut FunctionAnalyzer<'_, '_>, name: &str, span: Span) -> Result<Type> {
    let Some((variable, scopes_up)) = analyzer.scopes.resolve(name) else {
        return Err(CompilationError::UnresolvedVariable {
            name: name.to_string(),
            span,
        });
    };
    variable.check_initialized(span)?;
    let (id, ty) = (variable.id, variable.ty.clone());

    analyzer.write_for_scopes_up(scopes_up, OpCode::LoadLocal, OpCode::LoadInstance, span)?;
    analyzer.writer.write_word(u32::from(id));
    Ok(ty)
}

fn check_redeclaration(analyzer: &FunctionAnalyzer<'_, '_>, name: &str, span: Span) -> Result<()> {
    if analyzer.scopes.declared_in_current(name) {
        return Err(CompilationError::Redeclaration {
            name: name.to_string(),
            span,
        });
    }
    Ok(())
}

/// `🍰 name Type` - declare a variable without a value.
///
/// Optional variables start out as nothingness and may be read at once.
pub(super) fn declare(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let (name, span) = analyzer.expect_variable()?;
    check_redeclaration(analyzer, name, span)?;

    let (ty, _) = analyzer.annotation(analyzer.dynamism())?;
    let id = analyzer.next_variable_id(span)?;
    let optional = ty.is_optional();
    let mut variable = Variable::new(name, ty, id, span);
    if optional {
        variable = variable.initialized();
    }
    analyzer.scopes.declare_local(variable)?;
    Ok(Type::nothingness())
}

/// `🍮 name value` - assign, declaring the variable if it does not exist.
pub(super) fn assign(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let (name, span) = analyzer.expect_variable()?;

    let Some((variable, scopes_up)) = analyzer.scopes.resolve(name) else {
        analyzer.writer.write_op(OpCode::StoreLocal);
        let id = analyzer.next_variable_id(span)?;
        analyzer.writer.write_word(u32::from(id));
        let ty = analyzer.next_expression()?;
        analyzer
            .scopes
            .declare_local(Variable::new(name, ty, id, span).initialized())?;
        return Ok(Type::nothingness());
    };

    variable.mutate(span)?;
    let (id, ty) = (variable.id, variable.ty.clone());
    analyzer.write_for_scopes_up(scopes_up, OpCode::StoreLocal, OpCode::StoreInstance, span)?;
    analyzer.writer.write_word(u32::from(id));
    analyzer.next_expression_expecting(&ty)?;

    if let Some((variable, _)) = analyzer.scopes.resolve(name) {
        variable.assign();
    }
    Ok(Type::nothingness())
}

/// `🍦 name value` - declare a frozen variable.
pub(super) fn declare_frozen(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let (name, span) = analyzer.expect_variable()?;
    check_redeclaration(analyzer, name, span)?;

    analyzer.writer.write_op(OpCode::StoreLocal);
    let id = analyzer.next_variable_id(span)?;
    analyzer.writer.write_word(u32::from(id));
    let ty = analyzer.next_expression()?;

    let variable = Variable::new(name, ty, id, span).initialized().frozen();
    analyzer.scopes.declare_local(variable)?;
    Ok(Type::nothingness())
}

/// `🍫 name` / `🍳 name` - increment or decrement an integer variable.
pub(super) fn step(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
    increment: bool,
) -> Result<Type> {
    let (name, span) = analyzer.expect_variable()?;
    let registry = analyzer.registry;

    let Some((variable, scopes_up)) = analyzer.scopes.resolve(name) else {
        return Err(CompilationError::UnresolvedVariable {
            name: name.to_string(),
            span,
        });
    };
    variable.check_initialized(span)?;
    if !registry.is_compatible(&variable.ty, &Type::integer()) {
        return Err(CompilationError::type_mismatch(
            format!(
                "{} can only operate on {}",
                describe_step(token),
                registry.type_name(&Type::integer())
            ),
            span,
        ));
    }
    variable.mutate(span)?;
    let id = variable.id;

    let (local, instance) = if increment {
        (OpCode::IncrementLocal, OpCode::IncrementInstance)
    } else {
        (OpCode::DecrementLocal, OpCode::DecrementInstance)
    };
    analyzer.write_for_scopes_up(scopes_up, local, instance, span)?;
    analyzer.writer.write_word(u32::from(id));
    Ok(Type::nothingness())
}

fn describe_step(token: &Token) -> String {
    token
        .as_identifier()
        .map(|identifier| identifier.symbol.to_string())
        .unwrap_or_default()
}
