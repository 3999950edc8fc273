//! Conditionals, loops and returns.
//!
//! Every branch body is a flow control block: a `🍇 … 🍉` block whose word
//! count precedes it. Each branch gets its own scope, holding the variable
//! bound by a conditional unwrap or a loop.

use glyph_core::{
    CompilationError, CompilationWarning, Construct, Result, Span, Token, Type, TypeKind, glyphs,
    standard,
};
use rustc_hash::FxHashSet;

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;
use crate::scope::{Scope, SlotRef, Variable};

/// Analyze `🍇 statements 🍉` as a conditionally executed block.
///
/// Returns the variables first initialized inside the block.
fn flow_control_block(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Vec<SlotRef>> {
    let include_instance = !analyzer.context.is_static;
    analyzer.scopes.enter_conditional_block(include_instance);
    analyzer.flow_control_depth += 1;

    analyzer
        .tokens
        .expect_construct(Construct::BlockOpen, glyphs::BLOCK_OPEN)?;
    let count = analyzer.writer.reserve_count_placeholder();
    loop {
        let token = analyzer.tokens.next_required()?;
        if token.is(Construct::BlockClose) {
            break;
        }
        analyzer.statement(token)?;
    }
    count.write(analyzer.writer);

    analyzer.effect = true;
    let initialized = analyzer.scopes.leave_conditional_block(include_instance);
    analyzer.flow_control_depth -= 1;
    analyzer.returned = false;
    Ok(initialized)
}

/// Run `body` inside a fresh block scope.
fn in_branch_scope<T>(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    body: impl FnOnce(&mut FunctionAnalyzer<'_, '_>) -> Result<T>,
) -> Result<T> {
    analyzer.scopes.push_scope(Scope::new());
    let result = body(analyzer);
    if let Some(scope) = analyzer.scopes.pop_scope()
        && result.is_ok()
        && analyzer.options.recommend_frozen
    {
        for variable in scope.frozen_recommendations() {
            analyzer.session.warn(CompilationWarning::FrozenRecommendation {
                name: variable.name.clone(),
                span: variable.span,
            });
        }
    }
    result
}

/// The condition of an `🍊` or `🍋` branch.
///
/// `🍦 name expr` binds the unwrapped value of an optional for the branch;
/// anything else must be a boolean.
fn condition(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<()> {
    if analyzer.tokens.eat(Construct::FrozenDeclare).is_none() {
        analyzer.next_expression_expecting(&Type::boolean())?;
        return Ok(());
    }

    let (name, span) = analyzer.expect_variable()?;
    if analyzer.scopes.declared_in_current(name) {
        return Err(CompilationError::Redeclaration {
            name: name.to_string(),
            span,
        });
    }
    analyzer.writer.write_op(OpCode::ConditionalBind);
    let id = analyzer.next_variable_id(span)?;
    analyzer.writer.write_word(u32::from(id));

    let value_span = analyzer.tokens.end_span();
    let ty = analyzer.next_expression()?;
    if !ty.is_optional() {
        return Err(CompilationError::type_mismatch(
            "condition assignment can only be used with optionals",
            value_span,
        ));
    }

    let variable = Variable::new(name, ty.unwrapped(), id, span)
        .initialized()
        .frozen();
    analyzer.scopes.declare_local(variable)
}

/// `🍊 condition block (🍋 condition block)* (🍓 block)?`
pub(super) fn if_chain(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::If);
    let count = analyzer.writer.reserve_count_placeholder();

    let mut branches = Vec::new();
    branches.push(in_branch_scope(analyzer, |analyzer| {
        condition(analyzer)?;
        flow_control_block(analyzer)
    })?);

    while analyzer.tokens.eat(Construct::ElseIf).is_some() {
        analyzer.writer.write_op(OpCode::ElseIf);
        branches.push(in_branch_scope(analyzer, |analyzer| {
            condition(analyzer)?;
            flow_control_block(analyzer)
        })?);
    }

    let exhaustive = analyzer.tokens.eat(Construct::Else).is_some();
    if exhaustive {
        analyzer.writer.write_op(OpCode::Else);
        branches.push(in_branch_scope(analyzer, flow_control_block)?);
    }

    count.write(analyzer.writer);

    // A variable initialized by every branch of a chain with an else branch
    // is initialized after the chain.
    if exhaustive {
        let mut branches = branches.into_iter();
        let mut common: FxHashSet<SlotRef> = branches.next().into_iter().flatten().collect();
        for branch in branches {
            let branch: FxHashSet<SlotRef> = branch.into_iter().collect();
            common.retain(|slot| branch.contains(slot));
        }
        for slot in common {
            analyzer.scopes.mark_initialized(slot);
        }
    }

    Ok(Type::nothingness())
}

/// `🔁 condition block`
pub(super) fn repeat_while(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    analyzer.writer.write_op(OpCode::RepeatWhile);
    analyzer.next_expression_expecting(&Type::boolean())?;
    in_branch_scope(analyzer, flow_control_block)?;
    Ok(Type::nothingness())
}

/// `🔂 name iteratee block`
///
/// Lists use a dedicated opcode. Anything else must conform to the
/// enumerable protocol; its element type is the single generic argument of
/// the iteratee's class, or something.
pub(super) fn for_in(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    let opcode = analyzer.writer.reserve_placeholder();
    let (name, span) = analyzer.expect_variable()?;

    in_branch_scope(analyzer, |analyzer| {
        let id = analyzer.next_variable_id(span)?;
        analyzer.writer.write_word(u32::from(id));
        let internal = analyzer.next_variable_id(span)?;
        analyzer.writer.write_word(u32::from(internal));

        let iteratee = analyzer.next_expression_expecting(&Type::someobject())?;
        let element = iteration_element(analyzer, &iteratee, token.span)?;
        let op = if iteratee.class_hash() == Some(standard::LIST) {
            OpCode::ForInList
        } else {
            OpCode::ForInEnumerable
        };
        opcode.write_op(analyzer.writer, op);

        let variable = Variable::new(name, element, id, span)
            .initialized()
            .frozen();
        analyzer.scopes.declare_local(variable)?;
        flow_control_block(analyzer)
    })?;
    Ok(Type::nothingness())
}

fn iteration_element(
    analyzer: &FunctionAnalyzer<'_, '_>,
    iteratee: &Type,
    span: Span,
) -> Result<Type> {
    if iteratee.class_hash() == Some(standard::LIST) {
        return Ok(iteratee
            .generic_arguments()
            .first()
            .cloned()
            .unwrap_or_else(Type::something));
    }
    if !analyzer.registry.is_enumerable(iteratee) {
        return Err(CompilationError::type_mismatch(
            format!(
                "{} does not conform to {}",
                analyzer.type_name(iteratee),
                glyphs::ENUMERABLE_PROTOCOL
            ),
            span,
        ));
    }
    let single_parameter = analyzer
        .class_of(iteratee)
        .is_some_and(|class| class.generic_constraints.len() == 1);
    Ok(match iteratee.generic_arguments() {
        [element] if single_parameter => element.clone(),
        _ => Type::something(),
    })
}

/// `🍎 value`
pub(super) fn return_value(analyzer: &mut FunctionAnalyzer<'_, '_>, token: &Token) -> Result<Type> {
    if analyzer.effect {
        return Err(CompilationError::InvalidReturn {
            message: "return value cannot be used as an argument".to_string(),
            span: token.span,
        });
    }
    analyzer.effect = true;

    if let Some(initializer) = analyzer.initializer {
        if !initializer.can_return_nothingness() {
            return Err(CompilationError::InvalidReturn {
                message: "return cannot be used inside an initializer".to_string(),
                span: token.span,
            });
        }
        analyzer.writer.write_op(OpCode::Return);
        analyzer.next_expression_expecting(&Type::nothingness())?;
        return Ok(Type::nothingness());
    }

    if *analyzer.return_type.kind() == TypeKind::Nothingness {
        return Err(CompilationError::InvalidReturn {
            message: "return may not be used inside a void procedure".to_string(),
            span: token.span,
        });
    }

    analyzer.writer.write_op(OpCode::Return);
    let return_type = analyzer.return_type.clone();
    analyzer.next_expression_expecting(&return_type)?;
    analyzer.returned = true;
    Ok(Type::nothingness())
}
