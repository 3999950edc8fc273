//! Closure literals.
//!
//! ```text
//! 🍇 (name Type)* [➡ Type] statements 🍉
//! ```
//!
//! A closure body is analyzed by a fresh [`FunctionAnalyzer`] that writes
//! into the same chunk and shares the instance scope. Local variables of
//! the enclosing body are copied into the closure's own slots, after its
//! arguments, keeping their enclosing slot order.

use glyph_core::{Argument, Construct, Result, TokenCategory, Type, glyphs};
use tracing::debug;

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;

/// Bit of the closure trailer word set when the body uses the instance.
const USED_SELF_FLAG: u32 = 1 << 16;

pub(super) fn closure(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let mut arguments = Vec::new();
    while analyzer
        .tokens
        .peek()
        .is_some_and(|token| token.category() == TokenCategory::Variable)
    {
        let (name, _) = analyzer.expect_variable()?;
        let (ty, _) = analyzer.annotation(analyzer.dynamism())?;
        arguments.push(Argument::new(name, ty));
    }
    let return_type = if analyzer
        .tokens
        .eat(Construct::Method(glyphs::RETURN_ARROW))
        .is_some()
    {
        analyzer.annotation(analyzer.dynamism())?.0
    } else {
        Type::nothingness()
    };

    analyzer.writer.write_op(OpCode::Closure);
    let variables = analyzer.writer.reserve_placeholder();
    let count = analyzer.writer.reserve_count_placeholder();

    let captured = analyzer.scopes.visible_locals();
    let outer_variable_count = analyzer.variable_count;
    debug!(
        arguments = arguments.len(),
        captured = captured.len(),
        "analyzing closure"
    );

    let child = FunctionAnalyzer::new(
        analyzer.registry,
        &mut *analyzer.tokens,
        &mut *analyzer.writer,
        &mut *analyzer.session,
        analyzer.scopes.instance_mut(),
        analyzer.context.clone(),
        analyzer.options.with_compile_dead_code(true),
    );
    let summary = child.run(
        &arguments,
        return_type.clone(),
        None,
        &captured,
        outer_variable_count,
    )?;
    count.write(analyzer.writer);

    let mut header = arguments.len() as u32;
    if summary.used_self {
        header |= USED_SELF_FLAG;
        analyzer.used_self = true;
    }
    analyzer.writer.write_word(header);
    analyzer.writer.write_word(outer_variable_count as u32);
    variables.write(analyzer.writer, summary.variable_count as u32);

    Ok(Type::callable(
        return_type,
        arguments.into_iter().map(|argument| argument.ty),
    ))
}
