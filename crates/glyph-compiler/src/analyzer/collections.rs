//! String concatenation and collection literals.

use glyph_core::{CompilationWarning, Construct, Result, Token, Type, TypeHash, standard};
use glyph_registry::TypeRegistry;

use super::FunctionAnalyzer;
use crate::bytecode::OpCode;

/// Folds element types into their least upper bound.
#[derive(Debug, Default)]
struct CommonTypeFinder {
    common: Option<Type>,
}

impl CommonTypeFinder {
    fn add(&mut self, registry: &TypeRegistry, ty: Type) {
        self.common = Some(match self.common.take() {
            Some(common) => registry.common_type(&common, &ty),
            None => ty,
        });
    }

    fn common_type(self) -> Option<Type> {
        self.common
    }
}

/// `🍪 string string* 🍪`
pub(super) fn concatenate(analyzer: &mut FunctionAnalyzer<'_, '_>) -> Result<Type> {
    let string = Type::class(standard::STRING);
    analyzer.writer.write_op(OpCode::Concatenate);
    let count = analyzer.writer.reserve_placeholder();

    analyzer.next_expression_expecting(&string)?;
    let mut strings = 1u32;
    loop {
        let token = analyzer.tokens.next_required()?;
        if token.is(Construct::Concatenate) {
            break;
        }
        analyzer.expression_expecting(token, &string)?;
        strings += 1;
    }

    count.write(analyzer.writer, strings);
    Ok(string)
}

/// The element type of an empty literal: the matching argument of the
/// expected collection type, or something.
fn empty_element(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
    collection: TypeHash,
    expected: Option<&Type>,
) -> Type {
    let inferred = expected
        .filter(|expected| expected.class_hash() == Some(collection))
        .and_then(|expected| expected.generic_arguments().first().cloned());
    inferred.unwrap_or_else(|| {
        analyzer.warn(CompilationWarning::EmptyCollection { span: token.span });
        Type::something()
    })
}

/// `🍨 element* 🍆`
pub(super) fn list(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
    expected: Option<&Type>,
) -> Result<Type> {
    analyzer.writer.write_op(OpCode::ListLiteral);
    let count = analyzer.writer.reserve_count_placeholder();

    let mut finder = CommonTypeFinder::default();
    loop {
        let element = analyzer.tokens.next_required()?;
        if element.is(Construct::CollectionEnd) {
            break;
        }
        let ty = analyzer.expression(element, None)?;
        finder.add(analyzer.registry, ty);
    }
    count.write(analyzer.writer);

    let element = match finder.common_type() {
        Some(element) => element,
        None => empty_element(analyzer, token, standard::LIST, expected),
    };
    Ok(Type::class_with(standard::LIST, vec![element]))
}

/// `🍯 (key value)* 🍆` with string keys.
pub(super) fn dictionary(
    analyzer: &mut FunctionAnalyzer<'_, '_>,
    token: &Token,
    expected: Option<&Type>,
) -> Result<Type> {
    let string = Type::class(standard::STRING);
    analyzer.writer.write_op(OpCode::DictionaryLiteral);
    let count = analyzer.writer.reserve_count_placeholder();

    let mut finder = CommonTypeFinder::default();
    loop {
        let key = analyzer.tokens.next_required()?;
        if key.is(Construct::CollectionEnd) {
            break;
        }
        analyzer.expression_expecting(key, &string)?;
        let ty = analyzer.next_expression()?;
        finder.add(analyzer.registry, ty);
    }
    count.write(analyzer.writer);

    let element = match finder.common_type() {
        Some(element) => element,
        None => empty_element(analyzer, token, standard::DICTIONARY, expected),
    };
    Ok(Type::class_with(standard::DICTIONARY, vec![element]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finder_widens_to_optional() {
        let registry = TypeRegistry::with_standard_types();
        let mut finder = CommonTypeFinder::default();
        finder.add(&registry, Type::integer());
        finder.add(&registry, Type::nothingness());
        assert_eq!(finder.common_type(), Some(Type::integer().optional()));
    }

    #[test]
    fn finder_without_elements() {
        assert_eq!(CommonTypeFinder::default().common_type(), None);
    }
}
