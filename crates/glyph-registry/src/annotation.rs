//! Reading type annotations from the token stream.
//!
//! ```text
//! annotation := [🍬] base
//! base       := 🐀                                 dynamic class of the context
//!             | 👌 | 🚂 | 🚀 | 🔣 | ⚪ | 🔵 | ✨       primitives and special types
//!             | 🍇 annotation* [➡ annotation] 🍉     callable
//!             | [🔶 namespace] name (🐚 annotation)* class, protocol or enum
//! ```
//!
//! Generic arguments that are not written fall back to the parameter's
//! constraint.

use glyph_core::{
    CompilationError, Construct, Result, Symbol, Token, TokenCategory, TokenStream, Type, glyphs,
};

use crate::TypeRegistry;

/// Whether an annotation may name the dynamic class of the context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dynamism {
    NoDynamism,
    AllowDynamicClass,
}

fn eat_symbol<'t>(tokens: &mut TokenStream<'t>, symbol: Symbol) -> Option<&'t Token> {
    let matches = tokens
        .peek()
        .and_then(Token::as_identifier)
        .is_some_and(|identifier| identifier.symbol == symbol);
    if matches { tokens.next() } else { None }
}

fn expect_symbol<'t>(tokens: &mut TokenStream<'t>) -> Result<(Symbol, &'t Token)> {
    let token = tokens.expect(TokenCategory::Identifier)?;
    match token.as_identifier() {
        Some(identifier) => Ok((identifier.symbol, token)),
        None => Err(CompilationError::UnexpectedToken {
            expected: TokenCategory::Identifier.to_string(),
            found: token.describe(),
            span: token.span,
        }),
    }
}

impl TypeRegistry {
    /// Read one type annotation.
    ///
    /// `context` is the type of the class being compiled; `🐀` resolves to
    /// it when `dynamism` allows. Unqualified names are looked up in
    /// `namespace`. Returns the type and whether it is dynamic.
    pub fn resolve_annotated_type(
        &self,
        tokens: &mut TokenStream<'_>,
        context: &Type,
        namespace: Symbol,
        dynamism: Dynamism,
    ) -> Result<(Type, bool)> {
        let optional = eat_symbol(tokens, glyphs::OPTIONAL_MARKER).is_some();
        let (symbol, token) = expect_symbol(tokens)?;

        let ty = match symbol {
            glyphs::DYNAMIC_CLASS => {
                if dynamism == Dynamism::NoDynamism {
                    return Err(CompilationError::invalid_operation(
                        "dynamic types are not allowed here",
                        token.span,
                    ));
                }
                if context.class_hash().is_none() {
                    return Err(CompilationError::invalid_operation(
                        "dynamic types are only available in a class context",
                        token.span,
                    ));
                }
                return Ok((context.clone().with_optional(optional), true));
            }
            glyphs::BOOLEAN => Type::boolean(),
            glyphs::INTEGER => Type::integer(),
            glyphs::DOUBLE => Type::double(),
            glyphs::SYMBOL => Type::symbol(),
            glyphs::SOMETHING => Type::something(),
            glyphs::SOMEOBJECT => Type::someobject(),
            glyphs::NOTHINGNESS => Type::nothingness(),
            glyphs::BLOCK_OPEN => self.resolve_callable(tokens, context, namespace)?,
            glyphs::NAMESPACE_MARKER => {
                let (explicit_namespace, _) = expect_symbol(tokens)?;
                let (name, name_token) = expect_symbol(tokens)?;
                self.resolve_named(tokens, context, explicit_namespace, name, name_token)?
            }
            name => self.resolve_named(tokens, context, namespace, name, token)?,
        };

        Ok((ty.with_optional(optional), false))
    }

    fn resolve_callable(
        &self,
        tokens: &mut TokenStream<'_>,
        context: &Type,
        namespace: Symbol,
    ) -> Result<Type> {
        let mut arguments = Vec::new();
        let mut return_type = Type::nothingness();
        loop {
            if eat_symbol(tokens, glyphs::BLOCK_CLOSE).is_some() {
                break;
            }
            if eat_symbol(tokens, glyphs::RETURN_ARROW).is_some() {
                return_type = self
                    .resolve_annotated_type(tokens, context, namespace, Dynamism::NoDynamism)?
                    .0;
                tokens.expect_construct(Construct::BlockClose, glyphs::BLOCK_CLOSE)?;
                break;
            }
            let (argument, _) =
                self.resolve_annotated_type(tokens, context, namespace, Dynamism::NoDynamism)?;
            arguments.push(argument);
        }
        Ok(Type::callable(return_type, arguments))
    }

    fn resolve_named(
        &self,
        tokens: &mut TokenStream<'_>,
        context: &Type,
        namespace: Symbol,
        name: Symbol,
        token: &Token,
    ) -> Result<Type> {
        let Some(ty) = self.lookup_type(namespace, name) else {
            let name = if namespace == glyphs::DEFAULT_NAMESPACE {
                name.to_string()
            } else {
                format!("{}{namespace}{name}", glyphs::NAMESPACE_MARKER)
            };
            return Err(CompilationError::UnknownType {
                name,
                span: token.span,
            });
        };

        let Some(class) = ty.class_hash().and_then(|hash| self.class(hash)) else {
            return Ok(ty);
        };

        let mut arguments = Vec::with_capacity(class.generic_constraints.len());
        for constraint in &class.generic_constraints {
            if eat_symbol(tokens, glyphs::GENERIC_MARKER).is_some() {
                let (argument, _) =
                    self.resolve_annotated_type(tokens, context, namespace, Dynamism::NoDynamism)?;
                arguments.push(argument);
            } else {
                arguments.push(constraint.clone());
            }
        }
        if let Some(extra) = eat_symbol(tokens, glyphs::GENERIC_MARKER) {
            return Err(CompilationError::type_mismatch(
                format!("too many generic arguments for {}", self.type_name(&ty)),
                extra.span,
            ));
        }

        Ok(ty.with_generic_arguments(arguments))
    }
}

#[cfg(test)]
mod tests {
    use glyph_core::{ClassEntry, Span, standard};

    use super::*;

    fn ident(symbol: Symbol) -> Token {
        Token::identifier(symbol, Span::new(1, 1, 1))
    }

    fn read(registry: &TypeRegistry, tokens: &[Token], dynamism: Dynamism) -> Result<(Type, bool)> {
        let mut stream = TokenStream::new(tokens);
        let context = Type::class(standard::STRING);
        registry.resolve_annotated_type(&mut stream, &context, glyphs::DEFAULT_NAMESPACE, dynamism)
    }

    #[test]
    fn primitive_and_optional() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [ident(glyphs::OPTIONAL_MARKER), ident(glyphs::INTEGER)];
        let (ty, dynamic) = read(&registry, &tokens, Dynamism::NoDynamism).unwrap();
        assert_eq!(ty, Type::integer().optional());
        assert!(!dynamic);
    }

    #[test]
    fn generic_class_with_argument() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [
            ident(glyphs::LIST_TYPE),
            ident(glyphs::GENERIC_MARKER),
            ident(glyphs::INTEGER),
        ];
        let (ty, _) = read(&registry, &tokens, Dynamism::NoDynamism).unwrap();
        assert_eq!(ty, Type::class_with(standard::LIST, vec![Type::integer()]));
    }

    #[test]
    fn missing_generic_argument_uses_constraint() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [ident(glyphs::LIST_TYPE)];
        let (ty, _) = read(&registry, &tokens, Dynamism::NoDynamism).unwrap();
        assert_eq!(ty.generic_arguments(), &[Type::something()]);
    }

    #[test]
    fn callable_annotation() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [
            ident(glyphs::BLOCK_OPEN),
            ident(glyphs::INTEGER),
            ident(glyphs::DOUBLE),
            ident(glyphs::RETURN_ARROW),
            ident(glyphs::BOOLEAN),
            ident(glyphs::BLOCK_CLOSE),
        ];
        let (ty, _) = read(&registry, &tokens, Dynamism::NoDynamism).unwrap();
        assert_eq!(
            ty,
            Type::callable(Type::boolean(), [Type::integer(), Type::double()])
        );
    }

    #[test]
    fn namespaced_class() {
        let mut registry = TypeRegistry::new();
        let ns = Symbol::from_char('🏰');
        let hash = registry
            .register_class(ClassEntry::new(ns, Symbol::from_char('👑')))
            .unwrap();
        let tokens = [
            ident(glyphs::NAMESPACE_MARKER),
            ident(ns),
            ident(Symbol::from_char('👑')),
        ];
        let (ty, _) = read(&registry, &tokens, Dynamism::NoDynamism).unwrap();
        assert_eq!(ty, Type::class(hash));
    }

    #[test]
    fn unknown_type() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [ident(Symbol::from_char('🦄'))];
        let err = read(&registry, &tokens, Dynamism::NoDynamism).unwrap_err();
        assert!(matches!(err, CompilationError::UnknownType { .. }));
    }

    #[test]
    fn dynamic_class_requires_permission() {
        let registry = TypeRegistry::with_standard_types();
        let tokens = [ident(glyphs::DYNAMIC_CLASS)];
        let err = read(&registry, &tokens, Dynamism::NoDynamism).unwrap_err();
        assert!(matches!(err, CompilationError::InvalidOperation { .. }));

        let (ty, dynamic) = read(&registry, &tokens, Dynamism::AllowDynamicClass).unwrap();
        assert!(dynamic);
        assert_eq!(ty, Type::class(standard::STRING));
    }
}
