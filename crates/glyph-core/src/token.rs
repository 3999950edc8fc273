//! Pre-lexed tokens and the cursor the analyzer pulls them through.
//!
//! Lexing happens outside this workspace. A lexer produces a slice of
//! [`Token`]s per procedure body; identifier tokens arrive with their
//! [`Construct`] already decoded. [`TokenStream`] offers the three
//! operations the analyzer needs: `next`, `peek` and `expect`.

use std::fmt;

use ordered_float::OrderedFloat;

use crate::{CompilationError, Construct, Result, Span, Symbol};

/// An identifier token's payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identifier {
    /// The raw symbol code.
    pub symbol: Symbol,
    /// The action decoded from `symbol`.
    pub construct: Construct,
}

impl Identifier {
    /// Decode an identifier from its symbol.
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            construct: Construct::from_symbol(symbol),
        }
    }
}

/// The payload of a token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// String literal with escapes already resolved.
    String(String),
    BooleanTrue,
    BooleanFalse,
    Integer(i64),
    Double(OrderedFloat<f64>),
    /// Symbol literal (`🔟x` in source).
    Symbol(Symbol),
    /// Reference to a variable by name.
    Variable(String),
    Identifier(Identifier),
    ArgumentBracketOpen,
    ArgumentBracketClose,
    DocumentationComment(String),
}

/// Token categories used by [`TokenStream::expect`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenCategory {
    String,
    Boolean,
    Integer,
    Double,
    Symbol,
    Variable,
    Identifier,
    ArgumentBracketOpen,
    ArgumentBracketClose,
    DocumentationComment,
}

impl fmt::Display for TokenCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenCategory::String => "string",
            TokenCategory::Boolean => "boolean",
            TokenCategory::Integer => "integer",
            TokenCategory::Double => "double",
            TokenCategory::Symbol => "symbol",
            TokenCategory::Variable => "variable",
            TokenCategory::Identifier => "identifier",
            TokenCategory::ArgumentBracketOpen => "argument bracket open",
            TokenCategory::ArgumentBracketClose => "argument bracket close",
            TokenCategory::DocumentationComment => "documentation comment",
        };
        f.write_str(name)
    }
}

/// A token with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Self { kind, span }
    }

    /// Create an identifier token, decoding its construct.
    pub fn identifier(symbol: impl Into<Symbol>, span: Span) -> Self {
        Self::new(TokenKind::Identifier(Identifier::new(symbol.into())), span)
    }

    /// Create a variable token.
    pub fn variable(name: impl Into<String>, span: Span) -> Self {
        Self::new(TokenKind::Variable(name.into()), span)
    }

    pub fn category(&self) -> TokenCategory {
        match &self.kind {
            TokenKind::String(_) => TokenCategory::String,
            TokenKind::BooleanTrue | TokenKind::BooleanFalse => TokenCategory::Boolean,
            TokenKind::Integer(_) => TokenCategory::Integer,
            TokenKind::Double(_) => TokenCategory::Double,
            TokenKind::Symbol(_) => TokenCategory::Symbol,
            TokenKind::Variable(_) => TokenCategory::Variable,
            TokenKind::Identifier(_) => TokenCategory::Identifier,
            TokenKind::ArgumentBracketOpen => TokenCategory::ArgumentBracketOpen,
            TokenKind::ArgumentBracketClose => TokenCategory::ArgumentBracketClose,
            TokenKind::DocumentationComment(_) => TokenCategory::DocumentationComment,
        }
    }

    /// The identifier payload, if this is an identifier token.
    pub fn as_identifier(&self) -> Option<Identifier> {
        match &self.kind {
            TokenKind::Identifier(identifier) => Some(*identifier),
            _ => None,
        }
    }

    /// The decoded construct, if this is an identifier token.
    pub fn construct(&self) -> Option<Construct> {
        self.as_identifier().map(|identifier| identifier.construct)
    }

    /// Whether this is an identifier token decoding to `construct`.
    pub fn is(&self, construct: Construct) -> bool {
        self.construct() == Some(construct)
    }

    /// The variable name, if this is a variable token.
    pub fn as_variable(&self) -> Option<&str> {
        match &self.kind {
            TokenKind::Variable(name) => Some(name),
            _ => None,
        }
    }

    /// Short human-readable description for error messages.
    pub fn describe(&self) -> String {
        match &self.kind {
            TokenKind::Identifier(identifier) => format!("identifier {}", identifier.symbol),
            TokenKind::Variable(name) => format!("variable {name}"),
            _ => self.category().to_string(),
        }
    }
}

/// Cursor over one procedure body's tokens.
#[derive(Debug, Clone)]
pub struct TokenStream<'t> {
    tokens: &'t [Token],
    pos: usize,
}

impl<'t> TokenStream<'t> {
    pub fn new(tokens: &'t [Token]) -> Self {
        Self { tokens, pos: 0 }
    }

    /// Consume the next token, or `None` at the end of the body.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Option<&'t Token> {
        let token = self.tokens.get(self.pos)?;
        self.pos += 1;
        Some(token)
    }

    /// Look at the next token without consuming it.
    pub fn peek(&self) -> Option<&'t Token> {
        self.tokens.get(self.pos)
    }

    /// Consume the next token, failing at the end of the body.
    pub fn next_required(&mut self) -> Result<&'t Token> {
        let span = self.end_span();
        self.next()
            .ok_or(CompilationError::UnexpectedEndOfBody { span })
    }

    /// Consume the next token and require its category.
    pub fn expect(&mut self, category: TokenCategory) -> Result<&'t Token> {
        let token = self.next_required()?;
        if token.category() != category {
            return Err(CompilationError::UnexpectedToken {
                expected: category.to_string(),
                found: token.describe(),
                span: token.span,
            });
        }
        Ok(token)
    }

    /// Consume the next token and require it to be a specific construct.
    pub fn expect_construct(&mut self, construct: Construct, glyph: Symbol) -> Result<&'t Token> {
        let token = self.next_required()?;
        if !token.is(construct) {
            return Err(CompilationError::UnexpectedToken {
                expected: format!("identifier {glyph}"),
                found: token.describe(),
                span: token.span,
            });
        }
        Ok(token)
    }

    /// Consume the next token if it is the given construct.
    pub fn eat(&mut self, construct: Construct) -> Option<&'t Token> {
        match self.peek() {
            Some(token) if token.is(construct) => self.next(),
            _ => None,
        }
    }

    /// Whether the next token is the given construct.
    pub fn peek_is(&self, construct: Construct) -> bool {
        self.peek().is_some_and(|token| token.is(construct))
    }

    pub fn is_at_end(&self) -> bool {
        self.pos >= self.tokens.len()
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Span used for errors at the end of the body.
    pub fn end_span(&self) -> Span {
        self.tokens
            .get(self.pos)
            .or_else(|| self.tokens.last())
            .map(|token| token.span)
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyphs;

    fn sample() -> Vec<Token> {
        vec![
            Token::identifier(glyphs::DECLARE, Span::new(1, 1, 1)),
            Token::variable("x", Span::new(1, 2, 1)),
            Token::new(TokenKind::Integer(5), Span::new(1, 4, 1)),
        ]
    }

    #[test]
    fn identifier_decodes_construct() {
        let token = Token::identifier(glyphs::IF, Span::default());
        assert!(token.is(Construct::If));
        assert_eq!(token.category(), TokenCategory::Identifier);
    }

    #[test]
    fn next_and_peek() {
        let tokens = sample();
        let mut stream = TokenStream::new(&tokens);
        assert!(stream.peek_is(Construct::Declare));
        assert!(stream.eat(Construct::Declare).is_some());
        assert_eq!(stream.peek().and_then(Token::as_variable), Some("x"));
        stream.next();
        stream.next();
        assert!(stream.is_at_end());
        assert!(stream.next().is_none());
    }

    #[test]
    fn expect_wrong_category() {
        let tokens = sample();
        let mut stream = TokenStream::new(&tokens);
        let err = stream.expect(TokenCategory::Variable).unwrap_err();
        assert!(matches!(err, CompilationError::UnexpectedToken { .. }));
        assert_eq!(err.span(), Span::new(1, 1, 1));
    }

    #[test]
    fn expect_past_end() {
        let tokens = sample();
        let mut stream = TokenStream::new(&tokens[..1]);
        stream.next();
        let err = stream.expect(TokenCategory::Variable).unwrap_err();
        assert!(matches!(err, CompilationError::UnexpectedEndOfBody { .. }));
    }
}
