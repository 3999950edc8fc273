//! Symbol codes and the decoded construct vocabulary.
//!
//! The source language uses pictographic code points instead of keywords.
//! [`Symbol`] wraps one code point; [`Construct`] is the closed set of
//! compiler actions an identifier token can request. Decoding happens once,
//! when the token stream is produced, so the analyzer dispatches with an
//! exhaustive `match` instead of comparing raw codes.

use std::fmt;

/// A single 32-bit symbol code (one Unicode scalar value).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[repr(transparent)]
pub struct Symbol(pub u32);

impl Symbol {
    /// Create a symbol from a character.
    #[inline]
    pub const fn from_char(ch: char) -> Self {
        Symbol(ch as u32)
    }

    /// Get the raw code.
    #[inline]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// The character this symbol stands for, if the code is a valid scalar.
    pub fn as_char(self) -> Option<char> {
        char::from_u32(self.0)
    }
}

impl From<char> for Symbol {
    fn from(ch: char) -> Self {
        Symbol::from_char(ch)
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(ch) => write!(f, "Symbol({ch} U+{:04X})", self.0),
            None => write!(f, "Symbol({:#x})", self.0),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.as_char() {
            Some(ch) => write!(f, "{ch}"),
            None => write!(f, "U+{:04X}", self.0),
        }
    }
}

/// Well-known symbol codes.
pub mod glyphs {
    use super::Symbol;

    // ========================================================================
    // Statements and expressions
    // ========================================================================

    pub const DECLARE: Symbol = Symbol(0x1F370); // 🍰
    pub const ASSIGN: Symbol = Symbol(0x1F36E); // 🍮
    pub const FROZEN_DECLARE: Symbol = Symbol(0x1F366); // 🍦
    pub const INCREMENT: Symbol = Symbol(0x1F36B); // 🍫
    pub const DECREMENT: Symbol = Symbol(0x1F373); // 🍳
    pub const CONCATENATE: Symbol = Symbol(0x1F36A); // 🍪
    pub const LIST_LITERAL: Symbol = Symbol(0x1F368); // 🍨
    pub const DICTIONARY_LITERAL: Symbol = Symbol(0x1F36F); // 🍯
    pub const COLLECTION_END: Symbol = Symbol(0x1F346); // 🍆
    pub const IF: Symbol = Symbol(0x1F34A); // 🍊
    pub const ELSE_IF: Symbol = Symbol(0x1F34B); // 🍋
    pub const ELSE: Symbol = Symbol(0x1F353); // 🍓
    pub const BLOCK_OPEN: Symbol = Symbol(0x1F347); // 🍇
    pub const BLOCK_CLOSE: Symbol = Symbol(0x1F349); // 🍉
    pub const REPEAT_WHILE: Symbol = Symbol(0x1F501); // 🔁
    pub const FOR_IN: Symbol = Symbol(0x1F502); // 🔂
    pub const DYNAMIC_CLASS: Symbol = Symbol(0x1F400); // 🐀
    pub const SELF_REFERENCE: Symbol = Symbol(0x1F415); // 🐕
    pub const ENUM_ACCESS: Symbol = Symbol(0x1F53A); // 🔺
    pub const INSTANTIATE: Symbol = Symbol(0x1F537); // 🔷
    pub const NOTHINGNESS_LITERAL: Symbol = Symbol(0x26A1); // ⚡
    pub const IS_NOTHINGNESS: Symbol = Symbol(0x2601); // ☁
    pub const IDENTITY_COMPARE: Symbol = Symbol(0x1F61C); // 😜
    pub const SUPERINITIALIZER: Symbol = Symbol(0x1F410); // 🐐
    pub const RETURN: Symbol = Symbol(0x1F34E); // 🍎
    pub const CAST: Symbol = Symbol(0x1F532); // 🔲
    pub const UNWRAP: Symbol = Symbol(0x1F37A); // 🍺
    pub const OPTIONAL_CHAIN_CALL: Symbol = Symbol(0x1F37B); // 🍻
    pub const CLASS_METHOD_CALL: Symbol = Symbol(0x1F369); // 🍩
    pub const CAPTURE_METHOD: Symbol = Symbol(0x1F336); // 🌶
    pub const INVOKE_CALLABLE: Symbol = Symbol(0x1F36D); // 🍭
    pub const SUPER_METHOD_CALL: Symbol = Symbol(0x1F43F); // 🐿

    // ========================================================================
    // Type annotations
    // ========================================================================

    pub const OPTIONAL_MARKER: Symbol = Symbol(0x1F36C); // 🍬
    pub const NAMESPACE_MARKER: Symbol = Symbol(0x1F536); // 🔶
    pub const GENERIC_MARKER: Symbol = Symbol(0x1F41A); // 🐚
    pub const RETURN_ARROW: Symbol = Symbol(0x27A1); // ➡

    pub const BOOLEAN: Symbol = Symbol(0x1F44C); // 👌
    pub const INTEGER: Symbol = Symbol(0x1F682); // 🚂
    pub const DOUBLE: Symbol = Symbol(0x1F680); // 🚀
    pub const SYMBOL: Symbol = Symbol(0x1F523); // 🔣
    pub const SOMETHING: Symbol = Symbol(0x26AA); // ⚪
    pub const SOMEOBJECT: Symbol = Symbol(0x1F535); // 🔵
    pub const NOTHINGNESS: Symbol = Symbol(0x2728); // ✨

    /// Namespace every unqualified type annotation is looked up in.
    pub const DEFAULT_NAMESPACE: Symbol = Symbol(0x1F534); // 🔴
    pub const STRING_TYPE: Symbol = Symbol(0x1F521); // 🔡
    pub const LIST_TYPE: Symbol = Symbol(0x1F368); // 🍨
    pub const DICTIONARY_TYPE: Symbol = Symbol(0x1F36F); // 🍯
    pub const ENUMERABLE_PROTOCOL: Symbol = Symbol(0x1F502); // 🔂

    // ========================================================================
    // Primitive operators
    // ========================================================================

    pub const NOT: Symbol = Symbol(0x274E); // ❎
    pub const OR: Symbol = Symbol(0x1F389); // 🎉
    pub const AND: Symbol = Symbol(0x1F38A); // 🎊
    pub const PLUS: Symbol = Symbol(0x2795); // ➕
    pub const MINUS: Symbol = Symbol(0x2796); // ➖
    pub const MULTIPLY: Symbol = Symbol(0x2716); // ✖
    pub const DIVIDE: Symbol = Symbol(0x2797); // ➗
    pub const REMAINDER: Symbol = Symbol(0x1F6AE); // 🚮
    pub const LESS: Symbol = Symbol(0x25C0); // ◀
    pub const GREATER: Symbol = Symbol(0x25B6); // ▶
    pub const LESS_OR_EQUAL: Symbol = Symbol(0x2B05); // ⬅
    pub const GREATER_OR_EQUAL: Symbol = Symbol(0x27A1); // ➡
    pub const EQUAL: Symbol = Symbol(0x1F61B); // 😛
}

/// Compiler action requested by an identifier token.
///
/// Every code that is not a dedicated construct is a method name and
/// decodes to [`Construct::Method`]; the analyzer then treats it as a call
/// on the following receiver expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Construct {
    Declare,
    Assign,
    FrozenDeclare,
    Increment,
    Decrement,
    Concatenate,
    ListLiteral,
    DictionaryLiteral,
    CollectionEnd,
    If,
    ElseIf,
    Else,
    /// Opens a block, or a closure literal in expression position.
    BlockOpen,
    BlockClose,
    RepeatWhile,
    ForIn,
    DynamicClass,
    SelfReference,
    EnumAccess,
    Instantiate,
    NothingnessLiteral,
    IsNothingness,
    IdentityCompare,
    Superinitializer,
    Return,
    Cast,
    Unwrap,
    OptionalChainCall,
    ClassMethodCall,
    CaptureMethod,
    InvokeCallable,
    SuperMethodCall,
    /// A method (or primitive operator) name.
    Method(Symbol),
}

impl Construct {
    /// Decode a symbol code into the construct it requests.
    pub fn from_symbol(symbol: Symbol) -> Self {
        use glyphs::*;

        match symbol {
            DECLARE => Construct::Declare,
            ASSIGN => Construct::Assign,
            FROZEN_DECLARE => Construct::FrozenDeclare,
            INCREMENT => Construct::Increment,
            DECREMENT => Construct::Decrement,
            CONCATENATE => Construct::Concatenate,
            LIST_LITERAL => Construct::ListLiteral,
            DICTIONARY_LITERAL => Construct::DictionaryLiteral,
            COLLECTION_END => Construct::CollectionEnd,
            IF => Construct::If,
            ELSE_IF => Construct::ElseIf,
            ELSE => Construct::Else,
            BLOCK_OPEN => Construct::BlockOpen,
            BLOCK_CLOSE => Construct::BlockClose,
            REPEAT_WHILE => Construct::RepeatWhile,
            FOR_IN => Construct::ForIn,
            DYNAMIC_CLASS => Construct::DynamicClass,
            SELF_REFERENCE => Construct::SelfReference,
            ENUM_ACCESS => Construct::EnumAccess,
            INSTANTIATE => Construct::Instantiate,
            NOTHINGNESS_LITERAL => Construct::NothingnessLiteral,
            IS_NOTHINGNESS => Construct::IsNothingness,
            IDENTITY_COMPARE => Construct::IdentityCompare,
            SUPERINITIALIZER => Construct::Superinitializer,
            RETURN => Construct::Return,
            CAST => Construct::Cast,
            UNWRAP => Construct::Unwrap,
            OPTIONAL_CHAIN_CALL => Construct::OptionalChainCall,
            CLASS_METHOD_CALL => Construct::ClassMethodCall,
            CAPTURE_METHOD => Construct::CaptureMethod,
            INVOKE_CALLABLE => Construct::InvokeCallable,
            SUPER_METHOD_CALL => Construct::SuperMethodCall,
            other => Construct::Method(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_dedicated_constructs() {
        assert_eq!(Construct::from_symbol(glyphs::DECLARE), Construct::Declare);
        assert_eq!(Construct::from_symbol(glyphs::RETURN), Construct::Return);
        assert_eq!(
            Construct::from_symbol(Symbol::from_char('🍻')),
            Construct::OptionalChainCall
        );
    }

    #[test]
    fn other_symbols_are_methods() {
        assert_eq!(
            Construct::from_symbol(glyphs::PLUS),
            Construct::Method(glyphs::PLUS)
        );
        let custom = Symbol::from_char('🐱');
        assert_eq!(Construct::from_symbol(custom), Construct::Method(custom));
    }

    #[test]
    fn glyph_constants_match_characters() {
        assert_eq!(glyphs::BLOCK_OPEN, Symbol::from_char('🍇'));
        assert_eq!(glyphs::BLOCK_CLOSE, Symbol::from_char('🍉'));
        assert_eq!(glyphs::NOTHINGNESS_LITERAL, Symbol::from_char('⚡'));
        assert_eq!(glyphs::REMAINDER, Symbol::from_char('🚮'));
    }

    #[test]
    fn symbol_display() {
        assert_eq!(format!("{}", glyphs::IF), "🍊");
        assert_eq!(format!("{}", Symbol(0xD800)), "U+D800");
    }
}
