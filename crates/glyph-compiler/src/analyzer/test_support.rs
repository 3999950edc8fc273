//! Fixtures shared by the analyzer and procedure compiler tests.
//!
//! [`tokens`] turns a whitespace separated source line into tokens:
//! integers and decimals become number literals, `"text"` a string
//! (underscores read as spaces), `👍`/`👎` booleans, `(`/`)` argument
//! brackets, lowercase words variables and anything else an identifier of
//! its first character.

use glyph_core::{
    Argument, ClassEntry, CompilationWarning, EnumEntry, ProcedureEntry, ProcedureFlags,
    ProtocolEntry, Result, Span, Symbol, Token, TokenKind, TokenStream, Type, TypeHash,
    Visibility, glyphs, standard,
};
use glyph_registry::TypeRegistry;

use super::{AnalysisContext, AnalysisSummary, FunctionAnalyzer};
use crate::bytecode::BytecodeChunk;
use crate::emit::BytecodeWriter;
use crate::options::AnalyzerOptions;
use crate::procedure_compiler::instance_scope;
use crate::session::CompilationSession;

// Types
pub(crate) const CAT: char = '🐱';
pub(crate) const LION: char = '🦁';
pub(crate) const BOX: char = '📦';
pub(crate) const SPEAKER: char = '📢';
pub(crate) const LIGHT: char = '🚦';

// Members
pub(crate) const LIVES: char = '💗';
pub(crate) const SPEAK: char = '🔊';
pub(crate) const RENAME: char = '📝';
pub(crate) const SECRET: char = '🤫';
pub(crate) const GROOM: char = '🧶';
pub(crate) const BREED: char = '🏭';
pub(crate) const NEW: char = '🆕';
pub(crate) const MAYBE: char = '❓';
pub(crate) const KITTEN: char = '🍼';
pub(crate) const CUB: char = '🦷';
pub(crate) const UNBOX: char = '📤';
pub(crate) const PUT: char = '📥';
pub(crate) const RED: char = '🟥';
pub(crate) const GREEN: char = '🟩';
pub(crate) const FAR: char = '🟦';

pub(crate) fn hash(name: char) -> TypeHash {
    TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol::from_char(name))
}

pub(crate) fn class_type(name: char) -> Type {
    Type::class(hash(name))
}

pub(crate) fn string_type() -> Type {
    Type::class(standard::STRING)
}

pub(crate) fn list_of(element: Type) -> Type {
    Type::class_with(standard::LIST, vec![element])
}

/// A registry with the standard types plus:
///
/// - `🐱` with fields `name`, `lives` and optional `owner`, conforming to `📢`
/// - `🦁` inheriting from `🐱` with field `mane`
/// - `📦` generic over one element, enumerable, with field `content`
/// - `📢` protocol and `🚦` enum
pub(crate) fn fixture_registry() -> TypeRegistry {
    let ns = glyphs::DEFAULT_NAMESPACE;
    let mut registry = TypeRegistry::with_standard_types();

    registry
        .register_protocol(
            ProtocolEntry::new(ns, SPEAKER.into())
                .with_method(ProcedureEntry::method(SPEAK).returning(string_type())),
        )
        .unwrap();
    registry
        .register_enum(
            EnumEntry::new(ns, LIGHT.into())
                .with_value(RED)
                .with_value(GREEN)
                .with_explicit_value(FAR, 1 << 40),
        )
        .unwrap();

    let cat = ClassEntry::new(ns, CAT.into())
        .with_protocol(hash(SPEAKER))
        .with_instance_variable("name", string_type())
        .with_instance_variable("lives", Type::integer())
        .with_instance_variable("owner", string_type().optional())
        .with_method(ProcedureEntry::method(LIVES).returning(Type::integer()))
        .with_method(ProcedureEntry::method(SPEAK).returning(string_type()))
        .with_method(ProcedureEntry::method(RENAME).with_argument("given", string_type()))
        .with_method(
            ProcedureEntry::method(SECRET)
                .returning(Type::integer())
                .with_visibility(Visibility::Private),
        )
        .with_method(ProcedureEntry::method(GROOM).with_visibility(Visibility::Protected))
        .with_class_method(ProcedureEntry::class_method(BREED).returning(class_type(CAT)))
        .with_initializer(ProcedureEntry::initializer(NEW).with_argument("given", string_type()))
        .with_initializer(
            ProcedureEntry::initializer(MAYBE).with_flags(ProcedureFlags::CAN_RETURN_NOTHINGNESS),
        )
        .with_initializer(ProcedureEntry::initializer(KITTEN).with_flags(ProcedureFlags::REQUIRED));
    registry.register_class(cat).unwrap();

    let lion = ClassEntry::new(ns, LION.into())
        .with_superclass(hash(CAT))
        .with_instance_variable("mane", Type::boolean())
        .with_method(ProcedureEntry::method(SPEAK).returning(string_type()))
        .with_initializer(ProcedureEntry::initializer(CUB));
    registry.register_class(lion).unwrap();

    let element = Type::generic_parameter(0);
    let boxed = ClassEntry::new(ns, BOX.into())
        .with_generic_parameter(Type::something())
        .with_protocol(standard::ENUMERABLE)
        .with_instance_variable("content", element.clone())
        .with_method(ProcedureEntry::method(UNBOX).returning(element.clone()))
        .with_method(ProcedureEntry::method(PUT).with_argument("item", element));
    registry.register_class(boxed).unwrap();

    registry
}

/// Tokenize a test body. Lines are numbered from 1.
pub(crate) fn tokens(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (line, text) in source.lines().enumerate() {
        let mut col = 1u32;
        for word in text.split_whitespace() {
            let len = word.chars().count() as u32;
            tokens.push(token(word, Span::new(line as u32 + 1, col, len)));
            col += len + 1;
        }
    }
    tokens
}

fn token(word: &str, span: Span) -> Token {
    let word: String = word.chars().filter(|ch| *ch != '\u{FE0F}').collect();
    if let Some(text) = word.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
        return Token::new(TokenKind::String(text.replace('_', " ")), span);
    }
    let kind = match word.as_str() {
        "👍" => TokenKind::BooleanTrue,
        "👎" => TokenKind::BooleanFalse,
        "(" => TokenKind::ArgumentBracketOpen,
        ")" => TokenKind::ArgumentBracketClose,
        _ if word.parse::<i64>().is_ok() => TokenKind::Integer(word.parse().unwrap()),
        _ if word.contains('.') && word.parse::<f64>().is_ok() => {
            TokenKind::Double(word.parse::<f64>().unwrap().into())
        }
        _ if word
            .chars()
            .all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit() || ch == '_') =>
        {
            TokenKind::Variable(word)
        }
        _ => return Token::identifier(word.chars().next().unwrap(), span),
    };
    Token::new(kind, span)
}

/// Output of one analyzed test body.
#[derive(Debug)]
pub(crate) struct Compiled {
    pub chunk: BytecodeChunk,
    pub summary: AnalysisSummary,
    pub warnings: Vec<CompilationWarning>,
    pub strings: Vec<String>,
}

/// Analyzes test bodies in the context of a fixture class.
///
/// Defaults to an instance method of `🐱` returning nothingness.
pub(crate) struct Harness<'r> {
    registry: &'r TypeRegistry,
    class: TypeHash,
    is_static: bool,
    initializer: Option<Symbol>,
    arguments: Vec<Argument>,
    return_type: Type,
    options: AnalyzerOptions,
}

impl<'r> Harness<'r> {
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            class: hash(CAT),
            is_static: false,
            initializer: None,
            arguments: Vec::new(),
            return_type: Type::nothingness(),
            options: AnalyzerOptions::default(),
        }
    }

    pub fn in_class(mut self, name: char) -> Self {
        self.class = hash(name);
        self
    }

    /// Analyze as a class method.
    pub fn class_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Analyze as the named initializer of the class, taking its arguments.
    pub fn initializer(mut self, name: char) -> Self {
        self.initializer = Some(Symbol::from_char(name));
        self
    }

    pub fn argument(mut self, name: &str, ty: Type) -> Self {
        self.arguments.push(Argument::new(name, ty));
        self
    }

    pub fn returning(mut self, ty: Type) -> Self {
        self.return_type = ty;
        self
    }

    pub fn options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    pub fn compile(&self, source: &str) -> Result<Compiled> {
        let class = self.registry.class(self.class).unwrap();
        let initializer = self
            .initializer
            .map(|symbol| class.own_initializer(symbol).unwrap());
        let arguments = initializer.map_or(self.arguments.as_slice(), |init| {
            init.arguments.as_slice()
        });
        let mut instance = if self.is_static {
            None
        } else {
            Some(instance_scope(self.registry, class, initializer.is_some())?)
        };

        let tokens = tokens(source);
        let mut stream = TokenStream::new(&tokens);
        let mut writer = BytecodeWriter::new();
        let mut session = CompilationSession::new();
        let context = AnalysisContext::new(class.self_type(), class.namespace, self.is_static);

        let summary = FunctionAnalyzer::new(
            self.registry,
            &mut stream,
            &mut writer,
            &mut session,
            instance.as_mut(),
            context,
            self.options,
        )
        .analyze(arguments, self.return_type.clone(), initializer)?;

        assert_eq!(writer.open_placeholders(), 0, "unfilled placeholders");
        let (strings, warnings) = session.finish();
        Ok(Compiled {
            chunk: writer.finish(),
            summary,
            warnings,
            strings,
        })
    }
}
