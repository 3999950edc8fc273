//! Integration tests for glyphc using Unit as the entry point.
//!
//! These tests build complete procedure bodies from the test_scripts
//! directory against a registry holding a small class hierarchy.

use glyphc::{
    ClassEntry, CompilationError, CompilationWarning, OpCode, ProcedureEntry, ProcedureFlags,
    ProcedureKind, Span, Symbol, Token, TokenKind, Type, TypeHash, TypeRegistry, Unit, UnitError,
    glyphs, standard,
};
use std::path::PathBuf;

const CAT: char = '🐱';
const LION: char = '🦁';
const LIVES: char = '💗';
const SPEAK: char = '🔊';
const PURR: char = '🧬';
const BREED: char = '🏭';
const NEW: char = '🆕';
const CUB: char = '🦷';

fn hash(name: char) -> TypeHash {
    TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol::from_char(name))
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// `🐱` with a name and a number of lives, and `🦁` inheriting from it.
///
/// `🐱` also declares a native method, implemented by the host.
fn registry() -> TypeRegistry {
    let ns = glyphs::DEFAULT_NAMESPACE;
    let string = Type::class(standard::STRING);
    let mut registry = TypeRegistry::with_standard_types();

    let cat = ClassEntry::new(ns, CAT.into())
        .with_instance_variable("name", string.clone())
        .with_instance_variable("lives", Type::integer())
        .with_method(ProcedureEntry::method(LIVES).returning(Type::integer()))
        .with_method(ProcedureEntry::method(SPEAK).returning(string.clone()))
        .with_method(ProcedureEntry::method(PURR).with_flags(ProcedureFlags::NATIVE))
        .with_class_method(ProcedureEntry::class_method(BREED).returning(Type::class(hash(CAT))))
        .with_initializer(ProcedureEntry::initializer(NEW).with_argument("given", string));
    registry.register_class(cat).unwrap();

    let lion = ClassEntry::new(ns, LION.into())
        .with_superclass(hash(CAT))
        .with_instance_variable("mane", Type::boolean())
        .with_initializer(ProcedureEntry::initializer(CUB));
    registry.register_class(lion).unwrap();

    registry
}

/// Load a test script from the test_scripts directory.
fn load_script(filename: &str) -> Vec<Token> {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("test_scripts")
        .join(filename);
    let source = std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e));
    tokens(&source)
}

/// Whitespace separated tokens; see the scripts for the notation.
fn tokens(source: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    for (line, text) in source.lines().enumerate() {
        let mut col = 1u32;
        for word in text.split_whitespace() {
            let len = word.chars().count() as u32;
            let span = Span::new(line as u32 + 1, col, len);
            col += len + 1;

            let token = if let Some(text) = word.strip_prefix('"').and_then(|w| w.strip_suffix('"'))
            {
                Token::new(TokenKind::String(text.replace('_', " ")), span)
            } else if word == "👍" {
                Token::new(TokenKind::BooleanTrue, span)
            } else if let Ok(value) = word.parse::<i64>() {
                Token::new(TokenKind::Integer(value), span)
            } else if word.chars().all(|ch| ch.is_ascii_lowercase()) {
                Token::variable(word, span)
            } else {
                Token::identifier(word.chars().next().unwrap(), span)
            };
            tokens.push(token);
        }
    }
    tokens
}

fn add(unit: &mut Unit<'_>, class: char, kind: ProcedureKind, symbol: char, script: &str) {
    unit.add_body(hash(class), kind, symbol.into(), load_script(script))
        .unwrap_or_else(|e| panic!("Failed to add {script}: {e}"));
}

const CAT_SCRIPTS: [(ProcedureKind, char, &str); 4] = [
    (ProcedureKind::Initializer, NEW, "cat_new.glyph"),
    (ProcedureKind::Method, LIVES, "cat_lives.glyph"),
    (ProcedureKind::Method, SPEAK, "cat_speak.glyph"),
    (ProcedureKind::ClassMethod, BREED, "cat_breed.glyph"),
];

/// Add every non-native body of `🐱` from its script.
fn add_cat(unit: &mut Unit<'_>) {
    for (kind, symbol, script) in CAT_SCRIPTS {
        add(unit, CAT, kind, symbol, script);
    }
}

/// Add the bodies of `🐱`, replacing one script with `source`.
fn add_cat_with(unit: &mut Unit<'_>, kind: ProcedureKind, symbol: char, source: &str) {
    for (script_kind, script_symbol, script) in CAT_SCRIPTS {
        if script_kind == kind && script_symbol == symbol {
            unit.add_body(hash(CAT), kind, symbol.into(), tokens(source))
                .unwrap();
        } else {
            add(unit, CAT, script_kind, script_symbol, script);
        }
    }
}

// =============================================================================
// Building
// =============================================================================

#[test]
fn test_build_class() {
    init_tracing();
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat(&mut unit);
    assert_eq!(unit.body_count(), 4);

    unit.build().unwrap();
    assert!(unit.is_built());
    let program = unit.program().unwrap();

    // Methods, class methods, then initializers
    let symbols: Vec<_> = program
        .procedures
        .iter()
        .map(|procedure| procedure.record.header.symbol)
        .collect();
    assert_eq!(
        symbols,
        [LIVES, SPEAK, PURR, BREED, NEW].map(Symbol::from_char)
    );

    let lives = &program.procedures[0].record;
    assert_eq!(lives.header.kind, ProcedureKind::Method);
    assert_eq!(lives.header.argument_count, 0);
    assert_eq!(lives.code.code(), &[OpCode::Return.word(), OpCode::LoadInstance.word(), 1]);

    let new = program
        .procedure(hash(CAT), ProcedureKind::Initializer, NEW.into())
        .unwrap();
    assert_eq!(new.header.argument_count, 1);
    new.code.assert_opcodes(&[
        OpCode::StoreInstance,
        OpCode::LoadLocal,
        OpCode::StoreInstance,
        OpCode::Integer,
    ]);

    let breed = program
        .procedure(hash(CAT), ProcedureKind::ClassMethod, BREED.into())
        .unwrap();
    assert_eq!(breed.header.variable_count, 2);
    breed.code.assert_contains_opcodes(&[
        OpCode::Instantiate,
        OpCode::RepeatWhile,
        OpCode::LessInteger,
        OpCode::Return,
    ]);
}

#[test]
fn test_native_procedures_get_records() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat(&mut unit);

    let program = unit.build().unwrap();
    let purr = program
        .procedure(hash(CAT), ProcedureKind::Method, PURR.into())
        .unwrap();
    assert!(purr.header.native);
    assert_eq!(purr.header.variable_count, 0);
    assert!(purr.code.is_empty());

    let lives = program
        .procedure(hash(CAT), ProcedureKind::Method, LIVES.into())
        .unwrap();
    assert!(!lives.header.native);
}

#[test]
fn test_subclass_is_built_separately() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat(&mut unit);
    add(&mut unit, LION, ProcedureKind::Initializer, CUB, "lion_cub.glyph");

    let program = unit.build().unwrap();
    assert_eq!(program.procedures_of(hash(CAT)).count(), 5);
    assert_eq!(program.procedures_of(hash(LION)).count(), 1);

    let cub = program
        .procedure(hash(LION), ProcedureKind::Initializer, CUB.into())
        .unwrap();
    cub.code.assert_opcodes(&[
        OpCode::StoreInstance,
        OpCode::True,
        OpCode::Superinitializer,
        OpCode::StringLiteral,
    ]);
}

#[test]
fn test_classes_without_bodies_are_skipped() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add(&mut unit, LION, ProcedureKind::Initializer, CUB, "lion_cub.glyph");

    // 🐱 has no body in this unit, so its procedures are not required
    let program = unit.build().unwrap();
    assert_eq!(program.procedures.len(), 1);
    assert_eq!(program.procedures_of(hash(CAT)).count(), 0);
}

#[test]
fn test_strings_are_shared_across_procedures() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat(&mut unit);
    add(&mut unit, LION, ProcedureKind::Initializer, CUB, "lion_cub.glyph");

    let program = unit.build().unwrap();
    assert_eq!(program.strings, [" says meow", "meow"]);
}

#[test]
fn test_warnings_are_collected() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat_with(&mut unit, ProcedureKind::Method, LIVES, "🍮 extra 1\n5\n🍎 extra\n🍉");

    let program = unit.build().unwrap();
    assert!(matches!(
        program.warnings.as_slice(),
        [
            CompilationWarning::NoEffect { .. },
            CompilationWarning::FrozenRecommendation { .. },
        ]
    ));
    assert_eq!(program.warnings[0].span().line, 2);
}

#[test]
fn test_rebuild_starts_fresh() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat(&mut unit);
    unit.build().unwrap();
    add(&mut unit, LION, ProcedureKind::Initializer, CUB, "lion_cub.glyph");
    assert!(!unit.is_built());
    assert!(unit.program().is_none());

    let program = unit.build().unwrap();
    assert_eq!(program.procedures.len(), 6);
    assert_eq!(program.strings.len(), 2);
}

#[test]
fn test_empty_unit() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    let program = unit.build().unwrap();
    assert!(program.procedures.is_empty());
    assert!(program.strings.is_empty());
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_unknown_class() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    let err = unit
        .add_body(hash('🐶'), ProcedureKind::Method, LIVES.into(), Vec::new())
        .unwrap_err();
    assert_eq!(err, UnitError::UnknownClass(hash('🐶')));
}

#[test]
fn test_unknown_procedure() {
    let registry = registry();
    let mut unit = Unit::new(&registry);

    // Initializers and methods live in separate namespaces
    let err = unit
        .add_body(hash(CAT), ProcedureKind::Method, NEW.into(), load_script("cat_new.glyph"))
        .unwrap_err();
    assert!(matches!(err, UnitError::UnknownProcedure { kind: "method", .. }));

    // Inherited procedures belong to the superclass
    let err = unit
        .add_body(hash(LION), ProcedureKind::Method, LIVES.into(), load_script("cat_lives.glyph"))
        .unwrap_err();
    assert!(matches!(err, UnitError::UnknownProcedure { .. }));
}

#[test]
fn test_duplicate_body() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add(&mut unit, CAT, ProcedureKind::Method, LIVES, "cat_lives.glyph");
    let err = unit
        .add_body(hash(CAT), ProcedureKind::Method, LIVES.into(), load_script("cat_lives.glyph"))
        .unwrap_err();
    assert_eq!(err.to_string(), "method 💗 of 🐱 already has a body");
}

#[test]
fn test_native_body() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    let err = unit
        .add_body(hash(CAT), ProcedureKind::Method, PURR.into(), Vec::new())
        .unwrap_err();
    assert!(matches!(err, UnitError::NativeBody { .. }));

    let string = registry.class(standard::STRING).unwrap();
    let native = string.methods.iter().find(|method| method.is_native()).unwrap();
    let err = unit
        .add_body(standard::STRING, ProcedureKind::Method, native.symbol, Vec::new())
        .unwrap_err();
    assert!(matches!(err, UnitError::NativeBody { .. }));
}

#[test]
fn test_missing_body() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add(&mut unit, CAT, ProcedureKind::Method, LIVES, "cat_lives.glyph");

    let err = unit.build().unwrap_err();
    assert!(!unit.is_built());
    assert_eq!(
        err,
        UnitError::MissingBody {
            class: CAT.into(),
            kind: "method",
            symbol: SPEAK.into(),
        }
    );
    assert_eq!(err.to_string(), "method 🔊 of 🐱 has no body");

    // Class methods and initializers are required too
    add(&mut unit, CAT, ProcedureKind::Method, SPEAK, "cat_speak.glyph");
    let err = unit.build().unwrap_err();
    assert!(matches!(err, UnitError::MissingBody { kind: "class method", .. }));

    add(&mut unit, CAT, ProcedureKind::ClassMethod, BREED, "cat_breed.glyph");
    let err = unit.build().unwrap_err();
    assert!(matches!(err, UnitError::MissingBody { kind: "initializer", .. }));
}

#[test]
fn test_compilation_error_names_procedure() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat_with(&mut unit, ProcedureKind::Method, SPEAK, "🍎 ghost\n🍉");

    let err = unit.build().unwrap_err();
    assert!(!unit.is_built());
    match &err {
        UnitError::Compilation { kind, symbol, source, .. } => {
            assert_eq!(*kind, "method");
            assert_eq!(*symbol, Symbol::from_char(SPEAK));
            assert!(matches!(source, CompilationError::UnresolvedVariable { name, .. } if name == "ghost"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(err.to_string().starts_with("in method 🔊 of 🐱: at 1:3"));
    assert!(std::error::Error::source(&err).is_some());
}

#[test]
fn test_initializer_must_set_fields() {
    let registry = registry();
    let mut unit = Unit::new(&registry);
    add_cat_with(&mut unit, ProcedureKind::Initializer, NEW, "🍮 name given\n🍉");

    let err = unit.build().unwrap_err();
    assert!(matches!(
        err,
        UnitError::Compilation {
            source: CompilationError::UninitializedField { .. },
            ..
        }
    ));
}
