//! Performance benchmarks for procedure analysis.
//!
//! - Script bodies: the bodies under test_scripts built as one unit
//! - Body size: straight-line bodies from 10 to 120 statements
//! - Nesting: deeply nested conditionals and loops

use criterion::{Criterion, Throughput, criterion_group, criterion_main};
use glyphc::{
    ClassEntry, ProcedureEntry, ProcedureKind, Span, Symbol, Token, TokenKind, Type, TypeHash,
    TypeRegistry, Unit, glyphs, standard,
};
use std::hint::black_box;

const CAT: char = '🐱';
const COUNTER: char = '🧮';
const LIVES: char = '💗';
const SPEAK: char = '🔊';
const NEW: char = '🆕';

fn hash(class: char) -> TypeHash {
    TypeHash::from_type(glyphs::DEFAULT_NAMESPACE, Symbol::from_char(class))
}

fn registry() -> TypeRegistry {
    let string = Type::class(standard::STRING);
    let mut registry = TypeRegistry::with_standard_types();
    let cat = ClassEntry::new(glyphs::DEFAULT_NAMESPACE, CAT.into())
        .with_instance_variable("name", string.clone())
        .with_instance_variable("lives", Type::integer())
        .with_method(ProcedureEntry::method(LIVES).returning(Type::integer()))
        .with_method(ProcedureEntry::method(SPEAK).returning(string.clone()))
        .with_initializer(ProcedureEntry::initializer(NEW).with_argument("given", string));
    // A class whose only procedure is the body under measurement
    let counter = ClassEntry::new(glyphs::DEFAULT_NAMESPACE, COUNTER.into())
        .with_instance_variable("lives", Type::integer())
        .with_method(ProcedureEntry::method(LIVES).returning(Type::integer()));
    registry
        .register_class(cat)
        .expect("benchmark registry is valid");
    registry
        .register_class(counter)
        .expect("benchmark registry is valid");
    registry
}

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
            } else if word.chars().all(|ch| ch.is_ascii_lowercase() || ch.is_ascii_digit()) {
                Token::variable(word, span)
            } else {
                Token::identifier(word.chars().next().unwrap_or(' '), span)
            };
            tokens.push(token);
        }
    }
    tokens
}

/// A body declaring `statements` counters and summing them up.
fn straight_line(statements: usize) -> String {
    let mut source = String::from("🍮 total 0\n");
    for i in 0..statements {
        source.push_str(&format!("🍦 v{i} ✖ lives {i}\n🍮 total ➕ total v{i}\n"));
    }
    source.push_str("🍎 total\n🍉\n");
    source
}

/// A body nesting conditionals and loops `depth` levels deep.
fn nested(depth: usize) -> String {
    let mut source = String::from("🍮 total 0\n");
    for level in 0..depth {
        if level % 2 == 0 {
            source.push_str("🍊 ◀ total 100 🍇\n");
        } else {
            source.push_str("🔁 ◀ total 10 🍇\n");
        }
        source.push_str("🍮 total ➕ total 1\n");
    }
    for _ in 0..depth {
        source.push_str("🍉\n");
    }
    source.push_str("🍎 total\n🍉\n");
    source
}

fn build(
    registry: &TypeRegistry,
    class: char,
    bodies: &[(ProcedureKind, char, Vec<Token>)],
) -> usize {
    let mut unit = Unit::new(registry);
    for (kind, symbol, body) in bodies {
        unit.add_body(hash(class), *kind, (*symbol).into(), body.clone())
            .expect("body is declared");
    }
    let program = unit.build().expect("body compiles");
    program.procedures.iter().map(|p| p.record.code.len()).sum()
}

/// Benchmark building the test scripts as one unit
fn script_benchmarks(c: &mut Criterion) {
    let registry = registry();
    let bodies = vec![
        (
            ProcedureKind::Initializer,
            NEW,
            tokens(include_str!("../test_scripts/cat_new.glyph")),
        ),
        (
            ProcedureKind::Method,
            LIVES,
            tokens(include_str!("../test_scripts/cat_lives.glyph")),
        ),
        (
            ProcedureKind::Method,
            SPEAK,
            tokens(include_str!("../test_scripts/cat_speak.glyph")),
        ),
    ];

    let mut group = c.benchmark_group("analyzer/scripts");
    group.throughput(Throughput::Elements(
        bodies.iter().map(|(_, _, body)| body.len() as u64).sum(),
    ));
    group.bench_function("cat", |b| {
        b.iter(|| black_box(build(&registry, CAT, black_box(&bodies))));
    });
    group.finish();
}

/// Benchmark analysis cost against body length
fn size_benchmarks(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("analyzer/body_sizes");

    // One slot per statement pair; stay below the slot limit
    for statements in [10, 50, 120] {
        let body = vec![(ProcedureKind::Method, LIVES, tokens(&straight_line(statements)))];
        group.throughput(Throughput::Elements(body[0].2.len() as u64));
        group.bench_function(format!("{statements}_statements"), |b| {
            b.iter(|| black_box(build(&registry, COUNTER, black_box(&body))));
        });
    }
    group.finish();
}

/// Benchmark block scopes and placeholder patching
fn nesting_benchmarks(c: &mut Criterion) {
    let registry = registry();
    let mut group = c.benchmark_group("analyzer/nesting");

    for depth in [4, 16, 64] {
        let body = vec![(ProcedureKind::Method, LIVES, tokens(&nested(depth)))];
        group.throughput(Throughput::Elements(body[0].2.len() as u64));
        group.bench_function(format!("depth_{depth}"), |b| {
            b.iter(|| black_box(build(&registry, COUNTER, black_box(&body))));
        });
    }
    group.finish();
}

criterion_group!(benches, script_benchmarks, size_benchmarks, nesting_benchmarks);
criterion_main!(benches);
