//! Compilation unit API.
//!
//! A [`Unit`] collects the bodies of the procedures declared in a
//! [`TypeRegistry`] and compiles them into a [`CompiledProgram`]. Every
//! class that receives a body is compiled whole: each of its non-native
//! procedures needs a body, and native procedures get a header-only record.
//!
//! # Example
//!
//! ```ignore
//! use glyphc::{ProcedureKind, Unit};
//!
//! let mut unit = Unit::new(&registry);
//!
//! // Bodies are pre-lexed and run up to and including their closing 🍉
//! unit.add_body(cat, ProcedureKind::Initializer, new, initializer_tokens)?;
//! unit.add_body(cat, ProcedureKind::Method, speak, method_tokens)?;
//!
//! // Compile every procedure of every class that has bodies
//! unit.build()?;
//! let program = unit.program().unwrap();
//! ```

use glyph_compiler::{AnalyzerOptions, CompilationSession, ProcedureCompiler, ProcedureRecord};
use glyph_core::{
    ClassEntry, CompilationError, CompilationWarning, ProcedureEntry, ProcedureKind, Symbol,
    Token, TypeHash,
};
use glyph_registry::TypeRegistry;
use rustc_hash::{FxHashMap, FxHashSet};
use thiserror::Error;
use tracing::{debug, info};

/// Errors raised while adding or building procedure bodies.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnitError {
    /// No class is registered under the hash.
    #[error("class not found: {0}")]
    UnknownClass(TypeHash),

    /// The class does not declare the procedure.
    #[error("{class} has no {kind} {symbol}")]
    UnknownProcedure {
        class: Symbol,
        kind: &'static str,
        symbol: Symbol,
    },

    /// A body was already added for the procedure.
    #[error("{kind} {symbol} of {class} already has a body")]
    DuplicateBody {
        class: Symbol,
        kind: &'static str,
        symbol: Symbol,
    },

    /// A non-native procedure of a compiled class has no body.
    #[error("{kind} {symbol} of {class} has no body")]
    MissingBody {
        class: Symbol,
        kind: &'static str,
        symbol: Symbol,
    },

    /// Native procedures are implemented by the host.
    #[error("{kind} {symbol} of {class} is native and cannot have a body")]
    NativeBody {
        class: Symbol,
        kind: &'static str,
        symbol: Symbol,
    },

    /// Analysis of a body failed.
    #[error("in {kind} {symbol} of {class}: {source}")]
    Compilation {
        class: Symbol,
        kind: &'static str,
        symbol: Symbol,
        #[source]
        source: CompilationError,
    },
}

/// A compiled procedure and the class declaring it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledProcedure {
    pub class: TypeHash,
    pub record: ProcedureRecord,
}

/// The output of a successful build.
#[derive(Debug, Clone, Default)]
pub struct CompiledProgram {
    /// Procedures in class table order. Within a class: methods, class
    /// methods, then initializers, each in declaration order.
    pub procedures: Vec<CompiledProcedure>,
    /// String literals of every procedure, in pool index order.
    pub strings: Vec<String>,
    /// Warnings in emission order.
    pub warnings: Vec<CompilationWarning>,
}

impl CompiledProgram {
    /// The compiled procedures of one class.
    pub fn procedures_of(&self, class: TypeHash) -> impl Iterator<Item = &ProcedureRecord> {
        self.procedures
            .iter()
            .filter(move |procedure| procedure.class == class)
            .map(|procedure| &procedure.record)
    }

    /// Find a compiled procedure.
    pub fn procedure(
        &self,
        class: TypeHash,
        kind: ProcedureKind,
        symbol: Symbol,
    ) -> Option<&ProcedureRecord> {
        self.procedures_of(class)
            .find(|record| record.header.kind == kind && record.header.symbol == symbol)
    }
}

/// Identifies a procedure of a class.
type BodyKey = (TypeHash, ProcedureKind, Symbol);

/// A set of procedure bodies compiled together.
///
/// All bodies of a unit share one string pool and one warning list.
pub struct Unit<'r> {
    /// Declarations of every type
    registry: &'r TypeRegistry,

    /// Bodies waiting to be compiled
    bodies: FxHashMap<BodyKey, Vec<Token>>,

    /// Classes with at least one body
    classes: FxHashSet<TypeHash>,

    options: AnalyzerOptions,

    /// Output of the last successful build
    compiled: Option<CompiledProgram>,
}

impl<'r> Unit<'r> {
    /// Create an empty unit over a filled registry.
    pub fn new(registry: &'r TypeRegistry) -> Self {
        Self {
            registry,
            bodies: FxHashMap::default(),
            classes: FxHashSet::default(),
            options: AnalyzerOptions::default(),
            compiled: None,
        }
    }

    /// Use `options` for every body of the unit.
    #[must_use]
    pub fn with_options(mut self, options: AnalyzerOptions) -> Self {
        self.options = options;
        self
    }

    /// Add the body of a procedure declared by `class`.
    ///
    /// The tokens run up to and including the closing `🍉`. Adding a body
    /// invalidates the previous build.
    pub fn add_body(
        &mut self,
        class: TypeHash,
        kind: ProcedureKind,
        symbol: Symbol,
        tokens: Vec<Token>,
    ) -> Result<(), UnitError> {
        let entry = self.class(class)?;
        let procedure = procedure_entry(entry, kind, symbol).ok_or(UnitError::UnknownProcedure {
            class: entry.name,
            kind: kind.describe(),
            symbol,
        })?;
        if procedure.is_native() {
            return Err(UnitError::NativeBody {
                class: entry.name,
                kind: kind.describe(),
                symbol,
            });
        }
        if self.bodies.contains_key(&(class, kind, symbol)) {
            return Err(UnitError::DuplicateBody {
                class: entry.name,
                kind: kind.describe(),
                symbol,
            });
        }

        debug!(class = %entry.name, kind = kind.describe(), %symbol, tokens = tokens.len(), "added body");
        self.bodies.insert((class, kind, symbol), tokens);
        self.classes.insert(class);
        self.compiled = None;
        Ok(())
    }

    /// Compile every procedure of each class that received a body.
    ///
    /// Classes are visited in class table order. Stops at the first
    /// procedure that is missing a body or fails to compile.
    #[cfg_attr(feature = "profiling", profiling::function)]
    pub fn build(&mut self) -> Result<&CompiledProgram, UnitError> {
        self.compiled = None;
        let registry = self.registry;
        let mut session = CompilationSession::new();
        session.begin();

        let mut procedures = Vec::new();
        {
            let mut compiler = ProcedureCompiler::new(registry, &mut session, self.options);
            for class in registry
                .classes()
                .filter(|class| self.classes.contains(&class.type_hash))
            {
                debug!(class = %class.name, "compiling class");
                let members = class
                    .methods
                    .iter()
                    .chain(&class.class_methods)
                    .chain(&class.initializers);
                for procedure in members {
                    let record = self.compile_procedure(&mut compiler, class, procedure)?;
                    procedures.push(CompiledProcedure {
                        class: class.type_hash,
                        record,
                    });
                }
            }
        }

        let (strings, warnings) = session.finish();
        info!(
            procedures = procedures.len(),
            strings = strings.len(),
            warnings = warnings.len(),
            "built unit"
        );
        Ok(self.compiled.insert(CompiledProgram {
            procedures,
            strings,
            warnings,
        }))
    }

    fn compile_procedure(
        &self,
        compiler: &mut ProcedureCompiler<'_>,
        class: &ClassEntry,
        procedure: &ProcedureEntry,
    ) -> Result<ProcedureRecord, UnitError> {
        let kind = procedure.kind.describe();
        let symbol = procedure.symbol;
        let body = match self.bodies.get(&(class.type_hash, procedure.kind, symbol)) {
            Some(body) => body.as_slice(),
            None if procedure.is_native() => &[],
            None => {
                return Err(UnitError::MissingBody {
                    class: class.name,
                    kind,
                    symbol,
                });
            }
        };
        compiler
            .compile(class, procedure, body)
            .map_err(|source| UnitError::Compilation {
                class: class.name,
                kind,
                symbol,
                source,
            })
    }

    /// Whether the unit was built since the last body was added.
    pub fn is_built(&self) -> bool {
        self.compiled.is_some()
    }

    /// The output of the last build.
    pub fn program(&self) -> Option<&CompiledProgram> {
        self.compiled.as_ref()
    }

    /// Number of bodies added.
    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    fn class(&self, hash: TypeHash) -> Result<&'r ClassEntry, UnitError> {
        self.registry
            .class(hash)
            .ok_or(UnitError::UnknownClass(hash))
    }
}

fn procedure_entry(
    class: &ClassEntry,
    kind: ProcedureKind,
    symbol: Symbol,
) -> Option<&ProcedureEntry> {
    match kind {
        ProcedureKind::Method => class.own_method(symbol),
        ProcedureKind::ClassMethod => class.own_class_method(symbol),
        ProcedureKind::Initializer => class.own_initializer(symbol),
    }
}
