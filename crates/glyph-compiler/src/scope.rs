//! Variable scope management for procedure analysis.
//!
//! This module provides `ScopeTracker` for tracking variables while a
//! procedure body is analyzed. It handles:
//! - Variable declaration with slot ids assigned by the analyzer
//! - Nested block scopes (if/while/for bodies)
//! - The instance scope holding the fields of the class being compiled
//! - Initialization counters across conditional blocks
//! - Copying visible variables into a closure

use glyph_core::{CompilationError, Result, Span, Type};
use rustc_hash::{FxHashMap, FxHashSet};

// ============================================================================
// Types
// ============================================================================

/// Information about a variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    /// Variable name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Slot id within the activation (local) or object (instance)
    pub id: u8,
    /// Initialization counter; the variable may be read while it is `> 0`
    pub initialized: i32,
    /// Whether the variable may not be assigned again
    pub frozen: bool,
    /// Whether the variable was assigned after its declaration
    pub mutated: bool,
    /// Source location of declaration
    pub span: Span,
}

impl Variable {
    /// An uninitialized, mutable variable.
    pub fn new(name: impl Into<String>, ty: Type, id: u8, span: Span) -> Self {
        Self {
            name: name.into(),
            ty,
            id,
            initialized: 0,
            frozen: false,
            mutated: false,
            span,
        }
    }

    /// Mark the variable initialized.
    #[must_use]
    pub fn initialized(mut self) -> Self {
        self.initialized = 1;
        self
    }

    /// Mark the variable frozen.
    #[must_use]
    pub fn frozen(mut self) -> Self {
        self.frozen = true;
        self
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized > 0
    }

    /// Fail unless the variable may be read.
    pub fn check_initialized(&self, span: Span) -> Result<()> {
        if self.is_initialized() {
            Ok(())
        } else {
            Err(CompilationError::UninitializedVariable {
                name: self.name.clone(),
                span,
            })
        }
    }

    /// Record an assignment, increment or decrement.
    pub fn mutate(&mut self, span: Span) -> Result<()> {
        if self.frozen {
            return Err(CompilationError::FrozenMutation {
                name: self.name.clone(),
                span,
            });
        }
        self.mutated = true;
        Ok(())
    }

    /// Record an assignment. A counter that was consumed by conditional
    /// blocks is restored to one.
    pub fn assign(&mut self) {
        if self.initialized <= 0 {
            self.initialized = 1;
        }
    }
}

/// Identifies a variable independently of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotRef {
    Local(u8),
    Instance(u8),
}

// ============================================================================
// Scope
// ============================================================================

/// One lexical block's variables.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    /// Variables in declaration order
    variables: Vec<Variable>,
    /// Name to position in `variables`
    index: FxHashMap<String, usize>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable, failing if the name is taken in this scope.
    pub fn declare(&mut self, variable: Variable) -> Result<()> {
        if self.index.contains_key(&variable.name) {
            return Err(CompilationError::Redeclaration {
                name: variable.name,
                span: variable.span,
            });
        }
        self.index
            .insert(variable.name.clone(), self.variables.len());
        self.variables.push(variable);
        Ok(())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Variable> {
        self.index.get(name).map(|&i| &self.variables[i])
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Variable> {
        self.index.get(name).map(|&i| &mut self.variables[i])
    }

    fn by_id_mut(&mut self, id: u8) -> Option<&mut Variable> {
        self.variables.iter_mut().find(|variable| variable.id == id)
    }

    /// Variables in declaration order.
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// Shift the counter of every initialized variable by `delta`.
    ///
    /// Uninitialized variables are left alone so that entering a block
    /// never makes them readable.
    pub fn change_initialized_by(&mut self, delta: i32) {
        for variable in &mut self.variables {
            if variable.initialized > 0 {
                variable.initialized += delta;
            }
        }
    }

    /// The first variable that may not be read yet.
    pub fn first_uninitialized(&self) -> Option<&Variable> {
        self.variables.iter().find(|variable| !variable.is_initialized())
    }

    /// Variables that were never assigned again and are not frozen.
    pub fn frozen_recommendations(&self) -> impl Iterator<Item = &Variable> {
        self.variables
            .iter()
            .filter(|variable| !variable.frozen && !variable.mutated)
    }

    fn initialized_at_depth(&self) -> impl Iterator<Item = u8> + '_ {
        self.variables
            .iter()
            .filter(|variable| variable.initialized == 1)
            .map(|variable| variable.id)
    }
}

// ============================================================================
// ScopeTracker
// ============================================================================

/// The scope chain of one procedure or closure.
///
/// The chain always holds at least the procedure scope. Local lookups
/// report zero scopes up; the instance scope, shared with enclosing
/// closures by reference, is one scope up.
#[derive(Debug)]
pub struct ScopeTracker<'s> {
    /// Local scopes, innermost last
    scopes: Vec<Scope>,
    /// Fields of the object, absent in static contexts
    instance: Option<&'s mut Scope>,
}

impl<'s> ScopeTracker<'s> {
    /// Create a tracker holding an empty procedure scope.
    pub fn new(instance: Option<&'s mut Scope>) -> Self {
        Self {
            scopes: vec![Scope::new()],
            instance,
        }
    }

    // ==========================================================================
    // Scope Management
    // ==========================================================================

    /// Enter a new block scope.
    pub fn push_scope(&mut self, scope: Scope) {
        self.scopes.push(scope);
    }

    /// Exit the innermost block scope. The procedure scope is never popped.
    pub fn pop_scope(&mut self) -> Option<Scope> {
        if self.scopes.len() > 1 {
            self.scopes.pop()
        } else {
            None
        }
    }

    /// Number of local scopes, including the procedure scope.
    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Consume the tracker, returning the procedure scope.
    pub fn into_procedure_scope(mut self) -> Scope {
        self.scopes.truncate(1);
        self.scopes.pop().unwrap_or_default()
    }

    pub fn current(&self) -> &Scope {
        // The procedure scope is never popped.
        &self.scopes[self.scopes.len() - 1]
    }

    pub fn instance(&self) -> Option<&Scope> {
        self.instance.as_deref()
    }

    /// Reborrow the instance scope, e.g. to share it with a closure.
    pub fn instance_mut(&mut self) -> Option<&mut Scope> {
        self.instance.as_deref_mut()
    }

    // ==========================================================================
    // Variables
    // ==========================================================================

    /// Declare a variable in the innermost scope.
    ///
    /// Shadowing a name from an outer scope is allowed.
    pub fn declare_local(&mut self, variable: Variable) -> Result<()> {
        let last = self.scopes.len() - 1;
        self.scopes[last].declare(variable)
    }

    /// Whether the innermost scope already declares `name`.
    pub fn declared_in_current(&self, name: &str) -> bool {
        self.current().contains(name)
    }

    /// Find a variable innermost-first, returning it with the number of
    /// scopes up it was found (0 for locals, 1 for instance variables).
    pub fn resolve(&mut self, name: &str) -> Option<(&mut Variable, u8)> {
        if let Some(i) = self.scopes.iter().rposition(|scope| scope.contains(name)) {
            return self.scopes[i].get_mut(name).map(|variable| (variable, 0));
        }
        self.instance
            .as_deref_mut()?
            .get_mut(name)
            .map(|variable| (variable, 1))
    }

    /// Every local variable visible from the innermost scope, with inner
    /// declarations hiding outer ones.
    pub fn visible_locals(&self) -> Vec<Variable> {
        let mut seen = FxHashSet::default();
        let mut visible = Vec::new();
        for scope in self.scopes.iter().rev() {
            for variable in scope.variables() {
                if seen.insert(variable.name.as_str()) {
                    visible.push(variable.clone());
                }
            }
        }
        visible
    }

    // ==========================================================================
    // Initialization
    // ==========================================================================

    /// Enter a conditionally executed block.
    pub fn enter_conditional_block(&mut self, include_instance: bool) {
        self.change_initialized_by(1, include_instance);
    }

    /// Leave a conditionally executed block.
    ///
    /// Returns the variables that were first initialized inside the block.
    /// After leaving, those read as uninitialized again.
    pub fn leave_conditional_block(&mut self, include_instance: bool) -> Vec<SlotRef> {
        let mut initialized = Vec::new();
        for scope in &self.scopes {
            initialized.extend(scope.initialized_at_depth().map(SlotRef::Local));
        }
        if include_instance && let Some(instance) = self.instance.as_deref() {
            initialized.extend(instance.initialized_at_depth().map(SlotRef::Instance));
        }
        self.change_initialized_by(-1, include_instance);
        initialized
    }

    fn change_initialized_by(&mut self, delta: i32, include_instance: bool) {
        for scope in &mut self.scopes {
            scope.change_initialized_by(delta);
        }
        if include_instance && let Some(instance) = self.instance.as_deref_mut() {
            instance.change_initialized_by(delta);
        }
    }

    /// Mark a variable initialized, e.g. after every branch of a chain
    /// assigned it.
    pub fn mark_initialized(&mut self, slot: SlotRef) {
        let variable = match slot {
            SlotRef::Local(id) => self
                .scopes
                .iter_mut()
                .rev()
                .find_map(|scope| scope.by_id_mut(id)),
            SlotRef::Instance(id) => self
                .instance
                .as_deref_mut()
                .and_then(|instance| instance.by_id_mut(id)),
        };
        if let Some(variable) = variable {
            variable.assign();
        }
    }

    /// Fail unless every instance variable is initialized.
    pub fn check_all_initialized(&self, span: Span) -> Result<()> {
        match self.instance().and_then(Scope::first_uninitialized) {
            Some(field) => Err(CompilationError::UninitializedField {
                name: field.name.clone(),
                span,
            }),
            None => Ok(()),
        }
    }
}
