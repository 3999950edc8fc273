//! State shared by every procedure of one compilation run.
//!
//! A [`CompilationSession`] owns the string pool and the warning list. Both
//! live exactly as long as one run: [`CompilationSession::begin`] clears
//! them, so sessions never leak literals or diagnostics into each other.

use glyph_core::CompilationWarning;
use tracing::warn;

use crate::bytecode::StringPool;

/// Strings and diagnostics of one compilation run.
#[derive(Debug, Default)]
pub struct CompilationSession {
    strings: StringPool,
    warnings: Vec<CompilationWarning>,
}

impl CompilationSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new run, discarding strings and warnings of the previous one.
    pub fn begin(&mut self) {
        self.strings.clear();
        self.warnings.clear();
    }

    /// Intern a string literal, returning its pool index.
    pub fn intern(&mut self, value: &str) -> u32 {
        self.strings.intern(value)
    }

    pub fn strings(&self) -> &StringPool {
        &self.strings
    }

    /// Record a warning and log it.
    pub fn warn(&mut self, warning: CompilationWarning) {
        warn!("{warning}");
        self.warnings.push(warning);
    }

    /// Warnings in emission order.
    pub fn warnings(&self) -> &[CompilationWarning] {
        &self.warnings
    }

    /// Finish the run, returning the interned strings in index order and
    /// the warnings.
    pub fn finish(&mut self) -> (Vec<String>, Vec<CompilationWarning>) {
        (self.strings.take(), std::mem::take(&mut self.warnings))
    }
}

#[cfg(test)]
mod tests {
    use glyph_core::Span;

    use super::*;

    #[test]
    fn literals_are_shared_across_procedures() {
        let mut session = CompilationSession::new();
        let first = session.intern("hi");
        let second = session.intern("hi");
        assert_eq!(first, second);
        assert_eq!(session.strings().len(), 1);
    }

    #[test]
    fn begin_resets_state() {
        let mut session = CompilationSession::new();
        session.intern("a");
        session.warn(CompilationWarning::DeadCode { span: Span::default() });

        session.begin();
        assert!(session.strings().is_empty());
        assert!(session.warnings().is_empty());
    }

    #[test]
    fn finish_drains() {
        let mut session = CompilationSession::new();
        session.intern("a");
        session.warn(CompilationWarning::NoEffect { span: Span::default() });

        let (strings, warnings) = session.finish();
        assert_eq!(strings, vec!["a".to_string()]);
        assert_eq!(warnings.len(), 1);
        assert!(session.warnings().is_empty());
    }
}
