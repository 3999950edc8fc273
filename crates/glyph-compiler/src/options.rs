//! Analyzer configuration.

/// Switches for one analysis run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnalyzerOptions {
    /// Keep analyzing statements after an unconditional return.
    ///
    /// Closures always do, so that their variable and word counts match the
    /// body the interpreter receives.
    pub compile_dead_code: bool,
    /// Warn about variables that are never assigned again.
    pub recommend_frozen: bool,
    /// Number of slot ids available to one procedure.
    pub max_variables: usize,
}

impl Default for AnalyzerOptions {
    fn default() -> Self {
        Self {
            compile_dead_code: true,
            recommend_frozen: true,
            max_variables: usize::from(u8::MAX) + 1,
        }
    }
}

impl AnalyzerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_compile_dead_code(mut self, compile_dead_code: bool) -> Self {
        self.compile_dead_code = compile_dead_code;
        self
    }

    #[must_use]
    pub fn with_recommend_frozen(mut self, recommend_frozen: bool) -> Self {
        self.recommend_frozen = recommend_frozen;
        self
    }

    /// Limit the slot ids of one procedure. Values above 256 are clamped
    /// because slot ids are a single byte.
    #[must_use]
    pub fn with_max_variables(mut self, max_variables: usize) -> Self {
        self.max_variables = max_variables.min(usize::from(u8::MAX) + 1);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = AnalyzerOptions::default();
        assert!(options.compile_dead_code);
        assert!(options.recommend_frozen);
        assert_eq!(options.max_variables, 256);
    }

    #[test]
    fn max_variables_is_clamped() {
        let options = AnalyzerOptions::new().with_max_variables(10_000);
        assert_eq!(options.max_variables, 256);
        assert_eq!(AnalyzerOptions::new().with_max_variables(3).max_variables, 3);
    }
}
