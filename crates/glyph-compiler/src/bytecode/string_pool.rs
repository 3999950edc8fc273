//! String pool for a compilation session.
//!
//! The pool stores the contents of string literals. Bytecode refers to a
//! literal by its index, which is the position of the literal's first
//! occurrence anywhere in the session.

use rustc_hash::FxHashMap;

/// Session-level string pool with deduplication.
///
/// Shared across all procedures of a program to avoid duplicate strings.
#[derive(Debug, Clone, Default)]
pub struct StringPool {
    /// The interned strings in index order.
    strings: Vec<String>,
    /// Deduplication index: maps content to its index.
    index: FxHashMap<String, u32>,
}

impl StringPool {
    /// Create a new empty string pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a string pool with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            strings: Vec::with_capacity(capacity),
            index: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
        }
    }

    /// Add or get an existing string, returns its index.
    ///
    /// Identical contents always map to the same index.
    pub fn intern(&mut self, value: &str) -> u32 {
        if let Some(&idx) = self.index.get(value) {
            return idx;
        }

        let idx = self.strings.len() as u32;
        self.strings.push(value.to_owned());
        self.index.insert(value.to_owned(), idx);
        idx
    }

    /// Get a string by index.
    pub fn get(&self, index: u32) -> Option<&str> {
        self.strings.get(index as usize).map(String::as_str)
    }

    /// All strings in index order.
    pub fn strings(&self) -> &[String] {
        &self.strings
    }

    /// Get the number of strings in the pool.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }

    /// Remove every string. Only done when a new session starts.
    pub fn clear(&mut self) {
        self.strings.clear();
        self.index.clear();
    }

    /// Take the strings, leaving the pool empty.
    pub fn take(&mut self) -> Vec<String> {
        self.index.clear();
        std::mem::take(&mut self.strings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intern_deduplicates() {
        let mut pool = StringPool::new();

        let idx1 = pool.intern("hello");
        let idx2 = pool.intern("world");
        let idx3 = pool.intern("hello");

        assert_eq!(idx1, 0);
        assert_eq!(idx2, 1);
        assert_eq!(idx3, 0);
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn lookup_by_index() {
        let mut pool = StringPool::with_capacity(4);
        let idx = pool.intern("🍕");
        assert_eq!(pool.get(idx), Some("🍕"));
        assert_eq!(pool.get(7), None);
    }

    #[test]
    fn exact_content_is_the_key() {
        let mut pool = StringPool::new();
        assert_ne!(pool.intern("a"), pool.intern("a "));
    }

    #[test]
    fn clear_restarts_numbering() {
        let mut pool = StringPool::new();
        pool.intern("a");
        pool.intern("b");
        pool.clear();
        assert!(pool.is_empty());
        assert_eq!(pool.intern("b"), 0);
    }

    #[test]
    fn take_returns_index_order() {
        let mut pool = StringPool::new();
        pool.intern("x");
        pool.intern("y");
        pool.intern("x");
        assert_eq!(pool.take(), vec!["x".to_string(), "y".to_string()]);
        assert!(pool.is_empty());
    }
}
