//! Bytecode writer for the glyph compiler.
//!
//! The [`BytecodeWriter`] appends words to the chunk of the procedure being
//! compiled and hands out placeholders for words whose value is only known
//! once the following bytecode has been written.
//!
//! # Example
//!
//! ```
//! use glyph_compiler::bytecode::OpCode;
//! use glyph_compiler::emit::BytecodeWriter;
//!
//! let mut writer = BytecodeWriter::new();
//! writer.write_op(OpCode::ListLiteral);
//! let count = writer.reserve_count_placeholder();
//! writer.write_op(OpCode::Integer);
//! writer.write_word(7);
//! count.write(&mut writer);
//!
//! let chunk = writer.finish();
//! assert_eq!(chunk.code(), &[0x51, 2, 0x13, 7]);
//! ```

mod placeholder;

use tracing::trace;

use crate::bytecode::{BytecodeChunk, OpCode};
pub use placeholder::{CountPlaceholder, Placeholder};

/// Emits bytecode words for one procedure at a time.
#[derive(Debug)]
pub struct BytecodeWriter {
    /// The bytecode chunk being built (per procedure)
    chunk: BytecodeChunk,

    /// Offsets of reserved words not yet filled, innermost last
    open: Vec<usize>,

    /// Current source line for debug info
    current_line: u32,
}

impl Default for BytecodeWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl BytecodeWriter {
    /// Create a new bytecode writer.
    pub fn new() -> Self {
        Self {
            chunk: BytecodeChunk::new(),
            open: Vec::new(),
            current_line: 1,
        }
    }

    /// Set current source line for debug info.
    ///
    /// All subsequent words will be associated with this line number.
    pub fn set_line(&mut self, line: u32) {
        self.current_line = line;
    }

    /// Get current source line.
    pub fn current_line(&self) -> u32 {
        self.current_line
    }

    // ==========================================================================
    // Basic Emission
    // ==========================================================================

    /// Append an opcode.
    pub fn write_op(&mut self, op: OpCode) {
        self.chunk.write_op(op, self.current_line);
    }

    /// Append an operand word.
    pub fn write_word(&mut self, word: u32) {
        self.chunk.write_word(word, self.current_line);
    }

    /// Append a 64-bit operand as two words.
    pub fn write_wide(&mut self, value: u64) {
        self.chunk.write_wide(value, self.current_line);
    }

    /// Append a double as the two words of its bit pattern.
    pub fn write_double(&mut self, value: f64) {
        self.write_wide(value.to_bits());
    }

    // ==========================================================================
    // Placeholders
    // ==========================================================================

    /// Reserve a word to be filled with a value or opcode later.
    pub fn reserve_placeholder(&mut self) -> Placeholder {
        Placeholder::new(self.reserve())
    }

    /// Reserve a word to be filled with the number of words written after
    /// it.
    pub fn reserve_count_placeholder(&mut self) -> CountPlaceholder {
        CountPlaceholder::new(self.reserve())
    }

    fn reserve(&mut self) -> usize {
        let offset = self.chunk.current_offset();
        trace!(offset, depth = self.open.len(), "reserve placeholder");
        self.open.push(offset);
        self.chunk.write_word(0, self.current_line);
        offset
    }

    fn close(&mut self, offset: usize) {
        let innermost = self.open.pop();
        debug_assert_eq!(
            innermost,
            Some(offset),
            "placeholder at {offset} filled while {innermost:?} is still open"
        );
    }

    /// Number of reserved words not yet filled.
    pub fn open_placeholders(&self) -> usize {
        self.open.len()
    }

    // ==========================================================================
    // Framing
    // ==========================================================================

    /// Number of words written for the current procedure.
    pub fn word_count(&self) -> usize {
        self.chunk.len()
    }

    /// Start a new procedure, returning the chunk of the previous one.
    ///
    /// Open placeholders are discarded; they belong to a procedure whose
    /// analysis was abandoned.
    pub fn reset_for_procedure(&mut self) -> BytecodeChunk {
        self.open.clear();
        self.current_line = 1;
        std::mem::take(&mut self.chunk)
    }

    /// Finish emission and return the chunk.
    pub fn finish(self) -> BytecodeChunk {
        debug_assert!(
            self.open.is_empty(),
            "{} placeholders were never filled",
            self.open.len()
        );
        self.chunk
    }

    /// Get the bytecode written so far.
    pub fn chunk(&self) -> &BytecodeChunk {
        &self.chunk
    }
}
