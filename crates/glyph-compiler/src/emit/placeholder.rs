//! Reserved words that are filled in after their subtree is written.
//!
//! A handle is returned when a word is reserved and consumed when the word
//! is written, so every placeholder is filled at most once. The writer
//! keeps a stack of open reservations and asserts in debug builds that
//! they are closed in last-opened-first-filled order.

use tracing::trace;

use super::BytecodeWriter;
use crate::bytecode::OpCode;

/// A reserved word filled with a caller-supplied value.
#[must_use = "a reserved word must be filled"]
#[derive(Debug)]
pub struct Placeholder {
    offset: usize,
}

/// A reserved word filled with the number of words written after it.
#[must_use = "a reserved word must be filled"]
#[derive(Debug)]
pub struct CountPlaceholder {
    offset: usize,
}

impl Placeholder {
    pub(super) fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Offset of the reserved word.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fill the reserved word with `value`.
    pub fn write(self, writer: &mut BytecodeWriter, value: u32) {
        writer.close(self.offset);
        trace!(offset = self.offset, value, "fill placeholder");
        writer.chunk.patch(self.offset, value);
    }

    /// Fill the reserved word with an opcode.
    pub fn write_op(self, writer: &mut BytecodeWriter, op: OpCode) {
        writer.close(self.offset);
        trace!(offset = self.offset, op = op.name(), "fill opcode placeholder");
        writer.chunk.patch_op(self.offset, op);
    }
}

impl CountPlaceholder {
    pub(super) fn new(offset: usize) -> Self {
        Self { offset }
    }

    /// Offset of the reserved word.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Fill the reserved word with the number of words written since it was
    /// reserved, not counting the reserved word itself.
    pub fn write(self, writer: &mut BytecodeWriter) {
        writer.close(self.offset);
        let count = writer.chunk.current_offset() - self.offset - 1;
        trace!(offset = self.offset, count, "fill count placeholder");
        writer.chunk.patch(self.offset, count as u32);
    }
}
