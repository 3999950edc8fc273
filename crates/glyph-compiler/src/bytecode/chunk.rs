//! Bytecode chunk for compiled procedures.
//!
//! A `BytecodeChunk` contains the words of a single procedure body, along
//! with line number information for debugging and a side table recording
//! which words are opcodes.

use std::collections::BTreeMap;

use super::OpCode;

/// A chunk of compiled bytecode for a single procedure.
///
/// String literals are stored per compilation session in a `StringPool`,
/// not per procedure, so identical literals share one index across the
/// whole program.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BytecodeChunk {
    /// The bytecode words.
    code: Vec<u32>,
    /// Line numbers for debugging (parallel to code).
    lines: Vec<u32>,
    /// Offsets holding opcodes. Operand words never appear here, so the
    /// opcode sequence can be recovered without decoding operands.
    ops: BTreeMap<usize, OpCode>,
}

impl BytecodeChunk {
    /// Create a new empty bytecode chunk.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a bytecode chunk with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            code: Vec::with_capacity(capacity),
            lines: Vec::with_capacity(capacity),
            ops: BTreeMap::new(),
        }
    }

    /// Write an opcode.
    pub fn write_op(&mut self, op: OpCode, line: u32) {
        self.ops.insert(self.code.len(), op);
        self.write_word(op.word(), line);
    }

    /// Write an operand word.
    pub fn write_word(&mut self, word: u32, line: u32) {
        self.code.push(word);
        self.lines.push(line);
    }

    /// Write a 64-bit operand as two words, high word first.
    pub fn write_wide(&mut self, value: u64, line: u32) {
        self.write_word((value >> 32) as u32, line);
        self.write_word(value as u32, line);
    }

    /// Overwrite the word at `offset`.
    ///
    /// # Panics
    ///
    /// Panics if `offset` is past the end of the chunk.
    pub fn patch(&mut self, offset: usize, word: u32) {
        self.code[offset] = word;
    }

    /// Overwrite the word at `offset` with an opcode.
    pub fn patch_op(&mut self, offset: usize, op: OpCode) {
        self.patch(offset, op.word());
        self.ops.insert(offset, op);
    }

    /// Get current code offset (for placeholders).
    pub fn current_offset(&self) -> usize {
        self.code.len()
    }

    /// Get the bytecode.
    pub fn code(&self) -> &[u32] {
        &self.code
    }

    /// Get the line numbers.
    pub fn lines(&self) -> &[u32] {
        &self.lines
    }

    /// Get the line number for a given offset.
    pub fn line_at(&self, offset: usize) -> Option<u32> {
        self.lines.get(offset).copied()
    }

    /// Read a word at the given offset.
    pub fn word_at(&self, offset: usize) -> Option<u32> {
        self.code.get(offset).copied()
    }

    /// Read a two-word value at the given offset.
    pub fn wide_at(&self, offset: usize) -> Option<u64> {
        let high = u64::from(self.word_at(offset)?);
        let low = u64::from(self.word_at(offset + 1)?);
        Some((high << 32) | low)
    }

    /// The opcode written at `offset`, if that word is an opcode.
    pub fn op_at(&self, offset: usize) -> Option<OpCode> {
        self.ops.get(&offset).copied()
    }

    /// Offset of the first occurrence of `op`.
    pub fn find_op(&self, op: OpCode) -> Option<usize> {
        self.ops
            .iter()
            .find(|(_, recorded)| **recorded == op)
            .map(|(offset, _)| *offset)
    }

    /// Get the length of the bytecode in words.
    pub fn len(&self) -> usize {
        self.code.len()
    }

    /// Check if the chunk is empty.
    pub fn is_empty(&self) -> bool {
        self.code.is_empty()
    }

    /// Extract all opcodes from the chunk, skipping operands.
    ///
    /// This is useful for testing bytecode sequences without worrying about
    /// specific operand values or instruction offsets.
    pub fn opcodes(&self) -> Vec<OpCode> {
        self.ops.values().copied().collect()
    }

    /// Check if this chunk contains exactly the given opcode sequence.
    ///
    /// This ignores operand values, only checking the opcodes themselves.
    /// Panics with a descriptive message if the sequences don't match.
    #[track_caller]
    pub fn assert_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        assert_eq!(
            actual,
            expected,
            "Bytecode mismatch.\nExpected: {:?}\nActual:   {:?}",
            expected.iter().map(|op| op.name()).collect::<Vec<_>>(),
            actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
        );
    }

    /// Check if this chunk contains the given opcodes (in order, but not necessarily contiguous).
    ///
    /// Useful for verifying key opcodes are present without checking every instruction.
    #[track_caller]
    pub fn assert_contains_opcodes(&self, expected: &[OpCode]) {
        let actual = self.opcodes();
        let mut expected_iter = expected.iter().peekable();

        for op in &actual {
            if expected_iter.peek() == Some(&op) {
                expected_iter.next();
            }
        }

        if expected_iter.peek().is_some() {
            let remaining: Vec<_> = expected_iter.map(|op| op.name()).collect();
            panic!(
                "Missing opcodes in sequence.\nExpected to find: {:?}\nActual bytecode:  {:?}",
                remaining,
                actual.iter().map(|op| op.name()).collect::<Vec<_>>(),
            );
        }
    }
}
