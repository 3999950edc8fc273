//! Bytecode operation codes.
//!
//! This module defines the instruction set understood by the paired
//! interpreter. Every opcode and every operand occupies one 32-bit word;
//! 64-bit payloads are written as two words, high word first.

use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Bytecode operation codes.
///
/// The interpreter is a stack machine that evaluates operands in prefix
/// order: an opcode is followed by its immediate words and then by the
/// bytecode of its operand expressions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum OpCode {
    // =========================================================================
    // Calls and construction
    // =========================================================================
    /// Dynamic dispatch on a class instance.
    /// Operands: receiver, vti, arguments
    MethodCall = 0x01,
    /// Operands: class index (or `u32::MAX` for the dynamic class), vti, arguments
    ClassMethodCall = 0x02,
    /// Operands: receiver, protocol index, vti, arguments
    ProtocolMethodCall = 0x03,
    /// Operands: class index (or `u32::MAX` for the dynamic class), vti, arguments
    Instantiate = 0x04,
    /// Operands: superclass index, vti, arguments
    SuperMethodCall = 0x05,

    // =========================================================================
    // Literals
    // =========================================================================
    /// Operand: string pool index
    StringLiteral = 0x10,
    True = 0x11,
    False = 0x12,
    /// Operand: one word, two's complement
    Integer = 0x13,
    /// Operands: high word, low word
    WideInteger = 0x14,
    /// Operands: high and low word of the IEEE-754 bit pattern
    Double = 0x15,
    /// Operand: symbol code
    SymbolLiteral = 0x16,
    Nothingness = 0x17,

    // =========================================================================
    // Variables
    // =========================================================================
    /// Operand: slot id
    IncrementLocal = 0x18,
    DecrementLocal = 0x19,
    LoadLocal = 0x1A,
    StoreLocal = 0x1B,
    LoadInstance = 0x1C,
    StoreInstance = 0x1D,
    IncrementInstance = 0x1E,
    DecrementInstance = 0x1F,

    // =========================================================================
    // Primitive operators
    // =========================================================================
    /// Generic equality on two values of the same type.
    Equal = 0x20,
    SubtractInteger = 0x21,
    AddInteger = 0x22,
    MultiplyInteger = 0x23,
    DivideInteger = 0x24,
    RemainderInteger = 0x25,
    Not = 0x26,
    Or = 0x27,
    And = 0x28,
    LessInteger = 0x29,
    GreaterInteger = 0x2A,
    LessOrEqualInteger = 0x2B,
    GreaterOrEqualInteger = 0x2C,
    IdentityCompare = 0x2D,
    IsNothingness = 0x2E,
    EqualDouble = 0x2F,
    SubtractDouble = 0x30,
    AddDouble = 0x31,
    MultiplyDouble = 0x32,
    DivideDouble = 0x33,
    LessDouble = 0x34,
    GreaterDouble = 0x35,
    LessOrEqualDouble = 0x36,
    GreaterOrEqualDouble = 0x37,

    // =========================================================================
    // Optionals and object lifecycle
    // =========================================================================
    Unwrap = 0x3A,
    /// Operands: word count of receiver and vti, receiver, vti, arguments
    OptionalChainCall = 0x3B,
    SelfReference = 0x3C,
    /// Operands: superclass index, vti, arguments
    Superinitializer = 0x3D,
    /// Operands: slot id, value
    ConditionalBind = 0x3E,

    // =========================================================================
    // Casts
    // =========================================================================
    /// Operands: value, class index
    CastToClass = 0x40,
    /// Operands: value, protocol index
    CastToProtocol = 0x41,
    CastToBoolean = 0x42,
    CastToInteger = 0x43,
    /// Like `CastToClass`, but the value may be nothingness.
    SafeCastToClass = 0x44,
    SafeCastToProtocol = 0x45,
    CastToSymbol = 0x46,
    CastToDouble = 0x47,

    // =========================================================================
    // Collections
    // =========================================================================
    /// Operands: word count, key/value pairs
    DictionaryLiteral = 0x50,
    /// Operands: word count, elements
    ListLiteral = 0x51,
    /// Operands: string count, strings
    Concatenate = 0x52,

    // =========================================================================
    // Control flow
    // =========================================================================
    /// Operand: return value
    Return = 0x60,
    /// Operands: condition, word count, body
    RepeatWhile = 0x61,
    /// Operands: word count of the whole chain, branches
    If = 0x62,
    /// Operands: variable slot, internal slot, iteratee, word count, body
    ForInEnumerable = 0x64,
    ForInList = 0x65,
    /// Marks the start of an else-if branch inside an `If` chain.
    ElseIf = 0x68,
    /// Marks the start of the else branch inside an `If` chain.
    Else = 0x69,

    // =========================================================================
    // Closures
    // =========================================================================
    /// Operands: variable count, word count, body, argument count and
    /// self flag, captured slot count
    Closure = 0x70,
    /// Operands: receiver, vti
    CaptureMethod = 0x71,
    /// Operands: callable, arguments
    InvokeCallable = 0x72,
}

impl OpCode {
    /// Decode a word, returning `None` for values that are no opcode.
    pub fn from_u32(value: u32) -> Option<Self> {
        Self::try_from(value).ok()
    }

    /// The word written for this opcode.
    pub fn word(self) -> u32 {
        self.into()
    }

    /// Get the name of this opcode for debugging.
    pub fn name(&self) -> &'static str {
        match self {
            OpCode::MethodCall => "METHOD_CALL",
            OpCode::ClassMethodCall => "CLASS_METHOD_CALL",
            OpCode::ProtocolMethodCall => "PROTOCOL_METHOD_CALL",
            OpCode::Instantiate => "INSTANTIATE",
            OpCode::SuperMethodCall => "SUPER_METHOD_CALL",
            OpCode::StringLiteral => "STRING_LITERAL",
            OpCode::True => "TRUE",
            OpCode::False => "FALSE",
            OpCode::Integer => "INTEGER",
            OpCode::WideInteger => "WIDE_INTEGER",
            OpCode::Double => "DOUBLE",
            OpCode::SymbolLiteral => "SYMBOL_LITERAL",
            OpCode::Nothingness => "NOTHINGNESS",
            OpCode::IncrementLocal => "INCREMENT_LOCAL",
            OpCode::DecrementLocal => "DECREMENT_LOCAL",
            OpCode::LoadLocal => "LOAD_LOCAL",
            OpCode::StoreLocal => "STORE_LOCAL",
            OpCode::LoadInstance => "LOAD_INSTANCE",
            OpCode::StoreInstance => "STORE_INSTANCE",
            OpCode::IncrementInstance => "INCREMENT_INSTANCE",
            OpCode::DecrementInstance => "DECREMENT_INSTANCE",
            OpCode::Equal => "EQUAL",
            OpCode::SubtractInteger => "SUBTRACT_INTEGER",
            OpCode::AddInteger => "ADD_INTEGER",
            OpCode::MultiplyInteger => "MULTIPLY_INTEGER",
            OpCode::DivideInteger => "DIVIDE_INTEGER",
            OpCode::RemainderInteger => "REMAINDER_INTEGER",
            OpCode::Not => "NOT",
            OpCode::Or => "OR",
            OpCode::And => "AND",
            OpCode::LessInteger => "LESS_INTEGER",
            OpCode::GreaterInteger => "GREATER_INTEGER",
            OpCode::LessOrEqualInteger => "LESS_OR_EQUAL_INTEGER",
            OpCode::GreaterOrEqualInteger => "GREATER_OR_EQUAL_INTEGER",
            OpCode::IdentityCompare => "IDENTITY_COMPARE",
            OpCode::IsNothingness => "IS_NOTHINGNESS",
            OpCode::EqualDouble => "EQUAL_DOUBLE",
            OpCode::SubtractDouble => "SUBTRACT_DOUBLE",
            OpCode::AddDouble => "ADD_DOUBLE",
            OpCode::MultiplyDouble => "MULTIPLY_DOUBLE",
            OpCode::DivideDouble => "DIVIDE_DOUBLE",
            OpCode::LessDouble => "LESS_DOUBLE",
            OpCode::GreaterDouble => "GREATER_DOUBLE",
            OpCode::LessOrEqualDouble => "LESS_OR_EQUAL_DOUBLE",
            OpCode::GreaterOrEqualDouble => "GREATER_OR_EQUAL_DOUBLE",
            OpCode::Unwrap => "UNWRAP",
            OpCode::OptionalChainCall => "OPTIONAL_CHAIN_CALL",
            OpCode::SelfReference => "SELF_REFERENCE",
            OpCode::Superinitializer => "SUPERINITIALIZER",
            OpCode::ConditionalBind => "CONDITIONAL_BIND",
            OpCode::CastToClass => "CAST_TO_CLASS",
            OpCode::CastToProtocol => "CAST_TO_PROTOCOL",
            OpCode::CastToBoolean => "CAST_TO_BOOLEAN",
            OpCode::CastToInteger => "CAST_TO_INTEGER",
            OpCode::SafeCastToClass => "SAFE_CAST_TO_CLASS",
            OpCode::SafeCastToProtocol => "SAFE_CAST_TO_PROTOCOL",
            OpCode::CastToSymbol => "CAST_TO_SYMBOL",
            OpCode::CastToDouble => "CAST_TO_DOUBLE",
            OpCode::DictionaryLiteral => "DICTIONARY_LITERAL",
            OpCode::ListLiteral => "LIST_LITERAL",
            OpCode::Concatenate => "CONCATENATE",
            OpCode::Return => "RETURN",
            OpCode::RepeatWhile => "REPEAT_WHILE",
            OpCode::If => "IF",
            OpCode::ForInEnumerable => "FOR_IN_ENUMERABLE",
            OpCode::ForInList => "FOR_IN_LIST",
            OpCode::ElseIf => "ELSE_IF",
            OpCode::Else => "ELSE",
            OpCode::Closure => "CLOSURE",
            OpCode::CaptureMethod => "CAPTURE_METHOD",
            OpCode::InvokeCallable => "INVOKE_CALLABLE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opcode_repr() {
        assert_eq!(OpCode::MethodCall.word(), 0x01);
        assert_eq!(OpCode::Return.word(), 0x60);
        assert_eq!(OpCode::InvokeCallable as u32, 0x72);
    }

    #[test]
    fn opcode_from_u32() {
        assert_eq!(OpCode::from_u32(0x13), Some(OpCode::Integer));
        assert_eq!(OpCode::from_u32(0x68), Some(OpCode::ElseIf));
        assert_eq!(OpCode::from_u32(0x00), None);
        assert_eq!(OpCode::from_u32(0x63), None);
    }

    #[test]
    fn opcode_name() {
        assert_eq!(OpCode::AddInteger.name(), "ADD_INTEGER");
        assert_eq!(OpCode::SafeCastToClass.name(), "SAFE_CAST_TO_CLASS");
    }

    #[test]
    fn double_operators_follow_integer_ones() {
        assert_eq!(OpCode::SubtractDouble as u32, OpCode::EqualDouble as u32 + 1);
        assert_eq!(
            OpCode::GreaterOrEqualDouble as u32,
            OpCode::LessDouble as u32 + 3
        );
    }
}
