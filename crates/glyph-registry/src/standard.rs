//! Declarations of the standard types.
//!
//! Only the members the analyzer relies on are declared here; all of them
//! are native.

use glyph_core::{
    ClassEntry, ProcedureEntry, ProcedureFlags, ProtocolEntry, Type, glyphs, standard,
};

const COUNT: char = '🐔';
const APPEND: char = '🐻';
const GET: char = '🐽';
const SET: char = '🐷';
const LENGTH: char = '📏';
const EMPTY_INITIALIZER: char = '🐸';
const EQUALS: char = '😛';

fn native_method(symbol: char) -> ProcedureEntry {
    ProcedureEntry::method(symbol).with_flags(ProcedureFlags::NATIVE)
}

fn native_initializer(symbol: char) -> ProcedureEntry {
    ProcedureEntry::initializer(symbol).with_flags(ProcedureFlags::NATIVE)
}

pub(crate) fn protocols() -> Vec<ProtocolEntry> {
    vec![ProtocolEntry::new(
        glyphs::DEFAULT_NAMESPACE,
        glyphs::ENUMERABLE_PROTOCOL,
    )]
}

pub(crate) fn classes() -> Vec<ClassEntry> {
    let string = Type::class(standard::STRING);
    let element = Type::generic_parameter(0);

    vec![
        ClassEntry::new(glyphs::DEFAULT_NAMESPACE, glyphs::STRING_TYPE)
            .with_method(native_method(LENGTH).returning(Type::integer()))
            .with_method(
                native_method(EQUALS)
                    .with_argument("other", string.clone())
                    .returning(Type::boolean()),
            ),
        ClassEntry::new(glyphs::DEFAULT_NAMESPACE, glyphs::LIST_TYPE)
            .with_generic_parameter(Type::something())
            .with_protocol(standard::ENUMERABLE)
            .with_initializer(native_initializer(EMPTY_INITIALIZER))
            .with_method(native_method(COUNT).returning(Type::integer()))
            .with_method(native_method(APPEND).with_argument("item", element.clone()))
            .with_method(
                native_method(GET)
                    .with_argument("index", Type::integer())
                    .returning(element.clone().optional()),
            ),
        ClassEntry::new(glyphs::DEFAULT_NAMESPACE, glyphs::DICTIONARY_TYPE)
            .with_generic_parameter(Type::something())
            .with_initializer(native_initializer(EMPTY_INITIALIZER))
            .with_method(native_method(COUNT).returning(Type::integer()))
            .with_method(
                native_method(GET)
                    .with_argument("key", string.clone())
                    .returning(element.clone().optional()),
            )
            .with_method(
                native_method(SET)
                    .with_argument("key", string)
                    .with_argument("value", element),
            ),
    ]
}
