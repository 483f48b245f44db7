//! Tag bytes of the Kernel binary format.
//!
//! Tags at or above [`SPECIALIZED_TAG_HIGH_BIT`] carry a 3-bit payload in
//! their low bits: the base tag is `tag & SPECIALIZED_TAG_MASK` and the
//! payload is `tag & SPECIALIZED_PAYLOAD_MASK`.

pub const MAGIC: u32 = 0x90AB_CDEF;

pub const NOTHING: u8 = 0;
pub const SOMETHING: u8 = 1;

// Declarations
pub const CLASS: u8 = 2;
pub const FUNCTION_NODE: u8 = 3;
pub const FIELD: u8 = 4;
pub const CONSTRUCTOR: u8 = 5;
pub const PROCEDURE: u8 = 6;

// Initializers
pub const FIELD_INITIALIZER: u8 = 8;
pub const SUPER_INITIALIZER: u8 = 9;
pub const REDIRECTING_INITIALIZER: u8 = 10;

// Expressions
pub const INVALID_EXPRESSION: u8 = 19;
pub const VARIABLE_GET: u8 = 20;
pub const VARIABLE_SET: u8 = 21;
pub const PROPERTY_GET: u8 = 22;
pub const PROPERTY_SET: u8 = 23;
pub const STATIC_GET: u8 = 26;
pub const STATIC_SET: u8 = 27;
pub const METHOD_INVOCATION: u8 = 28;
pub const STATIC_INVOCATION: u8 = 30;
pub const CONSTRUCTOR_INVOCATION: u8 = 31;
pub const CONST_CONSTRUCTOR_INVOCATION: u8 = 32;
pub const NOT: u8 = 33;
pub const LOGICAL_EXPRESSION: u8 = 34;
pub const CONDITIONAL_EXPRESSION: u8 = 35;
pub const STRING_CONCATENATION: u8 = 36;
pub const IS_EXPRESSION: u8 = 37;
pub const AS_EXPRESSION: u8 = 38;
pub const STRING_LITERAL: u8 = 39;
pub const DOUBLE_LITERAL: u8 = 40;
pub const TRUE_LITERAL: u8 = 41;
pub const FALSE_LITERAL: u8 = 42;
pub const NULL_LITERAL: u8 = 43;
pub const THIS_EXPRESSION: u8 = 46;
pub const THROW: u8 = 48;
pub const POSITIVE_INT_LITERAL: u8 = 55;
pub const NEGATIVE_INT_LITERAL: u8 = 56;
pub const BIG_INT_LITERAL: u8 = 57;
pub const CONST_LIST_LITERAL: u8 = 58;
pub const BLOCK_EXPRESSION: u8 = 82;
pub const LIST_LITERAL: u8 = 111;
pub const NULL_CHECK: u8 = 117;

// Statements
pub const EXPRESSION_STATEMENT: u8 = 61;
pub const BLOCK: u8 = 62;
pub const EMPTY_STATEMENT: u8 = 63;
pub const LABELED_STATEMENT: u8 = 65;
pub const BREAK_STATEMENT: u8 = 66;
pub const WHILE_STATEMENT: u8 = 67;
pub const DO_STATEMENT: u8 = 68;
pub const ASSERT_STATEMENT: u8 = 69;
pub const IF_STATEMENT: u8 = 73;
pub const RETURN_STATEMENT: u8 = 74;
pub const TRY_CATCH: u8 = 75;
pub const TRY_FINALLY: u8 = 76;
pub const VARIABLE_DECLARATION: u8 = 78;

// Types
pub const BOTTOM_TYPE: u8 = 89;
pub const INVALID_TYPE: u8 = 90;
pub const DYNAMIC_TYPE: u8 = 91;
pub const VOID_TYPE: u8 = 92;
pub const INTERFACE_TYPE: u8 = 93;
pub const TYPE_PARAMETER_TYPE: u8 = 95;
pub const SIMPLE_INTERFACE_TYPE: u8 = 96;
pub const NEVER_TYPE: u8 = 98;

// Specialized tags
pub const SPECIALIZED_TAG_HIGH_BIT: u8 = 0x80;
pub const SPECIALIZED_TAG_MASK: u8 = 0xF8;
pub const SPECIALIZED_PAYLOAD_MASK: u8 = 0x07;

pub const SPECIALIZED_VARIABLE_GET: u8 = 128;
pub const SPECIALIZED_VARIABLE_SET: u8 = 136;
pub const SPECIALIZED_INT_LITERAL: u8 = 144;
/// Added to a small int literal to form its payload; covers `-3..=4`.
pub const SPECIALIZED_INT_LITERAL_BIAS: i64 = 3;

/// Variables with a slot below this are eligible for specialized tags.
pub const SPECIALIZED_VARIABLE_LIMIT: u32 = 8;

/// Split a tag byte into its base tag and payload.
#[inline]
pub const fn split_specialized(tag: u8) -> (u8, u8) {
    if tag & SPECIALIZED_TAG_HIGH_BIT == 0 {
        (tag, 0)
    } else {
        (tag & SPECIALIZED_TAG_MASK, tag & SPECIALIZED_PAYLOAD_MASK)
    }
}
