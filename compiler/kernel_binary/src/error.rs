//! Reader and writer errors.

use kernel_ir::{StmtId, TypeParameterId, VariableId};
use thiserror::Error;

/// Failure to decode a component. Every variant records the byte offset
/// into the input at which decoding stopped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReadError {
    #[error("not a kernel file: expected magic 0x90ABCDEF, found 0x{found:08X} at offset {offset}")]
    InvalidMagic { found: u32, offset: usize },

    #[error("unsupported kernel format version {version} at offset {offset} (supported: 40..=41)")]
    UnsupportedVersion { version: u32, offset: usize },

    #[error("unexpected {kind} tag {tag} at offset {offset}")]
    UnexpectedTag {
        kind: &'static str,
        tag: u8,
        offset: usize,
    },

    #[error("{table} index {index} out of range (size {len}) at offset {offset}")]
    IndexOutOfRange {
        table: &'static str,
        index: u32,
        len: usize,
        offset: usize,
    },

    #[error("unexpected end of input at offset {offset}: needed {needed} more bytes")]
    UnexpectedEof { offset: usize, needed: usize },

    #[error("invalid UTF-8 in string at offset {offset}")]
    InvalidUtf8 { offset: usize },

    #[error("unsupported {what} at offset {offset}")]
    Unsupported { what: &'static str, offset: usize },

    #[error("malformed component at offset {offset}: {message}")]
    Malformed { message: String, offset: usize },
}

impl ReadError {
    /// The input is not a component this reader understands at all, as
    /// opposed to a damaged one.
    pub fn is_incompatible(&self) -> bool {
        matches!(
            self,
            ReadError::InvalidMagic { .. } | ReadError::UnsupportedVersion { .. }
        )
    }

    pub fn offset(&self) -> usize {
        match self {
            ReadError::InvalidMagic { offset, .. }
            | ReadError::UnsupportedVersion { offset, .. }
            | ReadError::UnexpectedTag { offset, .. }
            | ReadError::IndexOutOfRange { offset, .. }
            | ReadError::UnexpectedEof { offset, .. }
            | ReadError::InvalidUtf8 { offset }
            | ReadError::Unsupported { offset, .. }
            | ReadError::Malformed { offset, .. } => *offset,
        }
    }
}

/// A tree that cannot be serialized as it stands.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WriteError {
    #[error("variable {variable:?} is used outside the scope that declares it")]
    VariableNotInScope { variable: VariableId },

    #[error("break target {target:?} is not an enclosing labeled statement")]
    LabelNotInScope { target: StmtId },

    #[error("type parameter {parameter:?} is used outside the declaration that binds it")]
    TypeParameterNotInScope { parameter: TypeParameterId },

    #[error("{what} has no canonical name")]
    UnboundReference { what: &'static str },

    #[error("no encoding for this {what}")]
    Unsupported { what: &'static str },

    #[error("value {value} does not fit in 30 bits ({what})")]
    ValueTooLarge { what: &'static str, value: u64 },
}
