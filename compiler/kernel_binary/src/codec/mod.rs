//! Primitive encodings shared by the reader and the writer.
//!
//! - `uint`: 1, 2, or 4 bytes for values below 2^7, 2^14, and 2^30; the top
//!   bits of the first byte select the form (`0x`, `10`, `11`)
//! - `uint32`: 4 bytes big-endian
//! - `double`: 8 bytes big-endian IEEE-754
//! - strings: `uint` byte length, then UTF-8 bytes
//! - file offsets: `uint(offset + 1)`, so "no offset" (-1) encodes as 0

mod cursor;
mod sink;

pub(crate) use cursor::ByteCursor;
pub(crate) use sink::BinarySink;

/// Largest value a `uint` can carry.
pub const MAX_UINT: u32 = (1 << 30) - 1;

#[cfg(test)]
mod tests;
