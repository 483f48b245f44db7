use kernel_ir::FileOffset;

use super::MAX_UINT;
use crate::WriteError;

/// Growable output buffer with the primitive encoders.
#[derive(Default)]
pub(crate) struct BinarySink {
    bytes: Vec<u8>,
}

impl BinarySink {
    pub(crate) fn new() -> Self {
        BinarySink { bytes: Vec::new() }
    }

    /// Current write position, which is also the number of bytes written.
    #[inline]
    pub(crate) fn offset(&self) -> u32 {
        self.bytes.len() as u32
    }

    pub(crate) fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    #[inline]
    pub(crate) fn write_byte(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    pub(crate) fn write_bool(&mut self, value: bool) {
        self.write_byte(u8::from(value));
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Variable-length unsigned integer.
    pub(crate) fn write_uint(&mut self, value: u32, what: &'static str) -> Result<(), WriteError> {
        if value < 0x80 {
            self.write_byte(value as u8);
        } else if value < 0x4000 {
            self.write_byte(((value >> 8) as u8) | 0x80);
            self.write_byte(value as u8);
        } else if value <= MAX_UINT {
            self.write_uint30(value);
        } else {
            return Err(WriteError::ValueTooLarge {
                what,
                value: u64::from(value),
            });
        }
        Ok(())
    }

    /// Four-byte form of a `uint`, regardless of magnitude.
    pub(crate) fn write_uint30(&mut self, value: u32) {
        debug_assert!(value <= MAX_UINT);
        self.write_byte(((value >> 24) as u8) | 0xC0);
        self.write_byte((value >> 16) as u8);
        self.write_byte((value >> 8) as u8);
        self.write_byte(value as u8);
    }

    /// A length or count taken from a collection.
    pub(crate) fn write_len(&mut self, len: usize, what: &'static str) -> Result<(), WriteError> {
        let value = u32::try_from(len).map_err(|_| WriteError::ValueTooLarge {
            what,
            value: len as u64,
        })?;
        self.write_uint(value, what)
    }

    pub(crate) fn write_uint32(&mut self, value: u32) {
        self.write_bytes(&value.to_be_bytes());
    }

    pub(crate) fn write_double(&mut self, value: f64) {
        self.write_bytes(&value.to_bits().to_be_bytes());
    }

    pub(crate) fn write_string(&mut self, value: &str) -> Result<(), WriteError> {
        self.write_len(value.len(), "string length")?;
        self.write_bytes(value.as_bytes());
        Ok(())
    }

    pub(crate) fn write_file_offset(&mut self, offset: FileOffset) -> Result<(), WriteError> {
        // Offsets below -1 are treated as unknown.
        let offset = offset.get().max(-1);
        let biased = offset
            .checked_add(1)
            .and_then(|biased| u32::try_from(biased).ok())
            .ok_or(WriteError::ValueTooLarge {
                what: "file offset",
                value: i64::from(offset).unsigned_abs() + 1,
            })?;
        self.write_uint(biased, "file offset")
    }

    /// Zero bytes until the offset is a multiple of `alignment`.
    pub(crate) fn pad_to(&mut self, alignment: u32) {
        let padding = (alignment - self.offset() % alignment) % alignment;
        for _ in 0..padding {
            self.write_byte(0);
        }
    }
}
