use kernel_ir::FileOffset;

use crate::ReadError;

/// Bounds-checked reads over an input slice.
#[derive(Clone)]
pub(crate) struct ByteCursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        ByteCursor { bytes, offset: 0 }
    }

    #[inline]
    pub(crate) fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.bytes.len()
    }

    pub(crate) fn seek(&mut self, offset: usize) -> Result<(), ReadError> {
        if offset > self.bytes.len() {
            return Err(ReadError::UnexpectedEof {
                offset: self.bytes.len(),
                needed: offset - self.bytes.len(),
            });
        }
        self.offset = offset;
        Ok(())
    }

    pub(crate) fn read_bytes(&mut self, len: usize) -> Result<&'a [u8], ReadError> {
        let available = self.bytes.len() - self.offset;
        if len > available {
            return Err(ReadError::UnexpectedEof {
                offset: self.offset,
                needed: len - available,
            });
        }
        let bytes = &self.bytes[self.offset..self.offset + len];
        self.offset += len;
        Ok(bytes)
    }

    #[inline]
    pub(crate) fn read_byte(&mut self) -> Result<u8, ReadError> {
        match self.bytes.get(self.offset) {
            Some(&byte) => {
                self.offset += 1;
                Ok(byte)
            }
            None => Err(ReadError::UnexpectedEof {
                offset: self.offset,
                needed: 1,
            }),
        }
    }

    /// Next byte without consuming it.
    pub(crate) fn peek_byte(&self) -> Option<u8> {
        self.bytes.get(self.offset).copied()
    }

    pub(crate) fn read_bool(&mut self) -> Result<bool, ReadError> {
        let offset = self.offset;
        match self.read_byte()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(ReadError::Malformed {
                message: format!("expected boolean byte, found {other}"),
                offset,
            }),
        }
    }

    pub(crate) fn read_uint(&mut self) -> Result<u32, ReadError> {
        let first = self.read_byte()?;
        match first >> 6 {
            0 | 1 => Ok(u32::from(first)),
            2 => {
                let second = self.read_byte()?;
                Ok((u32::from(first & 0x3F) << 8) | u32::from(second))
            }
            _ => {
                let rest = self.read_bytes(3)?;
                Ok((u32::from(first & 0x3F) << 24)
                    | (u32::from(rest[0]) << 16)
                    | (u32::from(rest[1]) << 8)
                    | u32::from(rest[2]))
            }
        }
    }

    pub(crate) fn read_uint32(&mut self) -> Result<u32, ReadError> {
        let bytes = self.read_bytes(4)?;
        Ok(u32::from_be_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    /// `uint32` at `offset`, leaving the position unchanged.
    pub(crate) fn peek_uint32_at(&self, offset: usize) -> Result<u32, ReadError> {
        let mut probe = self.clone();
        probe.seek(offset)?;
        probe.read_uint32()
    }

    pub(crate) fn read_double(&mut self) -> Result<f64, ReadError> {
        let bytes = self.read_bytes(8)?;
        let mut raw = [0; 8];
        raw.copy_from_slice(bytes);
        Ok(f64::from_bits(u64::from_be_bytes(raw)))
    }

    pub(crate) fn read_string(&mut self) -> Result<String, ReadError> {
        let len = self.read_uint()? as usize;
        let offset = self.offset;
        let bytes = self.read_bytes(len)?;
        String::from_utf8(bytes.to_vec()).map_err(|_| ReadError::InvalidUtf8 { offset })
    }

    pub(crate) fn read_file_offset(&mut self) -> Result<FileOffset, ReadError> {
        let offset = self.offset;
        let biased = self.read_uint()?;
        i32::try_from(biased)
            .map(|value| FileOffset::new(value - 1))
            .map_err(|_| ReadError::Malformed {
                message: format!("file offset {biased} out of range"),
                offset,
            })
    }
}
