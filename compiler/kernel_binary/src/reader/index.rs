//! The trailer at the end of every component.
//!
//! ```text
//! uint32 sourceTableOffset
//! uint32 canonicalNamesOffset
//! uint32 metadataPayloadsOffset
//! uint32 metadataMappingsOffset
//! uint32 stringTableOffset
//! uint32 constantTableOffset
//! uint32 mainMethodReference      // biased canonical name index
//! uint32 compiledMode             // format 41 and later
//! uint32[libraryCount + 1] libraryOffsets
//! uint32 libraryCount
//! uint32 componentFileSizeInBytes
//! ```
//!
//! Every offset is relative to the start of the component. The last two
//! words locate the component start, so a file of concatenated components
//! is walked from its end.

use kernel_ir::{CompiledMode, KernelVersion};

use crate::codec::ByteCursor;
use crate::tags;
use crate::ReadError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ComponentIndex {
    /// Absolute offset of the component's magic number.
    pub start: usize,
    pub version: KernelVersion,
    pub source_table: u32,
    pub canonical_names: u32,
    pub string_table: u32,
    pub main_method: u32,
    pub compiled_mode: CompiledMode,
    /// Start of each library, then the end of the last one.
    pub library_offsets: Vec<u32>,
}

impl ComponentIndex {
    /// Indices of every component in `cursor`, in file order.
    pub(crate) fn read_all(cursor: &ByteCursor<'_>) -> Result<Vec<ComponentIndex>, ReadError> {
        let mut indices = Vec::new();
        let mut end = cursor.len();
        while end > 0 {
            let index = Self::read_before(cursor, end)?;
            end = index.start;
            indices.push(index);
        }
        indices.reverse();
        Ok(indices)
    }

    /// The component whose index ends at `end`.
    fn read_before(cursor: &ByteCursor<'_>, end: usize) -> Result<ComponentIndex, ReadError> {
        let malformed = |message: String, offset: usize| ReadError::Malformed { message, offset };

        if end < 8 {
            return Err(malformed(
                format!("{end} trailing bytes are too few for a component index"),
                0,
            ));
        }
        let library_count = cursor.peek_uint32_at(end - 8)? as usize;
        let size = cursor.peek_uint32_at(end - 4)? as usize;
        if size < 8 || size > end {
            return Err(malformed(
                format!("component size {size} does not fit before offset {end}"),
                end - 4,
            ));
        }
        let start = end - size;

        let magic = cursor.peek_uint32_at(start)?;
        if magic != tags::MAGIC {
            return Err(ReadError::InvalidMagic {
                found: magic,
                offset: start,
            });
        }
        let format = cursor.peek_uint32_at(start + 4)?;
        let version = KernelVersion::from_format(format).ok_or(ReadError::UnsupportedVersion {
            version: format,
            offset: start + 4,
        })?;

        let fixed = if version.has_compiled_mode() { 8 } else { 7 };
        let words = library_count
            .checked_add(fixed + 3)
            .and_then(|words| words.checked_mul(4))
            .filter(|&bytes| bytes <= size)
            .ok_or_else(|| {
                malformed(
                    format!("library count {library_count} does not fit in the component"),
                    end - 8,
                )
            })?;

        let mut probe = cursor.clone();
        probe.seek(end - words)?;
        let source_table = probe.read_uint32()?;
        let canonical_names = probe.read_uint32()?;
        let metadata_payloads = probe.read_uint32()?;
        let metadata_mappings = probe.read_uint32()?;
        let string_table = probe.read_uint32()?;
        let constant_table = probe.read_uint32()?;
        let main_method = probe.read_uint32()?;
        let compiled_mode = if version.has_compiled_mode() {
            let mode_offset = probe.offset();
            let raw = probe.read_uint32()?;
            CompiledMode::from_u32(raw)
                .ok_or_else(|| malformed(format!("unknown compiled mode {raw}"), mode_offset))?
        } else {
            CompiledMode::default()
        };
        let mut library_offsets = Vec::with_capacity(library_count + 1);
        for _ in 0..=library_count {
            library_offsets.push(probe.read_uint32()?);
        }

        let body = size - words;
        let sections = [
            ("source table", source_table),
            ("canonical names", canonical_names),
            ("metadata payloads", metadata_payloads),
            ("metadata mappings", metadata_mappings),
            ("string table", string_table),
            ("constant table", constant_table),
        ];
        for (section, offset) in sections.into_iter().chain(
            library_offsets.iter().map(|&offset| ("library", offset)),
        ) {
            if offset as usize > body {
                return Err(malformed(
                    format!("{section} offset {offset} is outside the component"),
                    end - words,
                ));
            }
        }

        Ok(ComponentIndex {
            start,
            version,
            source_table,
            canonical_names,
            string_table,
            main_method,
            compiled_mode,
            library_offsets,
        })
    }
}
