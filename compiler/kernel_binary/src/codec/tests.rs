use super::*;
use crate::{ReadError, WriteError};
use kernel_ir::FileOffset;
use pretty_assertions::assert_eq;

fn encode_uint(value: u32) -> Vec<u8> {
    let mut sink = BinarySink::new();
    sink.write_uint(value, "test").unwrap();
    sink.into_bytes()
}

#[test]
fn test_uint_forms() {
    assert_eq!(encode_uint(0), vec![0x00]);
    assert_eq!(encode_uint(0x7F), vec![0x7F]);
    assert_eq!(encode_uint(0x80), vec![0x80, 0x80]);
    assert_eq!(encode_uint(0x3FFF), vec![0xBF, 0xFF]);
    assert_eq!(encode_uint(0x4000), vec![0xC0, 0x00, 0x40, 0x00]);
    assert_eq!(encode_uint(0x0123_4567), vec![0xC1, 0x23, 0x45, 0x67]);
    assert_eq!(encode_uint(MAX_UINT), vec![0xFF, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn test_uint_rejects_31_bit_values() {
    let mut sink = BinarySink::new();
    assert_eq!(
        sink.write_uint(1 << 30, "count"),
        Err(WriteError::ValueTooLarge {
            what: "count",
            value: 1 << 30
        })
    );
    assert_eq!(sink.offset(), 0);
}

#[test]
fn test_uint30_form_decodes_as_uint() {
    let mut sink = BinarySink::new();
    sink.write_uint30(5);
    let bytes = sink.into_bytes();
    assert_eq!(bytes, vec![0xC0, 0x00, 0x00, 0x05]);
    assert_eq!(ByteCursor::new(&bytes).read_uint().unwrap(), 5);
}

#[test]
fn test_uint32_and_double_are_big_endian() {
    let mut sink = BinarySink::new();
    sink.write_uint32(0x90AB_CDEF);
    sink.write_double(1.0);
    let bytes = sink.into_bytes();
    assert_eq!(&bytes[..4], &[0x90, 0xAB, 0xCD, 0xEF]);
    assert_eq!(&bytes[4..], &[0x3F, 0xF0, 0, 0, 0, 0, 0, 0]);

    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(cursor.read_uint32().unwrap(), 0x90AB_CDEF);
    assert_eq!(cursor.read_double().unwrap(), 1.0);
}

#[test]
fn test_file_offset_bias() {
    let mut sink = BinarySink::new();
    sink.write_file_offset(FileOffset::NONE).unwrap();
    sink.write_file_offset(FileOffset::new(0)).unwrap();
    sink.write_file_offset(FileOffset::new(200)).unwrap();
    let bytes = sink.into_bytes();
    assert_eq!(bytes, vec![0x00, 0x01, 0x80, 0xC9]);

    let mut cursor = ByteCursor::new(&bytes);
    assert_eq!(cursor.read_file_offset().unwrap(), FileOffset::NONE);
    assert_eq!(cursor.read_file_offset().unwrap(), FileOffset::new(0));
    assert_eq!(cursor.read_file_offset().unwrap(), FileOffset::new(200));
}

#[test]
fn test_file_offset_at_i32_max_is_too_large() {
    let mut sink = BinarySink::new();
    assert_eq!(
        sink.write_file_offset(FileOffset::new(i32::MAX)),
        Err(WriteError::ValueTooLarge {
            what: "file offset",
            value: 1 << 31,
        })
    );
    assert_eq!(sink.offset(), 0);
}

#[test]
fn test_string_is_length_prefixed_utf8() {
    let mut sink = BinarySink::new();
    sink.write_string("héllo").unwrap();
    let bytes = sink.into_bytes();
    assert_eq!(bytes[0], 6);
    assert_eq!(ByteCursor::new(&bytes).read_string().unwrap(), "héllo");
}

#[test]
fn test_invalid_utf8_reports_offset() {
    let bytes = [2, 0xFF, 0xFE];
    assert_eq!(
        ByteCursor::new(&bytes).read_string(),
        Err(ReadError::InvalidUtf8 { offset: 1 })
    );
}

#[test]
fn test_truncated_uint_is_eof() {
    let bytes = [0xC0, 0x00];
    assert_eq!(
        ByteCursor::new(&bytes).read_uint(),
        Err(ReadError::UnexpectedEof {
            offset: 1,
            needed: 2
        })
    );
    assert_eq!(
        ByteCursor::new(&[]).read_byte(),
        Err(ReadError::UnexpectedEof {
            offset: 0,
            needed: 1
        })
    );
}

#[test]
fn test_pad_to_alignment() {
    let mut sink = BinarySink::new();
    sink.write_byte(1);
    sink.pad_to(8);
    assert_eq!(sink.offset(), 8);
    sink.pad_to(8);
    assert_eq!(sink.offset(), 8);
}

#[test]
fn test_seek_past_end_fails() {
    let bytes = [0u8; 4];
    let mut cursor = ByteCursor::new(&bytes);
    assert!(cursor.seek(4).is_ok());
    assert!(cursor.seek(5).is_err());
    assert_eq!(cursor.peek_uint32_at(0).unwrap(), 0);
    assert_eq!(cursor.offset(), 4);
}

mod proptest_codec {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn uint_round_trips(value in 0u32..=MAX_UINT) {
            let bytes = encode_uint(value);
            let expected_len = if value < 0x80 { 1 } else if value < 0x4000 { 2 } else { 4 };
            prop_assert_eq!(bytes.len(), expected_len);
            let mut cursor = ByteCursor::new(&bytes);
            prop_assert_eq!(cursor.read_uint().unwrap(), value);
            prop_assert_eq!(cursor.offset(), bytes.len());
        }

        #[test]
        fn double_round_trips_bit_exact(bits in any::<u64>()) {
            let value = f64::from_bits(bits);
            let mut sink = BinarySink::new();
            sink.write_double(value);
            let bytes = sink.into_bytes();
            let decoded = ByteCursor::new(&bytes).read_double().unwrap();
            prop_assert_eq!(decoded.to_bits(), bits);
        }

        #[test]
        fn string_round_trips(value in ".{0,64}") {
            let mut sink = BinarySink::new();
            sink.write_string(&value).unwrap();
            let bytes = sink.into_bytes();
            prop_assert_eq!(ByteCursor::new(&bytes).read_string().unwrap(), value);
        }
    }
}
