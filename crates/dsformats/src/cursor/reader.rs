//! Positioned, endian-aware reader over an in-memory buffer

use std::io::Cursor;

use binrw::Endian;

use super::encoding::TextEncoding;
use super::error::{CursorError, CursorResult};
use super::primitive::Primitive;

macro_rules! typed_reads {
    ($($name:ident => $ty:ty),+ $(,)?) => {
        $(
            #[doc = concat!("Read a `", stringify!($ty), "` in the cursor's byte order")]
            pub fn $name(&mut self) -> CursorResult<$ty> {
                self.read::<$ty>()
            }
        )+
    };
}

/// Sequential reader with random-access peeks
///
/// The byte order is fixed at construction. Every failed read or assertion
/// is terminal: callers are expected to propagate the error and discard the
/// partially decoded value.
#[derive(Debug, Clone)]
pub struct ByteReader<B = Vec<u8>> {
    cursor: Cursor<B>,
    endian: Endian,
    encoding: TextEncoding,
}

impl<B: AsRef<[u8]>> ByteReader<B> {
    /// Create a reader positioned at offset 0
    pub fn new(data: B, endian: Endian) -> Self {
        Self {
            cursor: Cursor::new(data),
            endian,
            encoding: TextEncoding::default(),
        }
    }

    /// Create a little-endian reader
    pub fn little_endian(data: B) -> Self {
        Self::new(data, Endian::Little)
    }

    /// Create a big-endian reader
    pub fn big_endian(data: B) -> Self {
        Self::new(data, Endian::Big)
    }

    /// Use a different encoding for [`read_encoded_string`](Self::read_encoded_string)
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Byte order of numeric reads
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Encoding of text reads
    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    /// Current offset
    pub fn position(&self) -> usize {
        self.cursor.position() as usize
    }

    /// Move to an absolute offset. Seeking past the end is allowed; the next
    /// read fails with `TruncatedInput`.
    pub fn seek(&mut self, position: usize) {
        self.cursor.set_position(position as u64);
    }

    /// Total buffer length
    pub fn len(&self) -> usize {
        self.data().len()
    }

    /// Check if the buffer is empty
    pub fn is_empty(&self) -> bool {
        self.data().is_empty()
    }

    /// Bytes between the current offset and the end of the buffer
    pub fn remaining(&self) -> usize {
        self.len().saturating_sub(self.position())
    }

    fn data(&self) -> &[u8] {
        self.cursor.get_ref().as_ref()
    }

    fn ensure(&self, needed: usize) -> CursorResult<()> {
        let available = self.remaining();
        if self.position() > self.len() || available < needed {
            return Err(CursorError::TruncatedInput {
                position: self.position(),
                needed,
                available,
            });
        }
        Ok(())
    }

    /// Read one fixed-width value, swapping byte order for big-endian cursors
    pub fn read<T: Primitive>(&mut self) -> CursorResult<T> {
        self.ensure(T::WIDTH)?;
        Ok(T::read_from(&mut self.cursor, self.endian)?)
    }

    typed_reads! {
        read_u8 => u8,
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Read raw bytes without byte-order handling
    pub fn read_bytes(&mut self, len: usize) -> CursorResult<Vec<u8>> {
        self.ensure(len)?;
        let start = self.position();
        let bytes = self.data()[start..start + len].to_vec();
        self.seek(start + len);
        Ok(bytes)
    }

    /// Advance without reading
    pub fn skip(&mut self, count: usize) -> CursorResult<()> {
        self.ensure(count)?;
        self.seek(self.position() + count);
        Ok(())
    }

    /// Advance to the next multiple of `boundary`
    pub fn align(&mut self, boundary: usize) {
        if boundary == 0 {
            return;
        }
        let misalignment = self.position() % boundary;
        if misalignment > 0 {
            self.seek(self.position() + boundary - misalignment);
        }
    }

    /// Run `op` at `offset`, then restore the current position
    ///
    /// The position is restored whether or not `op` succeeds.
    pub fn peek_at<T>(
        &mut self,
        offset: usize,
        op: impl FnOnce(&mut Self) -> CursorResult<T>,
    ) -> CursorResult<T> {
        let saved = self.position();
        self.seek(offset);
        let result = op(self);
        self.seek(saved);
        result
    }

    /// Read `len` raw bytes at `offset`
    pub fn get_bytes(&mut self, offset: usize, len: usize) -> CursorResult<Vec<u8>> {
        self.peek_at(offset, |reader| reader.read_bytes(len))
    }

    /// Read a zero-terminated string in the configured encoding at `offset`
    pub fn get_encoded_string(&mut self, offset: usize) -> CursorResult<String> {
        self.peek_at(offset, |reader| reader.read_encoded_string(0))
    }

    /// Read text in the configured encoding
    ///
    /// A non-zero `len` decodes exactly that many bytes. Zero scans forward to
    /// a null terminator and leaves the cursor just past it.
    pub fn read_encoded_string(&mut self, len: usize) -> CursorResult<String> {
        self.read_text(self.encoding, len)
    }

    /// Read single-byte Latin text, same length rules as
    /// [`read_encoded_string`](Self::read_encoded_string)
    pub fn read_ascii(&mut self, len: usize) -> CursorResult<String> {
        self.read_text(TextEncoding::Latin1, len)
    }

    /// Read a 4-byte length, that many bytes of text, a delimiter byte, then
    /// skip filler up to a 4-byte boundary
    pub fn read_length_prefixed_string(&mut self, delimiter: u8) -> CursorResult<String> {
        let len = self.read_u32()? as usize;
        let text = if len > 0 {
            let bytes = self.read_bytes(len)?;
            self.encoding.decode(&bytes)
        } else {
            String::new()
        };
        self.assert_u8(&[delimiter])?;
        self.align(4);
        Ok(text)
    }

    fn read_text(&mut self, encoding: TextEncoding, len: usize) -> CursorResult<String> {
        if len == 0 {
            return self.read_terminated(encoding);
        }
        let bytes = self.read_bytes(len)?;
        Ok(encoding.decode(&bytes))
    }

    fn read_terminated(&mut self, encoding: TextEncoding) -> CursorResult<String> {
        let width = encoding.terminator_width();
        let start = self.position();
        let tail = self.data().get(start..).unwrap_or_default();

        let Some(units) = tail
            .chunks_exact(width)
            .position(|unit| unit.iter().all(|&b| b == 0))
        else {
            return Err(CursorError::TruncatedInput {
                position: start,
                needed: tail.len() + width,
                available: tail.len(),
            });
        };

        let text_len = units * width;
        let text = encoding.decode(&tail[..text_len]);
        self.seek(start + text_len + width);
        Ok(text)
    }

    /// Read a value and check it against the allowed set
    pub fn assert_value<T: Primitive>(&mut self, allowed: &[T]) -> CursorResult<T> {
        let position = self.position();
        let value = self.read::<T>()?;
        if allowed.contains(&value) {
            return Ok(value);
        }
        let expected = allowed
            .iter()
            .map(|v| v.describe())
            .collect::<Vec<_>>()
            .join(" or ");
        Err(CursorError::mismatch(position, expected, value.describe()))
    }

    /// Read a byte that must be one of `allowed`, returning it
    pub fn assert_u8(&mut self, allowed: &[u8]) -> CursorResult<u8> {
        self.assert_value(allowed)
    }

    /// Read an `i32` that must equal `expected`
    pub fn assert_i32(&mut self, expected: i32) -> CursorResult<()> {
        self.assert_value(&[expected]).map(drop)
    }

    /// Read a `u32` that must be one of `allowed`, returning it
    pub fn assert_u32(&mut self, allowed: &[u32]) -> CursorResult<u32> {
        self.assert_value(allowed)
    }

    /// Read raw bytes that must equal `expected`
    pub fn assert_bytes(&mut self, expected: &[u8]) -> CursorResult<()> {
        let position = self.position();
        let actual = self.read_bytes(expected.len())?;
        if actual != expected {
            return Err(CursorError::mismatch(
                position,
                format!("{expected:02X?}"),
                format!("{actual:02X?}"),
            ));
        }
        Ok(())
    }

    /// Read a magic value, reporting mismatches as escaped text
    pub fn assert_magic(&mut self, magic: &[u8]) -> CursorResult<()> {
        let position = self.position();
        let actual = self.read_bytes(magic.len())?;
        if actual != magic {
            return Err(CursorError::mismatch(
                position,
                format!("\"{}\"", magic.escape_ascii()),
                format!("\"{}\"", actual.escape_ascii()),
            ));
        }
        Ok(())
    }

    /// Read Latin text that must equal `expected`
    pub fn assert_ascii(&mut self, expected: &str) -> CursorResult<()> {
        let magic = TextEncoding::Latin1.encode(expected)?;
        self.assert_magic(&magic)
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn test_endian_reads() {
        let data = [0x12, 0x34, 0x56, 0x78];
        let mut little = ByteReader::little_endian(&data[..]);
        assert_eq!(little.read_u32().expect("read"), 0x7856_3412);

        let mut big = ByteReader::big_endian(&data[..]);
        assert_eq!(big.read_u16().expect("read"), 0x1234);
        assert_eq!(big.read_i16().expect("read"), 0x5678);
        assert_eq!(big.remaining(), 0);
    }

    #[test]
    fn test_truncated_read_keeps_position() {
        let mut reader = ByteReader::little_endian(vec![1, 2, 3]);
        reader.skip(1).expect("skip");
        let err = reader.read_i32().expect_err("only two bytes remain");
        assert!(matches!(
            err,
            CursorError::TruncatedInput {
                position: 1,
                needed: 4,
                available: 2
            }
        ));
        assert_eq!(reader.position(), 1);
    }

    #[test]
    fn test_read_past_end_after_seek() {
        let mut reader = ByteReader::little_endian(vec![0u8; 4]);
        reader.seek(10);
        assert!(reader.read_bytes(0).expect_err("beyond end").is_truncated());
    }

    #[test]
    fn test_peek_restores_position() {
        let mut reader = ByteReader::little_endian(b"abc\0\x2A\0\0\0".to_vec());
        reader.skip(4).expect("skip");
        assert_eq!(reader.get_encoded_string(0).expect("name"), "abc");
        assert_eq!(reader.position(), 4);
        assert_eq!(reader.read_i32().expect("value"), 42);

        // Restored even on failure
        assert!(reader.get_bytes(6, 4).is_err());
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_zero_terminated_string() {
        let mut reader = ByteReader::little_endian(b"a.txt\0b.txt\0".to_vec());
        assert_eq!(reader.read_encoded_string(0).expect("first"), "a.txt");
        assert_eq!(reader.position(), 6);
        assert_eq!(reader.read_encoded_string(0).expect("second"), "b.txt");
        assert_eq!(reader.remaining(), 0);
    }

    #[test]
    fn test_unterminated_string() {
        let mut reader = ByteReader::little_endian(b"abc".to_vec());
        let err = reader.read_encoded_string(0).expect_err("no terminator");
        assert!(err.is_truncated());
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_fixed_length_string() {
        let mut reader = ByteReader::little_endian(b"07D7R6\0\0rest".to_vec());
        assert_eq!(reader.read_ascii(8).expect("signature"), "07D7R6\0\0");
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_shift_jis_name() {
        // "テスト" followed by terminator
        let bytes = vec![0x83, 0x65, 0x83, 0x58, 0x83, 0x67, 0x00];
        let mut reader = ByteReader::little_endian(bytes);
        assert_eq!(reader.read_encoded_string(0).expect("name"), "テスト");
    }

    #[test]
    fn test_utf16_string() {
        let mut reader = ByteReader::little_endian(vec![0x48, 0x00, 0x69, 0x00, 0x00, 0x00, 0xFF])
            .with_encoding(TextEncoding::Utf16Le);
        assert_eq!(reader.read_encoded_string(0).expect("utf16"), "Hi");
        assert_eq!(reader.position(), 6);
    }

    #[test]
    fn test_length_prefixed_string() {
        let mut data = Vec::new();
        data.extend_from_slice(&3u32.to_le_bytes());
        data.extend_from_slice(b"abc");
        data.push(0xA3);
        data.extend_from_slice(&7u32.to_le_bytes());

        let mut reader = ByteReader::little_endian(data);
        assert_eq!(reader.read_length_prefixed_string(0xA3).expect("string"), "abc");
        assert_eq!(reader.position(), 8);
        assert_eq!(reader.read_u32().expect("next"), 7);
    }

    #[test]
    fn test_length_prefixed_empty_string() {
        let mut data = 0u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[0x03, 0xFF, 0xFF, 0xFF]);

        let mut reader = ByteReader::little_endian(data);
        assert_eq!(reader.read_length_prefixed_string(0x03).expect("string"), "");
        assert_eq!(reader.position(), 8);
    }

    #[test]
    fn test_length_prefixed_wrong_delimiter() {
        let mut data = 1u32.to_le_bytes().to_vec();
        data.extend_from_slice(&[b'x', 0x04, 0, 0]);

        let mut reader = ByteReader::little_endian(data);
        let err = reader
            .read_length_prefixed_string(0xA3)
            .expect_err("delimiter differs");
        assert!(matches!(err, CursorError::FormatMismatch { position: 5, .. }));
    }

    #[test]
    fn test_assertions() {
        let mut reader = ByteReader::little_endian(vec![0x74, 0x40, 0, 0, 0, 0x55]);
        assert_eq!(reader.assert_u8(&[0x54, 0x74]).expect("flag"), 0x74);
        reader.assert_i32(0x40).expect("marker");

        let err = reader.assert_u8(&[0x54, 0x74]).expect_err("0x55 is not a flag");
        match err {
            CursorError::FormatMismatch {
                position,
                expected,
                actual,
            } => {
                assert_eq!(position, 5);
                assert_eq!(expected, "0x54 or 0x74");
                assert_eq!(actual, "0x55");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_assert_magic() {
        let mut reader = ByteReader::big_endian(b"DCX\0DCS\0".to_vec());
        reader.assert_magic(b"DCX\0").expect("outer magic");
        let err = reader.assert_ascii("DCP\0").expect_err("wrong sub-frame");
        let message = err.to_string();
        assert!(message.contains("DCP"));
        assert!(message.contains("DCS"));
    }

    #[test]
    fn test_align() {
        let mut reader = ByteReader::little_endian(vec![0u8; 32]);
        reader.skip(5).expect("skip");
        reader.align(16);
        assert_eq!(reader.position(), 16);
        reader.align(16);
        assert_eq!(reader.position(), 16);
    }
}
