//! Append-only writer with patchable forward references

use std::io::{Cursor, Write};

use binrw::Endian;
use tracing::trace;

use super::encoding::TextEncoding;
use super::error::{CursorError, CursorResult};
use super::patch::PatchTable;
use super::primitive::Primitive;

macro_rules! typed_writes {
    ($($name:ident => $ty:ty),+ $(,)?) => {
        $(
            #[doc = concat!("Write a `", stringify!($ty), "` in the cursor's byte order")]
            pub fn $name(&mut self, value: $ty) -> CursorResult<()> {
                self.write(value)
            }
        )+
    };
}

/// Convert a length or offset to its 4-byte on-disk representation
pub fn checked_u32(what: &'static str, value: usize) -> CursorResult<u32> {
    u32::try_from(value).map_err(|_| CursorError::ValueOutOfRange { what, value })
}

/// Sequential writer that can leave named placeholders and patch them later
///
/// Data is only ever appended; [`fill`](Self::fill) rewrites a placeholder in
/// place and returns to the end of the buffer.
#[derive(Debug)]
pub struct ByteWriter {
    cursor: Cursor<Vec<u8>>,
    endian: Endian,
    encoding: TextEncoding,
    patches: PatchTable,
}

impl ByteWriter {
    /// Create an empty writer
    pub fn new(endian: Endian) -> Self {
        Self {
            cursor: Cursor::new(Vec::new()),
            endian,
            encoding: TextEncoding::default(),
            patches: PatchTable::new(),
        }
    }

    /// Create a little-endian writer
    pub fn little_endian() -> Self {
        Self::new(Endian::Little)
    }

    /// Create a big-endian writer
    pub fn big_endian() -> Self {
        Self::new(Endian::Big)
    }

    /// Use a different encoding for [`write_encoded_string`](Self::write_encoded_string)
    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self
    }

    /// Byte order of numeric writes
    pub fn endian(&self) -> Endian {
        self.endian
    }

    /// Current append offset, equal to the bytes written so far
    pub fn position(&self) -> usize {
        self.cursor.get_ref().len()
    }

    /// Append one fixed-width value, swapping byte order for big-endian writers
    pub fn write<T: Primitive>(&mut self, value: T) -> CursorResult<()> {
        value.write_to(&mut self.cursor, self.endian)?;
        Ok(())
    }

    typed_writes! {
        write_u8 => u8,
        write_i8 => i8,
        write_u16 => u16,
        write_i16 => i16,
        write_u32 => u32,
        write_i32 => i32,
        write_u64 => u64,
        write_i64 => i64,
        write_f32 => f32,
        write_f64 => f64,
    }

    /// Append raw bytes without byte-order handling
    pub fn write_bytes(&mut self, bytes: &[u8]) -> CursorResult<()> {
        self.cursor.write_all(bytes)?;
        Ok(())
    }

    /// Write text in the configured encoding, optionally null-terminated
    pub fn write_encoded_string(&mut self, text: &str, terminate: bool) -> CursorResult<()> {
        self.write_text(self.encoding, text, terminate)
    }

    /// Write single-byte Latin text, optionally null-terminated
    pub fn write_ascii(&mut self, text: &str, terminate: bool) -> CursorResult<()> {
        self.write_text(TextEncoding::Latin1, text, terminate)
    }

    fn write_text(
        &mut self,
        encoding: TextEncoding,
        text: &str,
        terminate: bool,
    ) -> CursorResult<()> {
        let bytes = encoding.encode(text)?;
        self.write_bytes(&bytes)?;
        if terminate {
            self.write_bytes(&[0; 2][..encoding.terminator_width()])?;
        }
        Ok(())
    }

    /// Write a 4-byte encoded length, the encoded text, a delimiter byte, then
    /// zero filler up to a 4-byte boundary
    pub fn write_length_prefixed_string(&mut self, text: &str, delimiter: u8) -> CursorResult<()> {
        let bytes = self.encoding.encode(text)?;
        self.write_u32(checked_u32("string length", bytes.len())?)?;
        if !bytes.is_empty() {
            self.write_bytes(&bytes)?;
        }
        self.write_u8(delimiter)?;
        self.pad(4)
    }

    /// Append zero bytes until the length is a multiple of `boundary`
    pub fn pad(&mut self, boundary: usize) -> CursorResult<()> {
        if boundary == 0 {
            return Ok(());
        }
        let misalignment = self.position() % boundary;
        if misalignment > 0 {
            self.write_bytes(&vec![0; boundary - misalignment])?;
        }
        Ok(())
    }

    /// Append a zeroed placeholder for a `T` and remember its position
    pub fn reserve<T: Primitive>(&mut self, name: &str) -> CursorResult<()> {
        self.patches.register(name, self.position(), T::WIDTH)?;
        self.write_bytes(&[0; 8][..T::WIDTH])
    }

    /// Overwrite the placeholder registered as `name`
    pub fn fill<T: Primitive>(&mut self, name: &str, value: T) -> CursorResult<()> {
        let position = self.patches.resolve(name, T::WIDTH)?;
        let end = self.cursor.position();

        self.cursor.set_position(position as u64);
        let written = value.write_to(&mut self.cursor, self.endian);
        self.cursor.set_position(end);
        written?;

        trace!(reservation = name, position, "filled reservation");
        Ok(())
    }

    /// Reserve a 4-byte unsigned placeholder
    pub fn reserve_u32(&mut self, name: &str) -> CursorResult<()> {
        self.reserve::<u32>(name)
    }

    /// Fill a 4-byte unsigned placeholder
    pub fn fill_u32(&mut self, name: &str, value: u32) -> CursorResult<()> {
        self.fill(name, value)
    }

    /// Fill a 4-byte placeholder with the current append offset
    pub fn fill_position(&mut self, name: &str) -> CursorResult<()> {
        let position = checked_u32("offset", self.position())?;
        self.fill_u32(name, position)
    }

    /// Consume the writer and return the buffer
    ///
    /// Fails if any reservation was never filled.
    pub fn finish(self) -> CursorResult<Vec<u8>> {
        if let Some(name) = self.patches.unresolved().first() {
            return Err(CursorError::UnresolvedReservation((*name).to_string()));
        }
        Ok(self.cursor.into_inner())
    }
}
