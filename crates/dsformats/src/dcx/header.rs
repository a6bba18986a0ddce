//! DCX frame header

use tracing::debug;

use super::error::DcxResult;
use crate::cursor::{ByteReader, ByteWriter, CursorError, checked_u32};

/// Outer frame magic
pub const DCX_MAGIC: [u8; 4] = *b"DCX\0";

/// Size descriptor sub-frame magic
pub const DCS_MAGIC: [u8; 4] = *b"DCS\0";

/// Compression parameter sub-frame magic
pub const DCP_MAGIC: [u8; 4] = *b"DCP\0";

/// Compression algorithm name
pub const ALGORITHM: [u8; 4] = *b"DFLT";

/// Compressed data sub-frame magic
pub const DCA_MAGIC: [u8; 4] = *b"DCA\0";

/// Zlib stream header opening every payload, counted in the compressed size
pub const DEFLATE_MARKER: [u8; 2] = [0x78, 0xDA];

/// Structural constants following the outer magic
pub const FRAME_CONSTANTS: [u32; 4] = [0x0001_0000, 0x18, 0x24, 0x24];

/// Constants following the algorithm name; the last looks like flags
pub const PARAMETER_CONSTANTS: [u32; 6] = [0x20, 0x0900_0000, 0, 0, 0, 0x0001_0100];

/// Header length written on encode
pub const HEADER_LENGTH: u32 = 0x2C;

/// Compressed-data header length written on encode
pub const DATA_HEADER_LENGTH: u32 = 8;

/// Decoded DCX header
///
/// ```text
/// 0x00  "DCX\0", 0x10000, 0x18, 0x24, 0x24, header length
/// 0x18  "DCS\0", uncompressed size, compressed size
/// 0x24  "DCP\0", "DFLT", 0x20, 0x9000000, 0, 0, 0, 0x00010100
/// 0x44  "DCA\0", data header length
/// 0x4C  78 DA, deflate stream
/// ```
///
/// All integers are big-endian. The two header-length fields are carried
/// through on decode and recomputed on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DcxHeader {
    /// Size of the inflated payload
    pub uncompressed_size: u32,
    /// Size of the deflate stream including the two marker bytes
    pub compressed_size: u32,
    /// Outer header length field
    pub header_length: u32,
    /// Compressed-data sub-frame header length field
    pub data_header_length: u32,
}

impl DcxHeader {
    /// Encoded size in bytes, up to the deflate marker
    pub const SIZE: usize = 0x4C;

    /// Offset of the uncompressed size field
    pub const UNCOMPRESSED_SIZE_OFFSET: usize = 0x1C;

    /// Header for a payload of the given sizes with the standard length fields
    ///
    /// `deflated_len` excludes the marker bytes.
    pub fn for_payload(uncompressed_len: usize, deflated_len: usize) -> DcxResult<Self> {
        let compressed_len = deflated_len.saturating_add(DEFLATE_MARKER.len());
        Ok(Self {
            uncompressed_size: checked_u32("uncompressed size", uncompressed_len)?,
            compressed_size: checked_u32("compressed size", compressed_len)?,
            header_length: HEADER_LENGTH,
            data_header_length: DATA_HEADER_LENGTH,
        })
    }

    /// Length of the deflate stream following the marker
    pub fn deflated_len(&self) -> usize {
        (self.compressed_size as usize).saturating_sub(DEFLATE_MARKER.len())
    }

    /// Read and validate the header
    ///
    /// Any constant other than the single supported profile is a format
    /// mismatch.
    pub fn read<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> DcxResult<Self> {
        reader.assert_magic(&DCX_MAGIC)?;
        for constant in FRAME_CONSTANTS {
            reader.assert_u32(&[constant])?;
        }
        let header_length = reader.read_u32()?;

        reader.assert_magic(&DCS_MAGIC)?;
        let uncompressed_size = reader.read_u32()?;
        let size_position = reader.position();
        let compressed_size = reader.read_u32()?;

        reader.assert_magic(&DCP_MAGIC)?;
        reader.assert_magic(&ALGORITHM)?;
        for constant in PARAMETER_CONSTANTS {
            reader.assert_u32(&[constant])?;
        }

        reader.assert_magic(&DCA_MAGIC)?;
        let data_header_length = reader.read_u32()?;

        if (compressed_size as usize) < DEFLATE_MARKER.len() {
            return Err(CursorError::mismatch(
                size_position,
                "compressed size of at least 2",
                compressed_size,
            )
            .into());
        }

        debug!(
            uncompressed_size,
            compressed_size, header_length, data_header_length, "parsed DCX header"
        );
        Ok(Self {
            uncompressed_size,
            compressed_size,
            header_length,
            data_header_length,
        })
    }

    /// Write the header, without the deflate marker
    pub fn write(&self, writer: &mut ByteWriter) -> DcxResult<()> {
        writer.write_bytes(&DCX_MAGIC)?;
        for constant in FRAME_CONSTANTS {
            writer.write_u32(constant)?;
        }
        writer.write_u32(self.header_length)?;

        writer.write_bytes(&DCS_MAGIC)?;
        writer.write_u32(self.uncompressed_size)?;
        writer.write_u32(self.compressed_size)?;

        writer.write_bytes(&DCP_MAGIC)?;
        writer.write_bytes(&ALGORITHM)?;
        for constant in PARAMETER_CONSTANTS {
            writer.write_u32(constant)?;
        }

        writer.write_bytes(&DCA_MAGIC)?;
        writer.write_u32(self.data_header_length)?;
        Ok(())
    }
}
