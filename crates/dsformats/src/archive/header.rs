//! Archive headers and the shared format flag

use tracing::debug;

use super::error::{ArchiveError, ArchiveResult};
use crate::cursor::{ByteReader, CursorError};

/// Single-stream archive magic
pub const BND3_MAGIC: [u8; 4] = *b"BND3";

/// Split-archive header magic
pub const BHF3_MAGIC: [u8; 4] = *b"BHF3";

/// Split-archive data magic
pub const BDF3_MAGIC: [u8; 4] = *b"BDF3";

/// Signature carried by almost every known archive
pub const DEFAULT_SIGNATURE: [u8; 8] = *b"07D7R6\0\0";

/// Format flag byte selecting one of the two observed sub-variants
///
/// The meaning of the two values is unknown. Both decode identically and the
/// flag is carried through unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum FormatFlag {
    /// Flag value 0x54
    Flag54 = 0x54,
    /// Flag value 0x74
    #[default]
    Flag74 = 0x74,
}

impl FormatFlag {
    /// Every accepted flag value
    pub const ALLOWED: [u8; 2] = [0x54, 0x74];

    /// Parse from byte value
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            0x54 => Some(Self::Flag54),
            0x74 => Some(Self::Flag74),
            _ => None,
        }
    }

    /// Get the byte value
    pub fn as_byte(self) -> u8 {
        self as u8
    }

    fn mismatch(position: usize, actual: impl std::fmt::Display) -> CursorError {
        CursorError::mismatch(position, "0x54 or 0x74", actual)
    }

    /// Read the one-byte flag and its three reserved zero bytes
    pub(crate) fn read_padded<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<Self> {
        let position = reader.position();
        let value = reader.read_u8()?;
        let flag =
            Self::from_byte(value).ok_or_else(|| Self::mismatch(position, format!("{value:#X}")))?;
        reader.assert_bytes(&[0, 0, 0])?;
        Ok(flag)
    }

    /// Read the flag stored as a full 4-byte integer
    pub(crate) fn read_wide<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<Self> {
        let position = reader.position();
        let value = reader.read_u32()?;
        u8::try_from(value)
            .ok()
            .and_then(Self::from_byte)
            .ok_or_else(|| Self::mismatch(position, format!("{value:#X}")).into())
    }
}

fn read_signature<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<[u8; 8]> {
    let bytes = reader.read_bytes(8)?;
    let mut signature = [0u8; 8];
    signature.copy_from_slice(&bytes);
    Ok(signature)
}

fn check_entry_count(entry_count: u32) -> ArchiveResult<u32> {
    if entry_count == 0 {
        return Err(ArchiveError::EmptyArchive);
    }
    Ok(entry_count)
}

/// Fixed 32-byte header of a single-stream archive
///
/// ```text
/// 0x00  magic "BND3"
/// 0x04  signature (8 bytes, opaque)
/// 0x0C  format flag, 3 zero bytes
/// 0x10  entry count
/// 0x14  end of name table (excludes alignment padding)
/// 0x18  two reserved zero u32s
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BndHeader {
    /// Opaque signature, round-tripped verbatim
    pub signature: [u8; 8],
    /// Format flag
    pub flag: FormatFlag,
    /// Number of directory records
    pub entry_count: u32,
    /// Offset just past the last name
    pub name_end: u32,
}

impl BndHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 0x20;

    /// Read and validate the header
    pub fn read<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<Self> {
        reader.assert_magic(&BND3_MAGIC)?;
        let signature = read_signature(reader)?;
        let flag = FormatFlag::read_padded(reader)?;
        let entry_count = check_entry_count(reader.read_u32()?)?;
        let name_end = reader.read_u32()?;
        reader.assert_i32(0)?;
        reader.assert_i32(0)?;

        debug!(
            entry_count,
            flag = flag.as_byte(),
            name_end,
            "parsed BND3 header"
        );
        Ok(Self {
            signature,
            flag,
            entry_count,
            name_end,
        })
    }
}

/// Fixed 32-byte header of a split archive's header buffer
///
/// ```text
/// 0x00  magic "BHF3"
/// 0x04  signature (8 bytes, opaque)
/// 0x0C  format flag as u32
/// 0x10  entry count
/// 0x14  three reserved zero u32s
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitHeader {
    /// Opaque signature, repeated in the data buffer
    pub signature: [u8; 8],
    /// Format flag
    pub flag: FormatFlag,
    /// Number of directory records
    pub entry_count: u32,
}

impl SplitHeader {
    /// Encoded size in bytes
    pub const SIZE: usize = 0x20;

    /// Read and validate the header
    pub fn read<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<Self> {
        reader.assert_magic(&BHF3_MAGIC)?;
        let signature = read_signature(reader)?;
        let flag = FormatFlag::read_wide(reader)?;
        let entry_count = check_entry_count(reader.read_u32()?)?;
        reader.assert_i32(0)?;
        reader.assert_i32(0)?;
        reader.assert_i32(0)?;

        debug!(entry_count, flag = flag.as_byte(), "parsed BHF3 header");
        Ok(Self {
            signature,
            flag,
            entry_count,
        })
    }
}

/// Data-buffer preamble of a split archive: "BDF3", the header's signature,
/// and a reserved zero u32
pub(crate) fn read_data_preamble<B: AsRef<[u8]>>(
    reader: &mut ByteReader<B>,
    signature: &[u8; 8],
) -> ArchiveResult<()> {
    reader.assert_magic(&BDF3_MAGIC)?;
    reader.assert_magic(signature)?;
    reader.assert_i32(0)?;
    Ok(())
}
