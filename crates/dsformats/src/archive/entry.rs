//! Archive entries and directory records

use super::error::ArchiveResult;
use crate::cursor::ByteReader;

/// Constant opening every directory record
pub const RECORD_MARKER: u32 = 0x40;

/// A named asset stored in an archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    /// Entry name, stored Shift-JIS encoded and null-terminated
    pub name: String,
    /// Numeric identifier; free-form in BND3, the directory position in BHF3
    pub id: i32,
    /// Raw content
    pub data: Vec<u8>,
}

impl ArchiveEntry {
    /// Create a new entry
    pub fn new(name: impl Into<String>, id: i32, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            id,
            data: data.into(),
        }
    }

    /// Content length in bytes
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the entry has no content
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// One fixed 24-byte directory record
///
/// ```text
/// 0x00  marker 0x40
/// 0x04  content length
/// 0x08  content offset
/// 0x0C  identifier
/// 0x10  name offset
/// 0x14  content length, repeated
/// ```
///
/// The second length has no known purpose; it must equal the first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryRecord {
    /// Content length
    pub length: u32,
    /// Content offset in the buffer holding the data table
    pub offset: u32,
    /// Identifier or sequence index
    pub id: i32,
    /// Name offset in the buffer holding the name table
    pub name_offset: u32,
}

impl DirectoryRecord {
    /// Encoded size in bytes
    pub const SIZE: usize = 0x18;

    /// Read one record
    pub fn read<B: AsRef<[u8]>>(reader: &mut ByteReader<B>) -> ArchiveResult<Self> {
        reader.assert_u32(&[RECORD_MARKER])?;
        let length = reader.read_u32()?;
        let offset = reader.read_u32()?;
        let id = reader.read_i32()?;
        let name_offset = reader.read_u32()?;
        reader.assert_u32(&[length])?;

        Ok(Self {
            length,
            offset,
            id,
            name_offset,
        })
    }

    /// Fetch the entry from a buffer holding both name and data tables
    ///
    /// Out-of-range offsets fail with `TruncatedInput`.
    pub fn resolve_in<B: AsRef<[u8]>>(
        &self,
        buffer: &mut ByteReader<B>,
    ) -> ArchiveResult<ArchiveEntry> {
        let name = buffer.get_encoded_string(self.name_offset as usize)?;
        let data = buffer.get_bytes(self.offset as usize, self.length as usize)?;
        Ok(self.entry(name, data))
    }

    /// Fetch the entry with the name and data tables in separate buffers
    pub fn resolve_split<N, C>(
        &self,
        names: &mut ByteReader<N>,
        contents: &mut ByteReader<C>,
    ) -> ArchiveResult<ArchiveEntry>
    where
        N: AsRef<[u8]>,
        C: AsRef<[u8]>,
    {
        let name = names.get_encoded_string(self.name_offset as usize)?;
        let data = contents.get_bytes(self.offset as usize, self.length as usize)?;
        Ok(self.entry(name, data))
    }

    fn entry(&self, name: String, data: Vec<u8>) -> ArchiveEntry {
        ArchiveEntry {
            name,
            id: self.id,
            data,
        }
    }
}

/// Upper bound for pre-allocating `count` records from untrusted input
pub(crate) fn record_capacity(count: u32, remaining: usize) -> usize {
    (count as usize).min(remaining / DirectoryRecord::SIZE)
}

/// Patch-table key for an entry's name offset
pub(crate) fn name_slot(index: usize) -> String {
    format!("FileName{index}")
}

/// Patch-table key for an entry's content offset
pub(crate) fn data_slot(index: usize) -> String {
    format!("FileData{index}")
}
