//! Single-stream BND3 archives

use std::path::Path;

use tracing::debug;

use super::entry::{
    ArchiveEntry, DirectoryRecord, RECORD_MARKER, data_slot, name_slot, record_capacity,
};
use super::error::{ArchiveError, ArchiveResult};
use super::header::{BND3_MAGIC, BndHeader, DEFAULT_SIGNATURE, FormatFlag};
use super::DATA_ALIGNMENT;
use crate::DsFormat;
use crate::cursor::{ByteReader, ByteWriter, checked_u32};

const NAME_END_SLOT: &str = "NameEnd";

/// BND3 archive: header, directory, name table and data table in one buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BndArchive {
    /// Opaque 8-byte signature, round-tripped verbatim
    pub signature: [u8; 8],
    /// Format flag
    pub flag: FormatFlag,
    /// Entries in directory order
    pub entries: Vec<ArchiveEntry>,
}

impl BndArchive {
    /// Create an archive with the default signature and flag
    pub fn new(entries: Vec<ArchiveEntry>) -> ArchiveResult<Self> {
        if entries.is_empty() {
            return Err(ArchiveError::EmptyArchive);
        }
        Ok(Self {
            signature: DEFAULT_SIGNATURE,
            flag: FormatFlag::default(),
            entries,
        })
    }

    /// Parse an archive
    ///
    /// The directory is read sequentially; names and contents are fetched
    /// through positioned reads, so the tables may appear in any order.
    pub fn parse(data: &[u8]) -> ArchiveResult<Self> {
        let mut reader = ByteReader::little_endian(data);
        let header = BndHeader::read(&mut reader)?;

        let mut entries =
            Vec::with_capacity(record_capacity(header.entry_count, reader.remaining()));
        for _ in 0..header.entry_count {
            let record = DirectoryRecord::read(&mut reader)?;
            entries.push(record.resolve_in(&mut reader)?);
        }

        debug!(entries = entries.len(), "parsed BND3 archive");
        Ok(Self {
            signature: header.signature,
            flag: header.flag,
            entries,
        })
    }

    /// Encode the archive
    ///
    /// Offsets are written as placeholders in the header and directory, then
    /// filled once the name and data tables are laid out.
    pub fn build(&self) -> ArchiveResult<Vec<u8>> {
        if self.entries.is_empty() {
            return Err(ArchiveError::EmptyArchive);
        }

        let mut writer = ByteWriter::little_endian();

        writer.write_bytes(&BND3_MAGIC)?;
        writer.write_bytes(&self.signature)?;
        writer.write_u8(self.flag.as_byte())?;
        writer.write_bytes(&[0; 3])?;
        writer.write_u32(checked_u32("entry count", self.entries.len())?)?;
        writer.reserve_u32(NAME_END_SLOT)?;
        writer.write_u32(0)?;
        writer.write_u32(0)?;

        for (index, entry) in self.entries.iter().enumerate() {
            let length = checked_u32("entry length", entry.len())?;
            writer.write_u32(RECORD_MARKER)?;
            writer.write_u32(length)?;
            writer.reserve_u32(&data_slot(index))?;
            writer.write_i32(entry.id)?;
            writer.reserve_u32(&name_slot(index))?;
            writer.write_u32(length)?;
        }

        for (index, entry) in self.entries.iter().enumerate() {
            writer.fill_position(&name_slot(index))?;
            writer.write_encoded_string(&entry.name, true)?;
        }
        // Recorded end excludes the alignment padding
        writer.fill_position(NAME_END_SLOT)?;
        writer.pad(DATA_ALIGNMENT)?;

        for (index, entry) in self.entries.iter().enumerate() {
            writer.fill_position(&data_slot(index))?;
            writer.write_bytes(&entry.data)?;
            writer.pad(DATA_ALIGNMENT)?;
        }

        let bytes = writer.finish()?;
        debug!(
            entries = self.entries.len(),
            size = bytes.len(),
            "built BND3 archive"
        );
        Ok(bytes)
    }

    /// Read and parse an archive file
    pub fn read_file(path: impl AsRef<Path>) -> ArchiveResult<Self> {
        let data = std::fs::read(path)?;
        Self::parse(&data)
    }

    /// Encode the archive and write it to `path`
    pub fn write_file(&self, path: impl AsRef<Path>) -> ArchiveResult<()> {
        let bytes = self.build()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// First entry with the given name
    pub fn find(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the archive has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Signature decoded as Latin text
    pub fn signature_text(&self) -> String {
        crate::cursor::TextEncoding::Latin1.decode(&self.signature)
    }
}

impl DsFormat for BndArchive {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.build()?)
    }
}
