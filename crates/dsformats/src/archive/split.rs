//! Split BHF3/BDF3 archives
//!
//! The header buffer holds the directory and the name table; the data buffer
//! holds a short preamble followed by the 16-byte-aligned contents. The two
//! buffers are only meaningful as a pair, so encoding produces both at once.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use super::DATA_ALIGNMENT;
use super::bnd::BndArchive;
use super::entry::{ArchiveEntry, DirectoryRecord, RECORD_MARKER, name_slot, record_capacity};
use super::error::{ArchiveError, ArchiveResult};
use super::header::{
    BDF3_MAGIC, BHF3_MAGIC, DEFAULT_SIGNATURE, FormatFlag, SplitHeader, read_data_preamble,
};
use crate::cursor::{ByteReader, ByteWriter, checked_u32};

/// Encoded header and data buffers of a split archive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitBuffers {
    /// Directory and name table (`BHF3`)
    pub header: Vec<u8>,
    /// Data table (`BDF3`)
    pub data: Vec<u8>,
}

/// Archive whose directory and data live in two separate buffers
///
/// Entry identifiers are the entries' positions in the directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitArchive {
    /// Opaque 8-byte signature, written to both buffers
    pub signature: [u8; 8],
    /// Format flag
    pub flag: FormatFlag,
    /// Entries in directory order
    pub entries: Vec<ArchiveEntry>,
}

impl SplitArchive {
    /// Create an archive with the default signature and flag
    ///
    /// Identifiers are renumbered to match directory positions.
    pub fn new(entries: Vec<ArchiveEntry>) -> ArchiveResult<Self> {
        if entries.is_empty() {
            return Err(ArchiveError::EmptyArchive);
        }
        Ok(Self {
            signature: DEFAULT_SIGNATURE,
            flag: FormatFlag::default(),
            entries: renumber(entries),
        })
    }

    /// Parse a header buffer together with its data buffer
    pub fn parse(header: &[u8], data: &[u8]) -> ArchiveResult<Self> {
        let mut header_reader = ByteReader::little_endian(header);
        let mut data_reader = ByteReader::little_endian(data);

        let split_header = SplitHeader::read(&mut header_reader)?;
        read_data_preamble(&mut data_reader, &split_header.signature)?;

        let mut entries = Vec::with_capacity(record_capacity(
            split_header.entry_count,
            header_reader.remaining(),
        ));
        for index in 0..split_header.entry_count {
            let record = DirectoryRecord::read(&mut header_reader)?;
            if i64::from(record.id) != i64::from(index) {
                return Err(ArchiveError::SequenceMismatch {
                    expected: index,
                    actual: record.id,
                });
            }
            entries.push(record.resolve_split(&mut header_reader, &mut data_reader)?);
        }

        debug!(entries = entries.len(), "parsed BHF3/BDF3 archive");
        Ok(Self {
            signature: split_header.signature,
            flag: split_header.flag,
            entries,
        })
    }

    /// Encode both buffers
    ///
    /// Every entry's identifier must equal its position, as the decoder
    /// requires. Either both buffers are produced or neither is.
    pub fn build(&self) -> ArchiveResult<SplitBuffers> {
        if self.entries.is_empty() {
            return Err(ArchiveError::EmptyArchive);
        }

        let mut header = ByteWriter::little_endian();
        let mut data = ByteWriter::little_endian();

        header.write_bytes(&BHF3_MAGIC)?;
        header.write_bytes(&self.signature)?;
        header.write_u32(u32::from(self.flag.as_byte()))?;
        header.write_u32(checked_u32("entry count", self.entries.len())?)?;
        header.write_u32(0)?;
        header.write_u32(0)?;
        header.write_u32(0)?;

        data.write_bytes(&BDF3_MAGIC)?;
        data.write_bytes(&self.signature)?;
        data.write_u32(0)?;

        for (index, entry) in self.entries.iter().enumerate() {
            let expected = checked_u32("sequence index", index)?;
            if i64::from(entry.id) != i64::from(expected) {
                return Err(ArchiveError::SequenceMismatch {
                    expected,
                    actual: entry.id,
                });
            }
            let length = checked_u32("entry length", entry.len())?;
            header.write_u32(RECORD_MARKER)?;
            header.write_u32(length)?;
            header.write_u32(checked_u32("data offset", data.position())?)?;
            header.write_i32(entry.id)?;
            header.reserve_u32(&name_slot(index))?;
            header.write_u32(length)?;

            data.write_bytes(&entry.data)?;
            data.pad(DATA_ALIGNMENT)?;
        }

        for (index, entry) in self.entries.iter().enumerate() {
            header.fill_position(&name_slot(index))?;
            header.write_encoded_string(&entry.name, true)?;
        }

        let buffers = SplitBuffers {
            header: header.finish()?,
            data: data.finish()?,
        };
        debug!(
            entries = self.entries.len(),
            header_size = buffers.header.len(),
            data_size = buffers.data.len(),
            "built BHF3/BDF3 archive"
        );
        Ok(buffers)
    }

    /// Read and parse a header file and its data file
    pub fn read_files(
        header_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> ArchiveResult<Self> {
        let header = std::fs::read(header_path)?;
        let data = std::fs::read(data_path)?;
        Self::parse(&header, &data)
    }

    /// Encode the archive and write both files
    ///
    /// Both buffers are encoded and staged next to their destinations before
    /// either destination is replaced. If either replacement fails, the
    /// previous pair is restored and no staging files are left behind.
    pub fn write_files(
        &self,
        header_path: impl AsRef<Path>,
        data_path: impl AsRef<Path>,
    ) -> ArchiveResult<()> {
        let buffers = self.build()?;
        let header_path = header_path.as_ref();
        let data_path = data_path.as_ref();
        let header_staging = sibling_path(header_path, STAGING_SUFFIX);
        let data_staging = sibling_path(data_path, STAGING_SUFFIX);

        let written = std::fs::write(&header_staging, &buffers.header)
            .and_then(|()| std::fs::write(&data_staging, &buffers.data))
            .and_then(|()| replace_pair(&header_staging, header_path, &data_staging, data_path));
        if let Err(e) = written {
            discard(&header_staging);
            discard(&data_staging);
            return Err(e.into());
        }
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
}

fn renumber(entries: Vec<ArchiveEntry>) -> Vec<ArchiveEntry> {
    entries
        .into_iter()
        .zip(0..)
        .map(|(entry, id)| ArchiveEntry { id, ..entry })
        .collect()
}

const STAGING_SUFFIX: &str = ".tmp";
const BACKUP_SUFFIX: &str = ".bak";

fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut sibling = OsString::from(path.as_os_str());
    sibling.push(suffix);
    PathBuf::from(sibling)
}

/// Move both staged files into place
///
/// The data file goes first, with any previous data file moved aside. The
/// header rename is the commit point: until it succeeds, a failure puts the
/// previous data file back and leaves the previous header untouched.
fn replace_pair(
    header_staging: &Path,
    header_path: &Path,
    data_staging: &Path,
    data_path: &Path,
) -> std::io::Result<()> {
    let backup = sibling_path(data_path, BACKUP_SUFFIX);
    let had_data = data_path.is_file();
    if had_data {
        std::fs::rename(data_path, &backup)?;
    }

    if let Err(e) = std::fs::rename(data_staging, data_path) {
        if had_data {
            restore(&backup, data_path);
        }
        return Err(e);
    }

    if let Err(e) = std::fs::rename(header_staging, header_path) {
        if had_data {
            restore(&backup, data_path);
        } else {
            discard(data_path);
        }
        return Err(e);
    }

    if had_data {
        discard(&backup);
    }
    Ok(())
}

fn restore(backup: &Path, path: &Path) {
    if let Err(e) = std::fs::rename(backup, path) {
        warn!(
            backup = %backup.display(),
            path = %path.display(),
            error = %e,
            "failed to restore previous file"
        );
    }
}

fn discard(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            warn!(path = %path.display(), error = %e, "failed to remove file");
        }
    }
}

impl From<BndArchive> for SplitArchive {
    fn from(archive: BndArchive) -> Self {
        Self {
            signature: archive.signature,
            flag: archive.flag,
            entries: renumber(archive.entries),
        }
    }
}

impl From<SplitArchive> for BndArchive {
    fn from(archive: SplitArchive) -> Self {
        Self {
            signature: archive.signature,
            flag: archive.flag,
            entries: renumber(archive.entries),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample() -> SplitArchive {
        SplitArchive::new(vec![
            ArchiveEntry::new("map\\m10.msb", 0, vec![7; 20]),
            ArchiveEntry::new("map\\m11.msb", 0, vec![8; 3]),
        ])
        .expect("non-empty")
    }

    fn u32_at(bytes: &[u8], offset: usize) -> u32 {
        u32::from_le_bytes(bytes[offset..offset + 4].try_into().expect("4 bytes"))
    }

    #[test]
    fn test_new_renumbers() {
        let archive = sample();
        assert_eq!(archive.entries[0].id, 0);
        assert_eq!(archive.entries[1].id, 1);
    }

    #[test]
    fn test_layout() {
        let buffers = sample().build().expect("build");

        assert_eq!(&buffers.header[..4], b"BHF3");
        assert_eq!(&buffers.header[4..12], b"07D7R6\0\0");
        assert_eq!(u32_at(&buffers.header, 12), 0x74);
        assert_eq!(u32_at(&buffers.header, 16), 2);

        assert_eq!(&buffers.data[..12], b"BDF307D7R6\0\0");
        assert_eq!(u32_at(&buffers.data, 12), 0);

        let first = SplitHeader::SIZE;
        let second = first + DirectoryRecord::SIZE;
        assert_eq!(u32_at(&buffers.header, first + 8), 0x10);
        assert_eq!(u32_at(&buffers.header, first + 12), 0);
        assert_eq!(u32_at(&buffers.header, second + 8), 0x30);
        assert_eq!(u32_at(&buffers.header, second + 12), 1);

        // Name table follows the directory in the header buffer
        let names = second + DirectoryRecord::SIZE;
        assert_eq!(u32_at(&buffers.header, first + 16) as usize, names);
        assert_eq!(buffers.header.len(), names + 24);

        assert_eq!(buffers.data.len(), 0x40);
        assert_eq!(&buffers.data[0x30..0x33], [8, 8, 8]);
    }

    #[test]
    fn test_round_trip() {
        let archive = sample();
        let buffers = archive.build().expect("build");
        let parsed = SplitArchive::parse(&buffers.header, &buffers.data).expect("parse");
        assert_eq!(parsed, archive);
        assert_eq!(parsed.build().expect("rebuild"), buffers);
    }

    #[test]
    fn test_sequence_mismatch() {
        let mut buffers = sample().build().expect("build");
        let second_id = SplitHeader::SIZE + DirectoryRecord::SIZE + 12;
        buffers.header[second_id..second_id + 4].copy_from_slice(&5u32.to_le_bytes());

        let err = SplitArchive::parse(&buffers.header, &buffers.data).expect_err("out of order");
        assert!(matches!(
            err,
            ArchiveError::SequenceMismatch {
                expected: 1,
                actual: 5
            }
        ));
        assert!(err.is_corruption_error());
    }

    #[test]
    fn test_build_rejects_identifiers_out_of_sequence() {
        let archive = SplitArchive {
            signature: DEFAULT_SIGNATURE,
            flag: FormatFlag::default(),
            entries: vec![
                ArchiveEntry::new("a", 7, vec![1]),
                ArchiveEntry::new("b", 9, vec![2]),
            ],
        };
        assert!(matches!(
            archive.build(),
            Err(ArchiveError::SequenceMismatch {
                expected: 0,
                actual: 7
            })
        ));

        let mut archive = sample();
        archive.entries[1].id = -1;
        assert!(matches!(
            archive.build(),
            Err(ArchiveError::SequenceMismatch {
                expected: 1,
                actual: -1
            })
        ));
    }

    #[test]
    fn test_signature_must_match_across_buffers() {
        let mut buffers = sample().build().expect("build");
        buffers.data[4] = b'X';
        let err = SplitArchive::parse(&buffers.header, &buffers.data).expect_err("signatures differ");
        assert!(err.is_format_mismatch());
    }

    #[test]
    fn test_swapped_buffers() {
        let buffers = sample().build().expect("build");
        let err = SplitArchive::parse(&buffers.data, &buffers.header).expect_err("swapped");
        assert!(err.is_format_mismatch());
    }

    #[test]
    fn test_empty() {
        assert!(matches!(
            SplitArchive::new(Vec::new()),
            Err(ArchiveError::EmptyArchive)
        ));
    }

    #[test]
    fn test_conversions() {
        let bnd = BndArchive {
            signature: *b"09G17X51",
            flag: FormatFlag::Flag54,
            entries: vec![
                ArchiveEntry::new("a", 100, vec![1]),
                ArchiveEntry::new("b", 200, vec![2]),
            ],
        };
        let split = SplitArchive::from(bnd.clone());
        assert_eq!(split.signature, bnd.signature);
        assert_eq!(split.flag, FormatFlag::Flag54);
        assert_eq!(split.entries[1].id, 1);
        assert_eq!(split.entries[1].data, vec![2]);

        let back = BndArchive::from(split);
        assert_eq!(back.entries[0].id, 0);
        assert_eq!(back.find("a").expect("present").data, vec![1]);
    }

    #[test]
    fn test_file_round_trip() {
        let dir = tempfile::tempdir().expect("temp dir");
        let header_path = dir.path().join("chr.chrbdt.bhd");
        let data_path = dir.path().join("chr.chrbdt");

        let archive = sample();
        archive.write_files(&header_path, &data_path).expect("write");
        assert!(!sibling_path(&header_path, STAGING_SUFFIX).exists());
        assert!(!sibling_path(&data_path, STAGING_SUFFIX).exists());
        assert!(!sibling_path(&data_path, BACKUP_SUFFIX).exists());
        assert_eq!(
            SplitArchive::read_files(&header_path, &data_path).expect("read"),
            archive
        );
    }

    fn dir_listing(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("dir entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    fn replacement() -> SplitArchive {
        SplitArchive::new(vec![ArchiveEntry::new("other.msb", 0, vec![9; 40])]).expect("non-empty")
    }

    #[test]
    fn test_failed_data_rename_keeps_previous_header() {
        let dir = tempfile::tempdir().expect("temp dir");
        let header_path = dir.path().join("a.bhd");
        let data_path = dir.path().join("a.bdt");
        sample().write_files(&header_path, &data_path).expect("write");
        let old_header = std::fs::read(&header_path).expect("read header");

        // A non-empty directory cannot be replaced by a file
        std::fs::remove_file(&data_path).expect("remove data");
        std::fs::create_dir(&data_path).expect("create dir");
        std::fs::write(data_path.join("keep"), b"x").expect("write keep");

        let err = replacement()
            .write_files(&header_path, &data_path)
            .expect_err("data destination is a directory");
        assert!(matches!(err, ArchiveError::Io(_)));
        assert_eq!(std::fs::read(&header_path).expect("read header"), old_header);
        assert_eq!(dir_listing(dir.path()), vec!["a.bdt", "a.bhd"]);
    }

    #[test]
    fn test_failed_header_rename_restores_previous_data() {
        let dir = tempfile::tempdir().expect("temp dir");
        let header_path = dir.path().join("a.bhd");
        let data_path = dir.path().join("a.bdt");
        sample().write_files(&header_path, &data_path).expect("write");
        let old_data = std::fs::read(&data_path).expect("read data");

        std::fs::remove_file(&header_path).expect("remove header");
        std::fs::create_dir(&header_path).expect("create dir");
        std::fs::write(header_path.join("keep"), b"x").expect("write keep");

        let err = replacement()
            .write_files(&header_path, &data_path)
            .expect_err("header destination is a directory");
        assert!(matches!(err, ArchiveError::Io(_)));
        assert_eq!(std::fs::read(&data_path).expect("read data"), old_data);
        assert_eq!(dir_listing(dir.path()), vec!["a.bdt", "a.bhd"]);
    }

    #[test]
    fn test_failed_header_rename_without_previous_pair() {
        let dir = tempfile::tempdir().expect("temp dir");
        let header_path = dir.path().join("a.bhd");
        let data_path = dir.path().join("a.bdt");
        std::fs::create_dir(&header_path).expect("create dir");
        std::fs::write(header_path.join("keep"), b"x").expect("write keep");

        replacement()
            .write_files(&header_path, &data_path)
            .expect_err("header destination is a directory");
        assert!(!data_path.exists());
        assert_eq!(dir_listing(dir.path()), vec!["a.bhd"]);
    }
}
