//! Archive builder

use super::bnd::BndArchive;
use super::entry::ArchiveEntry;
use super::error::{ArchiveError, ArchiveResult};
use super::header::{DEFAULT_SIGNATURE, FormatFlag};
use super::split::SplitArchive;

/// Builder for BND3 and split archives
#[derive(Debug, Clone)]
pub struct ArchiveBuilder {
    signature: Vec<u8>,
    flag: FormatFlag,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveBuilder {
    /// Create a builder with the default signature and flag
    pub fn new() -> Self {
        Self {
            signature: DEFAULT_SIGNATURE.to_vec(),
            flag: FormatFlag::default(),
            entries: Vec::new(),
        }
    }

    /// Set the signature; must be exactly 8 bytes when built
    #[must_use]
    pub fn signature(mut self, signature: impl AsRef<[u8]>) -> Self {
        self.signature = signature.as_ref().to_vec();
        self
    }

    /// Set the format flag
    #[must_use]
    pub fn flag(mut self, flag: FormatFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Append an entry
    #[must_use]
    pub fn add_entry(mut self, name: impl Into<String>, id: i32, data: impl Into<Vec<u8>>) -> Self {
        self.entries.push(ArchiveEntry::new(name, id, data));
        self
    }

    /// Append a pre-built entry
    #[must_use]
    pub fn entry(mut self, entry: ArchiveEntry) -> Self {
        self.entries.push(entry);
        self
    }

    fn validated(self) -> ArchiveResult<([u8; 8], FormatFlag, Vec<ArchiveEntry>)> {
        let signature = <[u8; 8]>::try_from(self.signature.as_slice())
            .map_err(|_| ArchiveError::InvalidSignature(self.signature.len()))?;
        if self.entries.is_empty() {
            return Err(ArchiveError::EmptyArchive);
        }
        Ok((signature, self.flag, self.entries))
    }

    /// Build a single-stream archive
    pub fn build(self) -> ArchiveResult<BndArchive> {
        let (signature, flag, entries) = self.validated()?;
        Ok(BndArchive {
            signature,
            flag,
            entries,
        })
    }

    /// Build a split archive, numbering entries by position
    pub fn build_split(self) -> ArchiveResult<SplitArchive> {
        let (signature, flag, entries) = self.validated()?;
        let mut archive = SplitArchive::new(entries)?;
        archive.signature = signature;
        archive.flag = flag;
        Ok(archive)
    }
}

impl Default for ArchiveBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let archive = ArchiveBuilder::new()
            .add_entry("a.txt", 10, vec![0x41])
            .build()
            .expect("valid archive");

        assert_eq!(archive.signature, DEFAULT_SIGNATURE);
        assert_eq!(archive.flag, FormatFlag::Flag74);
        assert_eq!(archive.entries[0].id, 10);
    }

    #[test]
    fn test_builder_custom() {
        let split = ArchiveBuilder::default()
            .signature(b"09G17X51")
            .flag(FormatFlag::Flag54)
            .add_entry("a", 10, vec![1])
            .entry(ArchiveEntry::new("b", 20, vec![2]))
            .build_split()
            .expect("valid archive");

        assert_eq!(&split.signature, b"09G17X51");
        assert_eq!(split.flag, FormatFlag::Flag54);
        assert_eq!(
            split.entries.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![0, 1]
        );
    }

    #[test]
    fn test_builder_rejects_bad_signature() {
        let err = ArchiveBuilder::new()
            .signature("short")
            .add_entry("a", 0, vec![1])
            .build()
            .expect_err("5-byte signature");
        assert!(matches!(err, ArchiveError::InvalidSignature(5)));
    }

    #[test]
    fn test_builder_rejects_empty() {
        assert!(matches!(
            ArchiveBuilder::new().build(),
            Err(ArchiveError::EmptyArchive)
        ));
        assert!(matches!(
            ArchiveBuilder::new().build_split(),
            Err(ArchiveError::EmptyArchive)
        ));
    }
}
