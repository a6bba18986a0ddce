//! BND3 and BHF3/BDF3 archive containers
//!
//! Archives package named assets behind a fixed directory. Two variants
//! share the same 24-byte directory record:
//!
//! - **BND3**: one buffer holding header, directory, name table and data
//!   table, in that order.
//! - **BHF3/BDF3**: a header buffer holding header, directory and name table,
//!   plus a data buffer holding a short preamble and the data table. Record
//!   identifiers must equal their directory position.
//!
//! # Layout (BND3)
//!
//! ```text
//! 0x00                header (0x20 bytes)
//! 0x20                directory, count * 0x18 bytes
//! ...                 null-terminated Shift-JIS names, back to back
//! name_end            zero padding to 16 bytes
//! ...                 per entry: content bytes, zero padding to 16 bytes
//! ```
//!
//! All integers are little-endian. Every offset is absolute within the buffer
//! holding the table it points into.
//!
//! # Encoding
//!
//! Offsets are not known while the directory is written. The encoder reserves
//! a placeholder for each one, lays out the names and contents, and fills the
//! placeholders once the target positions are known. Re-encoding a decoded
//! archive with unchanged entry order reproduces the input byte for byte.
//!
//! ```rust
//! use dsformats::archive::{ArchiveBuilder, BndArchive};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let archive = ArchiveBuilder::new()
//!     .add_entry("a.txt", 0, vec![0x41])
//!     .add_entry("b.txt", 1, vec![0x42, 0x42])
//!     .build()?;
//!
//! let bytes = archive.build()?;
//! assert_eq!(BndArchive::parse(&bytes)?, archive);
//! # Ok(())
//! # }
//! ```

mod bnd;
mod builder;
mod entry;
mod error;
mod header;
mod split;

pub use bnd::BndArchive;
pub use builder::ArchiveBuilder;
pub use entry::{ArchiveEntry, DirectoryRecord, RECORD_MARKER};
pub use error::{ArchiveError, ArchiveResult};
pub use header::{
    BDF3_MAGIC, BHF3_MAGIC, BND3_MAGIC, BndHeader, DEFAULT_SIGNATURE, FormatFlag, SplitHeader,
};
pub use split::{SplitArchive, SplitBuffers};

/// Alignment of every data-table entry and of the data table itself
pub const DATA_ALIGNMENT: usize = 0x10;

/// Check if data starts with the BND3 magic
pub fn is_bnd(data: &[u8]) -> bool {
    data.starts_with(&BND3_MAGIC)
}

/// Check if data starts with the BHF3 magic
pub fn is_split_header(data: &[u8]) -> bool {
    data.starts_with(&BHF3_MAGIC)
}
