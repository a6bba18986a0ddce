//! Binary cursor primitives shared by every container codec
//!
//! [`ByteReader`] gives sequential and positioned access to an in-memory
//! buffer; [`ByteWriter`] appends to one and keeps a [`PatchTable`] of named
//! placeholders for offsets that are only known after later data is written.
//!
//! Both cursors fix their byte order at construction and carry a
//! [`TextEncoding`] for embedded strings (Shift-JIS unless configured
//! otherwise). Magic values and signatures always use the single-byte Latin
//! encoding.
//!
//! # Assertion reads
//!
//! Every fixed field of every format is consumed through an `assert_*` read.
//! A mismatch fails immediately with [`CursorError::FormatMismatch`], which
//! carries the offset, the allowed values and the value found.
//!
//! ```rust
//! use dsformats::cursor::{ByteReader, ByteWriter};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut writer = ByteWriter::little_endian();
//! writer.write_ascii("BND3", false)?;
//! writer.reserve_u32("NameOffset")?;
//! writer.fill_position("NameOffset")?;
//! writer.write_encoded_string("a.txt", true)?;
//! let bytes = writer.finish()?;
//!
//! let mut reader = ByteReader::little_endian(bytes.as_slice());
//! reader.assert_magic(b"BND3")?;
//! let name_offset = reader.read_u32()? as usize;
//! assert_eq!(reader.get_encoded_string(name_offset)?, "a.txt");
//! # Ok(())
//! # }
//! ```

mod encoding;
mod error;
mod patch;
mod primitive;
mod reader;
mod writer;

pub use binrw::Endian;
pub use encoding::TextEncoding;
pub use error::{CursorError, CursorResult};
pub use patch::PatchTable;
pub use primitive::Primitive;
pub use reader::ByteReader;
pub use writer::{ByteWriter, checked_u32};
