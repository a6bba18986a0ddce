//! DCX compression frames
//!
//! A DCX file wraps a single deflate stream in a fixed, big-endian frame of
//! nested sub-headers (`DCX`, `DCS`, `DCP`/`DFLT`, `DCA`). The frame declares
//! both the inflated size and the compressed size, the latter counting the
//! two zlib marker bytes (`78 DA`) that precede the raw deflate stream.
//!
//! Only one framing profile is supported. Any structural constant that
//! differs from it fails decoding with a format mismatch.
//!
//! ```rust
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let framed = dsformats::dcx::compress(b"hello")?;
//! assert!(dsformats::dcx::is_dcx(&framed));
//! assert_eq!(dsformats::dcx::decompress(&framed)?, b"hello");
//! # Ok(())
//! # }
//! ```

mod builder;
mod compression;
mod error;
mod header;

pub use builder::DcxBuilder;
pub use compression::{MAX_DECOMPRESSED_SIZE, deflate, inflate};
pub use error::{DcxError, DcxResult};
pub use header::{
    ALGORITHM, DATA_HEADER_LENGTH, DCA_MAGIC, DCP_MAGIC, DCS_MAGIC, DCX_MAGIC, DEFLATE_MARKER,
    DcxHeader, FRAME_CONSTANTS, HEADER_LENGTH, PARAMETER_CONSTANTS,
};

use std::path::Path;

use tracing::debug;

use crate::DsFormat;
use crate::cursor::{ByteReader, ByteWriter};

/// A decoded frame: header plus the raw deflate stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DcxFrame {
    /// Frame header
    pub header: DcxHeader,
    /// Raw deflate stream, without the marker bytes
    pub payload: Vec<u8>,
}

impl DcxFrame {
    /// Parse a frame without inflating it
    ///
    /// Fails with `TruncatedInput` if the declared compressed size runs past
    /// the end of the input.
    pub fn parse(data: &[u8]) -> DcxResult<Self> {
        let mut reader = ByteReader::big_endian(data);
        let header = DcxHeader::read(&mut reader)?;
        reader.assert_bytes(&DEFLATE_MARKER)?;
        let payload = reader.read_bytes(header.deflated_len())?;
        Ok(Self { header, payload })
    }

    /// Encode the frame
    ///
    /// The compressed size is taken from the payload; the other header fields
    /// are written as stored.
    pub fn build(&self) -> DcxResult<Vec<u8>> {
        let header = DcxHeader {
            compressed_size: DcxHeader::for_payload(0, self.payload.len())?.compressed_size,
            ..self.header
        };

        let mut writer = ByteWriter::big_endian();
        header.write(&mut writer)?;
        writer.write_bytes(&DEFLATE_MARKER)?;
        writer.write_bytes(&self.payload)?;
        Ok(writer.finish()?)
    }

    /// Inflate the payload, checking it against the declared size
    pub fn decompress(&self) -> DcxResult<Vec<u8>> {
        let data = inflate(&self.payload, self.header.uncompressed_size)?;
        debug!(
            compressed = self.header.compressed_size,
            uncompressed = data.len(),
            "decompressed DCX payload"
        );
        Ok(data)
    }
}

impl DsFormat for DcxFrame {
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>> {
        Ok(Self::parse(data)?)
    }

    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
        Ok(self.build()?)
    }
}

/// Compress `data` into a DCX frame at the default level
pub fn compress(data: &[u8]) -> DcxResult<Vec<u8>> {
    DcxBuilder::new().compress(data)
}

/// Decode a DCX frame and inflate its payload
pub fn decompress(data: &[u8]) -> DcxResult<Vec<u8>> {
    DcxFrame::parse(data)?.decompress()
}

/// Check if data starts with the DCX magic
pub fn is_dcx(data: &[u8]) -> bool {
    data.starts_with(&DCX_MAGIC)
}

/// Read a DCX file and inflate its payload
pub fn decompress_file(path: impl AsRef<Path>) -> DcxResult<Vec<u8>> {
    let data = std::fs::read(path)?;
    decompress(&data)
}

/// Compress `data` and write the frame to `path`
pub fn compress_to_file(data: &[u8], path: impl AsRef<Path>) -> DcxResult<()> {
    let framed = compress(data)?;
    std::fs::write(path, framed)?;
    Ok(())
}
