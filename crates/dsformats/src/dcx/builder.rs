//! DCX frame builder

use flate2::Compression;
use tracing::debug;

use super::DcxFrame;
use super::compression::deflate;
use super::error::DcxResult;
use super::header::DcxHeader;

/// Builder for DCX frames
///
/// The default level is [`Compression::best()`], the level whose zlib header
/// is the `78 DA` marker every frame carries.
#[derive(Debug, Clone, Copy)]
pub struct DcxBuilder {
    level: Compression,
}

impl DcxBuilder {
    /// Create a builder at the default level
    pub fn new() -> Self {
        Self {
            level: Compression::best(),
        }
    }

    /// Set the deflate level
    #[must_use]
    pub fn level(mut self, level: Compression) -> Self {
        self.level = level;
        self
    }

    /// Deflate `data` into a frame
    pub fn frame(&self, data: &[u8]) -> DcxResult<DcxFrame> {
        let payload = deflate(data, self.level)?;
        let header = DcxHeader::for_payload(data.len(), payload.len())?;
        debug!(
            uncompressed = data.len(),
            compressed = header.compressed_size,
            level = self.level.level(),
            "compressed DCX payload"
        );
        Ok(DcxFrame { header, payload })
    }

    /// Deflate `data` and encode the frame
    pub fn compress(&self, data: &[u8]) -> DcxResult<Vec<u8>> {
        self.frame(data)?.build()
    }
}

impl Default for DcxBuilder {
    fn default() -> Self {
        Self::new()
    }
}
