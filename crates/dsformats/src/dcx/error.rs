//! DCX error types

use thiserror::Error;

use crate::cursor::CursorError;

/// DCX operation result type
pub type DcxResult<T> = Result<T, DcxError>;

/// Errors raised while framing or unframing DCX data
#[derive(Debug, Error)]
pub enum DcxError {
    /// Header constant, size field or payload length mismatch, or truncation
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// The deflate stream could not be inflated
    #[error("decompression failed: {0}")]
    Decompression(#[source] std::io::Error),

    /// The deflate encoder failed
    #[error("compression failed: {0}")]
    Compression(#[source] std::io::Error),

    /// Declared uncompressed size exceeds the decompression limit
    #[error("declared uncompressed size {declared} exceeds limit of {limit} bytes")]
    PayloadTooLarge {
        /// Size from the header
        declared: u32,
        /// Maximum accepted size
        limit: usize,
    },

    /// File system error from the path-based helpers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DcxError {
    /// Check if the frame failed a fixed-field or size assertion
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::Cursor(e) if e.is_format_mismatch())
    }

    /// Check if the input ended before the declared payload
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Cursor(e) if e.is_truncated())
    }

    /// Check if this error indicates a malformed frame
    pub fn is_corruption_error(&self) -> bool {
        match self {
            Self::Cursor(e) => e.is_format_mismatch() || e.is_truncated(),
            Self::Decompression(_) | Self::PayloadTooLarge { .. } => true,
            Self::Compression(_) | Self::Io(_) => false,
        }
    }
}
