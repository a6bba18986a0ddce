//! Error types for archive operations

use thiserror::Error;

use crate::cursor::CursorError;

/// Archive operation result type
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Errors raised while decoding or encoding BND3 and BHF3/BDF3 archives
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// Failure in the underlying cursor (format mismatch, truncation, encoding)
    #[error(transparent)]
    Cursor(#[from] CursorError),

    /// The header declares zero entries, or an encode was asked for none
    #[error("archive contains no entries")]
    EmptyArchive,

    /// A split-archive directory record is out of sequence
    #[error("directory record {expected} carries sequence index {actual}")]
    SequenceMismatch {
        /// Position of the record in the directory
        expected: u32,
        /// Index stored in the record
        actual: i32,
    },

    /// A supplied signature is not exactly 8 bytes
    #[error("archive signature must be 8 bytes, got {0}")]
    InvalidSignature(usize),

    /// File system error from the path-based helpers
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ArchiveError {
    /// Check if the input failed a fixed-field assertion
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::Cursor(e) if e.is_format_mismatch())
    }

    /// Check if the input ended before a declared field or region
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::Cursor(e) if e.is_truncated())
    }

    /// Check if this error indicates malformed input rather than misuse or I/O
    pub fn is_corruption_error(&self) -> bool {
        match self {
            Self::Cursor(e) => e.is_format_mismatch() || e.is_truncated(),
            Self::EmptyArchive | Self::SequenceMismatch { .. } => true,
            Self::InvalidSignature(_) | Self::Io(_) => false,
        }
    }
}
