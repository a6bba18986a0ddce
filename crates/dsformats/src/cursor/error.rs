//! Cursor error types

use std::fmt::Display;

use thiserror::Error;

/// Errors raised by [`ByteReader`](super::ByteReader) and
/// [`ByteWriter`](super::ByteWriter)
#[derive(Debug, Error)]
pub enum CursorError {
    /// A fixed or magic field did not hold any of its allowed values
    #[error("format mismatch at offset {position:#X}: expected {expected}, got {actual}")]
    FormatMismatch {
        /// Offset the mismatched field was read from
        position: usize,
        /// Allowed value(s)
        expected: String,
        /// Value actually present
        actual: String,
    },

    /// Fewer bytes remain than the read requires
    #[error("truncated input at offset {position:#X}: need {needed} bytes, {available} available")]
    TruncatedInput {
        /// Offset the read started at
        position: usize,
        /// Bytes required
        needed: usize,
        /// Bytes left in the buffer
        available: usize,
    },

    /// A reservation name was registered twice
    #[error("reservation already registered: {0}")]
    DuplicateReservation(String),

    /// A reservation was filled without being registered, or never filled
    #[error("unresolved reservation: {0}")]
    UnresolvedReservation(String),

    /// A reservation was filled with a value of a different width
    #[error("reservation {name} holds {reserved} bytes, cannot fill with {requested} bytes")]
    ReservationWidthMismatch {
        /// Reservation name
        name: String,
        /// Placeholder width
        reserved: usize,
        /// Width of the fill value
        requested: usize,
    },

    /// Text contains characters the target encoding cannot represent
    #[error("text cannot be encoded as {encoding}: {text:?}")]
    UnmappableText {
        /// Encoding name
        encoding: &'static str,
        /// Offending text
        text: String,
    },

    /// A length or offset does not fit its on-disk field
    #[error("{what} out of range: {value}")]
    ValueOutOfRange {
        /// Which quantity overflowed
        what: &'static str,
        /// The value that did not fit
        value: usize,
    },

    /// I/O error from the in-memory buffer
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Binary parsing error
    #[error("binary parsing error: {0}")]
    BinRw(#[from] binrw::Error),
}

/// Result type for cursor operations
pub type CursorResult<T> = Result<T, CursorError>;

impl CursorError {
    /// Build a format mismatch from any displayable expected/actual pair
    pub fn mismatch(position: usize, expected: impl Display, actual: impl Display) -> Self {
        Self::FormatMismatch {
            position,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Check if the input failed a fixed-field assertion
    pub fn is_format_mismatch(&self) -> bool {
        matches!(self, Self::FormatMismatch { .. })
    }

    /// Check if the input ended early
    pub fn is_truncated(&self) -> bool {
        matches!(self, Self::TruncatedInput { .. })
    }

    /// Check if the error comes from misuse of the writer patch table rather
    /// than from the input
    pub fn is_programmer_error(&self) -> bool {
        matches!(
            self,
            Self::DuplicateReservation(_)
                | Self::UnresolvedReservation(_)
                | Self::ReservationWidthMismatch { .. }
        )
    }
}
