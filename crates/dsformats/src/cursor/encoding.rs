//! Text encodings used by embedded strings

use std::borrow::Cow;

use encoding_rs::{SHIFT_JIS, UTF_16LE, WINDOWS_1252};
use tracing::warn;

use super::error::{CursorError, CursorResult};

/// Text encoding applied to string fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextEncoding {
    /// Double-byte Japanese encoding used for entry names and descriptions
    #[default]
    ShiftJis,
    /// Single-byte Latin encoding used for magic values and signatures
    Latin1,
    /// UTF-16, little-endian code units
    Utf16Le,
}

impl TextEncoding {
    /// Human-readable encoding name
    pub fn name(self) -> &'static str {
        match self {
            Self::ShiftJis => SHIFT_JIS.name(),
            Self::Latin1 => WINDOWS_1252.name(),
            Self::Utf16Le => UTF_16LE.name(),
        }
    }

    /// Width of the null terminator in bytes
    pub fn terminator_width(self) -> usize {
        match self {
            Self::ShiftJis | Self::Latin1 => 1,
            Self::Utf16Le => 2,
        }
    }

    /// Decode raw bytes, substituting U+FFFD for malformed sequences
    pub fn decode(self, bytes: &[u8]) -> String {
        let encoding = match self {
            Self::ShiftJis => SHIFT_JIS,
            Self::Latin1 => WINDOWS_1252,
            Self::Utf16Le => UTF_16LE,
        };

        let (text, had_errors) = encoding.decode_without_bom_handling(bytes);
        if had_errors {
            warn!(
                encoding = encoding.name(),
                len = bytes.len(),
                "malformed text replaced during decode"
            );
        }
        text.into_owned()
    }

    /// Encode text, failing if any character has no mapping
    pub fn encode(self, text: &str) -> CursorResult<Cow<'_, [u8]>> {
        let encoding = match self {
            Self::ShiftJis => SHIFT_JIS,
            Self::Latin1 => WINDOWS_1252,
            // encoding_rs only encodes to UTF-8 for UTF-16 labels
            Self::Utf16Le => {
                return Ok(Cow::Owned(
                    text.encode_utf16().flat_map(u16::to_le_bytes).collect(),
                ));
            }
        };

        let (bytes, _, unmappable) = encoding.encode(text);
        if unmappable {
            return Err(CursorError::UnmappableText {
                encoding: encoding.name(),
                text: text.to_string(),
            });
        }
        Ok(bytes)
    }
}
