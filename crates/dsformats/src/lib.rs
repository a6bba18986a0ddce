//! Codecs for the container formats used to package game assets
//!
#![allow(clippy::cast_possible_truncation)] // Offsets and lengths are range-checked on encode
#![allow(clippy::cast_possible_wrap)] // Binary field reinterpretation
#![allow(clippy::cast_lossless)] // Sometimes clearer than From
#![allow(clippy::doc_markdown)] // Format names don't need backticks
#![allow(clippy::module_name_repetitions)] // Clear naming is preferred
#![allow(clippy::similar_names)] // Domain-specific naming patterns
#![allow(clippy::float_cmp)] // Binary format requirements
#![allow(clippy::return_self_not_must_use)] // Builder patterns
//! This crate decodes and re-encodes three fixed-layout binary containers:
//!
//! - **BND3**: single-stream archive of named entries
//! - **BHF3/BDF3**: split archive with the directory and data in separate
//!   buffers
//! - **DCX**: big-endian frame around a single deflate stream
//!
//! All three are built on the [`cursor`] module: an endian-aware
//! [`ByteReader`](cursor::ByteReader) whose assertion reads reject any
//! unrecognized fixed field, and a [`ByteWriter`](cursor::ByteWriter) that
//! patches forward references once their targets are known.
//!
//! # Design Principles
//!
//! - **Symmetric Operations**: every format parses and builds
//! - **Fail Fast**: the first mismatched constant aborts decoding; there is no
//!   partially decoded result
//! - **Round-Trip Guarantee**: re-encoding a decoded value reproduces its input
//!
//! Everything works on whole in-memory buffers. The path helpers read or
//! write complete files.

#![warn(missing_docs)]

/// BND3 and BHF3/BDF3 archives
///
/// See the [`archive`] module for the layout and the two-pass encoder.
pub mod archive;
pub mod cursor;
/// DCX deflate frames
pub mod dcx;

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
pub(crate) mod test_utils;

/// Common trait for formats that decode from and encode to a single buffer
pub trait DsFormat: Sized {
    /// Parse from bytes
    fn parse(data: &[u8]) -> Result<Self, Box<dyn std::error::Error>>;

    /// Build to bytes
    fn build(&self) -> Result<Vec<u8>, Box<dyn std::error::Error>>;

    /// Check that parsing then building reproduces `data` exactly
    fn verify_round_trip(data: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
        let parsed = Self::parse(data)?;
        let rebuilt = parsed.build()?;
        if data != rebuilt.as_slice() {
            return Err("round-trip verification failed".into());
        }
        Ok(())
    }
}
