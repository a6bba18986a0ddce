//! Raw deflate of DCX payloads

use std::io::{Read, Write};

use flate2::Compression;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;

use super::error::{DcxError, DcxResult};
use super::header::DcxHeader;
use crate::cursor::CursorError;

/// Maximum accepted declared uncompressed size (1 GiB)
///
/// Checked before inflating so a forged header cannot force a huge
/// allocation.
pub const MAX_DECOMPRESSED_SIZE: usize = 1024 * 1024 * 1024;

/// Deflate `data` into a raw stream without zlib framing
pub fn deflate(data: &[u8], level: Compression) -> DcxResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), level);
    encoder.write_all(data).map_err(DcxError::Compression)?;
    encoder.finish().map_err(DcxError::Compression)
}

/// Inflate a raw deflate stream that must produce exactly `declared` bytes
///
/// Anything after the end of the deflate stream (such as a zlib checksum)
/// is ignored.
pub fn inflate(stream: &[u8], declared: u32) -> DcxResult<Vec<u8>> {
    let expected = declared as usize;
    if expected > MAX_DECOMPRESSED_SIZE {
        return Err(DcxError::PayloadTooLarge {
            declared,
            limit: MAX_DECOMPRESSED_SIZE,
        });
    }

    // One extra byte is enough to detect excess output
    let mut decoder = DeflateDecoder::new(stream).take(u64::from(declared) + 1);
    let mut inflated = Vec::new();
    decoder
        .read_to_end(&mut inflated)
        .map_err(DcxError::Decompression)?;

    if inflated.len() != expected {
        let actual = if inflated.len() > expected {
            format!("more than {expected} bytes")
        } else {
            format!("{} bytes", inflated.len())
        };
        return Err(CursorError::mismatch(
            DcxHeader::UNCOMPRESSED_SIZE_OFFSET,
            format!("{expected} bytes"),
            actual,
        )
        .into());
    }
    Ok(inflated)
}
