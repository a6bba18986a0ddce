//! Shared round-trip helpers for format tests

use crate::DsFormat;
use std::fmt::Debug;

/// Build `original`, parse the result, and compare with `original`
pub fn test_round_trip<T>(original: &T) -> Result<(), Box<dyn std::error::Error>>
where
    T: DsFormat + PartialEq + Debug,
{
    let data = original.build()?;
    let parsed = T::parse(&data)?;

    if original != &parsed {
        return Err(format!(
            "round trip changed the value:\noriginal: {original:?}\nparsed: {parsed:?}"
        )
        .into());
    }
    Ok(())
}

/// Parse `data`, rebuild, reparse, and compare the two parsed values
pub fn test_round_trip_with_data<T>(data: &[u8]) -> Result<(), Box<dyn std::error::Error>>
where
    T: DsFormat + PartialEq + Debug,
{
    let parsed = T::parse(data)?;
    let reparsed = T::parse(&parsed.build()?)?;

    if parsed != reparsed {
        return Err(format!(
            "rebuild changed the value:\nparsed: {parsed:?}\nreparsed: {reparsed:?}"
        )
        .into());
    }
    Ok(())
}

/// Succeeds only if parsing `invalid_data` fails
pub fn test_invalid_data_rejected<T>(invalid_data: &[u8]) -> Result<(), Box<dyn std::error::Error>>
where
    T: DsFormat,
{
    match T::parse(invalid_data) {
        Ok(_) => Err("expected parsing to fail, but it succeeded".into()),
        Err(_) => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::archive::BndArchive;
    use crate::dcx::{DcxFrame, compress};

    #[test]
    fn test_helpers_on_archives() {
        let archive = crate::archive::ArchiveBuilder::new()
            .add_entry("chr\\c0000.anibnd", 0, vec![0xAB; 33])
            .build()
            .expect("valid archive");
        test_round_trip(&archive).expect("round trip");

        let bytes = archive.build().expect("build");
        test_round_trip_with_data::<BndArchive>(&bytes).expect("rebuild");
        test_invalid_data_rejected::<BndArchive>(&bytes[..0x30]).expect("truncated");
    }

    #[test]
    fn test_helpers_on_frames() {
        let framed = compress(b"frame").expect("compress");
        test_round_trip_with_data::<DcxFrame>(&framed).expect("rebuild");
        test_invalid_data_rejected::<DcxFrame>(&framed[..0x40]).expect("header cut short");
    }
}
