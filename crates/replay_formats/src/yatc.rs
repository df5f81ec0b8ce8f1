use replay_assets::TypeCatalogue;
use replay_core::{DataReader, Error, Result, VersionProfile, VersionTriplet};
use replay_protocol::Parser;

use crate::{Frame, Recording};

pub(crate) fn query_tibia_version(_file: &DataReader<'_>) -> Result<VersionTriplet> {
    Err(Error::not_supported(
        "YATC captures don't store their Tibia version",
    ))
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    /* The leading timestamp belongs to the first packet but playback always
     * starts at zero. */
    reader.skip(4)?;

    let mut parser = Parser::new(profile, catalogue);
    let mut frames = Vec::new();

    let mut timestamp = 0u32;
    let mut runtime = 0u32;

    loop {
        let packet_length = reader.read_u16()?;
        let mut packet_reader = reader.slice(usize::from(packet_length))?;

        frames.push(Frame {
            timestamp,
            events: parser.parse(&mut packet_reader)?,
        });

        runtime = runtime.max(timestamp);

        if reader.is_empty() {
            break;
        }

        timestamp = reader.read_u32()?;
        runtime = runtime.max(timestamp);
    }

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use replay_assets::testing::small_catalogue;

    use super::*;

    #[test]
    fn records_interleave_timestamps_and_payloads() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&100u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(0x0F);
        bytes.extend_from_slice(&900u32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(0x0F);

        let recording = read(&DataReader::new(&bytes), &profile, &catalogue).unwrap();

        assert_eq!(recording.frames.len(), 2);
        assert_eq!(recording.frames[0].timestamp, 0);
        assert_eq!(recording.frames[1].timestamp, 900);
        assert_eq!(recording.runtime, 900);
    }

    #[test]
    fn no_stored_version() {
        assert!(query_tibia_version(&DataReader::new(&[])).is_err());
    }
}
