use replay_assets::TypeCatalogue;
use replay_core::{ensure_data, DataReader, Result, VersionProfile, VersionTriplet};
use replay_protocol::Parser;

use crate::{Frame, Recording};

const LEGACY_MAGIC: u16 = 0x1337;

fn skip_magic(reader: &mut DataReader<'_>) -> Result<()> {
    if reader.read_u16()? != LEGACY_MAGIC {
        /* The newer 'TRP\0' magic is four bytes. */
        reader.skip(2)?;
    }

    Ok(())
}

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    let mut reader = *file;

    skip_magic(&mut reader)?;

    let tibia_version = reader.read_u16()?;
    let major = i32::from(tibia_version / 100);
    let minor = i32::from(tibia_version % 100);

    ensure_data!((7..=12).contains(&major), "implausible Tibia version {major}");

    Ok(VersionTriplet::new(major, minor, 0))
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    skip_magic(&mut reader)?;

    /* Tibia version. */
    reader.skip(2)?;

    let runtime = reader.read_u32()?;
    let frame_count = reader.read_u32()?;

    /* First packet timestamp; playback starts at zero regardless. */
    reader.skip(4)?;

    let mut parser = Parser::new(profile, catalogue);
    let mut frames = Vec::with_capacity(frame_count as usize);
    let mut timestamp = 0u32;

    for index in 0..frame_count {
        let frame_length = reader.read_u16()?;
        let mut frame_reader = reader.slice(usize::from(frame_length))?;

        frames.push(Frame {
            timestamp,
            events: parser.parse(&mut frame_reader)?,
        });

        if index + 1 < frame_count {
            let next_timestamp = reader.read_u32()?;
            ensure_data!(next_timestamp >= timestamp, "invalid packet timestamp");
            timestamp = next_timestamp;
        }
    }

    ensure_data!(reader.is_empty(), "trailing bytes after the last frame");

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use replay_assets::testing::small_catalogue;

    use super::*;

    fn container(runtime: u32, payloads: &[(&[u8], u32)]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&LEGACY_MAGIC.to_le_bytes());
        bytes.extend_from_slice(&855u16.to_le_bytes());
        bytes.extend_from_slice(&runtime.to_le_bytes());
        bytes.extend_from_slice(&(payloads.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&500u32.to_le_bytes()); // first packet timestamp

        for (index, (payload, next_timestamp)) in payloads.iter().enumerate() {
            bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
            bytes.extend_from_slice(payload);

            if index + 1 < payloads.len() {
                bytes.extend_from_slice(&next_timestamp.to_le_bytes());
            }
        }

        bytes
    }

    #[test]
    fn two_idle_frames() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let bytes = container(1500, &[(&[0x0F], 1500), (&[0x0F], 0)]);
        let recording = read(&DataReader::new(&bytes), &profile, &catalogue).unwrap();

        assert_eq!(recording.runtime, 1500);
        assert_eq!(recording.frames.len(), 2);
        assert!(recording.frames[0].events.is_empty());
        assert_eq!(recording.frames[1].timestamp, 1500);
    }

    #[test]
    fn backwards_timestamps_are_rejected() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let bytes = container(
            3000,
            &[(&[0x0F], 2000), (&[0x0F], 1000), (&[0x0F], 0)],
        );

        assert!(read(&DataReader::new(&bytes), &profile, &catalogue).is_err());
    }

    #[test]
    fn legacy_magic_is_two_bytes() {
        let bytes = container(0, &[(&[0x0F], 0)]);
        let triplet = query_tibia_version(&DataReader::new(&bytes)).unwrap();

        assert_eq!(triplet, VersionTriplet::new(8, 55, 0));
    }
}
