use replay_assets::TypeCatalogue;
use replay_core::{ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet};
use replay_protocol::Parser;

use crate::{Frame, Recording};

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    let mut reader = *file;

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

    /* Tibia version. */
    reader.skip(2)?;

    let server_name_length = reader.read_u8()?;
    reader.skip(usize::from(server_name_length))?;

    let runtime = reader.read_u32()?;

    let mut parser = Parser::new(profile, catalogue);
    let mut frames = Vec::new();
    let mut timestamp = 0u32;

    loop {
        let frame_length = reader.read_u16()?;
        let mut frame_reader = reader.slice(usize::from(frame_length))?;

        frames.push(Frame {
            timestamp,
            events: parser.parse(&mut frame_reader)?,
        });

        if reader.is_empty() {
            break;
        }

        match reader.read_u8()? {
            0 => {
                timestamp += u32::from(reader.read_u16()?);
            }
            1 => {
                timestamp += 1000;
            }
            other => {
                return Err(Error::invalid_data(format!("invalid delay tag {other}")))
            }
        }
    }

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use replay_assets::testing::small_catalogue;

    use super::*;

    #[test]
    fn delay_tags_advance_the_clock() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let mut bytes = Vec::new();
        bytes.extend_from_slice(&855u16.to_le_bytes());
        bytes.push(4);
        bytes.extend_from_slice(b"Styx");
        bytes.extend_from_slice(&2200u32.to_le_bytes()); // runtime

        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(0x0F);
        bytes.push(0); // explicit delay tag
        bytes.extend_from_slice(&1200u16.to_le_bytes());

        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(0x0F);
        bytes.push(1); // fixed one-second delay

        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.push(0x0F);

        let recording = read(&DataReader::new(&bytes), &profile, &catalogue).unwrap();

        assert_eq!(recording.runtime, 2200);
        assert_eq!(recording.frames.len(), 3);
        assert_eq!(recording.frames[0].timestamp, 0);
        assert_eq!(recording.frames[1].timestamp, 1200);
        assert_eq!(recording.frames[2].timestamp, 2200);
    }
}
