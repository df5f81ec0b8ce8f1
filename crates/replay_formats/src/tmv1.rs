use std::io::Read;

use flate2::bufread::GzDecoder;
use replay_assets::TypeCatalogue;
use replay_core::{ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet};

use crate::demuxer::Demuxer;
use crate::{frames_from_packets, Recording};

fn decompress(file: &DataReader<'_>) -> Result<Vec<u8>> {
    let mut decompressed = Vec::new();

    GzDecoder::new(file.raw())
        .read_to_end(&mut decompressed)
        .map_err(|err| Error::invalid_data(format!("gzip stream: {err}")))?;

    Ok(decompressed)
}

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    /* The header sits inside the gzip stream; only the first few bytes are
     * needed, but gzip has no random access anyway. */
    let mut header = [0u8; 4];
    GzDecoder::new(file.raw())
        .read_exact(&mut header)
        .map_err(|err| Error::invalid_data(format!("gzip stream: {err}")))?;

    let mut reader = DataReader::new(&header);

    let container_version = reader.read_u16()?;
    ensure_data!(
        container_version == 2,
        "invalid container version {container_version}"
    );

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
    let decompressed = decompress(file)?;
    let mut payload = DataReader::new(&decompressed);

    /* Container version and Tibia version. */
    payload.skip(4)?;

    /* A stored runtime; superseded by the demuxed timestamps. */
    payload.skip(4)?;

    let mut demuxer = Demuxer::new(2);
    let mut timestamp = 0u32;

    while !payload.is_empty() {
        match payload.read_u8()? {
            0 => {
                let frame_delay = payload.read_u32()?;
                let frame_size = payload.read_u16()?;

                let mut frame_reader = payload.slice(usize::from(frame_size))?;
                demuxer.submit(timestamp, &mut frame_reader)?;

                timestamp = timestamp.wrapping_add(frame_delay);
            }
            1 => {
                /* Separator. */
            }
            other => {
                return Err(Error::invalid_data(format!("invalid frame type {other}")))
            }
        }
    }

    let (packets, runtime) = demuxer.finish()?;
    let frames = frames_from_packets(packets, profile, catalogue)?;

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use flate2::write::GzEncoder;
    use flate2::Compression;

    use super::*;

    fn gzip(body: &[u8]) -> Vec<u8> {
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(body).unwrap();
        encoder.finish().unwrap()
    }

    #[test]
    fn version_is_read_through_the_compression() {
        let mut body = Vec::new();
        body.extend_from_slice(&2u16.to_le_bytes());
        body.extend_from_slice(&855u16.to_le_bytes());
        body.extend_from_slice(&60_000u32.to_le_bytes());

        let compressed = gzip(&body);
        let triplet = query_tibia_version(&DataReader::new(&compressed)).unwrap();

        assert_eq!(triplet, VersionTriplet::new(8, 55, 0));
    }

    #[test]
    fn delays_accumulate_across_frames() {
        let mut body = Vec::new();
        body.extend_from_slice(&2u16.to_le_bytes());
        body.extend_from_slice(&855u16.to_le_bytes());
        body.extend_from_slice(&0u32.to_le_bytes());

        /* Two tag-0 frames, each carrying one whole demuxer packet holding
         * a single idle marker, separated by a tag-1 frame. */
        for delay in [500u32, 700] {
            body.push(0);
            body.extend_from_slice(&delay.to_le_bytes());
            body.extend_from_slice(&3u16.to_le_bytes());
            body.extend_from_slice(&1u16.to_le_bytes());
            body.push(0x0F);
            body.push(1);
        }

        let compressed = gzip(&body);

        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = replay_assets::testing::small_catalogue(&profile);

        let recording = read(&DataReader::new(&compressed), &profile, &catalogue).unwrap();

        assert_eq!(recording.frames.len(), 2);
        assert_eq!(recording.frames[0].timestamp, 0);
        assert_eq!(recording.frames[1].timestamp, 500);
        assert_eq!(recording.runtime, 500);
        assert!(recording.frames[0].events.is_empty());
    }
}
