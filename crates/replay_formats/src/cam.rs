use lzma_rs::decompress::{Options, UnpackedSize};
use replay_assets::TypeCatalogue;
use replay_core::{ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet};

use crate::demuxer::Demuxer;
use crate::{frames_from_packets, Recording};

const HEADER_SIZE: usize = 32;

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    let mut reader = *file;

    reader.skip(HEADER_SIZE)?;

    let mut tag = [0u8; 4];
    reader.copy_to(&mut tag)?;

    let major = i32::from(tag[0]);
    let minor = i32::from(tag[1]) * 10 + i32::from(tag[2]);

    ensure_data!((7..=12).contains(&major), "implausible Tibia version {major}");

    Ok(VersionTriplet::new(major, minor, 0))
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    reader.skip(HEADER_SIZE)?;
    /* Tibia version tag. */
    reader.skip(4)?;

    let metadata_length = reader.read_u32()? as usize;
    reader.skip(metadata_length)?;

    /* The advisory compressed size; the LZMA stream itself runs to the end
     * of the file. What follows is a standard .lzma header: 5 properties
     * bytes plus the 64-bit decompressed size. */
    reader.skip(4)?;

    let mut input = reader.raw();
    let mut decompressed = Vec::new();

    lzma_rs::lzma_decompress_with_options(
        &mut input,
        &mut decompressed,
        &Options {
            unpacked_size: UnpackedSize::ReadFromHeader,
            memlimit: None,
            /* Files in the wild are frequently cut short; decode what is
             * there, the frame count check below catches real corruption. */
            allow_incomplete: true,
        },
    )
    .map_err(|err| Error::invalid_data(format!("LZMA stream: {err:?}")))?;

    let mut payload = DataReader::new(&decompressed);

    /* Bogus container version. */
    payload.skip(2)?;

    let frame_count = payload.read_i32()?;
    ensure_data!(frame_count > 57, "invalid frame count {frame_count}");
    let frame_count = frame_count - 57;

    let mut demuxer = Demuxer::new(2);

    for _ in 0..frame_count {
        let frame_length = payload.read_u16()?;
        let timestamp = payload.read_u32()?;

        let mut frame_reader = payload.slice(usize::from(frame_length))?;
        demuxer.submit(timestamp, &mut frame_reader)?;

        /* Checksum. */
        payload.skip(4)?;
    }

    let (packets, runtime) = demuxer.finish()?;
    let frames = frames_from_packets(packets, profile, catalogue)?;

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_tag_is_digit_encoded() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&[8, 5, 5, 0]);

        let triplet = query_tibia_version(&DataReader::new(&bytes)).unwrap();
        assert_eq!(triplet, VersionTriplet::new(8, 55, 0));
    }

    #[test]
    fn implausible_versions_are_rejected() {
        let mut bytes = vec![0u8; HEADER_SIZE];
        bytes.extend_from_slice(&[3, 1, 0, 0]);

        assert!(query_tibia_version(&DataReader::new(&bytes)).is_err());
    }
}
