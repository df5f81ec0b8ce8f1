use std::io::Read;

use flate2::bufread::DeflateDecoder;
use replay_assets::TypeCatalogue;
use replay_core::{ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet};

use crate::{frames_from_packets, Packet, Recording};

const MAGIC: u32 = 0x3256_4D54; // 'TMV2'

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    let mut reader = *file;

    /* Magic, options, and container version. */
    reader.skip(10)?;

    let mut tag = [0u8; 3];
    reader.copy_to(&mut tag)?;

    let major = i32::from(tag[0]);
    let minor = i32::from(tag[1]) * 10 + i32::from(tag[2]);

    ensure_data!(
        (7..=12).contains(&major) && (0..=99).contains(&minor),
        "implausible Tibia version {major}.{minor}"
    );

    Ok(VersionTriplet::new(major, minor, 0))
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    let magic = reader.read_u32()?;
    ensure_data!(magic == MAGIC, "unknown file magic {magic:#x}");

    let options = reader.read_u32()?;
    let compressed = options & 1 != 0;

    let container_version = reader.read_u16()?;
    if container_version != 1 {
        return Err(Error::not_supported(format!(
            "TibiaMovie container version {container_version}"
        )));
    }

    /* Tibia version tag and creation time. */
    reader.skip(7)?;

    let packet_count = reader.read_u32()?;

    /* A timestamp field the recorder never filled in correctly. */
    reader.skip(4)?;

    let decompressed_size = reader.read_u32()? as usize;

    let decompressed;
    let mut payload = if compressed {
        let mut buffer = Vec::with_capacity(decompressed_size);
        DeflateDecoder::new(reader.raw())
            .read_to_end(&mut buffer)
            .map_err(|err| Error::invalid_data(format!("deflate stream: {err}")))?;

        decompressed = buffer;
        DataReader::new(&decompressed)
    } else {
        reader
    };

    let mut raw_packets = Vec::with_capacity(packet_count as usize);
    let mut first_timestamp = u32::MAX;
    let mut last_timestamp = 0u32;

    for _ in 0..packet_count {
        let outer_length = payload.read_u16()?;
        let timestamp = payload.read_u32()?;
        let inner_length = payload.read_u16()?;

        ensure_data!(
            outer_length == inner_length + 2,
            "corrupt packet length pair ({outer_length}, {inner_length})"
        );

        let packet_reader = payload.slice(usize::from(inner_length))?;

        first_timestamp = first_timestamp.min(timestamp);
        last_timestamp = last_timestamp.max(timestamp);

        raw_packets.push((timestamp, packet_reader));
    }

    /* Timestamps are absolute wall-clock values; rebase onto the first. */
    let packets = raw_packets
        .into_iter()
        .map(|(timestamp, reader)| Packet {
            timestamp: timestamp - first_timestamp,
            payload: bytes::Bytes::copy_from_slice(reader.raw()),
        })
        .collect();

    let frames = frames_from_packets(packets, profile, catalogue)?;

    Ok(Recording {
        runtime: last_timestamp.saturating_sub(first_timestamp),
        frames,
    })
}

#[cfg(test)]
mod tests {
    use replay_assets::testing::small_catalogue;

    use super::*;

    fn container(packets: &[(u32, &[u8])]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&MAGIC.to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // uncompressed
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&[8, 5, 5]); // Tibia version
        bytes.extend_from_slice(&0u32.to_le_bytes()); // creation time
        bytes.extend_from_slice(&(packets.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&0u32.to_le_bytes()); // broken timestamp
        bytes.extend_from_slice(&0u32.to_le_bytes()); // decompressed size

        for (timestamp, payload) in packets {
            bytes.extend_from_slice(&((payload.len() + 2) as u16).to_le_bytes());
            bytes.extend_from_slice(&timestamp.to_le_bytes());
            bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
            bytes.extend_from_slice(payload);
        }

        bytes
    }

    #[test]
    fn runtime_spans_the_timestamp_range() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let bytes = container(&[(100_000, &[0x0F]), (100_400, &[0x0F]), (101_500, &[0x0F])]);
        let recording = read(&DataReader::new(&bytes), &profile, &catalogue).unwrap();

        assert_eq!(recording.runtime, 1500);
        assert_eq!(recording.frames.len(), 3);
        assert_eq!(recording.frames[0].timestamp, 0);
        assert_eq!(recording.frames[2].timestamp, 1500);
    }

    #[test]
    fn mismatched_length_pairs_are_rejected() {
        let profile = VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        let mut bytes = container(&[(0, &[0x0F])]);
        /* Corrupt the outer length. */
        let outer_at = bytes.len() - 1 - 1 - 2 - 4 - 2;
        bytes[outer_at] = 9;

        assert!(read(&DataReader::new(&bytes), &profile, &catalogue).is_err());
    }

    #[test]
    fn version_tag() {
        let bytes = container(&[(0, &[0x0F])]);
        let triplet = query_tibia_version(&DataReader::new(&bytes)).unwrap();

        assert_eq!(triplet, VersionTriplet::new(8, 55, 0));
    }
}
