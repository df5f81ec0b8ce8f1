use std::io::Read;

use flate2::bufread::DeflateDecoder;
use replay_assets::TypeCatalogue;
use replay_core::{
    ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet,
};
use replay_protocol::Parser;

use crate::{Frame, Recording};

const PACKET_STATE_CORRECTION: u8 = 6;
const PACKET_INITIALIZATION: u8 = 7;
const PACKET_TIBIA_DATA: u8 = 8;
const PACKET_OUTGOING_MESSAGE: u8 = 9;

/// Maps a Tibiacast container revision onto the Tibia version it recorded.
fn tibia_version(container_major: u8, container_minor: u8) -> Option<(i32, i32)> {
    let version = match container_major {
        3 => match container_minor {
            0..=4 => (8, 55),
            5 => (8, 60),
            6..=7 => (8, 61),
            8..=10 => (8, 62),
            11..=14 => (8, 71),
            15..=21 => (9, 31),
            22..=25 => (9, 40),
            26..=27 => (9, 53),
            _ => return None,
        },
        4 => match container_minor {
            0..=2 => (9, 54),
            3..=4 => (9, 61),
            5 => (9, 71),
            6..=8 => (9, 80),
            /* Below minor 10 this is really "9.83 old", which needs its own
             * profile once the difference is mapped out. */
            9..=11 => (9, 83),
            12 => (9, 86),
            13..=16 => (10, 0),
            17..=19 => (10, 34),
            20 => (10, 35),
            21 => (10, 37),
            22..=23 => (10, 51),
            24 => (10, 52),
            25 => (10, 53),
            26 => (10, 54),
            27 => (10, 57),
            28 => (10, 58),
            29 => (10, 64),
            30 => (10, 94),
            _ => return None,
        },
        _ => return None,
    };

    Some(version)
}

fn at_least(major: u8, minor: u8, want_major: u8, want_minor: u8) -> bool {
    major > want_major || (major == want_major && minor >= want_minor)
}

pub(crate) fn query_tibia_version(file: &DataReader<'_>) -> Result<VersionTriplet> {
    let mut reader = *file;

    let container_major = reader.read_u8()?;
    let container_minor = reader.read_u8()?;

    let Some((major, minor)) = tibia_version(container_major, container_minor) else {
        return Err(Error::not_supported(format!(
            "Tibiacast container version {container_major}.{container_minor}"
        )));
    };

    if at_least(container_major, container_minor, 4, 5) {
        /* Runtime. */
        reader.skip(4)?;
    }

    let mut preview = 0;
    if at_least(container_major, container_minor, 4, 6) {
        preview = i32::from(reader.read_u8()?);
    }

    if container_major == 4 && container_minor < 10 {
        preview = 0;
    }

    Ok(VersionTriplet::new(major, minor, preview))
}

/// Parses one embedded Tibia-data block: a sub-packet count, then one
/// length-prefixed protocol packet per sub-packet.
fn parse_tibia_data(
    parser: &mut Parser<'_>,
    reader: &mut DataReader<'_>,
    events: &mut Vec<replay_protocol::Event>,
) -> Result<()> {
    let subpacket_count = reader.read_u16()?;

    for _ in 0..subpacket_count {
        let subpacket_length = usize::from(reader.read_u16()?);

        if subpacket_length > 0 {
            let start = reader.tell();

            parser.parse_packet(reader, events)?;

            ensure_data!(
                reader.tell() == start + subpacket_length,
                "sub-packet length mismatch"
            );
        }
    }

    Ok(())
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    let container_major = reader.read_u8()?;
    let container_minor = reader.read_u8()?;

    ensure_data!(
        tibia_version(container_major, container_minor).is_some(),
        "unknown Tibiacast container version {container_major}.{container_minor}"
    );

    let mut stored_runtime = 0;
    if at_least(container_major, container_minor, 4, 5) {
        stored_runtime = reader.read_u32()?;
    }

    if at_least(container_major, container_minor, 4, 6) {
        /* Preview flag; already folded into the version triplet. */
        reader.skip(1)?;
    }

    /* Tibiacast generated buggy initialization packets for a short while. */
    let profile = if profile.triplet.major == 9 && profile.triplet.minor == 80 {
        let mut patched = profile.clone();
        patched.protocol.tibiacast_bugged_initialization = true;
        std::borrow::Cow::Owned(patched)
    } else {
        std::borrow::Cow::Borrowed(profile)
    };

    /* The rest of the container is one raw deflate stream. */
    let mut decompressed = Vec::new();
    DeflateDecoder::new(reader.raw())
        .read_to_end(&mut decompressed)
        .map_err(|err| Error::invalid_data(format!("deflate stream: {err}")))?;

    let mut payload = DataReader::new(&decompressed);
    let wide_lengths = container_major >= 4;

    let mut parser = Parser::new(profile.as_ref(), catalogue);
    let mut frames = Vec::new();

    let mut timestamp = payload.read_u32()?;
    let mut runtime = stored_runtime;

    loop {
        let packet_length = if wide_lengths {
            payload.read_u32()? as usize
        } else {
            usize::from(payload.read_u16()?)
        };

        if packet_length == 0 {
            break;
        }

        let mut packet_reader = payload.slice(packet_length)?;

        let next_timestamp = payload.read_u32()?;
        ensure_data!(
            next_timestamp >= timestamp,
            "packet timestamps went backwards"
        );

        let mut events = Vec::new();

        match packet_reader.read_u8()? {
            PACKET_INITIALIZATION => {
                events = parser.parse_tibiacast_creatures(&mut packet_reader, wide_lengths)?;
                parse_tibia_data(&mut parser, &mut packet_reader, &mut events)?;
            }
            PACKET_TIBIA_DATA => {
                parse_tibia_data(&mut parser, &mut packet_reader, &mut events)?;
            }
            PACKET_STATE_CORRECTION => {
                /* 0 = player trade closed, 1 = NPC trade closed. */
                packet_reader.read_in::<u8>(0, 1)?;
            }
            PACKET_OUTGOING_MESSAGE => {
                /* Sender name and message contents. */
                packet_reader.skip_string()?;
                packet_reader.skip_string()?;
            }
            other => {
                return Err(Error::invalid_data(format!(
                    "unhandled Tibiacast packet kind {other}"
                )))
            }
        }

        frames.push(Frame { timestamp, events });

        runtime = runtime.max(timestamp);
        timestamp = next_timestamp;
    }

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn container_revisions_map_to_client_versions() {
        assert_eq!(tibia_version(3, 0), Some((8, 55)));
        assert_eq!(tibia_version(3, 27), Some((9, 53)));
        assert_eq!(tibia_version(4, 7), Some((9, 80)));
        assert_eq!(tibia_version(4, 30), Some((10, 94)));
        assert_eq!(tibia_version(5, 0), None);
    }

    #[test]
    fn preview_flag_is_read_for_newer_containers() {
        /* 4.6+: runtime + preview byte follow the container version. */
        let bytes = [4u8, 10, 0x10, 0x27, 0, 0, 1];

        let triplet = query_tibia_version(&DataReader::new(&bytes)).unwrap();
        assert_eq!(triplet, VersionTriplet::new(9, 83, 1));
    }

    #[test]
    fn preview_flag_is_zeroed_for_buggy_containers() {
        let bytes = [4u8, 8, 0x10, 0x27, 0, 0, 1];

        let triplet = query_tibia_version(&DataReader::new(&bytes)).unwrap();
        assert_eq!(triplet, VersionTriplet::new(9, 80, 0));
    }
}
