#![doc = include_str!("../README.md")]

mod cam;
mod demuxer;
mod rec;
mod tibiacast;
mod tmv1;
mod tmv2;
mod trp;
mod ttm;
mod yatc;

pub use demuxer::{Demuxer, Packet, DEMUXER_BUFFER_SIZE};

use replay_assets::TypeCatalogue;
use replay_core::{DataReader, Result, VersionProfile, VersionTriplet};
use replay_protocol::{Event, Parser};

/// A decoded recording: timestamped frames of parsed events, sorted by
/// timestamp, plus the total runtime in milliseconds.
#[derive(Clone, Debug)]
pub struct Recording {
    pub runtime: u32,
    pub frames: Vec<Frame>,
}

#[derive(Clone, Debug)]
pub struct Frame {
    pub timestamp: u32,
    pub events: Vec<Event>,
}

/// The known container formats.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Format {
    Cam,
    Rec,
    Tibiacast,
    TibiaMovie1,
    TibiaMovie2,
    TibiaReplay,
    TibiaTimeMachine,
    Yatc,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::Cam => "TibiacamTV",
            Format::Rec => "TibiCAM",
            Format::Tibiacast => "Tibiacast",
            Format::TibiaMovie1 | Format::TibiaMovie2 => "TibiaMovie",
            Format::TibiaReplay => "TibiaReplay",
            Format::TibiaTimeMachine => "TibiaTimeMachine",
            Format::Yatc => "YATC",
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Format::Cam => "cam",
            Format::Rec => "rec",
            Format::Tibiacast => "recording",
            Format::TibiaMovie1 => "tmv",
            Format::TibiaMovie2 => "tmv2",
            Format::TibiaReplay => "trp",
            Format::TibiaTimeMachine => "ttm",
            Format::Yatc => "yatc",
        }
    }
}

const ALL_FORMATS: [Format; 8] = [
    Format::Cam,
    Format::Rec,
    Format::Tibiacast,
    Format::TibiaMovie1,
    Format::TibiaMovie2,
    Format::TibiaReplay,
    Format::TibiaTimeMachine,
    Format::Yatc,
];

/// Guesses the container format, by magic bytes first and the file
/// extension second.
pub fn guess_format(extension: Option<&str>, file: &DataReader<'_>) -> Option<Format> {
    if let Ok(magic) = file.peek::<u32>() {
        match magic {
            0x3256_4D54 => return Some(Format::TibiaMovie2), // 'TMV2'
            0x0050_5254 => return Some(Format::TibiaReplay), // 'TRP\0'
            _ => {}
        }

        if magic & 0xFFFF == 0x1337 {
            /* Old TibiaReplay format. */
            return Some(Format::TibiaReplay);
        }
    }

    let extension = extension?;

    ALL_FORMATS
        .into_iter()
        .find(|format| format.extension().eq_ignore_ascii_case(extension))
}

/// Asks the container which Tibia version recorded it. Not every container
/// stores one; `.rec` and `.yatc` always fail and the caller must supply a
/// version out of band.
pub fn query_tibia_version(format: Format, file: &DataReader<'_>) -> Result<VersionTriplet> {
    match format {
        Format::Cam => cam::query_tibia_version(file),
        Format::Rec => rec::query_tibia_version(file),
        Format::Tibiacast => tibiacast::query_tibia_version(file),
        Format::TibiaMovie1 => tmv1::query_tibia_version(file),
        Format::TibiaMovie2 => tmv2::query_tibia_version(file),
        Format::TibiaReplay => trp::query_tibia_version(file),
        Format::TibiaTimeMachine => ttm::query_tibia_version(file),
        Format::Yatc => yatc::query_tibia_version(file),
    }
}

/// Decodes a whole recording: container framing, decryption and
/// decompression, then one parsed event list per frame.
pub fn read(
    format: Format,
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    tracing::debug!(format = format.name(), version = %profile.triplet, "reading recording");

    match format {
        Format::Cam => cam::read(file, profile, catalogue),
        Format::Rec => rec::read(file, profile, catalogue),
        Format::Tibiacast => tibiacast::read(file, profile, catalogue),
        Format::TibiaMovie1 => tmv1::read(file, profile, catalogue),
        Format::TibiaMovie2 => tmv2::read(file, profile, catalogue),
        Format::TibiaReplay => trp::read(file, profile, catalogue),
        Format::TibiaTimeMachine => ttm::read(file, profile, catalogue),
        Format::Yatc => yatc::read(file, profile, catalogue),
    }
}

/// Runs demuxed packets through the parser, one frame per packet.
fn frames_from_packets(
    packets: Vec<Packet>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Vec<Frame>> {
    let mut parser = Parser::new(profile, catalogue);
    let mut frames = Vec::with_capacity(packets.len());

    for packet in packets {
        let mut reader = DataReader::new(&packet.payload);

        frames.push(Frame {
            timestamp: packet.timestamp,
            events: parser.parse(&mut reader)?,
        });
    }

    Ok(frames)
}

#[cfg(test)]
mod tests;
