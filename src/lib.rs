#![doc = include_str!("../README.md")]
#![deny(
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
    rustdoc::invalid_rust_codeblocks,
    rustdoc::bare_urls
)]

pub mod playback;
pub mod serializer;

pub use replay_assets::TypeCatalogue;
pub use replay_core::{
    DataReader, Error, MessageMode, Position, Result, VersionProfile, VersionTriplet,
};
pub use replay_formats::{guess_format, Format, Frame, Recording};
pub use replay_protocol::{Event, Object, Parser};
pub use replay_state::GameState;
pub use {replay_assets, replay_core, replay_formats, replay_protocol, replay_state};

/// A client version's complete decoding context: the feature profile plus
/// the asset catalogue loaded for it. Create one per version, then share it
/// immutably between as many recordings as needed.
#[derive(Debug)]
pub struct Version {
    pub profile: VersionProfile,
    pub catalogue: TypeCatalogue,
}

impl Version {
    /// Loads a version from the three asset files a client ships with
    /// (`Tibia.pic`, `Tibia.spr`, `Tibia.dat`).
    pub fn load(
        triplet: VersionTriplet,
        picture_data: &[u8],
        sprite_data: &[u8],
        type_data: &[u8],
    ) -> Result<Self> {
        let profile = VersionProfile::new(triplet)?;
        let catalogue = TypeCatalogue::load(
            &profile,
            DataReader::new(picture_data),
            DataReader::new(sprite_data),
            DataReader::new(type_data),
        )?;

        Ok(Self { profile, catalogue })
    }
}

/// Asks a container for the Tibia version that recorded it. `.rec` and
/// `.yatc` don't store one; the caller must know it out of band.
pub fn query_tibia_version(format: Format, file: &[u8]) -> Result<VersionTriplet> {
    replay_formats::query_tibia_version(format, &DataReader::new(file))
}

/// Decodes a recording end to end: container framing, decompression and
/// decryption, protocol parsing, event extraction.
pub fn decode(format: Format, file: &[u8], version: &Version) -> Result<Recording> {
    replay_formats::read(
        format,
        &DataReader::new(file),
        &version.profile,
        &version.catalogue,
    )
}
