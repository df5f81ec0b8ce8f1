use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecrypt, KeyInit};
use aes::Aes256;
use replay_assets::TypeCatalogue;
use replay_core::{
    ensure_data, DataReader, Error, Result, VersionProfile, VersionTriplet,
};

use crate::demuxer::Demuxer;
use crate::{frames_from_packets, Recording};

/// Early `.rec` revisions use 32-bit frame lengths, but no recording with a
/// frame over 64K has ever been observed.
const MAX_FRAME_SIZE: usize = 64 << 10;

/// The key of the AES layer, baked into every TibiCAM build.
const AES_KEY: [u8; 32] = [
    0x54, 0x68, 0x79, 0x20, 0x6B, 0x65, 0x79, 0x20, 0x69, 0x73, 0x20, 0x6D, 0x69, 0x6E, 0x65,
    0x20, 0xA9, 0x20, 0x32, 0x30, 0x30, 0x36, 0x20, 0x47, 0x42, 0x20, 0x4D, 0x6F, 0x6E, 0x61,
    0x63, 0x6F,
];

/// Per-container-revision obfuscation settings.
#[derive(Clone, Copy, Debug)]
struct Obfuscation {
    twirl_divisor: u8,
    frame_count_offset: bool,
    u16_frame_lengths: bool,
    checksum: bool,
    aes_data: bool,
}

impl Obfuscation {
    fn for_container_version(container_version: u16) -> Result<Self> {
        let twirl_divisor = match container_version {
            259 => 0,
            515 => 5,
            516 | 517 => 8,
            518 => 6,
            _ => {
                return Err(Error::not_supported(format!(
                    "TibiCAM container version {container_version}"
                )))
            }
        };

        Ok(Self {
            twirl_divisor,
            frame_count_offset: container_version > 259,
            u16_frame_lengths: container_version > 259,
            checksum: container_version >= 515,
            aes_data: container_version >= 517,
        })
    }
}

pub(crate) fn query_tibia_version(_file: &DataReader<'_>) -> Result<VersionTriplet> {
    Err(Error::not_supported(
        "TibiCAM .rec captures don't store their Tibia version",
    ))
}

/// Reverses the per-frame byte twirl: each byte had
/// `alpha + (divisor - alpha mod divisor)` added, where `alpha` depends on
/// the frame length, timestamp, and byte index.
fn untwirl(divisor: u8, frame_length: u32, timestamp: u32, data: &mut [u8]) {
    if divisor == 0 {
        return;
    }

    let key = frame_length.wrapping_add(timestamp).wrapping_add(2);

    for (index, byte) in data.iter_mut().enumerate() {
        let alpha = key.wrapping_add(index as u32 * 33) & 0xFF;

        let beta = if divisor & (divisor - 1) == 0 {
            /* Power-of-two divisors use bitwise-and. */
            alpha & u32::from(divisor - 1)
        } else {
            (alpha - (alpha >> 7)) % u32::from(divisor)
        };

        let offset = alpha
            + if beta != 0 {
                u32::from(divisor) - beta
            } else {
                0
            };

        *byte = byte.wrapping_sub(offset as u8);
    }
}

/// Decrypts in place and strips the PKCS#7 padding, returning the plaintext
/// length.
fn decrypt_frame(cipher: &Aes256, data: &mut [u8]) -> Result<usize> {
    ensure_data!(data.len() % 16 == 0, "frame is not block-aligned");
    ensure_data!(!data.is_empty(), "empty encrypted frame");

    for block in data.chunks_exact_mut(16) {
        cipher.decrypt_block(GenericArray::from_mut_slice(block));
    }

    let padding = usize::from(data[data.len() - 1]);

    ensure_data!(
        (1..=16).contains(&padding) && padding <= data.len(),
        "bad frame padding length"
    );
    ensure_data!(
        data[data.len() - padding..]
            .iter()
            .all(|&byte| usize::from(byte) == padding),
        "bad frame padding bytes"
    );

    Ok(data.len() - padding)
}

pub(crate) fn read(
    file: &DataReader<'_>,
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
) -> Result<Recording> {
    let mut reader = *file;

    let container_version = reader.read_u16()?;
    let mut frame_count = reader.read_i32()?;

    let obfuscation = Obfuscation::for_container_version(container_version)?;

    if obfuscation.frame_count_offset {
        frame_count -= 57;
    }

    ensure_data!(frame_count > 0, "invalid frame count {frame_count}");

    let cipher = obfuscation
        .aes_data
        .then(|| Aes256::new(GenericArray::from_slice(&AES_KEY)));

    let mut demuxer = Demuxer::new(2);
    let mut frame = vec![0u8; MAX_FRAME_SIZE];

    for _ in 0..frame_count {
        let frame_length = if obfuscation.u16_frame_lengths {
            u32::from(reader.read_u16()?)
        } else {
            reader.read_u32()?
        };

        ensure_data!(
            frame_length as usize <= MAX_FRAME_SIZE,
            "frame length {frame_length} out of bounds"
        );

        let timestamp = reader.read_u32()?;

        let data = &mut frame[..frame_length as usize];
        reader.copy_to(data)?;

        untwirl(obfuscation.twirl_divisor, frame_length, timestamp, data);

        let plain_length = match &cipher {
            Some(cipher) => decrypt_frame(cipher, data)?,
            None => data.len(),
        };

        demuxer.submit(timestamp, &mut DataReader::new(&frame[..plain_length]))?;

        if obfuscation.checksum {
            reader.skip(4)?;
        }
    }

    let (packets, runtime) = demuxer.finish()?;
    let frames = frames_from_packets(packets, profile, catalogue)?;

    Ok(Recording { runtime, frames })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_container_versions_are_rejected() {
        assert!(Obfuscation::for_container_version(260).is_err());
        assert!(Obfuscation::for_container_version(515).is_ok());
    }

    #[test]
    fn untwirl_round_trips() {
        let original: Vec<u8> = (0u8..=255).collect();

        for divisor in [5u8, 6, 8] {
            let mut twirled = original.clone();

            /* Forward transform. */
            let key = 256u32.wrapping_add(1234).wrapping_add(2);
            for (index, byte) in twirled.iter_mut().enumerate() {
                let alpha = key.wrapping_add(index as u32 * 33) & 0xFF;
                let beta = if divisor & (divisor - 1) == 0 {
                    alpha & u32::from(divisor - 1)
                } else {
                    (alpha - (alpha >> 7)) % u32::from(divisor)
                };
                let offset = alpha
                    + if beta != 0 {
                        u32::from(divisor) - beta
                    } else {
                        0
                    };
                *byte = byte.wrapping_add(offset as u8);
            }

            untwirl(divisor, 256, 1234, &mut twirled);
            assert_eq!(twirled, original, "divisor {divisor}");
        }
    }

    #[test]
    fn zero_frames_after_the_offset_are_rejected() {
        use replay_assets::testing::small_catalogue;
        use replay_core::{VersionProfile, VersionTriplet};

        let profile = VersionProfile::new(VersionTriplet::new(7, 40, 0)).unwrap();
        let catalogue = small_catalogue(&profile);

        /* Container version 515 offsets the frame count by 57. */
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&515u16.to_le_bytes());
        bytes.extend_from_slice(&57i32.to_le_bytes());

        let err = read(&DataReader::new(&bytes), &profile, &catalogue).unwrap_err();
        assert!(format!("{err}").contains("invalid frame count"));
    }

    #[test]
    fn unaligned_aes_frames_are_rejected() {
        let cipher = Aes256::new(GenericArray::from_slice(&AES_KEY));
        let mut data = vec![0u8; 15];

        assert!(decrypt_frame(&cipher, &mut data).is_err());
    }
}
