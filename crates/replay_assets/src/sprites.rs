use std::collections::HashMap;

use replay_core::{DataReader, Error, Features, Result};

/// Side length of a stored sprite, in pixels.
pub const SPRITE_SIZE: usize = 32;

/// A decoded sprite: a 32x32 RGBA pixel block, or nothing at all for the
/// empty sprite and for sprites that failed to decode.
#[derive(Clone, Default, Debug, PartialEq, Eq)]
pub struct Sprite {
    pixels: Vec<u8>,
}

impl Sprite {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// RGBA pixel data, row-major; empty for the null sprite.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Decodes the run-length encoding: alternating little-endian u16
    /// transparent and opaque run counts, each opaque pixel stored as RGB
    /// and expanded to RGBA with full alpha.
    pub fn decode(mut reader: DataReader<'_>) -> Result<Self> {
        if reader.is_empty() {
            return Ok(Self::empty());
        }

        let mut pixels = vec![0u8; SPRITE_SIZE * SPRITE_SIZE * 4];
        let mut cursor = 0usize;

        while !reader.is_empty() {
            let transparent = reader.read_u16()? as usize;
            let opaque = reader.read_u16()? as usize;

            if cursor + transparent + opaque > SPRITE_SIZE * SPRITE_SIZE {
                return Err(Error::invalid_data("sprite runs exceed 32x32 pixels"));
            }

            cursor += transparent;

            for _ in 0..opaque {
                pixels[cursor * 4] = reader.read_u8()?;
                pixels[cursor * 4 + 1] = reader.read_u8()?;
                pixels[cursor * 4 + 2] = reader.read_u8()?;
                pixels[cursor * 4 + 3] = 0xFF;
                cursor += 1;
            }
        }

        Ok(Self { pixels })
    }

    /// The inverse of [`Sprite::decode`], mainly useful for testing the
    /// codec against itself.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut index = 0usize;
        let total = self.pixels.len() / 4;

        while index < total {
            let run_start = index;
            while index < total && self.pixels[index * 4 + 3] == 0 {
                index += 1;
            }
            let transparent = index - run_start;

            let opaque_start = index;
            while index < total && self.pixels[index * 4 + 3] != 0 {
                index += 1;
            }
            let opaque = index - opaque_start;

            if transparent == 0 && opaque == 0 {
                break;
            }

            out.extend_from_slice(&(transparent as u16).to_le_bytes());
            out.extend_from_slice(&(opaque as u16).to_le_bytes());

            for pixel in opaque_start..opaque_start + opaque {
                out.push(self.pixels[pixel * 4]);
                out.push(self.pixels[pixel * 4 + 1]);
                out.push(self.pixels[pixel * 4 + 2]);
            }
        }

        out
    }
}

/// The sprite file: a signature, an offset table, and one RLE block per id.
/// Id 0 is the empty sprite and is always present.
#[derive(Debug)]
pub struct SpriteFile {
    signature: u32,
    count: u32,
    sprites: HashMap<u32, Sprite>,
}

impl SpriteFile {
    pub fn load(features: &Features, mut data: DataReader<'_>) -> Result<Self> {
        let signature = data.read_u32()?;

        let count = if features.sprite_index_u32 {
            /* A reasonably-high cap so version mismatches fail fast instead
             * of chewing through memory. */
            data.read_in::<u32>(1, 1 << 20)?
        } else {
            u32::from(data.read_u16()?)
        };

        let index_end = data.tell() + count as usize * 4;

        let mut sprites = HashMap::with_capacity(count as usize + 1);
        sprites.insert(0, Sprite::empty());

        for id in 1..=count {
            let offset = data.read_u32()? as usize;

            /* Offsets pointing inside the index are how absent sprites are
             * encoded; files in the wild also contain subtly-corrupt
             * entries. Both decode to the empty sprite so that rendering
             * simply skips them. */
            let sprite = if offset < index_end {
                Sprite::empty()
            } else {
                Self::decode_at(&data, offset).unwrap_or_else(|_| Sprite::empty())
            };

            sprites.insert(id, sprite);
        }

        tracing::debug!(count, signature, "loaded sprite file");

        Ok(Self {
            signature,
            count,
            sprites,
        })
    }

    fn decode_at(data: &DataReader<'_>, offset: usize) -> Result<Sprite> {
        let mut reader = data.seek(offset)?;

        /* Color key. */
        reader.skip(3)?;

        let length = reader.read_u16()? as usize;
        Sprite::decode(reader.slice(length)?)
    }

    pub fn signature(&self) -> u32 {
        self.signature
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn get(&self, id: u32) -> Result<&Sprite> {
        self.sprites
            .get(&id)
            .ok_or_else(|| Error::invalid_data(format!("sprite id {id} out of range")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> Sprite {
        let mut pixels = vec![0u8; SPRITE_SIZE * SPRITE_SIZE * 4];

        for index in 0..SPRITE_SIZE * SPRITE_SIZE {
            if (index + index / SPRITE_SIZE) % 2 == 0 {
                pixels[index * 4] = 0x10;
                pixels[index * 4 + 1] = 0x20;
                pixels[index * 4 + 2] = 0x30;
                pixels[index * 4 + 3] = 0xFF;
            }
        }

        Sprite { pixels }
    }

    #[test]
    fn codec_round_trips() {
        let sprite = checkerboard();
        let encoded = sprite.encode();

        let decoded = Sprite::decode(DataReader::new(&encoded)).unwrap();
        assert_eq!(decoded.pixels(), sprite.pixels());
    }

    #[test]
    fn oversized_runs_are_rejected() {
        /* A single run of 2000 transparent pixels. */
        let bytes = [0xD0, 0x07, 0x00, 0x00];
        assert!(Sprite::decode(DataReader::new(&bytes)).is_err());
    }

    fn sprite_file_bytes(payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&0xAABBCCDDu32.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());

        /* One offset slot pointing just past the index. */
        let offset = (bytes.len() + 4) as u32;
        bytes.extend_from_slice(&offset.to_le_bytes());

        bytes.extend_from_slice(&[0, 0, 0]); // color key
        bytes.extend_from_slice(&(payload.len() as u16).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    #[test]
    fn empty_sprite_is_always_present() {
        let bytes = sprite_file_bytes(&[]);
        let features = Features::default();

        let file = SpriteFile::load(&features, DataReader::new(&bytes)).unwrap();
        assert!(file.get(0).unwrap().is_empty());
        assert!(file.get(1).unwrap().is_empty());
        assert!(file.get(2).is_err());
    }

    #[test]
    fn corrupt_sprites_decode_as_empty() {
        /* Runs that overflow the 32x32 pixel block. */
        let mut payload = Vec::new();
        payload.extend_from_slice(&2000u16.to_le_bytes());
        payload.extend_from_slice(&0u16.to_le_bytes());

        let bytes = sprite_file_bytes(&payload);
        let features = Features::default();

        let file = SpriteFile::load(&features, DataReader::new(&bytes)).unwrap();
        assert!(file.get(1).unwrap().is_empty());
    }
}
