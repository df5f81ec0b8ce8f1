use std::collections::HashMap;

use replay_core::{DataReader, Error, Result, VersionTriplet};

use crate::sprites::{Sprite, SPRITE_SIZE};

/// The pictures every version ships, in file order. `SplashLogo` only
/// exists from 9.0 on.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum PictureIndex {
    SplashBackground,
    SplashLogo,
    Tutorial,
    FontUnbordered,
    Icons,
    FontGame,
    FontInterfaceSmall,
    LightFallbacks,
    FontInterfaceLarge,
}

/// A picture composed from 32x32 sprite cells onto one RGBA canvas.
#[derive(Clone, Debug)]
pub struct Picture {
    width: usize,
    height: usize,
    pixels: Vec<u8>,
}

impl Picture {
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    fn blit(&mut self, sprite: &Sprite, x: usize, y: usize) {
        if sprite.is_empty() {
            return;
        }

        for row in 0..SPRITE_SIZE {
            let src = row * SPRITE_SIZE * 4;
            let dst = ((y + row) * self.width + x) * 4;

            self.pixels[dst..dst + SPRITE_SIZE * 4]
                .copy_from_slice(&sprite.pixels()[src..src + SPRITE_SIZE * 4]);
        }
    }
}

/// The picture file: a fixed, version-dependent sequence of composed
/// pictures (splash screens, fonts, icons, tutorial art).
#[derive(Debug)]
pub struct PictureFile {
    signature: u32,
    pictures: HashMap<PictureIndex, Picture>,
}

impl PictureFile {
    pub fn load(triplet: VersionTriplet, mut data: DataReader<'_>) -> Result<Self> {
        let signature = data.read_u32()?;

        /* Picture count; must stay in sync with the sequence below. */
        data.read_in::<u16>(8, 9)?;

        let mut file = Self {
            signature,
            pictures: HashMap::new(),
        };

        file.read_picture(&mut data, PictureIndex::SplashBackground)?;

        if triplet.at_least(9, 0) {
            file.read_picture(&mut data, PictureIndex::SplashLogo)?;
        }

        file.read_picture(&mut data, PictureIndex::Tutorial)?;
        file.read_picture(&mut data, PictureIndex::FontUnbordered)?;
        file.read_picture(&mut data, PictureIndex::Icons)?;
        file.read_picture(&mut data, PictureIndex::FontGame)?;
        file.read_picture(&mut data, PictureIndex::FontInterfaceSmall)?;
        file.read_picture(&mut data, PictureIndex::LightFallbacks)?;
        file.read_picture(&mut data, PictureIndex::FontInterfaceLarge)?;

        Ok(file)
    }

    fn read_picture(&mut self, data: &mut DataReader<'_>, index: PictureIndex) -> Result<()> {
        let tiles_wide = data.read_in::<u8>(1, 127)? as usize;
        let tiles_tall = data.read_in::<u8>(1, 127)? as usize;

        /* Color key. */
        data.skip(3)?;

        let mut picture = Picture {
            width: tiles_wide * SPRITE_SIZE,
            height: tiles_tall * SPRITE_SIZE,
            pixels: vec![0u8; tiles_wide * tiles_tall * SPRITE_SIZE * SPRITE_SIZE * 4],
        };

        for tile_y in 0..tiles_tall {
            for tile_x in 0..tiles_wide {
                let offset = data.read_u32()? as usize;
                let mut sprite_reader = data.seek(offset)?;

                let length = sprite_reader.read_u16()? as usize;
                if length > 0 {
                    let sprite = Sprite::decode(sprite_reader.slice(length)?)?;
                    picture.blit(&sprite, tile_x * SPRITE_SIZE, tile_y * SPRITE_SIZE);
                }
            }
        }

        self.pictures.insert(index, picture);

        Ok(())
    }

    pub fn signature(&self) -> u32 {
        self.signature
    }

    pub fn get(&self, index: PictureIndex) -> Result<&Picture> {
        self.pictures
            .get(&index)
            .ok_or_else(|| Error::invalid_data(format!("picture {index:?} not present")))
    }
}
