#![doc = include_str!("../README.md")]

mod pictures;
mod sprites;
#[cfg(feature = "testing")]
pub mod testing;
mod types;

pub use pictures::{Picture, PictureFile, PictureIndex};
pub use sprites::{Sprite, SpriteFile, SPRITE_SIZE};
pub use types::{
    EntityProperties, EntityType, FrameGroup, SpritePhase, TypeFile, FRAME_GROUP_IDLE,
    FRAME_GROUP_WALKING,
};

use replay_core::{DataReader, Result, VersionProfile};

/// Every asset file of one client version, loaded once and shared immutably
/// by the parser and the renderer.
#[derive(Debug)]
pub struct TypeCatalogue {
    pub pictures: PictureFile,
    pub sprites: SpriteFile,
    pub types: TypeFile,
}

impl TypeCatalogue {
    /// Loads `Tibia.pic`, `Tibia.spr`, and `Tibia.dat` contents for the
    /// profile's version. Any inconsistency fails the whole load; no partial
    /// catalogue is ever exposed.
    pub fn load(
        profile: &VersionProfile,
        picture_data: DataReader<'_>,
        sprite_data: DataReader<'_>,
        type_data: DataReader<'_>,
    ) -> Result<Self> {
        let pictures = PictureFile::load(profile.triplet, picture_data)?;
        let sprites = SpriteFile::load(&profile.features, sprite_data)?;
        let types = TypeFile::load(profile, &sprites, type_data)?;

        Ok(Self {
            pictures,
            sprites,
            types,
        })
    }

    pub fn get_item(&self, id: u16) -> Result<&EntityType> {
        self.types.get_item(id)
    }

    pub fn get_outfit(&self, id: u16) -> Result<&EntityType> {
        self.types.get_outfit(id)
    }

    pub fn get_effect(&self, id: u16) -> Result<&EntityType> {
        self.types.get_effect(id)
    }

    pub fn get_missile(&self, id: u16) -> Result<&EntityType> {
        self.types.get_missile(id)
    }

    pub fn sprite(&self, id: u32) -> Result<&Sprite> {
        self.sprites.get(id)
    }
}

#[cfg(test)]
mod tests {
    use replay_core::{DataReader, Features, VersionProfile, VersionTriplet};

    use super::*;

    fn empty_sprite_file() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        bytes.extend_from_slice(&0u16.to_le_bytes());
        bytes
    }

    /// One ground, stackable item plus minimal outfit/effect/missile
    /// records, in the pre-7.55 grammar.
    fn small_type_file() -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&100u16.to_le_bytes()); // item max id
        bytes.extend_from_slice(&1u16.to_le_bytes()); // outfit max id
        bytes.extend_from_slice(&1u16.to_le_bytes()); // effect max id
        bytes.extend_from_slice(&1u16.to_le_bytes()); // missile max id

        // Item 100: ground speed 150, stackable.
        bytes.push(0);
        bytes.extend_from_slice(&150u16.to_le_bytes());
        bytes.push(4);
        bytes.push(0xFF);
        bytes.extend_from_slice(&[1, 1, 1, 1, 1, 1]); // sizes/layers/divs/frames
        bytes.extend_from_slice(&0u16.to_le_bytes()); // sprite id

        // Outfit, effect, missile: bare records.
        for _ in 0..3 {
            bytes.push(0xFF);
            bytes.extend_from_slice(&[1, 1, 1, 1, 1, 1]);
            bytes.extend_from_slice(&0u16.to_le_bytes());
        }

        bytes
    }

    #[test]
    fn item_lookup_is_total_over_the_id_range() {
        let profile = VersionProfile::new(VersionTriplet::new(7, 40, 0)).unwrap();

        let sprite_bytes = empty_sprite_file();
        let sprites = SpriteFile::load(&Features::default(), DataReader::new(&sprite_bytes))
            .unwrap();

        let type_bytes = small_type_file();
        let types = TypeFile::load(&profile, &sprites, DataReader::new(&type_bytes)).unwrap();

        let item = types.get_item(100).unwrap();
        assert_eq!(item.properties.stack_priority, 0);
        assert_eq!(item.properties.speed, 150);
        assert!(item.properties.stackable);

        assert!(types.get_item(99).is_err());
        assert!(types.get_item(101).is_err());
    }

    #[test]
    fn single_group_fills_both_slots() {
        let profile = VersionProfile::new(VersionTriplet::new(7, 40, 0)).unwrap();

        let sprite_bytes = empty_sprite_file();
        let sprites = SpriteFile::load(&Features::default(), DataReader::new(&sprite_bytes))
            .unwrap();

        let type_bytes = small_type_file();
        let types = TypeFile::load(&profile, &sprites, DataReader::new(&type_bytes)).unwrap();

        let outfit = types.get_outfit(1).unwrap();
        assert!(outfit.frame_groups[FRAME_GROUP_IDLE].active);
        assert!(outfit.frame_groups[FRAME_GROUP_WALKING].active);
    }
}
