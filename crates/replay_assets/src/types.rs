use std::collections::HashMap;

use replay_core::{DataReader, Error, Result, TypeProperty, VersionProfile};

use crate::sprites::SpriteFile;

/// The subset of entity-type attributes the parser and game state consult.
/// Everything else in the property loop is validated and discarded.
#[derive(Clone, Copy, Default, Debug)]
pub struct EntityProperties {
    /// Tile stacking band, 0..5: ground, clip, bottom, top, creature,
    /// default.
    pub stack_priority: u8,

    pub liquid_container: bool,
    pub liquid_pool: bool,
    pub stackable: bool,
    pub rune: bool,
    pub animated: bool,
    pub animate_idle: bool,
    pub redraw_nearby_top: bool,
    pub hangable: bool,
    pub vertical: bool,
    pub horizontal: bool,
    pub dont_hide: bool,
    pub unlookable: bool,

    pub displacement_x: u16,
    pub displacement_y: u16,
    /// Ground speed; drives walk duration on this tile.
    pub speed: u16,
    pub height: u16,
}

#[derive(Clone, Copy, Debug)]
pub struct SpritePhase {
    pub minimum: u32,
    pub maximum: u32,
}

/// One animation group of an entity type. Pre-frame-group versions have a
/// single group that doubles as both idle and walking.
#[derive(Clone, Default, Debug)]
pub struct FrameGroup {
    pub active: bool,

    pub size_x: u8,
    pub size_y: u8,
    pub render_size: u8,
    pub layer_count: u8,
    pub x_div: u8,
    pub y_div: u8,
    pub z_div: u8,
    pub frame_count: u8,

    pub animation_type: u8,
    pub start_phase: u8,
    pub loop_count: u32,

    pub phases: Vec<SpritePhase>,
    pub sprite_ids: Vec<u32>,
}

pub const FRAME_GROUP_IDLE: usize = 0;
pub const FRAME_GROUP_WALKING: usize = 1;

#[derive(Clone, Debug)]
pub struct EntityType {
    pub properties: EntityProperties,
    pub frame_groups: [FrameGroup; 2],
}

impl EntityType {
    fn read(
        profile: &VersionProfile,
        sprites: &SpriteFile,
        data: &mut DataReader<'_>,
        has_frame_groups: bool,
    ) -> Result<Self> {
        let mut entity = Self {
            properties: EntityProperties {
                stack_priority: 5,
                ..EntityProperties::default()
            },
            frame_groups: Default::default(),
        };

        entity.read_properties(profile, data)?;
        entity.properties.animated = false;

        let group_count = if has_frame_groups {
            data.read_in::<u8>(1, 2)?
        } else {
            1
        };

        for _ in 0..group_count {
            let group_index = if has_frame_groups {
                data.read_in::<u8>(0, 1)? as usize
            } else {
                FRAME_GROUP_IDLE
            };

            entity.read_frame_group(profile, sprites, data, group_index, has_frame_groups)?;
        }

        Ok(entity)
    }

    fn read_properties(
        &mut self,
        profile: &VersionProfile,
        data: &mut DataReader<'_>,
    ) -> Result<()> {
        let properties = &mut self.properties;

        loop {
            match profile.translate_type_property(data.read_u8()?)? {
                TypeProperty::Ground => {
                    properties.speed = data.read_u16()?;
                    properties.stack_priority = 0;
                }
                TypeProperty::Clip => properties.stack_priority = 1,
                TypeProperty::Bottom => properties.stack_priority = 2,
                TypeProperty::Top => properties.stack_priority = 3,
                TypeProperty::Stackable => properties.stackable = true,
                TypeProperty::Rune => properties.rune = true,
                TypeProperty::LiquidContainer => properties.liquid_container = true,
                TypeProperty::LiquidPool => properties.liquid_pool = true,
                TypeProperty::Unlookable => properties.unlookable = true,
                TypeProperty::Hangable => properties.hangable = true,
                TypeProperty::Vertical => properties.vertical = true,
                TypeProperty::Horizontal => properties.horizontal = true,
                TypeProperty::DontHide => properties.dont_hide = true,
                TypeProperty::Displacement => {
                    properties.displacement_x = data.read_u16()?;
                    properties.displacement_y = data.read_u16()?;
                }
                TypeProperty::DisplacementLegacy => {
                    properties.displacement_x = 8;
                    properties.displacement_y = 8;
                }
                TypeProperty::Height => {
                    properties.height = data.read_u16()?;
                }
                TypeProperty::RedrawNearbyTop => properties.redraw_nearby_top = true,
                TypeProperty::AnimateIdle => properties.animate_idle = true,

                /* Declared-but-unused properties: consume their payloads so
                 * the record stays aligned. */
                TypeProperty::Container
                | TypeProperty::Wrappable
                | TypeProperty::Unwrappable
                | TypeProperty::TopEffect
                | TypeProperty::NoMoveAnimation
                | TypeProperty::Usable
                | TypeProperty::Corpse
                | TypeProperty::Blocking
                | TypeProperty::Unmovable
                | TypeProperty::Unpathable
                | TypeProperty::Takeable
                | TypeProperty::ForceUse
                | TypeProperty::MultiUse
                | TypeProperty::Translucent
                | TypeProperty::Walkable
                | TypeProperty::LookThrough
                | TypeProperty::Rotate => {}
                TypeProperty::Automap
                | TypeProperty::Lenshelp
                | TypeProperty::Write
                | TypeProperty::WriteOnce
                | TypeProperty::EquipmentSlot
                | TypeProperty::DefaultAction
                | TypeProperty::UnknownU16 => {
                    data.skip(2)?;
                }
                TypeProperty::Light => {
                    data.skip(4)?;
                }
                TypeProperty::MarketItem => {
                    /* category, trade-as, show-as */
                    data.skip(6)?;
                    data.skip_string()?;
                    /* vocation and level restrictions */
                    data.skip(4)?;
                }
                TypeProperty::EntryEndMarker => return Ok(()),
            }
        }
    }

    fn read_frame_group(
        &mut self,
        profile: &VersionProfile,
        sprites: &SpriteFile,
        data: &mut DataReader<'_>,
        group_index: usize,
        has_frame_groups: bool,
    ) -> Result<()> {
        let mut group = FrameGroup {
            active: true,
            ..FrameGroup::default()
        };
        let mut sprite_count = 1usize;

        group.size_x = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.size_x as usize;
        group.size_y = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.size_y as usize;

        group.render_size = if sprite_count > 1 {
            data.read_u8()?
        } else {
            /* Default to 1x1 tiles. */
            32
        };

        group.layer_count = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.layer_count as usize;

        group.x_div = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.x_div as usize;

        group.y_div = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.y_div as usize;

        group.z_div = if profile.features.type_z_div {
            data.read_in::<u8>(1, 255)?
        } else {
            1
        };
        sprite_count *= group.z_div as usize;

        group.frame_count = data.read_in::<u8>(1, 255)?;
        sprite_count *= group.frame_count as usize;

        self.properties.animated = group.frame_count > 1;

        if sprite_count > usize::from(u16::MAX) {
            return Err(Error::invalid_data(format!(
                "frame group of {sprite_count} sprites"
            )));
        }

        if self.properties.animated && profile.features.animation_phases {
            group.start_phase = data.read_u8()?;
            group.loop_count = data.read_u32()?;
            group.animation_type = data.read_u8()?;

            for _ in 0..group.frame_count {
                let minimum = data.read_u32()?;
                let maximum = data.read_u32()?;

                group.phases.push(SpritePhase { minimum, maximum });
            }
        }

        group.sprite_ids.reserve(sprite_count);

        for _ in 0..sprite_count {
            let sprite_id = if profile.features.sprite_index_u32 {
                data.read_u32()?
            } else {
                u32::from(data.read_u16()?)
            };

            /* Assertion. */
            let _ = sprites.get(sprite_id)?;

            group.sprite_ids.push(sprite_id);
        }

        /* Types whose idle and walking frames coincide simply omit the idle
         * group; mirror that for versions without frame groups too. */
        if has_frame_groups {
            if group_index == FRAME_GROUP_WALKING
                && (!self.frame_groups[FRAME_GROUP_IDLE].active
                    || self.frame_groups[FRAME_GROUP_IDLE].frame_count == 0)
            {
                self.frame_groups[FRAME_GROUP_IDLE] = group.clone();
            }

            self.frame_groups[group_index] = group;
        } else {
            self.frame_groups[FRAME_GROUP_WALKING] = group.clone();
            self.frame_groups[FRAME_GROUP_IDLE] = group;
        }

        Ok(())
    }
}

#[derive(Debug)]
struct TypeCategory {
    min_id: u16,
    max_id: u16,
    entities: HashMap<u16, EntityType>,
}

impl TypeCategory {
    fn read(
        profile: &VersionProfile,
        sprites: &SpriteFile,
        data: &mut DataReader<'_>,
        min_id: u16,
        max_id: u16,
        has_frame_groups: bool,
    ) -> Result<Self> {
        let mut entities = HashMap::with_capacity(usize::from(max_id.saturating_sub(min_id)) + 1);

        for id in min_id..=max_id {
            entities.insert(id, EntityType::read(profile, sprites, data, has_frame_groups)?);
        }

        Ok(Self {
            min_id,
            max_id,
            entities,
        })
    }

    fn get(&self, id: u16, kind: &'static str) -> Result<&EntityType> {
        self.entities.get(&id).ok_or_else(|| {
            Error::invalid_data(format!(
                "{kind} id {id} outside [{}, {}]",
                self.min_id, self.max_id
            ))
        })
    }
}

/// The entity-type file: items (ids from 100), outfits, effects, and
/// missiles (ids from 1), each a contiguous id range of records.
#[derive(Debug)]
pub struct TypeFile {
    signature: u32,

    items: TypeCategory,
    outfits: TypeCategory,
    effects: TypeCategory,
    missiles: TypeCategory,
}

impl TypeFile {
    pub fn load(
        profile: &VersionProfile,
        sprites: &SpriteFile,
        mut data: DataReader<'_>,
    ) -> Result<Self> {
        let signature = data.read_u32()?;

        let item_max = data.read_u16()?;
        let outfit_max = data.read_u16()?;
        let effect_max = data.read_u16()?;
        let missile_max = data.read_u16()?;

        let items = TypeCategory::read(profile, sprites, &mut data, 100, item_max, false)?;
        let outfits = TypeCategory::read(
            profile,
            sprites,
            &mut data,
            1,
            outfit_max,
            profile.features.frame_groups,
        )?;
        let effects = TypeCategory::read(profile, sprites, &mut data, 1, effect_max, false)?;
        let missiles = TypeCategory::read(profile, sprites, &mut data, 1, missile_max, false)?;

        tracing::debug!(
            signature,
            items = item_max,
            outfits = outfit_max,
            effects = effect_max,
            missiles = missile_max,
            "loaded entity-type file"
        );

        Ok(Self {
            signature,
            items,
            outfits,
            effects,
            missiles,
        })
    }

    pub fn signature(&self) -> u32 {
        self.signature
    }

    pub fn item_max_id(&self) -> u16 {
        self.items.max_id
    }

    pub fn get_item(&self, id: u16) -> Result<&EntityType> {
        self.items.get(id, "item")
    }

    pub fn get_outfit(&self, id: u16) -> Result<&EntityType> {
        self.outfits.get(id, "outfit")
    }

    pub fn get_effect(&self, id: u16) -> Result<&EntityType> {
        self.effects.get(id, "effect")
    }

    pub fn get_missile(&self, id: u16) -> Result<&EntityType> {
        self.missiles.get(id, "missile")
    }
}
