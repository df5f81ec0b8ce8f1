use crate::tables::TranslationTable;
use crate::{Error, Result};

/// A Tibia client version, e.g. `8.55` or `9.83.1` for preview builds.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct VersionTriplet {
    pub major: i32,
    pub minor: i32,
    pub preview: i32,
}

impl VersionTriplet {
    pub const fn new(major: i32, minor: i32, preview: i32) -> Self {
        Self {
            major,
            minor,
            preview,
        }
    }

    pub fn at_least(&self, major: i32, minor: i32) -> bool {
        self.at_least_preview(major, minor, 0)
    }

    pub fn at_least_preview(&self, major: i32, minor: i32, preview: i32) -> bool {
        *self >= VersionTriplet::new(major, minor, preview)
    }
}

impl std::fmt::Display for VersionTriplet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)?;

        if self.preview > 0 {
            write!(f, ".{}", self.preview)?;
        }

        Ok(())
    }
}

/// Attribute kinds of the entity-type file's property loop. The wire byte to
/// variant mapping is versioned; see [`VersionProfile::translate_type_property`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum TypeProperty {
    AnimateIdle,
    Automap,
    Blocking,
    Bottom,
    Clip,
    Container,
    Corpse,
    DefaultAction,
    DisplacementLegacy,
    Displacement,
    DontHide,
    EquipmentSlot,
    ForceUse,
    Ground,
    Hangable,
    Height,
    Horizontal,
    Lenshelp,
    Light,
    LiquidContainer,
    LiquidPool,
    LookThrough,
    MarketItem,
    MultiUse,
    NoMoveAnimation,
    RedrawNearbyTop,
    Rotate,
    Rune,
    Stackable,
    Takeable,
    TopEffect,
    Top,
    Translucent,
    UnknownU16,
    Unlookable,
    Unmovable,
    Unpathable,
    Unwrappable,
    Usable,
    Vertical,
    Walkable,
    Wrappable,
    WriteOnce,
    Write,

    EntryEndMarker,
}

/// Every message mode the protocol has ever carried, across both the speak
/// packet (`0xAA`) and the text-message packet (`0xB4`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum MessageMode {
    Say,
    Whisper,
    Yell,
    PrivateIn,
    PrivateOut,
    ChannelWhite,
    ChannelYellow,
    ChannelOrange,
    ChannelRed,
    ChannelAnonymousRed,
    ConsoleBlue,
    ConsoleOrange,
    ConsoleRed,
    Spell,
    NPCStart,
    NPCContinued,
    PlayerToNPC,
    Broadcast,
    GMToPlayer,
    PlayerToGM,
    Login,
    Admin,
    Game,
    Failure,
    Look,
    DamageDealt,
    DamageReceived,
    Healing,
    Experience,
    DamageReceivedOthers,
    HealingOthers,
    ExperienceOthers,
    Status,
    Loot,
    NPCTrade,
    Guild,
    PartyWhite,
    Party,
    MonsterSay,
    MonsterYell,
    Report,
    Hotkey,
    Tutorial,
    ThankYou,
    Market,
    Mana,
    Warning,
    RuleViolationChannel,
    RuleViolationAnswer,
    RuleViolationContinue,
}

/// Semantic fluid colours; the wire id to colour mapping is versioned.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
#[repr(u8)]
pub enum FluidColor {
    Empty = 0,
    Blue = 1,
    Red = 2,
    Brown = 3,
    Green = 4,
    Yellow = 5,
    White = 6,
    Purple = 7,
}

impl FluidColor {
    fn from_low_bits(value: u8) -> Self {
        match value % 8 {
            0 => FluidColor::Empty,
            1 => FluidColor::Blue,
            2 => FluidColor::Red,
            3 => FluidColor::Brown,
            4 => FluidColor::Green,
            5 => FluidColor::Yellow,
            6 => FluidColor::White,
            _ => FluidColor::Purple,
        }
    }
}

/// Protocol capabilities, one per individually-gated read in the parser.
///
/// Activation thresholds follow the observed behaviour of recorded streams.
/// Several gates in the 8.55 - 9.32 band are estimates carried over from the
/// reference corpus; see [`VersionProfile::new`].
#[derive(Clone, Copy, Default, Debug)]
#[allow(missing_docs)]
pub struct Protocol {
    pub add_object_stack_position: bool,
    pub bug_reporting: bool,
    pub cancel_attack_id: bool,
    pub capacity_u32: bool,
    pub channel_participants: bool,
    pub container_index_u16: bool,
    pub container_pagination: bool,
    pub creature_marks: bool,
    pub creature_speed_padding: bool,
    pub creature_types: bool,
    pub environmental_effects: bool,
    pub experience_bonus: bool,
    pub experience_u64: bool,
    pub expert_mode: bool,
    pub extended_death_dialog: bool,
    pub extended_vip_data: bool,
    pub icons_u16: bool,
    pub item_animation: bool,
    pub item_marks: bool,
    pub level_u16: bool,
    pub loyalty_bonus: bool,
    pub max_capacity: bool,
    pub message_effects: bool,
    pub mounts: bool,
    pub move_denied_direction: bool,
    pub npc_category: bool,
    pub npc_vendor_item_count_u16: bool,
    pub npc_vendor_name: bool,
    pub npc_vendor_weight: bool,
    pub null_objects: bool,
    pub offline_stamina: bool,
    pub outfit_addons: bool,
    pub outfit_count_u16: bool,
    pub outfit_names: bool,
    pub outfits_u16: bool,
    pub guild_party_channel_id: bool,
    pub passable_creatures: bool,
    pub passable_creature_update: bool,
    pub player_hunger: bool,
    pub player_money_u64: bool,
    pub player_speed: bool,
    pub premium_until: bool,
    pub preview_byte: bool,
    pub pvp_framing: bool,
    pub raw_effect_ids: bool,
    pub report_messages: bool,
    pub rune_charge_count: bool,
    pub shield_icon: bool,
    pub single_pvp_helper: bool,
    pub skill_bonuses: bool,
    pub skill_percentages: bool,
    pub skills_u16: bool,
    pub skills_unknown_padding: bool,
    pub skull_icon: bool,
    pub soul_points: bool,
    pub speaker_level: bool,
    pub speed_adjustment: bool,
    pub stamina: bool,
    pub text_edit_author_name: bool,
    pub text_edit_date: bool,
    pub text_edit_object: bool,
    pub tibiacast_bugged_initialization: bool,
    pub unfair_fight_reduction: bool,
    pub war_icon: bool,
}

/// Properties of the asset-file grammar, as opposed to the protocol.
#[derive(Clone, Copy, Debug)]
pub struct Features {
    pub capacity_divisor: u8,

    pub animation_phases: bool,
    pub frame_groups: bool,
    pub icon_bar: bool,
    pub modern_stacking: bool,
    pub sprite_index_u32: bool,
    pub type_z_div: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            capacity_divisor: 1,
            animation_phases: false,
            frame_groups: false,
            icon_bar: false,
            modern_stacking: false,
            sprite_index_u32: false,
            type_z_div: false,
        }
    }
}

/// Everything version-dependent that parsing needs: the capability flags and
/// the three wire translation tables. Immutable once constructed; share it
/// freely between the parser and the game state.
#[derive(Clone, Debug)]
pub struct VersionProfile {
    pub triplet: VersionTriplet,
    pub protocol: Protocol,
    pub features: Features,

    speak_modes: TranslationTable<MessageMode>,
    message_modes: TranslationTable<MessageMode>,
    type_properties: TranslationTable<TypeProperty>,
}

impl VersionProfile {
    pub fn new(triplet: VersionTriplet) -> Result<Self> {
        if !triplet.at_least(7, 11) {
            return Err(Error::not_supported(format!(
                "Tibia version {triplet} predates 7.11"
            )));
        }

        if triplet.at_least(8, 55) && !triplet.at_least(9, 33) {
            tracing::warn!(
                version = %triplet,
                "several protocol gates in the 8.55-9.32 band are estimates; \
                 malformed-looking streams may be misgated rather than corrupt"
            );
        }

        let mut profile = Self {
            triplet,
            protocol: Protocol::default(),
            features: Features::default(),
            speak_modes: TranslationTable::new(),
            message_modes: TranslationTable::new(),
            type_properties: TranslationTable::new(),
        };

        profile.init_type_properties();
        profile.init_message_modes();
        profile.init_speak_modes();
        profile.init_features();
        profile.init_protocol();

        Ok(profile)
    }

    pub fn at_least(&self, major: i32, minor: i32) -> bool {
        self.triplet.at_least(major, minor)
    }

    /// Maps a wire byte of the entity-type file onto an attribute kind.
    /// `255` is the record terminator in every version.
    pub fn translate_type_property(&self, index: u8) -> Result<TypeProperty> {
        if index == 255 {
            return Ok(TypeProperty::EntryEndMarker);
        }

        self.type_properties.get(index)
    }

    pub fn translate_speak_mode(&self, index: u8) -> Result<MessageMode> {
        self.speak_modes.get(index)
    }

    pub fn translate_message_mode(&self, index: u8) -> Result<MessageMode> {
        self.message_modes.get(index)
    }

    pub fn translate_fluid_color(&self, color: u8) -> Result<FluidColor> {
        const FLUID_MAP: [FluidColor; 18] = [
            FluidColor::Empty,
            FluidColor::Blue,
            FluidColor::Purple,
            FluidColor::Brown,
            FluidColor::Brown,
            FluidColor::Red,
            FluidColor::Green,
            FluidColor::Brown,
            FluidColor::Yellow,
            FluidColor::White,
            FluidColor::Purple,
            FluidColor::Red,
            FluidColor::Yellow,
            FluidColor::Brown,
            FluidColor::Yellow,
            FluidColor::White,
            FluidColor::Blue,
            FluidColor::Purple,
        ];

        if self.at_least(7, 80) {
            FLUID_MAP
                .get(usize::from(color))
                .copied()
                .ok_or_else(|| Error::invalid_data(format!("fluid id {color} out of range")))
        } else {
            Ok(FluidColor::from_low_bits(color))
        }
    }

    fn init_type_properties(&mut self) {
        use TypeProperty::*;

        let triplet = self.triplet;
        let table = &mut self.type_properties;

        /* 7.00 - 7.30, serving as the baseline. */
        table.insert(0, Ground, None);
        table.insert(1, Clip, None);
        table.insert(2, Bottom, None);
        table.insert(3, Container, None);
        table.insert(4, Stackable, None);
        table.insert(5, Usable, None);
        table.insert(6, ForceUse, None);
        table.insert(7, Write, None);
        table.insert(8, WriteOnce, None);
        table.insert(9, LiquidContainer, None);
        table.insert(10, LiquidPool, None);
        table.insert(11, Blocking, None);
        table.insert(12, Unmovable, None);
        table.insert(13, Blocking, None);
        table.insert(14, Unpathable, None);
        table.insert(15, Takeable, None);
        table.insert(16, Light, None);
        table.insert(17, DontHide, None);
        table.insert(18, Blocking, None);
        table.insert(19, Height, None);
        table.insert(20, DisplacementLegacy, None);
        table.gap(21, None);
        table.insert(22, Automap, None);
        table.insert(23, Rotate, None);
        table.insert(24, Corpse, None);
        table.insert(25, Hangable, None);
        table.insert(26, UnknownU16, None);
        table.insert(27, Horizontal, None);
        table.insert(28, AnimateIdle, None);
        table.insert(29, Lenshelp, None);

        if triplet.at_least(7, 40) {
            table.replace(26, Vertical, Some(UnknownU16));
        }

        if triplet.at_least(7, 55) {
            table.insert(3, Top, Some(Container));

            /* ForceUse and Usable changed places. */
            table.replace(6, ForceUse, Some(Usable));
            table.replace(7, Usable, Some(ForceUse));

            /* Most of the remaining fields were reordered wholesale. */
            table.replace(17, Hangable, Some(Light));
            table.replace(18, Vertical, Some(DontHide));
            table.replace(19, Horizontal, Some(Blocking));
            table.replace(20, Rotate, Some(Height));
            table.replace(21, Light, Some(DisplacementLegacy));
            table.replace(22, DontHide, None);
            table.replace(23, Translucent, Some(Automap));
            table.replace(24, Displacement, Some(Rotate));
            table.replace(25, Height, Some(Corpse));
            table.replace(26, RedrawNearbyTop, Some(Hangable));
            table.replace(27, AnimateIdle, Some(Vertical));
            table.replace(28, Automap, Some(Horizontal));
            table.replace(29, Lenshelp, Some(AnimateIdle));
            table.insert(30, Walkable, Some(Lenshelp));
        }

        if triplet.at_least(7, 80) {
            table.insert(8, Rune, Some(Write));
            table.insert(32, LookThrough, Some(Lenshelp));
        }

        if triplet.at_least(8, 60) {
            table.remove(8, Some(Rune));
        }

        /* The exact versions these first appear in are not pinned down;
         * 9.80 matches every recording seen so far. */
        if triplet.at_least(9, 80) {
            table.insert(33, MarketItem, None);
            table.insert(34, DefaultAction, None);
            table.insert(35, Wrappable, None);
            table.insert(36, TopEffect, None);
        }

        if triplet.at_least(10, 10) {
            table.insert(16, NoMoveAnimation, Some(Takeable));
        }
    }

    fn init_unified_message_modes(triplet: VersionTriplet, table: &mut TranslationTable<MessageMode>) {
        use MessageMode::*;

        table.insert(1, Say, None);
        table.insert(2, Whisper, None);
        table.insert(3, Yell, None);
        table.insert(4, PrivateIn, None);
        table.insert(5, PrivateOut, None);
        table.insert(6, ChannelWhite, None);
        table.insert(7, ChannelWhite, None);
        table.insert(8, ChannelWhite, None);
        table.insert(9, Spell, None);
        table.insert(10, NPCStart, None);
        table.insert(11, PlayerToNPC, None);
        table.insert(12, Broadcast, None);
        table.insert(13, ChannelRed, None);
        table.insert(14, GMToPlayer, None);
        table.insert(15, PlayerToGM, None);
        table.insert(16, Login, None);
        table.insert(17, Warning, None);
        table.insert(18, Game, None);
        table.insert(19, Failure, None);
        table.insert(20, Look, None);
        table.insert(21, DamageDealt, None);
        table.insert(22, DamageReceived, None);
        table.insert(23, Healing, None);
        table.insert(24, Experience, None);
        table.insert(25, DamageReceivedOthers, None);
        table.insert(26, HealingOthers, None);
        table.insert(27, ExperienceOthers, None);
        table.insert(28, Status, None);
        table.insert(29, Loot, None);
        table.insert(30, NPCTrade, None);
        table.insert(31, Guild, None);
        table.insert(32, PartyWhite, None);
        table.insert(33, Party, None);
        table.insert(34, MonsterSay, None);
        table.insert(35, MonsterYell, None);
        table.insert(36, Report, None);
        table.insert(37, Hotkey, None);
        table.insert(38, Tutorial, None);
        table.insert(39, ThankYou, None);
        table.insert(40, Market, None);
        table.insert(41, Mana, None);

        /* The console-only NPC mode lands at 11, pushing player-to-NPC and
         * everything after it up a slot. */
        if triplet.at_least(10, 36) {
            table.insert(11, NPCContinued, Some(PlayerToNPC));
        }

        if triplet.at_least(10, 54) {
            table.insert(29, Failure, Some(Status));
        }
    }

    fn init_message_modes(&mut self) {
        use MessageMode::*;

        let triplet = self.triplet;
        let table = &mut self.message_modes;

        if triplet.at_least(9, 0) {
            Self::init_unified_message_modes(triplet, table);
            return;
        }

        /* 7.11, serving as the baseline. */
        table.insert(14, ConsoleOrange, None);
        table.insert(15, Broadcast, None);
        table.insert(16, Game, None);
        table.insert(17, Login, None);
        table.insert(18, Status, None);
        table.insert(19, Look, None);
        table.insert(20, Failure, None);

        if triplet.at_least(7, 20) {
            /* Dummy entry; the right slot for this one is unknown. */
            table.gap(0, None);

            table.insert(17, Warning, Some(Game));
        }

        if triplet.at_least(7, 24) {
            /* Dummy entry; the right slot for this one is unknown. */
            table.gap(0, None);
        }

        if triplet.at_least(8, 20) {
            table.insert(17, ConsoleRed, Some(Broadcast));
            table.gap(18, Some(Broadcast));
        }

        if triplet.at_least(8, 40) {
            table.insert(20, ConsoleOrange, Some(Warning));
        }

        /* TibiaCamTV moved their slogan to Warning in 8.60; keep that in
         * mind when adding new versions. */

        if triplet.at_least(8, 61) {
            table.remove(0, None);
            table.remove(0, None);
            table.remove(0, None);
            table.remove(0, None);
            table.remove(0, None);
            table.remove(0, None);
            table.insert(22, Warning, None);
        }
    }

    fn init_speak_modes(&mut self) {
        use MessageMode::*;

        let triplet = self.triplet;
        let table = &mut self.speak_modes;

        if triplet.at_least(9, 0) {
            Self::init_unified_message_modes(triplet, table);
            return;
        }

        /* 7.11, serving as the baseline. */
        table.insert(1, Say, None);
        table.insert(2, Whisper, None);
        table.insert(3, Yell, None);
        table.insert(4, PrivateIn, None);
        table.insert(5, ChannelYellow, None);
        table.insert(6, RuleViolationChannel, None);
        table.insert(7, RuleViolationAnswer, None);
        table.insert(8, RuleViolationContinue, None);
        table.insert(9, Broadcast, None);
        table.insert(10, ChannelRed, None);
        table.insert(11, GMToPlayer, None);
        table.insert(12, ChannelAnonymousRed, None);
        table.insert(13, MonsterSay, None);
        table.insert(14, MonsterYell, None);

        if triplet.at_least(7, 20) {
            table.insert(12, ChannelOrange, Some(ChannelAnonymousRed));
            table.gap(13, Some(ChannelAnonymousRed));
        }

        if triplet.at_least(7, 23) {
            table.gap(15, Some(MonsterSay));
        }

        if triplet.at_least(8, 20) {
            table.insert(4, PlayerToNPC, Some(PrivateIn));
            table.insert(5, NPCStart, Some(PrivateIn));
        }

        if triplet.at_least(8, 40) {
            table.insert(8, ChannelWhite, Some(RuleViolationChannel));
        }

        if triplet.at_least(8, 61) {
            table.remove(9, Some(RuleViolationChannel));
            table.remove(9, Some(RuleViolationAnswer));
            table.remove(9, Some(RuleViolationContinue));

            table.remove(13, None);
            table.remove(13, Some(ChannelAnonymousRed));
            table.remove(13, None);
        }
    }

    fn init_features(&mut self) {
        let triplet = self.triplet;
        let features = &mut self.features;

        if triplet.at_least(7, 50) {
            features.icon_bar = true;
        }

        if triplet.at_least(7, 55) {
            features.type_z_div = true;
        }

        if triplet.at_least(8, 30) {
            features.capacity_divisor = 100;
        }

        if triplet.at_least(8, 53) {
            features.modern_stacking = true;
        }

        if triplet.at_least(9, 6) {
            features.sprite_index_u32 = true;
        }

        if triplet.at_least(10, 50) {
            features.animation_phases = true;
        }

        if triplet.at_least(10, 57) {
            features.frame_groups = true;
        }
    }

    fn init_protocol(&mut self) {
        let triplet = self.triplet;
        let protocol = &mut self.protocol;

        if triplet.at_least(7, 20) {
            protocol.bug_reporting = true;
            protocol.skull_icon = true;
        }

        if triplet.at_least(7, 24) {
            protocol.shield_icon = true;
        }

        if triplet.at_least(7, 40) {
            protocol.move_denied_direction = true;
            protocol.skill_percentages = true;
        }

        if triplet.at_least(7, 50) {
            protocol.soul_points = true;
        }

        if triplet.at_least(7, 55) {
            protocol.raw_effect_ids = true;
        }

        if triplet.at_least(7, 60) {
            protocol.text_edit_author_name = true;
            protocol.level_u16 = true;
        }

        if triplet.at_least(7, 70) {
            protocol.report_messages = true;
            protocol.outfits_u16 = true;
        }

        if triplet.at_least(7, 80) {
            protocol.rune_charge_count = true;
            protocol.outfit_addons = true;
            protocol.stamina = true;
            protocol.speaker_level = true;
            protocol.icons_u16 = true;
        }

        if triplet.at_least(7, 90) {
            protocol.text_edit_date = true;
            protocol.outfit_names = true;
        }

        if triplet.at_least(8, 30) {
            protocol.npc_vendor_weight = true;
            protocol.capacity_u32 = true;
        }

        if triplet.at_least(8, 41) {
            protocol.add_object_stack_position = true;
        }

        if triplet.at_least(8, 42) {
            protocol.text_edit_object = true;
        }

        if triplet.at_least(8, 53) {
            protocol.passable_creatures = true;
        }

        if triplet.at_least(8, 54) {
            protocol.war_icon = true;
        }

        if triplet.at_least(8, 60) {
            protocol.cancel_attack_id = true;
        }

        if triplet.at_least(8, 70) {
            protocol.mounts = true;
        }

        /* HAZY: catch-all for properties of unknown introduction, placed at
         * 9.0 to get 8.55 rolling. Any of these may belong anywhere between
         * 8.55 and 9.32. */
        if triplet.at_least(9, 0) {
            protocol.cancel_attack_id = true;
            protocol.environmental_effects = true;
            protocol.max_capacity = true;
            protocol.experience_u64 = true;
            protocol.player_speed = true;
            protocol.player_hunger = true;
            protocol.item_animation = true;
            protocol.npc_vendor_name = true;
            protocol.message_effects = true;
            protocol.channel_participants = true;

            protocol.speed_adjustment = true;
            protocol.creature_types = true;
            protocol.skill_bonuses = true;
        }

        if triplet.at_least(9, 32) {
            protocol.npc_vendor_item_count_u16 = true;
        }

        if triplet.at_least(9, 54) {
            protocol.offline_stamina = true;
            protocol.passable_creature_update = true;
        }

        if triplet.at_least(9, 62) {
            protocol.extended_vip_data = true;
        }

        if triplet.at_least(9, 72) {
            protocol.player_money_u64 = true;
            protocol.extended_death_dialog = true;
        }

        if triplet.at_least(9, 83) {
            protocol.container_index_u16 = true;
            protocol.null_objects = true;
        }

        if triplet.at_least_preview(9, 83, 1) {
            protocol.preview_byte = true;
        }

        if triplet.at_least(9, 84) {
            protocol.preview_byte = true;
            protocol.container_pagination = true;
        }

        if triplet.at_least_preview(9, 85, 1) {
            protocol.creature_marks = true;
            protocol.item_marks = true;
        }

        if triplet.at_least(10, 36) {
            protocol.npc_category = true;
            protocol.single_pvp_helper = true;
            protocol.loyalty_bonus = true;
        }

        if triplet.at_least(10, 37) {
            protocol.premium_until = true;
        }

        if triplet.at_least_preview(10, 52, 1) {
            protocol.pvp_framing = true;
        }

        if triplet.at_least_preview(10, 53, 1) {
            protocol.experience_bonus = true;
        }

        if triplet.at_least(10, 55) {
            protocol.unfair_fight_reduction = true;
        }

        if triplet.at_least(10, 58) {
            protocol.expert_mode = true;
        }

        if triplet.at_least(10, 59) {
            protocol.creature_speed_padding = true;
        }

        if triplet.at_least(10, 65) {
            protocol.guild_party_channel_id = true;
        }

        if triplet.at_least(10, 95) {
            protocol.skills_unknown_padding = true;

            /* Also a guess. */
            protocol.outfit_count_u16 = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(major: i32, minor: i32) -> VersionProfile {
        VersionProfile::new(VersionTriplet::new(major, minor, 0)).unwrap()
    }

    #[test]
    fn pre_711_is_not_supported() {
        let err = VersionProfile::new(VersionTriplet::new(7, 1, 0)).unwrap_err();
        assert!(matches!(err, Error::NotSupported { .. }));
    }

    #[test]
    fn type_property_reordering_at_755() {
        assert_eq!(
            profile(7, 40).translate_type_property(20).unwrap(),
            TypeProperty::DisplacementLegacy
        );
        assert_eq!(
            profile(7, 55).translate_type_property(20).unwrap(),
            TypeProperty::Height
        );
    }

    #[test]
    fn rune_property_comes_and_goes() {
        assert_eq!(
            profile(7, 80).translate_type_property(8).unwrap(),
            TypeProperty::Rune
        );
        assert_eq!(
            profile(8, 60).translate_type_property(8).unwrap(),
            TypeProperty::Write
        );
    }

    #[test]
    fn terminator_is_version_independent() {
        assert_eq!(
            profile(7, 11).translate_type_property(255).unwrap(),
            TypeProperty::EntryEndMarker
        );
        assert_eq!(
            profile(10, 98).translate_type_property(255).unwrap(),
            TypeProperty::EntryEndMarker
        );
    }

    #[test]
    fn legacy_message_mode_warning_at_861() {
        assert_eq!(
            profile(8, 61).translate_message_mode(22).unwrap(),
            MessageMode::Warning
        );
    }

    #[test]
    fn unified_message_table_at_900() {
        let profile = profile(9, 0);

        assert_eq!(
            profile.translate_message_mode(1).unwrap(),
            MessageMode::Say
        );
        assert_eq!(
            profile.translate_speak_mode(1).unwrap(),
            MessageMode::Say
        );
        assert_eq!(
            profile.translate_message_mode(21).unwrap(),
            MessageMode::DamageDealt
        );
    }

    #[test]
    fn npc_continued_inserted_at_1036() {
        assert_eq!(
            profile(10, 36).translate_speak_mode(11).unwrap(),
            MessageMode::NPCContinued
        );
        assert_eq!(
            profile(10, 36).translate_speak_mode(12).unwrap(),
            MessageMode::PlayerToNPC
        );
    }

    #[test]
    fn speak_modes_before_unification() {
        assert_eq!(
            profile(8, 20).translate_speak_mode(4).unwrap(),
            MessageMode::PlayerToNPC
        );
        assert_eq!(
            profile(8, 20).translate_speak_mode(6).unwrap(),
            MessageMode::PrivateIn
        );
    }

    #[test]
    fn fluid_translation() {
        assert_eq!(
            profile(7, 40).translate_fluid_color(10).unwrap(),
            FluidColor::Red
        );
        assert_eq!(
            profile(7, 80).translate_fluid_color(10).unwrap(),
            FluidColor::Purple
        );
        assert!(profile(7, 80).translate_fluid_color(18).is_err());
    }

    #[test]
    fn preview_gated_flags() {
        assert!(!profile(9, 83).protocol.preview_byte);
        assert!(
            VersionProfile::new(VersionTriplet::new(9, 83, 1))
                .unwrap()
                .protocol
                .preview_byte
        );
        assert!(profile(9, 84).protocol.preview_byte);
    }

    #[test]
    fn feature_thresholds() {
        assert!(!profile(8, 52).features.modern_stacking);
        assert!(profile(8, 53).features.modern_stacking);
        assert_eq!(profile(8, 29).features.capacity_divisor, 1);
        assert_eq!(profile(8, 30).features.capacity_divisor, 100);
        assert!(profile(10, 57).features.frame_groups);
    }
}
