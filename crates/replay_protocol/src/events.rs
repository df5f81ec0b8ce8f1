use replay_core::{MessageMode, Position};

use crate::enums::{
    CharacterSkull, CreatureType, Direction, InventorySlot, NPCCategory, PartyShield, WarIcon,
};

/// An item as it appears on a tile, in a container, or in the inventory.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Item {
    pub id: u16,
    /// Overlay colour; 255 when the version has no item marks.
    pub mark: u8,
    /// Stack count, fluid colour, or rune charges depending on the item's
    /// type flags. Defaults to 1 so items that became stackable in later
    /// versions render sanely.
    pub extra: u8,
    pub animation: u8,
}

/// One slot of a tile stack or container page.
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub enum Object {
    /// The 9.83+ null object, and cleared slots.
    #[default]
    None,
    /// Creatures are referenced by id only; the creature itself lives in
    /// the game state's creature map.
    Creature { id: u32 },
    Item(Item),
}

impl Object {
    pub fn is_creature(&self) -> bool {
        matches!(self, Object::Creature { .. })
    }

    pub fn as_item(&self) -> Option<&Item> {
        match self {
            Object::Item(item) => Some(item),
            _ => None,
        }
    }
}

/// A creature's visual descriptor: either an outfit type with colours and
/// addons, or an item worn as the outfit (id 0 + item id 0 is invisible).
#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Appearance {
    pub id: u16,
    pub head_color: u8,
    pub primary_color: u8,
    pub secondary_color: u8,
    pub detail_color: u8,
    pub addons: u8,
    pub mount_id: u16,
    pub item: Item,
}

#[derive(Clone, Copy, Default, PartialEq, Eq, Debug)]
pub struct Skill {
    pub effective: u16,
    pub actual: u16,
    pub percent: u8,
}

pub const SKILL_COUNT: usize = 7;

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Channel {
    pub id: u16,
    pub name: String,
}

/// Everything the parser can tell the game state. One closed union for the
/// whole protocol; reducers dispatch on the variant.
#[derive(Clone, PartialEq, Debug)]
pub enum Event {
    WorldInitialized {
        player_id: u32,
        beat_duration: u16,
        speed_a: f64,
        speed_b: f64,
        speed_c: f64,
        allow_bug_reports: bool,
        pvp_framing: bool,
        expert_mode: bool,
    },
    AmbientLightChanged {
        intensity: u8,
        color: u8,
    },
    TileUpdated {
        position: Position,
        objects: Vec<Object>,
    },
    TileObjectAdded {
        tile_position: Position,
        stack_position: u8,
        object: Object,
    },
    TileObjectTransformed {
        tile_position: Position,
        stack_position: u8,
        object: Object,
    },
    TileObjectRemoved {
        tile_position: Position,
        stack_position: u8,
    },
    CreatureMoved {
        /// Only known when the packet names the creature by id; moves by
        /// tile position resolve the id from the source tile.
        creature_id: u32,
        from: Position,
        stack_position: u8,
        to: Position,
    },
    CreatureRemoved {
        creature_id: u32,
    },
    CreatureSeen {
        creature_id: u32,
        kind: CreatureType,
        name: String,
        health: u8,
        heading: Direction,
        outfit: Appearance,
        light_intensity: u8,
        light_color: u8,
        speed: u16,
        skull: CharacterSkull,
        shield: PartyShield,
        war: WarIcon,
        npc_category: NPCCategory,
        mark: u8,
        mark_is_permanent: bool,
        guild_members_online: u16,
        impassable: bool,
    },
    CreatureHealthUpdated {
        creature_id: u32,
        health: u8,
    },
    CreatureHeadingUpdated {
        creature_id: u32,
        heading: Direction,
    },
    CreatureLightUpdated {
        creature_id: u32,
        intensity: u8,
        color: u8,
    },
    CreatureOutfitUpdated {
        creature_id: u32,
        outfit: Appearance,
    },
    CreatureSpeedUpdated {
        creature_id: u32,
        speed: u16,
    },
    CreatureSkullUpdated {
        creature_id: u32,
        skull: CharacterSkull,
    },
    CreatureShieldUpdated {
        creature_id: u32,
        shield: PartyShield,
    },
    CreatureImpassableUpdated {
        creature_id: u32,
        impassable: bool,
    },
    CreaturePvPHelpersUpdated {
        creature_id: u32,
        mark_is_permanent: bool,
        mark: u8,
    },
    CreatureGuildMembersUpdated {
        creature_id: u32,
        guild_members_online: u16,
    },
    CreatureTypeUpdated {
        creature_id: u32,
        kind: CreatureType,
    },
    CreatureNPCCategoryUpdated {
        creature_id: u32,
        category: NPCCategory,
    },
    PlayerMoved {
        position: Position,
    },
    PlayerInventoryUpdated {
        slot: InventorySlot,
        item: Object,
    },
    PlayerBlessingsUpdated {
        blessings: u16,
    },
    PlayerHotkeyPresetUpdated {
        hotkey_preset: u32,
    },
    PlayerDataBasicUpdated {
        is_premium: bool,
        premium_until: u32,
        vocation: u8,
        spells: Vec<u8>,
    },
    PlayerDataUpdated {
        health: i16,
        max_health: i16,
        capacity: u32,
        max_capacity: u32,
        experience: u64,
        level: u16,
        level_percent: u8,
        experience_bonus: f64,
        mana: i16,
        max_mana: i16,
        magic_level: u8,
        magic_level_base: u8,
        magic_level_percent: u8,
        soul_points: u8,
        stamina: u16,
        speed: u16,
        fed: u16,
        offline_stamina: u16,
    },
    PlayerSkillsUpdated {
        skills: [Skill; SKILL_COUNT],
    },
    PlayerIconsUpdated {
        icons: u16,
    },
    PlayerTacticsUpdated {
        attack_mode: u8,
        chase_mode: u8,
        secure_mode: u8,
        pvp_mode: u8,
    },
    PvPSituationsChanged {
        open_situations: u8,
    },
    CreatureSpoke {
        message_id: u32,
        mode: MessageMode,
        author_name: String,
        author_level: u16,
        message: String,
    },
    CreatureSpokeOnMap {
        message_id: u32,
        mode: MessageMode,
        author_name: String,
        author_level: u16,
        position: Position,
        message: String,
    },
    CreatureSpokeInChannel {
        message_id: u32,
        mode: MessageMode,
        author_name: String,
        author_level: u16,
        channel_id: u16,
        message: String,
    },
    ChannelListUpdated {
        channels: Vec<Channel>,
    },
    ChannelOpened {
        id: u16,
        name: String,
        participants: Vec<String>,
        invitees: Vec<String>,
    },
    ChannelClosed {
        id: u16,
    },
    PrivateConversationOpened {
        name: String,
    },
    ContainerOpened {
        container_id: u8,
        item_id: u16,
        mark: u8,
        animation: u8,
        name: String,
        slots_per_page: u8,
        has_parent: bool,
        drag_and_drop: bool,
        pagination: bool,
        total_objects: u16,
        start_index: u16,
        items: Vec<Object>,
    },
    ContainerClosed {
        container_id: u8,
    },
    ContainerAddedItem {
        container_id: u8,
        container_index: u16,
        item: Object,
    },
    ContainerTransformedItem {
        container_id: u8,
        container_index: u16,
        item: Object,
    },
    ContainerRemovedItem {
        container_id: u8,
        container_index: u16,
        /// The item sliding onto the page's last slot, when the server
        /// backfills paginated containers.
        backfill: Object,
    },
    NumberEffectPopped {
        position: Position,
        color: u8,
        value: u32,
    },
    GraphicalEffectPopped {
        position: Position,
        id: u16,
    },
    MissileFired {
        origin: Position,
        target: Position,
        id: u16,
    },
    StatusMessageReceived {
        mode: MessageMode,
        message: String,
    },
    StatusMessageReceivedInChannel {
        mode: MessageMode,
        channel_id: u16,
        message: String,
    },
}

impl Event {
    /// The stable tag used by the serializer.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::WorldInitialized { .. } => "WorldInitialized",
            Event::AmbientLightChanged { .. } => "AmbientLightChanged",
            Event::TileUpdated { .. } => "TileUpdated",
            Event::TileObjectAdded { .. } => "TileObjectAdded",
            Event::TileObjectTransformed { .. } => "TileObjectTransformed",
            Event::TileObjectRemoved { .. } => "TileObjectRemoved",
            Event::CreatureMoved { .. } => "CreatureMoved",
            Event::CreatureRemoved { .. } => "CreatureRemoved",
            Event::CreatureSeen { .. } => "CreatureSeen",
            Event::CreatureHealthUpdated { .. } => "CreatureHealthUpdated",
            Event::CreatureHeadingUpdated { .. } => "CreatureHeadingUpdated",
            Event::CreatureLightUpdated { .. } => "CreatureLightUpdated",
            Event::CreatureOutfitUpdated { .. } => "CreatureOutfitUpdated",
            Event::CreatureSpeedUpdated { .. } => "CreatureSpeedUpdated",
            Event::CreatureSkullUpdated { .. } => "CreatureSkullUpdated",
            Event::CreatureShieldUpdated { .. } => "CreatureShieldUpdated",
            Event::CreatureImpassableUpdated { .. } => "CreatureImpassableUpdated",
            Event::CreaturePvPHelpersUpdated { .. } => "CreaturePvPHelpersUpdated",
            Event::CreatureGuildMembersUpdated { .. } => "CreatureGuildMembersUpdated",
            Event::CreatureTypeUpdated { .. } => "CreatureTypeUpdated",
            Event::CreatureNPCCategoryUpdated { .. } => "CreatureNPCCategoryUpdated",
            Event::PlayerMoved { .. } => "PlayerMoved",
            Event::PlayerInventoryUpdated { .. } => "PlayerInventoryUpdated",
            Event::PlayerBlessingsUpdated { .. } => "PlayerBlessingsUpdated",
            Event::PlayerHotkeyPresetUpdated { .. } => "PlayerHotkeyPresetUpdated",
            Event::PlayerDataBasicUpdated { .. } => "PlayerDataBasicUpdated",
            Event::PlayerDataUpdated { .. } => "PlayerDataUpdated",
            Event::PlayerSkillsUpdated { .. } => "PlayerSkillsUpdated",
            Event::PlayerIconsUpdated { .. } => "PlayerIconsUpdated",
            Event::PlayerTacticsUpdated { .. } => "PlayerTacticsUpdated",
            Event::PvPSituationsChanged { .. } => "PvPSituationsChanged",
            Event::CreatureSpoke { .. } => "CreatureSpoke",
            Event::CreatureSpokeOnMap { .. } => "CreatureSpokeOnMap",
            Event::CreatureSpokeInChannel { .. } => "CreatureSpokeInChannel",
            Event::ChannelListUpdated { .. } => "ChannelListUpdated",
            Event::ChannelOpened { .. } => "ChannelOpened",
            Event::ChannelClosed { .. } => "ChannelClosed",
            Event::PrivateConversationOpened { .. } => "PrivateConversationOpened",
            Event::ContainerOpened { .. } => "ContainerOpened",
            Event::ContainerClosed { .. } => "ContainerClosed",
            Event::ContainerAddedItem { .. } => "ContainerAddedItem",
            Event::ContainerTransformedItem { .. } => "ContainerTransformedItem",
            Event::ContainerRemovedItem { .. } => "ContainerRemovedItem",
            Event::NumberEffectPopped { .. } => "NumberEffectPopped",
            Event::GraphicalEffectPopped { .. } => "GraphicalEffectPopped",
            Event::MissileFired { .. } => "MissileFired",
            Event::StatusMessageReceived { .. } => "StatusMessageReceived",
            Event::StatusMessageReceivedInChannel { .. } => "StatusMessageReceivedInChannel",
        }
    }
}
