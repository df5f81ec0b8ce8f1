use std::collections::HashMap;

use replay_assets::TypeCatalogue;
use replay_core::{Position, VersionProfile};
use replay_protocol::{CreatureType, Direction, Event, Object, STACK_POSITION_TOP};

use crate::container::Container;
use crate::creature::{Creature, MovementInformation};
use crate::map::Map;
use crate::messages::MessageList;
use crate::player::PlayerData;

/// Capacity of the missile ring; the oldest entry is overwritten.
pub const MAX_MISSILES: usize = 16;

#[derive(Clone, Copy, Default, Debug)]
pub struct Missile {
    pub id: u16,
    pub origin: Position,
    pub target: Position,
    pub start_tick: u32,
}

/// The complete visible game state at one playback tick.
///
/// Events are applied in frame order; application never fails since the
/// parser already validated the byte level. Logical mismatches (a move from
/// a tile that holds no creature, an update for a container that was closed)
/// leave the state untouched.
pub struct GameState<'a> {
    profile: &'a VersionProfile,
    catalogue: &'a TypeCatalogue,

    pub current_tick: u32,

    /// Per-recording walk-speed curve parameters from the initialization
    /// packet, used when the profile has speed adjustment.
    pub speed_a: f64,
    pub speed_b: f64,
    pub speed_c: f64,

    pub player: PlayerData,
    pub position: Position,

    pub map: Map,
    pub creatures: HashMap<u32, Creature>,
    pub containers: HashMap<u8, Container>,
    pub channels: HashMap<u16, String>,
    pub messages: MessageList,

    missiles: [Missile; MAX_MISSILES],
    missile_index: usize,
}

impl<'a> GameState<'a> {
    pub fn new(profile: &'a VersionProfile, catalogue: &'a TypeCatalogue) -> Self {
        Self {
            profile,
            catalogue,
            current_tick: 0,
            speed_a: 0.0,
            speed_b: 0.0,
            speed_c: 0.0,
            player: PlayerData::default(),
            position: Position::default(),
            map: Map::new(),
            creatures: HashMap::new(),
            containers: HashMap::new(),
            channels: HashMap::new(),
            messages: MessageList::default(),
            missiles: Default::default(),
            missile_index: 0,
        }
    }

    pub fn profile(&self) -> &'a VersionProfile {
        self.profile
    }

    pub fn catalogue(&self) -> &'a TypeCatalogue {
        self.catalogue
    }

    pub fn missiles(&self) -> &[Missile] {
        &self.missiles
    }

    /// Rewinds to the pre-login state, keeping the shared profile and
    /// catalogue. Backward seeks re-apply frames from the start.
    pub fn reset(&mut self) {
        self.current_tick = 0;
        self.speed_a = 0.0;
        self.speed_b = 0.0;
        self.speed_c = 0.0;
        self.player = PlayerData::default();
        self.position = Position::default();
        self.map.clear();
        self.creatures.clear();
        self.containers.clear();
        self.channels.clear();
        self.messages.clear();
        self.missiles = Default::default();
        self.missile_index = 0;
    }

    /// Moves playback time forward (or backward after a reset), expiring
    /// messages as it goes.
    pub fn advance_to(&mut self, tick: u32) {
        self.current_tick = tick;
        self.messages.prune(tick);
    }

    fn walk_duration(&self, creature_speed: u16, target: Position) -> u32 {
        let ground_speed = match self.map.tile(target.x, target.y, target.z).objects().first() {
            Some(Object::Item(item)) => match self.catalogue.get_item(item.id) {
                Ok(kind) if kind.properties.stack_priority == 0 => {
                    u32::from(kind.properties.speed)
                }
                _ => return 0,
            },
            _ => return 0,
        };

        let walk_speed = if self.profile.protocol.speed_adjustment {
            if f64::from(creature_speed) >= -self.speed_b {
                let adjusted = self.speed_a * (f64::from(creature_speed) + self.speed_b).ln()
                    + self.speed_c;

                (adjusted as u32).max(1)
            } else {
                1
            }
        } else {
            u32::from(creature_speed).max(1)
        };

        ground_speed * 1000 / walk_speed
    }

    fn apply_creature_moved(
        &mut self,
        mut creature_id: u32,
        from: Position,
        stack_position: u8,
        to: Position,
    ) {
        let modern = self.profile.features.modern_stacking;

        if !from.is_nowhere() {
            let tile = self.map.tile_mut(from.x, from.y, from.z);

            match tile.object(stack_position, modern) {
                Some(&Object::Creature { id }) => creature_id = id,
                _ => return,
            }

            tile.remove_object(stack_position, modern);
        }

        if let Some(creature) = self.creatures.get_mut(&creature_id) {
            let dx = i32::from(to.x) - i32::from(from.x);
            let dy = i32::from(to.y) - i32::from(from.y);
            let dz = i32::from(to.z) - i32::from(from.z);

            if dy < 0 {
                creature.heading = Direction::North;
            } else if dy > 0 {
                creature.heading = Direction::South;
            }

            if dx < 0 {
                creature.heading = Direction::West;
            } else if dx > 0 {
                creature.heading = Direction::East;
            }

            creature.movement = MovementInformation {
                origin: from,
                target: to,
                walk_start_tick: 0,
                walk_end_tick: 0,
            };

            if !from.is_nowhere() && dz == 0 && dx.abs() <= 1 && dy.abs() <= 1 {
                let duration = self.walk_duration(
                    self.creatures[&creature_id].speed,
                    to,
                );

                let creature = self.creatures.get_mut(&creature_id).unwrap();
                creature.movement.walk_start_tick = self.current_tick;
                creature.movement.walk_end_tick = self.current_tick + duration;
            }

            /* Floor changes and teleports stay instant: both ticks zero. */
        }

        let object = Object::Creature { id: creature_id };
        let catalogue = self.catalogue;
        self.map
            .tile_mut(to.x, to.y, to.z)
            .insert_object(object, STACK_POSITION_TOP, modern, move |object| {
                stack_priority(catalogue, object)
            });
    }

    pub fn apply(&mut self, event: &Event) {
        match event {
            Event::WorldInitialized {
                player_id,
                beat_duration,
                speed_a,
                speed_b,
                speed_c,
                allow_bug_reports,
                ..
            } => {
                self.player.id = *player_id;
                self.player.beat_duration = *beat_duration;
                self.player.allow_bug_reports = *allow_bug_reports;
                self.speed_a = *speed_a;
                self.speed_b = *speed_b;
                self.speed_c = *speed_c;
            }
            Event::AmbientLightChanged { intensity, color } => {
                self.map.light_intensity = *intensity;
                self.map.light_color = *color;
            }
            Event::TileUpdated { position, objects } => {
                let tile = self.map.tile_mut(position.x, position.y, position.z);

                tile.clear();
                tile.set_objects(objects);
            }
            Event::TileObjectAdded {
                tile_position,
                stack_position,
                object,
            } => {
                let modern = self.profile.features.modern_stacking;
                let catalogue = self.catalogue;

                self.map
                    .tile_mut(tile_position.x, tile_position.y, tile_position.z)
                    .insert_object(*object, *stack_position, modern, move |object| {
                        stack_priority(catalogue, object)
                    });
            }
            Event::TileObjectTransformed {
                tile_position,
                stack_position,
                object,
            } => {
                self.map
                    .tile_mut(tile_position.x, tile_position.y, tile_position.z)
                    .set_object(*object, *stack_position);
            }
            Event::TileObjectRemoved {
                tile_position,
                stack_position,
            } => {
                let modern = self.profile.features.modern_stacking;

                self.map
                    .tile_mut(tile_position.x, tile_position.y, tile_position.z)
                    .remove_object(*stack_position, modern);
            }
            Event::CreatureMoved {
                creature_id,
                from,
                stack_position,
                to,
            } => {
                self.apply_creature_moved(*creature_id, *from, *stack_position, *to);
            }
            Event::CreatureRemoved { creature_id } => {
                self.creatures.remove(creature_id);
            }
            Event::CreatureSeen {
                creature_id,
                kind,
                name,
                health,
                heading,
                outfit,
                light_intensity,
                light_color,
                speed,
                skull,
                shield,
                war,
                npc_category,
                mark,
                mark_is_permanent,
                guild_members_online,
                impassable,
            } => {
                self.creatures.insert(
                    *creature_id,
                    Creature {
                        id: *creature_id,
                        kind: *kind,
                        name: name.clone(),
                        health: *health,
                        heading: *heading,
                        outfit: *outfit,
                        light_intensity: *light_intensity,
                        light_color: *light_color,
                        speed: *speed,
                        skull: *skull,
                        shield: *shield,
                        war: *war,
                        npc_category: *npc_category,
                        mark: *mark,
                        mark_is_permanent: *mark_is_permanent,
                        guild_members_online: *guild_members_online,
                        impassable: *impassable,
                        movement: MovementInformation::default(),
                    },
                );
            }
            Event::CreatureHealthUpdated {
                creature_id,
                health,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.health = *health;
                }
            }
            Event::CreatureHeadingUpdated {
                creature_id,
                heading,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.heading = *heading;
                }
            }
            Event::CreatureLightUpdated {
                creature_id,
                intensity,
                color,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.light_intensity = *intensity;
                    creature.light_color = *color;
                }
            }
            Event::CreatureOutfitUpdated {
                creature_id,
                outfit,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.outfit = *outfit;
                }
            }
            Event::CreatureSpeedUpdated { creature_id, speed } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.speed = *speed;
                }
            }
            Event::CreatureSkullUpdated { creature_id, skull } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.skull = *skull;
                }
            }
            Event::CreatureShieldUpdated {
                creature_id,
                shield,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.shield = *shield;
                }
            }
            Event::CreatureImpassableUpdated {
                creature_id,
                impassable,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.impassable = *impassable;
                }
            }
            Event::CreaturePvPHelpersUpdated {
                creature_id,
                mark_is_permanent,
                mark,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.mark_is_permanent = *mark_is_permanent;
                    creature.mark = *mark;
                }
            }
            Event::CreatureGuildMembersUpdated {
                creature_id,
                guild_members_online,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.guild_members_online = *guild_members_online;
                }
            }
            Event::CreatureTypeUpdated { creature_id, kind } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.kind = *kind;
                }
            }
            Event::CreatureNPCCategoryUpdated {
                creature_id,
                category,
            } => {
                if let Some(creature) = self.creatures.get_mut(creature_id) {
                    creature.npc_category = *category;
                }
            }
            Event::PlayerMoved { position } => {
                self.position = *position;
            }
            Event::PlayerInventoryUpdated { slot, item } => {
                self.player.set_inventory(*slot, *item);
            }
            Event::PlayerBlessingsUpdated { blessings } => {
                self.player.blessings = *blessings;
            }
            Event::PlayerHotkeyPresetUpdated { hotkey_preset } => {
                self.player.hotkey_preset = *hotkey_preset;
            }
            Event::PlayerDataBasicUpdated {
                is_premium,
                premium_until,
                vocation,
                spells,
            } => {
                self.player.is_premium = *is_premium;
                self.player.premium_until = *premium_until;
                self.player.vocation = *vocation;
                self.player.known_spells = spells.clone();
            }
            Event::PlayerDataUpdated {
                health,
                max_health,
                capacity,
                max_capacity,
                experience,
                level,
                level_percent,
                experience_bonus,
                mana,
                max_mana,
                magic_level,
                magic_level_base,
                magic_level_percent,
                soul_points,
                stamina,
                speed,
                fed,
                offline_stamina,
            } => {
                let stats = &mut self.player.stats;

                stats.health = *health;
                stats.max_health = *max_health;
                stats.capacity = *capacity;
                stats.max_capacity = *max_capacity;
                stats.experience = *experience;
                stats.level = *level;
                stats.level_percent = *level_percent;
                stats.experience_bonus = *experience_bonus;
                stats.mana = *mana;
                stats.max_mana = *max_mana;
                stats.magic_level = *magic_level;
                stats.magic_level_base = *magic_level_base;
                stats.magic_level_percent = *magic_level_percent;
                stats.soul_points = *soul_points;
                stats.stamina = *stamina;
                stats.speed = *speed;
                stats.fed = *fed;
                stats.offline_stamina = *offline_stamina;
            }
            Event::PlayerSkillsUpdated { skills } => {
                self.player.skills = *skills;
            }
            Event::PlayerIconsUpdated { icons } => {
                self.player.icons = *icons;
            }
            Event::PlayerTacticsUpdated {
                attack_mode,
                chase_mode,
                secure_mode,
                pvp_mode,
            } => {
                self.player.attack_mode = *attack_mode;
                self.player.chase_mode = *chase_mode;
                self.player.secure_mode = *secure_mode;
                self.player.pvp_mode = *pvp_mode;
            }
            Event::PvPSituationsChanged { open_situations } => {
                self.player.open_pvp_situations = *open_situations;
            }
            Event::CreatureSpoke {
                mode,
                author_name,
                author_level,
                message,
                ..
            } => {
                self.messages.add(
                    *mode,
                    author_name.clone(),
                    *author_level,
                    None,
                    None,
                    message.clone(),
                    self.current_tick,
                );
            }
            Event::CreatureSpokeOnMap {
                mode,
                author_name,
                author_level,
                position,
                message,
                ..
            } => {
                let position = (!position.is_nowhere()).then_some(*position);

                self.messages.add(
                    *mode,
                    author_name.clone(),
                    *author_level,
                    None,
                    position,
                    message.clone(),
                    self.current_tick,
                );
            }
            Event::CreatureSpokeInChannel {
                mode,
                author_name,
                author_level,
                channel_id,
                message,
                ..
            } => {
                self.messages.add(
                    *mode,
                    author_name.clone(),
                    *author_level,
                    Some(*channel_id),
                    None,
                    message.clone(),
                    self.current_tick,
                );
            }
            Event::ChannelListUpdated { .. } => {
                /* The list of joinable channels is interface chrome; only
                 * actually-opened channels are tracked. */
            }
            Event::ChannelOpened { id, name, .. } => {
                self.channels.insert(*id, name.clone());
            }
            Event::ChannelClosed { id } => {
                self.channels.remove(id);
            }
            Event::PrivateConversationOpened { .. } => {}
            Event::ContainerOpened {
                container_id,
                item_id,
                mark,
                animation,
                name,
                slots_per_page,
                has_parent,
                drag_and_drop,
                pagination,
                total_objects,
                start_index,
                items,
            } => {
                let mut kept: Vec<Object> = items.clone();
                kept.truncate(usize::from(*slots_per_page));

                let total_objects = (*total_objects).max(kept.len() as u16);

                self.containers.insert(
                    *container_id,
                    Container {
                        item_id: *item_id,
                        mark: *mark,
                        animation: *animation,
                        name: name.clone(),
                        slots_per_page: *slots_per_page,
                        has_parent: *has_parent,
                        drag_and_drop: *drag_and_drop,
                        pagination: *pagination,
                        total_objects,
                        start_index: *start_index,
                        items: kept,
                    },
                );
            }
            Event::ContainerClosed { container_id } => {
                self.containers.remove(container_id);
            }
            Event::ContainerAddedItem {
                container_id,
                container_index,
                item,
            } => {
                if let Some(container) = self.containers.get_mut(container_id) {
                    container.add_item(*container_index, *item);
                }
            }
            Event::ContainerTransformedItem {
                container_id,
                container_index,
                item,
            } => {
                if let Some(container) = self.containers.get_mut(container_id) {
                    container.transform_item(*container_index, *item);
                }
            }
            Event::ContainerRemovedItem {
                container_id,
                container_index,
                backfill,
            } => {
                if let Some(container) = self.containers.get_mut(container_id) {
                    container.remove_item(*container_index, *backfill);
                }
            }
            Event::NumberEffectPopped {
                position,
                color,
                value,
            } => {
                self.map
                    .tile_mut(position.x, position.y, position.z)
                    .add_numerical_effect(*color, *value, self.current_tick);
            }
            Event::GraphicalEffectPopped { position, id } => {
                self.map
                    .tile_mut(position.x, position.y, position.z)
                    .add_graphical_effect(*id, self.current_tick);
            }
            Event::MissileFired { origin, target, id } => {
                self.missiles[self.missile_index] = Missile {
                    id: *id,
                    origin: *origin,
                    target: *target,
                    start_tick: self.current_tick,
                };

                self.missile_index = (self.missile_index + 1) % MAX_MISSILES;
            }
            Event::StatusMessageReceived { mode, message } => {
                self.messages.add(
                    *mode,
                    String::new(),
                    0,
                    None,
                    None,
                    message.clone(),
                    self.current_tick,
                );
            }
            Event::StatusMessageReceivedInChannel {
                mode,
                channel_id,
                message,
            } => {
                self.messages.add(
                    *mode,
                    String::new(),
                    0,
                    Some(*channel_id),
                    None,
                    message.clone(),
                    self.current_tick,
                );
            }
        }
    }

    /// Marker for whether the world has loaded far enough to render: the
    /// player's own creature has been seen.
    pub fn is_initialized(&self) -> bool {
        self.creatures.contains_key(&self.player.id)
    }
}

impl std::fmt::Debug for GameState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameState")
            .field("current_tick", &self.current_tick)
            .field("position", &self.position)
            .field("creatures", &self.creatures.len())
            .field("containers", &self.containers.len())
            .field("messages", &self.messages.len())
            .finish_non_exhaustive()
    }
}

/// Kinds a creature can be without a dedicated type byte on the wire.
pub fn derive_creature_type(id: u32) -> CreatureType {
    if id < 0x1000_0000 {
        CreatureType::Player
    } else {
        CreatureType::Monster
    }
}

/// Tile stacking band of an object: creatures sit at 4, items take theirs
/// from the entity type, anything unresolvable defaults to 5.
fn stack_priority(catalogue: &TypeCatalogue, object: &Object) -> u8 {
    match object {
        Object::Creature { .. } => 4,
        Object::Item(item) => catalogue
            .get_item(item.id)
            .map(|kind| kind.properties.stack_priority)
            .unwrap_or(5),
        Object::None => 5,
    }
}
