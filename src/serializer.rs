//! Converts decoded recordings into a stable JSON document: an array of
//! `{Timestamp, Events}` objects whose field set mirrors what the wire
//! actually carried for the version at hand. Two decodes of the same bytes
//! always serialize identically.

use std::io::Write;

use replay_core::{Error, Position, Result};
use replay_protocol::{Appearance, Event, Object};
use serde_json::{json, Map, Value};

use crate::{Recording, Version};

fn position_to_json(position: Position) -> Value {
    json!({ "X": position.x, "Y": position.y, "Z": position.z })
}

fn object_to_json(version: &Version, object: &Object) -> Value {
    let protocol = &version.profile.protocol;

    match object {
        Object::None => json!({ "ItemId": 0 }),
        Object::Creature { id } => {
            let mut value = Map::new();
            value.insert("CreatureId".into(), json!(id));

            if protocol.creature_marks {
                value.insert("Mark".into(), json!(255));
            }

            Value::Object(value)
        }
        Object::Item(item) => {
            let mut value = Map::new();
            value.insert("ItemId".into(), json!(item.id));

            if let Ok(kind) = version.catalogue.get_item(item.id) {
                if protocol.item_marks {
                    value.insert("Mark".into(), json!(item.mark));
                }

                if kind.properties.liquid_container || kind.properties.liquid_pool {
                    value.insert("Fluid".into(), json!(item.extra));
                } else if kind.properties.stackable
                    || (kind.properties.rune && protocol.rune_charge_count)
                {
                    value.insert("Count".into(), json!(item.extra));
                }

                if kind.properties.animated && protocol.item_animation {
                    value.insert("Animation".into(), json!(item.animation));
                }
            }

            Value::Object(value)
        }
    }
}

fn appearance_to_json(version: &Version, appearance: &Appearance) -> Value {
    let protocol = &version.profile.protocol;

    let mut value = Map::new();
    value.insert("Id".into(), json!(appearance.id));
    value.insert("HeadColor".into(), json!(appearance.head_color));
    value.insert("PrimaryColor".into(), json!(appearance.primary_color));
    value.insert("SecondaryColor".into(), json!(appearance.secondary_color));
    value.insert("DetailColor".into(), json!(appearance.detail_color));
    value.insert(
        "Item".into(),
        object_to_json(version, &Object::Item(appearance.item)),
    );

    if protocol.outfit_addons {
        value.insert("Addons".into(), json!(appearance.addons));
    }

    if protocol.mounts {
        value.insert("MountId".into(), json!(appearance.mount_id));
    }

    Value::Object(value)
}

fn objects_to_json(version: &Version, objects: &[Object]) -> Value {
    Value::Array(
        objects
            .iter()
            .map(|object| object_to_json(version, object))
            .collect(),
    )
}

fn enum_name(value: impl std::fmt::Debug) -> Value {
    json!(format!("{value:?}"))
}

fn event_to_json(version: &Version, event: &Event) -> Value {
    let protocol = &version.profile.protocol;

    let mut value = match event {
        Event::WorldInitialized { player_id, .. } => json!({ "PlayerId": player_id }),
        Event::AmbientLightChanged { intensity, color } => {
            json!({ "Color": color, "Intensity": intensity })
        }
        Event::TileUpdated { position, objects } => json!({
            "Position": position_to_json(*position),
            "Objects": objects_to_json(version, objects),
        }),
        Event::TileObjectAdded {
            tile_position,
            stack_position,
            object,
        }
        | Event::TileObjectTransformed {
            tile_position,
            stack_position,
            object,
        } => json!({
            "TilePosition": position_to_json(*tile_position),
            "StackPosition": stack_position,
            "Object": object_to_json(version, object),
        }),
        Event::TileObjectRemoved {
            tile_position,
            stack_position,
        } => json!({
            "TilePosition": position_to_json(*tile_position),
            "StackPosition": stack_position,
        }),
        Event::CreatureMoved {
            creature_id,
            from,
            stack_position,
            to,
        } => json!({
            "CreatureId": creature_id,
            "From": position_to_json(*from),
            "StackPosition": stack_position,
            "To": position_to_json(*to),
        }),
        Event::CreatureRemoved { creature_id } => json!({ "CreatureId": creature_id }),
        Event::CreatureSeen {
            creature_id,
            kind,
            name,
            heading,
            outfit,
            light_intensity,
            light_color,
            skull,
            shield,
            war,
            npc_category,
            mark,
            mark_is_permanent,
            guild_members_online,
            impassable,
            ..
        } => {
            let mut value = Map::new();
            value.insert("CreatureId".into(), json!(creature_id));
            value.insert("Type".into(), enum_name(kind));
            value.insert("Name".into(), json!(name));
            value.insert("Heading".into(), enum_name(heading));
            value.insert("LightColor".into(), json!(light_color));
            value.insert("LightIntensity".into(), json!(light_intensity));
            value.insert("Outfit".into(), appearance_to_json(version, outfit));

            if protocol.skull_icon {
                value.insert("Skull".into(), enum_name(skull));
            }

            if protocol.shield_icon {
                value.insert("Shield".into(), enum_name(shield));
            }

            if protocol.war_icon {
                value.insert("War".into(), enum_name(war));
            }

            if protocol.npc_category {
                value.insert("NPCCategory".into(), enum_name(npc_category));
            }

            if protocol.creature_marks {
                value.insert("Mark".into(), json!(mark));
                value.insert("GuildMembersOnline".into(), json!(guild_members_online));
                value.insert("MarkIsPermanent".into(), json!(mark_is_permanent));
            }

            if protocol.passable_creatures {
                value.insert("Impassable".into(), json!(impassable));
            }

            Value::Object(value)
        }
        Event::CreatureHealthUpdated {
            creature_id,
            health,
        } => json!({ "CreatureId": creature_id, "Health": health }),
        Event::CreatureHeadingUpdated {
            creature_id,
            heading,
        } => json!({ "CreatureId": creature_id, "Heading": enum_name(heading) }),
        Event::CreatureLightUpdated {
            creature_id,
            intensity,
            color,
        } => json!({ "Id": creature_id, "Color": color, "Intensity": intensity }),
        Event::CreatureOutfitUpdated {
            creature_id,
            outfit,
        } => json!({
            "CreatureId": creature_id,
            "Outfit": appearance_to_json(version, outfit),
        }),
        Event::CreatureSpeedUpdated { creature_id, speed } => {
            json!({ "CreatureId": creature_id, "Speed": speed })
        }
        Event::CreatureSkullUpdated { creature_id, skull } => {
            json!({ "CreatureId": creature_id, "Skull": enum_name(skull) })
        }
        Event::CreatureShieldUpdated {
            creature_id,
            shield,
        } => json!({ "CreatureId": creature_id, "Shield": enum_name(shield) }),
        Event::CreatureImpassableUpdated {
            creature_id,
            impassable,
        } => json!({ "CreatureId": creature_id, "Impassable": impassable }),
        Event::CreaturePvPHelpersUpdated {
            creature_id,
            mark_is_permanent,
            mark,
        } => json!({
            "CreatureId": creature_id,
            "Mark": mark,
            "MarkIsPermanent": mark_is_permanent,
        }),
        Event::CreatureGuildMembersUpdated {
            creature_id,
            guild_members_online,
        } => json!({
            "CreatureId": creature_id,
            "GuildMembersOnline": guild_members_online,
        }),
        Event::CreatureTypeUpdated { creature_id, kind } => {
            json!({ "CreatureId": creature_id, "Type": enum_name(kind) })
        }
        Event::CreatureNPCCategoryUpdated {
            creature_id,
            category,
        } => json!({ "CreatureId": creature_id, "NPCCategory": enum_name(category) }),
        Event::PlayerMoved { position } => {
            json!({ "Position": position_to_json(*position) })
        }
        Event::PlayerInventoryUpdated { slot, item } => json!({
            "Slot": enum_name(slot),
            "Item": object_to_json(version, item),
        }),
        Event::PlayerBlessingsUpdated { blessings } => json!({ "Blessings": blessings }),
        Event::PlayerHotkeyPresetUpdated { hotkey_preset } => {
            json!({ "HotkeyPreset": hotkey_preset })
        }
        Event::PlayerDataBasicUpdated {
            is_premium,
            premium_until,
            vocation,
            spells,
        } => {
            let mut value = Map::new();
            value.insert("Vocation".into(), json!(vocation));
            value.insert("IsPremium".into(), json!(is_premium));
            value.insert("Spells".into(), json!(spells));

            if protocol.premium_until {
                value.insert("PremiumUntil".into(), json!(premium_until));
            }

            Value::Object(value)
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
            let mut value = Map::new();
            value.insert("Health".into(), json!(health));
            value.insert("MaxHealth".into(), json!(max_health));
            value.insert("Mana".into(), json!(mana));
            value.insert("MaxMana".into(), json!(max_mana));
            value.insert("Level".into(), json!(level));
            value.insert("Capacity".into(), json!(capacity));
            value.insert("Experience".into(), json!(experience));
            value.insert("MagicLevel".into(), json!(magic_level));

            if protocol.max_capacity {
                value.insert("MaxCapacity".into(), json!(max_capacity));
            }

            if protocol.skill_percentages {
                value.insert("LevelPercent".into(), json!(level_percent));
            }

            if protocol.experience_bonus {
                value.insert("ExperienceBonus".into(), json!(experience_bonus));
            }

            if protocol.skill_bonuses {
                value.insert("MagicLevelBase".into(), json!(magic_level_base));
            }

            if protocol.skill_percentages {
                value.insert("MagicLevelPercent".into(), json!(magic_level_percent));
            }

            if protocol.soul_points {
                value.insert("SoulPoints".into(), json!(soul_points));
            }

            if protocol.stamina {
                value.insert("Stamina".into(), json!(stamina));
            }

            if protocol.player_speed {
                value.insert("Speed".into(), json!(speed));
            }

            if protocol.player_hunger {
                value.insert("Fed".into(), json!(fed));
            }

            if protocol.offline_stamina {
                value.insert("OfflineStamina".into(), json!(offline_stamina));
            }

            Value::Object(value)
        }
        Event::PlayerSkillsUpdated { skills } => {
            const NAMES: [&str; 7] =
                ["Fist", "Club", "Sword", "Axe", "Distance", "Shield", "Fishing"];

            let mut value = Map::new();

            for (name, skill) in NAMES.iter().zip(skills.iter()) {
                let mut entry = Map::new();
                entry.insert("Actual".into(), json!(skill.actual));

                if protocol.skill_bonuses {
                    entry.insert("Effective".into(), json!(skill.effective));
                }

                if protocol.skill_percentages {
                    entry.insert("Percent".into(), json!(skill.percent));
                }

                value.insert((*name).into(), Value::Object(entry));
            }

            Value::Object(value)
        }
        Event::PlayerIconsUpdated { icons } => json!({ "Icons": icons }),
        Event::PlayerTacticsUpdated {
            attack_mode,
            chase_mode,
            secure_mode,
            pvp_mode,
        } => json!({
            "AttackMode": attack_mode,
            "ChaseMode": chase_mode,
            "PvPMode": pvp_mode,
            "SecureMode": secure_mode,
        }),
        Event::PvPSituationsChanged { open_situations } => {
            json!({ "OpenSituations": open_situations })
        }
        Event::CreatureSpoke {
            message_id,
            mode,
            author_name,
            author_level,
            message,
        } => speech_to_json(
            version,
            *message_id,
            mode,
            author_name,
            *author_level,
            message,
            None,
            None,
        ),
        Event::CreatureSpokeOnMap {
            message_id,
            mode,
            author_name,
            author_level,
            position,
            message,
        } => speech_to_json(
            version,
            *message_id,
            mode,
            author_name,
            *author_level,
            message,
            Some(*position),
            None,
        ),
        Event::CreatureSpokeInChannel {
            message_id,
            mode,
            author_name,
            author_level,
            channel_id,
            message,
        } => speech_to_json(
            version,
            *message_id,
            mode,
            author_name,
            *author_level,
            message,
            None,
            Some(*channel_id),
        ),
        Event::ChannelListUpdated { channels } => json!({
            "Channels": channels
                .iter()
                .map(|channel| json!([channel.id, channel.name]))
                .collect::<Vec<_>>(),
        }),
        Event::ChannelOpened {
            id,
            name,
            participants,
            invitees,
        } => {
            let mut value = Map::new();
            value.insert("ChannelId".into(), json!(id));
            value.insert("ChannelName".into(), json!(name));

            if protocol.channel_participants {
                value.insert("Invitees".into(), json!(invitees));
                value.insert("Participants".into(), json!(participants));
            }

            Value::Object(value)
        }
        Event::ChannelClosed { id } => json!({ "ChannelId": id }),
        Event::PrivateConversationOpened { name } => json!({ "PlayerName": name }),
        Event::ContainerOpened {
            container_id,
            item_id,
            name,
            items,
            ..
        } => json!({
            "ContainerId": container_id,
            "ContainerItem": object_to_json(
                version,
                &Object::Item(replay_protocol::Item {
                    id: *item_id,
                    mark: 255,
                    extra: 1,
                    animation: 0,
                }),
            ),
            "ContainerName": name,
            "Items": objects_to_json(version, items),
        }),
        Event::ContainerClosed { container_id } => json!({ "ContainerId": container_id }),
        Event::ContainerAddedItem {
            container_id, item, ..
        } => json!({
            "ContainerId": container_id,
            "Item": object_to_json(version, item),
        }),
        Event::ContainerTransformedItem {
            container_id,
            container_index,
            item,
        } => json!({
            "ContainerId": container_id,
            "ContainerIndex": container_index,
            "Item": object_to_json(version, item),
        }),
        Event::ContainerRemovedItem {
            container_id,
            container_index,
            ..
        } => json!({
            "ContainerId": container_id,
            "ContainerIndex": container_index,
        }),
        Event::NumberEffectPopped {
            position,
            color,
            value,
        } => json!({
            "Position": position_to_json(*position),
            "Color": color,
            "Value": value,
        }),
        Event::GraphicalEffectPopped { position, id } => json!({
            "Position": position_to_json(*position),
            "Id": id,
        }),
        Event::MissileFired { origin, target, id } => json!({
            "Origin": position_to_json(*origin),
            "Target": position_to_json(*target),
            "Id": id,
        }),
        Event::StatusMessageReceived { mode, message } => json!({
            "Message": message,
            "Mode": enum_name(mode),
        }),
        Event::StatusMessageReceivedInChannel {
            mode,
            channel_id,
            message,
        } => json!({
            "Message": message,
            "Mode": enum_name(mode),
            "ChannelId": channel_id,
        }),
    };

    value
        .as_object_mut()
        .expect("event serialization yields objects")
        .insert("Event".into(), json!(event.kind()));

    value
}

#[allow(clippy::too_many_arguments)]
fn speech_to_json(
    version: &Version,
    message_id: u32,
    mode: &replay_core::MessageMode,
    author_name: &str,
    author_level: u16,
    message: &str,
    position: Option<Position>,
    channel_id: Option<u16>,
) -> Value {
    let protocol = &version.profile.protocol;

    let mut value = Map::new();
    value.insert("Mode".into(), enum_name(mode));
    value.insert("AuthorName".into(), json!(author_name));
    value.insert("Message".into(), json!(message));

    if let Some(position) = position {
        value.insert("Position".into(), position_to_json(position));
    }

    if let Some(channel_id) = channel_id {
        value.insert("ChannelId".into(), json!(channel_id));
    }

    if protocol.speaker_level {
        value.insert("AuthorLevel".into(), json!(author_level));
    }

    if protocol.report_messages {
        value.insert("MessageId".into(), json!(message_id));
    }

    Value::Object(value)
}

/// Serializes a decoded recording as a JSON array of frames, skipping
/// frames whose packets produced no events.
pub fn serialize(
    recording: &Recording,
    version: &Version,
    mut writer: impl Write,
) -> Result<()> {
    let frames: Vec<Value> = recording
        .frames
        .iter()
        .filter(|frame| !frame.events.is_empty())
        .map(|frame| {
            json!({
                "Timestamp": frame.timestamp,
                "Events": frame
                    .events
                    .iter()
                    .map(|event| event_to_json(version, event))
                    .collect::<Vec<_>>(),
            })
        })
        .collect();

    serde_json::to_writer(&mut writer, &frames)
        .map_err(|err| Error::invalid_data(format!("serialization failed: {err}")))?;
    writer
        .flush()
        .map_err(|err| Error::invalid_data(format!("flush failed: {err}")))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use replay_core::VersionTriplet;

    use super::*;
    use crate::Frame;

    fn version() -> Version {
        let profile =
            replay_core::VersionProfile::new(VersionTriplet::new(8, 55, 0)).unwrap();
        let catalogue = replay_assets::testing::small_catalogue(&profile);

        Version { profile, catalogue }
    }

    fn recording() -> Recording {
        Recording {
            runtime: 1000,
            frames: vec![
                Frame {
                    timestamp: 0,
                    events: vec![],
                },
                Frame {
                    timestamp: 500,
                    events: vec![Event::AmbientLightChanged {
                        intensity: 250,
                        color: 215,
                    }],
                },
            ],
        }
    }

    #[test]
    fn serialization_is_deterministic() {
        let version = version();
        let recording = recording();

        let mut first = Vec::new();
        serialize(&recording, &version, &mut first).unwrap();

        let mut second = Vec::new();
        serialize(&recording, &version, &mut second).unwrap();

        assert_eq!(first, second);
    }

    #[test]
    fn empty_frames_are_skipped() {
        let version = version();
        let recording = recording();

        let mut output = Vec::new();
        serialize(&recording, &version, &mut output).unwrap();

        let parsed: Vec<Value> = serde_json::from_slice(&output).unwrap();
        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0]["Timestamp"], 500);
        assert_eq!(parsed[0]["Events"][0]["Event"], "AmbientLightChanged");
        assert_eq!(parsed[0]["Events"][0]["Intensity"], 250);
    }

    #[test]
    fn version_gated_fields_follow_the_profile() {
        let version = version();

        /* 8.55 has no creature marks, so no Mark on creature objects. */
        let value = object_to_json(&version, &Object::Creature { id: 9 });
        assert_eq!(value["CreatureId"], 9);
        assert!(value.get("Mark").is_none());
    }
}
