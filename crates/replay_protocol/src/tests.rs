use replay_assets::testing::{items, small_catalogue};
use replay_assets::TypeCatalogue;
use replay_core::{DataReader, MessageMode, Position, VersionProfile, VersionTriplet};

use crate::{Event, Item, Object, Parser};

fn profile(major: i32, minor: i32) -> VersionProfile {
    VersionProfile::new(VersionTriplet::new(major, minor, 0)).unwrap()
}

fn parse(
    profile: &VersionProfile,
    catalogue: &TypeCatalogue,
    payload: &[u8],
) -> Vec<Event> {
    let mut parser = Parser::new(profile, catalogue);
    let mut reader = DataReader::new(payload);

    let events = parser.parse(&mut reader).unwrap();
    assert!(reader.is_empty());

    events
}

fn push_position(bytes: &mut Vec<u8>, x: u16, y: u16, z: u8) {
    bytes.extend_from_slice(&x.to_le_bytes());
    bytes.extend_from_slice(&y.to_le_bytes());
    bytes.push(z);
}

#[test]
fn idle_marker_parses_to_nothing() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    assert!(parse(&profile, &catalogue, &[0x0F]).is_empty());
}

#[test]
fn trailing_garbage_fails_the_frame() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut parser = Parser::new(&profile, &catalogue);
    let mut reader = DataReader::new(&[0x0F, 0xFB]);

    assert!(parser.parse(&mut reader).is_err());
}

#[test]
fn ambient_light() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let events = parse(&profile, &catalogue, &[0x82, 200, 0xD7]);
    assert_eq!(
        events,
        vec![Event::AmbientLightChanged {
            intensity: 200,
            color: 0xD7,
        }]
    );
}

#[test]
fn player_tactics() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let events = parse(&profile, &catalogue, &[0xA7, 1, 0, 1, 2]);
    assert_eq!(
        events,
        vec![Event::PlayerTacticsUpdated {
            attack_mode: 1,
            chase_mode: 0,
            secure_mode: 1,
            pvp_mode: 2,
        }]
    );
}

#[test]
fn tile_update_carries_the_object_stack() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut bytes = vec![0x69];
    push_position(&mut bytes, 120, 130, 7);
    bytes.extend_from_slice(&items::GROUND.to_le_bytes());
    bytes.extend_from_slice(&0xFF00u16.to_le_bytes());

    let events = parse(&profile, &catalogue, &bytes);
    assert_eq!(
        events,
        vec![Event::TileUpdated {
            position: Position::new(120, 130, 7),
            objects: vec![Object::Item(Item {
                id: items::GROUND,
                mark: 255,
                extra: 1,
                animation: 0,
            })],
        }]
    );
}

#[test]
fn stackable_items_read_their_count() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut bytes = vec![0x69];
    push_position(&mut bytes, 120, 130, 7);
    bytes.extend_from_slice(&items::STACKABLE.to_le_bytes());
    bytes.push(42);
    bytes.extend_from_slice(&0xFF00u16.to_le_bytes());

    let events = parse(&profile, &catalogue, &bytes);
    let Event::TileUpdated { objects, .. } = &events[0] else {
        panic!("expected a tile update");
    };

    assert_eq!(objects[0].as_item().unwrap().extra, 42);
}

fn creature_seen_bytes(creature_id: u32) -> Vec<u8> {
    let mut bytes = vec![0x6A];
    push_position(&mut bytes, 120, 130, 7);
    bytes.push(1); // stack position

    bytes.extend_from_slice(&0x61u16.to_le_bytes());
    bytes.extend_from_slice(&0u32.to_le_bytes()); // remove id
    bytes.extend_from_slice(&creature_id.to_le_bytes());

    bytes.extend_from_slice(&5u16.to_le_bytes());
    bytes.extend_from_slice(b"Troll");

    bytes.push(80); // health
    bytes.push(2); // heading south

    bytes.extend_from_slice(&1u16.to_le_bytes()); // outfit id
    bytes.extend_from_slice(&[10, 20, 30, 40]); // colors
    bytes.push(0); // addons

    bytes.extend_from_slice(&[0, 215]); // light
    bytes.extend_from_slice(&220u16.to_le_bytes()); // speed
    bytes.push(0); // skull
    bytes.push(0); // shield
    bytes.push(0); // war icon
    bytes.push(1); // impassable

    bytes
}

#[test]
fn creature_seen_registers_the_id() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut parser = Parser::new(&profile, &catalogue);
    let bytes = creature_seen_bytes(0x1000_0001);
    let mut reader = DataReader::new(&bytes);

    let events = parser.parse(&mut reader).unwrap();
    assert!(reader.is_empty());
    assert!(parser.knows_creature(0x1000_0001));

    /* The creature event precedes the tile mutation that references it. */
    let [Event::CreatureSeen {
        creature_id,
        name,
        health,
        speed,
        impassable,
        ..
    }, Event::TileObjectAdded {
        stack_position,
        object,
        ..
    }] = events.as_slice()
    else {
        panic!("unexpected events: {events:?}");
    };

    assert_eq!(*creature_id, 0x1000_0001);
    assert_eq!(name, "Troll");
    assert_eq!(*health, 80);
    assert_eq!(*speed, 220);
    assert!(*impassable);
    assert_eq!(*stack_position, 1);
    assert_eq!(*object, Object::Creature { id: 0x1000_0001 });
}

#[test]
fn updates_for_unknown_creatures_yield_no_events() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut bytes = vec![0x8C];
    bytes.extend_from_slice(&77u32.to_le_bytes());
    bytes.push(50);

    assert!(parse(&profile, &catalogue, &bytes).is_empty());
}

#[test]
fn creature_id_addressing_needs_modern_stacking() {
    let profile = profile(8, 52);
    let catalogue = small_catalogue(&profile);

    let mut parser = Parser::new(&profile, &catalogue);

    let mut bytes = vec![0x6C];
    bytes.extend_from_slice(&0xFFFFu16.to_le_bytes());
    bytes.extend_from_slice(&1u32.to_le_bytes());

    let mut reader = DataReader::new(&bytes);
    assert!(parser.parse(&mut reader).is_err());
}

#[test]
fn status_message_by_translated_mode() {
    let profile = profile(9, 0);
    let catalogue = small_catalogue(&profile);

    let text = b"You see a crate.";
    let mut bytes = vec![0xB4, 20]; // Look in the unified table
    bytes.extend_from_slice(&(text.len() as u16).to_le_bytes());
    bytes.extend_from_slice(text);

    let events = parse(&profile, &catalogue, &bytes);
    assert_eq!(
        events,
        vec![Event::StatusMessageReceived {
            mode: MessageMode::Look,
            message: "You see a crate.".into(),
        }]
    );
}

#[test]
fn damage_message_pops_number_effects() {
    let profile = profile(9, 0);
    let catalogue = small_catalogue(&profile);

    let text = b"You lose 30 hitpoints.";
    let mut bytes = vec![0xB4, 22]; // DamageReceived
    push_position(&mut bytes, 120, 130, 7);
    bytes.extend_from_slice(&30u32.to_le_bytes());
    bytes.push(180);
    bytes.extend_from_slice(&0u32.to_le_bytes());
    bytes.push(0);
    bytes.extend_from_slice(&(text.len() as u16).to_le_bytes());
    bytes.extend_from_slice(text);

    let events = parse(&profile, &catalogue, &bytes);
    assert_eq!(
        events,
        vec![
            Event::NumberEffectPopped {
                position: Position::new(120, 130, 7),
                color: 180,
                value: 30,
            },
            Event::StatusMessageReceived {
                mode: MessageMode::DamageReceived,
                message: "You lose 30 hitpoints.".into(),
            },
        ]
    );
}

#[test]
fn speak_on_map() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut bytes = vec![0xAA];
    bytes.extend_from_slice(&9u32.to_le_bytes()); // statement id
    bytes.extend_from_slice(&5u16.to_le_bytes());
    bytes.extend_from_slice(b"Bubba");
    bytes.extend_from_slice(&64u16.to_le_bytes()); // level
    bytes.push(1); // Say
    push_position(&mut bytes, 120, 130, 7);
    bytes.extend_from_slice(&6u16.to_le_bytes());
    bytes.extend_from_slice(b"hi all");

    let events = parse(&profile, &catalogue, &bytes);
    assert_eq!(
        events,
        vec![Event::CreatureSpokeOnMap {
            message_id: 9,
            mode: MessageMode::Say,
            author_name: "Bubba".into(),
            author_level: 64,
            position: Position::new(120, 130, 7),
            message: "hi all".into(),
        }]
    );
}

#[test]
fn container_open_without_pagination_counts_items() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut bytes = vec![0x6E, 2];
    bytes.extend_from_slice(&items::PLAIN.to_le_bytes());
    bytes.extend_from_slice(&3u16.to_le_bytes());
    bytes.extend_from_slice(b"Bag");
    bytes.push(8); // slots per page
    bytes.push(0); // has parent
    bytes.push(1); // item count
    bytes.extend_from_slice(&items::STACKABLE.to_le_bytes());
    bytes.push(5);

    let events = parse(&profile, &catalogue, &bytes);
    let [Event::ContainerOpened {
        container_id,
        item_id,
        name,
        slots_per_page,
        total_objects,
        items: contents,
        ..
    }] = events.as_slice()
    else {
        panic!("unexpected events: {events:?}");
    };

    assert_eq!(*container_id, 2);
    assert_eq!(*item_id, items::PLAIN);
    assert_eq!(name, "Bag");
    assert_eq!(*slots_per_page, 8);
    assert_eq!(*total_objects, 1);
    assert_eq!(contents.len(), 1);
}

#[test]
fn tibiacast_creature_list() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);

    let mut parser = Parser::new(&profile, &catalogue);

    let mut bytes = Vec::new();
    bytes.extend_from_slice(&1u16.to_le_bytes()); // creature count
    bytes.extend_from_slice(&0x2000_0007u32.to_le_bytes());
    bytes.extend_from_slice(&3u16.to_le_bytes());
    bytes.extend_from_slice(b"Rat");
    bytes.push(100); // health
    bytes.push(0); // heading
    bytes.extend_from_slice(&1u16.to_le_bytes()); // outfit
    bytes.extend_from_slice(&[1, 2, 3, 4, 0]); // colors + addons
    bytes.extend_from_slice(&[0, 0]); // light
    bytes.extend_from_slice(&180u16.to_le_bytes()); // speed
    bytes.push(0); // skull
    bytes.push(0); // shield
    bytes.push(0); // war icon
    bytes.push(0); // impassable

    let mut reader = DataReader::new(&bytes);
    let events = parser.parse_tibiacast_creatures(&mut reader, true).unwrap();

    assert!(reader.is_empty());
    assert!(parser.knows_creature(0x2000_0007));
    assert_eq!(events.len(), 1);
}
