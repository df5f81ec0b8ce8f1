use replay_assets::testing::{items, small_catalogue};
use replay_core::{Position, VersionProfile, VersionTriplet};
use replay_protocol::{
    CharacterSkull, CreatureType, Direction, Event, Item, NPCCategory, Object, PartyShield,
    WarIcon,
};

use crate::GameState;

fn profile(major: i32, minor: i32) -> VersionProfile {
    VersionProfile::new(VersionTriplet::new(major, minor, 0)).unwrap()
}

fn ground() -> Object {
    Object::Item(Item {
        id: items::GROUND,
        mark: 255,
        extra: 1,
        animation: 0,
    })
}

fn seen(creature_id: u32, speed: u16) -> Event {
    Event::CreatureSeen {
        creature_id,
        kind: CreatureType::Monster,
        name: "Rat".into(),
        health: 100,
        heading: Direction::North,
        outfit: Default::default(),
        light_intensity: 0,
        light_color: 0,
        speed,
        skull: CharacterSkull::None,
        shield: PartyShield::None,
        war: WarIcon::None,
        npc_category: NPCCategory::None,
        mark: 0,
        mark_is_permanent: false,
        guild_members_online: 0,
        impassable: false,
    }
}

#[test]
fn creature_identity_is_unique() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    state.apply(&seen(5, 200));
    state.apply(&seen(5, 400));

    assert_eq!(state.creatures.len(), 1);
    assert_eq!(state.creatures[&5].speed, 400);

    state.apply(&Event::CreatureRemoved { creature_id: 5 });
    assert!(state.creatures.is_empty());
}

#[test]
fn moves_compute_walk_timing_from_the_ground_tile() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);
    state.current_tick = 10_000;

    state.apply(&seen(5, 300));
    state.apply(&Event::TileUpdated {
        position: Position::new(100, 100, 7),
        objects: vec![ground(), Object::Creature { id: 5 }],
    });
    state.apply(&Event::TileUpdated {
        position: Position::new(101, 100, 7),
        objects: vec![ground()],
    });

    state.apply(&Event::CreatureMoved {
        creature_id: 0,
        from: Position::new(100, 100, 7),
        stack_position: 1,
        to: Position::new(101, 100, 7),
    });

    let creature = &state.creatures[&5];
    assert_eq!(creature.heading, Direction::East);
    assert_eq!(creature.movement.walk_start_tick, 10_000);

    /* Ground speed 150 at creature speed 300: 150 * 1000 / 300 = 500 ms. */
    assert_eq!(creature.movement.walk_end_tick, 10_500);

    /* The creature object moved between the tiles. */
    assert_eq!(state.map.tile(100, 100, 7).objects(), &[ground()]);
    assert_eq!(
        state.map.tile(101, 100, 7).objects(),
        &[ground(), Object::Creature { id: 5 }]
    );
}

#[test]
fn teleports_are_instant() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);
    state.current_tick = 10_000;

    state.apply(&seen(5, 300));
    state.apply(&Event::TileUpdated {
        position: Position::new(100, 100, 7),
        objects: vec![ground(), Object::Creature { id: 5 }],
    });

    state.apply(&Event::CreatureMoved {
        creature_id: 0,
        from: Position::new(100, 100, 7),
        stack_position: 1,
        to: Position::new(110, 100, 7),
    });

    let movement = state.creatures[&5].movement;
    assert_eq!(movement.walk_start_tick, 0);
    assert_eq!(movement.walk_end_tick, 0);
    assert_eq!(movement.progress(10_000), 1.0);
}

#[test]
fn moves_from_tiles_without_a_creature_are_dropped() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    state.apply(&Event::TileUpdated {
        position: Position::new(100, 100, 7),
        objects: vec![ground()],
    });

    state.apply(&Event::CreatureMoved {
        creature_id: 0,
        from: Position::new(100, 100, 7),
        stack_position: 5,
        to: Position::new(101, 100, 7),
    });

    assert_eq!(state.map.tile(100, 100, 7).objects().len(), 1);
    assert!(state.map.tile(101, 100, 7).objects().is_empty());
}

#[test]
fn tile_updates_clamp_to_ten_objects() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    let objects: Vec<Object> = (0..14).map(|id| Object::Creature { id }).collect();

    state.apply(&Event::TileUpdated {
        position: Position::new(100, 100, 7),
        objects,
    });

    assert_eq!(state.map.tile(100, 100, 7).objects().len(), 10);
}

#[test]
fn missile_ring_overwrites_the_oldest() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    for id in 1..=20u16 {
        state.apply(&Event::MissileFired {
            origin: Position::new(100, 100, 7),
            target: Position::new(101, 100, 7),
            id: id % 4 + 1,
        });
    }

    assert_eq!(state.missiles().len(), crate::MAX_MISSILES);
    assert!(state.missiles().iter().all(|missile| missile.id != 0));
}

#[test]
fn reset_supports_backward_seeks() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    state.apply(&seen(5, 300));
    state.apply(&Event::AmbientLightChanged {
        intensity: 250,
        color: 215,
    });
    state.advance_to(5000);

    state.reset();

    assert!(state.creatures.is_empty());
    assert_eq!(state.map.light_intensity, 0);
    assert_eq!(state.current_tick, 0);
    assert!(!state.is_initialized());
}

#[test]
fn container_lifecycle() {
    let profile = profile(8, 55);
    let catalogue = small_catalogue(&profile);
    let mut state = GameState::new(&profile, &catalogue);

    state.apply(&Event::ContainerOpened {
        container_id: 3,
        item_id: items::PLAIN,
        mark: 255,
        animation: 0,
        name: "Backpack".into(),
        slots_per_page: 20,
        has_parent: false,
        drag_and_drop: false,
        pagination: false,
        total_objects: 1,
        start_index: 0,
        items: vec![ground()],
    });

    state.apply(&Event::ContainerAddedItem {
        container_id: 3,
        container_index: 0,
        item: ground(),
    });

    assert_eq!(state.containers[&3].items.len(), 2);
    assert_eq!(state.containers[&3].total_objects, 2);

    state.apply(&Event::ContainerClosed { container_id: 3 });
    assert!(state.containers.is_empty());
}
