use replay_protocol::{Object, MAX_OBJECTS_PER_TILE, STACK_POSITION_TOP};

/// Capacity of each per-tile effect ring.
pub const MAX_EFFECTS_PER_TILE: usize = 10;

/// Number-popup merge window: hits of the same colour landing on a tile
/// within this many milliseconds sum into one popup.
const NUMERICAL_MERGE_WINDOW_MS: u32 = 200;

#[derive(Clone, Copy, Default, Debug)]
pub struct GraphicalEffect {
    pub id: u16,
    pub start_tick: u32,
}

#[derive(Clone, Copy, Default, Debug)]
pub struct NumericalEffect {
    pub color: u8,
    pub value: u32,
    pub start_tick: u32,
}

/// One tile of the sliding map window: a bounded object stack in ascending
/// stack-priority order plus rings of short-lived effects. Effects are never
/// removed explicitly; consumers compare `start_tick` against the current
/// tick and skip stale entries.
#[derive(Clone, Default, Debug)]
pub struct Tile {
    objects: Vec<Object>,

    graphical_effects: [GraphicalEffect; MAX_EFFECTS_PER_TILE],
    graphical_index: usize,

    numerical_effects: [NumericalEffect; MAX_EFFECTS_PER_TILE],
    numerical_index: usize,
}

impl Tile {
    pub fn clear(&mut self) {
        self.objects.clear();
        self.graphical_effects = Default::default();
        self.graphical_index = 0;
        self.numerical_effects = Default::default();
        self.numerical_index = 0;
    }

    pub fn objects(&self) -> &[Object] {
        &self.objects
    }

    pub fn graphical_effects(&self) -> &[GraphicalEffect] {
        &self.graphical_effects
    }

    pub fn numerical_effects(&self) -> &[NumericalEffect] {
        &self.numerical_effects
    }

    /// Overwrites the stack wholesale, as full tile descriptions do. At most
    /// ten objects are kept.
    pub fn set_objects(&mut self, objects: &[Object]) {
        self.objects.clear();
        self.objects
            .extend_from_slice(&objects[..objects.len().min(usize::from(MAX_OBJECTS_PER_TILE))]);
    }

    pub fn add_graphical_effect(&mut self, id: u16, current_tick: u32) {
        self.graphical_effects[self.graphical_index] = GraphicalEffect {
            id,
            start_tick: current_tick,
        };

        self.graphical_index = (self.graphical_index + 1) % MAX_EFFECTS_PER_TILE;
    }

    pub fn add_numerical_effect(&mut self, color: u8, value: u32, current_tick: u32) {
        /* Merge hits that land at roughly the same time. */
        for effect in &mut self.numerical_effects {
            if effect.start_tick + NUMERICAL_MERGE_WINDOW_MS > current_tick
                && effect.color == color
                && effect.value > 0
            {
                effect.start_tick = current_tick;
                effect.value += value;

                return;
            }
        }

        self.numerical_effects[self.numerical_index] = NumericalEffect {
            color,
            value,
            start_tick: current_tick,
        };

        self.numerical_index = (self.numerical_index + 1) % MAX_EFFECTS_PER_TILE;
    }

    pub fn object(&self, stack_position: u8, modern_stacking: bool) -> Option<&Object> {
        let mut stack_position = usize::from(stack_position);

        if stack_position >= self.objects.len() {
            if modern_stacking || self.objects.is_empty() {
                return None;
            }

            /* The old stacking rules clamp to the topmost object. */
            stack_position = self.objects.len() - 1;
        }

        self.objects.get(stack_position)
    }

    /// Replaces the object at an explicit stack position. Writes past the
    /// live stack are dropped; the old rules wrote into never-rendered
    /// array slots there, which comes out the same.
    pub fn set_object(&mut self, object: Object, stack_position: u8) {
        if let Some(slot) = self.objects.get_mut(usize::from(stack_position)) {
            *slot = object;
        }
    }

    /// Removes the object at a stack position. Under legacy stacking an
    /// out-of-range position strips the topmost object and removing from an
    /// empty tile is a no-op; under modern stacking both are server bugs
    /// and ignored.
    pub fn remove_object(&mut self, stack_position: u8, modern_stacking: bool) {
        let mut stack_position = usize::from(stack_position);

        if stack_position >= self.objects.len() {
            if modern_stacking || self.objects.is_empty() {
                return;
            }

            stack_position = self.objects.len() - 1;
        }

        self.objects.remove(stack_position);
    }

    /// Inserts an object, either at an explicit position or at the slot its
    /// stack priority dictates when given [`STACK_POSITION_TOP`].
    ///
    /// `priority_of` maps objects onto the 0..5 priority bands (4 for
    /// creatures). Under modern stacking creatures insert strictly above
    /// equal-priority objects; legacy rules insert at-or-above.
    pub fn insert_object(
        &mut self,
        object: Object,
        stack_position: u8,
        modern_stacking: bool,
        priority_of: impl Fn(&Object) -> u8,
    ) {
        let max_objects = usize::from(MAX_OBJECTS_PER_TILE);

        if stack_position == STACK_POSITION_TOP {
            let priority = priority_of(&object);

            for index in 0..self.objects.len().min(max_objects) {
                let check = priority_of(&self.objects[index]);

                let found = if object.is_creature() && modern_stacking {
                    check > priority
                } else {
                    check >= priority
                };

                if found {
                    self.objects.truncate(max_objects - 1);
                    self.objects.insert(index, object);

                    return;
                }
            }

            if self.objects.len() < max_objects {
                self.objects.push(object);
            }
        } else {
            let stack_position = usize::from(stack_position);

            if stack_position > self.objects.len() {
                return;
            }

            self.objects.truncate(max_objects - 1);
            self.objects.insert(stack_position, object);
        }
    }
}

#[cfg(test)]
mod tests {
    use replay_protocol::Item;

    use super::*;

    fn item(id: u16) -> Object {
        Object::Item(Item {
            id,
            mark: 255,
            extra: 1,
            animation: 0,
        })
    }

    /// Priorities for tests: id 100 is ground (0), id 300 is top (3),
    /// everything else is default (5); creatures are always 4.
    fn priority(object: &Object) -> u8 {
        match object {
            Object::Creature { .. } => 4,
            Object::Item(item) if item.id == 100 => 0,
            Object::Item(item) if item.id == 300 => 3,
            _ => 5,
        }
    }

    #[test]
    fn creature_inserts_above_top_items_under_modern_rules() {
        let mut tile = Tile::default();
        tile.set_objects(&[item(100), item(300)]);

        tile.insert_object(
            Object::Creature { id: 7 },
            STACK_POSITION_TOP,
            true,
            priority,
        );

        assert_eq!(
            tile.objects(),
            &[item(100), item(300), Object::Creature { id: 7 }]
        );
    }

    #[test]
    fn creature_inserts_below_other_creatures_under_legacy_rules() {
        let mut tile = Tile::default();
        tile.set_objects(&[item(100), Object::Creature { id: 1 }]);

        tile.insert_object(
            Object::Creature { id: 2 },
            STACK_POSITION_TOP,
            false,
            priority,
        );

        assert_eq!(
            tile.objects(),
            &[item(100), Object::Creature { id: 2 }, Object::Creature { id: 1 }]
        );
    }

    #[test]
    fn stack_never_exceeds_ten_objects() {
        let mut tile = Tile::default();

        for id in 0..20 {
            tile.insert_object(
                Object::Creature { id },
                STACK_POSITION_TOP,
                true,
                priority,
            );
        }

        assert_eq!(tile.objects().len(), 10);
    }

    #[test]
    fn legacy_removal_clamps_to_the_top() {
        let mut tile = Tile::default();
        tile.set_objects(&[item(100), item(200)]);

        tile.remove_object(9, false);
        assert_eq!(tile.objects(), &[item(100)]);

        /* Removing from an empty tile is a no-op under the old rules. */
        tile.remove_object(0, false);
        tile.remove_object(0, false);
        assert!(tile.objects().is_empty());
    }

    #[test]
    fn modern_removal_ignores_out_of_range_positions() {
        let mut tile = Tile::default();
        tile.set_objects(&[item(100)]);

        tile.remove_object(5, true);
        assert_eq!(tile.objects().len(), 1);
    }

    #[test]
    fn numerical_effects_merge_within_the_window() {
        let mut tile = Tile::default();

        tile.add_numerical_effect(180, 30, 1000);
        tile.add_numerical_effect(180, 12, 1100);
        tile.add_numerical_effect(60, 5, 1100);

        let merged: Vec<_> = tile
            .numerical_effects()
            .iter()
            .filter(|effect| effect.value > 0)
            .collect();

        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].value, 42);
        assert_eq!(merged[1].value, 5);
    }
}
