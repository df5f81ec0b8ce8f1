use replay_core::{MAP_FLOOR_COUNT, TILE_BUFFER_HEIGHT, TILE_BUFFER_WIDTH};

use crate::tile::Tile;

const WIDTH: usize = TILE_BUFFER_WIDTH as usize;
const HEIGHT: usize = TILE_BUFFER_HEIGHT as usize;
const FLOORS: usize = MAP_FLOOR_COUNT as usize;

/// The toroidal 18x14x16 tile window. World coordinates index into the ring
/// modulo its width and height, so the window slides for free as the player
/// moves; stale tiles are overwritten by the map packets that slide it.
#[derive(Clone)]
pub struct Map {
    tiles: Vec<Tile>,

    pub light_intensity: u8,
    pub light_color: u8,
}

impl Map {
    pub fn new() -> Self {
        Self {
            tiles: vec![Tile::default(); WIDTH * HEIGHT * FLOORS],
            light_intensity: 0,
            light_color: 0,
        }
    }

    fn index(x: u16, y: u16, z: u8) -> usize {
        let x = usize::from(x) % WIDTH;
        let y = usize::from(y) % HEIGHT;
        let z = usize::from(z) % FLOORS;

        (z * HEIGHT + y) * WIDTH + x
    }

    pub fn tile(&self, x: u16, y: u16, z: u8) -> &Tile {
        &self.tiles[Self::index(x, y, z)]
    }

    pub fn tile_mut(&mut self, x: u16, y: u16, z: u8) -> &mut Tile {
        &mut self.tiles[Self::index(x, y, z)]
    }

    pub fn clear(&mut self) {
        for tile in &mut self.tiles {
            tile.clear();
        }

        self.light_intensity = 0;
        self.light_color = 0;
    }
}

impl Default for Map {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_coordinates_wrap() {
        let mut map = Map::new();

        map.tile_mut(100, 200, 7).add_graphical_effect(3, 0);

        assert_eq!(
            map.tile(100 + TILE_BUFFER_WIDTH, 200 + TILE_BUFFER_HEIGHT, 7)
                .graphical_effects()[0]
                .id,
            3
        );
        assert_eq!(map.tile(101, 200, 7).graphical_effects()[0].id, 0);
    }
}
