/// Width of the sliding tile window, in tiles.
pub const TILE_BUFFER_WIDTH: u16 = 18;
/// Height of the sliding tile window, in tiles.
pub const TILE_BUFFER_HEIGHT: u16 = 14;
/// Number of floors described when surfacing at ground level.
pub const TILE_BUFFER_DEPTH: u16 = 8;
/// Total number of floors in the world.
pub const MAP_FLOOR_COUNT: u8 = 16;

/// An absolute world position. `z` counts floors downward with 7 as ground
/// level; positions above `z = 7` are above ground, below are underground.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash, Debug)]
pub struct Position {
    pub x: u16,
    pub y: u16,
    pub z: u8,
}

impl Position {
    pub const fn new(x: u16, y: u16, z: u8) -> Self {
        Self { x, y, z }
    }

    /// The sentinel used by creature moves that name the creature by id
    /// instead of a source tile.
    pub const NOWHERE: Position = Position {
        x: 0xFFFF,
        y: 0xFFFF,
        z: 0xFF,
    };

    pub fn is_nowhere(&self) -> bool {
        *self == Self::NOWHERE
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}
