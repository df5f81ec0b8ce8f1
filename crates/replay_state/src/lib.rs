#![doc = include_str!("../README.md")]

mod container;
mod creature;
mod gamestate;
mod map;
mod messages;
mod player;
mod tile;

pub use container::Container;
pub use creature::{Creature, MovementInformation};
pub use gamestate::{derive_creature_type, GameState, Missile, MAX_MISSILES};
pub use map::Map;
pub use messages::{Message, MessageList};
pub use player::{PlayerData, PlayerStats};
pub use tile::{GraphicalEffect, NumericalEffect, Tile, MAX_EFFECTS_PER_TILE};

#[cfg(test)]
mod tests;
