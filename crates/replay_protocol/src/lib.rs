#![doc = include_str!("../README.md")]

mod enums;
mod events;
mod parser;

pub use enums::{
    CharacterSkull, CreatureType, Direction, InventorySlot, NPCCategory, PartyShield, WarIcon,
};
pub use events::{Appearance, Channel, Event, Item, Object, Skill, SKILL_COUNT};
pub use parser::{Parser, MAX_OBJECTS_PER_TILE, STACK_POSITION_TOP};

#[cfg(test)]
mod tests;
