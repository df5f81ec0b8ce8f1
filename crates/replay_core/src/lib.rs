#![doc = include_str!("../README.md")]

mod error;
mod position;
mod reader;
mod tables;
mod version;

pub use error::{Error, Result};
pub use position::{
    Position, MAP_FLOOR_COUNT, TILE_BUFFER_DEPTH, TILE_BUFFER_HEIGHT, TILE_BUFFER_WIDTH,
};
pub use reader::{DataReader, WireEnum, WireInt};
pub use tables::TranslationTable;
pub use version::{
    Features, FluidColor, MessageMode, Protocol, TypeProperty, VersionProfile, VersionTriplet,
};
