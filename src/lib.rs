//! mc-legacy-world: read-only access to legacy Minecraft saves.
//!
//! Opens Alpha (per-chunk `.dat`), McRegion (`.mcr`) and early Anvil (`.mca`)
//! save folders and answers block, light, biome and height queries in modern
//! block-state terms.

pub mod biome;
pub mod block;
pub mod cache;
pub mod chunk;
pub mod config;
pub mod nbt;
pub mod nibble;
pub mod region;
pub mod world;

#[cfg(test)]
mod test_fixtures;

pub use block::BlockState;
pub use chunk::{Chunk, ChunkPos, LightData};
pub use config::WorldConfig;
pub use region::{Region, RegionKind, RegionPos};
pub use world::World;
