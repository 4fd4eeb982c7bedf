//! Decoded, read-only chunk columns.
//!
//! A [`Chunk`] is an immutable snapshot shared through `Arc` between render
//! threads. Each variant answers the same queries for its on-disk layout:
//! - `Column`: classic flat arrays (per-chunk files and `.mcr` regions)
//! - `Sectioned`: up to 32 sections of 16x16x16 (`.mca` regions)
//! - `Empty`: the sentinel returned for missing or unreadable chunks

pub mod column;
pub mod sectioned;

pub use column::{ColumnChunk, ColumnFormat};
pub use sectioned::SectionedChunk;

use std::sync::Arc;

use crate::biome::{BiomeSource, FALLBACK_BIOME, LegacyBiome};
use crate::block::{BlockAccess, BlockState, RawBlock, block_state, catalog};

/// Surface height reported when a chunk stores no height map.
pub const DEFAULT_SURFACE_Y: i32 = 63;
/// Ocean floor reported for columns without any solid block.
pub const DEFAULT_OCEAN_FLOOR_Y: i32 = 50;

/// Chunk coordinates in the world's chunk grid.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct ChunkPos {
    pub x: i32,
    pub z: i32,
}

impl ChunkPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Chunk containing block (x, z).
    pub fn of_block(x: i32, z: i32) -> Self {
        Self { x: x >> 4, z: z >> 4 }
    }

    pub fn contains_block(&self, x: i32, z: i32) -> bool {
        x >> 4 == self.x && z >> 4 == self.z
    }
}

/// Sky and block light of one voxel, each 0..=15.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LightData {
    pub sky: u8,
    pub block: u8,
}

impl LightData {
    pub fn new(sky: u8, block: u8) -> Self {
        Self { sky, block }
    }
}

/// Raw-block lookups outside the chunk being decoded.
///
/// Implementations must not derive block states, only read raw ids.
pub trait NeighborSource: Send + Sync {
    fn neighbor_block(&self, x: i32, y: i32, z: i32) -> RawBlock;
}

/// Neighbor source for chunks decoded without a surrounding world.
#[derive(Debug, Default)]
pub struct NoNeighbors;

impl NeighborSource for NoNeighbors {
    fn neighbor_block(&self, _x: i32, _y: i32, _z: i32) -> RawBlock {
        RawBlock::AIR
    }
}

/// World-level inputs every decoder needs.
#[derive(Clone)]
pub struct DecodeContext {
    pub sky_light: u8,
    pub ignore_missing_light_data: bool,
    pub biomes: Arc<BiomeSource>,
    pub neighbors: Arc<dyn NeighborSource>,
}

impl DecodeContext {
    /// Context without neighbors or seed, for decoding chunks in isolation.
    pub fn standalone(sky_light: u8) -> Self {
        Self {
            sky_light,
            ignore_missing_light_data: false,
            biomes: Arc::new(BiomeSource::Fixed(LegacyBiome::Plains)),
            neighbors: Arc::new(NoNeighbors),
        }
    }
}

#[derive(Debug)]
pub enum Chunk {
    Empty,
    Column(ColumnChunk),
    Sectioned(SectionedChunk),
}

impl Chunk {
    pub fn empty() -> Arc<Chunk> {
        Arc::new(Chunk::Empty)
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Chunk::Empty)
    }

    pub fn is_generated(&self) -> bool {
        match self {
            Chunk::Empty => false,
            Chunk::Column(c) => c.is_generated(),
            Chunk::Sectioned(c) => c.is_generated(),
        }
    }

    pub fn inhabited_time(&self) -> i64 {
        match self {
            Chunk::Empty => 0,
            Chunk::Column(c) => c.inhabited_time(),
            Chunk::Sectioned(c) => c.inhabited_time(),
        }
    }

    /// Undecoded id/metadata at world coordinates; x/z are taken modulo 16.
    pub fn raw_block(&self, x: i32, y: i32, z: i32) -> RawBlock {
        match self {
            Chunk::Empty => RawBlock::AIR,
            Chunk::Column(c) => c.raw_block(x & 15, y, z & 15),
            Chunk::Sectioned(c) => c.raw_block(x & 15, y, z & 15),
        }
    }

    /// Modern block state at world coordinates (x, y, z).
    pub fn block_state(&self, x: i32, y: i32, z: i32) -> BlockState {
        let (pos, neighbors) = match self {
            Chunk::Empty => return BlockState::Air,
            Chunk::Column(c) => (c.pos(), c.neighbors()),
            Chunk::Sectioned(c) => (c.pos(), c.neighbors()),
        };

        let raw = self.raw_block(x, y, z);
        if raw.id == catalog::ids::AIR {
            return BlockState::Air;
        }

        // Anchor the query inside this chunk so neighbors resolve correctly
        let wx = (pos.x << 4) | (x & 15);
        let wz = (pos.z << 4) | (z & 15);
        let access = Neighborhood {
            chunk: self,
            pos,
            neighbors,
        };
        block_state(raw, wx, y, wz, &access)
    }

    pub fn light_data(&self, x: i32, y: i32, z: i32) -> LightData {
        match self {
            Chunk::Empty => LightData::default(),
            Chunk::Column(c) => c.light_data(x & 15, y, z & 15),
            Chunk::Sectioned(c) => c.light_data(x & 15, y, z & 15),
        }
    }

    pub fn biome(&self, x: i32, _y: i32, z: i32) -> &'static str {
        match self {
            Chunk::Empty => FALLBACK_BIOME,
            Chunk::Column(c) => c.biome(x & 15, z & 15),
            Chunk::Sectioned(c) => c.biome(x & 15, z & 15),
        }
    }

    pub fn min_y(&self) -> i32 {
        0
    }

    pub fn max_y(&self) -> i32 {
        match self {
            Chunk::Empty => 255,
            Chunk::Column(c) => c.height() - 1,
            Chunk::Sectioned(_) => SectionedChunk::MAX_Y,
        }
    }

    pub fn height(&self) -> i32 {
        self.max_y() - self.min_y() + 1
    }

    pub fn world_surface_y(&self, x: i32, z: i32) -> i32 {
        match self {
            Chunk::Empty => DEFAULT_SURFACE_Y,
            Chunk::Column(c) => c.world_surface_y(x & 15, z & 15),
            Chunk::Sectioned(c) => c.world_surface_y(x & 15, z & 15),
        }
    }

    /// Highest block that is neither air nor fluid.
    pub fn ocean_floor_y(&self, x: i32, z: i32) -> i32 {
        if self.is_empty() {
            return DEFAULT_OCEAN_FLOOR_Y;
        }
        (self.min_y()..=self.max_y())
            .rev()
            .find(|&y| {
                let id = self.raw_block(x, y, z).id;
                id != catalog::ids::AIR && !catalog::is_fluid(id)
            })
            .unwrap_or(DEFAULT_OCEAN_FLOOR_Y)
    }
}

/// Light reported where a chunk has no trusted light data.
pub(crate) fn default_light(sky_light: u8, id: u16) -> LightData {
    with_fixed_block_light(LightData::new(sky_light, 0), id)
}

pub(crate) fn with_fixed_block_light(light: LightData, id: u16) -> LightData {
    if catalog::has_fixed_block_light(id) {
        LightData { block: 7, ..light }
    } else {
        light
    }
}

/// Raw-block view of one chunk plus whatever surrounds it.
struct Neighborhood<'a> {
    chunk: &'a Chunk,
    pos: ChunkPos,
    neighbors: &'a dyn NeighborSource,
}

impl BlockAccess for Neighborhood<'_> {
    fn raw_block(&self, x: i32, y: i32, z: i32) -> RawBlock {
        if self.pos.contains_block(x, z) {
            self.chunk.raw_block(x, y, z)
        } else {
            self.neighbors.neighbor_block(x, y, z)
        }
    }
}
