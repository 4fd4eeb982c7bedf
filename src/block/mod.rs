//! Modern block-state model and the translation from legacy numeric ids.
//!
//! Legacy saves store an 8-bit id and a 4-bit metadata value per voxel.
//! Translation happens in three steps:
//! 1. [`catalog`] finds the modern identifier and its baseline properties.
//! 2. [`properties`] decodes what the metadata nibble encodes.
//! 3. [`shape`] derives what the legacy format never stored (connections,
//!    double chests, snowy grass) from neighboring raw ids.

pub mod catalog;
pub mod properties;
pub mod shape;

use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;

pub use catalog::LegacyBlock;

/// Ordered property map of a block state.
pub type Properties = BTreeMap<&'static str, Cow<'static, str>>;

pub const AIR_ID: &str = "minecraft:air";

/// Identifier reported for legacy content the catalog does not know.
pub const MISSING_ID: &str = "legacy:missing";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockState {
    Air,
    /// Legacy id with no catalog entry. Rendered as unknown content, never as air.
    Missing,
    Block {
        id: &'static str,
        properties: Properties,
    },
}

impl BlockState {
    pub fn id(&self) -> &str {
        match self {
            BlockState::Air => AIR_ID,
            BlockState::Missing => MISSING_ID,
            BlockState::Block { id, .. } => id,
        }
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        match self {
            BlockState::Block { properties, .. } => properties.get(key).map(|v| v.as_ref()),
            _ => None,
        }
    }

    pub fn is_air(&self) -> bool {
        matches!(self, BlockState::Air)
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, BlockState::Missing)
    }
}

impl fmt::Display for BlockState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())?;
        if let BlockState::Block { properties, .. } = self {
            if !properties.is_empty() {
                let joined = properties
                    .iter()
                    .map(|(k, v)| format!("{k}={v}"))
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "[{joined}]")?;
            }
        }
        Ok(())
    }
}

/// Undecoded (id, metadata) pair as stored on disk.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct RawBlock {
    pub id: u16,
    pub data: u8,
}

impl RawBlock {
    pub const AIR: Self = Self { id: 0, data: 0 };

    pub fn new(id: u16, data: u8) -> Self {
        Self { id, data: data & 0x0F }
    }
}

/// Horizontal direction in world space (north is -Z, east is +X).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    pub const CARDINALS: [Direction; 4] = [Direction::North, Direction::East, Direction::South, Direction::West];

    pub fn offset(self) -> (i32, i32) {
        match self {
            Direction::North => (0, -1),
            Direction::East => (1, 0),
            Direction::South => (0, 1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    pub fn clockwise(self) -> Self {
        match self {
            Direction::North => Direction::East,
            Direction::East => Direction::South,
            Direction::South => Direction::West,
            Direction::West => Direction::North,
        }
    }

    pub fn is_x_axis(self) -> bool {
        matches!(self, Direction::East | Direction::West)
    }

    pub fn name(self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

/// Read-only access to undecoded blocks by world coordinates.
///
/// Shape inference only ever sees raw ids through this trait, so deriving a
/// block never triggers derivation of its neighbors.
pub trait BlockAccess {
    fn raw_block(&self, x: i32, y: i32, z: i32) -> RawBlock;
}

/// Full translation of one legacy voxel at world position (x, y, z).
pub fn block_state<A: BlockAccess + ?Sized>(raw: RawBlock, x: i32, y: i32, z: i32, access: &A) -> BlockState {
    if raw.id == catalog::ids::AIR {
        return BlockState::Air;
    }

    let Some(block) = catalog::lookup(raw.id, raw.data) else {
        return BlockState::Missing;
    };

    let mut properties = properties::from_metadata(block, raw.data);
    shape::infer(raw, x, y, z, access, &mut properties);

    BlockState::Block {
        id: block.name,
        properties,
    }
}
