//! Sectioned chunks: a column of up to 32 independent 16x16x16 sections.

use std::fmt;
use std::sync::Arc;

use anyhow::Context;

use super::{ChunkPos, DecodeContext, LightData, NeighborSource, default_light, with_fixed_block_light};
use crate::biome::{FALLBACK_BIOME, numeric_biome};
use crate::block::RawBlock;
use crate::nbt::{self, ChunkRoot, Section, SectionedLevel};
use crate::nibble::{NibbleArray, section_index};

pub const SECTION_SLOTS: usize = 32;

/// Statuses of chunks whose generation finished.
const GENERATED_STATUSES: [&str; 3] = ["full", "fullchunk", "postprocessed"];

struct ChunkSection {
    blocks: Box<[u8]>,
    add: NibbleArray,
    data: NibbleArray,
    sky_light: Option<NibbleArray>,
    block_light: NibbleArray,
}

impl ChunkSection {
    fn from_record(section: &Section) -> Self {
        let nibbles = |array: &Option<fastnbt::ByteArray>| {
            array.as_ref().map(|a| NibbleArray::new(nbt::to_bytes(a)))
        };
        Self {
            blocks: nbt::to_bytes(&section.blocks).into_boxed_slice(),
            add: nibbles(&section.add).unwrap_or_default(),
            data: nibbles(&section.data).unwrap_or_default(),
            sky_light: nibbles(&section.sky_light).filter(|s| !s.is_empty()),
            block_light: nibbles(&section.block_light).unwrap_or_default(),
        }
    }

    fn id(&self, index: usize) -> u16 {
        let low = self.blocks.get(index).copied().unwrap_or(0) as u16;
        low | ((self.add.get(index) as u16) << 8)
    }
}

pub struct SectionedChunk {
    pos: ChunkPos,
    sections: Box<[Option<ChunkSection>]>,
    biomes: Option<Box<[i32]>>,
    height_map: Option<Box<[i32]>>,
    generated: bool,
    has_light: bool,
    inhabited_time: i64,
    default_sky_light: u8,
    neighbors: Arc<dyn NeighborSource>,
}

impl fmt::Debug for SectionedChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SectionedChunk")
            .field("pos", &self.pos)
            .field("sections", &self.sections.iter().filter(|s| s.is_some()).count())
            .field("generated", &self.generated)
            .field("has_light", &self.has_light)
            .finish_non_exhaustive()
    }
}

/// Parses an uncompressed NBT chunk record.
pub fn decode(bytes: &[u8], pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<SectionedChunk> {
    let root: ChunkRoot<SectionedLevel> =
        fastnbt::from_bytes(bytes).with_context(|| format!("malformed chunk record at {pos:?}"))?;
    Ok(SectionedChunk::from_level(root.level, pos, ctx))
}

impl SectionedChunk {
    pub const MAX_Y: i32 = 255;
    /// Block lookups accept every Y a section slot can hold.
    pub const Y_BOUND: i32 = (SECTION_SLOTS as i32) * 16;

    pub fn from_level(level: SectionedLevel, pos: ChunkPos, ctx: &DecodeContext) -> Self {
        let status = level.status.as_deref().map(|s| s.strip_prefix("minecraft:").unwrap_or(s));
        let mut generated = match status {
            Some(status) => GENERATED_STATUSES.contains(&status),
            None => level.terrain_populated == Some(1),
        };
        let has_light = generated;
        if !generated && ctx.ignore_missing_light_data {
            generated = status != Some("empty");
        }

        let mut sections: Vec<Option<ChunkSection>> = (0..SECTION_SLOTS).map(|_| None).collect();
        for section in &level.sections {
            match usize::try_from(section.y).ok().filter(|&y| y < SECTION_SLOTS) {
                Some(slot) => sections[slot] = Some(ChunkSection::from_record(section)),
                None => log::debug!("skipping section Y={} of chunk {pos:?}", section.y),
            }
        }

        Self {
            pos,
            sections: sections.into_boxed_slice(),
            biomes: level.biomes.filter(|b| b.len() >= 256).map(Vec::into_boxed_slice),
            height_map: level
                .height_map
                .filter(|m| m.len() >= 256)
                .map(|m| m.into_inner().into_boxed_slice()),
            generated,
            has_light,
            inhabited_time: level.inhabited_time.unwrap_or(0),
            default_sky_light: ctx.sky_light,
            neighbors: Arc::clone(&ctx.neighbors),
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub(crate) fn neighbors(&self) -> &dyn NeighborSource {
        self.neighbors.as_ref()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn has_light(&self) -> bool {
        self.has_light
    }

    pub fn inhabited_time(&self) -> i64 {
        self.inhabited_time
    }

    fn section(&self, y: i32) -> Option<&ChunkSection> {
        if !(0..Self::Y_BOUND).contains(&y) {
            return None;
        }
        self.sections.get((y >> 4) as usize)?.as_ref()
    }

    /// `x` and `z` are local (0..16).
    pub fn raw_block(&self, x: i32, y: i32, z: i32) -> RawBlock {
        match self.section(y) {
            Some(section) => {
                let i = section_index(x, y, z);
                RawBlock::new(section.id(i), section.data.get(i))
            }
            None => RawBlock::AIR,
        }
    }

    pub fn light_data(&self, x: i32, y: i32, z: i32) -> LightData {
        let Some(section) = self.section(y) else {
            return LightData::new(self.default_sky_light, 0);
        };
        let i = section_index(x, y, z);
        let id = section.id(i);

        if !self.has_light {
            return default_light(self.default_sky_light, id);
        }
        let sky = section.sky_light.as_ref().map_or(self.default_sky_light, |s| s.get(i));
        with_fixed_block_light(LightData::new(sky, section.block_light.get(i)), id)
    }

    pub fn biome(&self, x: i32, z: i32) -> &'static str {
        self.biomes
            .as_ref()
            .and_then(|b| b.get((z * 16 + x) as usize))
            .map_or(FALLBACK_BIOME, |&id| numeric_biome(id))
    }

    pub fn world_surface_y(&self, x: i32, z: i32) -> i32 {
        self.height_map
            .as_ref()
            .and_then(|map| map.get(((z << 4) | x) as usize))
            .map_or(super::DEFAULT_SURFACE_Y, |&y| y)
    }
}
