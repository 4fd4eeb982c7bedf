//! Classic column chunks: one flat array per voxel attribute.

use std::fmt;
use std::sync::Arc;

use anyhow::{Context, bail};

use super::{ChunkPos, DecodeContext, LightData, NeighborSource, with_fixed_block_light};
use crate::biome::LegacyBiome;
use crate::block::RawBlock;
use crate::nbt::{self, ChunkRoot, ColumnLevel};
use crate::nibble::{ColumnLayout, NibbleArray};

/// Which save format produced a column chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnFormat {
    /// Per-chunk `.dat` files, always 128 high.
    Alpha,
    /// `.mcr` regions, 128 or 256 high.
    McRegion,
}

impl ColumnFormat {
    /// Alpha ids only use the low seven bits of their byte.
    fn id_mask(self) -> u8 {
        match self {
            ColumnFormat::Alpha => 0x7F,
            ColumnFormat::McRegion => 0xFF,
        }
    }
}

const BLOCKS_128: usize = 16 * 16 * 128;

pub struct ColumnChunk {
    pos: ChunkPos,
    layout: ColumnLayout,
    blocks: Box<[u8]>,
    data: NibbleArray,
    sky_light: Option<NibbleArray>,
    block_light: Option<NibbleArray>,
    height_map: Option<Box<[u8]>>,
    biomes: Box<[LegacyBiome]>,
    generated: bool,
    inhabited_time: i64,
    default_sky_light: u8,
    neighbors: Arc<dyn NeighborSource>,
}

impl fmt::Debug for ColumnChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnChunk")
            .field("pos", &self.pos)
            .field("height", &self.layout.height())
            .field("generated", &self.generated)
            .field("inhabited_time", &self.inhabited_time)
            .finish_non_exhaustive()
    }
}

/// Parses an uncompressed NBT chunk record.
pub fn decode(bytes: &[u8], format: ColumnFormat, pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<ColumnChunk> {
    let root: ChunkRoot<ColumnLevel> =
        fastnbt::from_bytes(bytes).with_context(|| format!("malformed chunk record at {pos:?}"))?;
    ColumnChunk::from_level(root.level, format, pos, ctx)
}

impl ColumnChunk {
    pub fn from_level(level: ColumnLevel, format: ColumnFormat, pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<Self> {
        // No block array at all means an all-air column
        let mut blocks = level.blocks.as_ref().map(nbt::to_bytes).unwrap_or_default();
        if !blocks.is_empty() && blocks.len() < BLOCKS_128 {
            bail!("block array of chunk {pos:?} holds {} bytes, expected at least {BLOCKS_128}", blocks.len());
        }

        let layout = match format {
            ColumnFormat::McRegion if blocks.len() > BLOCKS_128 => ColumnLayout::HEIGHT_256,
            _ => ColumnLayout::HEIGHT_128,
        };
        let mask = format.id_mask();
        if mask != 0xFF {
            blocks.iter_mut().for_each(|id| *id &= mask);
        }

        let mut generated = level.terrain_populated.is_some_and(|p| p != 0);
        if !generated && ctx.ignore_missing_light_data {
            generated = blocks.iter().any(|&id| id != 0);
        }

        // Empty light arrays count as missing
        let nibbles = |array: &Option<fastnbt::ByteArray>| {
            array
                .as_ref()
                .filter(|a| !a.is_empty())
                .map(|a| NibbleArray::new(nbt::to_bytes(a)))
        };

        Ok(Self {
            pos,
            layout,
            data: nibbles(&level.data).unwrap_or_default(),
            sky_light: nibbles(&level.sky_light),
            block_light: nibbles(&level.block_light),
            height_map: level.height_map.as_ref().map(|m| nbt::to_bytes(m).into_boxed_slice()),
            blocks: blocks.into_boxed_slice(),
            biomes: ctx.biomes.chunk_biomes(pos.x, pos.z),
            generated,
            inhabited_time: level.inhabited_time.unwrap_or(1),
            default_sky_light: ctx.sky_light,
            neighbors: Arc::clone(&ctx.neighbors),
        })
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub(crate) fn neighbors(&self) -> &dyn NeighborSource {
        self.neighbors.as_ref()
    }

    pub fn height(&self) -> i32 {
        self.layout.height()
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    pub fn inhabited_time(&self) -> i64 {
        self.inhabited_time
    }

    fn index(&self, x: i32, y: i32, z: i32) -> Option<usize> {
        (0..self.layout.height()).contains(&y).then(|| self.layout.index(x, y, z))
    }

    /// `x` and `z` are local (0..16).
    pub fn raw_block(&self, x: i32, y: i32, z: i32) -> RawBlock {
        match self.index(x, y, z) {
            Some(i) => RawBlock::new(self.blocks.get(i).copied().unwrap_or(0) as u16, self.data.get(i)),
            None => RawBlock::AIR,
        }
    }

    pub fn light_data(&self, x: i32, y: i32, z: i32) -> LightData {
        let Some(i) = self.index(x, y, z) else {
            return LightData::new(self.default_sky_light, 0);
        };
        let id = self.blocks.get(i).copied().unwrap_or(0) as u16;

        let sky = self.sky_light.as_ref().map_or(self.default_sky_light, |s| s.get(i));
        let block = self.block_light.as_ref().map_or(0, |b| b.get(i));
        with_fixed_block_light(LightData::new(sky, block), id)
    }

    pub fn biome(&self, x: i32, z: i32) -> &'static str {
        let biome = self.biomes.get((x * 16 + z) as usize).copied().unwrap_or(LegacyBiome::Plains);
        biome.modern_id()
    }

    pub fn world_surface_y(&self, x: i32, z: i32) -> i32 {
        self.height_map
            .as_ref()
            .and_then(|map| map.get(((z << 4) | x) as usize))
            .map_or(super::DEFAULT_SURFACE_Y, |&y| y as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::BlockState;
    use crate::chunk::Chunk;
    use crate::test_fixtures::ColumnBuilder;

    fn decode_built(builder: ColumnBuilder, format: ColumnFormat, ctx: &DecodeContext) -> Chunk {
        let bytes = builder.to_nbt();
        Chunk::Column(decode(&bytes, format, builder.pos(), ctx).unwrap())
    }

    #[test]
    fn test_height_follows_block_array_length() {
        let ctx = DecodeContext::standalone(15);

        let short = decode_built(ColumnBuilder::new(0, 0, 128), ColumnFormat::McRegion, &ctx);
        assert_eq!(short.max_y(), 127);

        let tall = decode_built(ColumnBuilder::new(0, 0, 256).block(2, 200, 3, 1, 0), ColumnFormat::McRegion, &ctx);
        assert_eq!(tall.max_y(), 255);
        assert_eq!(tall.height(), 256);
        assert_eq!(tall.raw_block(2, 200, 3).id, 1);

        // Alpha files never use the tall layout
        let alpha = decode_built(ColumnBuilder::new(0, 0, 256), ColumnFormat::Alpha, &ctx);
        assert_eq!(alpha.max_y(), 127);
    }

    #[test]
    fn test_out_of_range_y() {
        let ctx = DecodeContext::standalone(13);
        let chunk = decode_built(
            ColumnBuilder::new(1, 1, 128).fill_layer(127, 1).with_light(),
            ColumnFormat::McRegion,
            &ctx,
        );

        for y in [-1, 128, 300, i32::MIN, i32::MAX] {
            assert_eq!(chunk.block_state(0, y, 0), BlockState::Air, "y={y}");
            assert_eq!(chunk.light_data(0, y, 0), LightData::new(13, 0), "y={y}");
        }
        assert_eq!(chunk.raw_block(0, 127, 0).id, 1);
    }

    #[test]
    fn test_coordinates_are_masked() {
        let ctx = DecodeContext::standalone(15);
        let chunk = decode_built(ColumnBuilder::new(-1, 2, 128).block(15, 10, 0, 4, 0), ColumnFormat::Alpha, &ctx);
        assert_eq!(chunk.raw_block(-1, 10, 32).id, 4);
        assert_eq!(chunk.raw_block(15, 10, 0).id, 4);
    }

    #[test]
    fn test_light_defaults_and_slab_override() {
        let ctx = DecodeContext::standalone(15);
        let dark = decode_built(ColumnBuilder::new(0, 0, 128).block(0, 5, 0, 44, 0), ColumnFormat::McRegion, &ctx);
        assert_eq!(dark.light_data(1, 5, 1), LightData::new(15, 0));
        assert_eq!(dark.light_data(0, 5, 0), LightData::new(15, 7));

        let lit = decode_built(
            ColumnBuilder::new(0, 0, 128).with_light().sky(3, 40, 3, 9).block_light(3, 40, 3, 4),
            ColumnFormat::McRegion,
            &ctx,
        );
        assert_eq!(lit.light_data(3, 40, 3), LightData::new(9, 4));
    }

    #[test]
    fn test_generated_and_inhabited() {
        let ctx = DecodeContext::standalone(15);
        let populated = decode_built(ColumnBuilder::new(0, 0, 128).populated(true), ColumnFormat::McRegion, &ctx);
        assert!(populated.is_generated());
        assert_eq!(populated.inhabited_time(), 1);

        let bare = decode_built(ColumnBuilder::new(0, 0, 128).block(0, 0, 0, 7, 0), ColumnFormat::McRegion, &ctx);
        assert!(!bare.is_generated());

        let tolerant = DecodeContext {
            ignore_missing_light_data: true,
            ..DecodeContext::standalone(15)
        };
        let built = decode_built(ColumnBuilder::new(0, 0, 128).block(0, 0, 0, 7, 0), ColumnFormat::McRegion, &tolerant);
        assert!(built.is_generated());
        let air_only = decode_built(ColumnBuilder::new(0, 0, 128), ColumnFormat::McRegion, &tolerant);
        assert!(!air_only.is_generated());
    }

    #[test]
    fn test_block_states_use_in_chunk_neighbors() {
        let ctx = DecodeContext::standalone(15);
        let chunk = decode_built(
            ColumnBuilder::new(2, 3, 128).block(4, 60, 4, 2, 0).block(4, 61, 4, 78, 0).block(5, 60, 4, 85, 0).block(6, 60, 4, 85, 0),
            ColumnFormat::McRegion,
            &ctx,
        );
        let grass = chunk.block_state(32 + 4, 60, 48 + 4);
        assert_eq!(grass.id(), "minecraft:grass_block");
        assert_eq!(grass.property("snowy"), Some("true"));

        let fence = chunk.block_state(5, 60, 4);
        assert_eq!(fence.property("east"), Some("true"));
        assert_eq!(fence.property("west"), Some("false"));
    }

    #[test]
    fn test_surface_and_ocean_floor() {
        let ctx = DecodeContext::standalone(15);
        let chunk = decode_built(
            ColumnBuilder::new(0, 0, 128).block(2, 40, 2, 12, 0).block(2, 41, 2, 9, 0).height_map(2, 2, 42),
            ColumnFormat::McRegion,
            &ctx,
        );
        assert_eq!(chunk.world_surface_y(2, 2), 42);
        assert_eq!(chunk.ocean_floor_y(2, 2), 40);
        assert_eq!(chunk.ocean_floor_y(9, 9), crate::chunk::DEFAULT_OCEAN_FLOOR_Y);

        let no_map = decode_built(ColumnBuilder::new(0, 0, 128), ColumnFormat::McRegion, &ctx);
        assert_eq!(no_map.world_surface_y(0, 0), crate::chunk::DEFAULT_SURFACE_Y);
    }

    #[test]
    fn test_truncated_blocks_are_rejected() {
        let ctx = DecodeContext::standalone(15);
        let level = ColumnLevel {
            x_pos: 0,
            z_pos: 0,
            blocks: Some(nbt::from_bytes(&[1; 100])),
            data: None,
            sky_light: None,
            block_light: None,
            height_map: None,
            terrain_populated: None,
            inhabited_time: None,
        };
        let err = ColumnChunk::from_level(level, ColumnFormat::McRegion, ChunkPos::new(0, 0), &ctx).unwrap_err();
        assert!(err.to_string().contains("expected at least"), "{err}");

        assert!(decode(b"not nbt", ColumnFormat::Alpha, ChunkPos::new(0, 0), &ctx).is_err());
    }

    fn air_level(blocks: Option<fastnbt::ByteArray>, populated: Option<i8>) -> ColumnLevel {
        ColumnLevel {
            x_pos: 0,
            z_pos: 0,
            blocks,
            data: None,
            sky_light: None,
            block_light: None,
            height_map: None,
            terrain_populated: populated,
            inhabited_time: None,
        }
    }

    #[test]
    fn test_missing_or_empty_blocks_decode_as_air() {
        let ctx = DecodeContext::standalone(12);
        let pos = ChunkPos::new(0, 0);

        let missing = fastnbt::to_bytes(&ChunkRoot { level: air_level(None, Some(1)) }).unwrap();
        let empty = fastnbt::to_bytes(&ChunkRoot {
            level: air_level(Some(nbt::from_bytes(&[])), Some(1)),
        })
        .unwrap();

        for bytes in [missing, empty] {
            for format in [ColumnFormat::Alpha, ColumnFormat::McRegion] {
                let chunk = Chunk::Column(decode(&bytes, format, pos, &ctx).unwrap());
                assert!(chunk.is_generated());
                assert_eq!(chunk.max_y(), 127);
                assert_eq!(chunk.raw_block(3, 64, 3), RawBlock::AIR);
                assert_eq!(chunk.block_state(3, 64, 3), BlockState::Air);
                assert_eq!(chunk.light_data(3, 64, 3), LightData::new(12, 0));
            }
        }

        // The tolerate policy finds no solid block either
        let tolerant = DecodeContext {
            ignore_missing_light_data: true,
            ..DecodeContext::standalone(12)
        };
        let chunk = ColumnChunk::from_level(air_level(None, None), ColumnFormat::Alpha, pos, &tolerant).unwrap();
        assert!(!chunk.is_generated());
    }

    #[test]
    fn test_alpha_ids_use_seven_bits() {
        let ctx = DecodeContext::standalone(15);
        let builder = ColumnBuilder::new(0, 0, 128).block(1, 70, 1, 0x80 | 3, 0);

        let alpha = decode_built(ColumnBuilder::new(0, 0, 128).block(1, 70, 1, 0x80 | 3, 0), ColumnFormat::Alpha, &ctx);
        assert_eq!(alpha.raw_block(1, 70, 1).id, 3);
        assert_eq!(alpha.block_state(1, 70, 1).id(), "minecraft:dirt");

        let mcregion = decode_built(builder, ColumnFormat::McRegion, &ctx);
        assert_eq!(mcregion.raw_block(1, 70, 1).id, 0x83);
    }

    #[test]
    fn test_biomes_come_from_the_source() {
        let ctx = DecodeContext {
            biomes: Arc::new(crate::biome::BiomeSource::Fixed(LegacyBiome::Hell)),
            ..DecodeContext::standalone(15)
        };
        let chunk = decode_built(ColumnBuilder::new(0, 0, 128), ColumnFormat::Alpha, &ctx);
        assert_eq!(chunk.biome(3, 64, 3), "minecraft:nether");
    }
}
