//! Builders for chunk records and on-disk saves used by unit tests.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use fastnbt::IntArray;
use flate2::Compression;
use flate2::write::{GzEncoder, ZlibEncoder};

use crate::chunk::ChunkPos;
use crate::nbt::{self, ChunkRoot, ColumnLevel, LevelDat, LevelData, Section, SectionedLevel};
use crate::nibble::{ColumnLayout, NibbleArray, section_index};

pub fn gzip(data: &[u8]) -> Vec<u8> {
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub fn zlib(data: &[u8]) -> Vec<u8> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

pub struct ColumnBuilder {
    pos: ChunkPos,
    layout: ColumnLayout,
    blocks: Vec<u8>,
    data: NibbleArray,
    sky: Option<NibbleArray>,
    block_light: Option<NibbleArray>,
    height_map: Option<Vec<u8>>,
    populated: Option<bool>,
    inhabited: Option<i64>,
}

impl ColumnBuilder {
    pub fn new(chunk_x: i32, chunk_z: i32, height: i32) -> Self {
        let layout = if height > 128 { ColumnLayout::HEIGHT_256 } else { ColumnLayout::HEIGHT_128 };
        let voxels = 16 * 16 * layout.height() as usize;
        Self {
            pos: ChunkPos::new(chunk_x, chunk_z),
            layout,
            blocks: vec![0; voxels],
            data: NibbleArray::zeroed(voxels),
            sky: None,
            block_light: None,
            height_map: None,
            populated: None,
            inhabited: None,
        }
    }

    fn voxels(&self) -> usize {
        self.blocks.len()
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    pub fn block(mut self, x: i32, y: i32, z: i32, id: u16, data: u8) -> Self {
        let i = self.layout.index(x, y, z);
        self.blocks[i] = id as u8;
        self.data.set(i, data);
        self
    }

    pub fn fill_layer(mut self, y: i32, id: u16) -> Self {
        for x in 0..16 {
            for z in 0..16 {
                self = self.block(x, y, z, id, 0);
            }
        }
        self
    }

    pub fn with_light(mut self) -> Self {
        let voxels = self.voxels();
        self.sky.get_or_insert_with(|| NibbleArray::zeroed(voxels));
        self.block_light.get_or_insert_with(|| NibbleArray::zeroed(voxels));
        self
    }

    pub fn sky(mut self, x: i32, y: i32, z: i32, value: u8) -> Self {
        self = self.with_light();
        let i = self.layout.index(x, y, z);
        if let Some(sky) = self.sky.as_mut() {
            sky.set(i, value);
        }
        self
    }

    pub fn block_light(mut self, x: i32, y: i32, z: i32, value: u8) -> Self {
        self = self.with_light();
        let i = self.layout.index(x, y, z);
        if let Some(light) = self.block_light.as_mut() {
            light.set(i, value);
        }
        self
    }

    pub fn height_map(mut self, x: i32, z: i32, y: u8) -> Self {
        self.height_map.get_or_insert_with(|| vec![0; 256])[((z << 4) | x) as usize] = y;
        self
    }

    pub fn populated(mut self, populated: bool) -> Self {
        self.populated = Some(populated);
        self
    }

    pub fn inhabited(mut self, ticks: i64) -> Self {
        self.inhabited = Some(ticks);
        self
    }

    pub fn level(&self) -> ColumnLevel {
        ColumnLevel {
            x_pos: self.pos.x,
            z_pos: self.pos.z,
            blocks: Some(nbt::from_bytes(&self.blocks)),
            data: Some(nbt::from_bytes(self.data.as_bytes())),
            sky_light: self.sky.as_ref().map(|s| nbt::from_bytes(s.as_bytes())),
            block_light: self.block_light.as_ref().map(|b| nbt::from_bytes(b.as_bytes())),
            height_map: self.height_map.as_deref().map(nbt::from_bytes),
            terrain_populated: self.populated.map(i8::from),
            inhabited_time: self.inhabited,
        }
    }

    /// Uncompressed NBT of the whole chunk record.
    pub fn to_nbt(&self) -> Vec<u8> {
        fastnbt::to_bytes(&ChunkRoot { level: self.level() }).unwrap()
    }
}

#[derive(Default)]
struct SectionData {
    blocks: Vec<u8>,
    add: Option<NibbleArray>,
    data: NibbleArray,
    sky: Option<NibbleArray>,
    block_light: Option<NibbleArray>,
}

impl SectionData {
    fn new() -> Self {
        Self {
            blocks: vec![0; 4096],
            data: NibbleArray::zeroed(4096),
            ..Default::default()
        }
    }
}

pub struct SectionedBuilder {
    pos: ChunkPos,
    sections: BTreeMap<i8, SectionData>,
    biomes: Option<Vec<i32>>,
    height_map: Option<Vec<i32>>,
    status: Option<String>,
    populated: Option<bool>,
    inhabited: Option<i64>,
}

impl SectionedBuilder {
    pub fn new(chunk_x: i32, chunk_z: i32) -> Self {
        Self {
            pos: ChunkPos::new(chunk_x, chunk_z),
            sections: BTreeMap::new(),
            biomes: None,
            height_map: None,
            status: None,
            populated: None,
            inhabited: None,
        }
    }

    pub fn pos(&self) -> ChunkPos {
        self.pos
    }

    fn section(&mut self, y: i32) -> &mut SectionData {
        self.sections.entry((y >> 4) as i8).or_insert_with(SectionData::new)
    }

    pub fn block(mut self, x: i32, y: i32, z: i32, id: u16, data: u8) -> Self {
        let i = section_index(x, y, z);
        let section = self.section(y);
        section.blocks[i] = (id & 0xFF) as u8;
        section.data.set(i, data);
        if id > 0xFF {
            section.add.get_or_insert_with(|| NibbleArray::zeroed(4096)).set(i, (id >> 8) as u8);
        }
        self
    }

    pub fn sky(mut self, x: i32, y: i32, z: i32, value: u8) -> Self {
        let i = section_index(x, y, z);
        self.section(y).sky.get_or_insert_with(|| NibbleArray::zeroed(4096)).set(i, value);
        self
    }

    pub fn block_light(mut self, x: i32, y: i32, z: i32, value: u8) -> Self {
        let i = section_index(x, y, z);
        self.section(y)
            .block_light
            .get_or_insert_with(|| NibbleArray::zeroed(4096))
            .set(i, value);
        self
    }

    pub fn biome(mut self, x: i32, z: i32, id: i32) -> Self {
        self.biomes.get_or_insert_with(|| vec![1; 256])[(z * 16 + x) as usize] = id;
        self
    }

    pub fn height(mut self, x: i32, z: i32, y: i32) -> Self {
        self.height_map.get_or_insert_with(|| vec![0; 256])[((z << 4) | x) as usize] = y;
        self
    }

    pub fn status(mut self, status: &str) -> Self {
        self.status = Some(status.to_string());
        self
    }

    pub fn populated(mut self, populated: bool) -> Self {
        self.populated = Some(populated);
        self
    }

    pub fn inhabited(mut self, ticks: i64) -> Self {
        self.inhabited = Some(ticks);
        self
    }

    pub fn level(&self) -> SectionedLevel {
        SectionedLevel {
            x_pos: self.pos.x,
            z_pos: self.pos.z,
            sections: self
                .sections
                .iter()
                .map(|(&y, s)| Section {
                    y,
                    blocks: nbt::from_bytes(&s.blocks),
                    add: s.add.as_ref().map(|a| nbt::from_bytes(a.as_bytes())),
                    data: Some(nbt::from_bytes(s.data.as_bytes())),
                    sky_light: s.sky.as_ref().map(|a| nbt::from_bytes(a.as_bytes())),
                    block_light: s.block_light.as_ref().map(|a| nbt::from_bytes(a.as_bytes())),
                })
                .collect(),
            biomes: self.biomes.clone(),
            height_map: self.height_map.clone().map(IntArray::new),
            status: self.status.clone(),
            terrain_populated: self.populated.map(i8::from),
            inhabited_time: self.inhabited,
        }
    }

    pub fn to_nbt(&self) -> Vec<u8> {
        fastnbt::to_bytes(&ChunkRoot { level: self.level() }).unwrap()
    }
}

/// Assembles a region file holding zlib-compressed chunk records.
pub fn region_file(chunks: &[(i32, i32, Vec<u8>)]) -> Vec<u8> {
    let mut file = vec![0u8; 8192];
    for (rel_x, rel_z, nbt) in chunks {
        let compressed = zlib(nbt);
        let sector = file.len() / 4096;

        let mut blob = Vec::new();
        blob.extend_from_slice(&(compressed.len() as u32 + 1).to_be_bytes());
        blob.push(legacy_region::compression::ZLIB);
        blob.extend_from_slice(&compressed);
        let sectors = blob.len().div_ceil(4096);
        blob.resize(sectors * 4096, 0);
        file.extend_from_slice(&blob);

        let index = legacy_region::local_index(*rel_x, *rel_z);
        let entry = ((sector as u32) << 8) | sectors as u32;
        file[index * 4..index * 4 + 4].copy_from_slice(&entry.to_be_bytes());
        file[4096 + index * 4..4096 + index * 4 + 4].copy_from_slice(&1_300_000_000u32.to_be_bytes());
    }
    file
}

pub fn write_file(path: &Path, bytes: &[u8]) -> PathBuf {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(path, bytes).unwrap();
    path.to_path_buf()
}

pub fn write_level_dat(root: &Path, name: &str, seed: i64, spawn: (i32, i32, i32), version: Option<i32>) {
    let level = LevelDat {
        data: LevelData {
            level_name: Some(name.to_string()),
            random_seed: seed,
            spawn_x: spawn.0,
            spawn_y: spawn.1,
            spawn_z: spawn.2,
            version,
        },
    };
    write_file(&root.join("level.dat"), &gzip(&fastnbt::to_bytes(&level).unwrap()));
}

/// Writes one Alpha chunk file at the path the game would use.
pub fn write_alpha_chunk(root: &Path, builder: &ColumnBuilder) -> PathBuf {
    let pos = builder.pos();
    let path = root.join(crate::region::alpha::chunk_path(pos.x, pos.z));
    write_file(&path, &gzip(&builder.to_nbt()))
}

/// Writes `region/r.X.Z.<extension>` holding the given chunk records.
pub fn write_region(root: &Path, x: i32, z: i32, extension: &str, chunks: &[(i32, i32, Vec<u8>)]) -> PathBuf {
    let path = root.join("region").join(format!("r.{x}.{z}.{extension}"));
    write_file(&path, &region_file(chunks))
}
