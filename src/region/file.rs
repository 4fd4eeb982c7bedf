//! `.mcr` and `.mca` region files: 32x32 chunks in one sector container.

use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::path::{Path, PathBuf};

use anyhow::Context;
use legacy_region::{REGION_SIZE, RegionHeader};

use super::{Region, RegionKind, RegionPos};
use crate::chunk::column::{self, ColumnFormat};
use crate::chunk::{Chunk, ChunkPos, DecodeContext, sectioned};

#[derive(Debug)]
pub struct RegionFile {
    kind: RegionKind,
    pos: RegionPos,
    file: PathBuf,
}

impl RegionFile {
    pub fn new(kind: RegionKind, pos: RegionPos, file: PathBuf) -> Self {
        Self { kind, pos, file }
    }

    /// `None` when the file does not exist.
    fn open(&self) -> anyhow::Result<Option<BufReader<File>>> {
        match File::open(&self.file) {
            Ok(file) => Ok(Some(BufReader::new(file))),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).with_context(|| format!("failed to open {}", self.file.display())),
        }
    }

    fn contains(&self, pos: ChunkPos) -> bool {
        pos.x.div_euclid(REGION_SIZE) == self.pos.x && pos.z.div_euclid(REGION_SIZE) == self.pos.z
    }
}

impl Region for RegionFile {
    fn pos(&self) -> RegionPos {
        self.pos
    }

    fn kind(&self) -> RegionKind {
        self.kind
    }

    fn file(&self) -> &Path {
        &self.file
    }

    fn list_chunks(&self, since: i64) -> anyhow::Result<Vec<ChunkPos>> {
        let Some(mut reader) = self.open()? else {
            return Ok(Vec::new());
        };
        let header = RegionHeader::read(&mut reader)
            .with_context(|| format!("bad region header in {}", self.file.display()))?;

        let chunks = header
            .present_chunks()
            .filter(|&(x, z)| since <= 0 || header.timestamp(x, z) as i64 * 1000 >= since)
            .map(|(x, z)| ChunkPos::new(self.pos.x * REGION_SIZE + x, self.pos.z * REGION_SIZE + z))
            .collect();
        Ok(chunks)
    }

    fn load_chunk(&self, pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<Chunk> {
        if !self.contains(pos) {
            return Ok(Chunk::Empty);
        }
        let Some(mut reader) = self.open()? else {
            return Ok(Chunk::Empty);
        };

        let nbt = legacy_region::read_chunk(&mut reader, pos.x, pos.z)
            .with_context(|| format!("failed to read chunk {pos:?} from {}", self.file.display()))?;
        let Some(nbt) = nbt else {
            return Ok(Chunk::Empty);
        };

        let chunk = match self.kind {
            RegionKind::Anvil => Chunk::Sectioned(sectioned::decode(&nbt, pos, ctx)?),
            _ => Chunk::Column(column::decode(&nbt, ColumnFormat::McRegion, pos, ctx)?),
        };
        Ok(chunk)
    }
}
