//! On-disk layouts and format dispatch.
//!
//! A save uses one of two layouts:
//! - per-chunk files (`Alpha`): every chunk is its own gzip `.dat` file, so a
//!   "region" is a 1x1 group of chunks
//! - region files (`McRegion`, `Anvil`): `region/r.X.Z.mcr|mca`, each holding
//!   32x32 chunks in the sector container of the `legacy-region` crate

pub mod alpha;
pub mod file;

pub use alpha::AlphaRegion;
pub use file::RegionFile;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::chunk::{Chunk, ChunkPos, DecodeContext};

/// Region coordinates in the save's region grid.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
pub struct RegionPos {
    pub x: i32,
    pub z: i32,
}

impl RegionPos {
    pub fn new(x: i32, z: i32) -> Self {
        Self { x, z }
    }

    /// Parse region position from a file name like "r.0.-1.mca".
    pub fn from_file_name(name: &str) -> Option<Self> {
        let parts: Vec<&str> = name.split('.').collect();
        if parts.len() == 4 && parts[0] == "r" {
            let x = parts[1].parse().ok()?;
            let z = parts[2].parse().ok()?;
            Some(Self { x, z })
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegionKind {
    Alpha,
    McRegion,
    Anvil,
}

impl RegionKind {
    pub const ALL: [RegionKind; 3] = [RegionKind::Alpha, RegionKind::McRegion, RegionKind::Anvil];

    pub fn extension(self) -> &'static str {
        match self {
            RegionKind::Alpha => "dat",
            RegionKind::McRegion => "mcr",
            RegionKind::Anvil => "mca",
        }
    }

    /// Classifies a file by suffix alone.
    pub fn for_file_name(name: &str) -> Option<RegionKind> {
        Self::ALL
            .into_iter()
            .find(|kind| name.strip_suffix(kind.extension()).is_some_and(|stem| stem.ends_with('.')))
    }

    pub fn layout(self) -> SaveLayout {
        match self {
            RegionKind::Alpha => SaveLayout::ChunkFiles,
            RegionKind::McRegion | RegionKind::Anvil => SaveLayout::RegionFiles,
        }
    }

    /// Path of the file holding region `pos` of this kind.
    pub fn file(self, root: &Path, pos: RegionPos) -> PathBuf {
        match self {
            RegionKind::Alpha => root.join(alpha::chunk_path(pos.x, pos.z)),
            RegionKind::McRegion | RegionKind::Anvil => root
                .join("region")
                .join(format!("r.{}.{}.{}", pos.x, pos.z, self.extension())),
        }
    }

    /// Region coordinates encoded in a file name of this kind.
    pub fn parse_file_name(self, name: &str) -> Option<RegionPos> {
        match self {
            RegionKind::Alpha => alpha::parse_chunk_file_name(name).map(|c| RegionPos::new(c.x, c.z)),
            RegionKind::McRegion | RegionKind::Anvil => {
                name.ends_with(self.extension()).then(|| RegionPos::from_file_name(name)).flatten()
            }
        }
    }

    pub fn open(self, pos: RegionPos, file: PathBuf) -> Arc<dyn Region> {
        match self {
            RegionKind::Alpha => Arc::new(AlphaRegion::new(pos, file)),
            RegionKind::McRegion | RegionKind::Anvil => Arc::new(RegionFile::new(self, pos, file)),
        }
    }

    /// First kind of `layout` whose file for `pos` exists, or the layout's
    /// default kind bound to its missing file.
    pub fn load(layout: SaveLayout, root: &Path, pos: RegionPos) -> Arc<dyn Region> {
        for &kind in layout.kinds() {
            let file = kind.file(root, pos);
            if file.is_file() {
                return kind.open(pos, file);
            }
        }
        let kind = layout.default_kind();
        kind.open(pos, kind.file(root, pos))
    }
}

/// How a save folder arranges its chunks on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveLayout {
    ChunkFiles,
    RegionFiles,
}

impl SaveLayout {
    pub fn detect(root: &Path) -> Self {
        if root.join("region").is_dir() {
            SaveLayout::RegionFiles
        } else {
            SaveLayout::ChunkFiles
        }
    }

    /// Kinds probed when loading a region, highest priority first.
    pub fn kinds(self) -> &'static [RegionKind] {
        match self {
            SaveLayout::ChunkFiles => &[RegionKind::Alpha],
            SaveLayout::RegionFiles => &[RegionKind::Anvil, RegionKind::McRegion],
        }
    }

    pub fn default_kind(self) -> RegionKind {
        match self {
            SaveLayout::ChunkFiles => RegionKind::Alpha,
            SaveLayout::RegionFiles => RegionKind::McRegion,
        }
    }

    /// log2 of the region edge length in chunks.
    pub fn region_shift(self) -> u32 {
        match self {
            SaveLayout::ChunkFiles => 0,
            SaveLayout::RegionFiles => 5,
        }
    }

    /// Region edge length in chunks.
    pub fn region_size(self) -> i32 {
        1 << self.region_shift()
    }

    pub fn region_of_chunk(self, chunk: ChunkPos) -> RegionPos {
        RegionPos::new(chunk.x >> self.region_shift(), chunk.z >> self.region_shift())
    }

    /// Regions persisted under `root`, skipping empty or unrecognized files
    /// and, when `since > 0`, files last modified before `since` (epoch millis).
    pub fn list_regions(self, root: &Path, since: i64) -> anyhow::Result<Vec<RegionPos>> {
        let mut regions = match self {
            SaveLayout::ChunkFiles => alpha::list_chunk_files(root)?,
            SaveLayout::RegionFiles => list_region_files(&root.join("region"), self.kinds())?,
        }
        .into_iter()
        .filter(|(_, path)| is_fresh(path, since))
        .map(|(pos, _)| pos)
        .collect::<Vec<_>>();

        regions.sort_by_key(|p| (p.x, p.z));
        regions.dedup();
        Ok(regions)
    }
}

fn list_region_files(folder: &Path, kinds: &[RegionKind]) -> anyhow::Result<Vec<(RegionPos, PathBuf)>> {
    if !folder.is_dir() {
        return Ok(Vec::new());
    }

    let mut regions = Vec::new();
    for entry in std::fs::read_dir(folder)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(kind) = RegionKind::for_file_name(name).filter(|k| kinds.contains(k)) else {
            continue;
        };
        if let Some(pos) = kind.parse_file_name(name) {
            regions.push((pos, entry.path()));
        }
    }
    Ok(regions)
}

/// Non-empty file modified at or after `since` (always true for `since <= 0`).
pub(crate) fn is_fresh(path: &Path, since: i64) -> bool {
    let Ok(meta) = std::fs::metadata(path) else {
        return false;
    };
    if meta.len() == 0 {
        return false;
    }
    if since <= 0 {
        return true;
    }
    meta.modified().map(|m| m >= millis_to_time(since)).unwrap_or(true)
}

pub(crate) fn millis_to_time(millis: i64) -> SystemTime {
    UNIX_EPOCH + Duration::from_millis(millis.max(0) as u64)
}

/// A group of chunks backed by one file.
pub trait Region: Send + Sync {
    fn pos(&self) -> RegionPos;

    fn kind(&self) -> RegionKind;

    /// Backing file; may not exist, in which case every chunk is empty.
    fn file(&self) -> &Path;

    /// Chunks stored in this region, restricted to those saved at or after
    /// `since` (epoch millis) when `since > 0`.
    fn list_chunks(&self, since: i64) -> anyhow::Result<Vec<ChunkPos>>;

    /// Decodes one chunk. Chunks the file does not hold decode as
    /// [`Chunk::Empty`]; IO and format errors are returned.
    fn load_chunk(&self, pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<Chunk>;
}
