//! Per-chunk files of the earliest save format.
//!
//! Chunk (x, z) lives at `b36(x & 63)/b36(z & 63)/c.b36(x).b36(z).dat`,
//! where `b36` is the signed, lower-case base-36 rendering the game used.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::Context;

use super::{Region, RegionKind, RegionPos, is_fresh};
use crate::chunk::column::{self, ColumnFormat};
use crate::chunk::{Chunk, ChunkPos, DecodeContext};

const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

pub fn to_base36(value: i32) -> String {
    let mut magnitude = (value as i64).unsigned_abs();
    if magnitude == 0 {
        return "0".to_string();
    }

    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(DIGITS[(magnitude % 36) as usize]);
        magnitude /= 36;
    }
    if value < 0 {
        digits.push(b'-');
    }
    digits.reverse();
    String::from_utf8_lossy(&digits).into_owned()
}

pub fn from_base36(text: &str) -> Option<i32> {
    i32::from_str_radix(text, 36).ok()
}

/// Relative path of the file holding chunk (x, z).
pub fn chunk_path(x: i32, z: i32) -> PathBuf {
    PathBuf::from(to_base36(x.rem_euclid(64)))
        .join(to_base36(z.rem_euclid(64)))
        .join(format!("c.{}.{}.dat", to_base36(x), to_base36(z)))
}

/// Chunk coordinates of a `c.X.Z.dat` file name.
pub fn parse_chunk_file_name(name: &str) -> Option<ChunkPos> {
    let parts: Vec<&str> = name.split('.').collect();
    if parts.len() == 4 && parts[0] == "c" && parts[3] == "dat" {
        Some(ChunkPos::new(from_base36(parts[1])?, from_base36(parts[2])?))
    } else {
        None
    }
}

/// First-level and second-level folder names are `b36(0..64)`.
fn bucket_dir(name: &str) -> bool {
    name.len() <= 2 && from_base36(name).is_some_and(|v| (0..64).contains(&v))
}

fn sub_dirs(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let is_bucket = entry.file_name().to_str().is_some_and(bucket_dir);
        if is_bucket && entry.file_type()?.is_dir() {
            dirs.push(entry.path());
        }
    }
    Ok(dirs)
}

/// Every chunk file of a per-chunk save (each one is its own region).
pub(crate) fn list_chunk_files(root: &Path) -> anyhow::Result<Vec<(RegionPos, PathBuf)>> {
    let mut files = Vec::new();
    if !root.is_dir() {
        return Ok(files);
    }

    for x_dir in sub_dirs(root)? {
        for z_dir in sub_dirs(&x_dir)? {
            for entry in std::fs::read_dir(&z_dir)? {
                let entry = entry?;
                let name = entry.file_name();
                if let Some(pos) = name.to_str().and_then(parse_chunk_file_name) {
                    files.push((RegionPos::new(pos.x, pos.z), entry.path()));
                }
            }
        }
    }
    Ok(files)
}

/// One chunk file viewed as a 1x1 region.
#[derive(Debug)]
pub struct AlphaRegion {
    pos: RegionPos,
    file: PathBuf,
}

impl AlphaRegion {
    pub fn new(pos: RegionPos, file: PathBuf) -> Self {
        Self { pos, file }
    }
}

impl Region for AlphaRegion {
    fn pos(&self) -> RegionPos {
        self.pos
    }

    fn kind(&self) -> RegionKind {
        RegionKind::Alpha
    }

    fn file(&self) -> &Path {
        &self.file
    }

    fn list_chunks(&self, since: i64) -> anyhow::Result<Vec<ChunkPos>> {
        if is_fresh(&self.file, since) {
            Ok(vec![ChunkPos::new(self.pos.x, self.pos.z)])
        } else {
            Ok(Vec::new())
        }
    }

    fn load_chunk(&self, pos: ChunkPos, ctx: &DecodeContext) -> anyhow::Result<Chunk> {
        if pos != ChunkPos::new(self.pos.x, self.pos.z) {
            return Ok(Chunk::Empty);
        }

        let compressed = match std::fs::read(&self.file) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Chunk::Empty),
            Err(e) => return Err(e).with_context(|| format!("failed to read {}", self.file.display())),
        };
        if compressed.is_empty() {
            return Ok(Chunk::Empty);
        }

        let nbt = legacy_region::gunzip(&compressed)
            .with_context(|| format!("failed to decompress {}", self.file.display()))?;
        let chunk = column::decode(&nbt, ColumnFormat::Alpha, pos, ctx)?;
        Ok(Chunk::Column(chunk))
    }
}
