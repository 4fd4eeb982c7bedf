//! `level.dat`: world name, seed and spawn.

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::nbt::LevelDat;

/// Save format version of McRegion worlds.
pub const VERSION_MCREGION: i32 = 19132;
/// Save format version of Anvil worlds.
pub const VERSION_ANVIL: i32 = 19133;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelInfo {
    pub name: String,
    pub seed: i64,
    pub spawn: (i32, i32, i32),
    pub version: Option<i32>,
    /// File the metadata was read from.
    pub path: PathBuf,
}

/// `level.dat` of the save root, or of its parent for dimension folders.
pub fn find_level_dat(save_folder: &Path) -> Option<PathBuf> {
    let own = save_folder.join("level.dat");
    if own.is_file() {
        return Some(own);
    }
    let parent = save_folder.parent()?.join("level.dat");
    parent.is_file().then_some(parent)
}

pub fn read_level(save_folder: &Path) -> anyhow::Result<LevelInfo> {
    let path = find_level_dat(save_folder)
        .with_context(|| format!("no level.dat in {} or its parent", save_folder.display()))?;
    let compressed = std::fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let nbt = legacy_region::gunzip(&compressed).context("invalid level.dat format")?;
    let level: LevelDat = fastnbt::from_bytes(&nbt).context("invalid level.dat format")?;

    let name = level.data.level_name.unwrap_or_else(|| {
        save_folder
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    });

    Ok(LevelInfo {
        name,
        seed: level.data.random_seed,
        spawn: (level.data.spawn_x, level.data.spawn_y, level.data.spawn_z),
        version: level.data.version,
        path,
    })
}
