//! Read access to one save folder.
//!
//! A [`World`] resolves chunk and region coordinates to decoded, shared
//! snapshots. Regions and chunks sit in two bounded caches; loads run on a
//! shared worker pool and are retried before falling back to the empty chunk.

pub mod level;

pub use level::{LevelInfo, read_level};

use std::path::{Path, PathBuf};
use std::sync::{Arc, Condvar, Mutex, PoisonError, Weak};
use std::time::Duration;

use anyhow::Context;

use crate::biome::{self, BiomeSource, ClimateSampler, LegacyBiome};
use crate::block::RawBlock;
use crate::cache::LoadingCache;
use crate::chunk::{Chunk, ChunkPos, DecodeContext, NeighborSource};
use crate::config::WorldConfig;
use crate::region::{Region, RegionKind, RegionPos, SaveLayout};

/// Folder name of the Nether dimension inside a save.
pub const NETHER_FOLDER: &str = "DIM-1";

/// Source of regions for a world.
pub trait RegionProvider: Send + Sync {
    fn layout(&self) -> SaveLayout;

    /// Never fails; a region without backing file yields empty chunks.
    fn region(&self, pos: RegionPos) -> Arc<dyn Region>;

    fn list_regions(&self, since: i64) -> anyhow::Result<Vec<RegionPos>>;
}

/// Regions read straight from a save folder on disk.
#[derive(Debug, Clone)]
pub struct SaveFolder {
    root: PathBuf,
    layout: SaveLayout,
}

impl SaveFolder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        let layout = SaveLayout::detect(&root);
        Self { root, layout }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl RegionProvider for SaveFolder {
    fn layout(&self) -> SaveLayout {
        self.layout
    }

    fn region(&self, pos: RegionPos) -> Arc<dyn Region> {
        RegionKind::load(self.layout, &self.root, pos)
    }

    fn list_regions(&self, since: i64) -> anyhow::Result<Vec<RegionPos>> {
        self.layout.list_regions(&self.root, since)
    }
}

/// Square grid of world cells, measured in blocks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
    pub cell_size: i32,
}

impl Grid {
    pub fn new(cell_size: i32) -> Self {
        Self { cell_size }
    }

    /// Cell containing block (x, z).
    pub fn cell(&self, x: i32, z: i32) -> (i32, i32) {
        (x.div_euclid(self.cell_size), z.div_euclid(self.cell_size))
    }
}

/// Cancellation signal for retry waits.
#[derive(Debug, Default)]
pub struct Shutdown {
    stopped: Mutex<bool>,
    signal: Condvar,
}

impl Shutdown {
    pub fn trigger(&self) {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner) = true;
        self.signal.notify_all();
    }

    pub fn is_triggered(&self) -> bool {
        *self.stopped.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Sleeps up to `timeout`; returns true if shut down meanwhile.
    pub fn wait(&self, timeout: Duration) -> bool {
        let guard = self.stopped.lock().unwrap_or_else(PoisonError::into_inner);
        let (guard, _) = self
            .signal
            .wait_timeout_while(guard, timeout, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *guard
    }
}

/// Runs `load` up to `attempts` times, pausing `interval` between failures.
///
/// Returns the last error once attempts run out or `shutdown` fires.
pub fn load_with_retry<T>(
    attempts: u32,
    interval: Duration,
    shutdown: &Shutdown,
    mut load: impl FnMut(u32) -> anyhow::Result<T>,
) -> anyhow::Result<T> {
    let attempts = attempts.max(1);
    let mut attempt = 1;
    loop {
        match load(attempt) {
            Ok(value) => return Ok(value),
            Err(e) if attempt >= attempts => return Err(e),
            Err(e) => {
                log::warn!("attempt {attempt}/{attempts} failed: {e:#}");
                if shutdown.wait(interval) {
                    return Err(e.context("retry cancelled by shutdown"));
                }
                attempt += 1;
            }
        }
    }
}

/// Neighbor lookups for decoded chunks, through the owning world's cache.
struct WorldNeighbors {
    world: Weak<World>,
}

impl NeighborSource for WorldNeighbors {
    fn neighbor_block(&self, x: i32, y: i32, z: i32) -> RawBlock {
        match self.world.upgrade() {
            Some(world) => world.chunk(x >> 4, z >> 4).raw_block(x, y, z),
            None => RawBlock::AIR,
        }
    }
}

pub struct World {
    save_folder: PathBuf,
    level: LevelInfo,
    config: WorldConfig,
    provider: Arc<dyn RegionProvider>,
    ctx: DecodeContext,
    regions: LoadingCache<RegionPos, Arc<dyn Region>>,
    chunks: LoadingCache<ChunkPos, Arc<Chunk>>,
    empty: Arc<Chunk>,
    pool: rayon::ThreadPool,
    shutdown: Shutdown,
}

impl World {
    pub fn open(save_folder: impl AsRef<Path>) -> anyhow::Result<Arc<World>> {
        Self::open_with(save_folder, WorldConfig::default())
    }

    pub fn open_with(save_folder: impl AsRef<Path>, config: WorldConfig) -> anyhow::Result<Arc<World>> {
        let save_folder = save_folder.as_ref();
        let level = read_level(save_folder)
            .with_context(|| format!("failed to open world at {}", save_folder.display()))?;
        let provider = Arc::new(SaveFolder::new(save_folder));
        Self::with_provider(save_folder, level, provider, config)
    }

    /// Opens a world over any region source.
    pub fn with_provider(
        save_folder: impl Into<PathBuf>,
        level: LevelInfo,
        provider: Arc<dyn RegionProvider>,
        config: WorldConfig,
    ) -> anyhow::Result<Arc<World>> {
        biome::validate()?;
        let save_folder = save_folder.into();

        let biomes = if save_folder.file_name().is_some_and(|n| n == NETHER_FOLDER) {
            BiomeSource::Fixed(LegacyBiome::Hell)
        } else {
            BiomeSource::Climate(ClimateSampler::new(level.seed))
        };

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.worker_threads)
            .thread_name(|i| format!("chunk-loader-{i}"))
            .build()
            .context("failed to start chunk loader pool")?;

        log::info!(
            "opened world '{}' at {} ({:?}, seed {})",
            level.name,
            save_folder.display(),
            provider.layout(),
            level.seed
        );

        let biomes = Arc::new(biomes);
        Ok(Arc::new_cyclic(|weak: &Weak<World>| World {
            ctx: DecodeContext {
                sky_light: config.sky_light,
                ignore_missing_light_data: config.ignore_missing_light_data,
                biomes,
                neighbors: Arc::new(WorldNeighbors { world: weak.clone() }),
            },
            regions: LoadingCache::new(config.region_cache.capacity, config.region_cache.ttl()),
            chunks: LoadingCache::new(config.chunk_cache.capacity, config.chunk_cache.ttl()),
            empty: Chunk::empty(),
            save_folder,
            level,
            config,
            provider,
            pool,
            shutdown: Shutdown::default(),
        }))
    }

    pub fn save_folder(&self) -> &Path {
        &self.save_folder
    }

    pub fn name(&self) -> &str {
        &self.level.name
    }

    pub fn seed(&self) -> i64 {
        self.level.seed
    }

    pub fn level(&self) -> &LevelInfo {
        &self.level
    }

    pub fn sky_light(&self) -> u8 {
        self.config.sky_light
    }

    pub fn spawn_point(&self) -> (i32, i32, i32) {
        self.level.spawn
    }

    pub fn layout(&self) -> SaveLayout {
        self.provider.layout()
    }

    pub fn chunk_grid(&self) -> Grid {
        Grid::new(16)
    }

    pub fn region_grid(&self) -> Grid {
        Grid::new(16 * self.layout().region_size())
    }

    /// The shared empty chunk returned for missing or unreadable chunks.
    pub fn empty_chunk(&self) -> &Arc<Chunk> {
        &self.empty
    }

    pub fn region(&self, x: i32, z: i32) -> Arc<dyn Region> {
        let pos = RegionPos::new(x, z);
        self.regions.get_or_load(pos, || self.provider.region(pos))
    }

    /// Chunk (x, z); the empty chunk when it is missing or cannot be read.
    pub fn chunk(&self, x: i32, z: i32) -> Arc<Chunk> {
        let pos = ChunkPos::new(x, z);
        self.chunks.get_or_load(pos, || self.pool.install(|| self.load_chunk(pos)))
    }

    pub fn chunk_at_block(&self, x: i32, _y: i32, z: i32) -> Arc<Chunk> {
        self.chunk(x >> 4, z >> 4)
    }

    fn load_chunk(&self, pos: ChunkPos) -> Arc<Chunk> {
        let region_pos = self.layout().region_of_chunk(pos);
        let loaded = load_with_retry(
            self.config.load_attempts,
            self.config.retry_interval(),
            &self.shutdown,
            |_| {
                let result = self.region(region_pos.x, region_pos.z).load_chunk(pos, &self.ctx);
                if result.is_err() {
                    // Re-probe the files on the next attempt
                    self.regions.invalidate(&region_pos);
                }
                result
            },
        );

        match loaded {
            Ok(Chunk::Empty) => Arc::clone(&self.empty),
            Ok(chunk) => Arc::new(chunk),
            Err(e) => {
                log::error!("failed to load chunk {pos:?} of '{}': {e:#}", self.level.name);
                Arc::clone(&self.empty)
            }
        }
    }

    /// Regions persisted on disk, optionally only those modified at or after
    /// `since` (epoch millis). Errors are logged and yield an empty list.
    pub fn list_regions(&self, since: i64) -> Vec<RegionPos> {
        self.provider.list_regions(since).unwrap_or_else(|e| {
            log::warn!("failed to list regions of '{}': {e:#}", self.level.name);
            Vec::new()
        })
    }

    pub fn invalidate_chunk_cache(&self) {
        self.chunks.invalidate_all();
    }

    pub fn invalidate_chunk(&self, x: i32, z: i32) {
        self.chunks.invalidate(&ChunkPos::new(x, z));
    }

    pub fn clean_up_chunk_cache(&self) {
        self.chunks.clean_up();
    }

    pub fn min_y(&self, x: i32, z: i32) -> i32 {
        self.chunk(x >> 4, z >> 4).min_y()
    }

    pub fn max_y(&self, x: i32, z: i32) -> i32 {
        self.chunk(x >> 4, z >> 4).max_y()
    }

    /// Cancels pending retry waits; later loads get a single attempt.
    pub fn shutdown(&self) {
        log::debug!("shutting down world '{}'", self.level.name);
        self.shutdown.trigger();
    }
}
