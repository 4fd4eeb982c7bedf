//! Tunables for opening a world.

use std::time::Duration;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: 100,
            ttl_secs: 60,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Sky light reported where a chunk stores none.
    pub sky_light: u8,
    /// Treat chunks without light data as generated anyway.
    pub ignore_missing_light_data: bool,
    pub region_cache: CacheConfig,
    pub chunk_cache: CacheConfig,
    /// Attempts per chunk load before falling back to the empty chunk.
    pub load_attempts: u32,
    pub retry_interval_ms: u64,
    /// Loader pool size; 0 lets rayon pick.
    pub worker_threads: usize,
}

impl WorldConfig {
    pub fn retry_interval(&self) -> Duration {
        Duration::from_millis(self.retry_interval_ms)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            sky_light: 15,
            ignore_missing_light_data: false,
            region_cache: CacheConfig::default(),
            chunk_cache: CacheConfig {
                capacity: 500,
                ..CacheConfig::default()
            },
            load_attempts: 3,
            retry_interval_ms: 1000,
            worker_threads: 0,
        }
    }
}
