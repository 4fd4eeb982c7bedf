//! mc-legacy-world: inspect a legacy Minecraft save folder.

use std::path::PathBuf;

use clap::Parser;
use mc_legacy_world::{World, WorldConfig};

#[derive(Parser)]
#[command(name = "mc-legacy-world", about = "Inspect Alpha, McRegion and early Anvil saves")]
pub struct Args {
    /// Save folder (or a dimension folder such as DIM-1)
    pub save: PathBuf,

    /// List the regions stored on disk
    #[arg(long)]
    pub regions: bool,

    /// Only list regions modified at or after this time (epoch millis)
    #[arg(long, default_value = "0")]
    pub since: i64,

    /// Summarize one chunk
    #[arg(long, num_args = 2, value_names = ["X", "Z"], allow_negative_numbers = true)]
    pub chunk: Option<Vec<i32>>,

    #[arg(long, env = "SKY_LIGHT", default_value = "15")]
    pub sky_light: u8,

    #[arg(long, env = "IGNORE_MISSING_LIGHT_DATA")]
    pub ignore_missing_light_data: bool,

    /// Loader threads; 0 picks one per core
    #[arg(long, env = "WORKER_THREADS", default_value = "0")]
    pub worker_threads: usize,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = WorldConfig {
        sky_light: args.sky_light,
        ignore_missing_light_data: args.ignore_missing_light_data,
        worker_threads: args.worker_threads,
        ..WorldConfig::default()
    };
    let world = World::open_with(&args.save, config)?;

    println!("World:  {}", world.name());
    println!("Seed:   {}", world.seed());
    let (x, y, z) = world.spawn_point();
    println!("Spawn:  {x} {y} {z}");
    println!("Layout: {:?} (regions of {} blocks)", world.layout(), world.region_grid().cell_size);

    if args.regions {
        let regions = world.list_regions(args.since);
        println!("Regions ({}):", regions.len());
        for pos in regions {
            let region = world.region(pos.x, pos.z);
            let chunks = region.list_chunks(args.since).map(|c| c.len()).unwrap_or_else(|e| {
                log::warn!("cannot list chunks of {}: {e:#}", region.file().display());
                0
            });
            println!("  {:>5} {:>5}  {:?}  {} chunks  {}", pos.x, pos.z, region.kind(), chunks, region.file().display());
        }
    }

    if let Some([cx, cz]) = args.chunk.as_deref() {
        let chunk = world.chunk(*cx, *cz);
        println!("Chunk {cx} {cz}:");
        if chunk.is_empty() {
            println!("  (missing)");
        } else {
            let (bx, bz) = (cx * 16 + 8, cz * 16 + 8);
            let surface = chunk.world_surface_y(bx, bz);
            println!("  generated:      {}", chunk.is_generated());
            println!("  inhabited time: {}", chunk.inhabited_time());
            println!("  height:         {}..={}", chunk.min_y(), chunk.max_y());
            println!("  biome:          {}", chunk.biome(bx, surface, bz));
            println!("  surface y:      {surface}");
            println!("  ocean floor y:  {}", chunk.ocean_floor_y(bx, bz));
            let below = (surface - 1).max(chunk.min_y());
            println!("  block at y={below}: {}", chunk.block_state(bx, below, bz));
            println!("  light at y={surface}: {:?}", chunk.light_data(bx, surface, bz));
        }
    }

    world.shutdown();
    Ok(())
}
