//! Legacy biome enumeration and its modern identifiers.

pub mod climate;

use anyhow::bail;

pub use climate::ClimateSampler;

/// Biomes of the pre-1.0 climate generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegacyBiome {
    Rainforest,
    Swampland,
    SeasonalForest,
    Forest,
    Savanna,
    Shrubland,
    Taiga,
    Desert,
    Plains,
    IceDesert,
    Tundra,
    Hell,
}

impl LegacyBiome {
    pub const ALL: [LegacyBiome; 12] = [
        LegacyBiome::Rainforest,
        LegacyBiome::Swampland,
        LegacyBiome::SeasonalForest,
        LegacyBiome::Forest,
        LegacyBiome::Savanna,
        LegacyBiome::Shrubland,
        LegacyBiome::Taiga,
        LegacyBiome::Desert,
        LegacyBiome::Plains,
        LegacyBiome::IceDesert,
        LegacyBiome::Tundra,
        LegacyBiome::Hell,
    ];

    /// Modern identifier, named after the neo-beta datapack biomes.
    pub fn modern_id(self) -> &'static str {
        modern_id_in(LEGACY_BIOMES, self).unwrap_or(FALLBACK_BIOME)
    }
}

pub const FALLBACK_BIOME: &str = "minecraft:plains";

static LEGACY_BIOMES: &[(LegacyBiome, &str)] = &[
    (LegacyBiome::Desert, "minecraft:desert"),
    (LegacyBiome::Plains, "minecraft:plains"),
    (LegacyBiome::Forest, "minecraft:forest"),
    (LegacyBiome::Taiga, "minecraft:taiga"),
    (LegacyBiome::Tundra, "minecraft:tundra"),
    (LegacyBiome::Shrubland, "minecraft:shrubland"),
    (LegacyBiome::Rainforest, "minecraft:rain_forest"),
    (LegacyBiome::Savanna, "minecraft:savannah"),
    (LegacyBiome::SeasonalForest, "minecraft:seasonal_forest"),
    (LegacyBiome::IceDesert, "minecraft:tundra"),
    (LegacyBiome::Swampland, "minecraft:swampland"),
    (LegacyBiome::Hell, "minecraft:nether"),
];

fn modern_id_in(table: &[(LegacyBiome, &'static str)], biome: LegacyBiome) -> Option<&'static str> {
    table.iter().find(|(b, _)| *b == biome).map(|(_, id)| *id)
}

fn validate_table(table: &[(LegacyBiome, &'static str)]) -> anyhow::Result<()> {
    for biome in LegacyBiome::ALL {
        if modern_id_in(table, biome).is_none() {
            bail!("no modern biome id for legacy biome {biome:?}");
        }
    }
    Ok(())
}

/// Checks that every legacy biome has a modern id. Called when a world opens.
pub fn validate() -> anyhow::Result<()> {
    validate_table(LEGACY_BIOMES)
}

/// Numeric biome ids stored by sectioned chunks (1.12 registry).
pub fn numeric_biome(id: i32) -> &'static str {
    match id {
        0 => "minecraft:ocean",
        1 => "minecraft:plains",
        2 | 17 | 130 => "minecraft:desert",
        3 | 20 => "minecraft:windswept_hills",
        4 | 18 => "minecraft:forest",
        5 | 19 | 133 => "minecraft:taiga",
        6 | 134 => "minecraft:swamp",
        7 => "minecraft:river",
        8 => "minecraft:nether_wastes",
        9 => "minecraft:the_end",
        10 => "minecraft:frozen_ocean",
        11 => "minecraft:frozen_river",
        12 | 13 => "minecraft:snowy_plains",
        14 | 15 => "minecraft:mushroom_fields",
        16 => "minecraft:beach",
        21 | 22 | 149 => "minecraft:jungle",
        23 | 151 => "minecraft:sparse_jungle",
        24 => "minecraft:deep_ocean",
        25 => "minecraft:stony_shore",
        26 => "minecraft:snowy_beach",
        27 | 28 => "minecraft:birch_forest",
        29 | 157 => "minecraft:dark_forest",
        30 | 31 | 158 => "minecraft:snowy_taiga",
        32 | 33 => "minecraft:old_growth_pine_taiga",
        34 => "minecraft:windswept_forest",
        35 => "minecraft:savanna",
        36 => "minecraft:savanna_plateau",
        37 | 39 | 167 => "minecraft:badlands",
        38 | 166 => "minecraft:wooded_badlands",
        127 => "minecraft:the_void",
        129 => "minecraft:sunflower_plains",
        131 | 162 => "minecraft:windswept_gravelly_hills",
        132 => "minecraft:flower_forest",
        140 => "minecraft:ice_spikes",
        155 | 156 => "minecraft:old_growth_birch_forest",
        160 | 161 => "minecraft:old_growth_spruce_taiga",
        163 | 164 => "minecraft:windswept_savanna",
        165 => "minecraft:eroded_badlands",
        _ => FALLBACK_BIOME,
    }
}

/// Where classic column chunks get their biomes from.
#[derive(Debug)]
pub enum BiomeSource {
    /// Overworld: regenerated from the world seed.
    Climate(ClimateSampler),
    /// A dimension with a single biome (the Nether).
    Fixed(LegacyBiome),
}

impl BiomeSource {
    /// Biomes of one chunk column, indexed `x * 16 + z`.
    pub fn chunk_biomes(&self, chunk_x: i32, chunk_z: i32) -> Box<[LegacyBiome]> {
        match self {
            BiomeSource::Climate(sampler) => sampler.chunk_biomes(chunk_x, chunk_z),
            BiomeSource::Fixed(biome) => vec![*biome; 256].into_boxed_slice(),
        }
    }
}
