//! NBT records of the legacy save formats.
//!
//! All three chunk layouts nest their payload in a `Level` compound. Classic
//! column chunks (per-chunk files and `.mcr` regions) store flat arrays,
//! sectioned chunks (`.mca` regions) a list of 16-high sections.

use fastnbt::{ByteArray, IntArray};
use serde::{Deserialize, Serialize};

/// Root compound of `level.dat`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LevelDat {
    #[serde(rename = "Data")]
    pub data: LevelData,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LevelData {
    #[serde(rename = "LevelName", default, skip_serializing_if = "Option::is_none")]
    pub level_name: Option<String>,

    #[serde(rename = "RandomSeed", default)]
    pub random_seed: i64,

    #[serde(rename = "SpawnX", default)]
    pub spawn_x: i32,
    #[serde(rename = "SpawnY", default)]
    pub spawn_y: i32,
    #[serde(rename = "SpawnZ", default)]
    pub spawn_z: i32,

    // 19132 for McRegion, 19133 for Anvil; absent in Alpha saves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
}

/// Root compound of every legacy chunk record.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChunkRoot<L> {
    #[serde(rename = "Level")]
    pub level: L,
}

/// `Level` compound of a classic column chunk.
#[derive(Debug, Serialize, Deserialize)]
pub struct ColumnLevel {
    #[serde(rename = "xPos", default)]
    pub x_pos: i32,
    #[serde(rename = "zPos", default)]
    pub z_pos: i32,

    // One byte per voxel, (x << 11 | z << 7 | y) for 128-high columns;
    // absent or empty in chunks that hold only air
    #[serde(rename = "Blocks", default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<ByteArray>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ByteArray>,
    #[serde(rename = "SkyLight", default, skip_serializing_if = "Option::is_none")]
    pub sky_light: Option<ByteArray>,
    #[serde(rename = "BlockLight", default, skip_serializing_if = "Option::is_none")]
    pub block_light: Option<ByteArray>,

    #[serde(rename = "HeightMap", default, skip_serializing_if = "Option::is_none")]
    pub height_map: Option<ByteArray>,

    #[serde(rename = "TerrainPopulated", default, skip_serializing_if = "Option::is_none")]
    pub terrain_populated: Option<i8>,

    #[serde(rename = "InhabitedTime", default, skip_serializing_if = "Option::is_none")]
    pub inhabited_time: Option<i64>,
}

/// `Level` compound of a sectioned chunk.
#[derive(Debug, Serialize, Deserialize)]
pub struct SectionedLevel {
    #[serde(rename = "xPos", default)]
    pub x_pos: i32,
    #[serde(rename = "zPos", default)]
    pub z_pos: i32,

    #[serde(rename = "Sections", default)]
    pub sections: Vec<Section>,

    // Byte array in older saves, int array in later ones; index z * 16 + x
    #[serde(rename = "Biomes", default, with = "biome_array", skip_serializing_if = "Option::is_none")]
    pub biomes: Option<Vec<i32>>,

    #[serde(rename = "HeightMap", default, skip_serializing_if = "Option::is_none")]
    pub height_map: Option<IntArray>,

    #[serde(rename = "Status", default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(rename = "TerrainPopulated", default, skip_serializing_if = "Option::is_none")]
    pub terrain_populated: Option<i8>,

    #[serde(rename = "InhabitedTime", default, skip_serializing_if = "Option::is_none")]
    pub inhabited_time: Option<i64>,
}

// --- Section (16x16x16 Cube) ---
#[derive(Debug, Serialize, Deserialize)]
pub struct Section {
    #[serde(rename = "Y")]
    pub y: i8,

    // 4096 bytes, (y << 8 | z << 4 | x)
    #[serde(rename = "Blocks")]
    pub blocks: ByteArray,

    // High id nibbles for ids above 255
    #[serde(rename = "Add", default, skip_serializing_if = "Option::is_none")]
    pub add: Option<ByteArray>,

    #[serde(rename = "Data", default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ByteArray>,
    #[serde(rename = "SkyLight", default, skip_serializing_if = "Option::is_none")]
    pub sky_light: Option<ByteArray>,
    #[serde(rename = "BlockLight", default, skip_serializing_if = "Option::is_none")]
    pub block_light: Option<ByteArray>,
}

/// Copies a signed NBT byte array into plain bytes.
pub fn to_bytes(array: &ByteArray) -> Vec<u8> {
    array.iter().map(|&b| b as u8).collect()
}

pub fn from_bytes(bytes: &[u8]) -> ByteArray {
    ByteArray::new(bytes.iter().map(|&b| b as i8).collect())
}

// --- Byte-or-int array helper ---
mod biome_array {
    use fastnbt::{IntArray, Value};
    use serde::{Deserialize, Deserializer, Serialize, Serializer, de};

    pub fn serialize<S>(data: &Option<Vec<i32>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match data {
            Some(ids) => IntArray::new(ids.clone()).serialize(serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<i32>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<Value>::deserialize(deserializer)? {
            None => Ok(None),
            Some(Value::ByteArray(bytes)) => Ok(Some(bytes.iter().map(|&b| b as u8 as i32).collect())),
            Some(Value::IntArray(ints)) => Ok(Some(ints.iter().copied().collect())),
            Some(other) => Err(de::Error::custom(format!("expected a byte or int array for Biomes, got {other:?}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct ByteBiomes {
        #[serde(rename = "Biomes")]
        biomes: ByteArray,
    }

    #[test]
    fn test_biomes_accept_byte_arrays() {
        let bytes = fastnbt::to_bytes(&ChunkRoot {
            level: ByteBiomes {
                biomes: ByteArray::new(vec![1, -127, 6]),
            },
        })
        .unwrap();

        let parsed: ChunkRoot<SectionedLevel> = fastnbt::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.level.biomes, Some(vec![1, 129, 6]));
        assert!(parsed.level.sections.is_empty());
        assert!(parsed.level.status.is_none());
    }

    #[test]
    fn test_biomes_accept_int_arrays() {
        let level = SectionedLevel {
            x_pos: 3,
            z_pos: -2,
            sections: Vec::new(),
            biomes: Some(vec![4; 256]),
            height_map: None,
            status: Some("full".to_string()),
            terrain_populated: None,
            inhabited_time: Some(42),
        };
        let bytes = fastnbt::to_bytes(&ChunkRoot { level }).unwrap();

        let parsed: ChunkRoot<SectionedLevel> = fastnbt::from_bytes(&bytes).unwrap();
        assert_eq!(parsed.level.biomes.as_deref().map(|b| b.len()), Some(256));
        assert_eq!(parsed.level.x_pos, 3);
        assert_eq!(parsed.level.status.as_deref(), Some("full"));
        assert_eq!(parsed.level.inhabited_time, Some(42));
    }

    #[test]
    fn test_level_dat_defaults() {
        #[derive(Serialize)]
        struct Bare {
            #[serde(rename = "Data")]
            data: std::collections::HashMap<String, i32>,
        }
        let bytes = fastnbt::to_bytes(&Bare {
            data: [("SpawnY".to_string(), 70)].into_iter().collect(),
        })
        .unwrap();

        let level: LevelDat = fastnbt::from_bytes(&bytes).unwrap();
        assert!(level.data.level_name.is_none());
        assert_eq!(level.data.random_seed, 0);
        assert_eq!(level.data.spawn_y, 70);
        assert!(level.data.version.is_none());
    }

    #[test]
    fn test_signed_byte_conversion() {
        let array = from_bytes(&[0, 127, 128, 255]);
        assert_eq!(to_bytes(&array), vec![0, 127, 128, 255]);
    }
}
