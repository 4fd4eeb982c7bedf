//! Region container codec shared by the McRegion (`.mcr`) and early Anvil
//! (`.mca`) save formats.
//!
//! A region file groups 32x32 chunks:
//! - Bytes 0-4095: location table (1024 entries x 4 bytes)
//! - Bytes 4096-8191: timestamp table (1024 entries x 4 bytes)
//! - Bytes 8192+: chunk blobs, each `[length:4][compression:1][data...]`,
//!   aligned to 4096 byte sectors.
//!
//! Everything here is read-only; the game is the only writer of these files.

use std::io::{Read, Seek, SeekFrom};

use anyhow::Context;

pub const SECTOR_BYTES: u64 = 4096; // minecraft uses 4096 bytes per sector
pub const HEADER_BYTES: u64 = 8192; // header is 8192 bytes (2 sectors 8kb)

/// Number of chunks per region dimension.
pub const REGION_SIZE: i32 = 32;

/// Number of chunk slots in one region file.
pub const CHUNKS_PER_REGION: usize = 1024;

/// Compression types a legacy region chunk blob may use.
/// The game only ever wrote GZip (1) and ZLib (2) before 1.15.
pub mod compression {
    pub const GZIP: u8 = 1;
    pub const ZLIB: u8 = 2;
    pub const NONE: u8 = 3;
}

/// Index of a chunk inside the location/timestamp tables.
/// Formula: x + z * 32 (coordinates are wrapped into the region first).
#[inline]
pub fn local_index(rel_x: i32, rel_z: i32) -> usize {
    ((rel_x & 31) + (rel_z & 31) * REGION_SIZE) as usize
}

/// Reverse of [`local_index`].
#[inline]
pub fn index_to_local(index: usize) -> (i32, i32) {
    let rel_x = (index % REGION_SIZE as usize) as i32;
    let rel_z = (index / REGION_SIZE as usize) as i32;
    (rel_x, rel_z)
}

/// Where one chunk lives inside the region file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChunkLocation {
    /// First sector of the chunk blob (sectors 0 and 1 are the header).
    pub sector: u32,
    /// Number of sectors reserved for the blob.
    pub sector_count: u8,
}

impl ChunkLocation {
    /// Decode a big-endian location table entry: `[Offset:3 bytes][Count:1 byte]`.
    pub fn from_entry(entry: u32) -> Self {
        Self {
            sector: entry >> 8,
            sector_count: (entry & 0xFF) as u8,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.sector == 0 || self.sector_count == 0
    }

    pub fn byte_offset(&self) -> u64 {
        self.sector as u64 * SECTOR_BYTES
    }

    pub fn max_len(&self) -> u64 {
        self.sector_count as u64 * SECTOR_BYTES
    }
}

/// Parsed location and timestamp tables of a region file.
#[derive(Debug, Clone)]
pub struct RegionHeader {
    locations: Vec<ChunkLocation>,
    timestamps: Vec<u32>,
}

impl RegionHeader {
    /// Read the full 8 KiB header from the start of `reader`.
    pub fn read<R: Read>(reader: &mut R) -> anyhow::Result<Self> {
        let mut bytes = vec![0u8; HEADER_BYTES as usize];
        reader
            .read_exact(&mut bytes)
            .context("region header is truncated")?;
        Self::parse(&bytes)
    }

    pub fn parse(bytes: &[u8]) -> anyhow::Result<Self> {
        if (bytes.len() as u64) < HEADER_BYTES {
            anyhow::bail!("region header too short: {} bytes", bytes.len());
        }

        let entry = |i: usize| u32::from_be_bytes([bytes[i], bytes[i + 1], bytes[i + 2], bytes[i + 3]]);

        let locations = (0..CHUNKS_PER_REGION)
            .map(|i| ChunkLocation::from_entry(entry(i * 4)))
            .collect();
        let timestamps = (0..CHUNKS_PER_REGION)
            .map(|i| entry(SECTOR_BYTES as usize + i * 4))
            .collect();

        Ok(Self { locations, timestamps })
    }

    pub fn location(&self, rel_x: i32, rel_z: i32) -> ChunkLocation {
        self.locations[local_index(rel_x, rel_z)]
    }

    /// Last save time of a chunk, in seconds since the unix epoch.
    pub fn timestamp(&self, rel_x: i32, rel_z: i32) -> u32 {
        self.timestamps[local_index(rel_x, rel_z)]
    }

    /// Local coordinates of every chunk that has a blob in this region.
    pub fn present_chunks(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.locations
            .iter()
            .enumerate()
            .filter(|(_, loc)| !loc.is_empty())
            .map(|(index, _)| index_to_local(index))
    }
}

/// Read a single location table entry without loading the whole header.
pub fn read_chunk_location<F: Read + Seek>(
    file: &mut F,
    rel_x: i32,
    rel_z: i32,
) -> anyhow::Result<ChunkLocation> {
    file.seek(SeekFrom::Start(local_index(rel_x, rel_z) as u64 * 4))?;
    let mut entry = [0u8; 4];
    file.read_exact(&mut entry)
        .context("region location table is truncated")?;
    Ok(ChunkLocation::from_entry(u32::from_be_bytes(entry)))
}

/// Read the raw chunk blob (`[length][compression][data]`) at `location`.
pub fn read_chunk_blob<F: Read + Seek>(file: &mut F, location: ChunkLocation) -> anyhow::Result<Vec<u8>> {
    if (location.sector as u64) < HEADER_BYTES / SECTOR_BYTES {
        anyhow::bail!("chunk sector {} overlaps the region header", location.sector);
    }

    file.seek(SeekFrom::Start(location.byte_offset()))?;
    let mut length = [0u8; 4];
    file.read_exact(&mut length)
        .context("chunk blob length is truncated")?;
    let length = u32::from_be_bytes(length) as u64;

    if length == 0 {
        anyhow::bail!("chunk blob has zero length");
    }
    if length + 4 > location.max_len() {
        anyhow::bail!(
            "chunk blob of length {} exceeds its {} reserved sectors",
            length,
            location.sector_count
        );
    }

    let mut blob = Vec::with_capacity(length as usize + 4);
    blob.extend_from_slice(&(length as u32).to_be_bytes());
    blob.resize(length as usize + 4, 0);
    file.read_exact(&mut blob[4..])
        .context("chunk blob data is truncated")?;
    Ok(blob)
}

/// Unwrap and decompress a chunk blob.
/// Supports GZip (1), ZLib (2) and None (3).
pub fn unwrap_and_decompress_chunk(chunk_blob: &[u8]) -> anyhow::Result<Vec<u8>> {
    if chunk_blob.len() < 5 {
        anyhow::bail!("Chunk blob too short");
    }

    // Parse header: [Length: 4 bytes][Type: 1 byte][Data...]
    let length = u32::from_be_bytes([chunk_blob[0], chunk_blob[1], chunk_blob[2], chunk_blob[3]]) as usize;
    let compression_type = chunk_blob[4];
    let end = (4 + length).min(chunk_blob.len());
    decompress(compression_type, &chunk_blob[5..end])
}

pub fn decompress(compression_type: u8, compressed_data: &[u8]) -> anyhow::Result<Vec<u8>> {
    match compression_type {
        compression::ZLIB => {
            let mut decoder = flate2::read::ZlibDecoder::new(compressed_data);
            let mut decompressed = Vec::new();
            decoder.read_to_end(&mut decompressed)?;
            Ok(decompressed)
        }
        compression::GZIP => gunzip(compressed_data),
        compression::NONE => Ok(compressed_data.to_vec()),
        _ => anyhow::bail!("Unknown compression type: {}", compression_type),
    }
}

/// Decompress a whole gzip stream, as used by `level.dat` and Alpha chunk files.
pub fn gunzip(compressed_data: &[u8]) -> anyhow::Result<Vec<u8>> {
    let mut decoder = flate2::read::GzDecoder::new(compressed_data);
    let mut decompressed = Vec::new();
    decoder.read_to_end(&mut decompressed)?;
    Ok(decompressed)
}

/// Locate, read and decompress one chunk.
/// Returns `None` when the region has no blob for that slot.
pub fn read_chunk<F: Read + Seek>(file: &mut F, rel_x: i32, rel_z: i32) -> anyhow::Result<Option<Vec<u8>>> {
    let location = read_chunk_location(file, rel_x, rel_z)?;
    if location.is_empty() {
        return Ok(None);
    }
    let blob = read_chunk_blob(file, location)?;
    unwrap_and_decompress_chunk(&blob).map(Some)
}
