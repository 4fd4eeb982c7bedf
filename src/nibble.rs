//! 4-bit packed voxel arrays (`Data`, `SkyLight`, `BlockLight`, `Add`).
//!
//! Two nibbles share one byte: even indices use the low nibble, odd indices
//! the high one. Saves written by some tools omit trailing all-zero planes,
//! so any index past the end of the backing array reads as 0.

/// Voxel ordering of the classic column formats: X-major, then Z, Y-minor.
///
/// `y_bits` is 7 for 128-high columns (`(x << 11) | (z << 7) | y`) and 8 for
/// 256-high columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnLayout {
    y_bits: u32,
}

impl ColumnLayout {
    pub const HEIGHT_128: Self = Self { y_bits: 7 };
    pub const HEIGHT_256: Self = Self { y_bits: 8 };

    pub fn height(&self) -> i32 {
        1 << self.y_bits
    }

    /// Callers must mask x/z to 0..15 and bounds-check y first.
    #[inline]
    pub fn index(&self, x: i32, y: i32, z: i32) -> usize {
        ((x << (self.y_bits + 4)) | (z << self.y_bits) | y) as usize
    }
}

/// Voxel ordering inside a 16x16x16 section of the sectioned format.
#[inline]
pub fn section_index(x: i32, y: i32, z: i32) -> usize {
    (((y & 0xF) << 8) | ((z & 0xF) << 4) | (x & 0xF)) as usize
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NibbleArray {
    data: Box<[u8]>,
}

impl NibbleArray {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data: data.into_boxed_slice(),
        }
    }

    /// Zeroed array able to hold `len` nibbles.
    pub fn zeroed(len: usize) -> Self {
        Self::new(vec![0; len.div_ceil(2)])
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn get(&self, index: usize) -> u8 {
        match self.data.get(index >> 1) {
            Some(byte) if index & 1 == 0 => byte & 0x0F,
            Some(byte) => (byte >> 4) & 0x0F,
            None => 0,
        }
    }

    /// Writes past the end of a short array are dropped.
    pub fn set(&mut self, index: usize, value: u8) {
        let Some(byte) = self.data.get_mut(index >> 1) else {
            return;
        };
        if index & 1 == 0 {
            *byte = (*byte & 0xF0) | (value & 0x0F);
        } else {
            *byte = (*byte & 0x0F) | ((value & 0x0F) << 4);
        }
    }
}
