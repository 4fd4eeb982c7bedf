//! Seed-driven temperature/humidity sampling of the pre-1.0 overworld.
//!
//! Classic saves never stored biomes, so they are regenerated here with the
//! exact arithmetic of the old generator: a 48-bit linear congruential
//! generator seeds three octave stacks of 2D simplex noise, whose blended
//! output indexes a 64x64 climate lookup table.

use std::sync::LazyLock;

use super::LegacyBiome;

/// The JVM's 48-bit LCG. Only the draws the noise setup needs are exposed.
#[derive(Debug, Clone)]
pub struct JavaRandom {
    seed: i64,
}

impl JavaRandom {
    const MULTIPLIER: i64 = 0x5DEECE66D;
    const ADDEND: i64 = 0xB;
    const MASK: i64 = (1 << 48) - 1;

    pub fn new(seed: i64) -> Self {
        Self {
            seed: (seed ^ Self::MULTIPLIER) & Self::MASK,
        }
    }

    fn next(&mut self, bits: u32) -> i32 {
        self.seed = self.seed.wrapping_mul(Self::MULTIPLIER).wrapping_add(Self::ADDEND) & Self::MASK;
        (self.seed >> (48 - bits)) as i32
    }

    pub fn next_int(&mut self) -> i32 {
        self.next(32)
    }

    /// Uniform in `0..bound`. `bound` must be positive.
    pub fn next_int_bounded(&mut self, bound: i32) -> i32 {
        if bound & bound.wrapping_neg() == bound {
            return ((bound as i64 * self.next(31) as i64) >> 31) as i32;
        }
        loop {
            let bits = self.next(31);
            let value = bits % bound;
            if bits.wrapping_sub(value).wrapping_add(bound - 1) >= 0 {
                return value;
            }
        }
    }

    pub fn next_double(&mut self) -> f64 {
        let high = (self.next(26) as i64) << 27;
        let low = self.next(27) as i64;
        (high + low) as f64 * (1.0 / (1u64 << 53) as f64)
    }
}

const GRADIENTS: [[i32; 3]; 12] = [
    [1, 1, 0],
    [-1, 1, 0],
    [1, -1, 0],
    [-1, -1, 0],
    [1, 0, 1],
    [-1, 0, 1],
    [1, 0, -1],
    [-1, 0, -1],
    [0, 1, 1],
    [0, -1, 1],
    [0, 1, -1],
    [0, -1, -1],
];

static SKEW: LazyLock<f64> = LazyLock::new(|| 0.5 * (3f64.sqrt() - 1.0));
static UNSKEW: LazyLock<f64> = LazyLock::new(|| (3.0 - 3f64.sqrt()) / 6.0);

/// Floor as the old generator computed it (`0.0` maps to `-1`).
fn wrap(value: f64) -> i32 {
    if value > 0.0 { value as i32 } else { value as i32 - 1 }
}

fn dot(gradient: &[i32; 3], x: f64, z: f64) -> f64 {
    gradient[0] as f64 * x + gradient[1] as f64 * z
}

#[derive(Debug, Clone)]
struct SimplexNoise {
    permutations: Box<[i32; 512]>,
    offset_x: f64,
    offset_z: f64,
}

impl SimplexNoise {
    fn new(random: &mut JavaRandom) -> Self {
        let offset_x = random.next_double() * 256.0;
        let offset_z = random.next_double() * 256.0;
        // Third offset is drawn but only used by the 3D variant
        let _ = random.next_double() * 256.0;

        let mut permutations = Box::new([0i32; 512]);
        for (i, slot) in permutations.iter_mut().take(256).enumerate() {
            *slot = i as i32;
        }
        for i in 0..256 {
            let j = (random.next_int_bounded(256 - i as i32) + i as i32) as usize;
            permutations.swap(i, j);
            permutations[i + 256] = permutations[i];
        }

        Self {
            permutations,
            offset_x,
            offset_z,
        }
    }

    fn corner(&self, gradient: usize, x: f64, z: f64) -> f64 {
        let falloff = 0.5 - x * x - z * z;
        if falloff < 0.0 {
            0.0
        } else {
            let falloff = falloff * falloff;
            falloff * falloff * dot(&GRADIENTS[gradient], x, z)
        }
    }

    /// Adds this octave over a `width` x `depth` grid into `out` (x-major).
    #[allow(clippy::too_many_arguments)]
    fn add(&self, out: &mut [f64], x: f64, z: f64, width: usize, depth: usize, scale_x: f64, scale_z: f64, amplitude: f64) {
        let (skew, unskew) = (*SKEW, *UNSKEW);
        let perm = &self.permutations;
        let mut index = 0;

        for dx in 0..width {
            let px = (x + dx as f64) * scale_x + self.offset_x;
            for dz in 0..depth {
                let pz = (z + dz as f64) * scale_z + self.offset_z;

                let s = (px + pz) * skew;
                let cell_x = wrap(px + s);
                let cell_z = wrap(pz + s);
                let t = (cell_x + cell_z) as f64 * unskew;
                let x0 = px - (cell_x as f64 - t);
                let z0 = pz - (cell_z as f64 - t);

                let (step_x, step_z): (usize, usize) = if x0 > z0 { (1, 0) } else { (0, 1) };
                let x1 = x0 - step_x as f64 + unskew;
                let z1 = z0 - step_z as f64 + unskew;
                let x2 = x0 - 1.0 + 2.0 * unskew;
                let z2 = z0 - 1.0 + 2.0 * unskew;

                let ix = (cell_x & 255) as usize;
                let iz = (cell_z & 255) as usize;
                let g0 = perm[ix + perm[iz] as usize] % 12;
                let g1 = perm[ix + step_x + perm[iz + step_z] as usize] % 12;
                let g2 = perm[ix + 1 + perm[iz + 1] as usize] % 12;

                let n = self.corner(g0 as usize, x0, z0)
                    + self.corner(g1 as usize, x1, z1)
                    + self.corner(g2 as usize, x2, z2);
                out[index] += 70.0 * n * amplitude;
                index += 1;
            }
        }
    }
}

#[derive(Debug, Clone)]
struct OctaveNoise {
    octaves: Vec<SimplexNoise>,
}

impl OctaveNoise {
    fn new(seed: i64, count: usize) -> Self {
        let mut random = JavaRandom::new(seed);
        Self {
            octaves: (0..count).map(|_| SimplexNoise::new(&mut random)).collect(),
        }
    }

    fn sample(&self, x: f64, z: f64, width: usize, depth: usize, scale: f64, falloff: f64) -> Vec<f64> {
        let mut out = vec![0.0; width * depth];
        let scale = scale / 1.5;
        let mut frequency = 1.0;
        let mut amplitude = 1.0;

        for octave in &self.octaves {
            octave.add(&mut out, x, z, width, depth, scale * frequency, scale * frequency, 0.55 / amplitude);
            frequency *= falloff;
            amplitude *= 0.5;
        }
        out
    }
}

/// Beta climate table: biome for (temperature, humidity) in `0..=1`.
fn classify(temperature: f32, humidity: f32) -> LegacyBiome {
    let humidity = humidity * temperature;
    if temperature < 0.1 {
        LegacyBiome::Tundra
    } else if humidity < 0.2 {
        if temperature < 0.5 {
            LegacyBiome::Tundra
        } else if temperature < 0.95 {
            LegacyBiome::Savanna
        } else {
            LegacyBiome::Desert
        }
    } else if humidity > 0.5 && temperature < 0.7 {
        LegacyBiome::Swampland
    } else if temperature < 0.5 {
        LegacyBiome::Taiga
    } else if temperature < 0.97 {
        if humidity < 0.35 { LegacyBiome::Shrubland } else { LegacyBiome::Forest }
    } else if humidity < 0.45 {
        LegacyBiome::Plains
    } else if humidity < 0.9 {
        LegacyBiome::SeasonalForest
    } else {
        LegacyBiome::Rainforest
    }
}

static LOOKUP: LazyLock<Box<[LegacyBiome]>> = LazyLock::new(|| {
    let mut table = vec![LegacyBiome::Plains; 64 * 64];
    for t in 0..64 {
        for h in 0..64 {
            table[t + h * 64] = classify(t as f32 / 63.0, h as f32 / 63.0);
        }
    }
    table.into_boxed_slice()
});

fn lookup(temperature: f64, humidity: f64) -> LegacyBiome {
    let t = (temperature * 63.0) as usize;
    let h = (humidity * 63.0) as usize;
    LOOKUP[t + h * 64]
}

#[derive(Debug, Clone)]
pub struct ClimateSampler {
    temperature: OctaveNoise,
    humidity: OctaveNoise,
    variation: OctaveNoise,
}

impl ClimateSampler {
    pub fn new(seed: i64) -> Self {
        Self {
            temperature: OctaveNoise::new(seed.wrapping_mul(9871), 4),
            humidity: OctaveNoise::new(seed.wrapping_mul(39811), 4),
            variation: OctaveNoise::new(seed.wrapping_mul(543321), 2),
        }
    }

    /// Biomes of the `width` x `depth` block area starting at (x, z),
    /// indexed `dx * depth + dz`.
    pub fn biomes(&self, x: i32, z: i32, width: usize, depth: usize) -> Vec<LegacyBiome> {
        let (x, z) = (x as f64, z as f64);
        // The generator widened these scales from single precision
        let temperature = self.temperature.sample(x, z, width, depth, 0.025f32 as f64, 0.25);
        let humidity = self.humidity.sample(x, z, width, depth, 0.05f32 as f64, 1.0 / 3.0);
        let variation = self.variation.sample(x, z, width, depth, 0.25, 1.0 / 1.7);

        temperature
            .iter()
            .zip(&humidity)
            .zip(&variation)
            .map(|((&t, &h), &v)| {
                let noise = v * 1.1 + 0.5;
                let t = (t * 0.15 + 0.7) * 0.99 + noise * 0.01;
                let h = (h * 0.15 + 0.5) * 0.998 + noise * 0.002;
                let t = 1.0 - (1.0 - t) * (1.0 - t);
                lookup(t.clamp(0.0, 1.0), h.clamp(0.0, 1.0))
            })
            .collect()
    }

    pub fn biome_at(&self, x: i32, z: i32) -> LegacyBiome {
        self.biomes(x, z, 1, 1)[0]
    }

    /// Biomes of one chunk column, indexed `x * 16 + z`.
    pub fn chunk_biomes(&self, chunk_x: i32, chunk_z: i32) -> Box<[LegacyBiome]> {
        self.biomes(chunk_x.wrapping_mul(16), chunk_z.wrapping_mul(16), 16, 16)
            .into_boxed_slice()
    }
}
