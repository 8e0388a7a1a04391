use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::config::ConfigError;

/// Replacement for a non-positive scale so sampling never divides by zero.
pub const MIN_SCALE: f32 = 0.001;

const OCTAVE_OFFSET_RANGE: i32 = 100_000;

/// Per-field multi-octave settings. Tables are indexed by octave.
#[derive(Clone, Debug, PartialEq)]
pub struct NoiseSettings {
    pub scale: f32,
    pub octaves: usize,
    pub amplitudes: Vec<f32>,
    pub frequencies: Vec<f32>,
}

impl NoiseSettings {
    /// Geometric tables: octave `i` has amplitude `persistence^i` and frequency `lacunarity^i`.
    pub fn fractal(scale: f32, octaves: usize, persistence: f32, lacunarity: f32) -> Self {
        let mut amplitudes = Vec::with_capacity(octaves);
        let mut frequencies = Vec::with_capacity(octaves);
        let (mut amp, mut freq) = (1.0f32, 1.0f32);
        for _ in 0..octaves {
            amplitudes.push(amp);
            frequencies.push(freq);
            amp *= persistence;
            freq *= lacunarity;
        }
        Self {
            scale,
            octaves,
            amplitudes,
            frequencies,
        }
    }

    pub fn validate(&self, field: &'static str) -> Result<(), ConfigError> {
        if self.octaves == 0 {
            return Err(ConfigError::EmptyOctaves { field });
        }
        if self.amplitudes.len() != self.octaves || self.frequencies.len() != self.octaves {
            return Err(ConfigError::OctaveTableMismatch {
                field,
                octaves: self.octaves,
                amplitudes: self.amplitudes.len(),
                frequencies: self.frequencies.len(),
            });
        }
        Ok(())
    }

    #[inline]
    pub fn effective_scale(&self) -> f32 {
        if self.scale <= 0.0 { MIN_SCALE } else { self.scale }
    }
}

/// Row-major 2D scalar grid, indexed `z * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid2 {
    pub width: usize,
    pub depth: usize,
    pub data: Vec<f32>,
}

impl Grid2 {
    #[inline]
    pub fn get(&self, x: usize, z: usize) -> f32 {
        self.data[z * self.width + x]
    }
}

/// 3D scalar grid, indexed `(y * depth + z) * width + x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid3 {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub data: Vec<f32>,
}

impl Grid3 {
    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.depth + z) * self.width + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> f32 {
        self.data[self.idx(x, y, z)]
    }
}

/// Seeded multi-octave noise field. Octave offsets are drawn once from the seed,
/// so equal `(seed, settings)` pairs sample identically everywhere.
pub struct NoiseField {
    settings: NoiseSettings,
    scale: f64,
    amp_sum: f32,
    offsets: Vec<[f64; 3]>,
    lattice: FastNoiseLite,
}

impl NoiseField {
    pub fn new(seed: i32, settings: NoiseSettings) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed as i64 as u64);
        let offsets = (0..settings.octaves)
            .map(|_| {
                let mut o = [0.0f64; 3];
                for c in &mut o {
                    *c = f64::from(rng.random_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE));
                }
                o
            })
            .collect();
        let mut lattice = FastNoiseLite::with_seed(seed);
        lattice.set_noise_type(Some(NoiseType::Perlin));
        lattice.set_frequency(Some(1.0));
        let amp_sum: f32 = settings.amplitudes.iter().sum();
        Self {
            scale: f64::from(settings.effective_scale()),
            amp_sum: if amp_sum == 0.0 { 1.0 } else { amp_sum },
            settings,
            offsets,
            lattice,
        }
    }

    #[inline]
    pub fn settings(&self) -> &NoiseSettings {
        &self.settings
    }

    #[inline]
    fn coord(&self, p: f64, octave: usize, axis: usize) -> f32 {
        ((p + self.offsets[octave][axis]) / self.scale * f64::from(self.settings.frequencies[octave]))
            as f32
    }

    /// Lattice gradient noise remapped to `[0, 1]`, 0.5 on integer lattice points.
    #[inline]
    fn perlin2(&self, a: f32, b: f32) -> f32 {
        ((self.lattice.get_noise_2d(a, b) + 1.0) * 0.5).clamp(0.0, 1.0)
    }

    /// Average of the six ordered axis-pair evaluations.
    #[inline]
    fn perlin3(&self, x: f32, y: f32, z: f32) -> f32 {
        let sum = self.perlin2(x, y)
            + self.perlin2(y, z)
            + self.perlin2(x, z)
            + self.perlin2(y, x)
            + self.perlin2(z, y)
            + self.perlin2(z, x);
        sum / 6.0
    }

    /// Normalized 2D value in `[0, 1]` at world position `(x, z)`.
    pub fn value_2d(&self, x: f64, z: f64) -> f32 {
        let mut acc = 0.0f32;
        for i in 0..self.settings.octaves {
            let sx = self.coord(x, i, 0);
            let sz = self.coord(z, i, 2);
            acc += self.perlin2(sx, sz) * self.settings.amplitudes[i];
        }
        acc / self.amp_sum
    }

    /// Normalized 3D value centered on zero at world position `(x, y, z)`.
    pub fn value_3d(&self, x: f64, y: f64, z: f64) -> f32 {
        let mut acc = 0.0f32;
        for i in 0..self.settings.octaves {
            let sx = self.coord(x, i, 0);
            let sy = self.coord(y, i, 1);
            let sz = self.coord(z, i, 2);
            acc += self.perlin3(sx, sy, sz) * self.settings.amplitudes[i];
        }
        acc / self.amp_sum - 0.5
    }

    pub fn sample_2d(&self, width: usize, depth: usize, offset: [f64; 2]) -> Grid2 {
        let mut data = Vec::with_capacity(width * depth);
        for z in 0..depth {
            for x in 0..width {
                data.push(self.value_2d(offset[0] + x as f64, offset[1] + z as f64));
            }
        }
        Grid2 { width, depth, data }
    }

    pub fn sample_3d(&self, width: usize, height: usize, depth: usize, offset: [f64; 3]) -> Grid3 {
        let mut data = Vec::with_capacity(width * height * depth);
        for y in 0..height {
            for z in 0..depth {
                for x in 0..width {
                    data.push(self.value_3d(
                        offset[0] + x as f64,
                        offset[1] + y as f64,
                        offset[2] + z as f64,
                    ));
                }
            }
        }
        Grid3 {
            width,
            height,
            depth,
            data,
        }
    }
}

/// One-shot 2D sampling without keeping the field around.
pub fn sample_2d(width: usize, depth: usize, seed: i32, settings: &NoiseSettings, offset: [f64; 2]) -> Grid2 {
    NoiseField::new(seed, settings.clone()).sample_2d(width, depth, offset)
}

/// One-shot 3D sampling without keeping the field around.
pub fn sample_3d(
    width: usize,
    height: usize,
    depth: usize,
    seed: i32,
    settings: &NoiseSettings,
    offset: [f64; 3],
) -> Grid3 {
    NoiseField::new(seed, settings.clone()).sample_3d(width, height, depth, offset)
}
