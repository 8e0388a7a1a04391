use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::noise::NoiseSettings;

#[derive(Debug)]
pub enum ConfigError {
    NonPositiveChunkSize(i32),
    EmptyOctaves {
        field: &'static str,
    },
    OctaveTableMismatch {
        field: &'static str,
        octaves: usize,
        amplitudes: usize,
        frequencies: usize,
    },
    InvalidCurve(&'static str),
    ZeroBlendWeight,
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NonPositiveChunkSize(n) => {
                write!(f, "chunk_size must be positive (got {})", n)
            }
            ConfigError::EmptyOctaves { field } => {
                write!(f, "noise field '{}' needs at least one octave", field)
            }
            ConfigError::OctaveTableMismatch {
                field,
                octaves,
                amplitudes,
                frequencies,
            } => write!(
                f,
                "noise field '{}' has {} octaves but {} amplitudes and {} frequencies",
                field, octaves, amplitudes, frequencies
            ),
            ConfigError::InvalidCurve(why) => write!(f, "elevation curve: {}", why),
            ConfigError::ZeroBlendWeight => write!(f, "blend weights must not sum to zero"),
            ConfigError::Io(e) => write!(f, "reading world config: {}", e),
            ConfigError::Parse(e) => write!(f, "parsing world config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorldGenMode {
    Normal,
    Flat { thickness: i32 },
}

#[derive(Clone, Debug, Deserialize)]
pub struct WorldGenConfig {
    #[serde(default = "default_seed")]
    pub seed: i32,
    #[serde(default = "default_chunk_size")]
    pub chunk_size: i32,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default)]
    pub flat: Flat,
    #[serde(default = "default_mountains")]
    pub mountains: NoiseFieldDef,
    #[serde(default = "default_elevation")]
    pub elevation: NoiseFieldDef,
    #[serde(default)]
    pub elevation_band: ElevationBand,
    #[serde(default)]
    pub blend: Blend,
    #[serde(default)]
    pub surface: Surface,
    #[serde(default)]
    pub ores: Ores,
    #[serde(default)]
    pub stream: StreamSection,
}

impl Default for WorldGenConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            chunk_size: default_chunk_size(),
            mode: Mode::Normal,
            flat: Flat::default(),
            mountains: default_mountains(),
            elevation: default_elevation(),
            elevation_band: ElevationBand::default(),
            blend: Blend::default(),
            surface: Surface::default(),
            ores: Ores::default(),
            stream: StreamSection::default(),
        }
    }
}

impl WorldGenConfig {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    /// Parses and validates; any returned config is safe to synthesize from.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: WorldGenConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size <= 0 {
            return Err(ConfigError::NonPositiveChunkSize(self.chunk_size));
        }
        self.mountains.settings("mountains")?;
        self.elevation.settings("elevation")?;
        self.ores.gravel.noise.settings("ores.gravel")?;
        self.ores.coal.noise.settings("ores.coal")?;
        self.ores.iron.noise.settings("ores.iron")?;
        self.elevation_band.validate()?;
        if self.blend.relief + self.blend.elevation == 0.0 {
            return Err(ConfigError::ZeroBlendWeight);
        }
        Ok(())
    }

    /// Edge length in voxels. Only meaningful after `validate`.
    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size.max(1) as usize
    }

    pub fn gen_mode(&self) -> WorldGenMode {
        match self.mode {
            Mode::Normal => WorldGenMode::Normal,
            Mode::Flat => WorldGenMode::Flat {
                thickness: self.flat.thickness,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Normal,
    Flat,
}

fn default_seed() -> i32 {
    1
}
fn default_chunk_size() -> i32 {
    16
}
fn default_mode() -> Mode {
    Mode::Normal
}

#[derive(Clone, Debug, Deserialize)]
pub struct Flat {
    #[serde(default = "default_flat_thickness")]
    pub thickness: i32,
}
fn default_flat_thickness() -> i32 {
    1
}
impl Default for Flat {
    fn default() -> Self {
        Self {
            thickness: default_flat_thickness(),
        }
    }
}

/// Noise field as written in TOML: explicit per-octave tables, or geometric
/// tables derived from `persistence` and `lacunarity`.
#[derive(Clone, Debug, Deserialize)]
pub struct NoiseFieldDef {
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_octaves")]
    pub octaves: usize,
    #[serde(default)]
    pub amplitudes: Option<Vec<f32>>,
    #[serde(default)]
    pub frequencies: Option<Vec<f32>>,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
}
fn default_scale() -> f32 {
    50.0
}
fn default_octaves() -> usize {
    4
}
fn default_persistence() -> f32 {
    0.5
}
fn default_lacunarity() -> f32 {
    2.0
}

impl NoiseFieldDef {
    pub fn fractal(scale: f32, octaves: usize) -> Self {
        Self {
            scale,
            octaves,
            amplitudes: None,
            frequencies: None,
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
        }
    }

    pub fn settings(&self, field: &'static str) -> Result<NoiseSettings, ConfigError> {
        let mut s = NoiseSettings::fractal(self.scale, self.octaves, self.persistence, self.lacunarity);
        if let Some(a) = &self.amplitudes {
            s.amplitudes = a.clone();
        }
        if let Some(f) = &self.frequencies {
            s.frequencies = f.clone();
        }
        s.validate(field)?;
        Ok(s)
    }
}

fn default_mountains() -> NoiseFieldDef {
    NoiseFieldDef::fractal(50.1, 4)
}
fn default_elevation() -> NoiseFieldDef {
    NoiseFieldDef::fractal(240.0, 3)
}

/// Column threshold: `bottom + curve(elevation) * height`. Voxels above it get
/// the `low` mask value, voxels at or below it get `high`.
#[derive(Clone, Debug, Deserialize)]
pub struct ElevationBand {
    #[serde(default = "default_band_bottom")]
    pub bottom: i32,
    #[serde(default = "default_band_height")]
    pub height: i32,
    #[serde(default = "default_curve")]
    pub curve: Vec<[f32; 2]>,
    #[serde(default = "default_mask_low")]
    pub low: f32,
    #[serde(default = "default_mask_high")]
    pub high: f32,
}
fn default_band_bottom() -> i32 {
    -96
}
fn default_band_height() -> i32 {
    256
}
fn default_curve() -> Vec<[f32; 2]> {
    vec![[0.0, 0.0], [0.4, 0.3], [0.6, 0.7], [1.0, 1.0]]
}
fn default_mask_low() -> f32 {
    -0.3
}
fn default_mask_high() -> f32 {
    0.3
}
impl Default for ElevationBand {
    fn default() -> Self {
        Self {
            bottom: default_band_bottom(),
            height: default_band_height(),
            curve: default_curve(),
            low: default_mask_low(),
            high: default_mask_high(),
        }
    }
}

impl ElevationBand {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.curve.len() < 2 {
            return Err(ConfigError::InvalidCurve("needs at least two points"));
        }
        if self.curve.windows(2).any(|w| w[1][0] <= w[0][0]) {
            return Err(ConfigError::InvalidCurve("x values must strictly increase"));
        }
        if self.curve.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ConfigError::InvalidCurve("points must be finite"));
        }
        Ok(())
    }

    /// Piecewise-linear curve lookup, clamped to the end points.
    pub fn eval_curve(&self, t: f32) -> f32 {
        let (first, last) = match (self.curve.first(), self.curve.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => return t,
        };
        if t <= first[0] {
            return first[1];
        }
        if t >= last[0] {
            return last[1];
        }
        for w in self.curve.windows(2) {
            let (a, b) = (w[0], w[1]);
            if t <= b[0] {
                let k = (t - a[0]) / (b[0] - a[0]);
                return a[1] + (b[1] - a[1]) * k;
            }
        }
        last[1]
    }

    /// World y of the solid/air threshold for a column with elevation `e`.
    #[inline]
    pub fn threshold_height(&self, e: f32) -> f32 {
        self.bottom as f32 + self.eval_curve(e) * self.height as f32
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Blend {
    #[serde(default = "default_weight")]
    pub relief: f32,
    #[serde(default = "default_weight")]
    pub elevation: f32,
}
fn default_weight() -> f32 {
    1.0
}
impl Default for Blend {
    fn default() -> Self {
        Self {
            relief: default_weight(),
            elevation: default_weight(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct Surface {
    #[serde(default = "default_band_min")]
    pub band_min: i32,
    #[serde(default = "default_band_max")]
    pub band_max: i32,
    #[serde(default = "default_dirt_depth")]
    pub dirt_depth: usize,
    #[serde(default = "default_deep_margin")]
    pub deep_margin: i32,
}
fn default_band_min() -> i32 {
    -64
}
fn default_band_max() -> i32 {
    192
}
fn default_dirt_depth() -> usize {
    2
}
fn default_deep_margin() -> i32 {
    24
}
impl Default for Surface {
    fn default() -> Self {
        Self {
            band_min: default_band_min(),
            band_max: default_band_max(),
            dirt_depth: default_dirt_depth(),
            deep_margin: default_deep_margin(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct OreDef {
    #[serde(flatten)]
    pub noise: NoiseFieldDef,
    #[serde(default = "default_ore_threshold")]
    pub threshold: f32,
}
fn default_ore_threshold() -> f32 {
    0.1
}

impl OreDef {
    fn new(scale: f32, octaves: usize, threshold: f32) -> Self {
        Self {
            noise: NoiseFieldDef::fractal(scale, octaves),
            threshold,
        }
    }
}

/// Ore fields in priority order; the first whose value exceeds its threshold wins.
#[derive(Clone, Debug, Deserialize)]
pub struct Ores {
    #[serde(default = "default_gravel")]
    pub gravel: OreDef,
    #[serde(default = "default_coal")]
    pub coal: OreDef,
    #[serde(default = "default_iron")]
    pub iron: OreDef,
}
fn default_gravel() -> OreDef {
    OreDef::new(14.0, 2, 0.09)
}
fn default_coal() -> OreDef {
    OreDef::new(9.0, 2, 0.1)
}
fn default_iron() -> OreDef {
    OreDef::new(7.0, 2, 0.11)
}
impl Default for Ores {
    fn default() -> Self {
        Self {
            gravel: default_gravel(),
            coal: default_coal(),
            iron: default_iron(),
        }
    }
}

/// Streaming knobs carried in the world file; the runtime validates them.
#[derive(Clone, Debug, Deserialize)]
pub struct StreamSection {
    #[serde(default = "default_view_radius")]
    pub view_radius: i32,
    #[serde(default)]
    pub spherical: bool,
    #[serde(default = "default_pool_size")]
    pub pool_size: usize,
    #[serde(default = "default_budget")]
    pub budget: usize,
    /// Defaults to half the chunk size when unset.
    #[serde(default)]
    pub half_extent: Option<f32>,
}
fn default_view_radius() -> i32 {
    3
}
fn default_pool_size() -> usize {
    512
}
fn default_budget() -> usize {
    4
}
impl Default for StreamSection {
    fn default() -> Self {
        Self {
            view_radius: default_view_radius(),
            spherical: false,
            pool_size: default_pool_size(),
            budget: default_budget(),
            half_extent: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_yields_defaults() {
        let cfg = WorldGenConfig::from_toml_str("").unwrap();
        assert_eq!(cfg.chunk_size(), 16);
        assert_eq!(cfg.gen_mode(), WorldGenMode::Normal);
        assert_eq!(cfg.mountains.settings("mountains").unwrap().octaves, 4);
    }

    #[test]
    fn flat_mode_reads_thickness() {
        let cfg = WorldGenConfig::from_toml_str("mode = \"flat\"\n[flat]\nthickness = 5\n").unwrap();
        assert_eq!(cfg.gen_mode(), WorldGenMode::Flat { thickness: 5 });
    }

    #[test]
    fn non_positive_chunk_size_is_fatal() {
        let err = WorldGenConfig::from_toml_str("chunk_size = 0").unwrap_err();
        assert!(matches!(err, ConfigError::NonPositiveChunkSize(0)));
    }

    #[test]
    fn explicit_tables_must_match_octaves() {
        let s = "[mountains]\noctaves = 3\namplitudes = [1.0, 0.5]\n";
        let err = WorldGenConfig::from_toml_str(s).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::OctaveTableMismatch { field: "mountains", octaves: 3, amplitudes: 2, .. }
        ));
        let s = "[ores.coal]\noctaves = 0\n";
        assert!(matches!(
            WorldGenConfig::from_toml_str(s).unwrap_err(),
            ConfigError::EmptyOctaves { field: "ores.coal" }
        ));
    }

    #[test]
    fn ore_table_flattens_noise_fields() {
        let s = "[ores.iron]\nscale = 3.0\noctaves = 1\nthreshold = 0.2\n";
        let cfg = WorldGenConfig::from_toml_str(s).unwrap();
        assert_eq!(cfg.ores.iron.threshold, 0.2);
        assert_eq!(cfg.ores.iron.noise.scale, 3.0);
        assert_eq!(cfg.ores.iron.noise.octaves, 1);
    }

    #[test]
    fn curve_is_piecewise_linear_and_clamped() {
        let band = ElevationBand {
            curve: vec![[0.0, 0.0], [0.5, 0.25], [1.0, 1.0]],
            ..ElevationBand::default()
        };
        assert_eq!(band.eval_curve(-1.0), 0.0);
        assert_eq!(band.eval_curve(0.25), 0.125);
        assert_eq!(band.eval_curve(0.75), 0.625);
        assert_eq!(band.eval_curve(2.0), 1.0);
        assert_eq!(band.threshold_height(1.0), (band.bottom + band.height) as f32);
    }

    #[test]
    fn unsorted_curve_is_rejected() {
        let s = "[elevation_band]\ncurve = [[0.0, 0.0], [0.0, 1.0]]\n";
        assert!(matches!(
            WorldGenConfig::from_toml_str(s).unwrap_err(),
            ConfigError::InvalidCurve(_)
        ));
    }
}
