//! Chunk coordinates, seeded noise fields, and terrain synthesis.
#![forbid(unsafe_code)]

pub mod config;
pub mod coord;
pub mod noise;
pub mod synth;

pub use config::{ConfigError, WorldGenConfig, WorldGenMode};
pub use coord::ChunkCoord;
pub use noise::{Grid2, Grid3, NoiseField, NoiseSettings};
pub use synth::{ChunkSource, TerrainSynthesizer, VoxelGrid};
