//! Pooled chunk slots: voxel storage, neighbor link flags, and load state.
#![forbid(unsafe_code)]

pub mod chunk;
pub mod face;
pub mod neighbors;

pub use chunk::{Chunk, ChunkSnapshot, LoadState, LocalOutOfBounds};
pub use face::Face;
pub use neighbors::NeighborLinks;
