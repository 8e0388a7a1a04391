//! Chunk pool, budgeted streaming around a reference point, and voxel picking.
#![forbid(unsafe_code)]

pub mod raycast;
pub mod store;
pub mod stream;
pub mod telemetry;
mod world;

pub use raycast::{PickHit, RayHit, pick, raycast_first_hit};
pub use store::{ChunkSlot, ChunkStore, PoolStats, SlotId};
pub use stream::{ChunkStreamer, RecomputeReport, StreamConfig, StreamConfigError, TickReport};
pub use telemetry::{NoopReporter, Phase, PhaseReporter, RunningAverages};
pub use world::VoxelWorld;
