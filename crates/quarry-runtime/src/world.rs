use quarry_blocks::BlockRegistry;
use quarry_geom::Vec3;
use quarry_world::{ChunkCoord, ChunkSource};

use crate::raycast::{PickHit, pick};
use crate::store::{ChunkStore, PoolStats};
use crate::stream::{ChunkStreamer, RecomputeReport, StreamConfig, StreamConfigError, TickReport};
use crate::telemetry::{NoopReporter, PhaseReporter};

/// Host-loop facade: a voxel source, the chunk pool, the streamer, and the
/// atlas registry, advanced one tick at a time.
pub struct VoxelWorld<S: ChunkSource, R: PhaseReporter = NoopReporter> {
    source: S,
    registry: BlockRegistry,
    store: ChunkStore,
    streamer: ChunkStreamer,
    reporter: R,
}

impl<S: ChunkSource> VoxelWorld<S, NoopReporter> {
    pub fn new(source: S, registry: BlockRegistry, cfg: StreamConfig) -> Result<Self, StreamConfigError> {
        let streamer = ChunkStreamer::new(cfg)?;
        let store = ChunkStore::new(source.chunk_size(), streamer.config().pool_size);
        Ok(Self {
            source,
            registry,
            store,
            streamer,
            reporter: NoopReporter,
        })
    }

    /// Builds a world on an existing store; the store must match the source's chunk size.
    pub fn with_store(
        source: S,
        registry: BlockRegistry,
        cfg: StreamConfig,
        store: ChunkStore,
    ) -> Result<Self, StreamConfigError> {
        if store.chunk_size() != source.chunk_size() {
            return Err(StreamConfigError::ChunkSizeMismatch {
                store: store.chunk_size(),
                source: source.chunk_size(),
            });
        }
        Ok(Self {
            source,
            registry,
            store,
            streamer: ChunkStreamer::new(cfg)?,
            reporter: NoopReporter,
        })
    }
}

impl<S: ChunkSource, R: PhaseReporter> VoxelWorld<S, R> {
    pub fn with_reporter<R2: PhaseReporter>(self, reporter: R2) -> VoxelWorld<S, R2> {
        VoxelWorld {
            source: self.source,
            registry: self.registry,
            store: self.store,
            streamer: self.streamer,
            reporter,
        }
    }

    #[inline]
    pub fn source(&self) -> &S {
        &self.source
    }

    #[inline]
    pub fn registry(&self) -> &BlockRegistry {
        &self.registry
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &self.store
    }

    #[inline]
    pub fn store_mut(&mut self) -> &mut ChunkStore {
        &mut self.store
    }

    /// Mutable store plus the registry, for editors that need both.
    #[inline]
    pub fn edit_parts(&mut self) -> (&mut ChunkStore, &BlockRegistry) {
        (&mut self.store, &self.registry)
    }

    #[inline]
    pub fn streamer(&self) -> &ChunkStreamer {
        &self.streamer
    }

    #[inline]
    pub fn reporter(&self) -> &R {
        &self.reporter
    }

    pub fn stats(&self) -> PoolStats {
        self.store.stats()
    }

    /// Samples the reference point; recomputes the desired set on chunk change.
    pub fn set_reference(&mut self, pos: Vec3) -> Option<RecomputeReport> {
        self.streamer
            .update_reference(&mut self.store, pos, &mut self.reporter)
    }

    pub fn recenter(&mut self, center: ChunkCoord) -> RecomputeReport {
        self.streamer
            .recompute_target_set(&mut self.store, center, &mut self.reporter)
    }

    /// One budgeted streaming step.
    pub fn tick(&mut self) -> TickReport {
        let budget = self.streamer.config().budget;
        self.streamer.tick(
            &mut self.store,
            &self.source,
            &self.registry,
            budget,
            &mut self.reporter,
        )
    }

    pub fn run_until_idle(&mut self) -> usize {
        self.streamer
            .run_until_idle(&mut self.store, &self.source, &self.registry, &mut self.reporter)
    }

    /// Regenerates meshes of chunks left dirty by edits or relinking.
    pub fn remesh_dirty(&mut self) -> usize {
        self.store.remesh_dirty(&self.registry)
    }

    pub fn pick(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<PickHit> {
        pick(&self.store, origin, dir, max_dist)
    }
}
