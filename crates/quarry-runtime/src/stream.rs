use std::time::Instant;

use hashbrown::HashSet;
use quarry_blocks::BlockRegistry;
use quarry_geom::Vec3;
use quarry_world::config::StreamSection;
use quarry_world::{ChunkCoord, ChunkSource};

use crate::store::ChunkStore;
use crate::telemetry::{Phase, PhaseReporter};

#[derive(Debug, PartialEq, Eq)]
pub enum StreamConfigError {
    EmptyPool,
    ZeroBudget,
    NegativeRadius(i32),
    ChunkSizeMismatch { store: usize, source: usize },
}

impl std::fmt::Display for StreamConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StreamConfigError::EmptyPool => write!(f, "chunk pool must hold at least one slot"),
            StreamConfigError::ZeroBudget => write!(f, "per-tick load budget must be at least one"),
            StreamConfigError::NegativeRadius(r) => write!(f, "view radius must not be negative (got {})", r),
            StreamConfigError::ChunkSizeMismatch { store, source } => write!(
                f,
                "chunk store uses size {} but the voxel source produces size {}",
                store, source
            ),
        }
    }
}

impl std::error::Error for StreamConfigError {}

#[derive(Clone, Debug, PartialEq)]
pub struct StreamConfig {
    /// Chebyshev radius of the desired cube, in chunks.
    pub view_radius: i32,
    /// Also drop offsets farther than `view_radius` in Euclidean distance.
    pub spherical: bool,
    pub pool_size: usize,
    /// Maximum chunks loaded per tick.
    pub budget: usize,
    /// Subtracted from the reference point before dividing by the chunk size.
    pub half_extent: f32,
}

impl StreamConfig {
    pub fn for_chunk_size(chunk_size: usize) -> Self {
        Self::from_section(&StreamSection::default(), chunk_size)
    }

    pub fn from_section(s: &StreamSection, chunk_size: usize) -> Self {
        Self {
            view_radius: s.view_radius,
            spherical: s.spherical,
            pool_size: s.pool_size,
            budget: s.budget,
            half_extent: s.half_extent.unwrap_or(chunk_size as f32 * 0.5),
        }
    }

    pub fn validate(&self) -> Result<(), StreamConfigError> {
        if self.pool_size == 0 {
            return Err(StreamConfigError::EmptyPool);
        }
        if self.budget == 0 {
            return Err(StreamConfigError::ZeroBudget);
        }
        if self.view_radius < 0 {
            return Err(StreamConfigError::NegativeRadius(self.view_radius));
        }
        Ok(())
    }

    /// Offsets of the desired set, nearest first; ties keep x-major sweep order.
    pub fn desired_offsets(&self) -> Vec<ChunkCoord> {
        let r = self.view_radius;
        let mut out = Vec::new();
        for x in -r..=r {
            for y in -r..=r {
                for z in -r..=r {
                    let c = ChunkCoord::new(x, y, z);
                    if self.spherical && c.distance_sq(ChunkCoord::default()) > i64::from(r) * i64::from(r) {
                        continue;
                    }
                    out.push(c);
                }
            }
        }
        out.sort_by_key(|c| c.distance_sq(ChunkCoord::default()));
        out
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecomputeReport {
    pub center: ChunkCoord,
    pub desired: usize,
    pub unloaded: Vec<ChunkCoord>,
    pub queued: usize,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickReport {
    pub loaded: Vec<ChunkCoord>,
    /// Neighbors re-extracted because a new chunk linked to them.
    pub relinked: usize,
    /// A due load found no free slot and went back to the head of the queue.
    pub deferred: bool,
    pub remaining: usize,
}

/// Decides which chunks should be resident around a moving reference point and
/// loads them a bounded number per tick.
pub struct ChunkStreamer {
    cfg: StreamConfig,
    offsets: Vec<ChunkCoord>,
    center: Option<ChunkCoord>,
    desired: HashSet<ChunkCoord>,
}

impl ChunkStreamer {
    pub fn new(cfg: StreamConfig) -> Result<Self, StreamConfigError> {
        cfg.validate()?;
        let offsets = cfg.desired_offsets();
        if offsets.len() > cfg.pool_size {
            log::warn!(
                target: "stream",
                "pool of {} slots cannot hold the {} chunks of radius {}; loading will stall",
                cfg.pool_size,
                offsets.len(),
                cfg.view_radius
            );
        }
        Ok(Self {
            cfg,
            offsets,
            center: None,
            desired: HashSet::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &StreamConfig {
        &self.cfg
    }

    #[inline]
    pub fn center(&self) -> Option<ChunkCoord> {
        self.center
    }

    #[inline]
    pub fn is_desired(&self, coord: ChunkCoord) -> bool {
        self.desired.contains(&coord)
    }

    pub fn desired_len(&self) -> usize {
        self.desired.len()
    }

    #[inline]
    pub fn reference_coord(&self, pos: Vec3, chunk_size: usize) -> ChunkCoord {
        ChunkCoord::from_reference_point(pos, self.cfg.half_extent, chunk_size)
    }

    /// Recomputes the desired set only when the reference point changed chunk.
    pub fn update_reference(
        &mut self,
        store: &mut ChunkStore,
        pos: Vec3,
        reporter: &mut dyn PhaseReporter,
    ) -> Option<RecomputeReport> {
        let center = self.reference_coord(pos, store.chunk_size());
        if self.center == Some(center) {
            return None;
        }
        Some(self.recompute_target_set(store, center, reporter))
    }

    /// Unloads everything outside the new desired set right away, then rebuilds
    /// the pending queue from desired coordinates that are not loaded yet.
    pub fn recompute_target_set(
        &mut self,
        store: &mut ChunkStore,
        center: ChunkCoord,
        reporter: &mut dyn PhaseReporter,
    ) -> RecomputeReport {
        self.center = Some(center);
        let desired: Vec<ChunkCoord> = self.offsets.iter().map(|o| center + *o).collect();
        self.desired = desired.iter().copied().collect();

        let stale: Vec<ChunkCoord> = store
            .loaded_coords()
            .into_iter()
            .filter(|c| !self.desired.contains(c))
            .collect();
        for c in &stale {
            let t0 = Instant::now();
            store.unload(*c);
            reporter.record(Phase::Unload, t0.elapsed());
            log::debug!(target: "stream", "unloaded {}", c);
        }

        store.clear_pending();
        let mut queued = 0;
        for c in &desired {
            if store.request_load(*c, center) {
                queued += 1;
            }
        }
        log::info!(
            target: "stream",
            "reference moved to {}: desired={} unloaded={} queued={}",
            center,
            desired.len(),
            stale.len(),
            queued
        );
        RecomputeReport {
            center,
            desired: desired.len(),
            unloaded: stale,
            queued,
        }
    }

    /// Loads up to `budget` pending chunks, nearest first. Nothing loads when
    /// `source` and `store` disagree on the chunk size.
    pub fn tick(
        &mut self,
        store: &mut ChunkStore,
        source: &dyn ChunkSource,
        reg: &BlockRegistry,
        budget: usize,
        reporter: &mut dyn PhaseReporter,
    ) -> TickReport {
        let mut report = TickReport::default();
        if source.chunk_size() != store.chunk_size() {
            log::error!(
                target: "stream",
                "{}; skipping tick",
                StreamConfigError::ChunkSizeMismatch {
                    store: store.chunk_size(),
                    source: source.chunk_size(),
                }
            );
            report.remaining = store.pending_len();
            return report;
        }
        for _ in 0..budget {
            let Some(coord) = store.pop_pending() else {
                break;
            };
            if store.is_loaded(coord) {
                continue;
            }
            let Some(id) = store.acquire(coord) else {
                store.requeue_front(coord);
                report.deferred = true;
                log::debug!(target: "stream", "pool exhausted; deferring {}", coord);
                break;
            };

            let t0 = Instant::now();
            let grid = source.generate(coord);
            reporter.record(Phase::Synthesize, t0.elapsed());
            store.slot_chunk_mut(id).finish_load(&grid);
            store.commit(id);

            let t0 = Instant::now();
            let linked = store.link_neighbors(coord);
            reporter.record(Phase::Link, t0.elapsed());

            let t0 = Instant::now();
            store.rebuild_mesh(coord, reg);
            for n in &linked {
                store.rebuild_mesh(*n, reg);
            }
            reporter.record(Phase::Extract, t0.elapsed());

            log::debug!(target: "stream", "loaded {} linked={}", coord, linked.len());
            report.relinked += linked.len();
            report.loaded.push(coord);
        }
        report.remaining = store.pending_len();
        report
    }

    /// Ticks until nothing is pending or a tick makes no progress.
    pub fn run_until_idle(
        &mut self,
        store: &mut ChunkStore,
        source: &dyn ChunkSource,
        reg: &BlockRegistry,
        reporter: &mut dyn PhaseReporter,
    ) -> usize {
        let mut ticks = 0;
        loop {
            let r = self.tick(store, source, reg, self.cfg.budget, reporter);
            ticks += 1;
            if r.remaining == 0 || r.loaded.is_empty() {
                return ticks;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offsets_are_nearest_first_with_sweep_ties() {
        let cfg = StreamConfig {
            view_radius: 1,
            ..StreamConfig::for_chunk_size(16)
        };
        let o = cfg.desired_offsets();
        assert_eq!(o.len(), 27);
        assert_eq!(o[0], ChunkCoord::new(0, 0, 0));
        assert_eq!(
            &o[1..7],
            &[
                ChunkCoord::new(-1, 0, 0),
                ChunkCoord::new(0, -1, 0),
                ChunkCoord::new(0, 0, -1),
                ChunkCoord::new(0, 0, 1),
                ChunkCoord::new(0, 1, 0),
                ChunkCoord::new(1, 0, 0),
            ]
        );
        let spherical = StreamConfig {
            view_radius: 1,
            spherical: true,
            ..StreamConfig::for_chunk_size(16)
        };
        assert_eq!(spherical.desired_offsets().len(), 7);
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let base = StreamConfig::for_chunk_size(16);
        let empty = StreamConfig { pool_size: 0, ..base.clone() };
        assert_eq!(empty.validate(), Err(StreamConfigError::EmptyPool));
        let neg = StreamConfig { view_radius: -2, ..base.clone() };
        assert_eq!(neg.validate(), Err(StreamConfigError::NegativeRadius(-2)));
        let idle = StreamConfig { budget: 0, ..base };
        assert_eq!(idle.validate(), Err(StreamConfigError::ZeroBudget));
    }
}
