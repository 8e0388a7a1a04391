use std::collections::VecDeque;

use quarry_blocks::{BlockKind, BlockRegistry, FaceRole};
use quarry_chunk::{Face, LocalOutOfBounds};
use quarry_geom::{IVec3, Vec3};
use quarry_runtime::ChunkStore;
use quarry_world::ChunkCoord;

use crate::debris::{DebrisEvent, DebrisSink};

#[derive(Debug, PartialEq, Eq)]
pub enum EditError {
    OutOfBounds { local: IVec3, size: usize },
    ChunkNotLoaded(ChunkCoord),
}

impl std::fmt::Display for EditError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EditError::OutOfBounds { local, size } => write!(
                f,
                "edit at local ({}, {}, {}) is outside a chunk of size {}",
                local.x, local.y, local.z, size
            ),
            EditError::ChunkNotLoaded(c) => write!(f, "chunk {} is not loaded", c),
        }
    }
}

impl std::error::Error for EditError {}

impl From<LocalOutOfBounds> for EditError {
    fn from(e: LocalOutOfBounds) -> Self {
        EditError::OutOfBounds {
            local: e.local,
            size: e.size,
        }
    }
}

/// Result of one edit and everything it set off.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditOutcome {
    pub chunk: ChunkCoord,
    pub local: IVec3,
    /// Kind removed by a break, or kind written by a placement.
    pub kind: BlockKind,
    /// World voxels removed by gravity cascades, in removal order.
    pub collapsed: Vec<IVec3>,
    /// Chunks flagged for re-extraction, without repeats.
    pub dirtied: Vec<ChunkCoord>,
}

impl EditOutcome {
    fn new(chunk: ChunkCoord, local: IVec3, kind: BlockKind) -> Self {
        Self {
            chunk,
            local,
            kind,
            collapsed: Vec::new(),
            dirtied: Vec::new(),
        }
    }

    fn dirty(&mut self, coord: ChunkCoord) {
        if !self.dirtied.contains(&coord) {
            self.dirtied.push(coord);
        }
    }
}

/// Applies voxel edits to loaded chunks in a store. Edits are synchronous: when
/// a call returns, voxels reflect the edit and every affected chunk is dirty.
/// Meshes are regenerated later by `ChunkStore::remesh_dirty`.
pub struct BlockEditor<'a> {
    store: &'a mut ChunkStore,
    registry: &'a BlockRegistry,
    debris: &'a mut dyn DebrisSink,
    default_kind: BlockKind,
}

impl<'a> BlockEditor<'a> {
    pub fn new(store: &'a mut ChunkStore, registry: &'a BlockRegistry, debris: &'a mut dyn DebrisSink) -> Self {
        Self {
            store,
            registry,
            debris,
            default_kind: BlockKind::Stone,
        }
    }

    /// Kind written by `place_block`.
    pub fn with_default_kind(mut self, kind: BlockKind) -> Self {
        self.default_kind = kind;
        self
    }

    #[inline]
    pub fn default_kind(&self) -> BlockKind {
        self.default_kind
    }

    #[inline]
    pub fn store(&self) -> &ChunkStore {
        &*self.store
    }

    /// Sets the voxel at `local` to air and cascades into the six adjacent
    /// voxels. `impact` is forwarded to the debris hook. Breaking air is a no-op.
    pub fn break_block(&mut self, coord: ChunkCoord, local: IVec3, impact: Vec3) -> Result<EditOutcome, EditError> {
        let chunk = self.store.get(coord).ok_or(EditError::ChunkNotLoaded(coord))?;
        let kind = chunk.get(local).ok_or(EditError::OutOfBounds {
            local,
            size: chunk.size(),
        })?;
        let mut out = EditOutcome::new(coord, local, kind);
        if kind.is_air() {
            return Ok(out);
        }
        self.remove(coord, local, impact, &mut out)?;
        let mut queue = VecDeque::new();
        self.push_adjacent(coord, local, &mut queue);
        self.cascade(queue, &mut out)?;
        log::debug!(
            target: "edit",
            "broke {} at {} {:?}; collapsed={} dirtied={}",
            kind,
            coord,
            local,
            out.collapsed.len(),
            out.dirtied.len()
        );
        Ok(out)
    }

    /// Places the default kind. See `place_block_kind`.
    pub fn place_block(&mut self, coord: ChunkCoord, local: IVec3) -> Result<Option<EditOutcome>, EditError> {
        self.place_block_kind(coord, local, self.default_kind)
    }

    /// Writes `kind` at `local`, redirecting one step into a linked neighbor
    /// when `local` lies just outside the chunk. Returns `Ok(None)` when the
    /// target is occupied, across an unlinked face, or `kind` is air.
    pub fn place_block_kind(
        &mut self,
        coord: ChunkCoord,
        local: IVec3,
        kind: BlockKind,
    ) -> Result<Option<EditOutcome>, EditError> {
        let Some((tc, tl)) = self.redirect(coord, local)? else {
            log::debug!(target: "edit", "placement at {} {:?} crosses an unlinked face", coord, local);
            return Ok(None);
        };
        if kind.is_air() {
            return Ok(None);
        }
        let chunk = self.store.get_mut(tc).ok_or(EditError::ChunkNotLoaded(tc))?;
        if chunk.get(tl) != Some(BlockKind::Air) {
            return Ok(None);
        }
        chunk.set(tl, kind)?;
        let mut out = EditOutcome::new(tc, tl, kind);
        self.mark_affected(tc, tl, &mut out);
        if kind.falls_under_gravity() {
            self.cascade(VecDeque::from([(tc, tl)]), &mut out)?;
        }
        log::debug!(
            target: "edit",
            "placed {} at {} {:?}; collapsed={}",
            kind,
            tc,
            tl,
            out.collapsed.len()
        );
        Ok(Some(out))
    }

    /// Maps a local position at most one step outside `coord` to the chunk
    /// that owns it. `Ok(None)` when that chunk is not linked.
    fn redirect(&self, coord: ChunkCoord, local: IVec3) -> Result<Option<(ChunkCoord, IVec3)>, EditError> {
        let chunk = self.store.get(coord).ok_or(EditError::ChunkNotLoaded(coord))?;
        if chunk.in_bounds(local) {
            return Ok(Some((coord, local)));
        }
        let n = chunk.size() as i32;
        let step = |v: i32| {
            if v < 0 {
                -1
            } else if v >= n {
                1
            } else {
                0
            }
        };
        let oob = EditError::OutOfBounds {
            local,
            size: chunk.size(),
        };
        let reach = -1..=n;
        if !(reach.contains(&local.x) && reach.contains(&local.y) && reach.contains(&local.z)) {
            return Err(oob);
        }
        let d = IVec3::new(step(local.x), step(local.y), step(local.z));
        let face = Face::from_delta(d).ok_or(oob)?;
        let wrapped = local - d.scale(n);
        if !chunk.is_linked(face) {
            return Ok(None);
        }
        let other = coord.offset(d.x, d.y, d.z);
        Ok(self.store.is_loaded(other).then_some((other, wrapped)))
    }

    fn push_adjacent(&self, coord: ChunkCoord, local: IVec3, queue: &mut VecDeque<(ChunkCoord, IVec3)>) {
        for face in Face::ALL {
            if let Ok(Some(p)) = self.redirect(coord, local + face.delta()) {
                queue.push_back(p);
            }
        }
    }

    /// Gravity check: a falling kind with resolvable air directly below.
    fn is_unsupported(&self, coord: ChunkCoord, local: IVec3) -> bool {
        let Some(kind) = self.store.get(coord).and_then(|c| c.get(local)) else {
            return false;
        };
        if !kind.falls_under_gravity() {
            return false;
        }
        match self.redirect(coord, local + Face::NegY.delta()) {
            Ok(Some((bc, bl))) => self.store.get(bc).and_then(|c| c.get(bl)) == Some(BlockKind::Air),
            _ => false,
        }
    }

    fn cascade(&mut self, mut queue: VecDeque<(ChunkCoord, IVec3)>, out: &mut EditOutcome) -> Result<(), EditError> {
        while let Some((c, l)) = queue.pop_front() {
            if !self.is_unsupported(c, l) {
                continue;
            }
            let world = self.remove(c, l, Vec3::DOWN, out)?;
            log::trace!(target: "edit", "collapse at {:?}", world);
            out.collapsed.push(world);
            self.push_adjacent(c, l, &mut queue);
        }
        Ok(())
    }

    /// Clears one voxel, flags chunks, and fires the debris hook. Returns the
    /// world position.
    fn remove(
        &mut self,
        coord: ChunkCoord,
        local: IVec3,
        direction: Vec3,
        out: &mut EditOutcome,
    ) -> Result<IVec3, EditError> {
        let chunk = self.store.get_mut(coord).ok_or(EditError::ChunkNotLoaded(coord))?;
        let prev = chunk.set(local, BlockKind::Air)?;
        let world = chunk.origin() + local;
        self.mark_affected(coord, local, out);
        self.debris.spawn(DebrisEvent {
            voxel: world,
            direction,
            side: self.registry.atlas_coord(prev, FaceRole::Side),
            kind: prev,
        });
        Ok(world)
    }

    /// Marks the edited chunk dirty, plus each linked neighbor whose border
    /// touches `local`.
    fn mark_affected(&mut self, coord: ChunkCoord, local: IVec3, out: &mut EditOutcome) {
        let Some(chunk) = self.store.get_mut(coord) else {
            return;
        };
        chunk.mark_dirty();
        out.dirty(coord);
        let size = chunk.size();
        let links = chunk.neighbors();
        for face in links.linked_faces() {
            if !face.on_boundary(local, size) {
                continue;
            }
            let d = face.delta();
            let other = coord.offset(d.x, d.y, d.z);
            if let Some(n) = self.store.get_mut(other) {
                n.mark_dirty();
                out.dirty(other);
            }
        }
    }
}
