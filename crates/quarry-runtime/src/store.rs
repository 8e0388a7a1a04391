use std::collections::VecDeque;

use hashbrown::{HashMap, HashSet};
use quarry_blocks::{BlockKind, BlockRegistry};
use quarry_chunk::{Chunk, Face, LoadState};
use quarry_geom::IVec3;
use quarry_mesh_cpu::{ChunkMesh, NeighborView, extract};
use quarry_world::ChunkCoord;

/// Index of a pooled chunk slot.
pub type SlotId = usize;

/// One pooled chunk and its last extracted surface.
#[derive(Debug)]
pub struct ChunkSlot {
    pub chunk: Chunk,
    pub mesh: Option<ChunkMesh>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    pub pool_size: usize,
    pub free: usize,
    pub loading: usize,
    pub loaded: usize,
    pub pending: usize,
}

/// Fixed arena of chunk slots, the coordinate map of loaded chunks, the free
/// list, and the pending-load queue (nearest first).
///
/// Every slot is free, loading, or loaded. Map keys and pending coordinates
/// never overlap.
pub struct ChunkStore {
    chunk_size: usize,
    slots: Vec<ChunkSlot>,
    by_coord: HashMap<ChunkCoord, SlotId>,
    free: Vec<SlotId>,
    pending: VecDeque<ChunkCoord>,
    pending_set: HashSet<ChunkCoord>,
}

impl ChunkStore {
    /// Allocates every slot up front; nothing is allocated per load afterwards.
    pub fn new(chunk_size: usize, pool_size: usize) -> Self {
        let slots = (0..pool_size)
            .map(|_| ChunkSlot {
                chunk: Chunk::new_unloaded(chunk_size),
                mesh: None,
            })
            .collect();
        Self {
            chunk_size,
            slots,
            by_coord: HashMap::with_capacity(pool_size),
            // Reverse so slot 0 is handed out first.
            free: (0..pool_size).rev().collect(),
            pending: VecDeque::new(),
            pending_set: HashSet::new(),
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    #[inline]
    pub fn pool_size(&self) -> usize {
        self.slots.len()
    }

    pub fn stats(&self) -> PoolStats {
        let loading = self
            .slots
            .iter()
            .filter(|s| s.chunk.load_state() == LoadState::Loading)
            .count();
        PoolStats {
            pool_size: self.slots.len(),
            free: self.free.len(),
            loading,
            loaded: self.by_coord.len(),
            pending: self.pending.len(),
        }
    }

    // ---- slots ----

    /// Takes a free slot for `coord` and puts it in the loading state.
    pub fn acquire(&mut self, coord: ChunkCoord) -> Option<SlotId> {
        let id = self.free.pop()?;
        self.slots[id].chunk.begin_load(coord);
        Some(id)
    }

    /// Publishes a slot whose chunk finished loading under its coordinate.
    pub fn commit(&mut self, id: SlotId) {
        let coord = self.slots[id].chunk.coord();
        debug_assert!(self.slots[id].chunk.is_loaded());
        debug_assert!(!self.pending_set.contains(&coord));
        self.by_coord.insert(coord, id);
    }

    /// Resets a slot and returns it to the free list.
    pub fn release(&mut self, id: SlotId) {
        let slot = &mut self.slots[id];
        slot.chunk.unload();
        slot.mesh = None;
        self.free.push(id);
    }

    #[inline]
    pub fn slot_chunk_mut(&mut self, id: SlotId) -> &mut Chunk {
        &mut self.slots[id].chunk
    }

    // ---- lookup ----

    #[inline]
    pub fn is_loaded(&self, coord: ChunkCoord) -> bool {
        self.by_coord.contains_key(&coord)
    }

    #[inline]
    pub fn slot_of(&self, coord: ChunkCoord) -> Option<SlotId> {
        self.by_coord.get(&coord).copied()
    }

    pub fn get(&self, coord: ChunkCoord) -> Option<&Chunk> {
        let id = self.slot_of(coord)?;
        Some(&self.slots[id].chunk)
    }

    pub fn get_mut(&mut self, coord: ChunkCoord) -> Option<&mut Chunk> {
        let id = self.slot_of(coord)?;
        Some(&mut self.slots[id].chunk)
    }

    pub fn mesh(&self, coord: ChunkCoord) -> Option<&ChunkMesh> {
        let id = self.slot_of(coord)?;
        self.slots[id].mesh.as_ref()
    }

    /// Loaded chunks in coordinate order.
    pub fn loaded(&self) -> impl Iterator<Item = (ChunkCoord, &Chunk)> {
        let mut coords: Vec<_> = self.by_coord.iter().map(|(c, id)| (*c, *id)).collect();
        coords.sort_unstable_by_key(|(c, _)| *c);
        coords
            .into_iter()
            .map(move |(c, id)| (c, &self.slots[id].chunk))
    }

    pub fn loaded_coords(&self) -> Vec<ChunkCoord> {
        self.loaded().map(|(c, _)| c).collect()
    }

    /// Voxel at a world position, `None` when its chunk is not loaded.
    pub fn voxel_at(&self, world: IVec3) -> Option<BlockKind> {
        let coord = ChunkCoord::containing_voxel(world, self.chunk_size);
        let chunk = self.get(coord)?;
        chunk.get(world - chunk.origin())
    }

    /// Loaded chunks adjacent to `coord`, indexed by `Face::index()`.
    pub fn neighbors_of(&self, coord: ChunkCoord) -> NeighborView<'_> {
        std::array::from_fn(|i| {
            let d = Face::ALL[i].delta();
            self.get(coord.offset(d.x, d.y, d.z))
        })
    }

    // ---- linking ----

    /// Links `coord` with every loaded neighbor on both sides and marks those
    /// neighbors dirty. Returns the coordinates that were linked.
    pub fn link_neighbors(&mut self, coord: ChunkCoord) -> Vec<ChunkCoord> {
        let Some(id) = self.slot_of(coord) else {
            return Vec::new();
        };
        let mut linked = Vec::new();
        for face in Face::ALL {
            let d = face.delta();
            let other = coord.offset(d.x, d.y, d.z);
            let Some(oid) = self.slot_of(other) else {
                continue;
            };
            self.slots[id].chunk.link(face);
            let neighbor = &mut self.slots[oid].chunk;
            neighbor.link(face.opposite());
            neighbor.mark_dirty();
            linked.push(other);
        }
        linked
    }

    /// Unloads `coord`: severs links on both sides, marks former neighbors dirty
    /// (their faces toward it become suppressed), and frees the slot.
    pub fn unload(&mut self, coord: ChunkCoord) -> bool {
        let Some(id) = self.by_coord.remove(&coord) else {
            return false;
        };
        let links = self.slots[id].chunk.neighbors();
        for face in links.linked_faces() {
            let d = face.delta();
            if let Some(neighbor) = self.get_mut(coord.offset(d.x, d.y, d.z)) {
                neighbor.unlink(face.opposite());
                neighbor.mark_dirty();
            }
        }
        self.release(id);
        true
    }

    // ---- pending queue ----

    #[inline]
    pub fn is_pending(&self, coord: ChunkCoord) -> bool {
        self.pending_set.contains(&coord)
    }

    #[inline]
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn pending(&self) -> impl Iterator<Item = ChunkCoord> + '_ {
        self.pending.iter().copied()
    }

    /// Queues `coord` behind every pending coordinate at the same or smaller
    /// distance from `reference`. No-op if already loaded or pending.
    pub fn request_load(&mut self, coord: ChunkCoord, reference: ChunkCoord) -> bool {
        if self.is_loaded(coord) || self.is_pending(coord) {
            return false;
        }
        let d = coord.distance_sq(reference);
        let at = self
            .pending
            .iter()
            .position(|c| c.distance_sq(reference) > d)
            .unwrap_or(self.pending.len());
        self.pending.insert(at, coord);
        self.pending_set.insert(coord);
        true
    }

    pub fn pop_pending(&mut self) -> Option<ChunkCoord> {
        let c = self.pending.pop_front()?;
        self.pending_set.remove(&c);
        Some(c)
    }

    /// Puts a coordinate back at the head of the queue (deferred load).
    pub fn requeue_front(&mut self, coord: ChunkCoord) {
        if self.pending_set.insert(coord) {
            self.pending.push_front(coord);
        }
    }

    pub fn clear_pending(&mut self) {
        self.pending.clear();
        self.pending_set.clear();
    }

    // ---- meshes ----

    /// Re-extracts the mesh of a loaded chunk and clears its dirty flag.
    pub fn rebuild_mesh(&mut self, coord: ChunkCoord, reg: &BlockRegistry) -> bool {
        let Some(id) = self.slot_of(coord) else {
            return false;
        };
        let mesh = extract(&self.slots[id].chunk, &self.neighbors_of(coord), reg);
        let slot = &mut self.slots[id];
        slot.mesh = Some(mesh);
        slot.chunk.clear_dirty();
        true
    }

    pub fn dirty_coords(&self) -> Vec<ChunkCoord> {
        self.loaded()
            .filter(|(_, c)| c.is_mesh_dirty())
            .map(|(c, _)| c)
            .collect()
    }

    /// Rebuilds every dirty loaded mesh; returns how many were rebuilt.
    pub fn remesh_dirty(&mut self, reg: &BlockRegistry) -> usize {
        let dirty = self.dirty_coords();
        for c in &dirty {
            self.rebuild_mesh(*c, reg);
        }
        dirty.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_world::VoxelGrid;

    fn load(store: &mut ChunkStore, coord: ChunkCoord) -> SlotId {
        let id = store.acquire(coord).unwrap();
        let grid = VoxelGrid::new_air(store.chunk_size());
        store.slot_chunk_mut(id).finish_load(&grid);
        store.commit(id);
        store.link_neighbors(coord);
        id
    }

    #[test]
    fn accounting_covers_the_pool() {
        let mut s = ChunkStore::new(2, 3);
        let stats = s.stats();
        assert_eq!((stats.free, stats.loading, stats.loaded), (3, 0, 0));
        let id = s.acquire(ChunkCoord::new(0, 0, 0)).unwrap();
        let stats = s.stats();
        assert_eq!((stats.free, stats.loading, stats.loaded), (2, 1, 0));
        s.slot_chunk_mut(id).finish_load(&VoxelGrid::new_air(2));
        s.commit(id);
        let stats = s.stats();
        assert_eq!((stats.free, stats.loading, stats.loaded), (2, 0, 1));
        assert!(s.unload(ChunkCoord::new(0, 0, 0)));
        assert!(!s.unload(ChunkCoord::new(0, 0, 0)));
        assert_eq!(s.stats().free, 3);
    }

    #[test]
    fn links_are_symmetric_and_severed_on_unload() {
        let mut s = ChunkStore::new(2, 4);
        let a = ChunkCoord::new(0, 0, 0);
        let b = ChunkCoord::new(1, 0, 0);
        load(&mut s, a);
        s.get_mut(a).unwrap().clear_dirty();
        load(&mut s, b);
        assert!(s.get(a).unwrap().is_linked(Face::PosX));
        assert!(s.get(b).unwrap().is_linked(Face::NegX));
        assert!(s.get(a).unwrap().is_mesh_dirty());
        s.get_mut(a).unwrap().clear_dirty();
        s.unload(b);
        assert!(!s.get(a).unwrap().is_linked(Face::PosX));
        assert!(s.get(a).unwrap().is_mesh_dirty());
    }

    #[test]
    fn pending_is_distance_ordered_and_stable() {
        let mut s = ChunkStore::new(2, 1);
        let r = ChunkCoord::new(0, 0, 0);
        assert!(s.request_load(ChunkCoord::new(2, 0, 0), r));
        assert!(s.request_load(ChunkCoord::new(0, 1, 0), r));
        assert!(s.request_load(ChunkCoord::new(1, 0, 0), r));
        assert!(s.request_load(ChunkCoord::new(0, 0, 0), r));
        assert!(!s.request_load(ChunkCoord::new(1, 0, 0), r));
        let order: Vec<_> = s.pending().collect();
        assert_eq!(
            order,
            vec![
                ChunkCoord::new(0, 0, 0),
                ChunkCoord::new(0, 1, 0),
                ChunkCoord::new(1, 0, 0),
                ChunkCoord::new(2, 0, 0),
            ]
        );
        let head = s.pop_pending().unwrap();
        s.requeue_front(head);
        assert_eq!(s.pop_pending(), Some(ChunkCoord::new(0, 0, 0)));
        assert!(!s.is_pending(ChunkCoord::new(0, 0, 0)));
    }

    #[test]
    fn voxel_lookup_crosses_chunks() {
        let mut s = ChunkStore::new(4, 2);
        load(&mut s, ChunkCoord::new(-1, 0, 0));
        s.get_mut(ChunkCoord::new(-1, 0, 0))
            .unwrap()
            .set(IVec3::new(3, 2, 1), BlockKind::Coal)
            .unwrap();
        assert_eq!(s.voxel_at(IVec3::new(-1, 2, 1)), Some(BlockKind::Coal));
        assert_eq!(s.voxel_at(IVec3::new(0, 2, 1)), None);
    }
}
