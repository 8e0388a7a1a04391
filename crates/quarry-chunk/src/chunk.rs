use quarry_blocks::BlockKind;
use quarry_geom::IVec3;
use quarry_world::{ChunkCoord, VoxelGrid};
use serde::{Deserialize, Serialize};

use crate::face::Face;
use crate::neighbors::NeighborLinks;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum LoadState {
    Unloaded,
    Loading,
    Loaded,
}

/// A local voxel position outside `[0, size)` on some axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LocalOutOfBounds {
    pub local: IVec3,
    pub size: usize,
}

impl std::fmt::Display for LocalOutOfBounds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "local voxel ({}, {}, {}) outside chunk of size {}",
            self.local.x, self.local.y, self.local.z, self.size
        )
    }
}

impl std::error::Error for LocalOutOfBounds {}

/// Serializable payload of a chunk: its coordinate and voxel type ids.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkSnapshot {
    pub coord: ChunkCoord,
    pub size: usize,
    pub voxels: Vec<u8>,
}

/// Pooled chunk slot. Storage is allocated once and reused across coordinates;
/// neighbor links are flags, resolved through the owning store by coordinate.
#[derive(Clone, Debug)]
pub struct Chunk {
    coord: ChunkCoord,
    size: usize,
    blocks: Vec<BlockKind>,
    neighbors: NeighborLinks,
    mesh_dirty: bool,
    load_state: LoadState,
}

impl Chunk {
    pub fn new_unloaded(size: usize) -> Self {
        Self {
            coord: ChunkCoord::default(),
            size,
            blocks: vec![BlockKind::Air; size * size * size],
            neighbors: NeighborLinks::empty(),
            mesh_dirty: false,
            load_state: LoadState::Unloaded,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    #[inline]
    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    #[inline]
    pub fn is_loaded(&self) -> bool {
        self.load_state == LoadState::Loaded
    }

    #[inline]
    pub fn neighbors(&self) -> NeighborLinks {
        self.neighbors
    }

    #[inline]
    pub fn is_mesh_dirty(&self) -> bool {
        self.mesh_dirty
    }

    #[inline]
    pub fn blocks(&self) -> &[BlockKind] {
        &self.blocks
    }

    /// World voxel position of local (0, 0, 0).
    #[inline]
    pub fn origin(&self) -> IVec3 {
        self.coord.origin(self.size)
    }

    /// Claims the slot for `coord`. Voxels stay hidden until `finish_load`.
    pub fn begin_load(&mut self, coord: ChunkCoord) {
        debug_assert_eq!(self.load_state, LoadState::Unloaded);
        self.coord = coord;
        self.neighbors = NeighborLinks::empty();
        self.load_state = LoadState::Loading;
    }

    /// Publishes a fully synthesized grid. The chunk becomes Loaded and needs a mesh.
    pub fn finish_load(&mut self, grid: &VoxelGrid) {
        debug_assert_eq!(grid.size, self.size);
        self.blocks.copy_from_slice(&grid.blocks);
        self.mesh_dirty = true;
        self.load_state = LoadState::Loaded;
    }

    /// Clears voxels, coordinate, and links; the slot can be reused.
    pub fn unload(&mut self) {
        self.blocks.fill(BlockKind::Air);
        self.coord = ChunkCoord::default();
        self.neighbors = NeighborLinks::empty();
        self.mesh_dirty = false;
        self.load_state = LoadState::Unloaded;
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size + z) * self.size + x
    }

    #[inline]
    pub fn in_bounds(&self, p: IVec3) -> bool {
        let n = self.size as i32;
        (0..n).contains(&p.x) && (0..n).contains(&p.y) && (0..n).contains(&p.z)
    }

    #[inline]
    pub fn get_local(&self, x: usize, y: usize, z: usize) -> BlockKind {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn get(&self, p: IVec3) -> Option<BlockKind> {
        if !self.in_bounds(p) {
            return None;
        }
        Some(self.get_local(p.x as usize, p.y as usize, p.z as usize))
    }

    /// Writes one voxel and returns the previous kind. Never wraps or clamps.
    pub fn set(&mut self, p: IVec3, kind: BlockKind) -> Result<BlockKind, LocalOutOfBounds> {
        if !self.in_bounds(p) {
            return Err(LocalOutOfBounds {
                local: p,
                size: self.size,
            });
        }
        let i = self.idx(p.x as usize, p.y as usize, p.z as usize);
        Ok(std::mem::replace(&mut self.blocks[i], kind))
    }

    #[inline]
    pub fn mark_dirty(&mut self) {
        self.mesh_dirty = true;
    }

    #[inline]
    pub fn clear_dirty(&mut self) {
        self.mesh_dirty = false;
    }

    #[inline]
    pub fn is_linked(&self, face: Face) -> bool {
        self.neighbors.get(face)
    }

    #[inline]
    pub fn link(&mut self, face: Face) {
        self.neighbors.set(face, true);
    }

    #[inline]
    pub fn unlink(&mut self, face: Face) {
        self.neighbors.set(face, false);
    }

    pub fn snapshot(&self) -> ChunkSnapshot {
        ChunkSnapshot {
            coord: self.coord,
            size: self.size,
            voxels: self.blocks.iter().map(|b| b.id()).collect(),
        }
    }
}

impl ChunkSnapshot {
    /// Voxel grid carried by the snapshot; unknown ids read as air.
    pub fn to_grid(&self) -> VoxelGrid {
        let mut grid = VoxelGrid::new_air(self.size);
        for (dst, id) in grid.blocks.iter_mut().zip(&self.voxels) {
            *dst = BlockKind::from_id(*id).unwrap_or(BlockKind::Air);
        }
        grid
    }
}
