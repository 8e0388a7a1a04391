use quarry_blocks::{BlockKind, BlockRegistry};
use quarry_chunk::{Chunk, Face};
use quarry_geom::{IVec3, Vec3};
use quarry_world::ChunkCoord;

use crate::mesh_build::MeshBuild;

/// Adjacent chunks indexed by `Face::index()`; `None` where nothing is loaded.
pub type NeighborView<'a> = [Option<&'a Chunk>; 6];

/// Culled-face surface of one chunk in chunk-local space. Voxel `(x, y, z)`
/// spans `[x - 0.5, x + 0.5]` on each axis.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ChunkMesh {
    pub coord: ChunkCoord,
    pub build: MeshBuild,
}

impl ChunkMesh {
    #[inline]
    pub fn quad_count(&self) -> usize {
        self.build.quad_count()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.build.idx.is_empty()
    }
}

/// Corner offsets per face, in emission order.
fn face_corners(face: Face) -> [(f32, f32, f32); 4] {
    const H: f32 = 0.5;
    match face {
        Face::PosY => [(-H, H, H), (H, H, H), (H, H, -H), (-H, H, -H)],
        Face::NegY => [(-H, -H, -H), (H, -H, -H), (H, -H, H), (-H, -H, H)],
        Face::NegX => [(-H, H, H), (-H, H, -H), (-H, -H, -H), (-H, -H, H)],
        Face::PosX => [(H, H, -H), (H, H, H), (H, -H, H), (H, -H, -H)],
        Face::NegZ => [(-H, H, -H), (H, H, -H), (H, -H, -H), (-H, -H, -H)],
        Face::PosZ => [(H, H, H), (-H, H, H), (-H, -H, H), (H, -H, H)],
    }
}

/// Kind of the voxel one step past `p` through `face`. Crossing the chunk edge
/// reads the linked neighbor's border voxel; `None` means no linked neighbor.
#[inline]
pub fn neighbor_voxel(chunk: &Chunk, neighbors: &NeighborView<'_>, p: IVec3, face: Face) -> Option<BlockKind> {
    let q = p + face.delta();
    if chunk.in_bounds(q) {
        return chunk.get(q);
    }
    if !chunk.is_linked(face) {
        return None;
    }
    let other = neighbors[face.index()]?;
    other.get(face.wrap_into_neighbor(p, chunk.size()))
}

/// Whether the face of solid voxel `p` toward `face` is exposed.
#[inline]
pub fn face_exposed(chunk: &Chunk, neighbors: &NeighborView<'_>, p: IVec3, face: Face) -> bool {
    matches!(neighbor_voxel(chunk, neighbors, p, face), Some(k) if k.is_air())
}

/// Emits one quad per exposed unit face of every solid voxel.
pub fn extract(chunk: &Chunk, neighbors: &NeighborView<'_>, reg: &BlockRegistry) -> ChunkMesh {
    let mut build = MeshBuild::default();
    extract_into(chunk, neighbors, reg, &mut build);
    ChunkMesh {
        coord: chunk.coord(),
        build,
    }
}

/// Same as `extract`, reusing `build`'s allocations.
pub fn extract_into(chunk: &Chunk, neighbors: &NeighborView<'_>, reg: &BlockRegistry, build: &mut MeshBuild) {
    build.clear_keep_capacity();
    let n = chunk.size();
    for y in 0..n {
        for z in 0..n {
            for x in 0..n {
                let kind = chunk.get_local(x, y, z);
                if kind.is_air() {
                    continue;
                }
                let p = IVec3::new(x as i32, y as i32, z as i32);
                let center = p.as_vec3();
                for face in Face::ALL {
                    if !face_exposed(chunk, neighbors, p, face) {
                        continue;
                    }
                    let Some(rect) = reg.uv_rect(kind, face.role()) else {
                        continue;
                    };
                    let corners =
                        face_corners(face).map(|(dx, dy, dz)| center + Vec3::new(dx, dy, dz));
                    build.add_quad_uv(corners, face.normal(), rect.corners);
                }
            }
        }
    }
    log::trace!(
        target: "mesh",
        "extracted {} quads for {}",
        build.quad_count(),
        chunk.coord()
    );
}

/// Reference count of (solid voxel, exposed direction) pairs.
pub fn count_exposed_faces(chunk: &Chunk, neighbors: &NeighborView<'_>) -> usize {
    let n = chunk.size() as i32;
    let mut total = 0;
    for y in 0..n {
        for z in 0..n {
            for x in 0..n {
                let p = IVec3::new(x, y, z);
                if chunk.get(p).is_some_and(|k| k.is_solid()) {
                    total += Face::ALL
                        .iter()
                        .filter(|f| face_exposed(chunk, neighbors, p, **f))
                        .count();
                }
            }
        }
    }
    total
}
