//! Local voxel targets from a pick hit (hit point plus surface normal).

use quarry_geom::{IVec3, Vec3};
use quarry_runtime::PickHit;
use quarry_world::ChunkCoord;

/// Nudge along the normal that moves a surface point off the shared face.
pub const PICK_EPSILON: f32 = 0.05;

/// Voxel behind the hit surface, local to the chunk at `chunk_origin`.
#[inline]
pub fn break_target(hit: Vec3, normal: Vec3, chunk_origin: IVec3) -> IVec3 {
    (hit - normal * PICK_EPSILON).round_to_ivec() - chunk_origin
}

/// Empty voxel in front of the hit surface. May lie one step outside the chunk.
#[inline]
pub fn place_target(hit: Vec3, normal: Vec3, chunk_origin: IVec3) -> IVec3 {
    (hit + normal * PICK_EPSILON).round_to_ivec() - chunk_origin
}

/// Both targets for a resolved pick, relative to the owning chunk.
pub fn pick_targets(pick: &PickHit, chunk_size: usize) -> (ChunkCoord, IVec3, IVec3) {
    let origin = pick.chunk.origin(chunk_size);
    let n = pick.hit.normal.as_vec3();
    (
        pick.chunk,
        break_target(pick.hit.point, n, origin),
        place_target(pick.hit.point, n, origin),
    )
}
