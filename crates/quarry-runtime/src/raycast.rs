use quarry_geom::{IVec3, Vec3};
use quarry_world::ChunkCoord;

use crate::store::ChunkStore;

/// First solid voxel along a ray. Voxels are centered on integer positions.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit {
    /// World voxel that was hit.
    pub voxel: IVec3,
    /// Last empty voxel before the hit.
    pub prev: IVec3,
    /// Outward normal of the entered face; zero if the ray starts inside a solid.
    pub normal: IVec3,
    /// Entry point on the hit face.
    pub point: Vec3,
    pub distance: f32,
}

/// A hit resolved against the chunk store: the owning chunk of the hit voxel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PickHit {
    pub hit: RayHit,
    pub chunk: ChunkCoord,
}

/// Longest walk taken for an unbounded or huge `max_dist`.
pub const MAX_RAY_DISTANCE: f32 = 4096.0;

#[inline]
fn inv_or_max(v: f32) -> f32 {
    if v.abs() < 1e-8 { f32::MAX } else { 1.0 / v.abs() }
}

/// Grid walk (Amanatides-Woo) from `origin` along `dir` for at most `max_dist`.
pub fn raycast_first_hit<F>(origin: Vec3, dir: Vec3, max_dist: f32, mut is_solid: F) -> Option<RayHit>
where
    F: FnMut(IVec3) -> bool,
{
    let len = dir.length();
    if len < 1e-6 {
        return None;
    }
    let d = dir / len;
    // Shift so voxel cells become [v, v + 1).
    let o = origin + Vec3::splat(0.5);
    let mut v = o.floor_to_ivec();

    let step = |c: f32| if c > 0.0 { 1 } else if c < 0.0 { -1 } else { 0 };
    let s = IVec3::new(step(d.x), step(d.y), step(d.z));
    let (invx, invy, invz) = (inv_or_max(d.x), inv_or_max(d.y), inv_or_max(d.z));
    let tdx = if s.x == 0 { f32::MAX } else { invx };
    let tdy = if s.y == 0 { f32::MAX } else { invy };
    let tdz = if s.z == 0 { f32::MAX } else { invz };

    let frac = |c: f32| c - c.floor();
    let first = |st: i32, f: f32, inv: f32| {
        if st > 0 {
            (1.0 - f) * inv
        } else if st < 0 {
            f * inv
        } else {
            f32::MAX
        }
    };
    let mut tmx = first(s.x, frac(o.x), invx);
    let mut tmy = first(s.y, frac(o.y), invy);
    let mut tmz = first(s.z, frac(o.z), invz);

    let mut prev = v;
    let mut t = 0.0f32;
    let max_dist = if max_dist.is_nan() { 0.0 } else { max_dist.clamp(0.0, MAX_RAY_DISTANCE) };
    let max_steps = (max_dist as usize + 1) * 3;
    for _ in 0..=max_steps {
        if t > max_dist {
            break;
        }
        if is_solid(v) {
            return Some(RayHit {
                voxel: v,
                prev,
                normal: prev - v,
                point: origin + d * t,
                distance: t,
            });
        }
        prev = v;
        if tmx < tmy {
            if tmx < tmz {
                v.x += s.x;
                t = tmx;
                tmx += tdx;
            } else {
                v.z += s.z;
                t = tmz;
                tmz += tdz;
            }
        } else if tmy < tmz {
            v.y += s.y;
            t = tmy;
            tmy += tdy;
        } else {
            v.z += s.z;
            t = tmz;
            tmz += tdz;
        }
    }
    None
}

/// Raycast over loaded chunks; unloaded space counts as empty.
pub fn pick(store: &ChunkStore, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<PickHit> {
    let hit = raycast_first_hit(origin, dir, max_dist, |v| {
        store.voxel_at(v).is_some_and(|k| k.is_solid())
    })?;
    Some(PickHit {
        hit,
        chunk: ChunkCoord::containing_voxel(hit.voxel, store.chunk_size()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn straight_down_hits_top_face() {
        let hit = raycast_first_hit(Vec3::new(0.2, 10.0, -0.3), Vec3::DOWN, 32.0, |v| v.y <= 3).unwrap();
        assert_eq!(hit.voxel, IVec3::new(0, 3, 0));
        assert_eq!(hit.normal, IVec3::new(0, 1, 0));
        assert!((hit.point.y - 3.5).abs() < 1e-5);
        assert!((hit.distance - 6.5).abs() < 1e-5);
    }

    #[test]
    fn sideways_hit_reports_face_normal() {
        let hit = raycast_first_hit(Vec3::new(0.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0), 10.0, |v| v.x == -4).unwrap();
        assert_eq!(hit.voxel, IVec3::new(-4, 0, 0));
        assert_eq!(hit.prev, IVec3::new(-3, 0, 0));
        assert_eq!(hit.normal, IVec3::new(1, 0, 0));
        assert!((hit.point.x + 3.5).abs() < 1e-5);
    }

    #[test]
    fn range_and_degenerate_direction_miss() {
        assert!(raycast_first_hit(Vec3::ZERO, Vec3::UP, 2.0, |v| v.y == 5).is_none());
        assert!(raycast_first_hit(Vec3::ZERO, Vec3::ZERO, 2.0, |_| true).is_none());
    }

    #[test]
    fn unbounded_range_is_capped() {
        let hit = raycast_first_hit(Vec3::new(0.0, 10.0, 0.0), Vec3::DOWN, f32::INFINITY, |v| v.y <= 3).unwrap();
        assert_eq!(hit.voxel, IVec3::new(0, 3, 0));
        assert!((hit.distance - 6.5).abs() < 1e-5);

        let mut visited = 0usize;
        let miss = raycast_first_hit(Vec3::ZERO, Vec3::UP, f32::MAX, |_| {
            visited += 1;
            false
        });
        assert!(miss.is_none());
        assert!(visited <= (MAX_RAY_DISTANCE as usize + 1) * 3 + 1);
        assert!(raycast_first_hit(Vec3::ZERO, Vec3::UP, f32::NAN, |v| v.y == 1).is_none());
    }
}
