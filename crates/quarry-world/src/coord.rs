use quarry_geom::{IVec3, Vec3};
use serde::{Deserialize, Serialize};

/// Chunk-grid cell; one unit is one chunk edge length.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkCoord {
    pub cx: i32,
    pub cy: i32,
    pub cz: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(cx: i32, cy: i32, cz: i32) -> Self {
        Self { cx, cy, cz }
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32, dz: i32) -> Self {
        Self {
            cx: self.cx + dx,
            cy: self.cy + dy,
            cz: self.cz + dz,
        }
    }

    #[inline]
    pub fn distance_sq(self, other: ChunkCoord) -> i64 {
        let dx = i64::from(self.cx - other.cx);
        let dy = i64::from(self.cy - other.cy);
        let dz = i64::from(self.cz - other.cz);
        dx * dx + dy * dy + dz * dz
    }

    /// World-space voxel position of local voxel (0, 0, 0).
    #[inline]
    pub fn origin(self, size: usize) -> IVec3 {
        let n = size as i32;
        IVec3::new(self.cx * n, self.cy * n, self.cz * n)
    }

    /// Chunk containing the world voxel `v`.
    #[inline]
    pub fn containing_voxel(v: IVec3, size: usize) -> Self {
        let n = size as i32;
        Self::new(v.x.div_euclid(n), v.y.div_euclid(n), v.z.div_euclid(n))
    }

    /// Reference-point conversion: `floor((pos - half_extent) / size)` per axis.
    pub fn from_reference_point(pos: Vec3, half_extent: f32, size: usize) -> Self {
        let n = size as f32;
        Self::new(
            ((pos.x - half_extent) / n).floor() as i32,
            ((pos.y - half_extent) / n).floor() as i32,
            ((pos.z - half_extent) / n).floor() as i32,
        )
    }
}

impl std::ops::Add for ChunkCoord {
    type Output = ChunkCoord;
    fn add(self, rhs: ChunkCoord) -> ChunkCoord {
        self.offset(rhs.cx, rhs.cy, rhs.cz)
    }
}

impl std::ops::Sub for ChunkCoord {
    type Output = ChunkCoord;
    fn sub(self, rhs: ChunkCoord) -> ChunkCoord {
        self.offset(-rhs.cx, -rhs.cy, -rhs.cz)
    }
}

impl std::fmt::Display for ChunkCoord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.cx, self.cy, self.cz)
    }
}

impl From<(i32, i32, i32)> for ChunkCoord {
    fn from(value: (i32, i32, i32)) -> Self {
        Self::new(value.0, value.1, value.2)
    }
}

impl From<ChunkCoord> for (i32, i32, i32) {
    fn from(value: ChunkCoord) -> Self {
        (value.cx, value.cy, value.cz)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_sub_are_componentwise() {
        let a = ChunkCoord::new(1, -2, 3);
        let b = ChunkCoord::new(-4, 5, 6);
        assert_eq!(a + b, ChunkCoord::new(-3, 3, 9));
        assert_eq!((a + b) - b, a);
    }

    #[test]
    fn containing_voxel_floors_negative_positions() {
        assert_eq!(
            ChunkCoord::containing_voxel(IVec3::new(-1, 0, 15), 16),
            ChunkCoord::new(-1, 0, 0)
        );
        assert_eq!(
            ChunkCoord::containing_voxel(IVec3::new(-16, -17, 16), 16),
            ChunkCoord::new(-1, -2, 1)
        );
    }

    #[test]
    fn reference_point_subtracts_half_extent() {
        let c = ChunkCoord::from_reference_point(Vec3::new(8.0, 7.9, 40.0), 8.0, 16);
        assert_eq!(c, ChunkCoord::new(0, -1, 2));
    }
}
