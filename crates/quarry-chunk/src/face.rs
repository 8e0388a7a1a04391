use quarry_blocks::FaceRole;
use quarry_geom::{IVec3, Vec3};

/// One of the six axis-aligned directions out of a voxel or chunk.
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Face {
    PosY = 0,
    NegY = 1,
    PosX = 2,
    NegX = 3,
    PosZ = 4,
    NegZ = 5,
}

impl Face {
    pub const ALL: [Face; 6] = [
        Face::PosY,
        Face::NegY,
        Face::PosX,
        Face::NegX,
        Face::PosZ,
        Face::NegZ,
    ];

    /// Returns the `[0..6)` index of this face.
    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Converts a face index `[0..6)` back into a `Face` value.
    #[inline]
    pub fn from_index(i: usize) -> Option<Face> {
        Face::ALL.get(i).copied()
    }

    #[inline]
    pub fn opposite(self) -> Face {
        match self {
            Face::PosY => Face::NegY,
            Face::NegY => Face::PosY,
            Face::PosX => Face::NegX,
            Face::NegX => Face::PosX,
            Face::PosZ => Face::NegZ,
            Face::NegZ => Face::PosZ,
        }
    }

    /// Integer grid step taken when leaving through this face.
    #[inline]
    pub fn delta(self) -> IVec3 {
        match self {
            Face::PosY => IVec3::new(0, 1, 0),
            Face::NegY => IVec3::new(0, -1, 0),
            Face::PosX => IVec3::new(1, 0, 0),
            Face::NegX => IVec3::new(-1, 0, 0),
            Face::PosZ => IVec3::new(0, 0, 1),
            Face::NegZ => IVec3::new(0, 0, -1),
        }
    }

    #[inline]
    pub fn normal(self) -> Vec3 {
        self.delta().as_vec3()
    }

    /// Face whose delta equals `d`, if `d` is a unit axis step.
    pub fn from_delta(d: IVec3) -> Option<Face> {
        Face::ALL.into_iter().find(|f| f.delta() == d)
    }

    /// Classifies the face into top/bottom/side role for atlas lookup.
    #[inline]
    pub fn role(self) -> FaceRole {
        match self {
            Face::PosY => FaceRole::Top,
            Face::NegY => FaceRole::Bottom,
            _ => FaceRole::Side,
        }
    }

    /// Chunk-relation name: top, bottom, left, right, front, back.
    pub fn name(self) -> &'static str {
        match self {
            Face::PosY => "top",
            Face::NegY => "bottom",
            Face::NegX => "left",
            Face::PosX => "right",
            Face::PosZ => "front",
            Face::NegZ => "back",
        }
    }

    /// Whether local voxel `p` sits on this face's boundary layer of a chunk of `size`.
    #[inline]
    pub fn on_boundary(self, p: IVec3, size: usize) -> bool {
        let last = size as i32 - 1;
        match self {
            Face::PosY => p.y == last,
            Face::NegY => p.y == 0,
            Face::PosX => p.x == last,
            Face::NegX => p.x == 0,
            Face::PosZ => p.z == last,
            Face::NegZ => p.z == 0,
        }
    }

    /// Local position in the neighbor across this face of the voxel one step past `p`.
    #[inline]
    pub fn wrap_into_neighbor(self, p: IVec3, size: usize) -> IVec3 {
        let n = size as i32;
        let q = p + self.delta();
        IVec3::new(q.x.rem_euclid(n), q.y.rem_euclid(n), q.z.rem_euclid(n))
    }
}
