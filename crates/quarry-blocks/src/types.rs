use serde::{Deserialize, Serialize};

/// Closed catalog of voxel types. The discriminant is the stable type id.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum BlockKind {
    #[default]
    Air = 0,
    Stone = 1,
    Dirt = 2,
    Grass = 3,
    Gravel = 4,
    Coal = 5,
    Iron = 6,
}

impl BlockKind {
    pub const COUNT: usize = 7;

    pub const ALL: [BlockKind; BlockKind::COUNT] = [
        BlockKind::Air,
        BlockKind::Stone,
        BlockKind::Dirt,
        BlockKind::Grass,
        BlockKind::Gravel,
        BlockKind::Coal,
        BlockKind::Iron,
    ];

    #[inline]
    pub const fn id(self) -> u8 {
        self as u8
    }

    #[inline]
    pub fn from_id(id: u8) -> Option<BlockKind> {
        BlockKind::ALL.get(id as usize).copied()
    }

    #[inline]
    pub const fn is_air(self) -> bool {
        matches!(self, BlockKind::Air)
    }

    #[inline]
    pub const fn is_solid(self) -> bool {
        !self.is_air()
    }

    /// Kinds that collapse when the voxel below them becomes air.
    #[inline]
    pub const fn falls_under_gravity(self) -> bool {
        matches!(self, BlockKind::Gravel)
    }

    pub const fn name(self) -> &'static str {
        match self {
            BlockKind::Air => "air",
            BlockKind::Stone => "stone",
            BlockKind::Dirt => "dirt",
            BlockKind::Grass => "grass",
            BlockKind::Gravel => "gravel",
            BlockKind::Coal => "coal",
            BlockKind::Iron => "iron",
        }
    }

    pub fn from_name(name: &str) -> Option<BlockKind> {
        BlockKind::ALL.iter().copied().find(|k| k.name() == name)
    }
}

impl std::fmt::Display for BlockKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Which atlas region a face samples.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FaceRole {
    Top,
    Bottom,
    Side,
}

/// Cell position inside the texture atlas grid (column, row), row 0 at the top.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "[u32; 2]", into = "[u32; 2]")]
pub struct AtlasCoord {
    pub col: u32,
    pub row: u32,
}

impl AtlasCoord {
    #[inline]
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }
}

impl From<[u32; 2]> for AtlasCoord {
    fn from(v: [u32; 2]) -> Self {
        Self::new(v[0], v[1])
    }
}

impl From<AtlasCoord> for [u32; 2] {
    fn from(c: AtlasCoord) -> Self {
        [c.col, c.row]
    }
}
