use std::fs;
use std::path::Path;

use super::config::{BlocksConfig, FacesDef};
use super::types::{AtlasCoord, BlockKind, FaceRole};

/// Atlas cells a block kind samples for its top, bottom, and side faces.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AtlasEntry {
    pub top: AtlasCoord,
    pub bottom: AtlasCoord,
    pub side: AtlasCoord,
}

impl AtlasEntry {
    #[inline]
    pub fn for_role(&self, role: FaceRole) -> AtlasCoord {
        match role {
            FaceRole::Top => self.top,
            FaceRole::Bottom => self.bottom,
            FaceRole::Side => self.side,
        }
    }
}

/// Normalized texture rectangle of one atlas cell, corners in quad order
/// (top-left, top-right, bottom-right, bottom-left). V grows upward, so row 0
/// maps to the top of the texture.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct UvRect {
    pub corners: [(f32, f32); 4],
}

#[derive(Debug)]
pub enum RegistryError {
    ZeroAtlasGrid,
    UnknownKind(String),
    MissingKind(BlockKind),
    AtlasOutOfRange {
        kind: BlockKind,
        coord: AtlasCoord,
        grid: u32,
    },
    Io(std::io::Error),
    Parse(toml::de::Error),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ZeroAtlasGrid => write!(f, "atlas grid must have at least one cell"),
            RegistryError::UnknownKind(name) => write!(f, "unknown block kind '{}'", name),
            RegistryError::MissingKind(kind) => {
                write!(f, "block kind '{}' has no complete atlas entry", kind)
            }
            RegistryError::AtlasOutOfRange { kind, coord, grid } => write!(
                f,
                "atlas cell ({}, {}) for '{}' is outside the {}x{} grid",
                coord.col, coord.row, kind, grid, grid
            ),
            RegistryError::Io(e) => write!(f, "reading block config: {}", e),
            RegistryError::Parse(e) => write!(f, "parsing block config: {}", e),
        }
    }
}

impl std::error::Error for RegistryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RegistryError::Io(e) => Some(e),
            RegistryError::Parse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RegistryError {
    fn from(e: std::io::Error) -> Self {
        RegistryError::Io(e)
    }
}

impl From<toml::de::Error> for RegistryError {
    fn from(e: toml::de::Error) -> Self {
        RegistryError::Parse(e)
    }
}

/// Immutable atlas lookup for the block catalog, loaded once at startup.
#[derive(Clone, Debug)]
pub struct BlockRegistry {
    atlas_grid: u32,
    entries: [Option<AtlasEntry>; BlockKind::COUNT],
}

impl BlockRegistry {
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, RegistryError> {
        let cfg: BlocksConfig = toml::from_str(toml_str)?;
        Self::from_config(cfg)
    }

    pub fn from_config(cfg: BlocksConfig) -> Result<Self, RegistryError> {
        if cfg.atlas_grid == 0 {
            return Err(RegistryError::ZeroAtlasGrid);
        }
        let mut entries = [None; BlockKind::COUNT];
        for (name, def) in &cfg.blocks {
            let kind =
                BlockKind::from_name(name).ok_or_else(|| RegistryError::UnknownKind(name.clone()))?;
            let entry = compile_faces(kind, def)?;
            for coord in [entry.top, entry.bottom, entry.side] {
                if coord.col >= cfg.atlas_grid || coord.row >= cfg.atlas_grid {
                    return Err(RegistryError::AtlasOutOfRange {
                        kind,
                        coord,
                        grid: cfg.atlas_grid,
                    });
                }
            }
            entries[kind.id() as usize] = Some(entry);
        }
        // Every renderable kind must resolve; air never emits faces.
        for kind in BlockKind::ALL.into_iter().filter(|k| k.is_solid()) {
            if entries[kind.id() as usize].is_none() {
                return Err(RegistryError::MissingKind(kind));
            }
        }
        Ok(Self {
            atlas_grid: cfg.atlas_grid,
            entries,
        })
    }

    /// Default 4x4 atlas layout used when no block config is supplied.
    pub fn builtin() -> Self {
        let cell = AtlasCoord::new;
        let uniform = |c: AtlasCoord| AtlasEntry {
            top: c,
            bottom: c,
            side: c,
        };
        let mut entries = [None; BlockKind::COUNT];
        entries[BlockKind::Stone.id() as usize] = Some(uniform(cell(1, 0)));
        entries[BlockKind::Dirt.id() as usize] = Some(uniform(cell(2, 0)));
        entries[BlockKind::Grass.id() as usize] = Some(AtlasEntry {
            top: cell(0, 0),
            bottom: cell(2, 0),
            side: cell(3, 0),
        });
        entries[BlockKind::Gravel.id() as usize] = Some(uniform(cell(0, 1)));
        entries[BlockKind::Coal.id() as usize] = Some(uniform(cell(1, 1)));
        entries[BlockKind::Iron.id() as usize] = Some(uniform(cell(2, 1)));
        Self {
            atlas_grid: 4,
            entries,
        }
    }

    #[inline]
    pub fn atlas_grid(&self) -> u32 {
        self.atlas_grid
    }

    #[inline]
    pub fn entry(&self, kind: BlockKind) -> Option<&AtlasEntry> {
        self.entries[kind.id() as usize].as_ref()
    }

    #[inline]
    pub fn atlas_coord(&self, kind: BlockKind, role: FaceRole) -> Option<AtlasCoord> {
        self.entry(kind).map(|e| e.for_role(role))
    }

    /// Texture rectangle for `kind` on a face with `role`; `None` for air.
    pub fn uv_rect(&self, kind: BlockKind, role: FaceRole) -> Option<UvRect> {
        let coord = self.atlas_coord(kind, role)?;
        let inc = 1.0 / self.atlas_grid as f32;
        let u0 = coord.col as f32 * inc;
        let v0 = 1.0 - coord.row as f32 * inc;
        Some(UvRect {
            corners: [
                (u0, v0),
                (u0 + inc, v0),
                (u0 + inc, v0 - inc),
                (u0, v0 - inc),
            ],
        })
    }
}

impl Default for BlockRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

fn compile_faces(kind: BlockKind, def: &FacesDef) -> Result<AtlasEntry, RegistryError> {
    match (def.top_or_all(), def.bottom_or_all(), def.side_or_all()) {
        (Some(top), Some(bottom), Some(side)) => Ok(AtlasEntry { top, bottom, side }),
        _ => Err(RegistryError::MissingKind(kind)),
    }
}
