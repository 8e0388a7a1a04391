use std::collections::BTreeMap;

use serde::Deserialize;

use crate::types::AtlasCoord;

/// On-disk shape of `blocks.toml`.
#[derive(Clone, Debug, Deserialize)]
pub struct BlocksConfig {
    /// Cells per atlas side; the atlas is `atlas_grid x atlas_grid` cells.
    #[serde(default = "default_atlas_grid")]
    pub atlas_grid: u32,
    #[serde(default)]
    pub blocks: BTreeMap<String, FacesDef>,
}

fn default_atlas_grid() -> u32 {
    4
}

/// Per-face atlas selection. `all` backs any face left unset.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FacesDef {
    #[serde(default)]
    pub all: Option<AtlasCoord>,
    #[serde(default)]
    pub top: Option<AtlasCoord>,
    #[serde(default)]
    pub bottom: Option<AtlasCoord>,
    #[serde(default)]
    pub side: Option<AtlasCoord>,
}

impl FacesDef {
    pub fn top_or_all(&self) -> Option<AtlasCoord> {
        self.top.or(self.all)
    }

    pub fn bottom_or_all(&self) -> Option<AtlasCoord> {
        self.bottom.or(self.all)
    }

    pub fn side_or_all(&self) -> Option<AtlasCoord> {
        self.side.or(self.all)
    }
}
