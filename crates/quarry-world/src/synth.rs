use quarry_blocks::BlockKind;

use crate::config::{ConfigError, ElevationBand, Surface, WorldGenConfig, WorldGenMode};
use crate::coord::ChunkCoord;
use crate::noise::{Grid2, Grid3, NoiseField};

/// Block kinds for one chunk plus the horizontal layer directly above it.
/// `blocks` is indexed `(y * n + z) * n + x`; `above` is indexed `z * n + x`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct VoxelGrid {
    pub size: usize,
    pub blocks: Vec<BlockKind>,
    pub above: Vec<BlockKind>,
}

impl VoxelGrid {
    pub fn new_air(size: usize) -> Self {
        Self {
            size,
            blocks: vec![BlockKind::Air; size * size * size],
            above: vec![BlockKind::Air; size * size],
        }
    }

    #[inline]
    pub fn idx(&self, x: usize, y: usize, z: usize) -> usize {
        (y * self.size + z) * self.size + x
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize, z: usize) -> BlockKind {
        self.blocks[self.idx(x, y, z)]
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, z: usize, kind: BlockKind) {
        let i = self.idx(x, y, z);
        self.blocks[i] = kind;
    }

    /// Voxel at height `y` where `y == size` reads the layer above the chunk.
    #[inline]
    pub fn get_extended(&self, x: usize, y: usize, z: usize) -> BlockKind {
        if y == self.size {
            self.above[z * self.size + x]
        } else {
            self.get(x, y, z)
        }
    }

    pub fn count(&self, kind: BlockKind) -> usize {
        self.blocks.iter().filter(|&&b| b == kind).count()
    }
}

/// Anything that can fill a chunk's voxels from its coordinate alone.
pub trait ChunkSource {
    fn chunk_size(&self) -> usize;
    fn generate(&self, coord: ChunkCoord) -> VoxelGrid;
}

struct OreField {
    kind: BlockKind,
    field: NoiseField,
    threshold: f32,
}

/// Procedural terrain: relief and elevation noise blended into density, then
/// surface and ore passes. Output depends only on the config and the coordinate.
pub struct TerrainSynthesizer {
    size: usize,
    seed: i32,
    mode: WorldGenMode,
    band: ElevationBand,
    surface: Surface,
    relief_weight: f32,
    elevation_weight: f32,
    mountains: NoiseField,
    elevation: NoiseField,
    ores: [OreField; 3],
}

impl TerrainSynthesizer {
    pub fn new(cfg: &WorldGenConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let seed = cfg.seed;
        let ore = |kind, def: &crate::config::OreDef, offset: i32, name| -> Result<OreField, ConfigError> {
            Ok(OreField {
                kind,
                field: NoiseField::new(seed.wrapping_add(offset), def.noise.settings(name)?),
                threshold: def.threshold,
            })
        };
        let ores = [
            ore(BlockKind::Gravel, &cfg.ores.gravel, 1, "ores.gravel")?,
            ore(BlockKind::Coal, &cfg.ores.coal, 2, "ores.coal")?,
            ore(BlockKind::Iron, &cfg.ores.iron, 3, "ores.iron")?,
        ];
        log::info!(
            target: "worldgen",
            "terrain synthesizer ready: seed={} chunk_size={} mode={:?}",
            seed,
            cfg.chunk_size(),
            cfg.gen_mode()
        );
        Ok(Self {
            size: cfg.chunk_size(),
            seed,
            mode: cfg.gen_mode(),
            band: cfg.elevation_band.clone(),
            surface: cfg.surface.clone(),
            relief_weight: cfg.blend.relief,
            elevation_weight: cfg.blend.elevation,
            mountains: NoiseField::new(seed, cfg.mountains.settings("mountains")?),
            elevation: NoiseField::new(seed, cfg.elevation.settings("elevation")?),
            ores,
        })
    }

    #[inline]
    pub fn seed(&self) -> i32 {
        self.seed
    }

    #[inline]
    pub fn mode(&self) -> WorldGenMode {
        self.mode
    }

    /// Per-column threshold heights (world y) for the chunk's footprint.
    pub fn column_heights(&self, coord: ChunkCoord) -> Grid2 {
        let n = self.size;
        let o = coord.origin(n);
        let mut g = self
            .elevation
            .sample_2d(n, n, [f64::from(o.x), f64::from(o.z)]);
        for v in &mut g.data {
            *v = self.band.threshold_height(*v);
        }
        g
    }

    /// Final blended density over `n x (n + 1) x n`, the top row being the layer
    /// above the chunk. A voxel is solid iff its density is `>= 0`.
    pub fn density_field(&self, coord: ChunkCoord) -> Grid3 {
        let n = self.size;
        let o = coord.origin(n);
        if let WorldGenMode::Flat { thickness } = self.mode {
            let mut data = Vec::with_capacity(n * (n + 1) * n);
            for y in 0..=n {
                let solid = o.y + (y as i32) < thickness;
                data.extend(std::iter::repeat_n(if solid { 1.0 } else { -1.0 }, n * n));
            }
            return Grid3 {
                width: n,
                height: n + 1,
                depth: n,
                data,
            };
        }
        let heights = self.column_heights(coord);
        let mut relief =
            self.mountains
                .sample_3d(n, n + 1, n, [f64::from(o.x), f64::from(o.y), f64::from(o.z)]);
        let total = self.relief_weight + self.elevation_weight;
        for y in 0..=n {
            let wy = (o.y + y as i32) as f32;
            for z in 0..n {
                for x in 0..n {
                    let mask = if wy > heights.get(x, z) {
                        self.band.low
                    } else {
                        self.band.high
                    };
                    let i = relief.idx(x, y, z);
                    relief.data[i] =
                        (relief.data[i] * self.relief_weight + mask * self.elevation_weight) / total;
                }
            }
        }
        relief
    }

    pub fn synthesize(&self, coord: ChunkCoord) -> VoxelGrid {
        let n = self.size;
        let density = self.density_field(coord);
        let mut grid = VoxelGrid::new_air(n);
        for y in 0..=n {
            for z in 0..n {
                for x in 0..n {
                    if density.get(x, y, z) < 0.0 {
                        continue;
                    }
                    if y == n {
                        grid.above[z * n + x] = BlockKind::Stone;
                    } else {
                        grid.set(x, y, z, BlockKind::Stone);
                    }
                }
            }
        }
        if self.mode != WorldGenMode::Normal {
            return grid;
        }

        let o = coord.origin(n);
        let heights = self.column_heights(coord);
        reclassify_surface(&mut grid, o.y, &heights, &self.surface);

        for y in 0..n {
            for z in 0..n {
                for x in 0..n {
                    if grid.get(x, y, z) != BlockKind::Stone {
                        continue;
                    }
                    let (wx, wy, wz) = (
                        f64::from(o.x + x as i32),
                        f64::from(o.y + y as i32),
                        f64::from(o.z + z as i32),
                    );
                    if let Some(ore) = self
                        .ores
                        .iter()
                        .find(|ore| ore.field.value_3d(wx, wy, wz) > ore.threshold)
                    {
                        grid.set(x, y, z, ore.kind);
                    }
                }
            }
        }
        log::trace!(
            target: "worldgen",
            "synthesized {} solid={}",
            coord,
            grid.blocks.iter().filter(|b| b.is_solid()).count()
        );
        grid
    }
}

impl ChunkSource for TerrainSynthesizer {
    fn chunk_size(&self) -> usize {
        self.size
    }

    fn generate(&self, coord: ChunkCoord) -> VoxelGrid {
        self.synthesize(coord)
    }
}

/// Grass on each stone voxel exposed to air from above, with up to `dirt_depth`
/// dirt voxels beneath it. Columns outside the vertical band, and voxels more
/// than `deep_margin` below their column threshold, keep their stone.
pub fn reclassify_surface(grid: &mut VoxelGrid, origin_y: i32, heights: &Grid2, surface: &Surface) {
    let n = grid.size;
    for z in 0..n {
        for x in 0..n {
            let h = heights.get(x, z);
            for y in 0..n {
                if grid.get(x, y, z) != BlockKind::Stone || grid.get_extended(x, y + 1, z).is_solid() {
                    continue;
                }
                let wy = origin_y + y as i32;
                if wy < surface.band_min || wy > surface.band_max {
                    continue;
                }
                if (wy as f32) < h - surface.deep_margin as f32 {
                    continue;
                }
                grid.set(x, y, z, BlockKind::Grass);
                for d in 1..=surface.dirt_depth.min(y) {
                    if grid.get(x, y - d, z) != BlockKind::Stone {
                        break;
                    }
                    grid.set(x, y - d, z, BlockKind::Dirt);
                }
            }
        }
    }
}
