use std::process::Command;

use quarry_blocks::BlockKind;
use quarry_world::config::{Blend, ElevationBand, NoiseFieldDef};
use quarry_world::{ChunkCoord, ChunkSource, TerrainSynthesizer, WorldGenConfig};

fn load_assets_config() -> WorldGenConfig {
    let root = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    WorldGenConfig::load_from_path(root.join("../../assets/worldgen.toml")).unwrap()
}

fn example_config() -> WorldGenConfig {
    WorldGenConfig {
        seed: 1,
        chunk_size: 16,
        mountains: NoiseFieldDef::fractal(50.1, 4),
        ..WorldGenConfig::default()
    }
}

#[test]
fn density_grid_is_reproducible() {
    let cfg = example_config();
    let a = TerrainSynthesizer::new(&cfg).unwrap();
    let b = TerrainSynthesizer::new(&cfg).unwrap();
    let origin = ChunkCoord::new(0, 0, 0);
    let da = a.density_field(origin);
    let db = b.density_field(origin);
    assert_eq!((da.width, da.height, da.depth), (16, 17, 16));
    assert_eq!(da, db);
    assert_eq!(a.synthesize(origin), b.synthesize(origin));
}

const CHECKSUM_CHILD: &str = "QUARRY_TERRAIN_CHECKSUM_CHILD";

fn density_checksum() -> u64 {
    let synth = TerrainSynthesizer::new(&example_config()).unwrap();
    let mut h = 0xcbf2_9ce4_8422_2325u64;
    for coord in [ChunkCoord::new(0, 0, 0), ChunkCoord::new(-2, 1, 5)] {
        for d in synth.density_field(coord).data {
            h = (h ^ u64::from(d.to_bits())).wrapping_mul(0x0100_0000_01b3);
        }
        for b in synth.synthesize(coord).blocks {
            h = (h ^ b as u64).wrapping_mul(0x0100_0000_01b3);
        }
    }
    h
}

// Reruns this test in a fresh process and compares the checksums.
#[test]
fn density_checksum_matches_fresh_process() {
    if std::env::var_os(CHECKSUM_CHILD).is_some() {
        println!("checksum={};", density_checksum());
        return;
    }
    let out = Command::new(std::env::current_exe().unwrap())
        .args(["density_checksum_matches_fresh_process", "--exact", "--nocapture", "--test-threads=1"])
        .env(CHECKSUM_CHILD, "1")
        .output()
        .unwrap();
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    let child: u64 = stdout
        .split("checksum=")
        .nth(1)
        .and_then(|rest| rest.split(';').next())
        .unwrap()
        .parse()
        .unwrap();
    assert_eq!(child, density_checksum());
}

#[test]
fn deep_interior_voxel_is_solid() {
    // Threshold far above the chunk and a mask that dominates the relief range.
    let cfg = WorldGenConfig {
        elevation_band: ElevationBand {
            bottom: 500,
            high: 1.0,
            ..ElevationBand::default()
        },
        ..example_config()
    };
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    let density = synth.density_field(ChunkCoord::new(0, 0, 0));
    assert!(density.get(8, 8, 8) >= 0.0);
    assert!(density.data.iter().all(|d| *d >= 0.0));
    let grid = synth.synthesize(ChunkCoord::new(0, 0, 0));
    assert!(grid.get(8, 8, 8).is_solid());
    assert_eq!(grid.count(BlockKind::Air), 0);
}

#[test]
fn heightmap_terrain_gets_grass_and_dirt_cap() {
    let mut cfg = example_config();
    cfg.blend = Blend {
        relief: 0.0,
        elevation: 1.0,
    };
    cfg.elevation_band = ElevationBand {
        bottom: 5,
        height: 0,
        low: -1.0,
        high: 1.0,
        ..ElevationBand::default()
    };
    for ore in [&mut cfg.ores.gravel, &mut cfg.ores.coal, &mut cfg.ores.iron] {
        ore.threshold = 2.0;
    }
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    let g = synth.synthesize(ChunkCoord::new(3, 0, -2));
    for z in 0..16 {
        for x in 0..16 {
            assert_eq!(g.get(x, 6, z), BlockKind::Air);
            assert_eq!(g.get(x, 5, z), BlockKind::Grass);
            assert_eq!(g.get(x, 4, z), BlockKind::Dirt);
            assert_eq!(g.get(x, 3, z), BlockKind::Dirt);
            assert_eq!(g.get(x, 2, z), BlockKind::Stone);
        }
    }
}

#[test]
fn ores_leave_grass_and_dirt_alone() {
    let mut cfg = example_config();
    cfg.blend = Blend {
        relief: 0.0,
        elevation: 1.0,
    };
    cfg.elevation_band = ElevationBand {
        bottom: 5,
        height: 0,
        low: -1.0,
        high: 1.0,
        ..ElevationBand::default()
    };
    for ore in [&mut cfg.ores.gravel, &mut cfg.ores.coal, &mut cfg.ores.iron] {
        ore.threshold = -1.0;
    }
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    let g = synth.synthesize(ChunkCoord::new(3, 0, -2));
    for z in 0..16 {
        for x in 0..16 {
            assert_eq!(g.get(x, 6, z), BlockKind::Air);
            assert_eq!(g.get(x, 5, z), BlockKind::Grass);
            assert_eq!(g.get(x, 4, z), BlockKind::Dirt);
            assert_eq!(g.get(x, 3, z), BlockKind::Dirt);
            for y in 0..3 {
                assert_eq!(g.get(x, y, z), BlockKind::Gravel);
            }
        }
    }
    assert_eq!(g.count(BlockKind::Stone), 0);
    assert_eq!(g.count(BlockKind::Gravel), 16 * 16 * 3);
}

#[test]
fn ore_priority_is_gravel_then_coal_then_iron() {
    let mut cfg = example_config();
    cfg.elevation_band.bottom = 500;
    cfg.elevation_band.high = 1.0;
    cfg.ores.gravel.threshold = 2.0;
    cfg.ores.coal.threshold = -1.0;
    cfg.ores.iron.threshold = -1.0;
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    let g = synth.synthesize(ChunkCoord::new(0, 0, 0));
    assert_eq!(g.count(BlockKind::Coal), 16 * 16 * 16);

    cfg.ores.gravel.threshold = -1.0;
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    assert_eq!(synth.generate(ChunkCoord::new(0, 0, 0)).count(BlockKind::Gravel), 16 * 16 * 16);
}

#[test]
fn shipped_config_loads_and_synthesizes() {
    let cfg = load_assets_config();
    let synth = TerrainSynthesizer::new(&cfg).unwrap();
    assert_eq!(synth.chunk_size(), cfg.chunk_size());
    let g = synth.synthesize(ChunkCoord::new(0, 0, 0));
    assert_eq!(g.blocks.len(), cfg.chunk_size().pow(3));
}
