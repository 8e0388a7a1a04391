use std::error::Error;

use hashbrown::HashMap;
use quarry_blocks::{BlockKind, BlockRegistry};
use quarry_edit::target::pick_targets;
use quarry_edit::{BlockEditor, DebrisEvent, EditError};
use quarry_geom::{IVec3, Vec3};
use quarry_runtime::{Phase, RunningAverages, StreamConfig, VoxelWorld, pick};
use quarry_world::{ChunkCoord, ChunkSource, TerrainSynthesizer, WorldGenConfig};

fn stream_config(worldgen: &WorldGenConfig) -> StreamConfig {
    StreamConfig::from_section(&worldgen.stream, worldgen.chunk_size())
}

/// Moves the reference point from `from` to `to` over `ticks` steps, ticking
/// the streamer and regenerating dirty meshes once per step.
pub fn stream(
    worldgen: &WorldGenConfig,
    registry: BlockRegistry,
    ticks: usize,
    from: Vec3,
    to: Vec3,
) -> Result<(), Box<dyn Error>> {
    let source = TerrainSynthesizer::new(worldgen)?;
    let mut world = VoxelWorld::new(source, registry, stream_config(worldgen))?.with_reporter(RunningAverages::new());

    let steps = ticks.max(1);
    let mut deferred = 0;
    let mut remeshed = 0;
    for i in 0..steps {
        let t = if steps == 1 { 1.0 } else { i as f32 / (steps - 1) as f32 };
        world.set_reference(from + (to - from) * t);
        if world.tick().deferred {
            deferred += 1;
        }
        remeshed += world.remesh_dirty();
    }

    let stats = world.stats();
    let quads: usize = world
        .store()
        .loaded_coords()
        .into_iter()
        .filter_map(|c| world.store().mesh(c))
        .map(|m| m.quad_count())
        .sum();
    println!(
        "{} ticks: loaded={} free={} pending={} pool={}",
        steps, stats.loaded, stats.free, stats.pending, stats.pool_size
    );
    println!("quads={} remeshed={} deferred_ticks={}", quads, remeshed, deferred);
    for phase in Phase::ALL {
        let samples = world.reporter().samples(phase);
        if let Some(avg) = world.reporter().average(phase) {
            println!("{:<10} n={:<6} avg={:?}", phase.name(), samples, avg);
        }
    }
    Ok(())
}

/// Synthesizes `coord` and its six face neighbors, then prints the block
/// histogram and quad count of the center chunk.
pub fn inspect_chunk(worldgen: &WorldGenConfig, registry: BlockRegistry, coord: IVec3) -> Result<(), Box<dyn Error>> {
    let source = TerrainSynthesizer::new(worldgen)?;
    let cfg = StreamConfig {
        view_radius: 1,
        spherical: true,
        pool_size: 7,
        budget: 7,
        ..stream_config(worldgen)
    };
    let center = ChunkCoord::new(coord.x, coord.y, coord.z);
    let size = source.chunk_size();
    let mut world = VoxelWorld::new(source, registry, cfg)?;
    world.recenter(center);
    world.run_until_idle();

    let chunk = world.store().get(center).ok_or("center chunk failed to load")?;
    let mut histogram: HashMap<BlockKind, usize> = HashMap::new();
    for kind in chunk.blocks() {
        *histogram.entry(*kind).or_insert(0) += 1;
    }
    println!("chunk {} (size {}, origin {:?})", center, size, chunk.origin());
    for kind in BlockKind::ALL {
        if let Some(n) = histogram.get(&kind) {
            println!("  {:<7} {}", kind.name(), n);
        }
    }
    let quads = world.store().mesh(center).map_or(0, |m| m.quad_count());
    println!("quads={} linked={}", quads, chunk.neighbors().count());
    Ok(())
}

/// Streams around `at`, then repeatedly picks straight down from it and breaks
/// the first solid voxel, up to `depth` times.
pub fn dig(worldgen: &WorldGenConfig, registry: BlockRegistry, at: IVec3, depth: u32) -> Result<(), Box<dyn Error>> {
    let source = TerrainSynthesizer::new(worldgen)?;
    let cfg = stream_config(worldgen);
    let reach = (cfg.view_radius + 1) as f32 * worldgen.chunk_size() as f32;
    let mut world = VoxelWorld::new(source, registry, cfg)?;
    let origin = at.as_vec3();
    world.set_reference(origin);
    let ticks = world.run_until_idle();
    log::info!(target: "edit", "streamed {} chunks in {} ticks", world.stats().loaded, ticks);

    let size = world.store().chunk_size();
    let mut events: Vec<DebrisEvent> = Vec::new();
    let mut broken = 0;
    let mut collapsed = 0;
    let mut touched: Vec<ChunkCoord> = Vec::new();
    {
        let (store, registry) = world.edit_parts();
        let mut editor = BlockEditor::new(store, registry, &mut events);
        for _ in 0..depth {
            let Some(hit) = pick(editor.store(), origin, Vec3::DOWN, reach) else {
                log::info!(target: "edit", "nothing solid left below {:?}", at);
                break;
            };
            let (chunk, local, _) = pick_targets(&hit, size);
            match editor.break_block(chunk, local, Vec3::DOWN) {
                Ok(out) => {
                    broken += 1;
                    collapsed += out.collapsed.len();
                    for c in out.dirtied {
                        if !touched.contains(&c) {
                            touched.push(c);
                        }
                    }
                }
                Err(EditError::ChunkNotLoaded(c)) => {
                    log::info!(target: "edit", "shaft reached unloaded chunk {}", c);
                    break;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    let remeshed = world.remesh_dirty();

    println!(
        "broke {} voxels below {:?}; {} collapsed; {} chunks dirtied, {} remeshed",
        broken,
        at,
        collapsed,
        touched.len(),
        remeshed
    );
    let mut by_kind: HashMap<BlockKind, usize> = HashMap::new();
    for e in &events {
        *by_kind.entry(e.kind).or_insert(0) += 1;
    }
    for kind in BlockKind::ALL {
        if let Some(n) = by_kind.get(&kind) {
            println!("  debris {:<7} {}", kind.name(), n);
        }
    }
    Ok(())
}
