use quarry_blocks::BlockRegistry;
use quarry_chunk::Face;
use quarry_geom::Vec3;
use quarry_runtime::{
    ChunkStore, ChunkStreamer, NoopReporter, Phase, RunningAverages, StreamConfig, StreamConfigError, VoxelWorld,
};
use quarry_world::{ChunkCoord, ChunkSource, TerrainSynthesizer, WorldGenConfig};

fn flat_source(size: i32) -> TerrainSynthesizer {
    let toml = format!("chunk_size = {}\nmode = \"flat\"\n[flat]\nthickness = 0\n", size);
    TerrainSynthesizer::new(&WorldGenConfig::from_toml_str(&toml).unwrap()).unwrap()
}

fn cfg(radius: i32, pool: usize, budget: usize) -> StreamConfig {
    StreamConfig {
        view_radius: radius,
        spherical: false,
        pool_size: pool,
        budget,
        half_extent: 2.0,
    }
}

fn assert_accounting(store: &ChunkStore) {
    let s = store.stats();
    assert_eq!(s.free + s.loading + s.loaded, s.pool_size);
    for c in store.pending() {
        assert!(!store.is_loaded(c), "{} both pending and loaded", c);
    }
}

#[test]
fn loaded_set_converges_to_desired_set() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 64, 4)).unwrap();
    let report = world.set_reference(Vec3::new(2.0, 2.0, 2.0)).unwrap();
    assert_eq!(report.center, ChunkCoord::new(0, 0, 0));
    assert_eq!(report.queued, 27);
    // ceil(27 / 4) ticks suffice.
    for _ in 0..7 {
        let r = world.tick();
        assert!(r.loaded.len() <= 4);
        assert!(!r.deferred);
        assert_accounting(world.store());
    }
    let loaded = world.store().loaded_coords();
    assert_eq!(loaded.len(), 27);
    assert!(loaded.iter().all(|c| world.streamer().is_desired(*c)));
    assert_eq!(world.stats().pending, 0);
    // Same reference chunk: nothing to recompute.
    assert!(world.set_reference(Vec3::new(3.9, 2.0, 2.0)).is_none());
}

#[test]
fn nearer_chunks_load_first() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(2, 200, 7)).unwrap();
    world.recenter(ChunkCoord::new(5, 0, 5));
    let first = world.tick();
    assert_eq!(first.loaded[0], ChunkCoord::new(5, 0, 5));
    let d: Vec<i64> = first
        .loaded
        .iter()
        .map(|c| c.distance_sq(ChunkCoord::new(5, 0, 5)))
        .collect();
    assert!(d.windows(2).all(|w| w[0] <= w[1]));
    assert_eq!(&d[1..], &[1, 1, 1, 1, 1, 1]);
}

#[test]
fn moving_unloads_stale_chunks_before_loading() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 27, 27)).unwrap();
    world.recenter(ChunkCoord::new(0, 0, 0));
    world.tick();
    assert_eq!(world.stats().free, 0);
    let r = world.recenter(ChunkCoord::new(1, 0, 0));
    assert_eq!(r.unloaded.len(), 9);
    assert!(r.unloaded.iter().all(|c| c.cx == -1));
    assert_eq!(r.queued, 9);
    assert_eq!(world.stats().free, 9);
    assert_accounting(world.store());
    let t = world.tick();
    assert_eq!(t.loaded.len(), 9);
    assert!(!t.deferred);
    assert_eq!(world.stats().loaded, 27);
}

#[test]
fn pending_loads_outside_new_set_are_cancelled() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 64, 1)).unwrap();
    world.recenter(ChunkCoord::new(0, 0, 0));
    world.tick();
    world.recenter(ChunkCoord::new(10, 0, 0));
    let pending: Vec<_> = world.store().pending().collect();
    assert_eq!(pending.len(), 27);
    assert!(pending.iter().all(|c| (9..=11).contains(&c.cx)));
    assert_eq!(world.stats().loaded, 0);
    assert_accounting(world.store());
}

#[test]
fn exhausted_pool_defers_without_dropping() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 5, 10)).unwrap();
    world.recenter(ChunkCoord::new(0, 0, 0));
    let t = world.tick();
    assert_eq!(t.loaded.len(), 5);
    assert!(t.deferred);
    assert_eq!(t.remaining, 22);
    let head = world.store().pending().next().unwrap();
    let again = world.tick();
    assert!(again.loaded.is_empty());
    assert!(again.deferred);
    assert_eq!(world.store().pending().next(), Some(head));
    assert_accounting(world.store());
}

#[test]
fn links_are_symmetric_and_meshes_refresh() {
    let mut world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 64, 64)).unwrap();
    world.recenter(ChunkCoord::new(0, -1, 0));
    let t = world.tick();
    assert_eq!(t.loaded.len(), 27);
    let store = world.store();
    for (coord, chunk) in store.loaded() {
        for face in Face::ALL {
            let d = face.delta();
            let other = coord.offset(d.x, d.y, d.z);
            let expect = store.is_loaded(other);
            assert_eq!(chunk.is_linked(face), expect, "{} {:?}", coord, face);
            if expect {
                assert!(store.get(other).unwrap().is_linked(face.opposite()));
            }
        }
        assert!(!chunk.is_mesh_dirty());
        assert!(store.mesh(coord).is_some());
    }
    // Ground below an air chunk shows its 16 top faces; buried ground shows none.
    assert_eq!(store.mesh(ChunkCoord::new(0, -1, 0)).unwrap().quad_count(), 16);
    assert_eq!(store.mesh(ChunkCoord::new(1, -1, 1)).unwrap().quad_count(), 16);
    assert!(store.mesh(ChunkCoord::new(0, -2, 0)).unwrap().is_empty());
    assert!(store.mesh(ChunkCoord::new(0, 0, 0)).unwrap().is_empty());
}

#[test]
fn ground_surface_faces_appear_once_air_neighbor_links() {
    let reg = BlockRegistry::builtin();
    let source = flat_source(4);
    let mut store = ChunkStore::new(4, 8);
    let mut streamer = ChunkStreamer::new(cfg(0, 8, 1)).unwrap();
    let mut rep = NoopReporter;
    let ground = ChunkCoord::new(0, -1, 0);
    streamer.recompute_target_set(&mut store, ground, &mut rep);
    streamer.tick(&mut store, &source, &reg, 1, &mut rep);
    assert_eq!(store.mesh(ground).unwrap().quad_count(), 0);
    assert!(store.request_load(ChunkCoord::new(0, 0, 0), ground));
    streamer.tick(&mut store, &source, &reg, 1, &mut rep);
    assert_eq!(store.mesh(ground).unwrap().quad_count(), 16);
    assert!(store.get(ground).unwrap().is_linked(Face::PosY));
    store.unload(ChunkCoord::new(0, 0, 0));
    assert!(store.get(ground).unwrap().is_mesh_dirty());
    assert_eq!(store.remesh_dirty(&reg), 1);
    assert_eq!(store.mesh(ground).unwrap().quad_count(), 0);
}

#[test]
fn phases_are_reported() {
    let world = VoxelWorld::new(flat_source(4), BlockRegistry::builtin(), cfg(1, 64, 64)).unwrap();
    let mut world = world.with_reporter(RunningAverages::new());
    world.recenter(ChunkCoord::new(0, 0, 0));
    world.tick();
    world.recenter(ChunkCoord::new(3, 0, 0));
    let r = world.reporter();
    assert_eq!(r.samples(Phase::Synthesize), 27);
    assert_eq!(r.samples(Phase::Extract), 27);
    assert_eq!(r.samples(Phase::Link), 27);
    assert_eq!(r.samples(Phase::Unload), 27);
}

#[test]
fn store_and_source_sizes_must_agree() {
    let err = VoxelWorld::with_store(flat_source(4), BlockRegistry::builtin(), cfg(1, 8, 1), ChunkStore::new(8, 8))
        .err()
        .unwrap();
    assert_eq!(err, StreamConfigError::ChunkSizeMismatch { store: 8, source: 4 });
    assert_eq!(flat_source(4).chunk_size(), 4);
}

#[test]
fn mismatched_source_loads_nothing() {
    let mut store = ChunkStore::new(8, 8);
    let mut streamer = ChunkStreamer::new(cfg(1, 8, 4)).unwrap();
    streamer.recompute_target_set(&mut store, ChunkCoord::new(0, 0, 0), &mut NoopReporter);
    let queued = store.pending_len();
    assert!(queued > 0);
    let r = streamer.tick(&mut store, &flat_source(4), &BlockRegistry::builtin(), 4, &mut NoopReporter);
    assert!(r.loaded.is_empty());
    assert_eq!(r.remaining, queued);
    assert_eq!(store.stats().loaded, 0);
    assert_accounting(&store);
}
