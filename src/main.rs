//! Headless host loop for the quarry voxel world: streams terrain around a
//! moving point, inspects single chunks, and digs shafts through loaded space.
#![forbid(unsafe_code)]

mod cli;
mod sim;

use clap::Parser;
use quarry_blocks::BlockRegistry;
use quarry_world::WorldGenConfig;

use cli::{Cli, Command};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = &cli.log_level {
        logger.parse_filters(filter);
    }
    logger.init();

    let worldgen = WorldGenConfig::load_from_path(&cli.world)?;
    let registry = BlockRegistry::load_from_path(&cli.blocks)?;
    log::info!(
        "world {} (seed {}, chunk size {}), atlas {}",
        cli.world.display(),
        worldgen.seed,
        worldgen.chunk_size(),
        cli.blocks.display()
    );

    match cli.command {
        Command::Stream { ticks, from, to } => sim::stream(&worldgen, registry, ticks, from, to),
        Command::Chunk { coord } => sim::inspect_chunk(&worldgen, registry, coord),
        Command::Dig { at, depth } => sim::dig(&worldgen, registry, at, depth),
    }
}
