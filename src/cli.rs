use std::path::PathBuf;
use std::str::FromStr;

use clap::{Parser, Subcommand};
use quarry_geom::{IVec3, Vec3};

#[derive(Parser, Debug)]
#[command(name = "quarry", about = "Headless driver for a streamed, editable voxel world")]
pub struct Cli {
    /// World generation config
    #[arg(long, default_value = "assets/worldgen.toml")]
    pub world: PathBuf,
    /// Block atlas config
    #[arg(long, default_value = "assets/blocks.toml")]
    pub blocks: PathBuf,
    /// Log filter, e.g. `debug` or `stream=debug,edit=trace` (overrides RUST_LOG)
    #[arg(long)]
    pub log_level: Option<String>,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Move the reference point along a line, one streaming tick per step
    Stream {
        #[arg(long, default_value_t = 64)]
        ticks: usize,
        /// Start point X,Y,Z
        #[arg(long, value_parser = parse_vec3, default_value = "0,0,0", allow_hyphen_values = true)]
        from: Vec3,
        /// End point X,Y,Z
        #[arg(long, value_parser = parse_vec3, default_value = "64,0,0", allow_hyphen_values = true)]
        to: Vec3,
    },
    /// Synthesize one chunk with its six neighbors and describe it
    Chunk {
        /// Chunk coordinate X,Y,Z
        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        coord: IVec3,
    },
    /// Stream around a voxel and dig a vertical shaft down from it
    Dig {
        /// World voxel X,Y,Z
        #[arg(long, value_parser = parse_ivec3, allow_hyphen_values = true)]
        at: IVec3,
        /// Number of solid voxels to break
        #[arg(long, default_value_t = 16)]
        depth: u32,
    },
}

fn parse_triple<T: FromStr>(s: &str) -> Result<[T; 3], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 3 {
        return Err(format!("expected X,Y,Z but got '{}'", s));
    }
    let mut out = Vec::with_capacity(3);
    for p in parts {
        out.push(p.parse::<T>().map_err(|_| format!("'{}' is not a number", p))?);
    }
    match <[T; 3]>::try_from(out) {
        Ok(v) => Ok(v),
        Err(_) => Err(format!("expected X,Y,Z but got '{}'", s)),
    }
}

fn parse_vec3(s: &str) -> Result<Vec3, String> {
    let [x, y, z] = parse_triple::<f32>(s)?;
    Ok(Vec3::new(x, y, z))
}

fn parse_ivec3(s: &str) -> Result<IVec3, String> {
    let [x, y, z] = parse_triple::<i32>(s)?;
    Ok(IVec3::new(x, y, z))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triples_parse_with_negatives_and_spaces() {
        assert_eq!(parse_ivec3("-3, 0,12"), Ok(IVec3::new(-3, 0, 12)));
        assert_eq!(parse_vec3("1.5,-2,0"), Ok(Vec3::new(1.5, -2.0, 0.0)));
        assert!(parse_ivec3("1,2").is_err());
        assert!(parse_ivec3("1,x,2").is_err());
    }

    #[test]
    fn dig_command_parses() {
        let cli = Cli::parse_from(["quarry", "--log-level", "debug", "dig", "--at", "4,-10,4", "--depth", "3"]);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
        match cli.command {
            Command::Dig { at, depth } => {
                assert_eq!(at, IVec3::new(4, -10, 4));
                assert_eq!(depth, 3);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
