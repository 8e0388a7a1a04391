//! Block catalog and texture-atlas registry crate.
#![forbid(unsafe_code)]

pub mod config;
pub mod registry;
pub mod types;

pub use registry::{AtlasEntry, BlockRegistry, RegistryError, UvRect};
pub use types::{AtlasCoord, BlockKind, FaceRole};
