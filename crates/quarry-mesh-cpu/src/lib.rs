//! CPU culled-face mesher: one textured quad per exposed voxel face.
#![forbid(unsafe_code)]

mod extract;
mod mesh_build;

pub use extract::{
    ChunkMesh, NeighborView, count_exposed_faces, extract, extract_into, face_exposed, neighbor_voxel,
};
pub use mesh_build::MeshBuild;
