//! Single-voxel edits on loaded chunks with cross-chunk dirty propagation and
//! gravity cascades.
#![forbid(unsafe_code)]

mod debris;
mod editor;
pub mod target;

pub use debris::{DebrisEvent, DebrisSink, NoDebris};
pub use editor::{BlockEditor, EditError, EditOutcome};
