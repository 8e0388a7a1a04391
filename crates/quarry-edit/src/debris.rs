use quarry_blocks::{AtlasCoord, BlockKind};
use quarry_geom::{IVec3, Vec3};

/// Inputs for an external break effect (particles, sound).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DebrisEvent {
    /// World voxel that was removed.
    pub voxel: IVec3,
    pub direction: Vec3,
    /// Side texture of the removed kind; `None` if the registry has no entry.
    pub side: Option<AtlasCoord>,
    pub kind: BlockKind,
}

pub trait DebrisSink {
    fn spawn(&mut self, event: DebrisEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoDebris;

impl DebrisSink for NoDebris {
    fn spawn(&mut self, _event: DebrisEvent) {}
}

impl DebrisSink for Vec<DebrisEvent> {
    fn spawn(&mut self, event: DebrisEvent) {
        self.push(event);
    }
}
