use crate::geom::room::RoomGeometry;
use crate::sim::index::ZoneIndex;

/// Shared read-only context passed to simulation modules.
///
/// Holds the static part of a run: the resolved geometry, its cell
/// classification and the fixed time step.
pub struct SimContext<'a> {
    pub room: &'a RoomGeometry,
    pub index: &'a ZoneIndex,
    /// Fixed time step.
    pub dt: f64,
}

impl<'a> SimContext<'a> {
    pub fn new(room: &'a RoomGeometry, index: &'a ZoneIndex, dt: f64) -> Self {
        Self { room, index, dt }
    }
}
