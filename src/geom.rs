pub mod room;
pub mod zone;

pub use room::RoomGeometry;
pub use zone::{Bound, Extent, Zone, ZoneKind, ZonePlacement};
