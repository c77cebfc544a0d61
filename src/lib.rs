pub mod error;
pub mod geom;
pub mod sim;

// Prelude
pub use error::SimError;
pub use geom::room::RoomGeometry;
pub use geom::zone::{Bound, Extent, Zone, ZoneKind, ZonePlacement};
pub use sim::energy::{
    EnergyLedger, HeatingState, RoomConfig, RoomSimulation, Sample, SimulationResult, Thermostat,
};
pub use sim::heat_transfer::Field;
