//! Thermostat control, heater energy accounting and the simulation loop.

pub mod config;
pub mod hvac;
pub mod ledger;
pub mod module;
pub mod recorder;
pub mod result;
pub mod simulation;

pub use config::RoomConfig;
pub use hvac::{HeaterController, HeatingState, Thermostat};
pub use ledger::{EnergyLedger, HeaterEnergyModel};
pub use result::{Sample, SimulationResult};
pub use simulation::RoomSimulation;
