//! Payloads exchanged between step modules via the [`crate::sim::framework::Bus`].
//!
//! The temperature field itself travels as [`crate::sim::heat_transfer::Field`];
//! the heating state as [`crate::sim::energy::hvac::HeatingState`].

use crate::sim::heat_transfer::field::Field;

/// Simulated time at the start of the current step, `index * dt`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimTime(pub f64);

/// Mean room-air temperature after the boundary passes [°C].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoomAverageTemperatureC(pub f64);

/// Field as it was just before the heater effect was applied.
#[derive(Debug, Clone)]
pub struct FieldBeforeHeaters(pub Field);

/// Heater energy delivered during the current step [J].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepEnergyJ(pub f64);

/// Set by the thermostat module when the heating state changed this step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThermostatSwitched(pub bool);
