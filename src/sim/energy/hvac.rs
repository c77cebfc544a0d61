use serde::{Deserialize, Serialize};

use crate::geom::room::RoomGeometry;
use crate::sim::heat_transfer::boundary::BoundaryCondition;
use crate::sim::heat_transfer::field::Field;

/// Binary actuator state of the heaters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeatingState {
    Heating,
    Idle,
}

impl HeatingState {
    pub fn is_heating(self) -> bool {
        self == HeatingState::Heating
    }
}

/// On/off thermostat with a dead band.
///
/// - `Heating -> Idle` when the average temperature is strictly above `upper`.
/// - `Idle -> Heating` when it is strictly below `lower`.
/// - No transition otherwise (including a NaN average).
#[derive(Debug, Clone)]
pub struct Thermostat {
    /// Turn-on threshold in °C.
    pub lower: f64,
    /// Turn-off threshold in °C.
    pub upper: f64,
    state: HeatingState,
}

impl Thermostat {
    /// Creates a thermostat that starts in [`HeatingState::Heating`].
    pub fn new(lower: f64, upper: f64) -> Self {
        Self {
            lower,
            upper,
            state: HeatingState::Heating,
        }
    }

    pub fn state(&self) -> HeatingState {
        self.state
    }

    /// Applies the hysteresis rule to `avg_temp` and returns the new state.
    pub fn update(&mut self, avg_temp: f64) -> HeatingState {
        self.state = match self.state {
            HeatingState::Heating if avg_temp > self.upper => HeatingState::Idle,
            HeatingState::Idle if avg_temp < self.lower => HeatingState::Heating,
            s => s,
        };
        self.state
    }
}

impl Default for Thermostat {
    fn default() -> Self {
        Self::new(19.0, 21.0)
    }
}

/// Drives the heater zones according to the thermostat state.
///
/// While heating, heater cells are clamped to `heater_temperature`. While
/// idle, each heater cell relaxes to the mean of its in-bounds grid
/// neighbours, including other heater cells.
#[derive(Debug, Clone)]
pub struct HeaterController {
    pub heater_temperature: f64,
}

impl HeaterController {
    pub fn new(heater_temperature: f64) -> Self {
        Self { heater_temperature }
    }

    pub fn condition(&self, state: HeatingState) -> BoundaryCondition {
        match state {
            HeatingState::Heating => BoundaryCondition::Dirichlet {
                temperature: self.heater_temperature,
            },
            HeatingState::Idle => BoundaryCondition::Relaxed {
                exclude_own_zone: false,
            },
        }
    }

    pub fn apply(&self, mut field: Field, room: &RoomGeometry, state: HeatingState) -> Field {
        let bc = self.condition(state);
        for zone in room.heaters() {
            bc.apply(&mut field, zone);
        }
        field
    }
}
