use serde::{Deserialize, Serialize};

use crate::geom::room::RoomGeometry;
use crate::sim::energy::hvac::HeatingState;
use crate::sim::heat_transfer::field::Field;

/// Heat delivered by the heater zones during one step.
///
/// Each heater zone is treated as a lumped mass
/// `m = cell_volume * density * cell_count`, with
/// `cell_volume = dx * dy * depth`. The depth is a notional room-depth
/// factor, not a physical thickness, and is kept as-is for comparability
/// with earlier results.
#[derive(Debug, Clone)]
pub struct HeaterEnergyModel {
    /// Cell area `dx * dy` [m²].
    pub cell_area: f64,
    /// Notional depth factor [m].
    pub depth: f64,
    /// Air density [kg/m³].
    pub density: f64,
    /// Specific heat [J/(kg·K)].
    pub specific_heat: f64,
}

impl HeaterEnergyModel {
    pub fn cell_volume(&self) -> f64 {
        self.cell_area * self.depth
    }

    /// Energy delivered between `before` and `after` [J].
    ///
    /// Zero while idle. While heating, a zone contributes
    /// `m * c_p * max(0, mean(after - before))`; cooling zones never give
    /// energy back.
    pub fn step_energy(
        &self,
        before: &Field,
        after: &Field,
        room: &RoomGeometry,
        state: HeatingState,
    ) -> f64 {
        if !state.is_heating() {
            return 0.0;
        }
        room.heaters()
            .map(|zone| {
                let n = zone.cell_count() as f64;
                let delta_t = zone
                    .cells()
                    .map(|(i, j)| after.get(i, j) - before.get(i, j))
                    .sum::<f64>()
                    / n;
                let mass = self.cell_volume() * self.density * n;
                mass * self.specific_heat * delta_t.max(0.0)
            })
            .sum()
    }
}

/// Running total of delivered heater energy plus its history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EnergyLedger {
    total: f64,
    /// `(time, total so far)` after each step.
    history: Vec<(f64, f64)>,
}

impl EnergyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a step's energy and appends `(time, total)`. Negative or NaN
    /// contributions are ignored so the total never decreases.
    pub fn record(&mut self, time: f64, energy: f64) -> f64 {
        if energy > 0.0 {
            self.total += energy;
        }
        self.history.push((time, self.total));
        self.total
    }

    pub fn total(&self) -> f64 {
        self.total
    }

    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }
}
