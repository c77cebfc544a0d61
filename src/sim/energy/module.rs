use anyhow::Result;

use crate::sim::coupling::{
    FieldBeforeHeaters, RoomAverageTemperatureC, SimTime, StepEnergyJ, ThermostatSwitched,
};
use crate::sim::framework::{Bus, SimContext, SimModule};
use crate::sim::heat_transfer::field::Field;

use super::hvac::{HeaterController, HeatingState, Thermostat};
use super::ledger::{EnergyLedger, HeaterEnergyModel};

/// Samples the room-air average and runs the thermostat decision.
///
/// Publishes [`RoomAverageTemperatureC`], [`HeatingState`] and
/// [`ThermostatSwitched`].
pub struct ThermostatModule {
    thermostat: Thermostat,
}

impl ThermostatModule {
    pub fn new(thermostat: Thermostat) -> Self {
        Self { thermostat }
    }
}

impl SimModule for ThermostatModule {
    fn name(&self) -> &'static str {
        "thermostat"
    }

    fn init(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        anyhow::ensure!(
            ctx.index.room_air_cells() > 0,
            "ThermostatModule: no room-air cells to average"
        );
        bus.put(self.thermostat.state());
        Ok(())
    }

    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let field = bus.require::<Field>(self.name())?;
        let Some(avg) = ctx.index.mean_room_temperature(field) else {
            anyhow::bail!("ThermostatModule: no room-air cells to average");
        };

        let previous = self.thermostat.state();
        let state = self.thermostat.update(avg);
        let switched = state != previous;
        if switched {
            log::debug!("thermostat {previous:?} -> {state:?} at average {avg:.3} °C");
        }

        bus.put(RoomAverageTemperatureC(avg));
        bus.put(state);
        bus.put(ThermostatSwitched(switched));
        Ok(())
    }
}

/// Applies the heater effect for the current [`HeatingState`] and keeps the
/// pre-effect field as [`FieldBeforeHeaters`] for energy accounting.
pub struct HeaterModule {
    controller: HeaterController,
}

impl HeaterModule {
    pub fn new(controller: HeaterController) -> Self {
        Self { controller }
    }
}

impl SimModule for HeaterModule {
    fn name(&self) -> &'static str {
        "heaters"
    }

    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let state = *bus.require::<HeatingState>(self.name())?;
        let field = bus.require_mut::<Field>(self.name())?;
        let before = field.clone();
        *field = self.controller.apply(before.clone(), ctx.room, state);
        bus.put(FieldBeforeHeaters(before));
        Ok(())
    }
}

/// Integrates delivered heater energy into the [`EnergyLedger`] on the Bus.
pub struct EnergyModule {
    model: HeaterEnergyModel,
}

impl EnergyModule {
    pub fn new(model: HeaterEnergyModel) -> Self {
        Self { model }
    }
}

impl SimModule for EnergyModule {
    fn name(&self) -> &'static str {
        "energy"
    }

    fn init(&mut self, _ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        if bus.get::<EnergyLedger>().is_none() {
            bus.put(EnergyLedger::new());
        }
        Ok(())
    }

    fn step(&mut self, ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let state = *bus.require::<HeatingState>(self.name())?;
        let time = bus.require::<SimTime>(self.name())?.0;
        let before = &bus.require::<FieldBeforeHeaters>(self.name())?.0;
        let after = bus.require::<Field>(self.name())?;
        let energy = self.model.step_energy(before, after, ctx.room, state);

        bus.require_mut::<EnergyLedger>(self.name())?
            .record(time, energy);
        bus.put(StepEnergyJ(energy));
        Ok(())
    }
}
