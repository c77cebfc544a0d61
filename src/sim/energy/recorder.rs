use anyhow::Result;

use crate::sim::coupling::{RoomAverageTemperatureC, SimTime, ThermostatSwitched};
use crate::sim::framework::{Bus, SimContext, SimModule};
use crate::sim::heat_transfer::field::Field;

use super::hvac::HeatingState;
use super::ledger::EnergyLedger;
use super::result::{Sample, SimulationResult};

/// Bus-stored recording buffer.
///
/// The intended workflow is:
/// 1) [`RecorderModule`] initializes this on the Bus,
/// 2) the recorder appends one [`Sample`] per step and counts thermostat
///    switches,
/// 3) the caller takes the data from the Bus and finalizes it into a
///    [`SimulationResult`].
#[derive(Debug, Clone, Default)]
pub struct RecorderData {
    samples: Vec<Sample>,
    heating_states: Vec<HeatingState>,
    switches: usize,
}

impl RecorderData {
    pub fn new() -> Self {
        Self::default()
    }

    fn push_step(&mut self, sample: Sample, state: HeatingState, switched: bool) {
        self.samples.push(sample);
        self.heating_states.push(state);
        if switched {
            self.switches += 1;
        }
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn heating_states(&self) -> &[HeatingState] {
        &self.heating_states
    }

    pub fn switches(&self) -> usize {
        self.switches
    }

    pub fn last(&self) -> Option<(Sample, HeatingState)> {
        Some((*self.samples.last()?, *self.heating_states.last()?))
    }

    pub fn finalize(self, dt: f64, final_field: Field) -> SimulationResult {
        SimulationResult::new(
            dt,
            self.samples,
            self.heating_states,
            self.switches,
            final_field,
        )
    }
}

/// Records one [`Sample`] per step into [`RecorderData`] on the Bus.
pub struct RecorderModule;

impl RecorderModule {
    pub fn new() -> Self {
        Self
    }

    /// Removes the recorder data and the field from the Bus and converts them
    /// into a finalized result.
    pub fn take_result(bus: &mut Bus, dt: f64) -> Result<SimulationResult> {
        let Some(data) = bus.take::<RecorderData>() else {
            anyhow::bail!("RecorderData not found on Bus");
        };
        let Some(field) = bus.take::<Field>() else {
            anyhow::bail!("Field not found on Bus");
        };
        Ok(data.finalize(dt, field))
    }
}

impl Default for RecorderModule {
    fn default() -> Self {
        Self::new()
    }
}

impl SimModule for RecorderModule {
    fn name(&self) -> &'static str {
        "recorder"
    }

    fn init(&mut self, _ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        if bus.get::<RecorderData>().is_none() {
            bus.put(RecorderData::new());
        }
        Ok(())
    }

    fn step(&mut self, _ctx: &SimContext, bus: &mut Bus) -> Result<()> {
        let sample = Sample {
            time: bus.require::<SimTime>(self.name())?.0,
            average_temperature: bus.require::<RoomAverageTemperatureC>(self.name())?.0,
            total_energy: bus.require::<EnergyLedger>(self.name())?.total(),
        };
        let state = *bus.require::<HeatingState>(self.name())?;
        let switched = bus.require::<ThermostatSwitched>(self.name())?.0;
        bus.require_mut::<RecorderData>(self.name())?
            .push_step(sample, state, switched);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::room::RoomGeometry;
    use crate::sim::index::ZoneIndex;

    #[test]
    fn test_recorder_collects_samples() -> Result<()> {
        let room = RoomGeometry::new(1.0, 4, &[], 3)?;
        let index = ZoneIndex::new(&room);
        let ctx = SimContext::new(&room, &index, 0.5);

        let mut bus = Bus::new();
        bus.put(EnergyLedger::new());
        bus.put(Field::uniform(4, 20.0));

        let mut recorder = RecorderModule::new();
        recorder.init(&ctx, &mut bus)?;
        let steps = [
            (HeatingState::Heating, false),
            (HeatingState::Idle, true),
            (HeatingState::Heating, true),
        ];
        for (k, (state, switched)) in steps.into_iter().enumerate() {
            bus.put(state);
            bus.put(ThermostatSwitched(switched));
            bus.put(SimTime(k as f64 * 0.5));
            bus.put(RoomAverageTemperatureC(20.0 + k as f64));
            bus.require_mut::<EnergyLedger>("test")?
                .record(k as f64 * 0.5, 10.0);
            recorder.step(&ctx, &mut bus)?;
        }

        let (last, state) = bus.require::<RecorderData>("test")?.last().unwrap();
        assert_eq!(state, HeatingState::Heating);
        assert!((last.total_energy - 30.0).abs() < 1e-12);
        assert_eq!(bus.require::<RecorderData>("test")?.switches(), 2);

        let result = RecorderModule::take_result(&mut bus, 0.5)?;
        assert_eq!(result.steps, 3);
        assert_eq!(result.times(), vec![0.0, 0.5, 1.0]);
        assert_eq!(result.average_temperatures(), vec![20.0, 21.0, 22.0]);
        assert_eq!(result.thermostat_switches, 2);
        assert!(bus.get::<Field>().is_none());
        Ok(())
    }

    #[test]
    fn test_take_result_without_recorder_fails() {
        let mut bus = Bus::new();
        assert!(RecorderModule::take_result(&mut bus, 1.0).is_err());
    }
}
