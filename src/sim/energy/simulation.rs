//! Room heat simulation loop.
//!
//! One step runs the pipeline
//!
//! ```text
//! diffusion ──► boundary ──► thermostat ──► heaters ──► energy ──► recorder
//!               (border,     (average,      (clamp or    (ledger)   (Sample)
//!                walls,       hysteresis)    relax)
//!                windows)
//! ```
//!
//! and the loop runs a precomputed number of steps, `ceil(total_time / dt)`,
//! reporting time as `index * dt` instead of accumulating it.

use std::ops::ControlFlow;

use anyhow::{Context, Result};

use crate::error::SimError;
use crate::geom::room::RoomGeometry;
use crate::sim::coupling::SimTime;
use crate::sim::framework::{Bus, Pipeline, SimContext};
use crate::sim::heat_transfer::boundary::BoundaryEnforcer;
use crate::sim::heat_transfer::field::Field;
use crate::sim::heat_transfer::module::{BoundaryModule, DiffusionModule};
use crate::sim::heat_transfer::solver::DiffusionStepper;
use crate::sim::index::ZoneIndex;

use super::config::RoomConfig;
use super::hvac::{HeaterController, HeatingState, Thermostat};
use super::ledger::{EnergyLedger, HeaterEnergyModel};
use super::module::{EnergyModule, HeaterModule, ThermostatModule};
use super::recorder::{RecorderData, RecorderModule};
use super::result::{Sample, SimulationResult};

/// Relative tolerance, in units of `f64::EPSILON`, under which
/// `total_time / dt` counts as a whole number.
const STEP_COUNT_ULPS: f64 = 4.0;

/// Number of steps needed to cover `total_time`: every `t = k*dt < total_time`
/// triggers a step.
pub fn step_count(total_time: f64, dt: f64) -> usize {
    if total_time <= 0.0 || dt <= 0.0 {
        return 0;
    }
    let ratio = total_time / dt;
    let nearest = ratio.round();
    if (ratio - nearest).abs() <= STEP_COUNT_ULPS * f64::EPSILON * nearest.max(1.0) {
        nearest as usize
    } else {
        ratio.ceil() as usize
    }
}

/// Field at `t = 0`: ambient everywhere, windows at their fixed temperature
/// and heaters at the heater temperature (the thermostat starts heating).
pub fn initial_field(config: &RoomConfig, room: &RoomGeometry) -> Field {
    let mut field = Field::uniform(room.nodes, config.initial_temperature);
    for zone in room.windows() {
        field.fill_zone(zone, config.window_temperature);
    }
    for zone in room.heaters() {
        field.fill_zone(zone, config.heater_temperature);
    }
    field
}

/// Step-driven room simulation.
///
/// The field, the thermostat state and the energy ledger live on an internal
/// [`Bus`]; they are consistent between steps and can be read through the
/// accessors. Steps never overlap, so a caller may stop after any step and
/// resume later.
pub struct RoomSimulation {
    config: RoomConfig,
    room: RoomGeometry,
    index: ZoneIndex,
    dt: f64,
    total_steps: usize,
    next_step: usize,
    pipeline: Pipeline,
    bus: Bus,
}

impl RoomSimulation {
    /// Builds the simulation with the initial field of [`initial_field`].
    ///
    /// Fails with [`SimError::Configuration`] or
    /// [`SimError::NumericalInstability`] (recoverable via
    /// `anyhow::Error::downcast_ref`).
    pub fn new(config: RoomConfig) -> Result<Self> {
        let room = config.geometry()?;
        let field = initial_field(&config, &room);
        Self::with_field(config, field)
    }

    /// Builds the simulation starting from a caller-supplied field.
    pub fn with_field(config: RoomConfig, field: Field) -> Result<Self> {
        let room = config.geometry()?;
        let index = ZoneIndex::new(&room);
        if index.room_air_cells() == 0 {
            return Err(SimError::config("zones cover every cell; no room air to average").into());
        }
        if field.nodes() != room.nodes {
            return Err(SimError::config(format!(
                "initial field has {} nodes, configuration has {}",
                field.nodes(),
                room.nodes
            ))
            .into());
        }

        if config.window_freezes_room_air() {
            log::warn!(
                "window temperature equals initial temperature ({} °C); cells at that value do not diffuse",
                config.window_temperature
            );
        }

        let stepper = DiffusionStepper::new(
            config.alpha,
            room.spacing,
            config.time_step,
            config.window_temperature,
        )?;
        let dt = stepper.dt();
        let total_steps = step_count(config.total_time, dt);

        let mut pipeline = Pipeline::new()
            .with_module(DiffusionModule::new(stepper))
            .with_module(BoundaryModule::new(BoundaryEnforcer::new(
                config.window_temperature,
            )))
            .with_module(ThermostatModule::new(Thermostat::new(
                config.lower_threshold,
                config.upper_threshold,
            )))
            .with_module(HeaterModule::new(HeaterController::new(
                config.heater_temperature,
            )))
            .with_module(EnergyModule::new(HeaterEnergyModel {
                cell_area: room.cell_area(),
                depth: config.depth,
                density: config.density,
                specific_heat: config.specific_heat,
            }))
            .with_module(RecorderModule::new());

        let mut bus = Bus::new();
        bus.put(field);
        {
            let ctx = SimContext::new(&room, &index, dt);
            pipeline.init(&ctx, &mut bus)?;
        }

        log::info!(
            "room simulation: {n}x{n} nodes, h = {h:.5} m, dt = {dt:.6}, {total_steps} steps, {zones} zones",
            n = room.nodes,
            h = room.spacing,
            zones = room.zones().len(),
        );

        Ok(Self {
            config,
            room,
            index,
            dt,
            total_steps,
            next_step: 0,
            pipeline,
            bus,
        })
    }

    pub fn config(&self) -> &RoomConfig {
        &self.config
    }

    pub fn room(&self) -> &RoomGeometry {
        &self.room
    }

    pub fn zone_index(&self) -> &ZoneIndex {
        &self.index
    }

    /// Fixed time step.
    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn total_steps(&self) -> usize {
        self.total_steps
    }

    pub fn steps_completed(&self) -> usize {
        self.next_step
    }

    /// Simulated time reached so far, `steps_completed * dt`.
    pub fn time(&self) -> f64 {
        self.next_step as f64 * self.dt
    }

    pub fn is_finished(&self) -> bool {
        self.next_step >= self.total_steps
    }

    /// Current temperature field. Valid between steps.
    pub fn field(&self) -> Result<&Field> {
        self.bus.require::<Field>("RoomSimulation")
    }

    pub fn heating_state(&self) -> Result<HeatingState> {
        self.bus.require::<HeatingState>("RoomSimulation").copied()
    }

    pub fn total_energy(&self) -> Result<f64> {
        Ok(self.bus.require::<EnergyLedger>("RoomSimulation")?.total())
    }

    pub fn energy_ledger(&self) -> Result<&EnergyLedger> {
        self.bus.require::<EnergyLedger>("RoomSimulation")
    }

    /// Samples recorded so far, in step order.
    pub fn samples(&self) -> Result<&[Sample]> {
        Ok(self.bus.require::<RecorderData>("RoomSimulation")?.samples())
    }

    /// Runs one step. Returns `None` once all steps are done.
    pub fn step(&mut self) -> Result<Option<Sample>> {
        if self.is_finished() {
            return Ok(None);
        }
        let k = self.next_step;
        self.bus.put(SimTime(k as f64 * self.dt));

        let ctx = SimContext::new(&self.room, &self.index, self.dt);
        self.pipeline
            .step(&ctx, &mut self.bus)
            .with_context(|| format!("step {k} failed"))?;
        self.next_step += 1;

        let Some((sample, state)) = self.bus.require::<RecorderData>("RoomSimulation")?.last()
        else {
            anyhow::bail!("step {k} produced no sample");
        };
        log::trace!(
            "step {k}: t = {:.4}, avg = {:.3} °C, heaters {:?}, energy = {:.2} J",
            sample.time,
            sample.average_temperature,
            state,
            sample.total_energy
        );
        Ok(Some(sample))
    }

    /// Runs the remaining steps, calling `on_step` once after each completed
    /// step. Returning [`ControlFlow::Break`] stops between steps; the
    /// simulation can be resumed afterwards.
    pub fn run_with<F>(&mut self, mut on_step: F) -> Result<()>
    where
        F: FnMut(&Sample, HeatingState, &Field) -> ControlFlow<()>,
    {
        while let Some(sample) = self.step()? {
            let state = self.heating_state()?;
            let field = self.field()?;
            if on_step(&sample, state, field).is_break() {
                log::info!("room simulation stopped after step {}", self.next_step);
                break;
            }
        }
        Ok(())
    }

    /// Runs all remaining steps and returns the result.
    pub fn run(mut self) -> Result<SimulationResult> {
        self.run_with(|_, _, _| ControlFlow::Continue(()))?;
        self.finish()
    }

    /// Consumes the simulation and returns the result of the steps completed so far.
    pub fn finish(mut self) -> Result<SimulationResult> {
        let result = RecorderModule::take_result(&mut self.bus, self.dt)?;
        log::info!(
            "room simulation finished: {} steps, total energy {:.2} J, {} thermostat switches",
            result.steps,
            result.total_energy,
            result.thermostat_switches
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::zone::{Extent, ZoneKind, ZonePlacement};

    fn corner_heater_config() -> RoomConfig {
        RoomConfig {
            nodes: 5,
            length: 1.0,
            alpha: 0.025,
            total_time: 2.0,
            zones: vec![ZonePlacement::new(
                ZoneKind::Heater,
                "corner",
                Extent::indices(0, 1),
                Extent::indices(0, 1),
            )],
            ..RoomConfig::new()
        }
    }

    #[test]
    fn test_step_count() {
        assert_eq!(step_count(2.0, 0.625), 4);
        assert_eq!(step_count(2.5, 0.625), 4);
        assert_eq!(step_count(0.0, 0.625), 0);
        assert_eq!(step_count(0.1, 0.625), 1);
        // 0.3 / 0.1 is 2.9999999999999996 in floating point
        assert_eq!(step_count(0.3, 0.1), 3);
    }

    #[test]
    fn test_step_count_only_absorbs_rounding() {
        // t = 2.5 is still below a total just past 2.5, so it is a step.
        assert_eq!(step_count(4.0 * 0.625 * (1.0 + 5e-10), 0.625), 5);
        assert_eq!(step_count(2.5 + 1e-12, 0.625), 5);
        assert_eq!(step_count(7.0, 7.0 / 3.0), 3);
    }

    #[test]
    fn test_reference_scenario_steps_and_times() -> Result<()> {
        let sim = RoomSimulation::new(corner_heater_config())?;
        assert!((sim.dt() - 0.625).abs() < 1e-12);
        assert_eq!(sim.total_steps(), 4);

        let result = sim.run()?;
        assert_eq!(result.steps, 4);
        let times = result.times();
        for (k, t) in times.iter().enumerate() {
            assert!((t - k as f64 * 0.625).abs() < 1e-12, "t[{k}] = {t}");
        }
        Ok(())
    }

    #[test]
    fn test_reference_scenario_first_step_energy() -> Result<()> {
        let mut sim = RoomSimulation::new(corner_heater_config())?;
        let sample = sim.step()?.unwrap();
        assert_eq!(sim.heating_state()?, HeatingState::Heating);
        assert_eq!(sim.field()?.get(0, 0), 50.0);

        let h = 0.25;
        let expected = h * h * 0.1 * 1.2 * 1000.0 * (50.0_f64 - 20.0).max(0.0);
        assert!(
            (sample.total_energy - expected).abs() < 1e-9,
            "energy = {}, expected {expected}",
            sample.total_energy
        );
        assert!((sample.average_temperature - 20.0).abs() < 1e-12);
        Ok(())
    }

    #[test]
    fn test_initial_field() -> Result<()> {
        let sim = RoomSimulation::new(RoomConfig::new())?;
        let field = sim.field()?;
        let room = sim.room();
        for zone in room.windows() {
            for (i, j) in zone.cells() {
                assert_eq!(field.get(i, j), -10.0);
            }
        }
        for zone in room.heaters() {
            for (i, j) in zone.cells() {
                assert_eq!(field.get(i, j), 50.0);
            }
        }
        assert_eq!(field.get(20, 20), 20.0);
        assert_eq!(sim.steps_completed(), 0);
        assert_eq!(sim.heating_state()?, HeatingState::Heating);
        Ok(())
    }

    #[test]
    fn test_callback_once_per_step_and_stop() -> Result<()> {
        let mut sim = RoomSimulation::new(corner_heater_config())?;
        let mut seen = Vec::new();
        sim.run_with(|s, _, _| {
            seen.push(s.time);
            if seen.len() == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        })?;
        assert_eq!(seen.len(), 2);
        assert_eq!(sim.steps_completed(), 2);
        assert!(!sim.is_finished());

        // Resume to the end.
        sim.run_with(|s, _, _| {
            seen.push(s.time);
            ControlFlow::Continue(())
        })?;
        assert_eq!(seen.len(), 4);
        assert!(sim.is_finished());
        assert!(sim.step()?.is_none());
        assert_eq!(sim.samples()?.len(), 4);
        Ok(())
    }

    #[test]
    fn test_switch_count_matches_state_history() -> Result<()> {
        let cfg = RoomConfig {
            initial_temperature: 24.0,
            total_time: 2.0,
            ..RoomConfig::new()
        };
        let result = RoomSimulation::new(cfg)?.run()?;

        let mut previous = HeatingState::Heating;
        let mut transitions = 0;
        for &state in &result.heating_states {
            if state != previous {
                transitions += 1;
            }
            previous = state;
        }
        assert!(transitions >= 1);
        assert_eq!(result.thermostat_switches, transitions);
        Ok(())
    }

    #[test]
    fn test_window_at_ambient_leaves_air_unchanged() -> Result<()> {
        let cfg = RoomConfig {
            window_temperature: 20.0,
            total_time: 0.1,
            ..RoomConfig::new()
        };
        assert!(cfg.window_freezes_room_air());
        let result = RoomSimulation::new(cfg)?.run()?;
        assert!(result.steps > 10);
        for s in &result.samples {
            assert_eq!(s.average_temperature, 20.0, "t = {}", s.time);
        }
        Ok(())
    }

    #[test]
    fn test_unstable_time_step_is_refused() {
        let cfg = RoomConfig {
            time_step: Some(1.0),
            ..corner_heater_config()
        };
        let err = RoomSimulation::new(cfg).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::NumericalInstability { .. })
        ));
    }

    #[test]
    fn test_field_size_mismatch() {
        let err = RoomSimulation::with_field(corner_heater_config(), Field::uniform(6, 20.0))
            .err()
            .unwrap();
        assert!(matches!(
            err.downcast_ref::<SimError>(),
            Some(SimError::Configuration(_))
        ));
    }

    #[test]
    fn test_fully_covered_room_is_rejected() {
        let cfg = RoomConfig {
            zones: vec![ZonePlacement::new(
                ZoneKind::Wall,
                "block",
                Extent::indices(1, 4),
                Extent::indices(1, 4),
            )],
            ..corner_heater_config()
        };
        assert!(RoomSimulation::new(cfg).is_err());
    }
}
