use serde::{Deserialize, Serialize};

use super::hvac::HeatingState;
use crate::sim::heat_transfer::field::Field;

/// Externally observable output of one step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Simulated time at the start of the step, `index * dt`.
    pub time: f64,
    /// Room-air average temperature after the boundary passes [°C].
    pub average_temperature: f64,
    /// Cumulative heater energy up to and including this step [J].
    pub total_energy: f64,
}

/// Result of a complete (or stopped) room simulation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationResult {
    /// Fixed time step.
    pub dt: f64,
    /// Number of completed steps.
    pub steps: usize,
    /// One sample per completed step, in step order.
    pub samples: Vec<Sample>,
    /// Heating state decided in each step.
    pub heating_states: Vec<HeatingState>,
    /// Field after the last completed step.
    pub final_field: Field,
    /// Total heater energy [J].
    pub total_energy: f64,
    /// Lowest sampled average temperature [°C].
    pub min_average_temperature: f64,
    /// Highest sampled average temperature [°C].
    pub max_average_temperature: f64,
    /// Number of thermostat transitions.
    pub thermostat_switches: usize,
    /// Fraction (0..1) of steps with the heaters on.
    pub heating_fraction: f64,
}

impl SimulationResult {
    pub fn new(
        dt: f64,
        samples: Vec<Sample>,
        heating_states: Vec<HeatingState>,
        thermostat_switches: usize,
        final_field: Field,
    ) -> Self {
        let steps = samples.len();
        let total_energy = samples.last().map(|s| s.total_energy).unwrap_or(0.0);
        let (min_avg, max_avg) = if samples.is_empty() {
            (0.0, 0.0)
        } else {
            samples.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), s| {
                (lo.min(s.average_temperature), hi.max(s.average_temperature))
            })
        };

        let heating_steps = heating_states.iter().filter(|s| s.is_heating()).count();
        let heating_fraction = if heating_states.is_empty() {
            0.0
        } else {
            heating_steps as f64 / heating_states.len() as f64
        };

        Self {
            dt,
            steps,
            samples,
            heating_states,
            final_field,
            total_energy,
            min_average_temperature: min_avg,
            max_average_temperature: max_avg,
            thermostat_switches,
            heating_fraction,
        }
    }

    /// Sample times, for plotting.
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time).collect()
    }

    /// Average temperature series, for plotting.
    pub fn average_temperatures(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.average_temperature).collect()
    }

    /// Cumulative energy series, for plotting.
    pub fn energies(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.total_energy).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(time: f64, avg: f64, energy: f64) -> Sample {
        Sample {
            time,
            average_temperature: avg,
            total_energy: energy,
        }
    }

    #[test]
    fn test_summary_values() {
        use HeatingState::*;
        let samples = vec![
            sample(0.0, 20.0, 10.0),
            sample(1.0, 21.5, 15.0),
            sample(2.0, 18.5, 15.0),
            sample(3.0, 19.5, 20.0),
        ];
        let states = vec![Heating, Idle, Heating, Heating];
        let r = SimulationResult::new(1.0, samples, states, 2, Field::uniform(4, 0.0));
        assert_eq!(r.steps, 4);
        assert_eq!(r.total_energy, 20.0);
        assert_eq!(r.min_average_temperature, 18.5);
        assert_eq!(r.max_average_temperature, 21.5);
        assert_eq!(r.thermostat_switches, 2);
        assert!((r.heating_fraction - 0.75).abs() < 1e-12);
        assert_eq!(r.times(), vec![0.0, 1.0, 2.0, 3.0]);
        assert_eq!(r.energies(), vec![10.0, 15.0, 15.0, 20.0]);
    }

    #[test]
    fn test_empty_result() {
        let r = SimulationResult::new(
            0.5,
            vec![],
            vec![],
            0,
            Field::uniform(4, 20.0),
        );
        assert_eq!(r.steps, 0);
        assert_eq!(r.total_energy, 0.0);
        assert_eq!(r.heating_fraction, 0.0);
        assert!(r.average_temperatures().is_empty());
    }
}
