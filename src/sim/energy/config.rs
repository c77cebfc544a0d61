use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::SimError;
use crate::geom::room::RoomGeometry;
use crate::geom::zone::{ZonePlacement, default_placements};

/// Configuration of a room heat simulation.
///
/// All fields have defaults (see [`RoomConfig::new`]); JSON override files
/// only need to list the values they change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoomConfig {
    /// Thermal diffusivity of the room air [m²/s].
    pub alpha: f64,
    /// Side length of the square room [m].
    pub length: f64,
    /// Total simulated time, in simulated time units.
    pub total_time: f64,
    /// Nodes per axis.
    pub nodes: usize,
    /// Specific heat used for heater energy accounting [J/(kg·K)].
    pub specific_heat: f64,
    /// Density used for heater energy accounting [kg/m³].
    pub density: f64,
    /// Wall thickness in index units. Bands take `thickness / 2` cells on
    /// each side of their centre line.
    pub wall_thickness: usize,
    /// Heater temperature while heating [°C].
    pub heater_temperature: f64,
    /// Fixed window temperature [°C].
    pub window_temperature: f64,
    /// Initial temperature of every cell [°C].
    pub initial_temperature: f64,
    /// Thermostat turn-on threshold [°C].
    pub lower_threshold: f64,
    /// Thermostat turn-off threshold [°C].
    pub upper_threshold: f64,
    /// Notional room depth used for the heater cell volume [m].
    pub depth: f64,
    /// Explicit time step. `None` uses the stability bound.
    pub time_step: Option<f64>,
    /// Walls, windows and heaters. The external border is always added.
    pub zones: Vec<ZonePlacement>,
}

impl RoomConfig {
    pub fn new() -> Self {
        Self {
            alpha: 0.025,
            length: 1.0,
            total_time: 7.0,
            nodes: 60,
            specific_heat: 1000.0,
            density: 1.2,
            wall_thickness: 3,
            heater_temperature: 50.0,
            window_temperature: -10.0,
            initial_temperature: 20.0,
            lower_threshold: 19.0,
            upper_threshold: 21.0,
            depth: 0.1,
            time_step: None,
            zones: default_placements(),
        }
    }

    /// Parses a (possibly partial) JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("Failed to parse room configuration")
    }

    /// Loads a (possibly partial) JSON configuration file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        Self::from_json_str(&text)
            .with_context(|| format!("Invalid configuration in {}", path.display()))
    }

    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("Failed to serialize room configuration")
    }

    /// Checks scalar parameters. Zone bounds are checked by [`Self::geometry`].
    pub fn validate(&self) -> Result<(), SimError> {
        let positive = [
            ("alpha", self.alpha),
            ("length", self.length),
            ("specific_heat", self.specific_heat),
            ("density", self.density),
            ("depth", self.depth),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(SimError::config(format!(
                    "{name} must be positive, got {value}"
                )));
            }
        }
        let finite = [
            ("total_time", self.total_time),
            ("heater_temperature", self.heater_temperature),
            ("window_temperature", self.window_temperature),
            ("initial_temperature", self.initial_temperature),
            ("lower_threshold", self.lower_threshold),
            ("upper_threshold", self.upper_threshold),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::config(format!("{name} must be finite, got {value}")));
            }
        }
        if self.total_time < 0.0 {
            return Err(SimError::config(format!(
                "total_time must not be negative, got {}",
                self.total_time
            )));
        }
        if self.lower_threshold >= self.upper_threshold {
            return Err(SimError::config(format!(
                "lower_threshold ({}) must be below upper_threshold ({})",
                self.lower_threshold, self.upper_threshold
            )));
        }
        Ok(())
    }

    /// Validates the configuration and resolves the zone catalogue.
    pub fn geometry(&self) -> Result<RoomGeometry, SimError> {
        self.validate()?;
        RoomGeometry::new(self.length, self.nodes, &self.zones, self.wall_thickness)
    }

    /// True when room air starts at the window temperature. The stepper skips
    /// cells holding exactly that value, so such air never diffuses.
    pub fn window_freezes_room_air(&self) -> bool {
        self.window_temperature == self.initial_temperature
    }
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let cfg = RoomConfig::new();
        assert!(cfg.validate().is_ok());
        let room = cfg.geometry().unwrap();
        assert_eq!(room.nodes, 60);
        assert!((room.spacing - 1.0 / 59.0).abs() < 1e-15);
    }

    #[test]
    fn test_partial_json_overrides() -> Result<()> {
        let cfg = RoomConfig::from_json_str(r#"{ "nodes": 30, "total_time": 2.5 }"#)?;
        assert_eq!(cfg.nodes, 30);
        assert!((cfg.total_time - 2.5).abs() < 1e-15);
        assert!((cfg.alpha - 0.025).abs() < 1e-15);
        assert_eq!(cfg.zones.len(), 7);
        Ok(())
    }

    #[test]
    fn test_json_round_trip() -> Result<()> {
        let cfg = RoomConfig::new();
        let back = RoomConfig::from_json_str(&cfg.to_json_string()?)?;
        assert_eq!(cfg, back);
        Ok(())
    }

    #[test]
    fn test_load_from_file() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("room.json");
        std::fs::write(&path, r#"{ "nodes": 12, "upper_threshold": 22.5 }"#)?;

        let cfg = RoomConfig::load(&path)?;
        assert_eq!(cfg.nodes, 12);
        assert_eq!(cfg.upper_threshold, 22.5);
        assert_eq!(cfg.zones, default_placements());
        Ok(())
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = RoomConfig::load(&dir.path().join("nope.json")).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to read configuration file"));
    }

    #[test]
    fn test_bad_json_has_context() {
        let err = RoomConfig::from_json_str("{ nodes: }").unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse room configuration"));
    }

    #[test]
    fn test_rejects_non_positive_alpha() {
        let cfg = RoomConfig {
            alpha: 0.0,
            ..RoomConfig::new()
        };
        assert!(matches!(cfg.validate(), Err(SimError::Configuration(_))));
    }

    #[test]
    fn test_window_at_ambient_freezes_air() {
        assert!(!RoomConfig::new().window_freezes_room_air());
        let cfg = RoomConfig {
            window_temperature: 20.0,
            ..RoomConfig::new()
        };
        assert!(cfg.validate().is_ok());
        assert!(cfg.window_freezes_room_air());
    }

    #[test]
    fn test_rejects_inverted_thresholds() {
        let cfg = RoomConfig {
            lower_threshold: 22.0,
            ..RoomConfig::new()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_small_grid() {
        let cfg = RoomConfig {
            nodes: 3,
            zones: vec![],
            ..RoomConfig::new()
        };
        assert!(matches!(cfg.geometry(), Err(SimError::Configuration(_))));
    }
}
