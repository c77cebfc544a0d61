//! Square room discretized on an `N × N` node grid.

use serde::{Deserialize, Serialize};

use super::zone::{Zone, ZoneKind, ZonePlacement, external_borders};
use crate::error::SimError;

/// Smallest grid that still has interior nodes once the border is removed.
pub const MIN_NODES: usize = 4;

/// Grid geometry plus the resolved zone catalogue.
///
/// Spacing is uniform on both axes: `h = L / (N-1)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomGeometry {
    /// Physical side length of the room [m].
    pub length: f64,
    /// Node count per axis.
    pub nodes: usize,
    /// Node spacing `h` [m].
    pub spacing: f64,
    zones: Vec<Zone>,
}

impl RoomGeometry {
    /// Resolves `placements` on a `nodes × nodes` grid and appends the four
    /// external border zones.
    pub fn new(
        length: f64,
        nodes: usize,
        placements: &[ZonePlacement],
        wall_thickness: usize,
    ) -> Result<Self, SimError> {
        if nodes < MIN_NODES {
            return Err(SimError::config(format!(
                "node count must be at least {MIN_NODES}, got {nodes}"
            )));
        }
        if !(length.is_finite() && length > 0.0) {
            return Err(SimError::config(format!(
                "room length must be positive, got {length}"
            )));
        }

        let mut zones = Vec::with_capacity(placements.len() + 4);
        for placement in placements {
            if placement.kind == ZoneKind::ExternalBorder {
                return Err(SimError::config(format!(
                    "zone '{}': external borders are generated from the grid and cannot be placed",
                    placement.label
                )));
            }
            zones.push(placement.resolve(nodes, wall_thickness)?);
        }
        zones.extend(external_borders(nodes)?);

        Ok(Self {
            length,
            nodes,
            spacing: length / (nodes - 1) as f64,
            zones,
        })
    }

    /// All zones in catalogue order (placements first, then the borders).
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn zones_of(&self, kind: ZoneKind) -> impl Iterator<Item = &Zone> {
        self.zones.iter().filter(move |z| z.kind == kind)
    }

    pub fn walls(&self) -> impl Iterator<Item = &Zone> {
        self.zones_of(ZoneKind::Wall)
    }

    pub fn windows(&self) -> impl Iterator<Item = &Zone> {
        self.zones_of(ZoneKind::Window)
    }

    pub fn heaters(&self) -> impl Iterator<Item = &Zone> {
        self.zones_of(ZoneKind::Heater)
    }

    pub fn borders(&self) -> impl Iterator<Item = &Zone> {
        self.zones_of(ZoneKind::ExternalBorder)
    }

    /// Area of one grid cell `h_x * h_y` [m²].
    pub fn cell_area(&self) -> f64 {
        self.spacing * self.spacing
    }
}
