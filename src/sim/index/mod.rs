//! Per-cell zone classification.
//!
//! Zones are resolved once into a flag grid so that the stepper and the
//! averaging code ask "is this cell inside any wall?" with a single lookup
//! instead of scanning the zone list for every cell.

use ndarray::Array2;

use crate::geom::room::RoomGeometry;
use crate::geom::zone::ZoneKind;
use crate::sim::heat_transfer::field::Field;

const WALL: u8 = 1 << 0;
const WINDOW: u8 = 1 << 1;
const BORDER: u8 = 1 << 2;
const HEATER: u8 = 1 << 3;

fn flag(kind: ZoneKind) -> u8 {
    match kind {
        ZoneKind::Wall => WALL,
        ZoneKind::Window => WINDOW,
        ZoneKind::ExternalBorder => BORDER,
        ZoneKind::Heater => HEATER,
    }
}

/// Lookup table of zone membership for every grid cell.
#[derive(Debug, Clone)]
pub struct ZoneIndex {
    flags: Array2<u8>,
    room_air_cells: usize,
}

impl ZoneIndex {
    pub fn new(room: &RoomGeometry) -> Self {
        let mut flags = Array2::zeros((room.nodes, room.nodes));
        for zone in room.zones() {
            let f = flag(zone.kind);
            for (i, j) in zone.cells() {
                flags[[i, j]] |= f;
            }
        }
        let room_air_cells = flags.iter().filter(|&&f| f == 0).count();
        Self {
            flags,
            room_air_cells,
        }
    }

    pub fn is_in(&self, i: usize, j: usize, kind: ZoneKind) -> bool {
        self.flags[[i, j]] & flag(kind) != 0
    }

    /// Walls and the external border are not advanced by the diffusion stepper.
    pub fn blocks_diffusion(&self, i: usize, j: usize) -> bool {
        self.flags[[i, j]] & (WALL | BORDER) != 0
    }

    /// Cell belongs to no zone at all.
    pub fn is_room_air(&self, i: usize, j: usize) -> bool {
        self.flags[[i, j]] == 0
    }

    /// Number of cells outside every zone.
    pub fn room_air_cells(&self) -> usize {
        self.room_air_cells
    }

    /// Mean temperature over the room air, i.e. excluding walls, border,
    /// windows and heaters. `None` if no such cell exists.
    pub fn mean_room_temperature(&self, field: &Field) -> Option<f64> {
        if self.room_air_cells == 0 {
            return None;
        }
        let sum: f64 = field
            .values()
            .iter()
            .zip(self.flags.iter())
            .filter(|(_, f)| **f == 0)
            .map(|(t, _)| *t)
            .sum();
        Some(sum / self.room_air_cells as f64)
    }
}
