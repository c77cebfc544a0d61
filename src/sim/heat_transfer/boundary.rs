use crate::geom::room::RoomGeometry;
use crate::geom::zone::Zone;
use crate::sim::heat_transfer::field::Field;

/// Rule applied to the cells of a zone after the diffusion step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BoundaryCondition {
    /// Zero normal gradient: an edge line copies its adjacent interior line.
    Neumann,
    /// Local equilibrium: each cell becomes the mean of its in-bounds
    /// up/down/left/right neighbours.
    ///
    /// With `exclude_own_zone` neighbours inside the same rectangle are
    /// skipped, so a wall only sees out through its exterior faces. A cell
    /// left with no qualifying neighbour keeps its value. Cells are swept
    /// row-major and updated in place.
    Relaxed { exclude_own_zone: bool },
    /// Fixed temperature: T = temperature.
    Dirichlet { temperature: f64 },
}

impl BoundaryCondition {
    pub fn apply(&self, field: &mut Field, zone: &Zone) {
        match *self {
            BoundaryCondition::Neumann => mirror_edge(field, zone),
            BoundaryCondition::Relaxed { exclude_own_zone } => {
                relax_zone(field, zone, exclude_own_zone)
            }
            BoundaryCondition::Dirichlet { temperature } => field.fill_zone(zone, temperature),
        }
    }
}

/// Copies the interior neighbour line into a one-cell-thick edge zone.
///
/// Zones that are not on a grid edge are left untouched.
fn mirror_edge(field: &mut Field, zone: &Zone) {
    let n = field.nodes();
    let values = field.values_mut();
    if zone.rows == (0..1) {
        for j in zone.cols.clone() {
            values[[0, j]] = values[[1, j]];
        }
    } else if zone.rows == (n - 1..n) {
        for j in zone.cols.clone() {
            values[[n - 1, j]] = values[[n - 2, j]];
        }
    } else if zone.cols == (0..1) {
        for i in zone.rows.clone() {
            values[[i, 0]] = values[[i, 1]];
        }
    } else if zone.cols == (n - 1..n) {
        for i in zone.rows.clone() {
            values[[i, n - 1]] = values[[i, n - 2]];
        }
    }
}

fn relax_zone(field: &mut Field, zone: &Zone, exclude_own_zone: bool) {
    let n = field.nodes();
    for (i, j) in zone.cells() {
        let mut sum = 0.0;
        let mut count = 0usize;
        let mut visit = |ni: usize, nj: usize| {
            if exclude_own_zone && zone.contains(ni, nj) {
                return;
            }
            sum += field.get(ni, nj);
            count += 1;
        };
        if i > 0 {
            visit(i - 1, j);
        }
        if i + 1 < n {
            visit(i + 1, j);
        }
        if j > 0 {
            visit(i, j - 1);
        }
        if j + 1 < n {
            visit(i, j + 1);
        }
        if count > 0 {
            field.set(i, j, sum / count as f64);
        }
    }
}

/// Boundary passes run after every diffusion step, in order:
/// external border (insulated), wall relaxation, window clamp.
#[derive(Debug, Clone)]
pub struct BoundaryEnforcer {
    pub window_temperature: f64,
}

impl BoundaryEnforcer {
    pub fn new(window_temperature: f64) -> Self {
        Self { window_temperature }
    }

    pub fn apply(&self, field: Field, room: &RoomGeometry) -> Field {
        let field = self.insulate_border(field, room);
        let field = self.relax_walls(field, room);
        self.clamp_windows(field, room)
    }

    pub fn insulate_border(&self, mut field: Field, room: &RoomGeometry) -> Field {
        for zone in room.borders() {
            BoundaryCondition::Neumann.apply(&mut field, zone);
        }
        field
    }

    pub fn relax_walls(&self, mut field: Field, room: &RoomGeometry) -> Field {
        let bc = BoundaryCondition::Relaxed {
            exclude_own_zone: true,
        };
        for zone in room.walls() {
            bc.apply(&mut field, zone);
        }
        field
    }

    pub fn clamp_windows(&self, mut field: Field, room: &RoomGeometry) -> Field {
        let bc = BoundaryCondition::Dirichlet {
            temperature: self.window_temperature,
        };
        for zone in room.windows() {
            bc.apply(&mut field, zone);
        }
        field
    }
}
