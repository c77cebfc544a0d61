use crate::error::SimError;
use crate::sim::heat_transfer::field::Field;
use crate::sim::index::ZoneIndex;

/// Largest stable forward-Euler step for 2D diffusion on spacings `dx`, `dy`.
///
/// Each axis alone admits `h²/(4*alpha)`; the smaller of the two keeps
/// `alpha*dt*(1/dx² + 1/dy²) <= 1/2` on a square grid.
pub fn max_stable_time_step(alpha: f64, dx: f64, dy: f64) -> f64 {
    (dx * dx / (4.0 * alpha)).min(dy * dy / (4.0 * alpha))
}

/// Dimensionless diffusion number `alpha*dt*(1/dx² + 1/dy²)`. Must not exceed 0.5.
pub fn diffusion_number(alpha: f64, dt: f64, dx: f64, dy: f64) -> f64 {
    alpha * dt * (1.0 / (dx * dx) + 1.0 / (dy * dy))
}

/// Explicit (forward Euler) finite-difference stepper with a centered
/// 5-point Laplacian.
///
/// ```text
/// u[i,j] = w[i,j] + dt*alpha*( (w[i-1,j] - 2w[i,j] + w[i+1,j]) / dx²
///                            + (w[i,j-1] - 2w[i,j] + w[i,j+1]) / dy² )
/// ```
///
/// Only interior cells outside walls and the external border are advanced.
/// Cells holding exactly `fixed_value` (the window temperature) are skipped
/// too; everything skipped is left for the boundary passes.
#[derive(Debug, Clone)]
pub struct DiffusionStepper {
    alpha: f64,
    dx: f64,
    dy: f64,
    dt: f64,
    fixed_value: f64,
}

impl DiffusionStepper {
    /// Creates a stepper. `dt = None` selects the stability bound; an explicit
    /// step above the bound is refused.
    pub fn new(
        alpha: f64,
        spacing: f64,
        dt: Option<f64>,
        fixed_value: f64,
    ) -> Result<Self, SimError> {
        if !(alpha.is_finite() && alpha > 0.0) {
            return Err(SimError::config(format!(
                "diffusivity must be positive, got {alpha}"
            )));
        }
        if !(spacing.is_finite() && spacing > 0.0) {
            return Err(SimError::config(format!(
                "grid spacing must be positive, got {spacing}"
            )));
        }
        let max_dt = max_stable_time_step(alpha, spacing, spacing);
        let dt = match dt {
            None => max_dt,
            Some(dt) if !(dt.is_finite() && dt > 0.0) => {
                return Err(SimError::config(format!(
                    "time step must be positive, got {dt}"
                )));
            }
            Some(dt) if dt > max_dt => {
                return Err(SimError::NumericalInstability { dt, max_dt });
            }
            Some(dt) => dt,
        };
        Ok(Self {
            alpha,
            dx: spacing,
            dy: spacing,
            dt,
            fixed_value,
        })
    }

    pub fn dt(&self) -> f64 {
        self.dt
    }

    pub fn diffusion_number(&self) -> f64 {
        diffusion_number(self.alpha, self.dt, self.dx, self.dy)
    }

    /// Advances `w` by one step and returns the new field. `w` is read only.
    pub fn step(&self, w: &Field, index: &ZoneIndex) -> Field {
        let n = w.nodes();
        let mut u = w.clone();
        let a = w.values();
        let inv_dx2 = 1.0 / (self.dx * self.dx);
        let inv_dy2 = 1.0 / (self.dy * self.dy);
        let k = self.dt * self.alpha;

        let out = u.values_mut();
        for i in 1..n - 1 {
            for j in 1..n - 1 {
                let c = a[[i, j]];
                if index.blocks_diffusion(i, j) || c == self.fixed_value {
                    continue;
                }
                let dd_x = (a[[i - 1, j]] - 2.0 * c + a[[i + 1, j]]) * inv_dx2;
                let dd_y = (a[[i, j - 1]] - 2.0 * c + a[[i, j + 1]]) * inv_dy2;
                out[[i, j]] = c + k * (dd_x + dd_y);
            }
        }
        u
    }
}
