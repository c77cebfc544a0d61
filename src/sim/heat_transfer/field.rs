use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::geom::zone::Zone;

/// Nodal temperature field [°C] on an `N × N` grid, indexed `(row, col)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Field {
    values: Array2<f64>,
}

impl Field {
    /// Field of `nodes × nodes` cells at a uniform temperature.
    pub fn uniform(nodes: usize, temperature: f64) -> Self {
        Self {
            values: Array2::from_elem((nodes, nodes), temperature),
        }
    }

    pub fn from_array(values: Array2<f64>) -> Self {
        Self { values }
    }

    pub fn nodes(&self) -> usize {
        self.values.nrows()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[[i, j]]
    }

    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.values[[i, j]] = value;
    }

    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    pub fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    /// Sets every cell of `zone` to `temperature`.
    pub fn fill_zone(&mut self, zone: &Zone, temperature: f64) {
        for (i, j) in zone.cells() {
            self.values[[i, j]] = temperature;
        }
    }

    /// Arithmetic mean over the cells of `zone`.
    pub fn zone_mean(&self, zone: &Zone) -> f64 {
        let n = zone.cell_count();
        if n == 0 {
            return 0.0;
        }
        zone.cells().map(|(i, j)| self.values[[i, j]]).sum::<f64>() / n as f64
    }

    /// Sum of all cell temperatures.
    pub fn sum(&self) -> f64 {
        self.values.sum()
    }

    /// Sum over interior cells (`0 < i, j < N-1`).
    pub fn interior_sum(&self) -> f64 {
        let n = self.nodes();
        if n < 3 {
            return 0.0;
        }
        self.values.slice(ndarray::s![1..n - 1, 1..n - 1]).sum()
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::INFINITY, f64::min)
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// Row-major copy for renderers and JSON export.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.values.outer_iter().map(|row| row.to_vec()).collect()
    }
}
