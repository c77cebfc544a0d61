//! Explicit finite-difference heat conduction on the room grid.
//!
//! # Architecture
//!
//! ```text
//! Field ──► DiffusionStepper::step() ──► BoundaryEnforcer::apply() ──► Field
//!                (5-point Laplacian)       (border, walls, windows)
//! ```
//!
//! The stepper only advances free interior cells; every zone-governed cell
//! is fixed up by the boundary passes afterwards.

pub mod boundary;
pub mod field;
pub mod module;
pub mod solver;

pub use boundary::{BoundaryCondition, BoundaryEnforcer};
pub use field::Field;
pub use module::{BoundaryModule, DiffusionModule};
pub use solver::{DiffusionStepper, diffusion_number, max_stable_time_step};
