use thiserror::Error;

/// Errors raised while building or validating a room simulation.
///
/// Both variants are fatal: they are reported at initialization and the
/// simulation is never constructed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimError {
    /// Invalid grid size, non-positive material constants or a malformed zone.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// Requested time step exceeds the explicit-scheme stability bound.
    #[error("time step {dt} exceeds the stability bound {max_dt}; the explicit scheme would diverge")]
    NumericalInstability { dt: f64, max_dt: f64 },
}

impl SimError {
    pub(crate) fn config(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}
