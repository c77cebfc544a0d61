//! Step pipeline runtime.
//!
//! A simulation step is a sequence of [`SimModule`]s that exchange typed
//! payloads through a [`Bus`]. The order of modules in the [`Pipeline`] is
//! the order of the physical passes.

pub mod bus;
pub mod context;
pub mod module;
pub mod pipeline;

pub use bus::Bus;
pub use context::SimContext;
pub use module::SimModule;
pub use pipeline::Pipeline;
