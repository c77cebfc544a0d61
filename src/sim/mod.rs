pub mod coupling;
pub mod energy;
pub mod framework;
pub mod heat_transfer;
pub mod index;
