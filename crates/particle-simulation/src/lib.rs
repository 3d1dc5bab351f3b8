//! # Particle Simulation
//!
//! Particle store, per-frame physics step, interference overlay and the
//! experiment controller that drives them.

pub mod experiment;
pub mod params;
pub mod pattern;
pub mod scene;
pub mod step;
pub mod store;

pub use experiment::*;
pub use params::*;
pub use pattern::*;
pub use scene::*;
pub use step::*;
pub use store::*;
