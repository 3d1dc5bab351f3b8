//! # Particle Physics
//!
//! Particle records, species, experimental phases and the fixed geometry of
//! the double-slit apparatus.

pub mod constants;
pub mod geometry;
pub mod particle;
pub mod phase;

pub use constants::*;
pub use geometry::*;
pub use particle::*;
pub use phase::*;
