//! Simulation parameters for runtime tuning

use particle_physics::{
    SPAWN_LATERAL_SPEED, SPAWN_MAX_FORWARD_SPEED, SPAWN_MIN_FORWARD_SPEED,
};

/// Population control for one continuous phase
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Population {
    /// Particles spawned when the phase is entered
    pub initial_batch: usize,
    /// Steady-state number of particles in flight (marks included)
    pub target: usize,
    /// Upper bound on spawns per frame while below target
    pub max_per_frame: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationParams {
    pub protons: Population,
    pub electrons: Population,

    /// Lateral velocity is uniform in [-lateral_speed, lateral_speed]
    pub lateral_speed: f32,
    /// Forward speed range (scene units per frame)
    pub forward_speed: (f32, f32),

    /// Marks older than this many seconds are removed. `None` keeps them until reset.
    pub mark_lifetime: Option<f32>,

    /// Seconds for the electron interference pattern to fade in
    pub pattern_fade_duration: f32,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            protons: Population {
                initial_batch: 50,
                target: 120,
                max_per_frame: 5,
            },
            electrons: Population {
                initial_batch: 50,
                target: 80,
                max_per_frame: 3,
            },
            lateral_speed: SPAWN_LATERAL_SPEED,
            forward_speed: (SPAWN_MIN_FORWARD_SPEED, SPAWN_MAX_FORWARD_SPEED),
            mark_lifetime: None,
            pattern_fade_duration: 8.0,
        }
    }
}

impl SimulationParams {
    pub fn population(&self, kind: particle_physics::ParticleKind) -> &Population {
        match kind {
            particle_physics::ParticleKind::Proton => &self.protons,
            particle_physics::ParticleKind::Electron => &self.electrons,
        }
    }
}
