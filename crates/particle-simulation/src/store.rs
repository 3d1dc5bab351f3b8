//! Particle store: sole owner of particle lifetime

use crate::params::SimulationParams;
use crate::scene::Scene;
use crate::step::{step_particles, Removal, StepContext, StepReport};
use glam::Vec3;
use particle_physics::{Generator, Particle, ParticleKind};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Ordered collection of live particles.
///
/// Every particle has exactly one scene object; the store attaches it on
/// spawn and detaches it on removal.
pub struct ParticleStore {
    particles: Vec<Particle>,
    generator: Generator,
    lateral_speed: f32,
    forward_speed: (f32, f32),
    rng: StdRng,
}

impl ParticleStore {
    pub fn new(generator: Generator, params: &SimulationParams) -> Self {
        Self::with_rng(generator, params, StdRng::from_os_rng())
    }

    /// Store with a fixed seed for reproducible spawns
    pub fn seeded(generator: Generator, params: &SimulationParams, seed: u64) -> Self {
        Self::with_rng(generator, params, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: Generator, params: &SimulationParams, rng: StdRng) -> Self {
        Self {
            particles: Vec::new(),
            generator,
            lateral_speed: params.lateral_speed,
            forward_speed: params.forward_speed,
            rng,
        }
    }

    /// Pick up spawn ranges changed at runtime
    pub fn apply_params(&mut self, params: &SimulationParams) {
        self.lateral_speed = params.lateral_speed;
        self.forward_speed = params.forward_speed;
    }

    /// Spawn one particle at the generator with a random offset and velocity
    pub fn spawn_one(&mut self, scene: &mut Scene, kind: ParticleKind) -> &Particle {
        let extent = self.generator.half_extent;
        let position = Vec3::new(
            self.rng.random_range(-extent..=extent),
            self.rng.random_range(-extent..=extent),
            self.generator.spawn_depth,
        );

        let lateral = self.lateral_speed;
        let (min_speed, max_speed) = self.forward_speed;
        let velocity = Vec3::new(
            self.rng.random_range(-lateral..=lateral),
            self.rng.random_range(-lateral..=lateral),
            self.rng.random_range(min_speed..=max_speed.max(min_speed)),
        );

        self.spawn_at(scene, position, velocity, kind)
    }

    /// Spawn one particle with an explicit position and velocity
    pub fn spawn_at(
        &mut self,
        scene: &mut Scene,
        position: Vec3,
        velocity: Vec3,
        kind: ParticleKind,
    ) -> &Particle {
        let mut particle = Particle::new(position, velocity, kind, Default::default());
        particle.handle = scene.attach(particle.instance());
        self.particles.push(particle);
        &self.particles[self.particles.len() - 1]
    }

    /// Clear the store, then spawn `count` fresh particles
    pub fn spawn_batch(&mut self, scene: &mut Scene, count: usize, kind: ParticleKind) {
        self.clear_all(scene);
        for _ in 0..count {
            self.spawn_one(scene, kind);
        }
        log::debug!("Spawned batch of {} {}s", count, kind.name());
    }

    /// Spawn up to `max_per_frame` particles while below `target`.
    /// Returns how many were spawned.
    pub fn top_up(
        &mut self,
        scene: &mut Scene,
        target: usize,
        max_per_frame: usize,
        kind: ParticleKind,
    ) -> usize {
        let missing = target.saturating_sub(self.particles.len());
        let to_add = missing.min(max_per_frame);
        for _ in 0..to_add {
            self.spawn_one(scene, kind);
        }
        to_add
    }

    /// Detach a particle from the scene and drop it
    pub fn remove(scene: &mut Scene, particle: Particle) {
        scene.detach(particle.handle);
    }

    pub fn clear_all(&mut self, scene: &mut Scene) {
        for particle in self.particles.drain(..) {
            Self::remove(scene, particle);
        }
    }

    /// Remove marks only, particles in flight are untouched
    pub fn clear_marks_only(&mut self, scene: &mut Scene) -> usize {
        let (marks, in_flight): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.particles).into_iter().partition(Particle::is_mark);
        let cleared = marks.len();
        for mark in marks {
            Self::remove(scene, mark);
        }
        self.particles = in_flight;
        cleared
    }

    pub fn count(&self) -> usize {
        self.particles.len()
    }

    pub fn marks(&self) -> usize {
        self.particles.iter().filter(|p| p.is_mark()).count()
    }

    /// Particles still travelling towards the screen
    pub fn in_flight(&self) -> usize {
        self.count() - self.marks()
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    /// Run one physics step, detach removed particles and sync survivor
    /// visuals into the scene.
    pub fn step(&mut self, scene: &mut Scene, ctx: &StepContext<'_>) -> StepReport {
        let particles = std::mem::take(&mut self.particles);
        let (survivors, report) = step_particles(particles, ctx, |particle, reason: Removal| {
            log::trace!("{} removed: {:?}", particle.kind.name(), reason);
            Self::remove(scene, particle);
        });

        for particle in &survivors {
            scene.update(particle.handle, particle.instance());
        }
        self.particles = survivors;
        report
    }
}
