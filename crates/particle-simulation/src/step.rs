//! Per-frame physics step
//!
//! Advances every particle by its velocity and resolves, in order: the
//! diffraction panel, the detection screen, mark aging and the out-of-bounds
//! cull. Velocities are per frame; there is no timestep scaling.

use particle_physics::{
    crossing_at_depth, CullBounds, DetectionBehavior, DetectionScreen, DiffractionPanel, Particle,
    Phase,
};

/// Why a particle left the simulation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// Hit the opaque part of the diffraction panel
    AbsorbedByPanel,
    /// Reached the screen and vanished into the aggregate pattern
    Detected,
    /// Mark outlived its configured lifetime
    Expired,
    /// Left the experiment area
    OutOfBounds,
}

/// Read-only inputs for one step
#[derive(Debug, Clone, Copy)]
pub struct StepContext<'a> {
    pub panel: &'a DiffractionPanel,
    /// `None` when no screen is mounted; the screen test is skipped
    pub screen: Option<&'a DetectionScreen>,
    pub cull: &'a CullBounds,
    pub phase: Phase,
    /// Simulation clock in seconds
    pub now: f32,
    pub mark_lifetime: Option<f32>,
}

/// What happened during one step
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Particles that passed through a slit this frame, per aperture
    pub transmitted: [usize; 2],
    pub absorbed: usize,
    pub marked: usize,
    pub vanished: usize,
    pub expired: usize,
    pub culled: usize,
}

impl StepReport {
    /// Screen detections this frame (marks and vanished hits)
    pub fn detections(&self) -> usize {
        self.marked + self.vanished
    }

    pub fn removed(&self) -> usize {
        self.absorbed + self.vanished + self.expired + self.culled
    }
}

/// Outcome for a single particle
enum Fate {
    Survives,
    Removed(Removal),
}

/// Advance all particles one frame.
///
/// Survivors are returned in their original order. Every removed particle is
/// handed to `on_remove` together with the reason, exactly once.
pub fn step_particles<F>(
    particles: Vec<Particle>,
    ctx: &StepContext<'_>,
    mut on_remove: F,
) -> (Vec<Particle>, StepReport)
where
    F: FnMut(Particle, Removal),
{
    let mut report = StepReport::default();
    let mut survivors = Vec::with_capacity(particles.len());

    for mut particle in particles {
        match advance(&mut particle, ctx, &mut report) {
            Fate::Survives => survivors.push(particle),
            Fate::Removed(reason) => on_remove(particle, reason),
        }
    }

    (survivors, report)
}

fn advance(particle: &mut Particle, ctx: &StepContext<'_>, report: &mut StepReport) -> Fate {
    // Integrate
    let previous = particle.position;
    particle.position += particle.velocity;

    // Diffraction panel, tested on the crossing frame only
    if let Some(hit) = crossing_at_depth(previous, particle.position, ctx.panel.depth) {
        match ctx.panel.aperture_at(hit) {
            Some(slit) => report.transmitted[slit] += 1,
            None => {
                report.absorbed += 1;
                return Fate::Removed(Removal::AbsorbedByPanel);
            }
        }
    }

    // Detection screen
    if let Some(screen) = ctx.screen {
        if !particle.is_mark() && particle.position.z >= screen.depth {
            let hit = crossing_at_depth(previous, particle.position, screen.depth)
                .unwrap_or_else(|| particle.position.truncate());

            if screen.covers(hit) {
                match ctx.phase.detection(particle.kind) {
                    DetectionBehavior::Mark => {
                        particle.position.x = hit.x;
                        particle.position.y = hit.y;
                        particle.freeze_as_mark(screen.depth, ctx.now);
                        report.marked += 1;
                    }
                    DetectionBehavior::Vanish => {
                        report.vanished += 1;
                        return Fate::Removed(Removal::Detected);
                    }
                }
            }
        }
    }

    // Mark aging
    if let (Some(lifetime), Some(age)) = (ctx.mark_lifetime, particle.mark_age(ctx.now)) {
        if age > lifetime {
            report.expired += 1;
            return Fate::Removed(Removal::Expired);
        }
    }

    // Out-of-bounds cull
    if ctx.cull.is_outside(particle.position) {
        report.culled += 1;
        return Fate::Removed(Removal::OutOfBounds);
    }

    Fate::Survives
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;
    use particle_physics::{
        ExperimentGeometry, ParticleKind, RenderHandle, HIT_COLOR, MARK_SCALE,
    };

    fn particle(position: Vec3, velocity: Vec3, kind: ParticleKind) -> Particle {
        Particle::new(position, velocity, kind, RenderHandle(0))
    }

    fn ctx(geometry: &ExperimentGeometry, phase: Phase, now: f32) -> StepContext<'_> {
        StepContext {
            panel: &geometry.panel,
            screen: Some(&geometry.screen),
            cull: &geometry.cull,
            phase,
            now,
            mark_lifetime: None,
        }
    }

    /// Run one step and collect removals
    fn run(
        particles: Vec<Particle>,
        ctx: &StepContext<'_>,
    ) -> (Vec<Particle>, Vec<Removal>, StepReport) {
        let mut removed = Vec::new();
        let (survivors, report) = step_particles(particles, ctx, |_, reason| removed.push(reason));
        (survivors, removed, report)
    }

    #[test]
    fn integrates_position() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(0.0, 0.0, 1.0), Vec3::new(0.1, -0.1, 0.5), ParticleKind::Proton);
        let (survivors, removed, _) = run(vec![p], &ctx(&geometry, Phase::Proton, 0.0));
        assert!(removed.is_empty());
        assert_eq!(survivors[0].position, Vec3::new(0.1, -0.1, 1.5));
    }

    #[test]
    fn panel_absorbs_on_crossing_frame() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(0.0, 0.0, 14.5), Vec3::new(0.0, 0.0, 0.6), ParticleKind::Proton);
        let (survivors, removed, report) = run(vec![p], &ctx(&geometry, Phase::Proton, 0.0));
        assert!(survivors.is_empty());
        assert_eq!(removed, vec![Removal::AbsorbedByPanel]);
        assert_eq!(report.absorbed, 1);
    }

    #[test]
    fn panel_is_only_tested_when_crossing() {
        // Drifted outside the slit box after passing through: not absorbed
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(2.0, 0.0, 16.0), Vec3::new(0.2, 0.0, 0.6), ParticleKind::Proton);
        let (survivors, removed, _) = run(vec![p], &ctx(&geometry, Phase::Proton, 0.0));
        assert!(removed.is_empty());
        assert_eq!(survivors.len(), 1);
    }

    #[test]
    fn slit_transmission_is_counted() {
        let geometry = ExperimentGeometry::default();
        let left = particle(Vec3::new(-1.0, 0.0, 14.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let right = particle(Vec3::new(1.0, 0.0, 14.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let (survivors, _, report) = run(vec![left, right], &ctx(&geometry, Phase::Proton, 0.0));
        assert_eq!(survivors.len(), 2);
        assert_eq!(report.transmitted, [1, 1]);
    }

    #[test]
    fn proton_becomes_mark_at_screen_depth() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(1.0, 1.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let (survivors, removed, report) = run(vec![p], &ctx(&geometry, Phase::Proton, 4.0));
        assert!(removed.is_empty());
        assert_eq!(report.marked, 1);

        let mark = &survivors[0];
        assert!(mark.is_mark());
        assert_eq!(mark.position.z, geometry.screen.depth);
        assert_eq!(mark.velocity, Vec3::ZERO);
        assert_eq!(mark.color, HIT_COLOR);
        assert_eq!(mark.scale, MARK_SCALE);
        assert_eq!(mark.mark_time(), 4.0);
    }

    #[test]
    fn marks_are_not_marked_twice() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(1.0, 1.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let (survivors, _, _) = run(vec![p], &ctx(&geometry, Phase::Proton, 1.0));
        let frozen = survivors[0].clone();

        let (survivors, removed, report) = run(survivors, &ctx(&geometry, Phase::Proton, 2.0));
        assert!(removed.is_empty());
        assert_eq!(report.marked, 0);
        assert_eq!(survivors[0], frozen);
    }

    #[test]
    fn electrons_vanish_in_electron_phase() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(0.0, 0.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Electron);
        let (survivors, removed, report) = run(vec![p], &ctx(&geometry, Phase::Electron, 0.0));
        assert!(survivors.is_empty());
        assert_eq!(removed, vec![Removal::Detected]);
        assert_eq!(report.detections(), 1);
    }

    #[test]
    fn observed_electrons_leave_marks() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(0.0, 0.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Electron);
        let (survivors, _, _) = run(vec![p], &ctx(&geometry, Phase::Observer, 0.0));
        assert!(survivors[0].is_mark());
    }

    #[test]
    fn missing_screen_lets_particles_through() {
        let geometry = ExperimentGeometry::default();
        let mut ctx = ctx(&geometry, Phase::Proton, 0.0);
        ctx.screen = None;
        let p = particle(Vec3::new(0.0, 0.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let (survivors, _, report) = run(vec![p], &ctx);
        assert!(!survivors[0].is_mark());
        assert_eq!(report.marked, 0);
    }

    #[test]
    fn misses_beside_the_screen_are_culled() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(12.0, 0.0, 34.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let (survivors, removed, _) = run(vec![p], &ctx(&geometry, Phase::Proton, 0.0));
        assert!(survivors.is_empty());
        assert_eq!(removed, vec![Removal::OutOfBounds]);
    }

    #[test]
    fn marks_expire_after_lifetime() {
        let geometry = ExperimentGeometry::default();
        let p = particle(Vec3::new(0.0, 0.0, 29.8), Vec3::new(0.0, 0.0, 0.5), ParticleKind::Proton);
        let mut ctx = ctx(&geometry, Phase::Proton, 10.0);
        ctx.mark_lifetime = Some(3.0);

        let (survivors, _, _) = run(vec![p], &ctx);
        assert!(survivors[0].is_mark());

        ctx.now = 12.5;
        let (survivors, removed, _) = run(survivors, &ctx);
        assert_eq!(survivors.len(), 1);
        assert!(removed.is_empty());

        ctx.now = 13.5;
        let (survivors, removed, report) = run(survivors, &ctx);
        assert!(survivors.is_empty());
        assert_eq!(removed, vec![Removal::Expired]);
        assert_eq!(report.expired, 1);
    }

    #[test]
    fn survivors_keep_order() {
        let geometry = ExperimentGeometry::default();
        let particles = (0..5)
            .map(|i| {
                let mut p = particle(
                    Vec3::new(0.0, 0.0, 1.0 + i as f32),
                    Vec3::new(0.0, 0.0, 0.5),
                    ParticleKind::Proton,
                );
                p.handle = RenderHandle(i);
                p
            })
            .collect();
        let (survivors, _, _) = run(particles, &ctx(&geometry, Phase::Proton, 0.0));
        let handles: Vec<u32> = survivors.iter().map(|p| p.handle.0).collect();
        assert_eq!(handles, vec![0, 1, 2, 3, 4]);
    }
}
