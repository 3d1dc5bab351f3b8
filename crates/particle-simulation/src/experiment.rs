//! Experiment controller tying phase, particle store, scene and overlay together

use crate::params::SimulationParams;
use crate::pattern::{FringeParams, InterferencePattern, PatternFade, PatternKind};
use crate::scene::Scene;
use crate::step::{StepContext, StepReport};
use crate::store::ParticleStore;
use particle_physics::{ExperimentGeometry, Phase};

/// Seed of the pre-sampled screen texture
const PATTERN_SEED: u64 = 0x5117;

/// Which auxiliary scene elements are visible this frame
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Visuals {
    pub light_cone: bool,
    pub trapezoids: bool,
    pub observer: bool,
    /// Texture on the screen overlay, `None` when no overlay is shown
    pub pattern: Option<PatternKind>,
    pub pattern_opacity: f32,
}

/// Running totals since the current phase was entered
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Statistics {
    pub detections: usize,
    pub transmitted: [usize; 2],
    pub absorbed: usize,
    pub frames: u64,
}

pub struct Experiment {
    pub params: SimulationParams,
    geometry: ExperimentGeometry,
    store: ParticleStore,
    scene: Scene,
    phase: Phase,
    fade: PatternFade,
    interference: InterferencePattern,
    which_path: InterferencePattern,
    stats: Statistics,
    clock: f32,
    paused: bool,
    step_requested: bool,
}

impl Experiment {
    pub fn new(params: SimulationParams) -> Self {
        let geometry = ExperimentGeometry::default();
        let store = ParticleStore::new(geometry.generator, &params);
        Self::with_store(params, geometry, store)
    }

    /// Controller with reproducible particle spawns
    pub fn seeded(params: SimulationParams, seed: u64) -> Self {
        let geometry = ExperimentGeometry::default();
        let store = ParticleStore::seeded(geometry.generator, &params, seed);
        Self::with_store(params, geometry, store)
    }

    fn with_store(
        params: SimulationParams,
        geometry: ExperimentGeometry,
        store: ParticleStore,
    ) -> Self {
        let fringe = FringeParams::default();
        let interference =
            InterferencePattern::generate(PatternKind::Interference, &fringe, PATTERN_SEED);
        let which_path =
            InterferencePattern::generate(PatternKind::WhichPath, &fringe, PATTERN_SEED);

        let mut experiment = Self {
            params,
            geometry,
            store,
            scene: Scene::new(),
            phase: Phase::default(),
            fade: PatternFade::Hidden,
            interference,
            which_path,
            stats: Statistics::default(),
            clock: 0.0,
            paused: false,
            step_requested: false,
        };
        experiment.enter_phase(Phase::default());
        experiment
    }

    /// Switch phase. Selecting the current phase again restarts it.
    pub fn set_phase(&mut self, phase: Phase) {
        log::info!("Phase: {}", phase.label());
        self.enter_phase(phase);
    }

    pub fn reset(&mut self) {
        log::info!("Reset {} phase", self.phase.label());
        self.enter_phase(self.phase);
    }

    fn enter_phase(&mut self, phase: Phase) {
        self.phase = phase;
        self.store.clear_all(&mut self.scene);
        self.fade.cancel();
        self.stats = Statistics::default();

        if let Some(kind) = phase.species() {
            self.store.apply_params(&self.params);
            let batch = self.params.population(kind).initial_batch;
            self.store.spawn_batch(&mut self.scene, batch, kind);
        }

        self.fade = match phase {
            Phase::LightWave => PatternFade::Shown,
            Phase::Electron | Phase::Observer => {
                PatternFade::start(self.params.pattern_fade_duration)
            }
            Phase::Proton => PatternFade::Hidden,
        };
    }

    /// Erase marks on the screen, particles in flight keep going
    pub fn clear_marks(&mut self) -> usize {
        let cleared = self.store.clear_marks_only(&mut self.scene);
        log::info!("Cleared {} marks", cleared);
        cleared
    }

    /// Advance one frame. Returns `None` while paused.
    pub fn tick(&mut self, dt: f32) -> Option<StepReport> {
        if self.paused && !self.step_requested {
            return None;
        }
        self.step_requested = false;
        self.clock += dt;
        self.stats.frames += 1;

        self.store.apply_params(&self.params);
        if let Some(kind) = self.phase.species() {
            // Marks do not count towards the population in flight
            let population = *self.params.population(kind);
            let spawned = self.store.top_up(
                &mut self.scene,
                population.target + self.store.marks(),
                population.max_per_frame,
                kind,
            );
            if spawned > 0 {
                log::debug!("Topped up {} {}s", spawned, kind.name());
            }
        }

        let ctx = StepContext {
            panel: &self.geometry.panel,
            screen: Some(&self.geometry.screen),
            cull: &self.geometry.cull,
            phase: self.phase,
            now: self.clock,
            mark_lifetime: self.params.mark_lifetime,
        };
        let report = self.store.step(&mut self.scene, &ctx);

        self.fade.advance(dt);
        self.stats.detections += report.detections();
        self.stats.absorbed += report.absorbed;
        self.stats.transmitted[0] += report.transmitted[0];
        self.stats.transmitted[1] += report.transmitted[1];

        Some(report)
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
        log::info!("{}", if self.paused { "Paused" } else { "Resumed" });
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Run exactly one frame on the next tick while paused
    pub fn step_once(&mut self) {
        self.step_requested = true;
    }

    pub fn visuals(&self) -> Visuals {
        Visuals {
            light_cone: self.phase.shows_light_cone(),
            trapezoids: self.phase.shows_trapezoids(),
            observer: self.phase.shows_observer(),
            pattern: self.pattern_kind(),
            pattern_opacity: if self.phase.shows_pattern() {
                self.fade.opacity()
            } else {
                0.0
            },
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generator_label(&self) -> &'static str {
        self.phase.generator_label()
    }

    pub fn description(&self) -> &'static str {
        self.phase.description()
    }

    pub fn statistics(&self) -> Statistics {
        self.stats
    }

    pub fn particle_count(&self) -> usize {
        self.store.count()
    }

    pub fn mark_count(&self) -> usize {
        self.store.marks()
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn geometry(&self) -> &ExperimentGeometry {
        &self.geometry
    }

    /// Overlay texture for the current phase
    pub fn pattern_kind(&self) -> Option<PatternKind> {
        match self.phase {
            Phase::Proton => None,
            Phase::LightWave | Phase::Electron => Some(PatternKind::Interference),
            Phase::Observer => Some(PatternKind::WhichPath),
        }
    }

    pub fn pattern(&self, kind: PatternKind) -> &InterferencePattern {
        match kind {
            PatternKind::Interference => &self.interference,
            PatternKind::WhichPath => &self.which_path,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_physics::ParticleKind;

    fn experiment() -> Experiment {
        Experiment::seeded(SimulationParams::default(), 42)
    }

    #[test]
    fn starts_in_proton_phase_with_initial_batch() {
        let exp = experiment();
        assert_eq!(exp.phase(), Phase::Proton);
        assert_eq!(exp.particle_count(), 50);
        assert_eq!(exp.scene().child_count(), 50);
        assert_eq!(exp.generator_label(), "Proton Generator");
    }

    #[test]
    fn light_wave_spawns_nothing_and_shows_pattern() {
        let mut exp = experiment();
        exp.set_phase(Phase::LightWave);
        assert_eq!(exp.particle_count(), 0);
        let visuals = exp.visuals();
        assert!(visuals.light_cone && visuals.trapezoids);
        assert_eq!(visuals.pattern_opacity, 1.0);

        exp.tick(1.0 / 60.0);
        assert_eq!(exp.particle_count(), 0);
    }

    #[test]
    fn electron_pattern_fades_in() {
        let mut exp = experiment();
        exp.set_phase(Phase::Electron);
        assert_eq!(exp.visuals().pattern_opacity, 0.0);
        assert!(exp
            .store()
            .particles()
            .iter()
            .all(|p| p.kind == ParticleKind::Electron));

        exp.tick(1.0);
        let early = exp.visuals().pattern_opacity;
        assert!(early > 0.0 && early < 1.0);

        for _ in 0..10 {
            exp.tick(1.0);
        }
        assert_eq!(exp.visuals().pattern_opacity, 1.0);
    }

    #[test]
    fn phase_change_cancels_fade() {
        let mut exp = experiment();
        exp.set_phase(Phase::Electron);
        exp.tick(2.0);
        exp.set_phase(Phase::Proton);
        assert_eq!(exp.visuals().pattern_opacity, 0.0);
        assert_eq!(exp.visuals().pattern, None);
        exp.set_phase(Phase::Observer);
        assert_eq!(exp.visuals().pattern_opacity, 0.0);
        assert!(exp.visuals().observer);
    }

    #[test]
    fn observer_fades_in_which_path_bands() {
        let mut exp = experiment();
        exp.set_phase(Phase::Observer);
        assert_eq!(exp.visuals().pattern, Some(PatternKind::WhichPath));

        exp.tick(1.0);
        let early = exp.visuals().pattern_opacity;
        assert!(early > 0.0 && early < 1.0);
        for _ in 0..10 {
            exp.tick(1.0);
        }
        assert_eq!(exp.visuals().pattern_opacity, 1.0);

        let bands = exp.pattern(PatternKind::WhichPath);
        let fringes = exp.pattern(PatternKind::Interference);
        assert_eq!((bands.width, bands.height), (fringes.width, fringes.height));
        assert_ne!(bands.pixels, fringes.pixels);
    }

    #[test]
    fn light_and_electron_phases_use_fringes() {
        let mut exp = experiment();
        exp.set_phase(Phase::LightWave);
        assert_eq!(exp.visuals().pattern, Some(PatternKind::Interference));
        exp.set_phase(Phase::Electron);
        assert_eq!(exp.visuals().pattern, Some(PatternKind::Interference));
    }

    #[test]
    fn marks_do_not_starve_emission() {
        for phase in [Phase::Proton, Phase::Observer] {
            let mut exp = experiment();
            exp.set_phase(phase);
            // Well past the point where persistent marks fill the target
            for _ in 0..1800 {
                exp.tick(1.0 / 60.0);
            }
            let in_flight = exp.store().in_flight();
            assert!(in_flight > 0, "{:?} stopped emitting", phase);
            assert!(in_flight <= exp.params.population(phase.species().unwrap()).target);
            assert!(exp.mark_count() > exp.params.population(phase.species().unwrap()).target);
        }
    }

    #[test]
    fn top_up_is_bounded_per_frame() {
        let mut exp = experiment();
        let before = exp.particle_count();
        exp.tick(1.0 / 60.0);
        // Nothing reaches the panel on the first frame
        assert_eq!(exp.particle_count(), before + 5);
    }

    #[test]
    fn paused_experiment_only_steps_on_request() {
        let mut exp = experiment();
        exp.toggle_pause();
        assert!(exp.tick(0.016).is_none());
        assert_eq!(exp.statistics().frames, 0);

        exp.step_once();
        assert!(exp.tick(0.016).is_some());
        assert!(exp.tick(0.016).is_none());
        assert_eq!(exp.statistics().frames, 1);
    }

    #[test]
    fn protons_accumulate_marks_and_reset_clears_them() {
        let mut exp = experiment();
        for _ in 0..120 {
            exp.tick(1.0 / 60.0);
        }
        assert!(exp.mark_count() > 0);
        assert!(exp.statistics().detections >= exp.mark_count());

        exp.reset();
        assert_eq!(exp.mark_count(), 0);
        assert_eq!(exp.statistics(), Statistics::default());
        assert_eq!(exp.particle_count(), 50);
    }

    #[test]
    fn clear_marks_keeps_particles_in_flight() {
        let mut exp = experiment();
        for _ in 0..80 {
            exp.tick(1.0 / 60.0);
        }
        let marks = exp.mark_count();
        let total = exp.particle_count();
        assert!(marks > 0);

        assert_eq!(exp.clear_marks(), marks);
        assert_eq!(exp.mark_count(), 0);
        assert_eq!(exp.particle_count(), total - marks);
        assert_eq!(exp.scene().child_count(), total - marks);
    }

    #[test]
    fn electrons_never_leave_marks_in_electron_phase() {
        let mut exp = experiment();
        exp.set_phase(Phase::Electron);
        for _ in 0..120 {
            exp.tick(1.0 / 60.0);
        }
        assert_eq!(exp.mark_count(), 0);
        assert!(exp.statistics().detections > 0);
    }

    #[test]
    fn observer_phase_leaves_marks() {
        let mut exp = experiment();
        exp.set_phase(Phase::Observer);
        for _ in 0..120 {
            exp.tick(1.0 / 60.0);
        }
        assert!(exp.mark_count() > 0);
    }
}
