//! End-to-end runs of the store and physics step through the double-slit apparatus

use glam::Vec3;
use particle_physics::{
    ExperimentGeometry, Generator, ParticleKind, Phase, HIT_COLOR, MARK_SCALE, SCREEN_DEPTH,
};
use particle_simulation::{ParticleStore, Scene, SimulationParams, StepContext, StepReport};

struct Bench {
    geometry: ExperimentGeometry,
    store: ParticleStore,
    scene: Scene,
    now: f32,
}

impl Bench {
    fn new(seed: u64) -> Self {
        let params = SimulationParams::default();
        Self {
            geometry: ExperimentGeometry::default(),
            store: ParticleStore::seeded(Generator::default(), &params, seed),
            scene: Scene::new(),
            now: 0.0,
        }
    }

    fn step(&mut self, phase: Phase) -> StepReport {
        self.now += 1.0 / 60.0;
        let ctx = StepContext {
            panel: &self.geometry.panel,
            screen: Some(&self.geometry.screen),
            cull: &self.geometry.cull,
            phase,
            now: self.now,
            mark_lifetime: None,
        };
        self.store.step(&mut self.scene, &ctx)
    }
}

#[test]
fn straight_shot_through_left_slit_leaves_a_mark() {
    let mut bench = Bench::new(1);
    bench.store.spawn_at(
        &mut bench.scene,
        Vec3::new(-1.0, 0.0, 0.5),
        Vec3::new(0.0, 0.0, 0.6),
        ParticleKind::Proton,
    );

    let mut transmitted = [0; 2];
    for _ in 0..200 {
        let report = bench.step(Phase::Proton);
        transmitted[0] += report.transmitted[0];
        transmitted[1] += report.transmitted[1];
    }

    assert_eq!(transmitted, [1, 0]);
    assert_eq!(bench.store.count(), 1);
    let mark = &bench.store.particles()[0];
    assert!(mark.is_mark());
    assert_eq!(mark.position, Vec3::new(-1.0, 0.0, SCREEN_DEPTH));
    assert_eq!(mark.velocity, Vec3::ZERO);
    assert_eq!(mark.color, HIT_COLOR);
    assert_eq!(mark.scale, MARK_SCALE);
    assert_eq!(
        bench.scene.get(mark.handle).map(|i| i.color),
        Some(HIT_COLOR)
    );
}

#[test]
fn particle_aimed_at_solid_panel_is_absorbed_on_crossing() {
    let mut bench = Bench::new(2);
    bench.store.spawn_at(
        &mut bench.scene,
        Vec3::new(3.0, 0.0, 0.5),
        Vec3::new(0.0, 0.0, 0.5),
        ParticleKind::Proton,
    );

    // z reaches 15.0 on frame 29
    let mut absorbed_on = None;
    for frame in 1..=40 {
        let report = bench.step(Phase::Proton);
        if report.absorbed > 0 {
            absorbed_on = Some(frame);
            break;
        }
        assert_eq!(bench.store.count(), 1);
    }
    assert_eq!(absorbed_on, Some(29));
    assert_eq!(bench.store.count(), 0);
    assert_eq!(bench.scene.child_count(), 0);
}

#[test]
fn depth_never_decreases_and_marks_stay_frozen() {
    let mut bench = Bench::new(3);
    bench
        .store
        .spawn_batch(&mut bench.scene, 200, ParticleKind::Proton);

    let mut last_z: Vec<(particle_physics::RenderHandle, f32)> = bench
        .store
        .particles()
        .iter()
        .map(|p| (p.handle, p.position.z))
        .collect();
    let mut frozen: Vec<(particle_physics::RenderHandle, Vec3)> = Vec::new();

    for _ in 0..150 {
        bench.step(Phase::Proton);
        for p in bench.store.particles() {
            if let Some((_, z)) = last_z.iter().find(|(h, _)| *h == p.handle) {
                assert!(p.position.z >= *z);
            }
            if p.is_mark() {
                match frozen.iter().find(|(h, _)| *h == p.handle) {
                    Some((_, position)) => assert_eq!(p.position, *position),
                    None => frozen.push((p.handle, p.position)),
                }
                assert_eq!(p.velocity, Vec3::ZERO);
            }
        }
        last_z = bench
            .store
            .particles()
            .iter()
            .map(|p| (p.handle, p.position.z))
            .collect();
    }

    assert!(!frozen.is_empty());
    assert_eq!(bench.scene.child_count(), bench.store.count());
}

#[test]
fn electron_phase_hits_vanish_exactly_once() {
    let mut bench = Bench::new(4);
    bench.store.spawn_at(
        &mut bench.scene,
        Vec3::new(1.0, 0.5, 0.5),
        Vec3::new(0.0, 0.0, 0.7),
        ParticleKind::Electron,
    );

    let mut vanished = 0;
    for _ in 0..100 {
        vanished += bench.step(Phase::Electron).vanished;
    }
    assert_eq!(vanished, 1);
    assert_eq!(bench.store.count(), 0);
    assert_eq!(bench.scene.child_count(), 0);
}

#[test]
fn batch_and_clear_keep_scene_in_sync() {
    let mut bench = Bench::new(5);
    let before = bench.scene.child_count();
    bench
        .store
        .spawn_batch(&mut bench.scene, 50, ParticleKind::Proton);
    assert_eq!(bench.store.count(), 50);
    assert_eq!(bench.scene.child_count(), before + 50);

    for _ in 0..30 {
        bench.step(Phase::Proton);
        bench
            .store
            .top_up(&mut bench.scene, 120, 5, ParticleKind::Proton);
        assert_eq!(bench.scene.child_count(), bench.store.count());
    }

    bench.store.clear_all(&mut bench.scene);
    assert_eq!(bench.store.count(), 0);
    assert_eq!(bench.scene.child_count(), 0);
}
