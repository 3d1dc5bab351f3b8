//! Particle records and their GPU instance representation

use crate::constants::*;
use bytemuck::{Pod, Zeroable};
use glam::Vec3;

/// Species of a test body
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Proton = 0,
    Electron = 1,
}

impl ParticleKind {
    /// Colour while in flight
    pub fn color(self) -> [f32; 4] {
        match self {
            ParticleKind::Proton => PROTON_COLOR,
            ParticleKind::Electron => ELECTRON_COLOR,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ParticleKind::Proton => "proton",
            ParticleKind::Electron => "electron",
        }
    }
}

/// Handle to the renderable object a particle draws through.
///
/// Handles are issued by the scene registry and are only meaningful for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RenderHandle(pub u32);

/// One quantum/classical test body in flight (or frozen on the screen)
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub position: Vec3,
    pub velocity: Vec3,
    pub kind: ParticleKind,
    /// Set once the particle struck the detection screen. Never reset.
    is_mark: bool,
    /// Simulation time (seconds) the mark was created
    mark_time: f32,
    pub color: [f32; 4],
    pub scale: f32,
    pub handle: RenderHandle,
}

impl Particle {
    pub fn new(position: Vec3, velocity: Vec3, kind: ParticleKind, handle: RenderHandle) -> Self {
        Self {
            position,
            velocity,
            kind,
            is_mark: false,
            mark_time: 0.0,
            color: kind.color(),
            scale: 1.0,
            handle,
        }
    }

    pub fn is_mark(&self) -> bool {
        self.is_mark
    }

    pub fn mark_time(&self) -> f32 {
        self.mark_time
    }

    /// Freeze the particle on the screen at `depth`.
    ///
    /// Returns false if it already was a mark; the transition only happens once.
    pub fn freeze_as_mark(&mut self, depth: f32, now: f32) -> bool {
        if self.is_mark {
            return false;
        }
        self.position.z = depth;
        self.velocity = Vec3::ZERO;
        self.color = HIT_COLOR;
        self.scale = MARK_SCALE;
        self.is_mark = true;
        self.mark_time = now;
        true
    }

    /// Seconds since the mark was created, `None` while still in flight
    pub fn mark_age(&self, now: f32) -> Option<f32> {
        self.is_mark.then(|| now - self.mark_time)
    }

    pub fn instance(&self) -> ParticleInstance {
        ParticleInstance {
            position: self.position.to_array(),
            size: PARTICLE_SIZE * self.scale,
            color: self.color,
        }
    }
}

/// GPU-compatible per-particle instance data
/// Aligned for WGSL struct compatibility (32 bytes)
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    /// Billboard radius
    pub size: f32,
    pub color: [f32; 4],
}
