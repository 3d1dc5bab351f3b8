//! Aggregate interference pattern shown on the detection screen
//!
//! Electrons vanish on detection, so their statistics are shown as a
//! pre-sampled speckle texture that fades in over time instead of as
//! individual marks.

use particle_physics::{
    PANEL_DEPTH, SCREEN_DEPTH, SCREEN_HALF_HEIGHT, SCREEN_HALF_WIDTH, SLIT_INNER_X, SLIT_OUTER_X,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f32::consts::PI;

/// Parameters of the analytic fringe function
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FringeParams {
    /// Distance between slit centres
    pub slit_separation: f32,
    pub wavelength: f32,
    /// Distance from the slits to the screen
    pub screen_distance: f32,
    /// Width of the Gaussian envelope
    pub envelope_sigma: f32,
}

impl Default for FringeParams {
    fn default() -> Self {
        Self {
            slit_separation: SLIT_INNER_X + SLIT_OUTER_X,
            wavelength: 0.2,
            screen_distance: SCREEN_DEPTH - PANEL_DEPTH,
            envelope_sigma: 3.5,
        }
    }
}

impl FringeParams {
    /// Relative hit probability at lateral position `x`, in [0, 1]
    pub fn intensity(&self, x: f32) -> f32 {
        let phase = PI * self.slit_separation * x / (self.wavelength * self.screen_distance);
        let fringe = phase.cos().powi(2);
        fringe * self.envelope(x)
    }

    /// Which-path distribution: one Gaussian band behind each slit, no fringes
    pub fn which_path_intensity(&self, x: f32) -> f32 {
        let half = self.slit_separation * 0.5;
        let band = |centre: f32| {
            let d = x - centre;
            (-(d * d) / (2.0 * (self.envelope_sigma * 0.35).powi(2))).exp()
        };
        band(-half).max(band(half)) * self.envelope(x)
    }

    /// Distance between neighbouring bright fringes
    pub fn fringe_spacing(&self) -> f32 {
        self.wavelength * self.screen_distance / self.slit_separation
    }

    fn envelope(&self, x: f32) -> f32 {
        (-(x * x) / (2.0 * self.envelope_sigma * self.envelope_sigma)).exp()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternKind {
    Interference,
    WhichPath,
}

/// RGBA8 image of accumulated hits covering the whole screen rectangle
#[derive(Clone, Debug)]
pub struct InterferencePattern {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
    /// Lateral screen positions of every sampled hit
    pub hits: Vec<[f32; 2]>,
}

pub const PATTERN_WIDTH: u32 = 512;
pub const PATTERN_HEIGHT: u32 = 384;
pub const PATTERN_HITS: usize = 6000;

impl InterferencePattern {
    pub fn generate(kind: PatternKind, fringe: &FringeParams, seed: u64) -> Self {
        Self::generate_sized(kind, fringe, PATTERN_WIDTH, PATTERN_HEIGHT, PATTERN_HITS, seed)
    }

    /// Rejection-sample `hit_count` lateral positions from the fringe function
    /// and splat them as small dots onto a transparent image.
    pub fn generate_sized(
        kind: PatternKind,
        fringe: &FringeParams,
        width: u32,
        height: u32,
        hit_count: usize,
        seed: u64,
    ) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut pixels = vec![0u8; (width * height * 4) as usize];
        let mut hits = Vec::with_capacity(hit_count);

        let density = |x: f32| match kind {
            PatternKind::Interference => fringe.intensity(x),
            PatternKind::WhichPath => fringe.which_path_intensity(x),
        };

        while hits.len() < hit_count {
            let x = rng.random_range(-SCREEN_HALF_WIDTH..SCREEN_HALF_WIDTH);
            if rng.random::<f32>() > density(x) {
                continue;
            }
            let y = rng.random_range(-SCREEN_HALF_HEIGHT..SCREEN_HALF_HEIGHT);
            hits.push([x, y]);

            let px = ((x / SCREEN_HALF_WIDTH * 0.5 + 0.5) * width as f32) as i64;
            // Image rows run top to bottom
            let py = ((0.5 - y / SCREEN_HALF_HEIGHT * 0.5) * height as f32) as i64;
            let brightness = rng.random_range(160..=255u8);
            splat(&mut pixels, width, height, px, py, brightness);
        }

        Self {
            width,
            height,
            pixels,
            hits,
        }
    }

    /// Alpha value at a pixel, 0 for out-of-range coordinates
    pub fn alpha_at(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.pixels[((y * self.width + x) * 4 + 3) as usize]
    }
}

/// Draw a plus-shaped dot, keeping the brightest value per pixel
fn splat(pixels: &mut [u8], width: u32, height: u32, cx: i64, cy: i64, brightness: u8) {
    const OFFSETS: [(i64, i64); 5] = [(0, 0), (1, 0), (-1, 0), (0, 1), (0, -1)];
    for (dx, dy) in OFFSETS {
        let (x, y) = (cx + dx, cy + dy);
        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            continue;
        }
        let i = ((y as u32 * width + x as u32) * 4) as usize;
        let value = if (dx, dy) == (0, 0) {
            brightness
        } else {
            brightness / 2
        };
        if value > pixels[i + 3] {
            pixels[i] = value;
            pixels[i + 1] = value;
            pixels[i + 2] = value;
            pixels[i + 3] = value;
        }
    }
}

/// Cubic ease-out: fast start, gentle settle at 1
pub fn ease_out_cubic(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}

/// Opacity of the pattern overlay.
///
/// Advanced by the frame tick, so cancelling is just resetting the state.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum PatternFade {
    #[default]
    Hidden,
    Shown,
    FadingIn { elapsed: f32, duration: f32 },
}

impl PatternFade {
    pub fn start(duration: f32) -> Self {
        if duration <= 0.0 {
            return Self::Shown;
        }
        Self::FadingIn {
            elapsed: 0.0,
            duration,
        }
    }

    /// Advance by `dt` seconds, settling on `Shown` once complete
    pub fn advance(&mut self, dt: f32) {
        if let Self::FadingIn { elapsed, duration } = *self {
            let elapsed = elapsed + dt.max(0.0);
            *self = if elapsed >= duration {
                Self::Shown
            } else {
                Self::FadingIn { elapsed, duration }
            };
        }
    }

    pub fn cancel(&mut self) {
        *self = Self::Hidden;
    }

    pub fn opacity(&self) -> f32 {
        match *self {
            Self::Hidden => 0.0,
            Self::Shown => 1.0,
            Self::FadingIn { elapsed, duration } => {
                ease_out_cubic((elapsed / duration).clamp(0.0, 1.0))
            }
        }
    }
}
