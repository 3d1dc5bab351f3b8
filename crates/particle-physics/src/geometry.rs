//! Apparatus geometry: generator, diffraction panel, detection screen
//!
//! Everything here is fixed per scene configuration and treated as read-only
//! by the physics step. All collision tests are axis-aligned.

use crate::constants::*;
use glam::{Vec2, Vec3};

/// Axis-aligned rectangle in the lateral (x, y) plane. Bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LateralRect {
    pub min: Vec2,
    pub max: Vec2,
}

impl LateralRect {
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    /// Rectangle centred on the z axis
    pub fn centered(half_width: f32, half_height: f32) -> Self {
        Self {
            min: Vec2::new(-half_width, -half_height),
            max: Vec2::new(half_width, half_height),
        }
    }

    pub fn contains(&self, point: Vec2) -> bool {
        point.x >= self.min.x && point.x <= self.max.x && point.y >= self.min.y && point.y <= self.max.y
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }
}

/// Where particles are emitted from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Generator {
    /// Depth of the spawn plane
    pub spawn_depth: f32,
    /// Spawn offsets are uniform in [-half_extent, half_extent] on x and y
    pub half_extent: f32,
}

impl Default for Generator {
    fn default() -> Self {
        Self {
            spawn_depth: SPAWN_DEPTH,
            half_extent: SPAWN_HALF_EXTENT,
        }
    }
}

/// Opaque panel with two slit apertures
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiffractionPanel {
    pub depth: f32,
    /// Left and right slit
    pub apertures: [LateralRect; 2],
    /// Outer extent of the panel (visual only, the panel blocks everything outside the slits)
    pub extent: LateralRect,
}

impl Default for DiffractionPanel {
    fn default() -> Self {
        let left = LateralRect::new(
            Vec2::new(-SLIT_OUTER_X, -SLIT_HALF_HEIGHT),
            Vec2::new(-SLIT_INNER_X, SLIT_HALF_HEIGHT),
        );
        let right = LateralRect::new(
            Vec2::new(SLIT_INNER_X, -SLIT_HALF_HEIGHT),
            Vec2::new(SLIT_OUTER_X, SLIT_HALF_HEIGHT),
        );
        Self {
            depth: PANEL_DEPTH,
            apertures: [left, right],
            extent: LateralRect::centered(SCREEN_HALF_WIDTH, SCREEN_HALF_HEIGHT),
        }
    }
}

impl DiffractionPanel {
    /// True when a particle at `point` on the panel plane passes through a slit
    pub fn transmits(&self, point: Vec2) -> bool {
        self.apertures.iter().any(|slit| slit.contains(point))
    }

    /// Index of the aperture (0 = left, 1 = right) a point passes through
    pub fn aperture_at(&self, point: Vec2) -> Option<usize> {
        self.apertures.iter().position(|slit| slit.contains(point))
    }

    /// The five opaque pieces (top, bottom, left, middle, right) that make up
    /// the panel around the two apertures.
    pub fn pieces(&self) -> [LateralRect; 5] {
        let [left, right] = self.apertures;
        let slit_bottom = left.min.y.min(right.min.y);
        let slit_top = left.max.y.max(right.max.y);
        [
            LateralRect::new(
                Vec2::new(self.extent.min.x, slit_top),
                Vec2::new(self.extent.max.x, self.extent.max.y),
            ),
            LateralRect::new(
                Vec2::new(self.extent.min.x, self.extent.min.y),
                Vec2::new(self.extent.max.x, slit_bottom),
            ),
            LateralRect::new(
                Vec2::new(self.extent.min.x, slit_bottom),
                Vec2::new(left.min.x, slit_top),
            ),
            LateralRect::new(
                Vec2::new(left.max.x, slit_bottom),
                Vec2::new(right.min.x, slit_top),
            ),
            LateralRect::new(
                Vec2::new(right.max.x, slit_bottom),
                Vec2::new(self.extent.max.x, slit_top),
            ),
        ]
    }
}

/// Screen particles are detected on
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionScreen {
    pub depth: f32,
    pub bounds: LateralRect,
}

impl Default for DetectionScreen {
    fn default() -> Self {
        Self {
            depth: SCREEN_DEPTH,
            bounds: LateralRect::centered(SCREEN_HALF_WIDTH, SCREEN_HALF_HEIGHT),
        }
    }
}

impl DetectionScreen {
    pub fn covers(&self, point: Vec2) -> bool {
        self.bounds.contains(point)
    }
}

/// Safety net against runaway particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CullBounds {
    pub max_depth: f32,
    pub lateral: f32,
}

impl Default for CullBounds {
    fn default() -> Self {
        Self {
            max_depth: CULL_MAX_DEPTH,
            lateral: CULL_LATERAL,
        }
    }
}

impl CullBounds {
    pub fn is_outside(&self, position: Vec3) -> bool {
        position.z > self.max_depth
            || position.x.abs() > self.lateral
            || position.y.abs() > self.lateral
    }
}

/// Full apparatus layout
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ExperimentGeometry {
    pub generator: Generator,
    pub panel: DiffractionPanel,
    pub screen: DetectionScreen,
    pub cull: CullBounds,
}

/// Point where the segment `from -> to` crosses the plane `z = depth`,
/// projected onto the lateral plane. Returns `None` if the segment does not
/// reach the plane this frame (or started on/behind it).
pub fn crossing_at_depth(from: Vec3, to: Vec3, depth: f32) -> Option<Vec2> {
    if from.z >= depth || to.z < depth {
        return None;
    }
    let t = (depth - from.z) / (to.z - from.z);
    Some(from.truncate().lerp(to.truncate(), t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apertures_are_symmetric() {
        let panel = DiffractionPanel::default();
        assert!(panel.transmits(Vec2::new(-1.0, 0.0)));
        assert!(panel.transmits(Vec2::new(1.0, 0.0)));
        assert!(panel.transmits(Vec2::new(1.5, 2.0)));
        assert!(!panel.transmits(Vec2::new(0.0, 0.0)));
        assert!(!panel.transmits(Vec2::new(3.0, 0.0)));
        assert!(!panel.transmits(Vec2::new(-1.0, 2.5)));
    }

    #[test]
    fn panel_pieces_match_scene_layout() {
        let pieces = DiffractionPanel::default().pieces();
        // top: 20 x 5.5 centred at y = 4.75
        assert_eq!(pieces[0].size(), Vec2::new(20.0, 5.5));
        assert_eq!(pieces[0].center(), Vec2::new(0.0, 4.75));
        // left: 8.5 x 4 centred at x = -5.75
        assert_eq!(pieces[2].size(), Vec2::new(8.5, 4.0));
        assert_eq!(pieces[2].center(), Vec2::new(-5.75, 0.0));
        // middle: 1 x 4 at origin
        assert_eq!(pieces[3].size(), Vec2::new(1.0, 4.0));
        assert_eq!(pieces[3].center(), Vec2::ZERO);
    }

    #[test]
    fn crossing_interpolates_lateral_position() {
        let hit = crossing_at_depth(Vec3::new(0.0, 0.0, 14.0), Vec3::new(2.0, 1.0, 16.0), 15.0);
        assert_eq!(hit, Some(Vec2::new(1.0, 0.5)));

        // Already past the plane: no new crossing
        assert_eq!(
            crossing_at_depth(Vec3::new(0.0, 0.0, 15.0), Vec3::new(0.0, 0.0, 16.0), 15.0),
            None
        );
        // Not yet there
        assert_eq!(
            crossing_at_depth(Vec3::new(0.0, 0.0, 13.0), Vec3::new(0.0, 0.0, 14.5), 15.0),
            None
        );
    }

    #[test]
    fn cull_bounds() {
        let cull = CullBounds::default();
        assert!(!cull.is_outside(Vec3::new(0.0, 0.0, 30.0)));
        assert!(cull.is_outside(Vec3::new(0.0, 0.0, 35.1)));
        assert!(cull.is_outside(Vec3::new(-15.5, 0.0, 10.0)));
        assert!(cull.is_outside(Vec3::new(0.0, 16.0, 10.0)));
    }
}
