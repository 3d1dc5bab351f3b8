//! Orbit camera and responsive window layout

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec2, Vec3, Vec4Swizzles};

/// Initial camera placement, looking across the apparatus from the generator side
pub const HOME_POSITION: Vec3 = Vec3::new(-19.166, 9.638, 5.055);
pub const HOME_TARGET: Vec3 = Vec3::new(1.67, -3.087, 16.502);

pub const MIN_DISTANCE: f32 = 1.0;
pub const MAX_DISTANCE: f32 = 60.0;

/// Camera uniform for GPU
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub right: [f32; 3],
    pub particle_size: f32,
    pub up: [f32; 3],
    pub _padding: f32,
}

/// Camera orbiting a target point
pub struct Camera {
    pub distance: f32,
    pub rotation: Quat,
    pub target: Vec3,
    pub aspect: f32,
    pub fovy: f32,
    pub znear: f32,
    pub zfar: f32,
    /// Translation applied to the whole scene before viewing
    pub scene_offset: Vec3,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self::looking_at(HOME_POSITION, HOME_TARGET, width, height)
    }

    /// Place the camera at `position`, orbiting `target`
    pub fn looking_at(position: Vec3, target: Vec3, width: u32, height: u32) -> Self {
        let offset = position - target;
        Self {
            distance: offset.length().clamp(MIN_DISTANCE, MAX_DISTANCE),
            rotation: orbit_rotation(offset),
            target,
            aspect: aspect(width, height),
            fovy: 75.0_f32.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
            scene_offset: Vec3::ZERO,
        }
    }

    /// Return to the initial placement, keeping aspect and layout
    pub fn reset(&mut self) {
        let home = Self::looking_at(HOME_POSITION, HOME_TARGET, 1, 1);
        self.distance = home.distance;
        self.rotation = home.rotation;
        self.target = home.target;
    }

    pub fn position(&self) -> Vec3 {
        let offset = self.rotation * Vec3::new(0.0, 0.0, self.distance);
        self.target + offset
    }

    pub fn rotate(&mut self, delta_x: f32, delta_y: f32) {
        // Yaw around world up keeps the horizon level
        let yaw_rotation = Quat::from_axis_angle(Vec3::Y, delta_x);

        let right = self.rotation * Vec3::X;
        let pitch_rotation = Quat::from_axis_angle(right, -delta_y);

        let rotation = (yaw_rotation * pitch_rotation * self.rotation).normalize();
        // Refuse to pitch over the poles
        if (rotation * Vec3::Y).y > 0.01 {
            self.rotation = rotation;
        } else {
            self.rotation = (yaw_rotation * self.rotation).normalize();
        }
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance + delta).clamp(MIN_DISTANCE, MAX_DISTANCE);
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.aspect = aspect(width, height);
    }

    pub fn apply_layout(&mut self, layout: &ResponsiveLayout) {
        self.scene_offset = layout.scene_offset;
        if let Some(distance) = layout.camera_distance {
            self.distance = distance.clamp(MIN_DISTANCE, MAX_DISTANCE);
        }
    }

    pub fn build_view_projection_matrix(&self) -> Mat4 {
        let position = self.position();
        let rotation_matrix = Mat4::from_quat(self.rotation.conjugate());
        let translation_matrix = Mat4::from_translation(-position);
        let view = rotation_matrix * translation_matrix * Mat4::from_translation(self.scene_offset);
        let proj = Mat4::perspective_rh(self.fovy, self.aspect, self.znear, self.zfar);
        proj * view
    }

    pub fn to_uniform(&self, particle_size: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.build_view_projection_matrix().to_cols_array_2d(),
            right: (self.rotation * Vec3::X).to_array(),
            particle_size,
            up: (self.rotation * Vec3::Y).to_array(),
            _padding: 0.0,
        }
    }

    /// Project a world point to window pixels (origin top-left).
    /// `None` if the point is behind the camera.
    pub fn world_to_screen(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.build_view_projection_matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x * 0.5 + 0.5) * width,
            (0.5 - ndc.y * 0.5) * height,
        ))
    }
}

fn aspect(width: u32, height: u32) -> f32 {
    width.max(1) as f32 / height.max(1) as f32
}

/// Rotation whose local +Z points along `offset` with world up kept upright
fn orbit_rotation(offset: Vec3) -> Quat {
    let back = offset.try_normalize().unwrap_or(Vec3::Z);
    let right = Vec3::Y.cross(back).try_normalize().unwrap_or(Vec3::X);
    let up = back.cross(right);
    Quat::from_mat3(&Mat3::from_cols(right, up, back)).normalize()
}

/// Scene placement derived from the window shape
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ResponsiveLayout {
    pub scene_offset: Vec3,
    /// Forced camera distance, `None` leaves the user's zoom alone
    pub camera_distance: Option<f32>,
}

impl ResponsiveLayout {
    pub fn for_window(width: u32, height: u32) -> Self {
        if height <= width {
            return Self {
                scene_offset: Vec3::ZERO,
                camera_distance: None,
            };
        }
        let lift = if height <= 667 { 12.0 } else { 5.0 };
        Self {
            scene_offset: Vec3::new(0.0, lift, 0.0),
            camera_distance: Some(55.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-3
    }

    #[test]
    fn starts_at_home_position() {
        let camera = Camera::new(1280, 720);
        assert!(approx(camera.position(), HOME_POSITION));
        assert!(approx(camera.target, HOME_TARGET));
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::new(800, 600);
        camera.zoom(1000.0);
        assert_eq!(camera.distance, MAX_DISTANCE);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, MIN_DISTANCE);
    }

    #[test]
    fn target_projects_to_window_centre() {
        let camera = Camera::new(800, 600);
        let centre = camera
            .world_to_screen(camera.target, 800.0, 600.0)
            .unwrap();
        assert!((centre - Vec2::new(400.0, 300.0)).length() < 0.5);

        let behind = camera.position() + (camera.position() - camera.target);
        assert!(camera.world_to_screen(behind, 800.0, 600.0).is_none());
    }

    #[test]
    fn reset_restores_orbit() {
        let mut camera = Camera::new(800, 600);
        camera.rotate(0.7, 0.2);
        camera.zoom(10.0);
        camera.reset();
        assert!(approx(camera.position(), HOME_POSITION));
    }

    #[test]
    fn landscape_layout_is_neutral() {
        let layout = ResponsiveLayout::for_window(1920, 1080);
        assert_eq!(layout.scene_offset, Vec3::ZERO);
        assert_eq!(layout.camera_distance, None);
    }

    #[test]
    fn portrait_layout_lifts_scene() {
        let small = ResponsiveLayout::for_window(375, 667);
        assert_eq!(small.scene_offset.y, 12.0);
        assert_eq!(small.camera_distance, Some(55.0));

        let tall = ResponsiveLayout::for_window(430, 932);
        assert_eq!(tall.scene_offset.y, 5.0);

        let mut camera = Camera::new(375, 667);
        camera.apply_layout(&small);
        assert_eq!(camera.distance, 55.0);
        assert_eq!(camera.scene_offset, Vec3::new(0.0, 12.0, 0.0));
    }
}
