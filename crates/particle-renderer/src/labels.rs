//! World-space text labels, projected for the UI layer to draw

use crate::camera::Camera;
use glam::{Vec2, Vec3};
use particle_physics::OBSERVER_POSITION;

#[derive(Debug, Clone, PartialEq)]
pub struct SceneLabel {
    pub text: &'static str,
    pub anchor: Vec3,
}

/// Label projected into window pixels
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenLabel {
    pub text: &'static str,
    pub position: Vec2,
}

/// Labels for the current phase. The generator label changes with the
/// emitted species and the observer only has one while it is visible.
pub fn scene_labels(generator_label: &'static str, show_observer: bool) -> Vec<SceneLabel> {
    let mut labels = vec![
        SceneLabel {
            text: generator_label,
            anchor: Vec3::new(0.0, 1.5, 0.0),
        },
        SceneLabel {
            text: "Diffraction Slits",
            anchor: Vec3::new(0.0, 8.5, 15.0),
        },
        SceneLabel {
            text: "Detection Screen",
            anchor: Vec3::new(0.0, 8.5, 30.0),
        },
    ];
    if show_observer {
        labels.push(SceneLabel {
            text: "Observer",
            anchor: Vec3::from(OBSERVER_POSITION) + Vec3::new(0.0, 1.5, 0.0),
        });
    }
    labels
}

/// Project labels to window pixels, dropping those behind the camera
pub fn project_labels(
    labels: &[SceneLabel],
    camera: &Camera,
    width: f32,
    height: f32,
) -> Vec<ScreenLabel> {
    labels
        .iter()
        .filter_map(|label| {
            camera
                .world_to_screen(label.anchor, width, height)
                .map(|position| ScreenLabel {
                    text: label.text,
                    position,
                })
        })
        .collect()
}
