//! Fixed constants for the double-slit apparatus
//!
//! Distances are in scene units. The generator sits at the origin and
//! particles travel along +z towards the detection screen.

/// Depth of the particle spawn plane (just in front of the generator cube)
pub const SPAWN_DEPTH: f32 = 0.5;

/// Half-width of the square the spawn offset is drawn from
pub const SPAWN_HALF_EXTENT: f32 = 0.5;

/// Lateral velocity is drawn from [-SPAWN_LATERAL_SPEED, SPAWN_LATERAL_SPEED]
pub const SPAWN_LATERAL_SPEED: f32 = 0.2;

/// Forward speed range per frame
pub const SPAWN_MIN_FORWARD_SPEED: f32 = 0.5;
pub const SPAWN_MAX_FORWARD_SPEED: f32 = 0.8;

/// Depth of the diffraction panel
pub const PANEL_DEPTH: f32 = 15.0;

/// Slit apertures (symmetric about x = 0)
pub const SLIT_INNER_X: f32 = 0.5;
pub const SLIT_OUTER_X: f32 = 1.5;
pub const SLIT_HALF_HEIGHT: f32 = 2.0;

/// Depth of the detection screen
pub const SCREEN_DEPTH: f32 = 30.0;

/// Detection screen half-extents (20 x 15 plane)
pub const SCREEN_HALF_WIDTH: f32 = 10.0;
pub const SCREEN_HALF_HEIGHT: f32 = 7.5;

/// Particles past any of these limits are culled
pub const CULL_MAX_DEPTH: f32 = 35.0;
pub const CULL_LATERAL: f32 = 15.0;

/// Observer marker position (beside the right slit, just before the panel)
pub const OBSERVER_POSITION: [f32; 3] = [3.0, 0.0, 14.0];

/// Light cone base radius at the panel
pub const LIGHT_CONE_RADIUS: f32 = 4.0;

// Visuals

/// Billboard radius of a particle in flight
pub const PARTICLE_SIZE: f32 = 0.05;

/// Scale applied to a particle when it freezes into a mark
pub const MARK_SCALE: f32 = 1.2;

/// Proton colour (red)
pub const PROTON_COLOR: [f32; 4] = [1.0, 0.0, 0.0, 1.0];

/// Electron colour (light blue)
pub const ELECTRON_COLOR: [f32; 4] = [0.27, 0.53, 1.0, 1.0];

/// Terminal colour of a detection mark (white)
pub const HIT_COLOR: [f32; 4] = [1.0, 1.0, 1.0, 1.0];
