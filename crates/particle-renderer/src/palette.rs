//! Scene colours from the Catppuccin Mocha palette, in linear space

use catppuccin::PALETTE;

/// sRGB channel (0-255) to linear. `catppuccin` only ships gamma-encoded values.
pub fn srgb_to_linear(c: u8) -> f32 {
    let x = c as f32 / 255.0;
    if x <= 0.04045 {
        x / 12.92
    } else {
        ((x + 0.055) / 1.055).powf(2.4)
    }
}

fn linear(color: &catppuccin::Color, alpha: f32) -> [f32; 4] {
    [
        srgb_to_linear(color.rgb.r),
        srgb_to_linear(color.rgb.g),
        srgb_to_linear(color.rgb.b),
        alpha,
    ]
}

/// Colours of every static scene element
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScenePalette {
    pub background: [f32; 4],
    pub generator: [f32; 4],
    pub panel: [f32; 4],
    pub screen: [f32; 4],
    pub light_cone: [f32; 4],
    pub trapezoid: [f32; 4],
    pub observer: [f32; 4],
}

impl Default for ScenePalette {
    fn default() -> Self {
        let mocha = &PALETTE.mocha.colors;
        Self {
            background: linear(&mocha.base, 1.0),
            generator: linear(&mocha.text, 1.0),
            panel: linear(&mocha.overlay0, 0.7),
            screen: linear(&mocha.surface0, 1.0),
            light_cone: linear(&mocha.red, 0.3),
            trapezoid: linear(&mocha.peach, 0.25),
            observer: linear(&mocha.green, 1.0),
        }
    }
}

impl ScenePalette {
    pub fn clear_color(&self) -> wgpu::Color {
        let [r, g, b, a] = self.background;
        wgpu::Color {
            r: r as f64,
            g: g as f64,
            b: b as f64,
            a: a as f64,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn srgb_endpoints() {
        assert_eq!(srgb_to_linear(0), 0.0);
        assert!((srgb_to_linear(255) - 1.0).abs() < 1e-6);
        // Mocha base red channel
        assert!((srgb_to_linear(30) - 0.01298).abs() < 1e-3);
    }

    #[test]
    fn panel_is_translucent() {
        let palette = ScenePalette::default();
        assert_eq!(palette.panel[3], 0.7);
        assert_eq!(palette.screen[3], 1.0);
    }
}
