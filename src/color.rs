//! Height to color mapping for previews and renderers

use serde::{Deserialize, Serialize};

/// Colors at the bottom, zero level and top of the height range.
///
/// Heights between zero and the maximum blend `sea_level` towards `high`;
/// heights below zero blend towards `low`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorRamp {
    pub low: [u8; 3],
    pub sea_level: [u8; 3],
    pub high: [u8; 3],
}

impl Default for ColorRamp {
    /// Grey ramp: `125 + 125 * height / max_height` per channel.
    fn default() -> Self {
        Self {
            low: [0, 0, 0],
            sea_level: [125, 125, 125],
            high: [250, 250, 250],
        }
    }
}

impl ColorRamp {
    /// Blue seas, green lowlands, pale peaks
    pub fn terrain() -> Self {
        Self {
            low: [10, 30, 90],
            sea_level: [70, 140, 70],
            high: [235, 230, 215],
        }
    }

    /// Color for `height` on a scale whose extremes are `±max_height`.
    ///
    /// The ratio is clamped to `[-1, 1]`; a non-positive `max_height` maps
    /// everything to the sea level color.
    pub fn color(&self, height: f64, max_height: f64) -> [u8; 3] {
        if !(max_height > 0.0) || !height.is_finite() {
            return self.sea_level;
        }

        let t = (height / max_height).clamp(-1.0, 1.0);
        if t >= 0.0 {
            lerp_rgb(self.sea_level, self.high, t)
        } else {
            lerp_rgb(self.sea_level, self.low, -t)
        }
    }
}

fn lerp_rgb(from: [u8; 3], to: [u8; 3], t: f64) -> [u8; 3] {
    let mut out = [0u8; 3];
    for i in 0..3 {
        let v = from[i] as f64 + (to[i] as f64 - from[i] as f64) * t;
        out[i] = v.round().clamp(0.0, 255.0) as u8;
    }
    out
}

/// Grey color for a height, using the default ramp.
pub fn height_to_color(height: f64, max_height: f64) -> [u8; 3] {
    ColorRamp::default().color(height, max_height)
}

/// Format a color as `#rrggbb`.
pub fn to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}
