//! Black-body color temperature to RGB.
//!
//! Piecewise fit by Tanner Helland of the CIE 1964 black-body data, good for
//! roughly 1000K to 40000K.

use crate::types::{Color, Kelvin};

fn red(temp: f64) -> f64 {
    if temp <= 66.0 {
        255.0
    } else {
        329.698727446 * (temp - 60.0).powf(-0.1332047592)
    }
}

fn green(temp: f64) -> f64 {
    if temp <= 66.0 {
        99.4708025861 * temp.ln() - 161.1195681661
    } else {
        288.1221695283 * (temp - 60.0).powf(-0.0755148492)
    }
}

fn blue(temp: f64) -> f64 {
    if temp >= 66.0 {
        255.0
    } else if temp <= 19.0 {
        0.0
    } else {
        138.5177312231 * (temp - 10.0).ln() - 305.0447927307
    }
}

/// RGB for a color temperature, scaled by a brightness percentage.
///
/// Channels are clamped to [0, 255] before scaling and truncated after.
///
/// ```
/// use hue_govee_bridge::{kelvin_to_rgb, Color, Kelvin};
///
/// let warm = kelvin_to_rgb(Kelvin::new(2000), 100.0);
/// assert_eq!(warm.red(), 255);
/// assert!(warm.blue() < warm.green());
///
/// assert_eq!(kelvin_to_rgb(Kelvin::new(6500), 0.0), Color::BLACK);
/// ```
pub fn kelvin_to_rgb(kelvin: Kelvin, brightness: f64) -> Color {
    let temp = kelvin.kelvin() as f64 / 100.0;
    let scale = brightness / 100.0;
    // `as` saturates, so a scale above 1 still lands in range
    let channel = |v: f64| (v.clamp(0.0, 255.0) * scale) as u8;

    Color::rgb(channel(red(temp)), channel(green(temp)), channel(blue(temp)))
}
