//! CIE xy + brightness to gamma-encoded sRGB.

use super::gamut::{Coords, Gamut};
use crate::types::Color;

/// sRGB gamma encode of a linear channel value.
fn gamma_encode(v: f64) -> f64 {
    if v <= 0.0031308 {
        12.92 * v
    } else {
        1.055 * v.powf(1.0 / 2.4) - 0.055
    }
}

fn to_channel(v: f64) -> u8 {
    (gamma_encode(v) * 255.0).clamp(0.0, 255.0) as u8
}

/// Convert a chromaticity point and a brightness percentage to RGB.
///
/// The point is first corrected into `gamut`. Brightness (0-100) becomes the
/// luminance `Y` in [0, 1]. Returns `None` when the corrected point has
/// `y == 0` or the input is not finite, since no XYZ value exists then.
///
/// ```
/// use hue_govee_bridge::{xy_to_rgb, Coords, Gamut, GAMUT_C};
///
/// let red = xy_to_rgb(GAMUT_C.red, 100.0, &GAMUT_C).unwrap();
/// assert_eq!(red.red(), 255);
/// assert!(red.green() < 100);
///
/// let flat = Gamut::new(Coords::new(0.2, 0.0), Coords::new(0.4, 0.0), Coords::new(0.6, 0.0));
/// assert!(xy_to_rgb(Coords::new(0.4, 0.0), 100.0, &flat).is_none());
/// ```
pub fn xy_to_rgb(point: Coords, brightness: f64, gamut: &Gamut) -> Option<Color> {
    let Coords { x, y } = gamut.correct(point);
    if y == 0.0 {
        return None;
    }

    let z = 1.0 - x - y;
    let luminance = brightness / 100.0;
    let big_x = (luminance / y) * x;
    let big_z = (luminance / y) * z;

    let r = big_x * 3.2406 + luminance * -1.5372 + big_z * -0.4986;
    let g = big_x * -0.9689 + luminance * 1.8758 + big_z * 0.0415;
    let b = big_x * 0.0557 + luminance * -0.2040 + big_z * 1.0570;

    if ![r, g, b].iter().all(|v| v.is_finite()) {
        return None;
    }

    Some(Color::rgb(to_channel(r), to_channel(g), to_channel(b)))
}
