//! Conversion of Hue color descriptions into device RGB.
//!
//! Hue lights describe color perceptually: either a color temperature in
//! mired or a CIE xy chromaticity constrained by the light's gamut. Govee
//! devices only take 8-bit RGB plus a brightness, so everything funnels
//! through [`color_to_rgb`].

mod gamut;
mod temperature;
mod xy;

use log::debug;

use crate::types::{Color, Kelvin};

pub use gamut::{
    Coords, DEFAULT_GAMUT, GAMUT_A, GAMUT_B, GAMUT_C, Gamut, GamutType, resolve_gamut,
};
pub use temperature::kelvin_to_rgb;
pub use xy::xy_to_rgb;

/// The color-relevant part of a light snapshot.
#[derive(Default, Debug, Clone, PartialEq)]
pub struct LightColorState {
    pub on: bool,
    /// Brightness percentage, 0-100.
    pub brightness: f64,
    pub mirek: Option<u16>,
    pub mirek_valid: bool,
    pub xy: Option<Coords>,
    pub gamut: Option<Gamut>,
    pub gamut_type: Option<GamutType>,
}

/// Compute the RGB a device should show for `light`.
///
/// `fixed_brightness` replaces the light's own brightness when set. The
/// first matching rule wins:
///
/// 1. off: black;
/// 2. valid color temperature: black-body approximation;
/// 3. non-zero xy: gamut-corrected xy conversion;
/// 4. otherwise a grey of the brightness.
///
/// # Example
///
/// ```
/// use hue_govee_bridge::{color_to_rgb, Color, LightColorState};
///
/// let dimmer = LightColorState { on: true, brightness: 50.0, ..Default::default() };
/// assert_eq!(color_to_rgb(&dimmer, None), Color::grey(128));
/// assert_eq!(color_to_rgb(&dimmer, Some(100)), Color::grey(255));
///
/// let off = LightColorState { on: false, ..dimmer };
/// assert_eq!(color_to_rgb(&off, Some(100)), Color::BLACK);
/// ```
pub fn color_to_rgb(light: &LightColorState, fixed_brightness: Option<u8>) -> Color {
    if !light.on {
        return Color::BLACK;
    }

    let brightness = fixed_brightness.map_or(light.brightness, f64::from);

    if light.mirek_valid
        && let Some(kelvin) = light.mirek.and_then(Kelvin::from_mirek)
    {
        return kelvin_to_rgb(kelvin, brightness);
    }

    if let Some(xy) = light.xy.filter(|xy| !xy.is_origin()) {
        let gamut = resolve_gamut(light.gamut.as_ref(), light.gamut_type);
        return xy_to_rgb(xy, brightness, &gamut).unwrap_or_else(|| {
            debug!("xy {:?} has no RGB equivalent, using black", xy);
            Color::BLACK
        });
    }

    let grey = (brightness * 255.0 / 100.0).round().clamp(0.0, 255.0) as u8;
    Color::grey(grey)
}
