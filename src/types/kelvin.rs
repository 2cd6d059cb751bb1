//! Color temperature.

use serde::{Deserialize, Serialize};

/// Color temperature in Kelvin.
///
/// Hue reports temperatures in mired (micro reciprocal degrees); Govee and
/// the black-body approximation work in Kelvin.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Kelvin {
    pub(crate) kelvin: u32,
}

impl Kelvin {
    pub fn new(kelvin: u32) -> Self {
        Kelvin { kelvin }
    }

    /// Get the kelvin value.
    pub fn kelvin(&self) -> u32 {
        self.kelvin
    }

    /// Convert a mired value, `K = 1_000_000 / mirek` (integer division).
    ///
    /// Returns `None` for a zero mirek.
    ///
    /// ```
    /// use hue_govee_bridge::Kelvin;
    ///
    /// assert_eq!(Kelvin::from_mirek(153).unwrap().kelvin(), 6535);
    /// assert_eq!(Kelvin::from_mirek(500).unwrap().kelvin(), 2000);
    /// assert!(Kelvin::from_mirek(0).is_none());
    /// ```
    pub fn from_mirek(mirek: u16) -> Option<Self> {
        if mirek == 0 {
            return None;
        }
        Some(Kelvin {
            kelvin: 1_000_000 / mirek as u32,
        })
    }
}
