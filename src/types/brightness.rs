//! Brightness control for Govee devices.

use serde::{Deserialize, Serialize};

/// Brightness level from 0 to 100 percent.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(transparent)]
pub struct Brightness {
    pub(crate) value: u8,
}

impl Brightness {
    const MAX: u8 = 100;

    /// Full brightness.
    pub fn new() -> Self {
        Brightness { value: Self::MAX }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    /// Returns None if value is above 100.
    ///
    /// ```
    /// use hue_govee_bridge::Brightness;
    ///
    /// assert_eq!(Brightness::create(0).unwrap().value(), 0);
    /// assert_eq!(Brightness::create(100).unwrap().value(), 100);
    /// assert!(Brightness::create(101).is_none());
    /// ```
    pub fn create(value: u8) -> Option<Self> {
        if value <= Self::MAX {
            Some(Brightness { value })
        } else {
            None
        }
    }

    /// Truncate a fractional percentage, clamping into 0-100.
    ///
    /// ```
    /// use hue_govee_bridge::Brightness;
    ///
    /// assert_eq!(Brightness::from_percent(57.9).value(), 57);
    /// assert_eq!(Brightness::from_percent(-3.0).value(), 0);
    /// assert_eq!(Brightness::from_percent(250.0).value(), 100);
    /// assert_eq!(Brightness::from_percent(f64::NAN).value(), 0);
    /// ```
    pub fn from_percent(percent: f64) -> Self {
        // `as` saturates and maps NaN to zero
        let value = (percent.clamp(0.0, Self::MAX as f64)) as u8;
        Brightness { value }
    }
}
