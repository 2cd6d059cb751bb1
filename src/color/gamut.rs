//! CIE xy chromaticity points and the triangular gamuts of Hue lights.

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

/// A chromaticity point in CIE xy space.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Coords {
    pub x: f64,
    pub y: f64,
}

impl Coords {
    pub const fn new(x: f64, y: f64) -> Self {
        Coords { x, y }
    }

    /// Hue reports `(0, 0)` when a light carries no xy color.
    pub fn is_origin(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }

    fn distance(&self, other: &Coords) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// The triangle of colors a light can reproduce, given by its primaries.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Gamut {
    pub red: Coords,
    pub green: Coords,
    pub blue: Coords,
}

/// Gamut A: older LivingColors and Bloom fixtures.
pub const GAMUT_A: Gamut = Gamut::new(
    Coords::new(0.704, 0.296),
    Coords::new(0.2151, 0.7106),
    Coords::new(0.138, 0.08),
);

/// Gamut B: first generation Hue bulbs.
pub const GAMUT_B: Gamut = Gamut::new(
    Coords::new(0.675, 0.322),
    Coords::new(0.409, 0.518),
    Coords::new(0.167, 0.04),
);

/// Gamut C: current Hue color bulbs.
pub const GAMUT_C: Gamut = Gamut::new(
    Coords::new(0.6915, 0.3083),
    Coords::new(0.17, 0.7),
    Coords::new(0.1532, 0.0475),
);

/// Used when a light reports neither usable vertices nor a known type.
pub const DEFAULT_GAMUT: Gamut = GAMUT_C;

/// Gamut family reported by a Hue light.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter, EnumString, Display,
)]
#[strum(ascii_case_insensitive)]
pub enum GamutType {
    A,
    B,
    C,
    /// Anything the bridge reports that has no built-in triangle.
    #[serde(other)]
    Other,
}

impl GamutType {
    /// The built-in triangle for this type, if there is one.
    pub fn gamut(self) -> Option<Gamut> {
        match self {
            GamutType::A => Some(GAMUT_A),
            GamutType::B => Some(GAMUT_B),
            GamutType::C => Some(GAMUT_C),
            GamutType::Other => None,
        }
    }
}

impl Gamut {
    pub const fn new(red: Coords, green: Coords, blue: Coords) -> Self {
        Gamut { red, green, blue }
    }

    /// A gamut is usable unless every vertex sits at the origin, which is
    /// what the bridge sends when it has no calibration data.
    ///
    /// ```
    /// use hue_govee_bridge::{Gamut, GAMUT_C};
    ///
    /// assert!(GAMUT_C.is_valid());
    /// assert!(!Gamut::default().is_valid());
    /// ```
    pub fn is_valid(&self) -> bool {
        !(self.red.is_origin() && self.green.is_origin() && self.blue.is_origin())
    }

    /// Barycentric point-in-triangle test, boundary inclusive.
    ///
    /// A zero-area triangle contains nothing.
    ///
    /// ```
    /// use hue_govee_bridge::{Coords, GAMUT_C};
    ///
    /// assert!(GAMUT_C.contains(Coords::new(0.3127, 0.329)));
    /// assert!(GAMUT_C.contains(GAMUT_C.green));
    /// assert!(!GAMUT_C.contains(Coords::new(0.05, 0.9)));
    /// ```
    pub fn contains(&self, point: Coords) -> bool {
        let (v1, v2, v3) = (self.red, self.green, self.blue);

        let denominator = (v2.y - v3.y) * (v1.x - v3.x) + (v3.x - v2.x) * (v1.y - v3.y);
        if denominator == 0.0 {
            return false;
        }
        let a = ((v2.y - v3.y) * (point.x - v3.x) + (v3.x - v2.x) * (point.y - v3.y)) / denominator;
        let b = ((v3.y - v1.y) * (point.x - v3.x) + (v1.x - v3.x) * (point.y - v3.y)) / denominator;
        let c = 1.0 - a - b;

        [a, b, c].iter().all(|w| (0.0..=1.0).contains(w))
    }

    /// Move `point` onto the closest edge of the triangle if it lies outside.
    ///
    /// Points inside are returned unchanged. Edges are scanned red-green,
    /// green-blue, blue-red and the first closest one wins; equally close
    /// edges of a proper triangle meet in the same point anyway.
    ///
    /// ```
    /// use hue_govee_bridge::{Coords, GAMUT_B};
    ///
    /// let inside = Coords::new(0.4, 0.35);
    /// assert_eq!(GAMUT_B.correct(inside), inside);
    ///
    /// let corrected = GAMUT_B.correct(Coords::new(0.17, 0.7));
    /// assert_ne!(corrected, Coords::new(0.17, 0.7));
    /// ```
    pub fn correct(&self, point: Coords) -> Coords {
        if self.contains(point) {
            return point;
        }

        let mut closest = point;
        let mut closest_distance = f64::INFINITY;
        for (start, end) in self.edges() {
            let projected = project_onto_segment(point, start, end);
            let distance = point.distance(&projected);
            if distance < closest_distance {
                closest_distance = distance;
                closest = projected;
            }
        }
        closest
    }

    fn edges(&self) -> [(Coords, Coords); 3] {
        [
            (self.red, self.green),
            (self.green, self.blue),
            (self.blue, self.red),
        ]
    }
}

/// Pick the gamut to correct against.
///
/// Priority: a valid explicit gamut, then the built-in triangle for the
/// reported type, then [`DEFAULT_GAMUT`].
///
/// ```
/// use hue_govee_bridge::{resolve_gamut, Gamut, GamutType, GAMUT_A, GAMUT_B, DEFAULT_GAMUT};
///
/// assert_eq!(resolve_gamut(Some(&GAMUT_A), Some(GamutType::B)), GAMUT_A);
/// assert_eq!(resolve_gamut(Some(&Gamut::default()), Some(GamutType::B)), GAMUT_B);
/// assert_eq!(resolve_gamut(None, Some(GamutType::Other)), DEFAULT_GAMUT);
/// assert_eq!(resolve_gamut(None, None), DEFAULT_GAMUT);
/// ```
pub fn resolve_gamut(explicit: Option<&Gamut>, gamut_type: Option<GamutType>) -> Gamut {
    if let Some(gamut) = explicit.filter(|g| g.is_valid()) {
        return *gamut;
    }
    gamut_type
        .and_then(GamutType::gamut)
        .unwrap_or(DEFAULT_GAMUT)
}

fn project_onto_segment(point: Coords, start: Coords, end: Coords) -> Coords {
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    let length_squared = dx * dx + dy * dy;

    if length_squared < 1e-10 {
        return start;
    }

    let t = (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    Coords::new(start.x + t * dx, start.y + t * dy)
}
