//! Hue CLIP v2 resources, as far as the bridge needs them.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::color::{Coords, Gamut, GamutType, LightColorState};

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct On {
    pub on: bool,
}

/// Brightness in percent, 0-100.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Dimming {
    pub brightness: f64,
}

#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ColorTemperature {
    pub mirek: Option<u16>,
    #[serde(default)]
    pub mirek_valid: bool,
}

#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct LightColor {
    pub xy: Coords,
    pub gamut: Option<Gamut>,
    pub gamut_type: Option<GamutType>,
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DynamicsStatus {
    DynamicPalette,
    #[default]
    #[serde(rename = "none")]
    Inactive,
    #[serde(other)]
    Other,
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Dynamics {
    #[serde(default)]
    pub status: DynamicsStatus,
}

/// Snapshot of a `light` resource.
///
/// Capabilities a fixture lacks (color, temperature, dimming) are absent.
#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Light {
    pub id: Option<Uuid>,
    pub on: On,
    pub dimming: Option<Dimming>,
    pub color_temperature: Option<ColorTemperature>,
    pub color: Option<LightColor>,
    #[serde(default)]
    pub dynamics: Dynamics,
}

impl Light {
    pub fn is_on(&self) -> bool {
        self.on.on
    }

    /// Brightness percentage; lights without dimming are at full brightness.
    pub fn brightness(&self) -> f64 {
        self.dimming.map_or(100.0, |d| d.brightness)
    }

    /// Whether the light is cycling a dynamic palette.
    pub fn is_dynamic(&self) -> bool {
        self.dynamics.status == DynamicsStatus::DynamicPalette
    }
}

impl From<&Light> for LightColorState {
    fn from(light: &Light) -> Self {
        let temperature = light.color_temperature.unwrap_or_default();
        LightColorState {
            on: light.is_on(),
            brightness: light.brightness(),
            mirek: temperature.mirek,
            mirek_valid: temperature.mirek_valid,
            xy: light.color.map(|c| c.xy),
            gamut: light.color.and_then(|c| c.gamut),
            gamut_type: light.color.and_then(|c| c.gamut_type),
        }
    }
}

/// Reference to another resource, e.g. the room a scene belongs to.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ResourceRef {
    pub rid: Uuid,
    pub rtype: String,
}

impl ResourceRef {
    pub fn room(rid: Uuid) -> Self {
        ResourceRef {
            rid,
            rtype: String::from("room"),
        }
    }
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SceneActivity {
    #[default]
    Inactive,
    Static,
    DynamicPalette,
    #[serde(other)]
    Unknown,
}

#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SceneStatus {
    pub active: SceneActivity,
    pub last_recall: Option<String>,
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct XyColor {
    pub xy: Coords,
}

/// One color of a dynamic palette.
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PaletteColor {
    pub color: XyColor,
    #[serde(default)]
    pub dimming: Dimming,
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct PaletteColorTemperature {
    pub color_temperature: ColorTemperature,
    #[serde(default)]
    pub dimming: Dimming,
}

/// The colors a dynamic scene cycles through, in cycle order.
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Palette {
    #[serde(default)]
    pub color: Vec<PaletteColor>,
    #[serde(default)]
    pub dimming: Vec<Dimming>,
    #[serde(default)]
    pub color_temperature: Vec<PaletteColorTemperature>,
}

impl Palette {
    /// A palette of full-brightness xy colors.
    pub fn from_colors(colors: impl IntoIterator<Item = Coords>) -> Self {
        Palette {
            color: colors
                .into_iter()
                .map(|xy| PaletteColor {
                    color: XyColor { xy },
                    dimming: Dimming { brightness: 100.0 },
                })
                .collect(),
            ..Default::default()
        }
    }
}

#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct ActionState {
    pub on: Option<On>,
    pub dimming: Option<Dimming>,
}

#[serde_with::skip_serializing_none]
#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SceneAction {
    pub target: Option<ResourceRef>,
    pub action: ActionState,
}

impl SceneAction {
    pub fn new(on: bool, brightness: f64) -> Self {
        SceneAction {
            target: None,
            action: ActionState {
                on: Some(On { on }),
                dimming: Some(Dimming { brightness }),
            },
        }
    }

    pub fn brightness(&self) -> f64 {
        self.action.dimming.map_or(0.0, |d| d.brightness)
    }
}

/// A `scene` resource.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Scene {
    pub id: Uuid,
    #[serde(default)]
    pub palette: Palette,
    /// Palette speed; a full cycle lasts `20 / speed` seconds.
    pub speed: f64,
    #[serde(default)]
    pub status: SceneStatus,
    pub group: ResourceRef,
    #[serde(default)]
    pub actions: Vec<SceneAction>,
}

impl Scene {
    /// Brightness shared by every palette step: the mean of the actions'
    /// brightness, or full brightness for a scene without actions.
    ///
    /// ```
    /// use hue_govee_bridge::hue::{Palette, ResourceRef, Scene, SceneAction};
    /// use uuid::Uuid;
    ///
    /// let mut scene = Scene {
    ///     id: Uuid::new_v4(),
    ///     palette: Palette::default(),
    ///     speed: 0.5,
    ///     status: Default::default(),
    ///     group: ResourceRef::room(Uuid::new_v4()),
    ///     actions: vec![SceneAction::new(true, 40.0), SceneAction::new(true, 80.0)],
    /// };
    /// assert_eq!(scene.step_brightness(), 60.0);
    ///
    /// scene.actions.clear();
    /// assert_eq!(scene.step_brightness(), 100.0);
    /// ```
    pub fn step_brightness(&self) -> f64 {
        if self.actions.is_empty() {
            return 100.0;
        }
        let total: f64 = self.actions.iter().map(SceneAction::brightness).sum();
        total / self.actions.len() as f64
    }

    /// Whether this is the dynamic scene currently playing in `room_id`.
    pub fn is_playing_in(&self, room_id: &Uuid) -> bool {
        self.group.rid == *room_id
            && self.group.rtype == "room"
            && self.status.active == SceneActivity::DynamicPalette
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_color_light() {
        let light: Light = serde_json::from_value(json!({
            "id": "3f4ac4e9-d67a-4dbd-8a16-5ea7e373f281",
            "type": "light",
            "on": {"on": true},
            "dimming": {"brightness": 62.5, "min_dim_level": 0.2},
            "color_temperature": {"mirek": null, "mirek_valid": false},
            "color": {
                "xy": {"x": 0.4573, "y": 0.41},
                "gamut": {
                    "red": {"x": 0.6915, "y": 0.3083},
                    "green": {"x": 0.17, "y": 0.7},
                    "blue": {"x": 0.1532, "y": 0.0475}
                },
                "gamut_type": "C"
            },
            "dynamics": {"status": "none", "speed": 0.0}
        }))
        .unwrap();

        assert!(light.is_on());
        assert!(!light.is_dynamic());
        assert_eq!(light.brightness(), 62.5);

        let state = LightColorState::from(&light);
        assert_eq!(state.xy, Some(Coords::new(0.4573, 0.41)));
        assert_eq!(state.gamut_type, Some(GamutType::C));
        assert!(state.mirek.is_none());
        assert!(!state.mirek_valid);
    }

    #[test]
    fn test_parse_plug_without_capabilities() {
        let light: Light = serde_json::from_value(json!({
            "on": {"on": true},
            "dynamics": {"status": "dynamic_palette"}
        }))
        .unwrap();
        assert!(light.is_dynamic());
        assert_eq!(light.brightness(), 100.0);
        let state = LightColorState::from(&light);
        assert!(state.xy.is_none() && state.gamut.is_none());
    }

    #[test]
    fn test_unknown_dynamics_status() {
        let light: Light = serde_json::from_value(json!({
            "on": {"on": false},
            "dynamics": {"status": "dynamic_effect"}
        }))
        .unwrap();
        assert_eq!(light.dynamics.status, DynamicsStatus::Other);
    }

    #[test]
    fn test_parse_scene() {
        let room = Uuid::new_v4();
        let scene: Scene = serde_json::from_value(json!({
            "id": Uuid::new_v4(),
            "type": "scene",
            "palette": {
                "color": [
                    {"color": {"xy": {"x": 0.6, "y": 0.3}}, "dimming": {"brightness": 80.0}},
                    {"color": {"xy": {"x": 0.2, "y": 0.6}}, "dimming": {"brightness": 40.0}}
                ],
                "dimming": [],
                "color_temperature": []
            },
            "speed": 0.627,
            "status": {"active": "dynamic_palette", "last_recall": "2024-01-01T00:00:00Z"},
            "group": {"rid": room, "rtype": "room"},
            "actions": [
                {"target": {"rid": Uuid::new_v4(), "rtype": "light"},
                 "action": {"on": {"on": true}, "dimming": {"brightness": 50.0}}},
                {"target": {"rid": Uuid::new_v4(), "rtype": "light"},
                 "action": {"on": {"on": true}}}
            ]
        }))
        .unwrap();

        assert_eq!(scene.palette.color.len(), 2);
        assert_eq!(scene.palette.color[1].color.xy, Coords::new(0.2, 0.6));
        assert!(scene.is_playing_in(&room));
        assert!(!scene.is_playing_in(&Uuid::new_v4()));
        // The second action has no dimming and counts as zero.
        assert_eq!(scene.step_brightness(), 25.0);
    }

    #[test]
    fn test_scene_in_zone_is_not_playing_in_room() {
        let zone = Uuid::new_v4();
        let scene = Scene {
            id: Uuid::new_v4(),
            palette: Palette::from_colors([Coords::new(0.3, 0.3)]),
            speed: 0.5,
            status: SceneStatus {
                active: SceneActivity::DynamicPalette,
                last_recall: None,
            },
            group: ResourceRef {
                rid: zone,
                rtype: String::from("zone"),
            },
            actions: Vec::new(),
        };
        assert!(!scene.is_playing_in(&zone));
    }
}
