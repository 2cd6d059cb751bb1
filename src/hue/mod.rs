//! Reading state from a Hue bridge.
//!
//! The bridge speaks CLIP v2 over HTTPS. This module owns the resource model
//! and the rules for picking a light or the active scene out of a response
//! body. [`HueClient`] fetches those bodies (tokio runtime only); anything
//! else implementing [`HueSource`] can stand in for it.

#[cfg(feature = "runtime-tokio")]
mod client;
mod types;

use std::future::Future;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::Error;

#[cfg(feature = "runtime-tokio")]
pub use client::HueClient;
pub use types::{
    ActionState, ColorTemperature, Dimming, Dynamics, DynamicsStatus, Light, LightColor, On,
    Palette, PaletteColor, PaletteColorTemperature, ResourceRef, Scene, SceneAction,
    SceneActivity, SceneStatus, XyColor,
};

type Result<T> = std::result::Result<T, Error>;

/// Header carrying the application key on every CLIP v2 request.
pub const APPLICATION_KEY_HEADER: &str = "hue-application-key";

/// Path of the scene collection.
pub const SCENE_PATH: &str = "/clip/v2/resource/scene";

/// Path of a single light resource.
///
/// ```
/// use hue_govee_bridge::hue::light_path;
/// use uuid::Uuid;
///
/// let id = Uuid::nil();
/// assert_eq!(
///     light_path(&id),
///     "/clip/v2/resource/light/00000000-0000-0000-0000-000000000000"
/// );
/// ```
pub fn light_path(light_id: &Uuid) -> String {
    format!("/clip/v2/resource/light/{}", light_id)
}

#[derive(Default, Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HueError {
    #[serde(default)]
    pub description: String,
}

/// Every CLIP v2 response wraps its resources the same way.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct HueResponse<T> {
    #[serde(default)]
    pub errors: Vec<HueError>,
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}

impl<T: DeserializeOwned> HueResponse<T> {
    /// Parse a response body, turning reported errors into [`Error::Bridge`].
    pub fn parse(body: &[u8]) -> Result<Vec<T>> {
        let response: HueResponse<T> = serde_json::from_slice(body).map_err(Error::JsonLoad)?;
        if !response.errors.is_empty() {
            let descriptions: Vec<_> = response
                .errors
                .iter()
                .map(|e| e.description.as_str())
                .collect();
            return Err(Error::Bridge(descriptions.join("; ")));
        }
        Ok(response.data)
    }
}

/// Extract the light from the body of a `GET` on [`light_path`].
pub fn parse_light(body: &[u8], light_id: &Uuid) -> Result<Light> {
    HueResponse::<Light>::parse(body)?
        .into_iter()
        .next()
        .ok_or(Error::LightNotFound(*light_id))
}

/// Pick the dynamic scene playing in `room_id` from the body of a `GET` on
/// [`SCENE_PATH`].
///
/// ```
/// use hue_govee_bridge::hue::find_active_scene;
/// use uuid::Uuid;
///
/// let room = Uuid::new_v4();
/// let body = format!(r#"{{"errors": [], "data": [
///     {{"id": "{}", "speed": 0.5, "group": {{"rid": "{room}", "rtype": "room"}},
///       "status": {{"active": "static"}}}},
///     {{"id": "{}", "speed": 0.7, "group": {{"rid": "{room}", "rtype": "room"}},
///       "status": {{"active": "dynamic_palette"}}}}
/// ]}}"#, Uuid::new_v4(), Uuid::new_v4());
///
/// let scene = find_active_scene(body.as_bytes(), &room).unwrap();
/// assert_eq!(scene.speed, 0.7);
/// assert!(find_active_scene(body.as_bytes(), &Uuid::new_v4()).is_err());
/// ```
pub fn find_active_scene(body: &[u8], room_id: &Uuid) -> Result<Scene> {
    HueResponse::<Scene>::parse(body)?
        .into_iter()
        .find(|scene| scene.is_playing_in(room_id))
        .ok_or(Error::SceneNotFound(*room_id))
}

/// Where the synchronizer reads Hue state from.
///
/// The bridge client fetches [`light_path`] and [`SCENE_PATH`] and hands
/// the bodies to [`parse_light`] and [`find_active_scene`].
pub trait HueSource: Send + Sync {
    /// Current state of one light.
    fn light(&self, light_id: &Uuid) -> impl Future<Output = Result<Light>> + Send;

    /// The dynamic scene playing in a room, or [`Error::SceneNotFound`].
    fn active_scene(&self, room_id: &Uuid) -> impl Future<Output = Result<Scene>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_parse_light() {
        let id = Uuid::new_v4();
        let response = body(json!({
            "errors": [],
            "data": [{"id": id, "on": {"on": true}, "dimming": {"brightness": 20.0}}]
        }));
        let light = parse_light(&response, &id).unwrap();
        assert_eq!(light.id, Some(id));
        assert_eq!(light.brightness(), 20.0);
    }

    #[test]
    fn test_parse_light_empty_data() {
        let id = Uuid::new_v4();
        let response = body(json!({"errors": [], "data": []}));
        assert_eq!(
            parse_light(&response, &id).unwrap_err(),
            Error::LightNotFound(id)
        );
    }

    #[test]
    fn test_bridge_errors_are_reported() {
        let response = body(json!({
            "errors": [{"description": "unauthorized user"}, {"description": "try again"}],
            "data": []
        }));
        assert_eq!(
            parse_light(&response, &Uuid::new_v4()).unwrap_err(),
            Error::Bridge(String::from("unauthorized user; try again"))
        );
    }

    #[test]
    fn test_garbage_body() {
        assert!(matches!(
            parse_light(b"<html>", &Uuid::new_v4()),
            Err(Error::JsonLoad(_))
        ));
    }

    #[test]
    fn test_active_scene_must_match_room_and_type() {
        let room = Uuid::new_v4();
        let other_room = Uuid::new_v4();
        let wanted = Uuid::new_v4();
        let response = body(json!({
            "errors": [],
            "data": [
                {"id": Uuid::new_v4(), "speed": 0.5,
                 "group": {"rid": other_room, "rtype": "room"},
                 "status": {"active": "dynamic_palette"}},
                {"id": Uuid::new_v4(), "speed": 0.5,
                 "group": {"rid": room, "rtype": "zone"},
                 "status": {"active": "dynamic_palette"}},
                {"id": Uuid::new_v4(), "speed": 0.5,
                 "group": {"rid": room, "rtype": "room"},
                 "status": {"active": "inactive"}},
                {"id": wanted, "speed": 0.5,
                 "group": {"rid": room, "rtype": "room"},
                 "status": {"active": "dynamic_palette"}}
            ]
        }));
        assert_eq!(find_active_scene(&response, &room).unwrap().id, wanted);

        let nowhere = Uuid::new_v4();
        assert_eq!(
            find_active_scene(&response, &nowhere).unwrap_err(),
            Error::SceneNotFound(nowhere)
        );
    }

    #[test]
    fn test_unknown_scene_activity() {
        let room = Uuid::new_v4();
        let response = body(json!({
            "data": [{"id": Uuid::new_v4(), "speed": 0.5,
                      "group": {"rid": room, "rtype": "room"},
                      "status": {"active": "something_new"}}]
        }));
        assert!(find_active_scene(&response, &room).is_err());
    }
}
