//! Playback of Hue dynamic scenes on Govee devices.
//!
//! A dynamic scene cycles through its palette: each color is held for
//! `20 / speed / colors` seconds, all at the same brightness. Govee devices
//! have no notion of palettes, so a background loop per device sends the
//! colors one at a time until the scene is stopped or replaced.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::color::{GamutType, resolve_gamut, xy_to_rgb};
use crate::device::{DeviceCommander, log_command_error};
use crate::hue::Scene;
use crate::runtime::{self, CancelToken};
use crate::types::{Brightness, Color};

/// Seconds for one full palette cycle at speed 1.
const CYCLE_SECS: f64 = 20.0;

/// How long each palette color is held.
///
/// `None` when the speed is not a positive finite number or the palette is
/// empty.
///
/// ```
/// use std::time::Duration;
/// use hue_govee_bridge::scene::step_duration;
///
/// assert_eq!(step_duration(0.5, 4), Some(Duration::from_secs(10)));
/// assert_eq!(step_duration(0.0, 4), None);
/// assert_eq!(step_duration(1.0, 0), None);
/// ```
pub fn step_duration(speed: f64, colors: usize) -> Option<Duration> {
    if !(speed.is_finite() && speed > 0.0) || colors == 0 {
        return None;
    }
    Duration::try_from_secs_f64(CYCLE_SECS / speed / colors as f64).ok()
}

struct ActiveScene {
    generation: u64,
    cancel: CancelToken,
}

type Registry = Mutex<HashMap<String, ActiveScene>>;

fn lock(registry: &Registry) -> MutexGuard<'_, HashMap<String, ActiveScene>> {
    registry.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Runs at most one dynamic scene per device.
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use hue_govee_bridge::{GoveeClient, SceneController};
/// # fn scene() -> hue_govee_bridge::hue::Scene { unimplemented!() }
///
/// # #[tokio::main]
/// # async fn main() {
/// let scenes = SceneController::new(Arc::new(GoveeClient::default()));
/// scenes.set_scene("AA:BB:CC", scene());
/// assert!(scenes.is_active("AA:BB:CC"));
/// scenes.stop_scene("AA:BB:CC");
/// # }
/// ```
pub struct SceneController<C> {
    commander: Arc<C>,
    active: Arc<Registry>,
    next_generation: AtomicU64,
}

impl<C: DeviceCommander + 'static> SceneController<C> {
    pub fn new(commander: Arc<C>) -> Self {
        SceneController {
            commander,
            active: Arc::new(Mutex::new(HashMap::new())),
            next_generation: AtomicU64::new(0),
        }
    }

    /// Start playing `scene` on a device, replacing whatever played there.
    ///
    /// Must be called from within the async runtime.
    pub fn set_scene(&self, device_id: &str, scene: Scene) {
        let cancel = CancelToken::new();
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);

        {
            let mut active = lock(&self.active);
            if let Some(previous) = active.remove(device_id) {
                previous.cancel.cancel();
                debug!("replacing dynamic scene on {}", device_id);
            }
            active.insert(
                device_id.to_string(),
                ActiveScene {
                    generation,
                    cancel: cancel.clone(),
                },
            );
        }

        let playback = Playback {
            commander: Arc::clone(&self.commander),
            registry: Arc::clone(&self.active),
            device_id: device_id.to_string(),
            generation,
            cancel,
        };
        runtime::spawn_detached(playback.run(scene));
    }

    /// Stop the scene on a device, if any. Returns whether one was running.
    ///
    /// The loop may still send the command it is in the middle of.
    pub fn stop_scene(&self, device_id: &str) -> bool {
        match lock(&self.active).remove(device_id) {
            Some(previous) => {
                previous.cancel.cancel();
                info!("stopped dynamic scene on {}", device_id);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self, device_id: &str) -> bool {
        lock(&self.active).contains_key(device_id)
    }

    /// Devices currently playing a scene.
    pub fn active_devices(&self) -> Vec<String> {
        lock(&self.active).keys().cloned().collect()
    }

    /// Stop every running scene.
    pub fn stop_all(&self) {
        for (device_id, scene) in lock(&self.active).drain() {
            scene.cancel.cancel();
            debug!("stopped dynamic scene on {}", device_id);
        }
    }
}

impl<C> Drop for SceneController<C> {
    fn drop(&mut self) {
        for (_, scene) in lock(&self.active).drain() {
            scene.cancel.cancel();
        }
    }
}

/// One device's playback loop.
struct Playback<C> {
    commander: Arc<C>,
    registry: Arc<Registry>,
    device_id: String,
    generation: u64,
    cancel: CancelToken,
}

impl<C: DeviceCommander> Playback<C> {
    async fn run(self, scene: Scene) {
        self.play(&scene).await;
        self.release();
    }

    async fn play(&self, scene: &Scene) {
        let colors = &scene.palette.color;
        if colors.is_empty() {
            warn!(
                "scene {} has no palette colors, not playing on {}",
                scene.id, self.device_id
            );
            return;
        }
        let Some(step) = step_duration(scene.speed, colors.len()) else {
            error!(
                "scene {} has invalid speed {}, not playing on {}",
                scene.id, scene.speed, self.device_id
            );
            return;
        };

        let brightness = scene.step_brightness();
        let level = Brightness::from_percent(brightness);
        let gamut = resolve_gamut(None, Some(GamutType::C));
        info!(
            "playing scene {} on {}: {} colors, {:?} each",
            scene.id,
            self.device_id,
            colors.len(),
            step
        );

        loop {
            for entry in colors {
                if self.cancel.is_cancelled() {
                    return;
                }
                let xy = entry.color.xy;
                let color = xy_to_rgb(xy, brightness, &gamut).unwrap_or(Color::BLACK);
                debug!("scene step on {}: {:?} -> {:?}", self.device_id, xy, color);

                if let Err(e) = self.commander.set_color(&self.device_id, &color).await {
                    log_command_error(&self.device_id, "scene color", &e);
                }
                if self.cancel.is_cancelled() {
                    return;
                }
                if let Err(e) = self.commander.set_brightness(&self.device_id, &level).await {
                    log_command_error(&self.device_id, "scene brightness", &e);
                }
                if !self.cancel.sleep(step).await {
                    return;
                }
            }
        }
    }

    /// Deregister, unless the device has already moved on to another scene.
    fn release(&self) {
        let mut active = lock(&self.registry);
        if active
            .get(&self.device_id)
            .is_some_and(|scene| scene.generation == self.generation)
        {
            active.remove(&self.device_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::{Coords, GAMUT_C};
    use crate::device::testing::{RecordingCommander, Sent};
    use crate::hue::{Palette, ResourceRef, SceneAction};
    use uuid::Uuid;

    const RED: Coords = Coords::new(0.6915, 0.3083);
    const GREEN: Coords = Coords::new(0.17, 0.7);
    const BLUE: Coords = Coords::new(0.1532, 0.0475);

    fn scene(colors: &[Coords], speed: f64, brightness: &[f64]) -> Scene {
        Scene {
            id: Uuid::new_v4(),
            palette: Palette::from_colors(colors.iter().copied()),
            speed,
            status: Default::default(),
            group: ResourceRef::room(Uuid::new_v4()),
            actions: brightness
                .iter()
                .map(|b| SceneAction::new(true, *b))
                .collect(),
        }
    }

    fn rgb(xy: Coords, brightness: f64) -> Color {
        xy_to_rgb(xy, brightness, &GAMUT_C).unwrap()
    }

    fn colors(sent: &[Sent]) -> Vec<Color> {
        sent.iter()
            .filter_map(|s| match s {
                Sent::Color(c) => Some(*c),
                _ => None,
            })
            .collect()
    }

    async fn wait_for(mut condition: impl FnMut() -> bool) -> bool {
        for _ in 0..100 {
            if condition() {
                return true;
            }
            runtime::sleep(Duration::from_millis(10)).await;
        }
        condition()
    }

    fn controller() -> (Arc<RecordingCommander>, SceneController<RecordingCommander>) {
        let commander = Arc::new(RecordingCommander::default());
        let controller = SceneController::new(Arc::clone(&commander));
        (commander, controller)
    }

    #[test]
    fn test_step_duration() {
        assert_eq!(step_duration(1.0, 2), Some(Duration::from_secs(10)));
        assert_eq!(step_duration(4.0, 5), Some(Duration::from_secs(1)));
        assert_eq!(step_duration(0.75, 3), Duration::try_from_secs_f64(20.0 / 0.75 / 3.0).ok());
        for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            assert_eq!(step_duration(speed, 3), None);
        }
        assert_eq!(step_duration(f64::MIN_POSITIVE, 1), None);
    }

    #[tokio::test]
    async fn test_palette_cycles_in_order() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[RED, GREEN], 200.0, &[40.0, 80.0]));
        assert!(scenes.is_active("dev"));

        assert!(wait_for(|| colors(&commander.sent_to("dev")).len() >= 3).await);
        scenes.stop_scene("dev");

        let sent = commander.sent_to("dev");
        assert_eq!(sent[0], Sent::Color(rgb(RED, 60.0)));
        assert_eq!(sent[1], Sent::Brightness(Brightness::create(60).unwrap()));
        assert_eq!(sent[2], Sent::Color(rgb(GREEN, 60.0)));
        assert_eq!(sent[3], Sent::Brightness(Brightness::create(60).unwrap()));
        assert_eq!(sent[4], Sent::Color(rgb(RED, 60.0)));
    }

    #[tokio::test]
    async fn test_scene_without_actions_plays_at_full_brightness() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[BLUE], 200.0, &[]));
        assert!(wait_for(|| commander.sent_to("dev").len() >= 2).await);
        scenes.stop_all();

        let sent = commander.sent_to("dev");
        assert_eq!(sent[0], Sent::Color(rgb(BLUE, 100.0)));
        assert_eq!(sent[1], Sent::Brightness(Brightness::new()));
    }

    #[tokio::test]
    async fn test_replacing_a_scene_stops_the_old_one() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[RED], 200.0, &[100.0]));
        assert!(wait_for(|| !commander.sent_to("dev").is_empty()).await);

        scenes.set_scene("dev", scene(&[BLUE], 200.0, &[100.0]));
        assert_eq!(scenes.active_devices(), vec![String::from("dev")]);

        // Let the old loop notice, then only the new palette may appear.
        runtime::sleep(Duration::from_millis(50)).await;
        let settled = commander.sent_to("dev").len();
        runtime::sleep(Duration::from_millis(200)).await;

        let later = colors(&commander.sent_to("dev")[settled..]);
        assert!(!later.is_empty());
        assert!(later.iter().all(|c| *c == rgb(BLUE, 100.0)));
        assert!(scenes.is_active("dev"));
    }

    #[tokio::test]
    async fn test_stop_scene() {
        let (commander, scenes) = controller();
        assert!(!scenes.stop_scene("dev"));

        scenes.set_scene("dev", scene(&[RED, BLUE], 200.0, &[50.0]));
        assert!(wait_for(|| !commander.sent_to("dev").is_empty()).await);
        assert!(scenes.stop_scene("dev"));
        assert!(!scenes.is_active("dev"));
        assert!(!scenes.stop_scene("dev"));

        runtime::sleep(Duration::from_millis(50)).await;
        let settled = commander.sent().len();
        runtime::sleep(Duration::from_millis(200)).await;
        assert_eq!(commander.sent().len(), settled);
    }

    #[tokio::test]
    async fn test_empty_palette_deregisters() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[], 1.0, &[100.0]));
        assert!(wait_for(|| !scenes.is_active("dev")).await);
        assert!(commander.sent().is_empty());
    }

    #[tokio::test]
    async fn test_invalid_speed_deregisters() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[RED], 0.0, &[100.0]));
        assert!(wait_for(|| !scenes.is_active("dev")).await);
        assert!(commander.sent().is_empty());
    }

    #[tokio::test]
    async fn test_finished_loop_keeps_newer_registration() {
        let (commander, scenes) = controller();
        scenes.set_scene("dev", scene(&[], 1.0, &[]));
        scenes.set_scene("dev", scene(&[GREEN], 200.0, &[]));

        assert!(wait_for(|| !commander.sent_to("dev").is_empty()).await);
        runtime::sleep(Duration::from_millis(50)).await;
        assert!(scenes.is_active("dev"));
        scenes.stop_all();
        assert!(scenes.active_devices().is_empty());
    }

    #[tokio::test]
    async fn test_devices_are_independent() {
        let (commander, scenes) = controller();
        scenes.set_scene("one", scene(&[RED], 200.0, &[]));
        scenes.set_scene("two", scene(&[GREEN], 200.0, &[]));
        assert!(
            wait_for(|| {
                !commander.sent_to("one").is_empty() && !commander.sent_to("two").is_empty()
            })
            .await
        );

        scenes.stop_scene("one");
        assert!(scenes.is_active("two"));

        runtime::sleep(Duration::from_millis(50)).await;
        let before = commander.sent_to("two").len();
        runtime::sleep(Duration::from_millis(200)).await;
        assert!(commander.sent_to("two").len() > before);
        assert!(
            colors(&commander.sent_to("two"))
                .iter()
                .all(|c| *c == rgb(GREEN, 100.0))
        );
    }

    #[tokio::test]
    async fn test_unknown_device_keeps_playing() {
        let (commander, scenes) = controller();
        commander.forget("ghost");
        scenes.set_scene("ghost", scene(&[RED], 200.0, &[]));
        runtime::sleep(Duration::from_millis(100)).await;
        assert!(scenes.is_active("ghost"));
        assert!(commander.sent().is_empty());
    }
}
