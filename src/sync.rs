//! Mirroring Hue lights onto Govee devices.
//!
//! Each configured pair is polled on its own task. Every tick reads the Hue
//! light and pushes the result to the device:
//!
//! - light off: any scene on the device is stopped and the device turned off;
//! - dynamic palette: the room's active scene is played on the device;
//! - otherwise: the light's color and brightness are sent.
//!
//! Power commands only follow changes of the Hue light. A device switched on
//! by other means while its light stays off is left on until the light goes
//! on and off again.

use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::color::{LightColorState, color_to_rgb};
use crate::config::Synchronization;
use crate::device::{DeviceCommander, log_command_error};
use crate::errors::Error;
use crate::hue::HueSource;
use crate::runtime::{self, CancelToken, JoinHandle};
use crate::scene::SceneController;
use crate::types::{Brightness, Color};

/// What one synchronization tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    TurnedOff,
    /// The light is off and the device was already turned off.
    StillOff,
    SceneStarted,
    /// The device already plays the room's scene.
    SceneRunning,
    Applied {
        color: Color,
        brightness: Brightness,
    },
    /// The device has not been discovered yet.
    DeviceUnknown,
    Failed,
}

/// Per-pair memory between ticks.
#[derive(Debug, Default, Clone)]
pub struct SyncState {
    /// Last power state sent to the device, `None` before the first one.
    powered: Option<bool>,
}

fn failure(err: &Error) -> SyncOutcome {
    if err.is_device_not_found() {
        SyncOutcome::DeviceUnknown
    } else {
        SyncOutcome::Failed
    }
}

/// Drives Govee devices from Hue lights.
pub struct Synchronizer<H, C> {
    hue: Arc<H>,
    commander: Arc<C>,
    scenes: SceneController<C>,
    poll_interval: Duration,
}

impl<H, C> Synchronizer<H, C>
where
    H: HueSource + 'static,
    C: DeviceCommander + 'static,
{
    pub fn new(hue: Arc<H>, commander: Arc<C>, poll_interval: Duration) -> Self {
        Synchronizer {
            scenes: SceneController::new(Arc::clone(&commander)),
            hue,
            commander,
            poll_interval,
        }
    }

    pub fn scenes(&self) -> &SceneController<C> {
        &self.scenes
    }

    /// Run one synchronization tick for `sync`.
    pub async fn step(&self, sync: &Synchronization, state: &mut SyncState) -> SyncOutcome {
        let device = sync.govee_device_id.as_str();

        let light = match self.hue.light(&sync.hue_light_id).await {
            Ok(light) => light,
            Err(e) => {
                error!("reading Hue light {} failed: {}", sync.hue_light_id, e);
                return SyncOutcome::Failed;
            }
        };

        if !light.is_on() {
            self.scenes.stop_scene(device);
            if state.powered == Some(false) {
                return SyncOutcome::StillOff;
            }
            return match self.commander.turn_off(device).await {
                Ok(()) => {
                    state.powered = Some(false);
                    SyncOutcome::TurnedOff
                }
                Err(e) => {
                    log_command_error(device, "turn off", &e);
                    failure(&e)
                }
            };
        }

        if state.powered != Some(true) {
            if let Err(e) = self.commander.turn_on(device).await {
                log_command_error(device, "turn on", &e);
                return failure(&e);
            }
            state.powered = Some(true);
        }

        if light.is_dynamic() {
            if self.scenes.is_active(device) {
                return SyncOutcome::SceneRunning;
            }
            return match self.hue.active_scene(&sync.hue_room_id).await {
                Ok(scene) => {
                    info!("Hue room {} plays scene {}", sync.hue_room_id, scene.id);
                    self.scenes.set_scene(device, scene);
                    SyncOutcome::SceneStarted
                }
                Err(e @ Error::SceneNotFound(_)) => {
                    warn!("light {} is dynamic but {}", sync.hue_light_id, e);
                    SyncOutcome::Failed
                }
                Err(e) => {
                    error!("reading scenes of room {} failed: {}", sync.hue_room_id, e);
                    SyncOutcome::Failed
                }
            };
        }

        self.scenes.stop_scene(device);

        let color = color_to_rgb(&LightColorState::from(&light), sync.fixed_brightness);
        let brightness = match sync.fixed_brightness {
            Some(fixed) => Brightness::from_percent(fixed.into()),
            None => Brightness::from_percent(light.brightness()),
        };
        debug!(
            "light {} -> {}: {:?} at {}%",
            sync.hue_light_id,
            device,
            color,
            brightness.value()
        );

        let color_sent = match self.commander.set_color(device, &color).await {
            Ok(()) => true,
            Err(e) => {
                log_command_error(device, "set color", &e);
                if e.is_device_not_found() {
                    return SyncOutcome::DeviceUnknown;
                }
                false
            }
        };
        // Brightness goes out even when the color did not.
        if let Err(e) = self.commander.set_brightness(device, &brightness).await {
            log_command_error(device, "set brightness", &e);
            return failure(&e);
        }

        if !color_sent {
            return SyncOutcome::Failed;
        }
        SyncOutcome::Applied { color, brightness }
    }

    /// Poll `sync` until `cancel` fires, then stop its scene.
    pub async fn run(&self, sync: Synchronization, cancel: CancelToken) {
        info!(
            "synchronizing Hue light {} with Govee device {}",
            sync.hue_light_id, sync.govee_device_id
        );
        let mut state = SyncState::default();
        while cancel.sleep(self.poll_interval).await {
            self.step(&sync, &mut state).await;
        }
        self.scenes.stop_scene(&sync.govee_device_id);
        debug!("synchronization of {} stopped", sync.govee_device_id);
    }

    /// Spawn one polling task per pair.
    ///
    /// The handles finish once `cancel` fires. Keep them around: on smol,
    /// dropping a handle cancels its task.
    pub fn spawn(
        self: &Arc<Self>,
        synchronizations: Vec<Synchronization>,
        cancel: &CancelToken,
    ) -> Vec<JoinHandle<()>> {
        synchronizations
            .into_iter()
            .map(|sync| {
                let this = Arc::clone(self);
                let cancel = cancel.clone();
                runtime::spawn(async move { this.run(sync, cancel).await })
            })
            .collect()
    }
}
