//! The operations a synchronizer needs from a target device.

use std::future::Future;

use log::{debug, error};

use crate::errors::Error;
use crate::types::{Brightness, Color};

type Result<T> = std::result::Result<T, Error>;

/// Something that can drive Govee devices by id.
///
/// Implemented by [`crate::GoveeClient`]. Every call fails with
/// [`Error::DeviceNotFound`] for ids the implementor does not know.
pub trait DeviceCommander: Send + Sync {
    fn set_color(&self, device_id: &str, color: &Color)
    -> impl Future<Output = Result<()>> + Send;

    fn set_brightness(
        &self,
        device_id: &str,
        brightness: &Brightness,
    ) -> impl Future<Output = Result<()>> + Send;

    fn turn_on(&self, device_id: &str) -> impl Future<Output = Result<()>> + Send;

    fn turn_off(&self, device_id: &str) -> impl Future<Output = Result<()>> + Send;
}

/// Log a failed command. Unknown devices are expected until discovery has
/// heard from them, so they only show up at debug level.
pub(crate) fn log_command_error(device_id: &str, action: &str, err: &Error) {
    if err.is_device_not_found() {
        debug!("{} skipped, device {} not discovered yet", action, device_id);
    } else {
        error!("{} on device {} failed: {}", action, device_id, err);
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::collections::HashSet;
    use std::io;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Sent {
        Color(Color),
        Brightness(Brightness),
        On,
        Off,
    }

    /// Records every command instead of sending it.
    #[derive(Default)]
    pub struct RecordingCommander {
        sent: Mutex<Vec<(String, Sent)>>,
        unknown: Mutex<HashSet<String>>,
        colors_fail: AtomicBool,
    }

    impl RecordingCommander {
        pub fn sent(&self) -> Vec<(String, Sent)> {
            self.sent.lock().unwrap().clone()
        }

        pub fn sent_to(&self, device_id: &str) -> Vec<Sent> {
            self.sent()
                .into_iter()
                .filter(|(id, _)| id == device_id)
                .map(|(_, sent)| sent)
                .collect()
        }

        /// Make every command to `device_id` fail with `DeviceNotFound`.
        pub fn forget(&self, device_id: &str) {
            self.unknown.lock().unwrap().insert(device_id.to_string());
        }

        /// Make every `set_color` fail with a socket error.
        pub fn fail_colors(&self) {
            self.colors_fail.store(true, Ordering::SeqCst);
        }

        fn record(&self, device_id: &str, sent: Sent) -> Result<()> {
            if self.unknown.lock().unwrap().contains(device_id) {
                return Err(Error::DeviceNotFound(device_id.to_string()));
            }
            self.sent.lock().unwrap().push((device_id.to_string(), sent));
            Ok(())
        }
    }

    impl DeviceCommander for RecordingCommander {
        async fn set_color(&self, device_id: &str, color: &Color) -> Result<()> {
            if self.colors_fail.load(Ordering::SeqCst) {
                return Err(Error::socket(
                    "send_to",
                    io::Error::new(io::ErrorKind::HostUnreachable, "no route to host"),
                ));
            }
            self.record(device_id, Sent::Color(*color))
        }

        async fn set_brightness(&self, device_id: &str, brightness: &Brightness) -> Result<()> {
            self.record(device_id, Sent::Brightness(*brightness))
        }

        async fn turn_on(&self, device_id: &str) -> Result<()> {
            self.record(device_id, Sent::On)
        }

        async fn turn_off(&self, device_id: &str) -> Result<()> {
            self.record(device_id, Sent::Off)
        }
    }
}
