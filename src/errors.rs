use std::path::{Path, PathBuf};

use uuid::Uuid;

/// All error types that can occur while bridging Hue state onto Govee devices.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to serialize data to JSON.
    #[error("failed to dump json: {0:?}")]
    JsonDump(serde_json::Error),

    /// Failed to deserialize JSON data.
    #[error("failed to load json: {0:?}")]
    JsonLoad(serde_json::Error),

    /// Failed to deserialize a YAML configuration.
    #[error("failed to load yaml: {0}")]
    YamlLoad(serde_yaml::Error),

    /// A request to the Hue bridge could not be completed.
    #[cfg(feature = "runtime-tokio")]
    #[error("http request failed: {0}")]
    Http(reqwest::Error),

    /// A network socket operation failed while talking to a device.
    #[error("socket {action} error: {err:?}")]
    Socket { action: String, err: std::io::Error },

    /// The device id is not (yet) known to the transport.
    ///
    /// Callers usually downgrade this to a debug message: devices show up
    /// once discovery has heard from them.
    #[error("device {0} not found")]
    DeviceNotFound(String),

    /// The Hue bridge returned no light for the given id.
    #[error("light {0} not found")]
    LightNotFound(Uuid),

    /// No dynamic scene is active in the given room.
    #[error("no active scene found for room {0}")]
    SceneNotFound(Uuid),

    /// The Hue bridge answered with an error list.
    #[error("bridge error: {0}")]
    Bridge(String),

    /// The configuration file could not be read.
    #[error("failed to read config {path:?}: {err:?}")]
    Config { path: PathBuf, err: std::io::Error },

    /// The configuration was read but holds an unusable value.
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    /// Failed to parse a [`crate::Color`] from a string.
    #[error("invalid color string: {0}")]
    InvalidColorString(String),
}

impl Error {
    /// Create a new socket error
    pub fn socket(action: &str, err: std::io::Error) -> Self {
        Error::Socket {
            action: action.to_string(),
            err,
        }
    }

    /// Create a new config read error
    pub fn config(path: &Path, err: std::io::Error) -> Self {
        Error::Config {
            path: path.to_path_buf(),
            err,
        }
    }

    /// Whether this error only means the target device is unknown.
    ///
    /// ```
    /// use hue_govee_bridge::Error;
    ///
    /// assert!(Error::DeviceNotFound("AA:BB".into()).is_device_not_found());
    /// assert!(!Error::InvalidConfig("x".into()).is_device_not_found());
    /// ```
    pub fn is_device_not_found(&self) -> bool {
        matches!(self, Error::DeviceNotFound(_))
    }
}

/// Hacky implementation of PartialEq for testing
#[cfg(test)]
impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.to_string() == other.to_string()
    }
}
