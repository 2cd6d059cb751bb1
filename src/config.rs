//! Bridge configuration.
//!
//! A YAML or JSON document naming the Hue bridge and the light/device pairs
//! to keep in sync. [`Config::load`] picks the format from the file
//! extension (`.yaml`/`.yml`, anything else is JSON):
//!
//! ```yaml
//! hue_bridge_id: 001788fffe4a2b3c
//! hue_bridge_username: 0a1b2c3d
//! hue_bridge_address: 192.168.1.2
//! synchronizations:
//!   - hue_light_id: 3f4ac4e9-d67a-4dbd-8a16-5ea7e373f281
//!     hue_room_id: c1e4d2d4-2e4b-4f53-a8e3-2c9d3a5c2f10
//!     govee_device_id: 1F:80:C5:32:32:36:72:4E
//! ```
//!
//! The same in JSON, with the optional keys spelled out:
//!
//! ```json
//! {
//!   "hue_bridge_id": "001788fffe4a2b3c",
//!   "hue_bridge_username": "0a1b2c3d",
//!   "hue_bridge_address": "192.168.1.2",
//!   "govee_multicast_ip": "239.255.255.250",
//!   "log_level": "info",
//!   "poll_interval_ms": 500,
//!   "synchronizations": [
//!     {
//!       "hue_light_id": "3f4ac4e9-d67a-4dbd-8a16-5ea7e373f281",
//!       "hue_room_id": "c1e4d2d4-2e4b-4f53-a8e3-2c9d3a5c2f10",
//!       "govee_device_id": "1F:80:C5:32:32:36:72:4E",
//!       "fixed_brightness": 80
//!     }
//!   ]
//! }
//! ```

use std::collections::HashSet;
use std::ffi::OsStr;
use std::net::Ipv4Addr;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use log::{LevelFilter, warn};
use serde::{Deserialize, Serialize};
use serde_with::{DurationMilliSeconds, serde_as};
use uuid::Uuid;

use crate::client::DEFAULT_MULTICAST_IP;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

/// One Hue light mirrored onto one Govee device.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Synchronization {
    pub hue_light_id: Uuid,
    /// Room whose active scene is played while the light is dynamic.
    pub hue_room_id: Uuid,
    pub govee_device_id: String,
    /// Percentage that replaces the light's own brightness.
    pub fixed_brightness: Option<u8>,
}

fn default_multicast_ip() -> Ipv4Addr {
    DEFAULT_MULTICAST_IP
}

fn default_log_level() -> String {
    String::from("info")
}

fn default_poll_interval() -> Duration {
    Duration::from_millis(500)
}

#[serde_as]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Config {
    pub hue_bridge_id: String,
    pub hue_bridge_username: String,
    /// Host (and optional port) of the bridge's HTTPS API.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue_bridge_address: Option<String>,
    #[serde(default = "default_multicast_ip")]
    pub govee_multicast_ip: Ipv4Addr,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "poll_interval_ms", default = "default_poll_interval")]
    pub poll_interval: Duration,
    #[serde(default)]
    pub synchronizations: Vec<Synchronization>,
}

impl Config {
    /// Read and validate a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| Error::config(path, e))?;
        match path.extension().and_then(OsStr::to_str) {
            Some("yaml" | "yml") => Self::from_yaml(&contents),
            _ => Self::from_json(&contents),
        }
    }

    /// Parse and validate a YAML configuration document.
    ///
    /// ```
    /// use hue_govee_bridge::Config;
    ///
    /// let config = Config::from_yaml("
    /// hue_bridge_id: 001788fffe4a2b3c
    /// hue_bridge_username: secret
    /// hue_bridge_address: 192.168.1.2
    /// ").unwrap();
    /// assert_eq!(config.hue_bridge_address.as_deref(), Some("192.168.1.2"));
    /// ```
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(contents).map_err(Error::YamlLoad)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate a configuration document.
    ///
    /// ```
    /// use std::time::Duration;
    /// use hue_govee_bridge::Config;
    ///
    /// let config = Config::from_json(r#"{
    ///     "hue_bridge_id": "001788fffe4a2b3c",
    ///     "hue_bridge_username": "secret"
    /// }"#).unwrap();
    /// assert_eq!(config.poll_interval, Duration::from_millis(500));
    /// assert!(config.synchronizations.is_empty());
    /// ```
    pub fn from_json(contents: &str) -> Result<Self> {
        let config: Config = serde_json::from_str(contents).map_err(Error::JsonLoad)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(String::from(
                "poll_interval_ms must be positive",
            )));
        }

        let mut devices = HashSet::new();
        for sync in &self.synchronizations {
            if let Some(fixed) = sync.fixed_brightness
                && fixed > 100
            {
                return Err(Error::InvalidConfig(format!(
                    "fixed_brightness {} for {} is above 100",
                    fixed, sync.govee_device_id
                )));
            }
            if !devices.insert(sync.govee_device_id.as_str()) {
                return Err(Error::InvalidConfig(format!(
                    "device {} is synchronized more than once",
                    sync.govee_device_id
                )));
            }
        }
        Ok(())
    }

    /// The configured log level, `Info` when it cannot be parsed.
    pub fn log_level(&self) -> LevelFilter {
        LevelFilter::from_str(&self.log_level).unwrap_or_else(|_| {
            warn!("unknown log level {:?}, using info", self.log_level);
            LevelFilter::Info
        })
    }

    /// Cap the `log` facade at the configured level.
    pub fn apply_log_level(&self) {
        log::set_max_level(self.log_level());
    }
}
