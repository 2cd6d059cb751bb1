//! # hue_govee_bridge
//!
//! Mirror Philips Hue lights onto Govee devices on the local network.
//!
//! The crate reads light state from a Hue bridge over its CLIP v2 HTTPS API
//! ([`hue::HueClient`], tokio runtime only), converts Hue's perceptual
//! color description (CIE xy inside a gamut, or a color temperature) into
//! the 8-bit RGB Govee devices understand, and sends it over the Govee LAN
//! API. Lights playing a Hue dynamic scene are mirrored by cycling the
//! scene's palette on the Govee side.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use hue_govee_bridge::hue::HueClient;
//! use hue_govee_bridge::runtime::CancelToken;
//! use hue_govee_bridge::{Config, GoveeClient, Synchronizer};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), hue_govee_bridge::Error> {
//! let config = Config::load("config.yaml")?;
//! config.apply_log_level();
//!
//! let hue = Arc::new(HueClient::from_config(&config)?);
//! let govee = Arc::new(GoveeClient::new(config.govee_multicast_ip));
//! govee.discover(std::time::Duration::from_secs(2)).await?;
//!
//! let cancel = CancelToken::new();
//! let sync = Arc::new(Synchronizer::new(hue, govee, config.poll_interval));
//! for handle in sync.spawn(config.synchronizations, &cancel) {
//!     handle.await;
//! }
//! # Ok(())
//! # }
//! ```
//!
//! `demos/hue2govee.rs` is the complete program, with periodic Govee
//! discovery and Ctrl-C handling.
//!
//! ## Color conversion
//!
//! [`color_to_rgb`] picks the conversion for a light: black when off, a
//! black-body approximation for a valid color temperature ([`kelvin_to_rgb`]),
//! a gamut-corrected xy conversion ([`xy_to_rgb`]) for color, and grey
//! otherwise.
//!
//! ## Communication
//!
//! Govee devices are scanned by multicasting to 239.255.255.250:4001 and
//! answer on port 4002. Commands go to port 4003 on the device and are never
//! acknowledged.
//!
//! ## Runtime Selection
//!
//! This library is runtime-agnostic. Select your preferred runtime using feature flags:
//!
//! ### Using tokio (default)
//!
//! ```toml
//! [dependencies]
//! hue-govee-bridge = "0.1"
//! tokio = { version = "1", features = ["rt-multi-thread", "macros"] }
//! ```
//!
//! ### Using async-std
//!
//! ```toml
//! [dependencies]
//! hue-govee-bridge = { version = "0.1", default-features = false, features = ["runtime-async-std"] }
//! async-std = { version = "1.12", features = ["attributes"] }
//! ```
//!
//! ### Using smol
//!
//! ```toml
//! [dependencies]
//! hue-govee-bridge = { version = "0.1", default-features = false, features = ["runtime-smol"] }
//! smol = "2"
//! ```

mod client;
mod color;
mod config;
mod device;
mod discovery;
mod errors;
pub mod hue;
mod payload;
pub mod runtime;
pub mod scene;
mod sync;
mod types;

// Re-export public API
pub use client::{CONTROL_PORT, DEFAULT_MULTICAST_IP, GoveeClient, REPLY_PORT, SCAN_PORT};
pub use color::{
    Coords, DEFAULT_GAMUT, GAMUT_A, GAMUT_B, GAMUT_C, Gamut, GamutType, LightColorState,
    color_to_rgb, kelvin_to_rgb, resolve_gamut, xy_to_rgb,
};
pub use config::{Config, Synchronization};
pub use device::DeviceCommander;
pub use discovery::DiscoveredDevice;
pub use errors::Error;
pub use payload::{Command, Reply, ScanReply};
pub use scene::SceneController;
pub use sync::{SyncOutcome, SyncState, Synchronizer};
pub use types::{Brightness, Color, Kelvin};
