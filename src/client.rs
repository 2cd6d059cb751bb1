//! Sending commands to Govee devices over the LAN API.

use std::collections::HashMap;
use std::net::Ipv4Addr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;

use crate::device::DeviceCommander;
use crate::errors::Error;
use crate::payload::Command;
use crate::runtime::{AsyncUdpSocket, UdpSocket};
use crate::types::{Brightness, Color};

type Result<T> = std::result::Result<T, Error>;

/// Devices listen for scan requests here.
pub const SCAN_PORT: u16 = 4001;
/// Scan replies are sent to this port on the requester.
pub const REPLY_PORT: u16 = 4002;
/// Control commands go to this port on the device.
pub const CONTROL_PORT: u16 = 4003;

/// Multicast group devices listen on for scans.
pub const DEFAULT_MULTICAST_IP: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);

/// Client for Govee devices on the local network.
///
/// Devices are addressed by their id (a MAC-like string). The client keeps
/// a registry mapping ids to addresses, filled by discovery or by
/// [`register`](GoveeClient::register). Clones share the registry.
///
/// Commands are fire-and-forget: devices never acknowledge them.
///
/// # Example
///
/// ```
/// use std::net::Ipv4Addr;
/// use hue_govee_bridge::GoveeClient;
///
/// let client = GoveeClient::default();
/// assert!(client.device_ip("AA:BB:CC").is_none());
///
/// client.register("AA:BB:CC", Ipv4Addr::new(192, 168, 1, 40));
/// assert_eq!(client.device_ip("AA:BB:CC"), Some(Ipv4Addr::new(192, 168, 1, 40)));
/// ```
#[derive(Debug, Clone)]
pub struct GoveeClient {
    multicast_ip: Ipv4Addr,
    devices: Arc<Mutex<HashMap<String, Ipv4Addr>>>,
}

impl Default for GoveeClient {
    fn default() -> Self {
        Self::new(DEFAULT_MULTICAST_IP)
    }
}

impl GoveeClient {
    pub fn new(multicast_ip: Ipv4Addr) -> Self {
        GoveeClient {
            multicast_ip,
            devices: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn multicast_ip(&self) -> Ipv4Addr {
        self.multicast_ip
    }

    /// Record the address of a device.
    ///
    /// Returns `true` when the device is new or has moved.
    pub fn register(&self, device_id: &str, ip: Ipv4Addr) -> bool {
        let previous = self.registry().insert(device_id.to_string(), ip);
        previous != Some(ip)
    }

    /// Drop a device from the registry, returning its last address.
    pub fn forget(&self, device_id: &str) -> Option<Ipv4Addr> {
        self.registry().remove(device_id)
    }

    pub fn device_ip(&self, device_id: &str) -> Option<Ipv4Addr> {
        self.registry().get(device_id).copied()
    }

    /// Snapshot of every known device.
    pub fn devices(&self) -> HashMap<String, Ipv4Addr> {
        self.registry().clone()
    }

    /// Send a command to a registered device.
    ///
    /// Fails with [`Error::DeviceNotFound`] before touching the network when
    /// the id is unknown.
    pub async fn send(&self, device_id: &str, command: &Command) -> Result<()> {
        let ip = self
            .device_ip(device_id)
            .ok_or_else(|| Error::DeviceNotFound(device_id.to_string()))?;
        let msg = command.to_bytes()?;

        let socket = UdpSocket::bind("0.0.0.0:0")
            .await
            .map_err(|e| Error::socket("bind", e))?;
        socket
            .send_to(&msg, &format!("{}:{}", ip, CONTROL_PORT))
            .await
            .map_err(|e| Error::socket("send_to", e))?;

        debug!("sent {} to {} ({})", command.name(), device_id, ip);
        Ok(())
    }

    fn registry(&self) -> MutexGuard<'_, HashMap<String, Ipv4Addr>> {
        self.devices.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl DeviceCommander for GoveeClient {
    async fn set_color(&self, device_id: &str, color: &Color) -> Result<()> {
        self.send(device_id, &Command::color(color)).await
    }

    async fn set_brightness(&self, device_id: &str, brightness: &Brightness) -> Result<()> {
        self.send(device_id, &Command::brightness(brightness)).await
    }

    async fn turn_on(&self, device_id: &str) -> Result<()> {
        self.send(device_id, &Command::turn(true)).await
    }

    async fn turn_off(&self, device_id: &str) -> Result<()> {
        self.send(device_id, &Command::turn(false)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unknown_device_fails_before_sending() {
        let client = GoveeClient::default();
        let err = client.turn_on("AA:BB").await.unwrap_err();
        assert_eq!(err, Error::DeviceNotFound(String::from("AA:BB")));
        assert!(err.is_device_not_found());

        let err = client
            .set_color("AA:BB", &Color::rgb(1, 2, 3))
            .await
            .unwrap_err();
        assert!(err.is_device_not_found());
    }

    #[tokio::test]
    async fn test_send_to_registered_device() {
        let client = GoveeClient::default();
        client.register("AA:BB", Ipv4Addr::LOCALHOST);
        client
            .set_brightness("AA:BB", &Brightness::create(10).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn test_register_reports_changes() {
        let client = GoveeClient::default();
        let shared = client.clone();
        let ip = Ipv4Addr::new(10, 0, 0, 7);

        assert!(client.register("AA:BB", ip));
        assert!(!shared.register("AA:BB", ip));
        assert!(shared.register("AA:BB", Ipv4Addr::new(10, 0, 0, 8)));
        assert_eq!(client.devices().len(), 1);

        assert_eq!(client.forget("AA:BB"), Some(Ipv4Addr::new(10, 0, 0, 8)));
        assert!(shared.device_ip("AA:BB").is_none());
    }
}
