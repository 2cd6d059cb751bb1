//! Device discovery via the Govee multicast scan.

use std::collections::HashMap;
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::client::{GoveeClient, REPLY_PORT, SCAN_PORT};
use crate::errors::Error;
use crate::payload::{Command, Reply, ScanReply};
use crate::runtime::{self, AsyncUdpSocket, CancelToken, Instant, UdpSocket};

type Result<T> = std::result::Result<T, Error>;

/// A Govee device that answered a scan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveredDevice {
    pub device_id: String,
    pub ip: Ipv4Addr,
    pub sku: Option<String>,
}

impl From<ScanReply> for DiscoveredDevice {
    fn from(reply: ScanReply) -> Self {
        DiscoveredDevice {
            device_id: reply.device,
            ip: reply.ip,
            sku: reply.sku,
        }
    }
}

/// Parse a scan reply datagram, ignoring anything else on the port.
fn parse_reply(datagram: &[u8], from: SocketAddr) -> Option<DiscoveredDevice> {
    match Reply::from_bytes(datagram) {
        Ok(Reply::Scan(reply)) => Some(reply.into()),
        Err(e) => {
            debug!("ignoring datagram from {}: {}", from, e);
            None
        }
    }
}

impl GoveeClient {
    /// Multicast a scan and collect the devices that answer within `window`.
    ///
    /// Every device that answers is registered, so commands can reach it
    /// right away.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use std::time::Duration;
    /// use hue_govee_bridge::GoveeClient;
    ///
    /// let client = GoveeClient::default();
    /// for device in client.discover(Duration::from_secs(3)).await? {
    ///     println!("{} at {}", device.device_id, device.ip);
    /// }
    /// ```
    pub async fn discover(&self, window: Duration) -> Result<Vec<DiscoveredDevice>> {
        let socket = UdpSocket::bind(&format!("0.0.0.0:{}", REPLY_PORT))
            .await
            .map_err(|e| Error::socket("bind", e))?;

        if let Err(e) = socket.join_multicast_v4(self.multicast_ip(), Ipv4Addr::UNSPECIFIED) {
            warn!("could not join multicast group {}: {}", self.multicast_ip(), e);
        }

        let msg = Command::scan().to_bytes()?;
        socket
            .send_to(&msg, &format!("{}:{}", self.multicast_ip(), SCAN_PORT))
            .await
            .map_err(|e| Error::socket("send_to", e))?;

        let mut discovered: HashMap<String, DiscoveredDevice> = HashMap::new();
        let start = Instant::now();
        let mut buffer = [0u8; 2048];
        let recv_timeout = Duration::from_millis(500);

        while start.elapsed() < window {
            match runtime::timeout(recv_timeout, socket.recv_from(&mut buffer)).await {
                Ok(Ok((size, from))) => {
                    if let Some(device) = parse_reply(&buffer[..size], from) {
                        if self.register(&device.device_id, device.ip) {
                            info!("discovered Govee device {} at {}", device.device_id, device.ip);
                        }
                        discovered.insert(device.device_id.clone(), device);
                    }
                }
                Ok(Err(e)) => debug!("scan receive failed: {}", e),
                // Timeout elapsed - continue loop to check the window
                Err(_) => continue,
            }
        }

        Ok(discovered.into_values().collect())
    }

    /// Scan every `interval` until `cancel` fires.
    ///
    /// Failed scans are logged and retried on the next round.
    pub async fn run_discovery(&self, interval: Duration, window: Duration, cancel: CancelToken) {
        while !cancel.is_cancelled() {
            match self.discover(window).await {
                Ok(devices) => debug!("scan finished, {} device(s) answered", devices.len()),
                Err(e) => error!("device scan failed: {}", e),
            }
            if !cancel.sleep(interval).await {
                break;
            }
        }
        debug!("device discovery stopped");
    }
}
