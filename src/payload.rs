//! Govee LAN API messages.
//!
//! Every datagram, in either direction, is a JSON object of the form
//! `{"msg": {"cmd": <name>, "data": <object>}}`.

use std::net::Ipv4Addr;

use serde::{Deserialize, Serialize};

use crate::errors::Error;
use crate::types::{Brightness, Color};

type Result<T> = std::result::Result<T, Error>;

/// The outer `{"msg": ...}` wrapper.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Envelope<T> {
    pub msg: T,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ScanRequest {
    pub account_topic: String,
}

/// Payload of `turn` and `brightness`.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct Value<T> {
    pub value: T,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
pub struct ColorChange {
    pub color: Color,
    /// Zero selects the RGB channels instead of white.
    #[serde(rename = "colorTemInKelvin")]
    pub color_temperature: u32,
}

/// A command sent to a device.
///
/// # Example
///
/// ```
/// use hue_govee_bridge::{Brightness, Command};
///
/// let bytes = Command::brightness(&Brightness::create(40).unwrap()).to_bytes().unwrap();
/// assert_eq!(bytes, br#"{"msg":{"cmd":"brightness","data":{"value":40}}}"#);
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "lowercase")]
pub enum Command {
    Scan(ScanRequest),
    Turn(Value<u8>),
    Brightness(Value<Brightness>),
    #[serde(rename = "colorwc")]
    Color(ColorChange),
}

impl Command {
    /// Discovery request, multicast to every device.
    pub fn scan() -> Self {
        Command::Scan(ScanRequest {
            account_topic: String::from("reserve"),
        })
    }

    pub fn turn(on: bool) -> Self {
        Command::Turn(Value { value: on.into() })
    }

    pub fn brightness(brightness: &Brightness) -> Self {
        Command::Brightness(Value { value: *brightness })
    }

    pub fn color(color: &Color) -> Self {
        Command::Color(ColorChange {
            color: *color,
            color_temperature: 0,
        })
    }

    /// The `cmd` name on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Command::Scan(_) => "scan",
            Command::Turn(_) => "turn",
            Command::Brightness(_) => "brightness",
            Command::Color(_) => "colorwc",
        }
    }

    /// Serialize inside the envelope, ready to put in a datagram.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&Envelope { msg: self }).map_err(Error::JsonDump)
    }
}

/// A device's answer to [`Command::scan`].
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ScanReply {
    pub ip: Ipv4Addr,
    pub device: String,
    pub sku: Option<String>,
    #[serde(rename = "wifiVersionSoft")]
    pub wifi_version: Option<String>,
}

/// Messages a device sends back.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "cmd", content = "data", rename_all = "lowercase")]
pub enum Reply {
    Scan(ScanReply),
}

impl Reply {
    pub fn from_bytes(buf: &[u8]) -> Result<Self> {
        serde_json::from_slice::<Envelope<Reply>>(buf)
            .map(|envelope| envelope.msg)
            .map_err(Error::JsonLoad)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn wire(command: &Command) -> serde_json::Value {
        serde_json::from_slice(&command.to_bytes().unwrap()).unwrap()
    }

    #[test]
    fn test_scan() {
        assert_eq!(
            wire(&Command::scan()),
            json!({"msg": {"cmd": "scan", "data": {"account_topic": "reserve"}}})
        );
    }

    #[test]
    fn test_turn() {
        assert_eq!(
            wire(&Command::turn(true)),
            json!({"msg": {"cmd": "turn", "data": {"value": 1}}})
        );
        assert_eq!(
            wire(&Command::turn(false)),
            json!({"msg": {"cmd": "turn", "data": {"value": 0}}})
        );
    }

    #[test]
    fn test_color() {
        assert_eq!(
            wire(&Command::color(&Color::rgb(255, 16, 0))),
            json!({"msg": {"cmd": "colorwc", "data": {
                "color": {"r": 255, "g": 16, "b": 0},
                "colorTemInKelvin": 0
            }}})
        );
    }

    #[test]
    fn test_names_match_wire() {
        for command in [
            Command::scan(),
            Command::turn(true),
            Command::brightness(&Brightness::new()),
            Command::color(&Color::BLACK),
        ] {
            assert_eq!(wire(&command)["msg"]["cmd"], command.name());
        }
    }

    #[test]
    fn test_parse_scan_reply() {
        let datagram = br#"{"msg":{"cmd":"scan","data":{
            "ip":"192.168.1.23","device":"1F:80:C5:32:32:36:72:4E","sku":"H618E",
            "bleVersionHard":"3.01.01","bleVersionSoft":"1.03.01",
            "wifiVersionHard":"1.00.10","wifiVersionSoft":"1.02.03"}}}"#;
        let Reply::Scan(reply) = Reply::from_bytes(datagram).unwrap();
        assert_eq!(reply.ip, Ipv4Addr::new(192, 168, 1, 23));
        assert_eq!(reply.device, "1F:80:C5:32:32:36:72:4E");
        assert_eq!(reply.sku.as_deref(), Some("H618E"));
        assert_eq!(reply.wifi_version.as_deref(), Some("1.02.03"));
    }

    #[test]
    fn test_reject_other_replies() {
        assert!(Reply::from_bytes(br#"{"msg":{"cmd":"devStatus","data":{}}}"#).is_err());
        assert!(Reply::from_bytes(b"not json").is_err());
    }
}
