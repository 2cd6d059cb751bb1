//! CLIP v2 over HTTPS.

use std::time::Duration;

use log::debug;
use reqwest::StatusCode;
use reqwest::header::{HeaderMap, HeaderValue};
use uuid::Uuid;

use super::{
    APPLICATION_KEY_HEADER, HueSource, Light, SCENE_PATH, Scene, find_active_scene, light_path,
    parse_light,
};
use crate::config::Config;
use crate::errors::Error;

type Result<T> = std::result::Result<T, Error>;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Client for the CLIP v2 API of one Hue bridge.
///
/// Every request carries the application key in [`APPLICATION_KEY_HEADER`].
/// Bridges serve a self-signed certificate, so it is not verified.
///
/// # Example
///
/// ```no_run
/// use hue_govee_bridge::hue::{HueClient, HueSource};
/// use uuid::Uuid;
///
/// # #[tokio::main]
/// # async fn main() -> Result<(), hue_govee_bridge::Error> {
/// let hue = HueClient::new("192.168.1.2", "application-key")?;
/// let light = hue.light(&Uuid::nil()).await?;
/// println!("on: {}, brightness: {}", light.is_on(), light.brightness());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HueClient {
    http: reqwest::Client,
    base_url: String,
}

impl HueClient {
    /// Client for the bridge at `address`, a host with an optional port.
    pub fn new(address: &str, application_key: &str) -> Result<Self> {
        Self::with_base_url(format!("https://{}", address), application_key)
    }

    /// Client for the bridge a configuration names.
    pub fn from_config(config: &Config) -> Result<Self> {
        let address = config.hue_bridge_address.as_deref().ok_or_else(|| {
            Error::InvalidConfig(format!(
                "hue_bridge_address is required for bridge {}",
                config.hue_bridge_id
            ))
        })?;
        Self::new(address, &config.hue_bridge_username)
    }

    fn with_base_url(base_url: String, application_key: &str) -> Result<Self> {
        let mut key = HeaderValue::from_str(application_key).map_err(|_| {
            Error::InvalidConfig(String::from("hue_bridge_username is not a valid header"))
        })?;
        key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(APPLICATION_KEY_HEADER, key);

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .danger_accept_invalid_certs(true)
            .no_proxy()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(Error::Http)?;

        Ok(HueClient { http, base_url })
    }

    async fn get(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}{}", self.base_url, path);
        debug!("GET {}", url);

        let response = self.http.get(&url).send().await.map_err(Error::Http)?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::Bridge(format!("GET {} answered {}", path, status)));
        }
        let body = response.bytes().await.map_err(Error::Http)?;
        Ok(body.to_vec())
    }
}

impl HueSource for HueClient {
    async fn light(&self, light_id: &Uuid) -> Result<Light> {
        let body = self.get(&light_path(light_id)).await?;
        parse_light(&body, light_id)
    }

    async fn active_scene(&self, room_id: &Uuid) -> Result<Scene> {
        let body = self.get(SCENE_PATH).await?;
        find_active_scene(&body, room_id)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::task::JoinHandle;

    use super::*;

    /// Answer one request with `status` and `body`, handing back the raw
    /// request head.
    async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = tokio::spawn(async move {
            let (mut stream, _) = listener.accept().await.unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            while !request.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                request.extend_from_slice(&buf[..n]);
            }
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).await.unwrap();
            String::from_utf8(request).unwrap().to_ascii_lowercase()
        });

        (base_url, handle)
    }

    #[tokio::test]
    async fn test_light_request() {
        let id = Uuid::new_v4();
        let body = json!({
            "errors": [],
            "data": [{"id": id, "on": {"on": true}, "dimming": {"brightness": 42.0}}]
        });
        let (base_url, server) = serve_once("200 OK", body.to_string()).await;

        let hue = HueClient::with_base_url(base_url, "secret").unwrap();
        let light = hue.light(&id).await.unwrap();
        assert!(light.is_on());
        assert_eq!(light.brightness(), 42.0);

        let request = server.await.unwrap();
        assert!(request.starts_with(&format!("get /clip/v2/resource/light/{} ", id)));
        assert!(request.contains("hue-application-key: secret"));
    }

    #[tokio::test]
    async fn test_active_scene_request() {
        let room = Uuid::new_v4();
        let scene = Uuid::new_v4();
        let body = json!({
            "errors": [],
            "data": [{"id": scene, "speed": 0.5,
                      "group": {"rid": room, "rtype": "room"},
                      "status": {"active": "dynamic_palette"}}]
        });
        let (base_url, server) = serve_once("200 OK", body.to_string()).await;

        let hue = HueClient::with_base_url(base_url, "secret").unwrap();
        assert_eq!(hue.active_scene(&room).await.unwrap().id, scene);
        assert!(server.await.unwrap().starts_with("get /clip/v2/resource/scene "));
    }

    #[tokio::test]
    async fn test_error_status() {
        let (base_url, server) = serve_once("403 Forbidden", String::from("{}")).await;

        let hue = HueClient::with_base_url(base_url, "wrong").unwrap();
        let err = hue.active_scene(&Uuid::new_v4()).await.unwrap_err();
        assert_eq!(
            err,
            Error::Bridge(String::from("GET /clip/v2/resource/scene answered 403 Forbidden"))
        );
        server.await.unwrap();
    }

    #[tokio::test]
    async fn test_unreachable_bridge() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let hue = HueClient::with_base_url(base_url, "secret").unwrap();
        assert!(matches!(
            hue.light(&Uuid::new_v4()).await,
            Err(Error::Http(_))
        ));
    }

    #[test]
    fn test_from_config_needs_address() {
        let mut config = Config::from_json(
            r#"{"hue_bridge_id": "001788fffe4a2b3c", "hue_bridge_username": "secret"}"#,
        )
        .unwrap();
        assert!(matches!(
            HueClient::from_config(&config),
            Err(Error::InvalidConfig(_))
        ));

        config.hue_bridge_address = Some(String::from("192.168.1.2"));
        assert_eq!(
            HueClient::from_config(&config).unwrap().base_url,
            "https://192.168.1.2"
        );
    }

    #[test]
    fn test_rejects_unprintable_key() {
        assert!(matches!(
            HueClient::new("192.168.1.2", "bad\nkey"),
            Err(Error::InvalidConfig(_))
        ));
    }
}
