//! HTTP uplink to the collection server.
//!
//! Implements [`UplinkPort`] by POSTing small JSON documents:
//!
//! | Call                 | Endpoint                  | Body                              |
//! |----------------------|---------------------------|-----------------------------------|
//! | `submit_calibration` | `{server_url}/calibrate`  | `{"id":…,"dry":…,"wet":…}`        |
//! | `submit_telemetry`   | `{server_url}/telemetry`  | `{"sensor_id":…,"raw_value":…}`   |
//!
//! Any 2xx status counts as success. When the WiFi link is down the call
//! returns [`CommsError::NotConnected`] without touching the network.
//!
//! On ESP-IDF each request opens a fresh `EspHttpConnection` wrapped in the
//! `embedded-svc` HTTP client. On the host the exchange is simulated and the
//! request log can be inspected.

use log::{debug, info};
use serde::Serialize;

use crate::app::ports::UplinkPort;
use crate::config::{UrlString, bounded};
use crate::error::CommsError;

#[cfg(feature = "espidf")]
use embedded_svc::http::{Status, client::Client as HttpClient};
#[cfg(feature = "espidf")]
use embedded_svc::io::Write;
#[cfg(feature = "espidf")]
use esp_idf_svc::http::client::{Configuration as HttpClientConfiguration, EspHttpConnection};

pub const CALIBRATE_PATH: &str = "/calibrate";
pub const TELEMETRY_PATH: &str = "/telemetry";

#[cfg(feature = "espidf")]
const REQUEST_TIMEOUT_MS: u64 = 10_000;

// ── Wire payloads ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CalibrationPayload<'a> {
    pub id: &'a str,
    pub dry: u16,
    pub wet: u16,
}

#[derive(Debug, Serialize)]
pub struct TelemetryPayload<'a> {
    pub sensor_id: &'a str,
    pub raw_value: u16,
}

/// A request the host simulation would have sent.
#[cfg(not(feature = "espidf"))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimRequest {
    pub url: String,
    pub body: String,
}

// ── Adapter ───────────────────────────────────────────────────

pub struct HttpUplink {
    server_url: UrlString,
    link_up: bool,
    #[cfg(not(feature = "espidf"))]
    sim_status: u16,
    #[cfg(not(feature = "espidf"))]
    sim_log: Vec<SimRequest>,
}

impl HttpUplink {
    pub fn new(server_url: &str) -> Self {
        Self {
            server_url: bounded(server_url.trim_end_matches('/')),
            link_up: false,
            #[cfg(not(feature = "espidf"))]
            sim_status: 200,
            #[cfg(not(feature = "espidf"))]
            sim_log: Vec::new(),
        }
    }

    /// Mirror the WiFi link state. Called by the main loop every pass.
    pub fn set_link_up(&mut self, up: bool) {
        if up != self.link_up {
            info!("Uplink: link {}", if up { "up" } else { "down" });
        }
        self.link_up = up;
    }

    pub fn server_url(&self) -> &str {
        &self.server_url
    }

    /// Simulation: status code the fake server answers with.
    #[cfg(not(feature = "espidf"))]
    pub fn sim_set_status(&mut self, status: u16) {
        self.sim_status = status;
    }

    #[cfg(not(feature = "espidf"))]
    pub fn sim_requests(&self) -> &[SimRequest] {
        &self.sim_log
    }

    fn post_json<T: Serialize>(&mut self, path: &str, payload: &T) -> Result<(), CommsError> {
        if !self.link_up {
            return Err(CommsError::NotConnected);
        }
        let body = serde_json::to_vec(payload).map_err(|_| CommsError::Encode)?;

        let mut url = String::with_capacity(self.server_url.len() + path.len());
        url.push_str(&self.server_url);
        url.push_str(path);

        debug!("Uplink: POST {} ({} bytes)", url, body.len());
        let status = self.platform_post(&url, &body)?;
        if (200..300).contains(&status) {
            Ok(())
        } else {
            Err(CommsError::Status(status))
        }
    }

    #[cfg(feature = "espidf")]
    fn platform_post(&mut self, url: &str, body: &[u8]) -> Result<u16, CommsError> {
        let conf = HttpClientConfiguration {
            timeout: Some(core::time::Duration::from_millis(REQUEST_TIMEOUT_MS)),
            ..Default::default()
        };
        let conn = EspHttpConnection::new(&conf).map_err(|e| {
            log::warn!("Uplink: connection setup failed: {}", e);
            CommsError::Transport
        })?;
        let mut client = HttpClient::wrap(conn);

        let content_length = body.len().to_string();
        let headers = [
            ("Content-Type", "application/json"),
            ("Content-Length", content_length.as_str()),
        ];

        let mut request = client
            .post(url, &headers)
            .map_err(|_| CommsError::Transport)?;
        request.write_all(body).map_err(|_| CommsError::Transport)?;
        request.flush().map_err(|_| CommsError::Transport)?;
        let response = request.submit().map_err(|_| CommsError::Transport)?;
        Ok(response.status())
    }

    #[cfg(not(feature = "espidf"))]
    fn platform_post(&mut self, url: &str, body: &[u8]) -> Result<u16, CommsError> {
        self.sim_log.push(SimRequest {
            url: url.to_owned(),
            body: String::from_utf8_lossy(body).into_owned(),
        });
        Ok(self.sim_status)
    }
}

impl UplinkPort for HttpUplink {
    fn submit_calibration(&mut self, device_id: &str, dry: u16, wet: u16) -> Result<(), CommsError> {
        self.post_json(
            CALIBRATE_PATH,
            &CalibrationPayload {
                id: device_id,
                dry,
                wet,
            },
        )
    }

    fn submit_telemetry(&mut self, device_id: &str, raw_sample: u16) -> Result<(), CommsError> {
        self.post_json(
            TELEMETRY_PATH,
            &TelemetryPayload {
                sensor_id: device_id,
                raw_value: raw_sample,
            },
        )
    }
}

#[cfg(all(test, not(feature = "espidf")))]
mod tests {
    use super::*;

    fn uplink() -> HttpUplink {
        let mut u = HttpUplink::new("http://collector.local:8080/");
        u.set_link_up(true);
        u
    }

    #[test]
    fn trailing_slash_is_trimmed() {
        assert_eq!(uplink().server_url(), "http://collector.local:8080");
    }

    #[test]
    fn calibration_body_shape() {
        let mut u = uplink();
        u.submit_calibration("AA:BB:CC:DD:EE:FF", 500, 900).unwrap();
        let req = &u.sim_requests()[0];
        assert_eq!(req.url, "http://collector.local:8080/calibrate");
        assert_eq!(req.body, r#"{"id":"AA:BB:CC:DD:EE:FF","dry":500,"wet":900}"#);
    }

    #[test]
    fn telemetry_body_shape() {
        let mut u = uplink();
        u.submit_telemetry("AA:BB:CC:DD:EE:FF", 2048).unwrap();
        let req = &u.sim_requests()[0];
        assert_eq!(req.url, "http://collector.local:8080/telemetry");
        assert_eq!(req.body, r#"{"sensor_id":"AA:BB:CC:DD:EE:FF","raw_value":2048}"#);
    }

    #[test]
    fn non_2xx_is_an_error() {
        let mut u = uplink();
        u.sim_set_status(204);
        assert!(u.submit_telemetry("id", 1).is_ok());
        u.sim_set_status(503);
        assert_eq!(u.submit_telemetry("id", 1), Err(CommsError::Status(503)));
    }

    #[test]
    fn link_down_sends_nothing() {
        let mut u = uplink();
        u.set_link_up(false);
        assert_eq!(
            u.submit_calibration("id", 1, 2),
            Err(CommsError::NotConnected)
        );
        assert!(u.sim_requests().is_empty());
    }
}
