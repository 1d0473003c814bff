//! System configuration parameters
//!
//! All tunable parameters for the SoilSense node. Network defaults are
//! injected at build time through the `WIFI_SSID`, `WIFI_PASS` and
//! `SERVER_URL` environment variables; everything can be overridden by a
//! config blob stored in NVS.

use serde::{Deserialize, Serialize};

/// Fallback used when `WIFI_SSID` / `WIFI_PASS` are not set at build time.
const DEFAULT_CREDENTIAL: &str = "DEFAULT";
const DEFAULT_SERVER_URL: &str = "http://localhost:8080";

pub type UrlString = heapless::String<96>;
pub type SsidString = heapless::String<32>;
pub type PasswordString = heapless::String<64>;

/// Button timing thresholds, all in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonTiming {
    /// Raw level must hold this long before a transition is accepted.
    pub debounce_ms: u32,
    /// Presses this short or shorter are dropped as noise.
    pub noise_ms: u32,
    /// Presses longer than this are long presses.
    pub long_press_ms: u32,
}

impl Default for ButtonTiming {
    fn default() -> Self {
        Self {
            debounce_ms: 50,
            noise_ms: 50,
            long_press_ms: 2000,
        }
    }
}

/// Core system configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemConfig {
    // --- Input ---
    pub button: ButtonTiming,

    // --- Timing ---
    /// Minimum spacing between telemetry uploads while idle (milliseconds)
    pub telemetry_interval_ms: u32,
    /// Main loop poll period (milliseconds)
    pub loop_period_ms: u32,

    // --- Network ---
    /// Base URL of the collection server, without trailing slash
    pub server_url: UrlString,
    pub wifi_ssid: SsidString,
    pub wifi_pass: PasswordString,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            button: ButtonTiming::default(),

            telemetry_interval_ms: 30_000, // 30 s
            loop_period_ms: 5,

            server_url: bounded(option_env!("SERVER_URL").unwrap_or(DEFAULT_SERVER_URL)),
            wifi_ssid: bounded(option_env!("WIFI_SSID").unwrap_or(DEFAULT_CREDENTIAL)),
            wifi_pass: bounded(option_env!("WIFI_PASS").unwrap_or(DEFAULT_CREDENTIAL)),
        }
    }
}

/// Copy `s` into a fixed-capacity string, truncating on a char boundary.
pub(crate) fn bounded<const N: usize>(s: &str) -> heapless::String<N> {
    let mut out = heapless::String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}
