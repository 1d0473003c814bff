//! Unified error types for the SoilSense firmware.
//!
//! A single `Error` enum that every subsystem can convert into, keeping the
//! bootstrap path's error handling uniform. All variants are `Copy` so they
//! can be passed around the control loop without allocation.

use core::fmt;

use crate::adapters::wifi::ConnectivityError;
use crate::app::ports::{ConfigError, StorageError};
use crate::drivers::hw_init::HwInitError;

// ---------------------------------------------------------------------------
// Top-level firmware error
// ---------------------------------------------------------------------------

/// Every fallible operation in the firmware funnels into this type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// The uplink to the collection server failed.
    Comms(CommsError),
    /// Non-volatile storage could not be read or written.
    Storage(StorageError),
    /// Configuration is invalid or could not be loaded.
    Config(ConfigError),
    /// The WiFi station could not be configured or associated.
    Connectivity(ConnectivityError),
    /// Peripheral initialisation failed.
    Hw(HwInitError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Comms(e) => write!(f, "comms: {e}"),
            Self::Storage(e) => write!(f, "storage: {e}"),
            Self::Config(e) => write!(f, "config: {e}"),
            Self::Connectivity(e) => write!(f, "wifi: {e}"),
            Self::Hw(e) => write!(f, "hw: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<StorageError> for Error {
    fn from(e: StorageError) -> Self {
        Self::Storage(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<ConnectivityError> for Error {
    fn from(e: ConnectivityError) -> Self {
        Self::Connectivity(e)
    }
}

impl From<HwInitError> for Error {
    fn from(e: HwInitError) -> Self {
        Self::Hw(e)
    }
}

// ---------------------------------------------------------------------------
// Communications errors
// ---------------------------------------------------------------------------

/// Failure reported by the uplink collaborator. The controller only turns
/// these into an error flash; nothing is retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommsError {
    /// WiFi station is not associated; no request was attempted.
    NotConnected,
    /// The request body could not be encoded.
    Encode,
    /// The HTTP exchange failed below the status line.
    Transport,
    /// The server answered with a non-2xx status.
    Status(u16),
}

impl fmt::Display for CommsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotConnected => write!(f, "WiFi not connected"),
            Self::Encode => write!(f, "payload encoding failed"),
            Self::Transport => write!(f, "HTTP transport error"),
            Self::Status(code) => write!(f, "server returned HTTP {code}"),
        }
    }
}

impl From<CommsError> for Error {
    fn from(e: CommsError) -> Self {
        Self::Comms(e)
    }
}

// ---------------------------------------------------------------------------
// Convenience Result alias
// ---------------------------------------------------------------------------

/// Firmware-wide `Result` alias.
pub type Result<T> = core::result::Result<T, Error>;
