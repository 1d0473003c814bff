//! NVS (Non-Volatile Storage) adapter.
//!
//! Implements both [`ConfigPort`] and [`StoragePort`] for the SoilSense node.
//!
//! - Config validation: all fields are range-checked before persistence.
//! - Namespace isolation: each subsystem uses its own namespace.
//! - Atomic writes: ESP-IDF NVS commits are atomic per `set_raw`.
//!
//! On ESP-IDF the adapter holds the default NVS partition and opens an
//! [`EspNvs`] handle per call. The host backend is an in-memory map.

use crate::app::ports::{ConfigError, ConfigPort, StorageError, StoragePort};
use crate::config::SystemConfig;
use log::{info, warn};

#[cfg(not(feature = "espidf"))]
use std::collections::HashMap;

#[cfg(feature = "espidf")]
use esp_idf_svc::nvs::{EspDefaultNvsPartition, EspNvs, NvsDefault};

const CONFIG_NAMESPACE: &str = "soilsense";
const CONFIG_KEY: &str = "syscfg";

/// Upper bound for the postcard-encoded [`SystemConfig`].
const CONFIG_BLOB_CAP: usize = 256;

pub struct NvsAdapter {
    #[cfg(feature = "espidf")]
    partition: EspDefaultNvsPartition,
    #[cfg(not(feature = "espidf"))]
    store: std::cell::RefCell<HashMap<String, Vec<u8>>>,
}

impl NvsAdapter {
    /// Wrap the default NVS partition. `take()` initialises flash and erases
    /// it on a version mismatch.
    #[cfg(feature = "espidf")]
    pub fn new(partition: EspDefaultNvsPartition) -> Self {
        info!("NvsAdapter: ESP-IDF NVS ready");
        Self { partition }
    }

    #[cfg(not(feature = "espidf"))]
    pub fn new() -> Self {
        info!("NvsAdapter: simulation backend");
        Self {
            store: std::cell::RefCell::new(HashMap::new()),
        }
    }

    #[cfg(not(feature = "espidf"))]
    fn composite_key(namespace: &str, key: &str) -> String {
        format!("{}::{}", namespace, key)
    }

    #[cfg(feature = "espidf")]
    fn open(&self, namespace: &str, write: bool) -> Result<EspNvs<NvsDefault>, StorageError> {
        EspNvs::new(self.partition.clone(), namespace, write).map_err(|e| {
            warn!("NvsAdapter: open '{}' failed: {}", namespace, e);
            StorageError::IoError
        })
    }
}

#[cfg(not(feature = "espidf"))]
impl Default for NvsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

pub fn validate_config(cfg: &SystemConfig) -> Result<(), ConfigError> {
    let b = &cfg.button;
    if !(10..=500).contains(&b.debounce_ms) {
        return Err(ConfigError::ValidationFailed("debounce_ms must be 10–500"));
    }
    if !(500..=10_000).contains(&b.long_press_ms) {
        return Err(ConfigError::ValidationFailed(
            "long_press_ms must be 500–10000",
        ));
    }
    if b.noise_ms > b.long_press_ms {
        return Err(ConfigError::ValidationFailed(
            "noise_ms must be <= long_press_ms",
        ));
    }
    if !(1_000..=3_600_000).contains(&cfg.telemetry_interval_ms) {
        return Err(ConfigError::ValidationFailed(
            "telemetry_interval_ms must be 1000–3600000",
        ));
    }
    if !(1..=100).contains(&cfg.loop_period_ms) {
        return Err(ConfigError::ValidationFailed("loop_period_ms must be 1–100"));
    }
    if !cfg.server_url.starts_with("http") {
        return Err(ConfigError::ValidationFailed(
            "server_url must start with http",
        ));
    }
    Ok(())
}

impl ConfigPort for NvsAdapter {
    fn load(&self) -> Result<SystemConfig, ConfigError> {
        let mut buf = [0u8; CONFIG_BLOB_CAP];
        match self.read(CONFIG_NAMESPACE, CONFIG_KEY, &mut buf) {
            Ok(len) => {
                let cfg: SystemConfig =
                    postcard::from_bytes(&buf[..len]).map_err(|_| ConfigError::Corrupted)?;
                info!("NvsAdapter: loaded config ({} bytes)", len);
                Ok(cfg)
            }
            Err(StorageError::NotFound) => {
                info!("NvsAdapter: no stored config, using defaults");
                Ok(SystemConfig::default())
            }
            Err(e) => {
                warn!("NvsAdapter: config read error ({}), using defaults", e);
                Ok(SystemConfig::default())
            }
        }
    }

    fn save(&self, config: &SystemConfig) -> Result<(), ConfigError> {
        validate_config(config)?;

        let mut buf = [0u8; CONFIG_BLOB_CAP];
        let bytes = postcard::to_slice(config, &mut buf).map_err(|_| ConfigError::IoError)?;
        let len = bytes.len();

        #[cfg(not(feature = "espidf"))]
        {
            let key = Self::composite_key(CONFIG_NAMESPACE, CONFIG_KEY);
            self.store.borrow_mut().insert(key, bytes.to_vec());
        }

        #[cfg(feature = "espidf")]
        {
            let mut nvs = self
                .open(CONFIG_NAMESPACE, true)
                .map_err(|_| ConfigError::IoError)?;
            nvs.set_raw(CONFIG_KEY, bytes).map_err(|e| {
                warn!("NvsAdapter: NVS write error {}", e);
                ConfigError::IoError
            })?;
        }

        info!("NvsAdapter: config saved ({} bytes)", len);
        Ok(())
    }
}

impl StoragePort for NvsAdapter {
    fn read(&self, namespace: &str, key: &str, buf: &mut [u8]) -> Result<usize, StorageError> {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            match self.store.borrow().get(&composite) {
                Some(data) => {
                    let len = data.len().min(buf.len());
                    buf[..len].copy_from_slice(&data[..len]);
                    Ok(len)
                }
                None => Err(StorageError::NotFound),
            }
        }

        #[cfg(feature = "espidf")]
        {
            let nvs = match self.open(namespace, false) {
                Ok(nvs) => nvs,
                // A namespace that was never written cannot be opened read-only.
                Err(_) => return Err(StorageError::NotFound),
            };
            match nvs.get_raw(key, buf) {
                Ok(Some(data)) => Ok(data.len()),
                Ok(None) => Err(StorageError::NotFound),
                Err(e) => {
                    warn!("NvsAdapter: read {}/{} failed: {}", namespace, key, e);
                    Err(StorageError::IoError)
                }
            }
        }
    }

    fn write(&mut self, namespace: &str, key: &str, data: &[u8]) -> Result<(), StorageError> {
        #[cfg(not(feature = "espidf"))]
        {
            let composite = Self::composite_key(namespace, key);
            self.store.borrow_mut().insert(composite, data.to_vec());
            Ok(())
        }

        #[cfg(feature = "espidf")]
        {
            let mut nvs = self.open(namespace, true)?;
            nvs.set_raw(key, data).map(|_| ()).map_err(|e| {
                warn!("NvsAdapter: write {}/{} failed: {}", namespace, key, e);
                StorageError::IoError
            })
        }
    }
}
