//! Device identity derived from the ESP32 Wi-Fi station MAC address.
//!
//! The collection server keys every calibration and telemetry record by
//! this string, so it must be stable across reboots. Format:
//! `AA:BB:CC:DD:EE:FF` (uppercase hex, colon separated).

use core::fmt::Write;

use crate::app::service::DeviceId;

/// Full 6-byte MAC address.
pub type MacAddress = [u8; 6];

/// Read the factory-programmed station MAC from eFuse.
#[cfg(feature = "espidf")]
pub fn read_mac() -> MacAddress {
    let mut mac: MacAddress = [0u8; 6];
    // SAFETY: `mac` is a valid 6-byte buffer, as esp_read_mac requires.
    unsafe {
        esp_idf_sys::esp_read_mac(
            mac.as_mut_ptr(),
            esp_idf_sys::esp_mac_type_t_ESP_MAC_WIFI_STA,
        );
    }
    mac
}

/// Simulation: returns a deterministic fake MAC.
#[cfg(not(feature = "espidf"))]
pub fn read_mac() -> MacAddress {
    [0xDE, 0xAD, 0xBE, 0xEF, 0xCA, 0xFE]
}

pub fn device_id(mac: &MacAddress) -> DeviceId {
    let mut id = DeviceId::new();
    for (i, b) in mac.iter().enumerate() {
        let sep = if i == 0 { "" } else { ":" };
        let _ = write!(id, "{}{:02X}", sep, b);
    }
    id
}
