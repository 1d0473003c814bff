//! Adapters — concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements         | Connects to              |
//! |----------------|--------------------|--------------------------|
//! | `hardware`     | ButtonPort         | ESP32 GPIO (BOOT button) |
//! |                | SoilSensorPort     | ESP32 ADC1               |
//! |                | LedPort            | ESP32 GPIO (status LED)  |
//! | `http_uplink`  | UplinkPort         | HTTP collection server   |
//! | `log_sink`     | EventSink          | Serial log output        |
//! | `nvs`          | ConfigPort         | NVS / in-memory store    |
//! |                | StoragePort        |                          |
//! | `wifi`         | ConnectivityPort   | ESP-IDF WiFi STA         |
//! | `time`         | —                  | ESP32 system timer       |
//! | `device_id`    | —                  | eFuse station MAC        |

pub mod device_id;
pub mod hardware;
pub mod http_uplink;
pub mod log_sink;
pub mod nvs;
pub mod time;
pub mod wifi;
