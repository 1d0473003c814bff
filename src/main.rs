//! SoilSense Firmware — Main Entry Point
//!
//! Hexagonal architecture with a single cooperative control loop.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                      Adapters (outer ring)                     │
//! │                                                                │
//! │  HardwareAdapter        LogEventSink   NvsAdapter              │
//! │  (Button+Soil+LED)      (EventSink)    (Config+Storage)        │
//! │  HttpUplink             WifiAdapter    MonotonicClock          │
//! │  (UplinkPort)           (Connectivity)                         │
//! │                                                                │
//! │  ──────────────── Port Trait Boundary ───────────────────      │
//! │                                                                │
//! │  ┌────────────────────────────────────────────────────────┐    │
//! │  │              AppService (pure logic)                   │    │
//! │  │  Button · Calibration FSM · LED · Telemetry            │    │
//! │  └────────────────────────────────────────────────────────┘    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
#![deny(unused_must_use)]

use anyhow::Result;
use log::{error, info, warn};

use esp_idf_hal::delay::FreeRtos;
use esp_idf_hal::gpio::{PinDriver, Pull};
use esp_idf_hal::peripherals::Peripherals;
use esp_idf_svc::eventloop::EspSystemEventLoop;
use esp_idf_svc::nvs::EspDefaultNvsPartition;
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};

use soilsense::adapters::device_id;
use soilsense::adapters::hardware::HardwareAdapter;
use soilsense::adapters::http_uplink::HttpUplink;
use soilsense::adapters::log_sink::LogEventSink;
use soilsense::adapters::nvs::NvsAdapter;
use soilsense::adapters::time::MonotonicClock;
use soilsense::adapters::wifi::{ConnectivityPort, WifiAdapter};
use soilsense::app::persistence;
use soilsense::app::ports::ConfigPort;
use soilsense::app::service::AppService;
use soilsense::config::SystemConfig;
use soilsense::drivers::hw_init;
use soilsense::drivers::status_led::StatusLed;
use soilsense::error::Error;
use soilsense::pins;
use soilsense::sensors::soil::SoilSensor;

const WIFI_RETRY_DELAY_MS: u32 = 500;

fn main() -> Result<()> {
    // ── 1. ESP-IDF bootstrap ──────────────────────────────────
    esp_idf_svc::sys::link_patches();
    esp_idf_logger::init()?;

    info!("╔══════════════════════════════════════╗");
    info!("║  SoilSense v{}                        ║", env!("CARGO_PKG_VERSION"));
    info!("╚══════════════════════════════════════╝");

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs_partition = EspDefaultNvsPartition::take()?;

    // ── 2. Hardware ───────────────────────────────────────────
    hw_init::init_peripherals().map_err(Error::from)?;

    let mut button_pin = PinDriver::input(peripherals.pins.gpio0)?;
    button_pin.set_pull(Pull::Up)?;
    let led_pin = PinDriver::output(peripherals.pins.gpio2)?;
    info!(
        "Pins: button=GPIO{} led=GPIO{} soil=GPIO{}",
        pins::BUTTON_GPIO,
        pins::LED_GPIO,
        pins::SOIL_ADC_GPIO
    );

    let mut hw = HardwareAdapter::new(
        button_pin,
        SoilSensor::new(pins::SOIL_ADC1_CHANNEL),
        StatusLed::new(led_pin),
    );

    // ── 3. Config from NVS (or defaults) ──────────────────────
    let mut nvs = NvsAdapter::new(nvs_partition.clone());
    let config = match nvs.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            warn!("NVS config load failed ({}), using defaults", e);
            SystemConfig::default()
        }
    };

    // ── 4. WiFi (blocks until associated) ─────────────────────
    let esp_wifi = EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs_partition))?;
    let mut wifi = WifiAdapter::new(BlockingWifi::wrap(esp_wifi, sys_loop)?);
    let clock = MonotonicClock::new();

    match wifi.set_credentials(&config.wifi_ssid, &config.wifi_pass) {
        Ok(()) => {
            let mut attempt: u32 = 0;
            while let Err(e) = wifi.connect() {
                attempt += 1;
                warn!("WiFi connect attempt {} failed: {}", attempt, e);
                FreeRtos::delay_ms(WIFI_RETRY_DELAY_MS);
            }
            info!("WiFi connected!");
        }
        Err(e) => error!("WiFi credentials rejected ({}); running offline", e),
    }

    let mut uplink = HttpUplink::new(&config.server_url);
    uplink.set_link_up(wifi.is_connected());

    // ── 5. Identity + persisted calibration ───────────────────
    let dev_id = device_id::device_id(&device_id::read_mac());
    info!("Device ID: {}", dev_id);
    let readings = persistence::load_readings_or_default(&nvs);

    // ── 6. App service ────────────────────────────────────────
    let mut log_sink = LogEventSink::new();
    let mut app = AppService::new(&config, &dev_id, readings);
    app.start(clock.now_ms(), &mut hw, &mut log_sink);

    info!("System ready. Entering control loop.");

    // ── 7. Control loop ───────────────────────────────────────
    loop {
        let now = clock.now_ms();

        wifi.poll(now);
        uplink.set_link_up(wifi.is_connected());

        app.tick(now, &mut hw, &mut uplink, &mut log_sink);
        app.persist_if_needed(&mut nvs);

        FreeRtos::delay_ms(config.loop_period_ms);
    }
}
