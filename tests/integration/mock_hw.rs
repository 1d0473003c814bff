//! Mock pins and a host-side control loop for integration tests.
//!
//! The pins implement the `embedded-hal` digital traits so the real
//! [`HardwareAdapter`] can be used unchanged. Every other collaborator is
//! the crate's own simulation backend.

use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;
use std::sync::{Mutex, MutexGuard};

use embedded_hal::digital::{ErrorType, InputPin, OutputPin};
use soilsense::adapters::hardware::HardwareAdapter;
use soilsense::adapters::http_uplink::HttpUplink;
use soilsense::adapters::log_sink::LogEventSink;
use soilsense::adapters::nvs::NvsAdapter;
use soilsense::adapters::wifi::{ConnectivityPort, WifiAdapter};
use soilsense::app::persistence;
use soilsense::app::service::AppService;
use soilsense::drivers::status_led::StatusLed;
use soilsense::pins;
use soilsense::sensors::soil::{self, SoilSensor};

pub const POLL_MS: u32 = 5;

/// The simulated ADC is process-global; tests that touch it serialise here.
static ADC_LOCK: Mutex<()> = Mutex::new(());

// ── Pins ──────────────────────────────────────────────────────

/// Active-low button: `held = true` drives the line low.
#[derive(Clone, Default)]
pub struct MockButtonPin {
    pub held: Rc<Cell<bool>>,
}

impl ErrorType for MockButtonPin {
    type Error = Infallible;
}

impl InputPin for MockButtonPin {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(!self.held.get())
    }
    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(self.held.get())
    }
}

/// Records every level written to the LED line.
#[derive(Clone, Default)]
pub struct MockLedPin {
    pub levels: Rc<RefCell<Vec<bool>>>,
}

impl ErrorType for MockLedPin {
    type Error = Infallible;
}

impl OutputPin for MockLedPin {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(false);
        Ok(())
    }
    fn set_high(&mut self) -> Result<(), Infallible> {
        self.levels.borrow_mut().push(true);
        Ok(())
    }
}

// ── Host loop ─────────────────────────────────────────────────

pub struct HostNode {
    pub app: AppService,
    pub hw: HardwareAdapter<MockButtonPin, MockLedPin>,
    pub uplink: HttpUplink,
    pub wifi: WifiAdapter,
    pub nvs: NvsAdapter,
    pub sink: LogEventSink,
    pub button: Rc<Cell<bool>>,
    pub led: Rc<RefCell<Vec<bool>>>,
    pub now: u32,
    _adc: MutexGuard<'static, ()>,
}

impl HostNode {
    /// Boot a node against `nvs`, the way `main` does.
    pub fn boot(nvs: NvsAdapter) -> Self {
        let adc = ADC_LOCK.lock().unwrap_or_else(|e| e.into_inner());
        let config = soilsense::app::ports::ConfigPort::load(&nvs).unwrap();

        let button = MockButtonPin::default();
        let led = MockLedPin::default();
        let held = button.held.clone();
        let levels = led.levels.clone();
        let mut hw = HardwareAdapter::new(
            button,
            SoilSensor::new(pins::SOIL_ADC1_CHANNEL),
            StatusLed::new(led),
        );

        let mut wifi = WifiAdapter::new();
        wifi.set_credentials("GardenNet", "tomatoes42").unwrap();
        wifi.connect().unwrap();
        let mut uplink = HttpUplink::new(&config.server_url);
        uplink.set_link_up(wifi.is_connected());

        let readings = persistence::load_readings_or_default(&nvs);
        let mut sink = LogEventSink::new();
        let mut app = AppService::new(&config, "DE:AD:BE:EF:CA:FE", readings);
        app.start(0, &mut hw, &mut sink);

        Self {
            app,
            hw,
            uplink,
            wifi,
            nvs,
            sink,
            button: held,
            led: levels,
            now: 0,
            _adc: adc,
        }
    }

    pub fn set_soil(&self, raw: u16) {
        soil::sim_set_soil_adc(raw);
    }

    /// One pass of the device control loop.
    pub fn step(&mut self) {
        self.wifi.poll(self.now);
        self.uplink.set_link_up(self.wifi.is_connected());
        self.app
            .tick(self.now, &mut self.hw, &mut self.uplink, &mut self.sink);
        self.app.persist_if_needed(&mut self.nvs);
        self.now += POLL_MS;
    }

    pub fn run_for(&mut self, ms: u32) {
        let until = self.now + ms;
        while self.now < until {
            self.step();
        }
    }

    pub fn press(&mut self, held_ms: u32) {
        self.button.set(true);
        self.run_for(held_ms);
        self.button.set(false);
        self.run_for(65);
    }
}
