//! Capacitive soil-moisture probe driver.
//!
//! The probe outputs an analog voltage that falls as moisture rises: a dry
//! probe reads high, a submerged one reads low. No scaling is applied here;
//! raw counts are what the calibration workflow and telemetry carry.
//!
//! ## Dual-target design
//!
//! On ESP-IDF: reads ADC1 via the oneshot API (initialised by hw_init).
//! On host/test: reads from a static `AtomicU16` for injection.

#[cfg(not(feature = "espidf"))]
use core::sync::atomic::{AtomicU16, Ordering};

#[cfg(feature = "espidf")]
use crate::drivers::hw_init;

#[cfg(not(feature = "espidf"))]
static SIM_SOIL_ADC: AtomicU16 = AtomicU16::new(0);

#[cfg(not(feature = "espidf"))]
pub fn sim_set_soil_adc(raw: u16) {
    SIM_SOIL_ADC.store(raw, Ordering::Relaxed);
}

pub struct SoilSensor {
    adc_channel: u32,
}

impl SoilSensor {
    pub fn new(adc_channel: u32) -> Self {
        Self { adc_channel }
    }

    /// Take one synchronous sample.
    pub fn read(&mut self) -> u16 {
        let raw = self.read_adc();
        log::debug!("soil: ADC1 CH{} raw={}", self.adc_channel, raw);
        raw
    }

    #[cfg(feature = "espidf")]
    fn read_adc(&self) -> u16 {
        hw_init::adc1_read(self.adc_channel)
    }

    #[cfg(not(feature = "espidf"))]
    fn read_adc(&self) -> u16 {
        SIM_SOIL_ADC.load(Ordering::Relaxed)
    }
}
