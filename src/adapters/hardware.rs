//! Hardware adapter — bridges real peripherals to domain port traits.
//!
//! Owns the button pin, the soil probe and the status LED, exposing them
//! through [`ButtonPort`], [`SoilSensorPort`] and [`LedPort`]. This is the
//! only module in the system that touches actual hardware. Pins are generic
//! `embedded-hal` types so host tests can substitute mocks.

use embedded_hal::digital::{InputPin, OutputPin};
use log::warn;

use crate::app::ports::{ButtonPort, LedPort, SoilSensorPort};
use crate::drivers::status_led::StatusLed;
use crate::sensors::soil::SoilSensor;

/// Concrete adapter that combines all hardware behind port traits.
pub struct HardwareAdapter<B: InputPin, L: OutputPin> {
    button: B,
    soil: SoilSensor,
    led: StatusLed<L>,
}

impl<B: InputPin, L: OutputPin> HardwareAdapter<B, L> {
    /// `button` must be configured with its pull-up; it reads low while held.
    pub fn new(button: B, soil: SoilSensor, led: StatusLed<L>) -> Self {
        Self { button, soil, led }
    }

    pub fn led_is_on(&self) -> bool {
        self.led.is_on()
    }
}

// ── ButtonPort implementation ─────────────────────────────────

impl<B: InputPin, L: OutputPin> ButtonPort for HardwareAdapter<B, L> {
    fn is_pressed(&mut self) -> bool {
        match self.button.is_low() {
            Ok(low) => low,
            Err(e) => {
                warn!("button read failed: {:?}", e);
                false
            }
        }
    }
}

// ── SoilSensorPort implementation ─────────────────────────────

impl<B: InputPin, L: OutputPin> SoilSensorPort for HardwareAdapter<B, L> {
    fn read_raw(&mut self) -> u16 {
        self.soil.read()
    }
}

// ── LedPort implementation ────────────────────────────────────

impl<B: InputPin, L: OutputPin> LedPort for HardwareAdapter<B, L> {
    fn set_led(&mut self, on: bool) {
        self.led.set(on);
    }
}

#[cfg(all(test, not(feature = "espidf")))]
mod tests {
    use super::*;
    use core::convert::Infallible;
    use embedded_hal::digital::ErrorType;

    struct Pin(bool);

    impl ErrorType for Pin {
        type Error = Infallible;
    }
    impl InputPin for Pin {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            Ok(self.0)
        }
        fn is_low(&mut self) -> Result<bool, Infallible> {
            Ok(!self.0)
        }
    }
    impl OutputPin for Pin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0 = false;
            Ok(())
        }
        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0 = true;
            Ok(())
        }
    }

    fn adapter(level: bool) -> HardwareAdapter<Pin, Pin> {
        HardwareAdapter::new(
            Pin(level),
            SoilSensor::new(crate::pins::SOIL_ADC1_CHANNEL),
            StatusLed::new(Pin(false)),
        )
    }

    #[test]
    fn button_is_active_low() {
        assert!(adapter(false).is_pressed());
        assert!(!adapter(true).is_pressed());
    }

    #[test]
    fn led_port_drives_status_led() {
        let mut hw = adapter(true);
        hw.set_led(true);
        assert!(hw.led_is_on());
        hw.set_led(false);
        assert!(!hw.led_is_on());
    }
}
