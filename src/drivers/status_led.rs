//! Single-colour status LED driver.
//!
//! Generic over any `embedded-hal` [`OutputPin`], so the same driver runs on
//! an `esp-idf-hal` `PinDriver` and on a host mock. Pin errors are logged and
//! swallowed: a stuck LED must never stop the control loop.

use embedded_hal::digital::OutputPin;
use log::warn;

pub struct StatusLed<P: OutputPin> {
    pin: P,
    on: bool,
}

impl<P: OutputPin> StatusLed<P> {
    /// Take ownership of `pin` and drive it low.
    pub fn new(pin: P) -> Self {
        let mut led = Self { pin, on: true };
        led.set(false);
        led
    }

    pub fn set(&mut self, on: bool) {
        let res = if on { self.pin.set_high() } else { self.pin.set_low() };
        if let Err(e) = res {
            warn!("status LED write failed: {:?}", e);
            return;
        }
        self.on = on;
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}
