//! Peripheral drivers and hardware initialisation.

pub mod button;
pub mod hw_init;
pub mod led_patterns;
pub mod status_led;
