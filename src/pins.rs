//! GPIO / peripheral pin assignments for the SoilSense node (ESP32 DevKit).
//!
//! Single source of truth — every driver references this module rather than
//! hard-coding pin numbers.

// ---------------------------------------------------------------------------
// User button (BOOT button: active-low, internal pull-up)
// ---------------------------------------------------------------------------

pub const BUTTON_GPIO: i32 = 0;

// ---------------------------------------------------------------------------
// Status LED (on-board blue LED, active-high)
// ---------------------------------------------------------------------------

pub const LED_GPIO: i32 = 2;

// ---------------------------------------------------------------------------
// Capacitive soil-moisture probe — analog output
// ---------------------------------------------------------------------------

/// GPIO 32 is ADC1 channel 4 on the classic ESP32.
pub const SOIL_ADC_GPIO: i32 = 32;
pub const SOIL_ADC1_CHANNEL: u32 = 4;
