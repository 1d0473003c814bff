//! Polled, debounced button driver with short and long press detection.
//!
//! ## Hardware
//!
//! Active-low momentary switch (the BOOT button) with the internal pull-up.
//! The hardware adapter reads the pin and hands [`ButtonDriver::update`] a
//! plain "pressed" flag plus the current monotonic time once per loop pass.
//!
//! ## Gesture detection
//!
//! | Gesture     | Held for (release − press)       | Event        |
//! |-------------|----------------------------------|--------------|
//! | Noise       | ≤ 50 ms                          | —            |
//! | Short press | > 50 ms and ≤ 2000 ms            | `ShortPress` |
//! | Long press  | > 2000 ms                        | `LongPress`  |
//!
//! Only the release finalizes a press, so a button that is still held never
//! produces an event.

use log::debug;

use crate::config::ButtonTiming;

/// Button events emitted after gesture classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonEvent {
    ShortPress,
    LongPress,
}

/// Debounce bookkeeping. Reset implicitly on every stable transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct DebounceTracker {
    last_raw: bool,
    last_raw_change_ms: u32,
    is_pressing: bool,
    press_start_ms: u32,
}

pub struct ButtonDriver {
    timing: ButtonTiming,
    tracker: DebounceTracker,
}

impl ButtonDriver {
    pub fn new(timing: ButtonTiming) -> Self {
        Self {
            timing,
            tracker: DebounceTracker::default(),
        }
    }

    /// Whether a debounced press is currently in progress.
    pub fn is_pressing(&self) -> bool {
        self.tracker.is_pressing
    }

    /// Feed one raw sample. `now_ms` is the current monotonic time in
    /// milliseconds. Returns a classified gesture event, if any.
    pub fn update(&mut self, pressed: bool, now_ms: u32) -> Option<ButtonEvent> {
        let t = &mut self.tracker;

        if pressed != t.last_raw {
            t.last_raw_change_ms = now_ms;
        }
        t.last_raw = pressed;

        if now_ms.wrapping_sub(t.last_raw_change_ms) < self.timing.debounce_ms
            || pressed == t.is_pressing
        {
            return None;
        }

        t.is_pressing = pressed;
        if pressed {
            t.press_start_ms = now_ms;
            return None;
        }

        let held_ms = now_ms.wrapping_sub(t.press_start_ms);
        self.classify(held_ms)
    }

    fn classify(&self, held_ms: u32) -> Option<ButtonEvent> {
        if held_ms > self.timing.long_press_ms {
            Some(ButtonEvent::LongPress)
        } else if held_ms > self.timing.noise_ms {
            Some(ButtonEvent::ShortPress)
        } else {
            debug!("button: {} ms press dropped as noise", held_ms);
            None
        }
    }
}
