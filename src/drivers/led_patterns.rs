//! LED feedback scheduler for the single status LED.
//!
//! The main loop calls [`LedScheduler::tick`] every pass; the returned level
//! (if any) is written to the LED through the hardware port. Two modes exist
//! and are never active at the same time:
//!
//! 1. **Background cadence** — a square wave whose half-period is looked up
//!    from the calibration state:
//!
//!    | State    | Interval |
//!    |----------|----------|
//!    | Idle     | off      |
//!    | WaitDry  | 100 ms   |
//!    | WaitWet  | 250 ms   |
//!    | WaitSend | 500 ms   |
//!
//! 2. **One-shot sequences** — short outcome animations that pre-empt the
//!    cadence until they finish:
//!
//!    | Pattern | Flashes | On / off |
//!    |---------|---------|----------|
//!    | Success | 3       | 100 ms   |
//!    | Error   | 2       | 400 ms   |
//!    | Cancel  | 10      | 50 ms    |
//!
//! Sequences are time-sliced: nothing here blocks, so the button stays live
//! while a sequence plays. When a sequence ends the LED goes dark and the
//! cadence resumes its toggle clock from that instant.

use crate::fsm::StateId;

/// Background blink interval per state, indexed by `StateId as usize`.
/// `0` means the LED is held off.
const CADENCE_MS: [u32; StateId::COUNT] = [
    0,   // Idle
    100, // WaitDry
    250, // WaitWet
    500, // WaitSend
];

/// Background interval for `state`.
pub const fn cadence_for(state: StateId) -> u32 {
    CADENCE_MS[state as usize]
}

/// Outcome animations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashPattern {
    Success,
    Error,
    Cancel,
}

impl FlashPattern {
    pub const fn flashes(self) -> u32 {
        match self {
            Self::Success => 3,
            Self::Error => 2,
            Self::Cancel => 10,
        }
    }

    /// Length of each on and each off segment.
    pub const fn segment_ms(self) -> u32 {
        match self {
            Self::Success => 100,
            Self::Error => 400,
            Self::Cancel => 50,
        }
    }

    pub const fn duration_ms(self) -> u32 {
        self.flashes() * 2 * self.segment_ms()
    }

    /// LED level `elapsed_ms` into the sequence, or `None` once it is over.
    fn level_at(self, elapsed_ms: u32) -> Option<bool> {
        if elapsed_ms >= self.duration_ms() {
            return None;
        }
        Some((elapsed_ms / self.segment_ms()) % 2 == 0)
    }
}

/// Background blink bookkeeping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct FlashState {
    interval_ms: u32,
    last_toggle_ms: u32,
    led_on: bool,
}

#[derive(Debug, Clone, Copy)]
struct OneShot {
    pattern: FlashPattern,
    started_ms: u32,
}

/// Cooperative LED scheduler. Stack-allocated, no heap.
pub struct LedScheduler {
    flash: FlashState,
    one_shot: Option<OneShot>,
    /// Level last handed out to the caller.
    output: bool,
}

impl LedScheduler {
    pub fn new() -> Self {
        Self {
            flash: FlashState::default(),
            one_shot: None,
            output: false,
        }
    }

    /// Re-apply the background cadence for `state`. Call on every state
    /// change. Returns `Some(false)` when the cadence is off and no sequence
    /// owns the LED.
    pub fn set_cadence_for(&mut self, state: StateId) -> Option<bool> {
        self.flash.interval_ms = cadence_for(state);
        if self.flash.interval_ms == 0 {
            self.flash.led_on = false;
            if self.one_shot.is_none() {
                self.output = false;
                return Some(false);
            }
        }
        None
    }

    /// Start an outcome animation, replacing any that is still playing.
    pub fn start_sequence(&mut self, pattern: FlashPattern, now_ms: u32) -> Option<bool> {
        self.one_shot = Some(OneShot {
            pattern,
            started_ms: now_ms,
        });
        self.output = true;
        Some(true)
    }

    /// Hold the LED on while a blocking upload is in flight.
    pub fn hold_on(&mut self) -> Option<bool> {
        self.output = true;
        Some(true)
    }

    /// Advance whichever mode is active. Returns the new level when it
    /// changes.
    pub fn tick(&mut self, now_ms: u32) -> Option<bool> {
        if let Some(seq) = self.one_shot {
            let elapsed = now_ms.wrapping_sub(seq.started_ms);
            if let Some(level) = seq.pattern.level_at(elapsed) {
                return self.drive(level);
            }
            self.one_shot = None;
            self.flash.led_on = false;
            self.flash.last_toggle_ms = now_ms;
            return self.drive(false);
        }

        let f = &mut self.flash;
        if f.interval_ms > 0 && now_ms.wrapping_sub(f.last_toggle_ms) >= f.interval_ms {
            f.led_on = !f.led_on;
            f.last_toggle_ms = now_ms;
            let level = f.led_on;
            return self.drive(level);
        }

        // Covers a hold_on() that ended without a sequence.
        if f.interval_ms == 0 && self.output {
            return self.drive(false);
        }
        None
    }

    /// Current background interval (0 = off).
    pub fn interval_ms(&self) -> u32 {
        self.flash.interval_ms
    }

    pub fn active_sequence(&self) -> Option<FlashPattern> {
        self.one_shot.map(|s| s.pattern)
    }

    pub fn is_on(&self) -> bool {
        self.output
    }

    fn drive(&mut self, level: bool) -> Option<bool> {
        if level == self.output {
            return None;
        }
        self.output = level;
        Some(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Run the scheduler from `from` to `to` (exclusive) in 1 ms steps and
    /// return the times at which the LED level changed.
    fn edges(led: &mut LedScheduler, from: u32, to: u32) -> Vec<(u32, bool)> {
        (from..to)
            .filter_map(|t| led.tick(t).map(|level| (t, level)))
            .collect()
    }

    #[test]
    fn cadence_table_matches_states() {
        assert_eq!(cadence_for(StateId::Idle), 0);
        assert_eq!(cadence_for(StateId::WaitDry), 100);
        assert_eq!(cadence_for(StateId::WaitWet), 250);
        assert_eq!(cadence_for(StateId::WaitSend), 500);
    }

    #[test]
    fn idle_cadence_forces_led_off() {
        let mut led = LedScheduler::new();
        led.set_cadence_for(StateId::WaitDry);
        led.tick(100);
        assert!(led.is_on());
        assert_eq!(led.set_cadence_for(StateId::Idle), Some(false));
        assert!(!led.is_on());
        assert!(edges(&mut led, 101, 2000).is_empty());
    }

    #[test]
    fn background_toggles_at_interval() {
        let mut led = LedScheduler::new();
        led.set_cadence_for(StateId::WaitWet);
        led.tick(0); // elapsed 0 < 250, nothing
        let e = edges(&mut led, 1, 1001);
        assert_eq!(e, vec![(250, true), (500, false), (750, true), (1000, false)]);
    }

    #[test]
    fn success_sequence_shape() {
        let mut led = LedScheduler::new();
        assert_eq!(led.start_sequence(FlashPattern::Success, 1000), Some(true));
        let e = edges(&mut led, 1000, 2000);
        assert_eq!(
            e,
            vec![
                (1100, false),
                (1200, true),
                (1300, false),
                (1400, true),
                (1500, false)
            ]
        );
        assert_eq!(led.active_sequence(), None);
    }

    #[test]
    fn error_and_cancel_durations() {
        assert_eq!(FlashPattern::Error.duration_ms(), 1600);
        assert_eq!(FlashPattern::Cancel.duration_ms(), 1000);
        assert_eq!(FlashPattern::Success.duration_ms(), 600);

        let mut led = LedScheduler::new();
        led.start_sequence(FlashPattern::Cancel, 0);
        let rising = edges(&mut led, 0, 1100).iter().filter(|(_, on)| *on).count();
        // First flash was switched on by start_sequence itself.
        assert_eq!(rising + 1, 10);
    }

    #[test]
    fn sequence_preempts_background_then_resumes() {
        let mut led = LedScheduler::new();
        led.set_cadence_for(StateId::WaitSend);
        led.start_sequence(FlashPattern::Success, 0);
        // No background toggle at t=500 while the sequence runs.
        let during = edges(&mut led, 0, 600);
        assert!(during.iter().all(|(t, _)| t % 100 == 0));
        // Sequence ends at 600 with the LED dark; cadence restarts from there.
        assert_eq!(led.tick(600), None);
        assert!(!led.is_on());
        assert_eq!(edges(&mut led, 601, 1101), vec![(1100, true)]);
    }

    #[test]
    fn hold_on_is_released_when_idle() {
        let mut led = LedScheduler::new();
        led.set_cadence_for(StateId::Idle);
        assert_eq!(led.hold_on(), Some(true));
        assert_eq!(led.tick(10), Some(false));
    }

    #[test]
    fn idle_cadence_during_sequence_does_not_cut_it_short() {
        let mut led = LedScheduler::new();
        led.set_cadence_for(StateId::WaitSend);
        led.start_sequence(FlashPattern::Cancel, 0);
        assert_eq!(led.set_cadence_for(StateId::Idle), None);
        assert_eq!(led.active_sequence(), Some(FlashPattern::Cancel));
        assert_eq!(led.tick(50), Some(false));
    }
}
