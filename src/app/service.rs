//! Application service — the hexagonal core.
//!
//! [`AppService`] is the single owned controller: it holds the calibration
//! FSM and its context, the button debouncer, the LED scheduler and the
//! telemetry timer. All I/O flows through port traits passed in on each
//! call, making the whole service testable with mock adapters.
//!
//! ```text
//!   ButtonPort ──▶ ┌──────────────────────────────┐ ──▶ EventSink
//!  SoilSensorPort ▶│          AppService           │
//!      LedPort ◀── │ Button · FSM · LED · Telemetry│ ──▶ UplinkPort
//!                  └──────────────────────────────┘
//! ```
//!
//! One call to [`AppService::tick`] is one loop iteration, strictly ordered:
//! button classification → FSM transition → LED update → telemetry check.
//! A long-press transition ends the iteration early.

use log::{info, warn};

use crate::config::{SystemConfig, bounded};
use crate::drivers::button::{ButtonDriver, ButtonEvent};
use crate::drivers::led_patterns::{FlashPattern, LedScheduler};
use crate::fsm::context::{CalibrationReadings, FsmContext};
use crate::fsm::states::build_state_table;
use crate::fsm::{Fsm, StateId, Transition, TransitionKind};

use super::events::AppEvent;
use super::persistence;
use super::ports::{
    ButtonPort, EventSink, LedPort, SoilSensorPort, StoragePort, UplinkPort,
};

/// "AA:BB:CC:DD:EE:FF" is 17 chars.
pub type DeviceId = heapless::String<24>;

/// Whether the rest of the loop iteration should run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    ShortCircuit,
}

/// The application service orchestrates all domain logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    button: ButtonDriver,
    led: LedScheduler,
    device_id: DeviceId,
    telemetry_interval_ms: u32,
    last_telemetry_ms: u32,
    readings_dirty: bool,
}

impl AppService {
    /// Construct the controller. `readings` are the values restored from
    /// storage; they are used for telemetry until a new calibration lands.
    pub fn new(config: &SystemConfig, device_id: &str, readings: CalibrationReadings) -> Self {
        Self {
            fsm: Fsm::new(build_state_table(), StateId::Idle),
            ctx: FsmContext::new(readings),
            button: ButtonDriver::new(config.button),
            led: LedScheduler::new(),
            device_id: bounded(device_id),
            telemetry_interval_ms: config.telemetry_interval_ms,
            last_telemetry_ms: 0,
            readings_dirty: false,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Put the LED in the idle cadence and announce the controller.
    /// `now_ms` starts the first telemetry window.
    pub fn start(&mut self, now_ms: u32, led: &mut impl LedPort, sink: &mut impl EventSink) {
        self.last_telemetry_ms = now_ms;
        Self::drive_led(self.led.set_cadence_for(self.fsm.current_state()), led);
        sink.emit(&AppEvent::Started(self.ctx.readings));
        info!(
            "AppService started as {} (dry={} wet={})",
            self.device_id, self.ctx.readings.dry, self.ctx.readings.wet
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one loop iteration.
    ///
    /// The `hw` parameter satisfies every hardware port at once; this avoids
    /// a double mutable borrow while keeping the port boundary explicit.
    pub fn tick(
        &mut self,
        now_ms: u32,
        hw: &mut (impl ButtonPort + SoilSensorPort + LedPort),
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        // 1. Button classification
        let pressed = hw.is_pressed();
        if let Some(event) = self.button.update(pressed, now_ms) {
            // 2. FSM transition
            if self.handle_button(event, now_ms, hw, uplink, sink) == Flow::ShortCircuit {
                return;
            }
        }

        // 3. Background cadence / one-shot sequence
        Self::drive_led(self.led.tick(now_ms), hw);

        // 4. Periodic telemetry
        self.telemetry_if_due(now_ms, hw, uplink, sink);
    }

    /// Apply one classified button event. Exposed so event sources other than
    /// the polled button (tests, a serial console) can drive the workflow.
    pub fn handle_button(
        &mut self,
        event: ButtonEvent,
        now_ms: u32,
        hw: &mut (impl SoilSensorPort + LedPort),
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) -> Flow {
        match event {
            ButtonEvent::LongPress => {
                let t = self.fsm.long_press();
                self.after_transition(t, hw, sink);
                if t.kind == TransitionKind::Cancelled {
                    info!("Calibration cancelled.");
                    Self::drive_led(self.led.start_sequence(FlashPattern::Cancel, now_ms), hw);
                } else {
                    info!("Calibration started!");
                }
                Flow::ShortCircuit
            }
            ButtonEvent::ShortPress => {
                if let Some(t) = self.fsm.short_press(&mut self.ctx, hw) {
                    self.after_transition(t, hw, sink);
                    if self.ctx.take_submit_request() {
                        self.submit_calibration(now_ms, hw, uplink, sink);
                    }
                }
                Flow::Continue
            }
        }
    }

    // ── Queries ───────────────────────────────────────────────

    pub fn state(&self) -> StateId {
        self.fsm.current_state()
    }

    pub fn readings(&self) -> CalibrationReadings {
        self.ctx.readings
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }

    /// Current background LED interval (0 = off).
    pub fn led_interval_ms(&self) -> u32 {
        self.led.interval_ms()
    }

    /// Outcome animation currently playing, if any.
    pub fn led_sequence(&self) -> Option<FlashPattern> {
        self.led.active_sequence()
    }

    pub fn is_button_held(&self) -> bool {
        self.button.is_pressing()
    }

    // ── Persistence ───────────────────────────────────────────

    /// Whether a completed calibration still needs to be written to NVS.
    pub fn is_readings_dirty(&self) -> bool {
        self.readings_dirty
    }

    /// Persist the readings after a completed calibration. Returns `true` if
    /// they were written. On failure the dirty flag stays set and the next
    /// call tries again.
    pub fn persist_if_needed(&mut self, storage: &mut impl StoragePort) -> bool {
        if !self.readings_dirty {
            return false;
        }
        match persistence::save_readings(storage, &self.ctx.readings) {
            Ok(()) => {
                self.readings_dirty = false;
                info!("Calibration saved to NVS");
                true
            }
            Err(e) => {
                warn!("Calibration save failed: {}", e);
                false
            }
        }
    }

    // ── Internal ──────────────────────────────────────────────

    fn after_transition(&mut self, t: Transition, led: &mut impl LedPort, sink: &mut impl EventSink) {
        Self::drive_led(self.led.set_cadence_for(t.to), led);
        sink.emit(&AppEvent::StateChanged {
            from: t.from,
            to: t.to,
            kind: t.kind,
        });
    }

    fn submit_calibration(
        &mut self,
        now_ms: u32,
        led: &mut impl LedPort,
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        let readings = self.ctx.readings;
        info!("Sending calibration: dry={} wet={}", readings.dry, readings.wet);
        let ok = match uplink.submit_calibration(&self.device_id, readings.dry, readings.wet) {
            Ok(()) => {
                info!("Calibration complete!");
                true
            }
            Err(e) => {
                warn!("Calibration upload failed: {}", e);
                false
            }
        };
        let pattern = if ok { FlashPattern::Success } else { FlashPattern::Error };
        Self::drive_led(self.led.start_sequence(pattern, now_ms), led);
        self.last_telemetry_ms = now_ms;
        self.readings_dirty = true;
        sink.emit(&AppEvent::CalibrationSubmitted { readings, ok });
    }

    fn telemetry_if_due(
        &mut self,
        now_ms: u32,
        hw: &mut (impl SoilSensorPort + LedPort),
        uplink: &mut impl UplinkPort,
        sink: &mut impl EventSink,
    ) {
        // An outcome flash plays out before the upload takes the LED.
        if !self.fsm.is_idle()
            || self.led.active_sequence().is_some()
            || now_ms.wrapping_sub(self.last_telemetry_ms) <= self.telemetry_interval_ms
        {
            return;
        }

        Self::drive_led(self.led.hold_on(), hw);
        let raw = hw.read_raw();
        let ok = match uplink.submit_telemetry(&self.device_id, raw) {
            Ok(()) => true,
            Err(e) => {
                warn!("Telemetry upload failed: {}", e);
                false
            }
        };
        let pattern = if ok { FlashPattern::Success } else { FlashPattern::Error };
        Self::drive_led(self.led.start_sequence(pattern, now_ms), hw);
        self.last_telemetry_ms = now_ms;
        sink.emit(&AppEvent::TelemetrySent {
            raw,
            readings: self.ctx.readings,
            ok,
        });
    }

    fn drive_led(level: Option<bool>, led: &mut impl LedPort) {
        if let Some(on) = level {
            led.set_led(on);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CommsError;

    #[derive(Default)]
    struct Bench {
        pressed: bool,
        raw: u16,
        led: Vec<bool>,
    }

    impl ButtonPort for Bench {
        fn is_pressed(&mut self) -> bool {
            self.pressed
        }
    }
    impl SoilSensorPort for Bench {
        fn read_raw(&mut self) -> u16 {
            self.raw
        }
    }
    impl LedPort for Bench {
        fn set_led(&mut self, on: bool) {
            self.led.push(on);
        }
    }

    #[derive(Default)]
    struct Uplink {
        fail: bool,
        calibrations: Vec<(String, u16, u16)>,
        telemetry: Vec<u16>,
    }

    impl UplinkPort for Uplink {
        fn submit_calibration(&mut self, id: &str, dry: u16, wet: u16) -> Result<(), CommsError> {
            self.calibrations.push((id.to_owned(), dry, wet));
            if self.fail { Err(CommsError::Status(500)) } else { Ok(()) }
        }
        fn submit_telemetry(&mut self, _id: &str, raw: u16) -> Result<(), CommsError> {
            self.telemetry.push(raw);
            if self.fail { Err(CommsError::NotConnected) } else { Ok(()) }
        }
    }

    #[derive(Default)]
    struct Sink(Vec<AppEvent>);

    impl EventSink for Sink {
        fn emit(&mut self, e: &AppEvent) {
            self.0.push(e.clone());
        }
    }

    fn make_app() -> AppService {
        AppService::new(&SystemConfig::default(), "AA:BB:CC:DD:EE:FF", CalibrationReadings::default())
    }

    #[test]
    fn device_id_is_kept() {
        assert_eq!(make_app().device_id(), "AA:BB:CC:DD:EE:FF");
    }

    #[test]
    fn oversized_device_id_is_truncated() {
        let app = AppService::new(
            &SystemConfig::default(),
            "node-0123456789-0123456789",
            CalibrationReadings::default(),
        );
        assert_eq!(app.device_id(), "node-0123456789-01234567");
    }

    #[test]
    fn start_turns_led_off_and_emits_started() {
        let mut app = make_app();
        let mut bench = Bench::default();
        let mut sink = Sink::default();
        app.start(0, &mut bench, &mut sink);
        assert_eq!(bench.led, vec![false]);
        assert_eq!(sink.0, vec![AppEvent::Started(CalibrationReadings::default())]);
    }

    #[test]
    fn overdue_telemetry_waits_for_cancel_flash() {
        let mut app = make_app();
        let (mut bench, mut up, mut sink) = (Bench::default(), Uplink::default(), Sink::default());
        app.start(0, &mut bench, &mut sink);
        app.handle_button(ButtonEvent::LongPress, 0, &mut bench, &mut up, &mut sink);
        assert_eq!(app.state(), StateId::WaitDry);

        // Hold 2010 ms; the release is accepted at 30 050, after the window opened.
        bench.pressed = true;
        for t in (27_990..30_000).step_by(10) {
            app.tick(t, &mut bench, &mut up, &mut sink);
        }
        bench.pressed = false;
        app.tick(30_000, &mut bench, &mut up, &mut sink);
        assert_eq!(app.state(), StateId::WaitDry);
        app.tick(30_050, &mut bench, &mut up, &mut sink);

        assert_eq!(app.state(), StateId::Idle);

        // Cancel runs its full second even though telemetry is overdue.
        for t in (30_050..31_050).step_by(10) {
            app.tick(t, &mut bench, &mut up, &mut sink);
            assert_eq!(app.led_sequence(), Some(FlashPattern::Cancel), "at {}", t);
            assert!(up.telemetry.is_empty(), "at {}", t);
        }

        // The pass on which it ends picks the overdue sample up.
        app.tick(31_050, &mut bench, &mut up, &mut sink);
        assert_eq!(up.telemetry.len(), 1);
        assert_eq!(app.led_sequence(), Some(FlashPattern::Success));
    }

    #[test]
    fn failed_telemetry_shows_error_pattern() {
        let mut app = make_app();
        let (mut bench, mut sink) = (Bench::default(), Sink::default());
        let mut up = Uplink { fail: true, ..Uplink::default() };
        bench.raw = 1800;
        app.start(0, &mut bench, &mut sink);
        app.tick(30_001, &mut bench, &mut up, &mut sink);
        assert_eq!(up.telemetry, vec![1800]);
        assert_eq!(app.led_sequence(), Some(FlashPattern::Error));
        assert!(matches!(
            sink.0.last(),
            Some(AppEvent::TelemetrySent { raw: 1800, ok: false, .. })
        ));
    }

    #[test]
    fn submit_marks_readings_dirty() {
        let mut app = make_app();
        let (mut bench, mut up, mut sink) = (Bench::default(), Uplink::default(), Sink::default());
        app.handle_button(ButtonEvent::LongPress, 0, &mut bench, &mut up, &mut sink);
        bench.raw = 10;
        app.handle_button(ButtonEvent::ShortPress, 1, &mut bench, &mut up, &mut sink);
        bench.raw = 20;
        app.handle_button(ButtonEvent::ShortPress, 2, &mut bench, &mut up, &mut sink);
        assert!(!app.is_readings_dirty());
        app.handle_button(ButtonEvent::ShortPress, 3, &mut bench, &mut up, &mut sink);
        assert!(app.is_readings_dirty());
        assert_eq!(up.calibrations, vec![("AA:BB:CC:DD:EE:FF".to_owned(), 10, 20)]);
    }
}
