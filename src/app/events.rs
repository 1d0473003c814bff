//! Outbound application events.
//!
//! The [`AppService`](super::service::AppService) emits these through the
//! [`EventSink`](super::ports::EventSink) port. Adapters on the other side
//! decide what to do with them (serial log today).

use crate::fsm::context::CalibrationReadings;
use crate::fsm::{StateId, TransitionKind};

/// Structured events emitted by the application core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AppEvent {
    /// The controller has started (carries the readings restored from NVS).
    Started(CalibrationReadings),

    /// The calibration FSM moved between states.
    StateChanged {
        from: StateId,
        to: StateId,
        kind: TransitionKind,
    },

    /// A completed calibration was handed to the uplink.
    CalibrationSubmitted {
        readings: CalibrationReadings,
        ok: bool,
    },

    /// A periodic telemetry sample was handed to the uplink.
    TelemetrySent {
        raw: u16,
        readings: CalibrationReadings,
        ok: bool,
    },
}
