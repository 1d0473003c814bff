//! Log-based event sink adapter.
//!
//! Implements [`EventSink`] by writing structured application events to
//! the ESP-IDF logger (which goes to UART / USB-CDC in production).

use log::{info, warn};

use crate::app::events::AppEvent;
use crate::app::ports::EventSink;

/// Adapter that logs every [`AppEvent`] to the serial console.
pub struct LogEventSink;

impl Default for LogEventSink {
    fn default() -> Self {
        Self::new()
    }
}

impl LogEventSink {
    pub fn new() -> Self {
        Self
    }
}

impl EventSink for LogEventSink {
    fn emit(&mut self, event: &AppEvent) {
        match event {
            AppEvent::Started(r) => {
                info!("START | dry={} wet={}", r.dry, r.wet);
            }
            AppEvent::StateChanged { from, to, kind } => {
                info!("STATE | {:?} -> {:?} ({:?})", from, to, kind);
            }
            AppEvent::CalibrationSubmitted { readings, ok: true } => {
                info!("CALIB | sent dry={} wet={}", readings.dry, readings.wet);
            }
            AppEvent::CalibrationSubmitted { readings, ok: false } => {
                warn!("CALIB | FAILED dry={} wet={}", readings.dry, readings.wet);
            }
            AppEvent::TelemetrySent { raw, readings, ok } => {
                info!(
                    "TELEM | raw={} | dry={} wet={} | {}",
                    raw,
                    readings.dry,
                    readings.wet,
                    if *ok { "OK" } else { "FAILED" }
                );
            }
        }
    }
}
