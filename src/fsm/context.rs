//! Shared context threaded through every FSM handler.

use serde::{Deserialize, Serialize};

/// Two-point calibration in raw ADC counts.
///
/// No ordering is enforced: `dry` may exceed `wet`, or both may be equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalibrationReadings {
    pub dry: u16,
    pub wet: u16,
}

/// Mutable state owned by the FSM and visible to state handlers.
#[derive(Debug, Clone, Default)]
pub struct FsmContext {
    /// Last captured readings. Survive submit; overwritten by the next cycle.
    pub readings: CalibrationReadings,
    /// Set by the `WaitSend` handler; the service performs the upload and
    /// clears it.
    pub submit_requested: bool,
}

impl FsmContext {
    pub fn new(readings: CalibrationReadings) -> Self {
        Self {
            readings,
            submit_requested: false,
        }
    }

    /// Consume a pending submit request.
    pub fn take_submit_request(&mut self) -> bool {
        core::mem::take(&mut self.submit_requested)
    }
}
