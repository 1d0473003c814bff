//! State handlers and table construction for the calibration workflow.
//!
//! | State    | Short press                         | Next     |
//! |----------|-------------------------------------|----------|
//! | Idle     | ignored                             | —        |
//! | WaitDry  | capture `dry` from the soil sensor  | WaitWet  |
//! | WaitWet  | capture `wet` from the soil sensor  | WaitSend |
//! | WaitSend | request calibration upload          | Idle     |

use log::info;

use super::context::FsmContext;
use super::{StateDescriptor, StateId};
use crate::app::ports::SoilSensorPort;

/// Build the state table, indexed by `StateId as usize`.
pub fn build_state_table() -> [StateDescriptor; StateId::COUNT] {
    [
        StateDescriptor {
            id: StateId::Idle,
            name: "IDLE",
            prompt: "Long-press to start calibration.",
            on_short_press: None,
        },
        StateDescriptor {
            id: StateId::WaitDry,
            name: "WAIT_DRY",
            prompt: "Place sensor in AIR and press button.",
            on_short_press: Some(wait_dry_short_press),
        },
        StateDescriptor {
            id: StateId::WaitWet,
            name: "WAIT_WET",
            prompt: "Place in WATER and press button.",
            on_short_press: Some(wait_wet_short_press),
        },
        StateDescriptor {
            id: StateId::WaitSend,
            name: "WAIT_SEND",
            prompt: "Press button to send.",
            on_short_press: Some(wait_send_short_press),
        },
    ]
}

fn wait_dry_short_press(ctx: &mut FsmContext, sensor: &mut dyn SoilSensorPort) -> Option<StateId> {
    ctx.readings.dry = sensor.read_raw();
    info!("Dry value set: {}", ctx.readings.dry);
    Some(StateId::WaitWet)
}

fn wait_wet_short_press(ctx: &mut FsmContext, sensor: &mut dyn SoilSensorPort) -> Option<StateId> {
    ctx.readings.wet = sensor.read_raw();
    info!("Wet value set: {}", ctx.readings.wet);
    Some(StateId::WaitSend)
}

fn wait_send_short_press(ctx: &mut FsmContext, _sensor: &mut dyn SoilSensorPort) -> Option<StateId> {
    ctx.submit_requested = true;
    Some(StateId::Idle)
}
