//! Table-driven calibration state machine.
//!
//! ```text
//!            LongPress             Short            Short            Short
//!   ┌──────┐ ────────▶ ┌─────────┐ ─────▶ ┌─────────┐ ─────▶ ┌──────────┐
//!   │ Idle │           │ WaitDry │        │ WaitWet │        │ WaitSend │
//!   └──────┘ ◀──────── └─────────┘        └─────────┘        └──────────┘
//!      ▲    LongPress (cancel, from any non-Idle state)             │
//!      └────────────────────────────────────────────────────────────┘
//!                              Short (submit)
//! ```
//!
//! Long presses are handled by the engine itself: they either start a
//! calibration from `Idle` or cancel one from any other state. Short presses
//! are dispatched to the current state's `on_short_press` handler, which may
//! read the soil sensor through the port it is given and returns the next
//! state. Only one event is processed per call, so a long press can never race
//! a short press.

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

use crate::app::ports::SoilSensorPort;

// ---------------------------------------------------------------------------
// State identity
// ---------------------------------------------------------------------------

/// Calibration workflow states.
/// Must stay in sync with the table built in [`states::build_state_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StateId {
    Idle = 0,
    WaitDry = 1,
    WaitWet = 2,
    WaitSend = 3,
}

impl StateId {
    /// Total number of states — used to size the table array.
    pub const COUNT: usize = 4;

    /// Convert an index back to `StateId`. Out-of-range indices fall back to
    /// `Idle` (debug builds assert).
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::Idle,
            1 => Self::WaitDry,
            2 => Self::WaitWet,
            3 => Self::WaitSend,
            _ => {
                debug_assert!(false, "invalid state index: {idx}");
                Self::Idle
            }
        }
    }
}

/// Signature for the short-press handler of a state.
/// Returns `Some(next)` to trigger a transition, or `None` to stay.
pub type ShortPressFn = fn(&mut FsmContext, &mut dyn SoilSensorPort) -> Option<StateId>;

/// Static descriptor for a single FSM state.
pub struct StateDescriptor {
    pub id: StateId,
    pub name: &'static str,
    /// Operator instruction logged when the state is entered.
    pub prompt: &'static str,
    pub on_short_press: Option<ShortPressFn>,
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionKind {
    /// `Idle → WaitDry` on a long press.
    Started,
    /// A capture step completed.
    Advanced,
    /// `WaitSend → Idle`; the caller owes a calibration upload.
    Submitted,
    /// Any non-idle state back to `Idle` on a long press.
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub kind: TransitionKind,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

pub struct Fsm {
    /// Fixed-size table indexed by `StateId as usize`.
    table: [StateDescriptor; StateId::COUNT],
    current: usize,
    transitions: u32,
}

impl Fsm {
    pub fn new(table: [StateDescriptor; StateId::COUNT], initial: StateId) -> Self {
        Self {
            table,
            current: initial as usize,
            transitions: 0,
        }
    }

    pub fn current_state(&self) -> StateId {
        StateId::from_index(self.current)
    }

    pub fn is_idle(&self) -> bool {
        self.current_state() == StateId::Idle
    }

    /// Descriptor of the current state.
    pub fn descriptor(&self) -> &StateDescriptor {
        &self.table[self.current]
    }

    /// Number of transitions taken since construction.
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }

    /// Long press: start from `Idle`, cancel from anywhere else.
    pub fn long_press(&mut self) -> Transition {
        let (to, kind) = if self.is_idle() {
            (StateId::WaitDry, TransitionKind::Started)
        } else {
            (StateId::Idle, TransitionKind::Cancelled)
        };
        self.transition(to, kind)
    }

    /// Short press: dispatch to the current state's handler.
    pub fn short_press(
        &mut self,
        ctx: &mut FsmContext,
        sensor: &mut dyn SoilSensorPort,
    ) -> Option<Transition> {
        let handler = self.table[self.current].on_short_press?;
        let next = handler(ctx, sensor)?;
        let kind = if next == StateId::Idle {
            TransitionKind::Submitted
        } else {
            TransitionKind::Advanced
        };
        Some(self.transition(next, kind))
    }

    fn transition(&mut self, next: StateId, kind: TransitionKind) -> Transition {
        let from = self.current_state();
        info!(
            "FSM transition: {} -> {} ({:?})",
            self.table[self.current].name, self.table[next as usize].name, kind
        );
        self.current = next as usize;
        self.transitions = self.transitions.wrapping_add(1);
        info!("{}", self.table[self.current].prompt);
        Transition {
            from,
            to: next,
            kind,
        }
    }
}
