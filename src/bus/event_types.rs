//! Event kinds and source identities.
//!
//! Single source of truth for the closed set of UI events that filter
//! controls put on the bus.

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Event kinds
// ---------------------------------------------------------------------------

pub const EVENT_STATE_CYCLE_REQUEST: &str = "state-cycle-request";
pub const EVENT_INPUT_CHANGE: &str = "input-change";
pub const EVENT_KEY_UP: &str = "key-up";
pub const EVENT_SELECT_CHANGE: &str = "select-change";
pub const EVENT_BUTTON_CLICK: &str = "button-click";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    /// Footer click: cycle the control between active and disabled.
    StateCycleRequest,
    InputChange,
    KeyUp,
    SelectChange,
    /// Icon toggle or clear button press.
    ButtonClick,
}

impl EventKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::StateCycleRequest => EVENT_STATE_CYCLE_REQUEST,
            Self::InputChange => EVENT_INPUT_CHANGE,
            Self::KeyUp => EVENT_KEY_UP,
            Self::SelectChange => EVENT_SELECT_CHANGE,
            Self::ButtonClick => EVENT_BUTTON_CLICK,
        }
    }

    /// Every kind a filter control listens to.
    pub const fn all() -> &'static [EventKind] {
        &[
            EventKind::StateCycleRequest,
            EventKind::InputChange,
            EventKind::KeyUp,
            EventKind::SelectChange,
            EventKind::ButtonClick,
        ]
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            EVENT_STATE_CYCLE_REQUEST | "footer-click" => Ok(Self::StateCycleRequest),
            EVENT_INPUT_CHANGE => Ok(Self::InputChange),
            EVENT_KEY_UP => Ok(Self::KeyUp),
            EVENT_SELECT_CHANGE => Ok(Self::SelectChange),
            EVENT_BUTTON_CLICK => Ok(Self::ButtonClick),
            other => Err(format!("unknown event kind: {other}")),
        }
    }
}

// ---------------------------------------------------------------------------
// Source identity
// ---------------------------------------------------------------------------

static NEXT_CONTROL_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique control identity, allocated at construction time.
///
/// Distinct from the filter key: two controls may share a key, never an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ControlId(u64);

impl ControlId {
    pub fn next() -> Self {
        Self(NEXT_CONTROL_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for ControlId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "control-{}", self.0)
    }
}
