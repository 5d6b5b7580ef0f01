use serde::{Deserialize, Serialize};

pub const TRAJECTORY_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trajectory {
    pub version: u32,
    pub layout: String,
    pub target_text: String,
    pub target_wpm: f64,
    pub session_wpm: f64,
    /// Seconds from the first event to the last.
    pub total_time: f64,
    /// Set when the step budget ran out before the text converged.
    pub truncated: bool,
    pub events: Vec<TrajectoryEvent>,
}

impl Trajectory {
    pub fn is_complete(&self) -> bool {
        !self.truncated
    }

    /// Text left on screen after the last event.
    pub fn final_text(&self) -> &str {
        self.events
            .last()
            .map(|e| e.snapshot.as_str())
            .unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryEvent {
    pub timestamp: f64,
    pub kind: EventKind,
    pub snapshot: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum EventKind {
    Init { wpm: f64 },
    Typed { ch: char },
    TypedError { ch: char },
    TypedSwap { ch: char },
    Backspace,
}

impl EventKind {
    /// The character an input target receives for this event.
    ///
    /// Errors and swaps are ordinary keystrokes from the target's point of view.
    pub fn emitted_char(&self) -> Option<char> {
        match *self {
            EventKind::Typed { ch } | EventKind::TypedError { ch } | EventKind::TypedSwap { ch } => {
                Some(ch)
            }
            EventKind::Init { .. } | EventKind::Backspace => None,
        }
    }

    pub fn is_mistake(&self) -> bool {
        matches!(
            self,
            EventKind::TypedError { .. } | EventKind::TypedSwap { .. }
        )
    }
}
