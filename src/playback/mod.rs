pub mod terminal;
mod util;

use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::{ensure, Result};

use crate::model::{EventKind, Trajectory};

pub use terminal::TerminalTarget;

/// Something that can receive keystrokes, such as an input field or a terminal.
pub trait InputTarget {
    fn type_char(&mut self, c: char) -> Result<()>;
    fn press_backspace(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackOptions {
    /// Multiplier applied to every inter-event delay. `0.0` replays instantly.
    pub time_scale: f64,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self { time_scale: 1.0 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackOutcome {
    Completed,
    Aborted { events_applied: usize },
}

/// Translate one trajectory event into input actions.
pub fn apply_event(target: &mut impl InputTarget, kind: &EventKind) -> Result<()> {
    match kind {
        EventKind::Init { .. } => Ok(()),
        EventKind::Backspace => target.press_backspace(),
        EventKind::Typed { ch } | EventKind::TypedError { ch } | EventKind::TypedSwap { ch } => {
            target.type_char(*ch)
        }
    }
}

/// Replay a trajectory against `target`, sleeping for each timestamp delta.
///
/// Setting `stop` abandons the replay after the current event.
pub fn play_trajectory(
    trajectory: &Trajectory,
    target: &mut impl InputTarget,
    options: PlaybackOptions,
    stop: &AtomicBool,
) -> Result<PlaybackOutcome> {
    ensure!(
        options.time_scale.is_finite() && options.time_scale >= 0.0,
        "time_scale must be finite and >= 0"
    );

    let mut last_timestamp = 0.0f64;
    for (applied, event) in trajectory.events.iter().enumerate() {
        if stop.load(Ordering::SeqCst) {
            return Ok(PlaybackOutcome::Aborted {
                events_applied: applied,
            });
        }

        let delay_ms = util::scaled_delay_ms(event.timestamp - last_timestamp, options.time_scale);
        util::sleep_interruptible(stop, delay_ms);
        last_timestamp = event.timestamp;

        if stop.load(Ordering::SeqCst) {
            return Ok(PlaybackOutcome::Aborted {
                events_applied: applied,
            });
        }

        apply_event(target, &event.kind)?;
    }

    Ok(PlaybackOutcome::Completed)
}
