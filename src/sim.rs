use anyhow::{anyhow, Result};

use crate::model::{EventKind, Trajectory, TrajectoryEvent};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrajectoryStats {
    pub events: usize,
    pub typed: usize,
    pub errors: usize,
    pub swaps: usize,
    pub backspaces: usize,
    pub total_time: f64,
    /// Words per minute over the whole run, counting the target length only.
    pub effective_wpm: f64,
}

pub fn stats(trajectory: &Trajectory, avg_word_length: f64) -> TrajectoryStats {
    let mut out = TrajectoryStats {
        events: trajectory.events.len(),
        total_time: trajectory.total_time,
        ..Default::default()
    };

    for e in &trajectory.events {
        match e.kind {
            EventKind::Init { .. } => {}
            EventKind::Typed { .. } => out.typed += 1,
            EventKind::TypedError { .. } => out.errors += 1,
            EventKind::TypedSwap { .. } => out.swaps += 1,
            EventKind::Backspace => out.backspaces += 1,
        }
    }

    let chars = trajectory.target_text.chars().count() as f64;
    if trajectory.total_time > 0.0 && avg_word_length > 0.0 {
        out.effective_wpm = (chars / avg_word_length) / (trajectory.total_time / 60.0);
    }

    out
}

/// Re-apply every event to an empty buffer and return the resulting text.
///
/// Fails if a snapshot disagrees with the replayed buffer, if the clock goes
/// backwards, or if a backspace hits an empty buffer. This is intended for
/// tests/debugging of trajectories loaded from disk.
pub fn replay_text(events: &[TrajectoryEvent]) -> Result<String> {
    let mut buf: Vec<char> = Vec::new();
    let mut last_timestamp = 0.0f64;

    for (idx, event) in events.iter().enumerate() {
        if event.timestamp < last_timestamp {
            return Err(anyhow!(
                "event {idx}: timestamp {:.4} is earlier than {:.4}",
                event.timestamp,
                last_timestamp
            ));
        }
        last_timestamp = event.timestamp;

        match event.kind {
            EventKind::Init { .. } => {
                if idx != 0 {
                    return Err(anyhow!("event {idx}: init event after the first position"));
                }
            }
            EventKind::Backspace => {
                if buf.pop().is_none() {
                    return Err(anyhow!("event {idx}: backspace on empty text"));
                }
            }
            kind => {
                if let Some(c) = kind.emitted_char() {
                    buf.push(c);
                }
            }
        }

        let replayed: String = buf.iter().collect();
        if replayed != event.snapshot {
            return Err(anyhow!(
                "event {idx}: snapshot {:?} does not match replayed text {:?}",
                event.snapshot,
                replayed
            ));
        }
    }

    Ok(buf.into_iter().collect())
}
