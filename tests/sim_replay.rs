use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use typist::config::TyperConfig;
use typist::engine::generate_trajectory;
use typist::model::{EventKind, TrajectoryEvent};
use typist::sim::{replay_text, stats};

fn ev(timestamp: f64, kind: EventKind, snapshot: &str) -> TrajectoryEvent {
    TrajectoryEvent {
        timestamp,
        kind,
        snapshot: snapshot.to_string(),
    }
}

#[test]
fn replays_typo_and_correction() {
    let events = vec![
        ev(0.0, EventKind::Init { wpm: 60.0 }, ""),
        ev(0.2, EventKind::Typed { ch: 'h' }, "h"),
        ev(0.4, EventKind::TypedError { ch: 'u' }, "hu"),
        ev(0.9, EventKind::Backspace, "h"),
        ev(1.1, EventKind::Typed { ch: 'i' }, "hi"),
    ];

    assert_eq!(replay_text(&events).expect("valid events"), "hi");
}

#[test]
fn rejects_snapshot_mismatch() {
    let events = vec![
        ev(0.0, EventKind::Init { wpm: 60.0 }, ""),
        ev(0.2, EventKind::Typed { ch: 'h' }, "x"),
    ];

    let err = replay_text(&events).unwrap_err();
    assert!(err.to_string().contains("event 1"), "{err}");
}

#[test]
fn rejects_clock_going_backwards() {
    let events = vec![
        ev(0.0, EventKind::Init { wpm: 60.0 }, ""),
        ev(0.5, EventKind::Typed { ch: 'a' }, "a"),
        ev(0.4, EventKind::Typed { ch: 'b' }, "ab"),
    ];

    assert!(replay_text(&events).is_err());
}

#[test]
fn rejects_backspace_on_empty_text_and_late_init() {
    let backspace_first = vec![
        ev(0.0, EventKind::Init { wpm: 60.0 }, ""),
        ev(0.1, EventKind::Backspace, ""),
    ];
    assert!(replay_text(&backspace_first).is_err());

    let late_init = vec![
        ev(0.0, EventKind::Typed { ch: 'a' }, "a"),
        ev(0.1, EventKind::Init { wpm: 60.0 }, "a"),
    ];
    assert!(replay_text(&late_init).is_err());
}

#[test]
fn stats_count_event_kinds() {
    let mut rng = StdRng::seed_from_u64(17);
    let cfg = TyperConfig {
        error_probability: 0.2,
        ..TyperConfig::default()
    };
    let text = "counting events in a typing run";
    let traj = generate_trajectory(text, 60.0, "qwerty", cfg.clone(), &mut rng)
        .expect("generation should succeed");

    let s = stats(&traj, cfg.avg_word_length);
    assert_eq!(s.events, traj.events.len());
    assert_eq!(s.typed + s.errors + s.swaps + s.backspaces + 1, s.events);
    assert_eq!(s.typed + s.errors + s.swaps - s.backspaces, text.chars().count());
    assert_eq!(s.total_time, traj.total_time);
    assert!(s.effective_wpm > 0.0);
}

#[test]
fn trajectory_json_uses_tagged_event_kinds() {
    let event = ev(0.25, EventKind::TypedSwap { ch: 'b' }, "b");
    let json = serde_json::to_value(&event).expect("serialize");

    assert_eq!(json["kind"]["type"], "typed_swap");
    assert_eq!(json["kind"]["ch"], "b");

    let back: TrajectoryEvent = serde_json::from_value(json).expect("deserialize");
    assert_eq!(back, event);

    let backspace = serde_json::to_value(EventKind::Backspace).expect("serialize");
    assert_eq!(backspace, serde_json::json!({ "type": "backspace" }));
}
