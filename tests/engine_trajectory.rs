use pretty_assertions::assert_eq;
use rand::rngs::StdRng;
use rand::SeedableRng;

use typist::config::TyperConfig;
use typist::engine::{divergence_point, generate_trajectory, Phase, TypingEngine};
use typist::keyboard::{KeyboardLayout, Layout};
use typist::model::{EventKind, Trajectory};
use typist::sim::replay_text;

const BOUNDARY: &str = " \n\t.,;!?:()[]{}<>\"'";

fn run(text: &str, cfg: TyperConfig, seed: u64) -> Trajectory {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_trajectory(text, 60.0, "qwerty", cfg, &mut rng).expect("generation should succeed")
}

#[test]
fn short_word_without_errors_types_each_char_once() {
    let traj = run("hi", TyperConfig::zero_errors(), 7);

    assert_eq!(traj.events.len(), 3);
    match traj.events[0].kind {
        EventKind::Init { wpm } => assert!((10.0..=110.0).contains(&wpm), "wpm {wpm}"),
        other => panic!("expected init, got {other:?}"),
    }
    assert_eq!(traj.events[0].snapshot, "");
    assert_eq!(traj.events[1].kind, EventKind::Typed { ch: 'h' });
    assert_eq!(traj.events[1].snapshot, "h");
    assert_eq!(traj.events[2].kind, EventKind::Typed { ch: 'i' });
    assert_eq!(traj.events[2].snapshot, "hi");
    assert!(traj.total_time > 0.0);
    assert!(!traj.truncated);
    assert_eq!(traj.final_text(), "hi");
}

#[test]
fn zero_error_regime_advances_cursor_by_one_per_step() {
    let text = "Le café est très bon.\nÇa va?";
    let target: Vec<char> = text.chars().collect();
    let mut rng = StdRng::seed_from_u64(11);
    let mut engine = TypingEngine::new(
        text,
        45.0,
        KeyboardLayout::new(Layout::Azerty),
        TyperConfig::zero_errors(),
        &mut rng,
    );

    for i in 0..target.len() {
        assert_eq!(engine.state().mental_cursor(), i);
        let kind = engine.step(&mut rng).expect("still typing").kind;
        assert_eq!(kind, EventKind::Typed { ch: target[i] });
        assert_eq!(engine.phase(), Phase::Typing);
    }

    assert!(engine.state().is_converged());
    assert!(engine.step(&mut rng).is_none());
    assert_eq!(engine.phase(), Phase::Done);
    assert_eq!(engine.state().events().len(), target.len() + 1);
}

#[test]
fn same_seed_gives_identical_trajectories() {
    let text = "The quick brown fox jumps over the lazy dog.";
    let a = run(text, TyperConfig::default(), 42);
    let b = run(text, TyperConfig::default(), 42);
    assert_eq!(a, b);
}

#[test]
fn runs_converge_with_consistent_events() {
    let texts = [
        "a",
        "hello world",
        "Typing, like speaking, has rhythm!",
        "déjà vu à la fenêtre",
        "first line\nsecond line\n",
        "zzz qqq jjj xxx",
    ];

    for text in texts {
        let target: Vec<char> = text.chars().collect();
        for seed in 0..30 {
            let traj = run(text, TyperConfig::default(), seed);
            assert!(!traj.truncated, "{text:?} seed {seed} truncated");
            assert_eq!(traj.final_text(), text);
            assert_eq!(replay_text(&traj.events).expect("valid events"), text);

            assert!(matches!(traj.events[0].kind, EventKind::Init { .. }));
            let mut last = 0.0;
            for e in &traj.events {
                assert!(e.timestamp >= last, "clock went backwards");
                last = e.timestamp;
                if let EventKind::Typed { ch } = e.kind {
                    let idx = e.snapshot.chars().count() - 1;
                    assert_eq!(target[idx], ch, "typed char off target");
                }
            }
            assert_eq!(traj.total_time, last);
        }
    }
}

#[test]
fn corrections_continue_until_text_is_a_prefix_again() {
    let text = "Every backspace streak ends on a clean prefix, every time.";
    for seed in 0..40 {
        let traj = run(text, TyperConfig::default(), seed);
        for pair in traj.events.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.kind == EventKind::Backspace {
                assert!(
                    !text.starts_with(prev.snapshot.as_str()),
                    "backspace on a correct prefix {:?}",
                    prev.snapshot
                );
            }
            if prev.kind == EventKind::Backspace && !text.starts_with(prev.snapshot.as_str()) {
                assert_eq!(next.kind, EventKind::Backspace, "streak stopped early");
            }
        }
    }
}

#[test]
fn late_errors_are_caught_at_word_boundaries() {
    let cfg = TyperConfig {
        error_probability: 0.2,
        notice_immediate_probability: 0.0,
        notice_drift_probability: 0.0,
        ..TyperConfig::default()
    };
    let text = "the cat sat on the mat";
    let target_len = text.chars().count();

    for seed in 0..40 {
        let traj = run(text, cfg.clone(), seed);
        for pair in traj.events.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.kind == EventKind::Backspace && prev.kind != EventKind::Backspace {
                let at_boundary = prev
                    .snapshot
                    .chars()
                    .last()
                    .is_some_and(|c| BOUNDARY.contains(c));
                let at_end = prev.snapshot.chars().count() >= target_len;
                assert!(
                    at_boundary || at_end,
                    "correction started mid-word at {:?}",
                    prev.snapshot
                );
            }
        }
    }
}

#[test]
fn certain_error_types_a_neighbor_and_truncates() {
    let cfg = TyperConfig {
        error_probability: 1.0,
        swap_probability: 0.0,
        ..TyperConfig::default()
    };
    let traj = run("abc", cfg.clone(), 5);

    match traj.events[1].kind {
        EventKind::TypedError { ch } => {
            assert!(KeyboardLayout::new(Layout::Qwerty).neighbors_of('a').contains(&ch));
        }
        other => panic!("expected a typo, got {other:?}"),
    }

    assert!(traj.truncated);
    assert!(!traj.is_complete());
    let budget = 3 * cfg.step_budget_factor;
    assert!(traj.events.len() <= budget + 1);
    assert!(replay_text(&traj.events).is_ok());
}

#[test]
fn certain_swap_types_the_next_char_first() {
    let cfg = TyperConfig {
        error_probability: 0.0,
        swap_probability: 1.0,
        ..TyperConfig::default()
    };
    let traj = run("abc", cfg, 3);

    assert_eq!(traj.events[1].kind, EventKind::TypedSwap { ch: 'b' });
    assert_eq!(traj.events[1].snapshot, "b");
}

#[test]
fn swaps_never_pull_a_space_forward() {
    let cfg = TyperConfig {
        error_probability: 0.0,
        swap_probability: 1.0,
        notice_immediate_probability: 1.0,
        ..TyperConfig::default()
    };
    let traj = run("a b", cfg, 1);

    assert!(traj
        .events
        .iter()
        .all(|e| e.kind != EventKind::TypedSwap { ch: ' ' }));
}

#[test]
fn empty_target_is_already_done() {
    let traj = run("", TyperConfig::default(), 0);

    assert_eq!(traj.events.len(), 1);
    assert!(!traj.truncated);
    assert_eq!(traj.total_time, 0.0);
    assert_eq!(traj.final_text(), "");
}

#[test]
fn session_speed_never_drops_below_floor() {
    let cfg = TyperConfig {
        wpm_std_dev: 50.0,
        ..TyperConfig::default()
    };
    for seed in 0..100 {
        let mut rng = StdRng::seed_from_u64(seed);
        let engine = TypingEngine::new("x", 12.0, KeyboardLayout::default(), cfg.clone(), &mut rng);
        assert!(engine.session_wpm() >= cfg.min_session_wpm);
        assert!(engine.base_interval() > 0.0);
    }
}

#[test]
fn mean_time_for_a_short_common_word_is_plausible() {
    let n = 100;
    let total: f64 = (0..n)
        .map(|seed| run("the", TyperConfig::default(), seed).total_time)
        .sum();
    let mean = total / n as f64;

    // Common-word and bigram boosts put "the" near 0.25 s, so the floor sits below that.
    assert!((0.1..=3.0).contains(&mean), "mean {mean}");
}

#[test]
fn faster_target_speed_finishes_sooner_on_average() {
    let text = "a moderately long sentence for pacing";
    let mean_at = |wpm: f64| {
        let total: f64 = (0..40)
            .map(|seed| {
                let mut rng = StdRng::seed_from_u64(seed);
                generate_trajectory(text, wpm, "qwerty", TyperConfig::zero_errors(), &mut rng)
                    .expect("generation should succeed")
                    .total_time
            })
            .sum();
        total / 40.0
    };

    assert!(mean_at(120.0) < mean_at(30.0));
}

#[test]
fn rejects_bad_speed_and_config() {
    let mut rng = StdRng::seed_from_u64(0);
    assert!(generate_trajectory("hi", 0.0, "qwerty", TyperConfig::default(), &mut rng).is_err());
    assert!(generate_trajectory("hi", f64::NAN, "qwerty", TyperConfig::default(), &mut rng).is_err());

    let bad = TyperConfig {
        error_probability: 1.5,
        ..TyperConfig::default()
    };
    let err = generate_trajectory("hi", 60.0, "qwerty", bad, &mut rng).unwrap_err();
    assert!(err.to_string().contains("error_probability"));
}

#[test]
fn unknown_layout_is_recorded_as_fallback() {
    let traj = run("hi", TyperConfig::zero_errors(), 0);
    assert_eq!(traj.layout, "qwerty");

    let mut rng = StdRng::seed_from_u64(0);
    let traj = generate_trajectory("hi", 60.0, "colemak", TyperConfig::zero_errors(), &mut rng)
        .expect("generation should succeed");
    assert_eq!(traj.layout, Layout::Fallback.name());
    assert_eq!(traj.final_text(), "hi");
}

#[test]
fn divergence_point_cases() {
    let chars = |s: &str| s.chars().collect::<Vec<_>>();

    assert_eq!(divergence_point(&chars("abc"), &chars("abc")), 3);
    assert_eq!(divergence_point(&chars("abx"), &chars("abc")), 2);
    assert_eq!(divergence_point(&chars("ab"), &chars("abc")), 3);
    assert_eq!(divergence_point(&chars("abcd"), &chars("abc")), 3);
    assert_eq!(divergence_point(&chars(""), &chars("abc")), 3);
    assert_eq!(divergence_point(&chars("xbc"), &chars("abc")), 0);
}
