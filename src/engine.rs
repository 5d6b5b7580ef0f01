use anyhow::{ensure, Result};
use rand::Rng;
use rand_distr::StandardNormal;

use crate::config::{validate_config, TyperConfig};
use crate::keyboard::{is_composed_accent, is_direct_accent, KeyboardLayout};
use crate::language::{is_common_bigram, word_difficulty, WordDifficulty};
use crate::model::{EventKind, Trajectory, TrajectoryEvent, TRAJECTORY_VERSION};

/// Characters after which an outstanding error is always reviewed.
const BOUNDARY_CHARS: &str = " \n\t.,;!?:()[]{}<>\"'";

fn is_boundary_char(c: char) -> bool {
    BOUNDARY_CHARS.contains(c)
}

fn sample_normal(rng: &mut impl Rng, mean: f64, std_dev: f64) -> f64 {
    let z: f64 = rng.sample(StandardNormal);
    mean + std_dev * z
}

/// First index where `produced` and `target` disagree.
///
/// When one is a prefix of the other this is `target.len()`, so over-typed
/// text (produced longer than target) counts as diverging at the target end.
pub fn divergence_point(produced: &[char], target: &[char]) -> usize {
    produced
        .iter()
        .zip(target)
        .position(|(p, t)| p != t)
        .unwrap_or(target.len())
}

/// Where the simulated typist is in its loop.
///
/// | from         | event                    | to           |
/// |--------------|--------------------------|--------------|
/// | `Typing`     | `Typed`/`TypedError`/`TypedSwap` | `Typing` |
/// | `Typing`     | `Backspace`              | `Correcting` |
/// | `Correcting` | `Backspace`              | `Correcting` |
/// | `Correcting` | `Typed`/`TypedError`/`TypedSwap` | `Typing` |
/// | any          | produced == target       | `Done`       |
///
/// While `Correcting`, every step backspaces until the produced text is a
/// prefix of the target again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Typing,
    Correcting,
    Done,
}

impl Phase {
    pub fn after(self, kind: &EventKind) -> Phase {
        match (self, kind) {
            (Phase::Done, _) => Phase::Done,
            (_, EventKind::Backspace) => Phase::Correcting,
            (_, EventKind::Init { .. })
            | (_, EventKind::Typed { .. })
            | (_, EventKind::TypedError { .. })
            | (_, EventKind::TypedSwap { .. }) => Phase::Typing,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrajectoryState {
    produced: Vec<char>,
    target: Vec<char>,
    elapsed: f64,
    events: Vec<TrajectoryEvent>,
    last_typed: Option<char>,
    fatigue: f64,
    mental_cursor: usize,
}

impl TrajectoryState {
    fn new(target_text: &str) -> Self {
        Self {
            produced: Vec::new(),
            target: target_text.chars().collect(),
            elapsed: 0.0,
            events: Vec::new(),
            last_typed: None,
            fatigue: 1.0,
            mental_cursor: 0,
        }
    }

    pub fn produced_text(&self) -> String {
        self.produced.iter().collect()
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn produced_chars(&self) -> &[char] {
        &self.produced
    }

    pub fn target_chars(&self) -> &[char] {
        &self.target
    }

    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn events(&self) -> &[TrajectoryEvent] {
        &self.events
    }

    pub fn last_typed(&self) -> Option<char> {
        self.last_typed
    }

    pub fn fatigue(&self) -> f64 {
        self.fatigue
    }

    pub fn mental_cursor(&self) -> usize {
        self.mental_cursor
    }

    pub fn is_converged(&self) -> bool {
        self.produced == self.target
    }

    fn advance(&mut self, secs: f64) {
        self.elapsed += secs.max(0.0);
    }

    fn record(&mut self, kind: EventKind) -> &TrajectoryEvent {
        self.events.push(TrajectoryEvent {
            timestamp: self.elapsed,
            kind,
            snapshot: self.produced.iter().collect(),
        });
        &self.events[self.events.len() - 1]
    }

    /// Space-delimited target word around the mental cursor.
    fn current_word(&self) -> Option<String> {
        let idx = self.mental_cursor;
        if idx >= self.target.len() {
            return None;
        }
        let start = self.target[..idx]
            .iter()
            .rposition(|&c| c == ' ')
            .map_or(0, |p| p + 1);
        let end = self.target[idx..]
            .iter()
            .position(|&c| c == ' ')
            .map_or(self.target.len(), |p| idx + p);
        Some(self.target[start..end].iter().collect())
    }
}

#[derive(Debug, Clone)]
pub struct TypingEngine {
    cfg: TyperConfig,
    keyboard: KeyboardLayout,
    state: TrajectoryState,
    phase: Phase,
    target_wpm: f64,
    session_wpm: f64,
    base_interval: f64,
}

impl TypingEngine {
    /// Sample the session pace and record the `Init` event.
    ///
    /// `cfg` is expected to be valid; [`generate_trajectory`] checks it.
    pub fn new(
        target_text: &str,
        target_wpm: f64,
        keyboard: KeyboardLayout,
        cfg: TyperConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let session_wpm =
            sample_normal(rng, target_wpm, cfg.wpm_std_dev).max(cfg.min_session_wpm);
        let base_interval = 60.0 / (session_wpm * cfg.avg_word_length);
        tracing::debug!(target_wpm, session_wpm, base_interval, "sampled session speed");

        let mut state = TrajectoryState::new(target_text);
        state.record(EventKind::Init { wpm: session_wpm });

        Self {
            cfg,
            keyboard,
            state,
            phase: Phase::Typing,
            target_wpm,
            session_wpm,
            base_interval,
        }
    }

    pub fn state(&self) -> &TrajectoryState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn session_wpm(&self) -> f64 {
        self.session_wpm
    }

    pub fn base_interval(&self) -> f64 {
        self.base_interval
    }

    pub fn keyboard(&self) -> &KeyboardLayout {
        &self.keyboard
    }

    pub fn step_budget(&self) -> usize {
        self.state
            .target
            .len()
            .saturating_mul(self.cfg.step_budget_factor)
    }

    /// Advance the simulation by exactly one event.
    ///
    /// Returns `None` once the produced text matches the target.
    pub fn step(&mut self, rng: &mut impl Rng) -> Option<&TrajectoryEvent> {
        if self.state.is_converged() {
            self.phase = Phase::Done;
            return None;
        }

        let divergence = divergence_point(&self.state.produced, &self.state.target);
        if self.state.produced.len() > divergence && self.should_correct(divergence, rng) {
            return Some(self.backspace(rng));
        }

        self.type_next(rng)
    }

    /// Step until the text converges or the step budget runs out.
    pub fn run(mut self, rng: &mut impl Rng) -> Trajectory {
        let budget = self.step_budget();
        let mut steps = 0usize;
        while steps < budget && self.step(rng).is_some() {
            steps += 1;
        }

        let truncated = !self.state.is_converged();
        if truncated {
            tracing::warn!(
                steps,
                budget,
                produced = %self.state.produced_text(),
                "typing run did not converge within the step budget"
            );
        } else {
            self.phase = Phase::Done;
        }

        Trajectory {
            version: TRAJECTORY_VERSION,
            layout: self.keyboard.layout().name().to_string(),
            target_text: self.state.target_text(),
            target_wpm: self.target_wpm,
            session_wpm: self.session_wpm,
            total_time: self.state.elapsed,
            truncated,
            events: self.state.events,
        }
    }

    fn should_correct(&self, divergence: usize, rng: &mut impl Rng) -> bool {
        if self.phase == Phase::Correcting {
            return true;
        }
        if self.state.mental_cursor >= self.state.target.len() {
            return true;
        }

        let Some(&last) = self.state.produced.last() else {
            return false;
        };
        if is_boundary_char(last) {
            return rng.gen_bool(self.cfg.notice_boundary_probability);
        }

        match self.state.produced.len() - divergence {
            0 => false,
            1 => rng.gen_bool(self.cfg.notice_immediate_probability),
            _ => rng.gen_bool(self.cfg.notice_drift_probability),
        }
    }

    fn backspace(&mut self, rng: &mut impl Rng) -> &TrajectoryEvent {
        if self.phase != Phase::Correcting {
            let reaction = sample_normal(rng, self.cfg.reaction_mean, self.cfg.reaction_std_dev)
                .max(self.cfg.min_reaction_secs);
            self.state.advance(reaction);
        }

        let dt = sample_normal(rng, self.cfg.backspace_mean, self.cfg.backspace_std_dev)
            .max(self.cfg.min_keystroke_secs);
        self.state.advance(dt);
        self.state.produced.pop();
        self.state.mental_cursor = self.state.produced.len();

        let kind = EventKind::Backspace;
        self.phase = self.phase.after(&kind);
        self.state.record(kind)
    }

    fn type_next(&mut self, rng: &mut impl Rng) -> Option<&TrajectoryEvent> {
        self.state.mental_cursor = self.state.mental_cursor.min(self.state.produced.len());
        let cursor = self.state.mental_cursor;
        // Only reachable with nothing left to type; the run ends unconverged.
        let intended = *self.state.target.get(cursor)?;

        self.state.fatigue *= self.cfg.fatigue_factor;

        if let Some(&ahead) = self.state.target.get(cursor + 1) {
            if ahead != ' ' && ahead != intended && rng.gen_bool(self.cfg.swap_probability) {
                return Some(self.keystroke(EventKind::TypedSwap { ch: ahead }, ahead, rng));
            }
        }

        let mut error_probability = self.cfg.error_probability;
        match self.state.current_word().as_deref().map(word_difficulty) {
            Some(WordDifficulty::Complex) => {
                error_probability *= self.cfg.complex_word_error_factor;
            }
            Some(WordDifficulty::Common) => {
                error_probability *= self.cfg.common_word_error_factor;
            }
            Some(WordDifficulty::Normal) | None => {}
        }
        if is_composed_accent(intended) {
            error_probability *= self.cfg.composed_accent_error_factor;
        }

        if rng.gen_bool(error_probability.clamp(0.0, 1.0)) {
            let wrong = self.keyboard.random_neighbor(intended, rng);
            Some(self.keystroke(EventKind::TypedError { ch: wrong }, wrong, rng))
        } else {
            Some(self.keystroke(EventKind::Typed { ch: intended }, intended, rng))
        }
    }

    fn keystroke(&mut self, kind: EventKind, ch: char, rng: &mut impl Rng) -> &TrajectoryEvent {
        let dt = self.keystroke_duration(ch, rng);
        self.state.advance(dt);
        self.state.produced.push(ch);
        self.state.last_typed = Some(ch);
        self.state.mental_cursor += 1;

        self.phase = self.phase.after(&kind);
        self.state.record(kind)
    }

    fn keystroke_duration(&self, ch: char, rng: &mut impl Rng) -> f64 {
        let cfg = &self.cfg;
        let mut mean = self.base_interval * self.state.fatigue;

        match self.state.current_word().as_deref().map(word_difficulty) {
            Some(WordDifficulty::Common) => mean *= cfg.speed_boost_common_word,
            Some(WordDifficulty::Complex) => mean *= cfg.speed_penalty_complex_word,
            Some(WordDifficulty::Normal) | None => {}
        }

        if let Some(prev) = self.state.last_typed {
            if is_common_bigram(prev, ch) {
                mean *= cfg.speed_boost_bigram;
            } else {
                let distance = self.keyboard.distance(prev, ch);
                if distance > 0.0 && distance < cfg.close_key_distance {
                    mean *= cfg.speed_boost_close_keys;
                } else if distance > cfg.far_key_distance {
                    mean *= cfg.speed_penalty_far_keys;
                }
            }
        }

        if ch == ' ' {
            mean += sample_normal(rng, cfg.space_pause_mean, cfg.space_pause_std_dev);
        } else if is_composed_accent(ch) {
            mean += cfg.composed_accent_penalty;
        } else if is_direct_accent(ch) {
            mean += cfg.direct_accent_penalty;
        } else if ch.is_uppercase() {
            mean += cfg.uppercase_penalty;
        }

        sample_normal(rng, mean, cfg.keystroke_std_dev).max(cfg.min_keystroke_secs)
    }
}

/// Produce the full keystroke trajectory for `target_text`.
///
/// Unknown layout names fall back to a reduced grid. A run that exhausts its
/// step budget is returned with `truncated` set rather than as an error.
pub fn generate_trajectory(
    target_text: &str,
    target_wpm: f64,
    layout_name: &str,
    cfg: TyperConfig,
    rng: &mut impl Rng,
) -> Result<Trajectory> {
    validate_config(&cfg)?;
    ensure!(
        target_wpm.is_finite() && target_wpm > 0.0,
        "target_wpm must be finite and > 0"
    );

    let keyboard = KeyboardLayout::named(layout_name);
    let engine = TypingEngine::new(target_text, target_wpm, keyboard, cfg, rng);
    Ok(engine.run(rng))
}
