use std::path::Path;

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

/// Tunable parameters of the typing model.
///
/// Times are in seconds. Every field has a default, so a JSON override file
/// only needs to name the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TyperConfig {
    pub default_wpm: f64,
    pub wpm_std_dev: f64,
    pub min_session_wpm: f64,
    pub avg_word_length: f64,

    pub error_probability: f64,
    pub swap_probability: f64,
    /// Chance of catching an error right after the next keystroke.
    pub notice_immediate_probability: f64,
    /// Chance of catching an error that is two or more characters back.
    pub notice_drift_probability: f64,
    /// Chance of catching an error once a word/sentence boundary is typed.
    pub notice_boundary_probability: f64,

    pub complex_word_error_factor: f64,
    pub common_word_error_factor: f64,
    pub composed_accent_error_factor: f64,

    pub speed_boost_common_word: f64,
    pub speed_penalty_complex_word: f64,
    pub speed_boost_close_keys: f64,
    pub speed_boost_bigram: f64,
    pub speed_penalty_far_keys: f64,
    pub close_key_distance: f64,
    pub far_key_distance: f64,

    pub keystroke_std_dev: f64,
    pub min_keystroke_secs: f64,
    pub backspace_mean: f64,
    pub backspace_std_dev: f64,
    pub reaction_mean: f64,
    pub reaction_std_dev: f64,
    pub min_reaction_secs: f64,

    pub direct_accent_penalty: f64,
    pub composed_accent_penalty: f64,
    pub uppercase_penalty: f64,
    pub space_pause_mean: f64,
    pub space_pause_std_dev: f64,

    pub fatigue_factor: f64,
    /// Steps allowed per target character before a run is declared truncated.
    pub step_budget_factor: usize,
}

impl Default for TyperConfig {
    fn default() -> Self {
        Self {
            default_wpm: 60.0,
            wpm_std_dev: 10.0,
            min_session_wpm: 10.0,
            avg_word_length: 5.0,

            error_probability: 0.04,
            swap_probability: 0.015,
            notice_immediate_probability: 0.85,
            notice_drift_probability: 0.8,
            notice_boundary_probability: 1.0,

            complex_word_error_factor: 1.5,
            common_word_error_factor: 0.5,
            composed_accent_error_factor: 2.0,

            speed_boost_common_word: 0.6,
            speed_penalty_complex_word: 1.3,
            speed_boost_close_keys: 0.5,
            speed_boost_bigram: 0.4,
            speed_penalty_far_keys: 1.2,
            close_key_distance: 2.0,
            far_key_distance: 4.0,

            keystroke_std_dev: 0.03,
            min_keystroke_secs: 0.02,
            backspace_mean: 0.12,
            backspace_std_dev: 0.02,
            reaction_mean: 0.35,
            reaction_std_dev: 0.1,
            min_reaction_secs: 0.1,

            direct_accent_penalty: 0.15,
            composed_accent_penalty: 0.4,
            uppercase_penalty: 0.2,
            space_pause_mean: 0.25,
            space_pause_std_dev: 0.05,

            fatigue_factor: 1.0005,
            step_budget_factor: 10,
        }
    }
}

impl TyperConfig {
    /// Defaults with substitution and swap errors turned off.
    pub fn zero_errors() -> Self {
        Self {
            error_probability: 0.0,
            swap_probability: 0.0,
            ..Default::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json).context("failed to parse typer config JSON")?;
        validate_config(&cfg)?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_json_str(&json).with_context(|| format!("invalid config {}", path.display()))
    }
}

fn ensure_probability(name: &str, value: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "{name} must be between 0.0 and 1.0"
    );
    Ok(())
}

fn ensure_std_dev(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be finite and >= 0"
    );
    Ok(())
}

fn ensure_positive(name: &str, value: f64) -> Result<()> {
    ensure!(value.is_finite() && value > 0.0, "{name} must be finite and > 0");
    Ok(())
}

fn ensure_non_negative(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be finite and >= 0"
    );
    Ok(())
}

pub fn validate_config(cfg: &TyperConfig) -> Result<()> {
    ensure_positive("default_wpm", cfg.default_wpm)?;
    ensure_std_dev("wpm_std_dev", cfg.wpm_std_dev)?;
    ensure_positive("min_session_wpm", cfg.min_session_wpm)?;
    ensure_positive("avg_word_length", cfg.avg_word_length)?;

    ensure_probability("error_probability", cfg.error_probability)?;
    ensure_probability("swap_probability", cfg.swap_probability)?;
    ensure_probability(
        "notice_immediate_probability",
        cfg.notice_immediate_probability,
    )?;
    ensure_probability("notice_drift_probability", cfg.notice_drift_probability)?;
    ensure_probability(
        "notice_boundary_probability",
        cfg.notice_boundary_probability,
    )?;

    ensure_non_negative("complex_word_error_factor", cfg.complex_word_error_factor)?;
    ensure_non_negative("common_word_error_factor", cfg.common_word_error_factor)?;
    ensure_non_negative(
        "composed_accent_error_factor",
        cfg.composed_accent_error_factor,
    )?;

    ensure_positive("speed_boost_common_word", cfg.speed_boost_common_word)?;
    ensure_positive("speed_penalty_complex_word", cfg.speed_penalty_complex_word)?;
    ensure_positive("speed_boost_close_keys", cfg.speed_boost_close_keys)?;
    ensure_positive("speed_boost_bigram", cfg.speed_boost_bigram)?;
    ensure_positive("speed_penalty_far_keys", cfg.speed_penalty_far_keys)?;
    ensure_non_negative("close_key_distance", cfg.close_key_distance)?;
    ensure_non_negative("far_key_distance", cfg.far_key_distance)?;

    ensure_std_dev("keystroke_std_dev", cfg.keystroke_std_dev)?;
    ensure_positive("min_keystroke_secs", cfg.min_keystroke_secs)?;
    ensure_non_negative("backspace_mean", cfg.backspace_mean)?;
    ensure_std_dev("backspace_std_dev", cfg.backspace_std_dev)?;
    ensure_non_negative("reaction_mean", cfg.reaction_mean)?;
    ensure_std_dev("reaction_std_dev", cfg.reaction_std_dev)?;
    ensure_non_negative("min_reaction_secs", cfg.min_reaction_secs)?;

    ensure_non_negative("direct_accent_penalty", cfg.direct_accent_penalty)?;
    ensure_non_negative("composed_accent_penalty", cfg.composed_accent_penalty)?;
    ensure_non_negative("uppercase_penalty", cfg.uppercase_penalty)?;
    ensure_non_negative("space_pause_mean", cfg.space_pause_mean)?;
    ensure_std_dev("space_pause_std_dev", cfg.space_pause_std_dev)?;

    ensure!(
        cfg.fatigue_factor.is_finite() && cfg.fatigue_factor >= 1.0,
        "fatigue_factor must be finite and >= 1.0"
    );
    ensure!(
        cfg.step_budget_factor >= 1,
        "step_budget_factor must be >= 1"
    );

    Ok(())
}
