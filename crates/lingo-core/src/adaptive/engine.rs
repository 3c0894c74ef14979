//! Rolling-window difficulty state machine.
//!
//! ```text
//! Easy <-> Medium <-> Hard
//! ```
//!
//! The window is judged only once it is full, and it is emptied after every
//! adjustment so the new difficulty is measured on fresh answers.

use std::collections::{HashSet, VecDeque};

use serde::{Deserialize, Serialize};

use super::selection::{select_next, Exercise};
use crate::error::ConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// One step harder, `None` at the top.
    pub fn harder(self) -> Option<Self> {
        match self {
            Difficulty::Easy => Some(Difficulty::Medium),
            Difficulty::Medium => Some(Difficulty::Hard),
            Difficulty::Hard => None,
        }
    }

    /// One step easier, `None` at the bottom.
    pub fn easier(self) -> Option<Self> {
        match self {
            Difficulty::Easy => None,
            Difficulty::Medium => Some(Difficulty::Easy),
            Difficulty::Hard => Some(Difficulty::Medium),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Difficulty::Medium
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" => Ok(Difficulty::Medium),
            "hard" => Ok(Difficulty::Hard),
            other => Err(format!("unknown difficulty: {other}")),
        }
    }
}

/// Tuning for the adaptive engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdaptiveConfig {
    /// When false, difficulty never changes and selection ignores it
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Accuracy at or above which difficulty goes up
    #[serde(default = "default_upper_threshold")]
    pub upper_threshold: f64,
    /// Accuracy at or below which difficulty goes down
    #[serde(default = "default_lower_threshold")]
    pub lower_threshold: f64,
    #[serde(default)]
    pub initial_difficulty: Difficulty,
}

fn default_true() -> bool {
    true
}
fn default_window_size() -> usize {
    5
}
fn default_upper_threshold() -> f64 {
    0.8
}
fn default_lower_threshold() -> f64 {
    0.4
}

impl Default for AdaptiveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_size: default_window_size(),
            upper_threshold: default_upper_threshold(),
            lower_threshold: default_lower_threshold(),
            initial_difficulty: Difficulty::Medium,
        }
    }
}

impl AdaptiveConfig {
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an empty window or thresholds
    /// outside `0..=1` or not ordered `lower < upper`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: format!("adaptive.{key}"),
            message: message.into(),
        };
        if self.window_size == 0 {
            return Err(invalid("window_size", "must be at least 1"));
        }
        if !(0.0..=1.0).contains(&self.lower_threshold) {
            return Err(invalid("lower_threshold", "must be within 0.0..=1.0"));
        }
        if !(0.0..=1.0).contains(&self.upper_threshold) {
            return Err(invalid("upper_threshold", "must be within 0.0..=1.0"));
        }
        if self.lower_threshold >= self.upper_threshold {
            return Err(invalid(
                "lower_threshold",
                "must be below upper_threshold",
            ));
        }
        Ok(())
    }

    fn effective_window(&self) -> usize {
        self.window_size.max(1)
    }
}

/// Session-scoped adaptive state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdaptiveSessionState {
    pub current_difficulty: Difficulty,
    /// Oldest answer first
    pub recent_answers: VecDeque<bool>,
    pub adjustments_made: u32,
}

impl AdaptiveSessionState {
    pub fn new(difficulty: Difficulty) -> Self {
        Self {
            current_difficulty: difficulty,
            recent_answers: VecDeque::new(),
            adjustments_made: 0,
        }
    }

    /// Fraction of correct answers in the window, `None` when empty.
    pub fn accuracy(&self) -> Option<f64> {
        if self.recent_answers.is_empty() {
            return None;
        }
        let correct = self.recent_answers.iter().filter(|&&a| a).count();
        Some(correct as f64 / self.recent_answers.len() as f64)
    }
}

impl Default for AdaptiveSessionState {
    fn default() -> Self {
        Self::new(Difficulty::default())
    }
}

/// A one-step difficulty move.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyChange {
    pub from: Difficulty,
    pub to: Difficulty,
    /// Window accuracy that triggered the move
    pub accuracy: f64,
}

/// Record one answer and return the next state.
pub fn record_answer(
    state: &AdaptiveSessionState,
    correct: bool,
    config: &AdaptiveConfig,
) -> AdaptiveSessionState {
    step(state, correct, config).0
}

fn step(
    state: &AdaptiveSessionState,
    correct: bool,
    config: &AdaptiveConfig,
) -> (AdaptiveSessionState, Option<DifficultyChange>) {
    let window = config.effective_window();
    let mut next = state.clone();

    next.recent_answers.push_back(correct);
    while next.recent_answers.len() > window {
        next.recent_answers.pop_front();
    }

    if !config.enabled || next.recent_answers.len() < window {
        return (next, None);
    }

    let accuracy = next.accuracy().unwrap_or(0.0);
    let target = if accuracy >= config.upper_threshold {
        next.current_difficulty.harder()
    } else if accuracy <= config.lower_threshold {
        next.current_difficulty.easier()
    } else {
        None
    };

    let Some(to) = target else {
        return (next, None);
    };

    let change = DifficultyChange {
        from: next.current_difficulty,
        to,
        accuracy,
    };
    next.current_difficulty = to;
    next.adjustments_made = next.adjustments_made.saturating_add(1);
    next.recent_answers.clear();

    tracing::debug!(
        from = %change.from,
        to = %change.to,
        accuracy = change.accuracy,
        "difficulty adjusted"
    );

    (next, Some(change))
}

/// Stateful wrapper around the adaptive state for one practice session.
#[derive(Debug, Clone)]
pub struct AdaptiveDifficultyEngine {
    config: AdaptiveConfig,
    state: AdaptiveSessionState,
}

impl AdaptiveDifficultyEngine {
    pub fn new(config: AdaptiveConfig) -> Self {
        let state = AdaptiveSessionState::new(config.initial_difficulty);
        Self { config, state }
    }

    /// Resume from a saved state.
    pub fn restore(config: AdaptiveConfig, state: AdaptiveSessionState) -> Self {
        Self { config, state }
    }

    /// Record an answer, returning the difficulty move it caused, if any.
    pub fn record_event(&mut self, correct: bool) -> Option<DifficultyChange> {
        let (next, change) = step(&self.state, correct, &self.config);
        self.state = next;
        change
    }

    pub fn get_state(&self) -> &AdaptiveSessionState {
        &self.state
    }

    pub fn config(&self) -> &AdaptiveConfig {
        &self.config
    }

    pub fn current_difficulty(&self) -> Difficulty {
        self.state.current_difficulty
    }

    pub fn rolling_accuracy(&self) -> Option<f64> {
        self.state.accuracy()
    }

    pub fn select_next<'a>(
        &self,
        exercises: &'a [Exercise],
        used_ids: &HashSet<String>,
    ) -> Option<&'a Exercise> {
        select_next(exercises, &self.state, used_ids, &self.config)
    }

    pub fn into_state(self) -> AdaptiveSessionState {
        self.state
    }
}

impl Default for AdaptiveDifficultyEngine {
    fn default() -> Self {
        Self::new(AdaptiveConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed(engine: &mut AdaptiveDifficultyEngine, answers: &[bool]) -> Vec<DifficultyChange> {
        answers.iter().filter_map(|&a| engine.record_event(a)).collect()
    }

    #[test]
    fn test_difficulty_steps() {
        assert_eq!(Difficulty::Easy.harder(), Some(Difficulty::Medium));
        assert_eq!(Difficulty::Hard.harder(), None);
        assert_eq!(Difficulty::Easy.easier(), None);
        assert_eq!(Difficulty::Hard.easier(), Some(Difficulty::Medium));
        assert_eq!("HARD".parse::<Difficulty>(), Ok(Difficulty::Hard));
    }

    #[test]
    fn test_no_escalation_before_window_full() {
        let mut engine = AdaptiveDifficultyEngine::default();
        let changes = feed(&mut engine, &[true, true, true, true]);
        assert!(changes.is_empty());
        assert_eq!(engine.current_difficulty(), Difficulty::Medium);
        assert_eq!(engine.get_state().recent_answers.len(), 4);
    }

    #[test]
    fn test_escalates_on_full_accurate_window() {
        let mut engine = AdaptiveDifficultyEngine::default();
        let changes = feed(&mut engine, &[true, true, false, true, true]);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].from, Difficulty::Medium);
        assert_eq!(changes[0].to, Difficulty::Hard);
        assert_eq!(engine.get_state().adjustments_made, 1);
        assert!(engine.get_state().recent_answers.is_empty());
    }

    #[test]
    fn test_deescalates_on_poor_window() {
        let mut engine = AdaptiveDifficultyEngine::default();
        let changes = feed(&mut engine, &[false, true, false, true, false]);
        assert_eq!(changes.len(), 1);
        assert_eq!(engine.current_difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_middle_accuracy_holds() {
        let mut engine = AdaptiveDifficultyEngine::default();
        let changes = feed(&mut engine, &[true, true, true, false, false]);
        assert!(changes.is_empty());
        assert_eq!(engine.current_difficulty(), Difficulty::Medium);
    }

    #[test]
    fn test_caps_at_hard_and_easy() {
        let mut engine = AdaptiveDifficultyEngine::restore(
            AdaptiveConfig::default(),
            AdaptiveSessionState::new(Difficulty::Hard),
        );
        assert!(feed(&mut engine, &[true; 5]).is_empty());
        assert_eq!(engine.current_difficulty(), Difficulty::Hard);
        assert_eq!(engine.get_state().adjustments_made, 0);

        let mut engine = AdaptiveDifficultyEngine::restore(
            AdaptiveConfig::default(),
            AdaptiveSessionState::new(Difficulty::Easy),
        );
        assert!(feed(&mut engine, &[false; 5]).is_empty());
        assert_eq!(engine.current_difficulty(), Difficulty::Easy);
    }

    #[test]
    fn test_oldest_answer_evicted() {
        let config = AdaptiveConfig {
            enabled: false,
            ..Default::default()
        };
        let mut state = AdaptiveSessionState::default();
        for answer in [false, true, true, true, true, true] {
            state = record_answer(&state, answer, &config);
        }
        assert_eq!(state.recent_answers.len(), 5);
        assert!(state.recent_answers.iter().all(|&a| a));
        assert_eq!(state.current_difficulty, Difficulty::Medium);
    }

    #[test]
    fn test_window_of_one_never_skips_a_level() {
        let config = AdaptiveConfig {
            window_size: 1,
            ..Default::default()
        };
        let mut state = AdaptiveSessionState::new(Difficulty::Easy);
        state = record_answer(&state, true, &config);
        assert_eq!(state.current_difficulty, Difficulty::Medium);
        state = record_answer(&state, true, &config);
        assert_eq!(state.current_difficulty, Difficulty::Hard);
        assert_eq!(state.adjustments_made, 2);
    }

    #[test]
    fn test_config_validation() {
        assert!(AdaptiveConfig::default().validate().is_ok());
        let bad = AdaptiveConfig {
            lower_threshold: 0.9,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
        let bad = AdaptiveConfig {
            window_size: 0,
            ..Default::default()
        };
        assert!(bad.validate().is_err());
    }
}
