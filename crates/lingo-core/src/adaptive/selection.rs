//! Exercise selection and word-bank shuffling.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::engine::{AdaptiveConfig, AdaptiveSessionState, Difficulty};

/// An exercise in the practice pool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    pub id: String,
    pub difficulty: Difficulty,
    #[serde(default)]
    pub prompt: String,
    /// Tiles offered for word-bank style exercises
    #[serde(default)]
    pub word_bank: Vec<String>,
}

impl Exercise {
    pub fn new(id: impl Into<String>, difficulty: Difficulty) -> Self {
        Self {
            id: id.into(),
            difficulty,
            prompt: String::new(),
            word_bank: Vec::new(),
        }
    }
}

/// Pick the next unused exercise.
///
/// Order of preference: the current difficulty, then one step easier, then
/// one step harder. With adaptive mode off, the first unused exercise wins.
/// Pool order decides ties, so results are deterministic.
pub fn select_next<'a>(
    exercises: &'a [Exercise],
    state: &AdaptiveSessionState,
    used_ids: &HashSet<String>,
    config: &AdaptiveConfig,
) -> Option<&'a Exercise> {
    let mut unused = exercises.iter().filter(|e| !used_ids.contains(&e.id));

    if !config.enabled {
        return unused.next();
    }

    let current = state.current_difficulty;
    let preference = [Some(current), current.easier(), current.harder()];

    preference
        .into_iter()
        .flatten()
        .find_map(|difficulty| {
            exercises
                .iter()
                .find(|e| e.difficulty == difficulty && !used_ids.contains(&e.id))
        })
}

/// Shuffle word-bank tiles with the given random source.
pub fn shuffle_word_bank<R: Rng + ?Sized>(words: &[String], rng: &mut R) -> Vec<String> {
    let mut shuffled = words.to_vec();
    shuffled.shuffle(rng);
    shuffled
}
