//! Adaptive exercise difficulty.
//!
//! A rolling window of recent answers drives the session difficulty one step
//! at a time along `easy <-> medium <-> hard`. Selection then prefers unused
//! exercises at that difficulty.

mod engine;
mod selection;

pub use engine::{
    record_answer, AdaptiveConfig, AdaptiveDifficultyEngine, AdaptiveSessionState, Difficulty,
    DifficultyChange,
};
pub use selection::{select_next, shuffle_word_bank, Exercise};
