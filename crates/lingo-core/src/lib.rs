//! # Lingo Core Library
//!
//! The progression engine of the Lingo language-learning app: everything that
//! decides how a learner advances, kept apart from pages, accounts and
//! payments. The `lingo` CLI and the app backends are thin callers over it.
//!
//! ## Architecture
//!
//! - **Calculators**: pure functions of their inputs (levels, streaks,
//!   hearts, SRS, quests). They never fail, never block and hold no state.
//! - **Adaptive engine**: session-scoped, single-writer difficulty state.
//! - **Composition**: [`progress`] wires calculator outputs into the persisted
//!   per-learner record and produces [`Event`]s.
//! - **Storage**: TOML configuration, a key-value cache for client-local
//!   state, and a versioned SQLite progress store.
//!
//! ## Key Components
//!
//! - [`LevelTable`]: XP to level lookup
//! - [`StreakTracker`]: daily streak state machine
//! - [`HeartsRegenerator`]: time-based heart regeneration
//! - [`AdaptiveDifficultyEngine`]: rolling-window difficulty control
//! - [`SrsScheduler`]: Leitner review scheduling
//! - [`apply_progress`]: quest progress with exactly-once rewards

pub mod adaptive;
pub mod error;
pub mod events;
pub mod hearts;
pub mod levels;
pub mod progress;
pub mod quest;
pub mod srs;
pub mod storage;
pub mod streak;

pub use adaptive::{
    record_answer, select_next, AdaptiveConfig, AdaptiveDifficultyEngine, AdaptiveSessionState,
    Difficulty, DifficultyChange, Exercise,
};
pub use error::{ConfigError, CoreError, StoreError};
pub use events::Event;
pub use hearts::{HeartState, HeartsConfig, HeartsInput, HeartsRegenerator, HeartsStatus};
pub use levels::{Level, LevelInfo, LevelTable, XpAward};
pub use progress::{SessionSummary, UserProgress};
pub use quest::{
    apply_progress, Quest, QuestAssigner, QuestAssignment, QuestProgress, QuestStatus, QuestUpdate,
};
pub use srs::{SrsConfig, SrsScheduler, SrsUpdate, VocabularyMasteryRecord};
pub use storage::{
    EngineConfig, KeyValueStore, LocalCache, MemoryStore, ProgressStore, SqliteKvStore,
};
pub use streak::{
    StreakConfig, StreakInput, StreakResult, StreakState, StreakStatus, StreakTracker,
};
