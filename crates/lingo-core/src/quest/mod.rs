//! Quests: bounded progress counters that pay out once.

mod assign;
mod progress;

pub use assign::{QuestAssigner, QuestAssignment};
pub use progress::{apply_progress, Quest, QuestProgress, QuestStatus, QuestUpdate};
