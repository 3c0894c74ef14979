//! Per-learner progress record and the calling-layer composition.
//!
//! The calculators never call each other. This module is where a finished
//! practice session fans out into the XP award and the streak update, where a
//! wrong answer costs a heart, and where quest rewards land on the record.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::adaptive::DifficultyChange;
use crate::events::Event;
use crate::hearts::{HeartState, HeartsRegenerator};
use crate::quest::{
    apply_progress, Quest, QuestAssigner, QuestAssignment, QuestProgress, QuestUpdate,
};
use crate::srs::{SrsScheduler, VocabularyMasteryRecord};
use crate::storage::EngineConfig;
use crate::streak::{StreakState, StreakTracker};

/// Everything persisted about one learner's progression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProgress {
    pub total_xp: u64,
    /// Spendable in-app currency
    #[serde(default)]
    pub currency: u64,
    pub streak: StreakState,
    pub hearts: HeartState,
    /// Quest progress keyed by quest id
    #[serde(default)]
    pub quests: BTreeMap<String, QuestProgress>,
}

impl UserProgress {
    pub fn new(config: &EngineConfig, timezone: impl Into<String>) -> Self {
        Self {
            total_xp: 0,
            currency: 0,
            streak: StreakState::new(timezone),
            hearts: HeartState::full(&config.hearts),
            quests: BTreeMap::new(),
        }
    }
}

/// What happened in one practice session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub xp_earned: i64,
    pub correct_answers: u32,
    pub total_answers: u32,
}

impl SessionSummary {
    /// A session with at least one answer counts toward the streak.
    pub fn counts_as_practice(&self) -> bool {
        self.total_answers > 0
    }
}

/// Apply a finished session: award XP, then extend the streak.
pub fn finish_session(
    progress: &UserProgress,
    summary: &SessionSummary,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> (UserProgress, Vec<Event>) {
    let mut next = progress.clone();
    let mut events = Vec::new();

    award_xp(&mut next, summary.xp_earned, config, now, &mut events);

    if summary.counts_as_practice() {
        let tracker = StreakTracker::with_config(config.streak.clone());
        let (streak, result) = tracker.record_practice(&progress.streak, now);
        if result.should_reset {
            events.push(Event::StreakReset {
                previous_days: progress.streak.current_streak_days,
                at: now,
            });
        }
        if result.streak_days != progress.streak.current_streak_days || result.is_new_streak {
            events.push(Event::StreakExtended {
                streak_days: result.streak_days,
                status: result.status,
                at: now,
            });
        }
        next.streak = streak;
    }

    (next, events)
}

/// Spend a heart for a wrong answer.
pub fn record_wrong_answer(
    progress: &UserProgress,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> (UserProgress, Event) {
    let mut next = progress.clone();
    next.hearts = progress.hearts.lose_heart(&config.hearts, now);
    let event = Event::HeartLost {
        hearts_left: next.hearts.current_hearts,
        at: now,
    };
    (next, event)
}

/// Restore all hearts.
pub fn refill_hearts(
    progress: &UserProgress,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> (UserProgress, Event) {
    let mut next = progress.clone();
    next.hearts = progress.hearts.refill(&config.hearts);
    let hearts = HeartsRegenerator::with_config(config.hearts.clone())
        .status(&next.hearts, now)
        .current_hearts;
    (next, Event::HeartsRefilled { hearts, at: now })
}

/// Advance a quest and bank its rewards on completion.
///
/// Replaying the same update after completion returns zero rewards and leaves
/// XP and currency untouched.
pub fn advance_quest(
    progress: &UserProgress,
    quest: &Quest,
    delta: i64,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> (UserProgress, QuestUpdate, Vec<Event>) {
    let mut next = progress.clone();
    let mut events = Vec::new();

    let current = progress
        .quests
        .get(&quest.id)
        .cloned()
        .unwrap_or_else(|| QuestProgress::new(quest));
    let update = apply_progress(quest, &current, delta, now);

    if update.xp_awarded > 0 || update.currency_awarded > 0 {
        events.push(Event::QuestCompleted {
            quest_id: quest.id.clone(),
            xp_awarded: update.xp_awarded,
            currency_awarded: update.currency_awarded,
            at: now,
        });
        next.currency = next.currency.saturating_add(u64::from(update.currency_awarded));
        award_xp(&mut next, i64::from(update.xp_awarded), config, now, &mut events);
    }

    next.quests.insert(quest.id.clone(), update.progress.clone());
    (next, update, events)
}

/// Hand out quests from `pool`.
///
/// Every quest already on the record is skipped, active or completed, so a
/// repeated or retried assignment never reopens a finished quest.
pub fn assign_quests<R: Rng + ?Sized>(
    progress: &UserProgress,
    assigner: &QuestAssigner,
    pool: &[Quest],
    rng: &mut R,
    now: DateTime<Utc>,
) -> (UserProgress, Vec<QuestAssignment>) {
    let taken: HashSet<String> = progress.quests.keys().cloned().collect();
    let assignments = assigner.assign(pool, &taken, rng, now);

    let mut next = progress.clone();
    for a in &assignments {
        next.quests.insert(a.quest.id.clone(), a.progress.clone());
    }
    (next, assignments)
}

/// Review one vocabulary item and report its next due date.
///
/// Mastery records live outside [`UserProgress`], one per item.
pub fn review_vocabulary(
    item_id: &str,
    record: &VocabularyMasteryRecord,
    correct: bool,
    config: &EngineConfig,
    now: DateTime<Utc>,
) -> (VocabularyMasteryRecord, Event) {
    let next = SrsScheduler::with_config(config.srs.clone()).review(record, correct, now);
    let event = Event::ReviewScheduled {
        item_id: item_id.to_string(),
        mastery: next.mastery,
        next_review_at: next.next_review_at,
    };
    (next, event)
}

/// Event for a difficulty move reported by the adaptive engine.
pub fn difficulty_event(change: &DifficultyChange, now: DateTime<Utc>) -> Event {
    Event::DifficultyChanged {
        from: change.from,
        to: change.to,
        accuracy: change.accuracy,
        at: now,
    }
}

fn award_xp(
    progress: &mut UserProgress,
    delta: i64,
    config: &EngineConfig,
    now: DateTime<Utc>,
    events: &mut Vec<Event>,
) {
    let award = config.levels.award(progress.total_xp, delta);
    progress.total_xp = award.current.total_xp;
    if award.leveled_up() {
        events.push(Event::LevelUp {
            from_level: award.previous.level,
            to_level: award.current.level,
            name: award.current.name.clone(),
            total_xp: award.current.total_xp,
            at: now,
        });
    }
}
