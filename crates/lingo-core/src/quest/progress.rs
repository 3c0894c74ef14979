//! Quest progress and reward issuance.
//!
//! A quest moves `active -> completed` exactly once. Rewards are tied to that
//! transition, so replaying the same progress event (a retry, a duplicate
//! delivery from another device) never pays twice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Static quest definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quest {
    pub id: String,
    pub title: String,
    pub target: u32,
    #[serde(default)]
    pub xp_reward: u32,
    #[serde(default)]
    pub currency_reward: u32,
}

impl Quest {
    pub fn new(id: impl Into<String>, title: impl Into<String>, target: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            target,
            xp_reward: 0,
            currency_reward: 0,
        }
    }

    pub fn with_rewards(mut self, xp: u32, currency: u32) -> Self {
        self.xp_reward = xp;
        self.currency_reward = currency;
        self
    }

    /// Targets of zero are treated as one.
    pub fn effective_target(&self) -> u32 {
        self.target.max(1)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestStatus {
    Active,
    Completed,
}

/// A learner's progress on one quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestProgress {
    pub progress: u32,
    pub target: u32,
    pub status: QuestStatus,
    pub completed_at: Option<DateTime<Utc>>,
}

impl QuestProgress {
    pub fn new(quest: &Quest) -> Self {
        Self {
            progress: 0,
            target: quest.effective_target(),
            status: QuestStatus::Active,
            completed_at: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == QuestStatus::Completed
    }

    /// 0..=100
    pub fn percent(&self) -> u8 {
        let target = self.target.max(1);
        ((u64::from(self.progress.min(target)) * 100) / u64::from(target)) as u8
    }
}

/// Result of applying progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestUpdate {
    pub progress: QuestProgress,
    pub is_completed: bool,
    pub xp_awarded: u32,
    pub currency_awarded: u32,
}

/// Add `delta` to a quest's progress.
///
/// Negative deltas count as zero and progress never exceeds the target.
/// Rewards are non-zero only on the call that completes the quest.
pub fn apply_progress(
    quest: &Quest,
    user_progress: &QuestProgress,
    delta: i64,
    now: DateTime<Utc>,
) -> QuestUpdate {
    if user_progress.is_completed() {
        return QuestUpdate {
            progress: user_progress.clone(),
            is_completed: true,
            xp_awarded: 0,
            currency_awarded: 0,
        };
    }

    let target = quest.effective_target();
    let delta = u32::try_from(delta.max(0)).unwrap_or(u32::MAX);
    let progress = user_progress.progress.saturating_add(delta).min(target);
    let is_completed = progress >= target;

    let (status, completed_at, xp_awarded, currency_awarded) = if is_completed {
        tracing::info!(
            quest = %quest.id,
            xp = quest.xp_reward,
            currency = quest.currency_reward,
            "quest completed, granting rewards"
        );
        (
            QuestStatus::Completed,
            Some(now),
            quest.xp_reward,
            quest.currency_reward,
        )
    } else {
        (QuestStatus::Active, None, 0, 0)
    };

    QuestUpdate {
        progress: QuestProgress {
            progress,
            target,
            status,
            completed_at,
        },
        is_completed,
        xp_awarded,
        currency_awarded,
    }
}
