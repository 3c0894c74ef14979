use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adaptive::Difficulty;
use crate::streak::StreakStatus;

/// Notable progression changes produced by the calling layer.
/// The UI turns these into toasts; integrations may subscribe to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Event {
    LevelUp {
        from_level: u32,
        to_level: u32,
        name: String,
        total_xp: u64,
        at: DateTime<Utc>,
    },
    /// First practice of a new streak, or a continued one.
    StreakExtended {
        streak_days: u32,
        status: StreakStatus,
        at: DateTime<Utc>,
    },
    /// A missed day broke the previous streak; a new one started at 1.
    StreakReset {
        previous_days: u32,
        at: DateTime<Utc>,
    },
    HeartLost {
        hearts_left: u32,
        at: DateTime<Utc>,
    },
    HeartsRefilled {
        hearts: u32,
        at: DateTime<Utc>,
    },
    DifficultyChanged {
        from: Difficulty,
        to: Difficulty,
        accuracy: f64,
        at: DateTime<Utc>,
    },
    ReviewScheduled {
        item_id: String,
        mastery: u8,
        next_review_at: DateTime<Utc>,
    },
    QuestCompleted {
        quest_id: String,
        xp_awarded: u32,
        currency_awarded: u32,
        at: DateTime<Utc>,
    },
}

impl Event {
    /// Short label for logs and CLI output.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::LevelUp { .. } => "level_up",
            Event::StreakExtended { .. } => "streak_extended",
            Event::StreakReset { .. } => "streak_reset",
            Event::HeartLost { .. } => "heart_lost",
            Event::HeartsRefilled { .. } => "hearts_refilled",
            Event::DifficultyChanged { .. } => "difficulty_changed",
            Event::ReviewScheduled { .. } => "review_scheduled",
            Event::QuestCompleted { .. } => "quest_completed",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serializes_with_type_tag() {
        let event = Event::HeartLost {
            hearts_left: 3,
            at: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "heart_lost");
        assert_eq!(json["heartsLeft"], 3);
        assert_eq!(json["type"], event.kind());
    }

    #[test]
    fn test_tag_matches_kind_for_every_variant() {
        let at = Utc::now();
        let events = vec![
            Event::LevelUp {
                from_level: 1,
                to_level: 2,
                name: "Elementary".into(),
                total_xp: 120,
                at,
            },
            Event::StreakExtended {
                streak_days: 2,
                status: StreakStatus::Active,
                at,
            },
            Event::StreakReset { previous_days: 4, at },
            Event::HeartsRefilled { hearts: 5, at },
            Event::DifficultyChanged {
                from: Difficulty::Medium,
                to: Difficulty::Hard,
                accuracy: 1.0,
                at,
            },
            Event::ReviewScheduled {
                item_id: "hund".into(),
                mastery: 1,
                next_review_at: at,
            },
            Event::QuestCompleted {
                quest_id: "q".into(),
                xp_awarded: 10,
                currency_awarded: 5,
                at,
            },
        ];
        for event in &events {
            let json = serde_json::to_value(event).unwrap();
            assert_eq!(json["type"], event.kind());
            let back: Event = serde_json::from_value(json).unwrap();
            assert_eq!(&back, event);
        }

        let json = serde_json::to_value(&events[0]).unwrap();
        assert_eq!(json["fromLevel"], 1);
        assert_eq!(json["totalXp"], 120);
    }
}
