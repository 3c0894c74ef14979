//! Leitner-style spaced repetition for vocabulary review.
//!
//! Each item sits in a mastery box 0..=5. A correct answer moves it up one
//! box, a wrong answer sends it back to box 0. The next review is due after
//! the box's interval.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Highest mastery box.
pub const MAX_MASTERY: u8 = 5;

/// Review interval per mastery box, in days.
pub const DEFAULT_INTERVALS_DAYS: [u32; 6] = [1, 3, 7, 14, 30, 90];

/// Review state of one vocabulary item for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyMasteryRecord {
    pub mastery: u8,
    pub next_review_at: DateTime<Utc>,
    pub times_reviewed: u32,
    pub times_correct: u32,
}

impl VocabularyMasteryRecord {
    /// A newly learned item, due immediately.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            mastery: 0,
            next_review_at: now,
            times_reviewed: 0,
            times_correct: 0,
        }
    }

    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at <= now
    }

    /// Share of correct reviews, 0.0 when never reviewed.
    pub fn accuracy(&self) -> f64 {
        if self.times_reviewed == 0 {
            return 0.0;
        }
        f64::from(self.times_correct.min(self.times_reviewed)) / f64::from(self.times_reviewed)
    }
}

/// Mastery box and due date after one review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SrsUpdate {
    pub mastery: u8,
    pub next_review_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SrsConfig {
    #[serde(default = "default_intervals")]
    pub intervals_days: Vec<u32>,
}

fn default_intervals() -> Vec<u32> {
    DEFAULT_INTERVALS_DAYS.to_vec()
}

impl Default for SrsConfig {
    fn default() -> Self {
        Self {
            intervals_days: default_intervals(),
        }
    }
}

impl SrsConfig {
    /// The table needs one positive, strictly increasing interval per box.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] describing the first violation.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "srs.intervals_days".into(),
            message,
        };

        let expected = usize::from(MAX_MASTERY) + 1;
        if self.intervals_days.len() != expected {
            return Err(invalid(format!(
                "expected {expected} intervals, got {}",
                self.intervals_days.len()
            )));
        }
        if self.intervals_days.first() == Some(&0) {
            return Err(invalid("intervals must be at least one day".into()));
        }
        if let Some(pair) = self.intervals_days.windows(2).find(|w| w[1] <= w[0]) {
            return Err(invalid(format!(
                "intervals must strictly increase ({} then {})",
                pair[0], pair[1]
            )));
        }
        Ok(())
    }
}

/// Leitner scheduler
#[derive(Debug, Clone, Default)]
pub struct SrsScheduler {
    config: SrsConfig,
}

impl SrsScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: SrsConfig) -> Self {
        Self { config }
    }

    /// Interval for a mastery box. Boxes past the table use its last entry.
    pub fn interval_for(&self, mastery: u8) -> Duration {
        let days = self
            .config
            .intervals_days
            .get(usize::from(mastery))
            .or_else(|| self.config.intervals_days.last())
            .copied()
            .unwrap_or(1);
        Duration::days(i64::from(days))
    }

    /// New box and due date for an item currently in box `mastery`.
    ///
    /// Out-of-range boxes are clamped into `0..=5` first.
    pub fn schedule(&self, mastery: i32, correct: bool, now: DateTime<Utc>) -> SrsUpdate {
        let current = mastery.clamp(0, i32::from(MAX_MASTERY)) as u8;
        let mastery = if correct {
            (current + 1).min(MAX_MASTERY)
        } else {
            0
        };
        SrsUpdate {
            mastery,
            next_review_at: now + self.interval_for(mastery),
        }
    }

    /// Apply one review to a stored record.
    pub fn review(
        &self,
        record: &VocabularyMasteryRecord,
        correct: bool,
        now: DateTime<Utc>,
    ) -> VocabularyMasteryRecord {
        let update = self.schedule(i32::from(record.mastery), correct, now);
        tracing::debug!(
            from = record.mastery,
            to = update.mastery,
            correct,
            "vocabulary reviewed"
        );
        VocabularyMasteryRecord {
            mastery: update.mastery,
            next_review_at: update.next_review_at,
            times_reviewed: record.times_reviewed.saturating_add(1),
            times_correct: record.times_correct.saturating_add(u32::from(correct)),
        }
    }

    /// Items due at `now`, most overdue first.
    pub fn due_for_review<'a, K>(
        &self,
        records: &'a [(K, VocabularyMasteryRecord)],
        now: DateTime<Utc>,
    ) -> Vec<&'a (K, VocabularyMasteryRecord)> {
        let mut due: Vec<_> = records.iter().filter(|(_, r)| r.is_due(now)).collect();
        due.sort_by_key(|(_, r)| r.next_review_at);
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_strictly_increases() {
        assert!(SrsConfig::default().validate().is_ok());
        assert!(DEFAULT_INTERVALS_DAYS.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_validate_rejects_flat_table() {
        let config = SrsConfig {
            intervals_days: vec![1, 3, 3, 14, 30, 90],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_wrong_length() {
        let config = SrsConfig {
            intervals_days: vec![1, 2, 3],
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_correct_moves_up_one_box() {
        let now = Utc::now();
        let update = SrsScheduler::new().schedule(2, true, now);
        assert_eq!(update.mastery, 3);
        assert_eq!(update.next_review_at - now, Duration::days(14));
    }

    #[test]
    fn test_correct_at_top_stays_at_top() {
        let now = Utc::now();
        let update = SrsScheduler::new().schedule(5, true, now);
        assert_eq!(update.mastery, 5);
        assert_eq!(update.next_review_at - now, Duration::days(90));
    }

    #[test]
    fn test_incorrect_resets_to_zero() {
        let now = Utc::now();
        let update = SrsScheduler::new().schedule(4, false, now);
        assert_eq!(update.mastery, 0);
        assert_eq!(update.next_review_at - now, Duration::days(1));
    }

    #[test]
    fn test_out_of_range_mastery_is_clamped() {
        let now = Utc::now();
        let scheduler = SrsScheduler::new();
        assert_eq!(scheduler.schedule(42, true, now).mastery, 5);
        assert_eq!(scheduler.schedule(-3, true, now).mastery, 1);
    }

    #[test]
    fn test_intervals_grow_with_mastery() {
        let now = Utc::now();
        let scheduler = SrsScheduler::new();
        let gaps: Vec<Duration> = (0..=5u8).map(|m| scheduler.interval_for(m)).collect();
        assert!(gaps.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(scheduler.schedule(-1, true, now).next_review_at - now, Duration::days(3));
    }

    #[test]
    fn test_review_updates_counters() {
        let now = Utc::now();
        let scheduler = SrsScheduler::new();
        let record = VocabularyMasteryRecord::new(now);
        let record = scheduler.review(&record, true, now);
        let record = scheduler.review(&record, false, now);
        assert_eq!(record.times_reviewed, 2);
        assert_eq!(record.times_correct, 1);
        assert_eq!(record.mastery, 0);
        assert!((record.accuracy() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_due_for_review_orders_most_overdue_first() {
        let now = Utc::now();
        let due_at = |at: DateTime<Utc>| VocabularyMasteryRecord {
            next_review_at: at,
            ..VocabularyMasteryRecord::new(now)
        };
        let records = vec![
            ("later", due_at(now + Duration::days(2))),
            ("recent", due_at(now - Duration::hours(1))),
            ("old", due_at(now - Duration::days(3))),
        ];
        let due = SrsScheduler::new().due_for_review(&records, now);
        let keys: Vec<&str> = due.iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, vec!["old", "recent"]);
    }
}
