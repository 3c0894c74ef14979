//! Heart ("lives") regeneration.
//!
//! Hearts are spent by the caller on wrong answers and regenerate one at a
//! time every `regen_minutes`. There is no background timer: the current
//! count is recomputed from elapsed wall-clock time whenever it is needed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Heart limits and regeneration speed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeartsConfig {
    #[serde(default = "default_max_hearts")]
    pub max_hearts: u32,
    #[serde(default = "default_regen_minutes")]
    pub regen_minutes: u32,
}

fn default_max_hearts() -> u32 {
    5
}
fn default_regen_minutes() -> u32 {
    30
}

impl Default for HeartsConfig {
    fn default() -> Self {
        Self {
            max_hearts: default_max_hearts(),
            regen_minutes: default_regen_minutes(),
        }
    }
}

/// Persisted heart record for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartState {
    pub current_hearts: u32,
    /// Start of the current regeneration clock
    pub last_practice_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartsInput {
    pub current_hearts: u32,
    pub max_hearts: u32,
    pub last_practice_date: Option<DateTime<Utc>>,
    pub current_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HeartsStatus {
    pub current_hearts: u32,
    pub minutes_until_next_heart: u32,
    pub is_fully_regenerated: bool,
}

/// Heart regeneration calculator
#[derive(Debug, Clone, Default)]
pub struct HeartsRegenerator {
    config: HeartsConfig,
}

impl HeartsRegenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeartsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &HeartsConfig {
        &self.config
    }

    fn regen_minutes(&self) -> i64 {
        i64::from(self.config.regen_minutes.max(1))
    }

    /// Hearts available at `input.current_date`.
    pub fn calculate(&self, input: &HeartsInput) -> HeartsStatus {
        let full = HeartsStatus {
            current_hearts: input.max_hearts,
            minutes_until_next_heart: 0,
            is_fully_regenerated: true,
        };

        let Some(last) = input.last_practice_date else {
            return full;
        };
        if input.current_hearts >= input.max_hearts {
            return full;
        }

        let regen = self.regen_minutes();
        let elapsed_minutes = (input.current_date - last).num_milliseconds().max(0) / 60_000;
        let regenerated = elapsed_minutes / regen;
        let hearts = (i64::from(input.current_hearts) + regenerated)
            .min(i64::from(input.max_hearts)) as u32;

        if hearts >= input.max_hearts {
            return full;
        }

        HeartsStatus {
            current_hearts: hearts,
            minutes_until_next_heart: (regen - elapsed_minutes % regen) as u32,
            is_fully_regenerated: false,
        }
    }

    /// Hearts available for a stored record.
    pub fn status(&self, state: &HeartState, now: DateTime<Utc>) -> HeartsStatus {
        self.calculate(&HeartsInput {
            current_hearts: state.current_hearts,
            max_hearts: self.config.max_hearts,
            last_practice_date: state.last_practice_date,
            current_date: now,
        })
    }
}

impl HeartState {
    /// A learner with a full set of hearts.
    pub fn full(config: &HeartsConfig) -> Self {
        Self {
            current_hearts: config.max_hearts,
            last_practice_date: None,
        }
    }

    /// Spend one heart after a wrong answer.
    ///
    /// Hearts regenerated so far are banked first. The regeneration clock
    /// keeps partial progress toward the next heart, unless the learner was
    /// at full hearts, in which case it starts at `now`.
    pub fn lose_heart(&self, config: &HeartsConfig, now: DateTime<Utc>) -> HeartState {
        let regenerator = HeartsRegenerator::with_config(config.clone());
        let status = regenerator.status(self, now);

        if status.current_hearts == 0 {
            return HeartState {
                current_hearts: 0,
                last_practice_date: self.last_practice_date.or(Some(now)),
            };
        }

        let clock_start = if status.is_fully_regenerated {
            now
        } else {
            let regen = i64::from(config.regen_minutes.max(1));
            let into_current = regen - i64::from(status.minutes_until_next_heart);
            now - chrono::Duration::minutes(into_current)
        };

        HeartState {
            current_hearts: status.current_hearts - 1,
            last_practice_date: Some(clock_start),
        }
    }

    /// Restore every heart (e.g. a purchased refill).
    pub fn refill(&self, config: &HeartsConfig) -> HeartState {
        HeartState::full(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn input(current: u32, elapsed: Duration) -> HeartsInput {
        let now = Utc::now();
        HeartsInput {
            current_hearts: current,
            max_hearts: 5,
            last_practice_date: Some(now - elapsed),
            current_date: now,
        }
    }

    #[test]
    fn test_full_hearts_need_no_wait() {
        let regen = HeartsRegenerator::new();
        let status = regen.calculate(&input(5, Duration::minutes(3)));
        assert_eq!(status.current_hearts, 5);
        assert_eq!(status.minutes_until_next_heart, 0);
        assert!(status.is_fully_regenerated);
    }

    #[test]
    fn test_no_timestamp_means_full() {
        let regen = HeartsRegenerator::new();
        let status = regen.calculate(&HeartsInput {
            current_hearts: 1,
            max_hearts: 5,
            last_practice_date: None,
            current_date: Utc::now(),
        });
        assert_eq!(status.current_hearts, 5);
        assert!(status.is_fully_regenerated);
    }

    #[test]
    fn test_partial_regeneration() {
        let regen = HeartsRegenerator::new();
        // 75 minutes -> 2 hearts, 15 minutes into the third
        let status = regen.calculate(&input(1, Duration::minutes(75)));
        assert_eq!(status.current_hearts, 3);
        assert_eq!(status.minutes_until_next_heart, 15);
        assert!(!status.is_fully_regenerated);
    }

    #[test]
    fn test_just_lost_heart_waits_full_period() {
        let regen = HeartsRegenerator::new();
        let status = regen.calculate(&input(4, Duration::seconds(20)));
        assert_eq!(status.current_hearts, 4);
        assert_eq!(status.minutes_until_next_heart, 30);
    }

    #[test]
    fn test_caps_at_max() {
        let regen = HeartsRegenerator::new();
        let status = regen.calculate(&input(0, Duration::hours(10)));
        assert_eq!(status.current_hearts, 5);
        assert_eq!(status.minutes_until_next_heart, 0);
        assert!(status.is_fully_regenerated);
    }

    #[test]
    fn test_future_timestamp_counts_as_no_time() {
        let regen = HeartsRegenerator::new();
        let status = regen.calculate(&input(2, Duration::minutes(-90)));
        assert_eq!(status.current_hearts, 2);
        assert_eq!(status.minutes_until_next_heart, 30);
    }

    #[test]
    fn test_lose_heart_from_full_starts_clock() {
        let config = HeartsConfig::default();
        let now = Utc::now();
        let state = HeartState::full(&config).lose_heart(&config, now);
        assert_eq!(state.current_hearts, 4);
        assert_eq!(state.last_practice_date, Some(now));
    }

    #[test]
    fn test_lose_heart_keeps_partial_progress() {
        let config = HeartsConfig::default();
        let now = Utc::now();
        let state = HeartState {
            current_hearts: 2,
            last_practice_date: Some(now - Duration::minutes(40)),
        };
        // 1 heart regenerated (3), 10 minutes toward the next; spend one -> 2
        let after = state.lose_heart(&config, now);
        assert_eq!(after.current_hearts, 2);

        let status = HeartsRegenerator::with_config(config).status(&after, now);
        assert_eq!(status.minutes_until_next_heart, 20);
    }

    #[test]
    fn test_lose_heart_at_zero_stays_zero() {
        let config = HeartsConfig::default();
        let now = Utc::now();
        let state = HeartState {
            current_hearts: 0,
            last_practice_date: Some(now),
        };
        let after = state.lose_heart(&config, now);
        assert_eq!(after.current_hearts, 0);
        assert_eq!(after.last_practice_date, Some(now));
    }

    #[test]
    fn test_refill() {
        let config = HeartsConfig::default();
        let state = HeartState {
            current_hearts: 1,
            last_practice_date: Some(Utc::now()),
        };
        assert_eq!(state.refill(&config).current_hearts, 5);
    }
}
