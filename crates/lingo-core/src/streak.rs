//! Daily practice streaks.
//!
//! Day boundaries are the learner's local calendar days in an IANA timezone,
//! never a fixed UTC offset, so a streak survives DST transitions.
//!
//! ## Transitions
//!
//! ```text
//! no_history  -> 1 (new streak)
//! same_day    -> unchanged
//! consecutive -> +1
//! gap         -> 1 (reset, new streak)
//! ```

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

/// Persisted streak record for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub last_practice_date: Option<DateTime<Utc>>,
    pub current_streak_days: u32,
    /// IANA timezone name, e.g. `Europe/Berlin`
    pub timezone: String,
}

impl StreakState {
    pub fn new(timezone: impl Into<String>) -> Self {
        Self {
            last_practice_date: None,
            current_streak_days: 0,
            timezone: timezone.into(),
        }
    }
}

/// How urgently the learner should practice today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakStatus {
    /// Plenty of time left today
    Perfect,
    Active,
    /// Day ends soon
    AtRisk,
    Broken,
}

/// Relation between the last practice day and today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakTransition {
    NoHistory,
    SameDay,
    Consecutive,
    Gap,
}

/// Input record for a streak calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakInput {
    pub last_practice_date: Option<DateTime<Utc>>,
    pub current_streak_days: u32,
    pub current_date: DateTime<Utc>,
    pub timezone: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakResult {
    pub streak_days: u32,
    pub status: StreakStatus,
    pub should_reset: bool,
    pub is_new_streak: bool,
}

/// Thresholds for status derivation, in hours left before local midnight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreakConfig {
    #[serde(default = "default_perfect_hours")]
    pub perfect_hours: f64,
    #[serde(default = "default_at_risk_hours")]
    pub at_risk_hours: f64,
    /// Used when a learner has no valid timezone on file
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
}

fn default_perfect_hours() -> f64 {
    12.0
}
fn default_at_risk_hours() -> f64 {
    4.0
}
fn default_timezone() -> String {
    "UTC".into()
}

impl Default for StreakConfig {
    fn default() -> Self {
        Self {
            perfect_hours: default_perfect_hours(),
            at_risk_hours: default_at_risk_hours(),
            default_timezone: default_timezone(),
        }
    }
}

/// Streak calculator
#[derive(Debug, Clone, Default)]
pub struct StreakTracker {
    config: StreakConfig,
}

impl StreakTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StreakConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &StreakConfig {
        &self.config
    }

    /// Compute the streak after a practice event at `input.current_date`.
    pub fn calculate(&self, input: &StreakInput) -> StreakResult {
        let tz = self.resolve_timezone(&input.timezone);
        let transition = classify(input.last_practice_date, input.current_date, tz);

        let (streak_days, should_reset, is_new_streak) = match transition {
            StreakTransition::NoHistory => (1, false, true),
            StreakTransition::SameDay => (input.current_streak_days, false, false),
            StreakTransition::Consecutive => {
                (input.current_streak_days.saturating_add(1), false, false)
            }
            StreakTransition::Gap => (1, true, true),
        };

        let status = if transition == StreakTransition::NoHistory {
            StreakStatus::Active
        } else {
            self.derive_status(streak_days, input.current_date, tz)
        };

        if should_reset {
            tracing::debug!(previous = input.current_streak_days, "streak reset after gap");
        }

        StreakResult {
            streak_days,
            status,
            should_reset,
            is_new_streak,
        }
    }

    /// Record a practice event and return the state to persist.
    pub fn record_practice(
        &self,
        state: &StreakState,
        now: DateTime<Utc>,
    ) -> (StreakState, StreakResult) {
        let result = self.calculate(&StreakInput {
            last_practice_date: state.last_practice_date,
            current_streak_days: state.current_streak_days,
            current_date: now,
            timezone: state.timezone.clone(),
        });

        let last_practice_date = match state.last_practice_date {
            Some(last) if last > now => Some(last),
            _ => Some(now),
        };

        let next = StreakState {
            last_practice_date,
            current_streak_days: result.streak_days,
            timezone: state.timezone.clone(),
        };
        (next, result)
    }

    /// Status of a stored streak without recording practice.
    ///
    /// A streak whose last practice was yesterday is still alive (today is
    /// not over). Anything older reads as broken with zero effective days.
    pub fn current_status(&self, state: &StreakState, now: DateTime<Utc>) -> StreakResult {
        let tz = self.resolve_timezone(&state.timezone);
        match classify(state.last_practice_date, now, tz) {
            StreakTransition::NoHistory => StreakResult {
                streak_days: 0,
                status: StreakStatus::Broken,
                should_reset: false,
                is_new_streak: false,
            },
            StreakTransition::SameDay | StreakTransition::Consecutive => StreakResult {
                streak_days: state.current_streak_days,
                status: self.derive_status(state.current_streak_days, now, tz),
                should_reset: false,
                is_new_streak: false,
            },
            StreakTransition::Gap => StreakResult {
                streak_days: 0,
                status: StreakStatus::Broken,
                should_reset: true,
                is_new_streak: false,
            },
        }
    }

    fn derive_status(&self, streak_days: u32, now: DateTime<Utc>, tz: Tz) -> StreakStatus {
        if streak_days == 0 {
            return StreakStatus::Broken;
        }
        let remaining = hours_until_day_end(now, tz);
        if remaining > self.config.perfect_hours {
            StreakStatus::Perfect
        } else if remaining < self.config.at_risk_hours {
            StreakStatus::AtRisk
        } else {
            StreakStatus::Active
        }
    }

    fn resolve_timezone(&self, name: &str) -> Tz {
        if let Some(tz) = parse_timezone(name) {
            return tz;
        }
        let fallback = parse_timezone(&self.config.default_timezone).unwrap_or(Tz::UTC);
        tracing::warn!(timezone = name, fallback = %fallback, "unknown timezone");
        fallback
    }
}

/// Parse an IANA timezone name.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Calendar date of `at` in `tz`.
pub fn local_date(at: DateTime<Utc>, tz: Tz) -> NaiveDate {
    at.with_timezone(&tz).date_naive()
}

/// Hours left until local midnight in `tz`.
pub fn hours_until_day_end(now: DateTime<Utc>, tz: Tz) -> f64 {
    let today = local_date(now, tz);
    let Some(day_end) = next_day_start(today, tz) else {
        return 0.0;
    };
    let seconds = (day_end - now).num_seconds().max(0);
    seconds as f64 / 3600.0
}

/// First instant of the day after `date`, in UTC.
fn next_day_start(date: NaiveDate, tz: Tz) -> Option<DateTime<Utc>> {
    let midnight = date.succ_opt()?.and_hms_opt(0, 0, 0)?;
    // Some zones skip midnight on DST days; the day then starts an hour later.
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
}

fn classify(last: Option<DateTime<Utc>>, now: DateTime<Utc>, tz: Tz) -> StreakTransition {
    let Some(last) = last else {
        return StreakTransition::NoHistory;
    };
    let days = (local_date(now, tz) - local_date(last, tz)).num_days();
    match days {
        // Clock skew between devices can put the last practice in the future.
        d if d <= 0 => StreakTransition::SameDay,
        1 => StreakTransition::Consecutive,
        _ => StreakTransition::Gap,
    }
}
