pub mod config;
pub mod hearts;
pub mod level;
pub mod progress;
pub mod quest;
pub mod review;
pub mod streak;

use chrono::{DateTime, Utc};
use lingo_core::CoreError;
use serde::Serialize;

/// Parse an RFC 3339 timestamp, defaulting to the current time.
pub fn parse_time(value: Option<&str>) -> Result<DateTime<Utc>, CoreError> {
    match value {
        Some(raw) => parse_timestamp(raw),
        None => Ok(Utc::now()),
    }
}

pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, CoreError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| CoreError::Custom(format!("invalid timestamp '{raw}': {e}")))
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
