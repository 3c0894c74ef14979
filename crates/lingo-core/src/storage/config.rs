//! TOML-based engine configuration.
//!
//! Every tuning constant of the progression engine lives here:
//! - the level table
//! - streak status thresholds
//! - heart limits and regeneration speed
//! - adaptive-difficulty window and thresholds
//! - the SRS interval table
//! - the daily quest pool
//!
//! Configuration is stored at `~/.config/lingo/config.toml`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::data_dir;
use crate::adaptive::AdaptiveConfig;
use crate::error::{ConfigError, Result};
use crate::hearts::HeartsConfig;
use crate::levels::LevelTable;
use crate::quest::Quest;
use crate::srs::SrsConfig;
use crate::streak::StreakConfig;

/// Daily quest settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestsConfig {
    #[serde(default = "default_daily_count")]
    pub daily_count: usize,
    #[serde(default = "default_quest_pool")]
    pub pool: Vec<Quest>,
}

fn default_daily_count() -> usize {
    3
}

fn default_quest_pool() -> Vec<Quest> {
    vec![
        Quest::new("earn-xp", "Earn 50 XP", 50).with_rewards(10, 5),
        Quest::new("finish-lessons", "Finish 3 lessons", 3).with_rewards(15, 5),
        Quest::new("perfect-lesson", "Finish a lesson without mistakes", 1).with_rewards(20, 10),
        Quest::new("review-words", "Review 20 words", 20).with_rewards(15, 5),
        Quest::new("listening", "Complete 5 listening exercises", 5).with_rewards(10, 5),
    ]
}

impl Default for QuestsConfig {
    fn default() -> Self {
        Self {
            daily_count: default_daily_count(),
            pool: default_quest_pool(),
        }
    }
}

/// Engine configuration.
///
/// Serialized to/from TOML at `~/.config/lingo/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    #[serde(default)]
    pub streak: StreakConfig,
    #[serde(default)]
    pub hearts: HeartsConfig,
    #[serde(default)]
    pub adaptive: AdaptiveConfig,
    #[serde(default)]
    pub srs: SrsConfig,
    #[serde(default)]
    pub quests: QuestsConfig,
    #[serde(default)]
    pub levels: LevelTable,
}

impl EngineConfig {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = match current {
                serde_json::Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
                other => other.get(part)?,
            };
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> std::result::Result<(), ConfigError> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let bad_value = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().map_or(true, |p| p.is_empty()) {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            let slot = match current {
                serde_json::Value::Array(items) => part
                    .parse::<usize>()
                    .ok()
                    .and_then(|i| items.get_mut(i))
                    .ok_or_else(unknown)?,
                serde_json::Value::Object(obj) => obj.get_mut(part).ok_or_else(unknown)?,
                _ => return Err(unknown()),
            };

            if is_leaf {
                let new_value = match slot {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value.parse::<bool>().map_err(|e| bad_value(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| {
                                    bad_value(format!("cannot parse '{value}' as number"))
                                })?
                        } else {
                            return Err(bad_value(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| bad_value(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };
                *slot = new_value;
                return Ok(());
            }

            current = slot;
        }

        Err(unknown())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Check every table and threshold.
    ///
    /// # Errors
    /// Returns the first [`ConfigError::InvalidValue`] found.
    pub fn validate(&self) -> std::result::Result<(), ConfigError> {
        self.levels.validate()?;
        self.srs.validate()?;
        self.adaptive.validate()?;

        let invalid = |key: &str, message: &str| ConfigError::InvalidValue {
            key: key.into(),
            message: message.into(),
        };
        if self.hearts.max_hearts == 0 {
            return Err(invalid("hearts.max_hearts", "must be at least 1"));
        }
        if self.hearts.regen_minutes == 0 {
            return Err(invalid("hearts.regen_minutes", "must be at least 1"));
        }
        if self.streak.at_risk_hours > self.streak.perfect_hours {
            return Err(invalid(
                "streak.at_risk_hours",
                "must not exceed streak.perfect_hours",
            ));
        }
        if self.quests.pool.iter().any(|q| q.target == 0) {
            return Err(invalid("quests.pool", "quest targets must be at least 1"));
        }
        Ok(())
    }

    /// Load from disk or return default.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed or is
    /// invalid, or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            Ok(cfg)
        }
    }

    /// Load and validate a config file.
    ///
    /// # Errors
    /// Returns [`ConfigError::LoadFailed`] if the file cannot be read,
    /// [`ConfigError::ParseFailed`] for malformed TOML, or a validation error.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let cfg: EngineConfig = toml::from_str(&content).map_err(ConfigError::from)?;
        cfg.validate()?;
        tracing::debug!(path = %path.display(), "loaded engine config");
        Ok(cfg)
    }

    /// Persist to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    /// Persist to a specific file.
    ///
    /// # Errors
    /// Returns [`ConfigError::SaveFailed`] on serialization or write failure.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    ///
    /// Array elements are addressed by index, e.g. `srs.intervals_days.2`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by key without saving. The result must still validate.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed, or
    /// the updated config is invalid.
    pub fn update(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: EngineConfig = serde_json::from_value(json)?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value by key and save.
    ///
    /// # Errors
    ///
    /// Returns an error if the update is rejected or the config cannot be saved.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.update(key, value)?;
        self.save()
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}
