//! XP and level progression.
//!
//! A level table is an ordered list of contiguous `[min_xp, max_xp)` bands.
//! The final band is open-ended. Lookups never fail: negative totals are
//! treated as zero, and anything past the last boundary lands on the max level.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// A single level band.
/// Lives in the config file, so fields keep the snake_case config keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub min_xp: u64,
    /// Exclusive upper bound. `None` only on the last level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_xp: Option<u64>,
}

impl Level {
    pub fn new(name: impl Into<String>, min_xp: u64, max_xp: Option<u64>) -> Self {
        Self {
            name: name.into(),
            min_xp,
            max_xp,
        }
    }

    /// Whether `xp` falls in `[min_xp, max_xp)`.
    pub fn contains(&self, xp: u64) -> bool {
        xp >= self.min_xp && self.max_xp.map_or(true, |max| xp < max)
    }

    /// Width of the band, `None` when unbounded.
    pub fn width(&self) -> Option<u64> {
        self.max_xp.map(|max| max.saturating_sub(self.min_xp))
    }
}

/// Result of a level lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelInfo {
    /// 1-indexed position in the table
    pub level: u32,
    pub name: String,
    /// XP earned inside the current band
    pub current_xp: u64,
    /// Band width, `None` at the max level
    pub xp_for_next_level: Option<u64>,
    /// 0..=100
    pub progress: u8,
    pub is_max_level: bool,
    pub total_xp: u64,
}

/// Outcome of adding XP to a running total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpAward {
    pub previous: LevelInfo,
    pub current: LevelInfo,
    pub xp_awarded: u64,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        self.current.level > self.previous.level
    }
}

/// Ordered, contiguous table of levels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LevelTable {
    levels: Vec<Level>,
}

impl Default for LevelTable {
    fn default() -> Self {
        Self {
            levels: vec![
                Level::new("Beginner", 0, Some(100)),
                Level::new("Elementary", 100, Some(300)),
                Level::new("Intermediate", 300, Some(700)),
                Level::new("Advanced", 700, Some(1500)),
                Level::new("Fluent", 1500, None),
            ],
        }
    }
}

impl LevelTable {
    /// Build a table without checking it. Call [`LevelTable::validate`]
    /// when the levels come from outside the program.
    pub fn new(levels: Vec<Level>) -> Self {
        Self { levels }
    }

    pub fn levels(&self) -> &[Level] {
        &self.levels
    }

    pub fn max_level(&self) -> u32 {
        self.levels.len().max(1) as u32
    }

    /// Check ordering and contiguity.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] for an empty table, a table not
    /// starting at 0, a gap or overlap between neighbours, an empty band, or an
    /// unbounded level that is not the last one.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |message: String| ConfigError::InvalidValue {
            key: "levels".into(),
            message,
        };

        let first = self
            .levels
            .first()
            .ok_or_else(|| invalid("level table is empty".into()))?;
        if first.min_xp != 0 {
            return Err(invalid(format!(
                "first level '{}' must start at 0 XP, starts at {}",
                first.name, first.min_xp
            )));
        }

        for (i, level) in self.levels.iter().enumerate() {
            let is_last = i + 1 == self.levels.len();
            match (level.max_xp, self.levels.get(i + 1)) {
                (Some(max), _) if max <= level.min_xp => {
                    return Err(invalid(format!("level '{}' has an empty XP band", level.name)));
                }
                (Some(max), Some(next)) if max != next.min_xp => {
                    return Err(invalid(format!(
                        "level '{}' ends at {} but '{}' starts at {}",
                        level.name, max, next.name, next.min_xp
                    )));
                }
                (Some(_), None) => {
                    return Err(invalid(format!(
                        "last level '{}' must be unbounded",
                        level.name
                    )));
                }
                (None, _) if !is_last => {
                    return Err(invalid(format!(
                        "only the last level may be unbounded, '{}' is not last",
                        level.name
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Look up the level for a cumulative XP total.
    ///
    /// A total sitting exactly on a boundary belongs to the higher level.
    pub fn level_for_xp(&self, total_xp: i64) -> LevelInfo {
        let total_xp = total_xp.max(0) as u64;

        let (index, level) = self
            .levels
            .iter()
            .enumerate()
            .find(|(_, l)| l.contains(total_xp))
            .or_else(|| self.levels.iter().enumerate().last())
            .map(|(i, l)| (i, l.clone()))
            .unwrap_or_else(|| (0, Level::new("Beginner", 0, None)));

        let is_max_level = index + 1 >= self.levels.len() || level.max_xp.is_none();
        let current_xp = total_xp.saturating_sub(level.min_xp);
        let xp_for_next_level = if is_max_level { None } else { level.width() };

        let progress = match xp_for_next_level {
            Some(width) if width > 0 => {
                ((current_xp as f64 / width as f64) * 100.0).round().clamp(0.0, 100.0) as u8
            }
            _ => 100,
        };

        LevelInfo {
            level: index as u32 + 1,
            name: level.name,
            current_xp,
            xp_for_next_level,
            progress,
            is_max_level,
            total_xp,
        }
    }

    /// Add XP to a total. Negative awards count as zero.
    pub fn award(&self, total_xp: u64, delta: i64) -> XpAward {
        let xp_awarded = delta.max(0) as u64;
        let previous = self.level_for_xp(clamp_to_i64(total_xp));
        let current = self.level_for_xp(clamp_to_i64(total_xp.saturating_add(xp_awarded)));

        if current.level > previous.level {
            tracing::info!(
                from = previous.level,
                to = current.level,
                name = %current.name,
                "level up"
            );
        }

        XpAward {
            previous,
            current,
            xp_awarded,
        }
    }
}

fn clamp_to_i64(xp: u64) -> i64 {
    i64::try_from(xp).unwrap_or(i64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_table_is_valid() {
        assert!(LevelTable::default().validate().is_ok());
    }

    #[test]
    fn test_zero_xp_is_beginner() {
        let info = LevelTable::default().level_for_xp(0);
        assert_eq!(info.level, 1);
        assert_eq!(info.name, "Beginner");
        assert_eq!(info.progress, 0);
        assert!(!info.is_max_level);
    }

    #[test]
    fn test_reference_points() {
        let table = LevelTable::default();

        let info = table.level_for_xp(50);
        assert_eq!(info.level, 1);
        assert_eq!(info.progress, 50);
        assert_eq!(info.xp_for_next_level, Some(100));

        let info = table.level_for_xp(100);
        assert_eq!(info.level, 2);
        assert_eq!(info.current_xp, 0);
        assert_eq!(info.progress, 0);

        let info = table.level_for_xp(400);
        assert_eq!(info.level, 3);
        assert_eq!(info.current_xp, 100);
        assert_eq!(info.xp_for_next_level, Some(400));

        let info = table.level_for_xp(1000);
        assert_eq!(info.level, 4);
        assert_eq!(info.current_xp, 300);

        let info = table.level_for_xp(1500);
        assert_eq!(info.level, 5);
        assert!(info.is_max_level);
        assert_eq!(info.progress, 100);
        assert_eq!(info.xp_for_next_level, None);
    }

    #[test]
    fn test_boundary_belongs_to_higher_level() {
        let table = LevelTable::default();
        assert_eq!(table.level_for_xp(99).level, 1);
        assert_eq!(table.level_for_xp(99).progress, 99);
        assert_eq!(table.level_for_xp(300).level, 3);
        assert_eq!(table.level_for_xp(300).progress, 0);
    }

    #[test]
    fn test_negative_xp_clamps_to_zero() {
        let info = LevelTable::default().level_for_xp(-250);
        assert_eq!(info.level, 1);
        assert_eq!(info.total_xp, 0);
    }

    #[test]
    fn test_validate_rejects_gap() {
        let table = LevelTable::new(vec![
            Level::new("A", 0, Some(100)),
            Level::new("B", 150, None),
        ]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bounded_last_level() {
        let table = LevelTable::new(vec![
            Level::new("A", 0, Some(100)),
            Level::new("B", 100, Some(200)),
        ]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_unbounded_middle_level() {
        let table = LevelTable::new(vec![
            Level::new("A", 0, None),
            Level::new("B", 100, None),
        ]);
        assert!(table.validate().is_err());
    }

    #[test]
    fn test_award_reports_level_up() {
        let table = LevelTable::default();
        let award = table.award(90, 20);
        assert!(award.leveled_up());
        assert_eq!(award.current.total_xp, 110);

        let award = table.award(90, -20);
        assert!(!award.leveled_up());
        assert_eq!(award.xp_awarded, 0);
        assert_eq!(award.current.total_xp, 90);
    }
}
