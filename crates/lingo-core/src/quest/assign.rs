//! Random quest assignment with an injected random source.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::progress::{Quest, QuestProgress};

/// A quest handed to a learner, with fresh progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestAssignment {
    pub assignment_id: Uuid,
    pub quest: Quest,
    pub progress: QuestProgress,
    pub assigned_at: DateTime<Utc>,
}

/// Picks quests from a pool.
#[derive(Debug, Clone)]
pub struct QuestAssigner {
    per_day: usize,
}

impl QuestAssigner {
    pub fn new(per_day: usize) -> Self {
        Self { per_day }
    }

    pub fn per_day(&self) -> usize {
        self.per_day
    }

    /// Choose up to `per_day` distinct quests, skipping ids already active.
    ///
    /// The result is ordered as in the pool so that a seeded generator gives
    /// the same list every time.
    pub fn assign<R: Rng + ?Sized>(
        &self,
        pool: &[Quest],
        active_ids: &HashSet<String>,
        rng: &mut R,
        now: DateTime<Utc>,
    ) -> Vec<QuestAssignment> {
        let candidates: Vec<(usize, &Quest)> = pool
            .iter()
            .enumerate()
            .filter(|(_, q)| !active_ids.contains(&q.id))
            .collect();

        let mut chosen: Vec<(usize, &Quest)> = candidates
            .choose_multiple(rng, self.per_day)
            .copied()
            .collect();
        chosen.sort_by_key(|(i, _)| *i);

        chosen
            .into_iter()
            .map(|(_, quest)| QuestAssignment {
                assignment_id: Uuid::new_v4(),
                quest: quest.clone(),
                progress: QuestProgress::new(quest),
                assigned_at: now,
            })
            .collect()
    }
}

impl Default for QuestAssigner {
    fn default() -> Self {
        Self::new(3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn pool() -> Vec<Quest> {
        (1..=8)
            .map(|i| Quest::new(format!("q{i}"), format!("Quest {i}"), i))
            .collect()
    }

    fn ids(assignments: &[QuestAssignment]) -> Vec<String> {
        assignments.iter().map(|a| a.quest.id.clone()).collect()
    }

    #[test]
    fn test_same_seed_same_quests() {
        let assigner = QuestAssigner::default();
        let now = Utc::now();
        let a = assigner.assign(&pool(), &HashSet::new(), &mut Mcg128Xsl64::seed_from_u64(42), now);
        let b = assigner.assign(&pool(), &HashSet::new(), &mut Mcg128Xsl64::seed_from_u64(42), now);
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.len(), 3);
    }

    #[test]
    fn test_assignments_are_distinct_and_fresh() {
        let assigner = QuestAssigner::new(5);
        let assigned = assigner.assign(
            &pool(),
            &HashSet::new(),
            &mut Mcg128Xsl64::seed_from_u64(1),
            Utc::now(),
        );
        let unique: HashSet<String> = ids(&assigned).into_iter().collect();
        assert_eq!(unique.len(), 5);
        assert!(assigned.iter().all(|a| a.progress.progress == 0));
    }

    #[test]
    fn test_skips_active_quests() {
        let assigner = QuestAssigner::new(8);
        let active: HashSet<String> = ["q1", "q2"].iter().map(|s| s.to_string()).collect();
        let mut rng = Mcg128Xsl64::seed_from_u64(3);
        let assigned = assigner.assign(&pool(), &active, &mut rng, Utc::now());
        assert_eq!(assigned.len(), 6);
        assert!(assigned.iter().all(|a| !active.contains(&a.quest.id)));
    }
}
