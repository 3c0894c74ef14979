use clap::Subcommand;
use lingo_core::progress::{advance_quest, assign_quests};
use lingo_core::{CoreError, EngineConfig, ProgressStore, QuestAssigner};
use rand::SeedableRng;
use rand_pcg::Pcg64Mcg;

use super::progress::{new_learner, DEFAULT_USER};

#[derive(Subcommand)]
pub enum QuestAction {
    /// List the configured quest pool
    List,
    /// Assign today's quests to a learner
    Assign {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        /// Seed for a reproducible pick
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Add progress to a quest
    Advance {
        /// Quest id from the pool
        id: String,
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        delta: i64,
    },
}

pub fn run(action: QuestAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;

    match action {
        QuestAction::List => super::print_json(&config.quests.pool)?,
        QuestAction::Assign { user, seed } => {
            let mut rng = match seed {
                Some(seed) => Pcg64Mcg::seed_from_u64(seed),
                None => Pcg64Mcg::from_entropy(),
            };
            let assigner = QuestAssigner::new(config.quests.daily_count);
            let now = chrono::Utc::now();
            let mut store = ProgressStore::open_default()?;

            let (_, assignments) = store.modify(
                &user,
                || new_learner(&config, "UTC"),
                |p| assign_quests(p, &assigner, &config.quests.pool, &mut rng, now),
            )?;
            super::print_json(&assignments)?;
        }
        QuestAction::Advance { id, user, delta } => {
            let quest = config
                .quests
                .pool
                .iter()
                .find(|q| q.id == id)
                .cloned()
                .ok_or_else(|| CoreError::Custom(format!("unknown quest: {id}")))?;
            let now = chrono::Utc::now();
            let mut store = ProgressStore::open_default()?;

            let (next, (update, events)) = store.modify(
                &user,
                || new_learner(&config, "UTC"),
                |p| {
                    let (next, update, events) = advance_quest(p, &quest, delta, &config, now);
                    (next, (update, events))
                },
            )?;
            super::print_json(&serde_json::json!({
                "update": update,
                "events": events,
                "totalXp": next.total_xp,
                "currency": next.currency,
            }))?;
        }
    }
    Ok(())
}
