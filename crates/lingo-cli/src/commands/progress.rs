use clap::Subcommand;
use lingo_core::progress::{finish_session, record_wrong_answer, refill_hearts};
use lingo_core::{
    EngineConfig, HeartsRegenerator, ProgressStore, SessionSummary, StreakTracker, UserProgress,
};

pub const DEFAULT_USER: &str = "local";

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Print the stored record with derived level, streak and hearts
    Show {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Record a finished practice session
    Practice {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
        /// XP earned in the session
        #[arg(long, allow_hyphen_values = true)]
        xp: i64,
        /// Correct answers given
        #[arg(long, default_value = "1")]
        correct: u32,
        /// Answers given
        #[arg(long, default_value = "1")]
        total: u32,
        /// IANA timezone for a learner seen for the first time
        #[arg(long, default_value = "UTC")]
        tz: String,
    },
    /// Spend a heart for a wrong answer
    LoseHeart {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Restore all hearts
    Refill {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
    /// Forget a learner
    Delete {
        #[arg(long, default_value = DEFAULT_USER)]
        user: String,
    },
}

pub fn new_learner(config: &EngineConfig, tz: &str) -> UserProgress {
    UserProgress::new(config, tz)
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load()?;
    let mut store = ProgressStore::open_default()?;
    let now = chrono::Utc::now();

    match action {
        ProgressAction::Show { user } => {
            let Some(row) = store.load(&user)? else {
                eprintln!("no progress recorded for {user}");
                std::process::exit(1);
            };
            let p = &row.progress;
            let level = config.levels.level_for_xp(p.total_xp.min(i64::MAX as u64) as i64);
            let streak =
                StreakTracker::with_config(config.streak.clone()).current_status(&p.streak, now);
            let hearts =
                HeartsRegenerator::with_config(config.hearts.clone()).status(&p.hearts, now);
            super::print_json(&serde_json::json!({
                "userId": user,
                "version": row.version,
                "level": level,
                "streak": streak,
                "hearts": hearts,
                "progress": p,
            }))?;
        }
        ProgressAction::Practice {
            user,
            xp,
            correct,
            total,
            tz,
        } => {
            let summary = SessionSummary {
                xp_earned: xp,
                correct_answers: correct,
                total_answers: total,
            };
            let (next, events) = store.modify(
                &user,
                || new_learner(&config, &tz),
                |p| finish_session(p, &summary, &config, now),
            )?;
            tracing::debug!(user = %user, events = events.len(), "practice recorded");
            super::print_json(&serde_json::json!({ "progress": next, "events": events }))?;
        }
        ProgressAction::LoseHeart { user } => {
            let (next, event) = store.modify(
                &user,
                || new_learner(&config, "UTC"),
                |p| record_wrong_answer(p, &config, now),
            )?;
            super::print_json(&serde_json::json!({ "progress": next, "events": [event] }))?;
        }
        ProgressAction::Refill { user } => {
            let (next, event) = store.modify(
                &user,
                || new_learner(&config, "UTC"),
                |p| refill_hearts(p, &config, now),
            )?;
            super::print_json(&serde_json::json!({ "progress": next, "events": [event] }))?;
        }
        ProgressAction::Delete { user } => {
            if store.delete(&user)? {
                println!("deleted {user}");
            } else {
                println!("no progress recorded for {user}");
            }
        }
    }
    Ok(())
}
