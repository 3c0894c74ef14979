use clap::Args;
use lingo_core::{EngineConfig, StreakInput, StreakTracker};

#[derive(Args)]
pub struct StreakArgs {
    /// Last practice time (RFC 3339); omit for a learner with no history
    #[arg(long)]
    pub last: Option<String>,
    /// Current streak length in days
    #[arg(long, default_value = "0")]
    pub days: u32,
    /// Learner's IANA timezone
    #[arg(long, default_value = "UTC")]
    pub tz: String,
    /// Evaluation time (RFC 3339), defaults to now
    #[arg(long)]
    pub now: Option<String>,
}

pub fn run(args: StreakArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default();
    let input = StreakInput {
        last_practice_date: args
            .last
            .as_deref()
            .map(super::parse_timestamp)
            .transpose()?,
        current_streak_days: args.days,
        current_date: super::parse_time(args.now.as_deref())?,
        timezone: args.tz,
    };
    let result = StreakTracker::with_config(config.streak).calculate(&input);
    super::print_json(&result)
}
