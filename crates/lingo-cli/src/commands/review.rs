use clap::Args;
use lingo_core::{EngineConfig, SrsScheduler};

#[derive(Args)]
pub struct ReviewArgs {
    /// Current mastery box (0-5; out-of-range values are clamped)
    #[arg(long, allow_hyphen_values = true)]
    pub mastery: i32,
    /// The answer was wrong
    #[arg(long)]
    pub wrong: bool,
    /// Review time (RFC 3339), defaults to now
    #[arg(long)]
    pub now: Option<String>,
}

pub fn run(args: ReviewArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default();
    let now = super::parse_time(args.now.as_deref())?;
    let update = SrsScheduler::with_config(config.srs).schedule(args.mastery, !args.wrong, now);
    super::print_json(&update)
}
