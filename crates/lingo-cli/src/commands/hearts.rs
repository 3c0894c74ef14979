use clap::Args;
use lingo_core::{EngineConfig, HeartsInput, HeartsRegenerator};

#[derive(Args)]
pub struct HeartsArgs {
    /// Hearts left at the last loss
    #[arg(long)]
    pub current: u32,
    /// Time of the last loss (RFC 3339)
    #[arg(long)]
    pub last: Option<String>,
    /// Evaluation time (RFC 3339), defaults to now
    #[arg(long)]
    pub now: Option<String>,
}

pub fn run(args: HeartsArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default();
    let input = HeartsInput {
        current_hearts: args.current,
        max_hearts: config.hearts.max_hearts,
        last_practice_date: args
            .last
            .as_deref()
            .map(super::parse_timestamp)
            .transpose()?,
        current_date: super::parse_time(args.now.as_deref())?,
    };
    let status = HeartsRegenerator::with_config(config.hearts).calculate(&input);
    super::print_json(&status)
}
