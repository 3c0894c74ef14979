use clap::Args;
use lingo_core::EngineConfig;

#[derive(Args)]
pub struct LevelArgs {
    /// Cumulative XP (negative values count as 0)
    #[arg(allow_hyphen_values = true)]
    pub xp: i64,
    /// Also report the award of this much XP on top of `xp`
    #[arg(long, allow_hyphen_values = true)]
    pub award: Option<i64>,
}

pub fn run(args: LevelArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::load_or_default();
    match args.award {
        Some(delta) => {
            let award = config.levels.award(args.xp.max(0) as u64, delta);
            super::print_json(&serde_json::json!({
                "previous": award.previous,
                "current": award.current,
                "xpAwarded": award.xp_awarded,
                "leveledUp": award.leveled_up(),
            }))
        }
        None => super::print_json(&config.levels.level_for_xp(args.xp)),
    }
}
