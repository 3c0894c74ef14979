use clap::{Parser, Subcommand};
use lingo_core::CoreError;
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "lingo", version, about = "Lingo progression engine CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Level and progress for a total XP
    Level(commands::level::LevelArgs),
    /// Streak continuation for a practice at a given time
    Streak(commands::streak::StreakArgs),
    /// Hearts available after regeneration
    Hearts(commands::hearts::HeartsArgs),
    /// Schedule the next review of a vocabulary item
    Review(commands::review::ReviewArgs),
    /// Daily quests
    Quest {
        #[command(subcommand)]
        action: commands::quest::QuestAction,
    },
    /// Stored learner progress
    Progress {
        #[command(subcommand)]
        action: commands::progress::ProgressAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("LINGO_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Level(args) => commands::level::run(args),
        Commands::Streak(args) => commands::streak::run(args),
        Commands::Hearts(args) => commands::hearts::run(args),
        Commands::Review(args) => commands::review::run(args),
        Commands::Quest { action } => commands::quest::run(action),
        Commands::Progress { action } => commands::progress::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        let retryable = e
            .downcast_ref::<CoreError>()
            .is_some_and(CoreError::is_retryable);
        if retryable {
            eprintln!("error: {e} (retry the command)");
            std::process::exit(2);
        }
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
