//! Configuration and persistence adapters.
//!
//! The calculators never touch these; the calling layer loads configuration,
//! reads a record, runs the pure functions and writes the result back.

mod cache;
mod config;
mod kv;
mod progress_db;

pub use cache::LocalCache;
pub use config::{EngineConfig, QuestsConfig};
pub use kv::{KeyValueStore, MemoryStore, SqliteKvStore};
pub use progress_db::{ProgressStore, VersionedProgress};

use std::path::PathBuf;

use crate::error::Result;

/// Returns `~/.config/lingo[-dev]/` based on LINGO_ENV.
///
/// Set LINGO_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("LINGO_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("lingo-dev")
    } else {
        base_dir.join("lingo")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
