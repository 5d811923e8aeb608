//! Standings storage.
//!
//! The pairing engine never talks to storage directly; callers hand it the
//! standings and a `has_played` capability taken from a [`StandingsStore`].
//! Two stores are provided:
//! - [`MemoryStore`]: everything in process
//! - [`JsonlStore`]: players and matches as JSON Lines files on disk

mod history;
mod jsonl;
mod jsonl_store;
mod memory;

pub use history::MatchHistory;
pub use jsonl::{Collection, JsonlReader, JsonlWriter};
pub use jsonl_store::JsonlStore;
pub use memory::MemoryStore;

use std::path::PathBuf;
use thiserror::Error;

use crate::models::{MatchRecord, Outcome, PlayerId, Standing};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown player: {0}")]
    UnknownPlayer(PlayerId),

    #[error("Player {0} cannot play against themselves")]
    SelfMatch(PlayerId),

    #[error("No player ids left to assign")]
    PlayerIdsExhausted,
}

/// Players, match results and the standings derived from them.
///
/// Implementations own their backing resources; callers hold one handle for
/// the lifetime of a tournament session.
pub trait StandingsStore {
    /// Register a new player with zero wins and matches.
    fn register_player(&mut self, name: &str) -> Result<PlayerId, StorageError>;

    /// Number of currently registered players.
    fn count_players(&self) -> Result<usize, StorageError>;

    /// All players ordered by wins descending.
    fn standings(&self) -> Result<Vec<Standing>, StorageError>;

    /// Whether `a` and `b` have met, in either seating.
    fn has_played(&self, a: PlayerId, b: PlayerId) -> Result<bool, StorageError>;

    /// The full who-played-whom relation, for in-memory lookups during a
    /// pairing search.
    fn match_history(&self) -> Result<MatchHistory, StorageError>;

    /// Record a finished match between `a` and `b`.
    fn record_match(
        &mut self,
        a: PlayerId,
        b: PlayerId,
        outcome: Outcome,
    ) -> Result<MatchRecord, StorageError>;

    /// Remove all match records. Players stay registered.
    fn reset_matches(&mut self) -> Result<(), StorageError>;

    /// Remove all players, and with them every match record.
    fn reset_players(&mut self) -> Result<(), StorageError>;
}

/// Configuration for storage paths.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
}

impl StorageConfig {
    pub fn new(data_dir: PathBuf) -> Self {
        Self { data_dir }
    }

    pub fn collection_path(&self, collection: Collection) -> PathBuf {
        self.data_dir.join(collection.filename())
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::new(PathBuf::from("./data"))
    }
}
