//! File-backed standings store.
//!
//! Players and matches live in two JSONL files under the data directory.
//! Everything is loaded at open; each mutation is written to disk before the
//! in-memory copy changes.

use tracing::info;

use super::{
    Collection, JsonlReader, JsonlWriter, MatchHistory, MemoryStore, StandingsStore,
    StorageConfig, StorageError,
};
use crate::models::{MatchRecord, Outcome, Player, PlayerId, Standing};

pub struct JsonlStore {
    players: JsonlWriter<Player>,
    matches: JsonlWriter<MatchRecord>,
    state: MemoryStore,
}

impl JsonlStore {
    /// Open the store rooted at `config.data_dir`, loading existing records.
    pub fn open(config: &StorageConfig) -> Result<Self, StorageError> {
        let players =
            JsonlReader::<Player>::for_collection(config, Collection::Players).read_all()?;
        let matches =
            JsonlReader::<MatchRecord>::for_collection(config, Collection::Matches).read_all()?;

        info!(
            "Opened store at {:?}: {} players, {} matches",
            config.data_dir,
            players.len(),
            matches.len()
        );

        Ok(Self {
            players: JsonlWriter::for_collection(config, Collection::Players),
            matches: JsonlWriter::for_collection(config, Collection::Matches),
            state: MemoryStore::from_parts(players, matches),
        })
    }
}

impl StandingsStore for JsonlStore {
    fn register_player(&mut self, name: &str) -> Result<PlayerId, StorageError> {
        let player = self.state.prepare_player(name)?;
        self.players.append(&player)?;

        let id = player.id;
        self.state.push_player(player);
        info!("Registered player {} ({})", id, name);
        Ok(id)
    }

    fn count_players(&self) -> Result<usize, StorageError> {
        self.state.count_players()
    }

    fn standings(&self) -> Result<Vec<Standing>, StorageError> {
        self.state.standings()
    }

    fn has_played(&self, a: PlayerId, b: PlayerId) -> Result<bool, StorageError> {
        self.state.has_played(a, b)
    }

    fn match_history(&self) -> Result<MatchHistory, StorageError> {
        self.state.match_history()
    }

    fn record_match(
        &mut self,
        a: PlayerId,
        b: PlayerId,
        outcome: Outcome,
    ) -> Result<MatchRecord, StorageError> {
        let record = self.state.prepare_match(a, b, outcome)?;
        self.matches.append(&record)?;
        self.state.push_match(record.clone());
        info!("Recorded match {}: {} vs {} ({})", record.id, a, b, outcome);
        Ok(record)
    }

    fn reset_matches(&mut self) -> Result<(), StorageError> {
        self.matches.write_all(&[])?;
        self.state.reset_matches()
    }

    fn reset_players(&mut self) -> Result<(), StorageError> {
        self.matches.write_all(&[])?;
        self.state.reset_matches()?;
        self.players.write_all(&[])?;
        self.state.reset_players()
    }
}
