//! In-process standings store.

use tracing::{debug, info};

use super::{MatchHistory, StandingsStore, StorageError};
use crate::models::{tally_standings, MatchRecord, Outcome, Player, PlayerId, Standing};

/// A [`StandingsStore`] that keeps players and matches in memory.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    players: Vec<Player>,
    matches: Vec<MatchRecord>,
    /// `None` once every `u32` id has been handed out.
    next_id: Option<PlayerId>,
    next_sequence: usize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            players: Vec::new(),
            matches: Vec::new(),
            next_id: Some(PlayerId::new(1)),
            next_sequence: 0,
        }
    }

    /// Rebuild a store from previously persisted players and matches.
    pub fn from_parts(players: Vec<Player>, matches: Vec<MatchRecord>) -> Self {
        let next_id = players
            .iter()
            .map(|p| p.id)
            .max()
            .map_or(Some(PlayerId::new(1)), |id| id.next());
        let next_sequence = matches
            .iter()
            .map(|m| m.sequence + 1)
            .max()
            .unwrap_or(0);

        Self {
            players,
            matches,
            next_id,
            next_sequence,
        }
    }

    pub fn matches(&self) -> &[MatchRecord] {
        &self.matches
    }

    fn contains(&self, id: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == id)
    }

    /// Build the next player without registering it.
    pub(crate) fn prepare_player(&self, name: &str) -> Result<Player, StorageError> {
        let id = self.next_id.ok_or(StorageError::PlayerIdsExhausted)?;
        Ok(Player::new(id, name))
    }

    pub(crate) fn push_player(&mut self, player: Player) {
        self.next_id = player.id.next();
        self.players.push(player);
    }

    /// Validate and build a match record without storing it.
    pub(crate) fn prepare_match(
        &self,
        a: PlayerId,
        b: PlayerId,
        outcome: Outcome,
    ) -> Result<MatchRecord, StorageError> {
        if a == b {
            return Err(StorageError::SelfMatch(a));
        }
        for id in [a, b] {
            if !self.contains(id) {
                return Err(StorageError::UnknownPlayer(id));
            }
        }
        Ok(MatchRecord::new(a, b, outcome, self.next_sequence))
    }

    pub(crate) fn push_match(&mut self, record: MatchRecord) {
        self.next_sequence = record.sequence + 1;
        self.matches.push(record);
    }
}

impl StandingsStore for MemoryStore {
    fn register_player(&mut self, name: &str) -> Result<PlayerId, StorageError> {
        let player = self.prepare_player(name)?;
        let id = player.id;
        self.push_player(player);
        info!("Registered player {} ({})", id, name);
        Ok(id)
    }

    fn count_players(&self) -> Result<usize, StorageError> {
        Ok(self.players.len())
    }

    fn standings(&self) -> Result<Vec<Standing>, StorageError> {
        Ok(tally_standings(&self.players, &self.matches))
    }

    fn has_played(&self, a: PlayerId, b: PlayerId) -> Result<bool, StorageError> {
        Ok(self.matches.iter().any(|m| m.is_between(a, b)))
    }

    fn match_history(&self) -> Result<MatchHistory, StorageError> {
        Ok(MatchHistory::from_records(&self.matches))
    }

    fn record_match(
        &mut self,
        a: PlayerId,
        b: PlayerId,
        outcome: Outcome,
    ) -> Result<MatchRecord, StorageError> {
        let record = self.prepare_match(a, b, outcome)?;
        self.push_match(record.clone());
        debug!("Recorded match {}: {} vs {} ({})", record.id, a, b, outcome);
        Ok(record)
    }

    fn reset_matches(&mut self) -> Result<(), StorageError> {
        info!("Clearing {} match records", self.matches.len());
        self.matches.clear();
        self.next_sequence = 0;
        Ok(())
    }

    fn reset_players(&mut self) -> Result<(), StorageError> {
        info!(
            "Clearing {} players and {} match records",
            self.players.len(),
            self.matches.len()
        );
        self.players.clear();
        self.matches.clear();
        self.next_sequence = 0;
        Ok(())
    }
}
