//! Tournament session: one store handle plus the pairing engine.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use rand::Rng;
use thiserror::Error;
use tracing::{info, warn};

use crate::config::PairingConfig;
use crate::models::{MatchRecord, Outcome, PlayerId, RoundPairings, Standing};
use crate::pairing::{
    adjacent_pairings, compute_pairings, compute_pairings_with_abort, validate_standings,
    PairingError,
};
use crate::storage::{StandingsStore, StorageError};

/// Errors surfaced by tournament operations.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Pairing(#[from] PairingError),

    #[error("Pairing worker failed: {0}")]
    Worker(String),
}

/// A running tournament backed by a [`StandingsStore`].
pub struct Tournament<S> {
    store: S,
    config: PairingConfig,
}

impl<S: StandingsStore> Tournament<S> {
    pub fn new(store: S, config: PairingConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn register_player(&mut self, name: &str) -> Result<PlayerId, TournamentError> {
        Ok(self.store.register_player(name)?)
    }

    pub fn count_players(&self) -> Result<usize, TournamentError> {
        Ok(self.store.count_players()?)
    }

    pub fn standings(&self) -> Result<Vec<Standing>, TournamentError> {
        Ok(self.store.standings()?)
    }

    /// Record a decisive result.
    pub fn report_match(
        &mut self,
        winner: PlayerId,
        loser: PlayerId,
    ) -> Result<MatchRecord, TournamentError> {
        Ok(self.store.record_match(winner, loser, Outcome::FirstWins)?)
    }

    /// Record a drawn match. Neither player gains a win.
    pub fn report_draw(
        &mut self,
        a: PlayerId,
        b: PlayerId,
    ) -> Result<MatchRecord, TournamentError> {
        Ok(self.store.record_match(a, b, Outcome::Draw)?)
    }

    pub fn reset_matches(&mut self) -> Result<(), TournamentError> {
        Ok(self.store.reset_matches()?)
    }

    pub fn reset_players(&mut self) -> Result<(), TournamentError> {
        Ok(self.store.reset_players()?)
    }

    /// Pair the next round. Match history is fetched once up front so the
    /// search never goes back to the store.
    pub fn pairings<R>(&self, rng: &mut R) -> Result<RoundPairings, TournamentError>
    where
        R: Rng + ?Sized,
    {
        let standings = self.store.standings()?;
        let history = self.store.match_history()?;

        Ok(compute_pairings(&standings, |a, b| history.has_played(a, b), rng)?)
    }

    /// Pair the next round on a blocking worker, giving the search at most
    /// `search_timeout_ms`. When time runs out the search is aborted and the
    /// round is paired by standings.
    pub async fn pairings_with_timeout<R>(&self, rng: R) -> Result<RoundPairings, TournamentError>
    where
        R: Rng + Send + 'static,
    {
        let standings = self.store.standings()?;
        let history = self.store.match_history()?;
        validate_standings(&standings)?;

        let abort = Arc::new(AtomicBool::new(false));
        let worker_abort = Arc::clone(&abort);
        let worker_standings = standings.clone();

        let worker = tokio::task::spawn_blocking(move || {
            let mut rng = rng;
            compute_pairings_with_abort(
                &worker_standings,
                |a, b| history.has_played(a, b),
                &mut rng,
                Some(worker_abort.as_ref()),
            )
        });

        match tokio::time::timeout(self.config.search_timeout(), worker).await {
            Ok(Ok(result)) => Ok(result?),
            Ok(Err(e)) => Err(TournamentError::Worker(e.to_string())),
            Err(_) => {
                abort.store(true, Ordering::Relaxed);
                warn!(
                    "Pairing search exceeded {}ms, pairing by standings",
                    self.config.search_timeout_ms
                );
                let round = adjacent_pairings(&standings);
                info!("Paired {} players by standings", standings.len());
                Ok(round)
            }
        }
    }
}
