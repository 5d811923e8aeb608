//! Swiss pairing engine.
//!
//! Given the current standings and a way to ask whether two players have
//! already met, produces the next round's pairings:
//!
//! 1. No matches played yet: a uniformly random draw using the caller's RNG.
//! 2. Otherwise: a backtracking search, in standings order, for a matching
//!    with no rematches.
//! 3. If no such matching exists: neighbours in the standings are paired
//!    (first with second, third with fourth, ...). Rematches may occur. This
//!    is a normal result, reported as [`PairingMethod::AdjacentFallback`].
//!
//! The engine never mutates standings or history.

mod search;

pub use search::{ConflictMatrix, MatchingSearch, SearchOutcome};

use std::collections::HashSet;
use std::sync::atomic::AtomicBool;

use rand::seq::SliceRandom;
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{total_matches, Pairing, PairingMethod, PlayerId, RoundPairings, Standing};

/// Errors that prevent a round from being paired.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PairingError {
    #[error("Configuration error: cannot pair an odd number of players ({count})")]
    OddPlayerCount { count: usize },

    #[error("Configuration error: player {0} appears more than once in the standings")]
    DuplicatePlayer(PlayerId),
}

/// Check that `standings` can be split into pairs.
pub fn validate_standings(standings: &[Standing]) -> Result<(), PairingError> {
    if standings.len() % 2 != 0 {
        return Err(PairingError::OddPlayerCount {
            count: standings.len(),
        });
    }

    let mut seen = HashSet::with_capacity(standings.len());
    for standing in standings {
        if !seen.insert(standing.id) {
            return Err(PairingError::DuplicatePlayer(standing.id));
        }
    }

    Ok(())
}

/// Compute the next round's pairings.
///
/// `standings` must be ordered by wins descending, as returned by
/// [`StandingsStore::standings`](crate::storage::StandingsStore::standings).
/// `has_played` must be symmetric.
pub fn compute_pairings<F, R>(
    standings: &[Standing],
    has_played: F,
    rng: &mut R,
) -> Result<RoundPairings, PairingError>
where
    F: Fn(PlayerId, PlayerId) -> bool,
    R: Rng + ?Sized,
{
    compute_pairings_with_abort(standings, has_played, rng, None)
}

/// [`compute_pairings`], with a flag that cuts the search short.
///
/// An aborted search is treated like an exhausted one.
pub fn compute_pairings_with_abort<F, R>(
    standings: &[Standing],
    has_played: F,
    rng: &mut R,
    abort: Option<&AtomicBool>,
) -> Result<RoundPairings, PairingError>
where
    F: Fn(PlayerId, PlayerId) -> bool,
    R: Rng + ?Sized,
{
    validate_standings(standings)?;

    if total_matches(standings) == 0 {
        let round = random_pairings(standings, rng);
        info!("Paired {} players at random for the first round", standings.len());
        return Ok(round);
    }

    let conflicts = ConflictMatrix::build(standings.len(), |i, j| {
        has_played(standings[i].id, standings[j].id)
    });

    let mut search = MatchingSearch::new(&conflicts).with_abort(abort);
    match search.run() {
        SearchOutcome::Found(indices) => {
            let pairs = indices
                .into_iter()
                .map(|(i, j)| Pairing::new(&standings[i], &standings[j]))
                .collect();
            info!(
                "Found rematch-free pairings for {} players ({} nodes)",
                standings.len(),
                search.nodes()
            );
            Ok(RoundPairings::new(pairs, PairingMethod::RematchFree))
        }
        SearchOutcome::Exhausted => {
            warn!(
                "No rematch-free pairing exists for {} players, pairing by standings",
                standings.len()
            );
            Ok(adjacent_pairings(standings))
        }
        SearchOutcome::Aborted => {
            warn!(
                "Pairing search aborted after {} nodes, pairing by standings",
                search.nodes()
            );
            Ok(adjacent_pairings(standings))
        }
    }
}

/// Pair neighbours in standings order. May contain rematches.
pub fn adjacent_pairings(standings: &[Standing]) -> RoundPairings {
    let pairs = standings
        .chunks_exact(2)
        .map(|pair| Pairing::new(&pair[0], &pair[1]))
        .collect();
    RoundPairings::new(pairs, PairingMethod::AdjacentFallback)
}

/// Shuffle the field and pair consecutive players.
pub fn random_pairings<R: Rng + ?Sized>(standings: &[Standing], rng: &mut R) -> RoundPairings {
    let mut order: Vec<&Standing> = standings.iter().collect();
    order.shuffle(rng);
    debug!(
        "Bootstrap draw order: {:?}",
        order.iter().map(|s| s.id.get()).collect::<Vec<_>>()
    );

    let pairs = order
        .chunks_exact(2)
        .map(|pair| Pairing::new(pair[0], pair[1]))
        .collect();
    RoundPairings::new(pairs, PairingMethod::RandomBootstrap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MatchHistory;
    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn id(n: u32) -> PlayerId {
        PlayerId::new(n)
    }

    /// Standings for players `1..=count`, all having played `matches`.
    fn field(count: u32, matches: u32) -> Vec<Standing> {
        (1..=count)
            .map(|n| Standing::new(id(n), format!("Player {}", n), 0, matches))
            .collect()
    }

    fn history(pairs: &[(u32, u32)]) -> MatchHistory {
        pairs.iter().map(|&(a, b)| (id(a), id(b))).collect()
    }

    fn assert_covers_once(round: &RoundPairings, standings: &[Standing]) {
        let mut seated = round.player_ids();
        seated.sort();
        let mut expected: Vec<PlayerId> = standings.iter().map(|s| s.id).collect();
        expected.sort();
        assert_eq!(seated, expected);
    }

    fn rematches(round: &RoundPairings, history: &MatchHistory) -> usize {
        round
            .pairs
            .iter()
            .filter(|p| history.has_played(p.id1, p.id2))
            .count()
    }

    /// Brute force: does any ordering of the field pair up without rematches?
    fn rematch_free_exists(ids: &[PlayerId], history: &MatchHistory) -> bool {
        fn go(rest: &mut Vec<PlayerId>, history: &MatchHistory) -> bool {
            if rest.is_empty() {
                return true;
            }
            let p = rest.remove(0);
            for k in 0..rest.len() {
                let q = rest.remove(k);
                let ok = !history.has_played(p, q) && go(rest, history);
                rest.insert(k, q);
                if ok {
                    rest.insert(0, p);
                    return true;
                }
            }
            rest.insert(0, p);
            false
        }
        go(&mut ids.to_vec(), history)
    }

    #[test]
    fn test_first_round_covers_every_player() {
        let standings = field(4, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(7);

        let round = compute_pairings(&standings, |_, _| false, &mut rng).unwrap();
        assert_eq!(round.method, PairingMethod::RandomBootstrap);
        assert_eq!(round.len(), 2);
        assert_covers_once(&round, &standings);
    }

    #[test]
    fn test_first_round_is_reproducible_with_seed() {
        let standings = field(16, 0);
        let a = compute_pairings(&standings, |_, _| false, &mut ChaCha8Rng::seed_from_u64(42));
        let b = compute_pairings(&standings, |_, _| false, &mut ChaCha8Rng::seed_from_u64(42));
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_round_varies_with_seed() {
        let standings = field(16, 0);
        let draws: HashSet<Vec<PlayerId>> = (0..10)
            .map(|seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                compute_pairings(&standings, |_, _| false, &mut rng)
                    .unwrap()
                    .player_ids()
            })
            .collect();
        assert!(draws.len() > 1);
    }

    #[test]
    fn test_first_round_ignores_history_query() {
        let standings = field(4, 0);
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let round = compute_pairings(
            &standings,
            |_, _| panic!("history is not consulted in the first round"),
            &mut rng,
        )
        .unwrap();
        assert_covers_once(&round, &standings);
    }

    #[test]
    fn test_avoids_rematches_from_previous_round() {
        let standings = field(4, 1);
        let history = history(&[(1, 2), (3, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
            .unwrap();

        assert_eq!(round.method, PairingMethod::RematchFree);
        assert_covers_once(&round, &standings);
        assert_eq!(rematches(&round, &history), 0);
        assert!(
            round.pairs[0].is_between(id(1), id(3)) || round.pairs[0].is_between(id(1), id(4))
        );
    }

    #[test]
    fn test_search_follows_standings_order() {
        let standings = vec![
            Standing::new(id(3), "C", 2, 2),
            Standing::new(id(1), "A", 1, 2),
            Standing::new(id(4), "D", 1, 2),
            Standing::new(id(2), "B", 0, 2),
        ];
        let history = history(&[(3, 1), (4, 2), (3, 2), (1, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
            .unwrap();

        assert_eq!(round.method, PairingMethod::RematchFree);
        assert_eq!(
            round.into_tuples(),
            vec![
                (id(3), "C".to_string(), id(4), "D".to_string()),
                (id(1), "A".to_string(), id(2), "B".to_string()),
            ]
        );
    }

    #[test]
    fn test_full_round_robin_falls_back_to_adjacent() {
        let standings = field(4, 3);
        let history = history(&[(1, 2), (1, 3), (1, 4), (2, 3), (2, 4), (3, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
            .unwrap();

        assert_eq!(round.method, PairingMethod::AdjacentFallback);
        assert_covers_once(&round, &standings);
        assert!(round.pairs[0].is_between(id(1), id(2)));
        assert!(round.pairs[1].is_between(id(3), id(4)));
    }

    #[test]
    fn test_fallback_when_one_player_met_everyone() {
        // Player 1 has met 2, 3 and 4; no rematch-free matching exists even
        // though 2, 3 and 4 have not all met each other.
        let standings = field(4, 1);
        let history = history(&[(1, 2), (1, 3), (1, 4)]);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
            .unwrap();
        assert_eq!(round.method, PairingMethod::AdjacentFallback);
        assert_covers_once(&round, &standings);
    }

    #[test]
    fn test_odd_field_is_rejected() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        for matches in [0, 1] {
            let err = compute_pairings(&field(5, matches), |_, _| false, &mut rng).unwrap_err();
            assert_eq!(err, PairingError::OddPlayerCount { count: 5 });
        }
    }

    #[test]
    fn test_duplicate_player_is_rejected() {
        let mut standings = field(3, 1);
        standings.push(Standing::new(id(2), "Player 2", 0, 1));
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let err = compute_pairings(&standings, |_, _| false, &mut rng).unwrap_err();
        assert_eq!(err, PairingError::DuplicatePlayer(id(2)));
    }

    #[test]
    fn test_empty_field_yields_no_pairs() {
        let mut rng = ChaCha8Rng::seed_from_u64(0);
        let round = compute_pairings(&[], |_, _| false, &mut rng).unwrap();
        assert!(round.is_empty());
    }

    #[test]
    fn test_repeated_search_is_deterministic() {
        let standings = field(8, 2);
        let history = history(&[(1, 2), (3, 4), (5, 6), (7, 8), (1, 3), (2, 4)]);

        let a = compute_pairings(
            &standings,
            |a, b| history.has_played(a, b),
            &mut ChaCha8Rng::seed_from_u64(1),
        )
        .unwrap();
        let b = compute_pairings(
            &standings,
            |a, b| history.has_played(a, b),
            &mut ChaCha8Rng::seed_from_u64(2),
        )
        .unwrap();

        assert_eq!(a, b);
        assert_eq!(a.method, PairingMethod::RematchFree);
    }

    #[test]
    fn test_abort_flag_forces_fallback() {
        let standings = field(4, 1);
        let history = history(&[(1, 2), (3, 4)]);
        let flag = AtomicBool::new(true);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings_with_abort(
            &standings,
            |a, b| history.has_played(a, b),
            &mut rng,
            Some(&flag),
        )
        .unwrap();
        assert_eq!(round.method, PairingMethod::AdjacentFallback);
        assert_covers_once(&round, &standings);
    }

    #[test]
    fn test_matches_brute_force_on_random_histories() {
        let mut rng = ChaCha8Rng::seed_from_u64(2024);
        let standings = field(6, 1);
        let ids: Vec<PlayerId> = standings.iter().map(|s| s.id).collect();

        for _ in 0..200 {
            let mut met = Vec::new();
            for a in 1..=6u32 {
                for b in (a + 1)..=6 {
                    if rng.gen_bool(0.45) {
                        met.push((a, b));
                    }
                }
            }
            let history = history(&met);

            let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
                .unwrap();

            assert_covers_once(&round, &standings);
            if rematch_free_exists(&ids, &history) {
                assert_eq!(round.method, PairingMethod::RematchFree, "history {:?}", met);
                assert_eq!(rematches(&round, &history), 0);
            } else {
                assert_eq!(round.method, PairingMethod::AdjacentFallback);
            }
        }
    }

    #[test]
    fn test_larger_field_after_several_rounds() {
        // 12 players, 4 rounds of a rotating schedule already played.
        let standings = field(12, 4);
        let mut met = Vec::new();
        for round in 1..=4u32 {
            for a in 1..=12u32 {
                met.push((a, (a + round - 1) % 12 + 1));
            }
        }
        let history = history(&met);
        let mut rng = ChaCha8Rng::seed_from_u64(0);

        let round = compute_pairings(&standings, |a, b| history.has_played(a, b), &mut rng)
            .unwrap();
        assert_eq!(round.method, PairingMethod::RematchFree);
        assert_eq!(rematches(&round, &history), 0);
        assert_covers_once(&round, &standings);
    }
}
