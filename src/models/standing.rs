//! Standings: the derived win/match table used to seed pairings.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::{MatchRecord, Player, PlayerId};

/// One row of the standings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Standing {
    pub id: PlayerId,
    pub name: String,
    pub wins: u32,
    pub matches: u32,
}

impl Standing {
    pub fn new(id: PlayerId, name: impl Into<String>, wins: u32, matches: u32) -> Self {
        Self {
            id,
            name: name.into(),
            wins,
            matches,
        }
    }
}

/// Tally standings from players and their match history.
///
/// Rows are ordered by wins descending. Ties keep the order of `players`.
pub fn tally_standings(players: &[Player], matches: &[MatchRecord]) -> Vec<Standing> {
    let mut tally: HashMap<PlayerId, (u32, u32)> = HashMap::with_capacity(players.len());

    for record in matches {
        tally.entry(record.first).or_default().1 += 1;
        tally.entry(record.second).or_default().1 += 1;
        if let Some(winner) = record.winner() {
            tally.entry(winner).or_default().0 += 1;
        }
    }

    let mut standings: Vec<Standing> = players
        .iter()
        .map(|p| {
            let (wins, played) = tally.get(&p.id).copied().unwrap_or_default();
            Standing::new(p.id, p.name.clone(), wins, played)
        })
        .collect();

    standings.sort_by(|a, b| b.wins.cmp(&a.wins));
    standings
}

/// Total matches across all rows. Zero means no round has been played.
pub fn total_matches(standings: &[Standing]) -> u64 {
    standings.iter().map(|s| u64::from(s.matches)).sum()
}
