//! Pairing model: the opponents chosen for one round.

use serde::{Deserialize, Serialize};

use super::{PlayerId, Standing};

/// Two players drawn against each other in the next round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pairing {
    pub id1: PlayerId,
    pub name1: String,
    pub id2: PlayerId,
    pub name2: String,
}

impl Pairing {
    pub fn new(first: &Standing, second: &Standing) -> Self {
        Self {
            id1: first.id,
            name1: first.name.clone(),
            id2: second.id,
            name2: second.name.clone(),
        }
    }

    /// True if this pairing seats `a` against `b`, in either order.
    pub fn is_between(&self, a: PlayerId, b: PlayerId) -> bool {
        (self.id1 == a && self.id2 == b) || (self.id1 == b && self.id2 == a)
    }
}

/// How a round's pairings were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairingMethod {
    /// First round: a uniformly random draw.
    RandomBootstrap,
    /// Backtracking search found a matching with no rematches.
    RematchFree,
    /// No rematch-free matching was found (or the search was cut short);
    /// neighbours in the standings were paired and rematches may occur.
    AdjacentFallback,
}

impl PairingMethod {
    /// Returns true if this result may contain rematches.
    pub fn allows_rematches(&self) -> bool {
        matches!(self, PairingMethod::AdjacentFallback)
    }
}

impl std::fmt::Display for PairingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingMethod::RandomBootstrap => write!(f, "random bootstrap"),
            PairingMethod::RematchFree => write!(f, "rematch-free"),
            PairingMethod::AdjacentFallback => write!(f, "adjacent fallback"),
        }
    }
}

/// The full set of pairings for one round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPairings {
    pub pairs: Vec<Pairing>,
    pub method: PairingMethod,
}

impl RoundPairings {
    pub fn new(pairs: Vec<Pairing>, method: PairingMethod) -> Self {
        Self { pairs, method }
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Every player id seated this round, in seating order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.pairs.iter().flat_map(|p| [p.id1, p.id2]).collect()
    }

    /// Flatten into `(id1, name1, id2, name2)` tuples.
    pub fn into_tuples(self) -> Vec<(PlayerId, String, PlayerId, String)> {
        self.pairs
            .into_iter()
            .map(|p| (p.id1, p.name1, p.id2, p.name2))
            .collect()
    }
}
