//! # Swiss Pairing
//!
//! Swiss-system tournament tracking with rematch-avoiding pairings.
//!
//! ## Architecture
//!
//! - **models**: Players, match records, standings and pairings
//! - **storage**: The `StandingsStore` trait with in-memory and JSONL stores
//! - **pairing**: The pairing engine (random first round, backtracking
//!   search, adjacent fallback)
//! - **tournament**: A store handle wired to the pairing engine
//! - **config**: Configuration loading and validation

pub mod config;
pub mod models;
pub mod pairing;
pub mod storage;
pub mod tournament;

pub use models::*;
pub use tournament::{Tournament, TournamentError};
