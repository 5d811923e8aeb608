use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swiss_pairing::config::AppConfig;
use swiss_pairing::storage::{JsonlStore, StorageConfig};
use swiss_pairing::{PlayerId, Tournament};

#[derive(Parser)]
#[command(name = "swiss")]
#[command(about = "Swiss-system tournament tracker")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./swiss.toml")]
    config: String,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a new player
    Register {
        /// Player's display name
        name: String,
    },

    /// Print the number of registered players
    Count,

    /// Show current standings
    Standings,

    /// Record the result of a match
    Report {
        /// Winning player's id (or first player for a draw)
        winner: u32,

        /// Losing player's id (or second player for a draw)
        loser: u32,

        /// The match was drawn
        #[arg(long)]
        draw: bool,
    },

    /// Compute pairings for the next round
    Pairings {
        /// Seed for the first-round draw
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Delete all match records
    ResetMatches,

    /// Delete all players and match records
    ResetPlayers,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_or_default(&PathBuf::from(&cli.config))
        .with_context(|| format!("Failed to load config from {}", cli.config))?;

    // Initialize tracing
    let log_level = cli.log_level.as_deref().unwrap_or(&config.log_level);
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level));

    let registry = tracing_subscriber::registry().with(filter);
    if cli.json_logs {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let data_dir = cli
        .data_dir
        .map(PathBuf::from)
        .unwrap_or_else(|| config.data_dir.clone());
    tracing::debug!("Using data directory {:?}", data_dir);

    let store = JsonlStore::open(&StorageConfig::new(data_dir))?;
    let mut tournament = Tournament::new(store, config.pairing.clone());

    match cli.command {
        Commands::Register { name } => {
            let name = name.trim();
            if name.is_empty() {
                bail!("Player name must not be empty");
            }
            let id = tournament.register_player(name)?;
            println!("Registered {} as player {}", name, id);
        }
        Commands::Count => {
            println!("{}", tournament.count_players()?);
        }
        Commands::Standings => {
            let standings = tournament.standings()?;
            if standings.is_empty() {
                println!("No players registered.");
                return Ok(());
            }

            println!("{:>5}  {:<30} {:>5} {:>7}", "ID", "Name", "Wins", "Matches");
            for s in &standings {
                println!("{:>5}  {:<30} {:>5} {:>7}", s.id, s.name, s.wins, s.matches);
            }
        }
        Commands::Report {
            winner,
            loser,
            draw,
        } => {
            let (a, b) = (PlayerId::new(winner), PlayerId::new(loser));
            let record = if draw {
                tournament.report_draw(a, b)?
            } else {
                tournament.report_match(a, b)?
            };
            println!("Recorded match {} ({} vs {}, {})", record.id, a, b, record.outcome);
        }
        Commands::Pairings { seed } => {
            let rng = match seed.or(config.pairing.seed) {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_entropy(),
            };

            let round = tournament.pairings_with_timeout(rng).await?;

            println!("=== Next Round ({}) ===", round.method);
            for (table, p) in round.pairs.iter().enumerate() {
                println!(
                    "  Table {:>2}: [{}] {} vs [{}] {}",
                    table + 1,
                    p.id1,
                    p.name1,
                    p.id2,
                    p.name2
                );
            }
            if round.method.allows_rematches() {
                println!("\nNote: no rematch-free pairing was found; some players may meet again.");
            }
        }
        Commands::ResetMatches => {
            tournament.reset_matches()?;
            println!("All match records deleted.");
        }
        Commands::ResetPlayers => {
            tournament.reset_players()?;
            println!("All players and match records deleted.");
        }
    }

    Ok(())
}
