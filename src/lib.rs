//! # Knockout
//!
//! A single-elimination tournament engine for chat groups.
//!
//! The core of the crate is the bracket: a balanced binary tree of matches
//! built from an ordered roster, padded with byes for non-power-of-two player
//! counts. Matches are played one at a time; winners propagate toward the
//! root, and resolving the root crowns the champion.
//!
//! ## Core Modules
//!
//! - [`bracket`]: tree construction, match progression, and statistics
//! - [`tournament`]: the tournament aggregate, its state machine, and the
//!   [`TournamentManager`] facade consumed by transport layers
//! - [`registry`]: the active-tournament map keyed by chat id
//! - [`store`]: collaborator seams (player repository, persistence, rendering)
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use knockout::TournamentManager;
//! use knockout::store::{InMemoryPlayerRepository, InMemoryTournamentStore};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let manager = TournamentManager::new(
//!         Arc::new(InMemoryPlayerRepository::new()),
//!         Arc::new(InMemoryTournamentStore::new()),
//!     );
//!
//!     manager.create_tournament(-1001, 1, "Alice").await?;
//!     for (id, name) in [(1, "Alice"), (2, "Bob"), (3, "Carol"), (4, "Dan")] {
//!         manager.register_player(-1001, id, name).await?;
//!     }
//!     manager.start_tournament(-1001, 1).await?;
//!
//!     while let Some(pairing) = manager.begin_next_match(-1001, 1).await? {
//!         println!("{}: {} vs {}", pairing.round, pairing.player1, pairing.player2);
//!         manager.submit_result(-1001, 1, "2-1").await?;
//!     }
//!     Ok(())
//! }
//! ```

/// Bracket construction, match progression, and statistics.
pub mod bracket;
pub use bracket::{
    BracketBuilder, BracketConfig, ByePlacement, MIN_PLAYERS, MatchNode, MatchOutcome, MatchStatus,
    MatchTree, NodeId, PlayerStats, RoundName, Slot,
};

/// The tournament aggregate, lifecycle state machine, and manager facade.
pub mod tournament;
pub use tournament::{
    ChatId, MatchPairing, Player, PlayerId, Tournament, TournamentError, TournamentManager,
    TournamentResult, TournamentState,
};

/// Active-tournament registry keyed by chat id.
pub mod registry;
pub use registry::TournamentRegistry;

/// Collaborator seams: player repository, persistence, and rendering.
pub mod store;
