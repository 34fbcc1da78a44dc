//! Collaborator seams: player repository, tournament persistence, and bracket
//! rendering.
//!
//! The engine never blocks on I/O itself; implementations of these traits are
//! invoked by the [`crate::tournament::TournamentManager`] after a mutation
//! has completed in memory. In-memory implementations live in [`memory`] and
//! back the test suite.

use async_trait::async_trait;
use thiserror::Error;

use crate::bracket::MatchTree;
use crate::tournament::models::{ChatId, Player, PlayerId, Tournament};

pub mod memory;

pub use memory::{InMemoryPlayerRepository, InMemoryTournamentStore};

/// Errors raised by storage collaborators.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type for storage operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Cross-tournament player records.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Look up a player by external id, creating the record on first sight.
    async fn find_or_create(
        &self,
        external_id: PlayerId,
        display_name: &str,
    ) -> StoreResult<Player>;
}

/// Persistence sink/source for tournament state.
///
/// `save` is called after every mutating operation; failures must not corrupt
/// the in-memory tournament and are not retried by the core.
#[async_trait]
pub trait TournamentStore: Send + Sync {
    async fn save(&self, tournament: &Tournament) -> StoreResult<()>;

    async fn load(&self, chat_id: ChatId) -> StoreResult<Option<Tournament>>;

    /// All stored tournaments that have not been deleted, for registry
    /// restoration at startup.
    async fn load_open(&self) -> StoreResult<Vec<Tournament>>;

    async fn delete(&self, chat_id: ChatId) -> StoreResult<()>;
}

/// Optional bracket-image renderer, used only for user-facing display.
pub trait BracketRenderer: Send + Sync {
    fn render(&self, tree: &MatchTree) -> Vec<u8>;
}
