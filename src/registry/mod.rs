//! Active-tournament registry keyed by chat id.
//!
//! Each chat has at most one open tournament. The map is guarded by an
//! `RwLock` and each tournament by its own `Mutex`, so mutations to one
//! tournament are serialized while independent chats proceed in parallel.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, RwLock};

use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::{ChatId, Player, Tournament};

/// A tournament handle with single-writer-per-key locking.
pub type SharedTournament = Arc<Mutex<Tournament>>;

/// The set of open tournaments.
#[derive(Default)]
pub struct TournamentRegistry {
    tournaments: RwLock<HashMap<ChatId, SharedTournament>>,
}

impl TournamentRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a new tournament for `chat_id` with `admin` in charge.
    pub async fn create(&self, chat_id: ChatId, admin: Player) -> TournamentResult<SharedTournament> {
        self.insert(Tournament::new(chat_id, admin)).await
    }

    /// Insert an existing tournament (e.g. one restored from storage).
    pub async fn insert(&self, tournament: Tournament) -> TournamentResult<SharedTournament> {
        let chat_id = tournament.chat_id();
        let mut tournaments = self.tournaments.write().await;
        if tournaments.contains_key(&chat_id) {
            return Err(TournamentError::TournamentAlreadyOpen(chat_id));
        }
        let handle = Arc::new(Mutex::new(tournament));
        tournaments.insert(chat_id, handle.clone());
        Ok(handle)
    }

    pub async fn get(&self, chat_id: ChatId) -> Option<SharedTournament> {
        let tournaments = self.tournaments.read().await;
        tournaments.get(&chat_id).cloned()
    }

    /// Drop the tournament for `chat_id`, returning its handle if it existed.
    /// Irreversible as far as the registry is concerned.
    pub async fn remove(&self, chat_id: ChatId) -> Option<SharedTournament> {
        let mut tournaments = self.tournaments.write().await;
        tournaments.remove(&chat_id)
    }

    pub async fn open_count(&self) -> usize {
        let tournaments = self.tournaments.read().await;
        tournaments.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Player {
        Player::new(1, "Alice")
    }

    #[tokio::test]
    async fn test_one_tournament_per_chat() {
        let registry = TournamentRegistry::new();
        registry.create(-1, admin()).await.unwrap();
        let err = registry.create(-1, admin()).await.unwrap_err();
        assert!(matches!(err, TournamentError::TournamentAlreadyOpen(-1)));
        assert_eq!(registry.open_count().await, 1);
    }

    #[tokio::test]
    async fn test_independent_chats_coexist() {
        let registry = TournamentRegistry::new();
        registry.create(-1, admin()).await.unwrap();
        registry.create(-2, admin()).await.unwrap();
        assert_eq!(registry.open_count().await, 2);
        assert!(registry.get(-1).await.is_some());
        assert!(registry.get(-3).await.is_none());
    }

    #[tokio::test]
    async fn test_remove_frees_the_chat() {
        let registry = TournamentRegistry::new();
        registry.create(-1, admin()).await.unwrap();
        assert!(registry.remove(-1).await.is_some());
        assert!(registry.get(-1).await.is_none());
        // The chat can host a fresh tournament afterwards.
        registry.create(-1, admin()).await.unwrap();
    }
}
