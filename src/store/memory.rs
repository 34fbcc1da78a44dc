//! In-memory storage implementations for tests and development.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{PlayerRepository, StoreResult, TournamentStore};
use crate::tournament::models::{ChatId, Player, PlayerId, Tournament};

/// Player records kept in a process-local map.
#[derive(Default)]
pub struct InMemoryPlayerRepository {
    players: RwLock<HashMap<PlayerId, Player>>,
}

impl InMemoryPlayerRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.players.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.players.read().await.is_empty()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn find_or_create(
        &self,
        external_id: PlayerId,
        display_name: &str,
    ) -> StoreResult<Player> {
        let mut players = self.players.write().await;
        let player = players
            .entry(external_id)
            .or_insert_with(|| Player::new(external_id, display_name));
        Ok(player.clone())
    }
}

/// Tournament snapshots kept as JSON values, exercising the same
/// serialization path a real store would use.
#[derive(Default)]
pub struct InMemoryTournamentStore {
    snapshots: RwLock<HashMap<ChatId, serde_json::Value>>,
}

impl InMemoryTournamentStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.snapshots.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.snapshots.read().await.is_empty()
    }
}

#[async_trait]
impl TournamentStore for InMemoryTournamentStore {
    async fn save(&self, tournament: &Tournament) -> StoreResult<()> {
        let snapshot = serde_json::to_value(tournament)?;
        let mut snapshots = self.snapshots.write().await;
        snapshots.insert(tournament.chat_id(), snapshot);
        Ok(())
    }

    async fn load(&self, chat_id: ChatId) -> StoreResult<Option<Tournament>> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .get(&chat_id)
            .map(|snapshot| serde_json::from_value(snapshot.clone()))
            .transpose()
            .map_err(Into::into)
    }

    async fn load_open(&self) -> StoreResult<Vec<Tournament>> {
        let snapshots = self.snapshots.read().await;
        snapshots
            .values()
            .map(|snapshot| serde_json::from_value(snapshot.clone()).map_err(Into::into))
            .collect()
    }

    async fn delete(&self, chat_id: ChatId) -> StoreResult<()> {
        let mut snapshots = self.snapshots.write().await;
        snapshots.remove(&chat_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_find_or_create_returns_the_first_record() {
        let repo = InMemoryPlayerRepository::new();
        let first = repo.find_or_create(7, "Grace").await.unwrap();
        let second = repo.find_or_create(7, "Renamed").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(second.display_name, "Grace");
        assert_eq!(repo.len().await, 1);
    }

    #[tokio::test]
    async fn test_save_load_delete_round_trip() {
        let store = InMemoryTournamentStore::new();
        let mut tournament = Tournament::new(-5, Player::new(1, "Alice"));
        for id in 1..=4 {
            tournament.register(Player::new(id, format!("P{id}"))).unwrap();
        }

        store.save(&tournament).await.unwrap();
        let loaded = store.load(-5).await.unwrap().unwrap();
        assert_eq!(loaded, tournament);
        assert_eq!(store.load_open().await.unwrap().len(), 1);

        store.delete(-5).await.unwrap();
        assert!(store.load(-5).await.unwrap().is_none());
        assert!(store.is_empty().await);
    }
}
