//! Tournament manager: the facade consumed by transport layers.
//!
//! Every public operation locks the target tournament through the registry,
//! applies the mutation in memory, and then attempts to persist the new state.
//! Persistence failures are logged and never undo the in-memory mutation; the
//! transport layer observes them only through the logs.

use std::sync::Arc;

use log::{info, warn};

use super::errors::{TournamentError, TournamentResult};
use super::models::{ChatId, MatchPairing, Player, PlayerId, Tournament};
use crate::bracket::{BracketBuilder, BracketConfig, MatchOutcome, PlayerStats};
use crate::registry::TournamentRegistry;
use crate::store::{BracketRenderer, PlayerRepository, TournamentStore};

/// Orchestrates tournaments across chats.
#[derive(Clone)]
pub struct TournamentManager {
    registry: Arc<TournamentRegistry>,
    players: Arc<dyn PlayerRepository>,
    store: Arc<dyn TournamentStore>,
    renderer: Option<Arc<dyn BracketRenderer>>,
    builder: BracketBuilder,
}

impl TournamentManager {
    pub fn new(players: Arc<dyn PlayerRepository>, store: Arc<dyn TournamentStore>) -> Self {
        Self {
            registry: Arc::new(TournamentRegistry::new()),
            players,
            store,
            renderer: None,
            builder: BracketBuilder::default(),
        }
    }

    /// Attach a bracket-image renderer for [`Self::render_bracket`].
    #[must_use]
    pub fn with_renderer(mut self, renderer: Arc<dyn BracketRenderer>) -> Self {
        self.renderer = Some(renderer);
        self
    }

    /// Override the seeding configuration used when brackets are built.
    #[must_use]
    pub fn with_bracket_config(mut self, config: BracketConfig) -> Self {
        self.builder = BracketBuilder::new(config);
        self
    }

    /// Open a tournament for `chat_id` in the registering state.
    ///
    /// Fails with [`TournamentError::TournamentAlreadyOpen`] if the chat
    /// already has one.
    pub async fn create_tournament(
        &self,
        chat_id: ChatId,
        admin_id: PlayerId,
        admin_name: &str,
    ) -> TournamentResult<()> {
        let admin = self.players.find_or_create(admin_id, admin_name).await?;
        let handle = self.registry.create(chat_id, admin).await?;
        let tournament = handle.lock().await;
        self.persist(&tournament).await;
        info!("opened tournament for chat {chat_id}, admin {admin_id}");
        Ok(())
    }

    /// Restore previously saved tournaments into the registry.
    ///
    /// Chats that already have an open tournament are skipped. Returns the
    /// number of tournaments restored.
    pub async fn load_open_tournaments(&self) -> TournamentResult<usize> {
        let mut restored = 0;
        for tournament in self.store.load_open().await? {
            let chat_id = tournament.chat_id();
            if self.registry.insert(tournament).await.is_ok() {
                info!("restored tournament for chat {chat_id}");
                restored += 1;
            }
        }
        Ok(restored)
    }

    /// Register a player, creating their record on first sight. Idempotent.
    /// Returns the roster size.
    pub async fn register_player(
        &self,
        chat_id: ChatId,
        player_id: PlayerId,
        display_name: &str,
    ) -> TournamentResult<usize> {
        let handle = self.get(chat_id).await?;
        let player = self.players.find_or_create(player_id, display_name).await?;
        let mut tournament = handle.lock().await;
        let count = tournament.register(player)?;
        self.persist(&tournament).await;
        Ok(count)
    }

    /// Close registration and build the bracket. Admin only.
    pub async fn start_tournament(&self, chat_id: ChatId, caller: PlayerId) -> TournamentResult<()> {
        let handle = self.get(chat_id).await?;
        let mut tournament = handle.lock().await;
        ensure_admin(&tournament, caller)?;
        tournament.start(&self.builder)?;
        self.persist(&tournament).await;
        info!(
            "started tournament for chat {chat_id} with {} players",
            tournament.roster().len()
        );
        Ok(())
    }

    /// The next match in traversal order, without starting it.
    pub async fn next_match(&self, chat_id: ChatId) -> TournamentResult<Option<MatchPairing>> {
        let handle = self.get(chat_id).await?;
        let tournament = handle.lock().await;
        Ok(tournament
            .next_match()
            .map(|node| node.id)
            .and_then(|id| tournament.pairing_for(id)))
    }

    /// Start the next match so results can be reported. Admin only.
    pub async fn begin_next_match(
        &self,
        chat_id: ChatId,
        caller: PlayerId,
    ) -> TournamentResult<Option<MatchPairing>> {
        let handle = self.get(chat_id).await?;
        let mut tournament = handle.lock().await;
        ensure_admin(&tournament, caller)?;
        let pairing = tournament.begin_next_match()?;
        self.persist(&tournament).await;
        Ok(pairing)
    }

    /// Record a result for the match in progress. Admin only.
    pub async fn submit_result(
        &self,
        chat_id: ChatId,
        caller: PlayerId,
        raw: &str,
    ) -> TournamentResult<MatchOutcome> {
        let handle = self.get(chat_id).await?;
        let mut tournament = handle.lock().await;
        ensure_admin(&tournament, caller)?;
        let outcome = tournament.submit_result(raw)?;
        self.persist(&tournament).await;
        if let Some(champion) = outcome.champion {
            info!("tournament for chat {chat_id} finished, champion {champion}");
        }
        Ok(outcome)
    }

    /// Statistics for one player.
    pub async fn player_stats(
        &self,
        chat_id: ChatId,
        player_id: PlayerId,
    ) -> TournamentResult<PlayerStats> {
        let handle = self.get(chat_id).await?;
        let tournament = handle.lock().await;
        tournament.stats(player_id)
    }

    /// The opponent `player_id` faces next, or `None` while undecided.
    pub async fn next_opponent(
        &self,
        chat_id: ChatId,
        player_id: PlayerId,
    ) -> TournamentResult<Option<Player>> {
        let handle = self.get(chat_id).await?;
        let tournament = handle.lock().await;
        Ok(tournament.next_opponent(player_id)?.cloned())
    }

    /// Render the current bracket as image bytes, if a renderer is attached
    /// and the bracket exists.
    pub async fn render_bracket(&self, chat_id: ChatId) -> TournamentResult<Option<Vec<u8>>> {
        let Some(renderer) = &self.renderer else {
            return Ok(None);
        };
        let handle = self.get(chat_id).await?;
        let tournament = handle.lock().await;
        Ok(tournament.bracket().map(|tree| renderer.render(tree)))
    }

    /// Remove the tournament from the registry and the store. Admin only,
    /// irreversible; the transport layer is expected to have confirmed the
    /// deletion with the admin.
    pub async fn delete_tournament(&self, chat_id: ChatId, caller: PlayerId) -> TournamentResult<()> {
        {
            let handle = self.get(chat_id).await?;
            let tournament = handle.lock().await;
            ensure_admin(&tournament, caller)?;
        }
        self.registry.remove(chat_id).await;
        if let Err(err) = self.store.delete(chat_id).await {
            warn!("failed to delete stored tournament for chat {chat_id}: {err}");
        }
        info!("deleted tournament for chat {chat_id}");
        Ok(())
    }

    /// Number of open tournaments.
    pub async fn open_tournament_count(&self) -> usize {
        self.registry.open_count().await
    }

    async fn get(&self, chat_id: ChatId) -> TournamentResult<crate::registry::SharedTournament> {
        self.registry
            .get(chat_id)
            .await
            .ok_or(TournamentError::TournamentNotFound(chat_id))
    }

    /// Mutations complete in memory before a save is attempted; a failed save
    /// is logged and does not fail the operation.
    async fn persist(&self, tournament: &Tournament) {
        if let Err(err) = self.store.save(tournament).await {
            warn!(
                "failed to persist tournament for chat {}: {err}",
                tournament.chat_id()
            );
        }
    }
}

fn ensure_admin(tournament: &Tournament, caller: PlayerId) -> TournamentResult<()> {
    if tournament.is_admin(caller) {
        Ok(())
    } else {
        Err(TournamentError::NotAuthorized)
    }
}
