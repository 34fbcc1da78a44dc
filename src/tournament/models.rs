//! Tournament data models and the lifecycle state machine.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::errors::{TournamentError, TournamentResult};
use crate::bracket::{
    BracketBuilder, MatchNode, MatchOutcome, MatchTree, NodeId, PlayerStats, RoundName, Slot,
    parse_score, player_stats,
};

/// External identity of a person, unique across the chat platform.
pub type PlayerId = i64;

/// Isolation key for an independent bracket instance (one per group chat).
pub type ChatId = i64;

/// Days the registration window stays open after creation.
pub const REGISTRATION_WINDOW_DAYS: i64 = 10;

/// A tournament participant.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub external_id: PlayerId,
    pub display_name: String,
    /// Cumulative own-side score across all of this player's matches.
    pub goals: u32,
}

impl Player {
    #[must_use]
    pub fn new(external_id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            external_id,
            display_name: display_name.into(),
            goals: 0,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name)
    }
}

/// Tournament lifecycle state.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum TournamentState {
    /// Accepting registrations.
    Registering,
    /// Bracket built, matches being played.
    InProgress,
    /// The final has resolved.
    Finished,
}

/// A match offered to the transport layer, with roster names resolved.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MatchPairing {
    pub node: NodeId,
    pub round: RoundName,
    pub player1: Player,
    pub player2: Player,
}

/// The aggregate root: one elimination tournament for one chat.
///
/// All mutations are synchronous in-memory operations that either complete
/// fully or return an error leaving the tournament untouched.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Tournament {
    chat_id: ChatId,
    admin: Player,
    /// Registration order is preserved; it is the seeding order and the
    /// ranking tie-break.
    roster: Vec<Player>,
    bracket: Option<MatchTree>,
    state: TournamentState,
    start_date: DateTime<Utc>,
    end_date: DateTime<Utc>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl Tournament {
    #[must_use]
    pub fn new(chat_id: ChatId, admin: Player) -> Self {
        let start_date = Utc::now();
        Self {
            chat_id,
            admin,
            roster: Vec::new(),
            bracket: None,
            state: TournamentState::Registering,
            start_date,
            end_date: start_date + Duration::days(REGISTRATION_WINDOW_DAYS),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn chat_id(&self) -> ChatId {
        self.chat_id
    }

    /// The admin identity, exposed so callers can authorize commands.
    pub fn admin(&self) -> &Player {
        &self.admin
    }

    pub fn is_admin(&self, player: PlayerId) -> bool {
        self.admin.external_id == player
    }

    pub fn state(&self) -> TournamentState {
        self.state
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn bracket(&self) -> Option<&MatchTree> {
        self.bracket.as_ref()
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    /// When the registration window closes.
    pub fn end_date(&self) -> DateTime<Utc> {
        self.end_date
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.roster.iter().find(|p| p.external_id == id)
    }

    /// Add `player` to the roster.
    ///
    /// Idempotent: re-registering an already-registered player is a no-op,
    /// not an error. Fails with [`TournamentError::RegistrationClosed`] once
    /// the tournament has left the registering state. Returns the roster size.
    pub fn register(&mut self, player: Player) -> TournamentResult<usize> {
        if self.state != TournamentState::Registering {
            return Err(TournamentError::RegistrationClosed);
        }
        if self.player(player.external_id).is_none() {
            self.roster.push(player);
        }
        Ok(self.roster.len())
    }

    /// Close registration and build the bracket, seeding the roster in
    /// registration order.
    ///
    /// Fails with [`TournamentError::TooFewPlayers`] below four players,
    /// leaving the state unchanged so more players can register.
    pub fn start(&mut self, builder: &BracketBuilder) -> TournamentResult<()> {
        if self.state != TournamentState::Registering {
            return Err(TournamentError::AlreadyStarted);
        }
        let seeds: Vec<PlayerId> = self.roster.iter().map(|p| p.external_id).collect();
        self.bracket = Some(builder.build(&seeds)?);
        self.state = TournamentState::InProgress;
        self.started_at = Some(Utc::now());
        Ok(())
    }

    /// The next match in traversal order, or `None` once the final resolved.
    pub fn next_match(&self) -> Option<&MatchNode> {
        let bracket = self.bracket.as_ref()?;
        bracket.next_playable().map(|id| bracket.node(id))
    }

    /// Start the next match so a result can be recorded against it.
    ///
    /// Idempotent while a match is already running. Returns `None` when
    /// nothing is playable (final resolved, or everything waits on the
    /// running match).
    pub fn begin_next_match(&mut self) -> TournamentResult<Option<MatchPairing>> {
        let bracket = self.bracket.as_mut().ok_or(TournamentError::NotStarted)?;
        let Some(id) = bracket.begin_next_match() else {
            return Ok(None);
        };
        Ok(self.pairing_for(id))
    }

    /// Record `raw` (e.g. `"3-1"`) against the match in progress.
    ///
    /// On success the score is stored, both players' `goals` grow by their
    /// own-side score, the winner advances, and resolving the final flips the
    /// tournament to [`TournamentState::Finished`]. On any error the match
    /// and the tournament are left untouched.
    pub fn submit_result(&mut self, raw: &str) -> TournamentResult<MatchOutcome> {
        let bracket = self.bracket.as_mut().ok_or(TournamentError::NotStarted)?;
        let id = bracket
            .match_in_progress()
            .ok_or(TournamentError::GameNotStarted)?;
        let score = parse_score(raw)?;
        let outcome = bracket.record_result(id, score)?;

        let (s1, s2) = score;
        self.add_goals(outcome.winner, s1.max(s2));
        self.add_goals(outcome.loser, s1.min(s2));

        if outcome.champion.is_some() {
            self.state = TournamentState::Finished;
            self.finished_at = Some(Utc::now());
        }
        Ok(outcome)
    }

    /// Statistics for `player`, per [`crate::bracket::player_stats`].
    pub fn stats(&self, player: PlayerId) -> TournamentResult<PlayerStats> {
        player_stats(self.bracket.as_ref(), &self.roster, player)
    }

    /// Whether `player` lost a resolved match.
    pub fn is_knocked_out(&self, player: PlayerId) -> bool {
        self.bracket
            .as_ref()
            .is_some_and(|b| b.resolved_matches().any(|m| m.loser == Some(player)))
    }

    /// The opponent `player` faces in their next scheduled match, or `None`
    /// while that opponent is still undecided.
    pub fn next_opponent(&self, player: PlayerId) -> TournamentResult<Option<&Player>> {
        if self.player(player).is_none() {
            return Err(TournamentError::PlayerNotInTournament(player));
        }
        let bracket = self.bracket.as_ref().ok_or(TournamentError::NotStarted)?;
        if self.is_knocked_out(player) {
            return Err(TournamentError::KnockedOut(player));
        }
        let Some(node) = bracket.pending_match_of(player) else {
            return Ok(None);
        };
        let opponent = if node.player1.player() == Some(player) {
            node.player2
        } else {
            node.player1
        };
        Ok(opponent.player().and_then(|id| self.player(id)))
    }

    /// Resolve a node into a [`MatchPairing`] with roster names, if both
    /// slots hold players.
    pub fn pairing_for(&self, id: NodeId) -> Option<MatchPairing> {
        let bracket = self.bracket.as_ref()?;
        let node = bracket.node(id);
        let lookup = |slot: Slot| slot.player().and_then(|p| self.player(p)).cloned();
        Some(MatchPairing {
            node: id,
            round: bracket.round_name(id),
            player1: lookup(node.player1)?,
            player2: lookup(node.player2)?,
        })
    }

    fn add_goals(&mut self, player: PlayerId, goals: u32) {
        if let Some(entry) = self.roster.iter_mut().find(|p| p.external_id == player) {
            entry.goals += goals;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin() -> Player {
        Player::new(1, "Alice")
    }

    fn tournament_with(n: usize) -> Tournament {
        let mut t = Tournament::new(-100, admin());
        for i in 1..=n as PlayerId {
            t.register(Player::new(i, format!("P{i}"))).unwrap();
        }
        t
    }

    fn started(n: usize) -> Tournament {
        let mut t = tournament_with(n);
        t.start(&BracketBuilder::default()).unwrap();
        t
    }

    #[test]
    fn test_registration_is_idempotent() {
        let mut t = Tournament::new(-100, admin());
        assert_eq!(t.register(Player::new(2, "Bob")).unwrap(), 1);
        assert_eq!(t.register(Player::new(2, "Bob")).unwrap(), 1);
        assert_eq!(t.roster().len(), 1);
    }

    #[test]
    fn test_registration_window_is_ten_days() {
        let t = Tournament::new(-100, admin());
        assert_eq!(t.end_date() - t.start_date(), Duration::days(10));
    }

    #[test]
    fn test_start_requires_four_players() {
        let mut t = tournament_with(3);
        let err = t.start(&BracketBuilder::default()).unwrap_err();
        assert!(matches!(err, TournamentError::TooFewPlayers { current: 3, .. }));
        // State unchanged, a late registration still works.
        assert_eq!(t.state(), TournamentState::Registering);
        t.register(Player::new(9, "Late")).unwrap();
        t.start(&BracketBuilder::default()).unwrap();
        assert_eq!(t.state(), TournamentState::InProgress);
    }

    #[test]
    fn test_registration_closes_on_start() {
        let mut t = started(4);
        let err = t.register(Player::new(9, "Late")).unwrap_err();
        assert!(matches!(err, TournamentError::RegistrationClosed));
        let err = t.start(&BracketBuilder::default()).unwrap_err();
        assert!(matches!(err, TournamentError::AlreadyStarted));
    }

    #[test]
    fn test_result_before_begin_fails() {
        let mut t = started(4);
        let err = t.submit_result("2-1").unwrap_err();
        assert!(matches!(err, TournamentError::GameNotStarted));
    }

    #[test]
    fn test_result_before_start_fails() {
        let mut t = tournament_with(4);
        assert!(matches!(
            t.submit_result("2-1").unwrap_err(),
            TournamentError::NotStarted
        ));
        assert!(matches!(
            t.begin_next_match().unwrap_err(),
            TournamentError::NotStarted
        ));
    }

    #[test]
    fn test_goals_accumulate_for_both_players() {
        let mut t = started(4);
        t.begin_next_match().unwrap();
        let outcome = t.submit_result("3-1").unwrap();
        assert_eq!(t.player(outcome.winner).unwrap().goals, 3);
        assert_eq!(t.player(outcome.loser).unwrap().goals, 1);
    }

    #[test]
    fn test_invalid_result_leaves_match_running() {
        let mut t = started(4);
        let pairing = t.begin_next_match().unwrap().unwrap();
        let err = t.submit_result("abc-def").unwrap_err();
        assert!(matches!(err, TournamentError::InvalidResultFormat(_)));
        // Still the same match in progress; a valid report goes through.
        let again = t.begin_next_match().unwrap().unwrap();
        assert_eq!(again.node, pairing.node);
        t.submit_result("2-1").unwrap();
    }

    #[test]
    fn test_full_run_reaches_finished() {
        let mut t = started(8);
        let mut champion = None;
        while let Some(_pairing) = t.begin_next_match().unwrap() {
            let outcome = t.submit_result("2-0").unwrap();
            champion = outcome.champion.or(champion);
        }
        assert_eq!(t.state(), TournamentState::Finished);
        assert!(t.finished_at().is_some());
        assert_eq!(t.bracket().unwrap().champion(), champion);
        assert!(t.next_match().is_none());
    }

    #[test]
    fn test_next_opponent_tracks_the_draw() {
        let mut t = started(4);
        // First match pairs players 1 and 2.
        assert_eq!(t.next_opponent(1).unwrap().unwrap().external_id, 2);
        // Player 3's opponent is known (player 4) before any result.
        assert_eq!(t.next_opponent(3).unwrap().unwrap().external_id, 4);

        t.begin_next_match().unwrap();
        t.submit_result("0-2").unwrap();
        // Player 1 lost and is out; player 2 waits on the other semi-final.
        assert!(matches!(
            t.next_opponent(1).unwrap_err(),
            TournamentError::KnockedOut(1)
        ));
        assert_eq!(t.next_opponent(2).unwrap(), None);
        assert!(matches!(
            t.next_opponent(99).unwrap_err(),
            TournamentError::PlayerNotInTournament(99)
        ));
    }

    #[test]
    fn test_pairing_resolves_names_and_round() {
        let mut t = started(4);
        let pairing = t.begin_next_match().unwrap().unwrap();
        assert_eq!(pairing.round, RoundName::SemiFinal);
        assert_eq!(pairing.player1.display_name, "P1");
        assert_eq!(pairing.player2.display_name, "P2");
    }
}
