//! Match progression: traversal order, score parsing, result recording, and
//! winner placement.
//!
//! The traversal order is deepest-leftmost first: starting at the root, the
//! search recurses into the left child while `player1` is unfilled, then into
//! the right child while `player2` is unfilled, and returns the first playable
//! match it encounters. The order is deterministic and total; every leaf
//! becomes reachable once its siblings resolve.

use log::debug;

use super::tree::{MatchNode, MatchStatus, MatchTree, NodeId, Slot};
use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::PlayerId;

/// Outcome of a recorded result.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct MatchOutcome {
    pub winner: PlayerId,
    pub loser: PlayerId,
    /// Set when the resolved match was the final.
    pub champion: Option<PlayerId>,
}

/// Parse a raw result string of the form `<int>-<int>`, with optional
/// whitespace around either number.
pub fn parse_score(raw: &str) -> TournamentResult<(u32, u32)> {
    let invalid = || TournamentError::InvalidResultFormat(raw.trim().to_string());
    let (left, right) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let s1 = left.trim().parse().map_err(|_| invalid())?;
    let s2 = right.trim().parse().map_err(|_| invalid())?;
    Ok((s1, s2))
}

impl MatchTree {
    /// The next match to be played, in deepest-leftmost order.
    ///
    /// Returns `None` once the root is resolved, and also while the only
    /// remaining candidate is already in progress.
    pub fn next_playable(&self) -> Option<NodeId> {
        self.next_playable_from(self.root_id())
    }

    fn next_playable_from(&self, id: NodeId) -> Option<NodeId> {
        let node = self.node(id);
        if matches!(node.status, MatchStatus::Resolved | MatchStatus::Bye) {
            return None;
        }
        if node.player1.is_unfilled()
            && let Some(left) = node.left
            && let Some(found) = self.next_playable_from(left)
        {
            return Some(found);
        }
        if node.player2.is_unfilled()
            && let Some(right) = node.right
            && let Some(found) = self.next_playable_from(right)
        {
            return Some(found);
        }
        (node.status == MatchStatus::Playable).then_some(id)
    }

    /// The match currently accepting a result, if one was started.
    pub fn match_in_progress(&self) -> Option<NodeId> {
        self.nodes()
            .find(|n| n.status == MatchStatus::InProgress)
            .map(|n| n.id)
    }

    /// Move the next playable match to `InProgress` and return it.
    ///
    /// Idempotent: while a match is already running, that match is returned
    /// again rather than starting a second one.
    pub fn begin_next_match(&mut self) -> Option<NodeId> {
        if let Some(id) = self.match_in_progress() {
            return Some(id);
        }
        let id = self.next_playable()?;
        self.node_mut(id).status = MatchStatus::InProgress;
        Some(id)
    }

    /// Record a result for match `id` and propagate the winner.
    ///
    /// The match must be in progress ([`TournamentError::GameNotStarted`]
    /// otherwise) and the scores must differ ([`TournamentError::TiedScore`];
    /// the match stays in progress so the result can be re-reported). On
    /// success the winner is placed into the parent slot found through the
    /// parent-pointer map; resolving the root yields the champion.
    pub fn record_result(&mut self, id: NodeId, score: (u32, u32)) -> TournamentResult<MatchOutcome> {
        let node = self.node(id);
        if node.status != MatchStatus::InProgress {
            return Err(TournamentError::GameNotStarted);
        }
        if score.0 == score.1 {
            return Err(TournamentError::TiedScore);
        }
        // InProgress implies both slots are occupied.
        let (Some(p1), Some(p2)) = (node.player1.player(), node.player2.player()) else {
            return Err(TournamentError::GameNotStarted);
        };
        let (winner, loser) = if score.0 > score.1 { (p1, p2) } else { (p2, p1) };

        let node = self.node_mut(id);
        node.score = Some(score);
        node.winner = Some(winner);
        node.loser = Some(loser);
        node.status = MatchStatus::Resolved;

        let champion = self.place_winner(id, winner);
        debug!("match {id} resolved {}-{}, winner {winner}", score.0, score.1);
        Ok(MatchOutcome {
            winner,
            loser,
            champion,
        })
    }

    /// Advance `winner` out of the resolved match `resolved`.
    ///
    /// Returns the champion when `resolved` has no parent, i.e. it was the
    /// final.
    fn place_winner(&mut self, resolved: NodeId, winner: PlayerId) -> Option<PlayerId> {
        match self.parent_id(resolved) {
            Some(parent) => {
                self.fill_slot(parent, resolved, Slot::Occupied(winner));
                None
            }
            None => Some(winner),
        }
    }

    /// The unresolved match `player` is scheduled in, if any.
    pub fn pending_match_of(&self, player: PlayerId) -> Option<&MatchNode> {
        self.nodes().find(|n| {
            n.contains(player)
                && matches!(
                    n.status,
                    MatchStatus::Pending | MatchStatus::Playable | MatchStatus::InProgress
                )
        })
    }
}
