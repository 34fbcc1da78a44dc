//! Arena-backed match tree shared by the builder, progression, and stats code.
//!
//! Nodes are addressed by integer id and store child ids rather than direct
//! references. A parent-pointer map is computed once at construction, so
//! winner placement never searches the tree top-down, and the whole structure
//! serializes without cycles.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::tournament::models::PlayerId;

/// Index of a match node within its tree's arena.
pub type NodeId = usize;

/// One competitor slot of a match.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum Slot {
    /// Waiting on a child match to produce a winner.
    Unfilled,
    /// Padding for a non-power-of-two roster.
    Bye,
    /// A concrete player.
    Occupied(PlayerId),
}

impl Slot {
    /// The player occupying this slot, if any.
    pub fn player(&self) -> Option<PlayerId> {
        match self {
            Self::Occupied(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_unfilled(&self) -> bool {
        matches!(self, Self::Unfilled)
    }

    pub fn is_bye(&self) -> bool {
        matches!(self, Self::Bye)
    }
}

/// Match lifecycle status.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum MatchStatus {
    /// At least one slot still waits on a child match.
    Pending,
    /// Both slots filled, no result recorded yet.
    Playable,
    /// Explicitly started; the only match a result may be recorded against.
    InProgress,
    /// Score recorded, winner and loser set.
    Resolved,
    /// Settled by the sanitization pass; never played, never playable.
    Bye,
}

/// Round label for a match, derived from its distance to the root.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum RoundName {
    Preliminary,
    QuarterFinal,
    SemiFinal,
    Final,
}

impl fmt::Display for RoundName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let repr = match self {
            Self::Preliminary => "Preliminary round",
            Self::QuarterFinal => "Quarter-finals",
            Self::SemiFinal => "Semi-finals",
            Self::Final => "Final",
        };
        write!(f, "{repr}")
    }
}

/// One elimination slot in the bracket.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchNode {
    pub id: NodeId,
    pub player1: Slot,
    pub player2: Slot,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub score: Option<(u32, u32)>,
    pub winner: Option<PlayerId>,
    pub loser: Option<PlayerId>,
    pub status: MatchStatus,
}

impl MatchNode {
    pub(crate) fn leaf(id: NodeId, player1: Slot, player2: Slot) -> Self {
        let status = if player1.player().is_some() && player2.player().is_some() {
            MatchStatus::Playable
        } else {
            MatchStatus::Pending
        };
        Self {
            id,
            player1,
            player2,
            left: None,
            right: None,
            score: None,
            winner: None,
            loser: None,
            status,
        }
    }

    pub(crate) fn internal(id: NodeId, left: NodeId, right: NodeId) -> Self {
        Self {
            id,
            player1: Slot::Unfilled,
            player2: Slot::Unfilled,
            left: Some(left),
            right: Some(right),
            score: None,
            winner: None,
            loser: None,
            status: MatchStatus::Pending,
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.left.is_none()
    }

    pub fn is_resolved(&self) -> bool {
        self.status == MatchStatus::Resolved
    }

    /// Whether `player` occupies either slot of this match.
    pub fn contains(&self, player: PlayerId) -> bool {
        self.player1.player() == Some(player) || self.player2.player() == Some(player)
    }

    /// `player`'s own-side score, if this match resolved with them in it.
    pub fn score_for(&self, player: PlayerId) -> Option<u32> {
        let (s1, s2) = self.score?;
        if self.player1.player() == Some(player) {
            Some(s1)
        } else if self.player2.player() == Some(player) {
            Some(s2)
        } else {
            None
        }
    }

    /// Promote Pending to Playable once both slots hold players.
    pub(crate) fn refresh_status(&mut self) {
        if self.status == MatchStatus::Pending
            && self.player1.player().is_some()
            && self.player2.player().is_some()
        {
            self.status = MatchStatus::Playable;
        }
    }
}

/// A complete binary tree of matches with `2^k` leaf slots.
///
/// The shape is fixed at construction; only slot contents and statuses change
/// afterwards.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct MatchTree {
    nodes: Vec<MatchNode>,
    root: NodeId,
    parents: Vec<Option<NodeId>>,
}

impl MatchTree {
    pub(crate) fn new(nodes: Vec<MatchNode>, root: NodeId) -> Self {
        let mut parents = vec![None; nodes.len()];
        for node in &nodes {
            if let Some(left) = node.left {
                parents[left] = Some(node.id);
            }
            if let Some(right) = node.right {
                parents[right] = Some(node.id);
            }
        }
        Self {
            nodes,
            root,
            parents,
        }
    }

    pub fn root_id(&self) -> NodeId {
        self.root
    }

    pub fn root(&self) -> &MatchNode {
        &self.nodes[self.root]
    }

    pub fn node(&self, id: NodeId) -> &MatchNode {
        &self.nodes[id]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut MatchNode {
        &mut self.nodes[id]
    }

    /// Parent of `id`, or `None` for the root.
    pub fn parent_id(&self, id: NodeId) -> Option<NodeId> {
        self.parents[id]
    }

    /// Total number of match nodes (`2^k - 1`).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of leaf matches (`2^k / 2`).
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf()).count()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &MatchNode> {
        self.nodes.iter()
    }

    pub fn resolved_matches(&self) -> impl Iterator<Item = &MatchNode> {
        self.nodes.iter().filter(|n| n.is_resolved())
    }

    /// Whether the final has been played.
    pub fn is_complete(&self) -> bool {
        self.root().is_resolved()
    }

    /// The tournament winner, once the root resolves.
    pub fn champion(&self) -> Option<PlayerId> {
        self.root().winner
    }

    /// Edge distance from `id` up to the root.
    pub fn depth(&self, id: NodeId) -> usize {
        let mut depth = 0;
        let mut current = id;
        while let Some(parent) = self.parent_id(current) {
            depth += 1;
            current = parent;
        }
        depth
    }

    pub fn round_name(&self, id: NodeId) -> RoundName {
        match self.depth(id) {
            0 => RoundName::Final,
            1 => RoundName::SemiFinal,
            2 => RoundName::QuarterFinal,
            _ => RoundName::Preliminary,
        }
    }

    /// Write `value` into the slot of `parent` that corresponds to `child`.
    pub(crate) fn fill_slot(&mut self, parent: NodeId, child: NodeId, value: Slot) {
        let node = &mut self.nodes[parent];
        if node.left == Some(child) {
            node.player1 = value;
        } else {
            node.player2 = value;
        }
        node.refresh_status();
    }
}
