//! Bracket construction: seeding, bye padding, and the sanitization pass.

use log::debug;
use rand::seq::SliceRandom;

use super::tree::{MatchNode, MatchStatus, MatchTree, NodeId, Slot};
use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::PlayerId;

/// Minimum roster size for a bracket.
pub const MIN_PLAYERS: usize = 4;

/// Where bye slots land when the roster is not a power of two.
///
/// The placement rule is a fairness policy, so it is explicit configuration
/// rather than an accident of the build order.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum ByePlacement {
    /// The i-th bye is inserted at slot `2 * i`, spreading byes across the
    /// first-round pairings so no pairing holds two byes (for rosters of
    /// [`MIN_PLAYERS`] or more). This is the default.
    #[default]
    EvenSlots,
    /// Byes are appended after the last seed, clustering free advances at the
    /// bottom of the draw.
    Trailing,
}

/// Seeding configuration for [`BracketBuilder`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct BracketConfig {
    pub bye_placement: ByePlacement,
    /// Shuffle the roster before pairing instead of seeding in registration
    /// order. Off by default so brackets are reproducible.
    pub shuffle_seeds: bool,
}

/// Builds a balanced elimination tree from an ordered roster.
#[derive(Clone, Copy, Debug, Default)]
pub struct BracketBuilder {
    config: BracketConfig,
}

impl BracketBuilder {
    #[must_use]
    pub fn new(config: BracketConfig) -> Self {
        Self { config }
    }

    /// Seed `players` into a complete binary match tree.
    ///
    /// Pads the roster with byes up to the next power of two, pairs adjacent
    /// slots into leaf matches, folds rounds bottom-up until a single root
    /// remains, and then runs the sanitization pass so bye pairings never
    /// surface as playable matches.
    pub fn build(&self, players: &[PlayerId]) -> TournamentResult<MatchTree> {
        if players.len() < MIN_PLAYERS {
            return Err(TournamentError::TooFewPlayers {
                current: players.len(),
                needed: MIN_PLAYERS,
            });
        }

        let mut seeds = players.to_vec();
        if self.config.shuffle_seeds {
            seeds.shuffle(&mut rand::rng());
        }

        let slots = self.pad_with_byes(seeds);
        let mut nodes: Vec<MatchNode> = Vec::with_capacity(slots.len() - 1);

        let mut round: Vec<NodeId> = Vec::with_capacity(slots.len() / 2);
        for pair in slots.chunks(2) {
            let id = nodes.len();
            nodes.push(MatchNode::leaf(id, pair[0], pair[1]));
            round.push(id);
        }

        while round.len() > 1 {
            let mut next_round = Vec::with_capacity(round.len() / 2);
            for pair in round.chunks(2) {
                let id = nodes.len();
                nodes.push(MatchNode::internal(id, pair[0], pair[1]));
                next_round.push(id);
            }
            round = next_round;
        }

        let root = round[0];
        let mut tree = MatchTree::new(nodes, root);
        sanitize(&mut tree);

        debug!(
            "built bracket: {} players, {} slots, {} matches",
            players.len(),
            tree.leaf_count() * 2,
            tree.len()
        );
        Ok(tree)
    }

    fn pad_with_byes(&self, seeds: Vec<PlayerId>) -> Vec<Slot> {
        let size = seeds.len().next_power_of_two();
        let byes = size - seeds.len();
        let mut slots: Vec<Slot> = seeds.into_iter().map(Slot::Occupied).collect();
        match self.config.bye_placement {
            ByePlacement::EvenSlots => {
                for i in 0..byes {
                    slots.insert(i * 2, Slot::Bye);
                }
            }
            ByePlacement::Trailing => {
                slots.extend(std::iter::repeat_n(Slot::Bye, byes));
            }
        }
        slots
    }
}

/// Settle every match with a bye in it, promoting the opponent straight into
/// the parent slot.
///
/// Runs to a fixpoint: each pass settles at least one match, so it is bounded
/// by the node count, and re-running it is a no-op. Recursion through the
/// parent chain is implicit here; a promotion can create a new bye pairing one
/// level up (e.g. with [`ByePlacement::Trailing`]), which the next pass picks
/// up.
fn sanitize(tree: &mut MatchTree) {
    loop {
        let mut changed = false;
        for id in 0..tree.len() {
            let node = tree.node(id);
            if node.status == MatchStatus::Bye {
                continue;
            }
            let promoted = match (node.player1, node.player2) {
                (Slot::Bye, Slot::Bye) => Slot::Bye,
                (Slot::Bye, Slot::Occupied(p)) | (Slot::Occupied(p), Slot::Bye) => {
                    Slot::Occupied(p)
                }
                _ => continue,
            };
            tree.node_mut(id).status = MatchStatus::Bye;
            if let Some(parent) = tree.parent_id(id) {
                tree.fill_slot(parent, id, promoted);
            }
            changed = true;
        }
        if !changed {
            break;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn players(n: usize) -> Vec<PlayerId> {
        (1..=n as PlayerId).collect()
    }

    #[test]
    fn test_too_few_players_is_rejected() {
        for n in 0..MIN_PLAYERS {
            let err = BracketBuilder::default().build(&players(n)).unwrap_err();
            assert!(matches!(
                err,
                TournamentError::TooFewPlayers { current, needed: MIN_PLAYERS } if current == n
            ));
        }
    }

    #[test]
    fn test_power_of_two_roster_has_no_byes() {
        let tree = BracketBuilder::default().build(&players(8)).unwrap();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.leaf_count(), 4);
        assert!(tree.nodes().all(|n| n.status != MatchStatus::Bye));
        assert!(
            tree.nodes()
                .filter(|n| n.is_leaf())
                .all(|n| n.status == MatchStatus::Playable)
        );
    }

    #[test]
    fn test_five_players_pad_to_eight_slots() {
        let tree = BracketBuilder::default().build(&players(5)).unwrap();
        assert_eq!(tree.len(), 7);
        assert_eq!(tree.leaf_count(), 4);
        // Three leaves held a bye and were settled by sanitization.
        let bye_leaves = tree
            .nodes()
            .filter(|n| n.is_leaf() && n.status == MatchStatus::Bye)
            .count();
        assert_eq!(bye_leaves, 3);
        // Settled matches never carry a result.
        for node in tree.nodes().filter(|n| n.status == MatchStatus::Bye) {
            assert_eq!(node.winner, None);
            assert_eq!(node.loser, None);
            assert_eq!(node.score, None);
        }
    }

    #[test]
    fn test_even_slot_byes_promote_into_round_two() {
        // 5 players with even-slot byes: [bye, 1, bye, 2, bye, 3, 4, 5].
        let tree = BracketBuilder::default().build(&players(5)).unwrap();
        let root = tree.root();
        let semi1 = tree.node(root.left.unwrap());
        let semi2 = tree.node(root.right.unwrap());
        // Players 1 and 2 advanced without playing and meet in round two.
        assert_eq!(semi1.player1, Slot::Occupied(1));
        assert_eq!(semi1.player2, Slot::Occupied(2));
        assert_eq!(semi1.status, MatchStatus::Playable);
        // Player 3 waits on the winner of the only real first-round match.
        assert_eq!(semi2.player1, Slot::Occupied(3));
        assert_eq!(semi2.player2, Slot::Unfilled);
        assert_eq!(semi2.status, MatchStatus::Pending);
    }

    #[test]
    fn test_trailing_byes_cascade_up_the_draw() {
        let config = BracketConfig {
            bye_placement: ByePlacement::Trailing,
            shuffle_seeds: false,
        };
        // 5 players trailing: [1, 2, 3, 4, 5, bye, bye, bye]. The (bye, bye)
        // leaf promotes a bye upward, so player 5 skips two rounds.
        let tree = BracketBuilder::new(config).build(&players(5)).unwrap();
        let root = tree.root();
        assert_eq!(tree.node(root.right.unwrap()).status, MatchStatus::Bye);
        assert_eq!(root.player2, Slot::Occupied(5));
        assert!(tree.nodes().all(|n| n.winner.is_none()));
    }

    #[test]
    fn test_sanitize_is_idempotent() {
        let mut tree = BracketBuilder::default().build(&players(6)).unwrap();
        let before = tree.clone();
        sanitize(&mut tree);
        assert_eq!(tree, before);
    }

    #[test]
    fn test_shuffled_seeding_keeps_the_roster() {
        let config = BracketConfig {
            shuffle_seeds: true,
            ..BracketConfig::default()
        };
        let tree = BracketBuilder::new(config).build(&players(8)).unwrap();
        let mut seeded: Vec<PlayerId> = tree
            .nodes()
            .filter(|n| n.is_leaf())
            .flat_map(|n| [n.player1.player(), n.player2.player()])
            .flatten()
            .collect();
        seeded.sort_unstable();
        assert_eq!(seeded, players(8));
    }
}
