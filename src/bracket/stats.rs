//! Per-player statistics and ranking over resolved matches.

use serde::{Deserialize, Serialize};

use super::tree::MatchTree;
use crate::tournament::errors::{TournamentError, TournamentResult};
use crate::tournament::models::{Player, PlayerId};

/// Aggregated statistics for one player.
///
/// `highest`, `lowest`, and `avg_score` cover the player's own-side scores
/// across their resolved matches and are all zero before the player has played
/// a match. `rank` is the 1-based position in the roster ordered by cumulative
/// goals, descending; ties keep registration order (the ranking sort is
/// stable).
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct PlayerStats {
    pub highest: u32,
    pub lowest: u32,
    pub avg_score: u32,
    pub rank: usize,
}

/// Compute [`PlayerStats`] for `player`.
///
/// `bracket` is `None` before the tournament starts, in which case only the
/// rank carries information.
pub fn player_stats(
    bracket: Option<&MatchTree>,
    roster: &[Player],
    player: PlayerId,
) -> TournamentResult<PlayerStats> {
    if !roster.iter().any(|p| p.external_id == player) {
        return Err(TournamentError::PlayerNotInTournament(player));
    }

    let scores: Vec<u32> = bracket
        .into_iter()
        .flat_map(MatchTree::resolved_matches)
        .filter_map(|m| m.score_for(player))
        .collect();

    let (highest, lowest, avg_score) = if scores.is_empty() {
        (0, 0, 0)
    } else {
        let sum: u32 = scores.iter().sum();
        let avg = (f64::from(sum) / scores.len() as f64).round() as u32;
        (
            *scores.iter().max().unwrap_or(&0),
            *scores.iter().min().unwrap_or(&0),
            avg,
        )
    };

    Ok(PlayerStats {
        highest,
        lowest,
        avg_score,
        rank: rank_of(roster, player),
    })
}

/// Roster ordered by cumulative goals, descending. The sort is stable, so
/// players with equal goals keep their registration order.
pub fn ranking(roster: &[Player]) -> Vec<&Player> {
    let mut ranked: Vec<&Player> = roster.iter().collect();
    ranked.sort_by(|a, b| b.goals.cmp(&a.goals));
    ranked
}

fn rank_of(roster: &[Player], player: PlayerId) -> usize {
    ranking(roster)
        .iter()
        .position(|p| p.external_id == player)
        .map_or(0, |i| i + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roster(goals: &[u32]) -> Vec<Player> {
        goals
            .iter()
            .enumerate()
            .map(|(i, &g)| {
                let mut player = Player::new(i as PlayerId + 1, format!("P{}", i + 1));
                player.goals = g;
                player
            })
            .collect()
    }

    #[test]
    fn test_unknown_player_is_rejected() {
        let err = player_stats(None, &roster(&[0, 0, 0, 0]), 99).unwrap_err();
        assert!(matches!(err, TournamentError::PlayerNotInTournament(99)));
    }

    #[test]
    fn test_no_matches_played_yields_zeroes() {
        let stats = player_stats(None, &roster(&[0, 0, 0, 0]), 1).unwrap();
        assert_eq!(stats.highest, 0);
        assert_eq!(stats.lowest, 0);
        assert_eq!(stats.avg_score, 0);
        assert_eq!(stats.rank, 1);
    }

    #[test]
    fn test_ranking_sorts_by_goals_descending() {
        let roster = roster(&[2, 7, 4, 0]);
        let ranked: Vec<PlayerId> = ranking(&roster).iter().map(|p| p.external_id).collect();
        assert_eq!(ranked, vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_ranking_ties_keep_registration_order() {
        let roster = roster(&[3, 5, 3, 3]);
        let ranked: Vec<PlayerId> = ranking(&roster).iter().map(|p| p.external_id).collect();
        assert_eq!(ranked, vec![2, 1, 3, 4]);
        assert_eq!(player_stats(None, &roster, 1).unwrap().rank, 2);
        assert_eq!(player_stats(None, &roster, 3).unwrap().rank, 3);
    }

    #[test]
    fn test_scores_cover_own_side_only() {
        use crate::bracket::builder::BracketBuilder;

        let players: Vec<PlayerId> = (1..=4).collect();
        let mut tree = BracketBuilder::default().build(&players).unwrap();
        // Player 1 beats player 2 by 3-1, then loses the final 2-5.
        let id = tree.begin_next_match().unwrap();
        tree.record_result(id, (3, 1)).unwrap();
        let id = tree.begin_next_match().unwrap();
        tree.record_result(id, (0, 2)).unwrap();
        let id = tree.begin_next_match().unwrap();
        tree.record_result(id, (2, 5)).unwrap();

        let roster = roster(&[5, 1, 0, 7]);
        let stats = player_stats(Some(&tree), &roster, 1).unwrap();
        assert_eq!(stats.highest, 3);
        assert_eq!(stats.lowest, 2);
        assert_eq!(stats.avg_score, 3); // mean of 3 and 2, rounded
    }
}
