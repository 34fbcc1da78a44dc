//! The bracket engine: elimination-tree construction, match progression, and
//! statistics.
//!
//! This module provides:
//! - [`BracketBuilder`]: seeds an ordered roster into a balanced binary match
//!   tree, padding with byes and settling bye pairings up front
//! - [`MatchTree`]: the arena-backed tree of [`MatchNode`]s, with the
//!   traversal, result-recording, and winner-propagation operations
//! - [`player_stats`] / [`ranking`]: post-hoc statistics over resolved matches
//!
//! ## Example
//!
//! ```
//! use knockout::bracket::BracketBuilder;
//!
//! let mut tree = BracketBuilder::default().build(&[1, 2, 3, 4]).unwrap();
//! while let Some(id) = tree.begin_next_match() {
//!     tree.record_result(id, (2, 0)).unwrap();
//! }
//! assert!(tree.is_complete());
//! ```

pub mod builder;
pub mod progression;
pub mod stats;
pub mod tree;

pub use builder::{BracketBuilder, BracketConfig, ByePlacement, MIN_PLAYERS};
pub use progression::{MatchOutcome, parse_score};
pub use stats::{PlayerStats, player_stats, ranking};
pub use tree::{MatchNode, MatchStatus, MatchTree, NodeId, RoundName, Slot};
