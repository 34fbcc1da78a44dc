//! Tournament module: the aggregate root, its lifecycle state machine, and
//! the manager facade.
//!
//! A [`Tournament`] moves through `Registering -> InProgress -> Finished`,
//! with deletion reachable from any state through the registry. The
//! [`TournamentManager`] wraps the aggregate with per-chat locking,
//! authorization checks, and persistence side effects, and is the surface a
//! chat transport talks to.

pub mod errors;
pub mod manager;
pub mod models;

pub use errors::{TournamentError, TournamentResult};
pub use manager::TournamentManager;
pub use models::{
    ChatId, MatchPairing, Player, PlayerId, REGISTRATION_WINDOW_DAYS, Tournament, TournamentState,
};
