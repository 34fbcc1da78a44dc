//! Tournament error types.

use thiserror::Error;

use super::models::{ChatId, PlayerId};
use crate::store::StoreError;

/// Errors surfaced by the tournament engine.
///
/// All variants are recoverable: the transport layer maps each to a
/// user-facing message, and the tournament state is unchanged whenever one is
/// returned.
#[derive(Debug, Error)]
pub enum TournamentError {
    #[error("need at least {needed} players, have {current}")]
    TooFewPlayers { current: usize, needed: usize },

    #[error("registration is closed")]
    RegistrationClosed,

    #[error("the tournament has not started yet")]
    NotStarted,

    #[error("the tournament has already started")]
    AlreadyStarted,

    #[error("invalid result format {0:?}, expected <score>-<score>")]
    InvalidResultFormat(String),

    #[error("tied scores are not allowed, replay the match")]
    TiedScore,

    #[error("no game has been started")]
    GameNotStarted,

    #[error("only the tournament admin may do that")]
    NotAuthorized,

    #[error("player {0} is not in this tournament")]
    PlayerNotInTournament(PlayerId),

    #[error("player {0} has been knocked out")]
    KnockedOut(PlayerId),

    #[error("no tournament is open for chat {0}")]
    TournamentNotFound(ChatId),

    #[error("a tournament is already open for chat {0}")]
    TournamentAlreadyOpen(ChatId),

    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

/// Result type for tournament operations.
pub type TournamentResult<T> = Result<T, TournamentError>;
