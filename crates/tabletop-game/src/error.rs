//! Error types for the game layer.

use tabletop_protocol::{Coord, GameId, PlayerId};
use tabletop_rules::RuleError;

/// Failures reported by a [`GameStore`](crate::GameStore).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No game with this id exists.
    #[error("game {0} does not exist")]
    GameNotFound(GameId),

    /// The write would break a storage-level constraint (cell claimed
    /// twice, move on a completed game, player not seated).
    #[error("integrity violation: {0}")]
    Integrity(String),

    /// The backing store could not be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Why a game operation was refused.
///
/// Every variant is raised before anything is written, so a rejected call
/// leaves the game exactly as it was.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    /// Unknown or malformed game-type tag, or a tag that doesn't match the
    /// game's own.
    #[error("invalid game type: {0:?}")]
    InvalidGameType(String),

    /// Fewer than two players, or the same player listed twice.
    #[error("invalid player list: {0}")]
    InvalidPlayerList(String),

    /// Malformed or off-board move payload.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    #[error("cell {0} is already occupied")]
    CellOccupied(Coord),

    #[error("player {player} moved out of turn, {expected} is next")]
    OutOfTurn { player: PlayerId, expected: PlayerId },

    #[error("game {0} not found")]
    SessionNotFound(GameId),

    #[error("game {0} is already completed")]
    SessionAlreadyCompleted(GameId),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GameError {
    /// HTTP-style status for replies: 400 bad input, 404 unknown game,
    /// 409 conflicts with the game's state, 500 store failure.
    pub fn code(&self) -> u16 {
        match self {
            Self::InvalidGameType(_) | Self::InvalidPlayerList(_) | Self::InvalidMove(_) => 400,
            Self::SessionNotFound(_) | Self::Store(StoreError::GameNotFound(_)) => 404,
            Self::CellOccupied(_)
            | Self::OutOfTurn { .. }
            | Self::SessionAlreadyCompleted(_)
            | Self::Store(StoreError::Integrity(_)) => 409,
            Self::Store(StoreError::Unavailable(_)) => 500,
        }
    }
}

impl From<RuleError> for GameError {
    fn from(err: RuleError) -> Self {
        match err {
            RuleError::UnknownGameType(tag) => Self::InvalidGameType(tag),
            RuleError::InvalidMove(reason) => Self::InvalidMove(reason),
            RuleError::CellOccupied(cell) => Self::CellOccupied(cell),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_errors_map_to_flat_variants() {
        assert_eq!(
            GameError::from(RuleError::UnknownGameType("chess".into())),
            GameError::InvalidGameType("chess".into())
        );
        assert_eq!(
            GameError::from(RuleError::CellOccupied(Coord::new(1, 1))),
            GameError::CellOccupied(Coord::new(1, 1))
        );
        assert!(matches!(
            GameError::from(RuleError::InvalidMove("off board".into())),
            GameError::InvalidMove(_)
        ));
    }

    #[test]
    fn test_codes() {
        assert_eq!(GameError::InvalidMove("x".into()).code(), 400);
        assert_eq!(GameError::SessionNotFound(GameId(1)).code(), 404);
        assert_eq!(
            GameError::OutOfTurn {
                player: PlayerId(1),
                expected: PlayerId(2)
            }
            .code(),
            409
        );
        assert_eq!(GameError::SessionAlreadyCompleted(GameId(1)).code(), 409);
        assert_eq!(
            GameError::from(StoreError::Unavailable("down".into())).code(),
            500
        );
    }

    #[test]
    fn test_out_of_turn_message_names_both_players() {
        let err = GameError::OutOfTurn {
            player: PlayerId(1),
            expected: PlayerId(2),
        };
        assert_eq!(err.to_string(), "player P-1 moved out of turn, P-2 is next");
    }
}
