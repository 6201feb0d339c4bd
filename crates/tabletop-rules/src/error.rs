//! Error types for the rules layer.

use tabletop_protocol::Coord;

/// Why a rule refused a move or a tag lookup failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RuleError {
    /// No rule is registered under this tag, or the tag is malformed.
    #[error("unknown game type: {0:?}")]
    UnknownGameType(String),

    /// The payload is malformed or points off the board.
    #[error("invalid move: {0}")]
    InvalidMove(String),

    /// Some player already holds the target cell.
    #[error("cell {0} is already occupied")]
    CellOccupied(Coord),
}
