//! The `GameRule` trait, the extension point for game variants.

use tabletop_protocol::{GameState, Move, PlayerId};

use crate::RuleError;

/// What a legal move did to the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Play goes on.
    Continue,
    /// The acting player won with this move.
    Win,
    /// The board is full and nobody won.
    Draw,
}

impl Outcome {
    /// `true` only for [`Outcome::Win`].
    pub fn won(self) -> bool {
        matches!(self, Self::Win)
    }

    /// `true` when the game must be completed after this move.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Continue)
    }
}

/// A game variant's rules.
///
/// A rule judges one proposed move against a read-only projection of the
/// game. It never persists anything and never checks turn order; the
/// engine has already done that, under the game's lock, before calling in.
///
/// Object safe: the registry stores rules as `Arc<dyn GameRule>`.
pub trait GameRule: Send + Sync + 'static {
    /// The game-type tag this rule is registered under.
    fn name(&self) -> &str;

    /// Parses `params`, validates the move, and judges the outcome.
    ///
    /// The returned [`Move`] has `elapsed_ms` set to 0; timing belongs to
    /// the caller.
    ///
    /// # Errors
    /// [`RuleError::InvalidMove`] for a malformed or off-board payload,
    /// [`RuleError::CellOccupied`] when any player already holds the cell.
    fn validate_and_apply(
        &self,
        player: PlayerId,
        params: &serde_json::Value,
        game: &GameState,
    ) -> Result<(Move, Outcome), RuleError>;
}
