//! Game rules for Tabletop.
//!
//! Pure logic, no I/O and no async:
//!
//! - [`has_line`] / [`find_line`] — the line finder shared by every
//!   "n in a row" game.
//! - [`GameRule`] — the capability a game variant implements: validate a
//!   proposed move against a game's state and judge the outcome.
//! - [`TicTacToe`] — the canonical variant, with configurable board size and
//!   run length.
//! - [`RuleRegistry`] — variants looked up by game-type tag.

mod error;
mod line;
mod registry;
mod rule;
mod tictactoe;

pub use error::RuleError;
pub use line::{find_line, has_line};
pub use registry::{RuleRegistry, validate_game_type};
pub use rule::{GameRule, Outcome};
pub use tictactoe::TicTacToe;
