//! Tic-tac-toe, generalized to an m×m board with a run of k to win.

use tabletop_protocol::{Coord, GameState, Move, PlayerId};

use crate::{GameRule, Outcome, RuleError, has_line};

/// Square-board "k in a row".
///
/// Coordinates are `(x, y)` pairs, each in `[0, size)`. The move payload is
/// `{ "coords": [x, y] }`.
#[derive(Debug, Clone)]
pub struct TicTacToe {
    name: String,
    size: i32,
    win_length: usize,
}

impl TicTacToe {
    /// The canonical tag.
    pub const TAG: &'static str = "tic-tac-toe";

    /// A `size`×`size` board won by `win_length` in a row, registered under
    /// `name`. A `size` below 1 is raised to 1.
    pub fn new(name: impl Into<String>, size: i32, win_length: usize) -> Self {
        Self {
            name: name.into(),
            size: size.max(1),
            win_length: win_length.max(1),
        }
    }

    pub fn size(&self) -> i32 {
        self.size
    }

    pub fn win_length(&self) -> usize {
        self.win_length
    }

    fn parse_coords(&self, params: &serde_json::Value) -> Result<Coord, RuleError> {
        let coords = params
            .get("coords")
            .and_then(|c| c.as_array())
            .ok_or_else(|| RuleError::InvalidMove("expected {\"coords\": [x, y]}".into()))?;

        let [x, y] = coords.as_slice() else {
            return Err(RuleError::InvalidMove(format!(
                "expected 2 coordinates, got {}",
                coords.len()
            )));
        };

        let axis = |v: &serde_json::Value| {
            v.as_i64()
                .and_then(|n| i32::try_from(n).ok())
                .ok_or_else(|| RuleError::InvalidMove(format!("coordinate {v} is not an integer")))
        };
        let coord = Coord::new(axis(x)?, axis(y)?);

        let on_board = |n: i32| (0..self.size).contains(&n);
        if !on_board(coord.x) || !on_board(coord.y) {
            return Err(RuleError::InvalidMove(format!(
                "{coord} is outside the {0}x{0} board",
                self.size
            )));
        }
        Ok(coord)
    }
}

impl Default for TicTacToe {
    fn default() -> Self {
        Self::new(Self::TAG, 3, 3)
    }
}

impl GameRule for TicTacToe {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate_and_apply(
        &self,
        player: PlayerId,
        params: &serde_json::Value,
        game: &GameState,
    ) -> Result<(Move, Outcome), RuleError> {
        let coord = self.parse_coords(params)?;

        if game.occupant(coord).is_some() {
            return Err(RuleError::CellOccupied(coord));
        }

        let mv = Move {
            game_id: game.id,
            player,
            coord,
            elapsed_ms: 0,
        };

        // Judge against a local copy; nothing is persisted here.
        let mut own: Vec<Coord> = game.cells_of(player).to_vec();
        own.push(coord);

        let side = self.size.unsigned_abs() as usize;
        let cells = side.saturating_mul(side);
        let outcome = if has_line(own, self.win_length) {
            Outcome::Win
        } else if game.moves.len() + 1 >= cells {
            Outcome::Draw
        } else {
            Outcome::Continue
        };

        tracing::trace!(%player, %coord, ?outcome, "tic-tac-toe move judged");
        Ok((mv, outcome))
    }
}
