//! The shared data model: ids, board coordinates, moves, and the game
//! projection that reads return and events carry.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// A unique identifier for a player.
///
/// Issued by the account store, never by Tabletop. Serialized as the bare
/// number, so `PlayerId(42)` is `42` in JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(pub u64);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "P-{}", self.0)
    }
}

/// A unique identifier for one game session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(pub u64);

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G-{}", self.0)
    }
}

/// Row id the store assigns to an appended move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MoveId(pub u64);

impl fmt::Display for MoveId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "M-{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// Board data
// ---------------------------------------------------------------------------

/// A cell on the board. `x` is the row index, `y` the column index.
///
/// Signed so the join sentinel `(-1, -1)` and neighbour arithmetic near the
/// edge both stay representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub x: i32,
    pub y: i32,
}

impl Coord {
    /// Placeholder stored when a player joins a game without moving.
    pub const JOINED: Coord = Coord { x: -1, y: -1 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Returns `true` for the join placeholder.
    pub fn is_sentinel(&self) -> bool {
        *self == Self::JOINED
    }

    /// The cell `steps` away along `(dx, dy)`.
    pub fn step(self, (dx, dy): (i32, i32), steps: i32) -> Self {
        Self {
            x: self.x + dx * steps,
            y: self.y + dy * steps,
        }
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// One placement by one player in one game.
///
/// The coordinate is flattened on the wire:
/// `{"game_id":1,"player":7,"x":0,"y":2,"elapsed_ms":1500}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    pub game_id: GameId,
    pub player: PlayerId,
    #[serde(flatten)]
    pub coord: Coord,
    /// Milliseconds between game creation and this move.
    pub elapsed_ms: u64,
}

impl Move {
    /// Builds the record stored when `player` joins `game_id`.
    pub fn joined(game_id: GameId, player: PlayerId) -> Self {
        Self {
            game_id,
            player,
            coord: Coord::JOINED,
            elapsed_ms: 0,
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.coord.is_sentinel()
    }
}

// ---------------------------------------------------------------------------
// Projection
// ---------------------------------------------------------------------------

/// One player's seat in a game and the cells they have claimed, in
/// submission order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerView {
    pub id: PlayerId,
    pub moves: Vec<Coord>,
}

/// The materialized state of a game.
///
/// Never stored: it is rebuilt from the persisted move history on every
/// read, so two reads with no move in between are equal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub id: GameId,
    pub game_type: String,
    /// Seats in turn order.
    pub players: Vec<PlayerView>,
    /// Every real placement, oldest first. Join records are excluded.
    pub moves: Vec<Move>,
    pub completed: bool,
    pub winner: Option<PlayerId>,
}

impl GameState {
    /// Player ids in turn order.
    pub fn player_ids(&self) -> Vec<PlayerId> {
        self.players.iter().map(|p| p.id).collect()
    }

    pub fn has_player(&self, player: PlayerId) -> bool {
        self.players.iter().any(|p| p.id == player)
    }

    /// The cells `player` has claimed so far.
    pub fn cells_of(&self, player: PlayerId) -> &[Coord] {
        self.players
            .iter()
            .find(|p| p.id == player)
            .map(|p| p.moves.as_slice())
            .unwrap_or(&[])
    }

    /// Who holds `cell`, if anyone.
    pub fn occupant(&self, cell: Coord) -> Option<PlayerId> {
        self.moves
            .iter()
            .find(|m| m.coord == cell)
            .map(|m| m.player)
    }

    /// The most recent real placement.
    pub fn last_move(&self) -> Option<&Move> {
        self.moves.last()
    }
}

// ---------------------------------------------------------------------------
// Live events
// ---------------------------------------------------------------------------

/// An event pushed to a player's live connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A game including this player was created.
    GameStarted { game: GameState },

    /// A move was accepted in one of this player's games.
    MovePlayed {
        game_id: GameId,
        #[serde(rename = "move")]
        mv: Move,
    },

    /// The game ended. `winner` is `None` for a draw.
    GameCompleted {
        game_id: GameId,
        completed: bool,
        winner: Option<PlayerId>,
    },
}

impl GameEvent {
    pub fn game_id(&self) -> GameId {
        match self {
            Self::GameStarted { game } => game.id,
            Self::MovePlayed { game_id, .. } | Self::GameCompleted { game_id, .. } => *game_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_state() -> GameState {
        let game_id = GameId(3);
        let mv = |player, x, y| Move {
            game_id,
            player: PlayerId(player),
            coord: Coord::new(x, y),
            elapsed_ms: 0,
        };
        GameState {
            id: game_id,
            game_type: "tic-tac-toe".into(),
            players: vec![
                PlayerView {
                    id: PlayerId(1),
                    moves: vec![Coord::new(0, 0)],
                },
                PlayerView {
                    id: PlayerId(2),
                    moves: vec![Coord::new(1, 1)],
                },
            ],
            moves: vec![mv(1, 0, 0), mv(2, 1, 1)],
            completed: false,
            winner: None,
        }
    }

    #[test]
    fn test_ids_serialize_as_plain_numbers() {
        assert_eq!(serde_json::to_string(&PlayerId(42)).unwrap(), "42");
        assert_eq!(serde_json::to_string(&GameId(7)).unwrap(), "7");
        let id: MoveId = serde_json::from_str("9").unwrap();
        assert_eq!(id, MoveId(9));
    }

    #[test]
    fn test_ids_display() {
        assert_eq!(PlayerId(42).to_string(), "P-42");
        assert_eq!(GameId(7).to_string(), "G-7");
        assert_eq!(Coord::new(1, 2).to_string(), "(1, 2)");
    }

    #[test]
    fn test_move_flattens_coordinates() {
        let mv = Move {
            game_id: GameId(1),
            player: PlayerId(7),
            coord: Coord::new(0, 2),
            elapsed_ms: 1500,
        };
        let json: serde_json::Value = serde_json::to_value(mv).unwrap();
        assert_eq!(json["x"], 0);
        assert_eq!(json["y"], 2);
        assert_eq!(json["player"], 7);
        let back: Move = serde_json::from_value(json).unwrap();
        assert_eq!(back, mv);
    }

    #[test]
    fn test_joined_move_is_sentinel() {
        let mv = Move::joined(GameId(1), PlayerId(2));
        assert!(mv.is_sentinel());
        assert!(!Coord::new(0, 0).is_sentinel());
    }

    #[test]
    fn test_coord_step() {
        assert_eq!(Coord::new(1, 1).step((1, -1), 2), Coord::new(3, -1));
        assert_eq!(Coord::new(1, 1).step((0, 1), -1), Coord::new(1, 0));
    }

    #[test]
    fn test_state_occupant_and_cells() {
        let state = sample_state();
        assert_eq!(state.occupant(Coord::new(1, 1)), Some(PlayerId(2)));
        assert_eq!(state.occupant(Coord::new(2, 2)), None);
        assert_eq!(state.cells_of(PlayerId(1)), &[Coord::new(0, 0)]);
        assert!(state.cells_of(PlayerId(99)).is_empty());
        assert_eq!(state.player_ids(), vec![PlayerId(1), PlayerId(2)]);
        assert_eq!(state.last_move().map(|m| m.player), Some(PlayerId(2)));
    }

    #[test]
    fn test_completed_event_json_format() {
        let event = GameEvent::GameCompleted {
            game_id: GameId(3),
            completed: true,
            winner: Some(PlayerId(1)),
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "GameCompleted");
        assert_eq!(json["completed"], true);
        assert_eq!(json["winner"], 1);
        assert_eq!(event.game_id(), GameId(3));
    }

    #[test]
    fn test_move_played_event_uses_move_key() {
        let state = sample_state();
        let event = GameEvent::MovePlayed {
            game_id: state.id,
            mv: state.moves[0],
        };
        let json: serde_json::Value = serde_json::to_value(&event).unwrap();
        assert_eq!(json["move"]["x"], 0);
        let back: GameEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
