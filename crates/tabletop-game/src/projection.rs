//! Pure functions over a stored game: the read projection and the turn
//! pointer.

use tabletop_protocol::{GameState, Move, PlayerId, PlayerView};

use crate::GameRecord;

/// Builds the read projection of a stored game.
///
/// Join records are dropped; everything else keeps submission order.
pub fn project(record: &GameRecord) -> GameState {
    let moves: Vec<Move> = record
        .moves
        .iter()
        .filter(|m| !m.is_sentinel())
        .copied()
        .collect();

    let players = record
        .players
        .iter()
        .map(|&id| PlayerView {
            id,
            moves: moves
                .iter()
                .filter(|m| m.player == id)
                .map(|m| m.coord)
                .collect(),
        })
        .collect();

    GameState {
        id: record.id,
        game_type: record.game_type.clone(),
        players,
        moves,
        completed: record.completed,
        winner: record.winner,
    }
}

/// Whose turn it is, derived from the move log.
///
/// The player seated after whoever made the most recent real move; the
/// first seat if nobody has moved. Join records never advance the turn.
/// Returns `None` only for a game with no seats.
pub fn next_player(players: &[PlayerId], moves: &[Move]) -> Option<PlayerId> {
    let first = *players.first()?;
    let Some(last) = moves.iter().rev().find(|m| !m.is_sentinel()) else {
        return Some(first);
    };
    match players.iter().position(|&p| p == last.player) {
        Some(seat) => Some(players[(seat + 1) % players.len()]),
        None => Some(first),
    }
}
