//! The persistence collaborator.
//!
//! Tabletop doesn't care how games are stored. It needs four operations and
//! calls them through [`GameStore`]; a SQL-backed store and the in-process
//! [`MemoryStore`](crate::MemoryStore) look the same to the engine.

use std::future::Future;
use std::time::{SystemTime, UNIX_EPOCH};

use tabletop_protocol::{GameId, Move, MoveId, PlayerId};

use crate::StoreError;

/// A game as persisted: seats plus the raw move log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameRecord {
    pub id: GameId,
    pub game_type: String,
    /// Seats in turn order.
    pub players: Vec<PlayerId>,
    /// Every appended move, oldest first, join records included.
    pub moves: Vec<Move>,
    /// Unix milliseconds at creation.
    pub created_at_ms: u64,
    pub completed: bool,
    pub winner: Option<PlayerId>,
}

/// Storage for games and their moves.
///
/// The methods return `Send` futures so an engine generic over the store
/// can run inside spawned tasks. Implementations may still be written with
/// `async fn`.
pub trait GameStore: Send + Sync + 'static {
    /// Creates a not-completed game and returns its id.
    ///
    /// The new game's log holds one join record per player, in seat order.
    /// The game and its join records are written together: on error,
    /// nothing is stored.
    fn create_game(
        &self,
        game_type: &str,
        players: &[PlayerId],
    ) -> impl Future<Output = Result<GameId, StoreError>> + Send;

    /// Appends one move to the game's log.
    ///
    /// # Errors
    /// [`StoreError::GameNotFound`], or [`StoreError::Integrity`] when the
    /// move breaks a storage constraint.
    fn append_move(&self, mv: Move) -> impl Future<Output = Result<MoveId, StoreError>> + Send;

    /// Loads a game, or `None` if it doesn't exist.
    fn read_game(
        &self,
        id: GameId,
    ) -> impl Future<Output = Result<Option<GameRecord>, StoreError>> + Send;

    /// Marks the game completed. `winner` is `None` for a draw.
    fn mark_completed(
        &self,
        id: GameId,
        winner: Option<PlayerId>,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}

/// Milliseconds since the Unix epoch, 0 if the clock is before it.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
