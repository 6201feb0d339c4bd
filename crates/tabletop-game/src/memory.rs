//! In-process [`GameStore`] backed by a `HashMap`.

use std::collections::HashMap;

use tabletop_protocol::{GameId, Move, MoveId, PlayerId};
use tokio::sync::RwLock;

use crate::{GameRecord, GameStore, StoreError, unix_millis};

#[derive(Default)]
struct Tables {
    games: HashMap<GameId, GameRecord>,
    next_game: u64,
    next_move: u64,
}

/// Keeps every game in memory for the life of the process.
///
/// Enforces the same constraints a relational schema would: moves must
/// reference a seated player of an open game, and a cell can be claimed
/// once per game.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of games stored.
    pub async fn len(&self) -> usize {
        self.tables.read().await.games.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl GameStore for MemoryStore {
    async fn create_game(&self, game_type: &str, players: &[PlayerId]) -> Result<GameId, StoreError> {
        let mut tables = self.tables.write().await;
        tables.next_game += 1;
        let id = GameId(tables.next_game);
        let joins: Vec<Move> = players.iter().map(|&p| Move::joined(id, p)).collect();
        tables.next_move += joins.len() as u64;
        tables.games.insert(
            id,
            GameRecord {
                id,
                game_type: game_type.to_string(),
                players: players.to_vec(),
                moves: joins,
                created_at_ms: unix_millis(),
                completed: false,
                winner: None,
            },
        );
        Ok(id)
    }

    async fn append_move(&self, mv: Move) -> Result<MoveId, StoreError> {
        let mut tables = self.tables.write().await;
        let game = tables
            .games
            .get_mut(&mv.game_id)
            .ok_or(StoreError::GameNotFound(mv.game_id))?;

        if game.completed {
            return Err(StoreError::Integrity(format!(
                "game {} is completed",
                mv.game_id
            )));
        }
        if !game.players.contains(&mv.player) {
            return Err(StoreError::Integrity(format!(
                "player {} is not seated in game {}",
                mv.player, mv.game_id
            )));
        }
        if !mv.is_sentinel() && game.moves.iter().any(|m| m.coord == mv.coord) {
            return Err(StoreError::Integrity(format!(
                "cell {} is already claimed in game {}",
                mv.coord, mv.game_id
            )));
        }

        game.moves.push(mv);
        tables.next_move += 1;
        Ok(MoveId(tables.next_move))
    }

    async fn read_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError> {
        Ok(self.tables.read().await.games.get(&id).cloned())
    }

    async fn mark_completed(&self, id: GameId, winner: Option<PlayerId>) -> Result<(), StoreError> {
        let mut tables = self.tables.write().await;
        let game = tables.games.get_mut(&id).ok_or(StoreError::GameNotFound(id))?;
        game.completed = true;
        game.winner = winner;
        Ok(())
    }
}
