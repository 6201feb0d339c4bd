//! The game engine: create, apply a move, read.
//!
//! # Concurrency
//!
//! Applying a move is a read-modify-write over the game's history: derive
//! whose turn it is, judge the move, append it. Two callers must never both
//! pass the turn check before either appends, so every move attempt on a
//! game runs under that game's own async mutex. Different games never
//! share a lock and proceed in parallel.
//!
//! Events are published while the game's lock is still held. Publishing
//! never waits, and it keeps each player's event order identical to the
//! order moves were persisted.

use std::collections::HashMap;
use std::collections::HashSet;
use std::sync::{Arc, PoisonError};

use tabletop_broadcast::Publisher;
use tabletop_protocol::{GameEvent, GameId, GameState, Move, PlayerId};
use tabletop_rules::{Outcome, RuleRegistry};
use tokio::sync::Mutex;

use crate::{GameError, GameStore, next_player, project, unix_millis};

/// Runs game sessions on top of a [`GameStore`].
///
/// Share it behind an `Arc`; every method takes `&self`.
pub struct GameEngine<S: GameStore> {
    store: S,
    rules: RuleRegistry,
    events: Publisher<GameEvent>,
    locks: LockMap,
}

/// One mutex per game with a move in flight. An entry lives only while
/// some [`GameLock`] refers to it.
type LockMap = std::sync::Mutex<HashMap<GameId, Arc<Mutex<()>>>>;

/// A claim on one game's mutex, taken before waiting on it.
///
/// Dropping the last claim for a game removes its map entry, so the map
/// never outgrows the number of move attempts in flight.
struct GameLock<'a> {
    locks: &'a LockMap,
    game_id: GameId,
    mutex: Arc<Mutex<()>>,
}

impl Drop for GameLock<'_> {
    fn drop(&mut self) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        // Claims are only cloned under the map lock, so a count of two
        // (the map's and ours) cannot grow behind our back.
        let last = locks
            .get(&self.game_id)
            .is_some_and(|m| Arc::ptr_eq(m, &self.mutex) && Arc::strong_count(m) == 2);
        if last {
            locks.remove(&self.game_id);
        }
    }
}

impl<S: GameStore> GameEngine<S> {
    pub fn new(store: S, rules: RuleRegistry, events: Publisher<GameEvent>) -> Self {
        Self {
            store,
            rules,
            events,
            locks: std::sync::Mutex::new(HashMap::new()),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Creates a game of `game_type` for `players`, seated in the given
    /// order.
    ///
    /// The store writes the game and a join record per player in one step.
    /// Each player is then sent a `GameStarted` event.
    ///
    /// # Errors
    /// [`GameError::InvalidGameType`] for an unknown tag,
    /// [`GameError::InvalidPlayerList`] for fewer than two players or a
    /// repeated player.
    pub async fn create_game(
        &self,
        game_type: &str,
        players: &[PlayerId],
    ) -> Result<GameState, GameError> {
        self.rules.get(game_type)?;
        validate_players(players)?;

        let game_id = self.store.create_game(game_type, players).await?;
        let game = self.load(game_id).await?;

        tracing::info!(%game_id, game_type, players = players.len(), "game created");
        self.events.publish_all(
            players.iter().copied(),
            GameEvent::GameStarted { game: game.clone() },
        );
        Ok(game)
    }

    /// Plays `params` for `player` in `game_id`.
    ///
    /// In order: the tag must name a registered rule, the game must exist
    /// and be open and of that type, it must be `player`'s turn, and the
    /// rule must accept the move. Only then is the move persisted and, on a
    /// win or a full board, the game completed. All players receive a
    /// `MovePlayed` event, followed by `GameCompleted` if the game ended.
    ///
    /// # Errors
    /// Any [`GameError`]; on error nothing was written.
    pub async fn apply_move(
        &self,
        player: PlayerId,
        game_type: &str,
        game_id: GameId,
        params: &serde_json::Value,
    ) -> Result<Move, GameError> {
        let rule = self.rules.get(game_type)?;

        let lock = self.lock_for(game_id);
        let _turn = lock.mutex.lock().await;

        let record = self
            .store
            .read_game(game_id)
            .await?
            .ok_or(GameError::SessionNotFound(game_id))?;
        if record.completed {
            return Err(GameError::SessionAlreadyCompleted(game_id));
        }
        if record.game_type != game_type {
            return Err(GameError::InvalidGameType(game_type.to_string()));
        }

        let expected = next_player(&record.players, &record.moves).ok_or_else(|| {
            GameError::InvalidPlayerList(format!("game {game_id} has no players"))
        })?;
        if expected != player {
            tracing::debug!(%game_id, %player, %expected, "move out of turn");
            return Err(GameError::OutOfTurn { player, expected });
        }

        let state = project(&record);
        let (mut mv, outcome) = rule.validate_and_apply(player, params, &state)?;
        mv.elapsed_ms = unix_millis().saturating_sub(record.created_at_ms);

        let move_id = self.store.append_move(mv).await?;
        let winner = outcome.won().then_some(player);
        if outcome.is_terminal() {
            self.store.mark_completed(game_id, winner).await?;
        }

        tracing::info!(%game_id, %player, %move_id, coord = %mv.coord, "move applied");
        self.events
            .publish_all(record.players.iter().copied(), GameEvent::MovePlayed { game_id, mv });

        if outcome.is_terminal() {
            match outcome {
                Outcome::Win => tracing::info!(%game_id, winner = %player, "game won"),
                _ => tracing::info!(%game_id, "game drawn"),
            }
            self.events.publish_all(
                record.players.iter().copied(),
                GameEvent::GameCompleted {
                    game_id,
                    completed: true,
                    winner,
                },
            );
        }

        Ok(mv)
    }

    /// Reads the current projection of a game. No side effects.
    ///
    /// # Errors
    /// [`GameError::SessionNotFound`] if the game doesn't exist.
    pub async fn read_game(&self, game_id: GameId) -> Result<GameState, GameError> {
        self.load(game_id).await
    }

    /// Whose turn it is, or `None` once the game is completed.
    ///
    /// Advisory only: the answer can be stale by the time the caller acts
    /// on it. [`apply_move`](Self::apply_move) re-derives it under the lock.
    pub async fn whose_turn(&self, game_id: GameId) -> Result<Option<PlayerId>, GameError> {
        let record = self
            .store
            .read_game(game_id)
            .await?
            .ok_or(GameError::SessionNotFound(game_id))?;
        if record.completed {
            return Ok(None);
        }
        Ok(next_player(&record.players, &record.moves))
    }

    async fn load(&self, game_id: GameId) -> Result<GameState, GameError> {
        let record = self
            .store
            .read_game(game_id)
            .await?
            .ok_or(GameError::SessionNotFound(game_id))?;
        Ok(project(&record))
    }

    /// Number of games with a move attempt running or queued.
    pub fn moves_in_flight(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn lock_for(&self, game_id: GameId) -> GameLock<'_> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        let mutex = Arc::clone(locks.entry(game_id).or_default());
        GameLock {
            locks: &self.locks,
            game_id,
            mutex,
        }
    }
}

/// At least two players, none repeated.
fn validate_players(players: &[PlayerId]) -> Result<(), GameError> {
    if players.len() < 2 {
        return Err(GameError::InvalidPlayerList(format!(
            "need at least 2 players, got {}",
            players.len()
        )));
    }
    let mut seen = HashSet::with_capacity(players.len());
    if let Some(dup) = players.iter().find(|p| !seen.insert(**p)) {
        return Err(GameError::InvalidPlayerList(format!(
            "player {dup} is listed twice"
        )));
    }
    Ok(())
}
