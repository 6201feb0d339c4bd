//! The game session engine for Tabletop.
//!
//! A game session is a fixed list of players taking turns on one board. This
//! crate owns its lifecycle:
//!
//! ```text
//! create ──→ in progress ──(win or full board)──→ completed
//!                 ↑   │
//!                 └───┘ apply_move (turn checked, rule judged, persisted)
//! ```
//!
//! # Key types
//!
//! - [`GameEngine`] — create / apply move / read, with per-game serialization
//! - [`GameStore`] — the persistence collaborator, [`MemoryStore`] in-process
//! - [`GameError`] — every caller-facing rejection
//!
//! Whose turn it is is never stored. It is derived from the move history on
//! each attempt ([`next_player`]), under the game's lock.

mod engine;
mod error;
mod memory;
mod projection;
mod store;

pub use engine::GameEngine;
pub use error::{GameError, StoreError};
pub use memory::MemoryStore;
pub use projection::{next_player, project};
pub use store::{GameRecord, GameStore, unix_millis};
