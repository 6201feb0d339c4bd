//! # Tabletop
//!
//! A server for turn-based multiplayer board games.
//!
//! Clients connect over WebSocket, authenticate in a handshake, and then
//! create games, submit moves and read games with [`Command`]s. Every
//! accepted move is pushed as a [`GameEvent`] to all players of the game
//! who are online.
//!
//! ```text
//! client ─ws─→ handler ─→ GameEngine ─→ GameStore
//!    ↑                        │
//!    └── ConnectionRegistry ←─ Dispatcher (events)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tabletop::prelude::*;
//!
//! struct OpenDoor;
//!
//! impl Authenticator for OpenDoor {
//!     async fn authenticate(&self, token: &str) -> Result<PlayerId, TabletopError> {
//!         token
//!             .parse()
//!             .map(PlayerId)
//!             .map_err(|_| TabletopError::AuthFailed("token must be a number".into()))
//!     }
//! }
//!
//! # async fn start() -> Result<(), TabletopError> {
//! let server = TabletopServer::<MemoryStore, OpenDoor, JsonCodec>::builder()
//!     .bind("0.0.0.0:8080")
//!     .build(OpenDoor, MemoryStore::new())
//!     .await?;
//! server.run().await
//! # }
//! ```

mod auth;
mod config;
mod error;
mod handler;
mod server;

pub use auth::Authenticator;
pub use config::ServerConfig;
pub use error::TabletopError;
pub use server::{PROTOCOL_VERSION, TabletopServer, TabletopServerBuilder};

/// Everything a server binary or a client test usually needs.
pub mod prelude {
    pub use crate::{
        Authenticator, PROTOCOL_VERSION, ServerConfig, TabletopError, TabletopServer,
        TabletopServerBuilder,
    };
    pub use tabletop_game::{GameEngine, GameError, GameStore, MemoryStore};
    pub use tabletop_protocol::{
        Codec, Command, Coord, Envelope, GameEvent, GameId, GameState, JsonCodec, Move, Payload,
        PlayerId, Reply, SystemMessage,
    };
    pub use tabletop_rules::{GameRule, Outcome, RuleRegistry, TicTacToe};
}

pub use tabletop_protocol::{Command, GameEvent};
