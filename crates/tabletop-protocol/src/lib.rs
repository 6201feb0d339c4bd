//! Wire protocol and shared data model for Tabletop.
//!
//! This crate defines everything that more than one layer needs to agree on:
//!
//! - **Identity** ([`PlayerId`], [`GameId`], [`MoveId`]) — newtype ids.
//! - **Board data** ([`Coord`], [`Move`]) — one placement on the board.
//! - **Projection** ([`GameState`], [`PlayerView`]) — the materialized view
//!   of a game, rebuilt from its move history on every read.
//! - **Events** ([`GameEvent`]) — what the broadcast dispatcher pushes to
//!   live connections.
//! - **Envelope** ([`Envelope`], [`Payload`], [`SystemMessage`],
//!   [`Command`], [`Reply`]) — the frames that travel over a connection.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]) — bytes in, bytes out.
//!
//! ```text
//! Transport (bytes) → Protocol (Envelope) → Engine (GameState, Move)
//! ```

mod codec;
mod error;
mod model;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use model::{Coord, GameEvent, GameId, GameState, Move, MoveId, PlayerId, PlayerView};
pub use types::{Command, Envelope, Payload, Reply, SystemMessage};
