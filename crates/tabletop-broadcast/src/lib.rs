//! Live event delivery for Tabletop.
//!
//! Two pieces:
//!
//! 1. **Connection registry** ([`ConnectionRegistry`]) — which player is
//!    reachable through which connection right now. At most one connection
//!    per player; a newer one supersedes an older one.
//! 2. **Dispatcher** ([`Dispatcher`], [`Publisher`]) — a FIFO queue with a
//!    single consumer task that routes each event to its destination's
//!    connection, if any.
//!
//! # How it fits in the stack
//!
//! ```text
//! Game engine ──publish──→ [queue] ──worker──→ registry ──try_send──→ connection writer
//! Connection handler ──attach / guard drop──→ registry
//! ```
//!
//! Delivery is best effort. An event for a player with no connection, or
//! whose outbound buffer is full, is dropped; the player catches up on the
//! next read.
//!
//! Both types are generic over the message they carry, so this crate does
//! not care how events are encoded.

mod dispatcher;
mod registry;

pub use dispatcher::{DispatchStats, Dispatcher, Outbound, Publisher};
pub use registry::{ConnectionHandle, ConnectionRegistry, Delivery, RegistrationGuard};
