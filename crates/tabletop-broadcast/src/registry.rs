//! The connection registry: player id → live connection.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tabletop_protocol::PlayerId;
use tabletop_transport::ConnectionId;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

/// The registry's view of one live connection: its id and the sending half
/// of its bounded outbound buffer.
///
/// The connection handler owns the receiving half and writes whatever
/// arrives to the transport.
#[derive(Debug)]
pub struct ConnectionHandle<M> {
    id: ConnectionId,
    sender: mpsc::Sender<M>,
}

impl<M> Clone for ConnectionHandle<M> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            sender: self.sender.clone(),
        }
    }
}

impl<M> ConnectionHandle<M> {
    pub fn new(id: ConnectionId, sender: mpsc::Sender<M>) -> Self {
        Self { id, sender }
    }

    /// Creates a handle with a fresh buffer of `capacity` messages and
    /// returns the receiving half alongside it.
    pub fn channel(id: ConnectionId, capacity: usize) -> (Self, mpsc::Receiver<M>) {
        let (sender, receiver) = mpsc::channel(capacity.max(1));
        (Self::new(id, sender), receiver)
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    /// Hands `msg` to the connection's buffer without waiting.
    fn try_deliver(&self, msg: M) -> Delivery {
        match self.sender.try_send(msg) {
            Ok(()) => Delivery::Delivered,
            Err(TrySendError::Full(_)) => Delivery::BufferFull,
            Err(TrySendError::Closed(_)) => Delivery::Closed,
        }
    }
}

/// What happened to one routed message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// Queued on the player's connection.
    Delivered,
    /// The player has no registered connection.
    NoConnection,
    /// The connection's buffer is full; the message was dropped.
    BufferFull,
    /// The connection's writer is gone; the message was dropped.
    Closed,
}

/// Concurrency-safe map from player to live connection.
///
/// Cheap to clone; all clones share one map. Registration and removal take
/// the write lock, routing takes the read lock, and no lock is ever held
/// across an `.await`.
pub struct ConnectionRegistry<M> {
    connections: Arc<RwLock<HashMap<PlayerId, ConnectionHandle<M>>>>,
}

impl<M> Clone for ConnectionRegistry<M> {
    fn clone(&self) -> Self {
        Self {
            connections: Arc::clone(&self.connections),
        }
    }
}

impl<M> Default for ConnectionRegistry<M> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M> ConnectionRegistry<M> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            connections: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Makes `handle` the player's connection and returns the one it
    /// superseded, if any.
    ///
    /// The superseded connection is not closed; it simply stops receiving
    /// events.
    pub fn register(
        &self,
        player_id: PlayerId,
        handle: ConnectionHandle<M>,
    ) -> Option<ConnectionHandle<M>> {
        let conn_id = handle.id();
        let previous = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(player_id, handle);

        match &previous {
            Some(old) => tracing::warn!(
                %player_id,
                new = %conn_id,
                old = %old.id(),
                "connection superseded"
            ),
            None => tracing::info!(%player_id, %conn_id, "connection registered"),
        }
        previous
    }

    /// Registers `handle` and returns a guard that releases it when
    /// dropped, whatever the exit path.
    pub fn attach(&self, player_id: PlayerId, handle: ConnectionHandle<M>) -> RegistrationGuard<M> {
        let conn_id = handle.id();
        self.register(player_id, handle);
        RegistrationGuard {
            player_id,
            conn_id,
            registry: self.clone(),
        }
    }

    /// Removes the player's entry, whichever connection it points at.
    pub fn unregister(&self, player_id: PlayerId) -> Option<ConnectionHandle<M>> {
        let removed = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&player_id);
        if removed.is_some() {
            tracing::info!(%player_id, "connection unregistered");
        }
        removed
    }

    /// Removes the player's entry only if it still points at `conn_id`.
    ///
    /// Returns `false` when a newer connection has taken over, which is
    /// then left untouched.
    pub fn release(&self, player_id: PlayerId, conn_id: ConnectionId) -> bool {
        let mut connections = self
            .connections
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        match connections.get(&player_id) {
            Some(current) if current.id() == conn_id => {
                connections.remove(&player_id);
                tracing::info!(%player_id, %conn_id, "connection released");
                true
            }
            _ => false,
        }
    }

    /// Routes `msg` to the player's connection without blocking.
    pub fn deliver(&self, player_id: PlayerId, msg: M) -> Delivery {
        let connections = self
            .connections
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match connections.get(&player_id) {
            Some(handle) => handle.try_deliver(msg),
            None => Delivery::NoConnection,
        }
    }

    /// The connection currently registered for the player.
    pub fn connection_id(&self, player_id: PlayerId) -> Option<ConnectionId> {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&player_id)
            .map(ConnectionHandle::id)
    }

    pub fn contains(&self, player_id: PlayerId) -> bool {
        self.connection_id(player_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.connections
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Releases a registration when dropped.
///
/// Drop runs on normal return, on `?` early exit, and on panic unwinding,
/// so a handler can never leave an entry pointing at a dead connection.
/// The release is conditional: if the player has reconnected since, the
/// newer entry stays.
pub struct RegistrationGuard<M> {
    player_id: PlayerId,
    conn_id: ConnectionId,
    registry: ConnectionRegistry<M>,
}

impl<M> RegistrationGuard<M> {
    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    pub fn connection_id(&self) -> ConnectionId {
        self.conn_id
    }
}

impl<M> Drop for RegistrationGuard<M> {
    fn drop(&mut self) {
        self.registry.release(self.player_id, self.conn_id);
    }
}
