//! The broadcast dispatcher: one queue, one consumer.
//!
//! Producers hold a [`Publisher`] and enqueue without waiting. A single
//! worker task drains the queue in FIFO order and routes each message
//! through the [`ConnectionRegistry`]. Because there is exactly one consumer
//! and every connection buffer is FIFO too, messages for the same player
//! arrive in the order they were published.

use tabletop_protocol::PlayerId;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::{ConnectionRegistry, Delivery};

/// One queued message and where it goes.
#[derive(Debug, Clone)]
pub struct Outbound<M> {
    pub to: PlayerId,
    pub message: M,
}

/// Counters reported by the worker when it stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    /// Handed to a connection buffer.
    pub delivered: u64,
    /// Destination had no connection.
    pub unroutable: u64,
    /// Destination buffer was full or closed.
    pub dropped: u64,
}

/// Cheap, cloneable producer side of the queue.
pub struct Publisher<M> {
    queue: mpsc::UnboundedSender<Outbound<M>>,
}

impl<M> Clone for Publisher<M> {
    fn clone(&self) -> Self {
        Self {
            queue: self.queue.clone(),
        }
    }
}

impl<M> Publisher<M> {
    /// Enqueues `message` for `to`. Never blocks.
    ///
    /// After the dispatcher has shut down the message is discarded.
    pub fn publish(&self, to: PlayerId, message: M) {
        if self.queue.send(Outbound { to, message }).is_err() {
            tracing::debug!(player_id = %to, "dispatcher stopped, event discarded");
        }
    }

    /// Enqueues one copy of `message` per player, in iteration order.
    pub fn publish_all<I>(&self, players: I, message: M)
    where
        I: IntoIterator<Item = PlayerId>,
        M: Clone,
    {
        for player in players {
            self.publish(player, message.clone());
        }
    }

    /// `true` once the worker has stopped.
    pub fn is_closed(&self) -> bool {
        self.queue.is_closed()
    }
}

/// Owns the worker task. Start it once at server startup, shut it down at
/// exit.
pub struct Dispatcher<M> {
    publisher: Publisher<M>,
    stop: Option<oneshot::Sender<()>>,
    worker: JoinHandle<DispatchStats>,
}

impl<M: Send + 'static> Dispatcher<M> {
    /// Spawns the worker, routing through `registry`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn start(registry: ConnectionRegistry<M>) -> Self {
        let (queue, rx) = mpsc::unbounded_channel();
        let (stop, stop_rx) = oneshot::channel();
        let worker = tokio::spawn(run(rx, registry, stop_rx));
        tracing::info!("broadcast dispatcher started");
        Self {
            publisher: Publisher { queue },
            stop: Some(stop),
            worker,
        }
    }

    /// A new producer handle.
    pub fn publisher(&self) -> Publisher<M> {
        self.publisher.clone()
    }

    /// Stops the worker and waits for it. Messages still queued are
    /// discarded.
    pub async fn shutdown(mut self) -> DispatchStats {
        if let Some(stop) = self.stop.take() {
            let _ = stop.send(());
        }
        match (&mut self.worker).await {
            Ok(stats) => stats,
            Err(e) => {
                tracing::error!(error = %e, "dispatcher worker failed");
                DispatchStats::default()
            }
        }
    }
}

/// The worker loop. A stop signal, or the `Dispatcher` being dropped, ends it.
async fn run<M>(
    mut rx: mpsc::UnboundedReceiver<Outbound<M>>,
    registry: ConnectionRegistry<M>,
    mut stop: oneshot::Receiver<()>,
) -> DispatchStats {
    let mut stats = DispatchStats::default();

    loop {
        let next = tokio::select! {
            biased;
            _ = &mut stop => break,
            next = rx.recv() => next,
        };
        let Some(Outbound { to, message }) = next else {
            break;
        };

        match registry.deliver(to, message) {
            Delivery::Delivered => stats.delivered += 1,
            Delivery::NoConnection => {
                stats.unroutable += 1;
                tracing::trace!(player_id = %to, "no connection, event dropped");
            }
            Delivery::BufferFull => {
                stats.dropped += 1;
                tracing::warn!(player_id = %to, "outbound buffer full, event dropped");
            }
            Delivery::Closed => {
                stats.dropped += 1;
                tracing::debug!(player_id = %to, "connection closing, event dropped");
            }
        }
    }

    tracing::info!(
        delivered = stats.delivered,
        unroutable = stats.unroutable,
        dropped = stats.dropped,
        "broadcast dispatcher stopped"
    );
    stats
}
