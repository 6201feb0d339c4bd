//! Server configuration.

use std::time::Duration;

/// Tunables for a [`TabletopServer`](crate::TabletopServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Address the WebSocket listener binds to.
    pub bind_addr: String,

    /// How long a new connection has to send its `Handshake`.
    pub handshake_timeout: Duration,

    /// A connection that sends nothing for this long is closed. Clients
    /// keep it open with `Heartbeat`s.
    pub idle_timeout: Duration,

    /// Events buffered per connection. When a slow client falls this far
    /// behind, further events for it are dropped.
    pub outbound_buffer: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:8080".to_string(),
            handshake_timeout: Duration::from_secs(5),
            idle_timeout: Duration::from_secs(15),
            outbound_buffer: 32,
        }
    }
}
