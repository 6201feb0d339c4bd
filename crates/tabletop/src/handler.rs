//! Per-connection handler: handshake, registration and command routing.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Receive Handshake → validate version
//!   2. Authenticate token → get PlayerId
//!   3. Register in the connection registry → send HandshakeAck
//!   4. Loop: answer commands and system messages, forward pushed events
//!      until a newer connection for the same player takes them over

use std::sync::Arc;
use std::time::Instant;

use tabletop_broadcast::ConnectionHandle;
use tabletop_game::{GameError, GameStore};
use tabletop_protocol::{
    Codec, Command, Envelope, Payload, PlayerId, ProtocolError, Reply, SystemMessage,
};
use tabletop_transport::{Connection, WebSocketConnection};

use crate::server::{PROTOCOL_VERSION, ServerState};
use crate::{Authenticator, TabletopError};

/// Outgoing side of one connection: numbering and encoding of frames.
struct Outgoing<'a, C: Codec> {
    conn: &'a WebSocketConnection,
    codec: &'a C,
    seq: u64,
    start: Instant,
}

impl<C: Codec> Outgoing<'_, C> {
    fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    async fn send(&mut self, payload: Payload) -> Result<(), TabletopError> {
        let envelope = Envelope::new(self.seq, self.elapsed_ms(), payload);
        self.seq += 1;
        let bytes = self.codec.encode(&envelope)?;
        self.conn.send(&bytes).await?;
        Ok(())
    }

    async fn send_error(&mut self, code: u16, message: impl Into<String>) -> Result<(), TabletopError> {
        self.send(Payload::System(SystemMessage::Error {
            code,
            message: message.into(),
        }))
        .await
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<S, A, C>(
    conn: WebSocketConnection,
    state: Arc<ServerState<S, A, C>>,
) -> Result<(), TabletopError>
where
    S: GameStore,
    A: Authenticator,
    C: Codec,
{
    let conn_id = conn.id();
    tracing::debug!(%conn_id, "handling new connection");

    let mut out = Outgoing {
        conn: &conn,
        codec: &state.codec,
        seq: 0,
        start: Instant::now(),
    };

    // --- Step 1: Handshake ---
    let player_id = perform_handshake(&conn, &state, &mut out).await?;
    tracing::info!(%conn_id, %player_id, "player authenticated");

    // --- Step 2: Registration ---
    // The guard releases this connection's entry on every exit path,
    // unless the player has reconnected elsewhere in the meantime.
    let (handle, mut events) = ConnectionHandle::channel(conn_id, state.config.outbound_buffer);
    let _registration = state.registry.attach(player_id, handle);

    out.send(Payload::System(SystemMessage::HandshakeAck {
        player_id,
        server_time: out.elapsed_ms(),
    }))
    .await?;

    // --- Step 3: Message loop ---
    let idle_timeout = state.config.idle_timeout;
    let idle = tokio::time::sleep(idle_timeout);
    tokio::pin!(idle);
    let mut superseded = false;

    loop {
        tokio::select! {
            () = &mut idle => {
                tracing::info!(%player_id, "connection timed out");
                break;
            }

            event = events.recv(), if !superseded => {
                let Some(event) = event else {
                    // A newer connection for this player took over event
                    // delivery. This one still serves commands.
                    tracing::info!(%player_id, %conn_id, "connection superseded, events stop here");
                    superseded = true;
                    continue;
                };
                out.send(Payload::Event(event)).await?;
            }

            frame = conn.recv() => {
                let data = match frame {
                    Ok(Some(data)) => data,
                    Ok(None) => {
                        tracing::info!(%player_id, "connection closed cleanly");
                        break;
                    }
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "recv error");
                        break;
                    }
                };
                idle.as_mut().reset(tokio::time::Instant::now() + idle_timeout);

                let envelope: Envelope = match state.codec.decode(&data) {
                    Ok(env) => env,
                    Err(e) => {
                        tracing::debug!(%player_id, error = %e, "failed to decode envelope");
                        out.send_error(400, format!("malformed frame: {e}")).await?;
                        continue;
                    }
                };

                match envelope.payload {
                    Payload::System(msg) => {
                        let should_close = handle_system_message(&mut out, player_id, msg).await?;
                        if should_close {
                            break;
                        }
                    }
                    Payload::Command(command) => {
                        let result = handle_command(&state, player_id, command).await;
                        out.send(Payload::Reply {
                            request: envelope.seq,
                            result,
                        })
                        .await?;
                    }
                    Payload::Reply { .. } | Payload::Event(_) => {
                        out.send_error(400, "clients may only send System and Command frames")
                            .await?;
                    }
                }
            }
        }
    }

    // _registration drops here → registry entry released.
    Ok(())
}

/// Receives the Handshake, checks the version and resolves the player.
///
/// Failures are reported to the client with an `Error` frame (400 or 401)
/// before the connection is dropped.
async fn perform_handshake<S, A, C>(
    conn: &WebSocketConnection,
    state: &ServerState<S, A, C>,
    out: &mut Outgoing<'_, C>,
) -> Result<PlayerId, TabletopError>
where
    S: GameStore,
    A: Authenticator,
    C: Codec,
{
    let data = match tokio::time::timeout(state.config.handshake_timeout, conn.recv()).await {
        Ok(Ok(Some(data))) => data,
        Ok(Ok(None)) => {
            return Err(ProtocolError::InvalidMessage("connection closed before handshake".into()).into());
        }
        Ok(Err(e)) => return Err(TabletopError::Transport(e)),
        Err(_) => {
            return Err(ProtocolError::InvalidMessage("handshake timed out".into()).into());
        }
    };

    let envelope: Envelope = match state.codec.decode(&data) {
        Ok(env) => env,
        Err(e) => {
            out.send_error(400, "expected Handshake").await?;
            return Err(e.into());
        }
    };

    let (version, token) = match envelope.payload {
        Payload::System(SystemMessage::Handshake { version, token }) => (version, token),
        _ => {
            out.send_error(400, "expected Handshake").await?;
            return Err(ProtocolError::InvalidMessage("first message must be Handshake".into()).into());
        }
    };

    if version != PROTOCOL_VERSION {
        out.send_error(
            400,
            format!("version mismatch: expected {PROTOCOL_VERSION}, got {version}"),
        )
        .await?;
        return Err(ProtocolError::InvalidMessage("protocol version mismatch".into()).into());
    }

    let token = token.as_deref().unwrap_or("");
    match state.auth.authenticate(token).await {
        Ok(player_id) => Ok(player_id),
        Err(e) => {
            out.send_error(401, "unauthorized").await?;
            Err(e)
        }
    }
}

/// Handles a system message. Returns `true` if the connection should close.
async fn handle_system_message<C: Codec>(
    out: &mut Outgoing<'_, C>,
    player_id: PlayerId,
    msg: SystemMessage,
) -> Result<bool, TabletopError> {
    match msg {
        SystemMessage::Heartbeat { client_time } => {
            let server_time = out.elapsed_ms();
            out.send(Payload::System(SystemMessage::HeartbeatAck {
                client_time,
                server_time,
            }))
            .await?;
        }

        SystemMessage::Disconnect { reason } => {
            tracing::info!(%player_id, %reason, "client disconnected");
            return Ok(true);
        }

        SystemMessage::Handshake { .. } => {
            out.send_error(400, "already authenticated").await?;
        }

        _ => {
            tracing::debug!(%player_id, "ignoring unexpected system message");
        }
    }

    Ok(false)
}

/// Runs one command against the engine and turns the outcome into a reply.
async fn handle_command<S, A, C>(
    state: &ServerState<S, A, C>,
    player_id: PlayerId,
    command: Command,
) -> Reply
where
    S: GameStore,
    A: Authenticator,
    C: Codec,
{
    let result = match command {
        Command::CreateGame {
            game_type,
            mut players,
        } => {
            // The caller always plays, first unless they seated themselves.
            if !players.contains(&player_id) {
                players.insert(0, player_id);
            }
            state
                .engine
                .create_game(&game_type, &players)
                .await
                .map(|game| Reply::GameCreated { game_id: game.id })
        }

        Command::SubmitMove {
            game_type,
            game_id,
            params,
        } => state
            .engine
            .apply_move(player_id, &game_type, game_id, &params)
            .await
            .map(|mv| Reply::MoveAccepted { mv }),

        Command::GetGame { game_id } => state
            .engine
            .read_game(game_id)
            .await
            .map(|game| Reply::Game { game }),
    };

    result.unwrap_or_else(|e| rejected(player_id, &e))
}

fn rejected(player_id: PlayerId, err: &GameError) -> Reply {
    let code = err.code();
    if code >= 500 {
        tracing::error!(%player_id, error = %err, "command failed");
    } else {
        tracing::debug!(%player_id, code, error = %err, "command rejected");
    }
    Reply::Rejected {
        code,
        reason: err.to_string(),
    }
}

