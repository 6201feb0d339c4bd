//! Frame types: what travels over a live connection.
//!
//! Every frame is an [`Envelope`]. Its [`Payload`] says which of four
//! conversations the frame belongs to:
//!
//! ```text
//! System   both ways    handshake, heartbeat, disconnect, errors
//! Command  client → srv create a game, submit a move, read a game
//! Reply    srv → client the answer to one Command, matched by `request`
//! Event    srv → client pushed by the broadcast dispatcher
//! ```

use serde::{Deserialize, Serialize};

use crate::{GameEvent, GameId, GameState, Move, PlayerId};

// ---------------------------------------------------------------------------
// SystemMessage
// ---------------------------------------------------------------------------

/// Connection plumbing, independent of any game.
///
/// Internally tagged: `{ "type": "Heartbeat", "client_time": 5000 }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum SystemMessage {
    /// Client → Server: first frame on every connection. `token` is handed
    /// to the authenticator to resolve the player's identity.
    Handshake { version: u32, token: Option<String> },

    /// Server → Client: the connection is registered for `player_id`.
    HandshakeAck { player_id: PlayerId, server_time: u64 },

    /// Either direction: the sender is closing the connection.
    Disconnect { reason: String },

    /// Client → Server keep-alive.
    Heartbeat { client_time: u64 },

    /// Server → Client: echoes `client_time` so the client can measure RTT.
    HeartbeatAck { client_time: u64, server_time: u64 },

    /// Server → Client: a connection-level failure. `code` follows HTTP
    /// conventions (400 bad request, 401 unauthorized).
    Error { code: u16, message: String },
}

// ---------------------------------------------------------------------------
// Command / Reply
// ---------------------------------------------------------------------------

/// Requests a client can make once authenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Command {
    /// Starts a game between the caller and `players`.
    CreateGame {
        game_type: String,
        players: Vec<PlayerId>,
    },

    /// Plays a move. `params` is interpreted by the game's rule; for
    /// tic-tac-toe it is `{ "coords": [x, y] }`.
    SubmitMove {
        game_type: String,
        game_id: GameId,
        params: serde_json::Value,
    },

    /// Reads the current projection of a game.
    GetGame { game_id: GameId },
}

/// The server's answer to one [`Command`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Reply {
    GameCreated { game_id: GameId },

    MoveAccepted {
        #[serde(rename = "move")]
        mv: Move,
    },

    Game { game: GameState },

    /// The command was refused and nothing changed. `code` follows HTTP
    /// conventions: 400 invalid input, 404 unknown game, 409 conflict
    /// with the game's state.
    Rejected { code: u16, reason: String },
}

// ---------------------------------------------------------------------------
// Payload / Envelope
// ---------------------------------------------------------------------------

/// The content of a frame.
///
/// Adjacently tagged:
/// `{ "type": "Command", "data": { "type": "GetGame", "game_id": 4 } }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum Payload {
    System(SystemMessage),
    Command(Command),
    /// `request` is the `seq` of the envelope that carried the command.
    Reply { request: u64, result: Reply },
    Event(GameEvent),
}

/// The top-level frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Per-sender counter. Replies point back at it.
    pub seq: u64,

    /// Milliseconds since the sender's clock origin (connection start on
    /// the server).
    pub timestamp: u64,

    pub payload: Payload,
}

impl Envelope {
    pub fn new(seq: u64, timestamp: u64, payload: Payload) -> Self {
        Self {
            seq,
            timestamp,
            payload,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coord;

    #[test]
    fn test_handshake_json_format() {
        let msg = SystemMessage::Handshake {
            version: 1,
            token: Some("abc".into()),
        };
        let json: serde_json::Value = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "Handshake");
        assert_eq!(json["version"], 1);
        assert_eq!(json["token"], "abc");
    }

    #[test]
    fn test_submit_move_decodes_from_client_json() {
        let raw = r#"{
            "seq": 4,
            "timestamp": 100,
            "payload": {
                "type": "Command",
                "data": {
                    "type": "SubmitMove",
                    "game_type": "tic-tac-toe",
                    "game_id": 9,
                    "params": { "coords": [1, 2] }
                }
            }
        }"#;
        let env: Envelope = serde_json::from_str(raw).unwrap();
        assert_eq!(env.seq, 4);
        match env.payload {
            Payload::Command(Command::SubmitMove {
                game_type,
                game_id,
                params,
            }) => {
                assert_eq!(game_type, "tic-tac-toe");
                assert_eq!(game_id, GameId(9));
                assert_eq!(params["coords"][1], 2);
            }
            other => panic!("expected SubmitMove, got {other:?}"),
        }
    }

    #[test]
    fn test_reply_carries_request_seq() {
        let env = Envelope::new(
            1,
            0,
            Payload::Reply {
                request: 4,
                result: Reply::MoveAccepted {
                    mv: Move {
                        game_id: GameId(9),
                        player: PlayerId(1),
                        coord: Coord::new(1, 2),
                        elapsed_ms: 30,
                    },
                },
            },
        );
        let json: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert_eq!(json["payload"]["type"], "Reply");
        assert_eq!(json["payload"]["data"]["request"], 4);
        assert_eq!(json["payload"]["data"]["result"]["type"], "MoveAccepted");
        assert_eq!(json["payload"]["data"]["result"]["move"]["x"], 1);
    }

    #[test]
    fn test_rejected_reply_roundtrip() {
        let reply = Reply::Rejected {
            code: 409,
            reason: "out of turn".into(),
        };
        let bytes = serde_json::to_vec(&reply).unwrap();
        let back: Reply = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(back, reply);
    }

    #[test]
    fn test_event_payload_is_adjacently_tagged() {
        let env = Envelope::new(
            2,
            0,
            Payload::Event(GameEvent::GameCompleted {
                game_id: GameId(1),
                completed: true,
                winner: None,
            }),
        );
        let json: serde_json::Value = serde_json::to_value(&env).unwrap();
        assert_eq!(json["payload"]["type"], "Event");
        assert_eq!(json["payload"]["data"]["type"], "GameCompleted");
        assert!(json["payload"]["data"]["winner"].is_null());
    }
}
