//! Event types for Parlor's wire format.
//!
//! Every frame on the wire is one named event with its arguments:
//!
//! ```text
//! { "event": "joinRoom", "data": { "roomId": "R1", "playerName": "Bob" } }
//! ```
//!
//! [`ClientEvent`] is what clients may send, [`ServerEvent`] is what the
//! relay sends back. Field names are camelCase because the clients are
//! JavaScript.

use std::collections::BTreeMap;
use std::fmt;

use parlor_transport::ConnectionId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Identity types
// ---------------------------------------------------------------------------

/// The client-chosen name of a room.
///
/// Serialized as a plain JSON string (`#[serde(transparent)]`). Any string
/// is accepted, including the empty string.
#[derive(
    Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RoomId(String);

impl RoomId {
    /// Creates a room id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for RoomId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RoomId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for RoomId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// Room snapshots
// ---------------------------------------------------------------------------

/// One player's entry in a [`RoomSnapshot`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerSnapshot {
    /// Display name, exactly as the client supplied it.
    pub name: String,
    /// Whether this player is the room's host.
    pub is_host: bool,
    /// Whether this player has signalled ready.
    pub ready: bool,
}

/// The full state of a room as broadcast in `roomInfo`.
///
/// ```json
/// {
///   "players": { "conn-1": { "name": "Alice", "isHost": true, "ready": false } },
///   "roomId": "R1"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomSnapshot {
    /// Every player in the room, keyed by connection id.
    pub players: BTreeMap<ConnectionId, PlayerSnapshot>,
    /// The room this snapshot describes.
    pub room_id: RoomId,
}

// ---------------------------------------------------------------------------
// ClientEvent: client → server
// ---------------------------------------------------------------------------

/// Events a client can send.
///
/// Adjacently tagged: the variant name (camelCase) goes in `"event"`, the
/// arguments go in `"data"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    tag = "event",
    content = "data",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum ClientEvent {
    /// Create a new room and become its host.
    CreateRoom { room_id: RoomId, player_name: String },

    /// Join an existing room.
    JoinRoom { room_id: RoomId, player_name: String },

    /// Relay an opaque game-state payload to everyone else in the room.
    GameStateUpdate {
        room_id: RoomId,
        game_state: serde_json::Value,
    },

    /// Mark the sender as ready in the given room.
    PlayerReady { room_id: RoomId },
}

impl ClientEvent {
    /// The room this event addresses.
    pub fn room_id(&self) -> &RoomId {
        match self {
            Self::CreateRoom { room_id, .. }
            | Self::JoinRoom { room_id, .. }
            | Self::GameStateUpdate { room_id, .. }
            | Self::PlayerReady { room_id } => room_id,
        }
    }

    /// The wire name of this event, for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateRoom { .. } => "createRoom",
            Self::JoinRoom { .. } => "joinRoom",
            Self::GameStateUpdate { .. } => "gameStateUpdate",
            Self::PlayerReady { .. } => "playerReady",
        }
    }
}

// ---------------------------------------------------------------------------
// ServerEvent: server → client
// ---------------------------------------------------------------------------

/// Events the relay sends to clients.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full snapshot of a room after any membership or ready change.
    RoomInfo(RoomSnapshot),

    /// A create/join request was refused. Sent to the requester only.
    RoomError(String),

    /// A game-state payload relayed verbatim from another member.
    GameStateUpdate(serde_json::Value),

    /// Every player in the room is ready.
    StartGame,

    /// A member's connection went away.
    PlayerLeft(ConnectionId),

    /// The host left and this connection took over.
    NewHost(ConnectionId),
}

// =========================================================================
// Tests
// =========================================================================
