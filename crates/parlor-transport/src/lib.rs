//! Transport abstraction layer for Parlor.
//!
//! Provides the [`Transport`], [`Handshake`] and [`Connection`] traits that
//! the relay server is written against, plus the [`ConnectionId`] every
//! accepted connection is stamped with.
//!
//! Accepting is split in two. [`Transport::accept`] only takes the raw
//! socket off the listener; the protocol upgrade runs later through
//! [`Handshake::complete`], so a peer that stalls mid-handshake never holds
//! up the accept loop.
//!
//! # Feature Flags
//!
//! - `websocket` (default): WebSocket transport via `tokio-tungstenite`

#![allow(async_fn_in_trait)]

mod error;
#[cfg(feature = "websocket")]
mod websocket;

pub use error::{ParseConnectionIdError, TransportError};
#[cfg(feature = "websocket")]
pub use websocket::{PendingWebSocket, WebSocketConnection, WebSocketTransport};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Prefix used when a connection id is rendered as text.
const CONNECTION_ID_PREFIX: &str = "conn-";

/// Opaque identifier for a connection.
///
/// Assigned by the transport on accept and never reused within a process.
/// On the wire it is a string (`"conn-7"`), which also makes it usable as a
/// JSON object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Creates a new `ConnectionId` from a raw `u64`.
    pub fn new(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{CONNECTION_ID_PREFIX}{}", self.0)
    }
}

impl FromStr for ConnectionId {
    type Err = ParseConnectionIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.strip_prefix(CONNECTION_ID_PREFIX)
            .and_then(|raw| raw.parse::<u64>().ok())
            .map(Self)
            .ok_or_else(|| ParseConnectionIdError(s.to_string()))
    }
}

impl Serialize for ConnectionId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ConnectionId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Accepts new incoming connections.
pub trait Transport: Send + Sync + 'static {
    /// The not-yet-upgraded connection produced by [`accept`](Self::accept).
    type Pending: Handshake;
    /// The error type for transport operations.
    type Error: std::error::Error + Send + Sync;

    /// Waits for the next peer and takes it off the listener.
    ///
    /// Returns as soon as the socket is accepted; no bytes are read from
    /// the peer here.
    async fn accept(&mut self) -> Result<Self::Pending, Self::Error>;
}

/// An accepted peer whose protocol handshake has not run yet.
pub trait Handshake: Send + 'static {
    /// The connection produced once the handshake succeeds.
    type Connection: Connection;
    /// The error type for a failed handshake.
    type Error: std::error::Error + Send + Sync;

    /// The id the connection will carry. Assigned on accept.
    fn id(&self) -> ConnectionId;

    /// Runs the handshake to completion.
    ///
    /// Waits on the peer, so callers bound it with a timeout.
    async fn complete(self) -> Result<Self::Connection, Self::Error>;
}

/// A single connection that can send and receive bytes.
pub trait Connection: Send + Sync + 'static {
    /// The error type for connection operations.
    type Error: std::error::Error + Send + Sync;

    /// Sends data to the remote peer.
    async fn send(&self, data: &[u8]) -> Result<(), Self::Error>;

    /// Receives the next message from the remote peer.
    ///
    /// Returns `Ok(None)` when the connection is cleanly closed.
    async fn recv(&self) -> Result<Option<Vec<u8>>, Self::Error>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), Self::Error>;

    /// Returns the unique identifier for this connection.
    fn id(&self) -> ConnectionId;
}
