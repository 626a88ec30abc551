//! Unified error type for the Parlor server.

use parlor_protocol::ProtocolError;
use parlor_transport::TransportError;

/// Top-level error that wraps the crate-specific errors.
///
/// Room refusals never show up here: the registry turns them into
/// `roomError` events for the requester.
#[derive(Debug, thiserror::Error)]
pub enum ParlorError {
    /// A transport-level error (bind, accept, send, recv).
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A protocol-level error (encode, decode).
    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    /// The registry task has stopped, so commands can't be delivered.
    #[error("room hub is unavailable")]
    HubUnavailable,
}
