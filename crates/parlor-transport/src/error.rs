/// Errors that can occur in the transport layer.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Sending data failed.
    #[error("send failed: {0}")]
    SendFailed(#[source] std::io::Error),

    /// Receiving data failed.
    #[error("receive failed: {0}")]
    ReceiveFailed(#[source] std::io::Error),

    /// Binding or accepting connections failed.
    #[error("accept failed: {0}")]
    AcceptFailed(#[source] std::io::Error),

    /// The peer was accepted but the protocol upgrade failed.
    #[error("handshake failed: {0}")]
    HandshakeFailed(#[source] std::io::Error),
}

/// A string could not be parsed as a [`ConnectionId`](crate::ConnectionId).
///
/// Connection ids travel on the wire as `conn-<n>`; anything else is
/// rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid connection id: {0:?}")]
pub struct ParseConnectionIdError(pub String);
