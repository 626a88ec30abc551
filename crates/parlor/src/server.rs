//! `ParlorServer` builder and server loop.
//!
//! This is the entry point for running a relay. It ties the layers
//! together: transport → protocol → hub (room registry).

use std::sync::Arc;
use std::time::Duration;

use parlor_protocol::{Codec, JsonCodec};
use parlor_transport::{Handshake, Transport, WebSocketTransport};

use crate::handler::handle_connection;
use crate::hub::spawn_hub;
use crate::{HubHandle, ParlorError};

/// Default interface to listen on.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default port to listen on.
pub const DEFAULT_PORT: u16 = 3000;

/// Default capacity of the hub's command queue.
const DEFAULT_HUB_CHANNEL_SIZE: usize = 1024;

/// Default number of events queued for one client before it is dropped.
const DEFAULT_OUTBOUND_QUEUE_SIZE: usize = 256;

/// Default time a peer gets to finish the WebSocket upgrade.
const DEFAULT_HANDSHAKE_TIMEOUT: Duration = Duration::from_secs(10);

/// Shared server state passed to each connection handler task.
pub(crate) struct ServerState<C: Codec> {
    pub(crate) hub: HubHandle,
    pub(crate) codec: C,
    pub(crate) outbound_queue_size: usize,
}

/// Builder for configuring and starting a Parlor server.
///
/// # Example
///
/// ```rust,no_run
/// use parlor::ParlorServer;
///
/// # async fn start() -> Result<(), parlor::ParlorError> {
/// let server = ParlorServer::builder()
///     .bind("0.0.0.0:3000")
///     .build()
///     .await?;
/// server.run().await
/// # }
/// ```
pub struct ParlorServerBuilder {
    bind_addr: String,
    hub_channel_size: usize,
    outbound_queue_size: usize,
    handshake_timeout: Duration,
}

impl ParlorServerBuilder {
    /// Creates a new builder listening on `DEFAULT_HOST:DEFAULT_PORT`.
    pub fn new() -> Self {
        Self {
            bind_addr: format!("{DEFAULT_HOST}:{DEFAULT_PORT}"),
            hub_channel_size: DEFAULT_HUB_CHANNEL_SIZE,
            outbound_queue_size: DEFAULT_OUTBOUND_QUEUE_SIZE,
            handshake_timeout: DEFAULT_HANDSHAKE_TIMEOUT,
        }
    }

    /// Sets the address to bind the server to.
    pub fn bind(mut self, addr: &str) -> Self {
        self.bind_addr = addr.to_string();
        self
    }

    /// Sets how many commands may queue up in front of the hub before
    /// connection handlers have to wait. Clamped to at least 1.
    pub fn hub_channel_size(mut self, size: usize) -> Self {
        self.hub_channel_size = size.max(1);
        self
    }

    /// Sets how many events may wait for one client's socket. A client
    /// that falls further behind is dropped. Clamped to at least 1.
    pub fn outbound_queue_size(mut self, size: usize) -> Self {
        self.outbound_queue_size = size.max(1);
        self
    }

    /// Sets how long an accepted peer has to complete the WebSocket
    /// upgrade before it is dropped.
    pub fn handshake_timeout(mut self, timeout: Duration) -> Self {
        self.handshake_timeout = timeout;
        self
    }

    /// Binds the listener and starts the hub.
    ///
    /// Uses `JsonCodec` and `WebSocketTransport`.
    pub async fn build(self) -> Result<ParlorServer<JsonCodec>, ParlorError> {
        let transport = WebSocketTransport::bind(&self.bind_addr).await?;

        let state = Arc::new(ServerState {
            hub: spawn_hub(self.hub_channel_size),
            codec: JsonCodec,
            outbound_queue_size: self.outbound_queue_size,
        });

        Ok(ParlorServer {
            transport,
            state,
            handshake_timeout: self.handshake_timeout,
        })
    }
}

impl Default for ParlorServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// A bound Parlor server.
///
/// Call [`run()`](Self::run) to start accepting connections.
pub struct ParlorServer<C: Codec> {
    transport: WebSocketTransport,
    state: Arc<ServerState<C>>,
    handshake_timeout: Duration,
}

impl ParlorServer<JsonCodec> {
    /// Creates a new builder.
    pub fn builder() -> ParlorServerBuilder {
        ParlorServerBuilder::new()
    }
}

impl<C: Codec> ParlorServer<C> {
    /// Returns the local address the server is bound to.
    pub fn local_addr(&self) -> std::io::Result<std::net::SocketAddr> {
        self.transport.local_addr()
    }

    /// Returns a handle to the room hub, for introspection.
    pub fn hub(&self) -> HubHandle {
        self.state.hub.clone()
    }

    /// Runs the server accept loop.
    ///
    /// Each accepted peer gets its own task, which performs the WebSocket
    /// upgrade under the handshake timeout and then runs the connection
    /// handler. A failed accept is logged and skipped. Runs until the
    /// future is dropped.
    pub async fn run(mut self) -> Result<(), ParlorError> {
        tracing::info!("Parlor server running");

        loop {
            match self.transport.accept().await {
                Ok(pending) => {
                    let state = Arc::clone(&self.state);
                    let handshake_timeout = self.handshake_timeout;
                    tokio::spawn(async move {
                        let conn_id = pending.id();
                        let addr = pending.peer_addr();
                        let conn = match tokio::time::timeout(
                            handshake_timeout,
                            pending.complete(),
                        )
                        .await
                        {
                            Ok(Ok(conn)) => conn,
                            Ok(Err(e)) => {
                                tracing::debug!(%conn_id, %addr, error = %e, "handshake failed");
                                return;
                            }
                            Err(_) => {
                                tracing::debug!(%conn_id, %addr, "handshake timed out");
                                return;
                            }
                        };
                        if let Err(e) = handle_connection(conn, state).await {
                            tracing::debug!(
                                %conn_id,
                                error = %e,
                                "connection ended with error"
                            );
                        }
                    });
                }
                Err(e) => {
                    tracing::warn!(error = %e, "accept failed");
                }
            }
        }
    }
}
