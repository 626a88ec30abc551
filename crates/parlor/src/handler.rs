//! Per-connection handler: decode inbound events, write outbound ones.
//!
//! Each accepted connection gets its own Tokio task running this handler.
//! The flow is:
//!   1. Register an outbound channel with the hub
//!   2. Loop: forward decoded client events to the hub, and write whatever
//!      the hub routes to this connection back to the socket
//!   3. On exit (clean close, error, eviction, or panic) report the
//!      disconnect

use std::sync::Arc;

use parlor_protocol::{ClientEvent, Codec, ConnectionId};
use parlor_transport::{Connection, WebSocketConnection};
use tokio::sync::mpsc;

use crate::server::ServerState;
use crate::{HubHandle, ParlorError};

/// Drop guard that reports the disconnect when the handler exits.
///
/// `Drop` is synchronous, so the hub command goes out from a spawned task.
/// Everything this connection sent before has already been queued, which
/// keeps the disconnect last in line for this connection.
struct DisconnectGuard {
    conn_id: ConnectionId,
    hub: HubHandle,
}

impl Drop for DisconnectGuard {
    fn drop(&mut self) {
        let conn_id = self.conn_id;
        let hub = self.hub.clone();
        tokio::spawn(async move {
            if hub.disconnect(conn_id).await.is_err() {
                tracing::debug!(%conn_id, "hub gone before disconnect");
            }
        });
    }
}

/// Handles a single connection from accept to close.
pub(crate) async fn handle_connection<C: Codec>(
    conn: WebSocketConnection,
    state: Arc<ServerState<C>>,
) -> Result<(), ParlorError> {
    let conn_id = conn.id();
    tracing::info!(%conn_id, "client connected");

    let (outbound_tx, mut outbound_rx) = mpsc::channel(state.outbound_queue_size);
    state.hub.connect(conn_id, outbound_tx).await?;
    let _guard = DisconnectGuard {
        conn_id,
        hub: state.hub.clone(),
    };

    loop {
        tokio::select! {
            inbound = conn.recv() => match inbound {
                Ok(Some(data)) => forward_event(&state, conn_id, &data).await?,
                Ok(None) => {
                    tracing::info!(%conn_id, "client disconnected");
                    break;
                }
                Err(e) => {
                    tracing::info!(%conn_id, error = %e, "client connection lost");
                    break;
                }
            },
            outbound = outbound_rx.recv() => match outbound {
                Some(event) => {
                    let bytes = state.codec.encode(&event)?;
                    conn.send(&bytes).await?;
                }
                None => {
                    // The hub evicted this client for falling behind.
                    tracing::info!(%conn_id, "client too slow, closing");
                    conn.close().await?;
                    break;
                }
            },
        }
    }

    // _guard drops here → hub disconnect fires.
    Ok(())
}

/// Decodes one inbound frame and hands it to the hub.
///
/// Frames that aren't a known event are dropped: the relay answers
/// malformed input with silence, not errors.
async fn forward_event<C: Codec>(
    state: &ServerState<C>,
    conn_id: ConnectionId,
    data: &[u8],
) -> Result<(), ParlorError> {
    let event: ClientEvent = match state.codec.decode(data) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(%conn_id, error = %e, "failed to decode event");
            return Ok(());
        }
    };

    tracing::debug!(
        %conn_id,
        event = event.name(),
        room_id = %event.room_id(),
        "event received"
    );
    state.hub.event(conn_id, event).await
}
