//! Hub actor: the one task that owns the room registry.
//!
//! Connection handlers never touch the [`Registry`] directly. They send
//! commands through an mpsc channel and the hub applies them one at a
//! time, in arrival order, so every create/join/ready/leave sequence is
//! atomic without any locking. The hub then fans the resulting events out
//! to each recipient's outbound channel.
//!
//! Outbound channels are bounded. A client whose queue is full is evicted:
//! its channel is dropped and it leaves its room as if it had disconnected.

use std::collections::HashMap;

use parlor_protocol::{ClientEvent, ConnectionId, RoomId, ServerEvent};
use parlor_room::{Dispatch, Registry};
use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};

use crate::ParlorError;

/// Channel sender for delivering outbound events to one connection.
pub(crate) type ClientSender = mpsc::Sender<ServerEvent>;

/// Commands sent to the hub through its channel.
enum HubCommand {
    /// A connection was accepted; route its events to `sender`.
    Connect {
        conn_id: ConnectionId,
        sender: ClientSender,
    },

    /// A decoded event from a connection.
    Event {
        conn_id: ConnectionId,
        event: ClientEvent,
    },

    /// The connection is gone. Always the last command for `conn_id`.
    Disconnect { conn_id: ConnectionId },

    /// Request the ids of all live rooms.
    RoomIds { reply: oneshot::Sender<Vec<RoomId>> },
}

/// Handle to the running hub. Cheap to clone; one per connection task.
#[derive(Clone)]
pub struct HubHandle {
    sender: mpsc::Sender<HubCommand>,
}

impl HubHandle {
    /// Registers a connection's outbound channel.
    pub(crate) async fn connect(
        &self,
        conn_id: ConnectionId,
        sender: ClientSender,
    ) -> Result<(), ParlorError> {
        self.send(HubCommand::Connect { conn_id, sender }).await
    }

    /// Forwards a client event to the registry.
    pub(crate) async fn event(
        &self,
        conn_id: ConnectionId,
        event: ClientEvent,
    ) -> Result<(), ParlorError> {
        self.send(HubCommand::Event { conn_id, event }).await
    }

    /// Reports a closed connection.
    pub(crate) async fn disconnect(&self, conn_id: ConnectionId) -> Result<(), ParlorError> {
        self.send(HubCommand::Disconnect { conn_id }).await
    }

    /// Lists the ids of all live rooms, sorted.
    ///
    /// The answer reflects every command the hub received before this one.
    pub async fn room_ids(&self) -> Result<Vec<RoomId>, ParlorError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(HubCommand::RoomIds { reply: reply_tx }).await?;
        reply_rx.await.map_err(|_| ParlorError::HubUnavailable)
    }

    async fn send(&self, cmd: HubCommand) -> Result<(), ParlorError> {
        self.sender
            .send(cmd)
            .await
            .map_err(|_| ParlorError::HubUnavailable)
    }
}

/// The internal hub state. Runs inside a Tokio task.
struct Hub {
    registry: Registry,
    /// Per-connection outbound channels.
    clients: HashMap<ConnectionId, ClientSender>,
    receiver: mpsc::Receiver<HubCommand>,
}

impl Hub {
    /// Processes commands until every [`HubHandle`] is dropped.
    async fn run(mut self) {
        tracing::debug!("room hub started");

        while let Some(cmd) = self.receiver.recv().await {
            match cmd {
                HubCommand::Connect { conn_id, sender } => {
                    self.clients.insert(conn_id, sender);
                }
                HubCommand::Event { conn_id, event } => {
                    let out = self.registry.handle(conn_id, event);
                    self.deliver(out);
                }
                HubCommand::Disconnect { conn_id } => {
                    self.clients.remove(&conn_id);
                    let out = self.registry.disconnect(conn_id);
                    self.deliver(out);
                }
                HubCommand::RoomIds { reply } => {
                    let _ = reply.send(self.registry.room_ids());
                }
            }
        }

        tracing::debug!(rooms = self.registry.room_count(), "room hub stopped");
    }

    /// Sends each dispatch to its recipients, in order, then evicts any
    /// client that could not keep up.
    fn deliver(&mut self, out: Vec<Dispatch>) {
        let mut slow = Vec::new();
        for dispatch in out {
            for conn_id in self.registry.recipients(&dispatch.recipient) {
                if !self.send_to(conn_id, dispatch.event.clone()) {
                    slow.push(conn_id);
                }
            }
        }
        for conn_id in slow {
            self.evict(conn_id);
        }
    }

    /// Sends an event to a single connection.
    ///
    /// Returns `false` only when the client's queue is full. Events for
    /// connections that have already gone away are dropped.
    fn send_to(&self, conn_id: ConnectionId, event: ServerEvent) -> bool {
        let Some(sender) = self.clients.get(&conn_id) else {
            tracing::debug!(%conn_id, "no such connection, event dropped");
            return true;
        };
        match sender.try_send(event) {
            Ok(()) => true,
            Err(TrySendError::Full(_)) => false,
            Err(TrySendError::Closed(_)) => {
                tracing::debug!(%conn_id, "outbound channel closed, event dropped");
                true
            }
        }
    }

    /// Drops a client that stopped draining its queue and takes it out of
    /// its room. The remaining members are told as for a disconnect.
    fn evict(&mut self, conn_id: ConnectionId) {
        if self.clients.remove(&conn_id).is_none() {
            return;
        }
        tracing::debug!(
            %conn_id,
            room_id = ?self.registry.room_of(conn_id),
            "outbound queue full, dropping slow client"
        );
        let out = self.registry.disconnect(conn_id);
        self.deliver(out);
    }
}

/// Spawns the hub task and returns a handle to it.
///
/// `channel_size` bounds the command queue; handlers wait when it's full.
pub(crate) fn spawn_hub(channel_size: usize) -> HubHandle {
    let (tx, rx) = mpsc::channel(channel_size);

    let hub = Hub {
        registry: Registry::new(),
        clients: HashMap::new(),
        receiver: rx,
    };
    tokio::spawn(hub.run());

    HubHandle { sender: tx }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn conn(id: u64) -> ConnectionId {
        ConnectionId::new(id)
    }

    async fn connected(hub: &HubHandle, id: u64) -> mpsc::Receiver<ServerEvent> {
        connected_with_capacity(hub, id, 16).await
    }

    async fn connected_with_capacity(
        hub: &HubHandle,
        id: u64,
        capacity: usize,
    ) -> mpsc::Receiver<ServerEvent> {
        let (tx, rx) = mpsc::channel(capacity);
        hub.connect(conn(id), tx).await.unwrap();
        rx
    }

    #[tokio::test]
    async fn test_hub_routes_room_info_to_every_member() {
        let hub = spawn_hub(8);
        let mut alice = connected(&hub, 1).await;
        let mut bob = connected(&hub, 2).await;

        hub.event(
            conn(1),
            ClientEvent::CreateRoom {
                room_id: RoomId::from("R1"),
                player_name: "Alice".into(),
            },
        )
        .await
        .unwrap();
        hub.event(
            conn(2),
            ClientEvent::JoinRoom {
                room_id: RoomId::from("R1"),
                player_name: "Bob".into(),
            },
        )
        .await
        .unwrap();

        // Alice sees her own create, then Bob's join.
        assert!(matches!(alice.recv().await, Some(ServerEvent::RoomInfo(s)) if s.players.len() == 1));
        assert!(matches!(alice.recv().await, Some(ServerEvent::RoomInfo(s)) if s.players.len() == 2));
        assert!(matches!(bob.recv().await, Some(ServerEvent::RoomInfo(s)) if s.players.len() == 2));
    }

    #[tokio::test]
    async fn test_hub_error_reply_goes_to_caller_only() {
        let hub = spawn_hub(8);
        let mut alice = connected(&hub, 1).await;
        let mut bob = connected(&hub, 2).await;

        hub.event(
            conn(2),
            ClientEvent::JoinRoom {
                room_id: RoomId::from("nope"),
                player_name: "Bob".into(),
            },
        )
        .await
        .unwrap();
        // Round-trip through the hub so the join has been processed.
        assert!(hub.room_ids().await.unwrap().is_empty());

        assert_eq!(
            bob.try_recv().unwrap(),
            ServerEvent::RoomError("Room does not exist".into())
        );
        assert!(alice.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_hub_disconnect_cleans_up_room() {
        let hub = spawn_hub(8);
        let _alice = connected(&hub, 1).await;

        hub.event(
            conn(1),
            ClientEvent::CreateRoom {
                room_id: RoomId::from("R1"),
                player_name: "Alice".into(),
            },
        )
        .await
        .unwrap();
        assert_eq!(hub.room_ids().await.unwrap(), vec![RoomId::from("R1")]);

        hub.disconnect(conn(1)).await.unwrap();
        assert!(hub.room_ids().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hub_survives_closed_outbound_channel() {
        let hub = spawn_hub(8);
        let alice = connected(&hub, 1).await;
        drop(alice);

        hub.event(
            conn(1),
            ClientEvent::CreateRoom {
                room_id: RoomId::from("R1"),
                player_name: "Alice".into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(hub.room_ids().await.unwrap(), vec![RoomId::from("R1")]);
    }

    #[tokio::test]
    async fn test_hub_evicts_client_with_full_queue() {
        let hub = spawn_hub(8);
        // Alice can hold one event and never reads.
        let mut alice = connected_with_capacity(&hub, 1, 1).await;
        let mut bob = connected(&hub, 2).await;

        hub.event(
            conn(1),
            ClientEvent::CreateRoom {
                room_id: RoomId::from("R1"),
                player_name: "Alice".into(),
            },
        )
        .await
        .unwrap();
        hub.event(
            conn(2),
            ClientEvent::JoinRoom {
                room_id: RoomId::from("R1"),
                player_name: "Bob".into(),
            },
        )
        .await
        .unwrap();

        // The hub still answers, and the room lives on with Bob alone.
        assert_eq!(hub.room_ids().await.unwrap(), vec![RoomId::from("R1")]);

        assert!(matches!(bob.try_recv(), Ok(ServerEvent::RoomInfo(s)) if s.players.len() == 2));
        assert_eq!(bob.try_recv().unwrap(), ServerEvent::PlayerLeft(conn(1)));
        assert!(matches!(
            bob.try_recv(),
            Ok(ServerEvent::RoomInfo(s)) if s.players.len() == 1 && s.players[&conn(2)].is_host
        ));
        assert_eq!(bob.try_recv().unwrap(), ServerEvent::NewHost(conn(2)));

        // Alice keeps what was queued, then sees her channel closed.
        assert!(matches!(alice.recv().await, Some(ServerEvent::RoomInfo(_))));
        assert_eq!(alice.recv().await, None);

        // Later traffic keeps flowing to Bob.
        hub.event(conn(2), ClientEvent::PlayerReady { room_id: RoomId::from("R1") })
            .await
            .unwrap();
        assert!(matches!(bob.recv().await, Some(ServerEvent::RoomInfo(_))));
        assert_eq!(bob.recv().await, Some(ServerEvent::StartGame));
    }

    #[tokio::test]
    async fn test_hub_disconnect_after_eviction_is_harmless() {
        let hub = spawn_hub(8);
        let _alice = connected_with_capacity(&hub, 1, 1).await;

        for name in ["Alice", "Alicia"] {
            hub.event(
                conn(1),
                ClientEvent::CreateRoom {
                    room_id: RoomId::from(name),
                    player_name: name.into(),
                },
            )
            .await
            .unwrap();
        }
        // The second snapshot overflowed Alice's queue, so she was evicted
        // and her room went with her.
        assert!(hub.room_ids().await.unwrap().is_empty());

        hub.disconnect(conn(1)).await.unwrap();
        assert!(hub.room_ids().await.unwrap().is_empty());
    }
}
