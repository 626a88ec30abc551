//! Outbound events produced by the registry, and who they are for.

use parlor_protocol::{ConnectionId, RoomId, ServerEvent};

use crate::Room;

/// Specifies who should receive a server event.
///
/// Room recipients are resolved against the registry by
/// [`Registry::recipients`](crate::Registry::recipients) once the
/// triggering event has been fully applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recipient {
    /// One specific connection (error replies go here).
    Connection(ConnectionId),

    /// Every member of the room.
    Room(RoomId),

    /// Every member of the room except one (the sender of a relay).
    RoomExcept(RoomId, ConnectionId),
}

/// One event to deliver, paired with its audience.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dispatch {
    pub recipient: Recipient,
    pub event: ServerEvent,
}

impl Dispatch {
    pub fn to_connection(conn: ConnectionId, event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::Connection(conn),
            event,
        }
    }

    pub fn to_room(room_id: RoomId, event: ServerEvent) -> Self {
        Self {
            recipient: Recipient::Room(room_id),
            event,
        }
    }

    pub fn to_room_except(
        room_id: RoomId,
        excluded: ConnectionId,
        event: ServerEvent,
    ) -> Self {
        Self {
            recipient: Recipient::RoomExcept(room_id, excluded),
            event,
        }
    }

    /// A `roomInfo` broadcast of the room's current snapshot.
    pub(crate) fn room_info(room: &Room) -> Self {
        Self::to_room(room.id().clone(), ServerEvent::RoomInfo(room.snapshot()))
    }
}
