//! A single room: its players, in the order they joined.

use parlor_protocol::{ConnectionId, PlayerSnapshot, RoomId, RoomSnapshot};

/// Per-connection metadata inside a room.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    /// Display name, exactly as the client supplied it.
    pub name: String,
    /// Whether this player is the room's host.
    pub is_host: bool,
    /// Whether this player has signalled ready.
    pub ready: bool,
}

impl Player {
    /// The player who created the room.
    pub fn host(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_host: true,
            ready: false,
        }
    }

    /// A player who joined an existing room.
    pub fn guest(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_host: false,
            ready: false,
        }
    }

    fn snapshot(&self) -> PlayerSnapshot {
        PlayerSnapshot {
            name: self.name.clone(),
            is_host: self.is_host,
            ready: self.ready,
        }
    }
}

/// A named group of connections.
///
/// Membership is a `Vec` rather than a map so that "earliest joined" is a
/// real, stable order: host reassignment picks the first entry. Rooms hold
/// a handful of players, so linear lookups are fine.
///
/// Rooms are only ever mutated through the [`Registry`](crate::Registry),
/// which is what keeps the "never empty" and "one host" rules intact.
#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    members: Vec<(ConnectionId, Player)>,
}

impl Room {
    pub(crate) fn new(id: RoomId) -> Self {
        Self {
            id,
            members: Vec::new(),
        }
    }

    /// The room's id.
    pub fn id(&self) -> &RoomId {
        &self.id
    }

    /// Number of players in the room.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// `true` if nobody is in the room. A live room never is.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Looks up the player behind a connection.
    pub fn player(&self, conn: ConnectionId) -> Option<&Player> {
        self.members
            .iter()
            .find(|(id, _)| *id == conn)
            .map(|(_, player)| player)
    }

    /// Connection ids of every member, earliest joined first.
    pub fn members(&self) -> impl Iterator<Item = ConnectionId> + '_ {
        self.members.iter().map(|(id, _)| *id)
    }

    /// Members and their players, earliest joined first.
    pub fn players(&self) -> impl Iterator<Item = (ConnectionId, &Player)> {
        self.members.iter().map(|(id, player)| (*id, player))
    }

    /// The current host, if any.
    pub fn host(&self) -> Option<ConnectionId> {
        self.players()
            .find(|(_, player)| player.is_host)
            .map(|(id, _)| id)
    }

    /// `true` when every player has signalled ready.
    pub fn all_ready(&self) -> bool {
        self.members.iter().all(|(_, player)| player.ready)
    }

    /// Builds the `roomInfo` payload for this room.
    pub fn snapshot(&self) -> RoomSnapshot {
        RoomSnapshot {
            players: self
                .players()
                .map(|(id, player)| (id, player.snapshot()))
                .collect(),
            room_id: self.id.clone(),
        }
    }

    pub(crate) fn insert(&mut self, conn: ConnectionId, player: Player) {
        self.members.push((conn, player));
    }

    pub(crate) fn remove(&mut self, conn: ConnectionId) -> Option<Player> {
        let index = self.members.iter().position(|(id, _)| *id == conn)?;
        Some(self.members.remove(index).1)
    }

    pub(crate) fn player_mut(&mut self, conn: ConnectionId) -> Option<&mut Player> {
        self.members
            .iter_mut()
            .find(|(id, _)| *id == conn)
            .map(|(_, player)| player)
    }

    /// Makes the earliest-joined player host and returns its connection.
    pub(crate) fn promote_earliest(&mut self) -> Option<ConnectionId> {
        let (id, player) = self.members.first_mut()?;
        player.is_host = true;
        Some(*id)
    }
}
