//! The room registry: every live room, and which room each connection is in.

use std::collections::HashMap;

use parlor_protocol::{ClientEvent, ConnectionId, RoomId, ServerEvent};

use crate::{Dispatch, Player, Recipient, Room, RoomError};

/// All live rooms plus a reverse index from connection to room.
///
/// Every operation runs to completion against `&mut self` and returns the
/// events to deliver, in order. The registry does no I/O of its own, so it
/// can be driven directly in tests or owned by a single task that
/// serializes access for a whole server.
///
/// # Invariants
///
/// - A room in `rooms` is never empty and has exactly one host.
/// - `memberships[c] == r` if and only if `c` is a member of `rooms[r]`.
///   A connection is therefore in at most one room.
#[derive(Debug, Default)]
pub struct Registry {
    /// Live rooms, keyed by room ID.
    rooms: HashMap<RoomId, Room>,

    /// Maps each connection to the room it's currently in.
    memberships: HashMap<ConnectionId, RoomId>,
}

impl Registry {
    /// Creates a new, empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one client event from `caller`.
    ///
    /// Refused requests turn into a `roomError` for the caller alone; every
    /// other anomaly (unknown room, non-member) produces nothing.
    pub fn handle(&mut self, caller: ConnectionId, event: ClientEvent) -> Vec<Dispatch> {
        let result = match event {
            ClientEvent::CreateRoom {
                room_id,
                player_name,
            } => self.create_room(caller, room_id, player_name),
            ClientEvent::JoinRoom {
                room_id,
                player_name,
            } => self.join_room(caller, room_id, player_name),
            ClientEvent::GameStateUpdate {
                room_id,
                game_state,
            } => Ok(self.game_state_update(caller, &room_id, game_state)),
            ClientEvent::PlayerReady { room_id } => Ok(self.player_ready(caller, &room_id)),
        };

        result.unwrap_or_else(|e| {
            vec![Dispatch::to_connection(
                caller,
                ServerEvent::RoomError(e.to_string()),
            )]
        })
    }

    /// Creates `room_id` with `caller` as its host.
    ///
    /// If `caller` is still in another room it leaves that room first, with
    /// the same effects as a disconnect.
    ///
    /// # Errors
    /// [`RoomError::RoomAlreadyExists`] if the room is live. Nothing changes.
    pub fn create_room(
        &mut self,
        caller: ConnectionId,
        room_id: RoomId,
        player_name: String,
    ) -> Result<Vec<Dispatch>, RoomError> {
        if self.rooms.contains_key(&room_id) {
            tracing::debug!(%room_id, %caller, "create refused, room exists");
            return Err(RoomError::RoomAlreadyExists(room_id));
        }

        let mut out = self.leave(caller);

        let mut room = Room::new(room_id.clone());
        tracing::info!(%room_id, %caller, player = %player_name, "room created");
        room.insert(caller, Player::host(player_name));
        out.push(Dispatch::room_info(&room));

        self.memberships.insert(caller, room_id.clone());
        self.rooms.insert(room_id, room);
        Ok(out)
    }

    /// Adds `caller` to an existing room as a guest.
    ///
    /// Joining the room the caller is already in only renames its player;
    /// host and ready flags are kept. Joining a different room leaves the
    /// current one first.
    ///
    /// # Errors
    /// [`RoomError::RoomDoesNotExist`] if the room is not live. Nothing
    /// changes.
    pub fn join_room(
        &mut self,
        caller: ConnectionId,
        room_id: RoomId,
        player_name: String,
    ) -> Result<Vec<Dispatch>, RoomError> {
        if !self.rooms.contains_key(&room_id) {
            tracing::debug!(%room_id, %caller, "join refused, no such room");
            return Err(RoomError::RoomDoesNotExist(room_id));
        }

        if self.memberships.get(&caller) == Some(&room_id) {
            return Ok(self.rename(caller, &room_id, player_name));
        }

        // The target room survives this: `caller` isn't one of its members.
        let mut out = self.leave(caller);

        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Err(RoomError::RoomDoesNotExist(room_id));
        };
        tracing::info!(%room_id, %caller, player = %player_name, "player joined");
        room.insert(caller, Player::guest(player_name));
        out.push(Dispatch::room_info(room));

        self.memberships.insert(caller, room_id);
        Ok(out)
    }

    /// Relays `game_state` to every member of the room except `caller`.
    ///
    /// The caller does not have to be a member. Unknown rooms are ignored.
    pub fn game_state_update(
        &self,
        caller: ConnectionId,
        room_id: &RoomId,
        game_state: serde_json::Value,
    ) -> Vec<Dispatch> {
        if !self.rooms.contains_key(room_id) {
            tracing::debug!(%room_id, %caller, "game state for unknown room dropped");
            return Vec::new();
        }
        vec![Dispatch::to_room_except(
            room_id.clone(),
            caller,
            ServerEvent::GameStateUpdate(game_state),
        )]
    }

    /// Marks `caller` ready, then signals `startGame` if everyone is.
    ///
    /// Ignored unless `caller` is a member of `room_id`. The start check
    /// runs on every call, so a redundant ready re-sends `startGame`.
    pub fn player_ready(&mut self, caller: ConnectionId, room_id: &RoomId) -> Vec<Dispatch> {
        if self.memberships.get(&caller) != Some(room_id) {
            tracing::debug!(%room_id, %caller, "ready from non-member ignored");
            return Vec::new();
        }
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        let Some(player) = room.player_mut(caller) else {
            return Vec::new();
        };
        player.ready = true;

        let mut out = vec![Dispatch::room_info(room)];
        if room.all_ready() {
            tracing::info!(%room_id, players = room.len(), "all players ready");
            out.push(Dispatch::to_room(room_id.clone(), ServerEvent::StartGame));
        }
        out
    }

    /// Removes a closed connection from whatever room it was in.
    ///
    /// Unknown connections are ignored. See [`leave`](Self::leave) for the
    /// events produced.
    pub fn disconnect(&mut self, caller: ConnectionId) -> Vec<Dispatch> {
        self.leave(caller)
    }

    /// Resolves a recipient to concrete connections, as of now.
    pub fn recipients(&self, recipient: &Recipient) -> Vec<ConnectionId> {
        match recipient {
            Recipient::Connection(conn) => vec![*conn],
            Recipient::Room(room_id) => self
                .rooms
                .get(room_id)
                .map(|room| room.members().collect())
                .unwrap_or_default(),
            Recipient::RoomExcept(room_id, excluded) => self
                .rooms
                .get(room_id)
                .map(|room| room.members().filter(|id| id != excluded).collect())
                .unwrap_or_default(),
        }
    }

    /// Returns a live room.
    pub fn room(&self, room_id: &RoomId) -> Option<&Room> {
        self.rooms.get(room_id)
    }

    /// Returns the room a connection is currently in, if any.
    pub fn room_of(&self, conn: ConnectionId) -> Option<&RoomId> {
        self.memberships.get(&conn)
    }

    /// Returns the number of live rooms.
    pub fn room_count(&self) -> usize {
        self.rooms.len()
    }

    /// Lists all live room IDs, sorted.
    pub fn room_ids(&self) -> Vec<RoomId> {
        let mut ids: Vec<RoomId> = self.rooms.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Takes `caller` out of its current room.
    ///
    /// An emptied room is deleted silently. Otherwise the remaining members
    /// get `playerLeft`, then `roomInfo`, then `newHost` if the departed
    /// player was host; the snapshot already shows the new host.
    fn leave(&mut self, caller: ConnectionId) -> Vec<Dispatch> {
        let Some(room_id) = self.memberships.remove(&caller) else {
            return Vec::new();
        };
        let Some(room) = self.rooms.get_mut(&room_id) else {
            return Vec::new();
        };
        let Some(departed) = room.remove(caller) else {
            return Vec::new();
        };
        tracing::info!(%room_id, %caller, player = %departed.name, "player left");

        if room.is_empty() {
            self.rooms.remove(&room_id);
            tracing::info!(%room_id, "room deleted (empty)");
            return Vec::new();
        }

        let new_host = if departed.is_host {
            room.promote_earliest()
        } else {
            None
        };

        let mut out = vec![
            Dispatch::to_room(room_id.clone(), ServerEvent::PlayerLeft(caller)),
            Dispatch::room_info(room),
        ];
        if let Some(host) = new_host {
            tracing::info!(%room_id, %host, "host reassigned");
            out.push(Dispatch::to_room(room_id, ServerEvent::NewHost(host)));
        }
        out
    }

    fn rename(&mut self, caller: ConnectionId, room_id: &RoomId, player_name: String) -> Vec<Dispatch> {
        let Some(room) = self.rooms.get_mut(room_id) else {
            return Vec::new();
        };
        let Some(player) = room.player_mut(caller) else {
            return Vec::new();
        };
        tracing::info!(%room_id, %caller, from = %player.name, to = %player_name, "player renamed");
        player.name = player_name;
        vec![Dispatch::room_info(room)]
    }
}
