//! Error types for the room layer.

use parlor_protocol::RoomId;

/// Errors a client can provoke with a room request.
///
/// The `Display` text is what the requester receives in `roomError`, so it
/// is fixed wording that clients may match on. The room id is kept for
/// logging only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RoomError {
    /// `createRoom` named a room that is already live.
    #[error("Room already exists")]
    RoomAlreadyExists(RoomId),

    /// `joinRoom` named a room that is not live.
    #[error("Room does not exist")]
    RoomDoesNotExist(RoomId),
}
