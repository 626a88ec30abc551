//! Wire protocol for Parlor.
//!
//! This crate defines the events clients and the relay exchange:
//!
//! - **Types** ([`ClientEvent`], [`ServerEvent`], [`RoomSnapshot`], …): the
//!   named events that travel on the wire.
//! - **Codec** ([`Codec`] trait, [`JsonCodec`]): how those events are
//!   converted to/from bytes.
//! - **Errors** ([`ProtocolError`]): what can go wrong during
//!   encoding/decoding.
//!
//! # Architecture
//!
//! The protocol layer sits between transport (raw bytes) and the room
//! registry. It knows nothing about membership rules, only about shapes.
//!
//! ```text
//! Transport (bytes) → Protocol (events) → Room registry (state machine)
//! ```

mod codec;
mod error;
mod types;

pub use codec::{Codec, JsonCodec};
pub use error::ProtocolError;
pub use parlor_transport::ConnectionId;
pub use types::{ClientEvent, PlayerSnapshot, RoomId, RoomSnapshot, ServerEvent};
