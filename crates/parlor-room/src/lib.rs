//! Room registry for Parlor.
//!
//! Owns the mapping from room id to room state and every rule that fires
//! when connections create, join, ready up in, relay through, or drop out
//! of a room. The crate is synchronous and does no I/O: each operation
//! returns the [`Dispatch`]es the server must deliver.
//!
//! # Key types
//!
//! - [`Registry`]: all live rooms plus the connection → room index
//! - [`Room`] / [`Player`]: one room's ordered membership
//! - [`Dispatch`] / [`Recipient`]: outbound events and their audience
//! - [`RoomError`]: the two refusals a client can receive

mod dispatch;
mod error;
mod registry;
mod room;

pub use dispatch::{Dispatch, Recipient};
pub use error::RoomError;
pub use registry::Registry;
pub use room::{Player, Room};
