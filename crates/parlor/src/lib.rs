//! # Parlor
//!
//! A relay server for browser multiplayer games. Clients create or join
//! named rooms, flag themselves ready, and broadcast opaque game-state
//! payloads to the rest of their room; the server only understands
//! membership, host, and ready state.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use parlor::prelude::*;
//!
//! # async fn start() -> Result<(), ParlorError> {
//! let server = ParlorServer::builder()
//!     .bind("0.0.0.0:3000")
//!     .build()
//!     .await?;
//! server.run().await
//! # }
//! ```

mod error;
mod handler;
mod hub;
pub mod logging;
mod server;

pub use error::ParlorError;
pub use hub::HubHandle;
pub use server::{DEFAULT_HOST, DEFAULT_PORT, ParlorServer, ParlorServerBuilder};

/// Everything needed to run a server or talk to one in tests.
pub mod prelude {
    pub use crate::{HubHandle, ParlorError, ParlorServer, ParlorServerBuilder};
    pub use parlor_protocol::{
        ClientEvent, Codec, ConnectionId, JsonCodec, PlayerSnapshot, RoomId,
        RoomSnapshot, ServerEvent,
    };
}
