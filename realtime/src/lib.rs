//! # Supportdesk Realtime
//!
//! The fan-out layer of the complaint synchronization core: room-based
//! pub/sub over `tokio::sync::broadcast`, the wire protocol for the
//! persistent client channel, and the authorization seam delegated to
//! the session gateway.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐  commit   ┌──────────┐   fan-out   ┌────────────┐
//! │ TicketStore │──────────>│  RoomBus │────────────>│ connection │
//! └─────────────┘  publish  └──────────┘  broadcast  │  (ws task) │
//!                                │                   └────────────┘
//!                                │  ticket:<id> room + global topic
//!                                ▼
//!                        no buffering, no replay;
//!                        gaps self-heal via resync
//! ```
//!
//! The bus never mutates ticket state; it observes committed changes
//! and republishes them. Everything here treats message loss as
//! normal and converges through the counter reconciliation service.

pub mod bus;
pub mod gateway;
pub mod protocol;
pub mod room;

pub use bus::{RoomBus, DEFAULT_ROOM_CAPACITY};
pub use gateway::{OpenGateway, RoomAuthorizer};
pub use protocol::{ClientMessage, ServerMessage};
pub use room::Room;
