//! # wordgrid-client
//!
//! Async TCP client for the wordgrid lobby and game server.
//!
//! One persistent connection carries both request/response calls and
//! server-pushed broadcasts. Each inbound frame is routed by its correlation
//! ID: to the caller waiting on it, or to the broadcast router when the ID
//! is one of the two reserved channels.
//!
//! ## Architecture
//!
//! - **Frame codec** ([`protocol`]): length-prefixed binary frames
//! - **Connection** ([`Connection`]): receive loop, writer task, pending-request table
//! - **RPC facade** ([`GameClient`]): one typed method per server verb
//! - **Broadcast router** ([`broadcast`]): phase state machine feeding an [`EventQueue`]
//!
//! ## Example
//!
//! ```ignore
//! use wordgrid_client::{BroadcastEvent, GameClient};
//!
//! #[tokio::main]
//! async fn main() -> wordgrid_client::Result<()> {
//!     let (client, mut events) = GameClient::builder().port(8080).open().await?;
//!     client.connect("ann").await?;
//!     client.join_lobby(5).await?;
//!
//!     loop {
//!         for event in events.drain() {
//!             if let BroadcastEvent::Disconnected(reason) = event {
//!                 println!("connection closed: {}", reason);
//!                 return Ok(());
//!             }
//!         }
//!         tokio::time::sleep(std::time::Duration::from_millis(16)).await;
//!     }
//! }
//! ```

pub mod broadcast;
pub mod codec;
pub mod config;
pub mod error;
pub mod model;
pub mod protocol;
pub mod schema;
pub mod transport;

mod client;
mod connection;
mod pending;
mod writer;

pub use broadcast::{BroadcastEvent, CloseReason, EventQueue, GameNotice, LobbyNotice, Phase};
pub use client::{ClientBuilder, GameClient};
pub use config::ClientConfig;
pub use connection::{Connection, WeakConnection};
pub use error::{ClientError, Result};
