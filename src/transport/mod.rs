//! Transport module - socket setup for the game server connection.

mod tcp;

pub use tcp::connect_tcp;
