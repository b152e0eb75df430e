//! Wire format encoding and decoding.
//!
//! Client to server (request, 12-byte header):
//! ```text
//! ┌────────┬──────────┬────────────────┬──────────┐
//! │ Opcode │ Reserved │ Correlation ID │ Length   │
//! │ 1 byte │ 3 bytes  │ 4 bytes        │ 4 bytes  │
//! │ uint8  │ zero     │ uint32 BE      │ uint32 BE│
//! └────────┴──────────┴────────────────┴──────────┘
//! ```
//!
//! Server to client (response or broadcast, 8-byte header):
//! ```text
//! ┌────────────────┬──────────┐
//! │ Correlation ID │ Length   │
//! │ 4 bytes        │ 4 bytes  │
//! │ uint32 BE      │ uint32 BE│
//! └────────────────┴──────────┘
//! ```
//!
//! All multi-byte integers are Big Endian.

use std::fmt;

use crate::error::{ClientError, Result};

/// Request header size in bytes.
pub const REQUEST_HEADER_SIZE: usize = 12;

/// Response/broadcast header size in bytes.
pub const RESPONSE_HEADER_SIZE: usize = 8;

/// Default maximum payload size (16 MB).
pub const DEFAULT_MAX_PAYLOAD_SIZE: u32 = 16 * 1024 * 1024;

/// Correlation ID of the lobby broadcast channel.
pub const LOBBY_CHANNEL_ID: u32 = 0;

/// Correlation ID of the game broadcast channel.
pub const GAME_CHANNEL_ID: u32 = 1;

/// Server verbs. The discriminant is the opcode byte on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Opcode {
    Connect = 0,
    Disconnect = 1,
    Heartbeat = 2,
    CreateLobby = 3,
    JoinLobby = 4,
    QuitLobby = 5,
    ListLobby = 6,
    Ready = 7,
    StartGame = 8,
    SetTile = 9,
    FinishTurn = 10,
    GetNewCard = 11,
    Cancel = 12,
    Exit = 13,
}

impl Opcode {
    /// Every opcode, in wire order.
    pub const ALL: [Opcode; 14] = [
        Opcode::Connect,
        Opcode::Disconnect,
        Opcode::Heartbeat,
        Opcode::CreateLobby,
        Opcode::JoinLobby,
        Opcode::QuitLobby,
        Opcode::ListLobby,
        Opcode::Ready,
        Opcode::StartGame,
        Opcode::SetTile,
        Opcode::FinishTurn,
        Opcode::GetNewCard,
        Opcode::Cancel,
        Opcode::Exit,
    ];

    /// Opcode byte.
    #[inline]
    pub fn as_u8(self) -> u8 {
        self as u8
    }

    /// Verb name, used in logs and error messages.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Connect => "Connect",
            Opcode::Disconnect => "Disconnect",
            Opcode::Heartbeat => "Heartbeat",
            Opcode::CreateLobby => "CreateLobby",
            Opcode::JoinLobby => "JoinLobby",
            Opcode::QuitLobby => "QuitLobby",
            Opcode::ListLobby => "ListLobby",
            Opcode::Ready => "Ready",
            Opcode::StartGame => "StartGame",
            Opcode::SetTile => "SetTile",
            Opcode::FinishTurn => "FinishTurn",
            Opcode::GetNewCard => "GetNewCard",
            Opcode::Cancel => "Cancel",
            Opcode::Exit => "Exit",
        }
    }
}

impl TryFrom<u8> for Opcode {
    type Error = ClientError;

    fn try_from(value: u8) -> Result<Self> {
        Opcode::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| ClientError::Protocol(format!("Unknown opcode {}", value)))
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Reserved broadcast channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    /// Lobby broadcasts (roster changes, lobby destroyed, game start).
    Lobby,
    /// In-game broadcasts (tiles, turns, shuffles, leaves).
    Game,
}

impl Channel {
    /// Map a correlation ID to its channel, if it is reserved.
    #[inline]
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            LOBBY_CHANNEL_ID => Some(Channel::Lobby),
            GAME_CHANNEL_ID => Some(Channel::Game),
            _ => None,
        }
    }

    /// Correlation ID used on the wire for this channel.
    #[inline]
    pub fn id(self) -> u32 {
        match self {
            Channel::Lobby => LOBBY_CHANNEL_ID,
            Channel::Game => GAME_CHANNEL_ID,
        }
    }
}

/// Check if a correlation ID is reserved for a broadcast channel.
#[inline]
pub fn is_reserved_id(id: u32) -> bool {
    Channel::from_id(id).is_some()
}

/// Decoded request header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestHeader {
    /// Server verb.
    pub opcode: Opcode,
    /// Correlation ID echoed back by the response.
    pub correlation_id: u32,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl RequestHeader {
    /// Create a new request header.
    pub fn new(opcode: Opcode, correlation_id: u32, payload_length: u32) -> Self {
        Self {
            opcode,
            correlation_id,
            payload_length,
        }
    }

    /// Encode header to bytes. Reserved bytes are always zero.
    ///
    /// # Example
    ///
    /// ```
    /// use wordgrid_client::protocol::{Opcode, RequestHeader};
    ///
    /// let bytes = RequestHeader::new(Opcode::JoinLobby, 7, 2).encode();
    /// assert_eq!(bytes, [4, 0, 0, 0, 0, 0, 0, 7, 0, 0, 0, 2]);
    /// ```
    pub fn encode(&self) -> [u8; REQUEST_HEADER_SIZE] {
        let mut buf = [0u8; REQUEST_HEADER_SIZE];
        self.encode_into(&mut buf);
        buf
    }

    /// Encode header into an existing buffer.
    ///
    /// # Panics
    ///
    /// Panics if buffer is smaller than `REQUEST_HEADER_SIZE` (12 bytes).
    pub fn encode_into(&self, buf: &mut [u8]) {
        debug_assert!(buf.len() >= REQUEST_HEADER_SIZE);
        buf[0] = self.opcode.as_u8();
        buf[1..4].fill(0);
        buf[4..8].copy_from_slice(&self.correlation_id.to_be_bytes());
        buf[8..12].copy_from_slice(&self.payload_length.to_be_bytes());
    }

    /// Decode a request header.
    ///
    /// Fails on a short buffer, an unknown opcode or non-zero reserved bytes.
    pub fn decode(buf: &[u8]) -> Result<Self> {
        if buf.len() < REQUEST_HEADER_SIZE {
            return Err(ClientError::Protocol(format!(
                "Request header needs {} bytes, got {}",
                REQUEST_HEADER_SIZE,
                buf.len()
            )));
        }
        if buf[1..4] != [0, 0, 0] {
            return Err(ClientError::Protocol(
                "Reserved header bytes must be 0".to_string(),
            ));
        }
        Ok(Self {
            opcode: Opcode::try_from(buf[0])?,
            correlation_id: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            payload_length: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
        })
    }
}

/// Decoded response/broadcast header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    /// Correlation ID of the call, or a reserved channel ID.
    pub correlation_id: u32,
    /// Payload length in bytes.
    pub payload_length: u32,
}

impl ResponseHeader {
    /// Create a new response header.
    pub fn new(correlation_id: u32, payload_length: u32) -> Self {
        Self {
            correlation_id,
            payload_length,
        }
    }

    /// Encode header to bytes (Big Endian).
    pub fn encode(&self) -> [u8; RESPONSE_HEADER_SIZE] {
        let mut buf = [0u8; RESPONSE_HEADER_SIZE];
        buf[0..4].copy_from_slice(&self.correlation_id.to_be_bytes());
        buf[4..8].copy_from_slice(&self.payload_length.to_be_bytes());
        buf
    }

    /// Decode header from bytes (Big Endian).
    ///
    /// Returns `None` if buffer is too short.
    ///
    /// # Example
    ///
    /// ```
    /// use wordgrid_client::protocol::ResponseHeader;
    ///
    /// let header = ResponseHeader::decode(&[0, 0, 0, 42, 0, 0, 0, 3]).unwrap();
    /// assert_eq!(header.correlation_id, 42);
    /// assert_eq!(header.payload_length, 3);
    /// ```
    pub fn decode(buf: &[u8]) -> Option<Self> {
        if buf.len() < RESPONSE_HEADER_SIZE {
            return None;
        }
        Some(Self {
            correlation_id: u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]),
            payload_length: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
        })
    }

    /// Reject payloads larger than `max_payload_size`.
    pub fn validate(&self, max_payload_size: u32) -> Result<()> {
        if self.payload_length > max_payload_size {
            return Err(ClientError::Protocol(format!(
                "Payload size {} exceeds maximum {}",
                self.payload_length, max_payload_size
            )));
        }
        Ok(())
    }

    /// Broadcast channel this frame belongs to, if any.
    #[inline]
    pub fn channel(&self) -> Option<Channel> {
        Channel::from_id(self.correlation_id)
    }

    /// Check if this is a broadcast rather than an RPC response.
    #[inline]
    pub fn is_broadcast(&self) -> bool {
        self.channel().is_some()
    }
}
