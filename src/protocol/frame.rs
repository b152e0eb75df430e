//! Frame types for both directions.
//!
//! Uses `bytes::Bytes` so payloads are handed to callers without copying.
//!
//! # Example
//!
//! ```
//! use wordgrid_client::protocol::{build_request_frame, Opcode, RequestFrame};
//!
//! let bytes = build_request_frame(Opcode::Connect, 2, b"alice");
//! let frame = RequestFrame::parse(&bytes).unwrap();
//!
//! assert_eq!(frame.opcode(), Opcode::Connect);
//! assert_eq!(frame.payload(), b"alice");
//! ```

use bytes::Bytes;

use super::wire_format::{
    Channel, Opcode, RequestHeader, ResponseHeader, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
use crate::error::{ClientError, Result};

/// A complete server-to-client frame (RPC response or broadcast).
#[derive(Debug, Clone)]
pub struct ResponseFrame {
    /// Decoded header.
    pub header: ResponseHeader,
    /// Payload bytes.
    pub payload: Bytes,
}

impl ResponseFrame {
    /// Create a new frame from header and payload.
    pub fn new(header: ResponseHeader, payload: Bytes) -> Self {
        Self { header, payload }
    }

    /// Get the correlation ID.
    #[inline]
    pub fn correlation_id(&self) -> u32 {
        self.header.correlation_id
    }

    /// Broadcast channel, if this is a broadcast.
    #[inline]
    pub fn channel(&self) -> Option<Channel> {
        self.header.channel()
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    #[inline]
    pub fn payload_len(&self) -> usize {
        self.payload.len()
    }
}

/// A complete client-to-server frame.
#[derive(Debug, Clone)]
pub struct RequestFrame {
    /// Decoded header.
    pub header: RequestHeader,
    /// Payload bytes.
    pub payload: Bytes,
}

impl RequestFrame {
    /// Create a new request frame; the header length is taken from the payload.
    pub fn new(opcode: Opcode, correlation_id: u32, payload: Bytes) -> Self {
        Self {
            header: RequestHeader::new(opcode, correlation_id, payload.len() as u32),
            payload,
        }
    }

    /// Parse one complete request frame from a contiguous buffer.
    ///
    /// Fails if the buffer holds fewer payload bytes than the header declares.
    pub fn parse(buf: &[u8]) -> Result<Self> {
        let header = RequestHeader::decode(buf)?;
        let end = REQUEST_HEADER_SIZE + header.payload_length as usize;
        if buf.len() < end {
            return Err(ClientError::Protocol(format!(
                "Request declares {} payload bytes, only {} present",
                header.payload_length,
                buf.len() - REQUEST_HEADER_SIZE
            )));
        }
        Ok(Self {
            header,
            payload: Bytes::copy_from_slice(&buf[REQUEST_HEADER_SIZE..end]),
        })
    }

    #[inline]
    pub fn opcode(&self) -> Opcode {
        self.header.opcode
    }

    #[inline]
    pub fn correlation_id(&self) -> u32 {
        self.header.correlation_id
    }

    #[inline]
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Build a complete request frame as a single byte vector.
pub fn build_request_frame(opcode: Opcode, correlation_id: u32, payload: &[u8]) -> Vec<u8> {
    let header = RequestHeader::new(opcode, correlation_id, payload.len() as u32);
    let mut buf = Vec::with_capacity(REQUEST_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

/// Build a complete response/broadcast frame as a single byte vector.
///
/// The client never sends these; servers and test harnesses do.
pub fn build_response_frame(correlation_id: u32, payload: &[u8]) -> Vec<u8> {
    let header = ResponseHeader::new(correlation_id, payload.len() as u32);
    let mut buf = Vec::with_capacity(RESPONSE_HEADER_SIZE + payload.len());
    buf.extend_from_slice(&header.encode());
    buf.extend_from_slice(payload);
    buf
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{GAME_CHANNEL_ID, LOBBY_CHANNEL_ID};

    #[test]
    fn test_request_frame_roundtrip() {
        let bytes = build_request_frame(Opcode::SetTile, 0x1234_5678, b"\x08\x03\x10\x04");
        assert_eq!(bytes.len(), REQUEST_HEADER_SIZE + 4);

        let frame = RequestFrame::parse(&bytes).unwrap();
        assert_eq!(frame.opcode(), Opcode::SetTile);
        assert_eq!(frame.correlation_id(), 0x1234_5678);
        assert_eq!(frame.payload(), b"\x08\x03\x10\x04");
    }

    #[test]
    fn test_request_frame_empty_payload() {
        let bytes = build_request_frame(Opcode::Heartbeat, 9, b"");
        assert_eq!(bytes.len(), REQUEST_HEADER_SIZE);

        let frame = RequestFrame::parse(&bytes).unwrap();
        assert!(frame.payload().is_empty());
        assert_eq!(frame.header.payload_length, 0);
    }

    #[test]
    fn test_request_frame_truncated_payload() {
        let bytes = build_request_frame(Opcode::Connect, 2, b"alice");
        let err = RequestFrame::parse(&bytes[..bytes.len() - 1]).unwrap_err();
        assert!(matches!(err, ClientError::Protocol(_)));
    }

    #[test]
    fn test_request_frame_new_sets_length() {
        let frame = RequestFrame::new(Opcode::JoinLobby, 3, Bytes::from_static(b"\x08\x05"));
        assert_eq!(frame.header.payload_length, 2);
    }

    #[test]
    fn test_response_frame_accessors() {
        let frame = ResponseFrame::new(ResponseHeader::new(42, 5), Bytes::from_static(b"hello"));
        assert_eq!(frame.correlation_id(), 42);
        assert_eq!(frame.payload(), b"hello");
        assert_eq!(frame.payload_len(), 5);
        assert!(frame.channel().is_none());

        let lobby = ResponseFrame::new(ResponseHeader::new(LOBBY_CHANNEL_ID, 0), Bytes::new());
        assert_eq!(lobby.channel(), Some(Channel::Lobby));
        let game = ResponseFrame::new(ResponseHeader::new(GAME_CHANNEL_ID, 0), Bytes::new());
        assert_eq!(game.channel(), Some(Channel::Game));
    }

    #[test]
    fn test_build_response_frame() {
        let bytes = build_response_frame(7, b"abc");
        assert_eq!(bytes.len(), RESPONSE_HEADER_SIZE + 3);
        let header = ResponseHeader::decode(&bytes).unwrap();
        assert_eq!(header, ResponseHeader::new(7, 3));
        assert_eq!(&bytes[RESPONSE_HEADER_SIZE..], b"abc");
    }
}
