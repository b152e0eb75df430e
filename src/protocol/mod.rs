//! Protocol module - wire format, framing, and frame types.
//!
//! This module implements the binary protocol spoken with the game server:
//! - 12-byte request header and 8-byte response header encoding/decoding
//! - Frame buffer for accumulating partial reads
//! - Correlation ID allocation around the reserved broadcast channels

mod correlation;
mod frame;
mod frame_buffer;
mod wire_format;

pub use correlation::CorrelationIds;
pub use frame::{build_request_frame, build_response_frame, RequestFrame, ResponseFrame};
pub use frame_buffer::FrameBuffer;
pub use wire_format::{
    is_reserved_id, Channel, Opcode, RequestHeader, ResponseHeader, DEFAULT_MAX_PAYLOAD_SIZE,
    GAME_CHANNEL_ID, LOBBY_CHANNEL_ID, REQUEST_HEADER_SIZE, RESPONSE_HEADER_SIZE,
};
