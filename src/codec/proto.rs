//! Protobuf codec using `prost`.
//!
//! Every request and response body exchanged with the game server is a
//! protobuf message from [`crate::schema`].
//!
//! # Example
//!
//! ```
//! use wordgrid_client::codec::ProtoCodec;
//! use wordgrid_client::schema::JoinRequest;
//!
//! let encoded = ProtoCodec::encode(&JoinRequest { lobby_id: 5 });
//! let decoded: JoinRequest = ProtoCodec::decode(&encoded).unwrap();
//! assert_eq!(decoded.lobby_id, 5);
//! ```

use bytes::Bytes;
use prost::Message;

use crate::error::Result;

/// Protobuf codec for request and response bodies.
pub struct ProtoCodec;

impl ProtoCodec {
    /// Encode a message. Encoding into a growable buffer cannot fail.
    #[inline]
    pub fn encode<T: Message>(value: &T) -> Bytes {
        Bytes::from(value.encode_to_vec())
    }

    /// Decode a message.
    ///
    /// # Errors
    ///
    /// Returns `ClientError::Decode` if the bytes are not a valid `T`.
    #[inline]
    pub fn decode<T: Message + Default>(bytes: &[u8]) -> Result<T> {
        Ok(T::decode(bytes)?)
    }
}
