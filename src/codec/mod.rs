//! Codec module - serialization/deserialization for payloads.
//!
//! Codecs are marker structs with static methods rather than trait objects,
//! so the codec is picked at compile time.
//!
//! - [`ProtoCodec`] - protobuf bodies via `prost`

mod proto;

pub use proto::ProtoCodec;
