//! HTTP codec module for encoding and decoding HTTP/1.x messages
//!
//! This module provides the byte-level state machines of the engine. The
//! decoding side turns an arbitrarily fragmented byte stream into
//! [`Message`](crate::protocol::Message) events, the encoding side composes
//! outgoing requests and responses.
//!
//! # Architecture
//!
//! - Decoding:
//!   - [`MessageDecoder`]: drives one message after another over a buffer
//!   - Start line and header parsing via [`header`]
//!   - Payload decoding via [`body`]
//!
//! - Encoding:
//!   - [`MessageEncoder`]: writes a head then its body items
//!   - Head serialization via [`header`]
//!   - Payload framing via [`body`]
//!
//! Both sides implement the `tokio_util` codec traits, so they can be used
//! directly on a `BytesMut` or wrapped in `FramedRead` and `FramedWrite`.

pub mod body;
pub mod header;
mod line;
mod message_decoder;
mod message_encoder;

pub use message_decoder::MessageDecoder;
pub use message_decoder::Phase;
pub use message_encoder::MessageEncoder;
