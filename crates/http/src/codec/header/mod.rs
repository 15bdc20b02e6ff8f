//! HTTP header processing module for encoding and decoding message heads
//!
//! # Components
//!
//! - [`HeaderDecoder`]: Decodes the start line and header section line by line
//!   - Classifies the start line as a request or a response
//!   - Enforces the header count and line size limits
//!   - Decides the body framing and keep-alive
//!
//! - [`HeaderEncoder`]: Encodes an [`OutgoingHead`](crate::protocol::OutgoingHead)
//!   - Writes the start line then every stored header

mod header_decoder;
mod header_encoder;

pub use header_decoder::HeaderDecoder;
pub(crate) use header_decoder::{parse_content_length, parse_header_line};
pub use header_encoder::HeaderEncoder;
