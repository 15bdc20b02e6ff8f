//! HTTP message encoder module
//!
//! Encodes an outgoing request or response: first the head, written by
//! [`HeaderEncoder`], then the body items. The body framing follows what the
//! head declares:
//!
//! - `Transfer-Encoding: chunked`: every chunk is framed with its hex size
//!   and `Eof` writes the last chunk
//! - `Content-Length: n`: exactly `n` bytes must be sent
//! - neither: the bytes are written unchanged
//!
//! Responses that never carry a body (1xx, 204, 304, and answers to HEAD
//! marked with [`OutgoingHead::set_head_response`]) accept only `Eof`, even
//! when they declare a length.
//!
//! # Example
//!
//! ```
//! use bytes::{Bytes, BytesMut};
//! use http::StatusCode;
//! use http_engine::codec::MessageEncoder;
//! use http_engine::protocol::{OutgoingHead, OutgoingMessage, PayloadItem};
//! use tokio_util::codec::Encoder;
//!
//! let mut head = OutgoingHead::with_status(StatusCode::OK);
//! head.add_header("Content-Length", "2").unwrap();
//!
//! let mut encoder = MessageEncoder::new();
//! let mut buffer = BytesMut::new();
//! encoder.encode(OutgoingMessage::<Bytes>::Head(head), &mut buffer).unwrap();
//! encoder.encode(OutgoingMessage::<Bytes>::from(Bytes::from_static(b"ok")), &mut buffer).unwrap();
//! encoder.encode(OutgoingMessage::<Bytes>::Payload(PayloadItem::Eof), &mut buffer).unwrap();
//!
//! assert_eq!(&buffer[..], b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\n\r\nok");
//! ```

use crate::codec::body::PayloadEncoder;
use crate::codec::header::{HeaderEncoder, parse_content_length};
use crate::protocol::{OutgoingHead, OutgoingMessage, PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use http::header::{CONTENT_LENGTH, TRANSFER_ENCODING};
use tokio_util::codec::Encoder;
use tracing::{error, warn};

#[derive(Debug, Default)]
pub struct MessageEncoder {
    header_encoder: HeaderEncoder,
    payload_encoder: Option<PayloadEncoder>,
}

impl MessageEncoder {
    pub fn new() -> Self {
        Default::default()
    }

    /// Returns true while the body of the last head is still being written.
    pub fn is_sending_body(&self) -> bool {
        self.payload_encoder.as_ref().is_some_and(|encoder| !encoder.is_finish())
    }
}

impl<D: Buf> Encoder<OutgoingMessage<D>> for MessageEncoder {
    type Error = SendError;

    fn encode(&mut self, item: OutgoingMessage<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            OutgoingMessage::Head(head) => {
                if self.is_sending_body() {
                    error!("expect payload item but receive message head");
                    return Err(SendError::invalid_body("message head sent before the previous body ended"));
                }

                let payload_encoder = parse_payload_encoder(&head);
                self.header_encoder.encode(head, dst)?;
                self.payload_encoder = Some(payload_encoder);
                Ok(())
            }

            OutgoingMessage::Payload(payload_item) => {
                let Some(payload_encoder) = &mut self.payload_encoder else {
                    error!("expect message head but receive payload item");
                    return Err(SendError::invalid_body("payload sent before the message head"));
                };

                let is_eof = payload_item.is_eof();
                let result = payload_encoder.encode(payload_item, dst);

                if is_eof {
                    self.payload_encoder.take();
                }

                result
            }
        }
    }
}

/// Picks the body framing declared by the head.
///
/// Chunked coding wins over a `Content-Length` header, an unparseable length
/// leaves the body unframed.
fn parse_payload_encoder(head: &OutgoingHead) -> PayloadEncoder {
    if head.forbids_body() {
        return PayloadEncoder::fix_length(0);
    }

    let headers = head.headers();

    let is_chunked = headers.iter().filter(|(name, _)| **name == TRANSFER_ENCODING).any(|(_, value)| {
        value.as_bytes().split(|b| *b == b',').any(|item| item.trim_ascii().eq_ignore_ascii_case(b"chunked"))
    });
    if is_chunked {
        return PayloadEncoder::chunked();
    }

    let content_length = headers.iter().find(|(name, _)| **name == CONTENT_LENGTH).map(|(_, value)| value);
    match content_length {
        Some(value) => match parse_content_length(value) {
            Some(length) => PayloadEncoder::fix_length(length),
            None => {
                warn!(content_length = ?value, "ignore invalid content-length on outgoing message");
                PayloadEncoder::raw()
            }
        },
        None => PayloadEncoder::raw(),
    }
}
