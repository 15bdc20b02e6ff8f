//! Decoder implementation for HTTP message payloads.
//!
//! This module provides a unified decoder for handling different types of HTTP message bodies:
//! - Content-Length based payloads
//! - Chunked transfer encoding
//! - Bodies running until the connection closes
//! - Messages with no body
//!
//! The strategy is picked from the [`BodyFraming`] decided by the header decoder.

use crate::codec::body::chunked_decoder::ChunkedDecoder;
use crate::codec::body::close_decoder::CloseDecoder;
use crate::codec::body::length_decoder::LengthDecoder;
use crate::protocol::{BodyFraming, Message, ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::warn;

/// A unified decoder for handling HTTP message payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadDecoder {
    /// The specific decoding strategy to use
    kind: Kind,
}

/// Enum representing different payload decoding strategies.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    /// Decode payload with a fixed content length
    Length(LengthDecoder),

    /// Decode payload using chunked transfer encoding
    Chunked(ChunkedDecoder),

    /// Decode payload until the end of the stream
    UntilClose(CloseDecoder),

    /// Handle messages with no body, the flag records whether `Eof` was emitted
    NoBody(bool),
}

impl PayloadDecoder {
    /// Creates a PayloadDecoder for messages with no body.
    pub fn empty() -> Self {
        Self { kind: Kind::NoBody(false) }
    }

    /// Creates a PayloadDecoder for chunked transfer encoding.
    ///
    /// `trailer_budget` is the number of trailer fields still allowed once the
    /// header section has been counted against `max_header_count`.
    pub fn chunked(max_line_size: usize, trailer_budget: usize, max_header_count: usize) -> Self {
        Self { kind: Kind::Chunked(ChunkedDecoder::new(max_line_size, trailer_budget, max_header_count)) }
    }

    /// Creates a PayloadDecoder for a fixed-length payload.
    pub fn fix_length(size: u64) -> Self {
        Self { kind: Kind::Length(LengthDecoder::new(size)) }
    }

    /// Creates a PayloadDecoder for a body delimited by the connection close.
    pub fn until_close() -> Self {
        Self { kind: Kind::UntilClose(CloseDecoder::new()) }
    }

    /// Creates the decoder matching a framing decision.
    pub fn from_framing(framing: BodyFraming, max_line_size: usize, trailer_budget: usize, max_header_count: usize) -> Self {
        match framing {
            BodyFraming::FixedLength(size) => Self::fix_length(size),
            BodyFraming::Chunked => Self::chunked(max_line_size, trailer_budget, max_header_count),
            BodyFraming::UntilClose => Self::until_close(),
            BodyFraming::Empty => Self::empty(),
        }
    }

    /// Returns whether this decoder handles chunked transfer encoding.
    pub fn is_chunked(&self) -> bool {
        matches!(self.kind, Kind::Chunked(_))
    }

    /// Returns whether this decoder handles messages with no body.
    pub fn is_empty(&self) -> bool {
        matches!(self.kind, Kind::NoBody(_))
    }

    /// Returns whether this decoder handles fixed-length payloads.
    pub fn is_fix_length(&self) -> bool {
        matches!(self.kind, Kind::Length(_))
    }

    /// Returns whether the body ends with the connection.
    pub fn is_until_close(&self) -> bool {
        matches!(self.kind, Kind::UntilClose(_))
    }
}

/// Delegates to the appropriate decoder based on the payload type.
impl Decoder for PayloadDecoder {
    type Item = Message;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match &mut self.kind {
            Kind::Length(length_decoder) => Ok(length_decoder.decode(src)?.map(Message::Payload)),
            Kind::Chunked(chunked_decoder) => chunked_decoder.decode(src),
            Kind::UntilClose(close_decoder) => Ok(close_decoder.decode(src)?.map(Message::Payload)),
            Kind::NoBody(eof_emitted) => {
                if *eof_emitted {
                    return Ok(None);
                }
                *eof_emitted = true;
                Ok(Some(Message::Payload(PayloadItem::Eof)))
            }
        }
    }

    /// Called once the stream has ended.
    ///
    /// Only a body delimited by the connection close can finish here. A fixed
    /// length or chunked body cut short fails with [`ParseError::TruncatedMessage`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Kind::UntilClose(close_decoder) = &mut self.kind {
            return Ok(close_decoder.decode_eof(src)?.map(Message::Payload));
        }

        if let Some(message) = self.decode(src)? {
            return Ok(Some(message));
        }

        match &self.kind {
            Kind::Length(length_decoder) if length_decoder.remaining() > 0 => {
                warn!(remaining = length_decoder.remaining(), "stream ended inside a fixed length body");
                Err(ParseError::TruncatedMessage)
            }
            Kind::Chunked(chunked_decoder) if !chunked_decoder.is_finished() => {
                warn!("stream ended inside a chunked body");
                Err(ParseError::TruncatedMessage)
            }
            _ => Ok(None),
        }
    }
}
