use bytes::{Buf, Bytes};
use http::{HeaderName, HeaderValue};

use crate::protocol::{OutgoingHead, StartLine};

/// A single protocol event produced by the message decoder.
///
/// For one message the events always arrive in this order: one `StartLine`,
/// zero or more `Header`, one `HeaderComplete`, zero or more
/// `Payload(PayloadItem::Chunk(_))`, zero or more `Trailer` (chunked bodies
/// only) and finally `Payload(PayloadItem::Eof)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The request line or status line has been parsed
    StartLine(StartLine),
    /// A header line has been accepted
    Header(HeaderName, HeaderValue),
    /// The blank line ending the header section has been read
    HeaderComplete(BodyFraming),
    /// A chunk of body data or the end of the body
    Payload(PayloadItem),
    /// A trailer field following the last chunk of a chunked body
    Trailer(HeaderName, HeaderValue),
}

impl Message {
    /// Returns true if this message contains payload data
    #[inline]
    pub fn is_payload(&self) -> bool {
        matches!(self, Message::Payload(_))
    }

    /// Returns true if this event ends the current message
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, Message::Payload(PayloadItem::Eof))
    }

    /// Converts the message into a PayloadItem if it contains payload data
    ///
    /// Returns None for every other event
    pub fn into_payload_item(self) -> Option<PayloadItem> {
        match self {
            Message::Payload(payload_item) => Some(payload_item),
            _ => None,
        }
    }
}

/// An item handed to the message encoder.
///
/// The head is encoded first, then any number of payload chunks, then `Eof`.
#[derive(Debug)]
pub enum OutgoingMessage<Data: Buf = Bytes> {
    /// The start line and headers to compose
    Head(OutgoingHead),
    /// A chunk of body data or the end of the body
    Payload(PayloadItem<Data>),
}

/// Converts bytes into a body chunk for sending.
impl From<Bytes> for OutgoingMessage {
    fn from(bytes: Bytes) -> Self {
        Self::Payload(PayloadItem::Chunk(bytes))
    }
}

impl<D: Buf> From<OutgoingHead> for OutgoingMessage<D> {
    fn from(head: OutgoingHead) -> Self {
        Self::Head(head)
    }
}

/// Represents an item in the HTTP message payload stream.
///
/// This enum is used by the payload decoder to produce either data chunks
/// or signal the end of the payload stream (EOF).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PayloadItem<Data: Buf = Bytes> {
    /// A chunk of payload data
    Chunk(Data),
    /// Marks the end of the payload stream
    Eof,
}

/// How the end of a message body is determined.
///
/// Decided once, when the blank line ending the header section is read.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BodyFraming {
    /// Body with a known length in bytes (`Content-Length`)
    FixedLength(u64),
    /// Body using chunked transfer encoding
    Chunked,
    /// Body runs until the peer closes the connection
    UntilClose,
    /// No body
    Empty,
}

impl BodyFraming {
    /// Returns true if the payload uses chunked transfer encoding
    #[inline]
    pub fn is_chunked(&self) -> bool {
        matches!(self, BodyFraming::Chunked)
    }

    /// Returns true if the message has no body
    #[inline]
    pub fn is_empty(&self) -> bool {
        matches!(self, BodyFraming::Empty)
    }

    /// Returns true if the body ends when the connection closes
    #[inline]
    pub fn is_until_close(&self) -> bool {
        matches!(self, BodyFraming::UntilClose)
    }
}

impl<D: Buf> PayloadItem<D> {
    /// Returns true if this item represents the end of the payload stream
    #[inline]
    pub fn is_eof(&self) -> bool {
        matches!(self, PayloadItem::Eof)
    }

    /// Returns true if this item contains chunk data
    #[inline]
    pub fn is_chunk(&self) -> bool {
        matches!(self, PayloadItem::Chunk(_))
    }
}

impl PayloadItem {
    /// Returns a reference to the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }

    /// Consumes the PayloadItem and returns the contained bytes if this is a Chunk
    ///
    /// Returns None if this is an EOF marker
    pub fn into_bytes(self) -> Option<Bytes> {
        match self {
            PayloadItem::Chunk(bytes) => Some(bytes),
            PayloadItem::Eof => None,
        }
    }
}
