//! HTTP message decoder module
//!
//! This module drives the decoding of a stream of HTTP/1.x messages, requests
//! or responses, through a state machine:
//!
//! 1. Head: the start line and headers are decoded by [`HeaderDecoder`]
//! 2. Body: the payload is decoded by [`PayloadDecoder`] with the framing
//!    decided at the end of the head
//! 3. Complete: a keep-alive message resets the decoder in place so the next
//!    message in the same buffer is decoded, otherwise further bytes are ignored
//!
//! Every call to [`Decoder::decode`] returns at most one [`Message`] event and
//! leaves any incomplete input in the buffer for the next call.
//!
//! # Example
//!
//! ```
//! use bytes::BytesMut;
//! use http_engine::codec::MessageDecoder;
//! use http_engine::protocol::{BodyFraming, Message};
//! use tokio_util::codec::Decoder;
//!
//! let mut decoder = MessageDecoder::new();
//! let mut buffer = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\nhi");
//!
//! let mut events = vec![];
//! while let Some(event) = decoder.decode(&mut buffer).unwrap() {
//!     events.push(event);
//! }
//!
//! assert!(matches!(events[0], Message::StartLine(_)));
//! assert_eq!(events[2], Message::HeaderComplete(BodyFraming::FixedLength(2)));
//! assert!(events[4].is_eof());
//! ```

use crate::codec::body::PayloadDecoder;
use crate::codec::header::HeaderDecoder;
use crate::config::DecoderConfig;
use crate::protocol::{Message, ParseError, StartLine};
use bytes::BytesMut;
use http::HeaderMap;
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

/// Where the decoder currently is within a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// No start line has been accepted yet
    AwaitingFirstLine,
    /// The start line was accepted, headers are being read
    ReadingHeaders,
    /// The header section is complete and the body is being read
    ReadingBody,
    /// The whole message has been decoded
    Complete,
    /// A parse error occurred, nothing is decoded until [`MessageDecoder::reset`]
    Failed,
}

#[derive(Debug)]
enum State {
    Head,
    Body { payload_decoder: PayloadDecoder, keep_alive: bool },
    Complete { keep_alive: bool },
    Failed,
}

/// A decoder for a stream of HTTP requests or responses.
///
/// The start line and headers of the current message stay readable through
/// [`MessageDecoder::start_line`] and [`MessageDecoder::headers`] until bytes
/// of the next message arrive.
#[derive(Debug)]
pub struct MessageDecoder {
    config: DecoderConfig,
    header_decoder: HeaderDecoder,
    state: State,
}

impl MessageDecoder {
    /// Creates a new `MessageDecoder` with the default limits
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Creates a new `MessageDecoder` with the given limits
    pub fn with_config(config: DecoderConfig) -> Self {
        Self { config, header_decoder: HeaderDecoder::new(&config), state: State::Head }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Clears every per-message state, ready to decode a new message.
    pub fn reset(&mut self) {
        self.header_decoder.reset();
        self.state = State::Head;
    }

    /// The next response answers a HEAD request and has no body.
    pub fn expect_head_response(&mut self) {
        self.header_decoder.expect_head_response();
    }

    pub fn phase(&self) -> Phase {
        match &self.state {
            State::Head if self.header_decoder.is_awaiting_start_line() => Phase::AwaitingFirstLine,
            State::Head => Phase::ReadingHeaders,
            State::Body { .. } => Phase::ReadingBody,
            State::Complete { .. } => Phase::Complete,
            State::Failed => Phase::Failed,
        }
    }

    /// The start line of the current message, `None` before it is accepted.
    pub fn start_line(&self) -> Option<&StartLine> {
        self.header_decoder.start_line()
    }

    /// Returns true once a request line has been accepted
    pub fn is_request(&self) -> bool {
        self.start_line().is_some_and(StartLine::is_request)
    }

    /// Returns true once a status line has been accepted
    pub fn is_response(&self) -> bool {
        self.start_line().is_some_and(StartLine::is_response)
    }

    /// Headers of the current message, with replace semantics applied.
    pub fn headers(&self) -> &HeaderMap {
        self.header_decoder.headers()
    }

    pub fn header_count(&self) -> usize {
        self.header_decoder.header_count()
    }

    /// Whether the connection stays open after the current message.
    pub fn is_keep_alive(&self) -> bool {
        match &self.state {
            State::Body { keep_alive, .. } | State::Complete { keep_alive } => *keep_alive,
            State::Head => self.header_decoder.is_keep_alive(),
            State::Failed => false,
        }
    }

    fn decode_inner(&mut self, src: &mut BytesMut, eof: bool) -> Result<Option<Message>, ParseError> {
        loop {
            match &mut self.state {
                State::Head => {
                    let Some(message) = self.header_decoder.decode(src)? else {
                        return Ok(None);
                    };

                    if let Message::HeaderComplete(framing) = &message {
                        let payload_decoder = PayloadDecoder::from_framing(
                            *framing,
                            self.config.max_line_size(),
                            self.header_decoder.remaining_header_budget(),
                            self.config.max_header_count(),
                        );
                        let keep_alive = self.header_decoder.is_keep_alive();
                        self.state = State::Body { payload_decoder, keep_alive };
                    }

                    return Ok(Some(message));
                }

                State::Body { payload_decoder, keep_alive } => {
                    let message = if eof { payload_decoder.decode_eof(src)? } else { payload_decoder.decode(src)? };

                    if let Some(message) = &message {
                        if message.is_eof() {
                            let keep_alive = *keep_alive;
                            debug!(keep_alive, "message complete");
                            self.state = State::Complete { keep_alive };
                        }
                    }

                    return Ok(message);
                }

                State::Complete { keep_alive: true } => {
                    if src.is_empty() {
                        return Ok(None);
                    }
                    trace!("reset decoder for the next message");
                    self.reset();
                }

                State::Complete { keep_alive: false } | State::Failed => {
                    if !src.is_empty() {
                        trace!(len = src.len(), "ignore bytes after the last message");
                        src.clear();
                    }
                    return Ok(None);
                }
            }
        }
    }
}

impl Default for MessageDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Decoder for MessageDecoder {
    type Item = Message;
    type Error = ParseError;

    /// Attempts to decode the next event from the provided buffer
    ///
    /// # Returns
    ///
    /// - `Ok(Some(message))`: the next event of the current message
    /// - `Ok(None)`: more data is needed, or the last message is complete
    /// - `Err(_)`: the input is malformed, the decoder stays failed until reset
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        self.decode_inner(src, false).inspect_err(|e| {
            warn!(cause = %e, "failed to decode message");
            self.state = State::Failed;
        })
    }

    /// Decodes the remaining events once the stream has ended
    ///
    /// A body delimited by the connection close is completed here. A stream
    /// ending between two messages is a clean close, anything else is a
    /// [`ParseError::TruncatedMessage`].
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        let result = self.decode_inner(src, true).and_then(|message| {
            if message.is_some() {
                return Ok(message);
            }

            match &self.state {
                State::Head if self.header_decoder.is_awaiting_start_line() => {
                    if src.iter().all(|b| matches!(b, b'\r' | b'\n')) {
                        src.clear();
                        Ok(None)
                    } else {
                        Err(ParseError::TruncatedMessage)
                    }
                }
                State::Head => Err(ParseError::TruncatedMessage),
                _ => Ok(None),
            }
        });

        result.inspect_err(|e| {
            warn!(cause = %e, "failed to decode message at end of stream");
            self.state = State::Failed;
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{BodyFraming, PayloadItem};
    use bytes::Bytes;
    use http::{Method, StatusCode, Version};
    use indoc::indoc;

    fn decode_all(decoder: &mut MessageDecoder, buf: &mut BytesMut) -> Vec<Message> {
        let mut messages = vec![];
        while let Some(message) = decoder.decode(buf).unwrap() {
            messages.push(message);
        }
        messages
    }

    fn body_of(messages: &[Message]) -> Vec<u8> {
        messages
            .iter()
            .filter_map(|message| match message {
                Message::Payload(PayloadItem::Chunk(bytes)) => Some(bytes.to_vec()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    #[test]
    fn get_without_body() {
        let str = indoc! {r##"
        GET /index.html?a=1 HTTP/1.1
        Host: 127.0.0.1:8080
        Content-Length: 0

        "##};

        let mut buf = BytesMut::from(str);
        let mut decoder = MessageDecoder::new();
        assert_eq!(decoder.phase(), Phase::AwaitingFirstLine);

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.len(), 5);
        assert!(matches!(messages[0], Message::StartLine(StartLine::Request(_))));
        assert_eq!(messages[3], Message::HeaderComplete(BodyFraming::FixedLength(0)));
        assert!(messages[4].is_eof());

        assert_eq!(decoder.phase(), Phase::Complete);
        assert!(decoder.is_request());
        assert!(!decoder.is_response());

        let request = decoder.start_line().unwrap().as_request().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.url(), "/index.html?a=1");
        assert_eq!(request.uri(), "/index.html");
        assert_eq!(request.query_string(), "a=1");
        assert_eq!(request.version(), Version::HTTP_11);
    }

    #[test]
    fn phases() {
        let mut buf = BytesMut::from("POST /upload HTTP/1.1\r\n");
        let mut decoder = MessageDecoder::new();

        assert!(!decoder.is_request() && !decoder.is_response());
        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::StartLine(_))));
        assert_eq!(decoder.phase(), Phase::ReadingHeaders);

        buf.extend_from_slice(b"Content-Length: 3\r\n\r\n");
        decode_all(&mut decoder, &mut buf);
        assert_eq!(decoder.phase(), Phase::ReadingBody);

        buf.extend_from_slice(b"abc");
        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(body_of(&messages), b"abc");
        assert!(messages.last().unwrap().is_eof());
        assert_eq!(decoder.phase(), Phase::Complete);
    }

    #[test]
    fn response_chunked_wiki() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n4\r\nWiki\r\n0\r\n\r\n");
        let mut decoder = MessageDecoder::new();

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages[2], Message::HeaderComplete(BodyFraming::Chunked));
        assert_eq!(messages[3], Message::Payload(PayloadItem::Chunk(Bytes::from_static(b"Wiki"))));
        assert!(messages[4].is_eof());
        assert_eq!(messages.len(), 5);

        let status_line = decoder.start_line().unwrap().as_response().unwrap();
        assert_eq!(status_line.status(), StatusCode::OK);
        assert_eq!(status_line.status_text(), "OK");
        assert!(decoder.is_keep_alive());
    }

    #[test]
    fn pipelined_requests() {
        let mut buf = BytesMut::from(
            "POST /a HTTP/1.1\r\nContent-Length: 5\r\n\r\nhelloGET /b HTTP/1.1\r\nHost: x\r\n\r\n",
        );
        let mut decoder = MessageDecoder::new();

        let messages = decode_all(&mut decoder, &mut buf);
        let starts: Vec<_> = messages
            .iter()
            .filter_map(|message| match message {
                Message::StartLine(StartLine::Request(request)) => Some(request.url().to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(starts, vec!["/a", "/b"]);
        assert_eq!(messages.iter().filter(|message| message.is_eof()).count(), 2);
        assert_eq!(body_of(&messages), b"hello");

        // the second message is still readable after it completed
        assert_eq!(decoder.headers().get("host").unwrap(), "x");
        assert!(!decoder.headers().contains_key("content-length"));
    }

    #[test]
    fn http10_stays_complete() {
        let mut buf = BytesMut::from("GET / HTTP/1.0\r\n\r\nGET /next HTTP/1.0\r\n\r\n");
        let mut decoder = MessageDecoder::new();

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.len(), 3);
        assert_eq!(decoder.phase(), Phase::Complete);
        assert!(!decoder.is_keep_alive());
        assert!(buf.is_empty());

        decoder.reset();
        assert_eq!(decoder.phase(), Phase::AwaitingFirstLine);
        assert!(decoder.start_line().is_none());
    }

    #[test]
    fn until_close_body() {
        let mut buf = BytesMut::from("HTTP/1.0 200 OK\r\n\r\npartial");
        let mut decoder = MessageDecoder::new();

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages[1], Message::HeaderComplete(BodyFraming::UntilClose));
        assert_eq!(body_of(&messages), b"partial");
        assert!(!decoder.is_keep_alive());

        buf.extend_from_slice(b" body");
        assert_eq!(decoder.decode_eof(&mut buf).unwrap().unwrap().into_payload_item().unwrap().into_bytes().unwrap(), " body");
        assert!(decoder.decode_eof(&mut buf).unwrap().unwrap().is_eof());
        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
        assert_eq!(decoder.phase(), Phase::Complete);
    }

    #[test]
    fn truncated_body() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc");
        let mut decoder = MessageDecoder::new();
        decode_all(&mut decoder, &mut buf);

        let result = decoder.decode_eof(&mut buf);
        assert!(matches!(result, Err(ParseError::TruncatedMessage)));
        assert_eq!(decoder.phase(), Phase::Failed);
    }

    #[test]
    fn truncated_head() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: exa");
        let mut decoder = MessageDecoder::new();
        decode_all(&mut decoder, &mut buf);

        assert!(matches!(decoder.decode_eof(&mut buf), Err(ParseError::TruncatedMessage)));
    }

    #[test]
    fn clean_close_between_messages() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\n\r\n\r\n");
        let mut decoder = MessageDecoder::new();
        decode_all(&mut decoder, &mut buf);

        assert!(decoder.decode_eof(&mut buf).unwrap().is_none());
        assert!(buf.is_empty());
    }

    #[test]
    fn too_many_headers_fails_message() {
        let mut raw = String::from("GET / HTTP/1.1\r\n");
        for i in 0..3 {
            raw.push_str(&format!("X-Header-{i}: {i}\r\n"));
        }
        raw.push_str("\r\n");

        let mut buf = BytesMut::from(raw.as_str());
        let mut decoder = MessageDecoder::with_config(DecoderConfig::default().with_max_header_count(2));

        let mut events = 0;
        let error = loop {
            match decoder.decode(&mut buf) {
                Ok(Some(_)) => events += 1,
                Ok(None) => panic!("expected an error"),
                Err(e) => break e,
            }
        };

        assert_eq!(events, 3);
        assert!(matches!(error, ParseError::TooManyHeaders { max_num: 2 }));
        assert_eq!(decoder.phase(), Phase::Failed);
        assert!(decoder.decode(&mut buf).unwrap().is_none());
    }

    #[test]
    fn exactly_max_headers_accepted() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\n\r\n");
        let mut decoder = MessageDecoder::with_config(DecoderConfig::default().with_max_header_count(2));

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.len(), 5);
        assert_eq!(decoder.header_count(), 2);
    }

    #[test]
    fn trailers_count_against_limit() {
        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n0\r\nA: 1\r\n\r\n");
        let mut decoder = MessageDecoder::with_config(DecoderConfig::default().with_max_header_count(1));

        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::StartLine(_))));
        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(..))));
        assert_eq!(decoder.decode(&mut buf).unwrap(), Some(Message::HeaderComplete(BodyFraming::Chunked)));
        assert_eq!(decoder.phase(), Phase::ReadingBody);
        assert!(matches!(decoder.decode(&mut buf), Err(ParseError::TooManyHeaders { max_num: 1 })));
    }

    #[test]
    fn head_response() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 1\r\n\r\nx");
        let mut decoder = MessageDecoder::new();
        decoder.expect_head_response();

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages[2], Message::HeaderComplete(BodyFraming::Empty));
        assert!(messages[3].is_eof());

        // only the next response is affected
        assert_eq!(messages[6], Message::HeaderComplete(BodyFraming::FixedLength(1)));
        assert_eq!(body_of(&messages), b"x");
    }

    #[test]
    fn head_response_after_continue() {
        let mut buf = BytesMut::from("HTTP/1.1 100 Continue\r\n\r\nHTTP/1.1 200 OK\r\nContent-Length: 5\r\n\r\n");
        let mut decoder = MessageDecoder::new();
        decoder.expect_head_response();

        let messages = decode_all(&mut decoder, &mut buf);
        let framings: Vec<_> = messages
            .iter()
            .filter_map(|message| match message {
                Message::HeaderComplete(framing) => Some(*framing),
                _ => None,
            })
            .collect();

        assert_eq!(framings, vec![BodyFraming::Empty, BodyFraming::Empty]);
        assert_eq!(messages.iter().filter(|message| message.is_eof()).count(), 2);
        assert_eq!(decoder.phase(), Phase::Complete);
    }

    #[test]
    fn malformed_start_lines() {
        for input in ["GET /\r\n", "GET / HTTP/2.0\r\n", "HTTP/1.1 abc OK\r\n", "GET / HTTP/1.1 extra\r\n"] {
            let mut buf = BytesMut::from(input);
            let mut decoder = MessageDecoder::new();
            assert!(matches!(decoder.decode(&mut buf), Err(ParseError::MalformedStartLine { .. })), "input: {input:?}");
        }
    }
}
