//! Decoder for the head of an HTTP message: the start line and header section.
//!
//! The decoder consumes one line at a time and emits one event per line:
//!
//! 1. the start line, classified as a request line or a status line
//! 2. each header line, stored with replace semantics and emitted as-is
//! 3. the blank line ending the section, together with the body framing
//!    decided from the collected headers
//!
//! # Limits
//!
//! - Maximum number of headers: [`DecoderConfig::max_header_count`]
//! - Maximum size of one line: [`DecoderConfig::max_line_size`]

use bytes::{Bytes, BytesMut};
use http::header::{CONNECTION, CONTENT_LENGTH, TRANSFER_ENCODING};
use http::{HeaderMap, HeaderName, HeaderValue, Version};
use tokio_util::codec::Decoder;
use tracing::{debug, trace, warn};

use crate::codec::line::LineReader;
use crate::config::DecoderConfig;
use crate::ensure;
use crate::protocol::{BodyFraming, Message, ParseError, StartLine};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderState {
    /// Waiting for the request line or status line
    StartLine,
    /// Reading header lines until the blank line
    Fields,
    /// The blank line has been read
    Done,
}

/// Decoder for the start line and header section of one message.
///
/// The parsed start line and headers stay available through accessors until
/// [`HeaderDecoder::reset`] is called.
#[derive(Debug)]
pub struct HeaderDecoder {
    state: HeaderState,
    lines: LineReader,
    max_header_count: usize,
    start_line: Option<StartLine>,
    headers: HeaderMap,
    header_count: usize,
    head_response: bool,
}

impl HeaderDecoder {
    pub fn new(config: &DecoderConfig) -> Self {
        Self {
            state: HeaderState::StartLine,
            lines: LineReader::new(config.max_line_size()),
            max_header_count: config.max_header_count(),
            start_line: None,
            headers: HeaderMap::new(),
            header_count: 0,
            head_response: false,
        }
    }

    /// Clears the state of the current message.
    ///
    /// A pending [`HeaderDecoder::expect_head_response`] is kept.
    pub fn reset(&mut self) {
        self.state = HeaderState::StartLine;
        self.lines.reset();
        self.start_line = None;
        self.headers.clear();
        self.header_count = 0;
    }

    /// Marks the next response as the answer to a HEAD request, so it is
    /// decoded without a body whatever its headers say.
    pub fn expect_head_response(&mut self) {
        self.head_response = true;
    }

    /// Returns true while no start line has been accepted.
    pub fn is_awaiting_start_line(&self) -> bool {
        self.state == HeaderState::StartLine
    }

    /// Returns true once the blank line ending the headers has been read.
    pub fn is_done(&self) -> bool {
        self.state == HeaderState::Done
    }

    pub fn start_line(&self) -> Option<&StartLine> {
        self.start_line.as_ref()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn header_count(&self) -> usize {
        self.header_count
    }

    /// Number of trailer lines a chunked body may still carry.
    pub fn remaining_header_budget(&self) -> usize {
        self.max_header_count.saturating_sub(self.header_count)
    }

    /// Whether the connection stays open after this message.
    ///
    /// HTTP/1.1 defaults to keep-alive unless `Connection: close` is sent,
    /// HTTP/1.0 only keeps the connection with `Connection: keep-alive`. A body
    /// delimited by the connection close can never be kept alive.
    pub fn is_keep_alive(&self) -> bool {
        let Some(start_line) = &self.start_line else {
            return false;
        };

        if self.state == HeaderState::Done && self.framing().is_until_close() {
            return false;
        }

        match start_line.version() {
            Version::HTTP_11 => !has_token(&self.headers, &CONNECTION, "close"),
            Version::HTTP_10 => has_token(&self.headers, &CONNECTION, "keep-alive"),
            _ => false,
        }
    }

    /// Determines how the body of this message is framed.
    ///
    /// - `Transfer-Encoding` containing `chunked` wins over everything else,
    ///   including a `Content-Length` header
    /// - otherwise a valid `Content-Length` gives a fixed length body
    /// - otherwise a response runs until the connection closes and a request
    ///   has no body
    ///
    /// Responses with a 1xx, 204 or 304 status and responses to HEAD never
    /// have a body.
    pub fn framing(&self) -> BodyFraming {
        let is_response = match &self.start_line {
            Some(StartLine::Response(status_line)) => {
                if status_line.forbids_body() || self.head_response {
                    return BodyFraming::Empty;
                }
                true
            }
            Some(StartLine::Request(_)) => false,
            None => return BodyFraming::Empty,
        };

        if has_token(&self.headers, &TRANSFER_ENCODING, "chunked") {
            if self.headers.contains_key(CONTENT_LENGTH) {
                debug!("both transfer-encoding and content-length present, chunked takes precedence");
            }
            return BodyFraming::Chunked;
        }

        if let Some(value) = self.headers.get(CONTENT_LENGTH) {
            match parse_content_length(value) {
                Some(length) => return BodyFraming::FixedLength(length),
                None => warn!(content_length = ?value, "ignore invalid content-length header"),
            }
        }

        if is_response { BodyFraming::UntilClose } else { BodyFraming::Empty }
    }

    fn is_interim_response(&self) -> bool {
        matches!(&self.start_line, Some(StartLine::Response(status_line)) if status_line.status().is_informational())
    }

    fn decode_start_line(&mut self, line: &Bytes) -> Result<Message, ParseError> {
        let text = std::str::from_utf8(line).map_err(|_e| ParseError::malformed_start_line("start line is not utf-8"))?;
        let start_line = StartLine::try_from(text)?;

        trace!(start_line = text, "parsed start line");
        self.start_line = Some(start_line.clone());
        self.state = HeaderState::Fields;
        Ok(Message::StartLine(start_line))
    }

    fn decode_field(&mut self, line: Bytes) -> Result<Message, ParseError> {
        ensure!(self.header_count < self.max_header_count, ParseError::too_many_headers(self.max_header_count));

        let (name, value) = parse_header_line(line)?;
        trace!(name = %name, "parsed header");

        self.header_count += 1;
        self.headers.insert(name.clone(), value.clone());
        Ok(Message::Header(name, value))
    }
}

impl Decoder for HeaderDecoder {
    type Item = Message;
    type Error = ParseError;

    /// Attempts to decode the next head event from the provided bytes buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Message::StartLine(_)))` once the first line was parsed
    /// - `Ok(Some(Message::Header(..)))` for each header line
    /// - `Ok(Some(Message::HeaderComplete(_)))` on the blank line
    /// - `Ok(None)` if more data is needed or the head is already complete
    /// - `Err(ParseError)` if parsing failed
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            if self.state == HeaderState::Done {
                return Ok(None);
            }

            let Some(line) = self.lines.next_line(src)? else {
                return Ok(None);
            };

            match self.state {
                HeaderState::StartLine => {
                    if line.is_empty() {
                        // tolerate blank lines before the start line
                        continue;
                    }
                    return self.decode_start_line(&line).map(Some);
                }
                HeaderState::Fields => {
                    if line.is_empty() {
                        self.state = HeaderState::Done;
                        let framing = self.framing();
                        // an interim response leaves the HEAD answer still to come
                        if !self.is_interim_response() {
                            self.head_response = false;
                        }
                        debug!(framing = ?framing, header_count = self.header_count, "finished reading headers");
                        return Ok(Some(Message::HeaderComplete(framing)));
                    }
                    return self.decode_field(line).map(Some);
                }
                HeaderState::Done => return Ok(None),
            }
        }
    }
}

/// Parses a `Content-Length` value, which must be plain ASCII digits.
pub(crate) fn parse_content_length(value: &HeaderValue) -> Option<u64> {
    let digits = value.as_bytes().trim_ascii();
    if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(digits).ok()?.parse().ok()
}

/// Splits a header line at the first `:`.
///
/// The name is trimmed, the value has its leading whitespace trimmed.
pub(crate) fn parse_header_line(line: Bytes) -> Result<(HeaderName, HeaderValue), ParseError> {
    let Some(colon) = line.iter().position(|b| *b == b':') else {
        return Err(ParseError::malformed_header_line(format!("missing `:` in {:?}", String::from_utf8_lossy(&line))));
    };

    let name = HeaderName::from_bytes(line[..colon].trim_ascii()).map_err(|_e| {
        ParseError::malformed_header_line(format!("invalid header name {:?}", String::from_utf8_lossy(&line[..colon])))
    })?;

    let value_start = line[colon + 1..].iter().position(|b| !matches!(b, b' ' | b'\t')).map_or(line.len(), |offset| colon + 1 + offset);

    let value = HeaderValue::from_maybe_shared(line.slice(value_start..))
        .map_err(|_e| ParseError::malformed_header_line(format!("invalid value for header {name}")))?;

    Ok((name, value))
}

/// Checks whether a comma separated header contains `token`, ignoring case.
fn has_token(headers: &HeaderMap, name: &HeaderName, token: &str) -> bool {
    headers
        .get(name)
        .is_some_and(|value| value.as_bytes().split(|b| *b == b',').any(|item| item.trim_ascii().eq_ignore_ascii_case(token.as_bytes())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};
    use indoc::indoc;

    fn decode_all(decoder: &mut HeaderDecoder, buf: &mut BytesMut) -> Vec<Message> {
        let mut messages = vec![];
        while let Some(message) = decoder.decode(buf).unwrap() {
            messages.push(message);
        }
        messages
    }

    #[test]
    fn check_has_token() {
        {
            let headers = HeaderMap::new();
            assert!(!has_token(&headers, &TRANSFER_ENCODING, "chunked"));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip, chunked".parse().unwrap());
            assert!(has_token(&headers, &TRANSFER_ENCODING, "chunked"));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "Chunked".parse().unwrap());
            assert!(has_token(&headers, &TRANSFER_ENCODING, "chunked"));
        }

        {
            let mut headers = HeaderMap::new();
            headers.insert("Transfer-Encoding", "gzip".parse().unwrap());
            assert!(!has_token(&headers, &TRANSFER_ENCODING, "chunked"));
        }
    }

    #[test]
    fn header_line_grammar() {
        let (name, value) = parse_header_line(Bytes::from_static(b"Host:   example.com")).unwrap();
        assert_eq!(name, http::header::HOST);
        assert_eq!(value, "example.com");

        let (name, value) = parse_header_line(Bytes::from_static(b"X-Empty:")).unwrap();
        assert_eq!(name.as_str(), "x-empty");
        assert_eq!(value, "");

        let (_, value) = parse_header_line(Bytes::from_static(b"X-Time: 12:30:00")).unwrap();
        assert_eq!(value, "12:30:00");

        assert!(matches!(parse_header_line(Bytes::from_static(b"no separator")), Err(ParseError::MalformedHeaderLine { .. })));
        assert!(matches!(parse_header_line(Bytes::from_static(b": no name")), Err(ParseError::MalformedHeaderLine { .. })));
        assert!(matches!(parse_header_line(Bytes::from_static(b"bad name: x")), Err(ParseError::MalformedHeaderLine { .. })));
    }

    #[test]
    fn from_curl() {
        let str = indoc! {r##"
        GET /index.html HTTP/1.1
        Host: 127.0.0.1:8080
        User-Agent: curl/7.79.1
        Accept: */*

        123"##};

        let mut buf = BytesMut::from(str);
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.len(), 5);
        assert_eq!(messages[4], Message::HeaderComplete(BodyFraming::Empty));
        assert_eq!(&buf[..], b"123");

        let request = decoder.start_line().unwrap().as_request().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(request.uri(), "/index.html");
        assert_eq!(request.version(), Version::HTTP_11);

        assert_eq!(decoder.header_count(), 3);
        assert_eq!(decoder.headers().get(http::header::HOST).unwrap(), "127.0.0.1:8080");
        assert_eq!(decoder.headers().get(http::header::USER_AGENT).unwrap(), "curl/7.79.1");
        assert_eq!(decoder.headers().get(http::header::ACCEPT).unwrap(), "*/*");
        assert!(decoder.is_keep_alive());
    }

    #[test]
    fn repeated_header_replaces() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nX-A: 1\r\nx-a: 2\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.len(), 4);
        assert_eq!(decoder.headers().len(), 1);
        assert_eq!(decoder.headers().get("X-A").unwrap(), "2");
        assert_eq!(decoder.header_count(), 2);
    }

    #[test]
    fn framing_decisions() {
        let cases = [
            ("POST / HTTP/1.1\r\nContent-Length: 10\r\n\r\n", BodyFraming::FixedLength(10)),
            ("POST / HTTP/1.1\r\nTransfer-Encoding: chunked\r\n\r\n", BodyFraming::Chunked),
            ("POST / HTTP/1.1\r\nContent-Length: 10\r\nTransfer-Encoding: chunked\r\n\r\n", BodyFraming::Chunked),
            ("POST / HTTP/1.1\r\nContent-Length: ten\r\n\r\n", BodyFraming::Empty),
            ("POST / HTTP/1.1\r\n\r\n", BodyFraming::Empty),
            ("HTTP/1.1 200 OK\r\n\r\n", BodyFraming::UntilClose),
            ("HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n", BodyFraming::FixedLength(0)),
            ("HTTP/1.1 204 No Content\r\nContent-Length: 10\r\n\r\n", BodyFraming::Empty),
            ("HTTP/1.1 304 Not Modified\r\n\r\n", BodyFraming::Empty),
        ];

        for (input, framing) in cases {
            let mut buf = BytesMut::from(input);
            let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
            let messages = decode_all(&mut decoder, &mut buf);
            assert_eq!(messages.last(), Some(&Message::HeaderComplete(framing)), "input: {input:?}");
        }
    }

    #[test]
    fn head_response_has_no_body() {
        let mut buf = BytesMut::from("HTTP/1.1 200 OK\r\nContent-Length: 42\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
        decoder.expect_head_response();

        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.last(), Some(&Message::HeaderComplete(BodyFraming::Empty)));
    }

    #[test]
    fn content_length_is_plain_digits() {
        let parse = |value: &'static str| parse_content_length(&HeaderValue::from_static(value));

        assert_eq!(parse("5"), Some(5));
        assert_eq!(parse(" 42 "), Some(42));
        assert_eq!(parse("+5"), None);
        assert_eq!(parse("-1"), None);
        assert_eq!(parse("5 5"), None);
        assert_eq!(parse(""), None);
        assert_eq!(parse("99999999999999999999999"), None);

        let mut buf = BytesMut::from("POST / HTTP/1.1\r\nContent-Length: +5\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
        let messages = decode_all(&mut decoder, &mut buf);
        assert_eq!(messages.last(), Some(&Message::HeaderComplete(BodyFraming::Empty)));
    }

    #[test]
    fn keep_alive_rules() {
        let cases = [
            ("GET / HTTP/1.1\r\n\r\n", true),
            ("GET / HTTP/1.1\r\nConnection: close\r\n\r\n", false),
            ("GET / HTTP/1.1\r\nConnection: Upgrade, Close\r\n\r\n", false),
            ("GET / HTTP/1.0\r\n\r\n", false),
            ("GET / HTTP/1.0\r\nConnection: keep-alive\r\n\r\n", true),
            ("HTTP/1.1 200 OK\r\n\r\n", false),
            ("HTTP/1.1 200 OK\r\nContent-Length: 2\r\n\r\n", true),
        ];

        for (input, keep_alive) in cases {
            let mut buf = BytesMut::from(input);
            let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
            decode_all(&mut decoder, &mut buf);
            assert_eq!(decoder.is_keep_alive(), keep_alive, "input: {input:?}");
        }
    }

    #[test]
    fn too_many_headers() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nA: 1\r\nB: 2\r\nC: 3\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default().with_max_header_count(2));

        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::StartLine(_))));
        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(..))));
        assert!(matches!(decoder.decode(&mut buf).unwrap(), Some(Message::Header(..))));
        assert!(matches!(decoder.decode(&mut buf), Err(ParseError::TooManyHeaders { max_num: 2 })));
        assert_eq!(decoder.header_count(), 2);
        assert!(!decoder.headers().contains_key("C"));
    }

    #[test]
    fn response_head() {
        let mut buf = BytesMut::from("\r\nHTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
        decode_all(&mut decoder, &mut buf);

        let status_line = decoder.start_line().unwrap().as_response().unwrap();
        assert_eq!(status_line.status(), StatusCode::NOT_FOUND);
        assert_eq!(status_line.status_text(), "Not Found");
        assert!(decoder.is_done());
    }

    #[test]
    fn reset_clears_message() {
        let mut buf = BytesMut::from("GET / HTTP/1.1\r\nHost: a\r\n\r\n");
        let mut decoder = HeaderDecoder::new(&DecoderConfig::default());
        decode_all(&mut decoder, &mut buf);

        decoder.reset();
        assert!(decoder.is_awaiting_start_line());
        assert!(decoder.start_line().is_none());
        assert!(decoder.headers().is_empty());
        assert_eq!(decoder.header_count(), 0);
    }
}
