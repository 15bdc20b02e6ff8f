//! Decoder implementation for HTTP chunked transfer encoding.
//!
//! This module decodes bodies framed as described in
//! [RFC 9112 Section 7.1](https://www.rfc-editor.org/rfc/rfc9112#section-7.1):
//! a hex size line, the chunk data and a CRLF, repeated until a zero size
//! chunk, followed by optional trailer fields and a blank line.

use crate::codec::header::parse_header_line;
use crate::codec::line::LineReader;
use crate::ensure;
use crate::protocol::{Message, ParseError, PayloadItem};
use bytes::BytesMut;
use std::cmp;
use tokio_util::codec::Decoder;
use tracing::trace;
use ChunkedState::*;

/// A decoder for handling HTTP chunked transfer encoding.
///
/// Chunk data is emitted as soon as it arrives, so one chunk on the wire may
/// produce several [`PayloadItem::Chunk`] events. Trailer fields are emitted
/// as [`Message::Trailer`] before the final [`PayloadItem::Eof`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkedDecoder {
    state: ChunkedState,
    lines: LineReader,
    /// how many more trailer fields may be accepted
    trailer_budget: usize,
    max_header_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkedState {
    /// Read the chunk size line
    SizeLine,
    /// Read chunk data, with the number of bytes left in this chunk
    Data(u64),
    /// Read the CRLF after chunk data
    DataCrlf,
    /// Read trailer fields until the blank line
    Trailer,
    /// Final state after the blank line ending the body
    End,
}

impl ChunkedDecoder {
    /// Creates a new ChunkedDecoder instance.
    ///
    /// # Arguments
    /// * `max_line_size` - longest size or trailer line accepted
    /// * `trailer_budget` - trailer fields left once the headers were counted
    /// * `max_header_count` - the limit reported when the budget runs out
    pub fn new(max_line_size: usize, trailer_budget: usize, max_header_count: usize) -> Self {
        Self { state: SizeLine, lines: LineReader::new(max_line_size), trailer_budget, max_header_count }
    }

    /// Returns true once the blank line after the last chunk has been read
    pub fn is_finished(&self) -> bool {
        self.state == End
    }
}

impl Decoder for ChunkedDecoder {
    type Item = Message;
    type Error = ParseError;

    /// Decodes chunked transfer encoded data from the input buffer.
    ///
    /// # Returns
    /// - `Ok(Some(Message::Payload(PayloadItem::Chunk(bytes))))` for chunk data
    /// - `Ok(Some(Message::Trailer(name, value)))` for each trailer field
    /// - `Ok(Some(Message::Payload(PayloadItem::Eof)))` when the body is complete
    /// - `Ok(None)` when more data is needed
    /// - `Err(ParseError)` if the chunked encoding is invalid
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        loop {
            match self.state {
                SizeLine => {
                    let Some(line) = self.lines.next_line(src)? else {
                        return Ok(None);
                    };

                    let size = parse_chunk_size(&line)?;
                    trace!(size, "read chunk size");
                    self.state = if size == 0 { Trailer } else { Data(size) };
                }

                Data(remaining) => {
                    if src.is_empty() {
                        return Ok(None);
                    }

                    let len = cmp::min(remaining, src.len() as u64);
                    let bytes = src.split_to(len as usize).freeze();

                    let remaining = remaining - len;
                    self.state = if remaining == 0 { DataCrlf } else { Data(remaining) };

                    trace!(len = bytes.len(), "read chunked bytes");
                    return Ok(Some(Message::Payload(PayloadItem::Chunk(bytes))));
                }

                DataCrlf => {
                    match src.first() {
                        None => return Ok(None),
                        Some(b'\n') => {
                            let _ = src.split_to(1);
                        }
                        Some(b'\r') => match src.get(1) {
                            None => return Ok(None),
                            Some(b'\n') => {
                                let _ = src.split_to(2);
                            }
                            Some(_) => return Err(ParseError::invalid_chunk_size("missing CRLF after chunk data")),
                        },
                        Some(_) => return Err(ParseError::invalid_chunk_size("missing CRLF after chunk data")),
                    }
                    self.state = SizeLine;
                }

                Trailer => {
                    let Some(line) = self.lines.next_line(src)? else {
                        return Ok(None);
                    };

                    if line.is_empty() {
                        self.state = End;
                        trace!("finished reading chunked data");
                        return Ok(Some(Message::Payload(PayloadItem::Eof)));
                    }

                    ensure!(self.trailer_budget > 0, ParseError::too_many_headers(self.max_header_count));
                    self.trailer_budget -= 1;

                    let (name, value) = parse_header_line(line)?;
                    trace!(name = %name, "read trailer field");
                    return Ok(Some(Message::Trailer(name, value)));
                }

                End => return Ok(None),
            }
        }
    }
}

/// Parses the hex size at the start of a chunk size line.
///
/// Whitespace and `;` extensions may follow the digits and are ignored.
fn parse_chunk_size(line: &[u8]) -> Result<u64, ParseError> {
    let digits = line.iter().take_while(|b| b.is_ascii_hexdigit()).count();
    ensure!(digits > 0, ParseError::invalid_chunk_size("chunk size line has no hex digits"));

    let rest = &line[digits..];
    let ext_start = rest.iter().position(|b| *b == b';').unwrap_or(rest.len());
    ensure!(
        rest[..ext_start].iter().all(|b| matches!(b, b' ' | b'\t')),
        ParseError::invalid_chunk_size("invalid character in chunk size line")
    );

    let mut size: u64 = 0;
    for b in &line[..digits] {
        let digit = match b {
            b'0'..=b'9' => b - b'0',
            b'a'..=b'f' => b + 10 - b'a',
            _ => b + 10 - b'A',
        };
        size = size
            .checked_mul(16)
            .and_then(|size| size.checked_add(digit as u64))
            .ok_or_else(|| ParseError::invalid_chunk_size("chunk size overflow"))?;
    }

    Ok(size)
}
