//! Line assembly over the decoder's input buffer.
//!
//! Start lines, header lines, chunk size lines and trailer lines are all
//! terminated by CRLF (a bare LF is tolerated). [`LineReader`] splits complete
//! lines off the front of the buffer; an incomplete line stays in the buffer
//! until more bytes arrive.

use bytes::{Bytes, BytesMut};

use crate::ensure;
use crate::protocol::ParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LineReader {
    max_line_size: usize,
    /// bytes of the partial line already searched for a terminator
    scanned: usize,
}

impl LineReader {
    pub(crate) fn new(max_line_size: usize) -> Self {
        Self { max_line_size, scanned: 0 }
    }

    pub(crate) fn reset(&mut self) {
        self.scanned = 0;
    }

    /// Splits the next complete line off `src`, with its terminator stripped.
    ///
    /// # Returns
    /// - `Ok(Some(line))` when a terminator was found
    /// - `Ok(None)` when `src` holds only part of a line
    /// - `Err(ParseError)` when the line exceeds the configured size
    pub(crate) fn next_line(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>, ParseError> {
        let start = self.scanned.min(src.len());

        match src[start..].iter().position(|b| *b == b'\n') {
            Some(offset) => {
                let end = start + offset;
                self.scanned = 0;

                let mut line = src.split_to(end + 1).freeze();
                let len = if end > 0 && line[end - 1] == b'\r' { end - 1 } else { end };
                line.truncate(len);

                ensure!(line.len() <= self.max_line_size, ParseError::line_too_long(line.len(), self.max_line_size));
                Ok(Some(line))
            }
            None => {
                self.scanned = src.len();
                ensure!(src.len() <= self.max_line_size, ParseError::line_too_long(src.len(), self.max_line_size));
                Ok(None)
            }
        }
    }
}
