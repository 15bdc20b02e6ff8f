//! Decoder for bodies delimited by the peer closing the connection.
//!
//! A response without `Content-Length` or chunked coding has a body that runs
//! until the end of the stream ([RFC 9112 Section 6.3](https://www.rfc-editor.org/rfc/rfc9112#section-6.3)).
//! Every byte received is body data and the end is only known in `decode_eof`.

use crate::protocol::{ParseError, PayloadItem};
use bytes::BytesMut;
use tokio_util::codec::Decoder;
use tracing::trace;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CloseDecoder {
    eof_emitted: bool,
}

impl CloseDecoder {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Decoder for CloseDecoder {
    type Item = PayloadItem;
    type Error = ParseError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.eof_emitted || src.is_empty() {
            return Ok(None);
        }

        let bytes = src.split().freeze();
        Ok(Some(PayloadItem::Chunk(bytes)))
    }

    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if let Some(item) = self.decode(src)? {
            return Ok(Some(item));
        }

        if self.eof_emitted {
            return Ok(None);
        }

        trace!("connection closed, body complete");
        self.eof_emitted = true;
        Ok(Some(PayloadItem::Eof))
    }
}
