use crate::ensure;
use crate::protocol::{PayloadItem, SendError};
use bytes::{Buf, BytesMut};
use tokio_util::codec::Encoder;
use tracing::warn;

/// Writes body data for a message that declared its `Content-Length`.
///
/// Sending more bytes than declared fails, and so does ending the body early.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthEncoder {
    length: u64,
}

impl LengthEncoder {
    pub fn new(length: u64) -> Self {
        Self { length }
    }

    pub fn is_finish(&self) -> bool {
        self.length == 0
    }
}

impl<D: Buf> Encoder<PayloadItem<D>> for LengthEncoder {
    type Error = SendError;

    fn encode(&mut self, item: PayloadItem<D>, dst: &mut BytesMut) -> Result<(), Self::Error> {
        match item {
            PayloadItem::Chunk(mut bytes) => {
                if !bytes.has_remaining() {
                    return Ok(());
                }

                let len = bytes.remaining() as u64;
                ensure!(
                    len <= self.length,
                    SendError::invalid_body(format!("body exceeds content-length by {} bytes", len - self.length))
                );

                dst.reserve(bytes.remaining());
                while bytes.has_remaining() {
                    let chunk = bytes.chunk();
                    let chunk_len = chunk.len();
                    dst.extend_from_slice(chunk);
                    bytes.advance(chunk_len);
                }
                self.length -= len;
                Ok(())
            }
            PayloadItem::Eof => {
                if self.length > 0 {
                    warn!(remaining = self.length, "body ended before content-length was reached");
                    return Err(SendError::invalid_body(format!("body is {} bytes short of content-length", self.length)));
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn exact_length() {
        let mut encoder = LengthEncoder::new(5);
        let mut buf = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"he")), &mut buf).unwrap();
        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"llo")), &mut buf).unwrap();
        encoder.encode(PayloadItem::<Bytes>::Eof, &mut buf).unwrap();

        assert_eq!(&buf[..], b"hello");
        assert!(encoder.is_finish());
    }

    #[test]
    fn too_long() {
        let mut encoder = LengthEncoder::new(2);
        let mut buf = BytesMut::new();

        let result = encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"abc")), &mut buf);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));
        assert!(buf.is_empty());
    }

    #[test]
    fn too_short() {
        let mut encoder = LengthEncoder::new(4);
        let mut buf = BytesMut::new();

        encoder.encode(PayloadItem::Chunk(Bytes::from_static(b"ab")), &mut buf).unwrap();
        let result = encoder.encode(PayloadItem::<Bytes>::Eof, &mut buf);
        assert!(matches!(result, Err(SendError::InvalidBody { .. })));
    }
}
