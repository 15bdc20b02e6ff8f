//! Encoder for the head of an outgoing HTTP message.
//!
//! The start line is composed by [`OutgoingHead`], then every header of its
//! [`HeaderStore`](crate::protocol::HeaderStore) is written as `name: value`,
//! replace-map entries first and appended entries after them. A blank line
//! ends the head.

use crate::protocol::{OutgoingHead, SendError};

use bytes::{BufMut, BytesMut};

use std::io;
use std::io::Write;
use tokio_util::codec::Encoder;
use tracing::trace;

/// Initial buffer size allocated for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for outgoing message heads implementing the [`Encoder`] trait.
#[derive(Debug, Default)]
pub struct HeaderEncoder;

impl Encoder<OutgoingHead> for HeaderEncoder {
    type Error = SendError;

    /// Encodes the start line and headers into the provided bytes buffer.
    ///
    /// # Errors
    ///
    /// Returns error if:
    /// - a required start line field was never set
    /// - HTTP version is neither 1.0 nor 1.1
    fn encode(&mut self, mut head: OutgoingHead, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let start_line = head.prepare()?;

        dst.reserve(INIT_HEADER_SIZE);
        write!(FastWrite(dst), "{start_line}")?;

        for (header_name, header_value) in head.headers().iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");

        trace!(header_count = head.headers().len(), "encoded message head");
        Ok(())
    }
}

/// Fast writer implementation for writing to BytesMut.
///
/// The space has already been reserved, so writing never fails.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
