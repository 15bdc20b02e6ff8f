use bytes::Bytes;

use futures::{SinkExt, StreamExt};
use http::header::{CONNECTION, CONTENT_LENGTH};
use http::{HeaderValue, Method, StatusCode};
use tokio::io::{AsyncRead, AsyncWrite};

use crate::codec::{MessageDecoder, MessageEncoder, Phase};
use crate::config::DecoderConfig;
use crate::handler::{Action, Handler};
use crate::protocol::{HttpError, Message, OutgoingHead, OutgoingMessage, ParseError, PayloadItem, SendError, StartLine};

use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error, info};

/// Initial capacity of the read buffer
const READ_BUFFER_SIZE: usize = 8 * 1024;

/// Drives the message codec over an async reader and writer.
///
/// The connection holds no protocol state of its own: decoding is done by
/// [`MessageDecoder`] and encoding by [`MessageEncoder`]. It can be used step
/// by step with [`HttpConnection::next_message`] and the `send_*` methods, or
/// handed a [`Handler`] with [`HttpConnection::process`].
///
/// # Type Parameters
///
/// * `R`: The async readable stream type
/// * `W`: The async writable stream type
#[derive(Debug)]
pub struct HttpConnection<R, W> {
    framed_read: FramedRead<R, MessageDecoder>,
    framed_write: FramedWrite<W, MessageEncoder>,
}

impl<R, W> HttpConnection<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self::with_config(reader, writer, DecoderConfig::default())
    }

    pub fn with_config(reader: R, writer: W, config: DecoderConfig) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, MessageDecoder::with_config(config), READ_BUFFER_SIZE),
            framed_write: FramedWrite::new(writer, MessageEncoder::new()),
        }
    }

    pub fn decoder(&self) -> &MessageDecoder {
        self.framed_read.decoder()
    }

    /// The next response read on this connection answers a HEAD request.
    pub fn expect_head_response(&mut self) {
        self.framed_read.decoder_mut().expect_head_response();
    }

    /// Reads the next protocol event, `None` once the peer closed the stream.
    pub async fn next_message(&mut self) -> Option<Result<Message, ParseError>> {
        self.framed_read.next().await
    }

    /// Writes the head of an outgoing message.
    pub async fn send_head(&mut self, head: OutgoingHead) -> Result<(), SendError> {
        self.framed_write.send(OutgoingMessage::<Bytes>::Head(head)).await
    }

    /// Writes a piece of the body of the message whose head was sent last.
    pub async fn send_body(&mut self, bytes: Bytes) -> Result<(), SendError> {
        self.framed_write.send(OutgoingMessage::<Bytes>::from(bytes)).await
    }

    /// Ends the body of the message whose head was sent last.
    pub async fn finish_body(&mut self) -> Result<(), SendError> {
        self.framed_write.send(OutgoingMessage::<Bytes>::Payload(PayloadItem::Eof)).await
    }

    /// Feeds every decoded event to `handler` until the connection is done.
    ///
    /// Processing stops when the handler returns [`Action::Close`], when a
    /// message that does not keep the connection alive is complete, when a
    /// reply is sent before the message it answers was fully read, or when the
    /// peer closes the stream.
    pub async fn process<H>(mut self, mut handler: H) -> Result<(), HttpError>
    where
        H: Handler,
    {
        loop {
            match self.next_message().await {
                Some(Ok(message)) => {
                    let is_eof = message.is_eof();

                    let action = match handler.on_message(message).await {
                        Ok(action) => action,
                        Err(e) => {
                            let e: Box<dyn std::error::Error + Send + Sync> = e.into();
                            error!(cause = %e, "handler failed to process message");
                            if self.decoder().is_request() {
                                self.send_error_response(StatusCode::INTERNAL_SERVER_ERROR).await?;
                            }
                            return Err(HttpError::handler(e));
                        }
                    };

                    match action {
                        Action::Continue => {}
                        Action::Reply(mut head, body) => {
                            if self.is_head_request() {
                                head.set_head_response();
                            }
                            self.send_reply(head, body).await?;
                            if !is_eof {
                                debug!("replied before the message was fully read, close connection");
                                return Ok(());
                            }
                        }
                        Action::Close => {
                            info!("handler closed the connection");
                            return Ok(());
                        }
                    }

                    if is_eof && self.decoder().phase() == Phase::Complete && !self.decoder().is_keep_alive() {
                        info!("message complete without keep-alive, connection shutdown");
                        return Ok(());
                    }
                }

                Some(Err(e)) => {
                    error!(cause = %e, "can't decode next message");
                    if !self.decoder().is_response() {
                        self.send_error_response(StatusCode::BAD_REQUEST).await?;
                    }
                    return Err(e.into());
                }

                None => {
                    info!("cant read more messages, break this connection down");
                    return Ok(());
                }
            }
        }
    }

    fn is_head_request(&self) -> bool {
        self.decoder().start_line().and_then(StartLine::as_request).is_some_and(|request| *request.method() == Method::HEAD)
    }

    async fn send_reply(&mut self, head: OutgoingHead, body: Bytes) -> Result<(), SendError> {
        let skip_body = head.forbids_body();
        self.framed_write.feed(OutgoingMessage::<Bytes>::Head(head)).await?;
        if !body.is_empty() && !skip_body {
            self.framed_write.feed(OutgoingMessage::<Bytes>::from(body)).await?;
        }
        // using send instead of feed, because the whole reply must reach the peer
        self.framed_write.send(OutgoingMessage::<Bytes>::Payload(PayloadItem::Eof)).await
    }

    async fn send_error_response(&mut self, status: StatusCode) -> Result<(), SendError> {
        const ZERO_VALUE: HeaderValue = HeaderValue::from_static("0");
        const CLOSE_VALUE: HeaderValue = HeaderValue::from_static("close");

        let mut head = OutgoingHead::with_status(status);
        head.headers_mut().set(CONTENT_LENGTH, ZERO_VALUE);
        head.headers_mut().set(CONNECTION, CLOSE_VALUE);
        self.send_reply(head, Bytes::new()).await
    }
}
