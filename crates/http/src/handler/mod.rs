//! Consumers of decoded protocol events.
//!
//! A [`Handler`] receives every [`Message`] an
//! [`HttpConnection`](crate::connection::HttpConnection) decodes, in stream
//! order, and answers with an [`Action`]. Since the header section is complete
//! when [`Message::HeaderComplete`] arrives, a handler can reject a message
//! there without waiting for its body.

use std::error::Error;
use std::future::Future;

use bytes::Bytes;

use crate::protocol::{Message, OutgoingHead};

/// What the connection does after a handler saw an event.
#[derive(Debug)]
pub enum Action {
    /// Keep decoding
    Continue,
    /// Send this head followed by the body bytes, which may be empty
    Reply(OutgoingHead, Bytes),
    /// Stop processing and drop the connection
    Close,
}

pub trait Handler {
    type Error: Into<Box<dyn Error + Send + Sync>>;

    fn on_message(&mut self, message: Message) -> impl Future<Output = Result<Action, Self::Error>>;
}

#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

impl<Err, F, Fut> Handler for HandlerFn<F>
where
    F: FnMut(Message) -> Fut,
    Err: Into<Box<dyn Error + Send + Sync>>,
    Fut: Future<Output = Result<Action, Err>>,
{
    type Error = Err;

    fn on_message(&mut self, message: Message) -> impl Future<Output = Result<Action, Self::Error>> {
        (self.f)(message)
    }
}

/// Turns an async closure over events into a [`Handler`].
pub fn make_handler<F, Err, Ret>(f: F) -> HandlerFn<F>
where
    Err: Into<Box<dyn Error + Send + Sync>>,
    Ret: Future<Output = Result<Action, Err>>,
    F: FnMut(Message) -> Ret,
{
    HandlerFn { f }
}
