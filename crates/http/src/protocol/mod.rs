//! Core HTTP protocol types shared by the decoder and the encoder.
//!
//! # Architecture
//!
//! - **Events** ([`message`]): what the decoder produces
//!   - [`Message`]: one protocol event (start line, header, header end, body, trailer)
//!   - [`PayloadItem`]: a body chunk or the end of the body
//!   - [`BodyFraming`]: how the end of a body is found
//!
//! - **Start lines**: [`StartLine`], [`RequestLine`] and [`StatusLine`]
//!
//! - **Outgoing messages**
//!   - [`OutgoingHead`]: start line fields and headers to compose
//!   - [`HeaderStore`]: replace-map plus append-list of outgoing headers
//!   - [`OutgoingMessage`]: what the encoder consumes
//!
//! - **Url decomposition**: [`Target`]
//!
//! - **Error Handling** ([`error`])
//!   - [`ParseError`]: inbound decoding errors
//!   - [`SendError`]: outbound composition errors
//!   - [`HeaderError`]: header store errors
//!   - [`UrlError`]: url decomposition errors
//!   - [`HttpError`]: top-level error of the connection layer

mod message;
pub use message::BodyFraming;
pub use message::Message;
pub use message::OutgoingMessage;
pub use message::PayloadItem;

mod start_line;
pub use start_line::StartLine;

mod request;
pub use request::RequestLine;

mod response;
pub use response::StatusLine;

mod header_store;
pub use header_store::HeaderStore;
pub use header_store::HeaderStoreIter;

mod outgoing;
pub use outgoing::DEFAULT_USER_AGENT;
pub use outgoing::OutgoingHead;

mod url;
pub use url::Target;

mod error;
pub use error::HeaderError;
pub use error::HttpError;
pub use error::ParseError;
pub use error::SendError;
pub use error::UrlError;
