//! HTTP connection handling module
//!
//! This module runs the codec over a tokio transport. It contains no protocol
//! logic: bytes read from the transport go to the
//! [`MessageDecoder`](crate::codec::MessageDecoder), outgoing heads and bodies
//! go through the [`MessageEncoder`](crate::codec::MessageEncoder).
//!
//! # Components
//!
//! - [`HttpConnection`]: connection adapter that:
//!   - Reads events one at a time, or dispatches them to a handler
//!   - Writes heads and bodies
//!   - Stops on a message that does not keep the connection alive
//!   - Answers malformed requests with `400 Bad Request`

mod http_connection;

pub use http_connection::HttpConnection;
