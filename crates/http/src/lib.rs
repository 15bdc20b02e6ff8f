//! An incremental HTTP/1.x message engine
//!
//! This crate turns an arbitrarily fragmented byte stream into a sequence of
//! protocol events (start line, header, end of headers, body chunk, end of
//! body) and composes outgoing requests and responses from structured fields.
//! It never blocks and never assumes that message boundaries line up with
//! I/O boundaries: incomplete input simply stays in the buffer until more
//! bytes arrive.
//!
//! # Features
//!
//! - HTTP/1.0 and HTTP/1.1 requests and responses
//! - Chunked transfer coding with extensions and trailers
//! - Content-Length bodies and bodies delimited by the connection close
//! - Keep-alive and pipelined messages
//! - Header count and line size limits
//! - Url decomposition with TLS signal and Basic credentials
//! - Zero-copy body chunks through `bytes`
//!
//! # Example
//!
//! ```no_run
//! use std::convert::Infallible;
//! use bytes::Bytes;
//! use http::StatusCode;
//! use tokio::net::TcpListener;
//! use tracing::{error, info, warn, Level};
//! use tracing_subscriber::FmtSubscriber;
//! use http_engine::connection::HttpConnection;
//! use http_engine::handler::{make_handler, Action};
//! use http_engine::protocol::{Message, OutgoingHead};
//!
//! #[tokio::main]
//! async fn main() {
//!     // Initialize logging
//!     let subscriber = FmtSubscriber::builder()
//!         .with_max_level(Level::INFO)
//!         .finish();
//!     tracing::subscriber::set_global_default(subscriber)
//!         .expect("setting default subscriber failed");
//!
//!     info!(port = 8080, "start listening");
//!     let tcp_listener = match TcpListener::bind("127.0.0.1:8080").await {
//!         Ok(tcp_listener) => tcp_listener,
//!         Err(e) => {
//!             error!(cause = %e, "bind server error");
//!             return;
//!         }
//!     };
//!
//!     loop {
//!         let (tcp_stream, _remote_addr) = match tcp_listener.accept().await {
//!             Ok(stream_and_addr) => stream_and_addr,
//!             Err(e) => {
//!                 warn!(cause = %e, "failed to accept");
//!                 continue;
//!             }
//!         };
//!
//!         tokio::spawn(async move {
//!             let (reader, writer) = tcp_stream.into_split();
//!             let connection = HttpConnection::new(reader, writer);
//!             match connection.process(make_handler(hello_world)).await {
//!                 Ok(_) => info!("finished process, connection shutdown"),
//!                 Err(e) => error!("service has error, cause {}, connection shutdown", e),
//!             }
//!         });
//!     }
//! }
//!
//! async fn hello_world(message: Message) -> Result<Action, Infallible> {
//!     if !message.is_eof() {
//!         return Ok(Action::Continue);
//!     }
//!
//!     let body = "Hello World!\r\n";
//!     let mut head = OutgoingHead::with_status(StatusCode::OK);
//!     head.add_header_fmt("Content-Length", format_args!("{}", body.len())).unwrap();
//!     Ok(Action::Reply(head, Bytes::from_static(body.as_bytes())))
//! }
//! ```
//!
//! # Architecture
//!
//! The crate is organized into several key modules:
//!
//! - [`protocol`]: Events, start lines, outgoing heads, header store, url
//!   decomposition and errors
//! - [`codec`]: The decoding and encoding state machines
//! - [`config`]: Decoder limits
//! - [`connection`]: tokio adapter driving the codec over a transport
//! - [`handler`]: Event consumer trait and utilities
//!
//! # Error Handling
//!
//! The crate uses custom error types that implement `std::error::Error`:
//!
//! - [`protocol::ParseError`]: inbound decoding errors
//! - [`protocol::SendError`]: outbound composition errors
//! - [`protocol::HeaderError`]: header store errors
//! - [`protocol::UrlError`]: url decomposition errors
//! - [`protocol::HttpError`]: top-level error of the connection adapter
//!
//! # Limitations
//!
//! - HTTP/1.x only (HTTP/2 or HTTP/3 is not supported)
//! - No TLS: [`protocol::Target::requires_tls`] tells the transport when to
//!   wrap the connection
//! - Maximum line size: 8KB by default
//! - Maximum number of headers: 200 by default

pub mod codec;
pub mod config;
pub mod connection;
pub mod handler;
pub mod protocol;

mod utils;
pub(crate) use utils::ensure;
