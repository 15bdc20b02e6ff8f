use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HttpError {
    #[error("parse error: {source}")]
    ParseError {
        #[from]
        source: ParseError,
    },

    #[error("send error: {source}")]
    SendError {
        #[from]
        source: SendError,
    },

    #[error("handler error: {source}")]
    HandlerError { source: Box<dyn std::error::Error + Send + Sync> },
}

impl HttpError {
    pub fn handler<E: Into<Box<dyn std::error::Error + Send + Sync>>>(e: E) -> Self {
        Self::HandlerError { source: e.into() }
    }
}

/// Errors raised while decoding an inbound message.
///
/// Every variant terminates the message in progress: the decoder returns the
/// error once and then stays failed until it is reset.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("malformed start line: {reason}")]
    MalformedStartLine { reason: String },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("malformed header line: {reason}")]
    MalformedHeaderLine { reason: String },

    #[error("invalid chunk size encoding: {reason}")]
    InvalidChunkSizeEncoding { reason: String },

    #[error("connection closed before the message was complete")]
    TruncatedMessage,

    #[error("line size too large, current: {current_size} exceed the limit {max_size}")]
    LineTooLong { current_size: usize, max_size: usize },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn malformed_start_line<S: ToString>(str: S) -> Self {
        Self::MalformedStartLine { reason: str.to_string() }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn malformed_header_line<S: ToString>(str: S) -> Self {
        Self::MalformedHeaderLine { reason: str.to_string() }
    }

    pub fn invalid_chunk_size<S: ToString>(str: S) -> Self {
        Self::InvalidChunkSizeEncoding { reason: str.to_string() }
    }

    pub fn line_too_long(current_size: usize, max_size: usize) -> Self {
        Self::LineTooLong { current_size, max_size }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

/// Errors raised by the header store when a caller reads or writes a header.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HeaderError {
    /// The caller asked for a header that was never supplied.
    #[error("header `{name}` has not been set")]
    NotSet { name: String },

    #[error("invalid header name: {name:?}")]
    InvalidName { name: String },

    #[error("invalid value for header `{name}`")]
    InvalidValue { name: String },
}

impl HeaderError {
    pub fn not_set<S: ToString>(name: S) -> Self {
        Self::NotSet { name: name.to_string() }
    }

    pub fn invalid_name<S: ToString>(name: S) -> Self {
        Self::InvalidName { name: name.to_string() }
    }

    pub fn invalid_value<S: ToString>(name: S) -> Self {
        Self::InvalidValue { name: name.to_string() }
    }
}

/// Errors raised while composing or sending an outbound message.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid start line: {reason}")]
    InvalidStartLine { reason: String },

    #[error("invalid header: {source}")]
    InvalidHeader {
        #[from]
        source: HeaderError,
    },

    #[error("unsupported http version: {version:?}")]
    UnsupportedVersion { version: http::Version },

    #[error("invalid body: {reason}")]
    InvalidBody { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn missing_field(field: &'static str) -> Self {
        Self::MissingField { field }
    }

    pub fn invalid_start_line<S: ToString>(str: S) -> Self {
        Self::InvalidStartLine { reason: str.to_string() }
    }

    pub fn invalid_body<S: ToString>(str: S) -> Self {
        Self::InvalidBody { reason: str.to_string() }
    }

    pub fn io<E: Into<io::Error>>(e: E) -> Self {
        Self::Io { source: e.into() }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    #[error("invalid url: {reason}")]
    Invalid { reason: String },

    #[error("unsupported url scheme: {scheme}")]
    UnsupportedScheme { scheme: String },

    #[error("url has no host")]
    MissingHost,
}

impl UrlError {
    pub fn invalid<S: ToString>(str: S) -> Self {
        Self::Invalid { reason: str.to_string() }
    }
}
