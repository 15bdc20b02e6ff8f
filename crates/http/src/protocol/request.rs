//! HTTP request line handling implementation.
//!
//! This module holds the parsed form of a request line
//! (`METHOD SP request-target SP HTTP-version`).

use http::{Method, Version};

use crate::protocol::start_line::parse_version;
use crate::protocol::ParseError;

/// Represents a parsed HTTP request line.
///
/// The request target is kept verbatim in `url`; [`RequestLine::uri`] and
/// [`RequestLine::query_string`] split it at the first `?`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    method: Method,
    url: String,
    split: Option<usize>,
    version: Version,
}

impl RequestLine {
    /// Creates a request line from its parts.
    pub fn new(method: Method, url: impl Into<String>, version: Version) -> Self {
        let url = url.into();
        let split = url.find('?');
        Self { method, url, split, version }
    }

    /// Returns a reference to the request's HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the full request target as received.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the part of the url before the first `?`.
    pub fn uri(&self) -> &str {
        match self.split {
            Some(index) => &self.url[..index],
            None => &self.url,
        }
    }

    /// Returns the part of the url after the first `?`, or an empty string.
    pub fn query_string(&self) -> &str {
        match self.split {
            Some(index) => &self.url[index + 1..],
            None => "",
        }
    }

    /// Returns the request's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }
}

impl TryFrom<&str> for RequestLine {
    type Error = ParseError;

    /// Parses `METHOD SP url SP version`, tokenized by whitespace.
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let mut tokens = line.split_ascii_whitespace();

        let (Some(method), Some(url), Some(version), None) = (tokens.next(), tokens.next(), tokens.next(), tokens.next())
        else {
            return Err(ParseError::malformed_start_line(format!("expect `method url version`, got {line:?}")));
        };

        let method = Method::from_bytes(method.as_bytes())
            .map_err(|_e| ParseError::malformed_start_line(format!("invalid method {method:?}")))?;
        let version = parse_version(version)?;

        Ok(Self::new(method, url, version))
    }
}
