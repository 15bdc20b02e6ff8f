//! HTTP status line handling implementation.
//!
//! This module holds the parsed form of a status line
//! (`HTTP-version SP status-code SP reason-phrase`).

use http::{StatusCode, Version};

use crate::protocol::start_line::parse_version;
use crate::protocol::ParseError;

/// Represents a parsed HTTP status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    version: Version,
    status: StatusCode,
    status_text: String,
}

impl StatusLine {
    pub fn new(version: Version, status: StatusCode, status_text: impl Into<String>) -> Self {
        Self { version, status, status_text: status_text.into() }
    }

    /// Returns the response's HTTP version.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Returns the response's status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the reason phrase, possibly empty.
    pub fn status_text(&self) -> &str {
        &self.status_text
    }

    /// Status codes that never carry a body: 1xx, 204 and 304.
    pub fn forbids_body(&self) -> bool {
        self.status.is_informational() || self.status == StatusCode::NO_CONTENT || self.status == StatusCode::NOT_MODIFIED
    }
}

impl TryFrom<&str> for StatusLine {
    type Error = ParseError;

    /// Parses `version SP status SP reason`, where the reason is the rest of
    /// the line with leading whitespace trimmed.
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let line = line.trim_start();
        let (version, rest) = line.split_once(|c: char| c.is_ascii_whitespace()).unwrap_or((line, ""));
        let rest = rest.trim_start();
        let (status, status_text) = rest.split_once(|c: char| c.is_ascii_whitespace()).unwrap_or((rest, ""));

        let version = parse_version(version)?;

        if status.len() != 3 {
            return Err(ParseError::malformed_start_line(format!("invalid status code {status:?}")));
        }
        let status = StatusCode::from_bytes(status.as_bytes())
            .map_err(|_e| ParseError::malformed_start_line(format!("invalid status code {status:?}")))?;

        Ok(Self::new(version, status, status_text.trim_start()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        let line = StatusLine::try_from("HTTP/1.1 404 Not Found").unwrap();

        assert_eq!(line.version(), Version::HTTP_11);
        assert_eq!(line.status().as_str(), "404");
        assert_eq!(line.status_text(), "Not Found");
    }

    #[test]
    fn test_empty_reason() {
        let line = StatusLine::try_from("HTTP/1.0 200").unwrap();

        assert_eq!(line.version(), Version::HTTP_10);
        assert_eq!(line.status(), StatusCode::OK);
        assert_eq!(line.status_text(), "");
    }

    #[test]
    fn test_forbids_body() {
        assert!(StatusLine::try_from("HTTP/1.1 100 Continue").unwrap().forbids_body());
        assert!(StatusLine::try_from("HTTP/1.1 204 No Content").unwrap().forbids_body());
        assert!(StatusLine::try_from("HTTP/1.1 304 Not Modified").unwrap().forbids_body());
        assert!(!StatusLine::try_from("HTTP/1.1 200 OK").unwrap().forbids_body());
    }

    #[test]
    fn test_invalid() {
        assert!(matches!(StatusLine::try_from("HTTP/1.1 20 OK"), Err(ParseError::MalformedStartLine { .. })));
        assert!(matches!(StatusLine::try_from("HTTP/1.1 abc OK"), Err(ParseError::MalformedStartLine { .. })));
        assert!(matches!(StatusLine::try_from("HTTP/1.1"), Err(ParseError::MalformedStartLine { .. })));
        assert!(matches!(StatusLine::try_from("HTTP/3.5 200 OK"), Err(ParseError::MalformedStartLine { .. })));
    }
}
