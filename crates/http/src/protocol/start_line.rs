use http::Version;

use crate::protocol::{ParseError, RequestLine, StatusLine};

/// The first line of an HTTP message, either a request line or a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartLine {
    Request(RequestLine),
    Response(StatusLine),
}

impl StartLine {
    #[inline]
    pub fn is_request(&self) -> bool {
        matches!(self, StartLine::Request(_))
    }

    #[inline]
    pub fn is_response(&self) -> bool {
        matches!(self, StartLine::Response(_))
    }

    pub fn version(&self) -> Version {
        match self {
            StartLine::Request(request) => request.version(),
            StartLine::Response(response) => response.version(),
        }
    }

    pub fn as_request(&self) -> Option<&RequestLine> {
        match self {
            StartLine::Request(request) => Some(request),
            StartLine::Response(_) => None,
        }
    }

    pub fn as_response(&self) -> Option<&StatusLine> {
        match self {
            StartLine::Request(_) => None,
            StartLine::Response(response) => Some(response),
        }
    }
}

impl TryFrom<&str> for StartLine {
    type Error = ParseError;

    /// Classifies the line: a first token starting with `HTTP/` (any case)
    /// makes it a status line, anything else is parsed as a request line.
    fn try_from(line: &str) -> Result<Self, Self::Error> {
        let first = line.split_ascii_whitespace().next().unwrap_or_default();

        if first.len() >= 5 && first.as_bytes()[..5].eq_ignore_ascii_case(b"HTTP/") {
            StatusLine::try_from(line).map(StartLine::Response)
        } else {
            RequestLine::try_from(line).map(StartLine::Request)
        }
    }
}

/// Parses the `HTTP/x.y` token; only HTTP/1.0 and HTTP/1.1 are accepted.
pub(crate) fn parse_version(token: &str) -> Result<Version, ParseError> {
    match token.as_bytes() {
        [b'H' | b'h', b'T' | b't', b'T' | b't', b'P' | b'p', b'/', b'1', b'.', b'1'] => Ok(Version::HTTP_11),
        [b'H' | b'h', b'T' | b't', b'T' | b't', b'P' | b'p', b'/', b'1', b'.', b'0'] => Ok(Version::HTTP_10),
        _ => Err(ParseError::malformed_start_line(format!("unsupported http version {token:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::{Method, StatusCode};

    #[test]
    fn classify_request() {
        let start_line = StartLine::try_from("GET /a/b?x=1 HTTP/1.1").unwrap();
        assert!(start_line.is_request());
        assert!(!start_line.is_response());

        let request = start_line.as_request().unwrap();
        assert_eq!(request.method(), &Method::GET);
        assert_eq!(format!("{:?}", request.version()), "HTTP/1.1");
    }

    #[test]
    fn classify_response() {
        let start_line = StartLine::try_from("HTTP/1.1 404 Not Found").unwrap();
        assert!(start_line.is_response());

        let response = start_line.as_response().unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(response.status_text(), "Not Found");
    }

    #[test]
    fn classify_lowercase_response() {
        let start_line = StartLine::try_from("http/1.0 200 OK").unwrap();
        assert!(start_line.is_response());
        assert_eq!(start_line.version(), Version::HTTP_10);
    }

    #[test]
    fn malformed() {
        assert!(matches!(StartLine::try_from(""), Err(ParseError::MalformedStartLine { .. })));
        assert!(matches!(StartLine::try_from("hello"), Err(ParseError::MalformedStartLine { .. })));
        assert!(matches!(StartLine::try_from("HTTP/1.1 OK"), Err(ParseError::MalformedStartLine { .. })));
    }
}
