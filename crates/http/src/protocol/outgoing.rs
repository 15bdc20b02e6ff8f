//! Fields of an outgoing request or response, prior to composition.
//!
//! An [`OutgoingHead`] is filled in by the caller and handed to the
//! [`MessageEncoder`](crate::codec::MessageEncoder), which validates it and
//! writes the start line and header block to the wire.

use std::fmt;

use base64ct::{Base64, Encoding};
use http::header::{AUTHORIZATION, HOST, USER_AGENT};
use http::{HeaderValue, Method, StatusCode, Version};

use crate::ensure;
use crate::protocol::{HeaderError, HeaderStore, SendError, Target};

/// User agent sent with outgoing requests unless the caller overrides it.
pub const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq)]
enum Kind {
    Request { method: Option<Method>, url: Option<String>, user_agent: HeaderValue },
    Response { status: Option<StatusCode>, status_text: Option<String>, head_response: bool },
}

/// Start line fields plus headers of an outgoing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingHead {
    kind: Kind,
    version: Version,
    headers: HeaderStore,
}

impl OutgoingHead {
    /// An empty request; method and url must be set before composing.
    pub fn request() -> Self {
        Self {
            kind: Kind::Request { method: None, url: None, user_agent: HeaderValue::from_static(DEFAULT_USER_AGENT) },
            version: Version::HTTP_11,
            headers: HeaderStore::new(),
        }
    }

    /// An empty response; the status must be set before composing.
    pub fn response() -> Self {
        Self {
            kind: Kind::Response { status: None, status_text: None, head_response: false },
            version: Version::HTTP_11,
            headers: HeaderStore::new(),
        }
    }

    /// A response with the given status and its canonical reason phrase.
    pub fn with_status(status: StatusCode) -> Self {
        let mut head = Self::response();
        head.set_status(status);
        head
    }

    /// Prepares a request for `target`: the url becomes the request path, the
    /// `Host` header is set, and credentials embedded in the url turn into a
    /// basic `Authorization` header.
    pub fn request_to(method: Method, target: &Target) -> Result<Self, HeaderError> {
        let mut head = Self::request();
        head.set_method(method);
        head.set_url(target.request_path());
        head.headers.set_str(HOST.as_str(), &target.host_header())?;

        if let Some(credentials) = target.credentials() {
            let encoded = Base64::encode_string(credentials.as_bytes());
            head.headers.set_str(AUTHORIZATION.as_str(), &format!("Basic {encoded}"))?;
        }

        Ok(head)
    }

    pub fn is_request(&self) -> bool {
        matches!(self.kind, Kind::Request { .. })
    }

    pub fn is_response(&self) -> bool {
        matches!(self.kind, Kind::Response { .. })
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    /// Has no effect on a response.
    pub fn set_method(&mut self, x: Method) {
        if let Kind::Request { method, .. } = &mut self.kind {
            *method = Some(x);
        }
    }

    /// Has no effect on a response.
    pub fn set_url(&mut self, x: impl Into<String>) {
        if let Kind::Request { url, .. } = &mut self.kind {
            *url = Some(x.into());
        }
    }

    /// Overrides the default user agent; has no effect on a response.
    pub fn set_user_agent(&mut self, value: HeaderValue) {
        if let Kind::Request { user_agent, .. } = &mut self.kind {
            *user_agent = value;
        }
    }

    /// Has no effect on a request.
    pub fn set_status(&mut self, x: StatusCode) {
        if let Kind::Response { status, .. } = &mut self.kind {
            *status = Some(x);
        }
    }

    /// Has no effect on a request.
    pub fn set_status_text(&mut self, x: impl Into<String>) {
        if let Kind::Response { status_text, .. } = &mut self.kind {
            *status_text = Some(x.into());
        }
    }

    /// Marks a response as the answer to a HEAD request: its headers may
    /// describe a body, but none is sent. Has no effect on a request.
    pub fn set_head_response(&mut self) {
        if let Kind::Response { head_response, .. } = &mut self.kind {
            *head_response = true;
        }
    }

    /// Returns true for a response that must not carry a body: a HEAD answer,
    /// or a 1xx, 204 or 304 status.
    pub fn forbids_body(&self) -> bool {
        match &self.kind {
            Kind::Request { .. } => false,
            Kind::Response { head_response: true, .. } => true,
            Kind::Response { status, .. } => status.is_some_and(|status| {
                status.is_informational() || status == StatusCode::NO_CONTENT || status == StatusCode::NOT_MODIFIED
            }),
        }
    }

    pub fn method(&self) -> Option<&Method> {
        match &self.kind {
            Kind::Request { method, .. } => method.as_ref(),
            Kind::Response { .. } => None,
        }
    }

    pub fn url(&self) -> Option<&str> {
        match &self.kind {
            Kind::Request { url, .. } => url.as_deref(),
            Kind::Response { .. } => None,
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match &self.kind {
            Kind::Request { .. } => None,
            Kind::Response { status, .. } => *status,
        }
    }

    /// The explicit status text, or the canonical reason phrase of the status.
    pub fn status_text(&self) -> Option<&str> {
        match &self.kind {
            Kind::Request { .. } => None,
            Kind::Response { status_text: Some(text), .. } => Some(text),
            Kind::Response { status, .. } => status.and_then(|status| status.canonical_reason()),
        }
    }

    pub fn headers(&self) -> &HeaderStore {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderStore {
        &mut self.headers
    }

    /// Adds (and replaces if it exists) a header.
    pub fn add_header(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.headers.set_str(name, value)
    }

    /// Adds (and replaces if it exists) a header with a formatted value.
    pub fn add_header_fmt(&mut self, name: &str, args: fmt::Arguments<'_>) -> Result<(), HeaderError> {
        self.headers.set_fmt(name, args)
    }

    /// Adds a header without replacing earlier ones of the same name.
    pub fn append_header(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        self.headers.append_str(name, value)
    }

    /// Returns true if the header has been set with [`OutgoingHead::add_header`].
    pub fn header_is_set(&self, name: &str) -> bool {
        self.headers.is_set(name)
    }

    /// Checks that every required field is present and returns the start line
    /// to write, with the default user agent filled in for requests.
    pub(crate) fn prepare(&mut self) -> Result<String, SendError> {
        let version = version_str(self.version)?;

        match &self.kind {
            Kind::Request { method, url, user_agent } => {
                let method = method.as_ref().ok_or(SendError::missing_field("method"))?;
                let url = url.as_deref().filter(|url| !url.is_empty()).ok_or(SendError::missing_field("url"))?;
                ensure!(
                    url.bytes().all(|b| b.is_ascii_graphic() || b >= 0x80),
                    SendError::invalid_start_line("url contains whitespace or control characters")
                );
                let start_line = format!("{method} {url} {version}\r\n");

                if !self.headers.is_set(USER_AGENT.as_str()) {
                    self.headers.set(USER_AGENT, user_agent.clone());
                }
                Ok(start_line)
            }
            Kind::Response { status, .. } => {
                let status = status.ok_or(SendError::missing_field("status"))?;
                let status_text = self.status_text().unwrap_or_default();
                ensure!(
                    status_text.bytes().all(|b| b == b'\t' || !b.is_ascii_control()),
                    SendError::invalid_start_line("status text contains control characters")
                );
                Ok(format!("{version} {} {status_text}\r\n", status.as_str()))
            }
        }
    }
}

fn version_str(version: Version) -> Result<&'static str, SendError> {
    match version {
        Version::HTTP_10 => Ok("HTTP/1.0"),
        Version::HTTP_11 => Ok("HTTP/1.1"),
        version => Err(SendError::UnsupportedVersion { version }),
    }
}
