//! Decomposition of absolute `http`/`https` urls into connection targets.
//!
//! [`Target::parse`] does not touch any connection state. The transport uses
//! [`Target::requires_tls`] to decide whether to enable encryption before
//! connecting, and [`OutgoingHead::request_to`](crate::protocol::OutgoingHead::request_to)
//! uses the rest to prepare a request.

use std::fmt;

use http::Uri;
use http::uri::Scheme;

use crate::protocol::UrlError;

/// The parts of an absolute url needed to open a connection and send a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    secure: bool,
    host: String,
    port: u16,
    request_path: String,
    file: String,
    credentials: Option<String>,
}

impl Target {
    /// Splits `url` into scheme, host, port, request path and file.
    ///
    /// ```
    /// use http_engine::protocol::Target;
    ///
    /// let target = Target::parse("https://example.com/docs/index.html?lang=en").unwrap();
    /// assert!(target.requires_tls());
    /// assert_eq!(target.host(), "example.com");
    /// assert_eq!(target.port(), 443);
    /// assert_eq!(target.request_path(), "/docs/index.html?lang=en");
    /// assert_eq!(target.file(), "index.html");
    /// ```
    pub fn parse(url: &str) -> Result<Self, UrlError> {
        let uri = url.parse::<Uri>().map_err(UrlError::invalid)?;

        let secure = match uri.scheme() {
            Some(scheme) if *scheme == Scheme::HTTPS => true,
            Some(scheme) if *scheme == Scheme::HTTP => false,
            Some(scheme) => return Err(UrlError::UnsupportedScheme { scheme: scheme.to_string() }),
            None => return Err(UrlError::invalid(format!("{url:?} is not an absolute url"))),
        };

        let authority = uri.authority().ok_or(UrlError::MissingHost)?;
        let host = authority.host();
        if host.is_empty() {
            return Err(UrlError::MissingHost);
        }

        let port = authority.port_u16().unwrap_or(if secure { 443 } else { 80 });

        let credentials = authority.as_str().rsplit_once('@').map(|(userinfo, _)| userinfo.to_string());

        let path = uri.path();
        let request_path = match uri.query() {
            Some(query) => format!("{path}?{query}"),
            None => path.to_string(),
        };
        let request_path = if request_path.starts_with('/') { request_path } else { format!("/{request_path}") };

        let file = path.rsplit('/').find(|segment| !segment.is_empty()).unwrap_or_default().to_string();

        Ok(Self { secure, host: host.to_string(), port, request_path, file, credentials })
    }

    /// Returns true for `https` urls: the transport must enable encryption.
    pub fn requires_tls(&self) -> bool {
        self.secure
    }

    pub fn scheme(&self) -> &'static str {
        if self.secure { "https" } else { "http" }
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// The explicit port, or 80/443 depending on the scheme.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Returns true when the port is the scheme's default.
    pub fn is_default_port(&self) -> bool {
        self.port == if self.secure { 443 } else { 80 }
    }

    /// Path and query, always starting with `/`.
    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// The last non-empty path segment, or an empty string.
    pub fn file(&self) -> &str {
        &self.file
    }

    /// The `user:password` part of the url, if any.
    pub fn credentials(&self) -> Option<&str> {
        self.credentials.as_deref()
    }

    /// Value for the `Host` header: the port is omitted when it is the default.
    pub fn host_header(&self) -> String {
        if self.is_default_port() { self.host.clone() } else { format!("{}:{}", self.host, self.port) }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}{}", self.scheme(), self.host_header(), self.request_path)
    }
}
