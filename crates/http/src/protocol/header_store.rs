//! Header storage for outgoing messages.
//!
//! Headers live in two independent containers:
//!
//! - a case-insensitive replace-map holding one current value per name, and
//! - an ordered append-list for headers that legitimately repeat, such as
//!   several `Set-Cookie` lines.
//!
//! Serialization emits the map first and the append-list after it.
//!
//! Note that [`HeaderStore::is_set`] only consults the map: a header that was
//! only ever appended is reported as absent.

use std::fmt;
use std::fmt::Write;

use http::header::{IntoHeaderName, Iter};
use http::{HeaderMap, HeaderName, HeaderValue};

use crate::protocol::HeaderError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderStore {
    map: HeaderMap,
    appended: Vec<(HeaderName, HeaderValue)>,
}

impl HeaderStore {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets a header in the replace-map, overwriting any value previously set
    /// under the same name regardless of case. Returns the previous value.
    pub fn set<K: IntoHeaderName>(&mut self, name: K, value: HeaderValue) -> Option<HeaderValue> {
        self.map.insert(name, value)
    }

    /// Same as [`HeaderStore::set`], validating a textual name and value.
    pub fn set_str(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = to_header(name, value)?;
        self.map.insert(name, value);
        Ok(())
    }

    /// Sets a header whose value is produced by formatting `args`.
    ///
    /// ```
    /// use http_engine::protocol::HeaderStore;
    ///
    /// let mut headers = HeaderStore::new();
    /// headers.set_fmt("Content-Length", format_args!("{}", 42)).unwrap();
    /// assert_eq!(headers.get("content-length").unwrap(), "42");
    /// ```
    pub fn set_fmt(&mut self, name: &str, args: fmt::Arguments<'_>) -> Result<(), HeaderError> {
        let mut value = String::new();
        value.write_fmt(args).map_err(|_e| HeaderError::invalid_value(name))?;
        self.set_str(name, &value)
    }

    /// Appends a header to the append-list, leaving the replace-map untouched.
    pub fn append<K: Into<HeaderName>>(&mut self, name: K, value: HeaderValue) {
        self.appended.push((name.into(), value));
    }

    /// Same as [`HeaderStore::append`], validating a textual name and value.
    pub fn append_str(&mut self, name: &str, value: &str) -> Result<(), HeaderError> {
        let (name, value) = to_header(name, value)?;
        self.appended.push((name, value));
        Ok(())
    }

    /// Returns true if `name` is present in the replace-map.
    pub fn is_set(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    /// Looks `name` up in the replace-map.
    pub fn get(&self, name: &str) -> Option<&HeaderValue> {
        self.map.get(name)
    }

    /// Like [`HeaderStore::get`], but reports a missing header as an error.
    pub fn require(&self, name: &str) -> Result<&HeaderValue, HeaderError> {
        self.map.get(name).ok_or_else(|| HeaderError::not_set(name))
    }

    /// Removes `name` from the replace-map.
    pub fn remove(&mut self, name: &str) -> Option<HeaderValue> {
        self.map.remove(name)
    }

    /// The replace-map.
    pub fn map(&self) -> &HeaderMap {
        &self.map
    }

    /// The append-list, in insertion order.
    pub fn appended(&self) -> &[(HeaderName, HeaderValue)] {
        &self.appended
    }

    /// Total number of header lines this store serializes to.
    pub fn len(&self) -> usize {
        self.map.len() + self.appended.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty() && self.appended.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear();
        self.appended.clear();
    }

    /// Iterates over every header in serialization order.
    pub fn iter(&self) -> HeaderStoreIter<'_> {
        HeaderStoreIter { map: self.map.iter(), appended: self.appended.iter() }
    }
}

impl<'a> IntoIterator for &'a HeaderStore {
    type Item = (&'a HeaderName, &'a HeaderValue);
    type IntoIter = HeaderStoreIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`HeaderStore`]: replace-map entries, then appended pairs.
#[derive(Debug)]
pub struct HeaderStoreIter<'a> {
    map: Iter<'a, HeaderValue>,
    appended: std::slice::Iter<'a, (HeaderName, HeaderValue)>,
}

impl<'a> Iterator for HeaderStoreIter<'a> {
    type Item = (&'a HeaderName, &'a HeaderValue);

    fn next(&mut self) -> Option<Self::Item> {
        self.map.next().or_else(|| self.appended.next().map(|(name, value)| (name, value)))
    }
}

fn to_header(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), HeaderError> {
    let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|_e| HeaderError::invalid_name(name))?;
    let header_value = HeaderValue::from_str(value).map_err(|_e| HeaderError::invalid_value(name))?;
    Ok((header_name, header_value))
}
