//! Limits applied while decoding inbound messages.

/// Default maximum number of header lines (trailers included) per message
pub const DEFAULT_MAX_HEADER_COUNT: usize = 200;

/// Default maximum size in bytes of a single protocol line
pub const DEFAULT_MAX_LINE_SIZE: usize = 8 * 1024;

/// Limits shared by every decoder built from it.
///
/// The configuration is read-only once a decoder has been created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    max_header_count: usize,
    max_line_size: usize,
}

impl DecoderConfig {
    pub fn new() -> Self {
        Default::default()
    }

    /// Sets the number of header lines a message may carry.
    pub fn with_max_header_count(mut self, max_header_count: usize) -> Self {
        self.max_header_count = max_header_count;
        self
    }

    /// Sets the longest line (start line, header or chunk size) accepted.
    pub fn with_max_line_size(mut self, max_line_size: usize) -> Self {
        self.max_line_size = max_line_size;
        self
    }

    pub fn max_header_count(&self) -> usize {
        self.max_header_count
    }

    pub fn max_line_size(&self) -> usize {
        self.max_line_size
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self { max_header_count: DEFAULT_MAX_HEADER_COUNT, max_line_size: DEFAULT_MAX_LINE_SIZE }
    }
}
