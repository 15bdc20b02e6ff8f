/// A wire fixture fed to the decoder, whole or in fixed size fragments.
#[derive(Debug, Copy, Clone)]
pub struct TestCase {
    name: &'static str,
    file: TestFile,
    fragment_size: Option<usize>,
}

impl TestCase {
    /// The whole fixture arrives in a single read.
    pub fn whole(name: &'static str, file: TestFile) -> Self {
        Self { name, file, fragment_size: None }
    }

    /// The fixture arrives `fragment_size` bytes at a time.
    pub fn fragmented(name: &'static str, file: TestFile, fragment_size: usize) -> Self {
        Self { name, file, fragment_size: Some(fragment_size.max(1)) }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn file(&self) -> &TestFile {
        &self.file
    }

    pub fn file_name(&self) -> &'static str {
        self.file().file_name
    }

    /// The reads the transport would deliver for this case.
    pub fn fragments(&self) -> impl Iterator<Item = &'static [u8]> {
        let content = self.file.content.as_bytes();
        let size = self.fragment_size.unwrap_or(content.len().max(1));
        content.chunks(size)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct TestFile {
    file_name: &'static str,
    content: &'static str,
}

impl TestFile {
    pub const fn new(file_name: &'static str, content: &'static str) -> Self {
        Self { file_name, content }
    }

    pub fn content(&self) -> &'static str {
        self.content
    }

    pub fn file_name(&self) -> &'static str {
        self.file_name
    }
}
