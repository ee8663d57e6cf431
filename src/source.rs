/// An immutable, named script buffer.
///
/// The name identifies the buffer in diagnostics only; it has no effect
/// on tokenization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceBuffer {
    name: String,
    text: String,
}

impl SourceBuffer {
    /// Create a buffer from a name and its full text.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }

    /// Identifying name used in diagnostics.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Full text of the buffer.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text in the byte range `start..end`, or `None` when the range is
    /// out of bounds or splits a character.
    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Option<&str> {
        self.text.get(start..end)
    }

    /// Length of the buffer in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.text.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}
