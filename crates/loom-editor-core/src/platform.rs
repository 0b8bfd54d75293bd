//! Collaborator traits for things the core does not own.
//!
//! The editor loop supplies a clipboard and, for layout, glyph metrics.
//! The core only ever talks to them through these traits, so it has no
//! dependency on any windowing or font library.

/// Error type for platform operations.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{0}")]
pub struct PlatformError(pub String);

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

/// System clipboard carrying raw bytes.
///
/// The content is plain UTF-8 text, not rich text; pasted text takes on the
/// formatting found at the insertion point.
pub trait Clipboard {
    fn read(&self) -> Result<Vec<u8>, PlatformError>;

    fn write(&mut self, bytes: &[u8]) -> Result<(), PlatformError>;
}

/// In-process clipboard, for tests and headless front ends.
#[derive(Debug, Clone, Default)]
pub struct MemoryClipboard {
    contents: Vec<u8>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self) -> &[u8] {
        &self.contents
    }
}

impl Clipboard for MemoryClipboard {
    fn read(&self) -> Result<Vec<u8>, PlatformError> {
        Ok(self.contents.clone())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), PlatformError> {
        self.contents = bytes.to_vec();
        Ok(())
    }
}

/// Font metrics provider used by the layout pass.
pub trait GlyphMetrics {
    /// Advance width and line height of `codepoint` in font `font_id` at `size`.
    fn measure(&self, font_id: usize, codepoint: u32, size: u32) -> (f32, f32);
}

/// Every glyph is `size * ratio` wide and `size` tall.
///
/// Handy for tests and for terminal front ends with a monospace grid.
#[derive(Debug, Clone, Copy)]
pub struct MonospaceMetrics {
    pub ratio: f32,
}

impl Default for MonospaceMetrics {
    fn default() -> Self {
        Self { ratio: 0.6 }
    }
}

impl GlyphMetrics for MonospaceMetrics {
    fn measure(&self, _font_id: usize, _codepoint: u32, size: u32) -> (f32, f32) {
        let size = size as f32;
        (size * self.ratio, size)
    }
}
