//! Error types for the editor core.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T, E = EditorError> = std::result::Result<T, E>;

/// Main error type for editor-core operations.
#[derive(Debug, Error, Diagnostic)]
pub enum EditorError {
    /// An index-addressed read went past the end of its container.
    ///
    /// The document engine clamps every user-facing index before it reaches
    /// the rope, so seeing this from a document operation means a clamping bug.
    #[error("{what} index {index} out of range (length {len})")]
    #[diagnostic(code(loom::rope::out_of_range))]
    OutOfRange {
        what: &'static str,
        index: usize,
        len: usize,
    },

    #[error("io error: {0}")]
    #[diagnostic(code(loom::io))]
    Io(#[from] std::io::Error),

    /// The persisted document layout could not be parsed.
    #[error("malformed document at line {line}: {message}")]
    #[diagnostic(code(loom::persist::format))]
    Format { line: usize, message: String },

    #[error("could not load dictionary from {}", path.display())]
    #[diagnostic(
        code(loom::dictionary::load),
        help("spellcheck stays disabled until a word list is loaded")
    )]
    DictionaryLoad {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Save was requested on a document that has never been given a path.
    #[error("document has no file name")]
    #[diagnostic(code(loom::persist::untitled), help("use save_as with an explicit path"))]
    Untitled,
}

impl EditorError {
    pub(crate) fn out_of_range(what: &'static str, index: usize, len: usize) -> Self {
        Self::OutOfRange { what, index, len }
    }

    pub(crate) fn format(line: usize, message: impl Into<String>) -> Self {
        Self::Format {
            line,
            message: message.into(),
        }
    }
}
