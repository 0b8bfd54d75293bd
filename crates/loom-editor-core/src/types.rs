//! Core editor types: cursor, selection, and edit tracking.

use std::cmp::Ordering;
use std::ops::Range;

/// A position in the document.
///
/// `index` is the flat character offset; `line` and `column` are the same
/// position in line space. Ordering and equality only look at
/// `(line, column)`, so a stale `index` never changes comparisons.
#[derive(Clone, Copy, Debug, Default)]
pub struct Cursor {
    pub line: usize,
    pub column: usize,
    pub index: usize,
}

impl Cursor {
    pub fn new(line: usize, column: usize, index: usize) -> Self {
        Self {
            line,
            column,
            index,
        }
    }
}

impl PartialEq for Cursor {
    fn eq(&self, other: &Self) -> bool {
        (self.line, self.column) == (other.line, other.column)
    }
}

impl Eq for Cursor {}

impl PartialOrd for Cursor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cursor {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.line, self.column).cmp(&(other.line, other.column))
    }
}

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the cursor is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: Cursor,
    /// Where cursor is now
    pub head: Cursor,
}

impl Selection {
    pub fn new(anchor: Cursor, head: Cursor) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (cursor position).
    pub fn collapsed(at: Cursor) -> Self {
        Self {
            anchor: at,
            head: at,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> Cursor {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> Cursor {
        self.anchor.max(self.head)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Selected character count, from the flat offsets.
    pub fn len(&self) -> usize {
        self.end().index - self.start().index
    }

    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Flat-offset range `[start, end)`.
    pub fn to_range(&self) -> Range<usize> {
        self.start().index..self.end().index
    }

    /// Check if the selection is backwards (head before anchor).
    pub fn is_backwards(&self) -> bool {
        self.head < self.anchor
    }
}

/// Information about the most recent edit, polled by the layout pass to
/// decide what to re-measure.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditInfo {
    /// Character offset where the edit occurred
    pub edit_char_pos: usize,
    pub inserted_len: usize,
    pub deleted_len: usize,
    /// Whether the inserted or removed text held a line feed
    pub contains_newline: bool,
    /// Document length (in chars) after this edit was applied.
    pub doc_len_after: usize,
}

impl EditInfo {
    /// Check if this edit info is stale (doc has changed since this edit).
    pub fn is_stale(&self, current_doc_len: usize) -> bool {
        self.doc_len_after != current_doc_len
    }

    /// Line structure may have changed, so line-indexed caches are invalid.
    pub fn affects_lines(&self) -> bool {
        self.contains_newline
    }

    /// Get the range that was affected by this edit.
    ///
    /// For insertions: the range of inserted text.
    /// For deletions: an empty range at the deletion point.
    pub fn affected_range(&self) -> Range<usize> {
        self.edit_char_pos..self.edit_char_pos + self.inserted_len
    }
}
