//! Persistent rope over rich characters.
//!
//! A `Rope` is a cheap handle to an immutable tree. Every edit returns a new
//! rope that shares all untouched subtrees with the old one, so keeping an
//! old rope around (undo history, search over a snapshot) costs one pointer.
//!
//! Line and word indices are threaded through the tree: leaves record their
//! line-feed and word-start offsets once at construction, and concatenation
//! nodes cache the counts so lookups route in O(log n) like `split` does.
//!
//! Balancing is explicit. Primitives never rebalance on their own; callers
//! that perform many edits check [`Rope::is_balanced`] and call
//! [`Rope::rebalance`] when it reports false.

mod node;
#[cfg(test)]
mod tests;

use std::fmt;
use std::sync::Arc;

use crate::error::{EditorError, Result};
use crate::rich::RichChar;
use crate::rich_string::RichString;
use crate::types::Cursor;

use node::Node;
pub(crate) use node::is_word_break;

/// Trees at or beyond this depth are always considered unbalanced.
pub const MAX_DEPTH: usize = 64;

/// Leaves are coalesced up to this many characters when rebalancing or
/// building from a long string.
pub const LEAF_CHUNK: usize = 512;

/// Fibonacci number with `fib(0) = 0`, `fib(1) = 1`.
pub fn fib(n: usize) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        (a, b) = (b, a.saturating_add(b));
    }
    a
}

/// Immutable, structurally shared sequence of `RichChar`.
#[derive(Clone)]
pub struct Rope {
    root: Arc<Node>,
}

impl Default for Rope {
    fn default() -> Self {
        Self::new()
    }
}

impl Rope {
    /// An empty rope.
    pub fn new() -> Self {
        Self { root: Node::empty() }
    }

    fn from_node(root: Arc<Node>) -> Self {
        Self { root }
    }

    /// Build a balanced rope from a string, chunked into leaves of at most
    /// [`LEAF_CHUNK`] characters.
    pub fn from_rich_string(text: RichString) -> Self {
        if text.len() <= LEAF_CHUNK {
            return Self::from_node(Node::leaf(text));
        }
        let leaves: Vec<_> = text
            .as_slice()
            .chunks(LEAF_CHUNK)
            .map(|chunk| Node::leaf(RichString::from(chunk.to_vec())))
            .collect();
        Self::from_node(Node::merge(&leaves))
    }

    // === Aggregates ===

    pub fn len(&self) -> usize {
        self.root.metrics().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn depth(&self) -> usize {
        self.root.metrics().depth
    }

    /// Line feeds plus one for a trailing line that has no terminator.
    ///
    /// An empty rope has one (empty) line.
    pub fn line_count(&self) -> usize {
        let feeds = self.root.metrics().line_feeds;
        if self.ends_with_line_feed() {
            feeds
        } else {
            feeds + 1
        }
    }

    /// Number of maximal runs of characters other than space, tab and newline.
    pub fn word_count(&self) -> usize {
        self.root.metrics().words
    }

    pub fn ends_with_line_feed(&self) -> bool {
        self.last().is_some_and(|c| node::is_line_feed(c.codepoint()))
    }

    // === Reading ===

    /// Character at `index`.
    pub fn get(&self, index: usize) -> Result<&RichChar> {
        let len = self.len();
        if index >= len {
            return Err(EditorError::out_of_range("rope", index, len));
        }
        self.root
            .get(index)
            .ok_or_else(|| EditorError::out_of_range("rope", index, len))
    }

    pub fn last(&self) -> Option<&RichChar> {
        self.len().checked_sub(1).and_then(|i| self.root.get(i))
    }

    /// Plain text of `[start, start + len)`, clipped to the rope.
    pub fn substring(&self, start: usize, len: usize) -> String {
        self.sub_rich_string(start, len).to_string()
    }

    /// Characters of `[start, start + len)`, clipped to the rope.
    pub fn sub_rich_string(&self, start: usize, len: usize) -> RichString {
        let total = self.len();
        let start = start.min(total);
        let end = start.saturating_add(len).min(total);
        let mut out = RichString::with_capacity(end - start);
        self.root.collect_range(start, end, &mut out);
        out
    }

    pub fn to_rich_string(&self) -> RichString {
        self.sub_rich_string(0, self.len())
    }

    pub fn chars(&self) -> Chars<'_> {
        let mut leaves = Vec::new();
        Node::leaves(&self.root, &mut leaves);
        leaves.reverse();
        Chars {
            pending: leaves,
            current: <&[RichChar]>::default().iter(),
        }
    }

    /// The text of each non-empty leaf, in order.
    pub fn leaves(&self) -> Vec<&RichString> {
        let mut nodes = Vec::new();
        Node::leaves(&self.root, &mut nodes);
        nodes.into_iter().filter_map(|n| n.leaf_text()).collect()
    }

    pub fn leaf_count(&self) -> usize {
        self.leaves().len()
    }

    /// Whether both ropes are the same tree, not just equal text.
    pub fn same_root(&self, other: &Rope) -> bool {
        Arc::ptr_eq(&self.root, &other.root)
    }

    // === Editing ===

    /// Split into `[0, index)` and `[index, len)`. `index` is clamped.
    pub fn split(&self, index: usize) -> (Rope, Rope) {
        let index = index.min(self.len());
        let (left, right) = Node::split(&self.root, index);
        (Rope::from_node(left), Rope::from_node(right))
    }

    pub fn append(&self, other: impl Into<Rope>) -> Rope {
        let other = other.into();
        Rope::from_node(Node::join(Arc::clone(&self.root), other.root))
    }

    pub fn prepend(&self, other: impl Into<Rope>) -> Rope {
        let other = other.into();
        Rope::from_node(Node::join(other.root, Arc::clone(&self.root)))
    }

    /// Insert `other` before `index`, clamped to the end of the rope.
    pub fn insert(&self, index: usize, other: impl Into<Rope>) -> Rope {
        let other = other.into();
        let index = index.min(self.len());
        if index == self.len() {
            return self.append(other);
        }
        if index == 0 {
            return self.prepend(other);
        }
        let (left, right) = self.split(index);
        left.append(other).append(right)
    }

    /// Remove `[start, start + len)`, clipped to the rope.
    pub fn erase(&self, start: usize, len: usize) -> Rope {
        let (left, rest) = self.split(start);
        let (_, right) = rest.split(len);
        left.append(right)
    }

    pub fn replace(&self, start: usize, len: usize, text: impl Into<Rope>) -> Rope {
        self.erase(start, len).insert(start, text)
    }

    // === Balancing ===

    pub fn is_balanced(&self) -> bool {
        let depth = self.depth();
        if depth >= MAX_DEPTH - 2 {
            return false;
        }
        self.len() as u64 >= fib(depth + 2)
    }

    /// Rebuild as a balanced tree if [`Rope::is_balanced`] is false.
    ///
    /// Leaves are collected in order, small neighbours are coalesced up to
    /// [`LEAF_CHUNK`], and the list is merged pairwise at its midpoint.
    pub fn rebalance(&self) -> Rope {
        if self.is_balanced() {
            return self.clone();
        }

        let mut nodes = Vec::new();
        Node::leaves(&self.root, &mut nodes);

        let mut leaves: Vec<Arc<Node>> = Vec::with_capacity(nodes.len());
        let mut pending = RichString::new();
        for node in nodes {
            let Some(text) = node.leaf_text() else {
                continue;
            };
            if text.len() >= LEAF_CHUNK {
                if !pending.is_empty() {
                    leaves.push(Node::leaf(std::mem::take(&mut pending)));
                }
                leaves.push(Arc::clone(node));
            } else if pending.len() + text.len() > LEAF_CHUNK {
                leaves.push(Node::leaf(std::mem::replace(&mut pending, text.clone())));
            } else {
                pending.append(text);
            }
        }
        if !pending.is_empty() {
            leaves.push(Node::leaf(pending));
        }

        let rope = Rope::from_node(Node::merge(&leaves));
        tracing::trace!(
            before = self.depth(),
            after = rope.depth(),
            leaves = leaves.len(),
            "rebalanced rope"
        );
        rope
    }

    // === Lines and words ===

    /// Offset of the first character of `line`, or `len()` past the last line.
    pub fn find_line_start(&self, line: usize) -> usize {
        if line == 0 {
            return 0;
        }
        if line >= self.line_count() || line > self.root.metrics().line_feeds {
            return self.len();
        }
        self.root.find_line_feed(line - 1) + 1
    }

    /// Characters on `line`, excluding its terminator. Zero past the last line.
    pub fn line_length(&self, line: usize) -> usize {
        if line >= self.line_count() {
            return 0;
        }
        let start = self.find_line_start(line);
        let end = if line < self.root.metrics().line_feeds {
            self.root.find_line_feed(line)
        } else {
            self.len()
        };
        end - start
    }

    /// Map a flat offset (clamped to `len()`) to its line and column.
    pub fn pos_from_index(&self, index: usize) -> Cursor {
        let index = index.min(self.len());
        let line = self.root.line_feeds_before(index);
        let column = index - self.find_line_start(line);
        Cursor::new(line, column, index)
    }

    /// Map a line and column to a flat offset. The line is clamped to the
    /// last line and the column to that line's length.
    pub fn index_from_pos(&self, line: usize, column: usize) -> usize {
        let line = line.min(self.line_count().saturating_sub(1));
        self.find_line_start(line) + column.min(self.line_length(line))
    }

    /// Offset of the `word`-th word start, or `len()` when there are fewer words.
    pub fn find_word_start(&self, word: usize) -> usize {
        if word >= self.word_count() {
            return self.len();
        }
        self.root.find_word_start(word)
    }
}

/// Iterator over the characters of a rope, leaf by leaf.
pub struct Chars<'a> {
    pending: Vec<&'a Arc<Node>>,
    current: std::slice::Iter<'a, RichChar>,
}

impl<'a> Iterator for Chars<'a> {
    type Item = &'a RichChar;

    fn next(&mut self) -> Option<&'a RichChar> {
        loop {
            if let Some(c) = self.current.next() {
                return Some(c);
            }
            let node = self.pending.pop()?;
            if let Some(text) = node.leaf_text() {
                self.current = text.as_slice().iter();
            }
        }
    }
}

impl From<RichString> for Rope {
    fn from(text: RichString) -> Self {
        Rope::from_rich_string(text)
    }
}

impl From<&RichString> for Rope {
    fn from(text: &RichString) -> Self {
        Rope::from_rich_string(text.clone())
    }
}

impl From<&str> for Rope {
    fn from(text: &str) -> Self {
        Rope::from_rich_string(RichString::from(text))
    }
}

impl From<&Rope> for Rope {
    fn from(rope: &Rope) -> Self {
        rope.clone()
    }
}

impl PartialEq for Rope {
    fn eq(&self, other: &Self) -> bool {
        self.same_root(other) || (self.len() == other.len() && self.chars().eq(other.chars()))
    }
}

impl Eq for Rope {}

impl fmt::Display for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for leaf in self.leaves() {
            write!(f, "{leaf}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Rope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Rope")
            .field("text", &self.to_string())
            .field("depth", &self.depth())
            .finish()
    }
}
