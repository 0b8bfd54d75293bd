//! Rope tree nodes.
//!
//! Nodes are immutable once built. Every aggregate a query needs to route
//! through the tree is computed in the constructor and cached in `Metrics`.

use std::sync::Arc;

use crate::rich::RichChar;
use crate::rich_string::RichString;

/// Whether a codepoint separates words.
pub(crate) fn is_word_break(codepoint: u32) -> bool {
    matches!(codepoint, 0x20 | 0x09 | 0x0A)
}

pub(crate) fn is_line_feed(codepoint: u32) -> bool {
    codepoint == 0x0A
}

/// Cached per-node aggregates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Metrics {
    pub len: usize,
    pub line_feeds: usize,
    /// Word starts, counting offset 0 as a start when the node opens on a
    /// word character. Concatenation corrects for words spanning the join.
    pub words: usize,
    pub depth: usize,
    pub starts_in_word: bool,
    pub ends_in_word: bool,
}

#[derive(Debug)]
pub(crate) struct Leaf {
    pub text: RichString,
    /// Offsets of every `\n` in `text`.
    pub line_feeds: Vec<usize>,
    /// Offsets where a word begins, including 0 when `text` opens on a word.
    pub word_starts: Vec<usize>,
    pub metrics: Metrics,
}

#[derive(Debug)]
pub(crate) struct Concat {
    pub left: Arc<Node>,
    pub right: Arc<Node>,
    pub metrics: Metrics,
}

#[derive(Debug)]
pub(crate) enum Node {
    Leaf(Leaf),
    Concat(Concat),
}

impl Leaf {
    pub fn new(text: RichString) -> Self {
        let mut line_feeds = Vec::new();
        let mut word_starts = Vec::new();
        let mut prev_break = true;
        for (i, c) in text.iter().enumerate() {
            let cp = c.codepoint();
            if is_line_feed(cp) {
                line_feeds.push(i);
            }
            let brk = is_word_break(cp);
            if prev_break && !brk {
                word_starts.push(i);
            }
            prev_break = brk;
        }

        let metrics = Metrics {
            len: text.len(),
            line_feeds: line_feeds.len(),
            words: word_starts.len(),
            depth: 0,
            starts_in_word: text.first().is_some_and(|c| !is_word_break(c.codepoint())),
            ends_in_word: text.last().is_some_and(|c| !is_word_break(c.codepoint())),
        };

        Self {
            text,
            line_feeds,
            word_starts,
            metrics,
        }
    }
}

impl Concat {
    fn new(left: Arc<Node>, right: Arc<Node>) -> Self {
        let l = left.metrics();
        let r = right.metrics();
        let spans_join = l.ends_in_word && r.starts_in_word;
        let metrics = Metrics {
            len: l.len + r.len,
            line_feeds: l.line_feeds + r.line_feeds,
            words: l.words + r.words - usize::from(spans_join),
            depth: l.depth.max(r.depth) + 1,
            starts_in_word: if l.len == 0 { r.starts_in_word } else { l.starts_in_word },
            ends_in_word: if r.len == 0 { l.ends_in_word } else { r.ends_in_word },
        };
        Self {
            left,
            right,
            metrics,
        }
    }

    /// Length of the left subtree.
    fn weight(&self) -> usize {
        self.left.metrics().len
    }

    /// Whether the right subtree's offset 0 was counted as a word start
    /// but actually continues a word from the left subtree.
    fn spans_join(&self) -> bool {
        self.left.metrics().ends_in_word && self.right.metrics().starts_in_word
    }
}

impl Node {
    pub fn empty() -> Arc<Node> {
        Arc::new(Node::Leaf(Leaf::new(RichString::new())))
    }

    pub fn leaf(text: RichString) -> Arc<Node> {
        Arc::new(Node::Leaf(Leaf::new(text)))
    }

    pub fn metrics(&self) -> &Metrics {
        match self {
            Node::Leaf(leaf) => &leaf.metrics,
            Node::Concat(concat) => &concat.metrics,
        }
    }

    /// Concatenate two subtrees, dropping an empty side.
    pub fn join(left: Arc<Node>, right: Arc<Node>) -> Arc<Node> {
        if left.metrics().len == 0 {
            return right;
        }
        if right.metrics().len == 0 {
            return left;
        }
        Arc::new(Node::Concat(Concat::new(left, right)))
    }

    /// Character at `index`, which the caller has bounds-checked.
    pub fn get(&self, index: usize) -> Option<&RichChar> {
        match self {
            Node::Leaf(leaf) => leaf.text.get(index),
            Node::Concat(concat) => {
                let weight = concat.weight();
                if index < weight {
                    concat.left.get(index)
                } else {
                    concat.right.get(index - weight)
                }
            }
        }
    }

    /// Split at `index` (already clamped to `len`).
    pub fn split(node: &Arc<Node>, index: usize) -> (Arc<Node>, Arc<Node>) {
        let len = node.metrics().len;
        if index == 0 {
            return (Node::empty(), Arc::clone(node));
        }
        if index >= len {
            return (Arc::clone(node), Node::empty());
        }

        match node.as_ref() {
            Node::Leaf(leaf) => (
                Node::leaf(leaf.text.substring(0, index)),
                Node::leaf(leaf.text.substring(index, len - index)),
            ),
            Node::Concat(concat) => {
                let weight = concat.weight();
                if index == weight {
                    (Arc::clone(&concat.left), Arc::clone(&concat.right))
                } else if index < weight {
                    let (ll, lr) = Node::split(&concat.left, index);
                    (ll, Node::join(lr, Arc::clone(&concat.right)))
                } else {
                    let (rl, rr) = Node::split(&concat.right, index - weight);
                    (Node::join(Arc::clone(&concat.left), rl), rr)
                }
            }
        }
    }

    /// Push clones of the characters in `[start, end)` onto `out`.
    pub fn collect_range(&self, start: usize, end: usize, out: &mut RichString) {
        if start >= end {
            return;
        }
        match self {
            Node::Leaf(leaf) => {
                for c in &leaf.text.as_slice()[start..end] {
                    out.push(c.clone());
                }
            }
            Node::Concat(concat) => {
                let weight = concat.weight();
                if start < weight {
                    concat.left.collect_range(start, end.min(weight), out);
                }
                if end > weight {
                    concat
                        .right
                        .collect_range(start.saturating_sub(weight), end - weight, out);
                }
            }
        }
    }

    /// Offset of the `n`-th line feed (0-based), which the caller has checked exists.
    pub fn find_line_feed(&self, n: usize) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.line_feeds[n],
            Node::Concat(concat) => {
                let left_feeds = concat.left.metrics().line_feeds;
                if n < left_feeds {
                    concat.left.find_line_feed(n)
                } else {
                    concat.weight() + concat.right.find_line_feed(n - left_feeds)
                }
            }
        }
    }

    /// Number of line feeds strictly before `index`.
    pub fn line_feeds_before(&self, index: usize) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.line_feeds.partition_point(|&p| p < index),
            Node::Concat(concat) => {
                let weight = concat.weight();
                if index <= weight {
                    concat.left.line_feeds_before(index)
                } else {
                    concat.left.metrics().line_feeds
                        + concat.right.line_feeds_before(index - weight)
                }
            }
        }
    }

    /// Offset of the `n`-th word start (0-based), which the caller has checked exists.
    pub fn find_word_start(&self, n: usize) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.word_starts[n],
            Node::Concat(concat) => {
                let left_words = concat.left.metrics().words;
                if n < left_words {
                    concat.left.find_word_start(n)
                } else {
                    let skip = usize::from(concat.spans_join());
                    concat.weight() + concat.right.find_word_start(n - left_words + skip)
                }
            }
        }
    }

    /// Collect leaf nodes in order, skipping empty ones.
    pub fn leaves<'a>(node: &'a Arc<Node>, out: &mut Vec<&'a Arc<Node>>) {
        match node.as_ref() {
            Node::Leaf(leaf) => {
                if !leaf.text.is_empty() {
                    out.push(node);
                }
            }
            Node::Concat(concat) => {
                Node::leaves(&concat.left, out);
                Node::leaves(&concat.right, out);
            }
        }
    }

    pub fn leaf_text(&self) -> Option<&RichString> {
        match self {
            Node::Leaf(leaf) => Some(&leaf.text),
            Node::Concat(_) => None,
        }
    }

    /// Build a balanced tree over `leaves` by recursive midpoint merge.
    pub fn merge(leaves: &[Arc<Node>]) -> Arc<Node> {
        match leaves {
            [] => Node::empty(),
            [single] => Arc::clone(single),
            _ => {
                let mid = leaves.len().div_ceil(2);
                let left = Node::merge(&leaves[..mid]);
                let right = Node::merge(&leaves[mid..]);
                Node::join(left, right)
            }
        }
    }
}
