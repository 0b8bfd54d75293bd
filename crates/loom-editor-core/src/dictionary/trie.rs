//! Arena-backed codepoint trie.

use crate::error::{EditorError, Result};
use crate::rich::RichChar;
use crate::rich_string::RichString;

const ROOT: usize = 0;

#[derive(Debug, Clone, Default)]
struct TrieNode {
    /// Non-owning back reference, `None` only for the root.
    parent: Option<usize>,
    codepoint: u32,
    /// Child node indices, sorted by codepoint.
    children: Vec<(u32, usize)>,
    is_word: bool,
}

impl TrieNode {
    fn child(&self, codepoint: u32) -> Option<usize> {
        self.children
            .binary_search_by_key(&codepoint, |&(cp, _)| cp)
            .ok()
            .map(|i| self.children[i].1)
    }
}

/// Set of words stored as a prefix tree.
///
/// Nodes live in one vector and refer to each other by index. Node 0 is the
/// root.
#[derive(Debug, Clone)]
pub struct Trie {
    nodes: Vec<TrieNode>,
    words: usize,
}

impl Default for Trie {
    fn default() -> Self {
        Self::new()
    }
}

impl Trie {
    pub fn new() -> Self {
        Self {
            nodes: vec![TrieNode::default()],
            words: 0,
        }
    }

    /// Number of distinct words stored.
    pub fn len(&self) -> usize {
        self.words
    }

    pub fn is_empty(&self) -> bool {
        self.words == 0
    }

    pub fn insert(&mut self, word: &RichString) {
        self.insert_codepoints(word.codepoints());
    }

    pub fn insert_codepoints(&mut self, word: impl IntoIterator<Item = u32>) {
        let mut current = ROOT;
        for cp in word {
            current = match self.nodes[current].child(cp) {
                Some(next) => next,
                None => {
                    let next = self.nodes.len();
                    self.nodes.push(TrieNode {
                        parent: Some(current),
                        codepoint: cp,
                        ..TrieNode::default()
                    });
                    let children = &mut self.nodes[current].children;
                    let at = children.partition_point(|&(c, _)| c < cp);
                    children.insert(at, (cp, next));
                    next
                }
            };
        }
        if !self.nodes[current].is_word {
            self.nodes[current].is_word = true;
            self.words += 1;
        }
    }

    /// Whether `word` was inserted exactly. Prefixes of words do not count.
    pub fn search(&self, word: &RichString) -> bool {
        self.search_codepoints(word.codepoints())
    }

    pub fn search_codepoints(&self, word: impl IntoIterator<Item = u32>) -> bool {
        let mut current = ROOT;
        for cp in word {
            match self.nodes[current].child(cp) {
                Some(next) => current = next,
                None => return false,
            }
        }
        self.nodes[current].is_word
    }

    /// Every stored word, in codepoint order.
    pub fn words(&self) -> Vec<RichString> {
        let mut ends = Vec::with_capacity(self.words);
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if self.nodes[node].is_word {
                ends.push(node);
            }
            stack.extend(self.nodes[node].children.iter().rev().map(|&(_, n)| n));
        }
        ends.into_iter().map(|end| self.spell(end)).collect()
    }

    /// The `index`-th word of [`Trie::words`].
    pub fn nth_word(&self, index: usize) -> Result<RichString> {
        if index >= self.words {
            return Err(EditorError::out_of_range("dictionary word", index, self.words));
        }
        let mut seen = 0;
        let mut stack = vec![ROOT];
        while let Some(node) = stack.pop() {
            if self.nodes[node].is_word {
                if seen == index {
                    return Ok(self.spell(node));
                }
                seen += 1;
            }
            stack.extend(self.nodes[node].children.iter().rev().map(|&(_, n)| n));
        }
        Err(EditorError::out_of_range("dictionary word", index, self.words))
    }

    /// Rebuild the word ending at `node` by walking parent links.
    fn spell(&self, node: usize) -> RichString {
        let mut codepoints = Vec::new();
        let mut current = node;
        while let Some(parent) = self.nodes[current].parent {
            codepoints.push(self.nodes[current].codepoint);
            current = parent;
        }
        codepoints.into_iter().rev().map(RichChar::new).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie_of(words: &[&str]) -> Trie {
        let mut trie = Trie::new();
        for word in words {
            trie.insert(&RichString::from(*word));
        }
        trie
    }

    #[test]
    fn test_membership() {
        let trie = trie_of(&["hello"]);
        assert!(trie.search(&RichString::from("hello")));
        assert!(!trie.search(&RichString::from("hell")));
        assert!(!trie.search(&RichString::from("hellos")));
    }

    #[test]
    fn test_duplicate_insert_counts_once() {
        let trie = trie_of(&["a", "a", "ab"]);
        assert_eq!(trie.len(), 2);
    }

    #[test]
    fn test_words_in_codepoint_order() {
        let trie = trie_of(&["tea", "ten", "a", "to", "inn", "in"]);
        let words: Vec<String> = trie.words().iter().map(ToString::to_string).collect();
        assert_eq!(words, vec!["a", "in", "inn", "tea", "ten", "to"]);
        assert_eq!(trie.nth_word(3).unwrap().to_string(), "tea");
        assert!(trie.nth_word(6).is_err());
    }

    #[test]
    fn test_non_latin_codepoints_do_not_collide() {
        // U+1ED9 and U+00D9 share a low byte.
        let trie = trie_of(&["một"]);
        assert!(trie.search(&RichString::from("một")));
        assert!(!trie.search(&RichString::from("mÙt")));
    }
}
