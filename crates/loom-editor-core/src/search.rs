//! Exact substring search and replace over a rope.
//!
//! Matching uses the Z-function on `pattern + sentinel + text`, so a full
//! scan is O(pattern + text) regardless of how repetitive the text is.
//! Comparison is by codepoint only; formatting never affects whether text
//! matches.

use crate::rich_string::RichString;
use crate::rope::Rope;
use crate::types::Cursor;

/// Z-array of `s`: `z[i]` is the length of the longest common prefix of
/// `s` and `s[i..]`. `z[0]` is left at 0.
pub fn z_function<T: PartialEq>(s: &[T]) -> Vec<usize> {
    let n = s.len();
    let mut z = vec![0; n];
    let (mut l, mut r) = (0, 0);
    for i in 1..n {
        if i < r {
            z[i] = (r - i).min(z[i - l]);
        }
        while i + z[i] < n && s[z[i]] == s[i + z[i]] {
            z[i] += 1;
        }
        if i + z[i] > r {
            l = i;
            r = i + z[i];
        }
    }
    z
}

/// Search state: the current pattern and replacement plus the matches found
/// by the last scan, ordered by position.
#[derive(Debug, Clone, Default)]
pub struct Search {
    pattern: RichString,
    replacement: RichString,
    matches: Vec<Cursor>,
    match_offsets: Vec<usize>,
}

impl Search {
    pub fn new(pattern: impl Into<RichString>) -> Self {
        Self {
            pattern: pattern.into(),
            ..Self::default()
        }
    }

    pub fn set_pattern(&mut self, pattern: impl Into<RichString>) {
        self.pattern = pattern.into();
    }

    pub fn set_replacement(&mut self, replacement: impl Into<RichString>) {
        self.replacement = replacement.into();
    }

    pub fn pattern(&self) -> &RichString {
        &self.pattern
    }

    pub fn replacement(&self) -> &RichString {
        &self.replacement
    }

    /// Match start positions from the last scan.
    pub fn matches(&self) -> &[Cursor] {
        &self.matches
    }

    /// Match start offsets from the last scan, parallel to [`Search::matches`].
    pub fn match_offsets(&self) -> &[usize] {
        &self.match_offsets
    }

    /// Forget the last scan's matches. Pattern and replacement are kept.
    pub fn reset(&mut self) {
        self.matches.clear();
        self.match_offsets.clear();
    }

    /// Find every (possibly overlapping) occurrence of the pattern in `text`.
    pub fn find_in_content(&mut self, text: &Rope) {
        self.reset();

        let m = self.pattern.len();
        if m == 0 || m > text.len() {
            return;
        }

        let joined: Vec<Option<u32>> = self
            .pattern
            .codepoints()
            .map(Some)
            .chain(std::iter::once(None))
            .chain(text.chars().map(|c| Some(c.codepoint())))
            .collect();
        let z = z_function(&joined);

        let (mut line, mut column) = (0, 0);
        for (offset, c) in joined[m + 1..].iter().enumerate() {
            if z[m + 1 + offset] >= m {
                self.matches.push(Cursor::new(line, column, offset));
                self.match_offsets.push(offset);
            }
            if *c == Some(u32::from('\n')) {
                line += 1;
                column = 0;
            } else {
                column += 1;
            }
        }

        tracing::debug!(pattern = %self.pattern, matches = self.matches.len(), "search scan");
    }

    /// Replace occurrences of the pattern in `text` with the replacement.
    ///
    /// Overlapping matches are resolved left to right: a match that starts
    /// inside an already chosen one is skipped. Replacements are applied from
    /// the end of the text backwards so earlier offsets stay valid. The
    /// replacement keeps its own formatting.
    pub fn replace_in_content(&mut self, text: &Rope) -> Rope {
        self.find_in_content(text);
        let m = self.pattern.len();
        let chosen = self.non_overlapping_offsets();

        let replacement = Rope::from(&self.replacement);
        let mut result = text.clone();
        for &offset in chosen.iter().rev() {
            result = result.erase(offset, m).insert(offset, &replacement);
        }

        tracing::debug!(replaced = chosen.len(), "search replace");
        result.rebalance()
    }

    /// Offsets of the current matches with overlaps dropped, left to right.
    pub fn non_overlapping_offsets(&self) -> Vec<usize> {
        let m = self.pattern.len();
        let mut chosen = Vec::with_capacity(self.match_offsets.len());
        let mut next_free = 0;
        for &offset in &self.match_offsets {
            if offset >= next_free {
                chosen.push(offset);
                next_free = offset + m;
            }
        }
        chosen
    }

    /// The first match strictly after `current`, wrapping to the first match.
    /// Returns `current` when there are no matches.
    pub fn next_match(&self, current: Cursor) -> Cursor {
        let i = self.matches.partition_point(|m| *m <= current);
        self.matches
            .get(i)
            .or_else(|| self.matches.first())
            .copied()
            .unwrap_or(current)
    }

    /// The last match strictly before `current`, wrapping to the last match.
    /// Returns `current` when there are no matches.
    pub fn prev_match(&self, current: Cursor) -> Cursor {
        let i = self.matches.partition_point(|m| *m < current);
        i.checked_sub(1)
            .and_then(|i| self.matches.get(i))
            .or_else(|| self.matches.last())
            .copied()
            .unwrap_or(current)
    }
}
