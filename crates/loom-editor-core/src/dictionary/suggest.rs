//! Fuzzy suggestion ranking by sequence alignment.

use crate::rich_string::RichString;

pub const MATCH_SCORE: i32 = 8;
pub const MISMATCH_SCORE: i32 = -1;
pub const INDEL_SCORE: i32 = -2;

/// Needleman-Wunsch alignment of `pattern` against `keyword`, reporting the
/// best score seen anywhere in the matrix rather than only the final cell.
///
/// Taking the maximum lets a short pattern score well against a longer
/// keyword it is a prefix of. Only two matrix rows are kept.
pub fn alignment_score(keyword: &[u32], pattern: &[u32]) -> i32 {
    let width = keyword.len() + 1;
    let mut prev: Vec<i32> = (0..width).map(|j| INDEL_SCORE * j as i32).collect();
    let mut row = vec![0; width];
    let mut best = 0;

    for (i, &p) in pattern.iter().enumerate() {
        row[0] = INDEL_SCORE * (i as i32 + 1);
        for (j, &k) in keyword.iter().enumerate() {
            let diagonal = prev[j] + if p == k { MATCH_SCORE } else { MISMATCH_SCORE };
            let up = prev[j + 1] + INDEL_SCORE;
            let left = row[j] + INDEL_SCORE;
            let score = diagonal.max(up).max(left);
            row[j + 1] = score;
            best = best.max(score);
        }
        std::mem::swap(&mut prev, &mut row);
    }
    best
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ScoredMatch {
    keyword: usize,
    score: i32,
}

/// Ranks a fixed keyword list against the most recent pattern.
#[derive(Debug, Clone, Default)]
pub struct Suggester {
    keywords: Vec<RichString>,
    pattern: RichString,
    matches: Vec<ScoredMatch>,
}

impl Suggester {
    pub fn new(keywords: Vec<RichString>) -> Self {
        Self {
            keywords,
            ..Self::default()
        }
    }

    pub fn set_keywords(&mut self, keywords: Vec<RichString>) {
        self.keywords = keywords;
        self.matches.clear();
    }

    pub fn keywords(&self) -> &[RichString] {
        &self.keywords
    }

    pub fn pattern(&self) -> &RichString {
        &self.pattern
    }

    /// Score every keyword against `pattern`, keeping those scoring above zero.
    pub fn set_pattern(&mut self, pattern: RichString) {
        let query: Vec<u32> = pattern.codepoints().collect();
        self.pattern = pattern;

        let mut matches: Vec<ScoredMatch> = self
            .keywords
            .iter()
            .enumerate()
            .filter_map(|(keyword, word)| {
                let candidate: Vec<u32> = word.codepoints().collect();
                let score = alignment_score(&candidate, &query);
                (score > 0).then_some(ScoredMatch { keyword, score })
            })
            .collect();
        // Stable, so equal scores keep keyword-list order.
        matches.sort_by(|a, b| b.score.cmp(&a.score));
        self.matches = matches;
    }

    /// Keywords for the current pattern, best first.
    pub fn suggest(&self) -> Vec<RichString> {
        self.matches
            .iter()
            .map(|m| self.keywords[m.keyword].clone())
            .collect()
    }

    /// Keywords with their scores, best first.
    pub fn scored(&self) -> Vec<(RichString, i32)> {
        self.matches
            .iter()
            .map(|m| (self.keywords[m.keyword].clone(), m.score))
            .collect()
    }
}
