//! Spellcheck dictionary: exact membership plus ranked suggestions.
//!
//! Each language has its own trie and suggestion keyword list. English
//! words are folded to lowercase when loaded and when looked up; other
//! languages are stored as written.

mod suggest;
mod trie;

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{EditorError, Result};
use crate::rich_string::RichString;

pub use suggest::{INDEL_SCORE, MATCH_SCORE, MISMATCH_SCORE, Suggester, alignment_score};
pub use trie::Trie;

/// Word list loaded when nothing else is configured.
pub const DEFAULT_DATABASE_PATH: &str = "data/dictionary/english/words.txt";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    English,
    Vietnamese,
}

impl Language {
    pub const ALL: [Language; 2] = [Language::English, Language::Vietnamese];

    fn slot(self) -> usize {
        self as usize
    }

    /// Apply this language's case folding to a word.
    pub fn fold(self, word: &RichString) -> RichString {
        match self {
            Language::English => word
                .iter()
                .flat_map(|c| c.as_char().to_lowercase().map(move |l| c.restyle(l as u32)))
                .collect(),
            Language::Vietnamese => word.clone(),
        }
    }

    fn fold_str(self, word: &str) -> RichString {
        match self {
            Language::English => RichString::from(word.to_lowercase().as_str()),
            Language::Vietnamese => RichString::from(word),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Database {
    trie: Trie,
    suggester: Suggester,
}

/// Per-language word databases and the active language.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    databases: [Database; 2],
    language: Language,
}

impl Dictionary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dictionary for `language`, degrading to an empty one if the file
    /// cannot be read. Lookups against an empty dictionary find nothing.
    pub fn load_or_empty(path: impl AsRef<Path>, language: Language) -> Self {
        let mut dictionary = Self::new();
        dictionary.set_language(language);
        if let Err(err) = dictionary.load_database(path.as_ref()) {
            tracing::warn!(error = %err, "spellcheck disabled");
        }
        dictionary
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn set_language(&mut self, language: Language) {
        self.language = language;
    }

    /// Read a newline-separated word list into the active language,
    /// returning how many words were read. Blank lines are skipped.
    pub fn load_database(&mut self, path: impl AsRef<Path>) -> Result<usize> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| EditorError::DictionaryLoad {
            path: path.to_path_buf(),
            source,
        })?;
        let count = self.load_words(text.lines());
        tracing::info!(path = %path.display(), words = count, language = ?self.language, "loaded dictionary");
        Ok(count)
    }

    /// Insert words into the active language and make them its suggestion keywords.
    pub fn load_words<'a>(&mut self, words: impl IntoIterator<Item = &'a str>) -> usize {
        let language = self.language;
        let db = &mut self.databases[language.slot()];
        let mut keywords = Vec::new();
        for word in words {
            let word = word.trim_end_matches('\r');
            if word.is_empty() {
                continue;
            }
            let folded = language.fold_str(word);
            db.trie.insert(&folded);
            keywords.push(folded);
        }
        let count = keywords.len();
        db.suggester.set_keywords(keywords);
        count
    }

    pub fn word_count(&self) -> usize {
        self.active().trie.len()
    }

    pub fn is_empty(&self) -> bool {
        self.active().trie.is_empty()
    }

    pub fn trie(&self) -> &Trie {
        &self.active().trie
    }

    /// Whether `word` is a known word in the active language.
    pub fn search(&self, word: &RichString) -> bool {
        self.active().trie.search(&self.language.fold(word))
    }

    /// Ranked suggestions for `word` in the active language.
    pub fn suggest(&mut self, word: &RichString) -> Vec<RichString> {
        let folded = self.language.fold(word);
        let slot = self.language.slot();
        let suggester = &mut self.databases[slot].suggester;
        suggester.set_pattern(folded);
        suggester.suggest()
    }

    fn active(&self) -> &Database {
        &self.databases[self.language.slot()]
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn rs(s: &str) -> RichString {
        RichString::from(s)
    }

    #[test]
    fn test_english_is_case_insensitive() {
        let mut dict = Dictionary::new();
        dict.load_words(["Hello", "world", ""]);
        assert_eq!(dict.word_count(), 2);
        assert!(dict.search(&rs("hello")));
        assert!(dict.search(&rs("HELLO")));
        assert!(!dict.search(&rs("hell")));
    }

    #[test]
    fn test_languages_are_separate() {
        let mut dict = Dictionary::new();
        dict.load_words(["apple"]);
        dict.set_language(Language::Vietnamese);
        dict.load_words(["Táo"]);

        assert!(dict.search(&rs("Táo")));
        assert!(!dict.search(&rs("táo")));
        assert!(!dict.search(&rs("apple")));

        dict.set_language(Language::English);
        assert!(dict.search(&rs("Apple")));
    }

    #[test]
    fn test_suggest_ranks_close_words_first() {
        let mut dict = Dictionary::new();
        dict.load_words(["help", "hello", "world"]);
        let suggestions: Vec<String> = dict
            .suggest(&rs("Helo"))
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(suggestions[0], "hello");
        assert_eq!(suggestions[1], "help");
    }

    #[test]
    fn test_load_database_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "alpha\r\nbeta\n\ngamma").unwrap();

        let mut dict = Dictionary::new();
        assert_eq!(dict.load_database(file.path()).unwrap(), 3);
        assert!(dict.search(&rs("beta")));
    }

    #[test]
    fn test_missing_file_is_an_error_and_degrades() {
        let mut dict = Dictionary::new();
        let err = dict.load_database("/definitely/not/here.txt").unwrap_err();
        assert!(matches!(err, EditorError::DictionaryLoad { .. }));

        let dict = Dictionary::load_or_empty("/definitely/not/here.txt", Language::English);
        assert!(dict.is_empty());
        assert!(!dict.search(&rs("anything")));
    }
}
