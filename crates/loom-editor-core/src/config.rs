//! Editor configuration, read from TOML.

use std::{env, fs};

use miette::miette;
use serde::{Deserialize, Serialize};

use crate::dictionary::{DEFAULT_DATABASE_PATH, Language};
use crate::ledger::HeadingLevel;
use crate::rich::{CharAttributes, Color, DEFAULT_FONT_ID, DEFAULT_FONT_SIZE};

/// Font sizes for each heading level, indexed by `HeadingLevel as usize`.
pub const DEFAULT_HEADING_FONT_SIZES: [u32; 7] = [36, 64, 52, 44, 40, 36, 32];

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DocumentConfig {
    pub default_font_size: u32,
    pub default_font_id: usize,
    pub text_color: Color,
    pub background_color: Color,
    pub heading_font_sizes: [u32; 7],
    /// Maximum undo depth. Unbounded when absent.
    pub history_limit: Option<usize>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_font_size: DEFAULT_FONT_SIZE,
            default_font_id: DEFAULT_FONT_ID,
            text_color: Color::BLACK,
            background_color: Color::WHITE,
            heading_font_sizes: DEFAULT_HEADING_FONT_SIZES,
            history_limit: None,
        }
    }
}

impl DocumentConfig {
    /// Attributes for newly typed text with no neighbour to inherit from.
    pub fn char_attributes(&self) -> CharAttributes {
        CharAttributes {
            font_size: self.default_font_size,
            font_id: self.default_font_id,
            text_color: self.text_color,
            background_color: self.background_color,
        }
    }

    pub fn heading_font_size(&self, level: HeadingLevel) -> u32 {
        self.heading_font_sizes[level as usize]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct DictionaryConfig {
    pub path: String,
    pub language: Language,
    /// How many suggestions front ends should show.
    pub max_suggestions: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            path: DEFAULT_DATABASE_PATH.into(),
            language: Language::English,
            max_suggestions: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct EditorConfig {
    pub document: DocumentConfig,
    pub dictionary: DictionaryConfig,
}

impl EditorConfig {
    pub fn load(config_file: &str) -> miette::Result<EditorConfig> {
        let config_string = fs::read_to_string(config_file)
            .map_err(|e| miette!("error reading config file {}", e))?;
        Self::parse(&config_string)
    }

    /// Parse TOML text, first substituting `$NAME` with environment variables.
    pub fn parse(text: &str) -> miette::Result<EditorConfig> {
        let mut config_string = text.to_string();
        for (k, v) in env::vars() {
            config_string = config_string.replace(&format!("${}", k), &v);
        }

        toml::from_str(&config_string).map_err(|e| miette!("error parsing config file {}", e))
    }
}
