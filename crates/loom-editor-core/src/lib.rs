//! loom-editor-core: rich-text editing engine without framework dependencies.
//!
//! This crate provides:
//! - `Rope` - persistent rope of rich characters with Fibonacci rebalancing
//! - `RichChar` / `RichString` - codepoints with per-character formatting
//! - `LineLedger` - per-line heading, alignment and list records
//! - `Document` - cursor, selection, formatting and snapshot undo over both
//! - `Search` - Z-function find and replace
//! - `Dictionary` - per-language trie with alignment-scored suggestions
//! - `EditorAction` / `execute_action` - semantic commands for front ends

pub mod actions;
pub mod config;
pub mod dictionary;
pub mod document;
pub mod error;
pub mod execute;
pub mod fonts;
pub mod ledger;
pub mod persist;
pub mod platform;
pub mod rich;
pub mod rich_string;
pub mod rope;
pub mod search;
pub mod text_helpers;
pub mod types;
pub mod undo;

pub use actions::{EditorAction, Motion};
pub use config::{DictionaryConfig, DocumentConfig, EditorConfig};
pub use dictionary::{Dictionary, Language, Suggester, Trie};
pub use document::Document;
pub use error::{EditorError, Result};
pub use execute::execute_action;
pub use fonts::{FontEntry, FontRegistry};
pub use ledger::{Alignment, HeadingLevel, LineLedger, LineRecord, ListKind};
pub use platform::{Clipboard, GlyphMetrics, MemoryClipboard, MonospaceMetrics, PlatformError};
pub use rich::{CharAttributes, Color, RichChar, Style, StyleFlags};
pub use rich_string::RichString;
pub use rope::Rope;
pub use search::Search;
pub use smol_str::SmolStr;
pub use types::{Cursor, EditInfo, Selection};
pub use undo::{History, Snapshot, UndoManager};
