//! Editor actions.
//!
//! Platform-agnostic definitions for editor operations. The `EditorAction`
//! enum represents semantic editing operations, decoupled from how they are
//! triggered; key binding lives with the front end.

use smol_str::SmolStr;

use crate::ledger::{Alignment, HeadingLevel, ListKind};
use crate::rich::{Color, Style};

/// A cursor motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motion {
    Left,
    Right,
    Up,
    Down,
    WordLeft,
    WordRight,
    LineStart,
    LineEnd,
    /// Jump to a line and column, clamped to the document.
    To { line: usize, column: usize },
}

/// All possible editor actions.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // === Text Insertion ===
    /// Type text at the cursor, replacing any selection.
    Insert { text: String },
    /// Break the line at the cursor (Enter).
    InsertParagraph,
    /// Replace the word at the cursor, e.g. with a spelling suggestion.
    ReplaceWord { text: String },

    // === Deletion ===
    /// Backspace.
    DeleteBackward,
    /// Delete key.
    DeleteForward,
    DeleteWordBackward,
    DeleteWordForward,
    DeleteToLineStart,
    DeleteToLineEnd,

    // === Navigation ===
    /// Move the cursor; with `extend` the selection grows from its anchor.
    Move { motion: Motion, extend: bool },

    // === Selection ===
    SelectAll,
    ClearSelection,

    // === History ===
    Undo,
    Redo,

    // === Formatting ===
    /// Toggle a style on the selection, or the word at the cursor.
    ToggleStyle(Style),
    SetTextColor(Color),
    SetBackgroundColor(Color),
    SetFontSize(u32),
    SetFontId(usize),
    SetLink(Option<SmolStr>),

    // === Line structure ===
    SetHeading(HeadingLevel),
    SetAlignment(Alignment),
    SetList(ListKind),

    // === Clipboard ===
    Cut,
    Copy,
    Paste,

    // === Search ===
    FindNext,
    FindPrev,
}

impl EditorAction {
    pub fn insert(text: impl Into<String>) -> Self {
        Self::Insert { text: text.into() }
    }

    pub fn move_to(motion: Motion) -> Self {
        Self::Move {
            motion,
            extend: false,
        }
    }

    pub fn extend_to(motion: Motion) -> Self {
        Self::Move {
            motion,
            extend: true,
        }
    }

    /// Whether this action can change content or line structure.
    pub fn is_edit(&self) -> bool {
        !matches!(
            self,
            Self::Move { .. }
                | Self::SelectAll
                | Self::ClearSelection
                | Self::Copy
                | Self::FindNext
                | Self::FindPrev
        )
    }
}
